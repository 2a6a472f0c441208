//! Service assembly: store, metrics, route table and API description.

use crate::handlers::docs::api_description;
use crate::handlers::{pets, route_table, RouteDeps};
use crate::pipeline::Metrics;
use crate::router::Router;
use crate::static_files::StaticFiles;
use crate::store::{Store, StoreError};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Directory served under `/ui`
    pub ui_dir: Option<PathBuf>,
    /// Preload sample pets
    pub seed: bool,
}

/// A fully wired service, ready to be handed to the HTTP layer.
#[derive(Clone)]
pub struct App {
    pub router: Arc<Router>,
    pub store: Arc<Store>,
    pub metrics: Arc<Metrics>,
    description: Arc<OnceCell<Value>>,
}

impl App {
    /// Build the route table over a fresh store.
    pub fn build(options: &AppOptions) -> Result<Self, StoreError> {
        Self::with_store(Arc::new(Store::new()), options)
    }

    /// Build the route table over an existing store.
    pub fn with_store(store: Arc<Store>, options: &AppOptions) -> Result<Self, StoreError> {
        if options.seed {
            pets::seed(&store)?;
            info!("store seeded with sample pets");
        }
        let metrics = Arc::new(Metrics::new());
        let description = Arc::new(OnceCell::new());
        let deps = RouteDeps {
            store: Arc::clone(&store),
            metrics: Arc::clone(&metrics),
            ui_files: options
                .ui_dir
                .as_ref()
                .map(|dir| Arc::new(StaticFiles::new(dir.clone()))),
            description: Arc::clone(&description),
        };

        let router = Router::new(route_table(&deps));
        let _ = description.set(api_description(router.routes()));
        info!(routes = router.routes().len(), "route table compiled");

        Ok(Self {
            router: Arc::new(router),
            store,
            metrics,
            description,
        })
    }

    /// The generated OpenAPI document.
    #[must_use]
    pub fn description(&self) -> &Value {
        static EMPTY: Value = Value::Null;
        self.description.get().unwrap_or(&EMPTY)
    }
}
