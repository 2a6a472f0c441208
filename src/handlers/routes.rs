//! The service route table.

use super::docs::{self, DOCS_PATH};
use super::pets::{self, LoadPet};
use super::users;
use crate::pipeline::{
    BodyMerge, BodyParams, Coerce, Interceptor, Metrics, NormalizeKeys, RequestLog,
    ResponseDefaults,
};
use crate::router::{RouteNode, RouteSpec};
use crate::schema::entities::{PARTIAL_PET, PET, PET_ID, PET_LIST, PET_QUERY, USER, USERNAME};
use crate::static_files::StaticFiles;
use crate::store::Store;
use http::Method;
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::sync::Arc;

/// Shared collaborators the route table closes over.
#[derive(Clone)]
pub struct RouteDeps {
    pub store: Arc<Store>,
    pub metrics: Arc<Metrics>,
    pub ui_files: Option<Arc<StaticFiles>>,
    pub description: Arc<OnceCell<Value>>,
}

/// Interceptors every route runs, outermost first. Logging, metrics and
/// response defaults come first so their leave stages see the final response.
#[must_use]
pub fn global_interceptors(metrics: Arc<Metrics>) -> Vec<Arc<dyn Interceptor>> {
    let stages: [Arc<dyn Interceptor>; 7] = [
        Arc::new(RequestLog),
        metrics,
        Arc::new(ResponseDefaults),
        Arc::new(BodyParams),
        Arc::new(BodyMerge),
        Arc::new(NormalizeKeys),
        Arc::new(Coerce),
    ];
    stages.into()
}

#[must_use]
pub fn route_table(deps: &RouteDeps) -> RouteNode {
    let store = &deps.store;
    let load_pet = || vec![Arc::new(LoadPet::new(Arc::clone(store))) as Arc<dyn Interceptor>];

    RouteNode::root()
        .interceptors(global_interceptors(Arc::clone(&deps.metrics)))
        .child("pet", |pet| {
            pet.route(
                RouteSpec::new("list_pets", Method::GET)
                    .summary("List all pets")
                    .query(&PET_QUERY)
                    .responds(200, "Every stored pet", Some(&PET_LIST)),
                pets::list_pets(Arc::clone(store)),
            )
            .route(
                RouteSpec::new("add_pet", Method::POST)
                    .summary("Add a pet")
                    .body(&PET)
                    .responds(201, "Pet created", None)
                    .responds(400, "Invalid pet", None),
                pets::add_pet(Arc::clone(store)),
            )
            .child(":id", |id| {
                id.route_with(
                    RouteSpec::new("get_pet", Method::GET)
                        .summary("Find a pet by id")
                        .path(&PET_ID)
                        .responds(200, "The pet", Some(&PET))
                        .responds(404, "Unknown pet", None),
                    load_pet(),
                    pets::get_pet(),
                )
                .route(
                    RouteSpec::new("update_pet", Method::PUT)
                        .summary("Replace a pet")
                        .path(&PET_ID)
                        .body(&PET)
                        .responds(200, "Pet stored", None)
                        .responds(400, "Invalid pet", None),
                    pets::update_pet(Arc::clone(store)),
                )
                .route_with(
                    RouteSpec::new("patch_pet", Method::PATCH)
                        .summary("Update pet fields from a form")
                        .path(&PET_ID)
                        .form(&PARTIAL_PET)
                        .responds(200, "Pet updated", None)
                        .responds(400, "Invalid fields", None)
                        .responds(404, "Unknown pet", None),
                    load_pet(),
                    pets::patch_pet(Arc::clone(store)),
                )
            })
        })
        .child("user", |user| {
            user.route(
                RouteSpec::new("add_user", Method::POST)
                    .summary("Register a user")
                    .body(&USER)
                    .responds(200, "The stored user", Some(&USER))
                    .responds(400, "Invalid user", None),
                users::add_user(Arc::clone(store)),
            )
            .child(":username", |name| {
                name.route(
                    RouteSpec::new("get_user", Method::GET)
                        .summary("Find a user by name")
                        .path(&USERNAME)
                        .responds(200, "The user, or null when unknown", Some(&USER)),
                    users::get_user(Arc::clone(store)),
                )
            })
        })
        .child(DOCS_PATH.trim_start_matches('/'), |d| {
            d.route(
                RouteSpec::new("api_docs", Method::GET)
                    .summary("Machine-readable API description")
                    .responds(200, "OpenAPI document", None),
                docs::docs(Arc::clone(&deps.description)),
            )
        })
        .child("ui", |ui| {
            ui.child("*path", |assets| {
                assets.route(
                    RouteSpec::new("docs_ui", Method::GET)
                        .summary("Documentation viewer")
                        .responds(200, "Asset", None)
                        .responds(404, "Asset not found", None),
                    docs::ui(deps.ui_files.clone()),
                )
            })
        })
}
