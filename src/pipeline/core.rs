use super::context::Context;
use super::response::Response;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// A pipeline stage with optional enter and leave behaviour.
///
/// Both stages default to no-ops. `enter` runs on the way in, in chain
/// order; it may call [`Context::terminate`] to skip every remaining enter
/// stage (the terminal handler included). `leave` runs on the way out, in
/// reverse order, for every interceptor whose enter stage was reached.
pub trait Interceptor: Send + Sync {
    fn name(&self) -> &str;

    fn enter(&self, _ctx: &mut Context) {}

    fn leave(&self, _ctx: &mut Context) {}
}

/// Terminal business logic for a route. Sets the response on the context.
pub trait Handler: Send + Sync {
    fn handle(&self, ctx: &mut Context);
}

impl<F> Handler for F
where
    F: Fn(&mut Context) + Send + Sync,
{
    fn handle(&self, ctx: &mut Context) {
        self(ctx)
    }
}

/// Wraps a [`Handler`] as the final enter-only stage of a chain.
pub struct Terminal {
    name: String,
    handler: Arc<dyn Handler>,
}

impl Terminal {
    pub fn new(name: impl Into<String>, handler: Arc<dyn Handler>) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl Interceptor for Terminal {
    fn name(&self) -> &str {
        &self.name
    }

    fn enter(&self, ctx: &mut Context) {
        self.handler.handle(ctx);
    }
}

/// Ordered interceptor sequence for one route.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Arc<dyn Interceptor>>,
}

impl Chain {
    #[must_use]
    pub fn new(stages: Vec<Arc<dyn Interceptor>>) -> Self {
        Self { stages }
    }

    /// Append `handler` as the terminal stage.
    pub fn with_handler(mut self, name: &str, handler: Arc<dyn Handler>) -> Self {
        self.stages.push(Arc::new(Terminal::new(name, handler)));
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run the chain over `ctx` and return it with the final response.
    ///
    /// A panicking stage is turned into a 500 response with termination; the
    /// leave phase still runs for every stage entered so far, the panicking
    /// one included.
    pub fn execute(&self, mut ctx: Context) -> Context {
        let mut entered = 0;
        for stage in &self.stages {
            entered += 1;
            debug!(stage = stage.name(), request_id = %ctx.request_id, "enter");
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| stage.enter(&mut ctx))) {
                let details = panic_message(panic.as_ref());
                error!(stage = stage.name(), details = %details, "stage panicked on enter");
                ctx.terminate(internal_error(&details));
            }
            if ctx.terminated {
                debug!(stage = stage.name(), "pipeline terminated");
                break;
            }
        }

        for stage in self.stages[..entered].iter().rev() {
            debug!(stage = stage.name(), request_id = %ctx.request_id, "leave");
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| stage.leave(&mut ctx))) {
                let details = panic_message(panic.as_ref());
                error!(stage = stage.name(), details = %details, "stage panicked on leave");
                ctx.response = Some(internal_error(&details));
            }
        }
        ctx
    }
}

fn internal_error(details: &str) -> Response {
    Response::new(
        500,
        serde_json::json!({ "error": "Internal Server Error", "details": details }),
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
