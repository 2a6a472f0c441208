//! Pet resource handlers and the `LoadPet` precondition loader.

use crate::pipeline::{Context, Handler, Interceptor, ParamSource, Response};
use crate::store::{Store, StoreError, PETS};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Key of the loaded pet in [`Context::attachments`].
pub const PET_ATTACHMENT: &str = "pet";

/// Loads `pets[id]` for the matched path id and attaches it as `"pet"`.
///
/// Terminates with 400 when the path id failed coercion and with 404 when no
/// pet is stored under it.
pub struct LoadPet {
    store: Arc<Store>,
}

impl LoadPet {
    #[must_use]
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }
}

impl Interceptor for LoadPet {
    fn name(&self) -> &str {
        "load-pet"
    }

    fn enter(&self, ctx: &mut Context) {
        if let Some(err) = ctx.errors.get(ParamSource::Path) {
            let mut details = Map::new();
            details.insert(ParamSource::Path.as_str().to_string(), err.to_value());
            ctx.terminate(Response::validation_failed(Value::Object(details)));
            return;
        }
        let Some(key) = pet_key(ctx) else {
            ctx.terminate(Response::not_found());
            return;
        };
        match self.store.get(&[PETS, &key]) {
            Some(pet) => ctx.attach(PET_ATTACHMENT, pet),
            None => {
                warn!(request_id = %ctx.request_id, pet_id = %key, "pet not found");
                ctx.terminate(Response::not_found());
            }
        }
    }
}

/// Decimal store key of the coerced path id.
fn pet_key(ctx: &Context) -> Option<String> {
    ctx.param(ParamSource::Path, "id")
        .and_then(Value::as_i64)
        .map(|id| id.to_string())
}

/// 400 with every collected validation error, if there are any.
pub(crate) fn reject_invalid(ctx: &mut Context) -> bool {
    if ctx.has_errors() {
        let details = ctx.errors.to_value();
        ctx.respond(Response::validation_failed(details));
        return true;
    }
    false
}

pub(crate) fn store_failure(ctx: &mut Context, err: &StoreError) {
    error!(request_id = %ctx.request_id, error = %err, "store update failed");
    ctx.respond(Response::error(500, "Internal Server Error"));
}

/// `GET /pet`: every stored pet in ascending id order, optionally filtered
/// by `?status=`.
pub fn list_pets(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let status = ctx
            .param(ParamSource::Query, "status")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let mut pets = store.values(&[PETS]);
        pets.sort_by_key(|p| p.get("id").and_then(Value::as_i64).unwrap_or_default());
        if let Some(status) = status {
            pets.retain(|p| p.get("status").and_then(Value::as_str) == Some(status.as_str()));
        }
        ctx.respond(Response::ok(json!({ "total": pets.len(), "pets": pets })));
    }
}

/// `POST /pet`: store the typed body under its id, 201 with `Location`.
pub fn add_pet(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let Some(pet) = ctx.params.body.clone() else {
            ctx.respond(Response::error(400, "Missing request body"));
            return;
        };
        let Some(id) = pet.get("id").and_then(Value::as_i64) else {
            ctx.respond(Response::error(400, "Missing pet id"));
            return;
        };
        match store.insert(&[PETS, &id.to_string()], pet) {
            Ok(_) => {
                info!(request_id = %ctx.request_id, pet_id = id, "pet added");
                ctx.respond(Response::created(format!("/pet/{id}")));
            }
            Err(err) => store_failure(ctx, &err),
        }
    }
}

/// `GET /pet/:id`: the pet `LoadPet` attached.
pub fn get_pet() -> impl Handler {
    |ctx: &mut Context| {
        let response = match ctx.attachment(PET_ATTACHMENT) {
            Some(pet) => Response::ok(pet.clone()),
            None => Response::not_found(),
        };
        ctx.respond(response);
    }
}

/// `PUT /pet/:id`: replace the pet. The path id wins over the body's id.
pub fn update_pet(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let (Some(key), Some(mut pet)) = (pet_key(ctx), ctx.params.body.clone()) else {
            ctx.respond(Response::error(400, "Missing request body"));
            return;
        };
        if let (Some(obj), Some(id)) = (
            pet.as_object_mut(),
            ctx.param(ParamSource::Path, "id").cloned(),
        ) {
            obj.insert("id".to_string(), id);
        }
        match store.insert(&[PETS, &key], pet) {
            Ok(_) => ctx.respond(Response::ok_text()),
            Err(err) => store_failure(ctx, &err),
        }
    }
}

/// `PATCH /pet/:id`: shallow-merge the form fields into the stored pet.
pub fn patch_pet(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let Some(key) = pet_key(ctx) else {
            ctx.respond(Response::not_found());
            return;
        };
        let partial = ctx
            .params
            .form
            .as_ref()
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        match store.merge(&[PETS, &key], &partial) {
            Ok(_) => ctx.respond(Response::ok_text()),
            Err(err) => store_failure(ctx, &err),
        }
    }
}

/// Preload a couple of sample pets.
pub fn seed(store: &Store) -> Result<(), StoreError> {
    store.insert(
        &[PETS, "1"],
        json!({
            "id": 1,
            "name": "Rex",
            "category": { "id": 1, "name": "Dogs" },
            "status": "available"
        }),
    )?;
    store.insert(
        &[PETS, "2"],
        json!({
            "id": 2,
            "name": "Tom",
            "tags": [{ "id": 1, "name": "indoor" }],
            "status": "pending"
        }),
    )?;
    Ok(())
}
