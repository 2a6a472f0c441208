use super::pets::{reject_invalid, store_failure};
use crate::pipeline::{Context, Handler, ParamSource, Response};
use crate::store::{Store, USERS};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// `POST /user`: store the typed user under its username and echo it back.
pub fn add_user(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let Some(user) = ctx.params.body.clone() else {
            ctx.respond(Response::error(400, "Missing request body"));
            return;
        };
        let Some(username) = user.get("username").and_then(Value::as_str).map(str::to_owned) else {
            ctx.respond(Response::error(400, "Missing username"));
            return;
        };
        match store.insert(&[USERS, &username], user.clone()) {
            Ok(_) => {
                info!(request_id = %ctx.request_id, username = %username, "user added");
                ctx.respond(Response::ok(user));
            }
            Err(err) => store_failure(ctx, &err),
        }
    }
}

/// `GET /user/:username`: the stored user, or a `null` body when unknown.
pub fn get_user(store: Arc<Store>) -> impl Handler {
    move |ctx: &mut Context| {
        if reject_invalid(ctx) {
            return;
        }
        let user = ctx
            .param(ParamSource::Path, "username")
            .and_then(Value::as_str)
            .and_then(|name| store.get(&[USERS, name]))
            .unwrap_or(Value::Null);
        ctx.respond(Response::ok(user));
    }
}
