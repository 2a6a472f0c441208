//! Generated API description and the documentation viewer.
//!
//! The description is an OpenAPI 3 document derived from the compiled route
//! table and the entity schemas; nothing is maintained by hand.

use crate::pipeline::{Context, Handler, Response};
use crate::router::RouteMeta;
use crate::schema::{entities, FieldType, Schema};
use crate::static_files::StaticFiles;
use once_cell::sync::OnceCell;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::debug;

/// Url under which the description is served.
pub const DOCS_PATH: &str = "/docs";

/// OpenAPI path template for a table pattern: `/pet/:id` → `/pet/{id}`.
#[must_use]
pub fn openapi_path(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|seg| match seg.strip_prefix(':').or_else(|| seg.strip_prefix('*')) {
            Some(name) => format!("{{{name}}}"),
            None => seg.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn schema_ref(schema: &Schema) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", schema.name) })
}

fn field_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::Int => json!({ "type": "integer", "format": "int64" }),
        FieldType::Str => json!({ "type": "string" }),
        FieldType::Enum(values) => json!({ "type": "string", "enum": values }),
        FieldType::Entity(schema) => schema_ref(schema),
        FieldType::SeqOf(schema) => json!({ "type": "array", "items": schema_ref(schema) }),
    }
}

/// JSON Schema object for an entity.
#[must_use]
pub fn component(schema: &Schema) -> Value {
    let properties: Map<String, Value> = schema
        .fields
        .iter()
        .map(|f| (f.name.to_string(), field_schema(&f.ty)))
        .collect();
    let required: Vec<&str> = schema
        .fields
        .iter()
        .filter(|f| f.required)
        .map(|f| f.name)
        .collect();
    let mut out = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        out["required"] = json!(required);
    }
    out
}

fn parameters(schema: Option<&Schema>, location: &str) -> Vec<Value> {
    schema
        .map(|s| {
            s.fields
                .iter()
                .map(|f| {
                    json!({
                        "name": f.name,
                        "in": location,
                        "required": f.required || location == "path",
                        "schema": field_schema(&f.ty),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn operation(route: &RouteMeta) -> Value {
    let mut op = json!({
        "operationId": route.handler_name,
        "summary": route.summary,
    });

    let mut params = parameters(route.schemas.path, "path");
    params.extend(parameters(route.schemas.query, "query"));
    if !params.is_empty() {
        op["parameters"] = Value::Array(params);
    }

    if let Some(body) = route.schemas.body {
        op["requestBody"] = json!({
            "required": true,
            "content": {
                "application/json": { "schema": schema_ref(body) },
                "application/yaml": { "schema": schema_ref(body) },
            }
        });
    } else if let Some(form) = route.schemas.form {
        op["requestBody"] = json!({
            "content": {
                "application/x-www-form-urlencoded": { "schema": schema_ref(form) },
            }
        });
    }

    let mut responses = Map::new();
    for r in &route.responses {
        let mut entry = json!({ "description": r.description });
        if let Some(schema) = r.schema {
            entry["content"] = json!({ "application/json": { "schema": schema_ref(schema) } });
        }
        responses.insert(r.status.to_string(), entry);
    }
    if responses.is_empty() {
        responses.insert("200".to_string(), json!({ "description": "OK" }));
    }
    op["responses"] = Value::Object(responses);
    op
}

/// Build the OpenAPI document for `routes`.
#[must_use]
pub fn api_description(routes: &[Arc<RouteMeta>]) -> Value {
    let mut paths = Map::new();
    for route in routes {
        let item = paths
            .entry(openapi_path(&route.path_pattern))
            .or_insert_with(|| json!({}));
        item[route.method.as_str().to_ascii_lowercase()] = operation(route);
    }
    let schemas: Map<String, Value> = entities::ALL
        .iter()
        .map(|s| (s.name.to_string(), component(s)))
        .collect();

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "brrtpets",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths,
        "components": { "schemas": schemas },
    })
}

/// `GET /docs`. The document is filled in once the router is compiled.
pub fn docs(description: Arc<OnceCell<Value>>) -> impl Handler {
    move |ctx: &mut Context| {
        let response = match description.get() {
            Some(doc) => Response::ok(doc.clone()),
            None => Response::error(503, "API description not ready"),
        };
        ctx.respond(response);
    }
}

/// `GET /ui/*path`: documentation viewer assets. HTML pages are rendered
/// with the description url in scope.
pub fn ui(files: Option<Arc<StaticFiles>>) -> impl Handler {
    move |ctx: &mut Context| {
        let Some(files) = &files else {
            ctx.respond(Response::error(404, "Docs UI not configured"));
            return;
        };
        let asset = match ctx.path_param("path") {
            None | Some("") => "index.html",
            Some(p) => p,
        };
        let template_ctx = json!({ "spec_url": DOCS_PATH, "title": "brrtpets" });
        let response = match files.load(asset, Some(&template_ctx)) {
            Ok((bytes, content_type)) => Response::bytes(content_type, bytes),
            Err(err) => {
                debug!(asset = %asset, error = %err, "docs asset unavailable");
                Response::not_found()
            }
        };
        ctx.respond(response);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Request;
    use crate::router::{RouteNode, RouteSpec, Router};
    use http::Method;

    #[test]
    fn test_openapi_path() {
        assert_eq!(openapi_path("/pet/:id"), "/pet/{id}");
        assert_eq!(openapi_path("/ui/*path"), "/ui/{path}");
        assert_eq!(openapi_path("/pet"), "/pet");
    }

    #[test]
    fn test_component_lists_required() {
        let pet = component(&entities::PET);
        assert_eq!(pet["required"], json!(["id", "name"]));
        assert_eq!(pet["properties"]["status"]["enum"], json!(["available", "pending", "sold"]));
        assert_eq!(pet["properties"]["tags"]["items"]["$ref"], "#/components/schemas/Tag");
    }

    #[test]
    fn test_description_from_routes() {
        let table = RouteNode::root().child("pet", |pet| {
            pet.child(":id", |id| {
                id.route(
                    RouteSpec::new("get_pet", Method::GET)
                        .summary("Find pet by id")
                        .path(&entities::PET_ID)
                        .responds(200, "The pet", Some(&entities::PET))
                        .responds(404, "Unknown pet", None),
                    |_ctx: &mut Context| {},
                )
            })
        });
        let router = Router::new(table);
        let doc = api_description(router.routes());
        let op = &doc["paths"]["/pet/{id}"]["get"];
        assert_eq!(op["operationId"], "get_pet");
        assert_eq!(op["parameters"][0]["name"], "id");
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(
            op["responses"]["200"]["content"]["application/json"]["schema"]["$ref"],
            "#/components/schemas/Pet"
        );
        assert!(doc["components"]["schemas"]["User"].is_object());
    }

    #[test]
    fn test_docs_handler_waits_for_description() {
        let cell = Arc::new(OnceCell::new());
        let handler = docs(Arc::clone(&cell));
        let mut ctx = Context::new(Request::new(Method::GET, DOCS_PATH));
        handler.handle(&mut ctx);
        assert_eq!(ctx.response.take().unwrap().status, 503);

        cell.set(json!({ "openapi": "3.0.3" })).unwrap();
        handler.handle(&mut ctx);
        assert_eq!(ctx.response.unwrap().body["openapi"], "3.0.3");
    }

    #[test]
    fn test_ui_without_files_is_404() {
        let mut ctx = Context::new(Request::new(Method::GET, "/ui/index.html"));
        ui(None).handle(&mut ctx);
        assert_eq!(ctx.response.unwrap().status, 404);
    }
}
