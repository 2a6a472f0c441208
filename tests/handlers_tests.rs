use brrtpets::app::{App, AppOptions};
use brrtpets::pipeline::{Request, Response};
use brrtpets::server::AppService;
use brrtpets::store::PETS;
use http::Method;
use serde_json::{json, Value};
use std::thread;

fn service(seed: bool) -> (App, AppService) {
    let app = App::build(&AppOptions {
        seed,
        ..Default::default()
    })
    .unwrap();
    let service = AppService::new(&app);
    (app, service)
}

fn json_request(method: Method, path: &str, body: &Value) -> Request {
    Request::new(method, path).with_body("application/json", body.to_string())
}

fn get(service: &AppService, path: &str) -> Response {
    service.handle(Request::new(Method::GET, path))
}

#[test]
fn test_add_then_get_pet() {
    let (_app, service) = service(false);
    let pet = json!({ "id": 10, "name": "Fido", "status": "available" });

    let res = service.handle(json_request(Method::POST, "/pet", &pet));
    assert_eq!(res.status, 201);
    assert_eq!(res.get_header("location"), Some("/pet/10"));

    let res = get(&service, "/pet/10");
    assert_eq!(res.status, 200);
    assert_eq!(res.body, pet);
}

#[test]
fn test_add_pet_coerces_string_id() {
    let (app, service) = service(false);
    let res = service.handle(json_request(
        Method::POST,
        "/pet",
        &json!({ "id": "11", "name": "Stringy" }),
    ));
    assert_eq!(res.status, 201);
    assert_eq!(app.store.get(&[PETS, "11"]).unwrap()["id"], 11);
}

#[test]
fn test_add_pet_missing_name_is_400_and_not_stored() {
    let (app, service) = service(true);
    let before = app.store.values(&[PETS]).len();

    let res = service.handle(json_request(Method::POST, "/pet", &json!({ "id": 12 })));

    assert_eq!(res.status, 400);
    assert_eq!(res.body["error"], "Request validation failed");
    assert!(res.body["details"]["body-params"]["name"].is_string());
    assert_eq!(app.store.values(&[PETS]).len(), before);
}

#[test]
fn test_unknown_fields_are_dropped() {
    let (app, service) = service(false);
    let res = service.handle(json_request(
        Method::POST,
        "/pet",
        &json!({ "id": 13, "name": "Bob", "nickname": "bobby" }),
    ));
    assert_eq!(res.status, 201);
    let stored = app.store.get(&[PETS, "13"]).unwrap();
    assert!(stored.get("nickname").is_none());
    assert_eq!(stored["name"], "Bob");
}

#[test]
fn test_yaml_body_is_accepted() {
    let (app, service) = service(false);
    let yaml = "id: 14\nname: Yammy\ntags:\n  - id: 1\n    name: fluffy\n";

    let res = service.handle(Request::new(Method::POST, "/pet").with_body("application/yaml", yaml));

    assert_eq!(res.status, 201);
    let stored = app.store.get(&[PETS, "14"]).unwrap();
    assert_eq!(stored["tags"][0]["name"], "fluffy");
}

#[test]
fn test_put_is_idempotent_and_path_id_wins() {
    let (app, service) = service(false);
    let body = json!({ "id": 99, "name": "Putty", "status": "sold" });

    let first = service.handle(json_request(Method::PUT, "/pet/15", &body));
    let after_first = app.store.snapshot();
    let second = service.handle(json_request(Method::PUT, "/pet/15", &body));

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_eq!(first.body, "OK");
    assert_eq!(*app.store.snapshot(), *after_first);
    assert_eq!(app.store.get(&[PETS, "15"]).unwrap()["id"], 15);
    assert!(app.store.get(&[PETS, "99"]).is_none());
}

#[test]
fn test_patch_merges_form_fields() {
    let (app, service) = service(true);

    let res = service.handle(
        Request::new(Method::PATCH, "/pet/1")
            .with_body("application/x-www-form-urlencoded", "Status=sold&name=Rexy"),
    );

    assert_eq!(res.status, 200);
    let pet = app.store.get(&[PETS, "1"]).unwrap();
    assert_eq!(pet["name"], "Rexy");
    assert_eq!(pet["status"], "sold");
    assert_eq!(pet["category"]["name"], "Dogs");
}

#[test]
fn test_patch_absent_pet_is_404() {
    let (app, service) = service(false);

    let res = service.handle(
        Request::new(Method::PATCH, "/pet/77")
            .with_body("application/x-www-form-urlencoded", "name=Ghost"),
    );

    assert_eq!(res.status, 404);
    assert!(app.store.get(&[PETS, "77"]).is_none());
}

#[test]
fn test_get_pet_bad_id_is_400() {
    let (_app, service) = service(true);
    let res = get(&service, "/pet/abc");
    assert_eq!(res.status, 400);
    assert_eq!(res.body["details"]["path-params"]["id"]["got"], "abc");
}

#[test]
fn test_list_pets_filters_by_status() {
    let (_app, service) = service(true);

    let all = get(&service, "/pet");
    assert_eq!(all.status, 200);
    assert_eq!(all.body["total"], 2);

    let pending = service.handle(Request::new(Method::GET, "/pet").with_query("status", "pending"));
    assert_eq!(pending.body["total"], 1);
    assert_eq!(pending.body["pets"][0]["name"], "Tom");
}

#[test]
fn test_user_round_trip_and_unknown_user() {
    let (_app, service) = service(false);
    let user = json!({ "username": "ann", "password": "secret", "status": "active" });

    let res = service.handle(json_request(Method::POST, "/user", &user));
    assert_eq!(res.status, 200);
    assert_eq!(res.body, user);

    assert_eq!(get(&service, "/user/ann").body, user);

    let missing = get(&service, "/user/nobody");
    assert_eq!(missing.status, 200);
    assert_eq!(missing.body, Value::Null);
}

#[test]
fn test_username_with_space_round_trips() {
    let (_app, service) = service(false);
    let user = json!({ "username": "john doe", "password": "pw" });

    let res = service.handle(json_request(Method::POST, "/user", &user));
    assert_eq!(res.status, 200);

    let fetched = get(&service, "/user/john%20doe");
    assert_eq!(fetched.status, 200);
    assert_eq!(fetched.body, user);
}

#[test]
fn test_patch_status_only_keeps_name() {
    let (app, service) = service(true);

    let res = service.handle(
        Request::new(Method::PATCH, "/pet/1")
            .with_body("application/x-www-form-urlencoded", "status=sold"),
    );

    assert_eq!(res.status, 200);
    let pet = app.store.get(&[PETS, "1"]).unwrap();
    assert_eq!(pet["status"], "sold");
    assert_eq!(pet["name"], "Rex");
    assert_eq!(pet["id"], 1);
}

#[test]
fn test_unknown_route_and_method_are_404() {
    let (_app, service) = service(true);
    assert_eq!(get(&service, "/store/inventory").status, 404);
    assert_eq!(service.handle(Request::new(Method::DELETE, "/pet/1")).status, 404);
}

#[test]
fn test_docs_lists_every_route() {
    let (app, service) = service(false);
    let res = get(&service, "/docs");
    assert_eq!(res.status, 200);
    assert_eq!(res.body["openapi"], "3.0.3");
    assert!(res.body["paths"]["/pet/{id}"]["patch"].is_object());
    assert_eq!(&res.body, app.description());
}

#[test]
fn test_concurrent_adds_of_distinct_pets_all_land() {
    let (app, service) = service(false);

    let workers: Vec<_> = (0..8)
        .map(|t| {
            let service = service.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    let id = 1000 + t * 25 + i;
                    let res = service.handle(json_request(
                        Method::POST,
                        "/pet",
                        &json!({ "id": id, "name": format!("pet-{id}") }),
                    ));
                    assert_eq!(res.status, 201);
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(app.store.values(&[PETS]).len(), 200);
}
