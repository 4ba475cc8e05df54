//! Router tests against a seeded in-memory store.

use axum::{
  Router,
  body::{Body, to_bytes},
  http::{Request, StatusCode, header},
};
use carshop_core::{
  seed,
  store::{CarsRepository, UnitOfWork},
};
use carshop_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, BASE_PATH, router};

struct TestApp {
  router:  Router,
  store:   SqliteStore,
  _images: TempDir,
}

async fn app() -> TestApp {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store.commit(seed::session(), Some("seed")).await.unwrap();
  let images = tempfile::tempdir().unwrap();
  let router = router(AppState::new(store.clone(), images.path()));
  TestApp { router, store, _images: images }
}

struct Reply {
  status:  StatusCode,
  headers: axum::http::HeaderMap,
  body:    Vec<u8>,
}

impl Reply {
  fn json(&self) -> Value { serde_json::from_slice(&self.body).unwrap() }
}

impl TestApp {
  async fn send(&self, req: Request<Body>) -> Reply {
    let res = self.router.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let headers = res.headers().clone();
    let body = to_bytes(res.into_body(), usize::MAX).await.unwrap().to_vec();
    Reply { status, headers, body }
  }

  async fn get(&self, path: &str) -> Reply {
    self.send(request("GET", path, Body::empty())).await
  }

  async fn delete(&self, path: &str) -> Reply {
    self.send(request("DELETE", path, Body::empty())).await
  }

  async fn post_json(&self, path: &str, body: Value) -> Reply {
    self.send(json_request("POST", path, body)).await
  }

  async fn put_json(&self, path: &str, body: Value) -> Reply {
    self.send(json_request("PUT", path, body)).await
  }
}

fn request(method: &str, path: &str, body: Body) -> Request<Body> {
  Request::builder()
    .method(method)
    .uri(format!("{BASE_PATH}{path}"))
    .body(body)
    .unwrap()
}

fn json_request(method: &str, path: &str, body: Value) -> Request<Body> {
  Request::builder()
    .method(method)
    .uri(format!("{BASE_PATH}{path}"))
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(body.to_string()))
    .unwrap()
}

fn location(reply: &Reply) -> &str {
  reply.headers[header::LOCATION].to_str().unwrap()
}

// ─── People ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_people() {
  let app = app().await;
  let reply = app.get("/people").await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json().as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn unknown_person_is_404_with_error_body() {
  let app = app().await;
  let reply = app.get(&format!("/people/{}", Uuid::new_v4())).await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
  assert!(reply.json()["error"].is_string());
}

#[tokio::test]
async fn person_with_cars() {
  let app = app().await;
  let reply = app.get(&format!("/people/{}/with-cars", seed::ARNO)).await;
  assert_eq!(reply.status, StatusCode::OK);

  let json = reply.json();
  assert_eq!(json["lastName"], "Arndt");
  let cars = json["cars"].as_array().unwrap();
  assert_eq!(cars.len(), 3);
  assert!(cars.iter().all(|c| c["personId"] == seed::ARNO.to_string()));
}

#[tokio::test]
async fn search_by_last_name() {
  let app = app().await;
  let reply = app.get("/people/name?name=muster").await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json().as_array().unwrap().len(), 2);

  let reply = app.get("/people/name").await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json().as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn create_person_then_conflict() {
  let app = app().await;
  let id = Uuid::new_v4();
  let body = json!({
    "id": id,
    "firstName": "Clara",
    "lastName": "Conrad",
    "email": "c.conrad@example.org",
  });

  let reply = app.post_json("/people", body.clone()).await;
  assert_eq!(reply.status, StatusCode::CREATED);
  assert_eq!(location(&reply), format!("{BASE_PATH}/people/{id}"));
  assert_eq!(reply.json()["phone"], Value::Null);

  let reply = app.get(&format!("/people/{id}")).await;
  assert_eq!(reply.json()["firstName"], "Clara");

  let reply = app.post_json("/people", body).await;
  assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn update_person_keeps_absent_contact_fields() {
  let app = app().await;
  let reply = app
    .put_json(
      &format!("/people/{}", seed::MAX),
      json!({ "id": seed::MAX, "firstName": "Maximilian", "lastName": "Mustermann" }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::OK);

  let json = app.get(&format!("/people/{}", seed::MAX)).await.json();
  assert_eq!(json["firstName"], "Maximilian");
  assert_eq!(json["email"], "max.mustermann@gmail.com");
}

#[tokio::test]
async fn update_person_rejects_id_mismatch() {
  let app = app().await;
  let reply = app
    .put_json(
      &format!("/people/{}", seed::MAX),
      json!({ "id": seed::ERIKA, "firstName": "X", "lastName": "Y" }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_unknown_person_is_404() {
  let app = app().await;
  let id = Uuid::new_v4();
  let reply = app
    .put_json(
      &format!("/people/{id}"),
      json!({ "id": id, "firstName": "X", "lastName": "Y" }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_person_orphans_cars() {
  let app = app().await;
  let reply = app.delete(&format!("/people/{}", seed::BENNO)).await;
  assert_eq!(reply.status, StatusCode::NO_CONTENT);

  assert_eq!(
    app.get(&format!("/people/{}", seed::BENNO)).await.status,
    StatusCode::NOT_FOUND
  );
  let car = app.get(&format!("/cars/{}", seed::car_id(8))).await.json();
  assert_eq!(car["personId"], Value::Null);
}

// ─── Cars ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_and_get_cars() {
  let app = app().await;
  assert_eq!(app.get("/cars").await.json().as_array().unwrap().len(), 8);

  let car = app.get(&format!("/cars/{}", seed::car_id(2))).await.json();
  assert_eq!(car["maker"], "BMW");
  assert_eq!(car["model"], "520");
  assert_eq!(car["personId"], seed::ERIKA.to_string());

  let reply = app.get(&format!("/cars/{}", Uuid::new_v4())).await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn filter_by_attributes() {
  let app = app().await;
  let reply = app.get("/cars/attributes?maker=BMW&priceMin=30000").await;
  assert_eq!(reply.status, StatusCode::OK);
  let ids: Vec<Value> = reply
    .json()
    .as_array()
    .unwrap()
    .iter()
    .map(|c| c["id"].clone())
    .collect();
  assert_eq!(ids, vec![json!(seed::car_id(5))]);

  let reply = app.get("/cars/attributes?maker=&yearMin=2021&yearMax=2021").await;
  assert_eq!(reply.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn cars_of_person() {
  let app = app().await;
  let reply = app.get(&format!("/people/{}/cars", seed::MAX)).await;
  assert_eq!(reply.json().as_array().unwrap().len(), 2);

  let reply = app.get(&format!("/people/{}/cars", Uuid::new_v4())).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json(), json!([]));
}

#[tokio::test]
async fn create_car_for_person() {
  let app = app().await;
  let id = Uuid::new_v4();
  let body = json!({
    "id": id,
    "maker": "Skoda",
    "model": "Octavia",
    "year": 2019,
    "price": "17999.99",
  });

  let reply = app
    .post_json(&format!("/people/{}/cars", seed::BENNO), body.clone())
    .await;
  assert_eq!(reply.status, StatusCode::CREATED);
  assert_eq!(location(&reply), format!("{BASE_PATH}/cars/{id}"));
  assert_eq!(reply.json()["personId"], seed::BENNO.to_string());

  let cars = app.store.select_by_person_id(seed::BENNO).await.unwrap();
  assert_eq!(cars.len(), 2);

  let reply = app
    .post_json(&format!("/people/{}/cars", seed::BENNO), body)
    .await;
  assert_eq!(reply.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_car_for_unknown_person_is_404() {
  let app = app().await;
  let reply = app
    .post_json(
      &format!("/people/{}/cars", Uuid::new_v4()),
      json!({ "id": Uuid::new_v4(), "maker": "VW", "model": "Up", "year": 2016, "price": 6000 }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_car_update() {
  let app = app().await;
  let car = seed::car_id(5);
  let reply = app
    .put_json(
      &format!("/people/{}/cars/{car}", seed::ARNO),
      json!({ "id": car, "price": "47000" }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::OK);

  let json = app.get(&format!("/cars/{car}")).await.json();
  assert_eq!(json["maker"], "BMW");
  assert_eq!(json["model"], "X5");
  assert_eq!(json["year"], 2021);
  assert_eq!(json["price"], "47000");
}

#[tokio::test]
async fn car_update_checks_path_and_owner() {
  let app = app().await;
  let car = seed::car_id(5);

  let reply = app
    .put_json(
      &format!("/people/{}/cars/{car}", seed::ARNO),
      json!({ "id": seed::car_id(6), "year": 2000 }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);

  let reply = app
    .put_json(
      &format!("/people/{}/cars/{car}", seed::ERIKA),
      json!({ "id": car, "year": 2000 }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn set_car_image() {
  let app = app().await;
  let car = seed::car_id(1);
  let reply = app
    .put_json(
      &format!("/people/{}/cars/{car}/image", seed::ERIKA),
      json!({ "imageUrl": "/carshop/v2/images/golf.png" }),
    )
    .await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json()["imageUrl"], "/carshop/v2/images/golf.png");
}

#[tokio::test]
async fn delete_car_only_through_its_owner() {
  let app = app().await;
  let car = seed::car_id(3);

  let reply = app.delete(&format!("/people/{}/cars/{car}", seed::ERIKA)).await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);

  let reply = app.delete(&format!("/people/{}/cars/{car}", seed::MAX)).await;
  assert_eq!(reply.status, StatusCode::NO_CONTENT);
  assert_eq!(
    app.get(&format!("/cars/{car}")).await.status,
    StatusCode::NOT_FOUND
  );
}

// ─── Images ──────────────────────────────────────────────────────────────────

const PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot really an image";

fn upload(content_type: &str, bytes: &'static [u8]) -> Request<Body> {
  Request::builder()
    .method("POST")
    .uri(format!("{BASE_PATH}/images"))
    .header(header::CONTENT_TYPE, content_type)
    .body(Body::from(bytes))
    .unwrap()
}

#[tokio::test]
async fn image_lifecycle() {
  let app = app().await;
  let expected = format!("{}.png", hex::encode(Sha256::digest(PNG)));

  let reply = app.send(upload("image/png", PNG)).await;
  assert_eq!(reply.status, StatusCode::CREATED);
  assert_eq!(reply.json()["fileName"], expected.as_str());
  assert_eq!(location(&reply), format!("{BASE_PATH}/images/{expected}"));

  let reply = app.get(&format!("/images/{expected}")).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.headers[header::CONTENT_TYPE], "image/png");
  assert_eq!(reply.body, PNG);

  let reply = app.get(&format!("/images/exists/{expected}")).await;
  assert_eq!(reply.status, StatusCode::OK);
  assert_eq!(reply.json(), json!({ "exists": true }));

  let reply = app.delete(&format!("/images/{expected}")).await;
  assert_eq!(reply.status, StatusCode::NO_CONTENT);

  let reply = app.get(&format!("/images/exists/{expected}")).await;
  assert_eq!(reply.status, StatusCode::NOT_FOUND);
  assert_eq!(
    app.get(&format!("/images/{expected}")).await.status,
    StatusCode::NOT_FOUND
  );
}

#[tokio::test]
async fn reupload_yields_same_name() {
  let app = app().await;
  let first = app.send(upload("image/png", PNG)).await.json();
  let second = app.send(upload("image/png", PNG)).await.json();
  assert_eq!(first["fileName"], second["fileName"]);
}

#[tokio::test]
async fn rejected_uploads() {
  let app = app().await;
  let reply = app.send(upload("text/plain", b"hello")).await;
  assert_eq!(reply.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

  let reply = app.send(upload("image/jpeg", b"")).await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn traversal_names_are_rejected() {
  let app = app().await;
  let reply = app.get("/images/..").await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);

  let reply = app.get("/images/a%2Fb.png").await;
  assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}
