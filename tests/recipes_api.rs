//! End-to-end tests for the recipe routes over the in-memory store and media host.

use axum::{
    body::{to_bytes, Body},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use recipe_api::{app, AppState, MemoryMediaHost, MemoryRecipeStore};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tower::ServiceExt;

const BOUNDARY: &str = "recipe-test-boundary";
const BODY_LIMIT: usize = 64 * 1024;

struct TestApp {
    router: Router,
    store: Arc<MemoryRecipeStore>,
    media: Arc<MemoryMediaHost>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryRecipeStore::new());
        let media = Arc::new(MemoryMediaHost::new("https://media.test/recipes"));
        let router = app(AppState::new(store.clone(), Some(media.clone())), BODY_LIMIT);
        Self { router, store, media }
    }

    fn without_media() -> Self {
        let store = Arc::new(MemoryRecipeStore::new());
        let router = app(AppState::new(store.clone(), None), BODY_LIMIT);
        Self {
            router,
            store,
            media: Arc::new(MemoryMediaHost::default()),
        }
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::delete(uri).body(Body::empty()).unwrap()).await
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn multipart(&self, method: Method, uri: &str, form: MultipartBody) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(form.finish()))
            .unwrap();
        self.send(req).await
    }

    /// Create a recipe through the API and return its JSON record.
    async fn create(&self, title: &str) -> Value {
        let (status, body) = self
            .json(
                Method::POST,
                "/api/v1/recipes",
                json!({"title": title, "ingredients": ["flour", "water"], "instructions": "Knead"}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

#[derive(Default)]
struct MultipartBody {
    bytes: Vec<u8>,
}

impl MultipartBody {
    fn text(mut self, name: &str, value: &str) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.bytes.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                BOUNDARY, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.bytes.extend_from_slice(data);
        self.bytes.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> Vec<u8> {
        self.bytes.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.bytes
    }
}

fn full_form() -> MultipartBody {
    MultipartBody::default()
        .text("title", "Pancakes")
        .text("ingredients", "flour")
        .text("ingredients", "milk")
        .text("instructions", "Whisk and fry")
}

fn error_paths(body: &Value) -> HashSet<String> {
    body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn empty_list_has_zero_pages() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/recipes").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Recipes retrieved successfully");
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["totalPages"], 0);
    assert_eq!(body["currentPage"], 1);

    let (_, body) = app.get("/api/v1/recipes?page=4").await;
    assert_eq!(body["currentPage"], 4);
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn list_pages_newest_first() {
    let app = TestApp::new();
    for i in 0..7 {
        app.create(&format!("Bread {i}")).await;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    let (status, body) = app.get("/api/v1/recipes?limit=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalPages"], 3);
    let titles: Vec<&str> = body["data"].as_array().unwrap().iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, ["Bread 6", "Bread 5", "Bread 4"]);

    let (_, body) = app.get("/api/v1/recipes?page=3&limit=3").await;
    assert_eq!(body["currentPage"], 3);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["title"], "Bread 0");

    let (_, body) = app.get("/api/v1/recipes").await;
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["data"].as_array().unwrap().len(), 7);
}

#[tokio::test]
async fn invalid_pagination_is_a_validation_error() {
    let app = TestApp::new();
    let (status, body) = app.get("/api/v1/recipes?page=0&limit=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), HashSet::from(["page".to_string(), "limit".to_string()]));
    assert_eq!(body["errors"][0]["location"], "query");
}

#[tokio::test]
async fn created_ids_are_unique_and_records_round_trip() {
    let app = TestApp::new();
    let mut ids = HashSet::new();
    for i in 0..5 {
        let created = app.create(&format!("Stew {i}")).await;
        let id = created["id"].as_str().unwrap().to_string();
        assert!(!id.is_empty());
        assert!(ids.insert(id));
    }

    let created = app.create("Focaccia").await;
    let id = created["id"].as_str().unwrap();
    let (status, body) = app.get(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Recipe retrieved successfully");
    assert_eq!(body["data"]["title"], "Focaccia");
    assert_eq!(body["data"]["ingredients"], json!(["flour", "water"]));
    assert_eq!(body["data"]["instructions"], "Knead");
    assert!(body["data"].get("image").is_none());
    assert!(body["data"]["createdAt"].is_string());
    assert!(body["data"]["updatedAt"].is_string());
}

#[tokio::test]
async fn missing_id_is_not_found() {
    let app = TestApp::new();
    for uri in [
        "/api/v1/recipes/5f0c8a3e-2b7d-4c1a-9e62-0d3b9a1c7f44",
        "/api/v1/recipes/60d5ec49d1b4f2c4e03cda3f",
    ] {
        let (status, body) = app.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"success": false, "message": "Recipe not found"}));
    }
}

#[tokio::test]
async fn create_with_multipart_and_image() {
    let app = TestApp::new();
    let form = full_form().file("image", "pancakes.jpg", "image/jpeg", b"\xff\xd8\xff\xe0fake");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Recipe created successfully");
    assert_eq!(body["data"]["ingredients"], json!(["flour", "milk"]));
    let image = body["data"]["image"].as_str().unwrap();
    assert!(image.starts_with("https://media.test/recipes/"));
    assert!(image.ends_with(".jpg"));
    assert_eq!(app.media.uploaded_urls(), [image.to_string()]);
}

#[tokio::test]
async fn create_without_file_leaves_image_unset() {
    let app = TestApp::new();
    let form = full_form().file("image", "", "application/octet-stream", b"");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(body["data"].get("image").is_none());
    assert!(app.media.uploaded_urls().is_empty());
}

#[tokio::test]
async fn create_lists_every_missing_field() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::POST, "/api/v1/recipes", json!({"title": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("success").is_none());
    assert_eq!(
        error_paths(&body),
        HashSet::from(["title".to_string(), "ingredients".to_string(), "instructions".to_string()])
    );
    let msgs: Vec<&str> = body["errors"].as_array().unwrap().iter().map(|e| e["msg"].as_str().unwrap()).collect();
    assert!(msgs.contains(&"Title is required"));
    assert!(msgs.contains(&"Ingredients are required"));
    assert!(msgs.contains(&"Instructions are required"));
    assert!(app.store.is_empty().await);

    let (status, body) = app
        .multipart(Method::POST, "/api/v1/recipes", MultipartBody::default().text("instructions", "Mix"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), HashSet::from(["title".to_string(), "ingredients".to_string()]));
}

#[tokio::test]
async fn create_rejects_non_image_files() {
    let app = TestApp::new();
    let form = full_form().file("image", "notes.txt", "text/plain", b"not an image");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), HashSet::from(["image".to_string()]));
    assert!(app.media.uploaded_urls().is_empty());
}

#[tokio::test]
async fn failed_upload_creates_nothing() {
    let app = TestApp::new();
    app.media.fail_uploads(true);
    let form = full_form().file("image", "p.png", "image/png", b"\x89PNG");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("image upload failed"));
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn image_upload_without_media_host_is_rejected() {
    let app = TestApp::without_media();
    let form = full_form().file("image", "p.png", "image/png", b"\x89PNG");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "image uploads are not configured");
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn update_with_only_instructions_keeps_other_fields() {
    let app = TestApp::new();
    let form = full_form().file("image", "p.png", "image/png", b"\x89PNG");
    let (_, created) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    let created = &created["data"];
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .multipart(
            Method::PUT,
            &format!("/api/v1/recipes/{id}"),
            MultipartBody::default().text("instructions", "Whisk, rest, then fry"),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Recipe updated successfully");
    let updated = &body["data"];
    assert_eq!(updated["instructions"], "Whisk, rest, then fry");
    assert_eq!(updated["title"], created["title"]);
    assert_eq!(updated["ingredients"], created["ingredients"]);
    assert_eq!(updated["image"], created["image"]);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["createdAt"], created["createdAt"]);
    assert!(app.media.deleted_ids().is_empty());
}

#[tokio::test]
async fn update_replaces_image_and_fields() {
    let app = TestApp::new();
    let created = app.create("Old title").await;
    let id = created["id"].as_str().unwrap();
    let form = MultipartBody::default()
        .text("title", "New title")
        .file("image", "new.webp", "image/webp", b"RIFF....WEBP");
    let (status, body) = app.multipart(Method::PUT, &format!("/api/v1/recipes/{id}"), form).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["title"], "New title");
    assert_eq!(body["data"]["ingredients"], json!(["flour", "water"]));
    assert!(body["data"]["image"].as_str().unwrap().ends_with(".webp"));
}

#[tokio::test]
async fn update_rejects_present_but_empty_fields() {
    let app = TestApp::new();
    let created = app.create("Scones").await;
    let id = created["id"].as_str().unwrap();
    let (status, body) = app
        .json(Method::PUT, &format!("/api/v1/recipes/{id}"), json!({"title": "", "ingredients": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_paths(&body), HashSet::from(["title".to_string(), "ingredients".to_string()]));

    let (_, body) = app.get(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(body["data"]["title"], "Scones");
}

#[tokio::test]
async fn update_of_missing_record_mutates_nothing() {
    let app = TestApp::new();
    app.create("Only one").await;
    let (status, body) = app
        .json(
            Method::PUT,
            "/api/v1/recipes/60d5ec49d1b4f2c4e03cda3f",
            json!({"title": "Old Recipe", "ingredients": ["Ingredient 1"], "instructions": "Instructions"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Recipe not found"}));

    let (_, list) = app.get("/api/v1/recipes").await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
    assert_eq!(list["data"][0]["title"], "Only one");
}

#[tokio::test]
async fn delete_removes_record_and_media() {
    let app = TestApp::new();
    let form = full_form().file("image", "p.png", "image/png", b"\x89PNG");
    let (_, created) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    let id = created["data"]["id"].as_str().unwrap();
    let image = created["data"]["image"].as_str().unwrap();
    let public_id = image.rsplit('/').next().unwrap().trim_end_matches(".png").to_string();

    let (status, body) = app.delete(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true, "message": "Recipe deleted successfully"}));
    assert_eq!(app.media.deleted_ids(), [public_id]);

    let (status, _) = app.get(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Recipe not found");
    assert_eq!(app.media.deleted_ids().len(), 1);
}

#[tokio::test]
async fn delete_succeeds_when_media_delete_fails() {
    let app = TestApp::new();
    let form = full_form().file("image", "p.gif", "image/gif", b"GIF89a");
    let (_, created) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    let id = created["data"]["id"].as_str().unwrap();

    app.media.fail_deletes(true);
    let (status, body) = app.delete(&format!("/api/v1/recipes/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn delete_of_missing_record_is_not_found() {
    let app = TestApp::new();
    let (status, body) = app.delete("/api/v1/recipes/60d5ec49d1b4f2c4e03cda3f").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"success": false, "message": "Recipe not found"}));
}

#[tokio::test]
async fn unreadable_bodies_use_the_error_envelope() {
    let app = TestApp::new();
    let req = Request::post("/api/v1/recipes")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let req = Request::post("/api/v1/recipes")
        .header(CONTENT_TYPE, "text/plain")
        .body(Body::from("title=x"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unsupported content type: text/plain");
}

#[tokio::test]
async fn oversized_bodies_are_rejected() {
    let app = TestApp::new();
    let big = vec![0u8; BODY_LIMIT + 1];
    let body = full_form().file("image", "big.png", "image/png", &big).finish();
    let req = Request::post("/api/v1/recipes")
        .header(CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .header(CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body, json!({"success": false, "message": "request body too large"}));
    assert_eq!(app.store.len().await, 0);
    assert!(app.media.uploaded_urls().is_empty());

    let padding = "x".repeat(BODY_LIMIT + 1);
    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/recipes",
            json!({"title": "Big", "ingredients": ["a"], "instructions": padding}),
        )
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "request body too large");
    assert_eq!(app.store.len().await, 0);
}

#[tokio::test]
async fn json_fields_of_the_wrong_type_still_list_field_errors() {
    let app = TestApp::new();
    let (status, body) = app.json(Method::POST, "/api/v1/recipes", json!({"title": 5})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(
        error_paths(&body),
        HashSet::from(["ingredients".to_string(), "instructions".to_string()])
    );
    assert!(body["errors"].as_array().unwrap().iter().all(|e| e["location"] == "body"));

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/recipes",
            json!({"title": ["x"], "ingredients": ["salt", 1], "instructions": "Mix"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(error_paths(&body), HashSet::from(["title".to_string()]));

    let (status, body) = app
        .json(
            Method::POST,
            "/api/v1/recipes",
            json!({"title": 42, "ingredients": ["salt", 1], "instructions": "Mix"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["title"], "42");
    assert_eq!(body["data"]["ingredients"], json!(["salt", "1"]));
}

#[tokio::test]
async fn trailing_empty_image_part_keeps_the_uploaded_file() {
    let app = TestApp::new();
    let form = full_form()
        .file("image", "pancakes.png", "image/png", b"\x89PNG data")
        .file("image", "", "application/octet-stream", b"");
    let (status, body) = app.multipart(Method::POST, "/api/v1/recipes", form).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let urls = app.media.uploaded_urls();
    assert_eq!(urls.len(), 1);
    assert_eq!(body["data"]["image"], urls[0].as_str());
}

#[tokio::test]
async fn urlencoded_forms_are_accepted() {
    let app = TestApp::new();
    let req = Request::post("/api/v1/recipes")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title=Tea&ingredients=water&ingredients=leaves&instructions=Steep"))
        .unwrap();
    let (status, body) = app.send(req).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["ingredients"], json!(["water", "leaves"]));
}

#[tokio::test]
async fn probes_report_status() {
    let app = TestApp::without_media();
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["media"], "disabled");

    let (_, body) = app.get("/version").await;
    assert_eq!(body["name"], "recipe-api");
}
