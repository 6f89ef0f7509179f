use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use zyxnime::api::AppState;
use zyxnime::config::Config;

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    api_key: String,
    upload_dir: PathBuf,
}

impl TestApp {
    async fn request(
        &self,
        method: &str,
        uri: &str,
        auth: bool,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if auth {
            builder = builder.header("X-Api-Key", &self.api_key);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        read_json(response).await
    }

    async fn create_anime(&self, title: &str) -> Value {
        let (status, body) = self
            .request(
                "POST",
                "/api/anime",
                true,
                Some(json!({ "title": title, "description": format!("{title} synopsis") })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"].clone()
    }
}

async fn read_json(response: axum::response::Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn test_config() -> (Config, PathBuf) {
    let root = std::env::temp_dir().join(format!("zyxnime-test-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    let upload_dir = root.join("uploads");

    let mut config = Config::default();
    config.general.database_path = format!("sqlite:{}", root.join("test.db").display());
    config.storage.upload_dir = upload_dir.display().to_string();
    config.server.secure_cookies = false;
    config.admin.password = "initial-password".to_string();
    config.security.argon2_memory_cost_kib = 1024;
    config.security.argon2_time_cost = 1;
    (config, upload_dir)
}

async fn spawn_app() -> TestApp {
    let (config, upload_dir) = test_config();

    let state = zyxnime::api::create_app_state_from_config(config, None)
        .await
        .expect("Failed to create app state");
    let api_key = state
        .store()
        .get_user_api_key("admin")
        .await
        .unwrap()
        .expect("admin bootstrapped");

    TestApp {
        router: zyxnime::api::router(state.clone()),
        state,
        api_key,
        upload_dir,
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = spawn_app().await;
    let (status, body) = app.request("GET", "/api/health", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["database"], true);
    assert_eq!(body["data"]["storage"], "local");
}

#[tokio::test]
async fn test_admin_routes_require_credentials() {
    let app = spawn_app().await;
    let payload = json!({ "title": "Frieren", "description": "After the journey" });

    let (status, body) = app
        .request("POST", "/api/anime", false, Some(payload.clone()))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/anime")
                .header("X-Api-Key", "wrong-key")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/anime")
                .header(header::AUTHORIZATION, format!("Bearer {}", app.api_key))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    for (method, uri) in [
        ("DELETE", "/api/anime/some-id"),
        ("DELETE", "/api/comments/some-id"),
        ("POST", "/api/upload?filename=a.png&type=thumbnail"),
        ("GET", "/api/metrics"),
        ("GET", "/api/auth/me"),
    ] {
        let (status, _) = app.request(method, uri, false, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_anime_crud_flow() {
    let app = spawn_app().await;

    let (status, body) = app.request("GET", "/api/anime", false, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = app
        .request(
            "POST",
            "/api/anime",
            true,
            Some(json!({
                "title": "  Frieren  ",
                "description": "After the journey",
                "thumbnail": "https://cdn.test/frieren.png",
                "videos": ["https://cdn.test/ep1.mp4"]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let created = &body["data"];
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["title"], "Frieren");
    assert_eq!(created["videos"], json!(["https://cdn.test/ep1.mp4"]));
    assert_eq!(created["videoUrl"], r#"["https://cdn.test/ep1.mp4"]"#);
    assert_eq!(created["commentCount"], 0);

    let (status, body) = app
        .request("GET", &format!("/api/anime/{id}"), false, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["thumbnail"], "https://cdn.test/frieren.png");
    assert_eq!(body["data"]["comments"], json!([]));

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/anime/{id}"),
            true,
            Some(json!({ "title": "", "videoUrl": "https://cdn.test/ep2.mp4" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Frieren");
    assert_eq!(body["data"]["description"], "After the journey");
    assert_eq!(
        body["data"]["videos"],
        json!(["https://cdn.test/ep1.mp4", "https://cdn.test/ep2.mp4"])
    );

    let (status, body) = app
        .request(
            "PUT",
            &format!("/api/anime/{id}"),
            true,
            Some(json!({ "description": "Updated synopsis" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["description"], "Updated synopsis");
    assert_eq!(body["data"]["videos"].as_array().unwrap().len(), 2);

    let (status, _) = app
        .request("DELETE", &format!("/api/anime/{id}"), true, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request("GET", &format!("/api/anime/{id}"), false, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime not found");

    let (status, _) = app
        .request("DELETE", &format!("/api/anime/{id}"), true, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_is_newest_first_with_comment_counts() {
    let app = spawn_app().await;

    let first = app.create_anime("Older").await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = app.create_anime("Newer").await;

    let (status, _) = app
        .request(
            "POST",
            "/api/comments",
            false,
            Some(json!({ "name": "Ann", "content": "Great", "animeId": first["id"] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.request("GET", "/api/anime", false, None).await;
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second["id"]);
    assert_eq!(list[0]["commentCount"], 0);
    assert_eq!(list[1]["id"], first["id"]);
    assert_eq!(list[1]["commentCount"], 1);
}

#[tokio::test]
async fn test_create_anime_requires_title_and_description() {
    let app = spawn_app().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/anime",
            true,
            Some(json!({ "title": "   ", "description": "Something" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Title and description are required");

    let (status, _) = app
        .request("POST", "/api/anime", true, Some(json!({ "title": "Only title" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.request("GET", "/api/anime", false, None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_delete_video_index_wins_over_append() {
    let app = spawn_app().await;
    let (_, body) = app
        .request(
            "POST",
            "/api/anime",
            true,
            Some(json!({
                "title": "Mushishi",
                "description": "Ginko wanders",
                "videos": ["e1", "e2", "e3"]
            })),
        )
        .await;
    let id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/anime/{id}");

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            true,
            Some(json!({ "deleteVideoIndex": 1, "videoUrl": "e4" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], json!(["e1", "e3"]));

    let (status, body) = app
        .request("PUT", &uri, true, Some(json!({ "deleteVideoIndex": 7 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], json!(["e1", "e3"]));

    let (status, body) = app
        .request(
            "PUT",
            &uri,
            true,
            Some(json!({ "deleteVideoIndex": 7, "videoUrl": "e4" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], json!(["e1", "e3"]));

    let (status, body) = app
        .request("PUT", &uri, true, Some(json!({ "deleteVideoIndex": -1 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["videos"], json!(["e1", "e3"]));
}

#[tokio::test]
async fn test_update_missing_anime_is_not_found() {
    let app = spawn_app().await;
    let (status, _) = app
        .request(
            "PUT",
            "/api/anime/00000000-0000-0000-0000-000000000000",
            true,
            Some(json!({ "title": "Ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_anime_ids_are_not_found() {
    let app = spawn_app().await;
    let long_id = "a".repeat(80);

    for id in ["no_such_anime", "x.y", long_id.as_str()] {
        let uri = format!("/api/anime/{id}");

        let (status, body) = app.request("GET", &uri, false, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {uri}");
        assert_eq!(body["error"], "Anime not found");

        let (status, _) = app
            .request("PUT", &uri, true, Some(json!({ "title": "Ghost" })))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PUT {uri}");

        let (status, _) = app.request("DELETE", &uri, true, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {uri}");
    }
}

#[tokio::test]
async fn test_comments_flow() {
    let app = spawn_app().await;
    let anime = app.create_anime("Bocchi").await;
    let anime_id = anime["id"].as_str().unwrap();

    let (status, body) = app.request("GET", "/api/comments", false, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Anime ID is required");

    let (status, _) = app
        .request(
            "POST",
            "/api/comments",
            false,
            Some(json!({ "name": "Kita", "animeId": anime_id })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .request(
            "POST",
            "/api/comments",
            false,
            Some(json!({ "name": "Kita", "content": "Rock!", "animeId": "does-not-exist" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Anime not found");

    let (status, body) = app
        .request("GET", "/api/comments?animeId=does-not-exist", false, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    let (status, body) = app
        .request(
            "POST",
            "/api/comments",
            false,
            Some(json!({ "name": "Kita", "content": "First", "animeId": anime_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["animeId"], anime_id);
    let first_id = body["data"]["id"].as_str().unwrap().to_string();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, body) = app
        .request(
            "POST",
            "/api/comments",
            false,
            Some(json!({ "name": "Nijika", "content": "Second", "animeId": anime_id })),
        )
        .await;
    let second_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request("GET", &format!("/api/comments?animeId={anime_id}"), false, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["id"], second_id.as_str());
    assert_eq!(comments[1]["id"], first_id.as_str());

    let (status, _) = app
        .request("DELETE", &format!("/api/comments/{first_id}"), true, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .request("DELETE", &format!("/api/comments/{first_id}"), true, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app
        .request("GET", &format!("/api/anime/{anime_id}"), false, None)
        .await;
    assert_eq!(body["data"]["commentCount"], 1);
    assert_eq!(body["data"]["comments"][0]["content"], "Second");
}

#[tokio::test]
async fn test_deleting_anime_removes_its_comments() {
    let app = spawn_app().await;
    let anime = app.create_anime("Haikyuu").await;
    let anime_id = anime["id"].as_str().unwrap();

    app.request(
        "POST",
        "/api/comments",
        false,
        Some(json!({ "name": "Hinata", "content": "Jump", "animeId": anime_id })),
    )
    .await;

    let (status, _) = app
        .request("DELETE", &format!("/api/anime/{anime_id}"), true, None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request("GET", &format!("/api/comments?animeId={anime_id}"), false, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

async fn upload(app: &TestApp, query: &str, bytes: &'static [u8]) -> (StatusCode, Value) {
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/upload?{query}"))
                .header("X-Api-Key", &app.api_key)
                .header(header::CONTENT_TYPE, "application/octet-stream")
                .body(Body::from(bytes))
                .unwrap(),
        )
        .await
        .unwrap();
    read_json(response).await
}

#[tokio::test]
async fn test_upload_validation() {
    let app = spawn_app().await;

    let (status, body) = upload(&app, "filename=clip.avi&type=video", b"data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid video format. Use mp4, webm, or ogg");

    let (status, _) = upload(&app, "filename=cover.tiff&type=thumbnail", b"data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = upload(&app, "type=video", b"data").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Filename is required");

    let (status, _) = upload(&app, "filename=ep.mp4&type=video", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only the exact lowercase kinds carry an extension allow-list.
    let (status, body) = upload(&app, "filename=clip.avi&type=VIDEO", b"data").await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(
        body["data"]["pathname"]
            .as_str()
            .unwrap()
            .starts_with("other/")
    );
}

#[tokio::test]
async fn test_upload_to_local_storage_is_served() {
    let app = spawn_app().await;

    let (status, body) = upload(&app, "filename=Episode%201.mp4&type=video", b"fake-mp4").await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/video/"), "{url}");
    assert!(url.ends_with("-Episode_1.mp4"), "{url}");
    assert_eq!(body["data"]["downloadUrl"], url.as_str());

    let relative = url.trim_start_matches("/uploads/");
    let on_disk = std::fs::read(app.upload_dir.join(relative)).unwrap();
    assert_eq!(on_disk, b"fake-mp4");

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let served = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&served[..], b"fake-mp4");
}

#[tokio::test]
async fn test_session_login_and_password_change() {
    let app = spawn_app().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/auth/login",
            false,
            Some(json!({ "username": "admin", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": "admin", "password": "initial-password" }).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("session cookie")
        .to_string();
    let (_, body) = read_json(response).await;
    assert_eq!(body["data"]["apiKey"], app.api_key.as_str());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let (status, body) = read_json(response).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "admin");

    let (status, body) = app
        .request(
            "PUT",
            "/api/auth/password",
            true,
            Some(json!({ "currentPassword": "initial-password", "newPassword": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");

    let (status, _) = app
        .request(
            "PUT",
            "/api/auth/password",
            true,
            Some(json!({
                "currentPassword": "initial-password",
                "newPassword": "a-much-better-password"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    assert!(
        app.state
            .store()
            .verify_user_password("admin", "a-much-better-password")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_regenerated_api_key_replaces_old_one() {
    let app = spawn_app().await;

    let (status, body) = app
        .request("POST", "/api/auth/api-key/regenerate", true, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let new_key = body["data"]["apiKey"].as_str().unwrap().to_string();
    assert_ne!(new_key, app.api_key);

    let (status, _) = app.request("GET", "/api/auth/me", true, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("X-Api-Key", &new_key)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
