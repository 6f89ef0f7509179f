use axum::body::Bytes;
use wiremock::matchers::{header, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zyxnime::config::{SecurityConfig, StorageConfig};
use zyxnime::db::Store;
use zyxnime::domain::VideoList;
use zyxnime::models::anime::{AnimeChanges, NewAnime, VideoListWrite};
use zyxnime::services::storage::{BlobStorage, StorageBackend, StorageError};
use zyxnime::services::{UploadKind, UploadService};

async fn setup_store() -> Store {
    let root = std::env::temp_dir().join(format!("zyxnime-store-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&root).unwrap();
    let url = format!("sqlite:{}", root.join("store.db").display());

    let security = SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    };
    Store::with_pool_options(&url, 5, 1, security)
        .await
        .expect("Failed to open store")
}

fn new_anime(title: &str, videos: &[&str]) -> NewAnime {
    NewAnime {
        title: title.to_string(),
        description: format!("{title} synopsis"),
        thumbnail: None,
        videos: VideoList::from(videos.iter().map(ToString::to_string).collect::<Vec<_>>()),
    }
}

#[tokio::test]
async fn test_new_anime_stores_encoded_list() {
    let store = setup_store().await;

    let empty = store.add_anime(new_anime("Empty", &[])).await.unwrap();
    assert_eq!(empty.video_url.as_deref(), Some("[]"));

    let seeded = store.add_anime(new_anime("Seeded", &["a", "b"])).await.unwrap();
    let fetched = store.get_anime(&seeded.id).await.unwrap().unwrap();
    assert_eq!(fetched.video_url.as_deref(), Some(r#"["a","b"]"#));
    assert_eq!(fetched.videos().as_slice(), ["a", "b"]);
}

#[tokio::test]
async fn test_stale_video_list_write_is_rejected() {
    let store = setup_store().await;
    let anime = store.add_anime(new_anime("Race", &["e1"])).await.unwrap();

    let first = VideoListWrite {
        expected: anime.video_url.clone(),
        new: r#"["e1","e2"]"#.to_string(),
    };
    assert!(
        store
            .update_anime(&anime.id, AnimeChanges::default(), Some(first))
            .await
            .unwrap()
    );

    // Second writer read the list before the first write landed.
    let stale = VideoListWrite {
        expected: anime.video_url.clone(),
        new: r#"["e1","e3"]"#.to_string(),
    };
    let changes = AnimeChanges {
        title: Some("Should not apply".to_string()),
        ..Default::default()
    };
    assert!(
        !store
            .update_anime(&anime.id, changes, Some(stale))
            .await
            .unwrap()
    );

    let current = store.get_anime(&anime.id).await.unwrap().unwrap();
    assert_eq!(current.videos().as_slice(), ["e1", "e2"]);
    assert_eq!(current.title, "Race");
    assert!(store.anime_exists(&anime.id).await.unwrap());
}

#[tokio::test]
async fn test_metadata_update_without_video_write() {
    let store = setup_store().await;
    let anime = store.add_anime(new_anime("Before", &["e1"])).await.unwrap();

    let changes = AnimeChanges {
        title: Some("After".to_string()),
        thumbnail: Some("https://cdn.test/t.png".to_string()),
        ..Default::default()
    };
    assert!(store.update_anime(&anime.id, changes, None).await.unwrap());

    let current = store.get_anime(&anime.id).await.unwrap().unwrap();
    assert_eq!(current.title, "After");
    assert_eq!(current.description, "Before synopsis");
    assert_eq!(current.thumbnail.as_deref(), Some("https://cdn.test/t.png"));
    assert_eq!(current.video_url, anime.video_url);
    assert_eq!(current.created_at, anime.created_at);
}

#[tokio::test]
async fn test_remove_anime_cascades_comments() {
    let store = setup_store().await;
    let keep = store.add_anime(new_anime("Keep", &[])).await.unwrap();
    let gone = store.add_anime(new_anime("Drop", &[])).await.unwrap();

    store
        .add_comment(&keep.id, "a".to_string(), "stays".to_string())
        .await
        .unwrap();
    store
        .add_comment(&gone.id, "b".to_string(), "goes".to_string())
        .await
        .unwrap();
    store
        .add_comment(&gone.id, "c".to_string(), "goes too".to_string())
        .await
        .unwrap();

    let counts = store
        .get_comment_counts_for_anime_ids(&[keep.id.clone(), gone.id.clone()])
        .await
        .unwrap();
    assert_eq!(counts.get(&gone.id), Some(&2));

    assert!(store.remove_anime(&gone.id).await.unwrap());
    assert!(!store.remove_anime(&gone.id).await.unwrap());

    assert!(store.list_comments(&gone.id).await.unwrap().is_empty());
    assert_eq!(store.list_comments(&keep.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_bootstrap_runs_once() {
    let store = setup_store().await;

    assert!(
        store
            .ensure_admin_user("admin", "first-password")
            .await
            .unwrap()
    );
    assert!(
        !store
            .ensure_admin_user("other", "second-password")
            .await
            .unwrap()
    );

    assert!(store.get_user_by_username("other").await.unwrap().is_none());
    assert!(
        store
            .verify_user_password("admin", "first-password")
            .await
            .unwrap()
    );

    let key = store.get_user_api_key("admin").await.unwrap().unwrap();
    let user = store.verify_api_key(&key).await.unwrap().unwrap();
    assert_eq!(user.username, "admin");
    assert!(store.verify_api_key("").await.unwrap().is_none());
}

fn blob_config(server: &MockServer) -> StorageConfig {
    StorageConfig {
        blob_token: "test-token".to_string(),
        blob_api_url: server.uri(),
        ..StorageConfig::default()
    }
}

#[tokio::test]
async fn test_blob_upload_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path_regex(r"^/video/\d+-ep_1\.mp4$"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("x-content-type", "video/mp4"))
        .and(header("x-api-version", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "url": "https://blob.test/video/ep_1.mp4",
            "downloadUrl": "https://blob.test/video/ep_1.mp4?download=1",
            "pathname": "video/ep_1.mp4"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = UploadService::from_config(&blob_config(&server)).unwrap();
    assert_eq!(service.backend_name(), "blob");

    let result = service
        .upload(Some("ep 1.mp4"), UploadKind::Video, Bytes::from_static(b"mp4"))
        .await
        .unwrap();

    assert_eq!(result.url, "https://blob.test/video/ep_1.mp4");
    assert_eq!(
        result.download_url,
        "https://blob.test/video/ep_1.mp4?download=1"
    );
    assert_eq!(result.content_type, "video/mp4");
}

#[tokio::test]
async fn test_blob_download_url_falls_back_to_query_flag() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "url": "https://blob.test/other/x.bin" })),
        )
        .mount(&server)
        .await;

    let blob = BlobStorage::new(&blob_config(&server)).unwrap();
    let stored = blob
        .put(
            "other/1-x.bin",
            Bytes::from_static(b"x"),
            "application/octet-stream",
        )
        .await
        .unwrap();
    assert_eq!(stored.download_url, "https://blob.test/other/x.bin?download=1");
}

#[tokio::test]
async fn test_blob_rejection_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Invalid token"))
        .mount(&server)
        .await;

    let blob = BlobStorage::new(&blob_config(&server)).unwrap();
    let err = blob
        .put("thumbnail/1-a.png", Bytes::from_static(b"x"), "image/png")
        .await
        .unwrap_err();
    assert!(
        matches!(err, StorageError::Rejected { status: 403, ref message } if message == "Invalid token")
    );
}
