//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::{TimeZone, Utc};
use tokio::net::TcpListener;
use uuid::Uuid;

use quillpress::config::AppConfig;
use quillpress::lifecycle::startup::assemble;
use quillpress::lifecycle::Shutdown;
use quillpress::store::{Article, ArticleVersion, Asset, MemoryStore, Series, Topic, User};
use quillpress::{Application, HttpServer};

pub const PASSWORD: &str = "correct horse battery staple";
pub const PUBLISHED_SLUG: &str = "hello-world";
pub const DRAFT_SLUG: &str = "work-in-progress";
pub const ASSET_KEY: &str = "images/2024/cover.png";

/// Fixed identifiers of the seeded records.
pub struct Fixture {
    pub user_id: Uuid,
    pub version_id: Uuid,
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub app: Application,
    pub fixture: Fixture,
    pub admin_token: String,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

fn password_hash(password: &str) -> String {
    let salt = SaltString::encode_b64(b"quillpress-test-salt").unwrap();
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}

/// A store holding one published article, one draft with a version, a
/// series, a topic, an asset and an admin user.
pub fn seeded_store() -> (Arc<MemoryStore>, Fixture) {
    let store = MemoryStore::new();
    let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();

    let series_id = Uuid::new_v4();
    store.insert_series(Series {
        id: series_id,
        title: "Building a blog".into(),
        description: None,
        created_at: t0,
        updated_at: None,
    });
    store.insert_topic(Topic {
        id: Uuid::new_v4(),
        name: "rust".into(),
        description: Some("Systems programming".into()),
        created_at: t0,
        updated_at: None,
    });

    let published_id = Uuid::new_v4();
    store.insert_article(Article {
        id: published_id,
        slug: PUBLISHED_SLUG.into(),
        title: "Hello, world".into(),
        created_at: t0,
        updated_at: None,
        series_id: Some(series_id),
        series_order: Some(1),
        is_published: true,
    });
    let draft_id = Uuid::new_v4();
    store.insert_article(Article {
        id: draft_id,
        slug: DRAFT_SLUG.into(),
        title: "Not yet".into(),
        created_at: t1,
        updated_at: None,
        series_id: None,
        series_order: None,
        is_published: false,
    });

    let version_id = Uuid::new_v4();
    store.insert_version(ArticleVersion {
        id: version_id,
        article_id: draft_id,
        version_number: 1,
        content_markdown: Some("# Not yet".into()),
        ai_summary: None,
        ai_post_note: None,
        created_at: t1,
        is_published: false,
    });

    store.insert_asset(Asset {
        id: Uuid::new_v4(),
        filename: "cover.png".into(),
        bucket_key: ASSET_KEY.into(),
        mime_type: "image/png".into(),
        created_at: t0,
        reference_count: 1,
    });

    let user_id = Uuid::new_v4();
    store.insert_user(User {
        id: user_id,
        username: "editor".into(),
        email: "editor@example.com".into(),
        password_hash: password_hash(PASSWORD),
        created_at: t0,
        updated_at: None,
    });

    (Arc::new(store), Fixture { user_id, version_id })
}

/// Build the application over a freshly seeded store.
pub async fn seeded_app() -> (Application, Fixture, String) {
    let (store, fixture) = seeded_store();
    let mut config = AppConfig::default();
    config.store.database_url = "memory://".into();

    let app = assemble(config, store).unwrap();
    let token = app.services.admin.create_token(fixture.user_id).await.unwrap();
    (app, fixture, token)
}

/// Start a server over a seeded store on 127.0.0.1 with an ephemeral port.
pub async fn spawn_server() -> TestServer {
    let (app, fixture, admin_token) = seeded_app().await;

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(&app);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        addr,
        app,
        fixture,
        admin_token,
        shutdown,
    }
}
