#![allow(dead_code)]

use axum::{
    Json, Router,
    body::{Body, Bytes, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, Uri, header, request::Builder},
    response::{IntoResponse, Response},
    routing::{any, get},
};
use pathgate::{CredentialStore, GatewayState, api::ForwardingProxy, db::ENTITIES};
use serde_json::{Value, json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{net::SocketAddr, path::Path, time::Duration};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const TOKEN: &str = "abc123";
pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "wonderland";

/// Bytes the `/fixed` upstream route answers with.
pub const FIXED_BODY: &[u8] = &[0x00, 0x01, 0x7f, 0x80, 0xfe, 0xff, b'\n'];

pub struct Harness {
    pub app: Router,
    pub store: CredentialStore,
    pub upstream: SocketAddr,
    _dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_body_limit(1024 * 1024).await
    }

    pub async fn with_body_limit(body_limit: usize) -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("gateway.sqlite");
        let store = CredentialStore::open(db_path.to_str().expect("utf-8 path"), ENTITIES)
            .await
            .expect("open store");
        provision(&db_path, &[TOKEN], &[(USERNAME, PASSWORD)]).await;

        let proxy = ForwardingProxy::new(Duration::from_secs(5)).expect("http client");
        let app = pathgate::gateway_router(GatewayState::new(store.clone(), proxy), body_limit);
        let upstream = spawn_upstream().await;

        Self {
            app,
            store,
            upstream,
            _dir: dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.app.clone().oneshot(req).await.expect("router call")
    }

    /// Gateway path pointing at `path` on the test upstream.
    pub fn via(&self, path: &str) -> String {
        format!("/{}{}", self.upstream, path)
    }
}

/// Insert rows the way an operator would: through a separate connection.
pub async fn provision(db_path: &Path, tokens: &[&str], users: &[(&str, &str)]) {
    let opts = SqliteConnectOptions::new().filename(db_path);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(opts)
        .await
        .expect("provisioning connection");
    for token in tokens {
        sqlx::query("INSERT INTO tokens (token) VALUES (?)")
            .bind(*token)
            .execute(&pool)
            .await
            .expect("insert token");
    }
    for (username, password) in users {
        sqlx::query("INSERT INTO users (username, password) VALUES (?, ?)")
            .bind(*username)
            .bind(pathgate::db::hash_password(password))
            .execute(&pool)
            .await
            .expect("insert user");
    }
    pool.close().await;
}

pub fn request(method: Method, uri: &str, auth: Option<&str>) -> Builder {
    let builder = Request::builder().method(method).uri(uri);
    match auth {
        Some(value) => builder.header(header::AUTHORIZATION, value),
        None => builder,
    }
}

pub fn token_auth() -> String {
    format!("token {TOKEN}")
}

pub fn basic_auth(username: &str, password: &str) -> String {
    use base64::{Engine as _, engine::general_purpose::STANDARD};
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

pub async fn body_bytes(resp: Response) -> Bytes {
    to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body")
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_slice(&body_bytes(resp).await).expect("json body")
}

async fn spawn_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    let app = Router::new()
        .route("/", any(echo))
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/redirect", get(redirect))
        .route("/fixed", get(fixed));
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("upstream server");
    });
    addr
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Response {
    let read = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let payload = json!({
        "method": method.as_str(),
        "path": uri.path(),
        "query": uri.query(),
        "authorization": read(header::AUTHORIZATION),
        "content_type": read(header::CONTENT_TYPE),
        "x_client": read(header::HeaderName::from_static("x-client")),
        "body": String::from_utf8_lossy(&body),
    });
    ([("x-upstream", "echo")], Json(payload)).into_response()
}

async fn redirect() -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, "https://example.com/moved")],
    )
        .into_response()
}

async fn fixed() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        "application/octet-stream".parse().expect("header"),
    );
    headers.insert("x-upstream", "fixed".parse().expect("header"));
    headers.append(header::SET_COOKIE, "a=1".parse().expect("header"));
    headers.append(header::SET_COOKIE, "b=2".parse().expect("header"));
    (StatusCode::ACCEPTED, headers, Bytes::from_static(FIXED_BODY)).into_response()
}
