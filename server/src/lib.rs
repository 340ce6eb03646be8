//! axum conveniences mirroring the client side, plus a small service that
//! exercises them.
//!
//! `Cased` / `SnakeJson` do key casing on the way out and in, `ApiError`
//! normalizes failures, and `log_responses` logs each response on the same
//! status-tiered targets the client uses. `app()` wires them into the
//! routes the client integration tests run against.

pub mod error;
pub mod json;
pub mod middleware;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

pub use error::ApiError;
pub use json::{Cased, SnakeJson};
pub use middleware::log_responses;

pub const BASIC_USER: &str = "courier";
pub const BASIC_PASSWORD: &str = "secret";
pub const BEARER_TOKEN: &str = "letmein";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub display_name: String,
    pub email_address: String,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub display_name: String,
    pub email_address: String,
}

pub type Db = Arc<RwLock<HashMap<u64, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/echo", post(echo).put(echo).patch(echo))
        .route("/inspect", any(inspect))
        .route("/status/{code}", any(status))
        .route("/redirect/{hops}", get(redirect))
        .route("/slow/{millis}", get(slow))
        .route("/auth/basic", get(basic_auth))
        .route("/auth/bearer", get(bearer_auth))
        .route("/text", get(text))
        .route("/bytes", get(bytes))
        .route("/empty", get(empty))
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user))
        .layer(axum::middleware::from_fn(log_responses))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Reply with the request body and content type, byte for byte.
async fn echo(headers: HeaderMap, body: Bytes) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| header::HeaderValue::from_static("application/octet-stream"));
    ([(header::CONTENT_TYPE, content_type)], body).into_response()
}

/// Describe the request as received. Keys are left alone so header names
/// come back verbatim.
async fn inspect(
    method: Method,
    headers: HeaderMap,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<Value> {
    let headers: HashMap<String, String> = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    Json(json!({
        "method": method.as_str(),
        "params": params,
        "headers": headers,
    }))
}

async fn status(Path(code): Path<u16>) -> Result<Response, ApiError> {
    let status = StatusCode::from_u16(code)
        .map_err(|_| ApiError::bad_request(format!("not a status code: {code}")))?;
    Ok(Cased::new(json!({"status_code": code})).status(status).into_response())
}

/// Redirect `hops` more times, then land on `/text`.
async fn redirect(Path(hops): Path<u32>) -> Redirect {
    if hops == 0 {
        Redirect::temporary("/text")
    } else {
        Redirect::temporary(&format!("/redirect/{}", hops - 1))
    }
}

async fn slow(Path(millis): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    "finally"
}

async fn basic_auth(headers: HeaderMap) -> Result<Cased<Value>, ApiError> {
    let credentials = authorization(&headers, "Basic ")
        .and_then(|encoded| STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .ok_or_else(|| ApiError::unauthorized("basic credentials required"))?;
    match credentials.split_once(':') {
        Some((user, password)) if user == BASIC_USER && password == BASIC_PASSWORD => {
            Ok(Cased::new(json!({"authenticated_user": user})))
        }
        _ => Err(ApiError::unauthorized("wrong username or password")),
    }
}

async fn bearer_auth(headers: HeaderMap) -> Result<Cased<Value>, ApiError> {
    match authorization(&headers, "Bearer ") {
        Some(token) if token == BEARER_TOKEN => Ok(Cased::new(json!({"token_valid": true}))),
        Some(_) => Err(ApiError::unauthorized("token rejected")),
        None => Err(ApiError::unauthorized("bearer token required")),
    }
}

fn authorization<'a>(headers: &'a HeaderMap, scheme: &str) -> Option<&'a str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(scheme)
}

async fn text() -> &'static str {
    "hello from courier"
}

async fn bytes() -> Vec<u8> {
    vec![0, 159, 146, 150]
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn create_user(
    State(db): State<Db>,
    SnakeJson(input): SnakeJson<NewUser>,
) -> Result<Cased<User>, ApiError> {
    if input.display_name.trim().is_empty() {
        return Err(ApiError::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "display name must not be blank",
        ));
    }
    let mut users = db.write().await;
    let user = User {
        id: users.len() as u64 + 1,
        display_name: input.display_name,
        email_address: input.email_address,
    };
    users.insert(user.id, user.clone());
    Ok(Cased::new(user).status(StatusCode::CREATED))
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Cased<User>, ApiError> {
    let users = db.read().await;
    users
        .get(&id)
        .cloned()
        .map(Cased::new)
        .ok_or_else(|| ApiError::not_found(format!("user {id} not found")))
}
