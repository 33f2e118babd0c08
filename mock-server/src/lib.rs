//! HTTP endpoints the request lifecycle is exercised against.

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub name: String,
}

/// Body of a create or a replace.
#[derive(Deserialize)]
pub struct ItemInput {
    pub name: String,
}

/// In-memory items, shared by the handlers.
#[derive(Clone, Default)]
pub struct Store {
    items: Arc<RwLock<HashMap<Uuid, Item>>>,
}

/// `caf\u{e9}` in ISO-8859-1; not valid UTF-8.
pub const LATIN1_BODY: &[u8] = b"caf\xe9";

pub fn app() -> Router {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route("/items/{id}", put(replace_item).delete(remove_item))
        .route("/text", get(text))
        .route("/latin1", get(latin1))
        .route("/malformed", get(malformed))
        .route("/headers", get(echo_headers))
        .route("/echo", post(echo_body).put(echo_body).patch(echo_body))
        .route("/status/{code}", get(status))
        .with_state(Store::default())
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_items(State(store): State<Store>) -> Json<Vec<Item>> {
    Json(store.items.read().await.values().cloned().collect())
}

async fn create_item(
    State(store): State<Store>,
    Json(input): Json<ItemInput>,
) -> (StatusCode, Json<Item>) {
    let item = Item {
        id: Uuid::new_v4(),
        name: input.name,
    };
    store.items.write().await.insert(item.id, item.clone());
    (StatusCode::CREATED, Json(item))
}

async fn replace_item(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
    Json(input): Json<ItemInput>,
) -> Result<Json<Item>, StatusCode> {
    let mut items = store.items.write().await;
    let item = items.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    item.name = input.name;
    Ok(Json(item.clone()))
}

async fn remove_item(
    State(store): State<Store>,
    Path(id): Path<Uuid>,
) -> Result<Json<Item>, StatusCode> {
    store
        .items
        .write()
        .await
        .remove(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn text() -> &'static str {
    "hello"
}

async fn latin1() -> Vec<u8> {
    LATIN1_BODY.to_vec()
}

async fn malformed() -> &'static str {
    "{not json"
}

/// Request headers as a JSON object, names lower-cased.
async fn echo_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect(),
    )
}

async fn echo_body(body: String) -> String {
    body
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}
