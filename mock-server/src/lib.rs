//! In-memory stand-in for the Harvest v1 endpoints the SDK consumes.
//!
//! Resources are wrapped in their v1 envelopes (`{"client": {...}}`) and the
//! status codes follow Harvest: 201 + `Location` on create, 400 when a client
//! cannot be deleted or deactivated, 401 without an `Authorization` header.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const FOR_DAY: &str = "2016-05-06";
pub const TIMER_STARTED_AT: &str = "2016-05-06T09:00:00Z";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_admin: bool,
    pub is_active: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub client_id: u64,
    pub name: String,
    pub active: bool,
    pub billable: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
    pub id: u64,
    pub name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// A day entry. `project_id` is a string, as Harvest sends it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DayEntry {
    pub id: u64,
    pub user_id: u64,
    pub project_id: String,
    pub project: String,
    pub task: String,
    pub notes: String,
    pub hours: f64,
    pub spent_at: String,
    pub timer_started_at: Option<String>,
}

/// Writable client fields, as sent by `POST /clients` and `PUT /clients/{id}`.
#[derive(Debug, Deserialize)]
pub struct ClientInput {
    pub name: Option<String>,
    pub active: Option<bool>,
    pub currency: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ClientEnvelope {
    pub client: ClientInput,
}

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub of_user: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Store {
    pub people: Vec<Person>,
    pub projects: Vec<Project>,
    pub clients: BTreeMap<u64, Client>,
    pub entries: Vec<DayEntry>,
    next_client_id: u64,
}

impl Store {
    /// Two people, three clients, two projects and three day entries.
    ///
    /// Client 10 has an active project, client 11 only an inactive one and
    /// client 12 none, so every delete/toggle outcome is reachable.
    pub fn seeded() -> Self {
        let person = |id, email: &str, first: &str, last: &str, is_admin| Person {
            id,
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_admin,
            is_active: true,
        };
        let client = |id, name: &str| Client {
            id,
            name: name.to_string(),
            active: true,
            currency: Some("United States Dollars - USD".to_string()),
            details: None,
        };
        let entry = |id, user_id, hours, running: bool| DayEntry {
            id,
            user_id,
            project_id: "100".to_string(),
            project: "Website".to_string(),
            task: "Design".to_string(),
            notes: format!("entry {id}"),
            hours,
            spent_at: FOR_DAY.to_string(),
            timer_started_at: running.then(|| TIMER_STARTED_AT.to_string()),
        };

        Store {
            people: vec![
                person(1, "matt@example.com", "Matt", "Cheetham", true),
                person(2, "jane@example.com", "Jane", "Doe", false),
            ],
            projects: vec![
                Project {
                    id: 100,
                    client_id: 10,
                    name: "Website".to_string(),
                    active: true,
                    billable: true,
                },
                Project {
                    id: 101,
                    client_id: 11,
                    name: "TPS Reports".to_string(),
                    active: false,
                    billable: false,
                },
            ],
            clients: [client(10, "Acme Corp"), client(11, "Initech"), client(12, "Umbrella")]
                .into_iter()
                .map(|c| (c.id, c))
                .collect(),
            entries: vec![entry(500, 1, 1.5, true), entry(501, 1, 0.5, false), entry(502, 2, 2.0, false)],
            next_client_id: 13,
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/people", get(list_people))
        .route("/daily", get(daily))
        .route("/daily/timer/{id}", get(toggle_timer))
        .route("/projects", get(list_projects))
        .route("/clients", get(list_clients).post(create_client))
        .route("/clients/{id}", get(get_client).put(update_client).delete(delete_client))
        .route("/clients/{id}/toggle", post(toggle_client))
        .layer(middleware::from_fn(require_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("mock harvest listening on {addr}");
    }
    axum::serve(listener, app()).await
}

async fn require_auth(request: Request, next: Next) -> Response {
    if request.headers().contains_key(header::AUTHORIZATION) {
        next.run(request).await
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

fn envelope<T: Serialize>(key: &str, value: &T) -> Value {
    let mut wrapped = Map::new();
    wrapped.insert(key.to_string(), serde_json::to_value(value).unwrap_or(Value::Null));
    Value::Object(wrapped)
}

async fn list_people(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(store.people.iter().map(|p| envelope("user", p)).collect())
}

async fn daily(State(db): State<Db>, Query(query): Query<DailyQuery>) -> Json<Value> {
    let store = db.read().await;
    let entries: Vec<&DayEntry> = store
        .entries
        .iter()
        .filter(|e| query.of_user.is_none_or(|user| e.user_id == user))
        .collect();
    Json(json!({ "for_day": FOR_DAY, "day_entries": entries }))
}

async fn toggle_timer(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<DayEntry>, StatusCode> {
    let mut store = db.write().await;
    let entry = store
        .entries
        .iter_mut()
        .find(|e| e.id == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    entry.timer_started_at = match entry.timer_started_at {
        Some(_) => None,
        None => Some(TIMER_STARTED_AT.to_string()),
    };
    Ok(Json(entry.clone()))
}

async fn list_projects(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(store.projects.iter().map(|p| envelope("project", p)).collect())
}

async fn list_clients(State(db): State<Db>) -> Json<Vec<Value>> {
    let store = db.read().await;
    Json(store.clients.values().map(|c| envelope("client", c)).collect())
}

async fn get_client(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store
        .clients
        .get(&id)
        .map(|c| Json(envelope("client", c)))
        .ok_or(StatusCode::NOT_FOUND)
}

async fn create_client(State(db): State<Db>, Json(input): Json<ClientEnvelope>) -> Response {
    let input = input.client;
    let Some(name) = input.name.filter(|n| !n.trim().is_empty()) else {
        return StatusCode::BAD_REQUEST.into_response();
    };
    let mut store = db.write().await;
    if store.clients.values().any(|c| c.name == name) {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let id = store.next_client_id;
    store.next_client_id += 1;
    store.clients.insert(
        id,
        Client {
            id,
            name,
            active: input.active.unwrap_or(true),
            currency: input.currency,
            details: input.details,
        },
    );
    (StatusCode::CREATED, [(header::LOCATION, format!("/clients/{id}"))]).into_response()
}

async fn update_client(
    State(db): State<Db>,
    Path(id): Path<u64>,
    Json(input): Json<ClientEnvelope>,
) -> Result<Json<Value>, StatusCode> {
    let input = input.client;
    let mut store = db.write().await;
    let client = store.clients.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        client.name = name;
    }
    if let Some(active) = input.active {
        client.active = active;
    }
    if input.currency.is_some() {
        client.currency = input.currency;
    }
    if input.details.is_some() {
        client.details = input.details;
    }
    Ok(Json(envelope("client", &*client)))
}

async fn delete_client(State(db): State<Db>, Path(id): Path<u64>) -> StatusCode {
    let mut store = db.write().await;
    if !store.clients.contains_key(&id) {
        return StatusCode::NOT_FOUND;
    }
    if store.projects.iter().any(|p| p.client_id == id) {
        return StatusCode::BAD_REQUEST;
    }
    store.clients.remove(&id);
    StatusCode::OK
}

async fn toggle_client(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let has_active_projects = store.projects.iter().any(|p| p.client_id == id && p.active);
    let client = store.clients.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if client.active && has_active_projects {
        return Err(StatusCode::BAD_REQUEST);
    }
    client.active = !client.active;
    Ok(Json(envelope("client", &*client)))
}
