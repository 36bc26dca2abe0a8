//! Domain models for the Harvest resources this crate reads and writes.
//!
//! # Design
//! Every model is a plain value decoded from one JSON object. Fields Harvest
//! may omit are `Option`s or carry a serde default, so a sparse object still
//! decodes. Harvest's v1 API wraps each resource in an envelope named after
//! it (`{"client": {...}}`); `Resource::from_value` accepts both the wrapped
//! and the flat form.
//!
//! Only identifiers are decoded strictly. A descriptive field that arrives as
//! `null` or with an unexpected JSON type falls back to its default, so one
//! odd field never fails a whole list.

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HarvestError;

/// A model decoded from a single JSON object.
pub trait Resource: DeserializeOwned {
    /// Envelope key used by the API, e.g. `"client"`.
    const ENVELOPE: &'static str;

    /// Decode one element of a response. Anything that is not a JSON object
    /// (after unwrapping the envelope) is malformed.
    fn from_value(value: Value) -> Result<Self, HarvestError> {
        let value = unwrap_envelope(value, Self::ENVELOPE);
        if !value.is_object() {
            return Err(HarvestError::MalformedData(format!(
                "expected a {} object",
                Self::ENVELOPE
            )));
        }
        serde_json::from_value(value).map_err(|e| HarvestError::MalformedData(e.to_string()))
    }
}

/// Strip `{"<key>": {...}}` down to the inner object. Other values pass
/// through untouched.
pub fn unwrap_envelope(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut map) if map.len() == 1 && map.get(key).is_some_and(Value::is_object) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Harvest sends some identifiers as strings (`"project_id": "42"`).
fn flexible_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Number(u64),
        Text(String),
    }

    match Option::<RawId>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawId::Number(id)) => Ok(Some(id)),
        Some(RawId::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawId::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// A flag that may be `null`, absent, or mistyped. Anything but a JSON
/// boolean reads as `false`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or_default())
}

/// Like `lenient_flag`, but anything but a JSON boolean reads as `true`.
fn lenient_flag_or_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool().unwrap_or(true))
}

/// Numbers and booleans keep their JSON spelling. Objects and arrays are dropped.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// Accepts numbers and numeric strings (`"hours": "0.8"`).
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_hours<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_number(deserializer)?.unwrap_or_default())
}

fn default_true() -> bool {
    true
}

/// A person on the account (`GET /people`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct User {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub first_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub telephone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timezone: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_admin: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub is_contractor: bool,
    #[serde(default, deserialize_with = "lenient_number")]
    pub default_hourly_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

impl User {
    /// First and last name joined by a space, skipping whichever is missing.
    pub fn display_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

impl Resource for User {
    const ENVELOPE: &'static str = "user";
}

/// A day entry, running or stopped (`GET /daily`, `GET /daily/timer/{id}`).
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Timer {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub user_id: Option<u64>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub project_id: Option<u64>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub task_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub project: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub task: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub client: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_hours")]
    pub hours: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hours_without_timer: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub spent_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub timer_started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub started_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub ended_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

impl Timer {
    pub fn is_running(&self) -> bool {
        self.timer_started_at.is_some()
    }
}

impl Resource for Timer {
    const ENVELOPE: &'static str = "day_entry";
}

/// A project on the account (`GET /projects`).
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Project {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub client_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bill_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub budget_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub budget: Option<f64>,
    #[serde(default = "default_true", deserialize_with = "lenient_flag_or_true")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub billable: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

impl Resource for Project {
    const ENVELOPE: &'static str = "project";
}

/// A client of the account (`/clients`).
///
/// `id` stays `None` until the client has been created on the server; `name`
/// is the one field creation requires.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Client {
    #[serde(default, deserialize_with = "flexible_id")]
    pub id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default = "default_true", deserialize_with = "lenient_flag_or_true")]
    pub active: bool,
    #[serde(default, deserialize_with = "lenient_text")]
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub currency_symbol: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub details: Option<String>,
    #[serde(default, deserialize_with = "flexible_id")]
    pub highrise_id: Option<u64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub updated_at: Option<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            active: true,
            currency: None,
            currency_symbol: None,
            details: None,
            highrise_id: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Client {
    /// A new, unsaved client with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// The writable fields wrapped in the `client` envelope, ready to send
    /// with `POST /clients` or `PUT /clients/{id}`. Read-only fields such as
    /// `id` and the timestamps are left out.
    pub fn to_request_body(&self) -> ClientEnvelope<'_> {
        ClientEnvelope {
            client: ClientBody {
                name: self.name.as_deref(),
                active: self.active,
                currency: self.currency.as_deref(),
                currency_symbol: self.currency_symbol.as_deref(),
                details: self.details.as_deref(),
                highrise_id: self.highrise_id,
            },
        }
    }
}

impl Resource for Client {
    const ENVELOPE: &'static str = "client";
}

/// Request body for client writes: `{"client": {...}}`.
#[derive(Debug, Serialize)]
pub struct ClientEnvelope<'a> {
    pub client: ClientBody<'a>,
}

/// The writable subset of `Client`. `active` is always sent.
#[derive(Debug, Serialize)]
pub struct ClientBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<&'a str>,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_symbol: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highrise_id: Option<u64>,
}
