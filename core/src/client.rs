//! Stateless HTTP request builder and response parser for the Harvest API.
//!
//! # Design
//! `HarvestClient` holds the base URL and the shared headers (credential and
//! `Accept`), both fixed at construction. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. The controllers run the round-trip in
//! between through a `Transport`, so everything here is deterministic and
//! testable without a network.
//!
//! Reads go through `check_read_status`. Client writes each have one
//! status-mapping function (`create_status`, `update_status`,
//! `delete_status`, `toggle_status`) that owns the endpoint's status rules.

use log::warn;
use serde::Serialize;
use serde_json::Value;

use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Client, Project, Resource, Timer, User};

/// Synchronous, stateless request builder for one Harvest account.
#[derive(Debug, Clone)]
pub struct HarvestClient {
    base_url: String,
    shared_headers: Vec<(String, String)>,
}

impl HarvestClient {
    pub fn new(config: &HarvestConfig) -> Self {
        Self {
            base_url: config.base_url(),
            shared_headers: vec![
                config.credential.to_header(),
                ("Accept".to_string(), "application/json".to_string()),
            ],
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}/{}", self.base_url, path),
            headers: self.shared_headers.clone(),
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> Result<HttpRequest, HarvestError> {
        let body = serde_json::to_string(body).map_err(|e| HarvestError::Serialization(e.to_string()))?;
        let mut request = self.request(method, path);
        request
            .headers
            .push(("Content-Type".to_string(), "application/json".to_string()));
        request.body = Some(body);
        Ok(request)
    }

    // -- users, timers, projects ------------------------------------------

    pub fn build_get_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "people")
    }

    pub fn build_get_timers(&self, user_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("daily?of_user={user_id}"))
    }

    pub fn build_toggle_timer(&self, timer_id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("daily/timer/{timer_id}"))
    }

    pub fn build_get_projects(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "projects")
    }

    pub fn parse_users(&self, response: HttpResponse) -> Result<Vec<User>, HarvestError> {
        check_read_status(&response)?;
        decode_list(decode_body(&response)?)
    }

    /// Extracts the `day_entries` array of a daily summary.
    pub fn parse_timers(&self, response: HttpResponse) -> Result<Vec<Timer>, HarvestError> {
        check_read_status(&response)?;
        match decode_body(&response)? {
            Value::Object(mut summary) => {
                let entries = summary
                    .remove("day_entries")
                    .ok_or_else(|| HarvestError::MalformedData("missing day_entries".to_string()))?;
                decode_list(entries)
            }
            _ => Err(HarvestError::MalformedData(
                "expected a daily summary object".to_string(),
            )),
        }
    }

    /// Only an exact 200 counts as a successful toggle.
    pub fn parse_toggle_timer(&self, response: HttpResponse) -> Result<Timer, HarvestError> {
        if response.status != 200 {
            return Err(HarvestError::UnexpectedResponseCode(response.status));
        }
        Timer::from_value(decode_body(&response)?)
    }

    pub fn parse_projects(&self, response: HttpResponse) -> Result<Vec<Project>, HarvestError> {
        check_read_status(&response)?;
        decode_list(decode_body(&response)?)
    }

    // -- clients ----------------------------------------------------------

    pub fn build_get_clients(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "clients")
    }

    pub fn build_get_client(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("clients/{id}"))
    }

    pub fn build_create_client(&self, client: &Client) -> Result<HttpRequest, HarvestError> {
        self.json_request(HttpMethod::Post, "clients", &client.to_request_body())
    }

    pub fn build_update_client(&self, id: u64, client: &Client) -> Result<HttpRequest, HarvestError> {
        self.json_request(HttpMethod::Put, &format!("clients/{id}"), &client.to_request_body())
    }

    pub fn build_delete_client(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("clients/{id}"))
    }

    pub fn build_toggle_client(&self, id: u64) -> HttpRequest {
        self.request(HttpMethod::Post, &format!("clients/{id}/toggle"))
    }

    /// Every element must decode; one bad entry fails the whole list.
    pub fn parse_clients(&self, response: HttpResponse) -> Result<Vec<Client>, HarvestError> {
        check_read_status(&response)?;
        decode_list(decode_body(&response)?)
    }

    /// Elements that fail to decode are dropped and logged; only a body that
    /// is not an array fails the call.
    pub fn parse_clients_lenient(&self, response: HttpResponse) -> Result<Vec<Client>, HarvestError> {
        check_read_status(&response)?;
        decode_list_lenient(decode_body(&response)?)
    }

    pub fn parse_client(&self, response: HttpResponse) -> Result<Client, HarvestError> {
        check_read_status(&response)?;
        Client::from_value(decode_body(&response)?)
    }

    /// Returns the new client's identifier when Harvest reports it in the
    /// `Location` header (`/clients/{id}`).
    pub fn parse_create_client(&self, response: HttpResponse) -> Result<Option<u64>, HarvestError> {
        create_status(response.status)?;
        Ok(created_id(&response))
    }

    pub fn parse_update_client(&self, response: HttpResponse) -> Result<(), HarvestError> {
        update_status(response.status)
    }

    pub fn parse_delete_client(&self, response: HttpResponse) -> Result<(), HarvestError> {
        delete_status(response.status)
    }

    pub fn parse_toggle_client(&self, response: HttpResponse) -> Result<(), HarvestError> {
        toggle_status(response.status)
    }
}

/// Map non-success read statuses to the appropriate `HarvestError` variant.
fn check_read_status(response: &HttpResponse) -> Result<(), HarvestError> {
    match response.status {
        200 => Ok(()),
        401 => {
            warn!("request rejected with 401, check the credential");
            Err(HarvestError::Unauthorized)
        }
        404 => {
            warn!("resource not found (404)");
            Err(HarvestError::NotFound)
        }
        status => {
            warn!("unexpected status {status} on read");
            Err(HarvestError::HttpError {
                status,
                body: response.body.clone(),
            })
        }
    }
}

/// `POST /clients` succeeds only with 201 Created.
pub fn create_status(status: u16) -> Result<(), HarvestError> {
    match status {
        201 => Ok(()),
        other => {
            warn!("client create answered {other}, expected 201");
            Err(HarvestError::UnexpectedResponseCode(other))
        }
    }
}

/// `PUT /clients/{id}` succeeds only with exactly 200.
pub fn update_status(status: u16) -> Result<(), HarvestError> {
    match status {
        200 => Ok(()),
        other => {
            warn!("client update answered {other}, expected 200");
            Err(HarvestError::UnexpectedResponseCode(other))
        }
    }
}

/// `DELETE /clients/{id}`: 400 means the client still has projects or
/// invoices attached.
pub fn delete_status(status: u16) -> Result<(), HarvestError> {
    match status {
        200 => Ok(()),
        400 => {
            warn!("client delete refused: projects or invoices attached");
            Err(HarvestError::HasProjectsOrInvoices)
        }
        other => {
            warn!("client delete answered {other}, expected 200");
            Err(HarvestError::UnexpectedResponseCode(other))
        }
    }
}

/// `POST /clients/{id}/toggle`: 400 means the client still has active
/// projects and cannot be deactivated.
pub fn toggle_status(status: u16) -> Result<(), HarvestError> {
    match status {
        200 => Ok(()),
        400 => {
            warn!("client toggle refused: active projects attached");
            Err(HarvestError::HasActiveProjects)
        }
        other => {
            warn!("client toggle answered {other}, expected 200");
            Err(HarvestError::UnexpectedResponseCode(other))
        }
    }
}

fn created_id(response: &HttpResponse) -> Option<u64> {
    let location = response
        .headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("location"))
        .map(|(_, value)| value.as_str())?;
    location.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

fn decode_body(response: &HttpResponse) -> Result<Value, HarvestError> {
    serde_json::from_str(&response.body).map_err(|e| HarvestError::MalformedData(e.to_string()))
}

fn decode_list<T: Resource>(value: Value) -> Result<Vec<T>, HarvestError> {
    match value {
        Value::Array(items) => items.into_iter().map(T::from_value).collect(),
        _ => Err(HarvestError::MalformedData(format!(
            "expected an array of {} objects",
            T::ENVELOPE
        ))),
    }
}

fn decode_list_lenient<T: Resource>(value: Value) -> Result<Vec<T>, HarvestError> {
    let Value::Array(items) = value else {
        return Err(HarvestError::MalformedData(format!(
            "expected an array of {} objects",
            T::ENVELOPE
        )));
    };
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match T::from_value(item) {
            Ok(model) => Some(model),
            Err(err) => {
                warn!("dropping malformed {} entry: {err}", T::ENVELOPE);
                None
            }
        })
        .collect();
    if decoded.len() < total {
        warn!("decoded {} of {total} {} entries", decoded.len(), T::ENVELOPE);
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::auth::Credential;

    fn client() -> HarvestClient {
        let config = HarvestConfig::new("acme", Credential::basic("user", "pass"));
        HarvestClient::new(&config)
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse::new(status, body)
    }

    #[test]
    fn every_request_carries_shared_headers() {
        let req = client().build_get_users();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://acme.harvestapp.com/people");
        assert_eq!(req.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(req.header("Accept"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn build_get_timers_targets_daily_summary() {
        let req = client().build_get_timers(42);
        assert_eq!(req.url, "https://acme.harvestapp.com/daily?of_user=42");
    }

    #[test]
    fn build_toggle_timer_is_a_get() {
        let req = client().build_toggle_timer(7);
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "https://acme.harvestapp.com/daily/timer/7");
    }

    #[test]
    fn build_create_client_serializes_envelope() {
        let req = client().build_create_client(&Client::named("Acme")).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://acme.harvestapp.com/clients");
        assert_eq!(req.header("content-type"), Some("application/json"));
        let body: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["client"]["name"], "Acme");
        assert!(body["client"].get("id").is_none());
    }

    #[test]
    fn build_update_client_puts_to_identifier() {
        let req = client().build_update_client(5, &Client::named("Acme")).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.url, "https://acme.harvestapp.com/clients/5");
    }

    #[test]
    fn build_toggle_client_posts_without_body() {
        let req = client().build_toggle_client(5);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://acme.harvestapp.com/clients/5/toggle");
        assert!(req.body.is_none());
    }

    #[test]
    fn parse_users_maps_every_element() {
        let users = client()
            .parse_users(response(200, r#"[{"user":{"id":1,"email":"a@b.c"}},{"id":2}]"#))
            .unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0].id, Some(1));
        assert_eq!(users[1].id, Some(2));
    }

    #[test]
    fn parse_users_bad_json_is_malformed() {
        let err = client().parse_users(response(200, "not json")).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedData(_)));
    }

    #[test]
    fn parse_users_object_instead_of_array_is_malformed() {
        let err = client().parse_users(response(200, r#"{"id":1}"#)).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedData(_)));
    }

    #[test]
    fn parse_timers_reads_day_entries() {
        let body = json!({
            "for_day": "2016-05-06",
            "day_entries": [{"id": 1, "hours": 1.5}, {"id": 2, "hours": 0.25}]
        });
        let timers = client().parse_timers(response(200, &body.to_string())).unwrap();
        assert_eq!(timers.len(), 2);
        assert_eq!(timers[1].hours, 0.25);
    }

    #[test]
    fn parse_users_tolerates_null_and_mistyped_fields() {
        let body = r#"[{"id":1,"is_admin":null,"telephone":5551234},{"id":2}]"#;
        let users = client().parse_users(response(200, body)).unwrap();
        assert_eq!(users.len(), 2);
        assert!(!users[0].is_admin);
        assert_eq!(users[0].telephone.as_deref(), Some("5551234"));
    }

    #[test]
    fn parse_timers_tolerates_null_hours() {
        let body = r#"{"day_entries":[{"id":1,"hours":null},{"id":2,"hours":1.0}]}"#;
        let timers = client().parse_timers(response(200, body)).unwrap();
        assert_eq!(timers.len(), 2);
        assert_eq!(timers[0].hours, 0.0);
    }

    #[test]
    fn parse_projects_tolerates_null_flags() {
        let body = r#"[{"id":1,"active":null,"billable":null},{"id":2}]"#;
        let projects = client().parse_projects(response(200, body)).unwrap();
        assert_eq!(projects.len(), 2);
        assert!(projects[0].active);
        assert!(!projects[0].billable);
    }

    #[test]
    fn parse_timers_without_day_entries_is_malformed() {
        let err = client().parse_timers(response(200, r#"{"for_day":"2016-05-06"}"#)).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedData(_)));
    }

    #[test]
    fn parse_toggle_timer_requires_exact_200() {
        let err = client().parse_toggle_timer(response(201, r#"{"id":1}"#)).unwrap_err();
        assert_eq!(err, HarvestError::UnexpectedResponseCode(201));
    }

    #[test]
    fn parse_read_maps_401_and_404() {
        assert_eq!(client().parse_projects(response(401, "")).unwrap_err(), HarvestError::Unauthorized);
        assert_eq!(client().parse_client(response(404, "")).unwrap_err(), HarvestError::NotFound);
        assert!(matches!(
            client().parse_clients(response(500, "boom")).unwrap_err(),
            HarvestError::HttpError { status: 500, .. }
        ));
    }

    #[test]
    fn parse_clients_lenient_drops_bad_entries() {
        let body = r#"[{"id":1,"name":"Acme"},"junk",{"id":"nope"},{"client":{"id":3,"name":"Initech"}}]"#;
        let clients = client().parse_clients_lenient(response(200, body)).unwrap();
        let ids: Vec<_> = clients.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![Some(1), Some(3)]);
    }

    #[test]
    fn parse_clients_strict_fails_on_bad_entry() {
        let body = r#"[{"id":1,"name":"Acme"},"junk"]"#;
        assert!(client().parse_clients(response(200, body)).is_err());
    }

    #[test]
    fn parse_client_non_object_is_malformed() {
        let err = client().parse_client(response(200, "[]")).unwrap_err();
        assert!(matches!(err, HarvestError::MalformedData(_)));
    }

    #[test]
    fn parse_create_client_reads_location() {
        let mut resp = response(201, "");
        resp.headers.push(("Location".to_string(), "/clients/3398386".to_string()));
        assert_eq!(client().parse_create_client(resp).unwrap(), Some(3398386));
        assert_eq!(client().parse_create_client(response(201, "")).unwrap(), None);
    }

    #[test]
    fn create_status_rejects_other_success_codes() {
        assert!(create_status(201).is_ok());
        assert_eq!(create_status(200), Err(HarvestError::UnexpectedResponseCode(200)));
    }

    #[test]
    fn update_status_requires_exact_200() {
        assert!(update_status(200).is_ok());
        assert_eq!(update_status(204), Err(HarvestError::UnexpectedResponseCode(204)));
    }

    #[test]
    fn delete_status_maps_conflict() {
        assert!(delete_status(200).is_ok());
        assert_eq!(delete_status(400), Err(HarvestError::HasProjectsOrInvoices));
        assert_eq!(delete_status(500), Err(HarvestError::UnexpectedResponseCode(500)));
    }

    #[test]
    fn toggle_status_maps_conflict() {
        assert!(toggle_status(200).is_ok());
        assert_eq!(toggle_status(400), Err(HarvestError::HasActiveProjects));
        assert_eq!(toggle_status(404), Err(HarvestError::UnexpectedResponseCode(404)));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let config = HarvestConfig::new("acme", Credential::basic("u", "p"))
            .with_base_url("http://localhost:3000/");
        let req = HarvestClient::new(&config).build_get_projects();
        assert_eq!(req.url, "http://localhost:3000/projects");
    }
}
