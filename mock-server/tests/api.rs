use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::Value;
use tower::ServiceExt;

const AUTH: &str = "Basic dXNlcjpwYXNz";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, AUTH)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_authorization_returns_401() {
    let resp = app()
        .oneshot(Request::builder().uri("/people").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- reads ---

#[tokio::test]
async fn people_are_enveloped() {
    let resp = app().oneshot(request("GET", "/people")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let people = body_json(resp).await;
    assert_eq!(people.as_array().unwrap().len(), 2);
    assert_eq!(people[0]["user"]["email"], "matt@example.com");
}

#[tokio::test]
async fn daily_filters_by_user() {
    let resp = app().oneshot(request("GET", "/daily?of_user=2")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let summary = body_json(resp).await;
    let entries = summary["day_entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], 502);
    assert_eq!(entries[0]["project_id"], "100");
}

#[tokio::test]
async fn timer_toggle_flips_running_state() {
    let resp = app().oneshot(request("GET", "/daily/timer/500")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let entry = body_json(resp).await;
    assert!(entry["timer_started_at"].is_null());
}

#[tokio::test]
async fn timer_toggle_unknown_returns_404() {
    let resp = app().oneshot(request("GET", "/daily/timer/9")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_client_not_found() {
    let resp = app().oneshot(request("GET", "/clients/999")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_client_bad_id_returns_400() {
    let resp = app().oneshot(request("GET", "/clients/not-a-number")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_client_returns_201_with_location() {
    let resp = app()
        .oneshot(json_request("POST", "/clients", r#"{"client":{"name":"Globex"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(resp.headers()[http::header::LOCATION], "/clients/13");
    assert!(body_bytes(resp).await.is_empty());
}

#[tokio::test]
async fn create_client_without_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/clients", r#"{"client":{"active":true}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_client_duplicate_name_returns_400() {
    let resp = app()
        .oneshot(json_request("POST", "/clients", r#"{"client":{"name":"Initech"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- update ---

#[tokio::test]
async fn update_client_not_found() {
    let resp = app()
        .oneshot(json_request("PUT", "/clients/999", r#"{"client":{"name":"Nope"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_client_applies_fields() {
    let resp = app()
        .oneshot(json_request("PUT", "/clients/12", r#"{"client":{"details":"HQ in Raccoon City"}}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let client = body_json(resp).await;
    assert_eq!(client["client"]["name"], "Umbrella");
    assert_eq!(client["client"]["details"], "HQ in Raccoon City");
}

// --- delete ---

#[tokio::test]
async fn delete_client_with_projects_returns_400() {
    let resp = app().oneshot(request("DELETE", "/clients/11")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_client_without_projects_returns_200() {
    let resp = app().oneshot(request("DELETE", "/clients/12")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
}

// --- toggle ---

#[tokio::test]
async fn toggle_client_with_active_projects_returns_400() {
    let resp = app().oneshot(request("POST", "/clients/10/toggle")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn toggle_client_with_inactive_projects_deactivates() {
    let resp = app().oneshot(request("POST", "/clients/11/toggle")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let client = body_json(resp).await;
    assert_eq!(client["client"]["active"], false);
}

// --- full client lifecycle ---

#[tokio::test]
async fn client_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/clients", r#"{"client":{"name":"Globex","currency":"Euro - EUR"}}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION].to_str().unwrap().to_string();

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &location))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched = body_json(resp).await;
    assert_eq!(fetched["client"]["name"], "Globex");
    assert_eq!(fetched["client"]["active"], true);

    // toggle off: no projects, so allowed
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("POST", &format!("{location}/toggle")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let toggled = body_json(resp).await;
    assert_eq!(toggled["client"]["active"], false);

    // list: seeded three plus the new one
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", "/clients"))
        .await
        .unwrap();
    let clients = body_json(resp).await;
    assert_eq!(clients.as_array().unwrap().len(), 4);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("DELETE", &location))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // get after delete: 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(request("GET", &location))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
