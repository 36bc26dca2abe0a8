//! Client SDK for the Harvest time-tracking API.
//!
//! # Overview
//! `HarvestController` authenticates against one account and fetches users,
//! today's timers, projects and clients; `ClientsController` adds client
//! CRUD. Responses are decoded into typed models (`User`, `Timer`,
//! `Project`, `Client`) and delivered either as a returned `Result` or to a
//! completion invoked exactly once.
//!
//! # Design
//! - `HarvestClient` is stateless: `build_*` produces an `HttpRequest`,
//!   `parse_*` consumes an `HttpResponse`.
//! - A `Transport` performs the round-trip; `UreqTransport` is the default.
//! - Status rules for client writes live in one function per endpoint
//!   (`create_status`, `update_status`, `delete_status`, `toggle_status`).

pub mod auth;
pub mod client;
pub mod clients;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use auth::Credential;
pub use client::{create_status, delete_status, toggle_status, update_status, HarvestClient};
pub use clients::ClientsController;
pub use config::HarvestConfig;
pub use controller::HarvestController;
pub use error::{ConfigError, HarvestError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError, UreqTransport};
pub use types::{Client, ClientBody, ClientEnvelope, Project, Resource, Timer, User};
