//! Error types for the Harvest API client.
//!
//! # Design
//! Two channels feed `HarvestError`. Transport failures are wrapped unchanged
//! in `Transport`. Everything else is built locally, either before a request
//! is sent (`MissingName`, `MissingIdentifier`) or from the response status
//! and body. Conflict states such as `HasProjectsOrInvoices` are inferred from
//! the status code alone; Harvest does not give a machine-readable reason.

use thiserror::Error;

use crate::transport::TransportError;

/// Errors delivered to completions and returned by the blocking operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HarvestError {
    /// The HTTP layer never produced a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A client was sent for creation without a name.
    #[error("client has no name")]
    MissingName,

    /// The resource (or the user/timer an operation needs) has no identifier.
    #[error("{0} has no identifier")]
    MissingIdentifier(&'static str),

    /// The response body could not be decoded into the expected shape.
    #[error("malformed response data: {0}")]
    MalformedData(String),

    /// A write endpoint answered with a status other than the one it promises.
    #[error("unexpected response code {0}")]
    UnexpectedResponseCode(u16),

    /// Harvest refused to delete a client (HTTP 400).
    #[error("client has associated projects or invoices")]
    HasProjectsOrInvoices,

    /// Harvest refused to toggle a client (HTTP 400).
    #[error("client has active projects")]
    HasActiveProjects,

    /// The credential was rejected (HTTP 401).
    #[error("credentials rejected")]
    Unauthorized,

    /// HTTP 404 on a read.
    #[error("resource not found")]
    NotFound,

    /// Any other non-200 status on a read.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// A request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Errors raised while assembling a `HarvestConfig`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),

    #[error("environment variable {0} is empty")]
    EmptyVar(&'static str),
}
