//! Entry point for talking to one Harvest account.
//!
//! # Design
//! `HarvestController` pairs a `HarvestClient` (request building and parsing)
//! with a `Transport` (the round-trip). Both live behind `Arc`s in a
//! `Session` that resource sub-controllers such as `ClientsController` share;
//! neither is mutated after construction.
//!
//! Every operation comes in two forms. The blocking form returns a `Result`
//! directly. The callback form never blocks: required fields are checked
//! first, and a missing one is reported to the completion immediately on the
//! caller's thread without any I/O. Otherwise the request runs on a worker
//! thread, which invokes the completion exactly once with the outcome.

use std::fmt;
use std::sync::Arc;
use std::thread;

use log::debug;

use crate::auth::Credential;
use crate::client::HarvestClient;
use crate::clients::ClientsController;
use crate::config::HarvestConfig;
use crate::error::HarvestError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Client, Project, Timer, User};

/// The request builder and transport shared by every controller of one
/// account.
#[derive(Clone)]
pub(crate) struct Session {
    pub(crate) client: Arc<HarvestClient>,
    transport: Arc<dyn Transport>,
}

impl Session {
    pub(crate) fn execute(&self, request: HttpRequest) -> Result<HttpResponse, HarvestError> {
        debug!("{} {}", request.method, request.url);
        let response = self.transport.execute(request)?;
        debug!("<- {}", response.status);
        Ok(response)
    }
}

/// Run `work` on a worker thread and hand its result to `completion`.
pub(crate) fn spawn_request<T, W, C>(work: W, completion: C)
where
    T: Send + 'static,
    W: FnOnce() -> Result<T, HarvestError> + Send + 'static,
    C: FnOnce(Result<T, HarvestError>) + Send + 'static,
{
    thread::spawn(move || completion(work()));
}

/// Users, timers, projects and clients for one Harvest account.
#[derive(Clone)]
pub struct HarvestController {
    session: Session,
}

impl HarvestController {
    /// Basic-auth controller for `https://{account_name}.harvestapp.com`.
    pub fn new(account_name: &str, username: &str, password: &str) -> Self {
        Self::with_credential(account_name, Credential::basic(username, password))
    }

    pub fn with_credential(account_name: &str, credential: Credential) -> Self {
        Self::from_config(&HarvestConfig::new(account_name, credential))
    }

    pub fn from_config(config: &HarvestConfig) -> Self {
        Self::with_transport(config, Arc::new(UreqTransport::new()))
    }

    pub fn with_transport(config: &HarvestConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            session: Session {
                client: Arc::new(HarvestClient::new(config)),
                transport,
            },
        }
    }

    /// Client CRUD, sharing this controller's credential and transport.
    pub fn clients_controller(&self) -> ClientsController {
        ClientsController::new(self.session.clone())
    }

    // -- blocking ---------------------------------------------------------

    pub fn users(&self) -> Result<Vec<User>, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_users())?;
        self.session.client.parse_users(response)
    }

    /// Today's timers for `user`. Fails with `MissingIdentifier` before any
    /// request when there is no user or it has no identifier.
    pub fn timers(&self, user: Option<&User>) -> Result<Vec<Timer>, HarvestError> {
        let user_id = user_id(user)?;
        self.timers_for(user_id)
    }

    fn timers_for(&self, user_id: u64) -> Result<Vec<Timer>, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_timers(user_id))?;
        self.session.client.parse_timers(response)
    }

    /// Starts a stopped timer or stops a running one, returning the timer as
    /// Harvest now reports it. Accounts using timestamp timers get a new
    /// entry with the same project, task and notes instead of a restart.
    pub fn toggle_timer(&self, timer: Option<&Timer>) -> Result<Timer, HarvestError> {
        let timer_id = timer_id(timer)?;
        self.toggle_timer_by_id(timer_id)
    }

    fn toggle_timer_by_id(&self, timer_id: u64) -> Result<Timer, HarvestError> {
        let response = self.session.execute(self.session.client.build_toggle_timer(timer_id))?;
        self.session.client.parse_toggle_timer(response)
    }

    pub fn projects(&self) -> Result<Vec<Project>, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_projects())?;
        self.session.client.parse_projects(response)
    }

    pub fn clients(&self) -> Result<Vec<Client>, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_clients())?;
        self.session.client.parse_clients(response)
    }

    // -- callbacks --------------------------------------------------------

    pub fn get_users<C>(&self, completion: C)
    where
        C: FnOnce(Result<Vec<User>, HarvestError>) + Send + 'static,
    {
        let this = self.clone();
        spawn_request(move || this.users(), completion);
    }

    pub fn get_timers<C>(&self, user: Option<&User>, completion: C)
    where
        C: FnOnce(Result<Vec<Timer>, HarvestError>) + Send + 'static,
    {
        let user_id = match user_id(user) {
            Ok(id) => id,
            Err(err) => return completion(Err(err)),
        };
        let this = self.clone();
        spawn_request(move || this.timers_for(user_id), completion);
    }

    pub fn toggle<C>(&self, timer: Option<&Timer>, completion: C)
    where
        C: FnOnce(Result<Timer, HarvestError>) + Send + 'static,
    {
        let timer_id = match timer_id(timer) {
            Ok(id) => id,
            Err(err) => return completion(Err(err)),
        };
        let this = self.clone();
        spawn_request(move || this.toggle_timer_by_id(timer_id), completion);
    }

    pub fn get_projects<C>(&self, completion: C)
    where
        C: FnOnce(Result<Vec<Project>, HarvestError>) + Send + 'static,
    {
        let this = self.clone();
        spawn_request(move || this.projects(), completion);
    }

    pub fn get_clients<C>(&self, completion: C)
    where
        C: FnOnce(Result<Vec<Client>, HarvestError>) + Send + 'static,
    {
        let this = self.clone();
        spawn_request(move || this.clients(), completion);
    }
}

impl fmt::Debug for HarvestController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarvestController")
            .field("base_url", &self.session.client.base_url())
            .finish_non_exhaustive()
    }
}

fn user_id(user: Option<&User>) -> Result<u64, HarvestError> {
    user.and_then(|user| user.id)
        .ok_or(HarvestError::MissingIdentifier("user"))
}

fn timer_id(timer: Option<&Timer>) -> Result<u64, HarvestError> {
    timer
        .and_then(|timer| timer.id)
        .ok_or(HarvestError::MissingIdentifier("timer"))
}
