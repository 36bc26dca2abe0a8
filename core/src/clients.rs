//! Create, read, update, delete and toggle clients.
//!
//! Only works for accounts with the clients module enabled. Obtained from
//! `HarvestController::clients_controller`, so the credential and transport
//! are shared with the parent controller.

use crate::controller::{spawn_request, Session};
use crate::error::HarvestError;
use crate::types::Client;

#[derive(Clone)]
pub struct ClientsController {
    session: Session,
}

impl ClientsController {
    pub(crate) fn new(session: Session) -> Self {
        Self { session }
    }

    // -- blocking ---------------------------------------------------------

    /// Creates `client` on the server. Requires a name. Returns the new
    /// identifier when Harvest reports one.
    pub fn create_blocking(&self, client: &Client) -> Result<Option<u64>, HarvestError> {
        require_name(client)?;
        self.send_create(client)
    }

    fn send_create(&self, client: &Client) -> Result<Option<u64>, HarvestError> {
        let request = self.session.client.build_create_client(client)?;
        let response = self.session.execute(request)?;
        self.session.client.parse_create_client(response)
    }

    pub fn get_blocking(&self, id: u64) -> Result<Client, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_client(id))?;
        self.session.client.parse_client(response)
    }

    /// All clients on the account. Entries that fail to decode are skipped.
    pub fn get_clients_blocking(&self) -> Result<Vec<Client>, HarvestError> {
        let response = self.session.execute(self.session.client.build_get_clients())?;
        self.session.client.parse_clients_lenient(response)
    }

    /// Sends every writable field of `client`. Harvest does not document
    /// which ones it honours, so all of them are attempted.
    pub fn update_blocking(&self, client: &Client) -> Result<(), HarvestError> {
        let id = require_id(client)?;
        self.send_update(id, client)
    }

    fn send_update(&self, id: u64, client: &Client) -> Result<(), HarvestError> {
        let request = self.session.client.build_update_client(id, client)?;
        let response = self.session.execute(request)?;
        self.session.client.parse_update_client(response)
    }

    /// Fails with `HasProjectsOrInvoices` while projects or invoices still
    /// reference the client.
    pub fn delete_blocking(&self, client: &Client) -> Result<(), HarvestError> {
        let id = require_id(client)?;
        self.send_delete(id)
    }

    fn send_delete(&self, id: u64) -> Result<(), HarvestError> {
        let response = self.session.execute(self.session.client.build_delete_client(id))?;
        self.session.client.parse_delete_client(response)
    }

    /// Flips the client's active flag. Fails with `HasActiveProjects` while
    /// the client has active projects.
    pub fn toggle_blocking(&self, client: &Client) -> Result<(), HarvestError> {
        let id = require_id(client)?;
        self.send_toggle(id)
    }

    fn send_toggle(&self, id: u64) -> Result<(), HarvestError> {
        let response = self.session.execute(self.session.client.build_toggle_client(id))?;
        self.session.client.parse_toggle_client(response)
    }

    // -- callbacks --------------------------------------------------------

    pub fn create<C>(&self, client: &Client, completion: C)
    where
        C: FnOnce(Result<Option<u64>, HarvestError>) + Send + 'static,
    {
        if let Err(err) = require_name(client) {
            return completion(Err(err));
        }
        let this = self.clone();
        let client = client.clone();
        spawn_request(move || this.send_create(&client), completion);
    }

    pub fn get<C>(&self, id: u64, completion: C)
    where
        C: FnOnce(Result<Client, HarvestError>) + Send + 'static,
    {
        let this = self.clone();
        spawn_request(move || this.get_blocking(id), completion);
    }

    pub fn get_clients<C>(&self, completion: C)
    where
        C: FnOnce(Result<Vec<Client>, HarvestError>) + Send + 'static,
    {
        let this = self.clone();
        spawn_request(move || this.get_clients_blocking(), completion);
    }

    pub fn update<C>(&self, client: &Client, completion: C)
    where
        C: FnOnce(Result<(), HarvestError>) + Send + 'static,
    {
        let id = match require_id(client) {
            Ok(id) => id,
            Err(err) => return completion(Err(err)),
        };
        let this = self.clone();
        let client = client.clone();
        spawn_request(move || this.send_update(id, &client), completion);
    }

    pub fn delete<C>(&self, client: &Client, completion: C)
    where
        C: FnOnce(Result<(), HarvestError>) + Send + 'static,
    {
        let id = match require_id(client) {
            Ok(id) => id,
            Err(err) => return completion(Err(err)),
        };
        let this = self.clone();
        spawn_request(move || this.send_delete(id), completion);
    }

    pub fn toggle<C>(&self, client: &Client, completion: C)
    where
        C: FnOnce(Result<(), HarvestError>) + Send + 'static,
    {
        let id = match require_id(client) {
            Ok(id) => id,
            Err(err) => return completion(Err(err)),
        };
        let this = self.clone();
        spawn_request(move || this.send_toggle(id), completion);
    }
}

/// Only presence is checked; Harvest itself judges the content.
fn require_name(client: &Client) -> Result<(), HarvestError> {
    match client.name {
        Some(_) => Ok(()),
        None => Err(HarvestError::MissingName),
    }
}

fn require_id(client: &Client) -> Result<u64, HarvestError> {
    client.id.ok_or(HarvestError::MissingIdentifier("client"))
}
