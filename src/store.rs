//! Client-side cache of one remote collection.
//!
//! The store has no authority: every applied list response replaces the held
//! records wholesale. Refreshes are numbered so that a response which arrives
//! after a newer one has been applied (or after a local append) is dropped
//! instead of rolling the view back.

use tracing::debug;

use crate::api::{RecordId, RemoteGateway, Resource};
use crate::error::TransportError;

/// Token handed out by [`ListStore::begin_refresh`]; newer tickets compare greater.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket(u64);

#[derive(Clone, Debug)]
pub struct ListStore<R> {
    items: Vec<R>,
    issued: u64,
    applied: u64,
}

impl<R: Resource> ListStore<R> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            issued: 0,
            applied: 0,
        }
    }

    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&R> {
        self.items.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: &RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Reserve a ticket for a list request that is about to be issued.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Apply the outcome of a list request.
    ///
    /// Returns `Ok(true)` when the records were replaced and `Ok(false)` when
    /// the response was stale, whether it succeeded or not. Errors leave the
    /// records untouched.
    pub fn apply_refresh(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<R>, TransportError>,
    ) -> Result<bool, TransportError> {
        if ticket.0 <= self.applied {
            debug!(
                resource = R::PATH,
                ticket = ticket.0,
                applied = self.applied,
                "dropping stale list response"
            );
            return Ok(false);
        }
        let items = result?;
        self.applied = ticket.0;
        self.items = items;
        Ok(true)
    }

    /// Fetch the collection and replace the held records.
    pub async fn refresh(&mut self, gateway: &dyn RemoteGateway<R>) -> Result<bool, TransportError> {
        let ticket = self.begin_refresh();
        let result = gateway.list().await;
        self.apply_refresh(ticket, result)
    }

    /// Add a record locally without a round-trip.
    ///
    /// Any list request issued before this call predates the record and is
    /// treated as stale when it lands.
    pub fn append(&mut self, record: R) {
        self.applied = self.issued;
        self.items.push(record);
    }
}

impl<R: Resource> Default for ListStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
