//! Shared plumbing of the two management screens.
//!
//! A [`ScreenCore`] owns one collection's [`ListStore`], the search term and
//! the selection, plus every request the screen has in flight. Requests run
//! as tokio tasks; their outcomes come back as [`Completion`]s over a channel
//! owned by the screen and are applied on the UI task. Dropping the core
//! aborts outstanding tasks and closes the channel, so nothing lands after
//! the screen is gone.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::Notice;
use crate::api::{RecordId, RemoteGateway, Resource};
use crate::error::TransportError;
use crate::search::{Searchable, filter};
use crate::store::{ListStore, RefreshTicket};

/// Outcome of one gateway call, delivered back to the owning screen.
#[derive(Debug)]
pub enum Completion<R: Resource> {
    Listed {
        ticket: RefreshTicket,
        result: Result<Vec<R>, TransportError>,
    },
    Created(Result<R, TransportError>),
    Updated {
        id: RecordId,
        result: Result<(), TransportError>,
    },
    Deleted {
        id: RecordId,
        result: Result<(), TransportError>,
    },
}

pub struct ScreenCore<R: Resource> {
    gateway: Arc<dyn RemoteGateway<R>>,
    pub store: ListStore<R>,
    pub search: String,
    pub selected: usize,
    tasks: JoinSet<()>,
    tx: mpsc::UnboundedSender<Completion<R>>,
    rx: mpsc::UnboundedReceiver<Completion<R>>,
    in_flight: usize,
}

impl<R: Resource + Searchable> ScreenCore<R> {
    pub fn new(gateway: Arc<dyn RemoteGateway<R>>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            store: ListStore::new(),
            search: String::new(),
            selected: 0,
            tasks: JoinSet::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Records currently shown, after the search term is applied.
    pub fn visible(&self) -> Vec<&R> {
        filter(self.store.items(), &self.search)
    }

    pub fn selected_record(&self) -> Option<&R> {
        self.visible().get(self.selected).copied()
    }

    pub fn clamp_selection(&mut self) {
        let len = self.visible().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn set_search(&mut self, term: String) {
        self.search = term;
        self.selected = 0;
    }

    pub fn move_by(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        let next = self.selected.saturating_add_signed(delta);
        self.selected = next.min(len - 1);
    }

    /// Number of requests issued whose outcome has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn refresh(&mut self) {
        let ticket = self.store.begin_refresh();
        let gateway = Arc::clone(&self.gateway);
        debug!(resource = R::PATH, "refresh requested");
        self.spawn(async move {
            let result = gateway.list().await;
            Completion::Listed { ticket, result }
        });
    }

    pub fn create(&mut self, draft: R::Draft) {
        let gateway = Arc::clone(&self.gateway);
        debug!(resource = R::PATH, ?draft, "create requested");
        self.spawn(async move { Completion::Created(gateway.create(&draft).await) });
    }

    pub fn update(&mut self, id: RecordId, draft: R::Draft) {
        let gateway = Arc::clone(&self.gateway);
        debug!(resource = R::PATH, %id, "update requested");
        self.spawn(async move {
            let result = gateway.update(&id, &draft).await;
            Completion::Updated { id, result }
        });
    }

    pub fn delete(&mut self, id: RecordId) {
        let gateway = Arc::clone(&self.gateway);
        debug!(resource = R::PATH, %id, "delete requested");
        self.spawn(async move {
            let result = gateway.delete(&id).await;
            Completion::Deleted { id, result }
        });
    }

    fn spawn<F>(&mut self, fut: F)
    where
        F: Future<Output = Completion<R>> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.tasks.spawn(async move {
            // Send only fails once the screen has been torn down.
            let _ = tx.send(fut.await);
        });
    }

    /// Next finished request, if any, without waiting.
    pub fn try_next(&mut self) -> Option<Completion<R>> {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Err(e) = joined {
                self.task_lost(&e);
            }
        }
        let completion = self.rx.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(completion)
    }

    /// Wait for the next finished request. Returns `None` when nothing is in flight.
    pub async fn next(&mut self) -> Option<Completion<R>> {
        while self.in_flight > 0 {
            tokio::select! {
                Some(completion) = self.rx.recv() => {
                    self.in_flight -= 1;
                    return Some(completion);
                }
                Some(joined) = self.tasks.join_next() => {
                    if let Err(e) = joined {
                        self.task_lost(&e);
                    }
                }
                else => break,
            }
        }
        None
    }

    // A task that panicked never reports back.
    fn task_lost(&mut self, error: &tokio::task::JoinError) {
        warn!(resource = R::PATH, error = %error, "request task failed");
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Apply a list response; returns a notice only when the fetch failed.
    pub fn apply_listed(
        &mut self,
        ticket: RefreshTicket,
        result: Result<Vec<R>, TransportError>,
    ) -> Option<Notice> {
        match self.store.apply_refresh(ticket, result) {
            Ok(_) => {
                self.clamp_selection();
                None
            }
            Err(e) => Some(Notice::error(format!("Error fetching {}s: {e}", R::NOUN))),
        }
    }
}

impl<R: Resource> Drop for ScreenCore<R> {
    fn drop(&mut self) {
        if self.in_flight > 0 {
            debug!(
                resource = R::PATH,
                pending = self.in_flight,
                "screen torn down; abandoning requests"
            );
        }
        self.tasks.abort_all();
        self.rx.close();
    }
}

/// Behaviour shared by the catalog and users screens.
pub trait ScreenController {
    type Record: Resource + Searchable;

    fn core(&self) -> &ScreenCore<Self::Record>;

    fn core_mut(&mut self) -> &mut ScreenCore<Self::Record>;

    /// Apply one finished request and report what the user should see.
    fn handle(&mut self, completion: Completion<Self::Record>) -> Option<Notice>;

    /// Apply every request that has already finished.
    fn poll(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Some(completion) = self.core_mut().try_next() {
            notices.extend(self.handle(completion));
        }
        notices
    }
}

/// Drive `screen` until no request is in flight, including follow-up
/// requests issued while handling earlier ones.
pub async fn settle<S: ScreenController>(screen: &mut S) -> Vec<Notice> {
    let mut notices = Vec::new();
    while let Some(completion) = screen.core_mut().next().await {
        notices.extend(screen.handle(completion));
    }
    notices
}
