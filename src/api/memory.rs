//! In-process backing store implementing [`RemoteGateway`].
//!
//! Records are kept as JSON objects per collection path and go through the
//! same serde round-trip as HTTP responses do. Ids are assigned from one
//! monotonically increasing counter shared by every collection.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{BookDraft, RecordId, RemoteGateway, Resource, UserDraft};
use crate::error::TransportError;

#[derive(Debug)]
pub struct MemoryGateway {
    collections: Mutex<HashMap<&'static str, Vec<Map<String, Value>>>>,
    next_id: AtomicI64,
    requests: AtomicUsize,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self {
            collections: Mutex::new(HashMap::new()),
            next_id: AtomicI64::new(1),
            requests: AtomicUsize::new(0),
        }
    }

    /// A store pre-populated with a few books and users for offline use.
    pub fn seeded() -> Self {
        let gw = Self::new();
        let books = [
            ("Dune", "Frank Herbert", "9780441013593"),
            ("Emma", "Jane Austen", "9780141439587"),
            ("The Left Hand of Darkness", "Ursula K. Le Guin", "9780441478125"),
        ];
        for (title, author, isbn) in books {
            let draft = BookDraft {
                title: title.into(),
                author: author.into(),
                isbn: isbn.into(),
            };
            gw.insert::<super::Book>(&draft);
        }
        let users = [
            ("Ada Lovelace", "ada@example.org", true),
            ("Grace Hopper", "grace@example.org", false),
        ];
        for (name, email, is_librarian) in users {
            let draft = UserDraft {
                name: name.into(),
                email: email.into(),
                is_librarian,
            };
            gw.insert::<super::User>(&draft);
        }
        gw.requests.store(0, Ordering::SeqCst);
        gw
    }

    /// Number of gateway calls served so far.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    fn insert<R: Resource>(&self, draft: &R::Draft) -> Map<String, Value> {
        let mut object = to_object(draft);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        object.insert("id".into(), Value::from(id));
        let mut collections = self.lock();
        collections.entry(R::PATH).or_default().push(object.clone());
        object
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<&'static str, Vec<Map<String, Value>>>> {
        self.collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn touch(&self) {
        self.requests.fetch_add(1, Ordering::SeqCst);
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> RemoteGateway<R> for MemoryGateway {
    async fn list(&self) -> Result<Vec<R>, TransportError> {
        self.touch();
        let rows: Vec<Map<String, Value>> = self.lock().get(R::PATH).cloned().unwrap_or_default();
        rows.into_iter().map(from_object::<R>).collect()
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, TransportError> {
        self.touch();
        let stored = self.insert::<R>(draft);
        from_object(stored)
    }

    async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<(), TransportError> {
        self.touch();
        let mut collections = self.lock();
        let row = collections
            .get_mut(R::PATH)
            .and_then(|rows| rows.iter_mut().find(|row| matches_id(row, id)))
            .ok_or_else(|| TransportError::not_found(format!("{} {id}", R::NOUN)))?;
        for (key, value) in to_object(draft) {
            row.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, id: &RecordId) -> Result<(), TransportError> {
        self.touch();
        let mut collections = self.lock();
        let rows = collections.entry(R::PATH).or_default();
        let before = rows.len();
        rows.retain(|row| !matches_id(row, id));
        if rows.len() == before {
            return Err(TransportError::not_found(format!("{} {id}", R::NOUN)));
        }
        Ok(())
    }
}

fn to_object<T: serde::Serialize>(draft: &T) -> Map<String, Value> {
    match serde_json::to_value(draft) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn from_object<R: Resource>(object: Map<String, Value>) -> Result<R, TransportError> {
    serde_json::from_value(Value::Object(object)).map_err(|e| TransportError::Decode(e.to_string()))
}

fn matches_id(row: &Map<String, Value>, id: &RecordId) -> bool {
    row.get("id")
        .and_then(|v| serde_json::from_value::<RecordId>(v.clone()).ok())
        .is_some_and(|row_id| &row_id == id)
}
