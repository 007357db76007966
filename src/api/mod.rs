//! Remote gateway: record types and the transport-agnostic CRUD port.
//!
//! The backend exposes one collection per resource (`books`, `users`). A
//! [`RemoteGateway`] performs exactly one request per call and either yields
//! the parsed body or a [`TransportError`].
//!
pub mod http;
pub mod memory;

use std::fmt::{self, Debug, Display, Formatter};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;

/// Default backend location used when neither config nor CLI overrides it.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8001/api";

/// Opaque, server-assigned identifier.
///
/// Django hands out integers, other backends may use strings; either form is
/// accepted and written back unchanged.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl Display for RecordId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

/// A catalog entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: RecordId,
    pub title: String,
    pub author: String,
    pub isbn: String,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// POST body for a new book.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
}

/// A library member.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_librarian: bool,
}

/// POST/PUT body for a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
    pub is_librarian: bool,
}

/// Binds a record type to its collection path and request body.
pub trait Resource: Clone + Debug + DeserializeOwned + Send + Sync + 'static {
    /// Body sent on create and update.
    type Draft: Serialize + Clone + Debug + Send + Sync + 'static;

    /// Collection path segment below the base URL, without slashes.
    const PATH: &'static str;

    /// Singular noun used in notices and logs.
    const NOUN: &'static str;

    fn id(&self) -> &RecordId;
}

impl Resource for Book {
    type Draft = BookDraft;
    const PATH: &'static str = "books";
    const NOUN: &'static str = "book";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

impl Resource for User {
    type Draft = UserDraft;
    const PATH: &'static str = "users";
    const NOUN: &'static str = "user";

    fn id(&self) -> &RecordId {
        &self.id
    }
}

/// CRUD port over one remote collection.
#[async_trait]
pub trait RemoteGateway<R: Resource>: Send + Sync {
    /// Fetch the whole collection in server order.
    async fn list(&self) -> Result<Vec<R>, TransportError>;

    /// Create a record and return it as stored by the backend.
    async fn create(&self, draft: &R::Draft) -> Result<R, TransportError>;

    /// Replace the fields of an existing record.
    async fn update(&self, id: &RecordId, draft: &R::Draft) -> Result<(), TransportError>;

    async fn delete(&self, id: &RecordId) -> Result<(), TransportError>;
}

/// One gateway per collection, shared by whichever screen is mounted.
#[derive(Clone)]
pub struct Gateways {
    pub books: Arc<dyn RemoteGateway<Book>>,
    pub users: Arc<dyn RemoteGateway<User>>,
}

impl Gateways {
    /// Both collections served by the REST API at `base_url`.
    pub fn http(base_url: &str) -> anyhow::Result<Self> {
        let gateway = Arc::new(http::HttpGateway::new(base_url)?);
        Ok(Self {
            books: gateway.clone(),
            users: gateway,
        })
    }

    /// Both collections served by one in-process store.
    pub fn memory(store: Arc<memory::MemoryGateway>) -> Self {
        Self {
            books: store.clone(),
            users: store,
        }
    }
}
