// Integration tests for bookhub-tui

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use bookhub_tui::api::memory::MemoryGateway;
use bookhub_tui::api::{Book, BookDraft, RecordId, RemoteGateway, User};
use bookhub_tui::app::NoticeLevel;
use bookhub_tui::app::catalog::CatalogScreen;
use bookhub_tui::app::screen::{ScreenController, settle};
use bookhub_tui::app::users::UsersScreen;
use bookhub_tui::error::TransportError;

fn dune() -> BookDraft {
    BookDraft {
        title: "Dune".into(),
        author: "Herbert".into(),
        isbn: "9780441013593".into(),
    }
}

/// Book gateway whose first `list` snapshots the store, then waits for a release.
struct HeldListGateway {
    inner: Arc<MemoryGateway>,
    release: Notify,
    held: AtomicBool,
    finished: AtomicUsize,
    held_error: Option<TransportError>,
}

impl HeldListGateway {
    fn new(inner: Arc<MemoryGateway>) -> Self {
        Self {
            inner,
            release: Notify::new(),
            held: AtomicBool::new(false),
            finished: AtomicUsize::new(0),
            held_error: None,
        }
    }

    /// Like `new`, but the held list fails with `error` once released.
    fn failing(inner: Arc<MemoryGateway>, error: TransportError) -> Self {
        Self {
            held_error: Some(error),
            ..Self::new(inner)
        }
    }
}

#[async_trait]
impl RemoteGateway<Book> for HeldListGateway {
    async fn list(&self) -> Result<Vec<Book>, TransportError> {
        let snapshot = RemoteGateway::<Book>::list(self.inner.as_ref()).await;
        if !self.held.swap(true, Ordering::SeqCst) {
            self.release.notified().await;
            self.finished.fetch_add(1, Ordering::SeqCst);
            if let Some(error) = &self.held_error {
                return Err(error.clone());
            }
            return snapshot;
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        snapshot
    }

    async fn create(&self, draft: &BookDraft) -> Result<Book, TransportError> {
        RemoteGateway::<Book>::create(self.inner.as_ref(), draft).await
    }

    async fn update(&self, id: &RecordId, draft: &BookDraft) -> Result<(), TransportError> {
        RemoteGateway::<Book>::update(self.inner.as_ref(), id, draft).await
    }

    async fn delete(&self, id: &RecordId) -> Result<(), TransportError> {
        RemoteGateway::<Book>::delete(self.inner.as_ref(), id).await
    }
}

/// Every call answers with a 500.
struct BrokenGateway;

#[async_trait]
impl RemoteGateway<Book> for BrokenGateway {
    async fn list(&self) -> Result<Vec<Book>, TransportError> {
        Err(TransportError::status(500, "boom"))
    }

    async fn create(&self, _draft: &BookDraft) -> Result<Book, TransportError> {
        Err(TransportError::status(500, "boom"))
    }

    async fn update(&self, _id: &RecordId, _draft: &BookDraft) -> Result<(), TransportError> {
        Err(TransportError::status(500, "boom"))
    }

    async fn delete(&self, _id: &RecordId) -> Result<(), TransportError> {
        Err(TransportError::status(500, "boom"))
    }
}

// 1) Adding a book from the catalog screen
#[tokio::test]
async fn adding_a_book_lists_it_with_a_generated_isbn() {
    let gw = Arc::new(MemoryGateway::new());
    let mut screen = CatalogScreen::mount(gw.clone());
    assert!(settle(&mut screen).await.is_empty());
    assert!(screen.core.store.is_empty());

    screen.form.title = "Dune".into();
    screen.form.author = "Herbert".into();
    screen.submit().expect("valid form");
    let notices = settle(&mut screen).await;

    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Success);
    assert_eq!(notices[0].message, "Book added successfully!");
    let books = screen.core.store.items();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
    assert_eq!(books[0].author, "Herbert");
    assert_eq!(books[0].isbn.len(), 13);
    assert!(screen.form.title.is_empty() && screen.form.author.is_empty());
    // list, create, follow-up list
    assert_eq!(gw.request_count(), 3);
}

// 2) Validation failures never reach the backend
#[tokio::test]
async fn blank_author_sends_nothing() {
    let gw = Arc::new(MemoryGateway::new());
    let mut screen = CatalogScreen::mount(gw.clone());
    settle(&mut screen).await;

    screen.form.title = "Dune".into();
    screen.form.author = "  ".into();
    let err = screen.submit().expect_err("author missing");
    assert_eq!(err.to_string(), "Author name cannot be empty!");
    assert_eq!(screen.core.in_flight(), 0);
    assert_eq!(gw.request_count(), 1);
    assert_eq!(screen.form.title, "Dune");
}

// 3) Deleting removes the record after the follow-up refresh
#[tokio::test]
async fn deleted_book_disappears() {
    let gw = Arc::new(MemoryGateway::seeded());
    let mut screen = CatalogScreen::mount(gw);
    settle(&mut screen).await;
    assert_eq!(screen.core.store.len(), 3);

    let id = screen.delete_selected().expect("a row is selected");
    let notices = settle(&mut screen).await;
    assert_eq!(notices.last().map(|n| n.message.as_str()), Some("Book deleted successfully!"));
    assert!(!screen.core.store.contains(&id));
    assert_eq!(screen.core.store.len(), 2);
}

// 4) Backend errors become notices and leave the list alone
#[tokio::test]
async fn backend_errors_surface_as_notices() {
    let mut screen = CatalogScreen::mount(Arc::new(BrokenGateway));
    let notices = settle(&mut screen).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Error fetching books: status 500: boom");

    screen.form.title = "Dune".into();
    screen.form.author = "Herbert".into();
    screen.submit().expect("valid form");
    let notices = settle(&mut screen).await;
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
    assert_eq!(notices[0].message, "Error adding the book: status 500: boom");
    // input survives so the user can retry
    assert_eq!(screen.form.title, "Dune");
    assert!(screen.core.store.is_empty());
}

// 5) A slow, older list response never overwrites a newer one
#[tokio::test]
async fn stale_refresh_is_dropped() {
    let inner = Arc::new(MemoryGateway::new());
    RemoteGateway::<Book>::create(inner.as_ref(), &dune()).await.expect("seed");
    let gw = Arc::new(HeldListGateway::new(inner.clone()));
    let mut screen = CatalogScreen::mount(gw.clone());
    // let the first list take its snapshot before the store changes
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }

    RemoteGateway::<Book>::create(inner.as_ref(), &dune()).await.expect("second");
    screen.core.refresh();

    let newer = screen.core.next().await.expect("newer list lands first");
    assert!(screen.handle(newer).is_none());
    assert_eq!(screen.core.store.len(), 2);

    gw.release.notify_one();
    let older = screen.core.next().await.expect("older list");
    assert!(screen.handle(older).is_none());
    assert_eq!(screen.core.store.len(), 2);
    assert_eq!(gw.finished.load(Ordering::SeqCst), 2);
}

// 5b) A late failure of an older refresh is not reported over fresh data
#[tokio::test]
async fn stale_refresh_failure_is_silent() {
    let inner = Arc::new(MemoryGateway::new());
    RemoteGateway::<Book>::create(inner.as_ref(), &dune()).await.expect("seed");
    let gw = Arc::new(HeldListGateway::failing(
        inner,
        TransportError::Network("timed out".into()),
    ));
    let mut screen = CatalogScreen::mount(gw.clone());
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    screen.core.refresh();

    let newer = screen.core.next().await.expect("newer list");
    assert!(screen.handle(newer).is_none());
    assert_eq!(screen.core.store.len(), 1);

    gw.release.notify_one();
    let older = screen.core.next().await.expect("older list");
    assert_eq!(screen.handle(older), None);
    assert_eq!(screen.core.store.len(), 1);
    assert_eq!(gw.finished.load(Ordering::SeqCst), 2);
}

// 6) Switching away aborts whatever the old screen was waiting for
#[tokio::test]
async fn dropped_screen_abandons_requests() {
    let gw = Arc::new(HeldListGateway::new(Arc::new(MemoryGateway::new())));
    let screen = CatalogScreen::mount(gw.clone());
    assert_eq!(screen.core().in_flight(), 1);
    for _ in 0..3 {
        tokio::task::yield_now().await;
    }
    drop(screen);

    gw.release.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(gw.finished.load(Ordering::SeqCst), 0);
}

// 7) Add, edit, then delete a user
#[tokio::test]
async fn user_lifecycle() {
    let gw = Arc::new(MemoryGateway::new());
    let mut screen = UsersScreen::mount(gw);
    settle(&mut screen).await;

    screen.form.name = "Ann".into();
    screen.form.email = "ann@example.org".into();
    screen.submit().expect("valid");
    let notices = settle(&mut screen).await;
    assert_eq!(notices.last().map(|n| n.message.as_str()), Some("User added successfully!"));
    assert_eq!(screen.core.store.len(), 1);
    assert!(!screen.core.store.items()[0].is_librarian);

    assert!(screen.edit_selected());
    assert!(screen.form.is_editing());
    screen.form.name = "Annie".into();
    screen.submit().expect("valid");
    let notices = settle(&mut screen).await;
    assert_eq!(notices.last().map(|n| n.message.as_str()), Some("User updated successfully!"));
    assert!(!screen.form.is_editing());
    assert_eq!(screen.core.store.len(), 1);
    assert_eq!(screen.core.store.items()[0].name, "Annie");

    screen.delete_selected().expect("selected");
    settle(&mut screen).await;
    assert!(screen.core.store.is_empty());
}

// 8) Deleting the user being edited returns the form to idle
#[tokio::test]
async fn deleting_the_edited_user_cancels_the_edit() {
    let gw = Arc::new(MemoryGateway::seeded());
    let mut screen = UsersScreen::mount(gw);
    settle(&mut screen).await;

    assert!(screen.edit_selected());
    let editing = screen.form.editing_id().cloned().expect("editing");
    let deleted = screen.delete_selected().expect("selected");
    assert_eq!(editing, deleted);

    let notices = settle(&mut screen).await;
    assert_eq!(notices.last().map(|n| n.message.as_str()), Some("User deleted successfully!"));
    assert!(!screen.form.is_editing());
    assert!(screen.form.name.is_empty());
    assert!(!screen.core.store.contains(&deleted));
}

// 8b) A refresh that no longer contains the edited user cancels the edit
#[tokio::test]
async fn edited_user_removed_elsewhere_cancels_the_edit() {
    let gw = Arc::new(MemoryGateway::seeded());
    let mut screen = UsersScreen::mount(gw.clone());
    settle(&mut screen).await;

    assert!(screen.edit_selected());
    let editing = screen.form.editing_id().cloned().expect("editing");
    screen.form.name = "half-typed".into();
    RemoteGateway::<User>::delete(gw.as_ref(), &editing)
        .await
        .expect("removed behind the screen's back");

    screen.core.refresh();
    let notices = settle(&mut screen).await;
    let last = notices.last().expect("a notice");
    assert_eq!(last.level, NoticeLevel::Info);
    assert_eq!(last.message, "The user being edited no longer exists.");
    assert!(!screen.form.is_editing());
    assert!(screen.form.name.is_empty());
    assert!(!screen.core.store.contains(&editing));
}

// 9) Searching narrows the visible rows and keeps selection in range
#[tokio::test]
async fn search_narrows_visible_rows() {
    let mut screen = CatalogScreen::mount(Arc::new(MemoryGateway::seeded()));
    settle(&mut screen).await;
    screen.core.move_by(2);
    screen.core.set_search("DUNE".into());
    let visible: Vec<&str> = screen.core.visible().iter().map(|b| b.title.as_str()).collect();
    assert_eq!(visible, vec!["Dune"]);
    assert_eq!(screen.core.selected_record().map(|b| b.title.as_str()), Some("Dune"));
    screen.core.set_search(String::new());
    assert_eq!(screen.core.visible().len(), 3);
}

// 10) Config and keybind files roundtrip through disk
#[test]
fn config_files_roundtrip() {
    use bookhub_tui::app::ActiveTab;
    use bookhub_tui::app::config::ClientConfig;
    use bookhub_tui::app::keymap::{KeyAction, Keymap};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::{SystemTime, UNIX_EPOCH};

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let dir = std::env::temp_dir();
    let conf = dir.join(format!("bookhub_{}_{nonce}.conf", std::process::id()));
    let keys = dir.join(format!("bookhub_keys_{}_{nonce}.conf", std::process::id()));
    let conf_str = conf.to_string_lossy().to_string();
    let keys_str = keys.to_string_lossy().to_string();

    let cfg = ClientConfig {
        base_url: "http://10.0.0.2:9000/api".into(),
        start_tab: ActiveTab::Catalog,
    };
    cfg.write_file(&conf_str).expect("write config");
    assert_eq!(ClientConfig::from_file(&conf_str), Some(cfg));

    Keymap::default().write_file(&keys_str).expect("write keymap");
    let km = Keymap::from_file(&keys_str).expect("read keymap");
    assert_eq!(
        km.resolve(&KeyEvent::new(KeyCode::Char('j'), KeyModifiers::NONE)),
        Some(KeyAction::MoveDown)
    );
    assert_eq!(km.keys_for(KeyAction::Quit), vec!["Ctrl+c".to_string(), "q".to_string()]);

    let _ = std::fs::remove_file(&conf_str);
    let _ = std::fs::remove_file(&keys_str);
}

mod http_gateway {
    use super::*;
    use bookhub_tui::api::http::HttpGateway;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP/1.1 response and hand back the raw request.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.expect("read");
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
                if request_complete(&request) {
                    break;
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();
            String::from_utf8_lossy(&request).into_owned()
        });
        (format!("http://{addr}/api"), handle)
    }

    fn request_complete(raw: &[u8]) -> bool {
        let text = String::from_utf8_lossy(raw);
        let Some((head, body)) = text.split_once("\r\n\r\n") else {
            return false;
        };
        let length = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.trim()
                    .eq_ignore_ascii_case("content-length")
                    .then(|| v.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);
        body.len() >= length
    }

    #[tokio::test]
    async fn list_parses_books() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"id":1,"title":"Dune","author":"Herbert","isbn":"9780441013593","available":false}]"#,
        )
        .await;
        let gw = HttpGateway::new(&base).expect("gateway");
        let books = RemoteGateway::<Book>::list(&gw).await.expect("list");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert!(!books[0].available);

        let request = server.await.expect("server");
        assert!(request.starts_with("GET /api/books/ HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
    }

    #[tokio::test]
    async fn update_puts_to_the_record_url() {
        let (base, server) = serve_once("200 OK", "{}").await;
        let gw = HttpGateway::new(&base).expect("gateway");
        let draft = bookhub_tui::api::UserDraft {
            name: "Ann".into(),
            email: "ann@example.org".into(),
            is_librarian: false,
        };
        RemoteGateway::<User>::update(&gw, &RecordId::Number(4), &draft)
            .await
            .expect("update");
        let request = server.await.expect("server");
        assert!(request.starts_with("PUT /api/users/4/ HTTP/1.1"));
        assert!(request.contains(r#""name":"Ann""#));
        assert!(request.contains(r#""is_librarian":false"#));
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let (base, server) = serve_once("500 Internal Server Error", r#"{"detail":"db down"}"#).await;
        let gw = HttpGateway::new(&base).expect("gateway");
        let err = RemoteGateway::<Book>::delete(&gw, &RecordId::Number(1))
            .await
            .expect_err("500");
        assert_eq!(err, TransportError::status(500, r#"{"detail":"db down"}"#));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn malformed_body_maps_to_decode() {
        let (base, server) = serve_once("200 OK", "<html>oops</html>").await;
        let gw = HttpGateway::new(&base).expect("gateway");
        let err = RemoteGateway::<User>::list(&gw).await.expect_err("not json");
        assert!(matches!(err, TransportError::Decode(_)));
        server.await.expect("server");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);
        let gw = HttpGateway::new(&format!("http://{addr}/api")).expect("gateway");
        let err = RemoteGateway::<Book>::list(&gw).await.expect_err("refused");
        assert!(matches!(err, TransportError::Network(_)));
    }
}
