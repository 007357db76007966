//! Catalog screen: list, search, add and delete books.

use std::sync::Arc;

use tracing::{info, warn};

use super::Notice;
use super::screen::{Completion, ScreenController, ScreenCore};
use crate::api::{Book, RecordId, RemoteGateway};
use crate::error::ValidationError;
use crate::form::BookForm;

pub struct CatalogScreen {
    pub core: ScreenCore<Book>,
    pub form: BookForm,
}

impl CatalogScreen {
    /// Build the screen and request the initial list.
    pub fn mount(gateway: Arc<dyn RemoteGateway<Book>>) -> Self {
        let mut screen = Self {
            core: ScreenCore::new(gateway),
            form: BookForm::default(),
        };
        screen.core.refresh();
        screen
    }

    /// Validate the form and send a create request with a fresh ISBN.
    ///
    /// Nothing is sent when validation fails.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        let draft = self.form.draft(&mut rand::rng())?;
        self.core.create(draft);
        Ok(())
    }

    pub fn delete(&mut self, id: RecordId) {
        self.core.delete(id);
    }

    /// Delete the highlighted row, returning its id.
    pub fn delete_selected(&mut self) -> Option<RecordId> {
        let id = self.core.selected_record()?.id.clone();
        self.delete(id.clone());
        Some(id)
    }
}

impl ScreenController for CatalogScreen {
    type Record = Book;

    fn core(&self) -> &ScreenCore<Book> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ScreenCore<Book> {
        &mut self.core
    }

    fn handle(&mut self, completion: Completion<Book>) -> Option<Notice> {
        match completion {
            Completion::Listed { ticket, result } => self.core.apply_listed(ticket, result),
            Completion::Created(Ok(book)) => {
                info!(id = %book.id, title = %book.title, "book added");
                self.form.clear();
                self.core.store.append(book);
                self.core.refresh();
                Some(Notice::success("Book added successfully!"))
            }
            Completion::Created(Err(e)) => {
                warn!(error = %e, "adding book failed");
                Some(Notice::error(format!("Error adding the book: {e}")))
            }
            Completion::Deleted { id, result: Ok(()) } => {
                info!(%id, "book deleted");
                self.core.refresh();
                Some(Notice::success("Book deleted successfully!"))
            }
            Completion::Deleted { id, result: Err(e) } => {
                warn!(%id, error = %e, "deleting book failed");
                Some(Notice::error(format!("Error deleting the book: {e}")))
            }
            // The catalog never issues updates.
            Completion::Updated { id, .. } => {
                warn!(%id, "ignoring unexpected book update result");
                None
            }
        }
    }
}
