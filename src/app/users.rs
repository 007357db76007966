//! Users screen: list, search, add, edit and delete users.

use std::sync::Arc;

use tracing::{info, warn};

use super::Notice;
use super::screen::{Completion, ScreenController, ScreenCore};
use crate::api::{RecordId, RemoteGateway, User};
use crate::error::ValidationError;
use crate::form::UserForm;

pub struct UsersScreen {
    pub core: ScreenCore<User>,
    pub form: UserForm,
}

impl UsersScreen {
    /// Build the screen and request the initial list.
    pub fn mount(gateway: Arc<dyn RemoteGateway<User>>) -> Self {
        let mut screen = Self {
            core: ScreenCore::new(gateway),
            form: UserForm::default(),
        };
        screen.core.refresh();
        screen
    }

    /// Create a user, or update the one being edited.
    ///
    /// Nothing is sent when validation fails.
    pub fn submit(&mut self) -> Result<(), ValidationError> {
        let draft = self.form.draft()?;
        match self.form.editing_id() {
            Some(id) => {
                let id = id.clone();
                self.core.update(id, draft);
            }
            None => self.core.create(draft),
        }
        Ok(())
    }

    /// Start editing the highlighted row.
    pub fn edit_selected(&mut self) -> bool {
        match self.core.selected_record() {
            Some(user) => {
                let user = user.clone();
                self.form.begin_edit(&user);
                true
            }
            None => false,
        }
    }

    pub fn cancel_edit(&mut self) {
        self.form.cancel_edit();
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

    fn is_editing(&self, id: &RecordId) -> bool {
        self.form.editing_id() == Some(id)
    }
}

impl ScreenController for UsersScreen {
    type Record = User;

    fn core(&self) -> &ScreenCore<User> {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ScreenCore<User> {
        &mut self.core
    }

    fn handle(&mut self, completion: Completion<User>) -> Option<Notice> {
        match completion {
            Completion::Listed { ticket, result } => {
                let failed = self.core.apply_listed(ticket, result);
                if failed.is_some() {
                    return failed;
                }
                // Someone else removed the record under edit.
                let vanished = self
                    .form
                    .editing_id()
                    .is_some_and(|id| !self.core.store.contains(id));
                if vanished {
                    self.form.cancel_edit();
                    return Some(Notice::info("The user being edited no longer exists."));
                }
                None
            }
            Completion::Created(Ok(user)) => {
                info!(id = %user.id, name = %user.name, "user added");
                if !self.form.is_editing() {
                    self.form.clear();
                }
                self.core.store.append(user);
                self.core.refresh();
                Some(Notice::success("User added successfully!"))
            }
            Completion::Created(Err(e)) => {
                warn!(error = %e, "adding user failed");
                Some(Notice::error(format!("Error adding the user: {e}")))
            }
            Completion::Updated { id, result: Ok(()) } => {
                info!(%id, "user updated");
                if self.is_editing(&id) {
                    self.form.clear();
                }
                self.core.refresh();
                Some(Notice::success("User updated successfully!"))
            }
            Completion::Updated { id, result: Err(e) } => {
                warn!(%id, error = %e, "updating user failed");
                Some(Notice::error(format!("Error updating the user: {e}")))
            }
            Completion::Deleted { id, result: Ok(()) } => {
                info!(%id, "user deleted");
                if self.is_editing(&id) {
                    self.form.cancel_edit();
                }
                self.core.refresh();
                Some(Notice::success("User deleted successfully!"))
            }
            Completion::Deleted { id, result: Err(e) } => {
                warn!(%id, error = %e, "deleting user failed");
                Some(Notice::error(format!("Error deleting the user: {e}")))
            }
        }
    }
}
