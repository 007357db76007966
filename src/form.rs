//! Pending form input for the two screens.
//!
//! Forms only hold text and edit state; they never talk to the backend. The
//! screen controllers in [`crate::app`] decide when a validated draft is sent.

use rand::Rng;

use crate::api::{BookDraft, RecordId, User, UserDraft};
use crate::error::ValidationError;

/// Number of digits in a generated ISBN.
pub const ISBN_LEN: usize = 13;

/// Thirteen independent uniform decimal digits. No checksum, leading zeros kept.
pub fn generate_isbn<G: Rng + ?Sized>(rng: &mut G) -> String {
    (0..ISBN_LEN)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect()
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::empty(field))
    } else {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BookField {
    #[default]
    Title,
    Author,
}

/// Inputs of the "add book" form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub focus: BookField,
}

impl BookForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.title, "Book title")?;
        require(&self.author, "Author name")
    }

    /// Validate and build the POST body, generating a fresh ISBN.
    pub fn draft<G: Rng + ?Sized>(&self, rng: &mut G) -> Result<BookDraft, ValidationError> {
        self.validate()?;
        Ok(BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: generate_isbn(rng),
        })
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Title,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UserField {
    #[default]
    Name,
    Email,
}

/// Inputs of the add/edit user form.
///
/// `editing` is `None` while idle and holds the record being edited
/// otherwise; submitting then issues an update instead of a create.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserForm {
    pub name: String,
    pub email: String,
    pub focus: UserField,
    editing: Option<User>,
}

impl UserForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "User name")?;
        require(&self.email, "Email")
    }

    /// Validate and build the POST/PUT body.
    ///
    /// New users are never librarians; an edit carries the current flag over.
    pub fn draft(&self) -> Result<UserDraft, ValidationError> {
        self.validate()?;
        Ok(UserDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            is_librarian: self.editing.as_ref().is_some_and(|u| u.is_librarian),
        })
    }

    /// Enter `Editing` with the fields pre-populated from `user`.
    pub fn begin_edit(&mut self, user: &User) {
        self.name = user.name.clone();
        self.email = user.email.clone();
        self.focus = UserField::Name;
        self.editing = Some(user.clone());
    }

    /// Back to `Idle` without a network call.
    pub fn cancel_edit(&mut self) {
        self.clear();
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn editing_id(&self) -> Option<&RecordId> {
        self.editing.as_ref().map(|u| &u.id)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            UserField::Name => UserField::Email,
            UserField::Email => UserField::Name,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            UserField::Name => &mut self.name,
            UserField::Email => &mut self.email,
        }
    }
}
