//! User record model and form validation.
//!
//! `User` matches the wire shape of the remote user service; the nested
//! address and company objects are optional because records created through
//! this client carry only the profile fields.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geo {
    pub lat: String,
    pub lng: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub suite: Option<String>,
    pub city: Option<String>,
    pub zipcode: Option<String>,
    pub geo: Option<Geo>,
}

impl Address {
    /// Single-line display form, skipping empty components.
    pub fn display(&self) -> String {
        let parts: Vec<&str> = [
            self.street.as_deref(),
            self.suite.as_deref(),
            self.city.as_deref(),
            self.zipcode.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.trim().is_empty())
        .collect();
        parts.join(", ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub name: Option<String>,
    #[serde(rename = "catchPhrase")]
    pub catch_phrase: Option<String>,
    #[serde(rename = "bs")]
    pub tagline: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
}

/// Sort columns for the users table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortColumn {
    Id,
    Name,
    Username,
    Email,
}

impl UserSortColumn {
    pub fn title(&self) -> &'static str {
        match self {
            UserSortColumn::Id => "ID",
            UserSortColumn::Name => "Name",
            UserSortColumn::Username => "Username",
            UserSortColumn::Email => "Email",
        }
    }

    /// Get the next sort column (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            UserSortColumn::Id => UserSortColumn::Name,
            UserSortColumn::Name => UserSortColumn::Username,
            UserSortColumn::Username => UserSortColumn::Email,
            UserSortColumn::Email => UserSortColumn::Id,
        }
    }
}

// ============================================================================
// Form draft and validation
// ============================================================================

/// Editable fields of a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    Username,
    Email,
    Phone,
    Website,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Username,
        Field::Email,
        Field::Phone,
        Field::Website,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Website => "Website",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Field::Name => Field::Username,
            Field::Username => Field::Email,
            Field::Email => Field::Phone,
            Field::Phone => Field::Website,
            Field::Website => Field::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Field::Name => Field::Website,
            Field::Username => Field::Name,
            Field::Email => Field::Username,
            Field::Phone => Field::Email,
            Field::Website => Field::Phone,
        }
    }
}

/// Client-side validation failure with per-field messages.
///
/// Resolved locally: the operation is aborted and no remote call is issued.
#[derive(Debug, Clone, Error)]
#[error("validation failed for {} field(s)", .errors.len())]
pub struct ValidationError {
    pub errors: Vec<(Field, String)>,
}

impl ValidationError {
    pub fn message_for(&self, field: Field) -> Option<&str> {
        self.errors
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, msg)| msg.as_str())
    }
}

/// The client-side editable subset of a user record, backing the create and
/// edit forms.
#[derive(Debug, Clone, Default)]
pub struct UserDraft {
    pub name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub website: String,
}

impl UserDraft {
    /// Seed a draft from an existing record for the edit form.
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone().unwrap_or_default(),
            website: user.website.clone().unwrap_or_default(),
        }
    }

    pub fn field(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Username => &self.username,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Website => &self.website,
        }
    }

    pub fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Username => &mut self.username,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
            Field::Website => &mut self.website,
        }
    }

    /// Check all fields, collecting every failure rather than stopping at the
    /// first so the form can show them together.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push((Field::Name, "Name is required".to_string()));
        }
        if self.username.trim().is_empty() {
            errors.push((Field::Username, "Username is required".to_string()));
        }
        if self.email.trim().is_empty() {
            errors.push((Field::Email, "Email is required".to_string()));
        } else if !is_valid_email(&self.email) {
            errors.push((Field::Email, "Invalid email format".to_string()));
        }
        if self.phone.trim().is_empty() {
            errors.push((Field::Phone, "Phone is required".to_string()));
        }
        if self.website.trim().is_empty() {
            errors.push((Field::Website, "Website is required".to_string()));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors })
        }
    }

    /// Build a full record from this draft with the given identifier.
    pub fn into_user(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            username: self.username,
            email: self.email,
            phone: Some(self.phone),
            website: Some(self.website),
            address: None,
            company: None,
        }
    }

    /// Apply the editable fields onto an existing record, preserving its
    /// identifier and any nested detail the form cannot edit.
    pub fn apply_to(&self, user: &User) -> User {
        User {
            id: user.id,
            name: self.name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            phone: Some(self.phone.clone()),
            website: Some(self.website.clone()),
            address: user.address.clone(),
            company: user.company.clone(),
        }
    }
}

/// Loose email shape check: something before an '@', a dotted domain after,
/// no whitespace anywhere.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tld)) => !head.is_empty() && !tld.is_empty(),
        None => false,
    }
}

// ============================================================================
// Tests
// ============================================================================
