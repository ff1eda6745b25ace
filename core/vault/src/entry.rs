//! Decrypted vault entries.

use serde_json::Value;
use std::fmt;

use keysafe_crypto::KeyPair;
use keysafe_storage::ItemId;

/// Designation of the password field in a detail payload.
pub const PASSWORD_DESIGNATION: &str = "password";

/// Designation of the username field in a detail payload.
pub const USERNAME_DESIGNATION: &str = "username";

/// One decrypted vault item.
///
/// The overview is always present. The detail is absent when the item has
/// no detail row or its detail could not be decrypted.
#[derive(Clone)]
pub struct Entry {
    pub(crate) id: ItemId,
    pub(crate) key_pair: KeyPair,
    pub(crate) overview: Value,
    pub(crate) detail: Option<Value>,
}

impl Entry {
    pub(crate) fn new(id: ItemId, key_pair: KeyPair, overview: Value) -> Self {
        Self {
            id,
            key_pair,
            overview,
            detail: None,
        }
    }

    /// Item identifier.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Key pair protecting this item's detail.
    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    /// Decoded overview JSON.
    pub fn overview(&self) -> &Value {
        &self.overview
    }

    /// Decoded detail JSON, if available.
    pub fn detail(&self) -> Option<&Value> {
        self.detail.as_ref()
    }

    /// The overview's `title`.
    pub fn title(&self) -> Option<&str> {
        self.overview.get("title").and_then(Value::as_str)
    }

    /// The overview's `url`.
    pub fn url(&self) -> Option<&str> {
        self.overview.get("url").and_then(Value::as_str)
    }

    /// Value of the first detail field with the given designation.
    pub fn field(&self, designation: &str) -> Option<&str> {
        self.detail
            .as_ref()?
            .get("fields")?
            .as_array()?
            .iter()
            .find(|f| f.get("designation").and_then(Value::as_str) == Some(designation))?
            .get("value")?
            .as_str()
    }

    /// The detail's `password` field.
    pub fn password(&self) -> Option<&str> {
        self.field(PASSWORD_DESIGNATION)
    }

    /// The detail's `username` field.
    pub fn username(&self) -> Option<&str> {
        self.field(USERNAME_DESIGNATION)
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title())
            .field("has_detail", &self.detail.is_some())
            .finish_non_exhaustive()
    }
}
