use std::fmt;

use crate::domain::validation::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Nexmo account key (`api_key`).
///
/// Invariant: not the empty string. The key is kept exactly as typed, surrounding
/// whitespace included.
pub struct ApiKey(String);

impl ApiKey {
    /// Query field name used by Nexmo (`api_key`).
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the validated key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// Nexmo account secret (`api_secret`).
///
/// Invariant: must not be empty (whitespace is preserved and allowed).
/// The `Debug` output is redacted.
pub struct ApiSecret(String);

impl ApiSecret {
    /// Query field name used by Nexmo (`api_secret`).
    pub const FIELD: &'static str = "api_secret";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    /// Borrow the secret as provided.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiSecret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender shown on the handset (`from`): a phone number or an alphanumeric id.
///
/// Invariant: non-empty after trimming.
pub struct SenderId(String);

impl SenderId {
    /// Query field name used by Nexmo (`from`).
    pub const FIELD: &'static str = "from";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the validated sender.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient phone number as sent to Nexmo (`to`).
///
/// Invariant: non-empty after trimming. No normalization is applied; the gateway
/// receives the number exactly as typed.
pub struct Recipient(String);

impl Recipient {
    /// Query field name used by Nexmo (`to`).
    pub const FIELD: &'static str = "to";

    /// Create a validated (non-empty) recipient.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Raw (trimmed) value as sent to Nexmo.
    pub fn raw(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message text (`text`).
///
/// Invariant: non-empty after trimming. Surrounding whitespace is dropped.
pub struct MessageText(String);

impl MessageText {
    /// Query field name used by Nexmo (`text`).
    pub const FIELD: &'static str = "text";

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the trimmed message text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Name of an entry in the contact book.
///
/// Invariant: non-empty after trimming.
pub struct ContactName(String);

impl ContactName {
    pub const FIELD: &'static str = "name";

    /// Prefix used when a contact is added automatically after a send.
    pub const AUTO_PREFIX: &'static str = "ContactName_";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Name used for the auto-added contact at position `index`.
    pub fn auto(index: usize) -> Self {
        Self(format!("{}{index}", Self::AUTO_PREFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Per-message status code returned by Nexmo.
///
/// The value is preserved as-is. Only [`StatusCode::ACCEPTED`] means success; every
/// other code is treated as a single generic failure.
pub struct StatusCode(String);

impl StatusCode {
    /// Status code reported for an accepted message.
    pub const ACCEPTED: &'static str = "0";

    /// Construct a status code from its wire representation.
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Get the code as provided by Nexmo.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the gateway accepted the message.
    pub fn is_accepted(&self) -> bool {
        self.0 == Self::ACCEPTED
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
