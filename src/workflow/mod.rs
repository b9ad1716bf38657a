//! Workflow layer: form validation, the send action and contact book maintenance.
//!
//! [`App`] owns all mutable state. Every user action is a method taking plain input
//! and returning an [`Outcome`] for whatever front end presents it.

use tracing::{info, warn};

use crate::client::{Auth, NexmoClient, NexmoError};
use crate::domain::{ContactName, MessageText, Recipient, SendSms, SenderId};
use crate::store::{ContactBook, Credentials, Store};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("SMS sender cannot be empty")]
    EmptySender,

    #[error("SMS recipient cannot be empty")]
    EmptyRecipient,

    #[error("SMS text cannot be empty")]
    EmptyText,

    #[error("Cannot accept empty key or secret")]
    EmptyCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContactError {
    #[error("No contact named '{0}'")]
    NotFound(String),

    #[error("Contact name cannot be empty")]
    EmptyName,

    #[error("Contact number cannot be empty")]
    EmptyNumber,

    #[error("A contact named '{0}' already exists")]
    NameTaken(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Raw field values of the send form.
pub struct SendForm {
    pub from: String,
    pub to: String,
    pub text: String,
}

impl SendForm {
    pub fn new(from: impl Into<String>, to: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
        }
    }

    /// Check sender, recipient and text in that order; the first blank field wins.
    pub fn validate(&self) -> Result<SendSms, FormError> {
        let from = SenderId::new(self.from.as_str()).map_err(|_| FormError::EmptySender)?;
        let to = Recipient::new(self.to.as_str()).map_err(|_| FormError::EmptyRecipient)?;
        let text = MessageText::new(self.text.as_str()).map_err(|_| FormError::EmptyText)?;
        Ok(SendSms::new(from, to, text))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A form field was blank or malformed; nothing was sent.
    Invalid,
    /// No credentials are saved; the gateway was not contacted.
    NotConfigured,
    /// The gateway answered but did not accept the message.
    Rejected,
    /// The gateway could not be reached.
    Network,
    /// A contact operation named an entry that does not exist.
    UnknownContact,
    /// Writing to the local store failed.
    Storage,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of one user action, ready for display.
pub enum Outcome {
    Success { message: String },
    Failure { kind: FailureKind, message: String },
}

impl Outcome {
    fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::Failure {
            kind,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Dialog title matching the kind of outcome.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Success { .. } => "Success",
            Self::Failure {
                kind: FailureKind::Rejected | FailureKind::Network,
                ..
            } => "Sending SMS failed",
            Self::Failure { .. } => "Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message } | Self::Failure { message, .. } => message,
        }
    }
}

impl From<FormError> for Outcome {
    fn from(err: FormError) -> Self {
        Self::failure(FailureKind::Invalid, err.to_string())
    }
}

impl From<ContactError> for Outcome {
    fn from(err: ContactError) -> Self {
        let kind = match err {
            ContactError::NotFound(_) => FailureKind::UnknownContact,
            _ => FailureKind::Invalid,
        };
        Self::failure(kind, err.to_string())
    }
}

/// Application state: the store, the gateway client and what was loaded from disk.
pub struct App {
    store: Store,
    client: NexmoClient,
    credentials: Option<Credentials>,
    contacts: ContactBook,
}

impl App {
    /// Create the state and load both records from `store`.
    pub fn new(store: Store, client: NexmoClient) -> Self {
        let mut app = Self {
            store,
            client,
            credentials: None,
            contacts: ContactBook::new(),
        };
        app.load_credentials();
        app.reload_contacts();
        app
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    /// Re-read the credentials file. When nothing can be read the credentials
    /// already held in memory are kept.
    pub fn load_credentials(&mut self) -> Option<&Credentials> {
        if let Some(credentials) = self.store.load_credentials() {
            self.credentials = Some(credentials);
        }
        self.credentials.as_ref()
    }

    pub fn reload_contacts(&mut self) {
        self.contacts = self.store.load_contacts();
    }

    /// Persist `key` and `secret` exactly as typed. Only empty strings are refused.
    pub fn save_credentials(&mut self, key: &str, secret: &str) -> Outcome {
        info!("saving credentials");
        if key.is_empty() || secret.is_empty() {
            return FormError::EmptyCredentials.into();
        }

        let credentials = Credentials::new(key, secret);
        match self.store.save_credentials(&credentials) {
            Ok(()) => {
                self.credentials = Some(credentials);
                Outcome::success("Credentials saved")
            }
            Err(err) => Outcome::failure(FailureKind::Storage, err.to_string()),
        }
    }

    pub fn clear_credentials(&mut self) -> Outcome {
        info!("clearing credentials");
        match self.store.clear_credentials() {
            Ok(()) => {
                self.credentials = None;
                Outcome::success("Credentials cleared")
            }
            Err(err) => Outcome::failure(FailureKind::Storage, err.to_string()),
        }
    }

    /// Validate the form and send it through the gateway.
    ///
    /// The gateway is called at most once, and only after validation and the
    /// credential check pass. On acceptance a previously unknown recipient is added
    /// to the contact book.
    pub async fn submit_send(&mut self, form: &SendForm) -> Outcome {
        info!("validating SMS");
        let request = match form.validate() {
            Ok(request) => request,
            Err(err) => return err.into(),
        };

        let auth = match self.auth() {
            Ok(auth) => auth,
            Err(err) => return self.send_failure(err),
        };

        let recipient = request.recipient().clone();
        info!(to = recipient.raw(), "sending SMS");
        let response = match self.client.send_sms(&auth, request).await {
            Ok(response) => response,
            Err(err) => return self.send_failure(err),
        };

        let first = response.first();
        let confirmed_to = first
            .and_then(|message| message.to.as_deref())
            .unwrap_or(recipient.raw());
        let balance = first
            .and_then(|message| message.remaining_balance.as_deref())
            .unwrap_or("unknown");
        let message = format!("SMS sent to {confirmed_to}.\nAccount balance now {balance}€");

        self.remember_recipient(recipient.raw());
        Outcome::success(message)
    }

    fn auth(&self) -> Result<Auth, NexmoError> {
        self.credentials
            .as_ref()
            .ok_or(NexmoError::NotConfigured)?
            .to_auth()
            .map_err(|_| NexmoError::NotConfigured)
    }

    fn send_failure(&self, err: NexmoError) -> Outcome {
        warn!(error = %err, "SMS not sent");
        match err {
            NexmoError::NotConfigured => Outcome::failure(
                FailureKind::NotConfigured,
                "You need to configure your Nexmo key and secret",
            ),
            err if err.is_network() => Outcome::failure(
                FailureKind::Network,
                format!("Could not reach the SMS gateway: {err}"),
            ),
            err => {
                let detail = err
                    .raw_response()
                    .map(str::to_owned)
                    .unwrap_or_else(|| err.to_string());
                Outcome::failure(FailureKind::Rejected, format!("Server response:\n{detail}"))
            }
        }
    }

    /// Add `number` under an auto-generated name unless some contact already has it.
    fn remember_recipient(&mut self, number: &str) -> Option<ContactName> {
        if self.contacts.contains_number(number) {
            return None;
        }

        let name = self.contacts.next_auto_name();
        self.contacts.insert(name.as_str(), number);
        match self.store.save_contacts(&self.contacts) {
            Ok(()) => self.reload_contacts(),
            Err(err) => warn!(error = %err, "new contact kept in memory only"),
        }
        info!(name = name.as_str(), "contact added");
        Some(name)
    }

    /// Number stored for `name`, used to fill the recipient field.
    pub fn select_contact(&self, name: &str) -> Option<&str> {
        self.contacts.get(name)
    }

    /// Rename and/or renumber a contact, then persist and reload the book.
    pub fn edit_contact(&mut self, old_name: &str, new_name: &str, new_number: &str) -> Outcome {
        let new_name = match ContactName::new(new_name) {
            Ok(name) => name,
            Err(_) => return ContactError::EmptyName.into(),
        };
        let new_number = match Recipient::new(new_number) {
            Ok(number) => number,
            Err(_) => return ContactError::EmptyNumber.into(),
        };
        if !self.contacts.contains_name(old_name) {
            return ContactError::NotFound(old_name.to_owned()).into();
        }
        if new_name.as_str() != old_name && self.contacts.contains_name(new_name.as_str()) {
            return ContactError::NameTaken(new_name.as_str().to_owned()).into();
        }

        info!(from = old_name, to = new_name.as_str(), "editing contact");
        let mut edited = self.contacts.clone();
        edited.remove(old_name);
        edited.insert(new_name.as_str(), new_number.raw());
        if let Err(err) = self.commit_contacts(edited) {
            return err;
        }
        self.reload_contacts();
        Outcome::success(format!("Contact '{}' saved", new_name.as_str()))
    }

    /// Remove a contact and persist the book. Unknown names change nothing on disk.
    pub fn delete_contact(&mut self, name: &str) -> Outcome {
        let mut remaining = self.contacts.clone();
        if remaining.remove(name).is_none() {
            return Outcome::success(format!("No contact named '{name}'; nothing deleted"));
        }

        info!(name, "deleting contact");
        match self.commit_contacts(remaining) {
            Ok(()) => Outcome::success(format!("Contact '{name}' deleted")),
            Err(err) => err,
        }
    }

    /// Write `book` and make it the in-memory book. A failed write leaves both untouched.
    fn commit_contacts(&mut self, book: ContactBook) -> Result<(), Outcome> {
        if let Err(err) = self.store.save_contacts(&book) {
            warn!(error = %err, "contact book not saved");
            return Err(Outcome::failure(FailureKind::Storage, err.to_string()));
        }
        self.contacts = book;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crate::client::testing::{ACCEPTED_JSON, FakeTransport, REJECTED_JSON};

    use super::*;

    struct Harness {
        _tmp: tempfile::TempDir,
        transport: FakeTransport,
        app: App,
    }

    fn harness(transport: FakeTransport, configured: bool) -> Harness {
        let tmp = tempfile::tempdir().unwrap();
        let store = Store::new(tmp.path().join("data"));
        if configured {
            store
                .save_credentials(&Credentials::new("key", "secret"))
                .unwrap();
        }
        let app = App::new(store, transport.client());
        Harness {
            _tmp: tmp,
            transport,
            app,
        }
    }

    fn book(entries: &[(&str, &str)]) -> ContactBook {
        entries
            .iter()
            .map(|(name, number)| ((*name).to_owned(), (*number).to_owned()))
            .collect()
    }

    fn form() -> SendForm {
        SendForm::new("workstation", "0038651628141", "hello")
    }

    #[tokio::test]
    async fn accepted_send_reports_recipient_and_balance_and_adds_contact() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);

        let outcome = h.app.submit_send(&form()).await;
        assert!(outcome.is_success(), "{outcome:?}");
        assert_eq!(outcome.title(), "Success");
        assert!(outcome.message().contains("0038651628141"));
        assert!(outcome.message().contains("1.43"));
        assert_eq!(h.transport.calls(), 1);

        assert_eq!(h.app.contacts().len(), 1);
        assert_eq!(h.app.select_contact("ContactName_0"), Some("0038651628141"));
        assert_eq!(h.app.store().load_contacts(), *h.app.contacts());
    }

    #[tokio::test]
    async fn accepted_send_to_known_number_does_not_add_contact() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        h.app
            .store()
            .save_contacts(&book(&[("Alice", "0038651628141"), ("Bob", "123")]))
            .unwrap();
        h.app.reload_contacts();

        let outcome = h.app.submit_send(&form()).await;
        assert!(outcome.is_success());
        assert_eq!(h.app.contacts().len(), 2);
    }

    #[tokio::test]
    async fn auto_name_uses_book_size_before_insertion() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        h.app
            .store()
            .save_contacts(&book(&[("Alice", "1"), ("Bob", "2")]))
            .unwrap();
        h.app.reload_contacts();

        h.app.submit_send(&form()).await;
        assert_eq!(h.app.select_contact("ContactName_2"), Some("0038651628141"));
        assert_eq!(h.app.contacts().len(), 3);
    }

    #[tokio::test]
    async fn blank_fields_fail_in_order_without_calling_gateway() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);

        let cases = [
            (SendForm::new("", "", ""), "SMS sender cannot be empty"),
            (SendForm::new("me", " ", ""), "SMS recipient cannot be empty"),
            (SendForm::new("me", "123", "\n  \n"), "SMS text cannot be empty"),
            (SendForm::new("", "123", "hi"), "SMS sender cannot be empty"),
        ];
        for (form, expected) in cases {
            let outcome = h.app.submit_send(&form).await;
            assert_eq!(outcome.failure_kind(), Some(FailureKind::Invalid));
            assert_eq!(outcome.message(), expected);
        }

        assert_eq!(h.transport.calls(), 0);
        assert!(h.app.contacts().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_fail_without_calling_gateway() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), false);

        let outcome = h.app.submit_send(&form()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NotConfigured));
        assert_eq!(
            outcome.message(),
            "You need to configure your Nexmo key and secret"
        );
        assert_eq!(h.transport.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_send_shows_raw_response_and_leaves_contacts_alone() {
        let mut h = harness(FakeTransport::new(200, REJECTED_JSON), true);

        let outcome = h.app.submit_send(&form()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Rejected));
        assert_eq!(outcome.title(), "Sending SMS failed");
        assert!(outcome.message().starts_with("Server response:\n"));
        assert!(outcome.message().contains(REJECTED_JSON));
        assert_eq!(h.transport.calls(), 1);

        assert!(h.app.contacts().is_empty());
        assert!(!h.app.store().contacts_path().exists());
    }

    #[tokio::test]
    async fn unreachable_gateway_is_a_network_failure() {
        let mut h = harness(FakeTransport::unreachable("connection refused"), true);

        let outcome = h.app.submit_send(&form()).await;
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Network));
        assert!(outcome.message().contains("connection refused"));
        assert!(h.app.contacts().is_empty());
    }

    #[test]
    fn save_credentials_rejects_blank_fields() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), false);

        for (key, secret) in [("", "secret"), ("key", ""), ("", "")] {
            let outcome = h.app.save_credentials(key, secret);
            assert_eq!(outcome.failure_kind(), Some(FailureKind::Invalid));
            assert_eq!(outcome.message(), "Cannot accept empty key or secret");
        }
        assert!(h.app.credentials().is_none());
        assert!(!h.app.store().credentials_path().exists());
    }

    #[test]
    fn save_and_clear_credentials_update_memory_and_disk() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), false);

        assert!(h.app.save_credentials("key", "secret").is_success());
        assert_eq!(
            h.app.credentials(),
            Some(&Credentials::new("key", "secret"))
        );
        assert_eq!(
            h.app.store().load_credentials(),
            Some(Credentials::new("key", "secret"))
        );

        assert!(h.app.clear_credentials().is_success());
        assert!(h.app.credentials().is_none());
        assert!(!h.app.store().credentials_path().exists());
        assert!(h.app.clear_credentials().is_success());
    }

    #[test]
    fn save_credentials_keeps_key_exactly_as_typed() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), false);

        assert!(h.app.save_credentials(" k ", "s").is_success());
        assert_eq!(
            h.app.store().load_credentials(),
            Some(Credentials::new(" k ", "s"))
        );

        assert!(h.app.save_credentials("   ", " s ").is_success());
        assert_eq!(
            h.app.store().load_credentials(),
            Some(Credentials::new("   ", " s "))
        );
        assert_eq!(h.app.credentials(), Some(&Credentials::new("   ", " s ")));
    }

    #[test]
    fn load_credentials_keeps_memory_when_file_disappears() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        fs::remove_file(h.app.store().credentials_path()).unwrap();

        assert_eq!(
            h.app.load_credentials(),
            Some(&Credentials::new("key", "secret"))
        );
        assert_eq!(
            h.app.load_credentials(),
            Some(&Credentials::new("key", "secret"))
        );
    }

    #[test]
    fn edit_contact_renames_and_renumbers() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        h.app.contacts.insert("ContactName_0", "123");

        let outcome = h.app.edit_contact("ContactName_0", "Alice", "456");
        assert!(outcome.is_success(), "{outcome:?}");
        assert_eq!(h.app.select_contact("ContactName_0"), None);
        assert_eq!(h.app.select_contact("Alice"), Some("456"));
        assert_eq!(h.app.store().load_contacts().get("Alice"), Some("456"));

        assert!(h.app.edit_contact("Alice", "Alice", "789").is_success());
        assert_eq!(h.app.select_contact("Alice"), Some("789"));
    }

    #[test]
    fn edit_contact_rejects_unknown_blank_and_taken_names() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        h.app.contacts.insert("Alice", "1");
        h.app.contacts.insert("Bob", "2");

        let outcome = h.app.edit_contact("Nobody", "Carol", "3");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::UnknownContact));

        let outcome = h.app.edit_contact("Alice", " ", "3");
        assert_eq!(outcome.message(), "Contact name cannot be empty");

        let outcome = h.app.edit_contact("Alice", "Carol", "");
        assert_eq!(outcome.message(), "Contact number cannot be empty");

        let outcome = h.app.edit_contact("Alice", "Bob", "3");
        assert_eq!(outcome.message(), "A contact named 'Bob' already exists");

        assert_eq!(h.app.select_contact("Alice"), Some("1"));
        assert_eq!(h.app.select_contact("Bob"), Some("2"));
        assert!(!h.app.store().contacts_path().exists());
    }

    #[test]
    fn delete_contact_persists_removal() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);
        h.app.contacts.insert("Alice", "1");
        h.app.contacts.insert("Bob", "2");

        assert!(h.app.delete_contact("Alice").is_success());
        assert_eq!(h.app.select_contact("Alice"), None);
        assert_eq!(h.app.store().load_contacts().len(), 1);
    }

    /// App whose data dir sits below a regular file, so every write fails.
    fn unwritable_app(tmp: &tempfile::TempDir) -> App {
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let mut app = App::new(
            Store::new(blocker.join("data")),
            FakeTransport::new(200, ACCEPTED_JSON).client(),
        );
        app.contacts.insert("Alice", "1");
        app.contacts.insert("Bob", "2");
        app
    }

    #[test]
    fn edit_contact_storage_failure_keeps_book() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = unwritable_app(&tmp);
        let before = app.contacts().clone();

        let outcome = app.edit_contact("Alice", "Carol", "3");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Storage));
        assert_eq!(*app.contacts(), before);
        assert_eq!(app.select_contact("Alice"), Some("1"));
        assert_eq!(app.select_contact("Carol"), None);
    }

    #[test]
    fn delete_contact_storage_failure_keeps_book() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = unwritable_app(&tmp);
        let before = app.contacts().clone();

        let outcome = app.delete_contact("Alice");
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Storage));
        assert_eq!(*app.contacts(), before);
        assert_eq!(app.select_contact("Alice"), Some("1"));
    }

    #[test]
    fn deleting_unknown_contact_is_a_no_op() {
        let mut h = harness(FakeTransport::new(200, ACCEPTED_JSON), true);

        let outcome = h.app.delete_contact("Nobody");
        assert!(outcome.is_success());
        assert!(!h.app.store().contacts_path().exists());
    }
}
