//! Nexmo SMS sender with a local credential store and contact book.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for
//! wire-format quirks, a small client issuing the gateway call, a file-backed
//! store, and a workflow layer turning user actions into [`Outcome`] values.
//!
//! ```rust,no_run
//! use nexmo_sms::{App, SendForm, Settings, Store};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let settings = Settings::from_platform()?;
//!     let mut app = App::new(Store::new(&settings.data_dir), settings.client()?);
//!     app.save_credentials("key", "secret");
//!     let outcome = app
//!         .submit_send(&SendForm::new(settings.default_sender.as_str(), "0038651628141", "hello"))
//!         .await;
//!     println!("{}: {}", outcome.title(), outcome.message());
//!     Ok(())
//! }
//! ```
#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod domain;
pub mod store;
mod transport;
pub mod workflow;

pub use client::{Auth, NexmoClient, NexmoClientBuilder, NexmoError};
pub use config::{ConfigError, Settings};
pub use domain::{
    ApiKey, ApiSecret, ContactName, MessageResult, MessageText, Recipient, SendSms,
    SendSmsResponse, SenderId, StatusCode, ValidationError,
};
pub use store::{ContactBook, Credentials, Store, StoreError};
pub use workflow::{App, ContactError, FailureKind, FormError, Outcome, SendForm};
