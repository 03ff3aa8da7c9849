//! # Have I Been Pwned Client
//! Asynchronous wrapper around the [Have I Been Pwned v3 API](https://haveibeenpwned.com/API/v3), looking up breaches and pastes for an email address, listing breaches by domain or name, and listing data classes, using [`Client`] and [`ClientBuilder`].
//!
//! ## Audience and uses
//! For Rust developers who want to check whether accounts were exposed in known data breaches: configure with [`ClientBuilder`], then call one of the five lookups. Results are typed as [`Breach`], [`Paste`] and [`DataClasses`].
//!
//! ## Runtime requirements
//! Async-only; run inside a Tokio (v1) runtime. HTTP calls use `reqwest`. Each call takes a [`CancellationToken`]; cancelling it aborts the request in flight.
//!
//! ## Out of scope
//! No retries, backoff or caching. A rate-limited call returns [`Error::Remote`] with the server's retry hint and waiting is up to the caller.
//!
//! ## Errors
//! Email addresses are checked locally with [`validate_email`] before account lookups, failing with [`Error::Validation`] without touching the network. Transport failures and timeouts become [`Error::Transport`], cancellation [`Error::Cancelled`], non-200 statuses [`Error::Remote`] carrying an [`ApiError`], and unexpected 200 bodies [`Error::Decode`]. The crate-wide [`Result`] alias wraps these errors.
//!
//! ## Example
//! ```no_run
//! use hibp_client::{CancellationToken, Client};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hibp_client::Error> {
//!     let client = Client::new("my-api-key")?;
//!     let cancel = CancellationToken::new();
//!
//!     let breaches = client
//!         .breached_account(&cancel, "info@example.com", None, false, false)
//!         .await?;
//!     for breach in breaches {
//!         println!("{}: {} accounts", breach.name, breach.pwn_count);
//!     }
//!
//!     let pastes = client.pasted_account(&cancel, "info@example.com").await?;
//!     println!("{} pastes", pastes.len());
//!     Ok(())
//! }
//! ```

mod client;
mod dispatch;
mod email;
mod error;
mod mailbox;
mod models;

pub use client::{Client, ClientBuilder};
pub use email::validate_email;
pub use error::{ApiError, Error, ValidationError};
pub use models::{Breach, DataClasses, Paste};
pub use tokio_util::sync::CancellationToken;

/// Result type alias for Have I Been Pwned operations.
///
/// This is equivalent to `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
