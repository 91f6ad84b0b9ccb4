//! # ezid - client for the EZID identifier service
//!
//! A blocking Rust client for [EZID](https://ezid.cdlib.org), the service that
//! mints and maintains persistent identifiers (ARKs and DOIs). Requests and
//! responses use ANVL, a plain `label: value` text format.
//!
//! ## Features
//!
//! - View, mint, create, update and delete identifiers
//! - Session handling: log in once with Basic credentials, then reuse the
//!   session cookie; mutating calls log in on demand
//! - ANVL encoding and decoding with the service's percent-escaping rules
//! - Structured view of responses
//! - Batch minting with a local index file
//!
//! ## Basic Usage
//!
//! ```no_run
//! use ezid::{Auth, EzidClient};
//!
//! fn main() -> Result<(), ezid::EzidError> {
//!     // Public identifiers need no login
//!     let client = EzidClient::new(Auth::None)?;
//!     println!("{}", client.view("ark:/13030/c88s4n09")?);
//!     Ok(())
//! }
//! ```
//!
//! ## Minting
//!
//! ```no_run
//! use ezid::{Auth, EzidClient, Record};
//!
//! let mut client = EzidClient::new(Auth::credentials("apitest", "secret"))?;
//!
//! let mut record = Record::new();
//! record.insert("_profile".to_string(), "dc".to_string());
//!
//! // Logs in first, then mints
//! let ark = client.mint("ark:/99999/fk4", Some(&record))?;
//!
//! record.insert("dc.title".to_string(), "Test Title".to_string());
//! client.update(&ark, &record)?;
//! client.logout()?;
//! # Ok::<(), ezid::EzidError>(())
//! ```

pub mod anvl;
pub mod cli;
pub mod client;
pub mod error;
pub mod ezid;
pub mod minter;
pub mod response;
pub mod session;

// Re-export main types for convenience
pub use anvl::Record;
pub use client::{Config, DEFAULT_SERVER};
pub use error::{AuthError, EzidError, Result};
pub use ezid::EzidClient;
pub use minter::{mint_batch, MintIndex};
pub use response::{Response, Status};
pub use session::{Auth, Credentials, Session};
