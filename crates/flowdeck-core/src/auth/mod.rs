//! Authentication module for session storage and validation.
//!
//! This module provides:
//! - `CredentialStore`: key-value storage for the token and identity record
//!   (file, OS keychain or in-memory)
//! - `Credentials`: typed access to the stored session
//! - `SessionGuard`: non-blocking validation of the stored session
//! - `login` / `logout`: writing and clearing the session

pub mod credentials;
pub mod guard;
pub mod session;
pub mod store;

pub use credentials::KeyringCredentialStore;
pub use guard::{GuardEvent, GuardMount, Route, SessionGuard};
pub use session::{login, logout, Credentials, TOKEN_KEY, USER_KEY};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
