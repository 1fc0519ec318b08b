//! REST API client module for the dashboard backend.
//!
//! This module provides the `ApiClient` for the identity check and the
//! application list/create/detail endpoints. Every call carries the stored
//! bearer token when one is available.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
