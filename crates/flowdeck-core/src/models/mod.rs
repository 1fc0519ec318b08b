//! Data models for the backend and workflow platform.
//!
//! - `RemoteApplication`, `AppMode`: applications listed by the backend
//! - `CreateAppRequest`, `CreatedApp`: the create round trip
//! - `UserRecord`: identity returned by the `/me` endpoint

pub mod application;
pub mod user;

pub use application::{
    AppMode, AppsResponse, CreateAppRequest, CreateMode, CreatedApp, ModeBadge, RemoteApplication,
    DEFAULT_ICON, DEFAULT_ICON_BACKGROUND,
};
pub use user::UserRecord;
