//! Workflow application management.
//!
//! - `AppsController`: list/create state machine over the backend API
//! - `CreateForm`: the creation form and its validation

pub mod controller;
pub mod form;

pub use controller::{
    AppsController, ControllerEvent, FormState, LoadState, Notification, NotificationLevel,
    DEFAULT_OPEN_DELAY,
};
pub use form::{can_add_description_char, can_add_name_char, CreateForm, FormError};
