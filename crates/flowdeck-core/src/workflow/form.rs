use thiserror::Error;

use crate::models::{CreateAppRequest, CreateMode};

/// Maximum length for the name field.
const MAX_NAME_LENGTH: usize = 100;

/// Maximum length for the description field.
const MAX_DESCRIPTION_LENGTH: usize = 2000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter an app name")]
    EmptyName,
}

/// Fields of the "create application" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateForm {
    pub name: String,
    pub description: String,
    pub mode: CreateMode,
}

impl CreateForm {
    /// Build the request body. The name is sent as typed; trimming is only
    /// used to reject blank names.
    pub fn to_request(&self) -> Result<CreateAppRequest, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::EmptyName);
        }
        Ok(CreateAppRequest::new(
            self.name.clone(),
            self.description.clone(),
            self.mode,
        ))
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a name character should be accepted
pub fn can_add_name_char(current_len: usize, c: char) -> bool {
    current_len < MAX_NAME_LENGTH && is_valid_input_char(c)
}

/// Check if a description character should be accepted
pub fn can_add_description_char(current_len: usize, c: char) -> bool {
    current_len < MAX_DESCRIPTION_LENGTH && is_valid_input_char(c)
}
