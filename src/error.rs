// error taxonomy for submissions

use std::fmt;
use std::time::Duration;

use crate::store::Field;

// why a submission ended in Failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    // no response, or one without a usable explanation
    #[error("{0}")]
    Transport(String),

    // service answered with a detail field
    #[error("{detail}")]
    Service { status: u16, detail: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid response from planning service: {0}")]
    InvalidResponse(String),
}

impl PlanningError {
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PlanningError::Service { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PlanningError {
    fn from(err: reqwest::Error) -> Self {
        PlanningError::Transport(err.to_string())
    }
}

// submission blocked locally, nothing was sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub fields: Vec<Field>,
}

impl ValidationError {
    pub fn missing_credentials(&self) -> bool {
        self.fields.iter().any(|field| field.is_credential())
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.missing_credentials() {
            f.write_str("Please enter both API keys")?;
        }

        let others: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| !field.is_credential())
            .map(|field| field.label())
            .collect();
        if !others.is_empty() {
            if self.missing_credentials() {
                f.write_str("; ")?;
            }
            write!(f, "Please check: {}", others.join(", "))?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
