use std::fmt::{Display, Formatter, Result};

use portal_client::PortalError;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    NotADeployedSolution(String),
    PortalError(String),
    DeserializationError(String),
    InvalidInput(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Error::NotADeployedSolution(id) => write!(f, "Item {} is not a deployed Solution", id),
            Error::PortalError(message) => write!(f, "Portal error: {}", message),
            Error::DeserializationError(message) => write!(f, "Deserialization error: {}", message),
            Error::InvalidInput(message) => write!(f, "Invalid input: {}", message),
        }
    }
}

impl std::error::Error for Error {}

impl From<PortalError> for Error {
    fn from(err: PortalError) -> Self {
        Error::PortalError(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::DeserializationError(err.to_string())
    }
}
