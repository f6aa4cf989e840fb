//! Error handling for rdap-bootstrap

use crate::types::Category;
use thiserror::Error;

/// Main error type for rdap-bootstrap
#[derive(Error, Debug, Clone)]
pub enum BootstrapError {
    #[error("Invalid IP address '{input}': {message}")]
    InvalidAddress { input: String, message: String },

    #[error("Failed to fetch {category} bootstrap document: {message}")]
    FetchFailed {
        category: Category,
        message: String,
        url: Option<String>,
    },

    #[error("Failed to parse {category} bootstrap document: {message}")]
    ParseFailed { category: Category, message: String },

    #[error("No RDAP server found for {object_type} '{object}'")]
    NotFound { object_type: String, object: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl BootstrapError {
    /// Create an invalid address error
    pub fn invalid_address(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Create a fetch error for one bootstrap category
    pub fn fetch_failed(
        category: Category,
        message: impl Into<String>,
        url: Option<String>,
    ) -> Self {
        Self::FetchFailed {
            category,
            message: message.into(),
            url,
        }
    }

    /// Create a parse error for one bootstrap category
    pub fn parse_failed(category: Category, message: impl Into<String>) -> Self {
        Self::ParseFailed {
            category,
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(object_type: impl Into<String>, object: impl Into<String>) -> Self {
        Self::NotFound {
            object_type: object_type.into(),
            object: object.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for errors caused by the query itself rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::BadRequest { .. } | Self::InvalidAddress { .. } | Self::NotFound { .. }
        )
    }

    /// HTTP status the hosting layer should answer with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } | Self::InvalidAddress { .. } => 400,
            Self::NotFound { .. } => 404,
            _ => 500,
        }
    }

    /// Message safe to show to a client.
    ///
    /// Fetch and parse failures are collapsed into a generic message so that
    /// upstream URLs and payload fragments never leak out of the service.
    pub fn user_message(&self) -> String {
        match self {
            Self::BadRequest { message } => format!("Bad request: {}", message),
            Self::InvalidAddress { input, .. } => format!("Bad request: invalid IP address '{}'", input),
            Self::NotFound { object_type, object } => {
                format!("No RDAP server known for {} '{}'", object_type, object)
            }
            _ => "Internal server error".to_string(),
        }
    }
}

impl From<reqwest::Error> for BootstrapError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string());
        let category = url
            .as_deref()
            .and_then(Category::from_url)
            .unwrap_or(Category::Dns);

        if err.is_timeout() {
            Self::fetch_failed(category, "request timed out", url)
        } else if err.is_connect() {
            Self::fetch_failed(category, "connection failed", url)
        } else if let Some(status) = err.status() {
            Self::fetch_failed(category, format!("HTTP status {}", status), url)
        } else {
            Self::fetch_failed(category, err.to_string(), url)
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, BootstrapError>;
