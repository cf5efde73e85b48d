use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("API error: {0}")]
    Api(String),

    /// The target is already gone (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The resource being created exists (HTTP 422 with an `already_exists` code).
    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Map an HTTP status and GitHub error body onto the taxonomy.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|m| m.as_str())
            .unwrap_or(body)
            .to_string();

        if status == 404 {
            return TriageError::NotFound(message);
        }

        let already_exists = parsed
            .as_ref()
            .and_then(|v| v.get("errors"))
            .and_then(|e| e.as_array())
            .is_some_and(|errors| errors.iter().any(is_already_exists_entry));

        if status == 422 && already_exists {
            TriageError::AlreadyExists(message)
        } else {
            TriageError::Api(format!("{}: {}", status, message))
        }
    }
}

fn is_already_exists_entry(entry: &serde_json::Value) -> bool {
    entry.get("code").and_then(|c| c.as_str()) == Some("already_exists")
}

impl From<octocrab::Error> for TriageError {
    fn from(err: octocrab::Error) -> Self {
        if let octocrab::Error::GitHub { source, .. } = &err {
            if source.status_code.as_u16() == 404 {
                return TriageError::NotFound(source.message.clone());
            }
            let already_exists = source
                .errors
                .as_ref()
                .is_some_and(|errors| errors.iter().any(is_already_exists_entry));
            if already_exists {
                return TriageError::AlreadyExists(source.message.clone());
            }
        }
        TriageError::Api(err.to_string())
    }
}

/// Absorb the error kinds that mean an idempotent operation already took effect.
pub trait Absorb {
    fn ignore_not_found(self) -> Result<()>;
    fn ignore_already_exists(self) -> Result<()>;
}

impl Absorb for Result<()> {
    fn ignore_not_found(self) -> Result<()> {
        match self {
            Err(TriageError::NotFound(msg)) => {
                tracing::debug!(%msg, "treating not-found as success");
                Ok(())
            }
            other => other,
        }
    }

    fn ignore_already_exists(self) -> Result<()> {
        match self {
            Err(TriageError::AlreadyExists(msg)) => {
                tracing::debug!(%msg, "treating already-exists as success");
                Ok(())
            }
            other => other,
        }
    }
}
