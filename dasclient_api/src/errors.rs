use std::{fmt, path::PathBuf};

use thiserror::Error;

pub type DasResult<T> = Result<T, DasError>;

#[derive(Debug, Error)]
pub enum DasError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
    #[error("invalid url")]
    InvalidUrl(#[from] url::ParseError),
    #[error("authentication failed: {reason}")]
    Authentication { reason: String },
    #[error("token endpoint rejected the grant with status {status}: {body}")]
    TokenRejected { status: u16, body: String },
    #[error("request to `{resource}` failed with status {status}{}", detail_suffix(.detail))]
    Request {
        resource: String,
        status: u16,
        detail: Option<String>,
    },
    #[error("response from `{resource}` has no `data` field")]
    MissingData { resource: String },
    #[error("http transport failed")]
    Transport(#[from] reqwest::Error),
    #[error("json encoding failed")]
    Json(#[from] serde_json::Error),
    #[error("could not read upload file {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(detail) => format!(": {detail}"),
        None => String::new(),
    }
}

impl DasError {
    pub fn authentication(reason: impl Into<String>) -> Self {
        Self::Authentication {
            reason: reason.into(),
        }
    }

    /// Status code of a rejected API request, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_permission_denied(&self) -> bool {
        self.status() == Some(403)
    }

    pub fn display_chain(&self) -> DisplayChainedError<'_> {
        DisplayChainedError { inner: self }
    }
}

pub struct DisplayChainedError<'a> {
    inner: &'a (dyn std::error::Error + 'static),
}

impl fmt::Debug for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self.inner);
        let mut separator = "";

        while let Some(err) = current {
            write!(f, "{separator}{err}")?;
            separator = " -> ";
            current = err.source();
        }

        Ok(())
    }
}

impl fmt::Display for DisplayChainedError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
