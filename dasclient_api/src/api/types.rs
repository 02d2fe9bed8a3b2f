use serde::Deserialize;
use serde_json::Value;

use crate::{DasError, DasResult};

/// The `{"data": ...}` wrapper around most response bodies.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: Option<T>,
}

impl<T> DataEnvelope<T> {
    pub fn into_data(self, resource: &str) -> DasResult<T> {
        self.data.ok_or_else(|| DasError::MissingData {
            resource: resource.to_owned(),
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ResponseStatus {
    #[serde(default)]
    pub code: Option<u16>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

/// A body carrying both a service status and a payload, as `user/me` does.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StatusEnvelope {
    #[serde(default)]
    pub status: Option<ResponseStatus>,
    #[serde(default)]
    pub data: Option<Value>,
}

impl StatusEnvelope {
    /// The payload when the service reported status code 200.
    pub fn into_ok_data(self) -> Option<Value> {
        match self.status {
            Some(ResponseStatus {
                code: Some(200), ..
            }) => self.data,
            _ => None,
        }
    }
}

/// The body of a rejected request, when the service explains itself.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub status: Option<ResponseStatus>,
}

impl ErrorBody {
    pub fn detail(raw: &str) -> Option<String> {
        let body: ErrorBody = serde_json::from_str(raw).ok()?;
        let status = body.status?;
        status.detail.or(status.message)
    }
}

/// List endpoints answer either with a bare array or with a paged object.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Items(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Page { results } => results,
            Self::Items(items) => items,
        }
    }
}
