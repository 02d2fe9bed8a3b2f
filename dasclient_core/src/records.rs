use serde::Deserialize;
use serde_json::{Map, Value};

use crate::ids::{EventId, SourceId};

/// A source as stored by the service.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SourceRecord {
    pub id: SourceId,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// An event as stored by the service.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    #[serde(default)]
    pub serial_number: Option<i64>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// One page of a paged event listing.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EventPage {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<EventRecord>,
}
