use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{location::Location, time::Timestamp};

/// An activity record to create, e.g. a wildlife sighting or a camera-trap
/// alert. Fields the service accepts beyond the common ones go in `extra`
/// and are flattened into the top-level JSON object.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NewEvent {
    pub event_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub event_details: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event_details.insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lower: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upper: Option<Timestamp>,
}

/// The `filter` document of an event query. Sent JSON-encoded inside a
/// single query parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventQuery {
    pub filter: Option<EventFilter>,
    pub include_notes: Option<bool>,
    pub include_related_events: Option<bool>,
    pub include_files: Option<bool>,
    pub include_details: Option<bool>,
    pub include_updates: Option<bool>,
    pub page_size: Option<u32>,
}

impl EventQuery {
    pub fn to_query_pairs(&self) -> Result<Vec<(&'static str, String)>, serde_json::Error> {
        let mut pairs = Vec::new();
        if let Some(filter) = &self.filter {
            pairs.push(("filter", serde_json::to_string(filter)?));
        }

        let flags = [
            ("include_notes", self.include_notes),
            ("include_related_events", self.include_related_events),
            ("include_files", self.include_files),
            ("include_details", self.include_details),
            ("include_updates", self.include_updates),
        ];
        for (name, flag) in flags {
            if let Some(flag) = flag {
                pairs.push((name, flag.to_string()));
            }
        }

        if let Some(page_size) = self.page_size {
            pairs.push(("page_size", page_size.to_string()));
        }
        Ok(pairs)
    }
}
