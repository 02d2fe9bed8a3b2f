use serde::Serialize;
use serde_json::{Map, Value};

use crate::ids::ManufacturerId;

pub const DEFAULT_SOURCE_TYPE: &str = "tracking-device";

/// A tracking device to register with the service.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewSource {
    pub manufacturer_id: ManufacturerId,
    pub provider: String,
    pub source_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    pub additional: Map<String, Value>,
}

impl NewSource {
    pub fn new(manufacturer_id: ManufacturerId, provider: impl Into<String>) -> Self {
        Self {
            manufacturer_id,
            provider: provider.into(),
            source_type: DEFAULT_SOURCE_TYPE.to_owned(),
            model_name: None,
            additional: Map::new(),
        }
    }

    pub fn with_source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = source_type.into();
        self
    }

    pub fn with_model_name(mut self, model_name: impl Into<String>) -> Self {
        self.model_name = Some(model_name.into());
        self
    }

    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}
