use serde::Serialize;
use serde_json::{Map, Value};

use crate::{ids::ManufacturerId, location::Location, time::Timestamp};

/// A timestamped position reported by a source.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Observation {
    pub source: ManufacturerId,
    pub recorded_at: Timestamp,
    pub location: Location,
    pub additional: Map<String, Value>,
}

impl Observation {
    pub fn new(source: ManufacturerId, recorded_at: Timestamp, location: Location) -> Self {
        Self {
            source,
            recorded_at,
            location,
            additional: Map::new(),
        }
    }

    pub fn with_additional(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.additional.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::Observation;
    use crate::{ids::ManufacturerId, location::Location, time::Timestamp};

    #[test]
    fn serializes_to_observation_wire_shape() {
        let observation = Observation::new(
            ManufacturerId("collar-42".to_string()),
            Timestamp::from_epoch_secs(1_700_000_000).expect("valid epoch"),
            Location::new(36.8, -1.3).expect("valid point"),
        )
        .with_additional("speed_kmph", 4.5);

        assert_eq!(
            serde_json::to_value(&observation).expect("serializable"),
            json!({
                "source": "collar-42",
                "recorded_at": "2023-11-14T22:13:20Z",
                "location": {"latitude": -1.3, "longitude": 36.8},
                "additional": {"speed_kmph": 4.5},
            })
        );
    }
}
