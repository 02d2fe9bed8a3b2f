pub mod event;
pub mod ids;
pub mod location;
pub mod observation;
pub mod records;
pub mod source;
pub mod time;

pub use event::{DateRange, EventFilter, EventQuery, NewEvent};
pub use ids::{EventId, ManufacturerId, SourceId, SubjectId};
pub use location::{CoordinateError, Location};
pub use observation::Observation;
pub use records::{EventPage, EventRecord, SourceRecord};
pub use source::{DEFAULT_SOURCE_TYPE, NewSource};
pub use time::Timestamp;
