mod types;

pub use types::{DataEnvelope, ErrorBody, Listing, ResponseStatus, StatusEnvelope};
