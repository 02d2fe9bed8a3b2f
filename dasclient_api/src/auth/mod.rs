mod service;
mod types;

pub use service::{Clock, DEFAULT_REFRESH_SKEW, SessionManager, SessionState, SystemClock};
pub use types::{BEARER, Credentials, Token, TokenExpiry};
