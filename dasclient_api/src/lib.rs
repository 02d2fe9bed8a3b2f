pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod das_client;
pub mod dispatcher;
pub mod errors;

pub use auth::{Clock, Credentials, SessionManager, SessionState, SystemClock, Token};
pub use client::{ReqwestTokenClient, TokenClient, TokenGrant, TokenResponse};
pub use config::{DEFAULT_CLIENT_ID, DasConfig};
pub use das_client::DasClient;
pub use dispatcher::{RequestDispatcher, ResourcePath};
pub use errors::{DasError, DasResult};
