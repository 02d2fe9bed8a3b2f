use std::{fmt, time::Duration};

use dasclient_core::Timestamp;

use crate::client::TokenResponse;

pub const BEARER: &str = "Bearer";

/// How the client proves its identity to the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Password {
        username: String,
        password: String,
        client_id: String,
    },
    /// A token issued outside this client. It is never refreshed.
    AccessToken(String),
}

impl Credentials {
    pub fn password(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self::Password {
            username: username.into(),
            password: password.into(),
            client_id: client_id.into(),
        }
    }

    pub fn access_token(token: impl Into<String>) -> Self {
        Self::AccessToken(token.into())
    }

    pub fn client_id(&self) -> Option<&str> {
        match self {
            Self::Password { client_id, .. } => Some(client_id),
            Self::AccessToken(_) => None,
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password {
                username,
                client_id,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .field("client_id", client_id)
                .finish(),
            Self::AccessToken(_) => f.debug_tuple("AccessToken").field(&"<redacted>").finish(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenExpiry {
    pub issued_at: Timestamp,
    pub expires_in: Duration,
}

impl TokenExpiry {
    /// The last instant, exclusive, at which the token still counts as fresh.
    /// `None` when the lifetime reaches past the representable range.
    pub fn refresh_deadline(&self, refresh_skew: Duration) -> Option<Timestamp> {
        self.issued_at
            .checked_add(self.expires_in)?
            .checked_sub(refresh_skew)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub scope: Option<String>,
    /// `None` for tokens supplied by the caller, which carry no expiry.
    pub expiry: Option<TokenExpiry>,
}

impl Token {
    pub fn from_access_token(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: BEARER.to_owned(),
            scope: None,
            expiry: None,
        }
    }

    pub fn issued(response: TokenResponse, issued_at: Timestamp) -> Self {
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token,
            token_type: response.token_type,
            scope: response.scope,
            expiry: Some(TokenExpiry {
                issued_at,
                expires_in: Duration::from_secs(response.expires_in),
            }),
        }
    }

    /// A lifetime too long to place on the calendar never goes stale.
    pub fn is_fresh(&self, now: Timestamp, refresh_skew: Duration) -> bool {
        match &self.expiry {
            None => true,
            Some(expiry) => expiry
                .refresh_deadline(refresh_skew)
                .is_none_or(|deadline| now < deadline),
        }
    }

    pub fn authorization_value(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}
