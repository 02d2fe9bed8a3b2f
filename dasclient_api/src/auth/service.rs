use std::time::Duration;

use dasclient_core::Timestamp;

use super::types::{Credentials, Token};
use crate::{
    DasError, DasResult,
    client::{TokenClient, TokenGrant},
};

pub const DEFAULT_REFRESH_SKEW: Duration = Duration::from_secs(30);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Unauthenticated,
    Fresh,
    Stale,
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Owns the bearer token and renews it through the token endpoint.
///
/// A manager built from [`Credentials::AccessToken`] holds that token for
/// its whole life and never talks to the token endpoint.
pub struct SessionManager<C, T = SystemClock>
where
    C: TokenClient,
    T: Clock,
{
    client: C,
    credentials: Credentials,
    clock: T,
    token: Option<Token>,
    refresh_skew: Duration,
}

impl<C> SessionManager<C, SystemClock>
where
    C: TokenClient,
{
    pub fn new(client: C, credentials: Credentials) -> Self {
        Self::with_clock(client, credentials, SystemClock)
    }
}

impl<C, T> SessionManager<C, T>
where
    C: TokenClient,
    T: Clock,
{
    pub fn with_clock(client: C, credentials: Credentials, clock: T) -> Self {
        let token = match &credentials {
            Credentials::AccessToken(access_token) => {
                Some(Token::from_access_token(access_token.clone()))
            }
            Credentials::Password { .. } => None,
        };

        Self {
            client,
            credentials,
            clock,
            token,
            refresh_skew: DEFAULT_REFRESH_SKEW,
        }
    }

    pub fn with_refresh_skew(mut self, refresh_skew: Duration) -> Self {
        self.refresh_skew = refresh_skew;
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn state(&self) -> SessionState {
        match &self.token {
            None => SessionState::Unauthenticated,
            Some(token) if token.is_fresh(self.clock.now(), self.refresh_skew) => {
                SessionState::Fresh
            }
            Some(_) => SessionState::Stale,
        }
    }

    /// Drops a token obtained by login. A supplied access token is kept.
    pub fn logout(&mut self) {
        if matches!(self.credentials, Credentials::Password { .. }) {
            self.token = None;
        }
    }

    pub async fn ensure_authenticated(&mut self) -> DasResult<&Token> {
        let outcome = match self.state() {
            SessionState::Fresh => None,
            SessionState::Unauthenticated => Some(self.login().await),
            SessionState::Stale => Some(self.renew().await),
        };

        match outcome {
            None => {}
            Some(Ok(token)) => self.token = Some(token),
            Some(Err(err)) => {
                self.token = None;
                log::warn!("authentication failed: {}", err.display_chain());
                return Err(match err {
                    DasError::Authentication { .. } => err,
                    other => DasError::authentication(other.display_chain().to_string()),
                });
            }
        }

        self.token
            .as_ref()
            .ok_or_else(|| DasError::authentication("no token held after authentication"))
    }

    /// `"<token_type> <access_token>"` for the `Authorization` header.
    pub async fn authorization_header(&mut self) -> DasResult<String> {
        Ok(self.ensure_authenticated().await?.authorization_value())
    }

    async fn renew(&self) -> DasResult<Token> {
        let refresh_grant = match (&self.token, self.credentials.client_id()) {
            (
                Some(Token {
                    refresh_token: Some(refresh_token),
                    ..
                }),
                Some(client_id),
            ) => Some(TokenGrant::RefreshToken {
                refresh_token: refresh_token.clone(),
                client_id: client_id.to_owned(),
            }),
            _ => None,
        };

        match refresh_grant {
            Some(grant) => match self.request(&grant).await {
                Ok(token) => return Ok(token),
                Err(err) => log::warn!(
                    "token refresh failed, logging in again: {}",
                    err.display_chain()
                ),
            },
            None => log::debug!("stale token has no refresh token, logging in again"),
        }

        self.login().await
    }

    async fn login(&self) -> DasResult<Token> {
        let grant = TokenGrant::from_credentials(&self.credentials)
            .ok_or_else(|| DasError::authentication("a supplied access token cannot be renewed"))?;
        self.request(&grant).await
    }

    async fn request(&self, grant: &TokenGrant) -> DasResult<Token> {
        let issued_at = self.clock.now();
        let response = self.client.request_token(grant).await?;
        log::info!(
            "obtained {} token via {} grant, expires in {}s",
            response.token_type,
            grant.grant_type(),
            response.expires_in
        );
        Ok(Token::issued(response, issued_at))
    }
}
