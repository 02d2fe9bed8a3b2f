use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize, Serializer, ser::SerializeStruct};
use url::Url;

use crate::{
    DasError, DasResult,
    auth::{BEARER, Credentials},
    config::DasConfig,
};

/// A grant sent form-encoded to the OAuth2 token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum TokenGrant {
    Password {
        username: String,
        password: String,
        client_id: String,
    },
    RefreshToken {
        refresh_token: String,
        client_id: String,
    },
}

impl TokenGrant {
    /// The password grant for `credentials`, or `None` for a supplied
    /// access token.
    pub fn from_credentials(credentials: &Credentials) -> Option<Self> {
        match credentials {
            Credentials::Password {
                username,
                password,
                client_id,
            } => Some(Self::Password {
                username: username.clone(),
                password: password.clone(),
                client_id: client_id.clone(),
            }),
            Credentials::AccessToken(_) => None,
        }
    }

    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::Password { .. } => "password",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }
}

impl Serialize for TokenGrant {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Password {
                username,
                password,
                client_id,
            } => {
                let mut ser = serializer.serialize_struct("PasswordGrant", 4)?;
                ser.serialize_field("grant_type", self.grant_type())?;
                ser.serialize_field("username", username)?;
                ser.serialize_field("password", password)?;
                ser.serialize_field("client_id", client_id)?;
                ser.end()
            }
            Self::RefreshToken {
                refresh_token,
                client_id,
            } => {
                let mut ser = serializer.serialize_struct("RefreshTokenGrant", 3)?;
                ser.serialize_field("grant_type", self.grant_type())?;
                ser.serialize_field("refresh_token", refresh_token)?;
                ser.serialize_field("client_id", client_id)?;
                ser.end()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(deserialize_with = "expires_in_secs")]
    pub expires_in: u64,
    #[serde(default)]
    pub scope: Option<String>,
}

fn default_token_type() -> String {
    BEARER.to_owned()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ExpiresIn {
    Secs(u64),
    Text(String),
}

fn expires_in_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match ExpiresIn::deserialize(deserializer)? {
        ExpiresIn::Secs(secs) => Ok(secs),
        ExpiresIn::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid expires_in `{raw}`"))),
    }
}

/// The OAuth2 token endpoint.
#[async_trait]
pub trait TokenClient: Send + Sync {
    async fn request_token(&self, grant: &TokenGrant) -> DasResult<TokenResponse>;
}

#[derive(Clone, Debug)]
pub struct ReqwestTokenClient {
    http: reqwest::Client,
    token_url: Url,
}

impl ReqwestTokenClient {
    pub fn new(config: &DasConfig) -> DasResult<Self> {
        config.validate()?;
        Ok(Self::with_http_client(
            config.http_client()?,
            config.token_endpoint_url()?,
        ))
    }

    pub fn with_http_client(http: reqwest::Client, token_url: Url) -> Self {
        Self { http, token_url }
    }
}

#[async_trait]
impl TokenClient for ReqwestTokenClient {
    async fn request_token(&self, grant: &TokenGrant) -> DasResult<TokenResponse> {
        log::trace!(
            "requesting {} grant from {}",
            grant.grant_type(),
            self.token_url
        );

        let response = self
            .http
            .post(self.token_url.clone())
            .form(grant)
            .send()
            .await?;
        let status = response.status();

        log::debug!(
            "token endpoint answered {} grant with status {}",
            grant.grant_type(),
            status.as_u16()
        );

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DasError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
