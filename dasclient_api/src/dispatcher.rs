use std::{fmt, path::Path};

use reqwest::{
    RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::Mutex as AsyncMutex;
use url::Url;

use crate::{
    DasError, DasResult,
    api::{DataEnvelope, ErrorBody},
    auth::{Clock, SessionManager, SessionState, SystemClock},
    client::TokenClient,
};

const JSON: &str = "application/json";
const UPLOAD_FIELD: &str = "filecontent.file";

/// A resource below the service root, kept as separate path segments.
///
/// Segments are percent-encoded one by one when the URL is built, so a
/// segment holding `/`, `?` or `#` stays a single segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourcePath {
    segments: Vec<String>,
}

impl ResourcePath {
    /// Splits a static path such as `activity/events` on `/`.
    pub fn new(path: &str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Appends one segment verbatim, typically an identifier.
    pub fn segment(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

/// Sends authenticated requests to resources under the service root.
///
/// The session sits behind an async mutex held across "ensure fresh, read
/// header", so concurrent callers share one refresh. The exchange itself runs
/// after the lock is released.
pub struct RequestDispatcher<C, T = SystemClock>
where
    C: TokenClient,
    T: Clock,
{
    http: reqwest::Client,
    service_root: Url,
    provider_key: String,
    session: AsyncMutex<SessionManager<C, T>>,
}

impl<C, T> RequestDispatcher<C, T>
where
    C: TokenClient,
    T: Clock,
{
    pub fn new(http: reqwest::Client, service_root: Url, session: SessionManager<C, T>) -> Self {
        Self {
            http,
            service_root,
            provider_key: crate::config::DEFAULT_PROVIDER_KEY.to_owned(),
            session: AsyncMutex::new(session),
        }
    }

    pub fn with_provider_key(mut self, provider_key: impl Into<String>) -> Self {
        self.provider_key = provider_key.into();
        self
    }

    pub async fn session_state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    pub async fn ensure_authenticated(&self) -> DasResult<()> {
        self.session.lock().await.ensure_authenticated().await?;
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.lock().await.logout();
    }

    pub fn resource_url(&self, resource: &ResourcePath) -> DasResult<Url> {
        let mut url = self.service_root.clone();
        url.path_segments_mut()
            .map_err(|()| DasError::InvalidConfig("service_root cannot hold a path"))?
            .pop_if_empty()
            .extend(resource.segments());
        Ok(url)
    }

    /// GET a resource and decode the whole body. Only status 200 succeeds.
    pub async fn get<R>(&self, resource: impl Into<ResourcePath>) -> DasResult<R>
    where
        R: DeserializeOwned,
    {
        let resource = resource.into();
        let request = self.http.get(self.resource_url(&resource)?);
        let response = self.send("GET", &resource, request).await?;
        read_get_response(&resource, response).await
    }

    pub async fn get_with_query<Q, R>(
        &self,
        resource: impl Into<ResourcePath>,
        query: &Q,
    ) -> DasResult<R>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resource = resource.into();
        let request = self.http.get(self.resource_url(&resource)?).query(query);
        let response = self.send("GET", &resource, request).await?;
        read_get_response(&resource, response).await
    }

    /// POST a JSON body and decode the `data` field of the answer. Status 200
    /// and 201 succeed.
    pub async fn post<B, R>(&self, resource: impl Into<ResourcePath>, body: &B) -> DasResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let resource = resource.into();
        let request = self.http.post(self.resource_url(&resource)?).json(body);
        let response = self.send("POST", &resource, request).await?;
        self.read_post_response(&resource, response).await
    }

    pub async fn post_file<R>(
        &self,
        resource: impl Into<ResourcePath>,
        path: &Path,
        content_type: &str,
    ) -> DasResult<R>
    where
        R: DeserializeOwned,
    {
        self.post_file_with_comment(resource, path, content_type, None)
            .await
    }

    /// Multipart upload of `path` as `filecontent.file`, with an optional
    /// `comment` text field.
    pub async fn post_file_with_comment<R>(
        &self,
        resource: impl Into<ResourcePath>,
        path: &Path,
        content_type: &str,
        comment: Option<&str>,
    ) -> DasResult<R>
    where
        R: DeserializeOwned,
    {
        let resource = resource.into();
        let bytes = tokio::fs::read(path).await.map_err(|source| DasError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_owned());

        log::debug!(
            "uploading {} ({} bytes, {content_type}) to {resource}",
            file_name,
            bytes.len()
        );

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(content_type)?;
        let mut form = Form::new().part(UPLOAD_FIELD, part);
        if let Some(comment) = comment {
            form = form.text("comment", comment.to_owned());
        }

        let request = self.http.post(self.resource_url(&resource)?).multipart(form);
        let response = self.send("POST", &resource, request).await?;
        self.read_post_response(&resource, response).await
    }

    async fn send(
        &self,
        method: &str,
        resource: &ResourcePath,
        request: RequestBuilder,
    ) -> DasResult<Response> {
        let authorization = self.session.lock().await.authorization_header().await?;

        log::trace!("{method} {resource}");
        let response = request
            .header(AUTHORIZATION, authorization)
            .header(ACCEPT, JSON)
            .send()
            .await?;
        log::debug!(
            "{method} {resource} -> {}",
            response.status().as_u16()
        );
        Ok(response)
    }

    async fn read_post_response<R>(
        &self,
        resource: &ResourcePath,
        response: Response,
    ) -> DasResult<R>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            let err = request_error(resource, response).await;
            log::warn!(
                "provider_key: {}, resource: {resource}: {}",
                self.provider_key,
                err.display_chain()
            );
            return Err(err);
        }

        let body = response.bytes().await?;
        let envelope: DataEnvelope<R> = serde_json::from_slice(&body)?;
        envelope.into_data(&resource.to_string())
    }
}

async fn read_get_response<R>(resource: &ResourcePath, response: Response) -> DasResult<R>
where
    R: DeserializeOwned,
{
    if response.status() != StatusCode::OK {
        return Err(request_error(resource, response).await);
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

async fn request_error(resource: &ResourcePath, response: Response) -> DasError {
    let status = response.status().as_u16();
    let detail = match response.text().await {
        Ok(raw) => ErrorBody::detail(&raw),
        Err(_) => None,
    };

    DasError::Request {
        resource: resource.to_string(),
        status,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use url::Url;

    use super::{RequestDispatcher, ResourcePath};
    use crate::{
        auth::{Credentials, SessionManager},
        client::ReqwestTokenClient,
    };

    fn dispatcher_at(root: &str) -> RequestDispatcher<ReqwestTokenClient> {
        let http = reqwest::Client::new();
        let token_url = Url::parse("https://das.example.org/oauth2/token").expect("token url");
        let session = SessionManager::new(
            ReqwestTokenClient::with_http_client(http.clone(), token_url),
            Credentials::access_token("capability"),
        );
        RequestDispatcher::new(http, Url::parse(root).expect("service root"), session)
    }

    #[test]
    fn static_resources_join_below_the_root() {
        let dispatcher = dispatcher_at("https://das.example.org/api/v1.0");
        let url = dispatcher
            .resource_url(&"activity/events/eventtypes".into())
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://das.example.org/api/v1.0/activity/events/eventtypes"
        );

        let trailing = dispatcher_at("https://das.example.org/api/v1.0/");
        let url = trailing.resource_url(&"/status".into()).expect("url");
        assert_eq!(url.as_str(), "https://das.example.org/api/v1.0/status");
    }

    #[test]
    fn identifier_stays_one_segment() {
        let dispatcher = dispatcher_at("https://das.example.org/api/v1.0");
        let resource = ResourcePath::new("subject")
            .segment("a?since=x#y/z")
            .segment("tracks");

        let url = dispatcher.resource_url(&resource).expect("url");

        assert_eq!(url.path(), "/api/v1.0/subject/a%3Fsince=x%23y%2Fz/tracks");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(resource.to_string(), "subject/a?since=x#y/z/tracks");
    }
}
