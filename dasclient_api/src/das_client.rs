use std::path::Path;

use dasclient_core::{
    EventId, EventPage, EventQuery, EventRecord, ManufacturerId, NewEvent, NewSource,
    Observation, SourceRecord, SubjectId, Timestamp,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{
    DasResult,
    api::{DataEnvelope, Listing, StatusEnvelope},
    auth::{Clock, Credentials, SessionManager, SessionState, SystemClock},
    client::{ReqwestTokenClient, TokenClient},
    config::DasConfig,
    dispatcher::{RequestDispatcher, ResourcePath},
};

/// Typed operations against one DAS site.
pub struct DasClient<C = ReqwestTokenClient, T = SystemClock>
where
    C: TokenClient,
    T: Clock,
{
    dispatcher: RequestDispatcher<C, T>,
}

impl DasClient<ReqwestTokenClient, SystemClock> {
    pub fn new(config: &DasConfig, credentials: Credentials) -> DasResult<Self> {
        config.validate()?;
        let http = config.http_client()?;
        let token_client =
            ReqwestTokenClient::with_http_client(http.clone(), config.token_endpoint_url()?);
        let session = SessionManager::new(token_client, credentials);
        let dispatcher = RequestDispatcher::new(http, config.service_root_url()?, session)
            .with_provider_key(config.provider_key.clone());
        Ok(Self::from_dispatcher(dispatcher))
    }
}

impl<C, T> DasClient<C, T>
where
    C: TokenClient,
    T: Clock,
{
    pub fn from_dispatcher(dispatcher: RequestDispatcher<C, T>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher<C, T> {
        &self.dispatcher
    }

    pub async fn session_state(&self) -> SessionState {
        self.dispatcher.session_state().await
    }

    pub async fn logout(&self) {
        self.dispatcher.logout().await;
    }

    /// The signed-in user, or `None` when the service reports a status
    /// other than 200 in the body.
    pub async fn me(&self) -> DasResult<Option<Value>> {
        let envelope: StatusEnvelope = self.dispatcher.get("user/me").await?;
        Ok(envelope.into_ok_data())
    }

    /// Service status; useful to check reachability and credentials.
    pub async fn pulse(&self) -> DasResult<Value> {
        self.get_data("status").await
    }

    pub async fn post_source(&self, source: &NewSource) -> DasResult<SourceRecord> {
        log::info!(
            "posting source for manufacturer_id {}",
            source.manufacturer_id
        );
        self.dispatcher.post("sources", source).await
    }

    pub async fn search_source(
        &self,
        manufacturer_id: &ManufacturerId,
    ) -> DasResult<Vec<SourceRecord>> {
        let resource = "sources";
        let envelope: DataEnvelope<Listing<SourceRecord>> = self
            .dispatcher
            .get_with_query(resource, &[("manufacturer_id", manufacturer_id.as_str())])
            .await?;
        Ok(envelope.into_data(resource)?.into_vec())
    }

    pub async fn post_observation(&self, observation: &Observation) -> DasResult<Value> {
        log::debug!(
            "posting observation for {} at {}",
            observation.source,
            observation.recorded_at
        );
        self.dispatcher.post("observations", observation).await
    }

    /// Posts several observations in one request body.
    pub async fn post_observations(&self, observations: &[Observation]) -> DasResult<Value> {
        log::debug!("posting {} observations", observations.len());
        self.dispatcher.post("observations", observations).await
    }

    pub async fn post_event(&self, event: &NewEvent) -> DasResult<EventRecord> {
        log::debug!("posting {} event", event.event_type);
        self.dispatcher.post("activity/events", event).await
    }

    /// Attaches a file to an existing event. A failure here leaves the event
    /// in place without the file.
    pub async fn post_event_file(
        &self,
        event_id: &EventId,
        path: &Path,
        content_type: &str,
        comment: Option<&str>,
    ) -> DasResult<Value> {
        let resource = ResourcePath::new("activity/event")
            .segment(event_id.as_str())
            .segment("files");
        self.dispatcher
            .post_file_with_comment(resource, path, content_type, comment)
            .await
    }

    pub async fn get_subjects(&self, subject_group: Option<&str>) -> DasResult<Vec<Value>> {
        let resource = "subjects";
        let query: Vec<(&str, &str)> = subject_group
            .map(|group| vec![("subject_group", group)])
            .unwrap_or_default();
        let envelope: DataEnvelope<Listing<Value>> =
            self.dispatcher.get_with_query(resource, &query).await?;
        Ok(envelope.into_data(resource)?.into_vec())
    }

    pub async fn get_subject_tracks(
        &self,
        subject_id: &SubjectId,
        since: Option<Timestamp>,
        until: Option<Timestamp>,
    ) -> DasResult<Value> {
        let resource = ResourcePath::new("subject")
            .segment(subject_id.as_str())
            .segment("tracks");
        let mut query = Vec::new();
        if let Some(since) = since {
            query.push(("since", since.to_rfc3339()));
        }
        if let Some(until) = until {
            query.push(("until", until.to_rfc3339()));
        }
        let envelope: DataEnvelope<Value> = self
            .dispatcher
            .get_with_query(resource.clone(), &query)
            .await?;
        envelope.into_data(&resource.to_string())
    }

    pub async fn get_event_types(&self) -> DasResult<Vec<Value>> {
        let resource = "activity/events/eventtypes";
        let envelope: DataEnvelope<Listing<Value>> = self.dispatcher.get(resource).await?;
        Ok(envelope.into_data(resource)?.into_vec())
    }

    /// One page of events matching `query`.
    pub async fn get_events(&self, query: &EventQuery) -> DasResult<EventPage> {
        let resource = "activity/events";
        let pairs = query.to_query_pairs()?;
        let envelope: DataEnvelope<EventPage> =
            self.dispatcher.get_with_query(resource, &pairs).await?;
        envelope.into_data(resource)
    }

    async fn get_data<R>(&self, resource: &str) -> DasResult<R>
    where
        R: DeserializeOwned,
    {
        let envelope: DataEnvelope<R> = self.dispatcher.get(resource).await?;
        envelope.into_data(resource)
    }
}
