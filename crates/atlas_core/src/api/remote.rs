//! `RemoteStore` backed by the endpoint handlers.
//!
//! Records travel as JSON bodies through `AtlasApi::handle`, so a session
//! reconciling against this remote sees the same status codes and error
//! bodies a networked client would.

use crate::api::{ApiRequest, ApiResponse, AtlasApi, Resource};
use crate::model::checkin::CheckIn;
use crate::model::outcome::Outcome;
use crate::model::source::EvidenceSource;
use crate::model::story_beat::StoryBeat;
use crate::sync::remote::{RemoteStore, SyncError, SyncResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Mutex;

pub struct EndpointRemote {
    api: Mutex<AtlasApi>,
}

impl EndpointRemote {
    pub fn new(api: AtlasApi) -> Self {
        Self {
            api: Mutex::new(api),
        }
    }

    fn call(&self, resource: Resource, request: ApiRequest) -> SyncResult<ApiResponse> {
        let api = self
            .api
            .lock()
            .map_err(|_| SyncError::Unavailable("endpoint lock poisoned".to_string()))?;
        let response = api.handle(resource, &request);
        if response.is_success() {
            return Ok(response);
        }

        let mut message = response.error_message().unwrap_or("request failed").to_string();
        if let Some(detail) = response.body.get("detail").and_then(|value| value.as_str()) {
            message = format!("{message}: {detail}");
        }
        Err(SyncError::Rejected {
            status: response.status,
            message,
        })
    }

    fn post<T, R>(&self, resource: Resource, key: &str, record: &T) -> SyncResult<R>
    where
        T: Serialize,
        R: DeserializeOwned,
    {
        let body =
            serde_json::to_string(record).map_err(|err| SyncError::Decode(err.to_string()))?;
        let response = self.call(resource, ApiRequest::post(body))?;
        field(response, key)
    }
}

fn field<R: DeserializeOwned>(mut response: ApiResponse, key: &str) -> SyncResult<R> {
    let value = response
        .body
        .get_mut(key)
        .map(serde_json::Value::take)
        .ok_or_else(|| SyncError::Decode(format!("response has no `{key}` field")))?;
    serde_json::from_value(value).map_err(|err| SyncError::Decode(err.to_string()))
}

impl RemoteStore for EndpointRemote {
    fn fetch_outcomes(&self) -> SyncResult<Vec<Outcome>> {
        let response = self.call(Resource::Outcomes, ApiRequest::get())?;
        field(response, "outcomes")
    }

    fn push_outcome(&self, outcome: &Outcome) -> SyncResult<Outcome> {
        self.post(Resource::Outcomes, "outcome", outcome)
    }

    fn push_checkin(&self, checkin: &CheckIn) -> SyncResult<CheckIn> {
        self.post(Resource::CheckIns, "checkin", checkin)
    }

    fn push_story_beat(&self, beat: &StoryBeat) -> SyncResult<StoryBeat> {
        self.post(Resource::StoryBeats, "storybeat", beat)
    }

    fn push_source(&self, source: &EvidenceSource) -> SyncResult<EvidenceSource> {
        self.post(Resource::Sources, "source", source)
    }
}
