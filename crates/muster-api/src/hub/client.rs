use reqwest::Client;
use url::Url;

use muster_core::config::HubConfig;
use muster_core::models::{Episode, Instance, InstanceKind, StatusRecord, Unit};

use super::error::HubError;
use super::types::{
    EpisodeDto, ExternalStatusDto, InstanceDto, MutationResponseDto, NativeStatusDto,
    RequestBodyDto, SeasonEpisodesDto, UnitDto,
};
use crate::traits::{MediaBackend, MonitorChange, RequestReceipt, UnitRequest};

/// Client for the dashboard backend ("hub") HTTP API. The hub fronts the
/// catalog, the instance registry, and the per-kind status adapters behind
/// one origin.
pub struct HubClient {
    base_url: String,
    api_key: Option<String>,
    http: Client,
}

impl HubClient {
    pub fn new(base_url: &str, api_key: Option<String>) -> Result<Self, HubError> {
        let parsed = Url::parse(base_url).map_err(|e| HubError::BaseUrl(e.to_string()))?;
        Ok(Self {
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            api_key,
            http: Client::new(),
        })
    }

    pub fn from_config(config: &HubConfig) -> Result<Self, HubError> {
        Self::new(&config.base_url, config.api_key.clone())
    }

    fn apply_key(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("X-Api-Key", key),
            None => req,
        }
    }

    /// Check the HTTP response for errors and return the body text on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, HubError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "hub API error");
            if status == reqwest::StatusCode::NOT_FOUND {
                Err(HubError::NotFound(message))
            } else {
                Err(HubError::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}

impl MediaBackend for HubClient {
    type Error = HubError;

    async fn fetch_unit(&self, unit_id: u64) -> Result<Unit, HubError> {
        let resp = self
            .apply_key(self.http.get(format!("{}/catalog/unit/{unit_id}", self.base_url)))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let dto: UnitDto = resp.json().await.map_err(|e| HubError::Parse(e.to_string()))?;
        Ok(dto.into_unit(unit_id))
    }

    async fn fetch_season_episodes(
        &self,
        unit_id: u64,
        season_number: u32,
    ) -> Result<Vec<Episode>, HubError> {
        let resp = self
            .apply_key(self.http.get(format!(
                "{}/catalog/unit/{unit_id}/season/{season_number}",
                self.base_url
            )))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let dto: SeasonEpisodesDto =
            resp.json().await.map_err(|e| HubError::Parse(e.to_string()))?;
        Ok(dto.episodes.into_iter().map(EpisodeDto::into_episode).collect())
    }

    async fn list_instances(&self, kind: InstanceKind) -> Result<Vec<Instance>, HubError> {
        let resp = self
            .apply_key(self.http.get(format!("{}/instances/{kind}", self.base_url)))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let dtos: Vec<InstanceDto> =
            resp.json().await.map_err(|e| HubError::Parse(e.to_string()))?;
        Ok(dtos.into_iter().map(|d| d.into_instance(kind)).collect())
    }

    async fn fetch_status(
        &self,
        unit_id: u64,
        instance: &Instance,
    ) -> Result<StatusRecord, HubError> {
        let resp = self
            .apply_key(self.http.get(format!("{}/status", self.base_url)).query(&[
                ("unitId", unit_id.to_string().as_str()),
                ("instanceKind", instance.kind.as_str()),
                ("instanceName", &instance.name),
            ]))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;

        // The payload shape depends on the adapter that answered, so decode
        // is dispatched on the kind we asked for.
        let record = match instance.kind {
            InstanceKind::Native => resp
                .json::<NativeStatusDto>()
                .await
                .map_err(|e| HubError::Parse(e.to_string()))?
                .into_record(),
            InstanceKind::External => resp
                .json::<ExternalStatusDto>()
                .await
                .map_err(|e| HubError::Parse(e.to_string()))?
                .into_record(),
        };
        Ok(record)
    }

    async fn set_monitor(
        &self,
        unit_id: u64,
        instance: &Instance,
        change: MonitorChange,
    ) -> Result<(), HubError> {
        let resp = self
            .apply_key(self.http.put(format!("{}/monitor", self.base_url)).query(&[
                ("unitId", unit_id.to_string().as_str()),
                ("instanceId", instance.mutation_id()),
            ]))
            .json(&change)
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let dto: MutationResponseDto =
            resp.json().await.map_err(|e| HubError::Parse(e.to_string()))?;
        if dto.success {
            Ok(())
        } else {
            Err(HubError::Rejected(
                dto.message.unwrap_or_else(|| "monitor change rejected".to_string()),
            ))
        }
    }

    async fn submit_request(
        &self,
        instance: &Instance,
        request: &UnitRequest,
    ) -> Result<RequestReceipt, HubError> {
        let resp = self
            .apply_key(
                self.http
                    .post(format!("{}/request/{}", self.base_url, instance.kind))
                    .query(&[("instanceId", instance.mutation_id())]),
            )
            .json(&RequestBodyDto::from_request(request))
            .send()
            .await?;

        let resp = Self::check_response(resp).await?;
        let dto: MutationResponseDto =
            resp.json().await.map_err(|e| HubError::Parse(e.to_string()))?;
        Ok(dto.into_receipt())
    }
}
