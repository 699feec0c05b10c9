use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use muster_core::models::{
    Episode, EpisodeStatus, Instance, InstanceKind, MediaType, SeasonStatus, SeasonSummary,
    StatusRecord, Unit,
};

use crate::traits::{RequestReceipt, UnitRequest};

// ── Catalog types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    pub title: String,
    pub media_type: Option<MediaType>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummaryDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonSummaryDto {
    pub season_number: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

#[derive(Debug, Deserialize)]
pub struct SeasonEpisodesDto {
    pub episodes: Vec<EpisodeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpisodeDto {
    pub episode_number: u32,
    #[serde(default)]
    pub title: String,
    pub air_date: Option<NaiveDate>,
}

impl UnitDto {
    /// The unit id lives in the request path, not the payload, so the
    /// caller supplies it. Older hub builds omit `mediaType`; a unit with
    /// seasons is a series, anything else a movie.
    pub fn into_unit(self, unit_id: u64) -> Unit {
        let media_type = self.media_type.unwrap_or(if self.seasons.is_empty() {
            MediaType::Movie
        } else {
            MediaType::Series
        });
        Unit {
            id: unit_id,
            title: self.title,
            media_type,
            seasons: self.seasons.into_iter().map(SeasonSummaryDto::into_summary).collect(),
        }
    }
}

impl SeasonSummaryDto {
    pub fn into_summary(self) -> SeasonSummary {
        SeasonSummary {
            season_number: self.season_number,
            name: self.name,
            episode_count: self.episode_count,
        }
    }
}

impl EpisodeDto {
    pub fn into_episode(self) -> Episode {
        Episode {
            episode_number: self.episode_number,
            title: self.title,
            air_date: self.air_date,
        }
    }
}

// ── Instance registry types ──────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct InstanceDto {
    pub name: String,
    pub id: Option<String>,
}

impl InstanceDto {
    /// The kind is implied by which registry endpoint returned the entry.
    pub fn into_instance(self, kind: InstanceKind) -> Instance {
        Instance {
            kind,
            name: self.name,
            id: self.id,
        }
    }
}

// ── Status types (native shape) ──────────────────────────────────

/// Status payload of a native instance: explicit monitoring flags at every
/// level and an explicit per-episode availability flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeStatusDto {
    #[serde(default)]
    pub exists: bool,
    #[serde(default)]
    pub monitored: bool,
    pub root_path: Option<String>,
    #[serde(default)]
    pub seasons: Vec<NativeSeasonDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeSeasonDto {
    pub season_number: u32,
    #[serde(default)]
    pub monitored: bool,
    #[serde(default)]
    pub episodes: Vec<NativeEpisodeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeEpisodeDto {
    pub episode_number: u32,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub monitored: bool,
    pub quality: Option<String>,
    pub episode_file: Option<String>,
}

impl NativeStatusDto {
    pub fn into_record(self) -> StatusRecord {
        StatusRecord {
            exists: self.exists,
            monitored: Some(self.monitored),
            root_path: self.root_path,
            seasons: self.seasons.into_iter().map(NativeSeasonDto::into_season).collect(),
        }
    }
}

impl NativeSeasonDto {
    fn into_season(self) -> SeasonStatus {
        SeasonStatus {
            season_number: self.season_number,
            monitored: Some(self.monitored),
            episodes: self
                .episodes
                .into_iter()
                .map(|ep| EpisodeStatus {
                    episode_number: ep.episode_number,
                    available: ep.available,
                    monitored: Some(ep.monitored),
                    quality: ep.quality,
                    file: ep.episode_file,
                })
                .collect(),
        }
    }
}

// ── Status types (external shape) ────────────────────────────────

/// Status payload of an external instance: no monitoring anywhere, and
/// availability carried only by per-episode file and quality fields.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalStatusDto {
    #[serde(default)]
    pub exists: bool,
    pub root_path: Option<String>,
    #[serde(default)]
    pub seasons: Vec<ExternalSeasonDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSeasonDto {
    pub season_number: u32,
    #[serde(default)]
    pub episodes: Vec<ExternalEpisodeDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalEpisodeDto {
    pub episode_number: u32,
    pub quality: Option<String>,
    pub file: Option<String>,
}

impl ExternalStatusDto {
    pub fn into_record(self) -> StatusRecord {
        StatusRecord {
            exists: self.exists,
            monitored: None,
            root_path: self.root_path,
            seasons: self.seasons.into_iter().map(ExternalSeasonDto::into_season).collect(),
        }
    }
}

impl ExternalSeasonDto {
    fn into_season(self) -> SeasonStatus {
        SeasonStatus {
            season_number: self.season_number,
            monitored: None,
            episodes: self
                .episodes
                .into_iter()
                .map(|ep| EpisodeStatus {
                    episode_number: ep.episode_number,
                    available: false,
                    monitored: None,
                    quality: ep.quality,
                    file: ep.file,
                })
                .collect(),
        }
    }
}

// ── Mutation types ───────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MutationResponseDto {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

impl MutationResponseDto {
    pub fn into_receipt(self) -> RequestReceipt {
        RequestReceipt {
            success: self.success,
            message: self.message,
        }
    }
}

/// Flat wire body of the request endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBodyDto<'a> {
    pub unit_id: u64,
    pub unit_title: &'a str,
    pub granularity: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub season_number: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

impl<'a> RequestBodyDto<'a> {
    pub fn from_request(request: &'a UnitRequest) -> Self {
        RequestBodyDto {
            unit_id: request.unit_id,
            unit_title: &request.unit_title,
            granularity: request.scope.granularity(),
            season_number: request.scope.season_number(),
            episode_number: request.scope.episode_number(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::RequestScope;
    use muster_core::reconcile;

    #[test]
    fn test_deserialize_unit() {
        let json = r#"{
            "title": "Cosmos",
            "mediaType": "series",
            "seasons": [
                { "seasonNumber": 1, "name": "Season 1", "episodeCount": 13 },
                { "seasonNumber": 2, "name": null, "episodeCount": 0 }
            ]
        }"#;

        let dto: UnitDto = serde_json::from_str(json).unwrap();
        let unit = dto.into_unit(42);
        assert_eq!(unit.id, 42);
        assert_eq!(unit.title, "Cosmos");
        assert_eq!(unit.media_type, MediaType::Series);
        assert_eq!(unit.seasons.len(), 2);
        assert_eq!(unit.episode_total(1), 13);
        assert_eq!(unit.episode_total(2), 0);
        assert_eq!(unit.episode_total(3), 0);
    }

    #[test]
    fn test_media_type_inferred_when_missing() {
        let series: UnitDto = serde_json::from_str(
            r#"{ "title": "A", "seasons": [{ "seasonNumber": 1, "episodeCount": 8 }] }"#,
        )
        .unwrap();
        assert_eq!(series.into_unit(1).media_type, MediaType::Series);

        let movie: UnitDto = serde_json::from_str(r#"{ "title": "B" }"#).unwrap();
        assert_eq!(movie.into_unit(2).media_type, MediaType::Movie);
    }

    #[test]
    fn test_deserialize_season_episodes() {
        let json = r#"{
            "episodes": [
                { "episodeNumber": 1, "title": "Pilot", "airDate": "2020-01-05" },
                { "episodeNumber": 2, "airDate": null }
            ]
        }"#;

        let dto: SeasonEpisodesDto = serde_json::from_str(json).unwrap();
        let episodes: Vec<Episode> =
            dto.episodes.into_iter().map(EpisodeDto::into_episode).collect();
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].title, "Pilot");
        assert_eq!(
            episodes[0].air_date,
            NaiveDate::from_ymd_opt(2020, 1, 5)
        );
        assert_eq!(episodes[1].title, "");
        assert!(episodes[1].air_date.is_none());
    }

    #[test]
    fn test_deserialize_instances() {
        let json = r#"[
            { "name": "main", "id": "3" },
            { "name": "anime", "id": null }
        ]"#;

        let dtos: Vec<InstanceDto> = serde_json::from_str(json).unwrap();
        let instances: Vec<Instance> = dtos
            .into_iter()
            .map(|d| d.into_instance(InstanceKind::Native))
            .collect();
        assert_eq!(instances[0].key(), (InstanceKind::Native, "main"));
        assert_eq!(instances[0].mutation_id(), "3");
        assert_eq!(instances[1].mutation_id(), "anime");
    }

    #[test]
    fn test_deserialize_native_status() {
        let json = r#"{
            "exists": true,
            "monitored": true,
            "rootPath": "/library/tv",
            "seasons": [
                {
                    "seasonNumber": 1,
                    "monitored": true,
                    "episodes": [
                        { "episodeNumber": 1, "available": true, "monitored": true, "quality": "1080p", "episodeFile": "/library/tv/s01e01.mkv" },
                        { "episodeNumber": 2, "available": false, "monitored": false, "quality": null, "episodeFile": null }
                    ]
                }
            ]
        }"#;

        let record = serde_json::from_str::<NativeStatusDto>(json).unwrap().into_record();
        assert!(record.exists);
        assert_eq!(record.monitored, Some(true));
        assert_eq!(record.root_path.as_deref(), Some("/library/tv"));

        let season = record.season(1).unwrap();
        assert_eq!(season.monitored, Some(true));
        assert_eq!(season.episodes[0].monitored, Some(true));
        assert!(season.episodes[0].available);
        assert_eq!(season.episodes[0].file.as_deref(), Some("/library/tv/s01e01.mkv"));
        assert!(!season.episodes[1].available);
    }

    #[test]
    fn test_deserialize_external_status() {
        // The external shape has no monitoring and no availability flag;
        // file and quality fields are all there is.
        let json = r#"{
            "exists": true,
            "rootPath": "/mnt/media",
            "seasons": [
                {
                    "seasonNumber": 1,
                    "episodes": [
                        { "episodeNumber": 1, "quality": "720p", "file": "/mnt/media/e01.mkv" },
                        { "episodeNumber": 2, "quality": null, "file": null }
                    ]
                }
            ]
        }"#;

        let record = serde_json::from_str::<ExternalStatusDto>(json).unwrap().into_record();
        assert!(record.exists);
        assert_eq!(record.monitored, None);

        let map = reconcile::availability_map(&record);
        assert_eq!(map.get(&1).map(|m| m.len()), Some(1));
        assert_eq!(
            map.get(&1).and_then(|m| m.get(&1)).and_then(|a| a.quality.as_deref()),
            Some("720p")
        );
        assert!(reconcile::monitored_map(&record, InstanceKind::External).is_empty());
    }

    #[test]
    fn test_deserialize_sparse_status() {
        // A unit the instance does not hold comes back nearly empty.
        let record = serde_json::from_str::<NativeStatusDto>(r#"{ "exists": false }"#)
            .unwrap()
            .into_record();
        assert!(!record.exists);
        assert!(record.seasons.is_empty());
    }

    #[test]
    fn test_deserialize_mutation_response() {
        let ok: MutationResponseDto = serde_json::from_str(r#"{ "success": true }"#).unwrap();
        assert!(ok.success);
        assert!(ok.message.is_none());

        let rejected: MutationResponseDto = serde_json::from_str(
            r#"{ "success": false, "message": "no root folder configured" }"#,
        )
        .unwrap();
        let receipt = rejected.into_receipt();
        assert!(!receipt.success);
        assert_eq!(receipt.message.as_deref(), Some("no root folder configured"));
    }

    #[test]
    fn test_request_body_shape() {
        let request = UnitRequest {
            unit_id: 7,
            unit_title: "Cosmos".to_string(),
            scope: RequestScope::Season(2),
        };
        let body = serde_json::to_value(RequestBodyDto::from_request(&request)).unwrap();
        assert_eq!(body["unitId"], 7);
        assert_eq!(body["unitTitle"], "Cosmos");
        assert_eq!(body["granularity"], "season");
        assert_eq!(body["seasonNumber"], 2);
        assert!(body.get("episodeNumber").is_none());
    }
}
