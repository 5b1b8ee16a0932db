use crate::config::Config;
use kinobot_domain::EpisodeInfo;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// External catalog with per-show episode lists. Release dates come in
/// as free-form strings and are routinely missing or garbled; both are
/// treated as "already released".
#[async_trait::async_trait]
pub trait ISeriesMetadataService: Send + Sync {
    async fn episodes(&self, show_id: i64) -> anyhow::Result<Vec<EpisodeInfo>>;
}

#[derive(Debug, Deserialize)]
struct EpisodeRaw {
    season: u32,
    episode: u32,
    #[serde(default)]
    release_date: Option<String>,
}

impl From<EpisodeRaw> for EpisodeInfo {
    fn from(raw: EpisodeRaw) -> Self {
        let release_date = raw.release_date.as_deref().and_then(|date| {
            let parsed = date.parse().ok();
            if parsed.is_none() {
                warn!(
                    "Garbled release date {:?} for S{}E{}, treating as released",
                    date, raw.season, raw.episode
                );
            }
            parsed
        });
        Self {
            season: raw.season,
            episode: raw.episode,
            release_date,
        }
    }
}

#[derive(Debug, Deserialize)]
struct EpisodesResponse {
    episodes: Vec<EpisodeRaw>,
}

pub struct SeriesMetadataRestApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SeriesMetadataRestApi {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.external_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.series_metadata_url.clone(),
            api_key: config.series_metadata_api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl ISeriesMetadataService for SeriesMetadataRestApi {
    async fn episodes(&self, show_id: i64) -> anyhow::Result<Vec<EpisodeInfo>> {
        let res: EpisodesResponse = self
            .client
            .get(format!("{}/shows/{}/episodes", self.base_url, show_id))
            .header("kinobot-metadata-key", &self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(res.episodes.into_iter().map(|episode| episode.into()).collect())
    }
}

/// Scriptable metadata service for tests.
pub struct InMemorySeriesMetadataService {
    shows: Mutex<HashMap<i64, Vec<EpisodeInfo>>>,
}

impl InMemorySeriesMetadataService {
    pub fn new() -> Self {
        Self {
            shows: Mutex::new(HashMap::new()),
        }
    }

    pub fn set_episodes(&self, show_id: i64, episodes: Vec<EpisodeInfo>) {
        self.shows.lock().unwrap().insert(show_id, episodes);
    }
}

impl Default for InMemorySeriesMetadataService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ISeriesMetadataService for InMemorySeriesMetadataService {
    async fn episodes(&self, show_id: i64) -> anyhow::Result<Vec<EpisodeInfo>> {
        Ok(self
            .shows
            .lock()
            .unwrap()
            .get(&show_id)
            .cloned()
            .unwrap_or_default())
    }
}
