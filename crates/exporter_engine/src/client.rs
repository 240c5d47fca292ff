use std::time::Duration;

use url::Url;

use crate::types::{ApiError, ArchiveId, ArchiveList, MonthlyGames};

const DEFAULT_BASE_URL: &str = "https://api.chess.com/pub";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: concat!("chesscom-exporter/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Remote source of archive listings and their game documents. Both calls
/// are plain request/response; no retries happen at this layer.
#[async_trait::async_trait]
pub trait ChesscomApi: Send + Sync {
    async fn list_archives(&self, player: &str) -> Result<Vec<ArchiveId>, ApiError>;
    async fn fetch_archive(&self, archive: &ArchiveId) -> Result<MonthlyGames, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ChesscomClient {
    settings: ClientSettings,
    client: reqwest::Client,
}

impl ChesscomClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { settings, client })
    }

    /// Monthly archive addressed by its components instead of a listing
    /// entry. The service zero-pads months in its paths.
    pub async fn fetch_month(
        &self,
        player: &str,
        year: i32,
        month: i32,
    ) -> Result<MonthlyGames, ApiError> {
        let url = self.endpoint(&format!("player/{player}/games/{year}/{month:02}"))?;
        self.get_json(url).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!(
            "{}/{}",
            self.settings.base_url.as_str().trim_end_matches('/'),
            path
        );
        Url::parse(&raw).map_err(|err| ApiError::InvalidUrl(err.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
    }
}

#[async_trait::async_trait]
impl ChesscomApi for ChesscomClient {
    async fn list_archives(&self, player: &str) -> Result<Vec<ArchiveId>, ApiError> {
        let url = self.endpoint(&format!("player/{player}/games/archives"))?;
        let listing: ArchiveList = self.get_json(url).await?;
        Ok(listing.archives)
    }

    async fn fetch_archive(&self, archive: &ArchiveId) -> Result<MonthlyGames, ApiError> {
        let url =
            Url::parse(archive.as_str()).map_err(|err| ApiError::InvalidUrl(err.to_string()))?;
        self.get_json(url).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    ApiError::Network(err.to_string())
}
