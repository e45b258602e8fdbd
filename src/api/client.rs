//! HTTP client for the game authority.

use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::error::{ApiError, ApiErrorKind};
use super::wire::{MoveRequest, MoveResponse};
use crate::credential::Credential;
use crate::ranking::RankingEntry;

/// Path prefix of the game API under the authority's base URL.
pub const GAME_API_PREFIX: &str = "/api/game";

/// Client for the authority's game API.
///
/// Every request goes through one dispatch path that attaches the bearer
/// credential when one is supplied.
#[derive(Debug, Clone)]
pub struct ApiClient {
    /// `{api_base_url}/api/game`, no trailing slash.
    game_url: String,
    /// HTTP client.
    client: reqwest::Client,
}

impl ApiClient {
    /// Creates a client for the authority at `api_base_url`.
    #[instrument]
    pub fn new(api_base_url: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(api_base_url).map_err(|e| {
            ApiError::new(
                ApiErrorKind::Url,
                format!("Invalid API base URL {}: {}", api_base_url, e),
            )
        })?;

        let game_url = format!(
            "{}{}",
            parsed.as_str().trim_end_matches('/'),
            GAME_API_PREFIX
        );
        info!(game_url = %game_url, "Creating API client");

        Ok(Self {
            game_url,
            client: reqwest::Client::new(),
        })
    }

    /// Base URL of the game API.
    pub fn game_url(&self) -> &str {
        &self.game_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.game_url, path)
    }

    /// Shared request-dispatch layer: attaches the credential, sends, checks
    /// the status and decodes the JSON body.
    async fn dispatch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: Option<&Credential>,
    ) -> Result<T, ApiError> {
        let request = match credential {
            Some(credential) => request.bearer_auth(credential.expose()),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, body_len = body.len(), "Received response");

        if !status.is_success() {
            warn!(status = %status, body = %body, "Authority returned error status");
            return Err(ApiError::new(
                ApiErrorKind::Status(status.as_u16()),
                format!("Authority returned {}: {}", status, body),
            ));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /move`.
    #[instrument(skip(self, credential, request), fields(index = request.player_index))]
    pub async fn post_move(
        &self,
        credential: &Credential,
        request: &MoveRequest,
    ) -> Result<MoveResponse, ApiError> {
        info!("Sending move to authority");
        let builder = self.client.post(self.endpoint("/move")).json(request);
        let response: MoveResponse = self.dispatch(builder, Some(credential)).await?;
        debug!(game_status = ?response.game_status, "Move confirmed");
        Ok(response)
    }

    /// `GET /leaderboard`. Entries come back in the authority's order.
    #[instrument(skip(self, credential))]
    pub async fn leaderboard(
        &self,
        credential: Option<&Credential>,
    ) -> Result<Vec<RankingEntry>, ApiError> {
        debug!("Fetching leaderboard");
        let builder = self.client.get(self.endpoint("/leaderboard"));
        let entries: Vec<RankingEntry> = self.dispatch(builder, credential).await?;
        debug!(count = entries.len(), "Leaderboard fetched");
        Ok(entries)
    }
}
