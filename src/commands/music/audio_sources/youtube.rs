//! Implements the `SearchGateway` trait on top of the YouTube Data API v3.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serenity::async_trait;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::{SearchGateway, Track};

/// Errors that can occur while talking to the YouTube Data API.
#[derive(Error, Debug)]
pub enum YoutubeSearchError {
    /// Error during HTTP request communication.
    #[error("API communication failure: {0}")]
    Api(#[from] reqwest::Error),

    /// The configured base URL could not be turned into an endpoint.
    #[error("Invalid API URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Top level of a `search.list` response. Only the fields we read are modelled.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchListResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: ResourceId,
    pub snippet: Snippet,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceId {
    pub video_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Snippet {
    pub title: String,
}

/// YouTube search client holding the API key and a reusable HTTP client.
pub struct YoutubeSearch {
    client: Client,
    base_url: String,
    api_key: String,
}

impl YoutubeSearch {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Watch-page URL for a video id.
    pub fn watch_url(video_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", video_id)
    }

    /// Query `search.list` for the single best video match.
    pub async fn first_video(&self, query: &str) -> Result<Option<Track>, YoutubeSearchError> {
        let endpoint = Url::parse(&self.base_url)?.join("youtube/v3/search")?;

        let response = self
            .client
            .get(endpoint)
            .query(&[
                ("part", "id,snippet"),
                ("maxResults", "1"),
                ("type", "video"),
                ("q", query),
                ("key", self.api_key.as_str()),
            ])
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let body: SearchListResponse = response.json().await?;

        Ok(body.items.into_iter().find_map(|item| {
            let video_id = item.id.video_id?;
            Some(Track::new(
                decode_html_entities(&item.snippet.title),
                Self::watch_url(&video_id),
            ))
        }))
    }
}

#[async_trait]
impl SearchGateway for YoutubeSearch {
    async fn search(&self, query: &str) -> Option<Track> {
        match self.first_video(query).await {
            Ok(Some(track)) => {
                info!("Found: {} - {}", track.title, track.url);
                Some(track)
            }
            Ok(None) => {
                info!("No YouTube results for '{}'", query);
                None
            }
            Err(e) => {
                warn!("YouTube search for '{}' failed: {}", query, e);
                None
            }
        }
    }
}

/// The API returns titles HTML-escaped (`Don&#39;t Stop`).
/// A title that fails to decode is shown as received.
fn decode_html_entities(input: &str) -> String {
    htmlescape::decode_html(input).unwrap_or_else(|e| {
        debug!("Keeping undecodable title {:?}: {:?}", input, e);
        input.to_string()
    })
}
