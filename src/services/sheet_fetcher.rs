use crate::config::SheetSource;
use crate::error::PipelineError;
use crate::models::sheet::{ApiErrorBody, ProxyPayload, RawMatrix, ValuesResponse};
use reqwest::{Response, Url};
use std::time::Duration;

pub const SHEETS_API_BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const USER_AGENT: &str = concat!("olympiad-leaderboard/", env!("CARGO_PKG_VERSION"));

/// Pulls the raw cell matrix from the configured sheet source.
///
/// One request per call. Failures are returned to the caller; nothing is retried.
#[derive(Clone)]
pub struct SheetFetcher {
    http_client: reqwest::Client,
    api_base: String,
}

impl SheetFetcher {
    pub fn new(timeout: Duration) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            api_base: SHEETS_API_BASE_URL.to_string(),
        })
    }

    /// Point direct API calls somewhere other than the public endpoint.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub async fn fetch(&self, source: &SheetSource) -> Result<RawMatrix, PipelineError> {
        match source {
            SheetSource::ProxyEndpoint { url } => self.fetch_from_proxy(url).await,
            SheetSource::DirectApi {
                sheet_id,
                range,
                api_key,
            } => self.fetch_from_api(sheet_id, range, api_key).await,
        }
    }

    async fn fetch_from_proxy(&self, url: &str) -> Result<RawMatrix, PipelineError> {
        tracing::debug!(url = %url, "Fetching leaderboard sheet from web app");

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;

        serde_json::from_value::<ProxyPayload>(body)
            .map(ProxyPayload::into_matrix)
            .map_err(|_| {
                PipelineError::MalformedPayload(
                    "web app must return a 2-D array or an object with a `data` 2-D array".into(),
                )
            })
    }

    async fn fetch_from_api(
        &self,
        sheet_id: &str,
        range: &str,
        api_key: &str,
    ) -> Result<RawMatrix, PipelineError> {
        let url = self.values_url(sheet_id, range, api_key)?;
        tracing::debug!(sheet_id = %sheet_id, range = %range, "Fetching leaderboard sheet from Sheets API");

        let response = self.http_client.get(url).send().await?;
        let response = ensure_success(response).await?;
        let values: ValuesResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::MalformedPayload(e.to_string()))?;
        Ok(values.values)
    }

    fn values_url(&self, sheet_id: &str, range: &str, api_key: &str) -> Result<Url, PipelineError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| PipelineError::Configuration(format!("Sheets API base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PipelineError::Configuration("Sheets API base URL cannot take a path".into()))?
            .pop_if_empty()
            .push(sheet_id)
            .push("values")
            .push(range);
        url.query_pairs_mut().append_pair("key", api_key);
        Ok(url)
    }
}

/// Turn a non-success status into a transport error, keeping the API's own
/// message when the body carries one.
async fn ensure_success(response: Response) -> Result<Response, PipelineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<ApiErrorBody>(&text)
        .ok()
        .and_then(|body| body.error.message)
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
        });
    Err(PipelineError::Transport {
        status: Some(status.as_u16()),
        detail,
    })
}
