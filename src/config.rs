use crate::error::PipelineError;
use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 3001;
const DEFAULT_RANGE: &str = "Leaderboard!A1:H1000";
const DEFAULT_TOP_PERFORMERS: usize = 3;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Where the leaderboard sheet is read from. Resolved once at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum SheetSource {
    /// Apps Script web app returning the sheet as JSON.
    ProxyEndpoint { url: String },
    /// Sheets API `values.get` with an API key (sheet must be public).
    DirectApi {
        sheet_id: String,
        range: String,
        api_key: String,
    },
}

impl SheetSource {
    /// The web app URL wins when both are configured.
    pub fn resolve(
        web_app_url: Option<String>,
        sheet_id: Option<String>,
        range: Option<String>,
        api_key: Option<String>,
    ) -> Result<Self, PipelineError> {
        if let Some(url) = web_app_url {
            return Ok(SheetSource::ProxyEndpoint { url });
        }
        match (api_key, sheet_id) {
            (Some(api_key), Some(sheet_id)) => Ok(SheetSource::DirectApi {
                sheet_id,
                range: range.unwrap_or_else(|| DEFAULT_RANGE.to_string()),
                api_key,
            }),
            (Some(_), None) => Err(PipelineError::Configuration(
                "SHEETS_SHEET_ID is required with SHEETS_API_KEY".into(),
            )),
            (None, _) => Err(PipelineError::Configuration(
                "Either SHEETS_WEB_APP_URL or SHEETS_API_KEY must be set".into(),
            )),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            SheetSource::ProxyEndpoint { url } => format!("web app {}", url),
            SheetSource::DirectApi { sheet_id, range, .. } => {
                format!("Sheets API {} ({})", sheet_id, range)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardSettings {
    pub top_performers_count: usize,
    /// Default for the grouped view; ranked views are always published-only.
    pub show_unpublished: bool,
}

impl Default for LeaderboardSettings {
    fn default() -> Self {
        Self {
            top_performers_count: DEFAULT_TOP_PERFORMERS,
            show_unpublished: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub source: SheetSource,
    pub settings: LeaderboardSettings,
    pub refresh_interval: Option<Duration>,
    pub http_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, PipelineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, PipelineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let source = SheetSource::resolve(
            var("SHEETS_WEB_APP_URL"),
            var("SHEETS_SHEET_ID"),
            var("SHEETS_RANGE"),
            var("SHEETS_API_KEY"),
        )?;

        let settings = LeaderboardSettings {
            top_performers_count: parse_var(&var, "LEADERBOARD_TOP_PERFORMERS")?
                .unwrap_or(DEFAULT_TOP_PERFORMERS),
            show_unpublished: parse_var(&var, "LEADERBOARD_SHOW_UNPUBLISHED")?.unwrap_or(false),
        };

        let refresh_interval = parse_var::<u64>(&var, "REFRESH_INTERVAL_SECS")?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let http_timeout = Duration::from_secs(
            parse_var(&var, "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        );

        Ok(AppConfig {
            host: var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_var(&var, "PORT")?.unwrap_or(DEFAULT_PORT),
            source,
            settings,
            refresh_interval,
            http_timeout,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    var: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, PipelineError> {
    match var(key) {
        Some(raw) => raw
            .to_lowercase()
            .parse()
            .map(Some)
            .map_err(|_| PipelineError::Configuration(format!("{} has an invalid value: {}", key, raw))),
        None => Ok(None),
    }
}
