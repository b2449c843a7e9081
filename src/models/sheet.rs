use serde::Deserialize;
use serde_json::Value;

/// Untyped cell matrix as returned by the sheet source; row 0 holds headers.
pub type RawMatrix = Vec<Vec<Value>>;

/// Body returned by the proxy web app.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ProxyPayload {
    Matrix(RawMatrix),
    Wrapped { data: RawMatrix },
}

impl ProxyPayload {
    pub fn into_matrix(self) -> RawMatrix {
        match self {
            ProxyPayload::Matrix(rows) => rows,
            ProxyPayload::Wrapped { data } => data,
        }
    }
}

/// `spreadsheets.values.get` response.
#[derive(Debug, Deserialize)]
pub struct ValuesResponse {
    #[serde(default)]
    pub values: RawMatrix,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: Option<String>,
}
