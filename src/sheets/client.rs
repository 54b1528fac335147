// Spreadsheet values API HTTP client.
// Handles authentication, request construction, and status-to-error mapping.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    Client, Response, StatusCode, Url,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use tracing::debug;

use crate::config::SheetsConfig;
use crate::error::{Result, SyncError};

use super::range::CellRange;
use super::store::DocumentStore;
use super::types::{
    ApiErrorResponse, BatchUpdateAck, BatchUpdateRequest, CellValues, PendingWrite,
    ValueRangeResponse,
};

/// Values API client bound to a single spreadsheet.
pub struct SheetsClient {
    client: Client,
    base_url: Url,
    spreadsheet_id: String,
}

impl SheetsClient {
    /// Create a client authenticated with an OAuth access token.
    pub fn new(config: &SheetsConfig, access_token: &str) -> Result<Self> {
        if config.spreadsheet_id.is_empty() {
            return Err(SyncError::Config("sheets.spreadsheet_id is empty".into()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", access_token))
                .map_err(|e| SyncError::Config(e.to_string()))?,
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("sheetsync"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| SyncError::Config(format!("sheets.base_url: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            spreadsheet_id: config.spreadsheet_id.clone(),
        })
    }

    /// Spreadsheet this client reads and writes.
    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// URL of `v4/spreadsheets/{id}/{tail...}` with each segment percent-encoded.
    fn endpoint(&self, tail: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::Config("sheets.base_url cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str()])
            .extend(tail);
        Ok(url)
    }

    /// Check response status and convert errors.
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(classify_error(status, &url, &body))
    }
}

/// Map a failed values API response onto the error taxonomy.
fn classify_error(status: StatusCode, url: &str, body: &str) -> SyncError {
    let (message, api_status) = match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(envelope) => (envelope.error.message, envelope.error.status),
        Err(_) => (body.to_string(), String::new()),
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => SyncError::QuotaExceeded(message),
        _ if api_status == "RESOURCE_EXHAUSTED" => SyncError::QuotaExceeded(message),
        StatusCode::NOT_FOUND => SyncError::NotFound(url.to_string()),
        status => SyncError::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl DocumentStore for SheetsClient {
    async fn get(&self, range: &CellRange) -> Result<CellValues> {
        let a1 = range.to_string();
        let url = self.endpoint(&["values", a1.as_str()])?;
        debug!(range = %a1, "reading range");

        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        let body: ValueRangeResponse = response.json().await?;
        Ok(body.into_cells())
    }

    async fn batch_update(&self, writes: &[PendingWrite]) -> Result<BatchUpdateAck> {
        let url = self.endpoint(&["values:batchUpdate"])?;
        debug!(ranges = writes.len(), "writing batch");

        let response = self
            .client
            .post(url)
            .json(&BatchUpdateRequest::from_writes(writes))
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let ack: BatchUpdateAck = response.json().await?;
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::range::Column;

    fn client() -> SheetsClient {
        let config = SheetsConfig {
            spreadsheet_id: "sheet-123".into(),
            ..SheetsConfig::default()
        };
        SheetsClient::new(&config, "token").unwrap()
    }

    #[test]
    fn test_requires_spreadsheet_id() {
        let result = SheetsClient::new(&SheetsConfig::default(), "token");
        assert!(matches!(result, Err(SyncError::Config(_))));
    }

    #[test]
    fn test_values_endpoint_encodes_range() {
        let client = client();
        let range = CellRange::columns("Sales Points", Column(0), Column(7), 2);
        let url = client
            .endpoint(&["values", range.to_string().as_str()])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values/'Sales%20Points'!A2:H"
        );
    }

    #[test]
    fn test_batch_endpoint() {
        let url = client().endpoint(&["values:batchUpdate"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-123/values:batchUpdate"
        );
    }

    #[test]
    fn test_classify_quota_errors() {
        let err = classify_error(StatusCode::TOO_MANY_REQUESTS, "u", "slow down");
        assert!(matches!(err, SyncError::QuotaExceeded(ref m) if m == "slow down"));

        let body = r#"{"error":{"code":403,"message":"Quota exceeded for quota metric 'Read requests'","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_error(StatusCode::FORBIDDEN, "u", body);
        assert!(matches!(err, SyncError::QuotaExceeded(_)));
        assert!(err.is_quota());
    }

    #[test]
    fn test_classify_other_errors() {
        let err = classify_error(StatusCode::NOT_FOUND, "https://x/values/A1", "");
        assert!(matches!(err, SyncError::NotFound(ref u) if u == "https://x/values/A1"));

        let body = r#"{"error":{"code":400,"message":"Unable to parse range","status":"INVALID_ARGUMENT"}}"#;
        let err = classify_error(StatusCode::BAD_REQUEST, "u", body);
        assert!(matches!(
            err,
            SyncError::Api { status: 400, ref message } if message == "Unable to parse range"
        ));
        assert!(!err.is_quota());
    }
}
