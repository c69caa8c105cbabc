// nport2lake-source - SEC API bulk-download client
//
// The SEC API publishes one compressed JSONL file per calendar month at
// {base}/{year}/{year}-{month:02}.jsonl.gz, plus an index.json manifest of
// everything available. Authentication is a token query parameter.
//
// No retry logic lives here: download failures propagate to the per-period
// driver, which decides whether to skip or abort.

use bytes::Bytes;
use nport2lake_config::SecApiConfig;
use nport2lake_core::Period;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no SEC API key configured; set source.api_key or NPORT2LAKE_API_KEY")]
    MissingApiKey,

    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },

    /// The archive has no file for this period (it starts in 2019, and the
    /// current month appears only once published).
    #[error("no bulk file published for {0}")]
    NotPublished(Period),
}

/// One entry of the bulk-download index.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFileInfo {
    pub key: String,

    /// Compressed size in bytes.
    #[serde(default)]
    pub size: u64,

    #[serde(default)]
    pub updated_at: String,
}

impl BulkFileInfo {
    pub fn size_mib(&self) -> f64 {
        self.size as f64 / (1024.0 * 1024.0)
    }
}

#[derive(Debug)]
pub struct SecApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SecApiClient {
    pub fn new(config: &SecApiConfig) -> Result<Self, SourceError> {
        let api_key = config.api_key.clone().ok_or(SourceError::MissingApiKey)?;
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|source| SourceError::Request {
                url: config.base_url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Archive key for one period, e.g. `.../2024/2024-10.jsonl.gz`.
    pub fn bulk_url(&self, period: Period) -> String {
        format!("{}/{}/{}.jsonl.gz", self.base_url, period.year(), period)
    }

    /// Download the compressed bulk file for one period.
    pub async fn fetch_bulk(&self, period: Period) -> Result<Bytes, SourceError> {
        let url = self.bulk_url(period);
        debug!(%url, "downloading bulk file");

        let response = self
            .http
            .get(&url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.clone(),
                source,
            })?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(SourceError::NotPublished(period)),
            status if !status.is_success() => Err(SourceError::Status { url, status }),
            _ => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| SourceError::Request { url, source })?;
                info!(%period, bytes = body.len(), "downloaded bulk file");
                Ok(body)
            }
        }
    }

    /// Fetch the manifest of available bulk files.
    pub async fn list_available(&self) -> Result<Vec<BulkFileInfo>, SourceError> {
        let url = format!("{}/index.json", self.base_url);
        debug!(%url, "fetching bulk index");

        let response = self
            .http
            .get(&url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| SourceError::Request {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status { url, status });
        }

        response
            .json::<Vec<BulkFileInfo>>()
            .await
            .map_err(|source| SourceError::Request { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nport2lake_config::SecApiConfig;

    fn client() -> SecApiClient {
        SecApiClient::new(&SecApiConfig {
            api_key: Some("sk-test".to_string()),
            ..SecApiConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_bulk_url_format() {
        let period = Period::new(2024, 3).unwrap();
        assert_eq!(
            client().bulk_url(period),
            "https://api.sec-api.io/bulk/form-nport/2024/2024-03.jsonl.gz"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let c = SecApiClient::new(&SecApiConfig {
            base_url: "https://api.sec-api.io/bulk/form-nport/".to_string(),
            api_key: Some("sk-test".to_string()),
            ..SecApiConfig::default()
        })
        .unwrap();
        let period = Period::new(2024, 10).unwrap();
        assert_eq!(
            c.bulk_url(period),
            "https://api.sec-api.io/bulk/form-nport/2024/2024-10.jsonl.gz"
        );
    }

    #[test]
    fn test_missing_api_key_rejected() {
        let err = SecApiClient::new(&SecApiConfig::default()).unwrap_err();
        assert!(matches!(err, SourceError::MissingApiKey));
    }

    #[test]
    fn test_index_entry_deserialization() {
        let entries: Vec<BulkFileInfo> = serde_json::from_str(
            r#"[
                {"key": "2024/2024-10.jsonl.gz", "size": 104857600, "updatedAt": "2024-11-01T06:00:00Z"},
                {"key": "2024/2024-11.jsonl.gz"}
            ]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "2024/2024-10.jsonl.gz");
        assert_eq!(entries[0].size_mib(), 100.0);
        assert_eq!(entries[1].size, 0);
        assert!(entries[1].updated_at.is_empty());
    }
}
