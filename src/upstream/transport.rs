use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ExporterError, Result};

/// Anything that can GET a URL and hand back the full response body.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Vec<u8>>;
}

/// reqwest-backed transport used against the real gameserver.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, insecure_skip_verify: bool) -> anyhow::Result<Self> {
        if insecure_skip_verify {
            warn!("TLS certificate verification towards upstream is DISABLED");
        }
        let http = Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(insecure_skip_verify)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpTransport { http })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>> {
        let fetch_error = |reason: String| ExporterError::Fetch {
            url: url.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error(e.to_string()))?;

        let status = resp.status();
        info!("GET {} => {}", url, status);

        if !status.is_success() {
            return Err(fetch_error(format!("upstream answered {}", status)));
        }

        let body = resp.bytes().await.map_err(|e| fetch_error(e.to_string()))?;
        Ok(body.to_vec())
    }
}
