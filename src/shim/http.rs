//! HTTP download of the webextension polyfill

use super::ShimFetcher;
use crate::config::ShimConfig;
use crate::error::{ConvertError, Result};
use reqwest::blocking::Client;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("chrome2moz/", env!("CARGO_PKG_VERSION"));

pub struct HttpShimFetcher {
    config: ShimConfig,
}

impl HttpShimFetcher {
    pub fn new(config: ShimConfig) -> Self {
        Self { config }
    }

    fn client(&self) -> Result<Client> {
        if self.config.accept_invalid_certs {
            warn!(
                "TLS certificate verification disabled for {}",
                self.config.url
            );
        }

        Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.config.timeout)
            .danger_accept_invalid_certs(self.config.accept_invalid_certs)
            .build()
            .map_err(|e| ConvertError::ShimFetch(format!("failed to build HTTP client: {}", e)))
    }

    fn download(&self) -> Result<Vec<u8>> {
        let response = self
            .client()?
            .get(&self.config.url)
            .send()
            .map_err(|e| ConvertError::ShimFetch(describe_request_error(&e)))?
            .error_for_status()
            .map_err(|e| ConvertError::ShimFetch(describe_request_error(&e)))?;

        let body = response
            .bytes()
            .map_err(|e| ConvertError::ShimFetch(describe_request_error(&e)))?;
        Ok(body.to_vec())
    }
}

impl Default for HttpShimFetcher {
    fn default() -> Self {
        Self::new(ShimConfig::default())
    }
}

impl ShimFetcher for HttpShimFetcher {
    fn fetch(&self, dest_dir: &Path) -> Result<String> {
        debug!("Fetching {}", self.config.url);
        let body = self.download()?;

        let target = dest_dir.join(&self.config.filename);
        fs::write(&target, &body).map_err(|e| {
            ConvertError::ShimFetch(format!("failed to write {}: {}", target.display(), e))
        })?;

        debug!("Wrote {} ({} bytes)", target.display(), body.len());
        Ok(self.config.filename.clone())
    }
}

fn describe_request_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out: {}", err)
    } else if let Some(status) = err.status() {
        format!("server returned {}", status)
    } else {
        err.to_string()
    }
}
