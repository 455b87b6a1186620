//! Async HTTP client for the options backend
//!
//! Two endpoints are used:
//! - `GET /api/options/{symbol}?require_greeks=<bool>` returns the contract list
//! - `POST /api/analyze/options` returns strategy suggestions for one expiration
//!
//! Requests are independent and never retried. Non-2xx responses surface as
//! [`ClientError::Status`] with the response body.

pub mod error;
pub mod types;

use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::chain::io::contracts_from_value;
use crate::chain::types::{OptionContract, OptionsChain};

pub use error::{ClientError, Result};
pub use types::{AnalysisRequest, AnalysisResponse, OptionsData, StrategyIdea};

/// Connection settings, loadable from the `[client]` table of a settings file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("chain-lib/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

pub struct ChainClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ChainClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::url(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::url(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended as percent-encoded path segments
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::url(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn read_success(response: reqwest::Response) -> Result<String> {
        let status = response.status();
        tracing::debug!("API response status: {}", status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.text().await?)
    }

    /// All contracts listed for `symbol`, across expirations
    pub async fn fetch_options(
        &self,
        symbol: &str,
        require_greeks: bool,
    ) -> Result<Vec<OptionContract>> {
        let mut url = self.endpoint(&["api", "options", symbol])?;
        url.query_pairs_mut()
            .append_pair("require_greeks", if require_greeks { "true" } else { "false" });

        tracing::info!(symbol, require_greeks, "fetching options chain");
        let response = self.http.get(url).send().await?;
        let text = Self::read_success(response).await?;

        let value: serde_json::Value = serde_json::from_str(&text)?;
        let contracts = contracts_from_value(value).map_err(|e| ClientError::shape(e.to_string()))?;
        tracing::info!(symbol, count = contracts.len(), "received option contracts");
        Ok(contracts)
    }

    /// Fetch and group by expiration
    pub async fn fetch_chain(&self, symbol: &str, require_greeks: bool) -> Result<OptionsChain> {
        let contracts = self.fetch_options(symbol, require_greeks).await?;
        Ok(OptionsChain::from_contracts(symbol, contracts))
    }

    pub async fn analyze_options(&self, request: &AnalysisRequest) -> Result<AnalysisResponse> {
        let url = self.endpoint(&["api", "analyze", "options"])?;

        tracing::info!(
            symbol = %request.symbol,
            expiration = %request.expiration_date,
            results = request.calculation_results.len(),
            "requesting strategy suggestions"
        );
        let response = self.http.post(url).json(request).send().await?;
        let text = Self::read_success(response).await?;

        Ok(serde_json::from_str(&text)?)
    }
}
