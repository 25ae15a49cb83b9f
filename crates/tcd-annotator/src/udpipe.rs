//! UDPipe REST client
//!
//! Talks to a UDPipe 2 service (`/process` and `/models` endpoints) and
//! turns its CoNLL-U output into a [`Parse`].
//!
//! Author: hephaex@gmail.com

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tcd_core::{Annotator, AnnotatorConfig, Parse, Result, TcdError};

use crate::treebank;

/// Pipeline stages a model must offer to be usable for classification
const REQUIRED_COMPONENTS: [&str; 2] = ["tagger", "parser"];

/// UDPipe annotator bound to a resolved model
pub struct UdpipeAnnotator {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ProcessResponse {
    #[serde(default)]
    model: Option<String>,
    result: String,
}

/// Models advertised by a UDPipe service
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelCatalog {
    /// Model name -> supported pipeline components
    pub models: BTreeMap<String, Vec<String>>,

    /// Model used when none is requested
    #[serde(default)]
    pub default_model: Option<String>,
}

impl ModelCatalog {
    /// Resolve a requested model name or prefix to a full model name
    ///
    /// An exact name wins; otherwise the first model (in name order) whose
    /// name starts with `requested` followed by `-` is chosen. Only models
    /// offering both tagging and parsing qualify. An empty request falls
    /// back to the service default.
    pub fn resolve(&self, requested: &str) -> Option<String> {
        let requested = requested.trim();
        if requested.is_empty() {
            return self
                .default_model
                .as_ref()
                .filter(|m| self.is_usable(m))
                .cloned();
        }

        if self.is_usable(requested) {
            return Some(requested.to_string());
        }

        let prefix = format!("{requested}-");
        self.models
            .keys()
            .find(|name| name.starts_with(&prefix) && self.is_usable(name))
            .cloned()
    }

    fn is_usable(&self, name: &str) -> bool {
        self.models.get(name).is_some_and(|components| {
            REQUIRED_COMPONENTS
                .iter()
                .all(|c| components.iter().any(|have| have == c))
        })
    }

    /// Model names in name order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }
}

impl UdpipeAnnotator {
    /// Create an annotator for an already-resolved model
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            base_url: trim_base(base_url.into()),
            model: model.into(),
        })
    }

    /// Resolve the configured model against the service and connect
    pub async fn connect(config: &AnnotatorConfig) -> Result<Self> {
        let client = build_client(Duration::from_secs(config.timeout_secs))?;
        let base_url = trim_base(config.udpipe_url.clone());
        let catalog = fetch_catalog(&client, &base_url).await?;

        let model = catalog.resolve(&config.model).ok_or_else(|| {
            TcdError::ModelUnavailable(format!(
                "no UDPipe model matching '{}' with tagger and parser at {base_url}",
                config.model
            ))
        })?;

        tracing::info!(model = %model, url = %base_url, "UDPipe model resolved");

        Ok(Self {
            client,
            base_url,
            model,
        })
    }
}

#[async_trait]
impl Annotator for UdpipeAnnotator {
    async fn parse(&self, text: &str) -> Result<Parse> {
        let params = [
            ("tokenizer", ""),
            ("tagger", ""),
            ("parser", ""),
            ("model", self.model.as_str()),
            ("data", text),
        ];

        let response = self
            .client
            .post(format!("{}/process", self.base_url))
            .form(&params)
            .send()
            .await
            .map_err(|e| TcdError::Annotator(format!("UDPipe request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(TcdError::Annotator(format!(
                "UDPipe error ({status}): {error_text}"
            )));
        }

        let result: ProcessResponse = response
            .json()
            .await
            .map_err(|e| TcdError::Annotator(format!("Failed to parse UDPipe response: {e}")))?;

        if let Some(model) = &result.model {
            tracing::trace!(model = %model, "UDPipe response received");
        }

        treebank::read_parse(&result.result)
    }

    fn name(&self) -> &str {
        "udpipe"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// List the models offered by a UDPipe service
pub async fn list_models(config: &AnnotatorConfig) -> Result<ModelCatalog> {
    let client = build_client(Duration::from_secs(config.timeout_secs))?;
    fetch_catalog(&client, &trim_base(config.udpipe_url.clone())).await
}

async fn fetch_catalog(client: &Client, base_url: &str) -> Result<ModelCatalog> {
    let response = client
        .get(format!("{base_url}/models"))
        .send()
        .await
        .map_err(|e| TcdError::ModelUnavailable(format!("UDPipe service unreachable: {e}")))?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(TcdError::ModelUnavailable(format!(
            "UDPipe model listing failed with {status}"
        )));
    }

    response
        .json()
        .await
        .map_err(|e| TcdError::ModelUnavailable(format!("Failed to parse model listing: {e}")))
}

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| TcdError::Annotator(format!("Failed to build HTTP client: {e}")))
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

// ============================================================================
// Tests
// ============================================================================
