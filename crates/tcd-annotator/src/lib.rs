//! TCD Annotator - Linguistic annotator backends
//!
//! Provides implementations of the [`Annotator`] capability:
//! - UDPipe: a REST service running pretrained Universal Dependencies models
//! - CoNLL-U: pre-parsed documents, for offline runs and tests
//!
//! Also owns model provisioning, the bootstrap step that makes sure a usable
//! model exists before any text is analyzed.
//!
//! Author: hephaex@gmail.com

pub mod fixture;
pub mod treebank;
pub mod udpipe;

pub use fixture::ConlluAnnotator;
pub use udpipe::{list_models, ModelCatalog, UdpipeAnnotator};

use std::sync::Arc;
use std::time::Duration;
use tcd_core::{Annotator, AnnotatorBackend, AnnotatorConfig, Result, TcdError};

/// Build the configured backend without checking that its model is usable
///
/// UDPipe uses the configured model name as-is; no request is made until
/// the first parse.
pub async fn build_annotator(config: &AnnotatorConfig) -> Result<Arc<dyn Annotator>> {
    let annotator: Arc<dyn Annotator> = match config.backend {
        AnnotatorBackend::Udpipe => Arc::new(UdpipeAnnotator::new(
            config.udpipe_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )?),
        AnnotatorBackend::Conllu => Arc::new(load_conllu(config).await?),
    };
    Ok(annotator)
}

/// Provision the configured backend and return a shareable annotator handle
///
/// For UDPipe the configured model name is resolved against the service's
/// model listing; for CoNLL-U the document is loaded and must contain at
/// least one sentence. The returned handle is meant to be built once and
/// reused for every analysis.
pub async fn provision(config: &AnnotatorConfig) -> Result<Arc<dyn Annotator>> {
    let annotator: Arc<dyn Annotator> = match config.backend {
        AnnotatorBackend::Udpipe => Arc::new(UdpipeAnnotator::connect(config).await?),
        AnnotatorBackend::Conllu => {
            let annotator = load_conllu(config).await?;
            if annotator.is_empty() {
                return Err(TcdError::ModelUnavailable(format!(
                    "no sentences in {}",
                    annotator.source()
                )));
            }
            Arc::new(annotator)
        }
    };

    tracing::info!(
        backend = annotator.name(),
        model = annotator.model(),
        "Annotator provisioned"
    );

    Ok(annotator)
}

async fn load_conllu(config: &AnnotatorConfig) -> Result<ConlluAnnotator> {
    let path = config.conllu_path.as_ref().ok_or_else(|| {
        TcdError::ModelUnavailable("conllu backend requires conllu_path".to_string())
    })?;
    ConlluAnnotator::from_path(path).await
}
