//! Application state management
//!
//! Author: hephaex@gmail.com

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tcd_analyzer::TransitivityClassifier;
use tcd_core::config::AppConfig;
use tcd_core::Annotator;
use tokio::sync::RwLock;

/// Per-endpoint request metrics
#[derive(Debug, Clone, Default, Serialize)]
pub struct EndpointMetrics {
    pub requests: u64,
    pub total_latency_us: u64,
    pub status_counts: HashMap<u16, u64>,
}

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Server start time
    pub start_time: Instant,
    /// Request counter
    pub request_count: AtomicU64,
    /// Completed analyses
    pub analysis_count: AtomicU64,
    /// Classifier, present once the annotator has been provisioned
    classifier: RwLock<Option<Arc<TransitivityClassifier>>>,
    /// Metrics by endpoint path
    pub metrics: RwLock<HashMap<String, EndpointMetrics>>,
}

impl AppState {
    /// Create new application state with config and no annotator yet
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            start_time: Instant::now(),
            request_count: AtomicU64::new(0),
            analysis_count: AtomicU64::new(0),
            classifier: RwLock::new(None),
            metrics: RwLock::new(HashMap::new()),
        }
    }

    /// Create application state with an already-provisioned annotator
    pub fn with_annotator(config: AppConfig, annotator: Arc<dyn Annotator>) -> Self {
        let state = Self::new(config);
        Self {
            classifier: RwLock::new(Some(Arc::new(TransitivityClassifier::new(annotator)))),
            ..state
        }
    }

    /// Install the process-wide annotator
    pub async fn install_annotator(&self, annotator: Arc<dyn Annotator>) {
        tracing::info!(
            backend = annotator.name(),
            model = annotator.model(),
            "Classifier ready"
        );
        *self.classifier.write().await = Some(Arc::new(TransitivityClassifier::new(annotator)));
    }

    /// Get the classifier if the annotator is available
    pub async fn classifier(&self) -> Option<Arc<TransitivityClassifier>> {
        self.classifier.read().await.clone()
    }

    /// Check if service is ready to analyze text
    pub async fn is_ready(&self) -> bool {
        self.classifier.read().await.is_some()
    }

    /// Model identifier of the installed annotator
    pub async fn model(&self) -> Option<String> {
        self.classifier
            .read()
            .await
            .as_ref()
            .map(|c| c.annotator().model().to_string())
    }

    /// Increment request counter
    pub fn increment_requests(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::SeqCst)
    }

    /// Get total request count
    pub fn get_request_count(&self) -> u64 {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Record a completed analysis
    pub fn record_analysis(&self) {
        self.analysis_count.fetch_add(1, Ordering::SeqCst);
    }

    /// Get completed analysis count
    pub fn get_analysis_count(&self) -> u64 {
        self.analysis_count.load(Ordering::SeqCst)
    }

    /// Record a finished request for an endpoint
    pub async fn record_request(&self, endpoint: String, status: u16, latency_us: u64) {
        let mut metrics = self.metrics.write().await;
        let entry = metrics.entry(endpoint).or_default();
        entry.requests += 1;
        entry.total_latency_us += latency_us;
        *entry.status_counts.entry(status).or_insert(0) += 1;
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
