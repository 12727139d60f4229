pub mod api;
pub mod config;
pub mod errors;
pub mod ingestion;
pub mod intelligence;
pub mod metrics;
pub mod models;
pub mod rpc;
pub mod services;

use std::sync::Arc;

use crate::services::ReportService;

#[derive(Clone)]
pub struct AppState {
    pub reports: ReportService,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    /// Bearer token guarding requirement updates; `None` disables the check.
    pub api_token: Option<Arc<str>>,
}
