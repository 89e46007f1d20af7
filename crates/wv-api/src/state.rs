use metrics_exporter_prometheus::PrometheusHandle;
use wv_db::RecordStore;

use crate::{
    ApiConfig, auth::jwt::TokenSigner, config::Environment, resource::storage::UploadStorage,
};

/// Shared handler state. The record store is injected here once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub store: RecordStore,
    pub uploads: UploadStorage,
    pub tokens: TokenSigner,
    pub bcrypt_cost: u32,
    /// Take the client ip from `X-Forwarded-For` instead of the socket peer
    pub trust_proxy: bool,
    pub environment: Environment,
    /// Absent when no recorder is installed (tests)
    pub metrics_handle: Option<PrometheusHandle>,
}

impl ApiState {
    pub fn new(
        config: &ApiConfig,
        store: RecordStore,
        metrics_handle: Option<PrometheusHandle>,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            store,
            uploads: UploadStorage::new(config.upload_path.clone(), config.max_file_size),
            tokens: TokenSigner::new(&config.jwt_secret, config.jwt_expiry_days)?,
            bcrypt_cost: config.bcrypt_cost,
            trust_proxy: config.trust_proxy,
            environment: config.env,
            metrics_handle,
        })
    }
}
