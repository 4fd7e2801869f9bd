use std::path::Path;
use anyhow::{anyhow, Result};

use crate::config::loader::file_to_config;
use crate::config::validator::validate_service_config;
use crate::ServiceConfig;

pub async fn run(config_path: &str) -> Result<ServiceConfig> {
    let path = Path::new(config_path);
    file_to_config(path).await.map_err(|e| anyhow!(format!("Invalid config format: {:#}", e)))
}

/// Load config, override `credentials.service_name` and validate the result again.
pub async fn run_with_service(config_path: &str, service: Option<String>) -> Result<ServiceConfig> {
    let mut service_config = run(config_path).await?;
    if let Some(service) = service {
        service_config.credentials.service_name = service;
        validate_service_config(&service_config)
            .map_err(|errors| anyhow!("Invalid config format: {}", errors.join("; ")))?;
    }
    Ok(service_config)
}
