use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let var = |key: &str| std::env::var(key).ok();
        Self {
            loki_enabled: matches!(var("LOKI_ENABLED").as_deref(), Some("true" | "1")),
            loki_url: var("LOKI_URL"),
            service_name: var("SERVICE_NAME").unwrap_or_else(|| "sentiment-signal".to_string()),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            log_level: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.loki_enabled && self.loki_url.is_none() {
            return Err(AppError::Configuration(
                "LOKI_ENABLED is true but LOKI_URL is not set".to_string(),
            ));
        }
        Ok(())
    }
}

/// Install the global subscriber: env filter and stderr output, plus Loki
/// shipping when enabled. Must run inside a tokio runtime when Loki is enabled.
pub fn init_logging(config: LoggingConfig) -> Result<(), AppError> {
    config.validate()?;

    let filter = EnvFilter::try_new(&config.log_level).map_err(|e| {
        AppError::Configuration(format!("invalid log filter {:?}: {}", config.log_level, e))
    })?;

    #[cfg(feature = "loki")]
    let loki = loki_layer(&config)?;
    #[cfg(not(feature = "loki"))]
    let loki: Option<tracing_subscriber::layer::Identity> = None;
    let shipping = loki.is_some();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(loki)
        .try_init()
        .map_err(|e| AppError::Configuration(format!("logging already initialized: {}", e)))?;

    if shipping {
        tracing::info!("✅ Shipping logs for {} to Loki", config.service_name);
    } else if config.loki_enabled {
        tracing::warn!("LOKI_ENABLED is set but this build has no Loki support");
    }
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(config: &LoggingConfig) -> Result<Option<tracing_loki::Layer>, AppError> {
    let Some(raw_url) = config.loki_url.as_deref().filter(|_| config.loki_enabled) else {
        return Ok(None);
    };
    let url = url::Url::parse(raw_url)
        .map_err(|e| AppError::Configuration(format!("invalid LOKI_URL {:?}: {}", raw_url, e)))?;

    let (layer, task) = tracing_loki::builder()
        .label("service", config.service_name.as_str())
        .and_then(|builder| builder.label("environment", config.environment.as_str()))
        .and_then(|builder| builder.build_url(url))
        .map_err(|e| AppError::Configuration(format!("failed to build Loki layer: {}", e)))?;

    tokio::spawn(task);
    Ok(Some(layer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(loki_enabled: bool, loki_url: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            loki_enabled,
            loki_url: loki_url.map(str::to_string),
            service_name: "sentiment-signal".to_string(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
        }
    }

    #[test]
    fn test_loki_requires_url() {
        assert!(config(true, None).validate().is_err());
        assert!(config(true, Some("http://localhost:3100")).validate().is_ok());
        assert!(config(false, None).validate().is_ok());
    }

    #[cfg(feature = "loki")]
    #[test]
    fn test_loki_layer_only_when_enabled() {
        assert!(loki_layer(&config(false, Some("http://localhost:3100"))).unwrap().is_none());
        assert!(matches!(
            loki_layer(&config(true, Some("not a url"))),
            Err(AppError::Configuration(_))
        ));
    }
}
