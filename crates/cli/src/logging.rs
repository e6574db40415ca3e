use retail_core::config::{LogFormat, LoggingConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so command output on
/// stdout stays machine-readable. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if let Err(error) = installed {
        debug!(
            event_name = "cli.logging.subscriber_kept",
            error = %error,
            "a global subscriber was already installed"
        );
    }
}

#[cfg(test)]
mod tests {
    use retail_core::config::{LogFormat, LoggingConfig};

    use super::init_logging;

    #[test]
    fn repeated_initialisation_keeps_the_first_subscriber() {
        init_logging(&LoggingConfig { level: "warn".to_string(), format: LogFormat::Json });
        init_logging(&LoggingConfig { level: "debug".to_string(), format: LogFormat::Pretty });

        assert!(tracing::dispatcher::has_been_set());
    }
}
