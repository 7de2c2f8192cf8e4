//! Tracing subscriber bootstrap shared by the server and CLI binaries.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bookshelf_kernel::settings::{LogFormat, TelemetrySettings};

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this more
/// than once keeps the first subscriber.
pub fn init(settings: &TelemetrySettings) -> anyhow::Result<()> {
    let filter = env_filter(std::env::var("RUST_LOG").ok().as_deref(), &settings.filter)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match settings.log_format {
        LogFormat::Pretty => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(
            target: "bookshelf-telemetry",
            format = ?settings.log_format,
            "tracing subscriber installed"
        );
    }

    Ok(())
}

/// Pick the filter directives, preferring a non-blank override.
fn select_directives<'a>(override_directives: Option<&'a str>, configured: &'a str) -> &'a str {
    match override_directives {
        Some(value) if !value.trim().is_empty() => value,
        _ => configured,
    }
}

fn env_filter(override_directives: Option<&str>, configured: &str) -> anyhow::Result<EnvFilter> {
    let directives = select_directives(override_directives, configured);

    EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter '{}'", directives))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn configured_filter_is_used_without_override() {
        assert_eq!(select_directives(None, "warn"), "warn");
        let filter = env_filter(None, "warn").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn override_wins_over_configured_filter() {
        assert_eq!(select_directives(Some("trace"), "info"), "trace");
        let filter = env_filter(Some("trace"), "info").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn blank_override_is_ignored() {
        assert_eq!(select_directives(Some("  "), "info"), "info");
    }

    #[test]
    fn init_twice_is_harmless() {
        let settings = TelemetrySettings::default();
        init(&settings).unwrap();
        init(&settings).unwrap();
    }
}
