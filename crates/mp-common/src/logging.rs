//! Structured logging setup for applications embedding the back-office SDK.
//!
//! - `LOG_FORMAT=json` switches to JSON lines (for log shipping)
//! - `RUST_LOG` filters as usual, defaulting to `info`
//!
//! ```rust,ignore
//! mp_common::logging::init_logging("backoffice-desk");
//! tracing::info!(admin_id = %id, "Admin signed in");
//! ```
//!
//! The SDK never logs access or refresh tokens; keep it that way in host code
//! by logging admin ids rather than session values.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global subscriber.
///
/// Returns `false` if a subscriber was already installed (for example by a
/// test harness); the existing one is left in place.
pub fn init_logging(service_name: &str) -> bool {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    let env_filter = default_filter();

    let installed = if log_format.eq_ignore_ascii_case("json") {
        init_json_logging(env_filter)
    } else {
        init_text_logging(env_filter)
    };

    if installed {
        tracing::debug!(service = service_name, format = %log_format, "Logging initialized");
    }
    installed
}

fn default_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_json_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_target(true)
                .flatten_event(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .try_init()
        .is_ok()
}

fn init_text_logging(env_filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .with_ansi(true),
        )
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_is_refused() {
        // Whichever call wins, the next one must not panic.
        let _ = init_logging("mp-common-test");
        assert!(!init_logging("mp-common-test"));
    }
}
