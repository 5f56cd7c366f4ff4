//! Process-wide `tracing` installation.

use std::sync::Once;

use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "WATERFIBER_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

static TRACING_INSTALLED: Once = Once::new();
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a `fmt` subscriber filtered by [`LOG_ENV`] (idempotent).
///
/// Falls back to `info` when the variable is unset or unparsable. If another global subscriber
/// is already in place this does nothing.
pub fn install_tracing() {
    TRACING_INSTALLED.call_once(|| {
        let filter = filter_from(std::env::var(LOG_ENV).ok().as_deref());
        let console = fmt::layer()
            .with_target(true)
            .with_writer(std::io::stderr)
            .with_filter(filter);

        if tracing_subscriber::registry().with(console).try_init().is_err() {
            eprintln!("waterfiber: a tracing subscriber is already installed");
        }
    });
}

/// Route panics through `tracing` before running the previous hook (idempotent).
pub fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_owned())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "Unknown panic".to_owned());
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_default();
            tracing::error!(target: "waterfiber::panic", %message, %location);
            previous(info);
        }));
    });
}

fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVES))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_directives_fall_back_to_info() {
        assert_eq!(filter_from(None).to_string(), "info");
        assert_eq!(filter_from(Some("waterfiber_core=trace")).to_string(), "waterfiber_core=trace");
        assert_eq!(filter_from(Some("waterfiber=loud")).to_string(), "info");
    }

    #[test]
    fn installing_twice_is_harmless() {
        install_tracing();
        install_tracing();
        tracing::debug!("still alive");
    }
}
