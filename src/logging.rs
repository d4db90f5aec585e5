//! Tracing subscriber setup for the command-line renderer

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (falls back to `RUST_LOG`)
pub const LOG_ENV: &str = "SCHEMAFORM_LOG";

static TRACING: OnceLock<()> = OnceLock::new();

/// Filter used when no environment variable is set
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "schemaform=debug,info"
    } else {
        "warn"
    }
}

/// Install the global subscriber once; later calls are no-ops
///
/// Logs go to stderr so command output on stdout stays pipeable.
pub fn init_tracing(verbose: bool, quiet: bool) {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(true, false), "schemaform=debug,info");
        assert_eq!(default_directive(true, true), "error");
    }
}
