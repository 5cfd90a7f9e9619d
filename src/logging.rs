use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. Logs go to stderr so `compute --json` output stays clean.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("takehome=debug")
        } else {
            EnvFilter::new("takehome=info")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
