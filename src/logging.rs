use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging to stderr.
///
/// `RUST_LOG` takes precedence when set. Otherwise `verbose` switches the
/// crate's own logs from info to debug.
pub fn init_logging(verbose: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

fn default_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("keyplay=debug,warn")
    } else {
        EnvFilter::new("keyplay=info,warn")
    }
}
