use crate::{errors::Error, Result};

/// Initialize tracing for the relay.
///
/// Default: info for our crates, warn for everything else. Can be overridden
/// with `RUST_LOG`.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(service_name)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::External(format!("logging init failed: {e}")))
}

fn default_directives(service_name: &str) -> String {
    let crate_name = service_name.replace('-', "_");
    format!(
        "warn,mrelay=info,mrelay_core=info,mrelay_telegram=info,mrelay_openai=info,{crate_name}=info"
    )
}
