use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging based on verbosity level
pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipctl=debug,info"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pipctl=info,warn"))
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if verbose {
        tracing::debug!(
            os = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            "Verbose logging enabled"
        );
    }

    Ok(())
}

/// Log the command line about to be handed to the runner
pub fn log_pip_command(command: &str, runas: Option<&str>, cwd: Option<&Path>) {
    tracing::debug!(
        command = command,
        runas = runas.unwrap_or("-"),
        cwd = %cwd.map(|p| p.display().to_string()).unwrap_or_else(|| "-".to_string()),
        "Running pip"
    );
}

/// Log the outcome of a pip operation
pub fn log_outcome(operation: &str, success: bool, comment: &str) {
    if success {
        tracing::info!(operation = operation, "pip {} succeeded", operation);
    } else {
        tracing::error!(
            operation = operation,
            comment = comment,
            "pip {} failed",
            operation
        );
    }
}

/// Log requirements resolution through the cache
pub fn log_requirements_resolution(source: &str, resolved: Option<&Path>) {
    match resolved {
        Some(path) => tracing::debug!(
            source = source,
            resolved = %path.display(),
            "Requirements cached"
        ),
        None => tracing::warn!(source = source, "Requirements could not be cached"),
    }
}
