use anyhow::Context;
use press_logger::{Logger, parse_level};
use press_server::Server;
use pressroom::kernel::config::ConfigRegistry;

/// Environment variable selecting the deployment profile.
const ENV_VAR: &str = "PRESS_ENV";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let profile_name =
        std::env::var(ENV_VAR).unwrap_or_else(|_| pressroom::kernel::config::DEVELOPMENT.to_owned());

    let registry =
        ConfigRegistry::load(None::<&str>).context("Critical: Configuration is malformed")?;
    let cfg = registry.profile(&profile_name)?;

    let mut log_builder = Logger::builder()
        .name(env!("CARGO_PKG_NAME"))
        .level(parse_level(&cfg.logging.level)?)
        .path(&cfg.logging.directory)
        .max_bytes(cfg.logging.max_file_bytes)
        .max_backups(cfg.logging.max_files);
    if cfg.logging.json {
        log_builder = log_builder.json();
    }
    let _log = log_builder.init()?;

    tracing::info!(profile = %profile_name, "Deployment profile selected");

    Server::builder().config(cfg).build().await?.run().await
}
