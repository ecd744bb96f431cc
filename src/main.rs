use clap::Parser;

use spinview::{AppConfig, Cli, LoggingConfig, init_logging};

fn main() -> anyhow::Result<()> {
    let config = AppConfig::from(Cli::parse());

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        ..LoggingConfig::default()
    });

    spinview::run(config)
}
