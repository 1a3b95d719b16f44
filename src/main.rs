use clap::Parser;
use commit_critic::cli::args::Args;
use commit_critic::commands::route_command;
use commit_critic::config::Config;
use commit_critic::infrastructure::{setup_logging, LoggingConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::new();
    config.update_from_args(&args);

    let logging = if config.debug {
        LoggingConfig::debug()
    } else {
        LoggingConfig::default()
    };
    if let Err(e) = setup_logging(logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let code = route_command(&args, &config).await?;
    std::process::exit(code);
}
