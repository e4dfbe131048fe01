use clap::Parser;
use tracing_subscriber::EnvFilter;

use logsieve::cli::{self, Cli};
use logsieve::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr so list output stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --init flag
    if cli.init {
        return cli::init_config(&cli.config);
    }

    // Load config; the default path may simply not exist yet
    let config = if std::path::Path::new(&cli.config).exists() {
        let mut config = Config::from_file(&cli.config)?;
        config.config_path = Some(std::path::PathBuf::from(&cli.config));
        config
    } else {
        Config::default()
    };

    cli::run_command(&cli, &config).await
}
