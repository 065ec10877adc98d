use clap::Parser;

use tinylink::cli::Cli;
use tinylink::config::{self, StaticConfig};
use tinylink::interfaces::cli::run_cli;
use tinylink::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut static_config = match StaticConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(2);
        }
    };
    static_config.apply_overrides(cli.overrides());
    config::init_config(static_config);
    let static_config = config::get_config();

    // WorkerGuard 需要存活到进程结束
    let _guard = match init_logging(&static_config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {:#}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = run_cli(cli.command, &cli.owner, &static_config).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
