use std::fs::File;
use std::io::{self, BufWriter};
use std::process::ExitCode;

use clap::Parser;
use compass_cli::cli::Args;
use compass_cli::config::AppConfig;
use compass_cli::paths;
use compass_cli::settings::{JsonFileBackend, SettingsProvider};
use compass_cli::shell::Shell;
use simplelog::{Config, LevelFilter, WriteLogger};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.log_level);

    let settings = match paths::settings_file() {
        Some(path) => match JsonFileBackend::open(&path).await {
            Ok(backend) => SettingsProvider::new(backend),
            Err(e) => {
                log::warn!("Settings unavailable at {}: {}", path.display(), e);
                SettingsProvider::in_memory()
            }
        },
        None => SettingsProvider::in_memory(),
    };

    let config = match AppConfig::load(&settings).await {
        Ok(config) => config.with_args(&args),
        Err(e) => {
            log::warn!("Falling back to default settings: {}", e);
            AppConfig::default().with_args(&args)
        }
    };
    log::info!(
        "Starting in {} mode (service {}, json {})",
        config.mode,
        config.service_base,
        config.json_base
    );

    let api = match config.api_client() {
        Ok(api) => api,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut shell = Shell::new(api, config.page_size, BufWriter::new(io::stdout()));
    shell.spawn_frameworks();
    if let Some(route) = &args.route
        && let Err(e) = shell.open(route)
    {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = shell.run(BufReader::new(tokio::io::stdin())).await {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

/// Log to `latest.log` in the cache directory, archiving the previous run.
fn init_logging(level: LevelFilter) {
    paths::rotate_logs();
    let Some(path) = paths::log_file() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match File::create(&path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, Config::default(), file);
        }
        Err(e) => eprintln!("Cannot write log file {}: {}", path.display(), e),
    }
}
