use clap::Parser;
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;

use threadview::core::config::{self, CliOverrides, ThreadviewConfig};
use threadview::tui;

#[derive(Parser)]
#[command(name = "threadview", about = "Terminal viewer for a date-grouped message thread")]
struct Args {
    /// Endpoint returning the message records as a JSON array
    #[arg(short, long)]
    url: Option<String>,

    /// Log level: error, warn, info, debug, trace
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Config errors are reported after the logger is up
    let loaded = config::load_config();
    let file_config = loaded.as_ref().ok();
    let default_config = ThreadviewConfig::default();
    let resolved = config::resolve(
        file_config.unwrap_or(&default_config),
        &CliOverrides {
            url: args.url.as_deref(),
            log_level: args.log_level.as_deref(),
        },
    );

    // Initialize file logger - writes to threadview.log in current directory
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create("threadview.log") {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    if let Err(e) = &loaded {
        log::warn!("Ignoring config file: {}", e);
    }
    log::info!("Threadview starting up with source: {}", resolved.source_url);

    tui::run(resolved)
}
