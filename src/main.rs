use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Serialize;

use qr_scan::ScanOutcome;

#[derive(Parser)]
#[command(name = "qr-scan", about = "Read a QR code from a JPEG image")]
struct Cli {
    /// JPEG image to scan
    image: PathBuf,

    /// Path to TOML config file
    #[arg(long = "config")]
    config_path: Option<String>,

    /// Override the largest accepted image width or height
    #[arg(long)]
    max_dimension: Option<u32>,

    /// Print the result as a JSON object
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ErrorOutput {
    status: &'static str,
    class: String,
    error: String,
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string(value) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize result: {e}");
            process::exit(1);
        }
    }
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    std::panic::set_hook(Box::new(|_| {}));

    let config = qr_scan::config::load_config(cli.config_path.as_deref(), cli.max_dimension);

    match qr_scan::scan_with(&cli.image, &config) {
        Ok(outcome) if cli.json => {
            print_json(&outcome);
            if outcome == ScanOutcome::NotFound {
                process::exit(1);
            }
        }
        Ok(ScanOutcome::Found(symbol)) => {
            println!("{} data: {}", symbol.kind, symbol.text);
            println!("QR Code scanned successfully.");
        }
        Ok(ScanOutcome::NotFound) => {
            println!("No QR code found.");
            println!("Failed to scan QR code.");
            process::exit(1);
        }
        Err(e) if cli.json => {
            print_json(&ErrorOutput {
                status: "error",
                class: e.class().to_string(),
                error: e.to_string(),
            });
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error ({}): {}", e.class(), e);
            println!("Failed to scan QR code.");
            process::exit(1);
        }
    }
}
