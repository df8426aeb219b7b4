use clap::{Arg, Command};
use std::process;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let matches = Command::new("Dataset Ingest")
        .version("1.0")
        .about("Refreshes the dashboard's case tables from the public dataset")
        .subcommand(
            Command::new("ingest")
                .about("Fetch the source CSVs and rewrite the Parquet tables")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("ingest", ingest_matches)) => {
            let config_path = ingest_matches
                .get_one::<String>("config")
                .map(|s| s.as_str())
                .unwrap_or("config/ingest.toml");

            if let Err(e) = ingest::run_ingest_pipeline(config_path).await {
                eprintln!("Ingest pipeline error: {}", e);
                process::exit(1);
            }
        }
        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}
