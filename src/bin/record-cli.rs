use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "record-cli")]
#[command(about = "Command-line client for the record service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service liveness
    Health,
    /// List record names and the total count
    Records,
    /// Add one record with a generated name
    Add,
    /// Remove every record
    Clean,
}

impl Commands {
    fn path(&self) -> &'static str {
        match self {
            Commands::Health => "/health",
            Commands::Records => "/backend/records",
            Commands::Add => "/backend/record/add",
            Commands::Clean => "/backend/records/clean",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let url = format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path());
    let res = reqwest::Client::new().get(&url).send().await?;
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<bool, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if !text.is_empty() {
            eprintln!("{}", text);
        }
        return Ok(false);
    }

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(true)
}
