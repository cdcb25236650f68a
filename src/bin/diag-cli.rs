use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tokio::io::AsyncReadExt;

#[derive(Parser)]
#[command(name = "diag-cli")]
#[command(about = "Client for the diagnostic service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:8094")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a body to the /log/ endpoint (stdin when no file is given)
    Log {
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Fetch a profiling view (index when no name is given)
    Pprof {
        name: Option<String>,

        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Log { file } => {
            let body = match file {
                Some(path) => tokio::fs::read(path).await?,
                None => {
                    let mut buf = Vec::new();
                    tokio::io::stdin().read_to_end(&mut buf).await?;
                    buf
                }
            };
            let res = client
                .post(format!("{}/log/", cli.url))
                .body(body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Pprof { name, seconds } => {
            let mut request = client.get(format!(
                "{}/debug/pprof/{}",
                cli.url,
                name.unwrap_or_default()
            ));
            if let Some(seconds) = seconds {
                request = request.query(&[("seconds", seconds)]);
            }
            print_response(request.send().await?).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let is_json = res
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    if is_json {
        let json: Value = res.json().await?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{} {}", status.as_u16(), res.text().await?);
    }
    Ok(())
}
