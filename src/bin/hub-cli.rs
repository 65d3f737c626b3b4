use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::path::{Path, PathBuf};

const TOKEN_ENV: &str = "SELLER_HUB_TOKEN";

#[derive(Parser)]
#[command(name = "hub-cli")]
#[command(about = "Command-line client for a running seller hub", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Session token; falls back to $SELLER_HUB_TOKEN.
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show hub version, backend and provider modes
    Status,
    /// Sign in and print the session (export its access_token as SELLER_HUB_TOKEN)
    Signin { email: String, password: String },
    /// Upload a product CSV (title,description,tags,tpt_url,price)
    ImportProducts { file: PathBuf },
    /// Upload a sales CSV (date,product_title,units,revenue,views)
    ImportSales { file: PathBuf },
    /// Refresh ranks for all tracked keywords
    RefreshRanks {
        #[arg(long)]
        product_id: Option<String>,
    },
    /// Download social posts as CSV
    ExportSocial {
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Show the analytics summary
    Analytics {
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/').to_string();

    let mut headers = HeaderMap::new();
    if let Some(token) = cli.token.or_else(|| std::env::var(TOKEN_ENV).ok()) {
        headers.insert(AUTHORIZATION, HeaderValue::from_str(&format!("Bearer {}", token))?);
    }

    match cli.command {
        Commands::Status => {
            let res = client.get(format!("{}/", base)).send().await?;
            print_response(res).await?;
        }
        Commands::Signin { email, password } => {
            let res = client
                .post(format!("{}/auth/signin", base))
                .json(&serde_json::json!({ "email": email, "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ImportProducts { file } => {
            let res = upload(&client, headers, format!("{}/import/products", base), &file).await?;
            print_response(res).await?;
        }
        Commands::ImportSales { file } => {
            let res = upload(&client, headers, format!("{}/import/sales", base), &file).await?;
            print_response(res).await?;
        }
        Commands::RefreshRanks { product_id } => {
            let mut req = client.post(format!("{}/rank/refresh", base)).headers(headers);
            if let Some(id) = product_id {
                req = req.query(&[("product_id", id)]);
            }
            print_response(req.send().await?).await?;
        }
        Commands::ExportSocial { out } => {
            let res = client
                .get(format!("{}/social/export.csv", base))
                .headers(headers)
                .send()
                .await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }
            let csv = res.text().await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, csv)?;
                    println!("Wrote {}", path.display());
                }
                None => print!("{}", csv),
            }
        }
        Commands::Analytics { from, to } => {
            let mut query = Vec::new();
            if let Some(from) = from {
                query.push(("from", from));
            }
            if let Some(to) = to {
                query.push(("to", to));
            }
            let res = client
                .get(format!("{}/analytics", base))
                .headers(headers)
                .query(&query)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn upload(
    client: &reqwest::Client,
    headers: HeaderMap,
    url: String,
    file: &Path,
) -> Result<reqwest::Response, Box<dyn std::error::Error>> {
    let body = std::fs::read_to_string(file)?;
    Ok(client
        .post(url)
        .headers(headers)
        .header(CONTENT_TYPE, "text/csv")
        .body(body)
        .send()
        .await?)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: hub returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
