//! ccgate demo client
//!
//! Walks a running ccgate server through the client-credentials flow:
//! obtain credentials, exchange them for an access token, then call the
//! protected resource with that token.
//!
//! ```bash
//! ccgate-client credentials
//! ccgate-client token --client-id a1b2c3d4 --client-secret e5f6a7b8 --scope all
//! ccgate-client protected --access-token <token>
//! ccgate-client flow --scope all
//! ```
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error (network, parsing, etc.)
//! - 2: Request rejected by the server

use ccgate::oauth::{ClientCredentials, TokenResponse};
use clap::{Args, Parser, Subcommand, ValueEnum};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::process;
use url::Url;

#[derive(Parser)]
#[command(
    name = "ccgate-client",
    about = "ccgate client credentials demo client",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[arg(
        long,
        env = "CCGATE_BASE_URL",
        default_value = "http://localhost:8080",
        help = "Base URL of the ccgate server"
    )]
    base_url: Url,

    #[arg(short, long, help = "Enable verbose output for debugging")]
    verbose: bool,

    #[arg(
        long,
        value_enum,
        default_value = "json",
        help = "Output format for responses"
    )]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Json,
    JsonPretty,
}

#[derive(Subcommand)]
enum Commands {
    /// Issue a new client id and secret
    Credentials,
    /// Exchange client credentials for an access token
    Token(TokenArgs),
    /// Call the protected resource with an access token
    Protected(ProtectedArgs),
    /// Run credentials, token and protected in sequence
    Flow(FlowArgs),
}

#[derive(Args)]
struct TokenArgs {
    #[arg(long, env = "CCGATE_CLIENT_ID", help = "Client ID")]
    client_id: String,

    #[arg(long, env = "CCGATE_CLIENT_SECRET", help = "Client secret")]
    client_secret: String,

    #[arg(long, help = "OAuth scopes as a space-separated string")]
    scope: Option<String>,
}

#[derive(Args)]
struct ProtectedArgs {
    #[arg(long, env = "CCGATE_ACCESS_TOKEN", help = "Access token")]
    access_token: String,
}

#[derive(Args)]
struct FlowArgs {
    #[arg(long, help = "OAuth scopes as a space-separated string")]
    scope: Option<String>,
}

/// Application errors
#[derive(Debug)]
enum AppError {
    /// Network or HTTP client errors
    Network(reqwest::Error),
    /// JSON parsing or serialization errors
    Json(serde_json::Error),
    /// URL construction errors
    Url(url::ParseError),
    /// Non-success response from the server
    Rejected(StatusCode, String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Json(err)
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Url(err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Network(err) => write!(f, "Network error: {}", err),
            AppError::Json(err) => write!(f, "JSON error: {}", err),
            AppError::Url(err) => write!(f, "URL error: {}", err),
            AppError::Rejected(status, body) => {
                write!(f, "Request failed with status {}: {}", status, body)
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let http_client = Client::new();

    let result = match &cli.command {
        Commands::Credentials => fetch_credentials(&cli, &http_client)
            .await
            .and_then(|credentials| output_response(&cli.format, &credentials)),
        Commands::Token(args) => fetch_token(
            &cli,
            &http_client,
            &args.client_id,
            &args.client_secret,
            args.scope.as_deref(),
        )
        .await
        .and_then(|token| output_response(&cli.format, &token)),
        Commands::Protected(args) => fetch_protected(&cli, &http_client, &args.access_token)
            .await
            .map(|body| println!("{}", body)),
        Commands::Flow(args) => run_flow(&cli, &http_client, args).await,
    };

    match result {
        Ok(()) => process::exit(0),
        Err(err @ AppError::Rejected(..)) => {
            eprintln!("Error: {}", err);
            process::exit(2);
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            process::exit(1);
        }
    }
}

/// GET /credentials
async fn fetch_credentials(cli: &Cli, http_client: &Client) -> Result<ClientCredentials, AppError> {
    let url = cli.base_url.join("credentials")?;
    if cli.verbose {
        eprintln!("Requesting credentials from {}", url);
    }

    let response = http_client.get(url).send().await?;
    if cli.verbose {
        eprintln!("Response status: {}", response.status());
    }

    match response.status() {
        StatusCode::OK => Ok(response.json().await?),
        status => Err(AppError::Rejected(status, response.text().await?)),
    }
}

/// GET /token with the client_credentials grant
async fn fetch_token(
    cli: &Cli,
    http_client: &Client,
    client_id: &str,
    client_secret: &str,
    scope: Option<&str>,
) -> Result<TokenResponse, AppError> {
    let mut url = cli.base_url.join("token")?;
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", client_id)
            .append_pair("client_secret", client_secret);
        if let Some(scope) = scope {
            query.append_pair("scope", scope);
        }
    }
    if cli.verbose {
        eprintln!("Requesting token for client {}", client_id);
    }

    let response = http_client.get(url).send().await?;
    if cli.verbose {
        eprintln!("Response status: {}", response.status());
    }

    match response.status() {
        StatusCode::OK => Ok(response.json().await?),
        status => Err(AppError::Rejected(status, response.text().await?)),
    }
}

/// GET /protected with the token as a query parameter
async fn fetch_protected(
    cli: &Cli,
    http_client: &Client,
    access_token: &str,
) -> Result<String, AppError> {
    let mut url = cli.base_url.join("protected")?;
    url.query_pairs_mut()
        .append_pair("access_token", access_token);

    let response = http_client.get(url).send().await?;
    if cli.verbose {
        eprintln!("Response status: {}", response.status());
    }

    match response.status() {
        StatusCode::OK => Ok(response.text().await?),
        status => Err(AppError::Rejected(status, response.text().await?)),
    }
}

async fn run_flow(cli: &Cli, http_client: &Client, args: &FlowArgs) -> Result<(), AppError> {
    let credentials = fetch_credentials(cli, http_client).await?;
    output_response(&cli.format, &credentials)?;

    let token = fetch_token(
        cli,
        http_client,
        &credentials.client_id,
        &credentials.client_secret,
        args.scope.as_deref(),
    )
    .await?;
    output_response(&cli.format, &token)?;

    let body = fetch_protected(cli, http_client, &token.access_token).await?;
    println!("{}", body);

    Ok(())
}

/// Output response data in the requested format
fn output_response<T: Serialize>(format: &OutputFormat, data: &T) -> Result<(), AppError> {
    let value: Value = serde_json::to_value(data)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&value)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&value)?),
    }
    Ok(())
}
