//! `wikiq`: command-line access to a MediaWiki API through wikiquery.
//!
//! Every subcommand goes through the same retrying client:
//!
//! - **`query`**: arbitrary `action=query` call from `KEY=VALUE` pairs.
//! - **`content`**: raw wikitext of one page.
//! - **`user-id`**: numeric id of a user.
//! - **`is-redirect`**: whether a page is a redirect.
//! - **`page-info`**: `prop=info` for one or more pages.
//! - **`raw-content`**: latest wikitext of one or more pages.
//! - **`rating`**: quality/importance ratings from talk-page banners.
//!
//! Structured results are printed as pretty JSON on stdout; logs go to
//! stderr. Exit codes: 0 on success, 1 when nothing came back, 2 on fatal
//! errors.

use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use wikiquery::{parse_param, Query};
use wikiquery_client::{merge_ratings, ClientConfig, ClientError, Endpoint, Outcome, WikiClient};

/// wikiq: retrying MediaWiki query client
#[derive(Parser, Debug)]
#[command(name = "wikiq", version, about, long_about = None)]
struct Cli {
    /// API endpoint, e.g. https://en.wikipedia.org/w/api.php
    #[arg(long, global = true, env = "WIKIQ_ENDPOINT", value_name = "URL")]
    endpoint: Option<String>,

    /// Request timeout in seconds. Must be at least 1.
    #[arg(long, global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Total attempts per call, the first one included.
    #[arg(long, global = true, value_name = "N")]
    max_attempts: Option<u32>,

    /// Pause between attempts, in milliseconds.
    #[arg(long, global = true, value_name = "MS")]
    backoff: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run an `action=query` call.
    ///
    /// Values containing `|` are sent as lists.
    ///
    /// Example:
    ///   wikiq query list=users ususers='Example|Jimbo Wales'
    Query {
        #[arg(value_name = "KEY=VALUE", required = true)]
        params: Vec<String>,
    },

    /// Print the raw wikitext of a page.
    Content { title: String },

    /// Print the numeric id of a user.
    UserId { name: String },

    /// Print `true` if the page is a redirect, `false` otherwise.
    IsRedirect { title: String },

    /// Print `prop=info` data for pages.
    PageInfo {
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Print the latest wikitext of pages, keyed by page id.
    RawContent {
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Print article ratings read from talk-page banners.
    Rating {
        #[arg(required = true)]
        titles: Vec<String>,

        /// Print one title → rating map instead of a list of entries.
        #[arg(long)]
        merged: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wikiquery_client=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let client = build_client(&cli);

    match cli.command {
        Command::Query { params } => {
            let query = parse_query(&params);
            let response = settle(client.query(query).await);
            print_json(&response);
        }

        Command::Content { title } => {
            print!("{}", settle(client.get_page_content(&title).await));
        }

        Command::UserId { name } => {
            println!("{}", settle(client.get_user_id(&name).await));
        }

        Command::IsRedirect { title } => match client.is_redirect(&title).await {
            Ok(redirect) => println!("{redirect}"),
            Err(e) => fatal(&e.to_string()),
        },

        Command::PageInfo { titles } => {
            print_json(&settle(client.get_page_info(&titles).await));
        }

        Command::RawContent { titles } => {
            print_json(&settle(client.get_raw_page_content(&titles).await));
        }

        Command::Rating { titles, merged } => {
            let entries = match client.get_article_rating(&titles).await {
                Ok(entries) => entries,
                Err(e) => fatal(&e.to_string()),
            };
            if entries.is_empty() {
                eprintln!("wikiq: no ratings");
                process::exit(1);
            }
            if merged {
                print_json(&merge_ratings(entries));
            } else {
                print_json(&entries);
            }
        }
    }
}

/// Environment first, then command-line overrides.
fn build_client(cli: &Cli) -> WikiClient {
    let mut config = ClientConfig::from_env().unwrap_or_else(|e| fatal(&e.to_string()));

    if let Some(raw) = &cli.endpoint {
        let endpoint = Endpoint::parse(raw).unwrap_or_else(|e| fatal(&e.to_string()));
        config.endpoint = Some(endpoint);
    }
    if let Some(secs) = cli.timeout {
        config.timeout_secs = secs;
    }
    if let Some(n) = cli.max_attempts {
        config.retry.max_attempts = n;
    }
    if let Some(ms) = cli.backoff {
        config.retry.backoff = Duration::from_millis(ms);
    }

    match WikiClient::from_config(&config) {
        Ok(client) => client,
        Err(ClientError::NoEndpoint) => fatal("no endpoint; pass --endpoint or set WIKIQ_ENDPOINT"),
        Err(e) => fatal(&e.to_string()),
    }
}

fn parse_query(params: &[String]) -> Query {
    params
        .iter()
        .map(|raw| parse_param(raw).unwrap_or_else(|e| fatal(&e.to_string())))
        .collect()
}

/// Unwrap a found value, or exit: 1 for absence and absorbed failures, 2
/// for fatal errors.
fn settle<T>(result: Result<Outcome<T>, ClientError>) -> T {
    match result {
        Ok(Outcome::Found(value)) => value,
        Ok(Outcome::NotFound) => {
            eprintln!("wikiq: not found");
            process::exit(1);
        }
        Ok(Outcome::Rejected(e)) => {
            eprintln!("wikiq: rejected by the wiki: {e}");
            process::exit(1);
        }
        Ok(Outcome::Degraded(failure)) => {
            eprintln!(
                "wikiq: gave up after {} attempt(s): {}",
                failure.attempts, failure.message
            );
            process::exit(1);
        }
        Err(e) => fatal(&e.to_string()),
    }
}

fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => fatal(&format!("serialisation error: {e}")),
    }
}

fn fatal(msg: &str) -> ! {
    eprintln!("wikiq: {}", msg);
    process::exit(2);
}
