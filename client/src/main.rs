//! `item-client` command: list, read, create, patch, and delete catalogue items.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use item_client::domain::{Item, ItemClient, ItemId, NewItem, StatusFeed};
use item_client::outbound::http::HttpItemTransport;
use item_client::ClientSettings;
use ortho_config::OrthoConfig;
use outcome::ApiOutcome;
use rust_decimal::Decimal;
use tokio::runtime::Builder;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `item-client` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "item-client",
    about = "Talk to the item catalogue service",
    version
)]
struct CliArgs {
    /// Base URL of the item service. Falls back to `ITEM_CLIENT_BASE_URL`.
    #[arg(long = "base-url", value_name = "url")]
    base_url: Option<Url>,
    /// Request timeout in milliseconds. Falls back to `ITEM_CLIENT_TIMEOUT_MS`.
    #[arg(long = "timeout-ms", value_name = "millis")]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// List every item.
    List,
    /// Show one item.
    Get {
        /// Item identity.
        id: ItemId,
    },
    /// Create an item.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price: Decimal,
    },
    /// Change selected fields of an item, sending only what differs.
    Patch {
        /// Item identity.
        id: ItemId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        price: Option<Decimal>,
    },
    /// Delete an item.
    Delete {
        /// Item identity.
        id: ItemId,
    },
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let (base_url, timeout) = resolve_connection(&args)?;

    let transport = HttpItemTransport::new(base_url, timeout)
        .map_err(|error| io::Error::other(format!("create http client: {error}")))?;
    let feed = StatusFeed::new();
    let client = ItemClient::new(Arc::new(transport)).with_status_feed(feed.clone());
    let cancel = CancellationToken::new();

    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ctrl_c_cancel.cancel();
        }
    });

    let succeeded = match args.command {
        Command::List => report_items(client.get_items(&cancel).await),
        Command::Get { id } => report_item(client.get_item(id, &cancel).await),
        Command::Create {
            name,
            description,
            price,
        } => {
            let payload = NewItem::new(name, description, price);
            report_item(client.create_item(&payload, &cancel).await)
        }
        Command::Patch {
            id,
            name,
            description,
            price,
        } => {
            let current = client.get_item(id, &cancel).await;
            if current.is_failure() {
                report_item(current)
            } else {
                let original = current.into_value();
                let modified = edited(&original, name, description, price)?;
                report_item(client.patch_item(&original, &modified, &cancel).await)
            }
        }
        Command::Delete { id } => {
            let current = client.get_item(id, &cancel).await;
            if current.is_failure() {
                report_item(current)
            } else {
                let item = current.into_value();
                report_item(client.delete_item(&item, &cancel).await)
            }
        }
    };

    info!(status = %feed.current(), "item-client finished");
    if succeeded {
        Ok(())
    } else {
        Err(io::Error::other("item service operation failed"))
    }
}

fn resolve_connection(args: &CliArgs) -> io::Result<(Url, Duration)> {
    let settings = ClientSettings::load_from_iter([OsString::from("item-client")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let base_url = match &args.base_url {
        Some(url) => url.clone(),
        None => settings.base_url().map_err(io::Error::other)?,
    };
    let timeout = match args.timeout_ms {
        Some(0) => return Err(io::Error::other("--timeout-ms must be at least 1")),
        Some(millis) => Duration::from_millis(millis),
        None => settings.timeout().map_err(io::Error::other)?,
    };
    Ok((base_url, timeout))
}

fn edited(
    original: &Item,
    name: Option<String>,
    description: Option<String>,
    price: Option<Decimal>,
) -> io::Result<Item> {
    let mut modified = original.clone();
    if let Some(value) = name {
        modified.set_name(value).map_err(io::Error::other)?;
    }
    if let Some(value) = description {
        modified.set_description(value).map_err(io::Error::other)?;
    }
    if let Some(value) = price {
        modified.set_price(value).map_err(io::Error::other)?;
    }
    Ok(modified)
}

fn report_items(result: ApiOutcome<Vec<Item>>) -> bool {
    if result.is_failure() {
        return report_failure(&result);
    }
    for item in result.value() {
        print_item(item);
    }
    true
}

fn report_item(result: ApiOutcome<Item>) -> bool {
    if result.is_failure() {
        return report_failure(&result);
    }
    print_item(result.value());
    true
}

fn report_failure<T>(result: &ApiOutcome<T>) -> bool {
    eprintln!("error={}", result.failure_message());
    if let Some(code) = result.status().code() {
        eprintln!("status={code}");
    }
    false
}

fn print_item(item: &Item) {
    println!(
        "id={} name={:?} description={:?} price={} created={}",
        item.id(),
        item.name(),
        item.description(),
        item.price(),
        item.created_date().to_rfc3339()
    );
}
