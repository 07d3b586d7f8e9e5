use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use property_search::assistant::AssistantChannel;
use property_search::session::{Completion, SessionView};
use property_search::settings::{Args, Settings};
use property_search::sources::ApiClient;
use property_search::{QueryMapper, SearchController, SearchSession};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    info!("Searching listings at {}", settings.api.listings_url());

    let client = Arc::new(ApiClient::new(&settings.api)?);
    let session = SearchSession::new(QueryMapper::new(settings.search.page_size));
    let controller = SearchController::new(session, Arc::clone(&client))
        .with_scroll_threshold(settings.search.scroll_threshold_px);

    let update = args.filter_update()?;
    let first = match controller.update_filters(update).await {
        Some(completion) => Some(completion),
        None => controller.start().await,
    };
    if let Some(Completion::Failed(err)) = first {
        anyhow::bail!("Failed to load listings: {}", err);
    }

    for _ in 1..args.pages {
        match controller.fetch_next_page().await {
            Some(Completion::Failed(err)) => {
                warn!("Stopped paging: {}", err);
                break;
            }
            Some(_) => {}
            None => break,
        }
    }

    if let Some(question) = &args.ask {
        let mut channel = AssistantChannel::new(Arc::clone(&client));
        let outcome = channel.ask(question, &controller).await;
        println!("🤖 {}", outcome.reply);
        println!();
    }

    let view = controller.view().await;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_listings(&view);
    }

    Ok(())
}

fn print_listings(view: &SessionView) {
    info!(
        "✅ Showing {} of {} listings ({} pages)",
        view.items.len(),
        view.total_count,
        view.pages_loaded
    );

    for (i, property) in view.items.iter().enumerate() {
        match property.price {
            Some(price) => println!("{}. {} (₹{:.0})", i + 1, property.name, price),
            None => println!("{}. {}", i + 1, property.name),
        }
        if !property.bedrooms.is_empty() {
            let bedrooms: Vec<String> = property.bedrooms.iter().map(u32::to_string).collect();
            println!("   {} BHK", bedrooms.join("/"));
        }
        if let Some(area) = &property.location.area {
            println!("   Area: {}", area);
        }
        if let Some(status) = &property.status {
            println!("   Status: {}", status);
        }
        println!("   ID: {}", property.id);
        println!();
    }

    if let Some(notice) = &view.notice {
        warn!("{}", notice);
    }
    if view.has_next_page {
        info!("More results available; pass --pages to load them");
    }
}
