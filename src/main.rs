use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use docqa_core::QueryEngine;
use docqa_openai::OpenAIClient;
use docqa_rag::IndexProvider;
use docqa_web::{AppState, serve, shutdown_signal};

mod cli;
mod ui;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();
    let cli = Cli::parse();

    // One client serves both embeddings and chat; a missing key fails on first use.
    let client = Arc::new(OpenAIClient::from_env().context("invalid OpenAI configuration")?);
    if client.config().api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; embedding and chat requests will fail");
    }

    let provider = IndexProvider::new(cli.index_settings(), client.clone());
    let handle = if cli.rebuild {
        provider.rebuild().await
    } else {
        provider.get_index().await
    }
    .context("failed to load or build the index")?;
    let loaded = !handle.was_built();
    let index = handle.into_index();

    let engine = Arc::new(index.as_query_engine(client, cli.top_k));

    if let Some(question) = cli.question.as_deref() {
        let answer = engine.answer_query(question).await?;
        println!("{}", answer);
        return Ok(());
    }

    let server_config = cli.server_config();
    ui::display_banner(loaded, index.len(), &format!("http://{}", server_config.bind_addr()));

    let state = AppState::new(engine, index.len())?;
    serve(state, &server_config, shutdown_signal()).await?;

    println!("{}", "👋 Goodbye!".green());
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
