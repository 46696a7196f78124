//! Browser Operator
//!
//! Main entry point: checks the API credential and serves the task form.

use std::sync::Arc;

use anyhow::Context;
use browser_operator::core::config::{api_key_present, API_KEY_ENV};
use browser_operator::tools::browser::AgentBrowserCli;
use browser_operator::{BrowserOperator, Config, OperatorContext};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Browser Operator - LLM-driven browser automation from a web form
#[derive(Parser, Debug)]
#[command(name = "browser-operator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind the UI to
    #[arg(long)]
    host: Option<String>,

    /// Port to bind the UI to
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// Model used to plan browser actions
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Open the UI in the default browser
    #[arg(long)]
    open: bool,

    /// Run a single task without the UI and print the result
    #[arg(long, short = 't')]
    task: Option<String>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Write the default configuration file and exit
    #[arg(long)]
    init_config: bool,
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Try to load .env file if it exists
    let _ = dotenvy::dotenv();

    if args.print_config {
        print!("{}", Config::default_config_toml());
        return Ok(());
    }

    if args.init_config {
        let path = Config::default()
            .save_and_get_path()
            .context("failed to write config")?;
        println!("Config written to {}", path.display());
        return Ok(());
    }

    if !api_key_present() {
        println!("Error: {} not found in environment variables", API_KEY_ENV);
        println!(
            "Please set it using: export {}='your-key-here'",
            API_KEY_ENV
        );
        std::process::exit(1);
    }

    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(host) = args.host {
        config.ui.host = host;
    }

    if let Some(port) = args.port {
        config.ui.port = port;
    }

    if let Some(model) = args.model {
        config.openai.model = model;
    }

    if args.debug {
        config.agent.debug = true;
    }

    if args.open {
        config.ui.open_browser = true;
    }

    init_logging(config.agent.debug);

    if !AgentBrowserCli::new(&config.browser).is_available().await {
        warn!("agent-browser not found on PATH; tasks will fail until it is installed");
    }

    let operator =
        BrowserOperator::from_config(&config).context("failed to set up the browser operator")?;

    // Single task mode
    if let Some(task) = args.task {
        let report = operator.run_task(&task, config.browser.headless).await;
        println!("{}", report);
        return Ok(());
    }

    let context = Arc::new(OperatorContext::new(operator));
    browser_operator::ui::serve(&config.ui, context)
        .await
        .context("UI server exited unexpectedly")?;

    Ok(())
}
