use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use space_explorer::{
    constants,
    presentation::{self, Entry},
    web_server, Accumulate, Config, Pipeline, Transcript,
};

// Define the command-line interface structure using clap
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true, help = "Access key for the completion API.")]
    groq_api_key: Option<String>,

    #[arg(long, global = true, env = "NASA_API_KEY", hide_env_values = true, help = "Access key for the NASA NeoWs API.")]
    nasa_api_key: Option<String>,

    #[arg(long, global = true, help = "Base URL of the OpenAI-compatible completion API.")]
    groq_base_url: Option<String>,

    #[arg(long, global = true, help = "Completion model name.")]
    model: Option<String>,

    #[arg(long, global = true, help = "NASA NeoWs feed endpoint.")]
    nasa_feed_url: Option<String>,

    #[arg(long, global = true, default_value_t = constants::DEFAULT_TIMEOUT_SECS, help = "Timeout in seconds for each external call.")]
    timeout_secs: u64,
}

// Define the available subcommands
#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Start the web UI.
    Serve {
        #[arg(long, default_value_t = constants::DEFAULT_PORT, help = "Port for the web server.")]
        port: u16,
        #[arg(long, value_enum, default_value_t = Accumulate::Append, help = "Append runs to the chat, or replace the displayed run each time.")]
        accumulate: Accumulate,
    },
    /// Ask one question and print the answer with the asteroid list.
    Ask {
        #[arg(help = "The question to ask.")]
        question: String,
    },
}

impl Cli {
    fn config(&self) -> Result<Config> {
        let mut config = Config::from_keys(self.groq_api_key.clone(), self.nasa_api_key.clone())?
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(url) = &self.groq_base_url {
            config = config.with_groq_base_url(url);
        }
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(url) = &self.nasa_feed_url {
            config = config.with_nasa_feed_url(url);
        }
        Ok(config)
    }
}

fn print_entry(entry: &Entry) {
    match entry {
        Entry::UserText { text } => println!("🧑 You: {}", text),
        Entry::AssistantText { text } => println!("🤖 AI Response:\n{}\n", text),
        Entry::AssistantError { error } | Entry::FeedError { error } => println!("⚠️  {}", error),
        Entry::NoData { notice } => println!("{}", notice),
        Entry::Chart { chart } => {
            println!("📊 {}", chart.title);
            for bar in &chart.bars {
                println!("  {:<24} {:>10.4} km", bar.label, bar.value);
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (for GROQ_API_KEY / NASA_API_KEY)
    dotenvy::dotenv().ok();

    // Reads log level from RUST_LOG environment variable (e.g., RUST_LOG=info,space_explorer=debug)
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // Missing keys halt here, before anything listens or asks.
    let config = cli.config().map_err(|e| {
        error!("{}", e);
        e
    })?;
    let pipeline = Pipeline::from_config(&config).context("Failed to build HTTP client")?;

    match cli.command {
        Commands::Serve { port, accumulate } => {
            info!("Starting space explorer on port {}...", port);

            let mut web_server_handle = tokio::spawn(async move {
                if let Err(e) = web_server::start_web_server(port, pipeline, accumulate).await {
                    error!("Web server failed: {:?}", e);
                }
            });

            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);

            tokio::select! {
                _ = &mut ctrl_c => {
                    info!("Ctrl-C received, initiating shutdown...");
                }
                res = &mut web_server_handle => {
                    match res {
                        Ok(_) => info!("Web server task completed unexpectedly."),
                        Err(e) if e.is_panic() => error!("Web server task panicked: {:?}", e),
                        Err(e) => error!("Web server task failed: {:?}", e),
                    }
                }
            }

            if !web_server_handle.is_finished() {
                info!("Aborting web server task...");
                web_server_handle.abort();
            }
            info!("Shutdown complete.");
        }
        Commands::Ask { question } => {
            let mut transcript = Transcript::new();
            pipeline.submit_to(&mut transcript, &question).await?;
            for entry in presentation::render_messages(transcript.messages()) {
                if !entry.is_user() {
                    print_entry(&entry);
                }
            }
        }
    }

    Ok(())
}
