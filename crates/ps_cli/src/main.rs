use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ps_core::{DecodingTable, Error, Length, Result, Style, SAMPLE_TITLES};
use ps_web::AppState;

mod config;

use config::{AppConfig, Overrides};

#[derive(Parser, Debug)]
#[command(name = "papersum", author, version, about = "Two-stage research abstract generator and summarizer", long_about = None)]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, help = "Backend for abstract generation. Available backends: gemini (default), ollama, dummy")]
    generator: Option<String>,
    #[arg(long, help = "Backend for summarization. Available backends: gemini (default), ollama, dummy")]
    summarizer: Option<String>,
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long)]
    model_name: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Generate an abstract for a title and summarize it once
    Run {
        #[arg(long)]
        title: String,
        /// Explanation style (e.g. technical, beginner-friendly)
        #[arg(long, default_value = "technical")]
        style: String,
        /// Summary length: short, medium or long
        #[arg(long, default_value = "short")]
        length: String,
    },
    /// Serve the interactive form and JSON API
    Serve {
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the style/length to decoding parameter table
    Params,
    /// List styles, lengths and sample titles
    Options,
}

fn print_params(table: &DecodingTable) -> Result<()> {
    println!("{:<20} {:<8} {:>10} {:>10} {:>6}", "STYLE", "LENGTH", "MIN_TOKENS", "MAX_TOKENS", "BEAMS");
    for (config, params) in table.table()? {
        println!(
            "{:<20} {:<8} {:>10} {:>10} {:>6}",
            config.style.id(),
            config.length.id(),
            params.min_tokens,
            params.max_tokens,
            params.beam_count
        );
    }
    Ok(())
}

fn print_options() {
    println!("Styles:");
    for style in Style::ALL {
        println!("  {:<20} {}", style.id(), style.label());
    }
    println!("Lengths:");
    for length in Length::ALL {
        println!("  {:<20} {}", length.id(), length.label());
    }
    println!("Sample titles:");
    for title in SAMPLE_TITLES {
        println!("  {}", title);
    }
}

fn failure_message(error: &Error) -> String {
    match error.stage() {
        Some(stage) => format!("Error in {}: {}", stage, error),
        None => format!("Error: {}", error),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    let addr = match &cli.command {
        Commands::Serve { addr } => addr.clone(),
        _ => None,
    };
    config.apply(Overrides {
        generator: cli.generator,
        summarizer: cli.summarizer,
        model_url: cli.model_url,
        model_name: cli.model_name,
        addr,
    });
    config.validate()?;

    match cli.command {
        Commands::Params => print_params(&config.decoding)?,
        Commands::Options => print_options(),
        Commands::Run { title, style, length } => {
            let style: Style = style.parse()?;
            let length: Length = length.parse()?;
            let pipeline = config.build_pipeline()?;

            let outcome = pipeline.run(&title, style, length).await;
            pipeline.shutdown();
            match outcome {
                Ok(result) => {
                    println!("Summary of '{}'", title.trim());
                    println!("Style: {} | Length: {}", style, length);
                    println!("---");
                    println!("{}", result.summary_text);
                    println!("---");
                    println!("Model-generated abstract (input for summarization):");
                    println!("{}", result.abstract_text);
                }
                Err(e) => {
                    eprintln!("{}", failure_message(&e));
                    std::process::exit(1);
                }
            }
        }
        Commands::Serve { .. } => {
            let pipeline = config.build_pipeline()?;
            info!("✨ Pipeline ready ({} concurrent run(s))", config.runtime.max_concurrent_runs);
            ps_web::serve(AppState::new(pipeline), &config.server.addr).await?;
        }
    }

    Ok(())
}
