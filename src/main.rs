use anyhow::Result;
use clap::{Parser, Subcommand};
use niren_ai::app::App;
use niren_ai::config::KeySlot;
use niren_ai::schemas::SchemaName;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "niren-ai")]
#[command(about = "Generate listing copy and marketing insights with Gemini")]
struct CliArgs {
    /// Gemini API key; takes precedence over the API_KEY environment variable.
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate structured JSON for a task schema.
    Generate {
        #[arg(long, value_parser = parse_schema_arg)]
        schema: SchemaName,
        /// Model ID; defaults to GEMINI_MODEL or gemini-3-flash-preview.
        #[arg(long)]
        model: Option<String>,
        prompt: String,
    },
    /// Analyze one or more product images against a task schema.
    AnalyzeImages {
        #[arg(long, value_parser = parse_schema_arg)]
        schema: SchemaName,
        #[arg(long)]
        prompt: String,
        #[arg(required = true, value_name = "IMAGE")]
        images: Vec<PathBuf>,
    },
    /// Stream free-form text to stdout.
    Stream {
        /// Optional system instruction; omitted from the request when unset.
        #[arg(long)]
        system: Option<String>,
        prompt: String,
    },
    /// Print a task schema as sent to Gemini.
    Schema {
        #[arg(value_parser = parse_schema_arg)]
        name: SchemaName,
    },
}

fn parse_schema_arg(input: &str) -> std::result::Result<SchemaName, String> {
    input.parse::<SchemaName>().map_err(|_| {
        let names: Vec<&str> = SchemaName::ALL.iter().map(|n| n.as_str()).collect();
        format!(
            "Invalid schema '{}'. Expected one of: {}",
            input,
            names.join(", ")
        )
    })
}

async fn run(args: CliArgs) -> Result<()> {
    if let Command::Schema { name } = &args.command {
        println!("{}", serde_json::to_string_pretty(name.descriptor())?);
        return Ok(());
    }

    let slot = KeySlot::new();
    if let Some(key) = args.api_key {
        slot.set(key);
    }
    let app = App::new(slot)?;

    match args.command {
        Command::Generate {
            schema,
            model,
            prompt,
        } => {
            let result = app.generate(schema, &prompt, model.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&result.to_json()?)?);
        }
        Command::AnalyzeImages {
            schema,
            prompt,
            images,
        } => {
            let result = app.analyze_images(schema, &prompt, &images).await?;
            println!("{}", serde_json::to_string_pretty(&result.to_json()?)?);
        }
        Command::Stream { system, prompt } => {
            let mut stdout = tokio::io::stdout();
            let system = system.unwrap_or_default();
            let chunks = app.stream(&prompt, &system, &mut stdout).await?;
            println!();
            info!("Stream finished after {} chunk(s)", chunks);
        }
        Command::Schema { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "niren_ai=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    match run(args).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {}", e);
            std::process::exit(1);
        }
    }
}
