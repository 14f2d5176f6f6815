use anyhow::Result;
use bangla_captioner::app::App;
use bangla_captioner::models::{Config, DEFAULT_CAPTION_COUNT};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "bangla-captioner")]
#[command(about = "Generate Bangla captions for an image")]
struct CliArgs {
    /// Optional image file to load before the session starts.
    #[arg(value_name = "IMAGE")]
    image: Option<PathBuf>,

    /// Default number of captions per generation.
    #[arg(short = 'n', long = "captions", default_value_t = DEFAULT_CAPTION_COUNT, value_parser = parse_count_arg)]
    captions: u32,
}

fn parse_count_arg(input: &str) -> std::result::Result<u32, String> {
    match input.parse::<u32>() {
        Ok(count) if count >= 1 => Ok(count),
        _ => Err(format!("Invalid caption count '{}'. Expected an integer >= 1", input)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bangla_captioner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let mut app = App::from_config(&config, args.captions);

    if let Some(image) = &args.image {
        match app.load_image(image).await {
            Ok(()) => info!("Preloaded image: {}", image.display()),
            Err(e) => {
                error!("Failed to load image {}: {}", image.display(), e);
                std::process::exit(1);
            }
        }
    }

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match app.run(&mut input, &mut output).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Session ended with error: {}", e);
            std::process::exit(1);
        }
    }
}
