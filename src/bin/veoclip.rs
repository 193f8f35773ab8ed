//! CLI for veoclip - image-to-video generation with Veo.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use veoclip::{encode_image, Credential, GenerationClient, VeoClipError, API_KEY_ENV, DEFAULT_MODEL};

#[derive(Parser)]
#[command(name = "veoclip")]
#[command(about = "Generate a video from a starting frame with Google Veo")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a generation task, wait for it, and download the video
    Generate(GenerateArgs),

    /// Encode an image the way it would be sent, without contacting the API
    Encode(EncodeArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Starting frame image
    #[arg(short, long)]
    start: PathBuf,

    /// Ending frame image (accepted, but not supported by the current Veo preview)
    #[arg(short, long)]
    end: Option<PathBuf>,

    /// Prompt describing the motion or transition
    #[arg(short, long)]
    prompt: String,

    /// Output video path
    #[arg(short, long)]
    output: PathBuf,

    /// Model identifier
    #[arg(short, long, default_value = DEFAULT_MODEL)]
    model: String,

    /// Give up after this many seconds
    #[arg(long, default_value_t = 600)]
    timeout: u64,

    /// Seconds between status checks
    #[arg(long, default_value_t = 10)]
    poll_interval: u64,

    /// API key (defaults to the GEMINI_API_KEY environment variable)
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Args)]
struct EncodeArgs {
    /// Image to encode
    image: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => generate(args, cli.json).await,
        Commands::Encode(args) => encode(args, cli.json),
    };

    if let Err(e) = result {
        tracing::error!(stage = %e.stage(), "{e}");
        if cli.json {
            let output = serde_json::json!({
                "success": false,
                "stage": e.stage().to_string(),
                "error": e.to_string(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        anyhow::bail!("[{}] {}", e.stage(), e);
    }

    Ok(())
}

async fn generate(args: GenerateArgs, json_output: bool) -> Result<(), VeoClipError> {
    // The environment is read here and nowhere else.
    let credential = Credential::resolve(args.api_key, std::env::var(API_KEY_ENV).ok())?;

    let client = GenerationClient::builder()
        .api_key(credential.expose())
        .model(&args.model)
        .timeout(Duration::from_secs(args.timeout))
        .poll_interval(Duration::from_secs(args.poll_interval))
        .build()?;

    let video = client
        .generate_and_download(&args.start, args.end.as_deref(), &args.prompt, args.output)
        .await?;

    if json_output {
        let result = serde_json::json!({
            "type": "video",
            "success": true,
            "output": video.path.display().to_string(),
            "size_bytes": video.size_bytes,
            "model": args.model,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string())
        );
    } else {
        println!(
            "Generated video: {} ({:.2} MB) via {}",
            video.path.display(),
            video.size_mb(),
            args.model
        );
    }

    Ok(())
}

fn encode(args: EncodeArgs, json_output: bool) -> Result<(), VeoClipError> {
    let image = encode_image(&args.image)?;

    if json_output {
        let result = serde_json::json!({
            "type": "image",
            "path": args.image.display().to_string(),
            "mime_type": image.mime_type,
            "size_bytes": image.decoded_len(),
            "base64_len": image.payload.len(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string())
        );
    } else {
        println!(
            "{}: {} ({} bytes, {} base64 chars)",
            args.image.display(),
            image.mime_type,
            image.decoded_len(),
            image.payload.len()
        );
    }

    Ok(())
}
