//! Animate a single frame into a short clip.
//!
//! Run with: `cargo run --example generate_transition -- start.png "zoom in slowly"`
//!
//! Requires `GEMINI_API_KEY` environment variable.

use veoclip::GenerationClient;

#[tokio::main]
async fn main() -> veoclip::Result<()> {
    let mut args = std::env::args().skip(1);
    let start = args.next().unwrap_or_else(|| "start.png".to_string());
    let prompt = args.next().unwrap_or_else(|| "zoom in slowly".to_string());

    let client = GenerationClient::builder().build()?;

    println!("Generating video (this may take a few minutes)...");
    let video = client
        .generate_and_download(&start, None, &prompt, "output/transition.mp4")
        .await?;

    println!(
        "Generated video: {} ({:.2} MB)",
        video.path.display(),
        video.size_mb()
    );

    Ok(())
}
