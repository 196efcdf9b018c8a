use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tubely_api::auth::JwtService;
use tubely_cli::{init_tracing, Cli, Commands};
use tubely_core::{Config, VideoReference};
use tubely_processing::{FfprobeTool, MediaTool};
use tubely_storage::{create_storage, ObjectStorage};

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Token { user, hours } => {
            let hours = hours.unwrap_or_else(|| config.jwt_expiry_hours());
            let jwt = JwtService::new(config.jwt_secret());
            let token = jwt.issue(user, chrono::Duration::hours(hours))?;
            print_json(&serde_json::json!({
                "user_id": user,
                "expires_in_hours": hours,
                "token": token,
            }))?;
        }
        Commands::SignUrl {
            reference,
            ttl_secs,
        } => {
            let reference: VideoReference = reference
                .parse()
                .with_context(|| format!("Invalid reference '{}'", reference))?;
            let ttl = ttl_secs
                .map(Duration::from_secs)
                .unwrap_or_else(|| config.signed_url_ttl());

            let storage = create_storage(&config).await?;
            let publisher: Arc<dyn ObjectStorage> = storage.publisher;
            let url = publisher
                .sign(reference.bucket(), reference.key(), ttl)
                .await?;
            print_json(&serde_json::json!({
                "reference": reference.to_string(),
                "ttl_secs": ttl.as_secs(),
                "url": url,
            }))?;
        }
        Commands::Probe { file } => {
            let probe = FfprobeTool::new(config.ffprobe_path())?;
            let probed = probe.run(&file).await?;
            print_json(&serde_json::json!({
                "file": file.display().to_string(),
                "width": probed.width,
                "height": probed.height,
                "codec": probed.codec,
                "aspect": probed.aspect.as_str(),
            }))?;
        }
    }

    Ok(())
}
