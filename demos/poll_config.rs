//! Poll a configd configuration and print every change.
//!
//! Settings come from an optional `configd.yaml` next to the working
//! directory and from `CONFIGD__*` environment variables:
//!
//! ```text
//! CONFIGD__URL=http://localhost:8080 \
//! CONFIGD__SOURCE=demo CONFIGD__INSTANCE=demo-1 \
//!     cargo run --example poll_config -- custom-schema dev
//! ```
//!
//! Stop with Ctrl-C.

use configd_client::prelude::*;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Deserialize)]
struct AppConfig {
    env: String,
    #[serde(default)]
    rate_limit: Option<f64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let schema_id = args.next().unwrap_or_else(|| "custom-schema".to_string());
    let config_id = args.next().unwrap_or_else(|| "dev".to_string());

    let mut loader = SettingsLoader::new();
    if Path::new("configd.yaml").exists() {
        loader = loader.with_file("configd.yaml");
    }
    let settings = loader.with_env_overrides("CONFIGD", "__").load()?;

    let client = ConfigdClient::new(settings)?;
    println!("Polling {schema_id}/{config_id} from {}", client.identity().url());

    let handle = client.poll(
        schema_id,
        config_id,
        Duration::from_secs(2),
        |snapshot: &ConfigSnapshot| -> std::result::Result<(), ClientError> {
            let config: AppConfig = snapshot.decode()?;
            println!(
                "v{} ({}) valid={} -> {:?}",
                snapshot.version, snapshot.checksum, snapshot.valid, config
            );
            Ok(())
        },
    )?;

    tokio::select! {
        outcome = handle.wait() => {
            // Polling stopped on its own: a fetch or the handler failed.
            if let Err(e) = &outcome {
                eprintln!("polling stopped: {e} ({:?})", e.kind());
            }
            outcome
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Stopping...");
            handle.cancel();
            handle.wait().await?;
            println!("Stopped cleanly.");
            Ok(())
        }
    }
}
