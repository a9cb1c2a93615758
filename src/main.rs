/// SortedShelf - personal media shelf services
///
/// Runs the auth, media and collection services, each on its own port
/// with its own SQLite database. The collection service reads media
/// details from the media service over HTTP.

mod aggregation;
mod api;
mod collection;
mod config;
mod context;
mod credentials;
mod db;
mod error;
mod media;
mod metrics;
mod server;
mod validation;

use config::ServerConfig;
use error::ShelfResult;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ShelfResult<()> {
    // Load configuration
    let config = ServerConfig::from_env()?;
    config.validate()?;

    // Initialize logging
    let json = config.logging.json;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();

    // Print banner
    print_banner(&config);

    // Start servers
    server::serve(Arc::new(config)).await?;

    Ok(())
}

fn print_banner(config: &ServerConfig) {
    println!(
        r#"
   _____            __           __   _____ __         ______
  / ___/____  _____/ /____  ____/ /  / ___// /_  ___  / / __/
  \__ \/ __ \/ ___/ __/ _ \/ __  /   \__ \/ __ \/ _ \/ / /_
 ___/ / /_/ / /  / /_/  __/ /_/ /   ___/ / / / /  __/ / __/
/____/\____/_/   \__/\___/\__,_/   /____/_/ /_/\___/_/_/

        SortedShelf v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );

    for kind in &config.service.enabled {
        println!(
            "        {:<10} http://{}:{}",
            kind.as_str(),
            config.service.hostname,
            config.service.port_for(*kind)
        );
    }
    println!();
}
