use std::env;
use std::path::PathBuf;

use pawmatch::models::config::ClientConfig;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    // Select the settings file (defaults to `config/default.yaml`).
    let path = env::var("PAWMATCH_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config/default.yaml"));

    let config = match ClientConfig::load(Some(&path)) {
        Ok(config) => config,
        Err(err) => {
            log::error!("Error loading client config: {}", err);
            std::process::exit(1);
        }
    };

    pawmatch::run(config).await
}
