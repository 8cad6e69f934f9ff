//! Signs in and prints the zip codes around the configured position.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use pawmatch::forms::login::LoginForm;
use pawmatch::models::config::ClientConfig;
use pawmatch::repository::HttpRepository;
use pawmatch::services::geolocation::{FixedGeolocator, NearbyResolver, NearbySettings};
use pawmatch::services::session::Session;

#[tokio::main]
async fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = env::args().skip(1);
    let (Some(name), Some(email)) = (args.next(), args.next()) else {
        eprintln!("usage: nearby <name> <email>");
        std::process::exit(2);
    };

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

    let repo = match HttpRepository::from_config(&config) {
        Ok(repo) => Arc::new(repo),
        Err(err) => {
            log::error!("Failed to build HTTP client: {err}");
            std::process::exit(1);
        }
    };

    let session = Session::new(repo.clone());
    match session.login(LoginForm::new(name, email)).await {
        Ok(true) => {}
        Ok(false) => {
            log::error!("Login rejected by {}", config.base_url);
            std::process::exit(1);
        }
        Err(err) => {
            log::error!("Invalid credentials: {err}");
            std::process::exit(1);
        }
    }

    let resolver = NearbyResolver::new(
        repo,
        Arc::new(FixedGeolocator::new(config.position)),
        NearbySettings::from(&config.geolocation),
    );

    let outcome = resolver.resolve().await;
    session.logout().await;

    match outcome {
        Ok(zip_codes) => {
            log::info!("Found {} nearby zip codes", zip_codes.len());
            for zip in zip_codes {
                println!("{zip}");
            }
        }
        Err(err) => {
            log::error!("{}", err.user_message());
            std::process::exit(1);
        }
    }
}
