use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::forms::login::LoginForm;
use crate::models::config::ClientConfig;
use crate::repository::HttpRepository;
use crate::services::geolocation::{CachedGeolocator, FixedGeolocator, NearbySettings};
use crate::services::notifications::NotificationLog;
use crate::services::orchestrator::SearchPage;
use crate::services::ServiceError;

pub mod domain;
pub mod dto;
mod error_conversions;
pub mod forms;
pub mod models;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod services;
pub mod shell;

/// Signs in interactively and runs the search shell until the user quits.
pub async fn run(config: ClientConfig) -> std::io::Result<()> {
    let repo = HttpRepository::from_config(&config)
        .map_err(|e| std::io::Error::other(format!("Failed to build HTTP client: {e}")))?;
    let repo = Arc::new(repo);

    let geolocator = Arc::new(CachedGeolocator::new(FixedGeolocator::new(config.position)));
    let notifications = Arc::new(NotificationLog::new());
    let page = SearchPage::new(
        repo,
        geolocator,
        notifications.clone(),
        NearbySettings::from(&config.geolocation),
    );

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"name: ").await?;
        stdout.flush().await?;
        let Some(name) = lines.next_line().await? else {
            return Ok(());
        };
        stdout.write_all(b"email: ").await?;
        stdout.flush().await?;
        let Some(email) = lines.next_line().await? else {
            return Ok(());
        };

        match page.session().login(LoginForm::new(name, email)).await {
            Ok(true) => break,
            Ok(false) => stdout.write_all(b"Login failed. Please try again.\n").await?,
            Err(ServiceError::Form(message)) => {
                stdout.write_all(format!("{message}\n").as_bytes()).await?
            }
            Err(err) => stdout.write_all(format!("{err}\n").as_bytes()).await?,
        }
    }

    log::info!("Opening search against {}", config.base_url);
    page.open().await;
    shell::run(&page, &notifications, &mut lines).await
}
