use std::io::Write;

use pawmatch::domain::location::Coordinates;
use pawmatch::models::config::{ClientConfig, DEFAULT_BASE_URL};
use pawmatch::services::geolocation::NearbySettings;
use tempfile::NamedTempFile;

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ClientConfig::load(Some(&dir.path().join("absent.yaml"))).unwrap();

    assert_eq!(config.base_url, DEFAULT_BASE_URL);
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.geolocation.max_zip_codes, 100);
    assert_eq!(config.position, None);
}

#[test]
fn yaml_file_overrides_selected_fields() {
    let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
    writeln!(
        file,
        "base_url: http://localhost:8080\n\
         geolocation:\n  box_degrees: 0.25\n  timeout_secs: 3\n\
         position:\n  latitude: 40.75\n  longitude: -73.99"
    )
    .unwrap();

    let config = ClientConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.base_url, "http://localhost:8080");
    assert_eq!(config.request_timeout_secs, 30);
    assert_eq!(config.position, Some(Coordinates::new(40.75, -73.99)));

    let settings = NearbySettings::from(&config.geolocation);
    assert_eq!(settings.box_degrees, 0.25);
    assert_eq!(settings.position.timeout.as_secs(), 3);
    assert_eq!(settings.position.maximum_age.as_secs(), 300);
    assert_eq!(settings.max_zip_codes, 100);
}
