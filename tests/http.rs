//! HTTP repository against a mock dog search service.

use std::time::Duration;

use pawmatch::domain::location::{BoundingBox, Coordinates};
use pawmatch::domain::types::DogId;
use pawmatch::dto::api::{DogSearchQuery, LocationSearchQuery, LoginRequest};
use pawmatch::query::SearchParams;
use pawmatch::repository::errors::RepositoryError;
use pawmatch::repository::{DogReader, HttpRepository, LocationReader, MatchWriter, SessionWriter};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn repository(server: &MockServer) -> HttpRepository {
    HttpRepository::new(&server.uri(), Duration::from_secs(5)).expect("client")
}

fn login_request() -> LoginRequest {
    LoginRequest {
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
    }
}

#[tokio::test]
async fn login_cookie_is_sent_with_later_requests() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"name": "Alice", "email": "alice@example.com"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "fetch-access-token=abc123; Path=/; HttpOnly"),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dogs/breeds"))
        .and(header("cookie", "fetch-access-token=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Beagle", "Pug"])))
        .expect(1)
        .mount(&server)
        .await;

    let repo = repository(&server);
    assert!(repo.login(&login_request()).await.unwrap());

    let breeds = repo.list_breeds().await.unwrap();
    assert_eq!(breeds, vec!["Beagle".to_string(), "Pug".to_string()]);
}

#[tokio::test]
async fn rejected_login_returns_false() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let repo = repository(&server);
    assert!(!repo.login(&login_request()).await.unwrap());
}

#[tokio::test]
async fn unauthorized_response_maps_to_unauthorized() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dogs/breeds"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = repository(&server).list_breeds().await.unwrap_err();
    assert!(matches!(err, RepositoryError::Unauthorized));
}

#[tokio::test]
async fn server_error_reports_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dogs/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let query = SearchParams::default().to_query(1);
    let err = repository(&server).search_dogs(&query).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Status { status: 500, .. }));
}

#[tokio::test]
async fn search_sends_repeated_filter_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/dogs/search"))
        .and(query_param("breeds", "Golden Retriever"))
        .and(query_param("breeds", "Pug"))
        .and(query_param("zipCodes", "10001"))
        .and(query_param("ageMin", "2"))
        .and(query_param("size", "25"))
        .and(query_param("from", "25"))
        .and(query_param("sort", "age:desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resultIds": ["d1", "d2"],
            "total": 27,
            "prev": "/dogs/search?size=25&from=0",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = DogSearchQuery {
        breeds: vec!["Golden Retriever".to_string(), "Pug".to_string()],
        zip_codes: vec!["10001".to_string()],
        age_min: Some(2),
        size: 25,
        from: Some("25".to_string()),
        sort: "age:desc".to_string(),
        ..DogSearchQuery::default()
    };

    let response = repository(&server).search_dogs(&query).await.unwrap();
    assert_eq!(response.result_ids, vec![DogId::from("d1"), DogId::from("d2")]);
    assert_eq!(response.total, 27);
    assert_eq!(response.next, None);
}

#[tokio::test]
async fn fetch_dogs_posts_id_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dogs"))
        .and(body_json(json!(["d1", "d2"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "d2", "img": "https://img/2.jpg", "name": "Rex", "age": 4, "zip_code": "10001", "breed": "Pug"},
            {"id": "d1", "img": "https://img/1.jpg", "name": "Bo", "age": 1, "zip_code": "10002", "breed": "Beagle"}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let dogs = repository(&server)
        .fetch_dogs(&[DogId::from("d1"), DogId::from("d2")])
        .await
        .unwrap();

    assert_eq!(dogs.len(), 2);
    assert_eq!(dogs[0].name, "Rex");
    assert_eq!(dogs[1].zip_code, "10002");
}

#[tokio::test]
async fn match_returns_chosen_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/dogs/match"))
        .and(body_json(json!(["d1", "d7"])))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"match": "d7"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = repository(&server)
        .generate_match(&[DogId::from("d1"), DogId::from("d7")])
        .await
        .unwrap();
    assert_eq!(response.matched, DogId::from("d7"));
}

#[tokio::test]
async fn location_search_posts_bounding_box() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/locations/search"))
        .and(body_json(json!({
            "geoBoundingBox": {"top": 41.0, "bottom": 40.0, "left": -74.5, "right": -73.5},
            "size": 100
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {"zip_code": "10001", "latitude": 40.75, "longitude": -73.99, "city": "New York", "state": "NY", "county": "New York"},
                {"zip_code": "10002"}
            ],
            "total": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = LocationSearchQuery {
        geo_bounding_box: BoundingBox::around(Coordinates::new(40.5, -74.0), 0.5),
        size: 100,
    };

    let locations = repository(&server).search_locations(&query).await.unwrap();
    let zips: Vec<&str> = locations.iter().map(|l| l.zip_code.as_str()).collect();
    assert_eq!(zips, vec!["10001", "10002"]);
    assert_eq!(locations[0].city.as_deref(), Some("New York"));
}

#[tokio::test]
async fn logout_posts_to_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    repository(&server).logout().await.unwrap();
}
