//! Integration tests for the weather service against a wiremock upstream.

use std::sync::Arc;
use std::time::Duration;

use skycast_core::{Config, HttpConfig, UpstreamConfig};
use skycast_weather::{
    GeocodingClient, LocationQuery, ResponseCache, UpstreamClient, WeatherClient, WeatherError,
    WeatherService,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(server: &MockServer) -> Config {
    Config {
        upstream: UpstreamConfig::with_base_url(&server.uri()),
        ..Config::default()
    }
}

fn test_service(server: &MockServer, ttl_seconds: i64) -> WeatherService {
    WeatherService::new(&test_config(server), Arc::new(ResponseCache::new(ttl_seconds))).unwrap()
}

fn berlin_current() -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.405,
        "current_weather": {
            "temperature": 18.3,
            "windspeed": 10.0,
            "winddirection": 200,
            "weathercode": 3,
            "time": "2024-05-01T12:00"
        }
    })
}

fn berlin_search() -> serde_json::Value {
    serde_json::json!({
        "results": [{
            "id": 2950159,
            "name": "Berlin",
            "latitude": 52.52437,
            "longitude": 13.41053,
            "country": "Germany",
            "admin1": "Land Berlin"
        }]
    })
}

#[tokio::test]
async fn test_current_weather_by_coordinates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("longitude", "13.405"))
        .and(query_param("current_weather", "true"))
        .and(query_param("timezone", "auto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let query = LocationQuery::from_parts(None, Some(52.52), Some(13.405)).unwrap();
    let response = service.current_weather(&query).await.unwrap();

    assert_eq!(response.location.name, "52.5200,13.4050");
    assert_eq!(response.location.country, None);
    assert_eq!(response.current.temperature_c, 18.3);
    assert_eq!(response.current.wind_speed_kph, Some(10.0));
    assert_eq!(response.current.weather_code, Some(3));
    assert_eq!(response.current.condition_text.as_deref(), Some("Overcast"));
    assert_eq!(response.current.condition_icon.as_deref(), Some("cloudy"));
}

#[tokio::test]
async fn test_current_weather_by_text_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Berlin"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_search()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52437"))
        .and(query_param("longitude", "13.41053"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let query = LocationQuery::Text("Berlin".to_string());
    let response = service.current_weather(&query).await.unwrap();

    assert_eq!(response.location.name, "Berlin");
    assert_eq!(response.location.country.as_deref(), Some("Germany"));
    assert_eq!(response.location.state.as_deref(), Some("Land Berlin"));
    assert_eq!(response.current.condition_icon.as_deref(), Some("cloudy"));
}

#[tokio::test]
async fn test_text_query_without_match_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let query = LocationQuery::Text("zzzznotaplace".to_string());
    let err = service.current_weather(&query).await.unwrap_err();

    assert!(matches!(err, WeatherError::LocationNotFound(ref q) if q == "zzzznotaplace"));
}

#[tokio::test]
async fn test_forecast_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "3"))
        .and(query_param("daily", "weathercode,temperature_2m_max,temperature_2m_min"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily": {
                "time": ["2024-05-01", "2024-05-02", "2024-05-03"],
                "temperature_2m_max": [20.1, 22.4, 19.0],
                "temperature_2m_min": [9.5, 11.0, 8.2],
                "weathercode": [0, 63, 95]
            },
            "hourly": {
                "time": ["2024-05-01T00:00", "2024-05-01T01:00", "2024-05-01T02:00"],
                "temperature_2m": [11.0, 10.4],
                "weathercode": [1, 2, 3]
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let query = LocationQuery::Coordinates(skycast_weather::Coordinates::new(52.52, 13.405));
    let response = service.forecast(&query, 3).await.unwrap();

    assert_eq!(response.daily.len(), 3);
    assert_eq!(response.daily[1].condition_text.as_deref(), Some("Moderate rain"));
    assert_eq!(response.daily[2].condition_icon.as_deref(), Some("thunder"));
    assert_eq!(response.hourly.len(), 2);
    assert_eq!(response.hourly[1].time_iso, "2024-05-01T01:00");
}

#[tokio::test]
async fn test_forecast_rejects_out_of_range_days() {
    let mock_server = MockServer::start().await;
    let service = test_service(&mock_server, 45);
    let query = LocationQuery::Coordinates(skycast_weather::Coordinates::new(0.0, 0.0));

    let err = service.forecast(&query, 11).await.unwrap_err();
    assert!(matches!(err, WeatherError::InvalidRequest(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetcher_clamps_forecast_days() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("forecast_days", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let series = service.weather().forecast(1.0, 2.0, 30).await.unwrap();
    assert!(series.daily.is_empty());
    assert!(series.hourly.is_empty());
}

#[tokio::test]
async fn test_search_with_no_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "zzzznotaplace"))
        .and(query_param("count", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let response = service.search("zzzznotaplace").await.unwrap();
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_search_without_results_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generationtime_ms": 0.4})),
        )
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let response = service.search("zzzznotaplace").await.unwrap();
    assert!(response.results.is_empty());
}

#[tokio::test]
async fn test_search_blank_query_is_rejected() {
    let mock_server = MockServer::start().await;
    let service = test_service(&mock_server, 45);

    let err = service.search("   ").await.unwrap_err();
    assert!(matches!(err, WeatherError::InvalidRequest(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_search_results() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_search()))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let response = service.search("Berlin").await.unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].id.as_deref(), Some("2950159"));
    assert_eq!(response.results[0].location.name, "Berlin");
}

#[tokio::test]
async fn test_reverse_geocode_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("latitude", "0"))
        .and(query_param("longitude", "-30.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let response = service.reverse(0.0, -30.5).await.unwrap();
    assert!(response.result.is_none());
}

#[tokio::test]
async fn test_reverse_geocode_match() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_search()))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let response = service.reverse(52.52, 13.41).await.unwrap();
    let item = response.result.unwrap();
    assert_eq!(item.location.name, "Berlin");
    assert_eq!(item.location.coordinates.lat, 52.52437);
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let first = service.weather().fetch_current_weather(52.52, 13.405).await.unwrap();
    let second = service.weather().fetch_current_weather(52.52, 13.405).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_current_and_forecast_do_not_share_entries() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_current()))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    service.weather().fetch_current_weather(52.52, 13.405).await.unwrap();
    service.weather().fetch_forecast(52.52, 13.405, 3).await.unwrap();

    // Both are cached separately now
    service.weather().fetch_current_weather(52.52, 13.405).await.unwrap();
    service.weather().fetch_forecast(52.52, 13.405, 3).await.unwrap();
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_disabled_cache_always_refetches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"results": []})))
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 0);
    service.reverse(1.0, 2.0).await.unwrap();
    service.reverse(1.0, 2.0).await.unwrap();
}

#[tokio::test]
async fn test_upstream_error_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let query = LocationQuery::Coordinates(skycast_weather::Coordinates::new(1.0, 2.0));
    let err = service.current_weather(&query).await.unwrap_err();

    match err {
        WeatherError::Status { status, ref body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        ref other => panic!("expected status error, got {:?}", other),
    }
    assert!(err.is_upstream_failure());
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_search()))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    assert!(service.reverse(52.52, 13.41).await.is_err());

    let response = service.reverse(52.52, 13.41).await.unwrap();
    assert!(response.result.is_some());
}

#[tokio::test]
async fn test_non_json_body_is_format_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let err = service.search("Berlin").await.unwrap_err();
    assert!(err.is_format_failure());
}

#[tokio::test]
async fn test_missing_coordinates_is_format_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Atlantis", "latitude": null, "longitude": 1.0}]
        })))
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let err = service.search("Atlantis").await.unwrap_err();
    assert!(err.is_format_failure());
    assert!(!err.is_upstream_failure());
}

#[tokio::test]
async fn test_timeout_is_network_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(berlin_current())
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let config = Config {
        http: HttpConfig { timeout_seconds: 0.2 },
        ..test_config(&mock_server)
    };
    let service = WeatherService::new(&config, Arc::new(ResponseCache::new(45))).unwrap();
    let err = service
        .weather()
        .fetch_current_weather(52.52, 13.405)
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(err.is_upstream_failure());
}

#[tokio::test]
async fn test_concurrent_misses_each_go_upstream() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(berlin_current())
                .set_delay(Duration::from_millis(200)),
        )
        .expect(2)
        .mount(&mock_server)
        .await;

    let service = test_service(&mock_server, 45);
    let weather = service.weather();
    let (a, b) = tokio::join!(
        weather.fetch_current_weather(52.52, 13.405),
        weather.fetch_current_weather(52.52, 13.405),
    );
    assert!(a.is_ok());
    assert!(b.is_ok());

    // Whichever write landed last now serves later calls
    weather.fetch_current_weather(52.52, 13.405).await.unwrap();
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_service_from_clients_shares_one_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_current()))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(berlin_search()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let upstream = UpstreamConfig::with_base_url(&mock_server.uri());
    let http = UpstreamClient::new(HttpConfig::default().timeout(), Arc::new(ResponseCache::new(45)))
        .unwrap();
    let service = WeatherService::from_clients(
        WeatherClient::new(http.clone(), &upstream),
        GeocodingClient::new(http.clone(), &upstream),
    );

    let query = LocationQuery::Coordinates(skycast_weather::Coordinates::new(52.52, 13.405));
    service.current_weather(&query).await.unwrap();
    service.reverse(52.52, 13.405).await.unwrap();
    assert_eq!(http.cache().len(), 2);

    // Served from the shared cache
    service.current_weather(&query).await.unwrap();
    service.reverse(52.52, 13.405).await.unwrap();
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 2);
}
