//! Integration tests for `AlgoliaClient` using wiremock HTTP mocks.

use std::time::Duration;

use courtside_core::IndexCredentials;
use courtside_index::{
    AlgoliaClient, BatchUpserter, GeoLoc, IndexError, IndexSettings, IndexWriter, SearchDocument,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> AlgoliaClient {
    AlgoliaClient::with_base_url(
        IndexCredentials {
            app_id: "test-app".to_string(),
            admin_key: "test-key".to_string(),
        },
        "locations",
        30,
        base_url,
    )
    .expect("client construction should not fail")
}

fn doc(id: &str) -> SearchDocument {
    SearchDocument {
        object_id: id.to_string(),
        name: Some("Central Park Courts".to_string()),
        address: None,
        geoloc: GeoLoc {
            lat: 40.78,
            lng: -73.97,
        },
        sports: vec!["BASKETBALL".to_string()],
        address_id: None,
        synced_at: 1_700_000_000_000,
        updated_at: 1_690_000_000_000,
    }
}

#[tokio::test]
async fn save_objects_posts_update_actions_with_auth_headers() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/batch"))
        .and(header("X-Algolia-Application-Id", "test-app"))
        .and(header("X-Algolia-API-Key", "test-key"))
        .and(body_partial_json(serde_json::json!({
            "requests": [
                { "action": "updateObject", "body": { "objectID": "a", "sports": ["BASKETBALL"] } },
                { "action": "updateObject", "body": { "objectID": "b" } }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "taskID": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client
        .save_objects(&[doc("a"), doc("b")])
        .await
        .expect("save should succeed");
}

#[tokio::test]
async fn save_objects_skips_request_for_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    client.save_objects(&[]).await.expect("no-op should succeed");
}

#[tokio::test]
async fn too_many_requests_maps_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/batch"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.save_objects(&[doc("a")]).await.unwrap_err();
    assert!(matches!(err, IndexError::RateLimited), "got {err:?}");
}

#[tokio::test]
async fn server_error_maps_to_unexpected_status_with_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/clear"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.clear_objects().await.unwrap_err();
    match err {
        IndexError::UnexpectedStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected UnexpectedStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn clear_objects_posts_to_clear_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/clear"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .clear_objects()
        .await
        .expect("clear should succeed");
}

#[tokio::test]
async fn delete_object_targets_the_object_path() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/1/indexes/locations/loc-42"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .delete_object("loc-42")
        .await
        .expect("delete should succeed");
}

#[tokio::test]
async fn set_settings_puts_settings_payload() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1/indexes/locations/settings"))
        .and(body_partial_json(serde_json::json!({
            "customRanking": ["desc(_updatedAt)"],
            "typoTolerance": true
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    test_client(&server.uri())
        .set_settings(&IndexSettings::locations())
        .await
        .expect("settings should succeed");
}

#[tokio::test]
async fn upserter_recovers_from_one_rate_limit() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/batch"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/batch"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = BatchUpserter::new(&client)
        .with_retry_delay(Duration::from_millis(10))
        .upsert(&[doc("a"), doc("b"), doc("c")])
        .await;

    assert_eq!(outcome.succeeded, 3);
    assert_eq!(outcome.failed, 0);
}

#[tokio::test]
async fn upserter_reports_whole_batch_failed_on_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/locations/batch"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let outcome = BatchUpserter::new(&client)
        .with_retry_delay(Duration::from_millis(10))
        .upsert(&[doc("a"), doc("b")])
        .await;

    assert_eq!(outcome.succeeded, 0);
    assert_eq!(outcome.failed, 2);
}
