use httpmock::prelude::*;
use serde_json::json;

use scibridge_core::{BridgeConfig, FilterSpec, WhereNode};
use scibridge_error::{Error, FetchError};
use scibridge_service::Services;

fn services(server: &MockServer) -> Services {
    let config = BridgeConfig::from_parts(&server.url("/api/v3"), "ESS").expect("valid url");
    Services::http(&config).expect("services")
}

#[tokio::test]
async fn dataset_find_resolves_samples_over_http() {
    let server = MockServer::start_async().await;
    let datasets = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/Datasets");
            then.status(200).json_body(json!([{
                "pid": "20.500.12269/ds-1",
                "datasetName": "Lysozyme",
                "isPublished": true,
                "sampleId": "s-1"
            }]));
        })
        .await;
    let samples = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/Samples")
                .query_param("filter", r#"{"where":{"sampleId":"s-1"}}"#);
            then.status(200)
                .json_body(json!([{"sampleId": "s-1", "description": "Lysozyme crystal"}]));
        })
        .await;

    let filter = FilterSpec::from_json_str(r#"{"include": ["samples"]}"#).expect("filter");
    let found = services(&server).datasets.find(&filter).await.expect("find");

    datasets.assert_async().await;
    samples.assert_async().await;
    assert_eq!(
        found,
        vec![json!({
            "pid": "20.500.12269/ds-1",
            "title": "Lysozyme",
            "isPublic": true,
            "samples": [{"pid": "s-1", "name": "Lysozyme crystal", "description": "Lysozyme crystal"}],
            "score": 0
        })]
    );
}

#[tokio::test]
async fn secondary_fetch_failure_fails_the_request() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/Datasets");
            then.status(200)
                .json_body(json!([{"pid": "20.500.12269/ds-1", "sampleId": "s-1"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/Samples");
            then.status(503).body("maintenance");
        })
        .await;

    let filter = FilterSpec::from_json_str(r#"{"include": ["samples"]}"#).expect("filter");
    let err = services(&server)
        .datasets
        .find(&filter)
        .await
        .expect_err("sample fetch failed");
    match &err {
        Error::Fetch(FetchError::Status { status, .. }) => assert_eq!(*status, 503),
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn document_count_sends_translated_where() {
    let server = MockServer::start_async().await;
    let count = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/v3/PublishedData/count")
                .query_param("where", r#"{"abstract":"proteins"}"#);
            then.status(200).json_body(json!({"count": 7}));
        })
        .await;

    let where_clause = WhereNode::try_from(json!({"summary": "proteins", "type": "publication"}))
        .expect("where");
    let n = services(&server)
        .documents
        .count(Some(&where_clause))
        .await
        .expect("count");

    count.assert_async().await;
    assert_eq!(n, 7);
}

#[tokio::test]
async fn missing_instrument_is_not_found() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v3/Instruments/i-missing");
            then.status(404);
        })
        .await;

    let err = services(&server)
        .instruments
        .find_by_id("i-missing", &FilterSpec::default())
        .await
        .expect_err("404");
    assert_eq!(err.status_code(), 404);
}
