//! HTTP transport tests against a local mock server

use arxiv_pager::client::{Client, ClientError};
use arxiv_pager::config::{ClientConfig, HttpConfig};
use arxiv_pager::models::Search;
use arxiv_pager::transport::mock::render_feed;
use arxiv_pager::transport::{FeedTransport, HttpTransport, MockEntry, TransportError};
use mockito::Matcher;
use std::sync::Arc;
use url::Url;

fn config(server: &mockito::ServerGuard, num_retries: u32) -> ClientConfig {
    ClientConfig::new(10, 0.0, num_retries).base_url(format!("{}/api/query", server.url()))
}

fn http_config() -> HttpConfig {
    HttpConfig {
        timeout_secs: 5,
        connect_timeout_secs: 5,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_search_over_http() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/query")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("search_query".into(), "quantum".into()),
            Matcher::UrlEncoded("start".into(), "0".into()),
            Matcher::UrlEncoded("max_results".into(), "3".into()),
        ]))
        .match_header("accept", "application/atom+xml")
        .with_status(200)
        .with_header("content-type", "application/atom+xml")
        .with_body(render_feed(&MockEntry::corpus(3), 3))
        .expect(1)
        .create_async()
        .await;

    let client = Client::with_http_config(config(&server, 0), &http_config()).unwrap();
    let results = client
        .results(&Search::new("quantum").max_results(3))
        .unwrap()
        .collect_all()
        .await
        .unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].title, "Paper 2301.00000");
    assert_eq!(results[0].comment.as_deref(), Some("Comment on 2301.00000"));
    assert_eq!(
        results[2].pdf_url.as_deref(),
        Some("http://arxiv.org/pdf/2301.00002v1")
    );
    mock.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_retried_then_reported() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/query")
        .match_query(Matcher::Any)
        .with_status(500)
        .expect(3)
        .create_async()
        .await;

    let client = Client::with_http_config(config(&server, 2), &http_config()).unwrap();
    let err = client
        .results(&Search::new("quantum"))
        .unwrap()
        .collect_all()
        .await
        .unwrap_err();

    match err {
        ClientError::Http { url, status, retry } => {
            assert_eq!(status, 500);
            assert_eq!(retry, 2);
            assert!(url.starts_with(&format!("{}/api/query?", server.url())));
        }
        other => panic!("unexpected error {:?}", other),
    }
    mock.assert_async().await;
}

#[tokio::test]
async fn test_transport_reports_status_and_bad_bodies() {
    let mut server = mockito::Server::new_async().await;
    let missing = server
        .mock("GET", "/missing")
        .with_status(404)
        .expect(3)
        .create_async()
        .await;
    let garbage = server
        .mock("GET", "/garbage")
        .with_status(200)
        .with_body("<html>not a feed")
        .expect(3)
        .create_async()
        .await;

    let base = Url::parse(&server.url()).unwrap();
    let transports = [
        HttpTransport::new().unwrap(),
        HttpTransport::with_config(&http_config()).unwrap(),
        HttpTransport::from_client(Arc::new(reqwest::Client::new())),
    ];

    for transport in &transports {
        let err = transport
            .fetch_feed(&base.join("/missing").unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, TransportError::Status(404));

        let err = transport
            .fetch_feed(&base.join("/garbage").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Feed(_)));
    }
    missing.assert_async().await;
    garbage.assert_async().await;
}
