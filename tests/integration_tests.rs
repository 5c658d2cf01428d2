//! Integration tests for arxiv-pager
//!
//! These tests drive the public client API against an in-memory arXiv corpus,
//! checking pagination, offsets, deduplication, entry skipping, retries and
//! rate limiting end to end.

use arxiv_pager::client::{checked_offset, Client, ClientError};
use arxiv_pager::config::ClientConfig;
use arxiv_pager::models::{ArxivResult, Search};
use arxiv_pager::transport::mock::{render_feed, window};
use arxiv_pager::transport::{FeedTransport, MockEntry, MockTransport, Page, TransportError};
use futures_util::StreamExt;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn corpus_transport(n: usize) -> Arc<MockTransport> {
    Arc::new(MockTransport::with_corpus(MockEntry::corpus(n)))
}

fn client(transport: Arc<MockTransport>, config: ClientConfig) -> Client {
    let transport: Arc<dyn FeedTransport> = transport;
    Client::with_transport(config, transport).unwrap()
}

fn fast_config(page_size: usize) -> ClientConfig {
    ClientConfig::new(page_size, 0.0, 3)
}

async fn collect(client: &Client, search: &Search, offset: usize) -> Vec<ArxivResult> {
    client
        .results_with_offset(search, offset)
        .unwrap()
        .collect_all()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_max_results() {
    let client = client(corpus_transport(1000), fast_config(10));
    let results = collect(&client, &Search::new("testing").max_results(2), 0).await;
    assert_eq!(results.len(), 2);
}

#[tokio::test]
async fn test_query_page_count() {
    let transport = corpus_transport(1000);
    let client = client(transport.clone(), fast_config(10));

    let results = collect(&client, &Search::new("testing").max_results(55), 0).await;

    assert_eq!(results.len(), 55);
    assert_eq!(transport.request_count(), 6);
    let last = transport.requests().pop().unwrap();
    assert_eq!(window(&last), (50, 5));
}

#[tokio::test]
async fn test_first_request_matches_format_url() {
    let transport = corpus_transport(100);
    let client = client(transport.clone(), fast_config(10));
    let search = Search::new("testing").max_results(5);

    collect(&client, &search, 0).await;

    assert_eq!(transport.requests()[0], client.format_url(&search, 0, 5));
}

#[tokio::test]
async fn test_offset() {
    let max_results = 10;
    let search = Search::new("testing").max_results(max_results);
    let client = client(corpus_transport(1000), fast_config(10));

    let default = collect(&client, &search, 0).await;
    let no_offset = collect(&client, &search, 0).await;
    assert_eq!(default, no_offset);

    let offset = max_results / 2;
    let half_offset = collect(&client, &search, offset).await;
    assert_eq!(default[offset..], half_offset[..]);

    let offset_at_max_results = collect(&client, &search, max_results).await;
    assert!(offset_at_max_results.is_empty());
}

#[tokio::test]
async fn test_offset_is_a_slice_for_any_page_size() {
    let search = Search::new("testing").max_results(10);
    let reference = collect(&client(corpus_transport(1000), fast_config(10)), &search, 0).await;
    let small_pages = client(corpus_transport(1000), fast_config(3));

    for offset in [0, 5, 9, 10, 11] {
        let results = collect(&small_pages, &search, offset).await;
        let expected = &reference[offset.min(reference.len())..];
        assert_eq!(results[..], expected[..], "offset {}", offset);
    }
}

#[tokio::test]
async fn test_offset_counts_raw_entries() {
    let mut corpus = MockEntry::corpus(6);
    corpus[0] = MockEntry::malformed("broken.0");
    let client = client(
        Arc::new(MockTransport::with_corpus(corpus)),
        fast_config(10),
    );
    let search = Search::new("testing").max_results(4);
    let short_ids = |results: Vec<ArxivResult>| -> Vec<String> {
        results.iter().map(|r| r.short_id().to_string()).collect()
    };

    let full = short_ids(collect(&client, &search, 0).await);
    assert_eq!(
        full,
        vec!["2301.00001v1", "2301.00002v1", "2301.00003v1", "2301.00004v1"]
    );

    // The malformed entry still holds raw position 0.
    let from_one = short_ids(collect(&client, &search, 1).await);
    assert_eq!(
        from_one,
        vec!["2301.00001v1", "2301.00002v1", "2301.00003v1"]
    );
}

#[tokio::test]
async fn test_results_carry_arxiv_extension_fields() {
    let client = client(corpus_transport(3), fast_config(10));
    let results = collect(&client, &Search::new("testing"), 0).await;

    assert_eq!(results.len(), 3);
    for result in &results {
        let id = result.short_id().trim_end_matches("v1").to_string();
        assert_eq!(result.comment, Some(format!("Comment on {}", id)));
        assert_eq!(result.primary_category.as_deref(), Some("cs.LG"));
        assert_eq!(result.journal_ref, None);
    }
}

#[tokio::test]
async fn test_offset_at_or_past_total_results_is_empty() {
    for offset in [20, 25] {
        let transport = corpus_transport(20);
        let client = client(transport.clone(), fast_config(10));

        let results = collect(&client, &Search::new("testing"), offset).await;

        assert!(results.is_empty());
        assert_eq!(transport.request_count(), 1);
    }
}

#[tokio::test]
async fn test_unbounded_search_stops_at_end_of_results() {
    let transport = corpus_transport(25);
    let client = client(transport.clone(), fast_config(10));

    let results = collect(&client, &Search::new("testing"), 0).await;

    assert_eq!(results.len(), 25);
    assert_eq!(transport.request_count(), 3);
}

#[tokio::test]
async fn test_no_duplicates() {
    let client = client(corpus_transport(150), fast_config(10));
    let mut ids = HashSet::new();

    for result in collect(&client, &Search::new("testing").max_results(100), 0).await {
        assert!(ids.insert(result.entry_id.clone()), "duplicate {}", result.entry_id);
    }
    assert_eq!(ids.len(), 100);
}

#[tokio::test]
async fn test_nonexistent_id_in_list() {
    let client = client(corpus_transport(10), fast_config(100));

    let results = collect(&client, &Search::by_ids(["0808.05394"]), 0).await;
    assert!(results.is_empty());

    let results = collect(&client, &Search::by_ids(["0808.05394", "2301.00007"]), 0).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].short_id(), "2301.00007v1");
}

#[tokio::test]
async fn test_malformed_entries_do_not_affect_later_pages() {
    let mut corpus = MockEntry::corpus(6);
    corpus[1] = MockEntry::malformed("broken.1");
    corpus[4] = MockEntry::malformed("broken.4");
    let ids: Vec<String> = corpus.iter().map(|e| e.id.clone()).collect();
    let client = client(
        Arc::new(MockTransport::with_corpus(corpus)),
        fast_config(3),
    );

    let results = collect(&client, &Search::by_ids(ids), 0).await;

    let short_ids: Vec<&str> = results.iter().map(|r| r.short_id()).collect();
    assert_eq!(
        short_ids,
        vec!["2301.00000v1", "2301.00002v1", "2301.00003v1", "2301.00005v1"]
    );
}

#[tokio::test]
async fn test_http_error_ends_stream_after_partial_results() {
    let corpus = MockEntry::corpus(30);
    let transport = Arc::new(MockTransport::new(move |url| match window(url) {
        (start, _) if start >= 10 => Err(TransportError::Status(500)),
        (start, size) => Page::from_atom(render_feed(&corpus[start..start + size], 30).as_bytes()),
    }));
    let client = client(transport, ClientConfig::new(10, 0.0, 0));

    let mut stream = client.results(&Search::new("testing")).unwrap();
    let mut ok = 0;
    let error = loop {
        match stream.next().await {
            Some(Ok(_)) => ok += 1,
            Some(Err(e)) => break e,
            None => panic!("stream ended without an error"),
        }
    };

    assert_eq!(ok, 10);
    assert!(matches!(error, ClientError::Http { status: 500, retry: 0, .. }));
    assert!(stream.next().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_retry() {
    for num_retries in [2, 5] {
        let transport = Arc::new(MockTransport::failing(500));
        let client = client(transport.clone(), ClientConfig::new(1, 3.0, num_retries));
        let start = Instant::now();

        let mut stream = client.results(&Search::new("quantum")).unwrap();
        let err = stream.next().await.unwrap().unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.retry(), Some(num_retries));
        assert_eq!(transport.request_count(), num_retries as usize + 1);
        assert!(start.elapsed() >= Duration::from_secs(3) * num_retries);
        assert!(start.elapsed() < Duration::from_secs(3) * (num_retries + 1));
    }
}

#[tokio::test(start_paused = true)]
async fn test_sleep_is_url_independent() {
    let client = client(corpus_transport(10), ClientConfig::new(1, 3.0, 3));
    let url1 = client.format_url(&Search::new("quantum"), 0, 1);
    let url2 = client.format_url(&Search::new("testing"), 0, 1);

    let start = Instant::now();
    client.fetch_page(&url1).await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);

    let start = Instant::now();
    client.fetch_page(&url2).await.unwrap();
    assert!(start.elapsed() >= Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn test_sleep_zero_delay() {
    let client = client(corpus_transport(10), ClientConfig::new(1, 0.0, 3));
    let url = client.format_url(&Search::new("quantum"), 0, 1);

    let start = Instant::now();
    client.fetch_page(&url).await.unwrap();
    client.fetch_page(&url).await.unwrap();
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_delay_is_paid_between_pages_and_shared_by_clones() {
    let transport = corpus_transport(100);
    let client = client(transport.clone(), ClientConfig::new(10, 3.0, 0));
    let start = Instant::now();

    let results = collect(&client, &Search::new("testing").max_results(30), 0).await;
    assert_eq!(results.len(), 30);
    assert!(start.elapsed() >= Duration::from_secs(6));
    assert!(start.elapsed() < Duration::from_secs(9));

    // A different search from a clone still waits for the shared clock.
    let clone = client.clone();
    let before = Instant::now();
    collect(&clone, &Search::new("other").max_results(1), 0).await;
    assert!(before.elapsed() >= Duration::from_secs(3));
}

#[tokio::test]
async fn test_dropping_stream_stops_fetching() {
    let transport = corpus_transport(100);
    let client = client(transport.clone(), fast_config(10));

    let mut stream = client.results(&Search::new("testing")).unwrap();
    for _ in 0..3 {
        stream.next().await.unwrap().unwrap();
    }
    drop(stream);

    assert_eq!(transport.request_count(), 1);
}

#[tokio::test]
async fn test_into_stream() {
    let client = client(corpus_transport(100), fast_config(4));
    let stream = client
        .results(&Search::new("testing").max_results(9))
        .unwrap()
        .into_stream();

    let results: Vec<Result<ArxivResult, ClientError>> = stream.collect().await;
    assert_eq!(results.len(), 9);
    assert!(results.iter().all(|r| r.is_ok()));
}

#[test]
fn test_negative_offset_is_rejected() {
    assert!(matches!(
        checked_offset(-1),
        Err(ClientError::InvalidRequest(_))
    ));
}
