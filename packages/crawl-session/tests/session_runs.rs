//! Integration tests for the crawl-session loop.
//!
//! These exercise the full run: fetch, dedup, stop signals, delay,
//! cancellation, and result assembly, all over mock collaborators.

use tokio_util::sync::CancellationToken;

use crawl_session::testing::{record, MockFetcher, MockUsage, PageScript};
use crawl_session::{
    CrawlConfig, LlmSettings, PaginationPolicy, SessionError, SessionRunner, UrlGuard,
};

fn listing_config(pagination: PaginationPolicy) -> CrawlConfig {
    CrawlConfig::new(
        "https://example.com/listings",
        LlmSettings::new("gpt-4o-mini", "Extract every listing card."),
    )
    .with_selector("div.listing-card")
    .with_required_fields(["name", "location"])
    .with_pagination(pagination.with_delay_seconds(0.0))
}

fn runner(fetcher: MockFetcher) -> SessionRunner<MockFetcher, MockUsage> {
    SessionRunner::new(fetcher, MockUsage::new())
}

#[tokio::test]
async fn three_pages_then_no_results_marker() {
    // Two unique records per page, page 3 reports the end of pagination.
    let fetcher = MockFetcher::new()
        .with_records_page(vec![
            record(&[("name", "a1"), ("location", "x")]),
            record(&[("name", "a2"), ("location", "x")]),
        ])
        .with_records_page(vec![
            record(&[("name", "b1"), ("location", "x")]),
            record(&[("name", "b2"), ("location", "x")]),
        ])
        .with_page(PageScript::NoResults);

    let result = runner(fetcher.clone())
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.pages_crawled, 3);
    assert_eq!(result.total_items, 4);
    assert_eq!(result.records.len(), 4);
    assert_eq!(fetcher.call_count(), 3);
}

#[tokio::test]
async fn no_results_after_three_full_pages_keeps_all_items() {
    // The no-results page is still a fetched page: it counts toward
    // pages_crawled even though it contributes nothing.
    let fetcher = MockFetcher::new()
        .with_records_page(vec![
            record(&[("name", "a1"), ("location", "x")]),
            record(&[("name", "a2"), ("location", "x")]),
        ])
        .with_records_page(vec![
            record(&[("name", "b1"), ("location", "x")]),
            record(&[("name", "b2"), ("location", "x")]),
        ])
        .with_records_page(vec![
            record(&[("name", "c1"), ("location", "x")]),
            record(&[("name", "c2"), ("location", "x")]),
        ])
        .with_page(PageScript::NoResults);

    let result = runner(fetcher)
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.total_items, 6);
    assert_eq!(result.pages_crawled, 4);
}

#[tokio::test]
async fn no_results_on_first_page_is_an_empty_success() {
    let fetcher = MockFetcher::new().with_page(PageScript::NoResults);

    let result = runner(fetcher)
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.total_items, 0);
    assert_eq!(result.pages_crawled, 1);
    assert!(result.is_empty());
}

#[tokio::test]
async fn empty_page_stops_without_marker() {
    // An empty page is a distinct stop signal from the no-results marker.
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_page(PageScript::Empty);

    let result = runner(fetcher.clone())
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.total_items, 1);
    assert_eq!(result.pages_crawled, 2);
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn duplicate_records_across_pages_collapse() {
    // Page 2 repeats all of page 1 and adds one new record.
    let page_one = vec![
        record(&[("name", "a"), ("location", "x")]),
        record(&[("name", "b"), ("location", "x")]),
        record(&[("name", "c"), ("location", "x")]),
    ];
    let mut page_two = page_one.clone();
    page_two.push(record(&[("name", "d"), ("location", "x")]));

    let fetcher = MockFetcher::new()
        .with_records_page(page_one)
        .with_records_page(page_two)
        .with_page(PageScript::NoResults);

    let result = runner(fetcher)
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.total_items, 4);
    let names: Vec<_> = result
        .records
        .iter()
        .map(|r| r.get("name").unwrap().as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["a", "b", "c", "d"]);
}

#[tokio::test]
async fn single_page_policy_fetches_once_regardless_of_cap() {
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "b"), ("location", "x")])]);

    let policy = PaginationPolicy {
        multi_page: false,
        max_pages: 50,
        delay_seconds: 0.0,
    };
    let result = runner(fetcher.clone())
        .run(&listing_config(policy))
        .await
        .unwrap();

    assert_eq!(result.pages_crawled, 1);
    assert_eq!(result.total_items, 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn multi_page_with_cap_of_one_fetches_exactly_one_page() {
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "b"), ("location", "x")])]);

    let result = runner(fetcher.clone())
        .run(&listing_config(PaginationPolicy::multi_page(1)))
        .await
        .unwrap();

    assert_eq!(result.pages_crawled, 1);
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn page_cap_stops_even_with_more_data() {
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "b"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "c"), ("location", "x")])]);

    let result = runner(fetcher.clone())
        .run(&listing_config(PaginationPolicy::multi_page(2)))
        .await
        .unwrap();

    assert_eq!(result.pages_crawled, 2);
    assert_eq!(result.total_items, 2);
    assert_eq!(fetcher.call_count(), 2);
}

#[tokio::test]
async fn fetch_failure_aborts_with_page_context() {
    let fetcher = MockFetcher::new()
        .with_records_page(vec![
            record(&[("name", "a"), ("location", "x")]),
            record(&[("name", "b"), ("location", "x")]),
        ])
        .with_page(PageScript::Fail("navigation timeout".into()));

    let err = runner(fetcher)
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap_err();

    match err {
        SessionError::Fetch { page, ref source } => {
            assert_eq!(page, 2);
            assert!(source.to_string().contains("navigation timeout"));
        }
        other => panic!("expected fetch error, got {other:?}"),
    }
    assert_eq!(err.failed_page(), Some(2));
}

#[tokio::test]
async fn records_without_identity_survive_every_page() {
    // Malformed records (identity field absent) are never deduplicated.
    let anonymous = record(&[("location", "x")]);
    let fetcher = MockFetcher::new()
        .with_records_page(vec![anonymous.clone()])
        .with_records_page(vec![anonymous])
        .with_page(PageScript::NoResults);

    let result = runner(fetcher)
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap();

    assert_eq!(result.total_items, 2);
}

#[tokio::test]
async fn usage_snapshot_is_passed_through() {
    let usage = MockUsage::new().with_snapshot(serde_json::json!({
        "prompt_tokens": 1200,
        "completion_tokens": 340,
        "total_tokens": 1540,
        "requests": 3,
    }));
    let fetcher =
        MockFetcher::new().with_records_page(vec![record(&[("name", "a"), ("location", "x")])]);

    let runner = SessionRunner::new(fetcher, usage.clone());
    let result = runner
        .run(&listing_config(PaginationPolicy::single_page()))
        .await
        .unwrap();

    assert_eq!(result.llm_usage["total_tokens"], 1540);
    assert_eq!(usage.snapshot_count(), 1);
}

#[tokio::test]
async fn fetcher_receives_config_arguments() {
    let fetcher =
        MockFetcher::new().with_records_page(vec![record(&[("name", "a"), ("location", "x")])]);

    runner(fetcher.clone())
        .run(&listing_config(PaginationPolicy::single_page()))
        .await
        .unwrap();

    let calls = fetcher.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].page_number, 1);
    assert_eq!(calls[0].base_url, "https://example.com/listings");
    assert_eq!(calls[0].selector, "div.listing-card");
    assert_eq!(calls[0].required_fields, ["name", "location"]);
}

#[tokio::test]
async fn rejects_unsafe_base_url_before_fetching() {
    let fetcher = MockFetcher::new();
    let mut config = listing_config(PaginationPolicy::single_page());
    config.base_url = "http://169.254.169.254/latest/meta-data".into();

    let err = runner(fetcher.clone()).run(&config).await.unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
    assert_eq!(fetcher.call_count(), 0);
}

#[tokio::test]
async fn guard_allow_list_admits_local_targets() {
    let fetcher =
        MockFetcher::new().with_records_page(vec![record(&[("name", "a"), ("location", "x")])]);
    let mut config = listing_config(PaginationPolicy::single_page());
    config.base_url = "http://localhost:8080/fixtures".into();

    let runner = SessionRunner::new(fetcher, MockUsage::new())
        .with_guard(UrlGuard::new().allow_host("localhost"));
    let result = runner.run(&config).await.unwrap();
    assert_eq!(result.total_items, 1);
}

#[tokio::test]
async fn inter_page_delay_is_applied_between_pages() {
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "b"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "c"), ("location", "x")])]);

    let config = CrawlConfig::new(
        "https://example.com/listings",
        LlmSettings::new("gpt-4o-mini", "Extract every listing card."),
    )
    .with_selector("div.listing-card")
    .with_required_fields(["name", "location"])
    .with_pagination(PaginationPolicy::multi_page(3).with_delay_seconds(0.2));

    let started = std::time::Instant::now();
    let result = runner(fetcher).run(&config).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(result.pages_crawled, 3);
    // Two inter-page delays of 200ms each
    assert!(
        elapsed >= std::time::Duration::from_millis(400),
        "delay not applied: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn cancellation_takes_effect_at_the_delay() {
    // Token already cancelled: page 1 still completes, the session ends at
    // the first suspension point with no partial result.
    let fetcher = MockFetcher::new()
        .with_records_page(vec![record(&[("name", "a"), ("location", "x")])])
        .with_records_page(vec![record(&[("name", "b"), ("location", "x")])]);

    let token = CancellationToken::new();
    token.cancel();

    let runner = SessionRunner::new(fetcher.clone(), MockUsage::new()).with_cancellation(token);
    let err = runner
        .run(&listing_config(PaginationPolicy::multi_page(5)))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Cancelled));
    assert_eq!(fetcher.call_count(), 1);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn run_session(
        pages: Vec<Vec<String>>,
        pagination: PaginationPolicy,
    ) -> crawl_session::SessionResult {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();

        let mut fetcher = MockFetcher::new();
        for names in &pages {
            fetcher = fetcher.with_records_page(
                names
                    .iter()
                    .map(|n| record(&[("name", n.as_str()), ("location", "x")]))
                    .collect(),
            );
        }

        rt.block_on(async {
            SessionRunner::new(fetcher, MockUsage::new())
                .run(&listing_config(pagination))
                .await
                .unwrap()
        })
    }

    proptest! {
        #[test]
        fn single_page_mode_always_crawls_one_page(
            max_pages in 1u32..100,
            names in proptest::collection::vec("[a-z]{1,8}", 0..5),
        ) {
            let pagination = PaginationPolicy {
                multi_page: false,
                max_pages,
                delay_seconds: 0.0,
            };
            let result = run_session(vec![names], pagination);
            prop_assert_eq!(result.pages_crawled, 1);
        }

        #[test]
        fn totals_match_and_identities_are_unique(
            pages in proptest::collection::vec(
                proptest::collection::vec("[a-z]{1,6}", 1..6),
                1..5,
            ),
        ) {
            let result = run_session(pages, PaginationPolicy::multi_page(10));

            prop_assert_eq!(result.total_items, result.records.len());

            let mut seen = std::collections::HashSet::new();
            for record in &result.records {
                let key = record.identity_key("name").expect("scripted records are named");
                prop_assert!(seen.insert(key), "duplicate identity key survived");
            }
        }
    }
}
