//! Integration tests for the hierarchy walk, retry handling and insights

use crate::{create_test_config, RATE_LIMIT_MARKER, TOKEN};
use ad_harvest::config::{Config, RetryConfig};
use ad_harvest::crawler::{
    run_insights, Coordinator, GraphClient, ResumePoint, AD_FIELDS, DATE_PRESET,
};
use ad_harvest::model::{CampaignRecord, ResumeCursor, UrlSource};
use ad_harvest::storage::{read_json_or_default, CheckpointStore, JsonFileStore};
use ad_harvest::{ConfigError, HarvestError};
use serde_json::{json, Value};
use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn store_for(config: &Config) -> JsonFileStore {
    JsonFileStore::new(&config.output.results_path, &config.output.cursor_path)
}

fn committed(id: &str) -> CampaignRecord {
    CampaignRecord {
        campaign_id: id.to_string(),
        name: format!("Campaign {}", id),
        status: "ACTIVE".to_string(),
        adsets: vec![],
    }
}

fn listing(data: Value) -> Value {
    json!({ "data": data, "paging": { "cursors": { "before": "b", "after": "end" } } })
}

async fn mount_listing(server: &MockServer, route: &str, data: Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(data)))
        .mount(server)
        .await;
}

/// Mounts campaign `id` with a single ad set `s<id>` holding one linked ad
async fn mount_simple_campaign(server: &MockServer, id: &str) {
    mount_listing(
        server,
        &format!("/{}/adsets", id),
        json!([{ "id": format!("s{}", id), "name": "Readers", "status": "ACTIVE" }]),
    )
    .await;
    mount_listing(
        server,
        &format!("/s{}/ads", id),
        json!([{
            "id": format!("a{}", id),
            "name": "Ad",
            "status": "ACTIVE",
            "creative": { "object_url": format!("https://example.org/{}", id) }
        }]),
    )
    .await;
}

#[tokio::test]
async fn test_full_walk_filters_status_and_follows_pages() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    // Second campaign page, matched only when the cursor is sent
    Mock::given(method("GET"))
        .and(path("/act_123/campaigns"))
        .and(query_param("after", "cur1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "id": "c3", "name": "Backlist", "status": "ACTIVE" }],
            "paging": { "cursors": { "after": "cur2" } }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/act_123/campaigns"))
        .and(query_param("access_token", TOKEN))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "id": "c1", "name": "Launch", "status": "ACTIVE" },
                { "id": "c2", "name": "Old", "status": "PAUSED" }
            ],
            "paging": {
                "cursors": { "after": "cur1" },
                "next": "https://graph.example/next"
            }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_listing(
        &mock_server,
        "/c1/adsets",
        json!([
            { "id": "s1", "name": "Readers", "status": "ACTIVE" },
            { "id": "s2", "name": "Paused set", "status": "PAUSED" }
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/s1/ads"))
        .and(query_param("fields", AD_FIELDS))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([
            {
                "id": "a1", "name": "Single image", "status": "ACTIVE",
                "creative": { "id": "cr1", "object_story_spec": { "link_data": {
                    "link": "https://www.Amazon.com/dp/B09BW7F5PZ?tag=fb-20#top"
                }}}
            },
            { "id": "a2", "name": "Paused ad", "status": "PAUSED", "creative": { "id": "cr2" } },
            { "id": "a3", "name": "No creative", "status": "ACTIVE" },
            { "id": "a4", "name": "Carousel", "status": "ACTIVE", "creative": { "id": "cr4" } }
        ]))))
        .mount(&mock_server)
        .await;

    // Paused entities are never expanded
    Mock::given(method("GET"))
        .and(path("/s2/ads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c2/adsets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    // Bare creative reference is fetched by id
    Mock::given(method("GET"))
        .and(path("/cr4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cr4",
            "object_story_spec": { "link_data": { "child_attachments": [
                { "link": "https://x.bookfunnel.com/abc?utm=1" },
                { "link": "https://x.bookfunnel.com/def" }
            ]}}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_simple_campaign(&mock_server, "c3").await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.resume_point, ResumePoint::Start);
    assert_eq!(summary.live_campaigns, 2);
    assert_eq!(summary.campaigns_processed, 2);
    assert_eq!(summary.ads_processed, 4);
    assert_eq!(summary.ads_resolved, 3);

    let results = coordinator.results();
    let ids: Vec<&str> = results.iter().map(|c| c.campaign_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c3"]);

    let c1 = &results[0];
    assert_eq!(c1.adsets.len(), 1);
    let ads = &c1.adsets[0].ads;
    let ad_ids: Vec<&str> = ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ad_ids, vec!["a1", "a3", "a4"]);

    assert_eq!(ads[0].url_source, UrlSource::StoryLink);
    assert_eq!(
        ads[0].target_url.as_deref(),
        Some("https://www.amazon.com/dp/B09BW7F5PZ")
    );
    assert_eq!(ads[1].url_source, UrlSource::NoCreative);
    assert_eq!(ads[1].target_url, None);
    assert_eq!(ads[2].url_source, UrlSource::ChildAttachment);
    assert_eq!(
        ads[2].target_url.as_deref(),
        Some("https://x.bookfunnel.com/abc")
    );

    assert_eq!(results[1].adsets[0].ads[0].url_source, UrlSource::ObjectUrl);

    // Persisted state matches memory
    let saved: Vec<CampaignRecord> =
        read_json_or_default(Path::new(&config.output.results_path)).unwrap();
    assert_eq!(saved.as_slice(), results);
    let cursor: ResumeCursor =
        read_json_or_default(Path::new(&config.output.cursor_path)).unwrap();
    assert_eq!(cursor.last_completed_campaign_id.as_deref(), Some("c3"));
}

#[tokio::test]
async fn test_resume_skips_through_cursor_without_duplicates() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut store = store_for(&config);
    store
        .save(&[committed("c1")], &ResumeCursor::at("c1"))
        .unwrap();

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([
            { "id": "c1", "name": "Launch", "status": "ACTIVE" },
            { "id": "c2", "name": "Series", "status": "ACTIVE" }
        ]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/c1/adsets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_simple_campaign(&mock_server, "c2").await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.resume_point, ResumePoint::After(0));
    assert_eq!(summary.campaigns_skipped, 1);
    assert_eq!(summary.campaigns_processed, 1);
    assert_eq!(coordinator.cursor().last_completed_campaign_id.as_deref(), Some("c2"));

    // A second run has nothing left to do
    let mut again = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = again.run().await.unwrap();
    assert_eq!(summary.campaigns_processed, 0);
    assert_eq!(summary.campaigns_skipped, 2);

    let saved: Vec<CampaignRecord> =
        read_json_or_default(Path::new(&config.output.results_path)).unwrap();
    let ids: Vec<&str> = saved.iter().map(|c| c.campaign_id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
}

#[tokio::test]
async fn test_missing_cursor_skips_committed_campaigns() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut store = store_for(&config);
    store
        .save(&[committed("c1")], &ResumeCursor::at("c9"))
        .unwrap();

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([
            { "id": "c1", "name": "Launch", "status": "ACTIVE" },
            { "id": "c2", "name": "Series", "status": "ACTIVE" }
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/c1/adsets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;
    mount_simple_campaign(&mock_server, "c2").await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.resume_point, ResumePoint::CursorMissing);
    assert_eq!(summary.campaigns_processed, 1);
    assert_eq!(coordinator.results().len(), 2);
}

#[tokio::test]
async fn test_fresh_discards_previous_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    let mut store = store_for(&config);
    store
        .save(&[committed("c1"), committed("gone")], &ResumeCursor::at("c1"))
        .unwrap();

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([{ "id": "c1", "name": "Launch", "status": "ACTIVE" }]),
    )
    .await;
    mount_simple_campaign(&mock_server, "c1").await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), true).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.resume_point, ResumePoint::Start);
    assert_eq!(summary.campaigns_processed, 1);
    let results = coordinator.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].ad_count(), 1);
}

#[tokio::test]
async fn test_rate_limit_exhaustion() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/act_123/campaigns"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": format!("(#17) {}", RATE_LIMIT_MARKER), "code": 17 }
        })))
        .expect(10)
        .mount(&mock_server)
        .await;

    let retry = RetryConfig {
        base_delay_ms: 1,
        max_delay_ms: 2,
        max_attempts: 10,
        rate_limit_marker: RATE_LIMIT_MARKER.to_string(),
    };
    let client = GraphClient::new(&config.api, &retry).unwrap();

    let err = client.get("act_123/campaigns", &[]).await.unwrap_err();
    assert!(matches!(
        err,
        HarvestError::RetryExhausted { attempts: 10, .. }
    ));
}

#[tokio::test]
async fn test_retry_exhaustion_aborts_walk_and_keeps_checkpoint() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([
            { "id": "c1", "name": "Launch", "status": "ACTIVE" },
            { "id": "c2", "name": "Series", "status": "ACTIVE" },
            { "id": "c3", "name": "Backlist", "status": "ACTIVE" }
        ]),
    )
    .await;
    mount_simple_campaign(&mock_server, "c1").await;

    Mock::given(method("GET"))
        .and(path("/c2/adsets"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": format!("(#17) {}", RATE_LIMIT_MARKER), "code": 17 }
        })))
        .expect(3)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c3/adsets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(json!([]))))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let err = coordinator.run().await.unwrap_err();

    assert!(matches!(
        &err,
        HarvestError::RetryExhausted { path, attempts: 3 } if path == "c2/adsets"
    ));
    assert!(err.to_string().starts_with("Retries exhausted for c2/adsets"));

    // Last good checkpoint survives
    let cursor: ResumeCursor =
        read_json_or_default(Path::new(&config.output.cursor_path)).unwrap();
    assert_eq!(cursor.last_completed_campaign_id.as_deref(), Some("c1"));
    let saved: Vec<CampaignRecord> =
        read_json_or_default(Path::new(&config.output.results_path)).unwrap();
    let ids: Vec<&str> = saved.iter().map(|c| c.campaign_id.as_str()).collect();
    assert_eq!(ids, vec!["c1"]);
}

#[tokio::test]
async fn test_malformed_ad_does_not_drop_its_siblings() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([{ "id": "c1", "name": "Launch", "status": "ACTIVE" }]),
    )
    .await;
    mount_listing(
        &mock_server,
        "/c1/adsets",
        json!([{ "id": "s1", "name": "Readers", "status": "ACTIVE" }]),
    )
    .await;
    mount_listing(
        &mock_server,
        "/s1/ads",
        json!([
            { "id": "a1", "name": "Good", "status": "ACTIVE",
              "creative": { "object_url": "https://example.org/good?x=1" } },
            { "id": "a2", "name": "Odd", "status": "ACTIVE",
              "creative": { "object_story_spec": { "link_data": {
                  "child_attachments": null, "link": 42 } } } },
            { "name": "No id", "status": "ACTIVE" },
            { "id": "a4", "name": "After", "status": "ACTIVE",
              "creative": { "object_url": "https://example.org/after" } }
        ]),
    )
    .await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.ads_processed, 3);
    assert_eq!(summary.ads_resolved, 2);

    let ads = &coordinator.results()[0].adsets[0].ads;
    let ad_ids: Vec<&str> = ads.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ad_ids, vec!["a1", "a2", "a4"]);
    assert_eq!(ads[0].target_url.as_deref(), Some("https://example.org/good"));
    assert_eq!(ads[1].url_source, UrlSource::None);
    assert_eq!(ads[1].target_url, None);
    assert_eq!(ads[2].url_source, UrlSource::ObjectUrl);
}

#[tokio::test]
async fn test_rate_limit_then_success() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    Mock::given(method("GET"))
        .and(path("/act_123/campaigns"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(format!("{{\"error\":{{\"message\":\"{}\"}}}}", RATE_LIMIT_MARKER)),
        )
        .up_to_n_times(2)
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/act_123/campaigns"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = GraphClient::new(&config.api, &config.retry).unwrap();
    let body = client.get("act_123/campaigns", &[]).await.unwrap();
    assert_eq!(body, json!({ "data": [] }));
}

#[tokio::test]
async fn test_other_failures_are_empty_and_not_retried() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([{ "id": "c1", "name": "Launch", "status": "ACTIVE" }]),
    )
    .await;
    mount_listing(
        &mock_server,
        "/c1/adsets",
        json!([
            { "id": "s1", "name": "Broken", "status": "ACTIVE" },
            { "id": "s2", "name": "Fine", "status": "ACTIVE" }
        ]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/s1/ads"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_listing(
        &mock_server,
        "/s2/ads",
        json!([{ "id": "a2", "name": "Ad", "status": "ACTIVE",
                 "creative": { "object_url": "https://example.org/x" } }]),
    )
    .await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.campaigns_processed, 1);
    let adsets = &coordinator.results()[0].adsets;
    assert_eq!(adsets.len(), 2);
    assert!(adsets[0].ads.is_empty());
    assert_eq!(adsets[1].ads.len(), 1);
}

#[tokio::test]
async fn test_adset_throttle() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&mock_server.uri(), dir.path());
    config.crawler.adset_delay_ms = 150;

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([{ "id": "c1", "name": "Launch", "status": "ACTIVE" }]),
    )
    .await;
    mount_listing(
        &mock_server,
        "/c1/adsets",
        json!([
            { "id": "s1", "name": "One", "status": "ACTIVE" },
            { "id": "s2", "name": "Two", "status": "ACTIVE" },
            { "id": "s3", "name": "Three", "status": "ACTIVE" }
        ]),
    )
    .await;
    for adset in ["s1", "s2", "s3"] {
        mount_listing(&mock_server, &format!("/{}/ads", adset), json!([])).await;
    }

    let started = Instant::now();
    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    let summary = coordinator.run().await.unwrap();

    assert_eq!(summary.adsets_processed, 3);
    assert!(started.elapsed() >= Duration::from_millis(300));
}

#[test]
fn test_missing_token_is_a_config_error() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://127.0.0.1:9", dir.path());
    config.api.access_token = None;

    let err = GraphClient::new(&config.api, &config.retry).unwrap_err();
    assert!(matches!(
        err,
        HarvestError::Config(ConfigError::MissingToken(_))
    ));
}

#[tokio::test]
async fn test_insights_pass_keeps_ads_with_metrics() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&mock_server.uri(), dir.path());

    mount_listing(
        &mock_server,
        "/act_123/campaigns",
        json!([
            { "id": "c1", "name": "Launch", "status": "ACTIVE" },
            { "id": "c2", "name": "Series", "status": "ACTIVE" }
        ]),
    )
    .await;
    mount_simple_campaign(&mock_server, "c1").await;
    mount_simple_campaign(&mock_server, "c2").await;

    let mut coordinator = Coordinator::new(config.clone(), store_for(&config), false).unwrap();
    coordinator.run().await.unwrap();

    Mock::given(method("GET"))
        .and(path("/ac1/insights"))
        .and(query_param("date_preset", DATE_PRESET))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "impressions": "1200", "clicks": "31", "spend": "4.20" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ac2/insights"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let count = run_insights(&config).await.unwrap();
    assert_eq!(count, 1);

    let rows: Vec<Value> =
        read_json_or_default(Path::new(&config.output.insights_path)).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["ad_id"], "ac1");
    assert_eq!(rows[0]["metrics"]["impressions"], "1200");
}
