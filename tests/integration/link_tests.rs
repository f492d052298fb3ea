//! Integration tests for the classifier and the linking pass

use crate::create_test_config;
use ad_harvest::config::{CatalogEntry, FreebieConfig};
use ad_harvest::linker::{
    run_linking, BookCatalog, BookLookup, Classifier, Linker, ManualDecision, RecordedAnswers,
    UrlRules,
};
use ad_harvest::model::{
    AdRecord, AdSetRecord, BookMetadata, CampaignRecord, Category, LinkedEntry, UrlSource,
};
use ad_harvest::storage::{read_json_or_default, write_json_atomic};
use serde_json::json;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ad(id: &str, url: Option<&str>) -> AdRecord {
    AdRecord {
        id: id.to_string(),
        name: format!("Ad {}", id),
        status: "ACTIVE".to_string(),
        creative: None,
        target_url: url.map(str::to_string),
        url_source: if url.is_some() {
            UrlSource::StoryLink
        } else {
            UrlSource::NoCreative
        },
    }
}

fn harvested(ads: Vec<AdRecord>) -> Vec<CampaignRecord> {
    vec![CampaignRecord {
        campaign_id: "c1".to_string(),
        name: "Launch".to_string(),
        status: "ACTIVE".to_string(),
        adsets: vec![AdSetRecord {
            adset_id: "s1".to_string(),
            name: "Readers".to_string(),
            status: "ACTIVE".to_string(),
            ads,
        }],
    }]
}

fn classifier_with_lookup(lookup_url: &str) -> Classifier {
    Classifier::new(
        UrlRules::default(),
        BookCatalog::default(),
        &FreebieConfig::default(),
        Some(BookLookup::new(lookup_url).unwrap()),
    )
}

#[tokio::test]
async fn test_lookup_fills_unlisted_product() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .and(query_param("q", "isbn:B0ABCDEFGH"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "volumeInfo": {
                "title": "Ember Road",
                "description": "A road trip with dragons.",
                "imageLinks": { "thumbnail": "https://img.example/ember.jpg" }
            }}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let classifier = classifier_with_lookup(&format!("{}/volumes", mock_server.uri()));
    let (category, book) = classifier
        .classify("https://www.amazon.com/dp/B0ABCDEFGH")
        .await;

    assert_eq!(category, Category::Sale);
    assert_eq!(
        book,
        Some(BookMetadata {
            title: "Ember Road".to_string(),
            asin: Some("B0ABCDEFGH".to_string()),
            blurb: Some("A road trip with dragons.".to_string()),
            cover_url: Some("https://img.example/ember.jpg".to_string()),
        })
    );
}

#[tokio::test]
async fn test_lookup_failure_yields_placeholder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let classifier = classifier_with_lookup(&format!("{}/volumes", mock_server.uri()));
    let (category, book) = classifier
        .classify("https://amazon.com/dp/B0ABCDEFGH")
        .await;

    assert_eq!(category, Category::Sale);
    let book = book.unwrap();
    assert_eq!(book.title, "Unknown");
    assert_eq!(book.asin.as_deref(), Some("B0ABCDEFGH"));
}

#[tokio::test]
async fn test_lookup_with_no_match_yields_placeholder() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "totalItems": 0 })))
        .mount(&mock_server)
        .await;

    let classifier = classifier_with_lookup(&format!("{}/volumes", mock_server.uri()));
    let (_, book) = classifier
        .classify("https://amazon.com/dp/B0ABCDEFGH")
        .await;
    assert_eq!(book, Some(BookMetadata::unknown("B0ABCDEFGH")));
}

#[tokio::test]
async fn test_catalog_takes_precedence_over_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/volumes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let catalog = BookCatalog::from_entries(&[CatalogEntry {
        asin: "B09BW7F5PZ".to_string(),
        title: "Dragon's Kin".to_string(),
        blurb: None,
        cover_url: None,
    }]);
    let classifier = Classifier::new(
        UrlRules::default(),
        catalog,
        &FreebieConfig::default(),
        Some(BookLookup::new(&format!("{}/volumes", mock_server.uri())).unwrap()),
    );

    let (category, book) = classifier
        .classify("https://amazon.com/dp/B09BW7F5PZ")
        .await;
    assert_eq!(category, Category::Sale);
    assert_eq!(book.unwrap().title, "Dragon's Kin");
}

#[tokio::test]
async fn test_linking_twice_never_prompts_again() {
    let dir = TempDir::new().unwrap();
    let linked_path = dir.path().join("linked.json");
    let results = harvested(vec![
        ad("a1", Some("https://x.bookfunnel.com/abc")),
        ad("a2", Some("https://example.org/page")),
        ad("a3", None),
    ]);
    let classifier = Classifier::new(
        UrlRules::default(),
        BookCatalog::default(),
        &FreebieConfig::default(),
        None,
    );

    let answers = RecordedAnswers::new([
        ManualDecision::Link(BookMetadata {
            title: "Hand Picked".to_string(),
            ..Default::default()
        }),
        ManualDecision::Link(BookMetadata {
            title: "Also Hand Picked".to_string(),
            ..Default::default()
        }),
    ]);
    let mut linked = Vec::new();
    let mut linker = Linker::new(classifier.clone(), answers, &linked_path);
    let report = linker.link_all(&results, &mut linked).await.unwrap();

    assert_eq!(report.linked, 3);
    assert_eq!(linker.manual().asked(), 2);
    assert_eq!(report.by_category.get(&Category::LeadGen), Some(&1));
    assert_eq!(report.by_category.get(&Category::Manual), Some(&2));

    let mut reloaded: Vec<LinkedEntry> = read_json_or_default(&linked_path).unwrap();
    assert_eq!(reloaded, linked);

    let mut linker = Linker::new(classifier, RecordedAnswers::default(), &linked_path);
    let report = linker.link_all(&results, &mut reloaded).await.unwrap();

    assert_eq!(report.linked, 0);
    assert_eq!(report.already_linked, 3);
    assert_eq!(linker.manual().asked(), 0);
    assert_eq!(reloaded.len(), 3);
}

#[tokio::test]
async fn test_run_linking_non_interactive() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config("http://127.0.0.1:9", dir.path());
    config.catalog = vec![CatalogEntry {
        asin: "B09BW7F5PZ".to_string(),
        title: "Dragon's Kin".to_string(),
        blurb: None,
        cover_url: None,
    }];

    let results = harvested(vec![
        ad("a1", Some("https://amazon.com/dp/B09BW7F5PZ")),
        ad("a2", Some("https://example.org/page")),
    ]);
    write_json_atomic(Path::new(&config.output.results_path), &results).unwrap();

    let report = run_linking(&config, false).await.unwrap();
    assert_eq!(report.linked, 1);
    assert_eq!(report.skipped, 1);

    let linked: Vec<LinkedEntry> =
        read_json_or_default(Path::new(&config.output.linked_path)).unwrap();
    assert_eq!(linked.len(), 1);
    assert_eq!(linked[0].ad_id, "a1");
    assert_eq!(linked[0].category, Category::Sale);
    assert_eq!(linked[0].book_title, "Dragon's Kin");
    assert_eq!(linked[0].campaign_name, "Launch");

    // Skipped ads come up again; linked ones do not
    let report = run_linking(&config, false).await.unwrap();
    assert_eq!(report.linked, 0);
    assert_eq!(report.already_linked, 1);
    assert_eq!(report.skipped, 1);
}
