//! End-to-end pipeline tests: mock API, real cache file, real PDF output.

mod support;
use support::mock_api;

use lopdf::Document;
use serde_json::json;
use tempfile::TempDir;
use x2pdf_core::fetch::HttpTimeouts;
use x2pdf_core::{
    ApiCredentials, CacheMode, CategoryLabel, ExportOptions, PipelineOptions, PostOrigin,
    TimelineClient, load_posts, run_pipeline,
};

#[tokio::test]
async fn test_pipeline_fetches_categorizes_and_exports() {
    let Some(server) = mock_api::start().await else {
        return;
    };
    mock_api::mount_timeline(
        &server,
        "someone",
        "11",
        json!([
            { "created_at": "2024-07-01T10:00:00.000Z", "text": "I love AI and robotics, also my sleep routine is great" },
            { "created_at": "2024-07-02T10:00:00.000Z", "text": "Tesla stock up again" },
            { "created_at": "2024-07-03T10:00:00.000Z", "text": "discipline beats motivation" },
            { "created_at": "2024-07-04T10:00:00.000Z", "text": "https://example.com/a_very_long_path_segment_without_spaces" },
            { "created_at": "2024-07-05T10:00:00.000Z", "text": "lunch" }
        ]),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let client = TimelineClient::with_base_url(
        ApiCredentials::new("token").unwrap(),
        &server.uri(),
        HttpTimeouts::default(),
    )
    .unwrap();
    let options = PipelineOptions {
        username: "someone".to_string(),
        max_results: 5,
        cache_path: dir.path().join("tweets.json"),
        cache_mode: CacheMode::Refresh,
        export: ExportOptions {
            output_path: dir.path().join("exports").join("X2PDF.pdf"),
            ..ExportOptions::default()
        },
    };

    let report = run_pipeline(&client, &options).await.unwrap();

    assert_eq!(report.origin, PostOrigin::Fetched);
    assert_eq!(report.post_count(), 5);
    // "Tesla stock up again" contains "ai" inside "again", so Tech wins.
    assert_eq!(
        report.counts,
        vec![
            (CategoryLabel::LifeAdvice, 1),
            (CategoryLabel::Other, 2),
            (CategoryLabel::Tech, 2),
        ]
    );
    assert_eq!(report.summary.page_count, 4);

    let cached = load_posts(&options.cache_path).unwrap();
    assert_eq!(cached.len(), 5);

    let bytes = std::fs::read(&options.export.output_path).unwrap();
    let doc = Document::load_mem(&bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 4);
}
