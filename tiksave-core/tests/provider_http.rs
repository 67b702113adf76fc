mod common;

use std::sync::Arc;
use std::time::Duration;

use tiksave_core::{
    download_links, format_engagement, DownloadError, FetchClient, FetchError, HttpTransport,
    MediaDownloader, MediaSelection, ProviderSection,
};
use url::Url;

use common::spawn_provider;

fn client_for(api_url: &str, timeout: Duration) -> FetchClient {
    FetchClient::new(
        Arc::new(HttpTransport::new(reqwest::Client::new())),
        Url::parse(api_url).unwrap(),
        timeout,
    )
}

#[tokio::test]
async fn fetches_record_over_http() {
    let provider = spawn_provider().await;
    let client = client_for(&provider.api_url(), Duration::from_secs(15));

    let record = client
        .fetch("  https://www.tiktok.com/@skyline/video/7301234567890123456?lang=en&x=a+b  ")
        .await
        .unwrap();

    assert_eq!(record, provider.record);
    assert_eq!(format_engagement(&record), "10.7%");
    assert_eq!(
        provider.seen(),
        vec!["https://www.tiktok.com/@skyline/video/7301234567890123456?lang=en&x=a+b"]
    );
}

#[tokio::test]
async fn config_built_client_uses_configured_endpoint() {
    let provider = spawn_provider().await;
    let section = ProviderSection {
        base_url: provider.api_url(),
        timeout_seconds: 15,
        user_agent: Some("tiksave-test".into()),
    };
    let client = FetchClient::from_config(&section).unwrap();
    assert_eq!(client.timeout(), Duration::from_secs(15));
    let record = client.fetch("https://example.com/video/123").await.unwrap();
    assert_eq!(record.id, "7301234567890123456");
}

#[tokio::test]
async fn classifies_provider_failures() {
    let provider = spawn_provider().await;
    let client = client_for(&provider.api_url(), Duration::from_secs(15));

    let err = client.fetch("https://x/private").await.unwrap_err();
    assert!(matches!(err, FetchError::InvalidOrPrivate));

    let err = client.fetch("https://x/ratelimit").await.unwrap_err();
    assert_eq!(err.to_string(), "rate limited");

    let err = client.fetch("https://x/broken").await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed { .. }));

    let err = client.fetch("https://x/down").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { status: 502 }));
    assert_eq!(err.to_string(), "Server error: 502");
}

#[tokio::test]
async fn slow_provider_times_out() {
    let provider = spawn_provider().await;
    let client = client_for(&provider.api_url(), Duration::from_millis(200));
    let err = client.fetch("https://x/slow").await.unwrap_err();
    assert!(matches!(err, FetchError::Timeout { .. }));
    assert_eq!(
        err.to_string(),
        "Request timed out. Please check your connection."
    );
}

#[tokio::test]
async fn unreachable_provider_is_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = client_for(&format!("http://{addr}/api/"), Duration::from_secs(5));
    let err = client.fetch("https://x").await.unwrap_err();
    assert!(matches!(err, FetchError::Network { .. }));
}

#[tokio::test]
async fn downloads_selected_media() {
    let provider = spawn_provider().await;
    let dir = tempfile::TempDir::new().unwrap();
    let downloader = MediaDownloader::default();

    let saved = downloader
        .save_selection(&provider.record, MediaSelection::All, dir.path())
        .await
        .unwrap();
    assert_eq!(saved.len(), download_links(&provider.record).len());

    let hd = &saved[0];
    assert_eq!(
        hd.path.file_name().unwrap().to_str().unwrap(),
        "7301234567890123456_hd.mp4"
    );
    assert_eq!(std::fs::read_to_string(&hd.path).unwrap(), "media:hdplay.mp4");
    assert_eq!(hd.bytes, "media:hdplay.mp4".len() as u64);
}

#[tokio::test]
async fn missing_media_reports_transport_error() {
    let provider = spawn_provider().await;
    let mut record = provider.record.clone();
    record.audio_url = format!("http://{}/media/missing.mp3", provider.addr);
    let dir = tempfile::TempDir::new().unwrap();
    let err = MediaDownloader::default()
        .save_selection(&record, MediaSelection::Audio, dir.path())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Transport(_)));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn stalled_media_times_out_and_leaves_no_partial_file() {
    let provider = spawn_provider().await;
    let mut record = provider.record.clone();
    record.audio_url = format!("http://{}/media/stall.mp3", provider.addr);
    let dir = tempfile::TempDir::new().unwrap();
    let downloader = MediaDownloader::new(reqwest::Client::new(), Duration::from_millis(300));

    let err = downloader
        .save_selection(&record, MediaSelection::Audio, dir.path())
        .await
        .unwrap_err();

    assert!(matches!(err, DownloadError::Timeout { .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn completed_download_replaces_part_file() {
    let provider = spawn_provider().await;
    let dir = tempfile::TempDir::new().unwrap();
    let saved = MediaDownloader::default()
        .save_selection(&provider.record, MediaSelection::Cover, dir.path())
        .await
        .unwrap();

    let names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["7301234567890123456_cover.jpg".to_string()]);
    assert_eq!(saved[0].path, dir.path().join("7301234567890123456_cover.jpg"));
}
