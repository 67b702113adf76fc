// Fake provider + media host for end-to-end tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::StreamExt;
use tokio::net::TcpListener;

use tiksave_core::fetch::{AudioInfo, AuthorProfile, EngagementStats};
use tiksave_core::{ProviderEnvelope, VideoRecord};

pub struct FakeProvider {
    pub addr: SocketAddr,
    pub seen_links: Arc<Mutex<Vec<String>>>,
    pub record: VideoRecord,
}

impl FakeProvider {
    pub fn api_url(&self) -> String {
        format!("http://{}/api/", self.addr)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen_links.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct ProviderState {
    seen_links: Arc<Mutex<Vec<String>>>,
    record: VideoRecord,
}

pub fn media_record(base: &str) -> VideoRecord {
    VideoRecord {
        id: "7301234567890123456".into(),
        region: "US".into(),
        caption: "sunset timelapse #nature".into(),
        cover_url: format!("{base}/media/cover.jpg"),
        origin_cover_url: format!("{base}/media/origin_cover.jpg"),
        duration_seconds: 17,
        play_url: format!("{base}/media/play.mp4"),
        watermarked_play_url: format!("{base}/media/wmplay.mp4"),
        hd_play_url: format!("{base}/media/hdplay.mp4"),
        audio_url: format!("{base}/media/music.mp3"),
        image_urls: None,
        audio_info: AudioInfo {
            id: "7300000000000000001".into(),
            title: "original sound - skyline".into(),
            play_url: format!("{base}/media/music.mp3"),
            author: "skyline".into(),
            is_original_sound: true,
            duration_seconds: 17,
            album: String::new(),
        },
        author: AuthorProfile {
            id: "6800000000000000000".into(),
            handle: "skyline".into(),
            display_name: "Sky Line".into(),
            avatar_url: format!("{base}/media/avatar.jpg"),
            bio: Some("chasing light".into()),
        },
        stats: EngagementStats {
            like_count: 100,
            comment_count: 5,
            share_count: 2,
            download_count: 1,
            collect_count: 9,
            play_count: 1000,
        },
        created_at_epoch_seconds: Some(1_700_000_000),
        processed_at_epoch_seconds: Some(1_700_000_100),
    }
}

async fn api_handler(
    State(state): State<ProviderState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let link = params.get("url").cloned().unwrap_or_default();
    state.seen_links.lock().unwrap().push(link.clone());

    if link.contains("private") {
        let body = ProviderEnvelope::failure(-1, "Url parsing is failed! Please check url.");
        return axum::Json(body).into_response();
    }
    if link.contains("ratelimit") {
        return axum::Json(ProviderEnvelope::failure(7, "rate limited")).into_response();
    }
    if link.contains("broken") {
        return (StatusCode::OK, "<html>captcha</html>").into_response();
    }
    if link.contains("down") {
        return (StatusCode::BAD_GATEWAY, "upstream down").into_response();
    }
    if link.contains("slow") {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    match ProviderEnvelope::success(&state.record) {
        Ok(envelope) => axum::Json(envelope).into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    }
}

async fn media_handler(Path(name): Path<String>) -> Response {
    if name.starts_with("missing") {
        return (StatusCode::NOT_FOUND, "gone").into_response();
    }
    if name.starts_with("stall") {
        // First chunk arrives, then the body stops.
        let chunks = futures::stream::iter(0..2).then(|step| async move {
            if step > 0 {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            Ok::<_, std::io::Error>(bytes::Bytes::from_static(b"partial"))
        });
        return Response::new(Body::from_stream(chunks));
    }
    (StatusCode::OK, format!("media:{name}")).into_response()
}

pub async fn spawn_provider() -> FakeProvider {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let record = media_record(&format!("http://{addr}"));
    let seen_links = Arc::new(Mutex::new(Vec::new()));
    let state = ProviderState {
        seen_links: seen_links.clone(),
        record: record.clone(),
    };
    let app = Router::new()
        .route("/api/", get(api_handler))
        .route("/media/:name", get(media_handler))
        .with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FakeProvider {
        addr,
        seen_links,
        record,
    }
}
