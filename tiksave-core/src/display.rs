//! Derived values shown on the results dashboard.

use chrono::{TimeZone, Utc};
use serde::Serialize;

use crate::fetch::VideoRecord;

const AUDIO_LABEL_MAX_CHARS: usize = 25;

/// `(likes + comments + shares) / plays * 100`, or `None` without plays.
pub fn engagement_rate(record: &VideoRecord) -> Option<f64> {
    let stats = &record.stats;
    if stats.play_count == 0 {
        return None;
    }
    let interactions =
        stats.like_count as f64 + stats.comment_count as f64 + stats.share_count as f64;
    Some(interactions / stats.play_count as f64 * 100.0)
}

pub fn format_engagement(record: &VideoRecord) -> String {
    match engagement_rate(record) {
        Some(rate) => format!("{rate:.1}%"),
        None => "N/A".to_string(),
    }
}

/// Short count notation: `999`, `1.2K`, `12K`, `3.4M`.
pub fn compact_count(value: u64) -> String {
    const UNITS: [(f64, &str); 4] = [(1e3, "K"), (1e6, "M"), (1e9, "B"), (1e12, "T")];
    if value < 1000 {
        return value.to_string();
    }
    let value = value as f64;
    let mut index = UNITS
        .iter()
        .rposition(|(scale, _)| value >= *scale)
        .unwrap_or(0);
    loop {
        let (scale, suffix) = UNITS[index];
        let scaled = value / scale;
        let rounded = if scaled < 10.0 {
            (scaled * 10.0).round() / 10.0
        } else {
            scaled.round()
        };
        if rounded >= 1000.0 && index + 1 < UNITS.len() {
            index += 1;
            continue;
        }
        return if rounded.fract() == 0.0 {
            format!("{rounded:.0}{suffix}")
        } else {
            format!("{rounded:.1}{suffix}")
        };
    }
}

/// `Nov 14, 2023` style date for the post, or `Just now` when unknown.
pub fn display_date(record: &VideoRecord) -> String {
    record
        .display_timestamp()
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "Just now".to_string())
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    HdVideo,
    WatermarkedVideo,
    Audio,
    Cover,
    Image,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::HdVideo => "hd",
            MediaKind::WatermarkedVideo => "watermarked",
            MediaKind::Audio => "audio",
            MediaKind::Cover => "cover",
            MediaKind::Image => "image",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::HdVideo | MediaKind::WatermarkedVideo => "mp4",
            MediaKind::Audio => "mp3",
            MediaKind::Cover | MediaKind::Image => "jpg",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct MediaLink {
    pub kind: MediaKind,
    /// 1-based position for slideshow images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub label: String,
    pub sub_label: String,
    pub url: String,
}

impl MediaLink {
    fn new(kind: MediaKind, label: &str, sub_label: impl Into<String>, url: &str) -> Self {
        Self {
            kind,
            index: None,
            label: label.to_string(),
            sub_label: sub_label.into(),
            url: url.to_string(),
        }
    }

    /// `<id>_<kind>[_<n>].<ext>`
    pub fn file_name(&self, record_id: &str) -> String {
        match self.index {
            Some(index) => format!(
                "{record_id}_{}_{index}.{}",
                self.kind.as_str(),
                self.kind.extension()
            ),
            None => format!(
                "{record_id}_{}.{}",
                self.kind.as_str(),
                self.kind.extension()
            ),
        }
    }
}

fn audio_sub_label(title: &str) -> String {
    if title.is_empty() {
        return "Original Sound".to_string();
    }
    if title.chars().count() > AUDIO_LABEL_MAX_CHARS {
        let head: String = title.chars().take(AUDIO_LABEL_MAX_CHARS).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

/// Download buttons in dashboard order. Links with empty URLs are omitted.
pub fn download_links(record: &VideoRecord) -> Vec<MediaLink> {
    let mut links = Vec::new();
    if !record.is_slideshow() {
        if let Some(url) = record.best_play_url() {
            links.push(MediaLink::new(
                MediaKind::HdVideo,
                "HD Video",
                "No Watermark",
                url,
            ));
        }
        links.push(MediaLink::new(
            MediaKind::WatermarkedVideo,
            "Original Video",
            "With Watermark",
            &record.watermarked_play_url,
        ));
    }
    links.push(MediaLink::new(
        MediaKind::Audio,
        "Audio MP3",
        audio_sub_label(&record.audio_info.title),
        &record.audio_url,
    ));
    links.push(MediaLink::new(
        MediaKind::Cover,
        "Cover Image",
        "High Quality JPG",
        &record.cover_url,
    ));
    for (position, url) in record.images().iter().enumerate() {
        let mut link = MediaLink::new(
            MediaKind::Image,
            &format!("Image {}", position + 1),
            "Slideshow Photo",
            url,
        );
        link.index = Some(position + 1);
        links.push(link);
    }
    links.retain(|link| !link.url.is_empty());
    links
}
