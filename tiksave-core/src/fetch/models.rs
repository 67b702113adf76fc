use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::{FetchError, FetchResult};

/// Provider status code for a successful lookup.
pub const STATUS_OK: i64 = 0;
/// Provider status code for links that are invalid, private or deleted.
pub const STATUS_INVALID: i64 = -1;

/// Media and metadata for one post, named after the provider's wire fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub region: String,
    #[serde(rename = "title", default, deserialize_with = "null_as_default")]
    pub caption: String,
    #[serde(rename = "cover", default, deserialize_with = "null_as_default")]
    pub cover_url: String,
    #[serde(rename = "origin_cover", default, deserialize_with = "null_as_default")]
    pub origin_cover_url: String,
    #[serde(rename = "duration", default, deserialize_with = "null_as_default")]
    pub duration_seconds: u64,
    #[serde(rename = "play", default, deserialize_with = "null_as_default")]
    pub play_url: String,
    #[serde(rename = "wmplay", default, deserialize_with = "null_as_default")]
    pub watermarked_play_url: String,
    #[serde(rename = "hdplay", default, deserialize_with = "null_as_default")]
    pub hd_play_url: String,
    #[serde(rename = "music", default, deserialize_with = "null_as_default")]
    pub audio_url: String,
    #[serde(rename = "images", default, skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
    #[serde(rename = "music_info", default, deserialize_with = "null_as_default")]
    pub audio_info: AudioInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: AuthorProfile,
    #[serde(flatten)]
    pub stats: EngagementStats,
    #[serde(rename = "create_time", default, skip_serializing_if = "Option::is_none")]
    pub created_at_epoch_seconds: Option<i64>,
    /// Stamped from the envelope's `processed_time`.
    #[serde(skip)]
    pub processed_at_epoch_seconds: Option<i64>,
}

impl VideoRecord {
    /// Slideshow posts carry a non-empty image list; their play URLs are placeholders.
    pub fn is_slideshow(&self) -> bool {
        self.image_urls
            .as_ref()
            .map(|images| !images.is_empty())
            .unwrap_or(false)
    }

    pub fn images(&self) -> &[String] {
        self.image_urls.as_deref().unwrap_or(&[])
    }

    /// Creation time, falling back to the provider's processing time.
    pub fn display_timestamp(&self) -> Option<i64> {
        self.created_at_epoch_seconds
            .filter(|ts| *ts > 0)
            .or(self.processed_at_epoch_seconds.filter(|ts| *ts > 0))
    }

    /// Best video URL without watermark.
    pub fn best_play_url(&self) -> Option<&str> {
        [self.hd_play_url.as_str(), self.play_url.as_str()]
            .into_iter()
            .find(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioInfo {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(rename = "play", default, deserialize_with = "null_as_default")]
    pub play_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub author: String,
    #[serde(rename = "original", default, deserialize_with = "null_as_default")]
    pub is_original_sound: bool,
    #[serde(rename = "duration", default, deserialize_with = "null_as_default")]
    pub duration_seconds: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub album: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AuthorProfile {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "unique_id", default, deserialize_with = "null_as_default")]
    pub handle: String,
    #[serde(rename = "nickname", default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(rename = "avatar", default, deserialize_with = "null_as_default")]
    pub avatar_url: String,
    #[serde(rename = "signature", default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngagementStats {
    #[serde(rename = "digg_count", default, deserialize_with = "null_as_default")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub share_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub download_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub collect_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub play_count: u64,
}

/// Raw response envelope as it travels on the wire.
///
/// `data` stays untyped until the status code says it should hold a record,
/// so failure envelopes with junk payloads still classify correctly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderEnvelope {
    pub code: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Decoded envelope: a record exists exactly when the provider reported success.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderReply {
    Success(VideoRecord),
    Invalid { message: String },
    Failed { code: i64, message: String },
}

impl ProviderEnvelope {
    pub fn success(record: &VideoRecord) -> serde_json::Result<Self> {
        Ok(Self {
            code: STATUS_OK,
            msg: "success".to_string(),
            processed_time: record.processed_at_epoch_seconds.map(|ts| ts as f64),
            data: Some(serde_json::to_value(record)?),
        })
    }

    pub fn failure(code: i64, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            processed_time: None,
            data: None,
        }
    }

    pub fn into_reply(self) -> FetchResult<ProviderReply> {
        match self.code {
            STATUS_OK => {
                let data = self
                    .data
                    .filter(|value| !value.is_null())
                    .ok_or_else(|| FetchError::malformed("success envelope without data"))?;
                let mut record: VideoRecord = serde_json::from_value(data)
                    .map_err(|err| FetchError::malformed(format!("invalid data: {err}")))?;
                record.processed_at_epoch_seconds =
                    self.processed_time.map(|ts| ts.trunc() as i64);
                Ok(ProviderReply::Success(record))
            }
            STATUS_INVALID => Ok(ProviderReply::Invalid { message: self.msg }),
            code => Ok(ProviderReply::Failed {
                code,
                message: self.msg,
            }),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
pub(crate) fn sample_record() -> VideoRecord {
    VideoRecord {
        id: "7301234567890123456".into(),
        region: "US".into(),
        caption: "sunset timelapse #nature".into(),
        cover_url: "https://cdn.example.com/cover.jpg".into(),
        origin_cover_url: "https://cdn.example.com/origin_cover.jpg".into(),
        duration_seconds: 17,
        play_url: "https://cdn.example.com/play.mp4".into(),
        watermarked_play_url: "https://cdn.example.com/wmplay.mp4".into(),
        hd_play_url: "https://cdn.example.com/hdplay.mp4".into(),
        audio_url: "https://cdn.example.com/music.mp3".into(),
        image_urls: None,
        audio_info: AudioInfo {
            id: "7300000000000000001".into(),
            title: "original sound - skyline".into(),
            play_url: "https://cdn.example.com/music.mp3".into(),
            author: "skyline".into(),
            is_original_sound: true,
            duration_seconds: 17,
            album: String::new(),
        },
        author: AuthorProfile {
            id: "6800000000000000000".into(),
            handle: "skyline".into(),
            display_name: "Sky Line".into(),
            avatar_url: "https://cdn.example.com/avatar.jpg".into(),
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

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_provider_wire_names() {
        let envelope: ProviderEnvelope = serde_json::from_value(json!({
            "code": 0,
            "msg": "success",
            "processed_time": 0.1156,
            "data": {
                "id": "1",
                "title": "hello",
                "play": "https://p",
                "hdplay": null,
                "music_info": {"title": "song", "original": false},
                "author": {"unique_id": "h", "nickname": "N"},
                "digg_count": 100,
                "comment_count": 5,
                "share_count": 2,
                "play_count": 1000
            }
        }))
        .unwrap();
        let ProviderReply::Success(record) = envelope.into_reply().unwrap() else {
            panic!("expected success");
        };
        assert_eq!(record.caption, "hello");
        assert_eq!(record.hd_play_url, "");
        assert_eq!(record.best_play_url(), Some("https://p"));
        assert_eq!(record.author.handle, "h");
        assert_eq!(record.stats.like_count, 100);
        assert_eq!(record.stats.download_count, 0);
        assert_eq!(record.processed_at_epoch_seconds, Some(0));
        assert!(!record.is_slideshow());
    }

    #[test]
    fn success_without_data_is_malformed() {
        let envelope = ProviderEnvelope {
            code: STATUS_OK,
            msg: "success".into(),
            processed_time: None,
            data: Some(Value::Null),
        };
        assert!(matches!(
            envelope.into_reply(),
            Err(FetchError::Malformed { .. })
        ));
    }

    #[test]
    fn failure_envelopes_ignore_payload_shape() {
        let envelope: ProviderEnvelope = serde_json::from_value(json!({
            "code": -1,
            "msg": "Url parsing is failed! Please check url.",
            "data": "garbage"
        }))
        .unwrap();
        assert_eq!(
            envelope.into_reply().unwrap(),
            ProviderReply::Invalid {
                message: "Url parsing is failed! Please check url.".into()
            }
        );

        let reply = ProviderEnvelope::failure(7, "rate limited")
            .into_reply()
            .unwrap();
        assert_eq!(
            reply,
            ProviderReply::Failed {
                code: 7,
                message: "rate limited".into()
            }
        );
    }

    #[test]
    fn slideshow_detection_requires_images() {
        let mut record = sample_record();
        record.image_urls = Some(vec![]);
        assert!(!record.is_slideshow());
        record.image_urls = Some(vec!["https://cdn.example.com/1.jpg".into()]);
        assert!(record.is_slideshow());
        assert_eq!(record.images().len(), 1);
    }

    #[test]
    fn display_timestamp_prefers_creation_time() {
        let mut record = sample_record();
        assert_eq!(record.display_timestamp(), Some(1_700_000_000));
        record.created_at_epoch_seconds = None;
        assert_eq!(record.display_timestamp(), Some(1_700_000_100));
        record.processed_at_epoch_seconds = None;
        assert_eq!(record.display_timestamp(), None);
    }
}
