use serde::Serialize;

use crate::fetch::{FetchError, VideoRecord};

pub const EMPTY_LINK_TOAST: &str = "Please enter a link first";
pub const CAPTION_COPIED_TOAST: &str = "Caption copied!";

/// Everything the results view renders from. Owned by the front end; the
/// fetch client never reads it.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardState {
    pub link: String,
    pub loading: bool,
    pub error: Option<String>,
    pub record: Option<VideoRecord>,
    pub toast: Option<String>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_link(&mut self, link: impl Into<String>) {
        self.link = link.into();
    }

    /// Enters the loading state. Returns `false`, with a toast, when there is no link.
    pub fn begin_fetch(&mut self) -> bool {
        if self.link.is_empty() {
            self.show_toast(EMPTY_LINK_TOAST);
            return false;
        }
        self.loading = true;
        self.error = None;
        self.record = None;
        true
    }

    pub fn complete(&mut self, outcome: Result<VideoRecord, FetchError>) {
        self.loading = false;
        match outcome {
            Ok(record) => {
                self.record = Some(record);
                self.error = None;
            }
            Err(err) => {
                self.record = None;
                self.error = Some(err.to_string());
            }
        }
    }

    pub fn reset(&mut self) {
        self.record = None;
        self.link.clear();
        self.error = None;
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(message.into());
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Caption of the current record, if any, acknowledged with a toast.
    pub fn copy_caption(&mut self) -> Option<String> {
        let caption = self
            .record
            .as_ref()
            .map(|record| record.caption.clone())
            .filter(|caption| !caption.is_empty())?;
        self.show_toast(CAPTION_COPIED_TOAST);
        Some(caption)
    }
}
