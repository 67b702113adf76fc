use std::path::PathBuf;

use clap::{Args, ValueEnum};
use tiksave_core::MediaSelection;

#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Link to the post (share link or full URL)
    pub link: String,
    /// Also request AI caption and hashtag suggestions
    #[arg(long)]
    pub insights: bool,
}

#[derive(Args, Debug, Clone)]
pub struct LinksArgs {
    /// Link to the post
    pub link: String,
}

#[derive(Args, Debug, Clone)]
pub struct DownloadArgs {
    /// Link to the post
    pub link: String,
    /// Which media to save
    #[arg(long, value_enum, default_value_t = MediaKindArg::Hd)]
    pub kind: MediaKindArg,
    /// Target directory (overrides download.output_dir)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediaKindArg {
    Hd,
    Watermarked,
    Audio,
    Cover,
    Images,
    All,
}

impl From<MediaKindArg> for MediaSelection {
    fn from(kind: MediaKindArg) -> Self {
        match kind {
            MediaKindArg::Hd => MediaSelection::Hd,
            MediaKindArg::Watermarked => MediaSelection::Watermarked,
            MediaKindArg::Audio => MediaSelection::Audio,
            MediaKindArg::Cover => MediaSelection::Cover,
            MediaKindArg::Images => MediaSelection::Images,
            MediaKindArg::All => MediaSelection::All,
        }
    }
}
