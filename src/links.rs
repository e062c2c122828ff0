//! URLs derived from a video id: thumbnails and the share menu targets.
//!
//! Nothing here touches the clipboard or a browser. Share actions are handed
//! to a [`ShareTarget`] supplied by the caller.

use anyhow::{Context, Result};
use tracing::debug;

pub const YOUTUBE_WATCH_PREFIX: &str = "https://www.youtube.com/watch?v=";
pub const YOUTUBE_EMBED_PREFIX: &str = "https://www.youtube-nocookie.com/embed/";
pub const DEFAULT_THUMBNAIL_HOST: &str = "https://i.ytimg.com";

/// Where list data (and therefore thumbnails) comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    Invidious,
    #[default]
    Local,
}

impl BackendPreference {
    /// Only `"invidious"` selects the proxy; every other value means local.
    pub fn from_setting(value: &str) -> Self {
        if value.trim() == "invidious" {
            BackendPreference::Invidious
        } else {
            BackendPreference::Local
        }
    }
}

/// Which frame the list thumbnail shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailPreference {
    Start,
    Middle,
    End,
    #[default]
    Default,
}

impl ThumbnailPreference {
    pub fn from_setting(value: &str) -> Self {
        match value.trim() {
            "start" => ThumbnailPreference::Start,
            "middle" => ThumbnailPreference::Middle,
            "end" => ThumbnailPreference::End,
            _ => ThumbnailPreference::Default,
        }
    }

    fn file_stem(self) -> &'static str {
        match self {
            ThumbnailPreference::Start => "mq1",
            ThumbnailPreference::Middle => "mq2",
            ThumbnailPreference::End => "mq3",
            ThumbnailPreference::Default => "mqdefault",
        }
    }
}

pub fn thumbnail_url(
    id: &str,
    backend: BackendPreference,
    preference: ThumbnailPreference,
    invidious_instance: &str,
) -> String {
    let base = match backend {
        BackendPreference::Invidious => invidious_instance.trim_end_matches('/'),
        BackendPreference::Local => DEFAULT_THUMBNAIL_HOST,
    };
    format!("{base}/vi/{id}/{}.jpg", preference.file_stem())
}

/// The three places a video can be watched from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoLinks {
    pub youtube: String,
    pub youtube_embed: String,
    pub invidious: String,
}

impl VideoLinks {
    pub fn new(id: &str, invidious_instance: &str) -> Self {
        Self {
            youtube: format!("{YOUTUBE_WATCH_PREFIX}{id}"),
            youtube_embed: format!("{YOUTUBE_EMBED_PREFIX}{id}"),
            invidious: format!("{}/watch?v={id}", invidious_instance.trim_end_matches('/')),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareAction {
    Open,
    Copy,
}

/// Entries of the list item's share menu, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareOption {
    OpenYoutube,
    CopyYoutube,
    OpenYoutubeEmbed,
    CopyYoutubeEmbed,
    OpenInvidious,
    CopyInvidious,
}

impl ShareOption {
    pub const ALL: [ShareOption; 6] = [
        ShareOption::OpenYoutube,
        ShareOption::CopyYoutube,
        ShareOption::OpenYoutubeEmbed,
        ShareOption::CopyYoutubeEmbed,
        ShareOption::OpenInvidious,
        ShareOption::CopyInvidious,
    ];

    /// Stable key the menu reports back on click.
    pub fn key(self) -> &'static str {
        match self {
            ShareOption::OpenYoutube => "openYoutube",
            ShareOption::CopyYoutube => "copyYoutube",
            ShareOption::OpenYoutubeEmbed => "openYoutubeEmbed",
            ShareOption::CopyYoutubeEmbed => "copyYoutubeEmbed",
            ShareOption::OpenInvidious => "openInvidious",
            ShareOption::CopyInvidious => "copyInvidious",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|option| option.key() == key)
    }

    pub fn action(self) -> ShareAction {
        match self {
            ShareOption::OpenYoutube
            | ShareOption::OpenYoutubeEmbed
            | ShareOption::OpenInvidious => ShareAction::Open,
            ShareOption::CopyYoutube
            | ShareOption::CopyYoutubeEmbed
            | ShareOption::CopyInvidious => ShareAction::Copy,
        }
    }

    pub fn url(self, links: &VideoLinks) -> &str {
        match self {
            ShareOption::OpenYoutube | ShareOption::CopyYoutube => &links.youtube,
            ShareOption::OpenYoutubeEmbed | ShareOption::CopyYoutubeEmbed => &links.youtube_embed,
            ShareOption::OpenInvidious | ShareOption::CopyInvidious => &links.invidious,
        }
    }
}

/// Platform side of the share menu.
pub trait ShareTarget {
    fn copy_to_clipboard(&self, url: &str) -> Result<()>;

    fn open_external(&self, url: &str) -> Result<()>;

    /// Whether links can be opened outside the client at all.
    fn can_open_external(&self) -> bool {
        true
    }
}

/// Performs one share menu choice. Returns `false` when the choice was an
/// open action the target cannot perform.
pub fn dispatch_share(
    option: ShareOption,
    links: &VideoLinks,
    target: &dyn ShareTarget,
) -> Result<bool> {
    let url = option.url(links);
    match option.action() {
        ShareAction::Copy => target
            .copy_to_clipboard(url)
            .with_context(|| format!("copying {url}"))?,
        ShareAction::Open => {
            if !target.can_open_external() {
                debug!(option = option.key(), "external links unavailable; skipping");
                return Ok(false);
            }
            target
                .open_external(url)
                .with_context(|| format!("opening {url}"))?;
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingTarget {
        external: bool,
        calls: RefCell<Vec<(ShareAction, String)>>,
    }

    impl ShareTarget for RecordingTarget {
        fn copy_to_clipboard(&self, url: &str) -> Result<()> {
            self.calls.borrow_mut().push((ShareAction::Copy, url.to_owned()));
            Ok(())
        }

        fn open_external(&self, url: &str) -> Result<()> {
            self.calls.borrow_mut().push((ShareAction::Open, url.to_owned()));
            Ok(())
        }

        fn can_open_external(&self) -> bool {
            self.external
        }
    }

    #[test]
    fn thumbnail_url_variants() {
        let local =
            |pref| thumbnail_url("abc", BackendPreference::Local, pref, "https://inv.example");
        assert_eq!(local(ThumbnailPreference::Start), "https://i.ytimg.com/vi/abc/mq1.jpg");
        assert_eq!(local(ThumbnailPreference::Middle), "https://i.ytimg.com/vi/abc/mq2.jpg");
        assert_eq!(local(ThumbnailPreference::End), "https://i.ytimg.com/vi/abc/mq3.jpg");
        assert_eq!(
            local(ThumbnailPreference::Default),
            "https://i.ytimg.com/vi/abc/mqdefault.jpg"
        );
        assert_eq!(
            thumbnail_url(
                "abc",
                BackendPreference::Invidious,
                ThumbnailPreference::Middle,
                "https://inv.example/"
            ),
            "https://inv.example/vi/abc/mq2.jpg"
        );
    }

    #[test]
    fn preferences_parse_leniently() {
        assert_eq!(BackendPreference::from_setting("invidious"), BackendPreference::Invidious);
        assert_eq!(BackendPreference::from_setting("local"), BackendPreference::Local);
        assert_eq!(BackendPreference::from_setting("anything"), BackendPreference::Local);
        assert_eq!(ThumbnailPreference::from_setting("end"), ThumbnailPreference::End);
        assert_eq!(ThumbnailPreference::from_setting("hidden"), ThumbnailPreference::Default);
    }

    #[test]
    fn share_options_round_trip_keys() {
        for option in ShareOption::ALL {
            assert_eq!(ShareOption::from_key(option.key()), Some(option));
        }
        assert_eq!(ShareOption::from_key("share"), None);
    }

    #[test]
    fn dispatch_routes_to_target() -> Result<()> {
        let links = VideoLinks::new("abc", "https://inv.example");
        let target = RecordingTarget {
            external: true,
            ..RecordingTarget::default()
        };

        assert!(dispatch_share(ShareOption::CopyYoutubeEmbed, &links, &target)?);
        assert!(dispatch_share(ShareOption::OpenInvidious, &links, &target)?);
        assert_eq!(
            target.calls.into_inner(),
            vec![
                (
                    ShareAction::Copy,
                    "https://www.youtube-nocookie.com/embed/abc".to_owned()
                ),
                (ShareAction::Open, "https://inv.example/watch?v=abc".to_owned()),
            ]
        );
        Ok(())
    }

    #[test]
    fn open_is_skipped_without_external_support() -> Result<()> {
        let links = VideoLinks::new("abc", "https://inv.example");
        let target = RecordingTarget::default();

        assert!(!dispatch_share(ShareOption::OpenYoutube, &links, &target)?);
        assert!(dispatch_share(ShareOption::CopyYoutube, &links, &target)?);
        assert_eq!(
            target.calls.into_inner(),
            vec![(ShareAction::Copy, "https://www.youtube.com/watch?v=abc".to_owned())]
        );
        Ok(())
    }
}
