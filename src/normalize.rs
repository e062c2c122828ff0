//! Maps either upstream record onto the single view model a list entry shows.
//!
//! The synchronous pass is two pure functions, one per schema. The only
//! asynchronous field, `uploaded_time`, is resolved afterwards by a task that
//! belongs to the [`ListEntry`] and dies with it.

use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Number, Value};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::format::{ViewCountText, format_duration, format_view_count};
use crate::links::YOUTUBE_WATCH_PREFIX;
use crate::publish::{
    PublicationStrings, PublishTimeLocalizer, PublishTimeResolutionError, resolve_publish_time,
};
use crate::record::{LocalAuthor, LocalRecord, ProxyRecord, RawRecord, Seconds};

const USER_URL_PREFIX: &str = "https://www.youtube.com/user/";
const CHANNEL_URL_PREFIX: &str = "https://www.youtube.com/channel/";

/// Display-ready fields for one list entry. Unknown values stay at their
/// empty defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalVideo {
    pub id: String,
    pub title: String,
    pub channel_name: String,
    pub channel_id: String,
    pub view_count: i64,
    pub parsed_view_count: String,
    pub uploaded_time: String,
    pub duration: String,
    pub description: String,
    pub is_live: bool,
    pub hide_views: bool,
}

/// Publish-time lookup still owed after the synchronous pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPublishTime {
    pub publish_text: String,
    pub is_live: bool,
    pub is_upcoming: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub video: CanonicalVideo,
    pub publish_time: Option<PendingPublishTime>,
}

pub fn normalize_record(record: &RawRecord) -> Normalized {
    match record {
        RawRecord::Proxy(proxy) => normalize_proxy(proxy),
        RawRecord::Local(local) => normalize_local(local),
    }
}

pub fn normalize_proxy(record: &ProxyRecord) -> Normalized {
    let mut video = CanonicalVideo {
        id: record.video_id.clone().unwrap_or_default(),
        title: record.title.clone().unwrap_or_default(),
        channel_name: record.author.clone().unwrap_or_default(),
        channel_id: strip_channel_prefixes(record.author_id.as_deref().unwrap_or_default()),
        description: record.description.clone().unwrap_or_default(),
        is_live: record.live_now.unwrap_or_default(),
        view_count: record.view_count.as_ref().map(whole_count).unwrap_or_default(),
        ..CanonicalVideo::default()
    };
    video.duration = duration_text(&video.id, record.length_seconds.as_ref());

    let views = format_view_count(
        record.view_count.as_ref(),
        record.view_count_text.as_deref().map(ViewCountText::Suffixed),
    );
    video.parsed_view_count = views.display;
    video.hide_views = views.hidden;

    let publish_time = record
        .published_text
        .as_ref()
        .map(|text| PendingPublishTime {
            publish_text: text.clone(),
            is_live: record.live.unwrap_or_default(),
            is_upcoming: record.is_upcoming.unwrap_or_default(),
        });

    Normalized {
        video,
        publish_time,
    }
}

pub fn normalize_local(record: &LocalRecord) -> Normalized {
    let id = match (&record.id, &record.link) {
        (Some(id), _) => id.clone(),
        (None, Some(link)) => link.replacen(YOUTUBE_WATCH_PREFIX, "", 1),
        (None, None) => String::new(),
    };

    let mut video = CanonicalVideo {
        id,
        title: record.title.clone().unwrap_or_default(),
        is_live: record.live.unwrap_or_default(),
        ..CanonicalVideo::default()
    };

    match &record.author {
        Some(LocalAuthor::Name(name)) => {
            video.channel_name = name.clone();
            video.channel_id = strip_channel_prefixes(record.ucid.as_deref().unwrap_or_default());
            video.view_count = record.views.as_ref().map(whole_count).unwrap_or_default();
            video.duration = duration_text(&video.id, record.length_seconds.as_ref());
        }
        Some(LocalAuthor::Channel { name, channel_ref }) => {
            video.channel_name = name.clone().unwrap_or_default();
            video.duration = record.duration.clone().unwrap_or_default();
            video.description = record.description.clone().unwrap_or_default();
            video.channel_id = strip_channel_prefixes(channel_ref.as_deref().unwrap_or_default());
        }
        None => debug!(id = %video.id, "local record without author"),
    }

    let views = format_view_count(
        record.views.as_ref(),
        record.view_count.as_deref().map(ViewCountText::Grouped),
    );
    video.parsed_view_count = views.display;
    video.hide_views = views.hidden;

    let publish_time = record
        .uploaded_at
        .as_ref()
        .map(|text| PendingPublishTime {
            publish_text: text.clone(),
            is_live: record.live.unwrap_or_default(),
            is_upcoming: false,
        });

    Normalized {
        video,
        publish_time,
    }
}

/// Channel ids sometimes arrive as full channel or user URLs.
fn strip_channel_prefixes(channel: &str) -> String {
    channel
        .replace(USER_URL_PREFIX, "")
        .replace(CHANNEL_URL_PREFIX, "")
}

/// Raw count for the view model. Integral floats are truncated and counts
/// beyond `i64` saturate; the display text keeps the exact digits.
fn whole_count(count: &Number) -> i64 {
    if let Some(value) = count.as_i64() {
        return value;
    }
    if count.as_u64().is_some() {
        return i64::MAX;
    }
    count.as_f64().map(|value| value as i64).unwrap_or_default()
}

/// A bad duration only blanks the duration; the rest of the entry still shows.
fn duration_text(id: &str, seconds: Option<&Seconds>) -> String {
    let Some(seconds) = seconds else {
        return String::new();
    };
    match seconds.whole_seconds().and_then(format_duration) {
        Ok(text) => text,
        Err(err) => {
            warn!(id, error = %err, "skipping duration");
            String::new()
        }
    }
}

/// Normalizes records and starts their publish-time lookups.
#[derive(Clone)]
pub struct Normalizer {
    localizer: Arc<dyn PublishTimeLocalizer>,
    strings: Arc<PublicationStrings>,
    local_upload_placeholder: bool,
}

impl Normalizer {
    pub fn new(localizer: Arc<dyn PublishTimeLocalizer>, strings: PublicationStrings) -> Self {
        Self {
            localizer,
            strings: Arc::new(strings),
            local_upload_placeholder: false,
        }
    }

    /// Shows the raw `uploaded_at` of local records until the localized text
    /// arrives. Off by default.
    pub fn with_local_upload_placeholder(mut self, enabled: bool) -> Self {
        self.local_upload_placeholder = enabled;
        self
    }

    pub fn present(&self, value: &Value) -> ListEntry {
        self.present_record(&RawRecord::from_value(value.clone()))
    }

    /// Fills every synchronous field right away and spawns the publish-time
    /// lookup on the current tokio runtime, if there is one.
    pub fn present_record(&self, record: &RawRecord) -> ListEntry {
        let Normalized {
            mut video,
            publish_time,
        } = normalize_record(record);

        if self.local_upload_placeholder
            && let (RawRecord::Local(_), Some(pending)) = (record, &publish_time)
        {
            video.uploaded_time = pending.publish_text.clone();
        }

        let video = Arc::new(RwLock::new(video));
        let publish_task =
            publish_time.and_then(|pending| self.spawn_publish_time(&video, pending));

        ListEntry {
            video,
            publish_task,
        }
    }

    fn spawn_publish_time(
        &self,
        video: &Arc<RwLock<CanonicalVideo>>,
        pending: PendingPublishTime,
    ) -> Option<JoinHandle<()>> {
        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!(error = %err, "no async runtime; publish time left unresolved");
                return None;
            }
        };

        let target = Arc::downgrade(video);
        let localizer = Arc::clone(&self.localizer);
        let strings = Arc::clone(&self.strings);

        Some(runtime.spawn(async move {
            let resolved = resolve_publish_time(
                localizer.as_ref(),
                &pending.publish_text,
                pending.is_live,
                pending.is_upcoming,
                &strings,
            )
            .await;
            apply_publish_time(&target, resolved);
        }))
    }
}

fn apply_publish_time(
    target: &Weak<RwLock<CanonicalVideo>>,
    resolved: Result<String, PublishTimeResolutionError>,
) {
    let Some(video) = target.upgrade() else {
        debug!("list entry discarded before publish time resolved");
        return;
    };
    match resolved {
        Ok(text) => video.write().uploaded_time = text,
        Err(err) => warn!(id = %video.read().id, error = %err, "publish time lookup failed"),
    }
}

/// One rendered list entry. Owns its view model and any in-flight
/// publish-time lookup; dropping the entry cancels the lookup.
#[derive(Debug)]
pub struct ListEntry {
    video: Arc<RwLock<CanonicalVideo>>,
    publish_task: Option<JoinHandle<()>>,
}

impl ListEntry {
    /// Current state of the view model. `uploaded_time` may still change.
    pub fn snapshot(&self) -> CanonicalVideo {
        self.video.read().clone()
    }

    pub fn uploaded_time(&self) -> String {
        self.video.read().uploaded_time.clone()
    }

    pub fn is_publish_time_pending(&self) -> bool {
        self.publish_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Waits for the publish-time lookup, then returns the final view model.
    pub async fn settle(&mut self) -> CanonicalVideo {
        if let Some(task) = self.publish_task.take()
            && let Err(err) = task.await
        {
            warn!(id = %self.video.read().id, error = %err, "publish time task did not finish");
        }
        self.snapshot()
    }

    /// Discards the entry, revoking any pending lookup.
    pub fn dispose(self) {
        drop(self);
    }
}

impl Drop for ListEntry {
    fn drop(&mut self) {
        if let Some(task) = self.publish_task.take() {
            task.abort();
        }
    }
}
