use crate::scheduler::{FALLBACK_INTERVAL, FrameMode, ResizeScheduler};
use crate::time::Duration;

/// Settings for a registry and its resize scheduler.
///
/// ```rust
/// use std::time::Duration;
/// use element_queries::QueriesConfig;
///
/// let config = QueriesConfig::default()
///     .frame_aligned(false)
///     .fallback_interval(Duration::from_millis(100));
/// assert!(!config.is_frame_aligned());
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "kebab-case")
)]
pub struct QueriesConfig {
    /// Schedule passes on animation frames. When `false` the scheduler falls
    /// back to a fixed timer.
    frame_aligned: bool,
    #[cfg_attr(feature = "serde", serde(rename = "fallback-interval-ms", with = "millis"))]
    fallback_interval: Duration,
    /// Log tables whose thresholds are not ascending when they are added.
    log_unsorted: bool,
}

impl Default for QueriesConfig {
    fn default() -> Self {
        Self {
            frame_aligned: true,
            fallback_interval: FALLBACK_INTERVAL,
            log_unsorted: true,
        }
    }
}

impl QueriesConfig {
    pub fn frame_aligned(mut self, frame_aligned: bool) -> Self {
        self.frame_aligned = frame_aligned;
        self
    }

    pub fn fallback_interval(mut self, interval: Duration) -> Self {
        self.fallback_interval = interval;
        self
    }

    /// Log tables whose thresholds are not ascending, at `debug` level, when
    /// they are added. On by default.
    pub fn log_unsorted(mut self, log: bool) -> Self {
        self.log_unsorted = log;
        self
    }

    pub fn is_frame_aligned(&self) -> bool {
        self.frame_aligned
    }

    pub fn interval(&self) -> Duration {
        self.fallback_interval
    }

    pub(crate) fn logs_unsorted(&self) -> bool {
        self.log_unsorted
    }

    pub fn frame_mode(&self) -> FrameMode {
        if self.frame_aligned {
            FrameMode::AnimationFrame
        } else {
            FrameMode::Timer(self.fallback_interval)
        }
    }

    /// A scheduler configured from these settings.
    pub fn scheduler(&self) -> ResizeScheduler {
        ResizeScheduler::new(self.frame_mode())
    }

    /// Parse settings from JSON. Missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(feature = "serde")]
mod millis {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
