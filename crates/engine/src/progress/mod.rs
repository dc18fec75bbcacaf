//! Download progress displays.
//!
//! Every display implements [`Progress`]: the pipeline pushes a percentage and
//! an optional annotation, then asks for a render. Renders are rate limited by
//! a private [`Throttle`] per display, except that 100% always renders.

mod bar;
mod text;

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

pub use bar::BarProgress;
pub use text::{PercentProgress, SpinnerProgress, ZenityProgress};

#[derive(Debug, thiserror::Error)]
pub enum ProgressError {
    #[error("progress value {0} is outside 0..=100")]
    OutOfRange(f64),

    #[error("failed to write progress: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Progress: Send {
    /// Set the current percentage. Values outside `0..=100` are rejected.
    fn update_progress(&mut self, percent: f64) -> Result<(), ProgressError>;

    fn set_annotation(&mut self, annotation: Option<String>);

    /// Render the current state if the throttle allows it.
    ///
    /// Returns whether anything was rendered.
    fn display(&mut self) -> Result<bool, ProgressError>;

    /// Close out the display after the last render.
    fn finish(&mut self) -> Result<(), ProgressError>;
}

/// Which display to build for a download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProgressStyle {
    #[default]
    Bar,
    Percent,
    Spinner,
    /// Line protocol of `zenity --progress`
    Zenity,
    None,
}

impl ProgressStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Percent => "percent",
            Self::Spinner => "spinner",
            Self::Zenity => "zenity",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ProgressStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProgressStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bar" => Ok(Self::Bar),
            "percent" => Ok(Self::Percent),
            "spinner" => Ok(Self::Spinner),
            "zenity" => Ok(Self::Zenity),
            "none" => Ok(Self::None),
            other => Err(format!("unknown progress style `{other}`")),
        }
    }
}

/// Build the display for `style`, or `None` when progress is disabled.
pub fn create_progress(style: ProgressStyle, rate: u32) -> Option<Box<dyn Progress>> {
    match style {
        ProgressStyle::Bar => Some(Box::new(BarProgress::new(rate))),
        ProgressStyle::Percent => Some(Box::new(PercentProgress::stdout(rate))),
        ProgressStyle::Spinner => Some(Box::new(SpinnerProgress::stdout(rate))),
        ProgressStyle::Zenity => Some(Box::new(ZenityProgress::stdout(rate))),
        ProgressStyle::None => None,
    }
}

/// Overall percentage of a download split into `count` parts, while part
/// `index` (0-based) has `written` of its `size` bytes.
pub fn overall_percent(index: usize, count: usize, written: u64, size: u64) -> f64 {
    if count == 0 {
        return 100.0;
    }
    let part = if size == 0 {
        1.0
    } else {
        (written as f64 / size as f64).min(1.0)
    };
    (100.0 * (index as f64 + part) / count as f64).clamp(0.0, 100.0)
}

/// Percentage and annotation shared by every display.
#[derive(Debug, Default)]
pub(crate) struct ProgressState {
    pub percent: f64,
    pub annotation: Option<String>,
}

impl ProgressState {
    pub fn set_percent(&mut self, percent: f64) -> Result<(), ProgressError> {
        if !(0.0..=100.0).contains(&percent) {
            return Err(ProgressError::OutOfRange(percent));
        }
        self.percent = percent;
        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.percent >= 100.0
    }
}

/// Render rate limiter owned by a single display.
#[derive(Debug)]
pub(crate) struct Throttle {
    min_interval: Option<Duration>,
    last_render: Option<Instant>,
}

impl Throttle {
    /// `rate` is the maximum number of renders per second; 0 disables throttling.
    pub fn new(rate: u32) -> Self {
        Self {
            min_interval: (rate > 0).then(|| Duration::from_secs_f64(1.0 / f64::from(rate))),
            last_render: None,
        }
    }

    /// Whether a render is allowed now. A granted render restarts the window.
    pub fn is_due(&mut self, force: bool) -> bool {
        let now = Instant::now();
        let due = force
            || match (self.min_interval, self.last_render) {
                (Some(interval), Some(last)) => now.duration_since(last) > interval,
                _ => true,
            };
        if due {
            self.last_render = Some(now);
        }
        due
    }
}
