use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle as BarStyle};

use super::{Progress, ProgressError, ProgressState, Throttle};

const TEMPLATE: &str = "{bar:40.cyan/blue} {pos:>3}% [{elapsed_precise}<{eta}] {wide_msg}";

/// Terminal progress bar drawn by indicatif.
pub struct BarProgress {
    bar: ProgressBar,
    state: ProgressState,
    throttle: Throttle,
}

impl BarProgress {
    pub fn new(rate: u32) -> Self {
        Self::with_target(ProgressDrawTarget::stderr(), rate)
    }

    pub fn with_target(target: ProgressDrawTarget, rate: u32) -> Self {
        let style = BarStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| BarStyle::default_bar())
            .progress_chars("=> ");
        let bar = ProgressBar::with_draw_target(Some(100), target).with_style(style);
        Self {
            bar,
            state: ProgressState::default(),
            throttle: Throttle::new(rate),
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Progress for BarProgress {
    fn update_progress(&mut self, percent: f64) -> Result<(), ProgressError> {
        self.state.set_percent(percent)
    }

    fn set_annotation(&mut self, annotation: Option<String>) {
        self.state.annotation = annotation;
    }

    fn display(&mut self) -> Result<bool, ProgressError> {
        if !self.throttle.is_due(self.state.is_complete()) {
            return Ok(false);
        }
        self.bar.set_position(self.state.percent.floor() as u64);
        self.bar
            .set_message(self.state.annotation.clone().unwrap_or_default());
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), ProgressError> {
        self.bar.finish();
        Ok(())
    }
}
