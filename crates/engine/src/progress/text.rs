use std::io::{self, Write};

use super::{Progress, ProgressError, ProgressState, Throttle};

type Output = Box<dyn Write + Send>;

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

fn status_line(state: &ProgressState) -> String {
    let percent = state.percent.floor() as u8;
    match &state.annotation {
        Some(annotation) => format!("{percent}% {annotation}"),
        None => format!("{percent}%"),
    }
}

/// Single line `\r<pct>% <annotation>` display.
pub struct PercentProgress {
    out: Output,
    state: ProgressState,
    throttle: Throttle,
}

impl PercentProgress {
    pub fn new(out: Output, rate: u32) -> Self {
        Self {
            out,
            state: ProgressState::default(),
            throttle: Throttle::new(rate),
        }
    }

    pub fn stdout(rate: u32) -> Self {
        Self::new(Box::new(io::stdout()), rate)
    }
}

impl Progress for PercentProgress {
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
        write!(self.out, "\r{}", status_line(&self.state))?;
        self.out.flush()?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), ProgressError> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Like [`PercentProgress`] with a rotating frame in front.
pub struct SpinnerProgress {
    out: Output,
    state: ProgressState,
    throttle: Throttle,
    frame: usize,
}

impl SpinnerProgress {
    pub fn new(out: Output, rate: u32) -> Self {
        Self {
            out,
            state: ProgressState::default(),
            throttle: Throttle::new(rate),
            frame: 0,
        }
    }

    pub fn stdout(rate: u32) -> Self {
        Self::new(Box::new(io::stdout()), rate)
    }
}

impl Progress for SpinnerProgress {
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
        let frame = SPINNER_FRAMES[self.frame % SPINNER_FRAMES.len()];
        self.frame = self.frame.wrapping_add(1);
        write!(self.out, "\r{frame} {}", status_line(&self.state))?;
        self.out.flush()?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), ProgressError> {
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Feeds `zenity --progress`: a bare percentage line, then `# <text>` for
/// the dialog label.
pub struct ZenityProgress {
    out: Output,
    state: ProgressState,
    throttle: Throttle,
}

impl ZenityProgress {
    pub fn new(out: Output, rate: u32) -> Self {
        Self {
            out,
            state: ProgressState::default(),
            throttle: Throttle::new(rate),
        }
    }

    pub fn stdout(rate: u32) -> Self {
        Self::new(Box::new(io::stdout()), rate)
    }
}

impl Progress for ZenityProgress {
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
        writeln!(self.out, "{}", self.state.percent.floor() as u8)?;
        if let Some(annotation) = &self.state.annotation {
            writeln!(self.out, "# {annotation}")?;
        }
        self.out.flush()?;
        Ok(true)
    }

    fn finish(&mut self) -> Result<(), ProgressError> {
        Ok(())
    }
}
