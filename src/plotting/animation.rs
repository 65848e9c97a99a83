//! Frame-driven replay of a rendered plot.

use std::time::Duration;

use super::{Plot, PlotResult};
use crate::figure::Figure;

/// A rendered figure plus the frame sequence to step it through.
///
/// Frames are applied with [`Plot::render_frame`], so each step mutates the
/// figure in place rather than redrawing it.
#[derive(Debug)]
pub struct Animation<P: Plot> {
    plot: P,
    figure: Figure,
    frames: Vec<usize>,
    interval_ms: f64,
    position: usize,
}

impl<P: Plot> Animation<P> {
    pub(crate) fn new(plot: P, figure: Figure, frames: Vec<usize>, interval_ms: f64) -> Self {
        Self {
            plot,
            figure,
            frames,
            interval_ms,
            position: 0,
        }
    }

    /// Frame indices in playback order.
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Milliseconds between frames.
    pub const fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(self.interval_ms / 1000.0)
    }

    pub const fn figure(&self) -> &Figure {
        &self.figure
    }

    pub const fn plot(&self) -> &P {
        &self.plot
    }

    /// Stop the animation and take the figure in its current state.
    pub fn into_figure(self) -> Figure {
        self.figure
    }

    /// Apply the next frame, returning its index, or `None` once every
    /// frame has been shown.
    pub fn step(&mut self) -> PlotResult<Option<usize>> {
        let Some(&frame) = self.frames.get(self.position) else {
            return Ok(None);
        };
        self.plot.render_frame(&mut self.figure, frame)?;
        self.position += 1;
        Ok(Some(frame))
    }

    /// Start again from the first frame.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    /// Step through every remaining frame, handing each updated figure to
    /// `on_frame`.
    pub fn run<F>(&mut self, mut on_frame: F) -> PlotResult<()>
    where
        F: FnMut(usize, &Figure) -> PlotResult<()>,
    {
        while let Some(frame) = self.step()? {
            on_frame(frame, &self.figure)?;
        }
        Ok(())
    }

    /// Like [`Animation::run`] but sleeps for the frame interval between
    /// frames.
    pub fn play<F>(&mut self, mut on_frame: F) -> PlotResult<()>
    where
        F: FnMut(usize, &Figure) -> PlotResult<()>,
    {
        let interval = self.interval();
        while let Some(frame) = self.step()? {
            on_frame(frame, &self.figure)?;
            std::thread::sleep(interval);
        }
        Ok(())
    }
}
