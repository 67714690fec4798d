// SPDX-License-Identifier: GPL-3.0-only

//! Scripted frame stream
//!
//! `FrameQueue` replays a fixed script of poll outcomes and then, optionally,
//! keeps delivering one frame forever. Replay and synthetic sensors are built
//! on it, and tests use it to stage misses and stream errors.

use super::FrameSource;
use crate::errors::SensorError;
use std::collections::VecDeque;
use tracing::debug;

/// One scripted poll outcome
#[derive(Debug, Clone)]
enum Scripted<F> {
    Frame(F),
    Miss,
    Error(SensorError),
}

/// Frame stream driven by a script of poll outcomes
#[derive(Debug, Clone)]
pub struct FrameQueue<F> {
    script: VecDeque<Scripted<F>>,
    /// Delivered on every poll once the script is exhausted
    repeat: Option<F>,
    delivered: usize,
    released: usize,
}

impl<F> Default for FrameQueue<F> {
    fn default() -> Self {
        Self {
            script: VecDeque::new(),
            repeat: None,
            delivered: 0,
            released: 0,
        }
    }
}

impl<F: Clone> FrameQueue<F> {
    /// Empty queue: every poll reports "no frame"
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that delivers `frame` on every poll
    pub fn repeating(frame: F) -> Self {
        Self {
            repeat: Some(frame),
            ..Self::default()
        }
    }

    /// Queue a frame for the next poll
    pub fn push_frame(&mut self, frame: F) -> &mut Self {
        self.script.push_back(Scripted::Frame(frame));
        self
    }

    /// Queue a poll that finds no frame ready
    pub fn push_miss(&mut self) -> &mut Self {
        self.script.push_back(Scripted::Miss);
        self
    }

    /// Queue a poll that fails with `error`
    pub fn push_error(&mut self, error: SensorError) -> &mut Self {
        self.script.push_back(Scripted::Error(error));
        self
    }

    /// Number of frames handed out so far
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Number of frames handed back via `release_frame`
    pub fn released(&self) -> usize {
        self.released
    }

    /// Frames handed out but not yet released
    pub fn outstanding(&self) -> usize {
        self.delivered - self.released
    }
}

impl<F: Clone> FrameSource for FrameQueue<F> {
    type Frame = F;

    fn try_next_frame(&mut self) -> Result<Option<F>, SensorError> {
        let frame = match self.script.pop_front() {
            Some(Scripted::Frame(frame)) => Some(frame),
            Some(Scripted::Miss) => None,
            Some(Scripted::Error(e)) => return Err(e),
            None => self.repeat.clone(),
        };

        if frame.is_some() {
            self.delivered += 1;
        }
        Ok(frame)
    }

    fn release_frame(&mut self, _frame: F) {
        self.released += 1;
        debug!(released = self.released, "Frame released");
    }
}
