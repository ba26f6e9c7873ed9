//! Drawing surface for the particle field.

use serde::{Deserialize, Serialize};

/// Something particles can be painted on.
pub trait Canvas {
    /// Erase everything in a `width` x `height` area from the origin.
    fn clear(&mut self, width: f64, height: f64);

    /// Paint a filled circle.
    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str);
}

/// One recorded draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    /// Canvas cleared.
    Clear {
        /// Cleared width.
        width: f64,
        /// Cleared height.
        height: f64,
    },
    /// Filled circle.
    Circle {
        /// Center x.
        x: f64,
        /// Center y.
        y: f64,
        /// Radius.
        radius: f64,
        /// CSS color.
        color: String,
    },
}

/// Canvas that keeps the calls of the most recent frame.
///
/// Each `clear` starts a new frame. Useful for tests and for shipping
/// frames to a remote renderer as JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingCanvas {
    commands: Vec<DrawCommand>,
    frames: u64,
}

impl RecordingCanvas {
    /// Empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls of the current frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Circles of the current frame.
    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    /// Frames started so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Canvas for RecordingCanvas {
    fn clear(&mut self, width: f64, height: f64) {
        self.commands.clear();
        self.frames += 1;
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn fill_circle(&mut self, x: f64, y: f64, radius: f64, color: &str) {
        self.commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            color: color.to_string(),
        });
    }
}
