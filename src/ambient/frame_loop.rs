//! Frame Loop
//!
//! Drives a [`ParticleField`] on a tokio task: tick, update, draw, repeat.
//! Resize, scroll and theme notifications arrive over a channel and are
//! applied by the same task between frames, so a frame never observes a
//! half-rebuilt pool.

use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::canvas::Canvas;
use super::field::ParticleField;
use super::palette::{Theme, ThemeParseError};

/// Notification for the field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEvent {
    /// Viewport size changed.
    Resize {
        /// New viewport width.
        width: f64,
        /// New viewport height.
        height: f64,
    },
    /// Page scrolled.
    Scroll {
        /// New vertical scroll offset.
        scroll_y: f64,
    },
    /// Theme switched.
    Theme(Theme),
}

/// Frame loop timing.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Time between frames.
    pub frame_interval: Duration,
    /// Quiet period before a resize is applied.
    pub resize_debounce: Duration,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_interval: Duration::from_micros(1_000_000 / 60),
            resize_debounce: Duration::from_millis(250),
        }
    }
}

/// Sends notifications to a running frame loop. Dropping every handle
/// stops the loop.
#[derive(Debug, Clone)]
pub struct FieldHandle {
    tx: mpsc::UnboundedSender<FieldEvent>,
}

impl FieldHandle {
    /// Queue an event. Returns `false` if the loop is gone.
    pub fn send(&self, event: FieldEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Viewport resized.
    pub fn resize(&self, width: f64, height: f64) -> bool {
        self.send(FieldEvent::Resize { width, height })
    }

    /// Page scrolled to `scroll_y`.
    pub fn scroll(&self, scroll_y: f64) -> bool {
        self.send(FieldEvent::Scroll { scroll_y })
    }

    /// Theme switched.
    pub fn set_theme(&self, theme: Theme) -> bool {
        self.send(FieldEvent::Theme(theme))
    }

    /// Theme switch carrying a theme name, as sent by the page.
    /// Unknown names are dropped.
    pub fn theme_named(&self, name: &str) -> Result<bool, ThemeParseError> {
        match name.parse::<Theme>() {
            Ok(theme) => Ok(self.set_theme(theme)),
            Err(e) => {
                warn!("Ignoring theme notification: {}", e);
                Err(e)
            }
        }
    }
}

/// Start animating `field` onto `canvas`.
///
/// The task ends once every [`FieldHandle`] is dropped and hands back the
/// field and canvas.
pub fn spawn_frame_loop<R, C>(
    field: ParticleField<R>,
    canvas: C,
    config: FrameLoopConfig,
) -> (FieldHandle, JoinHandle<(ParticleField<R>, C)>)
where
    R: Rng + Send + 'static,
    C: Canvas + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    let handle = tokio::spawn(run_frame_loop(field, canvas, rx, config));
    (FieldHandle { tx }, handle)
}

async fn run_frame_loop<R, C>(
    mut field: ParticleField<R>,
    mut canvas: C,
    mut events: mpsc::UnboundedReceiver<FieldEvent>,
    config: FrameLoopConfig,
) -> (ParticleField<R>, C)
where
    R: Rng,
    C: Canvas,
{
    let mut ticker = interval(config.frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    // Latest requested size and when it arrived
    let mut pending_resize: Option<(f64, f64, Instant)> = None;
    let mut frames: u64 = 0;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some((width, height, at)) = pending_resize {
                    if at.elapsed() >= config.resize_debounce {
                        field.resize(width, height);
                        pending_resize = None;
                        debug!("Particle field resized to {}x{}", width, height);
                    }
                }
                field.frame(&mut canvas);
                frames += 1;
            }
            event = events.recv() => {
                match event {
                    Some(FieldEvent::Resize { width, height }) => {
                        pending_resize = Some((width, height, Instant::now()));
                    }
                    Some(FieldEvent::Scroll { scroll_y }) => field.scroll_to(scroll_y),
                    Some(FieldEvent::Theme(theme)) => {
                        debug!("Particle field theme set to {}", theme);
                        field.set_theme(theme);
                    }
                    None => break,
                }
            }
        }
    }

    debug!("Frame loop stopped after {} frames", frames);
    (field, canvas)
}
