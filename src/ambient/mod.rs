//! Ambient Particle Field
//!
//! The decorative background animation: a pool of independently drifting
//! circles that wrap around an overscanned viewport, react to scrolling
//! with a decaying vertical kick, and recolor on theme switches.
//!
//! Unlike `game/`, this module uses floating point and OS randomness
//! freely; nothing here needs to be reproducible across runs.

pub mod canvas;
pub mod field;
pub mod frame_loop;
pub mod palette;
pub mod particle;

pub use canvas::{Canvas, DrawCommand, RecordingCanvas};
pub use field::{FieldConfig, MotionPreference, ParticleField};
pub use frame_loop::{spawn_frame_loop, FieldEvent, FieldHandle, FrameLoopConfig};
pub use palette::{Theme, ThemeParseError};
pub use particle::{Bounds, Particle};
