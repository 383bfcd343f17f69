#![warn(missing_docs)]
//! Gameplay utilities built on the tick scheduler.

pub mod countdown;
pub mod cutscene;
pub mod inspector;

pub use countdown::CountdownTimer;
pub use cutscene::{CameraSubject, Cutscene, Fade, Look, Playback, Scene, TimedCommand};
pub use inspector::{DebugStickInspector, DEBUG_STICK};
