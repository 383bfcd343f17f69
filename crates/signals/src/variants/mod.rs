//! Concrete detectors, one per observable transition.

mod air_jump;
mod equipment;
mod movement;

pub use air_jump::{AirJumpDetector, AirPhase};
pub use equipment::{EquipDiff, EquipmentDetector, EquipmentDiff, UnequipDiff};
pub use movement::{
    Conditions, Edge, EdgeDetector, EdgeRule, JumpEdge, LandEdge, OnGroundEdge, SneakEdge,
    StartJumpingEdge, StopJumpingEdge, UnsneakEdge,
};
