//! A steppable Fortune's-algorithm sweep for planar Voronoi diagrams.
//!
//! [`Engine`] owns one sweep over a fixed site set: construct it, then
//! drive it with [`Engine::step`]/[`Engine::run_until`]/[`Engine::run_all`],
//! inspecting progress at any point with [`Engine::snapshot`] or
//! [`Engine::beachline_view`] without disturbing the run.

mod beachline;
mod engine;
mod error;
mod event;
pub mod geometry;
mod node;
mod site;
#[cfg(test)]
mod test_utils;

pub use beachline::{BeachlineView, NodeKind};
pub use engine::{Engine, Snapshot, SweepState};
pub use error::EngineError;
pub use node::NodeId;
pub use site::SiteId;
