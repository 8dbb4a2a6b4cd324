mod component;
/// Tunable layout constants.
pub mod config;
mod render;
/// Force-directed layout engine.
pub mod simulation;
/// Interaction state: view transform, drag and pan.
pub mod state;
/// Graph model built from a topology.
pub mod types;

pub use component::ForceGraphCanvas;
pub use config::LayoutConfig;
pub use simulation::{Phase, Simulation};
pub use state::{ForceGraphState, ViewTransform};
pub use types::{Edge, EdgeKind, GraphData, GraphNode, GraphSnapshot, NodeIdx, NodeKind, NodeRole, Vec2};
