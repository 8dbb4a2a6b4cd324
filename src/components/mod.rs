//! Canvas force-graph of a scan: graph model, layout engine, interaction and drawing.

/// Canvas force-graph component and its layout engine.
pub mod force_graph;
