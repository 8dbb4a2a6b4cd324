use log::debug;

use super::config::LayoutConfig;
use super::simulation::Simulation;
use super::types::{GraphData, NodeIdx, NodeRole, Vec2};
use crate::topology::Topology;

/// Extra world-space slack around a node's disc that still counts as a hit.
pub const HIT_SLOP: f64 = 4.0;
/// Seconds the zoom level stays visible after a zoom gesture.
pub const ZOOM_FLASH_SECS: f64 = 1.5;

/// Drawn disc radius per role.
pub fn node_radius(role: NodeRole) -> f64 {
	match role {
		NodeRole::Center => 20.0,
		NodeRole::AccessPoint => 10.0,
		NodeRole::Device => 4.0,
	}
}

/// Screen = graph * k + (x, y). Applied only when drawing.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	/// Horizontal translation in screen pixels.
	pub x: f64,
	/// Vertical translation in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self { x: 0.0, y: 0.0, k: 1.0 }
	}
}

/// Node being dragged and where the gesture began.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Dragged node, if a drag is in progress.
	pub node_idx: Option<NodeIdx>,
	/// Screen position of the pointer at drag start.
	pub start: Vec2,
	/// Graph position of the node at drag start.
	pub node_start: Vec2,
}

/// Background drag that translates the view.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Whether a pan is in progress.
	pub active: bool,
	/// Screen position of the pointer at pan start.
	pub start: Vec2,
	/// View translation at pan start.
	pub transform_start: Vec2,
}

/// Layout plus everything the pointer and wheel handlers change.
pub struct ForceGraphState {
	/// Layout engine owning the graph.
	pub simulation: Simulation,
	/// Pan and zoom.
	pub transform: ViewTransform,
	/// Active node drag.
	pub drag: DragState,
	/// Active background pan.
	pub pan: PanState,
	/// Canvas width in CSS pixels.
	pub width: f64,
	/// Canvas height in CSS pixels.
	pub height: f64,
	/// Seconds of running layout; drives the dash animation of edges.
	pub flow_time: f64,
	/// Remaining display time of the zoom level readout.
	pub zoom_flash: f64,
}

impl ForceGraphState {
	/// State for a `width` x `height` canvas with the layout centered in it.
	pub fn new(topology: &Topology, config: LayoutConfig, width: f64, height: f64) -> Self {
		let mut state = Self {
			simulation: Simulation::new(config, Vec2::new(width / 2.0, height / 2.0)),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			flow_time: 0.0,
			zoom_flash: 0.0,
		};
		state.set_topology(topology);
		state
	}

	/// Rebuilds the graph from scratch and resets the view.
	pub fn set_topology(&mut self, topology: &Topology) {
		let graph = GraphData::build(topology, self.simulation.midpoint());
		self.simulation.load(graph);
		self.transform = ViewTransform::default();
		self.drag = DragState::default();
		self.pan = PanState::default();
	}

	/// The laid-out graph.
	pub fn graph(&self) -> &GraphData {
		self.simulation.graph()
	}

	/// Layout constants.
	pub fn config(&self) -> &LayoutConfig {
		self.simulation.config()
	}

	/// Inverse of the view transform.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Vec2 {
		Vec2::new(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Applies the view transform.
	pub fn graph_to_screen(&self, p: Vec2) -> Vec2 {
		Vec2::new(
			p.x * self.transform.k + self.transform.x,
			p.y * self.transform.k + self.transform.y,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<NodeIdx> {
		let p = self.screen_to_graph(sx, sy);
		self.graph()
			.nodes
			.iter()
			.enumerate()
			.rev()
			.find(|(_, n)| n.position.distance(p) < node_radius(n.role()) + HIT_SLOP)
			.map(|(i, _)| NodeIdx(i))
	}

	/// Pins a node where it is and re-energizes the layout. The center ignores drags.
	pub fn drag_start(&mut self, idx: NodeIdx, screen: Vec2) -> bool {
		let Some(position) = self.graph().node(idx).map(|n| n.position) else {
			return false;
		};
		if !self.simulation.pin(idx, position) {
			return false;
		}
		self.simulation.reheat();
		self.drag = DragState {
			node_idx: Some(idx),
			start: screen,
			node_start: position,
		};
		debug!("drag start on {}", self.graph().nodes[idx.0].id);
		true
	}

	/// Moves the pin of a dragged node to a graph-space position.
	pub fn drag_move(&mut self, idx: NodeIdx, position: Vec2) {
		if self.drag.node_idx == Some(idx) {
			self.simulation.pin(idx, position);
		}
	}

	/// Releases the dragged node and lets the layout cool down.
	pub fn drag_end(&mut self, idx: NodeIdx) {
		if self.drag.node_idx != Some(idx) {
			return;
		}
		self.simulation.unpin(idx);
		self.simulation.cool();
		self.drag = DragState::default();
	}

	/// Sets pan and zoom, clamping the zoom factor to the configured range.
	pub fn set_view_transform(&mut self, k: f64, translation: Vec2) {
		let cfg = self.config();
		self.transform = ViewTransform {
			x: translation.x,
			y: translation.y,
			k: k.clamp(cfg.zoom_min, cfg.zoom_max),
		};
	}

	/// Zooms by `factor` keeping the graph point under (sx, sy) fixed on screen.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let old_k = self.transform.k;
		let cfg = self.config();
		let new_k = (old_k * factor).clamp(cfg.zoom_min, cfg.zoom_max);
		let ratio = new_k / old_k;
		let translation = Vec2::new(
			sx - (sx - self.transform.x) * ratio,
			sy - (sy - self.transform.y) * ratio,
		);
		self.set_view_transform(new_k, translation);
		self.zoom_flash = ZOOM_FLASH_SECS;
	}

	/// Starts a node drag when a draggable node is hit, a pan otherwise.
	pub fn pointer_down(&mut self, sx: f64, sy: f64) {
		let screen = Vec2::new(sx, sy);
		if let Some(idx) = self.node_at_position(sx, sy) {
			if self.drag_start(idx, screen) {
				return;
			}
		}
		self.pan = PanState {
			active: true,
			start: screen,
			transform_start: Vec2::new(self.transform.x, self.transform.y),
		};
	}

	/// Continues the active drag or pan.
	pub fn pointer_move(&mut self, sx: f64, sy: f64) {
		if let Some(idx) = self.drag.node_idx {
			let moved = (Vec2::new(sx, sy) - self.drag.start) * (1.0 / self.transform.k);
			self.drag_move(idx, self.drag.node_start + moved);
		} else if self.pan.active {
			let t = self.pan.transform_start + (Vec2::new(sx, sy) - self.pan.start);
			self.set_view_transform(self.transform.k, t);
		}
	}

	/// Ends any drag or pan.
	pub fn pointer_up(&mut self) {
		if let Some(idx) = self.drag.node_idx {
			self.drag_end(idx);
		}
		self.pan.active = false;
	}

	/// Advances the layout and the animation clocks by `dt` seconds.
	pub fn tick(&mut self, dt: f64) {
		if self.simulation.tick(dt) {
			self.flow_time += dt;
		}
		self.zoom_flash = (self.zoom_flash - dt).max(0.0);
	}

	/// Adopts a new canvas size and recenters the layout.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.simulation
			.set_midpoint(Vec2::new(width / 2.0, height / 2.0));
	}
}
