use std::collections::HashMap;
use std::f64::consts::PI;
use std::ops::{Add, AddAssign, Mul, Sub};

use log::info;
use serde::Serialize;

use crate::topology::Topology;

/// Id of the synthetic scanner node every access point links to.
pub const CENTER_ID: &str = "CENTER";

/// Distance of the initial access point ring from the center.
const INITIAL_RING: f64 = 100.0;
/// Distance of a device's initial position from its access point.
const INITIAL_DEVICE_OFFSET: f64 = 30.0;

/// Point or displacement in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Vec2 {
	/// Horizontal component.
	pub x: f64,
	/// Vertical component, growing downwards like the canvas.
	pub y: f64,
}

impl Vec2 {
	/// Origin.
	pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

	/// Vector from its components.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Vector of length `radius` at `angle` radians from the x axis.
	pub fn polar(radius: f64, angle: f64) -> Self {
		Self::new(radius * angle.cos(), radius * angle.sin())
	}

	/// Squared euclidean length.
	pub fn length_squared(self) -> f64 {
		self.x * self.x + self.y * self.y
	}

	/// Euclidean length.
	pub fn length(self) -> f64 {
		self.length_squared().sqrt()
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Self) -> f64 {
		(self - other).length()
	}
}

impl Add for Vec2 {
	type Output = Self;
	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y)
	}
}

impl AddAssign for Vec2 {
	fn add_assign(&mut self, rhs: Self) {
		self.x += rhs.x;
		self.y += rhs.y;
	}
}

impl Sub for Vec2 {
	type Output = Self;
	fn sub(self, rhs: Self) -> Self {
		Self::new(self.x - rhs.x, self.y - rhs.y)
	}
}

impl Mul<f64> for Vec2 {
	type Output = Self;
	fn mul(self, k: f64) -> Self {
		Self::new(self.x * k, self.y * k)
	}
}

/// Position of a node in [`GraphData::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(
	/// Offset into the arena.
	pub usize,
);

/// What a node stands for, without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeRole {
	/// The scanner.
	Center,
	/// A discovered network.
	AccessPoint,
	/// A client of a network.
	Device,
}

/// Role-specific payload of a node.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
	/// The scanner, pinned at the midpoint.
	Center,
	/// A discovered network.
	AccessPoint {
		/// Index the scanner listed the network under.
		display_index: u32,
		/// Network name.
		name: String,
	},
	/// A client device.
	Device {
		/// Index the scanner listed the client under.
		display_index: u32,
		/// MAC address as printed by the scanner.
		mac_address: String,
		/// Access point node the device orbits.
		parent: NodeIdx,
	},
}

impl NodeKind {
	/// Payload-free role.
	pub fn role(&self) -> NodeRole {
		match self {
			NodeKind::Center => NodeRole::Center,
			NodeKind::AccessPoint { .. } => NodeRole::AccessPoint,
			NodeKind::Device { .. } => NodeRole::Device,
		}
	}

	/// Scanner index of access points and devices; `None` for the center.
	pub fn display_index(&self) -> Option<u32> {
		match self {
			NodeKind::Center => None,
			NodeKind::AccessPoint { display_index, .. } | NodeKind::Device { display_index, .. } => {
				Some(*display_index)
			}
		}
	}
}

/// Node of the layout arena.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	/// Unique id: [`CENTER_ID`], an access point id or a lower-case MAC.
	pub id: String,
	/// Role and payload.
	pub kind: NodeKind,
	/// Graph-space position.
	pub position: Vec2,
	/// Displacement applied per tick.
	pub velocity: Vec2,
	/// Externally fixed position; overrides the simulation while set.
	pub pin: Option<Vec2>,
}

impl GraphNode {
	fn new(id: String, kind: NodeKind, position: Vec2) -> Self {
		Self {
			id,
			kind,
			position,
			velocity: Vec2::ZERO,
			pin: None,
		}
	}

	/// Shorthand for `self.kind.role()`.
	pub fn role(&self) -> NodeRole {
		self.kind.role()
	}
}

/// Which pair of roles an edge joins.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
	/// Scanner to network.
	CenterToAp,
	/// Network to client.
	ApToDevice,
}

/// Link between two arena nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge {
	/// Center for [`EdgeKind::CenterToAp`], the access point otherwise.
	pub source: NodeIdx,
	/// Access point or device.
	pub target: NodeIdx,
	/// Roles joined.
	pub kind: EdgeKind,
}

/// Node arena plus the edges between them, indexed by [`NodeIdx`].
#[derive(Clone, Debug, Default)]
pub struct GraphData {
	/// Center first, then access points, then devices.
	pub nodes: Vec<GraphNode>,
	/// Center links in access point order, then device links.
	pub edges: Vec<Edge>,
	ids: HashMap<String, NodeIdx>,
}

impl GraphData {
	/// Assembles the center node, one node per access point and one per device.
	///
	/// The center is pinned at `center`. An empty topology gives an empty graph, and
	/// devices whose parent is not part of `topology` are left out.
	pub fn build(topology: &Topology, center: Vec2) -> Self {
		if topology.is_empty() {
			return Self::default();
		}

		let mut graph = Self::default();
		let center_idx = graph.push(GraphNode {
			pin: Some(center),
			..GraphNode::new(CENTER_ID.to_string(), NodeKind::Center, center)
		});

		let ap_count = topology.access_points.len() as f64;
		for (i, ap) in topology.access_points.iter().enumerate() {
			let angle = i as f64 * 2.0 * PI / ap_count;
			let idx = graph.push(GraphNode::new(
				ap.id.clone(),
				NodeKind::AccessPoint {
					display_index: ap.display_index,
					name: ap.name.clone(),
				},
				center + Vec2::polar(INITIAL_RING, angle),
			));
			graph.edges.push(Edge {
				source: center_idx,
				target: idx,
				kind: EdgeKind::CenterToAp,
			});
		}

		for (i, device) in topology.devices.iter().enumerate() {
			let Some(parent) = graph.index_of(&device.parent_access_point_id) else {
				continue;
			};
			let position = graph.nodes[parent.0].position + Vec2::polar(INITIAL_DEVICE_OFFSET, i as f64);
			let idx = graph.push(GraphNode::new(
				device.id.clone(),
				NodeKind::Device {
					display_index: device.display_index,
					mac_address: device.mac_address.clone(),
					parent,
				},
				position,
			));
			graph.edges.push(Edge {
				source: parent,
				target: idx,
				kind: EdgeKind::ApToDevice,
			});
		}

		info!(
			"Graph built: {} nodes ({} APs, {} devices), {} edges",
			graph.nodes.len(),
			topology.access_points.len(),
			topology.devices.len(),
			graph.edges.len()
		);
		graph
	}

	fn push(&mut self, node: GraphNode) -> NodeIdx {
		let idx = NodeIdx(self.nodes.len());
		self.ids.insert(node.id.clone(), idx);
		self.nodes.push(node);
		idx
	}

	/// Arena index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<NodeIdx> {
		self.ids.get(id).copied()
	}

	/// Node at `idx`, if it exists.
	pub fn node(&self, idx: NodeIdx) -> Option<&GraphNode> {
		self.nodes.get(idx.0)
	}

	/// True for a graph built from an empty topology.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Index of the center node; `None` for an empty graph.
	pub fn center(&self) -> Option<NodeIdx> {
		self.nodes
			.iter()
			.position(|n| n.role() == NodeRole::Center)
			.map(NodeIdx)
	}

	/// Renderer-facing view of the current node positions and edges.
	pub fn snapshot(&self) -> GraphSnapshot {
		GraphSnapshot {
			nodes: self
				.nodes
				.iter()
				.map(|n| NodeSnapshot {
					id: n.id.clone(),
					role: n.role(),
					display_index: n.kind.display_index(),
					name: match &n.kind {
						NodeKind::AccessPoint { name, .. } => Some(name.clone()),
						_ => None,
					},
					position: n.position,
				})
				.collect(),
			edges: self
				.edges
				.iter()
				.map(|e| EdgeSnapshot {
					source_id: self.nodes[e.source.0].id.clone(),
					target_id: self.nodes[e.target.0].id.clone(),
					kind: e.kind,
				})
				.collect(),
		}
	}
}

/// Position and labels of one node at snapshot time.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSnapshot {
	/// Node id.
	pub id: String,
	/// Node role.
	pub role: NodeRole,
	/// Scanner index, absent for the center.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub display_index: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	/// Network name of access points.
	pub name: Option<String>,
	/// Graph-space position.
	pub position: Vec2,
}

/// Edge by node ids rather than arena indices.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeSnapshot {
	/// Id of the source node.
	pub source_id: String,
	/// Id of the target node.
	pub target_id: String,
	/// Edge kind.
	pub kind: EdgeKind,
}

/// Serializable copy of a graph, as handed to the renderer.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct GraphSnapshot {
	/// Nodes in arena order.
	pub nodes: Vec<NodeSnapshot>,
	/// Edges in arena order.
	pub edges: Vec<EdgeSnapshot>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::topology::extract;

	const MID: Vec2 = Vec2::new(400.0, 300.0);

	fn sample() -> GraphData {
		GraphData::build(
			&extract("[0] Net_A :\n  [0] aa:bb:cc:dd:ee:ff\n  [1] 11:22:33:44:55:66\n[1] Net_B :\n"),
			MID,
		)
	}

	#[test]
	fn one_edge_per_access_point_and_device() {
		let graph = sample();
		assert_eq!(graph.nodes.len(), 5);
		assert_eq!(graph.edges.len(), 2 + 2);
		let centers = graph.nodes.iter().filter(|n| n.role() == NodeRole::Center).count();
		assert_eq!(centers, 1);
		let kinds: Vec<_> = graph.edges.iter().map(|e| e.kind).collect();
		assert_eq!(
			kinds,
			[
				EdgeKind::CenterToAp,
				EdgeKind::CenterToAp,
				EdgeKind::ApToDevice,
				EdgeKind::ApToDevice
			]
		);
	}

	#[test]
	fn center_is_pinned_at_midpoint() {
		let graph = sample();
		let center = graph.center().and_then(|c| graph.node(c)).unwrap();
		assert_eq!(center.id, CENTER_ID);
		assert_eq!(center.pin, Some(MID));
		assert_eq!(center.position, MID);
	}

	#[test]
	fn device_edges_resolve_to_their_access_point() {
		let graph = sample();
		let net_a = graph.index_of("AP:0").unwrap();
		for edge in graph.edges.iter().filter(|e| e.kind == EdgeKind::ApToDevice) {
			assert_eq!(edge.source, net_a);
			match &graph.nodes[edge.target.0].kind {
				NodeKind::Device { parent, .. } => assert_eq!(*parent, net_a),
				other => panic!("edge target is not a device: {other:?}"),
			}
		}
	}

	#[test]
	fn ids_are_unique() {
		let graph = sample();
		let mut ids: Vec<_> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
		ids.sort();
		ids.dedup();
		assert_eq!(ids.len(), graph.nodes.len());
	}

	#[test]
	fn empty_topology_builds_empty_graph() {
		let graph = GraphData::build(&Topology::default(), MID);
		assert!(graph.is_empty());
		assert!(graph.edges.is_empty());
		assert!(graph.center().is_none());
	}

	#[test]
	fn snapshot_shape() {
		let json = serde_json::to_value(sample().snapshot()).unwrap();
		assert_eq!(json["nodes"][0]["role"], "center");
		assert!(json["nodes"][0].get("name").is_none());
		assert_eq!(json["nodes"][1]["role"], "access-point");
		assert_eq!(json["nodes"][1]["displayIndex"], 0);
		assert_eq!(json["nodes"][1]["name"], "Net_A");
		assert_eq!(json["nodes"][3]["id"], "aa:bb:cc:dd:ee:ff");
		assert_eq!(json["edges"][0]["sourceId"], "CENTER");
		assert_eq!(json["edges"][0]["targetId"], "AP:0");
		assert_eq!(json["edges"][2]["kind"], "ap-to-device");
		assert_eq!(json["nodes"][0]["position"]["x"], 400.0);
	}
}
