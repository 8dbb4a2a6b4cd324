use log::debug;

use super::config::LayoutConfig;
use super::types::{GraphData, NodeIdx, NodeKind, NodeRole, Vec2};

/// Whether the layout advances on [`Simulation::tick`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// No graph, or stopped by the host.
	Idle,
	/// Ticks move nodes.
	Running,
}

/// Place of a device among the devices of its access point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OrbitSlot {
	sibling: usize,
	siblings: usize,
}

/// Force-directed layout over a [`GraphData`] arena.
///
/// Every tick reads positions from the start of the tick, accumulates spring, charge,
/// centering and collision contributions into a velocity delta per node, then advances
/// all nodes at once. Devices are afterwards placed on an orbit around their access point.
pub struct Simulation {
	graph: GraphData,
	config: LayoutConfig,
	phase: Phase,
	midpoint: Vec2,
	alpha: f64,
	alpha_target: f64,
	/// Seconds of simulation time since the graph was loaded.
	elapsed: f64,
	degrees: Vec<usize>,
	orbits: Vec<Option<OrbitSlot>>,
}

impl Simulation {
	/// Idle simulation with an empty graph centered on `midpoint`.
	pub fn new(config: LayoutConfig, midpoint: Vec2) -> Self {
		Self {
			graph: GraphData::default(),
			alpha: config.alpha_start,
			config,
			phase: Phase::Idle,
			midpoint,
			alpha_target: 0.0,
			elapsed: 0.0,
			degrees: Vec::new(),
			orbits: Vec::new(),
		}
	}

	/// Replaces the graph wholesale and restarts the layout from full energy.
	pub fn load(&mut self, graph: GraphData) {
		self.stop();
		self.degrees = vec![0; graph.nodes.len()];
		for edge in &graph.edges {
			self.degrees[edge.source.0] += 1;
			self.degrees[edge.target.0] += 1;
		}
		self.orbits = orbit_slots(&graph);
		self.graph = graph;
		self.alpha = self.config.alpha_start;
		self.alpha_target = 0.0;
		self.elapsed = 0.0;
		self.pin_center();
		debug!("Simulation loaded {} nodes", self.graph.nodes.len());
		if !self.graph.is_empty() {
			self.start();
		}
	}

	/// Resumes ticking.
	pub fn start(&mut self) {
		self.phase = Phase::Running;
	}

	/// Stops ticking until [`Simulation::start`] or the next [`Simulation::load`].
	pub fn stop(&mut self) {
		self.phase = Phase::Idle;
	}

	/// Current phase.
	pub fn phase(&self) -> Phase {
		self.phase
	}

	/// Whether the phase is [`Phase::Running`].
	pub fn is_running(&self) -> bool {
		self.phase == Phase::Running
	}

	/// The laid-out graph.
	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	/// Constants the layout runs with.
	pub fn config(&self) -> &LayoutConfig {
		&self.config
	}

	/// Current energy.
	pub fn alpha(&self) -> f64 {
		self.alpha
	}

	/// Seconds of simulation time since the last load.
	pub fn elapsed(&self) -> f64 {
		self.elapsed
	}

	/// Centering target and center pin.
	pub fn midpoint(&self) -> Vec2 {
		self.midpoint
	}

	/// Moves the centering target and the center pin, e.g. after a container resize.
	pub fn set_midpoint(&mut self, midpoint: Vec2) {
		self.midpoint = midpoint;
		self.pin_center();
	}

	fn pin_center(&mut self) {
		let midpoint = self.midpoint;
		for node in &mut self.graph.nodes {
			if node.role() == NodeRole::Center {
				node.pin = Some(midpoint);
				node.position = midpoint;
				node.velocity = Vec2::ZERO;
			}
		}
	}

	/// Fixes a node at `position` until [`Simulation::unpin`]. The center cannot be moved.
	pub fn pin(&mut self, idx: NodeIdx, position: Vec2) -> bool {
		match self.graph.nodes.get_mut(idx.0) {
			Some(node) if node.role() != NodeRole::Center => {
				node.pin = Some(position);
				node.position = position;
				node.velocity = Vec2::ZERO;
				true
			}
			_ => false,
		}
	}

	/// Releases a pin. The center stays pinned at the midpoint.
	pub fn unpin(&mut self, idx: NodeIdx) -> bool {
		match self.graph.nodes.get_mut(idx.0) {
			Some(node) if node.role() != NodeRole::Center => {
				node.pin = None;
				true
			}
			_ => false,
		}
	}

	/// Raises the energy target so the layout re-relaxes around a moved node.
	pub fn reheat(&mut self) {
		self.alpha_target = self.config.reheat_target;
		if !self.graph.is_empty() {
			self.start();
		}
	}

	/// Lets the energy decay back towards rest.
	pub fn cool(&mut self) {
		self.alpha_target = 0.0;
	}

	/// Advances the layout by one step of `dt` seconds. Returns whether anything moved.
	pub fn tick(&mut self, dt: f64) -> bool {
		if self.phase == Phase::Idle || self.graph.is_empty() {
			return false;
		}
		self.elapsed += dt;
		self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay();

		let positions: Vec<Vec2> = self
			.graph
			.nodes
			.iter()
			.map(|n| n.pin.unwrap_or(n.position))
			.collect();
		let free: Vec<bool> = (0..positions.len()).map(|i| self.is_free(i)).collect();
		let mut deltas = vec![Vec2::ZERO; positions.len()];

		self.apply_links(&positions, &free, &mut deltas);
		self.apply_charge(&positions, &mut deltas);
		self.apply_centering(&positions, &free, &mut deltas);
		self.apply_collision(&positions, &free, &mut deltas);

		let keep = 1.0 - self.config.velocity_decay;
		for (node, delta) in self.graph.nodes.iter_mut().zip(deltas) {
			if let Some(pin) = node.pin {
				node.position = pin;
				node.velocity = Vec2::ZERO;
			} else {
				node.velocity = (node.velocity + delta) * keep;
				node.position += node.velocity;
			}
		}

		if self.config.orbit_enabled {
			self.apply_orbits();
		}
		true
	}

	fn is_orbiting(&self, i: usize) -> bool {
		self.config.orbit_enabled && self.orbits[i].is_some() && self.graph.nodes[i].pin.is_none()
	}

	/// Whether the physical forces decide where node `i` ends the tick.
	fn is_free(&self, i: usize) -> bool {
		self.graph.nodes[i].pin.is_none() && !self.is_orbiting(i)
	}

	/// Splits a pairwise correction between `a` and `b`. `a_share` applies when both move;
	/// a fixed end hands its share to the other.
	fn shares(free: &[bool], a: usize, b: usize, a_share: f64) -> (f64, f64) {
		match (free[a], free[b]) {
			(true, true) => (a_share, 1.0 - a_share),
			(true, false) => (1.0, 0.0),
			(false, true) => (0.0, 1.0),
			(false, false) => (0.0, 0.0),
		}
	}

	fn apply_links(&self, positions: &[Vec2], free: &[bool], deltas: &mut [Vec2]) {
		for (i, edge) in self.graph.edges.iter().enumerate() {
			let (s, t) = (edge.source.0, edge.target.0);
			// The orbit stands in for the spring of a circling device.
			if self.is_orbiting(s) || self.is_orbiting(t) {
				continue;
			}
			let (d, l2) = separation(positions[s], positions[t], i);
			let l = l2.sqrt();
			let k = (l - self.config.link_distance(edge.kind)) / l
				* self.alpha
				* self.config.link_strength(edge.kind);
			let pull = d * k;
			let bias = self.degrees[s] as f64 / (self.degrees[s] + self.degrees[t]) as f64;
			let (to_source, to_target) = Self::shares(free, s, t, 1.0 - bias);
			deltas[t] += pull * -to_target;
			deltas[s] += pull * to_source;
		}
	}

	fn apply_charge(&self, positions: &[Vec2], deltas: &mut [Vec2]) {
		let min2 = self.config.charge_distance_min * self.config.charge_distance_min;
		for (i, delta) in deltas.iter_mut().enumerate() {
			for (j, other) in self.graph.nodes.iter().enumerate() {
				if i == j {
					continue;
				}
				let (d, l2) = separation(positions[i], positions[j], i * positions.len() + j);
				let strength = self.config.charge(other.role());
				*delta += d * (strength * self.alpha / l2.max(min2));
			}
		}
	}

	/// Translates the force-driven nodes together so their mean drifts to the midpoint.
	fn apply_centering(&self, positions: &[Vec2], free: &[bool], deltas: &mut [Vec2]) {
		let (sum, n) = positions
			.iter()
			.zip(free)
			.filter(|(_, f)| **f)
			.fold((Vec2::ZERO, 0usize), |(acc, n), (&p, _)| (acc + p, n + 1));
		if n == 0 {
			return;
		}
		let mean = sum * (1.0 / n as f64);
		let shift = (self.midpoint - mean) * (self.config.centering_strength * self.alpha);
		for (delta, _) in deltas.iter_mut().zip(free).filter(|(_, f)| **f) {
			*delta += shift;
		}
	}

	fn apply_collision(&self, positions: &[Vec2], free: &[bool], deltas: &mut [Vec2]) {
		let nodes = &self.graph.nodes;
		for i in 0..nodes.len() {
			let ri = self.config.collision_radius(nodes[i].role());
			for j in (i + 1)..nodes.len() {
				let rj = self.config.collision_radius(nodes[j].role());
				let r = ri + rj;
				let (d, l2) = separation(positions[i], positions[j], i * nodes.len() + j);
				if l2 >= r * r {
					continue;
				}
				let l = l2.sqrt();
				let push = d * ((r - l) / l * self.config.collision_strength);
				let (to_i, to_j) = Self::shares(free, i, j, rj * rj / (ri * ri + rj * rj));
				deltas[i] += push * -to_i;
				deltas[j] += push * to_j;
			}
		}
	}

	fn apply_orbits(&mut self) {
		for i in 0..self.graph.nodes.len() {
			let Some(slot) = self.orbits[i] else {
				continue;
			};
			let node = &self.graph.nodes[i];
			let NodeKind::Device { parent, .. } = node.kind else {
				continue;
			};
			if node.pin.is_some() {
				continue;
			}
			let center = self.graph.nodes[parent.0].position;
			let angle = self.config.orbit_angle(self.elapsed, slot.sibling, slot.siblings);
			let radius = self.config.orbit_radius_for(slot.siblings);
			let node = &mut self.graph.nodes[i];
			node.position = center + Vec2::polar(radius, angle);
			node.velocity = Vec2::ZERO;
		}
	}
}

/// Sibling index and sibling count of every device, in arena order.
fn orbit_slots(graph: &GraphData) -> Vec<Option<OrbitSlot>> {
	let mut counts = vec![0usize; graph.nodes.len()];
	let mut slots: Vec<Option<OrbitSlot>> = graph
		.nodes
		.iter()
		.map(|n| match n.kind {
			NodeKind::Device { parent, .. } => {
				let sibling = counts[parent.0];
				counts[parent.0] += 1;
				Some(OrbitSlot { sibling, siblings: 0 })
			}
			_ => None,
		})
		.collect();
	for (slot, node) in slots.iter_mut().zip(&graph.nodes) {
		if let (Some(slot), NodeKind::Device { parent, .. }) = (slot, &node.kind) {
			slot.siblings = counts[parent.0];
		}
	}
	slots
}

/// Vector from `from` to `to` and its squared length, nudged apart deterministically
/// when the two points coincide.
fn separation(from: Vec2, to: Vec2, salt: usize) -> (Vec2, f64) {
	let d = to - from;
	let l2 = d.length_squared();
	if l2 > 0.0 {
		return (d, l2);
	}
	let nudge = Vec2::polar(1e-6, salt as f64);
	(nudge, nudge.length_squared())
}
