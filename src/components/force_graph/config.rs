use std::f64::consts::{PI, TAU};

use serde::Deserialize;

use super::types::{EdgeKind, NodeRole};

/// Physical constants of the layout and limits of the view.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
	/// Rest length of center to access point links.
	pub center_link_distance: f64,
	/// Rest length of access point to device links.
	pub device_link_distance: f64,
	/// Spring strength of center to access point links.
	pub center_link_strength: f64,
	/// Spring strength of access point to device links.
	pub device_link_strength: f64,

	/// Charge of the center node; negative repels.
	pub center_charge: f64,
	/// Charge of access point nodes.
	pub access_point_charge: f64,
	/// Charge of device nodes.
	pub device_charge: f64,
	/// Pairs closer than this are treated as this far apart by the charge force.
	pub charge_distance_min: f64,

	/// Collision radius of the center node.
	pub center_radius: f64,
	/// Collision radius of access point nodes.
	pub access_point_radius: f64,
	/// Collision radius of device nodes.
	pub device_radius: f64,
	/// Fraction of an overlap resolved per tick.
	pub collision_strength: f64,

	/// Pull of the freely moving nodes' mean towards the midpoint.
	pub centering_strength: f64,

	/// Energy right after a graph is loaded.
	pub alpha_start: f64,
	/// Energy reached after `settle_ticks` ticks without interaction.
	pub alpha_min: f64,
	/// Ticks the energy takes to decay from `alpha_start` to `alpha_min`.
	pub settle_ticks: u32,
	/// Energy target while a node is being dragged.
	pub reheat_target: f64,
	/// Fraction of velocity lost per tick.
	pub velocity_decay: f64,

	/// Places devices on a circle around their access point every tick.
	pub orbit_enabled: bool,
	/// Smallest orbit radius; crowded orbits grow so siblings do not overlap.
	pub orbit_radius: f64,
	/// Radians per second of simulation time.
	pub orbit_speed: f64,

	/// Lowest zoom factor.
	pub zoom_min: f64,
	/// Highest zoom factor.
	pub zoom_max: f64,
	/// Text drawn next to the center node.
	pub center_label: String,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			center_link_distance: 150.0,
			device_link_distance: 50.0,
			center_link_strength: 0.7,
			device_link_strength: 0.9,
			center_charge: -500.0,
			access_point_charge: -200.0,
			device_charge: -30.0,
			charge_distance_min: 1.0,
			center_radius: 25.0,
			access_point_radius: 15.0,
			device_radius: 5.0,
			collision_strength: 1.0,
			centering_strength: 0.05,
			alpha_start: 1.0,
			alpha_min: 0.001,
			settle_ticks: 300,
			reheat_target: 0.3,
			velocity_decay: 0.4,
			orbit_enabled: true,
			orbit_radius: 30.0,
			orbit_speed: 0.5,
			zoom_min: 0.1,
			zoom_max: 5.0,
			center_label: "SCANNER".to_string(),
		}
	}
}

impl LayoutConfig {
	/// Rest length of a link.
	pub fn link_distance(&self, kind: EdgeKind) -> f64 {
		match kind {
			EdgeKind::CenterToAp => self.center_link_distance,
			EdgeKind::ApToDevice => self.device_link_distance,
		}
	}

	/// Spring strength of a link.
	pub fn link_strength(&self, kind: EdgeKind) -> f64 {
		match kind {
			EdgeKind::CenterToAp => self.center_link_strength,
			EdgeKind::ApToDevice => self.device_link_strength,
		}
	}

	/// Charge a node of `role` exerts on every other node.
	pub fn charge(&self, role: NodeRole) -> f64 {
		match role {
			NodeRole::Center => self.center_charge,
			NodeRole::AccessPoint => self.access_point_charge,
			NodeRole::Device => self.device_charge,
		}
	}

	/// Collision radius of a node of `role`.
	pub fn collision_radius(&self, role: NodeRole) -> f64 {
		match role {
			NodeRole::Center => self.center_radius,
			NodeRole::AccessPoint => self.access_point_radius,
			NodeRole::Device => self.device_radius,
		}
	}

	/// Per-tick fraction by which the energy approaches its target.
	pub fn alpha_decay(&self) -> f64 {
		let ticks = f64::from(self.settle_ticks.max(1));
		1.0 - (self.alpha_min / self.alpha_start).powf(1.0 / ticks)
	}

	/// Angle of the `sibling`-th of `siblings` devices on their orbit after `elapsed`
	/// seconds of simulation time. Siblings are spread evenly around the circle.
	pub fn orbit_angle(&self, elapsed: f64, sibling: usize, siblings: usize) -> f64 {
		let spread = TAU * sibling as f64 / siblings.max(1) as f64;
		(elapsed * self.orbit_speed + spread).rem_euclid(TAU)
	}

	/// Orbit radius for an access point with `siblings` devices: wide enough that
	/// neighbouring devices and the access point itself keep their collision distance.
	pub fn orbit_radius_for(&self, siblings: usize) -> f64 {
		let clear_parent = self.access_point_radius + self.device_radius;
		let clear_siblings = if siblings >= 2 {
			self.device_radius / (PI / siblings as f64).sin() * 1.05
		} else {
			0.0
		};
		self.orbit_radius.max(clear_parent).max(clear_siblings)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_falls_back_to_defaults() {
		let cfg: LayoutConfig =
			serde_json::from_str(r#"{ "orbit_radius": 42.0, "center_label": "FLIPPER" }"#).unwrap();
		assert_eq!(cfg.orbit_radius, 42.0);
		assert_eq!(cfg.center_label, "FLIPPER");
		assert_eq!(cfg.center_link_distance, 150.0);
	}

	#[test]
	fn role_dependent_constants_are_ordered() {
		let cfg = LayoutConfig::default();
		assert!(cfg.charge(NodeRole::Center) < cfg.charge(NodeRole::AccessPoint));
		assert!(cfg.charge(NodeRole::AccessPoint) < cfg.charge(NodeRole::Device));
		assert!(cfg.collision_radius(NodeRole::Center) > cfg.collision_radius(NodeRole::AccessPoint));
		assert!(
			cfg.link_distance(EdgeKind::CenterToAp) > cfg.link_distance(EdgeKind::ApToDevice)
		);
	}

	#[test]
	fn orbit_angle_spreads_siblings_and_wraps() {
		let cfg = LayoutConfig::default();
		assert_eq!(cfg.orbit_angle(3.0, 2, 5), cfg.orbit_angle(3.0, 2, 5));
		assert!((cfg.orbit_angle(0.0, 1, 4) - TAU / 4.0).abs() < 1e-12);
		let a = cfg.orbit_angle(1000.0, 7, 8);
		assert!((0.0..TAU).contains(&a));
	}

	#[test]
	fn crowded_orbits_grow() {
		let cfg = LayoutConfig::default();
		assert_eq!(cfg.orbit_radius_for(1), 30.0);
		assert_eq!(cfg.orbit_radius_for(8), 30.0);
		for n in [19, 25, 60] {
			let r = cfg.orbit_radius_for(n);
			let chord = 2.0 * r * (PI / n as f64).sin();
			assert!(chord >= 2.0 * cfg.device_radius, "{n} siblings: chord {chord}");
		}
	}

	#[test]
	fn energy_decay_follows_alpha_min() {
		let cfg = LayoutConfig::default();
		let rest = (0..cfg.settle_ticks).fold(cfg.alpha_start, |a, _| a * (1.0 - cfg.alpha_decay()));
		assert!((rest - cfg.alpha_min).abs() < 1e-9);

		let slow: LayoutConfig = serde_json::from_str(r#"{ "alpha_min": 0.1 }"#).unwrap();
		assert!(slow.alpha_decay() < cfg.alpha_decay());
	}
}
