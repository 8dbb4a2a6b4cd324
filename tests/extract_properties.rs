use proptest::prelude::*;
use wifi_scan_graph::components::force_graph::{GraphData, NodeRole, Vec2};
use wifi_scan_graph::topology::{Topology, extract};

const NOISE: &[&str] = &[
	"",
	"   ",
	"#list -c",
	"0 selected",
	"> #stopscan",
	"Stopping WiFi tran/recv",
	">",
	"  [3] not-a-mac",
];

const TERMINATORS: &[&str] = &[":", " :", " \u{FFFD}:", "\u{FFFD}:"];

#[derive(Clone, Debug)]
struct Network {
	name: String,
	terminator: usize,
	devices: usize,
	noise: Vec<usize>,
}

fn network() -> impl Strategy<Value = Network> {
	(
		"[A-Za-z][A-Za-z0-9_]{0,12}",
		0..TERMINATORS.len(),
		0usize..6,
		prop::collection::vec(0..NOISE.len(), 0..3),
	)
		.prop_map(|(name, terminator, devices, noise)| Network {
			name,
			terminator,
			devices,
			noise,
		})
}

/// Renders networks as a listing with unique indices and MACs, noise after each device
/// block.
fn render(networks: &[Network], leading_orphans: usize) -> String {
	let mut out = String::new();
	let mut mac = 0u32;
	for _ in 0..leading_orphans {
		mac += 1;
		out.push_str(&format!("  [{mac}] 02:00:00:00:{:02x}:{:02x}\n", mac >> 8, mac & 0xff));
	}
	for (i, net) in networks.iter().enumerate() {
		out.push_str(&format!("[{i}] {}{}\n", net.name, TERMINATORS[net.terminator]));
		for _ in 0..net.devices {
			mac += 1;
			out.push_str(&format!("  [{mac}] 02:00:00:00:{:02x}:{:02x}\n", mac >> 8, mac & 0xff));
		}
		for &n in &net.noise {
			out.push_str(NOISE[n]);
			out.push('\n');
		}
	}
	out
}

proptest! {
	#[test]
	fn extraction_is_idempotent(text in "(\\PC{0,40}\n){0,20}") {
		prop_assert_eq!(extract(&text), extract(&text));
	}

	#[test]
	fn device_counts_match_lines_under_each_access_point(
		networks in prop::collection::vec(network(), 0..12),
		leading_orphans in 0usize..4,
	) {
		let topo = extract(&render(&networks, leading_orphans));
		prop_assert_eq!(topo.access_points.len(), networks.len());
		for (ap, net) in topo.access_points.iter().zip(&networks) {
			prop_assert_eq!(&ap.name, &net.name);
			prop_assert_eq!(ap.connected_device_ids.len(), net.devices);
		}
		let total: usize = networks.iter().map(|n| n.devices).sum();
		prop_assert_eq!(topo.devices.len(), total);
		for device in &topo.devices {
			prop_assert!(topo.access_points.iter().any(|ap| ap.id == device.parent_access_point_id));
		}
	}

	#[test]
	fn listings_without_access_points_are_empty(noise in prop::collection::vec(0..NOISE.len(), 0..20)) {
		let text: String = noise.iter().map(|&n| format!("{}\n", NOISE[n])).collect();
		prop_assert_eq!(extract(&text), Topology::default());
	}

	#[test]
	fn graph_has_one_center_and_an_edge_per_record(
		networks in prop::collection::vec(network(), 1..10),
	) {
		let topo = extract(&render(&networks, 0));
		let graph = GraphData::build(&topo, Vec2::new(320.0, 240.0));
		prop_assert_eq!(graph.edges.len(), topo.access_points.len() + topo.devices.len());
		let centers = graph.nodes.iter().filter(|n| n.role() == NodeRole::Center).count();
		prop_assert_eq!(centers, 1);
	}
}
