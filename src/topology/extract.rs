use std::collections::HashSet;
use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;

use super::types::{AccessPoint, Device, ExtractReport, SkipReason, Topology};

/// Line the scanner prints when a capture is stopped.
const STOP_SENTINEL: &str = "> #stopscan";

/// `[<index>] <name><terminator>`. The terminator is a colon, optionally preceded by a
/// glyph the scanner emits mis-encoded, or a bare replacement character. A separated glyph
/// may be any non-alphanumeric mark; one glued to the name must be U+FFFD or its Latin-1
/// mojibake.
static ACCESS_POINT: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(concat!(
		r"^\[(\d+)\]\s+(.+?)",
		r"(?:\s+(?:ï¿½|[^\p{Alphabetic}\p{Nd}\s:])+|\s*(?:ï¿½|\x{FFFD})+)?",
		r"\s*(?::|\x{FFFD})$",
	))
	.expect("access point pattern is valid")
});

/// Indented `[<index>] <mac>`, optionally followed by any text not continuing the MAC.
static DEVICE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s+\[(\d+)\]\s+((?:[0-9A-Fa-f]{1,2}:)+[0-9A-Fa-f]{1,2})(?:[^0-9A-Fa-f].*)?$")
		.expect("device pattern is valid")
});

/// Indented line whose first token starts like a MAC. Never an access point.
static DEVICE_LIKE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^\s+\[\d+\]\s+[0-9A-Fa-f]{1,2}:").expect("device prefix pattern is valid")
});

/// Parses a scanner station listing into access points and their devices.
///
/// Never fails: lines that match nothing are skipped.
pub fn extract(text: &str) -> Topology {
	extract_with_report(text).0
}

/// Like [`extract`], also returning counts of the lines that were passed over.
pub fn extract_with_report(text: &str) -> (Topology, ExtractReport) {
	let mut topology = Topology::default();
	let mut report = ExtractReport::default();
	let mut seen_ids = HashSet::new();
	// Position of the access point that indented device lines attach to.
	let mut current: Option<usize> = None;

	for (line_no, raw) in text.lines().enumerate().map(|(i, l)| (i + 1, l)) {
		let line = raw.trim();
		if line.is_empty() || line.starts_with('#') || line == STOP_SENTINEL {
			continue;
		}

		let outcome = if DEVICE_LIKE.is_match(raw) {
			device_line(raw.trim_end(), current, &mut topology, &mut seen_ids)
		} else if let Some(caps) = ACCESS_POINT.captures(line) {
			match caps[1].parse::<u32>() {
				Ok(index) => {
					let ap = AccessPoint::new(index, caps[2].trim());
					if seen_ids.insert(ap.id.clone()) {
						current = Some(topology.access_points.len());
						topology.access_points.push(ap);
						Ok(())
					} else {
						current = None;
						Err(SkipReason::DuplicateId)
					}
				}
				Err(_) => Err(SkipReason::MalformedLine),
			}
		} else {
			Err(SkipReason::MalformedLine)
		};

		if let Err(reason) = outcome {
			debug!("line {line_no} skipped ({reason:?}): {line}");
			report.record(reason);
		}
	}

	info!(
		"Parsed {} APs and {} devices ({} lines skipped)",
		topology.access_points.len(),
		topology.devices.len(),
		report.total()
	);
	(topology, report)
}

fn device_line(
	line: &str,
	current: Option<usize>,
	topology: &mut Topology,
	seen_ids: &mut HashSet<String>,
) -> Result<(), SkipReason> {
	let caps = DEVICE.captures(line).ok_or(SkipReason::MalformedLine)?;
	let display_index = caps[1]
		.parse::<u32>()
		.map_err(|_| SkipReason::MalformedLine)?;
	let ap = current
		.and_then(|i| topology.access_points.get_mut(i))
		.ok_or(SkipReason::OrphanDevice)?;

	let mac = &caps[2];
	let id = mac.to_ascii_lowercase();
	if !seen_ids.insert(id.clone()) {
		return Err(SkipReason::DuplicateId);
	}
	ap.connected_device_ids.push(id.clone());
	topology.devices.push(Device {
		id,
		display_index,
		mac_address: mac.to_string(),
		parent_access_point_id: ap.id.clone(),
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = include_str!("../pages/sample_scan.txt");

	#[test]
	fn two_networks_one_client() {
		let topo = extract("[0] Net_A :\n  [0] aa:bb:cc:dd:ee:ff\n[1] Net_B :\n");
		assert_eq!(topo.access_points.len(), 2);
		assert_eq!(topo.access_points[0].name, "Net_A");
		assert_eq!(topo.access_points[0].id, "AP:0");
		assert_eq!(
			topo.access_points[0].connected_device_ids,
			vec!["aa:bb:cc:dd:ee:ff".to_string()]
		);
		assert_eq!(topo.access_points[1].name, "Net_B");
		assert!(topo.access_points[1].connected_device_ids.is_empty());
		assert_eq!(topo.devices.len(), 1);
		assert_eq!(topo.devices[0].parent_access_point_id, "AP:0");
		assert_eq!(topo.devices[0].display_index, 0);
	}

	#[test]
	fn bundled_sample_scan() {
		let (topo, report) = extract_with_report(SAMPLE);
		assert_eq!(topo.access_points.len(), 13);
		assert_eq!(topo.devices.len(), 20);
		assert_eq!(topo.access_points[0].name, "CoffeeShop_WiFi");
		assert_eq!(topo.access_points[3].connected_device_ids.len(), 4);
		assert_eq!(topo.populated_access_points(), 9);
		// "0 selected", "Stopping WiFi tran/recv" and the bare prompt.
		assert_eq!(report.malformed_lines, 3);
		assert_eq!(report.orphan_devices, 0);
	}

	#[test]
	fn terminator_variants() {
		let text = "[0] Plain:\n[1] Spaced :\n[2] Glyph \u{FFFD}:\n[3] Mojibake ï¿½:\n[4] Bare \u{FFFD}\n[5] Hotel Guest (5G) \u{FFFD}:\n";
		let names: Vec<_> = extract(text)
			.access_points
			.into_iter()
			.map(|ap| ap.name)
			.collect();
		assert_eq!(
			names,
			["Plain", "Spaced", "Glyph", "Mojibake", "Bare", "Hotel Guest (5G)"]
		);
	}

	#[test]
	fn unterminated_title_is_not_an_access_point() {
		let (topo, report) = extract_with_report("[0] NoColon\n  [0] aa:bb:cc:dd:ee:ff\n");
		assert!(topo.is_empty());
		assert!(topo.devices.is_empty());
		assert_eq!(report.malformed_lines, 1);
		assert_eq!(report.orphan_devices, 1);
	}

	#[test]
	fn orphan_devices_are_dropped() {
		let (topo, report) = extract_with_report("  [0] aa:bb:cc:dd:ee:ff\n[0] Net :\n");
		assert_eq!(topo.access_points.len(), 1);
		assert!(topo.devices.is_empty());
		assert!(topo.access_points[0].connected_device_ids.is_empty());
		assert_eq!(report.orphan_devices, 1);
	}

	#[test]
	fn comments_sentinel_and_blank_lines_are_ignored() {
		let (topo, report) = extract_with_report("#list -c\n\n   \n> #stopscan\n[0] Net :\n");
		assert_eq!(topo.access_points.len(), 1);
		assert_eq!(report, ExtractReport::default());
	}

	#[test]
	fn no_access_points_yields_empty_topology() {
		let topo = extract("garbage\n  nothing here\n0 selected\n");
		assert_eq!(topo, Topology::default());
		assert_eq!(topo.require_access_points(), Err(super::super::ScanError::EmptyInput));
	}

	#[test]
	fn device_lines_need_indentation() {
		let (topo, report) = extract_with_report("[0] Net :\n[1] aa:bb:cc:dd:ee:ff\n");
		assert!(topo.devices.is_empty());
		assert_eq!(report.malformed_lines, 1);
	}

	#[test]
	fn device_trailing_text_and_case() {
		let topo = extract("[2] Net :\n\t[7] AA:BB:CC:DD:EE:01 -67dBm ch 6\n");
		assert_eq!(topo.devices[0].id, "aa:bb:cc:dd:ee:01");
		assert_eq!(topo.devices[0].mac_address, "AA:BB:CC:DD:EE:01");
		assert_eq!(topo.devices[0].display_index, 7);
		assert_eq!(topo.devices[0].parent_access_point_id, "AP:2");
	}

	#[test]
	fn duplicate_access_point_is_rejected_with_its_clients() {
		let text = "[0] First :\n  [0] aa:aa:aa:aa:aa:aa\n[0] Second :\n  [1] bb:bb:bb:bb:bb:bb\n[1] Third :\n  [2] cc:cc:cc:cc:cc:cc\n";
		let (topo, report) = extract_with_report(text);
		let names: Vec<_> = topo.access_points.iter().map(|ap| ap.name.as_str()).collect();
		assert_eq!(names, ["First", "Third"]);
		assert_eq!(topo.devices.len(), 2);
		assert_eq!(topo.devices[1].parent_access_point_id, "AP:1");
		assert_eq!(report.duplicate_ids, 1);
		assert_eq!(report.orphan_devices, 1);
	}

	#[test]
	fn duplicate_device_mac_is_rejected() {
		let text = "[0] A :\n  [0] aa:aa:aa:aa:aa:aa\n[1] B :\n  [1] AA:AA:AA:AA:AA:AA\n";
		let (topo, report) = extract_with_report(text);
		assert_eq!(topo.devices.len(), 1);
		assert!(topo.access_points[1].connected_device_ids.is_empty());
		assert_eq!(report.duplicate_ids, 1);
	}

	#[test]
	fn crlf_input() {
		let topo = extract("[0] Net :\r\n  [0] aa:bb:cc:dd:ee:ff\r\n");
		assert_eq!(topo.access_points[0].name, "Net");
		assert_eq!(topo.devices.len(), 1);
	}

	#[test]
	fn device_trailing_text_without_space() {
		for line in ["  [0] aa:bb:cc:dd:ee:ff,", "  [0] aa:bb:cc:dd:ee:ff(Apple)"] {
			let (topo, report) = extract_with_report(&format!("[0] Net :\n{line}\n"));
			assert_eq!(topo.devices.len(), 1, "{line}");
			assert_eq!(topo.devices[0].mac_address, "aa:bb:cc:dd:ee:ff");
			assert_eq!(report.total(), 0);
		}
	}

	#[test]
	fn device_with_trailing_colon_stays_under_its_access_point() {
		let text = "[0] Net :\n  [0] aa:bb:cc:dd:ee:ff:\n  [1] 11:22:33:44:55:66\n";
		let (topo, report) = extract_with_report(text);
		assert_eq!(topo.access_points.len(), 1);
		assert_eq!(topo.access_points[0].connected_device_ids.len(), 2);
		assert_eq!(topo.devices[0].mac_address, "aa:bb:cc:dd:ee:ff");
		assert_eq!(report, ExtractReport::default());
	}

	#[test]
	fn indented_mac_prefix_is_never_an_access_point() {
		let text = "[0] Net :\n  [0] ff:\n  [1] 11:22:33:44:55:66\n";
		let (topo, report) = extract_with_report(text);
		assert_eq!(topo.access_points.len(), 1);
		assert_eq!(topo.devices.len(), 1);
		assert_eq!(topo.devices[0].parent_access_point_id, "AP:0");
		assert_eq!(report.malformed_lines, 1);
	}
}
