use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{debug, info, warn};
use wasm_bindgen_futures::JsFuture;

use crate::components::force_graph::ForceGraphCanvas;
use crate::topology::{ScanError, Topology, extract_with_report};

/// Capture bundled for the first render, before the user picks a file.
const SAMPLE_SCAN: &str = include_str!("sample_scan.txt");

#[derive(Clone, Debug, PartialEq)]
enum ScanStatus {
	Processing,
	Complete { access_points: usize, devices: usize },
	Demo,
	Warning(String),
	Error(String),
}

impl ScanStatus {
	fn message(&self) -> String {
		match self {
			ScanStatus::Processing => "// INITIATING SCAN: Processing network data...".into(),
			ScanStatus::Complete {
				access_points,
				devices,
			} => format!("// SCAN COMPLETE: Mapped {access_points} APs and {devices} devices"),
			ScanStatus::Demo => {
				"// DEMO MODE: Sample data loaded. Upload your own file for custom analysis.".into()
			}
			ScanStatus::Warning(msg) => format!("// WARNING: {msg}"),
			ScanStatus::Error(msg) => format!("// ERROR: {msg}"),
		}
	}

	fn class(&self) -> &'static str {
		match self {
			ScanStatus::Processing => "scan-status blink-fast",
			ScanStatus::Complete { .. } | ScanStatus::Demo => "scan-status success-text",
			ScanStatus::Warning(_) => "scan-status warning-text",
			ScanStatus::Error(_) => "scan-status error-text",
		}
	}

	fn from_error(err: &ScanError) -> Self {
		match err {
			ScanError::EmptyInput => ScanStatus::Warning(err.to_string()),
			ScanError::FileRead(_) | ScanError::NoFileSelected => ScanStatus::Error(err.to_string()),
		}
	}
}

/// Extracts a capture and rejects one without any access point.
fn load_scan(text: &str) -> Result<Topology, ScanError> {
	let (topology, report) = extract_with_report(text);
	if report.total() > 0 {
		debug!(
			"{} malformed lines, {} orphan devices, {} duplicate ids skipped",
			report.malformed_lines, report.orphan_devices, report.duplicate_ids
		);
	}
	let topology = topology.require_access_points()?;
	debug!(
		"{} APs have connected clients",
		topology.populated_access_points()
	);
	for ap in topology
		.access_points
		.iter()
		.filter(|ap| !ap.connected_device_ids.is_empty())
	{
		debug!(
			"AP {} ({}) has {} clients",
			ap.display_index,
			ap.name,
			ap.connected_device_ids.len()
		);
	}
	Ok(topology)
}

/// Applies a loaded capture to the page, keeping the previous graph on failure.
fn apply_scan(text: &str, topology: RwSignal<Topology>, status: RwSignal<ScanStatus>) -> bool {
	match load_scan(text) {
		Ok(loaded) => {
			info!(
				"Analysis complete: {} access points and {} devices",
				loaded.access_points.len(),
				loaded.devices.len()
			);
			status.set(ScanStatus::Complete {
				access_points: loaded.access_points.len(),
				devices: loaded.devices.len(),
			});
			topology.set(loaded);
			true
		}
		Err(err) => {
			warn!("{err}");
			status.set(ScanStatus::from_error(&err));
			false
		}
	}
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let topology = RwSignal::new(Topology::default());
	let status = RwSignal::new(ScanStatus::Processing);
	let demo = RwSignal::new(true);
	let file_ref = NodeRef::<leptos::html::Input>::new();

	info!("Loading sample data for demonstration");
	if apply_scan(SAMPLE_SCAN, topology, status) {
		status.set(ScanStatus::Demo);
	}

	let on_parse = move |_| {
		let file = file_ref
			.get()
			.and_then(|input| input.files())
			.and_then(|files| files.get(0));
		let Some(file) = file else {
			status.set(ScanStatus::from_error(&ScanError::NoFileSelected));
			return;
		};
		info!("Processing station data from {}", file.name());
		status.set(ScanStatus::Processing);

		spawn_local(async move {
			match JsFuture::from(file.text()).await {
				Ok(text) => {
					let text = text.as_string().unwrap_or_default();
					if apply_scan(&text, topology, status) {
						demo.set(false);
					}
				}
				Err(e) => {
					let err = ScanError::FileRead(format!("{e:?}"));
					warn!("{err}");
					status.set(ScanStatus::from_error(&err));
				}
			}
		});
	};

	view! {
		<div class="fullscreen-graph">
			<ForceGraphCanvas data=topology fullscreen=true />
			<div class="graph-overlay">
				<h1>"WiFi Scan Topology"</h1>
				<p class="subtitle">"Drag nodes to reposition. Scroll to zoom. Drag background to pan."</p>
				<div class="scan-controls">
					<input type="file" node_ref=file_ref accept=".txt,.log" />
					<button on:click=on_parse>"Parse"</button>
				</div>
				<p class=move || status.with(|s| s.class())>{move || status.with(|s| s.message())}</p>
				<Show when=move || demo.get()>
					<div class="demo-badge">"DEMO DATA"</div>
				</Show>
			</div>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sample_scan_loads() {
		let topology = load_scan(SAMPLE_SCAN).unwrap();
		assert_eq!(topology.access_points.len(), 13);
		assert_eq!(topology.devices.len(), 20);
	}

	#[test]
	fn empty_capture_is_a_warning() {
		let err = load_scan("# nothing\n> #stopscan\n").unwrap_err();
		assert_eq!(err, ScanError::EmptyInput);
		let status = ScanStatus::from_error(&err);
		assert_eq!(
			status.message(),
			"// WARNING: No access points found in the log file. Check file format."
		);
		assert_eq!(status.class(), "scan-status warning-text");
	}

	#[test]
	fn completion_message() {
		let status = ScanStatus::Complete {
			access_points: 13,
			devices: 20,
		};
		assert_eq!(status.message(), "// SCAN COMPLETE: Mapped 13 APs and 20 devices");
		assert_eq!(
			ScanStatus::from_error(&ScanError::FileRead("boom".into())).class(),
			"scan-status error-text"
		);
	}
}
