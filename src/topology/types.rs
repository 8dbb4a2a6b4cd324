use super::error::ScanError;

/// A discovered wireless network and the ids of the clients seen under it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPoint {
	/// `AP:<display_index>`.
	pub id: String,
	/// Index the scanner printed in brackets.
	pub display_index: u32,
	/// Network name with the terminator stripped.
	pub name: String,
	/// Ids of the devices listed under this network, in order.
	pub connected_device_ids: Vec<String>,
}

impl AccessPoint {
	pub(crate) fn new(display_index: u32, name: &str) -> Self {
		Self {
			id: Self::id_for(display_index),
			display_index,
			name: name.to_string(),
			connected_device_ids: Vec::new(),
		}
	}

	/// Derived id for the access point listed under `[display_index]`.
	pub fn id_for(display_index: u32) -> String {
		format!("AP:{display_index}")
	}
}

/// A client device associated with an access point.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Device {
	/// Lower-cased MAC address.
	pub id: String,
	/// Index the scanner printed in brackets.
	pub display_index: u32,
	/// MAC address as printed.
	pub mac_address: String,
	/// Id of the access point the device was listed under.
	pub parent_access_point_id: String,
}

/// Everything one extraction pass found, in encounter order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Topology {
	/// Networks in listing order.
	pub access_points: Vec<AccessPoint>,
	/// Clients in listing order.
	pub devices: Vec<Device>,
}

impl Topology {
	/// True when no access point was found.
	pub fn is_empty(&self) -> bool {
		self.access_points.is_empty()
	}

	/// Number of access points with at least one client.
	pub fn populated_access_points(&self) -> usize {
		self.access_points
			.iter()
			.filter(|ap| !ap.connected_device_ids.is_empty())
			.count()
	}

	/// Turns a scan without any access point into [`ScanError::EmptyInput`].
	pub fn require_access_points(self) -> Result<Self, ScanError> {
		if self.is_empty() {
			return Err(ScanError::EmptyInput);
		}
		Ok(self)
	}
}

/// Why a non-blank line contributed nothing to the topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
	/// Matches neither an access point nor a device.
	MalformedLine,
	/// Device line before any accepted access point.
	OrphanDevice,
	/// Id already taken by an earlier access point or device.
	DuplicateId,
}

/// Counts of lines the extractor passed over.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractReport {
	/// See [`SkipReason::MalformedLine`].
	pub malformed_lines: usize,
	/// See [`SkipReason::OrphanDevice`].
	pub orphan_devices: usize,
	/// See [`SkipReason::DuplicateId`].
	pub duplicate_ids: usize,
}

impl ExtractReport {
	pub(crate) fn record(&mut self, reason: SkipReason) {
		match reason {
			SkipReason::MalformedLine => self.malformed_lines += 1,
			SkipReason::OrphanDevice => self.orphan_devices += 1,
			SkipReason::DuplicateId => self.duplicate_ids += 1,
		}
	}

	/// All skipped lines.
	pub fn total(&self) -> usize {
		self.malformed_lines + self.orphan_devices + self.duplicate_ids
	}
}
