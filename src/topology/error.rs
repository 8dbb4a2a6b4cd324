use thiserror::Error;

/// Failures a caller of the extractor has to report to the user.
///
/// Extraction itself never fails; these are raised at the loading boundary.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ScanError {
	/// The capture holds no access point.
	#[error("No access points found in the log file. Check file format.")]
	EmptyInput,
	/// The browser could not read the selected file.
	#[error("Scan failed while reading the file: {0}")]
	FileRead(String),
	/// Parse was requested without a file.
	#[error("No log file selected. Please select a station list file to continue.")]
	NoFileSelected,
}
