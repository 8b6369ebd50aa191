//! Layout of the log directory tree.

use serde::{Serialize, Deserialize};

/// Names of the log subdirectories for each outcome category.
///
/// Every name is joined onto [`prefix`](PkgDbOptions::prefix) when one is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PkgDbOptions {
	prefix: Option<std::path::PathBuf>,
	ok: String,
	fail: String,
	untestable: String,
	reserved: String,
	/// Logs of packages thought to be fixed but not verified yet.
	more_ok: Vec<String>,
	/// Logs of packages flagged as failing by hand.
	more_fail: Vec<String>,
}

impl Default for PkgDbOptions {
	fn default() -> Self {
		Self {
			prefix: None,
			ok: "pass".to_string(),
			fail: "fail".to_string(),
			untestable: "untestable".to_string(),
			reserved: "reserved".to_string(),
			more_ok: vec!["fixed".to_string()],
			more_fail: vec!["bugged".to_string()],
		}
	}
}

impl PkgDbOptions {
	/// Reads options from a JSON file, keys missing from the file keep their defaults.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when opening or reading from the file.
	/// - [`SerdeJSON`](crate::error::Error::SerdeJSON) when deserializing the file.
	pub fn load_from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let file = std::fs::File::open(path)?;
		Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
	}

	pub fn prefix(&self) -> Option<&std::path::Path> {
		self.prefix.as_deref()
	}
	pub fn set_prefix(&mut self, prefix: Option<std::path::PathBuf>) {
		self.prefix = prefix;
	}

	pub fn ok(&self) -> &str {
		&self.ok
	}
	pub fn set_ok(&mut self, ok: impl Into<String>) {
		self.ok = ok.into();
	}

	pub fn fail(&self) -> &str {
		&self.fail
	}
	pub fn set_fail(&mut self, fail: impl Into<String>) {
		self.fail = fail.into();
	}

	pub fn untestable(&self) -> &str {
		&self.untestable
	}
	pub fn set_untestable(&mut self, untestable: impl Into<String>) {
		self.untestable = untestable.into();
	}

	pub fn reserved(&self) -> &str {
		&self.reserved
	}
	pub fn set_reserved(&mut self, reserved: impl Into<String>) {
		self.reserved = reserved.into();
	}

	pub fn more_ok(&self) -> &[String] {
		&self.more_ok
	}
	pub fn set_more_ok(&mut self, more_ok: Vec<String>) {
		self.more_ok = more_ok;
	}

	pub fn more_fail(&self) -> &[String] {
		&self.more_fail
	}
	pub fn set_more_fail(&mut self, more_fail: Vec<String>) {
		self.more_fail = more_fail;
	}

	/// Joins a subdirectory name onto the prefix.
	pub fn subdir_path(&self, name: &str) -> std::path::PathBuf {
		match &self.prefix {
			Some(prefix) => prefix.join(name),
			None => std::path::PathBuf::from(name),
		}
	}
}
