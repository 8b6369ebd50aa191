//! Package records as read from a package index.
//!
//! We only interpret the handful of headers that decide test readiness, every other header is
//! kept as-is so a record can be written back out unchanged with [`PackageRecord::dump()`].

use std::collections::HashMap;
use std::sync::OnceLock;

pub mod dependency;

mod packages_file;
pub use packages_file::PackagesFile;

mod index;
pub use index::PackageIndex;
pub use index::PackageMap;

/// One package from a package index.
///
/// Records compare, hash and sort by name and version.
#[derive(Debug)]
pub struct PackageRecord {
	name: String,
	version: String,
	priority: Option<String>,
	depends: Option<String>,
	pre_depends: Option<String>,
	provides_field: Option<String>,
	source: Option<String>,
	uploaders: Option<String>,
	/// Headers without a dedicated field, first occurrence only.
	other: HashMap<String, String>,
	/// The block as read, folded continuation lines included.
	headers: Vec<String>,

	dependencies: OnceLock<Vec<String>>,
	provides: OnceLock<Vec<String>>,
}

impl PackageRecord {
	/// Creates a record from the raw lines of one header block.
	///
	/// When a header appears more than once the first value is used.
	/// # Errors
	/// - [`Parse`](crate::error::Error::Parse) when a line is not a `Name: value` header or
	/// the `Package` or `Version` headers are missing.
	pub fn from_headers(headers: Vec<String>) -> crate::Result<Self> {
		let mut name = None;
		let mut version = None;
		let mut priority = None;
		let mut depends = None;
		let mut pre_depends = None;
		let mut provides_field = None;
		let mut source = None;
		let mut uploaders = None;
		let mut other = HashMap::<String, String>::new();

		for header in &headers {
			let (key, value) = header
				.split_once(':')
				.ok_or_else(|| crate::Error::Parse(format!("header line without a ':' separator: {:?}", header)))?;
			let value = value.trim().to_string();
			let slot = match key.trim() {
				"Package" => &mut name,
				"Version" => &mut version,
				"Priority" => &mut priority,
				"Depends" => &mut depends,
				"Pre-Depends" => &mut pre_depends,
				"Provides" => &mut provides_field,
				"Source" => &mut source,
				"Uploaders" => &mut uploaders,
				key => {
					other.entry(key.to_string()).or_insert(value);
					continue;
				}
			};
			if slot.is_none() {
				*slot = Some(value);
			}
		}

		let name = name.ok_or_else(|| crate::Error::Parse("header block has no Package header".to_string()))?;
		let version = version.ok_or_else(|| crate::Error::Parse(format!("package {} has no Version header", name)))?;

		Ok(PackageRecord {
			name,
			version,
			priority,
			depends,
			pre_depends,
			provides_field,
			source,
			uploaders,
			other,
			headers,
			dependencies: OnceLock::new(),
			provides: OnceLock::new(),
		})
	}

	/* Fields */

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn priority(&self) -> Option<&str> {
		self.priority.as_deref()
	}

	/// Value of any header, recognised or not.
	pub fn header(&self, name: &str) -> Option<&str> {
		match name {
			"Package" => Some(&self.name),
			"Version" => Some(&self.version),
			"Priority" => self.priority.as_deref(),
			"Depends" => self.depends.as_deref(),
			"Pre-Depends" => self.pre_depends.as_deref(),
			"Provides" => self.provides_field.as_deref(),
			"Source" => self.source.as_deref(),
			"Uploaders" => self.uploaders.as_deref(),
			name => self.other.get(name).map(String::as_str),
		}
	}

	/// The source package this binary package was built from.
	///
	/// Binary packages built from a source of the same name usually have no `Source` header,
	/// binNMUs carry the source version after the name, which is dropped.
	pub fn source(&self) -> &str {
		match &self.source {
			Some(source) => source.split_whitespace().next().unwrap_or(&self.name),
			None => &self.name,
		}
	}

	pub fn uploaders(&self) -> &str {
		self.uploaders.as_deref().unwrap_or("")
	}

	/* Relationships */

	/// First-choice names of the `Depends` and `Pre-Depends` headers, without duplicates.
	pub fn dependencies(&self) -> &[String] {
		self.dependencies.get_or_init(|| Self::resolve(&[self.depends.as_deref(), self.pre_depends.as_deref()]))
	}

	/// Names this package can stand in for.
	pub fn provides(&self) -> &[String] {
		self.provides.get_or_init(|| Self::resolve(&[self.provides_field.as_deref()]))
	}

	fn resolve(fields: &[Option<&str>]) -> Vec<String> {
		let mut names = Vec::<String>::new();
		for name in fields.iter().flatten().flat_map(|value| dependency::first_alternatives(value)) {
			if !names.contains(&name) {
				names.push(name);
			}
		}
		names
	}

	/// Required packages are part of every test environment and so are never tested themselves.
	pub fn is_testable(&self) -> bool {
		self.priority.as_deref() != Some("required")
	}

	/// Writes the header block exactly as it was read.
	pub fn dump(&self, output: &mut impl std::io::Write) -> std::io::Result<()> {
		for header in &self.headers {
			output.write_all(header.as_bytes())?;
		}
		Ok(())
	}
}

impl std::hash::Hash for PackageRecord {
	fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
		self.name.hash(state);
		self.version.hash(state);
	}
}

impl std::cmp::Ord for PackageRecord {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		match self.name.cmp(&other.name) {
			std::cmp::Ordering::Equal => self.version.cmp(&other.version),
			ord => ord,
		}
	}
}

impl std::cmp::PartialOrd for PackageRecord {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl std::cmp::PartialEq for PackageRecord {
	fn eq(&self, other: &Self) -> bool {
		self.name == other.name && self.version == other.version
	}
}

impl std::cmp::Eq for PackageRecord {}

impl std::fmt::Display for PackageRecord {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} {}", self.name, self.version)
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn record(lines: &[&str]) -> PackageRecord {
		PackageRecord::from_headers(lines.iter().map(|l| l.to_string()).collect()).unwrap()
	}

	#[test]
	fn dependencies_join_depends_and_pre_depends() {
		let p = record(&["Package: a\n", "Version: 1\n", "Depends: b, c | d\n", "Pre-Depends: b, e\n"]);
		assert_eq!(p.dependencies(), ["b", "c", "e"]);
	}

	#[test]
	fn first_header_occurrence_wins() {
		let p = record(&["Package: a\n", "Version: 1\n", "Version: 2\n", "X-Extra: one\n", "X-Extra: two\n"]);
		assert_eq!(p.version(), "1");
		assert_eq!(p.header("X-Extra"), Some("one"));
	}

	#[test]
	fn required_is_not_testable() {
		assert!(!record(&["Package: a\n", "Version: 1\n", "Priority: required\n"]).is_testable());
		assert!(record(&["Package: a\n", "Version: 1\n", "Priority: important\n"]).is_testable());
		assert!(record(&["Package: a\n", "Version: 1\n"]).is_testable());
	}

	#[test]
	fn source_falls_back_to_name() {
		assert_eq!(record(&["Package: a\n", "Version: 1\n"]).source(), "a");
		assert_eq!(record(&["Package: a\n", "Version: 1+b1\n", "Source: src (1)\n"]).source(), "src");
		assert_eq!(record(&["Package: a\n", "Version: 1\n"]).uploaders(), "");
	}

	#[test]
	fn unparsable_field_keeps_names() {
		let p = record(&["Package: a\n", "Version: 1\n", "Depends: b (>= 1\n", "Pre-Depends: c\n"]);
		assert_eq!(p.dependencies(), ["b", "c"]);
	}

	#[test]
	fn dump_is_verbatim() {
		let lines = ["Package: a\n", "Version: 1\n", "Description: short\n more\n"];
		let mut out = Vec::<u8>::new();
		record(&lines).dump(&mut out).unwrap();
		assert_eq!(String::from_utf8(out).unwrap(), lines.concat());
	}

	#[test] fn missing_package_is_an_error() { assert!(PackageRecord::from_headers(vec!["Version: 1\n".to_string()]).is_err()) }
	#[test] fn missing_colon_is_an_error() { assert!(PackageRecord::from_headers(vec!["Package a\n".to_string()]).is_err()) }
}
