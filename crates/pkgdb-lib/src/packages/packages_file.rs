use std::io::BufRead;
use std::sync::Arc;

use super::PackageRecord;

/// Reads the lines of one RFC822-like header block.
///
/// Lines starting with whitespace continue the previous header. Blank lines before the block are
/// skipped, the block ends at the next blank line or the end of input. An empty result means the
/// input is exhausted.
fn read_header_block(input: &mut impl BufRead) -> std::io::Result<Vec<String>> {
	let mut headers = Vec::<String>::new();
	loop {
		let mut line = String::new();
		if input.read_line(&mut line)? == 0 {
			break;
		}
		if line == "\n" || line == "\r\n" {
			if headers.is_empty() {
				continue;
			}
			break;
		}
		if line.starts_with(char::is_whitespace) {
			if let Some(last) = headers.last_mut() {
				last.push_str(&line);
				continue;
			}
		}
		headers.push(line);
	}
	Ok(headers)
}

/// One package index input, such as a `Packages` file of an archive.
#[derive(Debug, Default)]
pub struct PackagesFile {
	packages: Vec<Arc<PackageRecord>>,
}

impl PackagesFile {
	/// Parses every header block of `input`.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when reading from `input`.
	/// - [`Parse`](crate::error::Error::Parse) when a block is not a valid package record.
	pub fn read_from(mut input: impl BufRead) -> crate::Result<Self> {
		let mut packages = Vec::<Arc<PackageRecord>>::new();
		loop {
			let headers = read_header_block(&mut input)?;
			if headers.is_empty() {
				break;
			}
			packages.push(Arc::new(PackageRecord::from_headers(headers)?));
		}
		log::debug!("Read {} package records", packages.len());
		Ok(PackagesFile { packages })
	}

	/// Opens and parses an index file, decompressing it first when the name ends in `.gz`.
	pub fn from_path(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
		let path = path.as_ref();
		log::debug!("Reading package index {}", path.display());
		let file = std::fs::File::open(path)?;
		if path.extension().map_or(false, |ext| ext == "gz") {
			Self::read_from(std::io::BufReader::new(flate2::read::GzDecoder::new(file)))
		} else {
			Self::read_from(std::io::BufReader::new(file))
		}
	}

	/// Records in the order they appear in the input.
	pub fn packages(&self) -> &[Arc<PackageRecord>] {
		&self.packages
	}

	/// The last record with the given name, matching how records are merged into an index.
	pub fn get(&self, name: &str) -> Option<&Arc<PackageRecord>> {
		self.packages.iter().rev().find(|p| p.name() == name)
	}

	pub fn len(&self) -> usize {
		self.packages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.packages.is_empty()
	}
}
