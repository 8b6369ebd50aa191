//! Various helper functions for testing
//!
//! Everything here works on throw-away directories that are deleted when the [`LogTree`] is dropped.

use pkgdb::{PackagesDB, PackagesFile, PkgDbOptions};

/// Parses an index from text.
pub fn packages_file(text: &str) -> PackagesFile {
	PackagesFile::read_from(text.as_bytes()).expect("test index should be valid")
}

/// Builds one index block from a name, version and extra headers.
pub fn stanza(name: &str, version: &str, headers: &[(&str, &str)]) -> String {
	let mut s = format!("Package: {}\nVersion: {}\n", name, version);
	for (header, value) in headers {
		s += &format!("{}: {}\n", header, value);
	}
	s + "\n"
}

/// A temporary log tree using the default category names.
pub struct LogTree {
	dir: tempfile::TempDir,
}

impl LogTree {
	pub fn new() -> Self {
		let _ = env_logger::builder().is_test(true).try_init();
		Self { dir: tempfile::tempdir().expect("failed to create temporary directory") }
	}

	pub fn path(&self) -> &std::path::Path {
		self.dir.path()
	}

	pub fn options(&self) -> PkgDbOptions {
		let mut options = PkgDbOptions::default();
		options.set_prefix(Some(self.path().to_path_buf()));
		options
	}

	/// A database over this tree with the given index, subdirectories created.
	pub fn packages_db(&self, index: &str) -> PackagesDB {
		let mut db = PackagesDB::new(self.options());
		db.create_subdirs().expect("failed to create log directories");
		db.read_packages_file(packages_file(index));
		db
	}

	/// Drops a log into a category directory behind the database's back.
	pub fn write_log(&self, subdir: &str, package: &str, version: &str, contents: &str) {
		let dir = self.path().join(subdir);
		std::fs::create_dir_all(&dir).expect("failed to create log directory");
		std::fs::write(dir.join(format!("{}_{}.log", package, version)), contents).expect("failed to write log");
	}

	pub fn log_exists(&self, subdir: &str, package: &str, version: &str) -> bool {
		self.path().join(subdir).join(format!("{}_{}.log", package, version)).exists()
	}

	pub fn read_log(&self, subdir: &str, package: &str, version: &str) -> String {
		std::fs::read_to_string(self.path().join(subdir).join(format!("{}_{}.log", package, version))).expect("failed to read log")
	}

	/// Number of files in a category directory.
	pub fn count(&self, subdir: &str) -> usize {
		std::fs::read_dir(self.path().join(subdir)).map(|d| d.count()).unwrap_or(0)
	}
}

impl Default for LogTree {
	fn default() -> Self {
		Self::new()
	}
}
