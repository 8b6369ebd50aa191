//! # Log storage
//!
//! Test logs are plain files named `<package>_<version>.log`, the subdirectory a log lives in
//! records the outcome. Any number of processes may share one log tree without talking to each
//! other, [`LogDB::create()`] is the only synchronisation they need: of any processes creating the
//! same log exactly one succeeds.
//!
//! Existence checks and directory listings are cached for the lifetime of a [`LogDB`], changes
//! made through the same instance are reflected in the cache but changes made by other
//! processes are not. Call [`LogDB::clear_cache()`] before starting over.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::packages::PackageRecord;

/// A log filename split into package name and version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogName {
	pub package: String,
	pub version: String,
}

impl LogName {
	pub fn new(package: impl Into<String>, version: impl Into<String>) -> Self {
		Self { package: package.into(), version: version.into() }
	}

	/// Splits a filename on its first `_`. Files without one are not logs.
	pub fn parse(file_name: &str) -> Option<Self> {
		let (package, rest) = file_name.split_once('_')?;
		Some(Self::new(package, rest.strip_suffix(".log").unwrap_or(rest)))
	}

	pub fn file_name(&self) -> String {
		format!("{}_{}.log", self.package, self.version)
	}
}

impl std::fmt::Display for LogName {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{} ({})", self.package, self.version)
	}
}

fn discard_temp(temp: tempfile::NamedTempFile) {
	let path = temp.path().to_path_buf();
	if let Err(e) = temp.close() {
		log::warn!("Failed to remove temporary file {}: {}", path.display(), e);
	}
}

#[derive(Debug, Default)]
struct LogCache {
	exists: HashMap<PathBuf, bool>,
	listings: HashMap<PathBuf, Vec<LogName>>,
}

#[derive(Debug, Default)]
pub struct LogDB {
	cache: LogCache,
}

impl LogDB {
	pub fn new() -> Self {
		Default::default()
	}

	/// Forgets everything cached so later queries see the current filesystem.
	pub fn clear_cache(&mut self) {
		log::debug!("Clearing log cache");
		self.cache = Default::default();
	}

	pub fn log_path(subdir: &Path, package: &str, version: &str) -> PathBuf {
		subdir.join(LogName::new(package, version).file_name())
	}

	pub fn exists(&mut self, path: &Path) -> bool {
		if let Some(exists) = self.cache.exists.get(path) {
			return *exists;
		}
		let exists = path.exists();
		self.cache.exists.insert(path.to_path_buf(), exists);
		exists
	}

	/// If a log for this exact package version is in any of `subdirs`.
	pub fn log_exists(&mut self, package: &PackageRecord, subdirs: &[PathBuf]) -> bool {
		subdirs.iter().any(|subdir| self.exists(&Self::log_path(subdir, package.name(), package.version())))
	}

	/// If a log for any version of the package is in any of `subdirs`.
	///
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) when a subdirectory exists but can't be listed.
	pub fn any_log_exists(&mut self, package: &PackageRecord, subdirs: &[PathBuf]) -> crate::Result<bool> {
		for subdir in subdirs {
			if self.listing(subdir)?.iter().any(|l| l.package == package.name()) {
				return Ok(true);
			}
		}
		Ok(false)
	}

	/// The logs in a subdirectory, a missing subdirectory has none.
	pub fn listing(&mut self, subdir: &Path) -> crate::Result<&[LogName]> {
		if !self.cache.listings.contains_key(subdir) {
			let mut logs = Vec::<LogName>::new();
			match std::fs::read_dir(subdir) {
				Ok(entries) => {
					for entry in entries {
						let entry = entry?;
						if let Some(log) = entry.file_name().to_str().and_then(LogName::parse) {
							logs.push(log);
						}
					}
				},
				Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
					log::warn!("Log directory {} does not exist", subdir.display());
				},
				Err(e) => return Err(e.into()),
			}
			log::debug!("Listed {} logs in {}", logs.len(), subdir.display());
			self.cache.listings.insert(subdir.to_path_buf(), logs);
		}
		Ok(self.cache.listings.get(subdir).map(Vec::as_slice).unwrap_or_default())
	}

	/// Creates `subdir/<package>_<version>.log` containing `contents` unless it already exists.
	///
	/// The contents are written to a temporary file in `subdir` which is then hard linked to the
	/// final name. Linking fails if the name is taken, so racing creators can't both win and nobody
	/// ever sees a partially written log. The log's permissions follow the process umask.
	///
	/// # Returns
	/// `false` if the log already exists, this is the normal outcome of losing a race and not an error.
	/// # Errors
	/// - [`IO`](crate::error::Error::IO) for any other failure, including a missing `subdir`.
	pub fn create(&mut self, subdir: &Path, package: &str, version: &str, contents: &str) -> crate::Result<bool> {
		let mut builder = tempfile::Builder::new();
		builder.prefix(".tmp");
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			builder.permissions(std::fs::Permissions::from_mode(0o666));
		}

		/* The temporary file removes itself when dropped, whichever way we leave */
		let mut temp = builder.tempfile_in(subdir)?;
		temp.write_all(contents.as_bytes())?;
		temp.flush()?;

		let full_name = Self::log_path(subdir, package, version);
		match std::fs::hard_link(temp.path(), &full_name) {
			Ok(()) => {},
			Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
				log::debug!("Log {} already exists", full_name.display());
				self.remember(subdir, full_name, package, version);
				return Ok(false);
			},
			Err(e) => return Err(e.into()),
		}

		/* The log is in place, a leftover temporary name doesn't change that */
		discard_temp(temp);

		log::trace!("Created log {}", full_name.display());
		self.remember(subdir, full_name, package, version);
		Ok(true)
	}

	fn remember(&mut self, subdir: &Path, full_name: PathBuf, package: &str, version: &str) {
		self.cache.exists.insert(full_name, true);
		if let Some(listing) = self.cache.listings.get_mut(subdir) {
			if !listing.iter().any(|l| l.package == package && l.version == version) {
				listing.push(LogName::new(package, version));
			}
		}
	}

	/// Deletes a log, doing nothing if it doesn't exist.
	pub fn remove(&mut self, subdir: &Path, package: &str, version: &str) -> crate::Result<()> {
		let full_name = Self::log_path(subdir, package, version);
		match std::fs::remove_file(&full_name) {
			Ok(()) => log::trace!("Removed log {}", full_name.display()),
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
			Err(e) => return Err(e.into()),
		}
		self.cache.exists.insert(full_name, false);
		if let Some(listing) = self.cache.listings.get_mut(subdir) {
			listing.retain(|l| l.package != package || l.version != version);
		}
		Ok(())
	}
}
