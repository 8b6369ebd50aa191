use std::collections::BTreeMap;
use std::sync::Arc;

use super::{PackageRecord, PackagesFile};

/// Package name, or provided name, to record.
pub type PackageMap = BTreeMap<String, Arc<PackageRecord>>;

/// All package index inputs merged into a single lookup.
///
/// The merged map is built on first use and rebuilt after another input is added.
#[derive(Debug, Default)]
pub struct PackageIndex {
	files: Vec<PackagesFile>,
	packages: Option<Arc<PackageMap>>,
}

impl PackageIndex {
	pub fn new() -> Self {
		Default::default()
	}

	/// Adds an index input. Records in later inputs replace earlier records of the same name.
	pub fn add_packages_file(&mut self, file: PackagesFile) {
		self.files.push(file);
		self.packages = None;
	}

	/// The merged map.
	///
	/// Every name listed in a package's `Provides` that isn't itself a real package maps to the providing record.
	/// When several packages provide the same name the first provider by package name is used.
	pub fn packages(&mut self) -> Arc<PackageMap> {
		if let Some(packages) = &self.packages {
			return packages.clone();
		}

		let mut packages = PackageMap::new();
		for file in &self.files {
			for p in file.packages() {
				packages.insert(p.name().to_string(), p.clone());
			}
		}

		let real: Vec<Arc<PackageRecord>> = packages.values().cloned().collect();
		for p in real {
			for provided in p.provides() {
				if !packages.contains_key(provided) {
					log::trace!("{} is provided by {}", provided, p.name());
					packages.insert(provided.clone(), p.clone());
				}
			}
		}

		log::debug!("Indexed {} names from {} package index inputs", packages.len(), self.files.len());
		let packages = Arc::new(packages);
		self.packages = Some(packages.clone());
		packages
	}
}
