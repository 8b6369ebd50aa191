//! # Packages database
//!
//! Decides which packages can be tested and hands them out to workers.
//!
//! # Usage
//! 1. Create a [`PackagesDB`] and add package indexes with [`PackagesDB::read_packages_file()`].
//! 1. [`PackagesDB::create_subdirs()`] once so the log tree exists.
//! 1. Workers call [`PackagesDB::reserve_package()`] to claim a package, test it, and report back with
//! [`PackagesDB::pass_package()`] or [`PackagesDB::fail_package()`], or give it back with
//! [`PackagesDB::unreserve_package()`].
//! 1. Query the outcome with [`PackagesDB::packages_in_state()`] and [`PackagesDB::state_of()`].
//!
//! States are computed once from the index and the logs and then kept, they are not updated as
//! logs change. Call [`PackagesDB::recompute()`] to pick up logs written since.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::config::PkgDbOptions;
use crate::logdb::LogDB;
use crate::packages::{PackageIndex, PackageMap, PackageRecord, PackagesFile};

mod state;
pub use state::PackageState;

mod circular;
pub use circular::CyclePolicy;

/// Resolved paths of every log category.
#[derive(Debug, Clone)]
struct LogDirs {
	ok: PathBuf,
	fail: PathBuf,
	untestable: PathBuf,
	reserved: PathBuf,
	more_ok: Vec<PathBuf>,
	more_fail: Vec<PathBuf>,
}

impl LogDirs {
	fn new(options: &PkgDbOptions) -> Self {
		LogDirs {
			ok: options.subdir_path(options.ok()),
			fail: options.subdir_path(options.fail()),
			untestable: options.subdir_path(options.untestable()),
			reserved: options.subdir_path(options.reserved()),
			more_ok: options.more_ok().iter().map(|s| options.subdir_path(s)).collect(),
			more_fail: options.more_fail().iter().map(|s| options.subdir_path(s)).collect(),
		}
	}

	fn all(&self) -> Vec<PathBuf> {
		let mut all = vec![self.ok.clone(), self.fail.clone(), self.untestable.clone(), self.reserved.clone()];
		all.extend(self.more_ok.iter().cloned());
		all.extend(self.more_fail.iter().cloned());
		all
	}
}

/// The result of one computation pass.
#[derive(Debug, Default)]
struct StateTable {
	/// Keyed by index name, provided names included.
	package_state: HashMap<String, PackageState>,
	in_state: HashMap<PackageState, Vec<String>>,
}

pub struct PackagesDB {
	options: PkgDbOptions,
	dirs: LogDirs,
	known_cycles: CyclePolicy,
	index: PackageIndex,
	logdb: LogDB,
	states: Option<StateTable>,
}

impl PackagesDB {
	/// Creates an empty database using the Debian list of known dependency cycles.
	pub fn new(options: PkgDbOptions) -> Self {
		PackagesDB {
			dirs: LogDirs::new(&options),
			options,
			known_cycles: CyclePolicy::debian(),
			index: PackageIndex::new(),
			logdb: LogDB::new(),
			states: None,
		}
	}

	/// Replaces the list of dependency cycles that are tested regardless.
	pub fn with_cycle_policy(mut self, known_cycles: CyclePolicy) -> Self {
		self.known_cycles = known_cycles;
		self.states = None;
		self
	}

	/* Configuration */

	pub fn options(&self) -> &PkgDbOptions {
		&self.options
	}

	pub fn known_cycles(&self) -> &CyclePolicy {
		&self.known_cycles
	}

	/// Renames any of the log categories, `None` keeps the current name.
	pub fn set_subdirs(
		&mut self,
		ok: Option<&str>,
		fail: Option<&str>,
		untestable: Option<&str>,
		reserved: Option<&str>,
		more_ok: Option<Vec<String>>,
		more_fail: Option<Vec<String>>,
	) {
		if let Some(ok) = ok { self.options.set_ok(ok) }
		if let Some(fail) = fail { self.options.set_fail(fail) }
		if let Some(untestable) = untestable { self.options.set_untestable(untestable) }
		if let Some(reserved) = reserved { self.options.set_reserved(reserved) }
		if let Some(more_ok) = more_ok { self.options.set_more_ok(more_ok) }
		if let Some(more_fail) = more_fail { self.options.set_more_fail(more_fail) }
		self.dirs = LogDirs::new(&self.options);
		self.states = None;
	}

	/// Creates every log subdirectory that doesn't exist yet.
	///
	/// Logs can't be created until this has been done.
	pub fn create_subdirs(&self) -> crate::Result<()> {
		for dir in self.dirs.all() {
			if !dir.exists() {
				log::debug!("Creating log directory {}", dir.display());
				std::fs::create_dir_all(&dir)?;
			}
		}
		Ok(())
	}

	/* Package index */

	pub fn read_packages_file(&mut self, file: PackagesFile) {
		self.index.add_packages_file(file);
		self.states = None;
	}

	/// Every known name, provided names included, and the record it refers to.
	pub fn all_packages(&mut self) -> Arc<PackageMap> {
		self.index.packages()
	}

	/// Throws away computed states and cached log lookups, the next query starts a fresh pass.
	pub fn recompute(&mut self) {
		self.states = None;
		self.logdb.clear_cache();
	}

	/// Every dependency reachable from `package`, in breadth first order.
	///
	/// Unknown names are included but not followed. With `break_circles` the package itself is
	/// left out even when it depends on itself through a cycle.
	fn get_recursive_dependencies(packages: &PackageMap, package: &PackageRecord, break_circles: bool) -> Vec<String> {
		let mut deps = Vec::<String>::new();
		let mut seen = HashSet::<String>::new();
		let mut more: VecDeque<String> = package.dependencies().iter().cloned().collect();
		while let Some(dep) = more.pop_front() {
			if !seen.insert(dep.clone()) {
				continue;
			}
			if let Some(p) = packages.get(&dep) {
				more.extend(p.dependencies().iter().cloned());
			}
			deps.push(dep);
		}

		if break_circles {
			deps.retain(|d| d != package.name());
		}
		deps
	}

	/// Dependencies of the named package, direct and indirect, excluding itself.
	pub fn recursive_dependencies(&mut self, name: &str) -> Vec<String> {
		let packages = self.index.packages();
		match packages.get(name) {
			Some(package) => Self::get_recursive_dependencies(&packages, package, true),
			None => Vec::new(),
		}
	}

	/* States */

	fn compute_package_state(&mut self, packages: &PackageMap, package_state: &HashMap<String, PackageState>, package: &PackageRecord) -> crate::Result<PackageState> {
		if self.logdb.log_exists(package, std::slice::from_ref(&self.dirs.ok)) {
			return Ok(PackageState::SuccessfullyTested);
		}
		let failed: Vec<PathBuf> = std::iter::once(self.dirs.fail.clone()).chain(self.dirs.more_fail.iter().cloned()).collect();
		if self.logdb.log_exists(package, &failed) {
			return Ok(PackageState::FailedTesting);
		}
		if self.logdb.log_exists(package, &self.dirs.more_ok) {
			return Ok(PackageState::FixNotYetTested);
		}
		if self.logdb.any_log_exists(package, std::slice::from_ref(&self.dirs.untestable))? {
			return Ok(PackageState::CannotBeTested);
		}
		if !package.is_testable() {
			return Ok(PackageState::EssentialRequired);
		}

		for dep in package.dependencies() {
			let Some(dep_state) = package_state.get(dep) else {
				log::trace!("{} depends on {} which does not exist", package.name(), dep);
				return Ok(PackageState::DependencyDoesNotExist);
			};
			if let Some(state) = dep_state.propagated() {
				return Ok(state);
			}
		}

		let state_of = |dep: &String| package_state.get(dep).copied().unwrap_or(PackageState::Unknown);

		if package.dependencies().iter().all(|dep| state_of(dep).is_satisfied()) {
			return Ok(PackageState::WaitingToBeTested);
		}

		/* Some dependency is still unknown, which may be because of a cycle */
		let deps = Self::get_recursive_dependencies(packages, package, false);
		let in_own_closure = deps.iter().any(|d| d == package.name());
		if in_own_closure && !self.known_cycles.contains(package.name()) {
			log::trace!("{} is part of an unknown dependency cycle", package.name());
			return Ok(PackageState::CircularDependency);
		}

		let mut state = PackageState::Unknown;
		if self.known_cycles.contains(package.name()) {
			for dep in package.dependencies() {
				let dep_state = state_of(dep);
				if self.known_cycles.contains(dep) {
					/* the cycle counts as broken once one of its members failed */
					if !matches!(dep_state, PackageState::FailedTesting | PackageState::DependencyFailedTesting) {
						state = PackageState::WaitingToBeTested;
					}
				} else if !dep_state.is_satisfied() {
					state = PackageState::Unknown;
					break;
				}
			}
		}
		Ok(state)
	}

	fn compute_package_states(&mut self) -> crate::Result<()> {
		if self.states.is_some() {
			return Ok(());
		}

		let packages = self.index.packages();
		let mut package_state: HashMap<String, PackageState> = packages.keys().map(|name| (name.clone(), PackageState::Unknown)).collect();
		let mut in_state: HashMap<PackageState, Vec<String>> = PackageState::ALL.into_iter().map(|s| (s, Vec::new())).collect();

		let mut todo: Vec<&String> = packages.keys().collect();
		let mut sweep = 0;
		while !todo.is_empty() {
			sweep += 1;
			let mut remaining = Vec::<&String>::new();
			let mut progress = false;
			for name in todo {
				let state = self.compute_package_state(&packages, &package_state, &packages[name])?;
				if state == PackageState::Unknown {
					remaining.push(name);
				} else {
					log::trace!("{} is {}", name, state);
					package_state.insert(name.clone(), state);
					in_state.entry(state).or_default().push(name.clone());
					progress = true;
				}
			}
			log::debug!("Sweep {} done, {} packages remain unknown", sweep, remaining.len());
			todo = remaining;
			/* Nothing changed, so nothing will next time either */
			if !progress {
				break;
			}
		}

		in_state.insert(PackageState::Unknown, todo.into_iter().cloned().collect());
		for names in in_state.values_mut() {
			names.sort();
		}

		log::info!("Computed states of {} packages in {} sweeps", package_state.len(), sweep);
		self.states = Some(StateTable { package_state, in_state });
		Ok(())
	}

	fn state_table(&mut self) -> crate::Result<&StateTable> {
		self.compute_package_states()?;
		Ok(self.states.get_or_insert_with(Default::default))
	}

	/// Every state in report order.
	pub fn states(&self) -> &'static [PackageState] {
		&PackageState::ALL
	}

	/// Packages in a state, sorted by name.
	///
	/// A package reached through provided names is only listed once.
	pub fn packages_in_state(&mut self, state: PackageState) -> crate::Result<Vec<Arc<PackageRecord>>> {
		let packages = self.index.packages();
		let table = self.state_table()?;
		let mut found = BTreeMap::<&str, Arc<PackageRecord>>::new();
		for name in table.in_state.get(&state).map(Vec::as_slice).unwrap_or_default() {
			if let Some(p) = packages.get(name) {
				found.entry(p.name()).or_insert_with(|| p.clone());
			}
		}
		Ok(found.into_values().collect())
	}

	/// The state of a known name, or `None` if nothing by this name is in the index.
	pub fn package_state(&mut self, name: &str) -> crate::Result<Option<PackageState>> {
		Ok(self.state_table()?.package_state.get(name).copied())
	}

	/// The state of a name, [`Unknown`](PackageState::Unknown) if nothing by this name is in the index.
	pub fn state_of(&mut self, name: &str) -> crate::Result<PackageState> {
		Ok(self.package_state(name)?.unwrap_or(PackageState::Unknown))
	}

	/* Reservations */

	/// Claims a random package that is waiting to be tested.
	///
	/// Candidates are tried in random order so workers rarely race for the same one.
	/// # Returns
	/// `None` when there is nothing to test or every candidate was claimed by someone else first.
	pub fn reserve_package(&mut self) -> crate::Result<Option<Arc<PackageRecord>>> {
		let mut candidates = self.packages_in_state(PackageState::WaitingToBeTested)?;
		candidates.shuffle(&mut rand::thread_rng());
		for p in candidates {
			if self.logdb.create(&self.dirs.reserved, p.name(), p.version(), "")? {
				log::info!("Reserved {}", p);
				return Ok(Some(p));
			}
			log::debug!("{} was reserved by someone else", p);
		}
		Ok(None)
	}

	fn check_for_acceptability_as_filename(s: &str) -> crate::Result<()> {
		if s.chars().any(std::path::is_separator) {
			return Err(crate::Error::InvalidIdentifier(s.to_string()));
		}
		Ok(())
	}

	fn check_identifiers(package: &str, version: &str) -> crate::Result<()> {
		Self::check_for_acceptability_as_filename(package)?;
		Self::check_for_acceptability_as_filename(version)
	}

	/// Releases a reservation without recording a result.
	pub fn unreserve_package(&mut self, package: &str, version: &str) -> crate::Result<()> {
		Self::check_identifiers(package, version)?;
		log::info!("Unreserving {} {}", package, version);
		self.logdb.remove(&self.dirs.reserved, package, version)
	}

	fn record_result(&mut self, subdir: PathBuf, package: &str, version: &str, log: &str) -> crate::Result<()> {
		Self::check_identifiers(package, version)?;
		if !self.logdb.create(&subdir, package, version, log)? {
			return Err(crate::Error::LogExists { package: package.to_string(), version: version.to_string() });
		}
		self.logdb.remove(&self.dirs.reserved, package, version)
	}

	/// Records a successful test and releases the reservation.
	///
	/// # Errors
	/// - [`InvalidIdentifier`](crate::error::Error::InvalidIdentifier) when `package` or `version` contain a path separator.
	/// - [`LogExists`](crate::error::Error::LogExists) when a result was already recorded.
	pub fn pass_package(&mut self, package: &str, version: &str, log: &str) -> crate::Result<()> {
		self.record_result(self.dirs.ok.clone(), package, version, log)?;
		log::info!("{} {} passed", package, version);
		Ok(())
	}

	/// Records a failed test and releases the reservation.
	///
	/// # Errors
	/// Same as [`pass_package()`](PackagesDB::pass_package()).
	pub fn fail_package(&mut self, package: &str, version: &str, log: &str) -> crate::Result<()> {
		self.record_result(self.dirs.fail.clone(), package, version, log)?;
		log::info!("{} {} failed", package, version);
		Ok(())
	}

	/// Marks every version of a package as impossible to test.
	///
	/// Any reservation is left alone.
	/// # Errors
	/// Same as [`pass_package()`](PackagesDB::pass_package()).
	pub fn make_package_untestable(&mut self, package: &str, version: &str, log: &str) -> crate::Result<()> {
		Self::check_identifiers(package, version)?;
		if !self.logdb.create(&self.dirs.untestable, package, version, log)? {
			return Err(crate::Error::LogExists { package: package.to_string(), version: version.to_string() });
		}
		log::info!("{} {} marked untestable", package, version);
		Ok(())
	}
}
