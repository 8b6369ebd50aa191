/// Test readiness of a package, derived from the package index and the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PackageState {
	SuccessfullyTested,
	FailedTesting,
	/// Marked as fixed by hand, the fix hasn't been through a test run yet.
	FixNotYetTested,
	CannotBeTested,
	/// Priority `required`, these are never tested.
	EssentialRequired,
	/// Ready to be reserved by a worker.
	WaitingToBeTested,
	WaitingForDependencyToBeTested,
	DependencyFailedTesting,
	DependencyCannotBeTested,
	DependencyDoesNotExist,
	DependencyFixNotYetTested,
	CircularDependency,
	/// Could not be resolved.
	Unknown,
}

impl PackageState {
	/// Every state, in report order.
	pub const ALL: [PackageState; 13] = [
		PackageState::SuccessfullyTested,
		PackageState::FailedTesting,
		PackageState::FixNotYetTested,
		PackageState::CannotBeTested,
		PackageState::EssentialRequired,
		PackageState::WaitingToBeTested,
		PackageState::WaitingForDependencyToBeTested,
		PackageState::DependencyFailedTesting,
		PackageState::DependencyCannotBeTested,
		PackageState::DependencyDoesNotExist,
		PackageState::DependencyFixNotYetTested,
		PackageState::CircularDependency,
		PackageState::Unknown,
	];

	pub fn as_str(&self) -> &'static str {
		match self {
			PackageState::SuccessfullyTested => "successfully-tested",
			PackageState::FailedTesting => "failed-testing",
			PackageState::FixNotYetTested => "fix-not-yet-tested",
			PackageState::CannotBeTested => "cannot-be-tested",
			PackageState::EssentialRequired => "essential-required",
			PackageState::WaitingToBeTested => "waiting-to-be-tested",
			PackageState::WaitingForDependencyToBeTested => "waiting-for-dependency-to-be-tested",
			PackageState::DependencyFailedTesting => "dependency-failed-testing",
			PackageState::DependencyCannotBeTested => "dependency-cannot-be-tested",
			PackageState::DependencyDoesNotExist => "dependency-does-not-exist",
			PackageState::DependencyFixNotYetTested => "dependency-fix-not-yet-tested",
			PackageState::CircularDependency => "circular-dependency",
			PackageState::Unknown => "unknown",
		}
	}

	/// The state a package takes on from a dependency in this state.
	///
	/// `None` for states that don't hold back a dependent: tested or essential dependencies, and
	/// dependencies that are still unknown.
	pub fn propagated(&self) -> Option<PackageState> {
		match self {
			PackageState::FailedTesting | PackageState::DependencyFailedTesting => Some(PackageState::DependencyFailedTesting),
			PackageState::FixNotYetTested | PackageState::DependencyFixNotYetTested => Some(PackageState::DependencyFixNotYetTested),
			PackageState::CannotBeTested | PackageState::DependencyCannotBeTested => Some(PackageState::DependencyCannotBeTested),
			PackageState::WaitingToBeTested | PackageState::WaitingForDependencyToBeTested => Some(PackageState::WaitingForDependencyToBeTested),
			PackageState::DependencyDoesNotExist => Some(PackageState::DependencyDoesNotExist),
			PackageState::CircularDependency => Some(PackageState::CircularDependency),
			PackageState::SuccessfullyTested | PackageState::EssentialRequired | PackageState::Unknown => None,
		}
	}

	/// Dependencies in these states don't stop a package from being tested.
	pub fn is_satisfied(&self) -> bool {
		matches!(self, PackageState::SuccessfullyTested | PackageState::EssentialRequired)
	}
}

impl std::fmt::Display for PackageState {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for PackageState {
	type Err = crate::Error;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PackageState::ALL
			.into_iter()
			.find(|state| state.as_str() == s)
			.ok_or_else(|| crate::Error::Parse(format!("unknown package state \"{}\"", s)))
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test] fn names_round_trip() { for state in PackageState::ALL { assert_eq!(state.as_str().parse::<PackageState>().unwrap(), state) } }
	#[test] fn bad_name() { assert!("tested".parse::<PackageState>().is_err()) }
	#[test] fn failure_propagates() { assert_eq!(PackageState::FailedTesting.propagated(), Some(PackageState::DependencyFailedTesting)) }
	#[test] fn waiting_propagates() { assert_eq!(PackageState::WaitingToBeTested.propagated(), Some(PackageState::WaitingForDependencyToBeTested)) }
	#[test] fn unknown_does_not_propagate() { assert_eq!(PackageState::Unknown.propagated(), None) }
}
