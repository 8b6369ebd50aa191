use pkgdb::packagesdb::CyclePolicy;
use pkgdb::PackageState::*;
use pkgdb_test_utils::{stanza, LogTree};

fn index(stanzas: &[String]) -> String {
	stanzas.concat()
}

#[test]
fn dependency_waits_for_its_dependency() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1.0", &[("Priority", "optional"), ("Depends", "b")]),
		stanza("b", "1.0", &[("Priority", "optional")]),
	]));

	assert_eq!(db.state_of("b").unwrap(), WaitingToBeTested);
	assert_eq!(db.state_of("a").unwrap(), WaitingForDependencyToBeTested);
	let waiting: Vec<_> = db.packages_in_state(WaitingToBeTested).unwrap().iter().map(|p| p.name().to_string()).collect();
	assert_eq!(waiting, vec!["b"]);
}

#[test]
fn tested_dependency_releases_dependent() {
	let tree = LogTree::new();
	tree.write_log("pass", "b", "1.0", "ok");
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1.0", &[("Depends", "b")]),
		stanza("b", "1.0", &[]),
	]));

	assert_eq!(db.state_of("b").unwrap(), SuccessfullyTested);
	assert_eq!(db.state_of("a").unwrap(), WaitingToBeTested);
}

#[test]
fn direct_cycle_is_circular() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("c", "1", &[("Depends", "d")]),
		stanza("d", "1", &[("Depends", "c")]),
		stanza("e", "1", &[("Depends", "c")]),
	])).with_cycle_policy(CyclePolicy::default());

	assert_eq!(db.state_of("c").unwrap(), CircularDependency);
	assert_eq!(db.state_of("d").unwrap(), CircularDependency);
	assert_eq!(db.state_of("e").unwrap(), CircularDependency);
}

#[test]
fn longer_cycle_is_circular() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("p", "1", &[("Depends", "q")]),
		stanza("q", "1", &[("Depends", "r")]),
		stanza("r", "1", &[("Pre-Depends", "p")]),
	])).with_cycle_policy(CyclePolicy::default());

	for name in ["p", "q", "r"] {
		assert_eq!(db.state_of(name).unwrap(), CircularDependency, "{}", name);
	}
}

#[test]
fn required_is_essential() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("e", "1", &[("Priority", "required"), ("Depends", "missing")]),
		stanza("a", "1", &[("Depends", "e")]),
	]));

	assert_eq!(db.state_of("e").unwrap(), EssentialRequired);
	assert_eq!(db.state_of("a").unwrap(), WaitingToBeTested);
}

#[test]
fn missing_dependency() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("f", "1", &[("Depends", "g")]),
		stanza("h", "1", &[("Depends", "f")]),
	]));

	assert_eq!(db.state_of("f").unwrap(), DependencyDoesNotExist);
	assert_eq!(db.state_of("h").unwrap(), DependencyDoesNotExist);
	assert_eq!(db.package_state("g").unwrap(), None);
	assert_eq!(db.state_of("g").unwrap(), Unknown);
}

#[test]
fn logs_take_precedence_in_order() {
	let tree = LogTree::new();
	tree.write_log("pass", "both", "1", "");
	tree.write_log("fail", "both", "1", "");
	tree.write_log("bugged", "flagged", "1", "");
	tree.write_log("fixed", "fixed", "1", "");
	tree.write_log("fail", "fixed-and-failed", "1", "");
	tree.write_log("fixed", "fixed-and-failed", "1", "");
	tree.write_log("untestable", "evil", "0.9", "");
	tree.write_log("fail", "old", "0.9", "");
	tree.write_log("fail", "req", "1", "");
	let mut db = tree.packages_db(&index(&[
		stanza("both", "1", &[]),
		stanza("flagged", "1", &[]),
		stanza("fixed", "1", &[]),
		stanza("fixed-and-failed", "1", &[]),
		stanza("evil", "1", &[]),
		stanza("old", "1", &[]),
		stanza("req", "1", &[("Priority", "required")]),
	]));

	assert_eq!(db.state_of("both").unwrap(), SuccessfullyTested);
	assert_eq!(db.state_of("flagged").unwrap(), FailedTesting);
	assert_eq!(db.state_of("fixed").unwrap(), FixNotYetTested);
	assert_eq!(db.state_of("fixed-and-failed").unwrap(), FailedTesting);
	/* untestable applies to every version, the other categories don't */
	assert_eq!(db.state_of("evil").unwrap(), CannotBeTested);
	assert_eq!(db.state_of("old").unwrap(), WaitingToBeTested);
	assert_eq!(db.state_of("req").unwrap(), FailedTesting);
}

#[test]
fn dependency_states_propagate() {
	let tree = LogTree::new();
	tree.write_log("fail", "broken", "1", "");
	tree.write_log("fixed", "mended", "1", "");
	tree.write_log("untestable", "evil", "1", "");
	let mut db = tree.packages_db(&index(&[
		stanza("broken", "1", &[]),
		stanza("mended", "1", &[]),
		stanza("evil", "1", &[]),
		stanza("a", "1", &[("Depends", "broken")]),
		stanza("aa", "1", &[("Depends", "a")]),
		stanza("b", "1", &[("Depends", "mended")]),
		stanza("c", "1", &[("Depends", "evil")]),
		/* the first dependency holding things back decides, once it has a state */
		stanza("z", "1", &[("Depends", "mended, broken")]),
	]));

	assert_eq!(db.state_of("a").unwrap(), DependencyFailedTesting);
	assert_eq!(db.state_of("aa").unwrap(), DependencyFailedTesting);
	assert_eq!(db.state_of("b").unwrap(), DependencyFixNotYetTested);
	assert_eq!(db.state_of("c").unwrap(), DependencyCannotBeTested);
	assert_eq!(db.state_of("z").unwrap(), DependencyFixNotYetTested);
}

#[test]
fn provided_names_resolve_to_provider() {
	let tree = LogTree::new();
	tree.write_log("pass", "exim4", "4.9", "");
	let mut db = tree.packages_db(&index(&[
		stanza("exim4", "4.9", &[("Provides", "mail-transport-agent")]),
		stanza("mutt", "2", &[("Depends", "mail-transport-agent | postfix")]),
	]));

	assert_eq!(db.state_of("mail-transport-agent").unwrap(), SuccessfullyTested);
	assert_eq!(db.state_of("mutt").unwrap(), WaitingToBeTested);
	let tested = db.packages_in_state(SuccessfullyTested).unwrap();
	assert_eq!(tested.len(), 1);
	assert_eq!(tested[0].name(), "exim4");
}

#[test]
fn known_cycle_is_tested() {
	let tree = LogTree::new();
	let text = index(&[
		stanza("x", "1", &[("Depends", "y")]),
		stanza("y", "1", &[("Depends", "x")]),
		stanza("z", "1", &[("Depends", "x")]),
	]);
	let mut db = tree.packages_db(&text).with_cycle_policy(CyclePolicy::new(["x", "y"]));

	assert_eq!(db.state_of("x").unwrap(), WaitingToBeTested);
	assert_eq!(db.state_of("y").unwrap(), WaitingForDependencyToBeTested);
	assert_eq!(db.state_of("z").unwrap(), WaitingForDependencyToBeTested);

	tree.write_log("pass", "x", "1", "");
	db.recompute();
	assert_eq!(db.state_of("x").unwrap(), SuccessfullyTested);
	assert_eq!(db.state_of("y").unwrap(), WaitingToBeTested);

	let tree = LogTree::new();
	tree.write_log("fail", "x", "1", "");
	let mut db = tree.packages_db(&text).with_cycle_policy(CyclePolicy::new(["x", "y"]));
	assert_eq!(db.state_of("y").unwrap(), DependencyFailedTesting);
}

#[test]
fn known_cycle_waits_for_dependency_outside_it() {
	let tree = LogTree::new();
	/* zu sorts after x so it is still unknown when x is first looked at */
	let mut db = tree.packages_db(&index(&[
		stanza("x", "1", &[("Depends", "y, zu")]),
		stanza("y", "1", &[("Depends", "x")]),
		stanza("zu", "1", &[]),
	])).with_cycle_policy(CyclePolicy::new(["x", "y"]));

	assert_eq!(db.state_of("zu").unwrap(), WaitingToBeTested);
	assert_eq!(db.state_of("x").unwrap(), WaitingForDependencyToBeTested);
	let waiting: Vec<_> = db.packages_in_state(WaitingToBeTested).unwrap().iter().map(|p| p.name().to_string()).collect();
	assert!(!waiting.contains(&"x".to_string()));
}

#[test]
fn malformed_depends_still_waits() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1", &[("Depends", "b (>= 1.0, c")]),
		stanza("b", "1", &[]),
		stanza("c", "1", &[]),
	]));

	assert_eq!(db.recursive_dependencies("a"), vec!["b", "c"]);
	assert_eq!(db.state_of("a").unwrap(), WaitingForDependencyToBeTested);

	let mut reserved = Vec::new();
	while let Some(p) = db.reserve_package().unwrap() {
		reserved.push(p.name().to_string());
	}
	reserved.sort();
	assert_eq!(reserved, vec!["b", "c"]);
}

#[test]
fn every_package_gets_a_state() {
	let tree = LogTree::new();
	tree.write_log("fail", "b", "1", "");
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1", &[("Depends", "b")]),
		stanza("b", "1", &[]),
		stanza("c", "1", &[("Depends", "d")]),
		stanza("d", "1", &[("Depends", "c")]),
		stanza("e", "1", &[("Depends", "nowhere")]),
		stanza("f", "1", &[("Priority", "required")]),
	]));

	let mut total = 0;
	for state in db.states() {
		total += db.packages_in_state(*state).unwrap().len();
	}
	assert_eq!(total, 6);
	assert_eq!(db.states().len(), 13);
}

#[test]
fn recomputing_without_changes_is_identical() {
	let tree = LogTree::new();
	tree.write_log("pass", "b", "1", "");
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1", &[("Depends", "b, c")]),
		stanza("b", "1", &[]),
		stanza("c", "1", &[("Depends", "a")]),
	]));

	let snapshot = |db: &mut pkgdb::PackagesDB| -> Vec<(pkgdb::PackageState, Vec<String>)> {
		db.states().iter().map(|s| (*s, db.packages_in_state(*s).unwrap().iter().map(|p| p.name().to_string()).collect())).collect()
	};
	let first = snapshot(&mut db);
	db.recompute();
	assert_eq!(first, snapshot(&mut db));
}

#[test]
fn states_are_kept_until_recomputed() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1", &[("Depends", "b")]),
		stanza("b", "1", &[]),
	]));

	assert_eq!(db.state_of("a").unwrap(), WaitingForDependencyToBeTested);
	db.pass_package("b", "1", "log").unwrap();
	assert_eq!(db.state_of("b").unwrap(), WaitingToBeTested);
	db.recompute();
	assert_eq!(db.state_of("b").unwrap(), SuccessfullyTested);
	assert_eq!(db.state_of("a").unwrap(), WaitingToBeTested);
}

#[test]
fn recursive_dependencies_skip_self() {
	let tree = LogTree::new();
	let mut db = tree.packages_db(&index(&[
		stanza("a", "1", &[("Depends", "b")]),
		stanza("b", "1", &[("Depends", "c, a")]),
		stanza("c", "1", &[("Depends", "gone")]),
	]));

	assert_eq!(db.recursive_dependencies("a"), vec!["b", "c", "gone"]);
	assert!(db.recursive_dependencies("nothing").is_empty());
}
