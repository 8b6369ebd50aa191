//! Parsing of relationship fields such as `Depends`, `Pre-Depends` and `Provides`.
//!
//! A field is a comma separated list of groups, each group a `|` separated list of alternatives.
//! Only name based relationships are of interest to the packages database, version constraints
//! and architecture restrictions are parsed so malformed fields are noticed but are otherwise unused.

use std::sync::OnceLock;

use regex::Regex;

/// A version requirement such as `(>= 1.2)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
	pub operator: String,
	pub version: String,
}

/// A single alternative within a relationship group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
	pub name: String,
	/// Multi-arch qualifier, e.g. `any` in `perl:any`.
	pub arch_qualifier: Option<String>,
	pub constraint: Option<VersionConstraint>,
	pub architectures: Vec<String>,
}

/// Alternatives of one group, in order of preference.
pub type Alternatives = Vec<Dependency>;

fn alternative_regex() -> &'static Regex {
	static RE: OnceLock<Regex> = OnceLock::new();
	RE.get_or_init(|| {
		Regex::new(concat!(
			r"^(?P<name>[^\s:(\[<|,]+)",
			r"(?::(?P<qualifier>[^\s(\[<]+))?\s*",
			r"(?:\(\s*(?P<op><<|<=|>=|>>|=|<|>)\s*(?P<version>[^\s)]+)\s*\))?\s*",
			r"(?:\[(?P<archs>[^\]]*)\])?\s*",
			r"(?:<[^>]*>\s*)*$",
		)).expect("relationship regex should be valid")
	})
}

fn parse_alternative(text: &str, field: &str) -> crate::Result<Dependency> {
	let caps = alternative_regex()
		.captures(text)
		.ok_or_else(|| crate::Error::Parse(format!("invalid relationship \"{}\" in \"{}\"", text, field)))?;

	Ok(Dependency {
		name: caps["name"].to_string(),
		arch_qualifier: caps.name("qualifier").map(|m| m.as_str().to_string()),
		constraint: match (caps.name("op"), caps.name("version")) {
			(Some(op), Some(version)) => Some(VersionConstraint { operator: op.as_str().to_string(), version: version.as_str().to_string() }),
			_ => None,
		},
		architectures: caps.name("archs")
			.map(|m| m.as_str().split_whitespace().map(str::to_string).collect())
			.unwrap_or_default(),
	})
}

/// Parses a relationship field into its groups of alternatives.
///
/// Empty groups, as left by a trailing comma, are skipped.
///
/// # Errors
/// - [`Parse`](crate::error::Error::Parse) when an alternative is not a valid relationship.
pub fn parse_dependencies(field: &str) -> crate::Result<Vec<Alternatives>> {
	let mut groups = Vec::<Alternatives>::new();
	for group in field.split(',') {
		let group = group.trim();
		if group.is_empty() {
			continue;
		}
		let alternatives = group
			.split('|')
			.map(|alt| parse_alternative(alt.trim(), field))
			.collect::<crate::Result<Vec<_>>>()?;
		groups.push(alternatives);
	}
	Ok(groups)
}

/// The name of the preferred alternative of every group.
///
/// Groups are taken one at a time. When the preferred alternative of a group is malformed the
/// leading name of its text is used instead, a group without even that is skipped. Either is
/// logged. A damaged field still names what it can so the package keeps waiting on it.
pub fn first_alternatives(field: &str) -> Vec<String> {
	let mut names = Vec::<String>::new();
	for group in field.split(',') {
		let group = group.trim();
		if group.is_empty() {
			continue;
		}
		let preferred = group.split('|').next().unwrap_or_default().trim();
		match parse_alternative(preferred, field) {
			Ok(dep) => names.push(dep.name),
			Err(e) => match leading_name(preferred) {
				Some(name) => {
					log::warn!("{}, using \"{}\"", e, name);
					names.push(name.to_string());
				},
				None => log::warn!("{}, skipping it", e),
			},
		}
	}
	names
}

fn leading_name(text: &str) -> Option<&str> {
	let end = text.find(|c: char| c.is_whitespace() || ":([<|,".contains(c)).unwrap_or(text.len());
	Some(&text[..end]).filter(|name| !name.is_empty())
}
