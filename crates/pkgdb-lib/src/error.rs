//! Library error type.

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("JSON error: {0}")]
	SerdeJSON(#[from] serde_json::Error),
	#[error("parsing error: {0}")]
	Parse(String),
	/// A package name or version would escape the log directory if used as part of a filename.
	#[error("'/' in (partial) filename: {0}")]
	InvalidIdentifier(String),
	/// A result was reported for a package that already has one.
	#[error("log file exists already: {package} ({version})")]
	LogExists {
		package: String,
		version: String,
	},
}
