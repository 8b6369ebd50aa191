pub mod error;
pub use error::Result;
pub use error::Error;

pub mod config;
pub use config::PkgDbOptions;

pub mod packages;
pub use packages::PackageRecord;
pub use packages::PackagesFile;

pub mod logdb;
pub use logdb::LogDB;

pub mod packagesdb;
pub use packagesdb::PackagesDB;
pub use packagesdb::PackageState;
