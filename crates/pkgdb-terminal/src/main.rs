use std::io::Write;

fn main() {
	let mut opts;

	/* Parse console input */
	let parsed_options = {
		let args: Vec<String> = std::env::args().collect();

		opts = getopts::Options::new();
		opts.optflag( "h", "help",       "Show help");
		opts.optflag( "v", "verbose",    "Increased vebosity");
		opts.optmulti("i", "index",      "Package index file, may be given more than once", "FILE");
		opts.optopt(  "p", "prefix",     "Directory holding the log subdirectories", "DIR");
		opts.optopt(  "c", "config",     "JSON file with log directory options", "FILE");
		opts.parsing_style(getopts::ParsingStyle::FloatingFrees);

		let parsed_options = match opts.parse(&args[1..]) {
			Ok(m)  => { m }
			Err(e) => { println!("Unable to parse options: {}", e); return }
		};

		if parsed_options.opt_present("h") {
			eprintln!("{}", opts.usage(USAGE));
			return;
		}

		parsed_options
	};

	let default_level = if parsed_options.opt_present("v") { "debug" } else { "info" };
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

	let Some(command) = parsed_options.free.first() else {
		eprintln!("{}", opts.usage(USAGE));
		return;
	};

	let mut db = match open_db(&parsed_options) {
		Ok(db) => db,
		Err(e) => {
			log::error!("Failed to open packages database: {}", e);
			std::process::exit(1);
		}
	};

	if let Err(e) = run_command(&mut db, command, &parsed_options.free[1..]) {
		log::error!("{} failed: {}", command, e);
		std::process::exit(1);
	}
}

const USAGE: &str = "Usage: pkgdb [options] COMMAND [ARGS]

Commands:
    mkdirs                           Create the log directories
    status                           Number of packages in each state
    list STATE                       Packages in a state
    state NAME                       State of a package
    reserve                          Reserve a package for testing
    unreserve NAME VERSION           Give up a reservation
    pass NAME VERSION LOGFILE        Record a successful test
    fail NAME VERSION LOGFILE        Record a failed test
    untestable NAME VERSION LOGFILE  Mark a package as untestable";

fn open_db(parsed_options: &getopts::Matches) -> Result<pkgdb::PackagesDB, Error> {
	let mut options = match parsed_options.opt_str("c") {
		Some(path) => pkgdb::PkgDbOptions::load_from_file(path)?,
		None => pkgdb::PkgDbOptions::default(),
	};
	if let Some(prefix) = parsed_options.opt_str("p") {
		options.set_prefix(Some(prefix.into()));
	}

	let mut db = pkgdb::PackagesDB::new(options);
	for path in parsed_options.opt_strs("i") {
		log::debug!("Reading package index {}", path);
		db.read_packages_file(pkgdb::PackagesFile::from_path(&path)?);
	}
	Ok(db)
}

fn run_command(db: &mut pkgdb::PackagesDB, command: &str, args: &[String]) -> Result<(), Error> {
	let arg = |i: usize| args.get(i).map(String::as_str).ok_or(Error::MissingArgument);

	match command {
		"mkdirs" => db.create_subdirs()?,
		"status" => {
			let mut stdout = std::io::stdout().lock();
			for state in db.states() {
				writeln!(stdout, "{:>6} {}", db.packages_in_state(*state)?.len(), state)?;
			}
		},
		"list" => {
			let state: pkgdb::PackageState = arg(0)?.parse()?;
			let mut stdout = std::io::stdout().lock();
			for package in db.packages_in_state(state)? {
				writeln!(stdout, "{} {}", package.name(), package.version())?;
			}
		},
		"state" => println!("{}", db.state_of(arg(0)?)?),
		"reserve" => match db.reserve_package()? {
			Some(package) => println!("{} {}", package.name(), package.version()),
			None => log::info!("Nothing to reserve."),
		},
		"unreserve" => db.unreserve_package(arg(0)?, arg(1)?)?,
		"pass" | "fail" | "untestable" => {
			let (name, version) = (arg(0)?, arg(1)?);
			let log = std::fs::read_to_string(arg(2)?)?;
			match command {
				"pass" => db.pass_package(name, version, &log)?,
				"fail" => db.fail_package(name, version, &log)?,
				_ => db.make_package_untestable(name, version, &log)?,
			}
		},
		_ => return Err(Error::UnknownCommand(command.to_string())),
	}
	Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("pkgdb error: {0}")]
	PkgDb(#[from] pkgdb::Error),
	#[error("IO error: {0}")]
	IO(#[from] std::io::Error),
	#[error("Missing argument")]
	MissingArgument,
	#[error("Unknown command `{0}`")]
	UnknownCommand(String),
}
