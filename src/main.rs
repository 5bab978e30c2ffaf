//! mcrestore - restore an active world toward its original, keeping claimed land.

use std::{path::PathBuf, process, sync::Arc};

use clap::{Parser, ValueEnum};
use mcrestore::{
	McResult,
	config::RestoreConfig,
	log::{Logger, TracingLogger},
	logging::{init_logging, DEFAULT_LOG_DIR},
	restore::{run, Boundary, CancelToken, RestoreOptions},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Exclude {
	/// Keep chunks claimed with Open Parties and Claims
	Claims,
}

#[derive(Parser)]
#[command(name = "mcrestore")]
#[command(about = "Restore a Minecraft world to its original state, except for claimed chunks", long_about = None)]
struct Args {
	/// Dimension folder of the original world
	original: PathBuf,

	/// Dimension folder of the world to restore in place
	active: PathBuf,

	/// What to leave untouched
	#[arg(short, long, value_enum)]
	exclude: Option<Exclude>,

	/// Only restore regions inside this rectangle of region coordinates
	#[arg(
		short,
		long,
		num_args = 4,
		value_names = ["MIN_X", "MIN_Z", "MAX_X", "MAX_Z"],
		allow_negative_numbers = true
	)]
	boundary: Option<Vec<i32>>,

	/// Run every check without writing any file
	#[arg(short, long)]
	preview: bool,

	/// Restore one region at a time on the main thread
	#[arg(long)]
	sequential: bool,

	/// Don't report progress
	#[arg(long)]
	no_pbar: bool,

	/// More output (-v debug, -vv trace)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// TOML file overriding the restore settings
	#[arg(long)]
	config: Option<PathBuf>,
}

impl Args {
	fn to_options(&self) -> McResult<RestoreOptions> {
		let config = match &self.config {
			Some(path) => RestoreConfig::from_toml_file(path)?,
			None => RestoreConfig::default(),
		};
		let boundary = self.boundary
			.as_deref()
			.map(Boundary::try_from)
			.transpose()?;
		Ok(RestoreOptions {
			original: self.original.clone(),
			active: self.active.clone(),
			exclude_claims: self.exclude == Some(Exclude::Claims),
			boundary,
			preview: self.preview,
			sequential: self.sequential,
			progress: !self.no_pbar,
			config,
		})
	}
}

fn restore(args: Args) -> i32 {
	let _logging = match init_logging(DEFAULT_LOG_DIR, args.verbose) {
		Ok(guard) => {
			tracing::debug!(path = %guard.log_path.display(), "Logging to file");
			Some(guard)
		}
		Err(err) => {
			eprintln!("Failed to set up logging: {err}");
			None
		}
	};
	let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new());

	let options = match args.to_options() {
		Ok(options) => options,
		Err(err) => {
			tracing::error!("{err}");
			return err.exit_code();
		}
	};

	let cancel = CancelToken::new();
	let handler_token = cancel.clone();
	if let Err(err) = ctrlc::set_handler(move || {
		tracing::warn!("Interrupt received, waiting for running regions to finish");
		handler_token.cancel();
	}) {
		tracing::warn!("Failed to install the interrupt handler: {err}");
	}

	match run(&options, logger, &cancel) {
		Ok(summary) => summary.exit_code(),
		Err(err) => {
			tracing::error!("{err}");
			err.exit_code()
		}
	}
}

fn main() {
	let code = restore(Args::parse());
	process::exit(code);
}
