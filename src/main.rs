// SPDX-License-Identifier: Apache-2.0 OR MIT
mod app;

use self::app::args::{AppArgs, USAGE};
use asar_patcher::{ConsoleReporter, LogKind, Reporter};
use clap::{error::ErrorKind, Parser};
use color_eyre::{eyre::WrapErr, Result};

fn main() -> Result<()> {
	color_eyre::install().wrap_err("failed to install color-eyre handler")?;
	let mut reporter = ConsoleReporter;
	let args = match AppArgs::try_parse() {
		Ok(args) => args,
		Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
			err.exit()
		}
		Err(_) => {
			reporter.report(LogKind::Usage, USAGE);
			return Ok(());
		}
	};

	match asar_patcher::run(&args.archive, &args.patch, &mut reporter) {
		Ok(_) => Ok(()),
		Err(err) if err.is_fatal() => Err(err).wrap_err_with(|| {
			format!("failed to patch archive {}", args.archive.display())
		}),
		// already reported
		Err(_) => Ok(()),
	}
}
