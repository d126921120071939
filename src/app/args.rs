// SPDX-License-Identifier: Apache-2.0 OR MIT
use clap::Parser;
use std::path::PathBuf;

pub const USAGE: &str = "asar-patcher [app.asar] [patch.json]";

/// Apply a patch file to an asar archive, keeping the original as
/// <ARCHIVE>.old
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct AppArgs {
	/// The asar archive to patch
	#[clap(value_parser)]
	pub archive: PathBuf,
	/// JSON file describing the patches to apply
	#[clap(value_parser)]
	pub patch: PathBuf,
}
