// SPDX-License-Identifier: Apache-2.0 OR MIT
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![forbid(unsafe_code)]
#![warn(
	clippy::perf,
	clippy::complexity,
	clippy::style,
	clippy::correctness,
	clippy::missing_const_for_fn
)]
#![allow(clippy::tabs_in_doc_comments, clippy::too_many_arguments)]

//! This crate patches [asar](https://github.com/electron/asar) archives, the
//! format [Electron](https://www.electronjs.org/)-based applications ship
//! their code in.
//!
//! A patch file names the app version it was written for, and a list of
//! literal find/replace edits to make to files inside the archive:
//!
//! ```json
//! {
//! 	"version": "8.1.0",
//! 	"patches": [
//! 		{ "file": "src/main.js", "find": "isPro() {", "replace": "isPro() { return true;" }
//! 	]
//! }
//! ```
//!
//! # Examples
//!
//! ## Patching an archive
//! ```rust,no_run
//! use asar_patcher::{run, ConsoleReporter};
//!
//! let summary = run("resources/app.asar", "patch.json", &mut ConsoleReporter)
//! 	.expect("failed to patch");
//! println!("original kept at {}", summary.backup.display());
//! ```
//!
//! ## Listing the contents of an asar archive
//! ```rust,no_run
//! use asar_patcher::{AsarReader, Result};
//! use std::fs;
//!
//! fn main() -> Result<()> {
//! 	let asar_file = fs::read("archive.asar")?;
//! 	let asar = AsarReader::new(&asar_file)?;
//!
//! 	println!("There are {} files in archive.asar", asar.files().len());
//! 	for path in asar.files().keys() {
//! 		println!("{}", path.display());
//! 	}
//! 	Ok(())
//! }
//! ```
//!
//! ## Writing a file to an asar archive
//! ```rust,no_run
//! use asar_patcher::{AsarWriter, Result};
//! use std::fs::File;
//!
//! fn main() -> Result<()> {
//! 	let mut asar = AsarWriter::new();
//! 	asar.write_file("hello.txt", b"Hello, World!", false)?;
//! 	asar.finalize(File::create("archive.asar")?)?;
//! 	Ok(())
//! }
//! ```
//!
//! # Features
//!
//!  - `integrity`: Enable integrity checks/calculation.
//!  - `check-integrity-on-read`: Enable integrity checks when reading an
//!    archive, failing if any integrity check fails.
//!  - `write` - Enable writing an asar archive, and with it packing and
//!    patching. **Enabled by default**, also enables `integrity`.
//!
//! # License
//!
//! `asar-patcher` is licensed under either the [MIT license](LICENSE-MIT) or
//! the [Apache License 2.0](LICENSE-APACHE), at the choice of the user.

/// Error handling for parsing, reading, and writing asar archives.
pub mod error;
/// Extracting asar archives to a directory.
pub mod extract;
/// Header parsing for asar archives.
pub mod header;
#[cfg(feature = "integrity")]
pub mod integrity;
#[cfg(feature = "write")]
/// Packing a directory into an asar archive.
pub mod pack;
/// Patch files and applying them to extracted archives.
pub mod patch;
/// Reading asar archives.
pub mod reader;
/// Console output.
pub mod report;
#[cfg(feature = "write")]
/// Extract, patch, back up and repack an archive.
pub mod run;
mod util;
#[cfg(feature = "write")]
/// Writing asar archives.
pub mod writer;

pub use error::{Error, Result};
pub use extract::extract_all;
pub use header::{File, FileIntegrity, HashAlgorithm, Header};
#[cfg(feature = "write")]
pub use pack::pack_dir;
pub use patch::{apply_patches, PackageMetadata, PatchDescriptor, PatchEntry, PatchError};
pub use reader::{AsarFile, AsarReader};
pub use report::{ConsoleReporter, LogKind, Reporter};
#[cfg(feature = "write")]
pub use run::{run, RunError, RunSummary};
#[cfg(feature = "write")]
pub use writer::AsarWriter;
