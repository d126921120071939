// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{
	error::{Error, Result},
	util::{normalize_within, stays_within_root},
	writer::AsarWriter,
};
use std::{
	fs::{self, File},
	io::{self, BufWriter},
	path::{Path, PathBuf},
};
use walkdir::WalkDir;

/// Packs every file, directory and symlink under `dir` into a new archive at
/// `output`, returning the number of bytes written.
///
/// Symlinks must point somewhere inside `dir`; their targets are stored
/// relative to the archive root.
pub fn pack_dir(dir: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
	let dir = dir.as_ref();
	let output = output.as_ref();
	let mut asar = AsarWriter::new();
	for entry in WalkDir::new(dir).min_depth(1).sort_by_file_name() {
		let entry = entry.map_err(io::Error::from)?;
		let path = entry.path();
		let stripped_path = path
			.strip_prefix(dir)
			.map_err(|_| Error::PathEscapesRoot(path.to_path_buf()))?;
		let file_type = entry.file_type();

		if file_type.is_symlink() {
			let link = fs::read_link(path)?;
			let target = if link.is_absolute() {
				link
			} else {
				stripped_path
					.parent()
					.map_or_else(|| link.clone(), |parent| parent.join(&link))
			};
			let stripped_link = link_within(dir, &target)?;
			asar.write_symlink(stripped_path, stripped_link)?;
			continue;
		}

		if file_type.is_dir() {
			asar.create_dir(stripped_path)?;
			continue;
		}

		let file = fs::read(path)?;
		asar.write_file(stripped_path, &file, is_executable::is_executable(path))?;
	}

	let mut out = BufWriter::new(File::create(output)?);
	let written = asar.finalize(&mut out)?;
	out.into_inner()
		.map_err(|err| err.into_error())?
		.sync_all()?;

	Ok(written)
}

/// Turns a symlink target into a path relative to `root`. Absolute targets
/// must live under `root`, relative ones are resolved lexically.
fn link_within(root: &Path, target: &Path) -> Result<PathBuf> {
	let relative = if target.is_absolute() {
		target
			.strip_prefix(root)
			.map_err(|_| Error::PathEscapesRoot(target.to_path_buf()))?
			.to_path_buf()
	} else {
		target.to_path_buf()
	};
	match normalize_within(&relative) {
		Some(normalized) if stays_within_root(&normalized) => Ok(normalized),
		_ => Err(Error::PathEscapesRoot(target.to_path_buf())),
	}
}
