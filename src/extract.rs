// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{
	error::{Error, Result},
	reader::AsarReader,
	util::{stays_within_root, with_suffix},
};
use std::{
	fs, io,
	path::{Path, PathBuf},
};

/// Extracts every entry of the archive at `archive` into `destination`,
/// creating it if needed. Files already present in `destination` are
/// overwritten; anything else there is left alone.
///
/// Unpacked files are copied from the `<archive>.unpacked` directory that
/// sits beside the archive.
pub fn extract_all(archive: impl AsRef<Path>, destination: impl AsRef<Path>) -> Result<()> {
	let archive = archive.as_ref();
	let destination = destination.as_ref();
	let file = fs::read(archive)?;
	let reader = AsarReader::new(&file)?;
	fs::create_dir_all(destination)?;

	for dir in reader.directories().keys() {
		if dir.as_os_str().is_empty() {
			continue;
		}
		fs::create_dir_all(resolve(destination, dir)?)?;
	}

	let unpacked_root = with_suffix(archive, ".unpacked");
	for (path, file) in reader.files() {
		let out_path = resolve(destination, path)?;
		if let Some(parent) = out_path.parent() {
			fs::create_dir_all(parent)?;
		}
		if file.unpacked() {
			fs::copy(unpacked_root.join(path), &out_path)?;
			continue;
		}
		fs::write(&out_path, file.data())?;
		if file.executable() {
			set_executable(&out_path)?;
		}
	}

	for (path, target) in reader.symlinks() {
		let out_path = resolve(destination, path)?;
		resolve(destination, target)?;
		if let Some(parent) = out_path.parent() {
			fs::create_dir_all(parent)?;
		}
		if out_path.symlink_metadata().is_ok() {
			fs::remove_file(&out_path)?;
		}
		symlink(&relative_link_target(path, target), &out_path)?;
	}

	Ok(())
}

fn resolve(destination: &Path, path: &Path) -> Result<PathBuf> {
	if !stays_within_root(path) {
		return Err(Error::PathEscapesRoot(path.to_path_buf()));
	}
	Ok(destination.join(path))
}

/// Archive links are relative to the archive root; on disk they need to be
/// relative to the directory holding the link.
fn relative_link_target(link_path: &Path, target: &Path) -> PathBuf {
	let depth = link_path
		.parent()
		.map_or(0, |parent| parent.components().count());
	let mut relative = std::iter::repeat("..").take(depth).collect::<PathBuf>();
	relative.push(target);
	relative
}

#[cfg(unix)]
fn set_executable(path: &Path) -> io::Result<()> {
	use std::os::unix::fs::PermissionsExt;

	let mut permissions = fs::metadata(path)?.permissions();
	permissions.set_mode(permissions.mode() | 0o111);
	fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> io::Result<()> {
	Ok(())
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
	std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
	std::os::windows::fs::symlink_file(target, link)
}

#[cfg(not(any(unix, windows)))]
fn symlink(_target: &Path, link: &Path) -> io::Result<()> {
	Err(io::Error::new(
		io::ErrorKind::Unsupported,
		format!("cannot create symlink {}", link.display()),
	))
}
