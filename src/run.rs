// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{
	error::Error,
	extract::extract_all,
	pack::pack_dir,
	patch::{apply_patches, read_json, PackageMetadata, PatchDescriptor, PatchError},
	report::Reporter,
	util::{has_extension, with_suffix},
};
use std::{
	fs, io,
	path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// Name of the directory, next to the archive, that it is extracted into.
pub const WORKSPACE_DIR: &str = "extracted";
/// Appended to the archive's file name to form the backup's name.
pub const BACKUP_SUFFIX: &str = ".old";
const PACKAGE_METADATA: &str = "package.json";

#[derive(Debug, ThisError)]
pub enum RunError {
	#[error("{0}")]
	InvalidArgument(String),
	#[error("couldn't read package or patch data from {}: {reason}", .path.display())]
	MalformedInput { path: PathBuf, reason: String },
	#[error("{} missing from extracted archive", .0.display())]
	MissingMetadata(PathBuf),
	#[error("version mismatch between archive ({archive}) and patch file ({patch})")]
	VersionMismatch { archive: String, patch: String },
	#[error("failed to apply patches: {0}")]
	PatchApplicationFailed(PatchError),
	#[error("failed to {action} {}", .path.display())]
	Io {
		action: &'static str,
		path: PathBuf,
		#[source]
		source: io::Error,
	},
	#[error("failed to {action} {}", .path.display())]
	Archive {
		action: &'static str,
		path: PathBuf,
		#[source]
		source: Error,
	},
}

impl RunError {
	/// Fatal errors come from the filesystem or the archive codec rather than
	/// from the inputs failing a check.
	pub const fn is_fatal(&self) -> bool {
		matches!(self, Self::Io { .. } | Self::Archive { .. })
	}
}

impl From<PatchError> for RunError {
	fn from(err: PatchError) -> Self {
		match err {
			PatchError::Io { file, source, .. } => Self::Io {
				action: "patch",
				path: file,
				source,
			},
			err => Self::PatchApplicationFailed(err),
		}
	}
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
	pub patches_applied: usize,
	/// Where the original archive was moved to.
	pub backup: PathBuf,
}

/// The directory `archive` is extracted into while it is being patched.
pub fn workspace_dir(archive: &Path) -> PathBuf {
	archive
		.parent()
		.unwrap_or_else(|| Path::new(""))
		.join(WORKSPACE_DIR)
}

/// Extracts `archive`, applies the patches described by `patch_file` to the
/// extracted files, then moves the original archive to `<archive>.old` and
/// packs the patched files in its place.
///
/// Nothing is renamed or repacked unless every patch applies. A failed run
/// leaves the extracted files on disk; a later run extracts over them.
///
/// Failed checks are reported through `reporter` before being returned.
/// Fatal errors (see [`RunError::is_fatal`]) are only returned.
pub fn run(
	archive: impl AsRef<Path>,
	patch_file: impl AsRef<Path>,
	reporter: &mut dyn Reporter,
) -> Result<RunSummary, RunError> {
	let result = patch_archive(archive.as_ref(), patch_file.as_ref(), reporter);
	if let Err(err) = &result {
		if !err.is_fatal() {
			reporter.error(&err.to_string());
		}
	}
	result
}

fn patch_archive(
	archive: &Path,
	patch_file: &Path,
	reporter: &mut dyn Reporter,
) -> Result<RunSummary, RunError> {
	if !has_extension(archive, "asar") {
		return Err(RunError::InvalidArgument(format!(
			"the first argument must be an .asar file, got {}",
			archive.display()
		)));
	}
	if !has_extension(patch_file, "json") {
		return Err(RunError::InvalidArgument(format!(
			"the second argument must be a .json file, got {}",
			patch_file.display()
		)));
	}

	let workspace = workspace_dir(archive);
	fs::create_dir_all(&workspace).map_err(|source| RunError::Io {
		action: "create",
		path: workspace.clone(),
		source,
	})?;

	reporter.info(&format!(
		"Extracting {} into {}.",
		archive.display(),
		workspace.display()
	));
	extract_all(archive, &workspace).map_err(|source| RunError::Archive {
		action: "extract",
		path: archive.to_path_buf(),
		source,
	})?;

	let metadata_path = workspace.join(PACKAGE_METADATA);
	if !metadata_path.is_file() {
		return Err(RunError::MissingMetadata(metadata_path));
	}
	let package = load::<PackageMetadata>(&metadata_path)?;
	let descriptor = load::<PatchDescriptor>(patch_file)?;

	if package.version != descriptor.version {
		return Err(RunError::VersionMismatch {
			archive: package.version,
			patch: descriptor.version,
		});
	}

	reporter.info(&format!(
		"Applying {} patches to {} {}.",
		descriptor.patches.len(),
		package.name.as_deref().unwrap_or("app"),
		package.version
	));
	let applied = apply_patches(&workspace, &descriptor.patches)?;

	let backup = with_suffix(archive, BACKUP_SUFFIX);
	if backup.symlink_metadata().is_ok() {
		return Err(RunError::Io {
			action: "back up",
			path: archive.to_path_buf(),
			source: io::Error::new(
				io::ErrorKind::AlreadyExists,
				format!("{} already exists", backup.display()),
			),
		});
	}
	fs::rename(archive, &backup).map_err(|source| RunError::Io {
		action: "back up",
		path: archive.to_path_buf(),
		source,
	})?;

	pack_dir(&workspace, archive).map_err(|source| RunError::Archive {
		action: "repack",
		path: archive.to_path_buf(),
		source,
	})?;
	reporter.success(&format!("Applied {applied} patches."));

	reporter.info("Cleaning up.");
	let _ = fs::remove_dir_all(&workspace);
	reporter.success("Done!");

	Ok(RunSummary {
		patches_applied: applied,
		backup,
	})
}

/// Missing and unparseable files are the same failure here.
fn load<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, RunError> {
	read_json(path).map_err(|err| RunError::MalformedInput {
		path: path.to_path_buf(),
		reason: err.to_string(),
	})
}
