// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{error, util::normalize_within};
use serde::{de::DeserializeOwned, Deserialize};
use std::{
	fs, io,
	path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

/// A patch file: the version of the app it was written for, and the edits to
/// make, in order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatchDescriptor {
	pub version: String,
	pub patches: Vec<PatchEntry>,
}

/// One literal find/replace edit inside one file of the archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PatchEntry {
	/// Path of the file, relative to the archive root. A leading `/` and `..`
	/// are resolved against the root, but may not leave it.
	pub file: PathBuf,
	pub find: String,
	pub replace: String,
}

/// The fields of the archive's `package.json` that matter here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageMetadata {
	#[serde(default)]
	pub name: Option<String>,
	pub version: String,
}

#[derive(Debug, ThisError)]
pub enum PatchError {
	#[error("patches[{index}]: {} does not exist", .file.display())]
	MissingFile { index: usize, file: PathBuf },
	#[error("patches[{index}]: {} does not contain {find:?}", .file.display())]
	TextNotFound {
		index: usize,
		file: PathBuf,
		find: String,
	},
	#[error("patches[{index}]: {} points outside the archive", .file.display())]
	OutsideArchive { index: usize, file: PathBuf },
	#[error("patches[{index}]: {} is not UTF-8 text", .file.display())]
	NotText { index: usize, file: PathBuf },
	#[error("patches[{index}]: I/O error on {}", .file.display())]
	Io {
		index: usize,
		file: PathBuf,
		#[source]
		source: io::Error,
	},
}

impl PatchError {
	/// Position of the failing entry in the patch list.
	pub const fn index(&self) -> usize {
		match self {
			Self::MissingFile { index, .. }
			| Self::TextNotFound { index, .. }
			| Self::OutsideArchive { index, .. }
			| Self::NotText { index, .. }
			| Self::Io { index, .. } => *index,
		}
	}
}

/// Reads and deserializes a JSON file.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> error::Result<T> {
	let data = fs::read(path)?;
	Ok(serde_json::from_slice(&data)?)
}

/// Applies `patches` in order to the files under `root`, stopping at the
/// first one that cannot be applied.
///
/// Each patch replaces only the first occurrence of its `find` text, and is
/// written back before the next one is looked at, so a later patch sees the
/// result of an earlier one. Nothing is rolled back on failure.
pub fn apply_patches(root: impl AsRef<Path>, patches: &[PatchEntry]) -> Result<usize, PatchError> {
	let root = root.as_ref();
	for (index, patch) in patches.iter().enumerate() {
		apply_patch(root, index, patch)?;
	}
	Ok(patches.len())
}

fn apply_patch(root: &Path, index: usize, patch: &PatchEntry) -> Result<(), PatchError> {
	let file = patch.file.clone();
	let Some(relative) = normalize_within(&patch.file) else {
		return Err(PatchError::OutsideArchive { index, file });
	};
	let path = root.join(relative);
	if !path.is_file() {
		return Err(PatchError::MissingFile { index, file });
	}
	let bytes = match fs::read(&path) {
		Ok(bytes) => bytes,
		Err(source) => return Err(PatchError::Io { index, file, source }),
	};
	let Ok(text) = String::from_utf8(bytes) else {
		return Err(PatchError::NotText { index, file });
	};
	if !text.contains(&patch.find) {
		return Err(PatchError::TextNotFound {
			index,
			file,
			find: patch.find.clone(),
		});
	}
	let patched = text.replacen(&patch.find, &patch.replace, 1);
	fs::write(&path, patched).map_err(|source| PatchError::Io { index, file, source })
}

#[cfg(test)]
mod test {
	use super::{apply_patches, read_json, PackageMetadata, PatchDescriptor, PatchEntry, PatchError};
	use std::fs;
	use tempfile::TempDir;

	fn entry(file: &str, find: &str, replace: &str) -> PatchEntry {
		PatchEntry {
			file: file.into(),
			find: find.into(),
			replace: replace.into(),
		}
	}

	#[test]
	fn dependent_patches_apply_in_order() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("a.js"), "X").unwrap();

		let applied = apply_patches(temp.path(), &[entry("a.js", "X", "Y"), entry("a.js", "Y", "Z")])
			.expect("patches should apply");

		assert_eq!(applied, 2);
		assert_eq!(fs::read_to_string(temp.path().join("a.js")).unwrap(), "Z");
	}

	#[test]
	fn only_first_occurrence_is_replaced() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("a.js"), "isPro() && isPro()").unwrap();

		apply_patches(temp.path(), &[entry("a.js", "isPro()", "true")]).unwrap();

		assert_eq!(
			fs::read_to_string(temp.path().join("a.js")).unwrap(),
			"true && isPro()"
		);
	}

	#[test]
	fn replacement_is_literal() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("a.js"), "price = 10").unwrap();

		apply_patches(temp.path(), &[entry("a.js", "10", "$& $1")]).unwrap();

		assert_eq!(
			fs::read_to_string(temp.path().join("a.js")).unwrap(),
			"price = $& $1"
		);
	}

	#[test]
	fn find_equal_to_replace_leaves_content_unchanged() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("a.js"), "same same").unwrap();

		apply_patches(temp.path(), &[entry("a.js", "same", "same")]).unwrap();

		assert_eq!(fs::read_to_string(temp.path().join("a.js")).unwrap(), "same same");
	}

	#[test]
	fn stops_at_missing_file_without_rollback() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("a.js"), "X").unwrap();
		fs::write(temp.path().join("c.js"), "X").unwrap();

		let err = apply_patches(temp.path(), &[
			entry("a.js", "X", "Y"),
			entry("b.js", "X", "Y"),
			entry("c.js", "X", "Y"),
		])
		.unwrap_err();

		assert!(matches!(err, PatchError::MissingFile { index: 1, .. }));
		assert_eq!(err.index(), 1);
		assert_eq!(fs::read_to_string(temp.path().join("a.js")).unwrap(), "Y");
		assert_eq!(fs::read_to_string(temp.path().join("c.js")).unwrap(), "X");
	}

	#[test]
	fn stops_when_text_is_absent() {
		let temp = TempDir::new().unwrap();
		fs::create_dir_all(temp.path().join("dist")).unwrap();
		fs::write(temp.path().join("dist/main.js"), "hello").unwrap();

		let err = apply_patches(temp.path(), &[entry("dist/main.js", "goodbye", "x")]).unwrap_err();

		match err {
			PatchError::TextNotFound { index, file, find } => {
				assert_eq!(index, 0);
				assert_eq!(file, std::path::Path::new("dist/main.js"));
				assert_eq!(find, "goodbye");
			}
			other => panic!("unexpected error {other:?}"),
		}
		assert_eq!(fs::read_to_string(temp.path().join("dist/main.js")).unwrap(), "hello");
	}

	#[test]
	fn resolves_rooted_and_parent_paths_inside_root() {
		let temp = TempDir::new().unwrap();
		fs::create_dir_all(temp.path().join("dist")).unwrap();
		fs::write(temp.path().join("main.js"), "X X").unwrap();

		let applied = apply_patches(temp.path(), &[
			entry("/main.js", "X", "Y"),
			entry("dist/../main.js", "X", "Z"),
		])
		.expect("both paths name main.js");

		assert_eq!(applied, 2);
		assert_eq!(fs::read_to_string(temp.path().join("main.js")).unwrap(), "Y Z");
	}

	#[test]
	fn rejects_paths_outside_root_and_binary_files() {
		let temp = TempDir::new().unwrap();
		fs::write(temp.path().join("image.png"), [0xff_u8, 0xfe, 0x00]).unwrap();

		assert!(matches!(
			apply_patches(temp.path(), &[entry("../a.js", "X", "Y")]),
			Err(PatchError::OutsideArchive { index: 0, .. })
		));
		assert!(matches!(
			apply_patches(temp.path(), &[entry("a/../../x.js", "X", "Y")]),
			Err(PatchError::OutsideArchive { index: 0, .. })
		));
		assert!(matches!(
			apply_patches(temp.path(), &[entry("image.png", "X", "Y")]),
			Err(PatchError::NotText { index: 0, .. })
		));
		assert!(matches!(
			apply_patches(temp.path(), &[entry(".", "X", "Y")]),
			Err(PatchError::MissingFile { index: 0, .. })
		));
	}

	#[test]
	fn reads_descriptor_and_metadata() {
		let temp = TempDir::new().unwrap();
		let patch = temp.path().join("patch.json");
		fs::write(
			&patch,
			r#"{"version":"9.1.0","patches":[{"file":"a.js","find":"X","replace":"Y"}]}"#,
		)
		.unwrap();
		let package = temp.path().join("package.json");
		fs::write(&package, r#"{"name":"app","version":"9.1.0","main":"a.js"}"#).unwrap();

		let descriptor: PatchDescriptor = read_json(&patch).unwrap();
		assert_eq!(descriptor, PatchDescriptor {
			version: "9.1.0".into(),
			patches: vec![entry("a.js", "X", "Y")],
		});
		let metadata: PackageMetadata = read_json(&package).unwrap();
		assert_eq!(metadata.name.as_deref(), Some("app"));
		assert_eq!(metadata.version, "9.1.0");

		fs::write(&package, r#"{"name":"app"}"#).unwrap();
		assert!(read_json::<PackageMetadata>(&package).is_err());
		assert!(read_json::<PatchDescriptor>(temp.path().join("missing.json")).is_err());
	}
}
