// SPDX-License-Identifier: Apache-2.0 OR MIT
use std::{
	ffi::OsString,
	path::{Component, Path, PathBuf},
};

/// Appends `suffix` to the full file name, so `app.asar` becomes
/// `app.asar.old` rather than replacing the extension.
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
	let mut name = OsString::from(path.as_os_str());
	name.push(suffix);
	PathBuf::from(name)
}

/// Whether `path` is relative and never climbs above its starting point.
pub(crate) fn stays_within_root(path: &Path) -> bool {
	!path.as_os_str().is_empty()
		&& path
			.components()
			.all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

/// Resolves `.` and `..` lexically, treating a leading `/` as the root
/// itself. Returns `None` if the path climbs above the root.
pub(crate) fn normalize_within(path: &Path) -> Option<PathBuf> {
	let mut normalized = PathBuf::new();
	for component in path.components() {
		match component {
			Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
			Component::ParentDir => {
				if !normalized.pop() {
					return None;
				}
			}
			Component::Normal(name) => normalized.push(name),
		}
	}
	Some(normalized)
}

/// Case-insensitive check of a path's extension, without the leading dot.
pub(crate) fn has_extension(path: &Path, extension: &str) -> bool {
	path.extension()
		.map_or(false, |ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
}

#[cfg(test)]
mod test {
	use super::{has_extension, normalize_within, stays_within_root, with_suffix};
	use std::path::{Path, PathBuf};

	#[test]
	fn suffix_is_appended() {
		assert_eq!(
			with_suffix(Path::new("resources/app.asar"), ".old"),
			Path::new("resources/app.asar.old")
		);
	}

	#[test]
	fn root_containment() {
		assert!(stays_within_root(Path::new("dist/main.js")));
		assert!(stays_within_root(Path::new("./main.js")));
		assert!(!stays_within_root(Path::new("../main.js")));
		assert!(!stays_within_root(Path::new("dist/../../main.js")));
		assert!(!stays_within_root(Path::new("/etc/passwd")));
		assert!(!stays_within_root(Path::new("")));
	}

	#[test]
	fn normalizes_inside_root() {
		assert_eq!(normalize_within(Path::new("/main.js")), Some(PathBuf::from("main.js")));
		assert_eq!(
			normalize_within(Path::new("dist/./../lib/a.js")),
			Some(PathBuf::from("lib/a.js"))
		);
		assert_eq!(normalize_within(Path::new(".")), Some(PathBuf::new()));
		assert_eq!(normalize_within(Path::new("a/../../x")), None);
		assert_eq!(normalize_within(Path::new("/../x")), None);
	}

	#[test]
	fn extension_check_ignores_case() {
		assert!(has_extension(Path::new("app.ASAR"), "asar"));
		assert!(has_extension(Path::new("dir/patch.Json"), "json"));
		assert!(!has_extension(Path::new("app.asar.old"), "asar"));
		assert!(!has_extension(Path::new(".asar"), "asar"));
		assert!(!has_extension(Path::new("asar"), "asar"));
	}
}
