// SPDX-License-Identifier: Apache-2.0 OR MIT
use asar_patcher::{extract_all, run, AsarReader, LogKind};
use std::{
	fs,
	path::{Path, PathBuf},
	process::Command,
};
use tempfile::TempDir;

const TEST_ASAR: &[u8] = include_bytes!("../data/test.asar");

const LICENSE_PATCH: &str = r#"{
	"version": "1.2.3",
	"patches": [
		{ "file": "lib/license.js", "find": "return false;", "replace": "return true;" },
		{ "file": "index.js", "find": "800", "replace": "1024" }
	]
}"#;

fn setup(patch: &str) -> (TempDir, PathBuf, PathBuf) {
	let temp = TempDir::new().unwrap();
	let resources = temp.path().join("resources");
	fs::create_dir_all(&resources).unwrap();
	let archive = resources.join("app.asar");
	fs::write(&archive, TEST_ASAR).unwrap();
	let patch_file = temp.path().join("patch.json");
	fs::write(&patch_file, patch).unwrap();
	(temp, archive, patch_file)
}

fn read_file(archive: &Path, file: &str) -> String {
	let bytes = fs::read(archive).unwrap();
	let reader = AsarReader::new(&bytes).unwrap();
	let file = reader
		.read(Path::new(file))
		.unwrap_or_else(|| panic!("{file} missing from {}", archive.display()));
	String::from_utf8(file.data().to_vec()).unwrap()
}

#[test]
fn test_end_to_end_patch_cycle() {
	let (temp, archive, patch_file) = setup(LICENSE_PATCH);
	let mut log: Vec<(LogKind, String)> = Vec::new();

	let summary = run(&archive, &patch_file, &mut log).expect("patching failed");

	assert_eq!(summary.patches_applied, 2);
	assert_eq!(fs::read(&summary.backup).unwrap(), TEST_ASAR);
	assert!(!temp.path().join("resources/extracted").exists());
	assert!(read_file(&archive, "lib/license.js").contains("return true;"));
	assert!(read_file(&archive, "index.js").contains("width: 1024, height: 600"));
	assert_eq!(
		read_file(&archive, "assets/trial.html"),
		read_file(&summary.backup, "assets/trial.html")
	);
	assert_eq!(log.last(), Some(&(LogKind::Success, "Done!".to_owned())));

	// the patched archive extracts to a complete tree
	let out = temp.path().join("out");
	extract_all(&archive, &out).unwrap();
	for file in [
		"package.json",
		"index.js",
		"lib/license.js",
		"assets/index.html",
		"assets/trial.html",
	] {
		assert!(out.join(file).is_file(), "{file} was not repacked");
	}
}

#[test]
fn test_cli_prints_usage_on_wrong_arity() {
	let output = Command::new(env!("CARGO_BIN_EXE_asar-patcher"))
		.arg("app.asar")
		.output()
		.unwrap();

	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	assert!(stdout.starts_with("[USAGE] "), "{stdout}");
}

#[test]
fn test_cli_reports_each_step() {
	let (_temp, archive, patch_file) = setup(LICENSE_PATCH);

	let output = Command::new(env!("CARGO_BIN_EXE_asar-patcher"))
		.arg(&archive)
		.arg(&patch_file)
		.output()
		.unwrap();

	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	let tags = stdout
		.lines()
		.map(|line| &line[..line.find(']').unwrap() + 1])
		.collect::<Vec<_>>();
	assert_eq!(tags, ["[INFO]", "[INFO]", "[SUCCESS]", "[INFO]", "[SUCCESS]"]);
	assert!(stdout.contains("[SUCCESS] Applied 2 patches."));
}

#[test]
fn test_cli_reports_failed_checks_without_failing() {
	let (temp, archive, patch_file) = setup(r#"{ "version": "0.0.1", "patches": [] }"#);

	let output = Command::new(env!("CARGO_BIN_EXE_asar-patcher"))
		.arg(&archive)
		.arg(&patch_file)
		.output()
		.unwrap();

	assert!(output.status.success());
	let stdout = String::from_utf8(output.stdout).unwrap();
	assert!(stdout.lines().last().unwrap().starts_with("[ERROR] version mismatch"));
	assert_eq!(fs::read(&archive).unwrap(), TEST_ASAR);
	assert!(!temp.path().join("resources/app.asar.old").exists());
}

#[test]
fn test_cli_fails_when_backup_exists() {
	let (temp, archive, patch_file) = setup(LICENSE_PATCH);
	fs::write(temp.path().join("resources/app.asar.old"), b"older backup").unwrap();

	let output = Command::new(env!("CARGO_BIN_EXE_asar-patcher"))
		.arg(&archive)
		.arg(&patch_file)
		.env("RUST_BACKTRACE", "0")
		.output()
		.unwrap();

	assert!(!output.status.success());
	assert_eq!(
		fs::read(temp.path().join("resources/app.asar.old")).unwrap(),
		b"older backup"
	);
	assert_eq!(fs::read(&archive).unwrap(), TEST_ASAR);
}
