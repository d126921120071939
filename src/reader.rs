// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{
	error::{Error, Result},
	header::{FileIntegrity, Header},
};
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

/// An AsarReader is a struct that takes an asar [`Header`] and its offset,
/// and reads the files specified in the header from the given byte buffer.
///
/// The lifetime of the [`AsarReader`] is tied to the lifetime of the byte
/// buffer that it reads from.
///
/// ```rust,no_run
/// use asar_patcher::{AsarReader, Result};
/// use std::fs;
///
/// fn main() -> Result<()> {
/// 	let asar_file = fs::read("archive.asar")?;
/// 	let reader = AsarReader::new(&asar_file)?;
///
/// 	println!("There are {} files in archive.asar", reader.files().len());
/// 	Ok(())
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AsarReader<'a> {
	header: Header,
	directories: HashMap<PathBuf, Vec<PathBuf>>,
	files: HashMap<PathBuf, AsarFile<'a>>,
	symlinks: HashMap<PathBuf, PathBuf>,
}

impl<'a> AsarReader<'a> {
	/// Parses the header at the start of `data`, then reads every entry.
	pub fn new(data: &'a [u8]) -> Result<Self> {
		let (header, offset) = Header::read(&mut &*data)?;
		Self::from_header(header, offset, data)
	}

	pub fn from_header(header: Header, begin_offset: usize, data: &'a [u8]) -> Result<Self> {
		let mut entries = Entries::default();
		recursive_read(PathBuf::new(), &mut entries, &header, begin_offset, data)?;
		Ok(Self {
			header,
			files: entries.files,
			directories: entries.directories,
			symlinks: entries.symlinks,
		})
	}

	/// The parsed header of the archive.
	#[inline]
	pub const fn header(&self) -> &Header {
		&self.header
	}

	/// Gets all files in the asar.
	#[inline]
	pub const fn files(&self) -> &HashMap<PathBuf, AsarFile<'a>> {
		&self.files
	}

	/// Gets all directories in the asar.
	#[inline]
	pub const fn directories(&self) -> &HashMap<PathBuf, Vec<PathBuf>> {
		&self.directories
	}

	/// Gets all symlinks in the asar, mapped to their targets relative to the
	/// archive root.
	#[inline]
	pub const fn symlinks(&self) -> &HashMap<PathBuf, PathBuf> {
		&self.symlinks
	}

	/// Gets information about a file.
	#[inline]
	pub fn read(&self, path: &Path) -> Option<&AsarFile> {
		self.files.get(path)
	}

	/// Gets the contents of a directory.
	#[inline]
	pub fn read_dir(&self, path: &Path) -> Option<&[PathBuf]> {
		self.directories.get(path).map(|paths| paths.as_slice())
	}
}

/// This represents a file in an asar archive, with a byte slice referencing the
/// contents, and the integrity details containing file hashes.
///
/// Unpacked files have no contents in the archive itself; their data is empty
/// and [`AsarFile::unpacked`] is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AsarFile<'a> {
	data: &'a [u8],
	executable: bool,
	unpacked: bool,
	integrity: Option<FileIntegrity>,
}

impl<'a> AsarFile<'a> {
	/// The data of the file.
	#[inline]
	pub const fn data(&self) -> &[u8] {
		self.data
	}

	/// Whether this file is executable or not.
	#[inline]
	pub const fn executable(&self) -> bool {
		self.executable
	}

	/// Whether this file is stored in the `.unpacked` directory beside the
	/// archive.
	#[inline]
	pub const fn unpacked(&self) -> bool {
		self.unpacked
	}

	/// Integrity details of the file, such as hashes.
	#[inline]
	pub const fn integrity(&self) -> Option<&FileIntegrity> {
		self.integrity.as_ref()
	}
}

#[derive(Default)]
struct Entries<'a> {
	files: HashMap<PathBuf, AsarFile<'a>>,
	directories: HashMap<PathBuf, Vec<PathBuf>>,
	symlinks: HashMap<PathBuf, PathBuf>,
}

fn recursive_read<'a>(
	path: PathBuf,
	entries: &mut Entries<'a>,
	header: &Header,
	begin_offset: usize,
	data: &'a [u8],
) -> Result<()> {
	match header {
		Header::File(file) if file.unpacked() => {
			entries.files.insert(path, AsarFile {
				data: &[],
				executable: file.executable(),
				unpacked: true,
				integrity: file.integrity().cloned(),
			});
		}
		Header::File(file) => {
			let data = begin_offset
				.checked_add(file.offset().unwrap_or_default())
				.and_then(|start| Some(start..start.checked_add(file.size())?))
				.and_then(|range| data.get(range))
				.ok_or(Error::Truncated)?;
			#[cfg(feature = "check-integrity-on-read")]
			{
				if let Some(integrity) = file.integrity() {
					let algorithm = integrity.algorithm();
					let block_size = integrity.block_size();
					let blocks = integrity.blocks();
					if block_size > 0 && !blocks.is_empty() {
						for (idx, (block, expected_hash)) in
							data.chunks(block_size).zip(blocks.iter()).enumerate()
						{
							let hash = algorithm.hash(block);
							if hash != *expected_hash {
								return Err(Error::HashMismatch {
									file: path,
									block: Some(idx + 1),
									expected: expected_hash.to_owned(),
									actual: hash,
								});
							}
						}
					}
					let hash = algorithm.hash(data);
					if hash != integrity.hash() {
						return Err(Error::HashMismatch {
							file: path,
							block: None,
							expected: integrity.hash().to_owned(),
							actual: hash,
						});
					}
				}
			}
			entries.files.insert(path, AsarFile {
				data,
				executable: file.executable(),
				unpacked: false,
				integrity: file.integrity().cloned(),
			});
		}
		Header::Link { link } => {
			entries.symlinks.insert(path, link.clone());
		}
		Header::Directory { files } => {
			entries.directories.entry(path.clone()).or_default();
			for (name, header) in files {
				let file_path = path.join(name);
				entries
					.directories
					.entry(path.clone())
					.or_default()
					.push(file_path.clone());
				recursive_read(file_path, entries, header, begin_offset, data)?;
			}
		}
	}
	Ok(())
}
