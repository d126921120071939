// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::{
	error::{Error, Result},
	header::{File, FileIntegrity, HashAlgorithm, Header},
	reader::AsarReader,
};
use byteorder::{LittleEndian, WriteBytesExt};
use std::{
	collections::{HashMap, VecDeque},
	io::Write,
	path::{Component, Path, PathBuf},
};

const BLOCK_SIZE: usize = 4 * 1024 * 1024; // 4 MiB

pub struct AsarWriter {
	entries: HashMap<PathBuf, Header>,
	buffer: Vec<u8>,
	offset: usize,
	hasher: HashAlgorithm,
}

impl AsarWriter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Copies every packed file and symlink of `reader` into this writer.
	/// Unpacked files have no data in the reader and are skipped.
	pub fn add_from_reader(&mut self, reader: &AsarReader) -> Result<()> {
		for (path, file) in reader.files() {
			if file.unpacked() {
				continue;
			}
			self.write_file(path, file.data(), file.executable())?;
		}
		for (path, link) in reader.symlinks() {
			self.write_symlink(path, link)?;
		}
		Ok(())
	}

	/// Write a file to the archive.
	/// This appends the contents to the writer, adds the file to the header,
	/// and updates the offset.
	pub fn write_file(
		&mut self,
		path: impl AsRef<Path>,
		bytes: impl AsRef<[u8]>,
		executable: bool,
	) -> Result<()> {
		self.write_file_impl(path.as_ref(), bytes.as_ref(), executable)
	}

	fn write_file_impl(&mut self, path: &Path, bytes: &[u8], executable: bool) -> Result<()> {
		path_to_reverse_components(path)?;
		if self.entries.contains_key(path) {
			return Err(Error::FileAlreadyWritten(path.to_path_buf()));
		}
		let file = File::new(
			self.offset,
			bytes.len(),
			executable,
			FileIntegrity::new(
				self.hasher,
				self.hasher.hash(bytes),
				BLOCK_SIZE,
				self.hasher.hash_blocks(BLOCK_SIZE, bytes),
			),
		);
		self.buffer.extend_from_slice(bytes);
		self.offset += bytes.len();
		self.entries.insert(path.to_path_buf(), Header::File(file));
		Ok(())
	}

	/// Write a symlink to the archive. `target` is relative to the archive
	/// root.
	pub fn write_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		path_to_reverse_components(path)?;
		if self.entries.contains_key(path) {
			return Err(Error::FileAlreadyWritten(path.to_path_buf()));
		}
		self.entries.insert(path.to_path_buf(), Header::Link {
			link: target.as_ref().to_path_buf(),
		});
		Ok(())
	}

	/// Add a directory to the archive, so it is kept even if nothing is
	/// written inside it.
	pub fn create_dir(&mut self, path: impl AsRef<Path>) -> Result<()> {
		let path = path.as_ref();
		path_to_reverse_components(path)?;
		match self.entries.get(path) {
			Some(Header::Directory { .. }) => Ok(()),
			Some(_) => Err(Error::FileAlreadyWritten(path.to_path_buf())),
			None => {
				self.entries.insert(path.to_path_buf(), Header::new());
				Ok(())
			}
		}
	}

	/// Finalizes the archive, writing the header + files to the writer.
	pub fn finalize<FinalWriter>(self, mut final_writer: FinalWriter) -> Result<usize>
	where
		FinalWriter: Write,
	{
		let mut header = Header::new();
		for (path, entry) in self.entries {
			let path = path_to_reverse_components(&path)?;
			recursive_add_to_header(path, entry, &mut header);
		}
		let mut written = 0;
		let json = serde_json::to_string(&header)?;

		let json_size = json.len() as u32;
		let aligned_json_size = json_size + (4 - (json_size % 4)) % 4;
		final_writer.write_u32::<LittleEndian>(4)?;
		written += std::mem::size_of::<u32>();
		final_writer.write_u32::<LittleEndian>(aligned_json_size + 8)?;
		written += std::mem::size_of::<u32>();
		final_writer.write_u32::<LittleEndian>(aligned_json_size + 4)?;
		written += std::mem::size_of::<u32>();
		final_writer.write_u32::<LittleEndian>(json_size)?;
		written += std::mem::size_of::<u32>();
		final_writer.write_all(json.as_bytes())?;
		written += json.len();
		let padding = (aligned_json_size - json_size) as usize;
		final_writer.write_all(&[0_u8; 3][..padding])?;
		written += padding;
		final_writer.write_all(&self.buffer)?;
		written += self.buffer.len();
		final_writer.flush()?;
		Ok(written)
	}
}

impl Default for AsarWriter {
	fn default() -> Self {
		Self {
			entries: HashMap::new(),
			offset: 0,
			buffer: Vec::new(),
			hasher: HashAlgorithm::Sha256,
		}
	}
}

fn path_to_reverse_components(path: &Path) -> Result<VecDeque<String>> {
	let mut components = VecDeque::new();
	for component in path.components() {
		match component {
			Component::Prefix(_) | Component::RootDir | Component::CurDir => {}
			Component::ParentDir => return Err(Error::PathEscapesRoot(path.to_path_buf())),
			Component::Normal(name) => components.push_back(
				name.to_str()
					.map(str::to_string)
					.unwrap_or_else(|| name.to_string_lossy().into_owned()),
			),
		}
	}
	if components.is_empty() {
		return Err(Error::PathEscapesRoot(path.to_path_buf()));
	}
	Ok(components)
}

fn recursive_add_to_header(mut path: VecDeque<String>, entry: Header, header: &mut Header) {
	let header_map = match header {
		Header::Directory { files } => files,
		Header::File(_) | Header::Link { .. } => return,
	};
	match path.pop_front() {
		Some(name) if path.is_empty() => match entry {
			Header::Directory { .. } => {
				header_map.entry(name).or_insert(entry);
			}
			_ => {
				header_map.insert(name, entry);
			}
		},
		Some(name) => {
			let new_header = header_map.entry(name).or_insert_with(Header::new);
			recursive_add_to_header(path, entry, new_header);
		}
		None => {
			unreachable!("path must have at least one component");
		}
	};
}
