// SPDX-License-Identifier: Apache-2.0 OR MIT
use crate::error::{Error, Result};
use byteorder::{LittleEndian, ReadBytesExt};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as, DisplayFromStr};
use std::{collections::HashMap, io::Read as _, path::PathBuf};

#[cfg(test)]
pub(crate) static TEST_ASAR: &[u8] = include_bytes!("../data/test.asar");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Header {
	File(File),
	Directory { files: HashMap<String, Self> },
	/// A symlink, pointing to a path relative to the root of the archive.
	Link { link: PathBuf },
}

impl Header {
	/// Creates an empty directory node.
	pub fn new() -> Self {
		Self::Directory {
			files: HashMap::new(),
		}
	}

	/// Reads the header from a slice.
	///
	/// Returns the header, along with the offset that file data begins at.
	pub fn read<Read: ReadBytesExt>(data: &mut Read) -> Result<(Self, usize)> {
		data.read_u32::<LittleEndian>()?; // size of the header size field, always 4
		let header_size = data.read_u32::<LittleEndian>()? as usize;
		data.read_u32::<LittleEndian>()?;
		let json_size = data.read_u32::<LittleEndian>()?;
		let mut bytes = Vec::new();
		data.by_ref().take(u64::from(json_size)).read_to_end(&mut bytes)?;
		if bytes.len() < json_size as usize {
			return Err(Error::Truncated);
		}
		Ok((serde_json::from_slice(&bytes)?, header_size + 8))
	}
}

impl Default for Header {
	fn default() -> Self {
		Self::new()
	}
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct File {
	/// The offset from the end of the header that this file is located at.
	/// Unpacked files have no offset.
	#[serde_as(as = "Option<DisplayFromStr>")]
	#[serde(skip_serializing_if = "Option::is_none")]
	offset: Option<usize>,
	/// The total size of the file.
	size: usize,
	/// Whether this file is executable or not.
	#[serde(skip_serializing_if = "is_false", default = "default_false")]
	executable: bool,
	/// Whether this file is stored next to the archive instead of inside it.
	#[serde(skip_serializing_if = "is_false", default = "default_false")]
	unpacked: bool,
	/// Integrity details of the file, such as hashes.
	#[serde(skip_serializing_if = "Option::is_none", default)]
	integrity: Option<FileIntegrity>,
}

impl File {
	pub fn new(
		offset: usize,
		size: usize,
		executable: bool,
		integrity: FileIntegrity,
	) -> Self {
		Self {
			offset: Some(offset),
			size,
			executable,
			unpacked: false,
			integrity: Some(integrity),
		}
	}

	/// The offset from the end of the header that this file is located at.
	#[inline]
	pub const fn offset(&self) -> Option<usize> {
		self.offset
	}

	/// The total size of the file.
	#[inline]
	pub const fn size(&self) -> usize {
		self.size
	}

	/// Whether this file is executable or not.
	#[inline]
	pub const fn executable(&self) -> bool {
		self.executable
	}

	/// Whether this file lives in the `.unpacked` directory beside the
	/// archive.
	#[inline]
	pub const fn unpacked(&self) -> bool {
		self.unpacked || self.offset.is_none()
	}

	/// Integrity details of the file, such as hashes.
	#[inline]
	pub const fn integrity(&self) -> Option<&FileIntegrity> {
		self.integrity.as_ref()
	}
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIntegrity {
	/// The hashing algorithm used to calculate the hash.
	algorithm: HashAlgorithm,
	/// The hash of the file, in hex format.
	#[serde_as(as = "Hex")]
	hash: Vec<u8>,
	/// The size of each "block" to be hashed in a file.
	block_size: usize,
	/// The hash of each "block" in a file.
	#[serde_as(as = "Vec<Hex>")]
	blocks: Vec<Vec<u8>>,
}

impl FileIntegrity {
	pub fn new(
		algorithm: HashAlgorithm,
		hash: Vec<u8>,
		block_size: usize,
		blocks: Vec<Vec<u8>>,
	) -> Self {
		Self {
			algorithm,
			hash,
			block_size,
			blocks,
		}
	}

	/// The hashing algorithm used to calculate the hash.
	#[inline]
	pub const fn algorithm(&self) -> HashAlgorithm {
		self.algorithm
	}

	/// The hash of the file
	#[inline]
	pub fn hash(&self) -> &[u8] {
		&self.hash
	}

	/// The size of each "block" to be hashed in a file.
	#[inline]
	pub const fn block_size(&self) -> usize {
		self.block_size
	}

	/// The hash of each "block" in a file.
	#[inline]
	pub fn blocks(&self) -> &[Vec<u8>] {
		&self.blocks
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum HashAlgorithm {
	/// The SHA-256 hashing algorithm
	#[serde(rename = "SHA256")]
	Sha256,
}

const fn is_false(b: &bool) -> bool {
	!*b
}

const fn default_false() -> bool {
	false
}
