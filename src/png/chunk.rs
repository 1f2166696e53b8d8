use super::*;
use crate::int_endian::U32BE;

/// An owned chunk from a PNG.
///
/// The length on the wire is always `data.len()`, so the two can't drift
/// apart. The CRC is whatever was declared in the file until something
/// replaces the data, see [`Chunk::set_data`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Chunk {
  pub(crate) chunk_type: ChunkType,
  pub(crate) data: Vec<u8>,
  pub(crate) crc: u32,
}
impl Chunk {
  /// Makes a chunk with a freshly computed CRC.
  #[inline]
  #[must_use]
  pub fn new(chunk_type: ChunkType, data: Vec<u8>) -> Self {
    let crc = chunk_crc(chunk_type, &data);
    Self { chunk_type, data, crc }
  }

  /// Makes a chunk using the CRC as declared, without checking it.
  #[inline]
  #[must_use]
  pub const fn with_declared_crc(chunk_type: ChunkType, data: Vec<u8>, crc: u32) -> Self {
    Self { chunk_type, data, crc }
  }

  #[inline]
  #[must_use]
  pub const fn chunk_type(&self) -> ChunkType {
    self.chunk_type
  }

  #[inline]
  #[must_use]
  pub fn data(&self) -> &[u8] {
    &self.data
  }

  /// Length of the data, as written in the chunk header.
  ///
  /// `None` if the data is too long for the header's `u32` field. Such a chunk
  /// can't be written, see [`write_chunks`].
  #[inline]
  #[must_use]
  pub fn length(&self) -> Option<u32> {
    wire_length(self.data.len())
  }

  /// The CRC that will be written after the data.
  #[inline]
  #[must_use]
  pub const fn crc(&self) -> u32 {
    self.crc
  }

  /// The CRC the type and data actually hash to.
  #[inline]
  #[must_use]
  pub fn compute_actual_crc(&self) -> u32 {
    chunk_crc(self.chunk_type, &self.data)
  }

  /// If the stored CRC matches the type and data.
  #[inline]
  #[must_use]
  pub fn is_crc_correct(&self) -> bool {
    self.crc == self.compute_actual_crc()
  }

  /// Replaces the data and recomputes the CRC to match.
  #[inline]
  pub fn set_data(&mut self, data: Vec<u8>) {
    self.data = data;
    self.crc = self.compute_actual_crc();
  }

  /// Appends the chunk in wire format.
  pub(crate) fn write_to<W: std::io::Write>(&self, w: &mut W) -> std::io::Result<()> {
    let length = self.length().ok_or_else(|| {
      std::io::Error::new(std::io::ErrorKind::InvalidInput, "chunk data too long for a u32 length")
    })?;
    w.write_all(&U32BE::from_u32(length).to_bytes())?;
    w.write_all(self.chunk_type.as_bytes())?;
    if !self.data.is_empty() {
      w.write_all(&self.data)?;
    }
    w.write_all(&U32BE::from_u32(self.crc).to_bytes())
  }
}
impl core::fmt::Debug for Chunk {
  #[inline]
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.debug_struct("Chunk")
      .field("chunk_type", &self.chunk_type)
      .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
      .field("crc", &format_args!("{:08x}", self.crc))
      .finish()
  }
}

/// The header length field for `len` bytes of data, if it fits.
#[inline]
#[must_use]
pub fn wire_length(len: usize) -> Option<u32> {
  u32::try_from(len).ok()
}

#[test]
fn test_wire_length_bounds() {
  assert_eq!(wire_length(0), Some(0));
  assert_eq!(wire_length(u32::MAX as usize), Some(u32::MAX));
  #[cfg(target_pointer_width = "64")]
  assert_eq!(wire_length(u32::MAX as usize + 1), None);
}
