use core::fmt::Write;

/// The four byte tag that says what a chunk holds.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct ChunkType(pub [u8; 4]);
#[allow(nonstandard_style)]
impl ChunkType {
  /// Image header
  pub const IHDR: Self = Self(*b"IHDR");
  /// Image data
  pub const IDAT: Self = Self(*b"IDAT");
  /// Image end
  pub const IEND: Self = Self(*b"IEND");
  /// The vendor marker for raw-deflate, BGRA pixel data.
  pub const CgBI: Self = Self(*b"CgBI");

  /// The tag bytes.
  #[inline]
  #[must_use]
  pub const fn as_bytes(&self) -> &[u8; 4] {
    &self.0
  }
}
impl core::fmt::Debug for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char('\"')?;
    core::fmt::Display::fmt(self, f)?;
    f.write_char('\"')
  }
}
impl core::fmt::Display for ChunkType {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_char(self.0[0] as char)?;
    f.write_char(self.0[1] as char)?;
    f.write_char(self.0[2] as char)?;
    f.write_char(self.0[3] as char)?;
    Ok(())
  }
}
impl From<[u8; 4]> for ChunkType {
  #[inline]
  #[must_use]
  fn from(array: [u8; 4]) -> Self {
    Self(array)
  }
}

#[test]
fn test_chunk_type_formatting() {
  assert_eq!(format!("{}", ChunkType::CgBI), "CgBI");
  assert_eq!(format!("{:?}", ChunkType::IDAT), "\"IDAT\"");
  assert_eq!(ChunkType::from(*b"IEND"), ChunkType::IEND);
}
