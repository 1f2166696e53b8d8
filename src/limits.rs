/// Working bounds for one repair.
///
/// The defaults (20 chunks, 1 MiB per chunk, 1 MiB of decompressed pixel data)
/// are what the binary uses. Anything past a bound is a hard error, never a
/// silent truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limits {
  /// Most chunks read while looking for `IEND`.
  pub max_chunks: usize,
  /// Largest payload of any single chunk, read or written.
  pub max_chunk_len: usize,
  /// Largest decompressed pixel data stream.
  pub max_pixel_data_len: usize,
}
impl Limits {
  /// The default chunk count limit.
  pub const MAX_CHUNKS: usize = 20;
  /// The default per-chunk and pixel data limit.
  pub const BUFSIZE: usize = 1024 * 1024;
}
impl Default for Limits {
  #[inline]
  #[must_use]
  fn default() -> Self {
    Self {
      max_chunks: Self::MAX_CHUNKS,
      max_chunk_len: Self::BUFSIZE,
      max_pixel_data_len: Self::BUFSIZE,
    }
  }
}
