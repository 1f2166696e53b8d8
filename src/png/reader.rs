use tracing::{debug, info, warn};

use super::*;
use crate::{
  int_endian::U32BE,
  parser_helpers::{try_pull_byte_array, try_pull_pod, try_pull_slice},
  FixError, FixResult, Limits,
};

/// Parses PNG bytes into an owned list of chunks, ending with `IEND`.
///
/// Anything after the `IEND` chunk is ignored. Declared CRCs are kept as-is,
/// a mismatch is only logged as a warning.
///
/// ## Failure
/// * [`FixError::NotAPng`] if the signature is missing or wrong.
/// * [`FixError::ChunkTooLarge`] if a chunk declares more than
///   `limits.max_chunk_len` bytes of data.
/// * [`FixError::MalformedContainer`] if the input runs out mid-chunk, ends
///   without an `IEND`, or holds `limits.max_chunks` chunks without one.
pub fn read_chunks(bytes: &[u8], limits: &Limits) -> FixResult<Vec<Chunk>> {
  if !is_png_header_correct(bytes) {
    return Err(FixError::NotAPng);
  }
  let mut spare = &bytes[PNG_SIGNATURE.len()..];
  let offset_of = |rest: &[u8]| bytes.len() - rest.len();
  let mut chunks = Vec::new();

  loop {
    if chunks.len() >= limits.max_chunks {
      return Err(FixError::MalformedContainer {
        reason: "too many chunks before IEND",
        offset: offset_of(spare),
      });
    }
    if spare.is_empty() {
      return Err(FixError::MalformedContainer {
        reason: "input ended before IEND",
        offset: offset_of(spare),
      });
    }
    let truncated = |rest: &[u8]| FixError::MalformedContainer {
      reason: "truncated chunk",
      offset: offset_of(rest),
    };

    let (length, rest) = try_pull_pod::<U32BE>(spare).ok_or_else(|| truncated(spare))?;
    let (type_bytes, rest) = try_pull_byte_array::<4>(rest).ok_or_else(|| truncated(rest))?;
    let chunk_type = ChunkType(type_bytes);
    let length = length.to_u32();
    if length as usize > limits.max_chunk_len {
      return Err(FixError::ChunkTooLarge {
        chunk_type,
        declared: length,
        max: limits.max_chunk_len,
      });
    }
    let (data, rest) = try_pull_slice(rest, length as usize).ok_or_else(|| truncated(rest))?;
    let (declared_crc, rest) = try_pull_pod::<U32BE>(rest).ok_or_else(|| truncated(rest))?;
    spare = rest;

    let chunk = Chunk::with_declared_crc(chunk_type, data.to_vec(), declared_crc.to_u32());
    info!("Found chunk: {chunk_type}");
    info!("Length: {length}, CRC32: {:08x}", chunk.crc());
    if !chunk.is_crc_correct() {
      let actual = chunk.compute_actual_crc();
      warn!("{chunk_type} declared CRC {:08x}, actual {actual:08x}", chunk.crc());
    }
    chunks.push(chunk);

    if chunk_type == ChunkType::IEND {
      if !spare.is_empty() {
        debug!("ignoring {} bytes after IEND", spare.len());
      }
      return Ok(chunks);
    }
  }
}
