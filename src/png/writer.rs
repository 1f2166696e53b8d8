use std::io::Write;

use tracing::{debug, warn};

use super::*;
use crate::{FixError, FixResult};

/// Writes the signature and then the chunks, stopping after `IEND`.
///
/// `CgBI` chunks are left out, and only the first `IDAT` is written. Returns
/// how many chunks were written.
///
/// ## Failure
/// * [`FixError::MalformedContainer`] if there's no `IEND` in `chunks`, or
///   [`FixError::ChunkDataTooLong`] if a chunk's data doesn't fit a `u32`
///   length. Both are checked before anything is written.
/// * [`FixError::Io`] if the sink fails.
pub fn write_chunks<W: Write>(w: &mut W, chunks: &[Chunk]) -> FixResult<usize> {
  if !chunks.iter().any(|c| c.chunk_type == ChunkType::IEND) {
    return Err(FixError::MalformedContainer { reason: "chunk list has no IEND", offset: 0 });
  }
  if let Some(chunk) = chunks.iter().find(|c| c.length().is_none()) {
    return Err(FixError::ChunkDataTooLong { chunk_type: chunk.chunk_type, len: chunk.data.len() });
  }
  w.write_all(&PNG_SIGNATURE)?;

  let mut did_idat = false;
  let mut written = 0;
  for chunk in chunks {
    match chunk.chunk_type {
      ChunkType::CgBI => {
        debug!("dropping CgBI chunk");
        continue;
      }
      ChunkType::IDAT if did_idat => {
        warn!("skipping extra IDAT chunk of {} bytes", chunk.data.len());
        continue;
      }
      ChunkType::IDAT => did_idat = true,
      _ => (),
    }
    debug!("writing {} chunk, length {}", chunk.chunk_type, chunk.data.len());
    chunk.write_to(w)?;
    written += 1;
    if chunk.chunk_type == ChunkType::IEND {
      break;
    }
  }
  Ok(written)
}
