use miniz_oxide::{
  deflate::{compress_to_vec_zlib, CompressionLevel},
  inflate::{decompress_to_vec_with_limit, decompress_to_vec_zlib_with_limit, TINFLStatus},
};
use tracing::{info, warn};

use super::*;
use crate::{CompressionStage, FixError, FixResult, InflateFault, Limits};

/// How the `IDAT` data of a particular file is compressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelDataEncoding {
  /// Deflate without the zlib wrapper, as used alongside a `CgBI` chunk.
  RawDeflate,
  /// Normal PNG zlib data.
  Zlib,
}
impl PixelDataEncoding {
  /// Raw deflate if there's a `CgBI` chunk before `IEND`, otherwise zlib.
  #[must_use]
  pub fn detect(chunks: &[Chunk]) -> Self {
    let has_cgbi = chunks
      .iter()
      .take_while(|c| c.chunk_type != ChunkType::IEND)
      .any(|c| c.chunk_type == ChunkType::CgBI);
    if has_cgbi {
      Self::RawDeflate
    } else {
      Self::Zlib
    }
  }
}

/// What [`recompress_pixel_data`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecompressSummary {
  /// The encoding the source data was read as.
  pub encoding: PixelDataEncoding,
  /// How many `IDAT` chunks were combined into the first one.
  pub merged_chunks: usize,
  /// Size of the decompressed pixel data.
  pub inflated_len: usize,
  /// Size of the new `IDAT` data.
  pub deflated_len: usize,
}

/// Rewrites the image data as a standard zlib stream.
///
/// All `IDAT` chunks before `IEND` are treated as one compressed stream, the
/// same as a PNG decoder would. The whole stream is inflated, deflated again
/// at the default level, and stored in the first `IDAT`, which gets a new
/// CRC. The remaining `IDAT` chunks are removed from the list. Every other
/// chunk is left alone, and nothing after `IEND` is touched.
///
/// Returns `None` if there's no image data at all.
///
/// ## Failure
/// * [`FixError::Compression`] if the data doesn't inflate cleanly. The list
///   is unchanged in this case.
/// * [`FixError::BufferOverflow`] if the inflated data would be bigger than
///   `limits.max_pixel_data_len`, or the new `IDAT` bigger than
///   `limits.max_chunk_len`.
pub fn recompress_pixel_data(
  chunks: &mut Vec<Chunk>, limits: &Limits,
) -> FixResult<Option<RecompressSummary>> {
  let end = chunks.iter().position(|c| c.chunk_type == ChunkType::IEND).unwrap_or(chunks.len());
  let idat_positions: Vec<usize> =
    (0..end).filter(|&i| chunks[i].chunk_type == ChunkType::IDAT).collect();
  let first = match idat_positions.first() {
    Some(&first) => first,
    None => {
      warn!("no IDAT chunk before IEND, nothing to recompress");
      return Ok(None);
    }
  };
  let encoding = PixelDataEncoding::detect(chunks);

  let compressed: Vec<u8> = if idat_positions.len() == 1 {
    chunks[first].data.clone()
  } else {
    idat_positions.iter().flat_map(|&i| chunks[i].data.iter().copied()).collect()
  };
  info!("processing {} IDAT chunk(s) as {encoding:?}", idat_positions.len());

  let inflated = inflate_pixel_data(&compressed, encoding, limits.max_pixel_data_len)?;
  let deflated = deflate_pixel_data(&inflated, limits.max_chunk_len)?;
  let summary = RecompressSummary {
    encoding,
    merged_chunks: idat_positions.len(),
    inflated_len: inflated.len(),
    deflated_len: deflated.len(),
  };

  let idat = &mut chunks[first];
  idat.set_data(deflated);
  info!("Chunk: {}, new length: {}, new CRC: {:08x}", idat.chunk_type, idat.data.len(), idat.crc);

  if idat_positions.len() > 1 {
    warn!("merged {} IDAT chunks into one", idat_positions.len());
    let mut i = 0;
    chunks.retain(|_| {
      let keep = i == first || !idat_positions.contains(&i);
      i += 1;
      keep
    });
  }
  Ok(Some(summary))
}

/// Inflates a whole pixel data stream, bounded by `limit` bytes of output.
pub fn inflate_pixel_data(
  compressed: &[u8], encoding: PixelDataEncoding, limit: usize,
) -> FixResult<Vec<u8>> {
  let result = match encoding {
    PixelDataEncoding::RawDeflate => decompress_to_vec_with_limit(compressed, limit),
    PixelDataEncoding::Zlib => {
      // FDICT: the stream can't be decoded without a dictionary we don't have.
      if matches!(compressed, [_, flg, ..] if flg & 0x20 != 0) {
        return Err(FixError::Compression { fault: InflateFault::NeedsDictionary });
      }
      decompress_to_vec_zlib_with_limit(compressed, limit)
    }
  };
  result.map_err(|e| match e.status {
    TINFLStatus::HasMoreOutput => {
      FixError::BufferOverflow { stage: CompressionStage::Inflate, limit }
    }
    TINFLStatus::FailedCannotMakeProgress | TINFLStatus::NeedsMoreInput => {
      FixError::Compression { fault: InflateFault::Truncated }
    }
    status => FixError::Compression { fault: InflateFault::Data(status) },
  })
}

/// Deflates pixel data into a zlib stream at the default level, as a single
/// finished stream no longer than `limit` bytes.
pub fn deflate_pixel_data(inflated: &[u8], limit: usize) -> FixResult<Vec<u8>> {
  let deflated = compress_to_vec_zlib(inflated, CompressionLevel::DefaultLevel as u8);
  if deflated.len() > limit {
    return Err(FixError::BufferOverflow { stage: CompressionStage::Deflate, limit });
  }
  Ok(deflated)
}
