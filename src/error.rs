use std::{io, path::PathBuf};

use miniz_oxide::inflate::TINFLStatus;

use crate::png::ChunkType;

/// An error from the `fixpng` crate.
///
/// Every variant is fatal to the run that produced it.
#[derive(Debug, thiserror::Error)]
pub enum FixError {
  /// Wrong number of command line arguments.
  #[error("Usage: {program} <input> <output>")]
  Usage {
    /// How the binary was invoked (`argv[0]`).
    program: String,
  },

  /// The input file couldn't be read.
  #[error("couldn't read file '{}': {source}", .path.display())]
  Read {
    /// The input path.
    path: PathBuf,
    /// The underlying error.
    #[source]
    source: io::Error,
  },

  /// The output file couldn't be created or written.
  #[error("couldn't write file '{}': {source}", .path.display())]
  Write {
    /// The output path.
    path: PathBuf,
    /// The underlying error.
    #[source]
    source: io::Error,
  },

  /// Writing to the output sink failed.
  #[error("write failed: {0}")]
  Io(#[from] io::Error),

  /// The first 8 bytes aren't the PNG signature.
  #[error("this is not a PNG file")]
  NotAPng,

  /// The chunk framing is broken or exceeds the chunk count limit.
  #[error("malformed PNG at byte {offset}: {reason}")]
  MalformedContainer {
    /// What went wrong.
    reason: &'static str,
    /// Offset into the input where the problem was found.
    offset: usize,
  },

  /// A chunk declares more data than the working limit allows.
  #[error("{chunk_type} chunk declares {declared} bytes, the limit is {max}")]
  ChunkTooLarge {
    /// Type of the offending chunk.
    chunk_type: ChunkType,
    /// The declared length.
    declared: u32,
    /// The configured limit.
    max: usize,
  },

  /// A chunk holds more data than its `u32` length field can describe.
  #[error("{chunk_type} chunk holds {len} bytes, too many for a u32 length")]
  ChunkDataTooLong {
    /// Type of the offending chunk.
    chunk_type: ChunkType,
    /// Length of its data.
    len: usize,
  },

  /// The pixel data stream couldn't be decoded.
  #[error("pixel data decompression failed: {fault}")]
  Compression {
    /// What the inflater reported.
    fault: InflateFault,
  },

  /// Inflated or deflated pixel data would be larger than the working limit.
  #[error("{stage} output exceeds the {limit} byte limit")]
  BufferOverflow {
    /// Which half of the recompression overflowed.
    stage: CompressionStage,
    /// The configured limit.
    limit: usize,
  },
}

/// Things that go wrong while inflating pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InflateFault {
  /// The stream asks for a preset dictionary, which PNG never supplies.
  NeedsDictionary,
  /// The stream ended before its final block.
  Truncated,
  /// The inflater rejected the data.
  Data(TINFLStatus),
}
impl core::fmt::Display for InflateFault {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    match self {
      Self::NeedsDictionary => f.write_str("stream requires a preset dictionary"),
      Self::Truncated => f.write_str("stream is truncated"),
      Self::Data(status) => write!(f, "corrupt stream ({status:?})"),
    }
  }
}

/// The two halves of pixel data recompression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionStage {
  /// Decompressing the source stream.
  Inflate,
  /// Compressing the zlib output stream.
  Deflate,
}
impl core::fmt::Display for CompressionStage {
  fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
    f.write_str(match self {
      Self::Inflate => "inflate",
      Self::Deflate => "deflate",
    })
  }
}

/// Shorthand for results in this crate.
pub type FixResult<T> = Result<T, FixError>;
