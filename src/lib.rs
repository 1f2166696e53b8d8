//! A crate for repairing CgBI PNG files.
//!
//! Some device toolchains write PNGs that ordinary decoders can't open: there's
//! an extra `CgBI` chunk, and the image data is a raw deflate stream instead
//! of a zlib stream. This crate removes the `CgBI` chunk and recompresses the
//! image data so the result is a normal PNG. Pixel values are not touched, so
//! the red and blue channels of a repaired image stay swapped.
//!
//! For the whole job in one call, use [`fix_png_bytes`] or [`fix_png_file`].
//! The individual stages live in the [`png`] module.
//!
//! ```no_run
//! use fixpng::{fix_png_bytes, Limits};
//! let cgbi: &[u8] = unimplemented!("data from somewhere");
//! let png: Vec<u8> = fix_png_bytes(cgbi, &Limits::default()).unwrap();
//! ```

use std::{
  fs::File,
  io::{BufWriter, Write},
  path::Path,
};

use tracing::info;

mod error;
pub use error::*;

mod limits;
pub use limits::*;

pub mod int_endian;

mod parser_helpers;

pub mod png;

/// Reads the chunks and recompresses their pixel data, ready for writing.
fn repair_chunks(bytes: &[u8], limits: &Limits) -> FixResult<Vec<png::Chunk>> {
  let mut chunks = png::read_chunks(bytes, limits)?;
  png::recompress_pixel_data(&mut chunks, limits)?;
  Ok(chunks)
}

/// Repairs an in-memory PNG, returning the bytes of the fixed file.
///
/// Input without a `CgBI` chunk is treated as ordinary PNG data: its image data
/// is still recompressed, but decodes to the same bytes as before.
pub fn fix_png_bytes(bytes: &[u8], limits: &Limits) -> FixResult<Vec<u8>> {
  let chunks = repair_chunks(bytes, limits)?;
  let mut out = Vec::with_capacity(bytes.len());
  png::write_chunks(&mut out, &chunks)?;
  Ok(out)
}

/// Repairs the PNG at `input` and writes the result to `output`.
///
/// The output file is only created once the input has been fully read and
/// repaired, so an error never leaves a half written file behind. An existing
/// file at `output` is replaced.
pub fn fix_png_file<P: AsRef<Path>, Q: AsRef<Path>>(
  input: P, output: Q, limits: &Limits,
) -> FixResult<()> {
  let (input, output) = (input.as_ref(), output.as_ref());
  let bytes = std::fs::read(input)
    .map_err(|source| FixError::Read { path: input.to_path_buf(), source })?;
  info!("read {} bytes from {}", bytes.len(), input.display());

  let chunks = repair_chunks(&bytes, limits)?;

  let write_err = |source: std::io::Error| FixError::Write { path: output.to_path_buf(), source };
  let mut w = BufWriter::new(File::create(output).map_err(write_err)?);
  let written = png::write_chunks(&mut w, &chunks).map_err(|e| match e {
    FixError::Io(source) => write_err(source),
    other => other,
  })?;
  w.flush().map_err(write_err)?;
  info!("wrote {written} chunks to {}", output.display());
  Ok(())
}
