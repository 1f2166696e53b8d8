use std::{path::PathBuf, process::Command};

use fixpng::{
  fix_png_bytes, fix_png_file,
  png::{chunk_crc, read_chunks, Chunk, ChunkType, PNG_SIGNATURE},
  FixError, Limits,
};
use miniz_oxide::{
  deflate::{compress_to_vec, compress_to_vec_zlib},
  inflate::{decompress_to_vec, decompress_to_vec_zlib},
};

const IHDR_DATA: [u8; 13] = [0, 0, 0, 2, 0, 0, 0, 1, 8, 6, 0, 0, 0];
const CGBI_DATA: [u8; 4] = [0x50, 0x00, 0x20, 0x06];

fn chunk_bytes(out: &mut Vec<u8>, ty: &[u8; 4], data: &[u8]) {
  out.extend_from_slice(&(data.len() as u32).to_be_bytes());
  out.extend_from_slice(ty);
  out.extend_from_slice(data);
  out.extend_from_slice(&chunk_crc(ChunkType(*ty), data).to_be_bytes());
}

fn cgbi_png(pixels: &[u8]) -> Vec<u8> {
  let mut out = PNG_SIGNATURE.to_vec();
  chunk_bytes(&mut out, b"IHDR", &IHDR_DATA);
  chunk_bytes(&mut out, b"IDAT", &compress_to_vec(pixels, 6));
  chunk_bytes(&mut out, b"CgBI", &CGBI_DATA);
  chunk_bytes(&mut out, b"IEND", &[]);
  out
}

/// Walks the records by hand, so nothing here depends on the reader under
/// test. Returns `(type, data, declared_crc)` for each record.
fn records(bytes: &[u8]) -> Vec<([u8; 4], Vec<u8>, u32)> {
  assert_eq!(&bytes[..8], &PNG_SIGNATURE);
  let mut rest = &bytes[8..];
  let mut out = Vec::new();
  while !rest.is_empty() {
    let len = u32::from_be_bytes(rest[..4].try_into().unwrap()) as usize;
    let ty: [u8; 4] = rest[4..8].try_into().unwrap();
    let data = rest[8..8 + len].to_vec();
    let crc = u32::from_be_bytes(rest[8 + len..12 + len].try_into().unwrap());
    out.push((ty, data, crc));
    rest = &rest[12 + len..];
  }
  out
}

fn temp_path(name: &str) -> PathBuf {
  std::env::temp_dir().join(format!("fixpng-{}-{name}", std::process::id()))
}

#[test]
fn test_cgbi_scenario() {
  let pixels = [10_u8, 20, 30, 40, 50, 60, 70, 80, 90, 100];
  let input = cgbi_png(&pixels);
  let output = fix_png_bytes(&input, &Limits::default()).unwrap();

  let recs = records(&output);
  assert_eq!(recs.len(), 3);
  assert_eq!(&recs[0].0, b"IHDR");
  assert_eq!(recs[0].1, IHDR_DATA);
  assert_eq!(&recs[1].0, b"IDAT");
  assert_eq!(decompress_to_vec_zlib(&recs[1].1).unwrap(), pixels);
  assert_eq!(&recs[2].0, b"IEND");
  assert!(recs[2].1.is_empty());

  // the IHDR and IEND records are byte-for-byte what went in
  let ihdr_record = &input[8..8 + 12 + 13];
  assert_eq!(&output[8..8 + 12 + 13], ihdr_record);
  assert!(output.ends_with(&input[input.len() - 12..]));
}

#[test]
fn test_output_checksums_are_consistent() {
  let pixels: Vec<u8> = (0..3000_u32).map(|i| (i % 97) as u8).collect();
  let output = fix_png_bytes(&cgbi_png(&pixels), &Limits::default()).unwrap();
  for (ty, data, crc) in records(&output) {
    assert_eq!(chunk_crc(ChunkType(ty), &data), crc, "bad CRC on {:?}", ChunkType(ty));
  }
}

#[test]
fn test_output_never_has_cgbi_and_one_idat() {
  let pixels: Vec<u8> = (0..5000_u32).map(|i| (i * 13 % 256) as u8).collect();
  let stream = compress_to_vec(&pixels, 6);
  let (a, b) = stream.split_at(stream.len() / 2);
  let mut input = PNG_SIGNATURE.to_vec();
  chunk_bytes(&mut input, b"CgBI", &CGBI_DATA);
  chunk_bytes(&mut input, b"IHDR", &IHDR_DATA);
  chunk_bytes(&mut input, b"IDAT", a);
  chunk_bytes(&mut input, b"IDAT", b);
  chunk_bytes(&mut input, b"IEND", &[]);

  let output = fix_png_bytes(&input, &Limits::default()).unwrap();
  let recs = records(&output);
  assert!(recs.iter().all(|(ty, _, _)| ty != b"CgBI"));
  let idats: Vec<_> = recs.iter().filter(|(ty, _, _)| ty == b"IDAT").collect();
  assert_eq!(idats.len(), 1);
  assert_eq!(decompress_to_vec_zlib(&idats[0].1).unwrap(), pixels);
}

#[test]
fn test_conformant_png_round_trip() {
  let pixels: Vec<u8> = (0..777_u32).map(|i| (i * 3 % 256) as u8).collect();
  let mut input = PNG_SIGNATURE.to_vec();
  chunk_bytes(&mut input, b"IHDR", &IHDR_DATA);
  chunk_bytes(&mut input, b"tEXt", b"Comment\0hello");
  chunk_bytes(&mut input, b"IDAT", &compress_to_vec_zlib(&pixels, 9));
  chunk_bytes(&mut input, b"IEND", &[]);

  let output = fix_png_bytes(&input, &Limits::default()).unwrap();
  let before = records(&input);
  let after = records(&output);
  assert_eq!(before.len(), after.len());
  for (b, a) in before.iter().zip(after.iter()) {
    assert_eq!(b.0, a.0);
    if &b.0 == b"IDAT" {
      assert_eq!(decompress_to_vec_zlib(&a.1).unwrap(), decompress_to_vec_zlib(&b.1).unwrap());
    } else {
      assert_eq!(b, a);
    }
  }
}

#[test]
fn test_repair_matches_raw_inflate_of_input() {
  let pixels: Vec<u8> = (0..10_000_u32).map(|i| (i / 40) as u8).collect();
  let input = cgbi_png(&pixels);
  let input_idat = records(&input).into_iter().find(|r| &r.0 == b"IDAT").unwrap();
  let output = fix_png_bytes(&input, &Limits::default()).unwrap();
  let output_idat = records(&output).into_iter().find(|r| &r.0 == b"IDAT").unwrap();
  assert_eq!(
    decompress_to_vec_zlib(&output_idat.1).unwrap(),
    decompress_to_vec(&input_idat.1).unwrap()
  );
}

#[test]
fn test_nothing_written_after_iend() {
  let mut input = cgbi_png(&[1, 2, 3]);
  chunk_bytes(&mut input, b"tEXt", b"Comment\0trailing");
  input.extend_from_slice(b"more trailing junk");
  let output = fix_png_bytes(&input, &Limits::default()).unwrap();
  let iend = [0, 0, 0, 0, b'I', b'E', b'N', b'D', 0xAE, 0x42, 0x60, 0x82];
  assert!(output.ends_with(&iend));
  assert_eq!(records(&output).len(), 3);
}

#[test]
fn test_chunk_too_large() {
  let mut input = PNG_SIGNATURE.to_vec();
  input.extend_from_slice(&(Limits::BUFSIZE as u32 + 1).to_be_bytes());
  input.extend_from_slice(b"IDAT");
  input.extend_from_slice(&[0; 32]);
  assert!(matches!(fix_png_bytes(&input, &Limits::default()), Err(FixError::ChunkTooLarge { .. })));
}

#[test]
fn test_not_a_png() {
  assert!(matches!(fix_png_bytes(b"GIF89a and so on", &Limits::default()), Err(FixError::NotAPng)));
}

#[test]
fn test_fix_png_file() {
  let pixels = [5_u8; 64];
  let input_path = temp_path("in.png");
  let output_path = temp_path("out.png");
  std::fs::write(&input_path, cgbi_png(&pixels)).unwrap();
  // stale longer content must not survive
  std::fs::write(&output_path, vec![0xAA; 4096]).unwrap();

  fix_png_file(&input_path, &output_path, &Limits::default()).unwrap();
  let output = std::fs::read(&output_path).unwrap();
  assert_eq!(output, fix_png_bytes(&cgbi_png(&pixels), &Limits::default()).unwrap());
  let chunks: Vec<Chunk> = read_chunks(&output, &Limits::default()).unwrap();
  assert_eq!(chunks.len(), 3);

  std::fs::remove_file(&input_path).ok();
  std::fs::remove_file(&output_path).ok();
}

#[test]
fn test_fix_png_file_errors_leave_no_output() {
  let missing = temp_path("missing.png");
  let output_path = temp_path("never.png");
  std::fs::remove_file(&output_path).ok();
  assert!(matches!(
    fix_png_file(&missing, &output_path, &Limits::default()),
    Err(FixError::Read { .. })
  ));
  assert!(!output_path.exists());

  let corrupt_path = temp_path("corrupt.png");
  let mut corrupt = PNG_SIGNATURE.to_vec();
  chunk_bytes(&mut corrupt, b"CgBI", &CGBI_DATA);
  chunk_bytes(&mut corrupt, b"IDAT", &[0xFF; 20]);
  chunk_bytes(&mut corrupt, b"IEND", &[]);
  std::fs::write(&corrupt_path, corrupt).unwrap();
  assert!(matches!(
    fix_png_file(&corrupt_path, &output_path, &Limits::default()),
    Err(FixError::Compression { .. })
  ));
  assert!(!output_path.exists());
  std::fs::remove_file(&corrupt_path).ok();
}

#[test]
fn test_read_chunks_no_panics() {
  // totally random data should never panic the reader, signature or not
  for _ in 0..50 {
    let mut v = super::rand_bytes(1024);
    let _ = read_chunks(&v, &Limits::default());
    v[..8].copy_from_slice(&PNG_SIGNATURE);
    let _ = read_chunks(&v, &Limits::default());
    let _ = fix_png_bytes(&v, &Limits::default());
  }
}

#[test]
fn test_cli_usage() {
  let arg_sets: [&[&str]; 3] = [&[], &["only-one"], &["a.png", "b.png", "c.png"]];
  for args in arg_sets {
    let out = Command::new(env!("CARGO_BIN_EXE_fixpng")).args(args).output().unwrap();
    assert_eq!(out.status.code(), Some(1), "args: {args:?}");
    assert!(String::from_utf8_lossy(&out.stdout).contains("Usage:"), "args: {args:?}");
  }
}

#[test]
fn test_cli_errors_print_even_with_logging_off() {
  let input_path = temp_path("cli-not-png.png");
  let output_path = temp_path("cli-not-png-out.png");
  std::fs::write(&input_path, b"GIF89a, not a PNG at all").unwrap();
  let out = Command::new(env!("CARGO_BIN_EXE_fixpng"))
    .env("RUST_LOG", "off")
    .arg(&input_path)
    .arg(&output_path)
    .output()
    .unwrap();
  assert_eq!(out.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&out.stdout).contains("this is not a PNG file"));
  assert!(!output_path.exists());
  std::fs::remove_file(&input_path).ok();
}

#[cfg(unix)]
#[test]
fn test_cli_non_utf8_path() {
  use std::{ffi::OsStr, os::unix::ffi::OsStrExt};

  let dir = std::env::temp_dir();
  let missing = dir.join(OsStr::from_bytes(b"fixpng-in\xff.png"));
  let output_path = dir.join(OsStr::from_bytes(b"fixpng-out\xff.png"));
  let out =
    Command::new(env!("CARGO_BIN_EXE_fixpng")).arg(&missing).arg(&output_path).output().unwrap();
  assert_eq!(out.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&out.stdout).contains("couldn't read file"));
  assert!(!output_path.exists());
}

#[test]
fn test_cli_repairs_file() {
  let input_path = temp_path("cli-in.png");
  let output_path = temp_path("cli-out.png");
  std::fs::write(&input_path, cgbi_png(&[1, 2, 3, 4])).unwrap();
  let status = Command::new(env!("CARGO_BIN_EXE_fixpng"))
    .arg(&input_path)
    .arg(&output_path)
    .status()
    .unwrap();
  assert!(status.success());
  assert_eq!(records(&std::fs::read(&output_path).unwrap()).len(), 3);

  let status = Command::new(env!("CARGO_BIN_EXE_fixpng"))
    .arg(temp_path("cli-missing.png"))
    .arg(&output_path)
    .status()
    .unwrap();
  assert_eq!(status.code(), Some(1));

  std::fs::remove_file(&input_path).ok();
  std::fs::remove_file(&output_path).ok();
}
