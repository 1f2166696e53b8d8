use std::{ffi::OsString, process::ExitCode};

use fixpng::{fix_png_file, FixError, Limits};

fn main() -> ExitCode {
  // progress only; fatal errors are printed directly below
  tracing_subscriber::fmt()
    .with_writer(std::io::stdout)
    .with_max_level(tracing::Level::INFO)
    .without_time()
    .with_target(false)
    .init();

  let args: Vec<OsString> = std::env::args_os().collect();
  let (input, output) = match args.as_slice() {
    [_, input, output] => (input, output),
    _ => {
      let program = args
        .first()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| "fixpng".to_string());
      println!("{}\n", FixError::Usage { program });
      return ExitCode::FAILURE;
    }
  };

  match fix_png_file(input, output, &Limits::default()) {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      println!("{e}");
      ExitCode::FAILURE
    }
  }
}
