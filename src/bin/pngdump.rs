//! Decodes a PNG file and prints its pixels.
//!
//! `pngdump <file.png> [--all] [--strict] [-v]`

use rgbapng::{png::*, Bitmap, PngError, RGBA8};

use clap::Parser;
use log::LevelFilter;
use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

/// How many pixels are printed without `--all`.
const PREVIEW_PIXELS: usize = 16;

/// Decodes a PNG file into RGBA8 pixels and prints them.
#[derive(Parser, Debug)]
#[command(name = "pngdump")]
#[command(version, about, long_about = None)]
struct Args {
  /// The PNG file to decode
  #[arg(value_name = "FILE")]
  path: PathBuf,

  /// Print every pixel instead of just the first few
  #[arg(long)]
  all: bool,

  /// Check chunk CRCs and require an IEND chunk
  #[arg(long)]
  strict: bool,

  /// Log each decoding stage to stderr
  #[arg(short, long)]
  verbose: bool,
}
impl Args {
  fn log_level(&self) -> LevelFilter {
    if self.verbose {
      LevelFilter::Trace
    } else {
      LevelFilter::Warn
    }
  }

  fn decode_options(&self) -> DecodeOptions {
    if self.strict {
      DecodeOptions::strict()
    } else {
      DecodeOptions::default()
    }
  }
}

fn main() -> ExitCode {
  let args = match Args::try_parse() {
    Ok(args) => args,
    Err(e) => {
      let _ = e.print();
      // --help and --version also come through here
      return if e.use_stderr() { ExitCode::FAILURE } else { ExitCode::SUCCESS };
    }
  };
  env_logger::Builder::new()
    .filter_level(args.log_level())
    .format_timestamp(None)
    .parse_default_env()
    .init();

  let bytes = match std::fs::read(&args.path) {
    Ok(bytes) => bytes,
    Err(e) => {
      eprintln!("{}: {e}", args.path.display());
      return ExitCode::FAILURE;
    }
  };
  match decode_png_with_options(&bytes, args.decode_options()) {
    Ok(bitmap) => {
      for line in pixel_lines(&bitmap, args.all) {
        println!("{line}");
      }
      ExitCode::SUCCESS
    }
    Err(e) => {
      report_error(&args.path, e);
      ExitCode::FAILURE
    }
  }
}

/// The dimensions line, then one `x,y: r g b a` line per pixel.
fn pixel_lines(bitmap: &Bitmap<RGBA8>, all: bool) -> Vec<String> {
  let limit = if all { usize::MAX } else { PREVIEW_PIXELS };
  let mut lines = vec![format!("{}x{}", bitmap.width, bitmap.height)];
  lines.extend(
    bitmap
      .rows()
      .enumerate()
      .flat_map(|(y, row)| row.iter().enumerate().map(move |(x, px)| (x, y, *px)))
      .take(limit)
      .map(|(x, y, RGBA8 { r, g, b, a })| format!("{x},{y}: {r} {g} {b} {a}")),
  );
  if bitmap.pixels.len() > limit {
    lines.push(format!("... {} more pixels (use --all to see them)", bitmap.pixels.len() - limit));
  }
  lines
}

fn report_error(path: &Path, e: PngError) {
  eprintln!("{}: {e}", path.display());
  if let PngError::ChunkIntegrity { .. } | PngError::MissingTerminator = e {
    eprintln!("(the file might still decode without --strict)");
  }
}

#[test]
fn test_args_parse() {
  let args = Args::try_parse_from(["pngdump", "a.png"]).unwrap();
  assert_eq!(args.path, PathBuf::from("a.png"));
  assert!(!args.all && !args.strict && !args.verbose);
  assert_eq!(args.log_level(), LevelFilter::Warn);
  assert_eq!(args.decode_options(), DecodeOptions::default());

  let args = Args::try_parse_from(["pngdump", "--all", "--strict", "-v", "b.png"]).unwrap();
  assert!(args.all);
  assert_eq!(args.log_level(), LevelFilter::Trace);
  assert_eq!(args.decode_options(), DecodeOptions::strict());

  assert!(Args::try_parse_from(["pngdump"]).is_err());
  assert!(Args::try_parse_from(["pngdump", "--bogus", "a.png"]).is_err());
  assert!(Args::try_parse_from(["pngdump", "a.png", "b.png"]).is_err());
}

#[test]
fn test_pixel_lines() {
  let red = RGBA8 { r: 255, g: 0, b: 0, a: 255 };
  let bitmap = Bitmap { width: 5, height: 4, pixels: vec![red; 20] };
  let preview = pixel_lines(&bitmap, false);
  assert_eq!(preview[0], "5x4");
  assert_eq!(preview[1], "0,0: 255 0 0 255");
  assert_eq!(preview[7], "1,1: 255 0 0 255");
  assert_eq!(preview.len(), 1 + PREVIEW_PIXELS + 1);
  assert_eq!(preview[PREVIEW_PIXELS + 1], "... 4 more pixels (use --all to see them)");

  let all = pixel_lines(&bitmap, true);
  assert_eq!(all.len(), 21);
  assert_eq!(all[20], "4,3: 255 0 0 255");
}
