use clap::Parser;
use imgnorm::imaging::ExifPolicy;
use imgnorm::{batch, config, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imgnorm", version)]
#[command(about = "Shrink, re-orient and recompress the images in a directory, in place")]
#[command(long_about = "\
Shrink, re-orient and recompress the images in a directory, in place

Every .jpg .jpeg .png .bmp .gif .tiff .webp file directly inside DIR is:

  1. skipped if it has more than one frame (GIF, APNG, WebP) or page (TIFF)
  2. rotated/flipped upright according to its EXIF orientation
  3. shrunk so neither edge exceeds 1000px (aspect ratio kept)
  4. re-encoded in its own format and written over the original
       JPEG: RGB, quality 90, progressive, optimized
       WebP: RGB, quality 90, method 6
       PNG/BMP/GIF/TIFF: re-encoded as-is

Saved files carry no EXIF unless --keep-exif is given. There is no backup.

Defaults can be changed in DIR/imgnorm.toml; run 'imgnorm --gen-config'
to print a documented one.")]
struct Cli {
    /// Directory to normalize
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Config file (default: DIR/imgnorm.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Largest allowed width or height, in pixels
    #[arg(long, value_name = "PX")]
    max_size: Option<u32>,

    /// Keep EXIF metadata, with the orientation tag reset
    #[arg(long)]
    keep_exif: bool,

    /// Print the report as JSON instead of one line per file
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print a stock imgnorm.toml with all options documented and exit
    #[arg(long)]
    gen_config: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if cli.gen_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut run_config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(&cli.dir)?,
    };
    if let Some(max_size) = cli.max_size {
        run_config.max_size = max_size;
    }
    if cli.keep_exif {
        run_config.exif = ExifPolicy::Preserve;
    }
    run_config.validate()?;
    log::debug!("effective config: {run_config:?}");

    if cli.json {
        let report = batch::normalize_directory(&cli.dir, &run_config, None)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for outcome in rx {
            output::print_outcome(&outcome);
        }
    });
    let result = batch::normalize_directory(&cli.dir, &run_config, Some(tx));
    printer.join().ok();

    output::print_summary(&result?);
    Ok(())
}
