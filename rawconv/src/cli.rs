use std::path::PathBuf;

use anyhow::bail;
use structopt::StructOpt;

use raw_utils::{Dimensions, ImageFormat, RawLayout};

#[derive(StructOpt)]
#[structopt(name = "rawconv",
    about = "Convert raw grayscale buffers to PNG/JPEG images and back")]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[structopt(short = "v", long = "verbose", parse(from_occurrences), global = true)]
    pub verbose: u8,
    #[structopt(subcommand)]
    pub cmd: Command,
}

#[derive(StructOpt)]
pub enum Command {
    /// Render raw grayscale buffers as PNG or JPEG images. The output format
    /// follows the output file extension.
    #[structopt(name = "to-image")]
    ToImage {
        #[structopt(flatten)]
        opt: ToImageOpt,
    },
    /// Decode PNG or JPEG images into raw grayscale buffers
    #[structopt(name = "to-raw")]
    ToRaw {
        #[structopt(flatten)]
        opt: ToRawOpt,
    },
    /// Run the conversions listed in a TOML job manifest
    #[structopt(name = "run")]
    Run {
        /// Path to the manifest
        #[structopt(parse(from_os_str))]
        manifest: PathBuf,
    },
}

#[derive(StructOpt, Clone)]
pub struct ToImageOpt {
    /// Size of headerless input as WIDTHxHEIGHT, e.g. 32x32
    #[structopt(short = "s", long = "size")]
    pub size: Option<Dimensions>,
    /// Read raw input with a PGM (P5) header instead of bare pixels
    #[structopt(long = "pgm")]
    pub pgm: bool,
    /// Output format used for directory input (default png). Supported
    /// formats: png, jpeg.
    #[structopt(short = "f", long = "format")]
    pub format: Option<ImageFormat>,
    /// Input file or directory
    #[structopt(parse(from_os_str))]
    pub input: PathBuf,
    /// Output file or directory
    #[structopt(parse(from_os_str))]
    pub output: PathBuf,
}

impl ToImageOpt {
    pub fn layout(&self) -> RawLayout {
        layout(self.pgm)
    }

    /// Format for outputs named from a directory listing. A single output
    /// file is encoded by its extension, so `-f` has to agree with it.
    pub fn format(&self) -> anyhow::Result<ImageFormat> {
        let format = self.format.unwrap_or(ImageFormat::Png);
        if self.format.is_none() || self.input.is_dir() {
            return Ok(format);
        }
        if let Ok(by_ext) = ImageFormat::from_path(&self.output) {
            if by_ext != format {
                bail!("--format {} conflicts with output file {}",
                    format.extension(), self.output.display());
            }
        }
        Ok(format)
    }
}

#[derive(StructOpt, Clone)]
pub struct ToRawOpt {
    /// Prefix the output with a PGM (P5) header carrying the dimensions
    #[structopt(long = "pgm")]
    pub pgm: bool,
    /// Input file or directory
    #[structopt(parse(from_os_str))]
    pub input: PathBuf,
    /// Output file or directory
    #[structopt(parse(from_os_str))]
    pub output: PathBuf,
}

impl ToRawOpt {
    pub fn layout(&self) -> RawLayout {
        layout(self.pgm)
    }
}

pub fn layout(pgm: bool) -> RawLayout {
    if pgm {
        RawLayout::Pgm
    } else {
        RawLayout::Headerless
    }
}
