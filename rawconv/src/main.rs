use structopt::StructOpt;
use tracing_subscriber::EnvFilter;

mod batch;
mod cli;
mod manifest;

use raw_utils::ImageFormat;

use crate::batch::{has_extension, Job};
use crate::cli::{Cli, Command};

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let opt = Cli::from_args();
    init_logging(opt.verbose);
    match opt.cmd {
        Command::ToImage { opt } => {
            let layout = opt.layout();
            let format = opt.format()?;
            let job = Job::ToImage { layout, dims: opt.size };
            batch::convert(
                opt.input, opt.output, job,
                |path| has_extension(path, layout.extension()),
                format.extension(),
            )
        }
        Command::ToRaw { opt } => {
            let layout = opt.layout();
            batch::convert(
                opt.input, opt.output, Job::ToRaw { layout },
                |path| ImageFormat::from_path(path).is_ok(),
                layout.extension(),
            )
        }
        Command::Run { manifest } => manifest::run(&manifest),
    }
}
