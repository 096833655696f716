use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{error, info, warn};

use raw_utils::{Dimensions, GrayImage, RawLayout, PBAR_TEMPLATE};

/// Conversion applied to a single file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Job {
    ToImage { layout: RawLayout, dims: Option<Dimensions> },
    ToRaw { layout: RawLayout },
}

#[derive(Debug, Clone)]
pub struct Task {
    pub src: PathBuf,
    pub dst: PathBuf,
    pub job: Job,
}

impl Task {
    pub fn run(&self) -> raw_utils::Result<GrayImage> {
        match self.job {
            Job::ToImage { layout, dims } => {
                raw_utils::raw_to_image(&self.src, &self.dst, layout, dims)
            }
            Job::ToRaw { layout } => raw_utils::image_to_raw(&self.src, &self.dst, layout),
        }
    }
}

pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(ext))
}

/// Builds one task per regular file in `input` accepted by `filter`. Outputs
/// land in `output` under the same file stem with extension `ext`.
pub fn dir_tasks<F>(
    input: &Path, output: &Path, filter: F, ext: &str, job: Job,
) -> io::Result<Vec<Task>>
where
    F: Fn(&Path) -> bool,
{
    let mut tasks = Vec::new();
    for entry in fs::read_dir(input)? {
        let entry = entry?;
        let src = entry.path();
        if !entry.file_type()?.is_file() || !filter(&src) { continue; }
        let mut name = match src.file_stem() {
            Some(stem) => OsString::from(stem),
            None => continue,
        };
        name.push(".");
        name.push(ext);
        let dst = output.join(name);
        tasks.push(Task { src, dst, job });
    }
    tasks.sort_unstable_by(|a, b| a.src.cmp(&b.src));
    Ok(tasks)
}

/// Fails if two tasks would write the same output, e.g. `x.png` and `x.jpg`
/// both converted to `x.raw`.
pub fn check_outputs(tasks: &[Task]) -> anyhow::Result<()> {
    let mut seen: HashMap<&Path, &Path> = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if let Some(first) = seen.insert(&task.dst, &task.src) {
            bail!("{} and {} would both be written to {}",
                first.display(), task.src.display(), task.dst.display());
        }
    }
    Ok(())
}

/// Runs `tasks` in parallel behind a progress bar. Failed tasks don't stop
/// the rest; they are logged once the bar is done and turn the whole run
/// into an error. Nothing runs if two tasks share an output.
pub fn run_tasks(tasks: &[Task]) -> anyhow::Result<()> {
    if tasks.is_empty() {
        warn!("nothing to convert");
        return Ok(());
    }
    check_outputs(tasks)?;
    let bar = ProgressBar::new(tasks.len() as u64);
    bar.set_style(ProgressStyle::default_bar().template(PBAR_TEMPLATE)?);

    let failed: Vec<(&Task, raw_utils::Error)> = tasks.par_iter()
        .progress_with(bar.clone())
        .filter_map(|task| task.run().err().map(|err| (task, err)))
        .collect();
    bar.finish();

    for (task, err) in &failed {
        error!(src = %task.src.display(), dst = %task.dst.display(), "{}", err);
    }
    info!(total = tasks.len(), failed = failed.len(), "batch finished");
    if !failed.is_empty() {
        bail!("{} of {} conversions failed", failed.len(), tasks.len());
    }
    Ok(())
}

/// Converts a single file, or every file of `input` accepted by `filter` when
/// `input` is a directory.
pub fn convert<F>(
    input: PathBuf, output: PathBuf, job: Job, filter: F, ext: &str,
) -> anyhow::Result<()>
where
    F: Fn(&Path) -> bool,
{
    if input.is_dir() {
        info!(input = %input.display(), output = %output.display(), ?job,
            "converting directory");
        fs::create_dir_all(&output)?;
        let tasks = dir_tasks(&input, &output, filter, ext, job)?;
        return run_tasks(&tasks);
    }

    let task = Task { src: input, dst: output, job };
    let img = task.run()
        .with_context(|| format!("failed to convert {}", task.src.display()))?;
    info!(src = %task.src.display(), dst = %task.dst.display(),
        dims = %img.dimensions(), "done");
    Ok(())
}
