//! TOML job manifests: a fixed list of conversions, each with its own
//! dimensions, run in one go.
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use tracing::info;

use raw_utils::Dimensions;

use crate::batch::{run_tasks, Job, Task};
use crate::cli::layout;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Raw buffer to image conversions
    #[serde(default)]
    pub image: Vec<ImageJob>,
    /// Image to raw buffer conversions
    #[serde(default)]
    pub raw: Vec<RawJob>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageJob {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default)]
    pub pgm: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawJob {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(default)]
    pub pgm: bool,
}

impl ImageJob {
    fn dims(&self) -> anyhow::Result<Option<Dimensions>> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Ok(Some(Dimensions::new(w, h)?)),
            (None, None) => Ok(None),
            _ => Err(anyhow!("{}: width and height must be given together",
                self.input.display())),
        }
    }
}

impl Manifest {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Resolves every job into a task, relative paths against `base`.
    pub fn tasks(&self, base: &Path) -> anyhow::Result<Vec<Task>> {
        let mut tasks = Vec::with_capacity(self.image.len() + self.raw.len());
        for job in &self.image {
            tasks.push(Task {
                src: base.join(&job.input),
                dst: base.join(&job.output),
                job: Job::ToImage { layout: layout(job.pgm), dims: job.dims()? },
            });
        }
        for job in &self.raw {
            tasks.push(Task {
                src: base.join(&job.input),
                dst: base.join(&job.output),
                job: Job::ToRaw { layout: layout(job.pgm) },
            });
        }
        Ok(tasks)
    }
}

pub fn run(path: &Path) -> anyhow::Result<()> {
    let manifest = Manifest::load(path)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    let tasks = manifest.tasks(base)?;
    info!(manifest = %path.display(), jobs = tasks.len(), "running manifest");
    run_tasks(&tasks)
}
