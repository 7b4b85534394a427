pub mod add;
pub mod check;
pub mod config;
pub mod flag;
pub mod info;
pub mod new;
pub mod prompt;
pub mod remove;
pub mod search;
pub mod set;
pub mod update;

use anyhow::{Context as _, Result};
use indicatif::{ProgressBar, ProgressStyle};
use packsmith::{AutoSelector, Config, Project, Selector};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Settings shared by every project command
pub struct Context {
    pub config: Config,
    pub file: PathBuf,
    pub yes: bool,
}

impl Context {
    pub fn load(file: Option<PathBuf>, yes: bool) -> Result<Self> {
        let config = Config::load().context("Failed to load configuration")?;
        let file = file.unwrap_or_else(|| PathBuf::from(&config.project.default_filename));
        Ok(Self { config, file, yes })
    }

    /// Load the project file, failing if it is missing or invalid
    pub fn open_project(&self) -> Result<Project> {
        let mut project = Project::new();
        project.load(&self.file)?;
        Ok(project)
    }

    pub fn selector(&self) -> Box<dyn Selector> {
        if self.yes {
            Box::new(AutoSelector)
        } else {
            Box::new(prompt::PromptSelector)
        }
    }

    /// Spinner for registry work; hidden when prompts may interleave
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if !self.yes {
            return ProgressBar::hidden();
        }
        spinner(message)
    }
}

pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner
}

/// Save the project if anything changed
pub fn save_if_dirty(project: &mut Project) -> Result<()> {
    if project.is_dirty() {
        let path = project.save(None)?;
        println!("✓ Saved {}", path.display());
    } else {
        println!("No changes to save.");
    }
    Ok(())
}

/// Convert 1-based positions from the command line to mod indices
pub fn to_indices(positions: &[usize]) -> Result<BTreeSet<usize>> {
    positions
        .iter()
        .map(|&p| {
            p.checked_sub(1)
                .ok_or_else(|| anyhow::anyhow!("Positions start at 1 (got 0)"))
        })
        .collect()
}
