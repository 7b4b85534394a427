//! Selection collaborator used by the resolution workflow
//!
//! The workflow never decides on its own which version to install or whether
//! a dependency should follow; it asks a [`Selector`]. The CLI supplies an
//! interactive one, tests and `--yes` runs use [`AutoSelector`].

use crate::modpack::Mod;
use crate::registry::{ProjectInfo, Version};

pub trait Selector {
    /// Pick one of `candidates` (newest first), or `None` to skip the project
    fn choose_version(&mut self, project: &ProjectInfo, candidates: &[Version]) -> Option<usize>;

    /// Final confirmation before a chosen version is added
    fn confirm_add(&mut self, _project: &ProjectInfo, _version: &Version) -> bool {
        true
    }

    /// Whether to queue the required dependencies of an accepted version
    fn confirm_dependencies(&mut self, _project: &ProjectInfo, _dependencies: &[String]) -> bool {
        true
    }

    /// Whether to replace an installed mod with a newer version
    fn confirm_update(&mut self, installed: &Mod, candidate: &Version) -> bool;
}

/// Accepts everything and always takes the newest candidate
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoSelector;

impl Selector for AutoSelector {
    fn choose_version(&mut self, _project: &ProjectInfo, candidates: &[Version]) -> Option<usize> {
        if candidates.is_empty() {
            None
        } else {
            Some(0)
        }
    }

    fn confirm_update(&mut self, _installed: &Mod, _candidate: &Version) -> bool {
        true
    }
}
