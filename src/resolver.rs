//! Mod resolution workflow
//!
//! Adding mods runs in rounds. Each round fetches version listings and
//! project metadata for a batch of identifiers concurrently, lets the
//! [`Selector`] pick a version per project, appends accepted mods and queues
//! their required dependencies for the next round. Identifiers seen earlier
//! in the same run are never queued again, so dependency cycles terminate.
//!
//! # Examples
//!
//! ```no_run
//! use packsmith::{AutoSelector, Config, ModResolver, Project, RegistryClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let registry = RegistryClient::from_config(&config)?;
//!
//! let mut project = Project::new();
//! project.load("modpack.json")?;
//!
//! let mut selector = AutoSelector;
//! let mut resolver = ModResolver::new(&registry, &config.resolver, &mut selector);
//! let report = resolver.add_mods(&mut project, &["sodium".to_string()])?;
//!
//! println!("Added {} mods", report.added.len());
//! project.save(None)?;
//! # Ok(())
//! # }
//! ```

use crate::batch::WorkerPool;
use crate::modpack::{is_newer, parse_published, Mod};
use crate::project::Project;
use crate::registry::{validate_identifier, ProjectInfo, SearchHit, Version, VersionType};
use crate::select::Selector;
use crate::{Error, RegistryClient, ResolverConfig, Result};
use std::cmp::Reverse;
use std::collections::{BTreeSet, HashSet};

/// Outcome of [`ModResolver::add_mods`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolveReport {
    /// Project ids appended to the pack, in order
    pub added: Vec<String>,
    /// Identifiers left out on purpose (already installed, declined, no candidates)
    pub skipped: Vec<String>,
    /// Identifiers the registry could not provide
    pub failed: Vec<String>,
    /// Advisory messages for accepted mods
    pub warnings: Vec<String>,
}

/// Outcome of [`ModResolver::update_mods`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    /// Project ids replaced by a newer version
    pub updated: Vec<String>,
    /// Project ids with nothing newer (or whose update was declined)
    pub current: Vec<String>,
    pub failed: Vec<String>,
}

/// Registry answers for one identifier of a batch
struct Fetched {
    identifier: String,
    project: Option<ProjectInfo>,
    versions: Option<Vec<Version>>,
}

impl Fetched {
    fn is_complete(&self) -> bool {
        self.project.is_some() && self.versions.is_some()
    }
}

pub struct ModResolver<'a> {
    registry: &'a RegistryClient,
    config: &'a ResolverConfig,
    selector: &'a mut dyn Selector,
}

impl<'a> ModResolver<'a> {
    pub fn new(
        registry: &'a RegistryClient,
        config: &'a ResolverConfig,
        selector: &'a mut dyn Selector,
    ) -> Self {
        Self {
            registry,
            config,
            selector,
        }
    }

    /// Resolve and add mods by slug or project id, with their required dependencies
    ///
    /// Fails with [`Error::Retrieval`] when no project of the requested batch
    /// could be fetched; nothing is changed in that case.
    pub fn add_mods(
        &mut self,
        project: &mut Project,
        identifiers: &[String],
    ) -> Result<ResolveReport> {
        let mut report = ResolveReport::default();
        let mut seen: HashSet<String> = HashSet::new();
        let mut queue = Vec::new();

        {
            let modpack = project.modpack()?;
            for raw in identifiers {
                let identifier = raw.trim();
                if identifier.is_empty() || !seen.insert(identifier.to_string()) {
                    continue;
                }
                if let Err(e) = validate_identifier(identifier) {
                    log::warn!("{}", e);
                    report.failed.push(identifier.to_string());
                    continue;
                }
                if modpack.has_project(identifier) {
                    log::info!("{} is already installed", identifier);
                    report.skipped.push(identifier.to_string());
                    continue;
                }
                queue.push(identifier.to_string());
            }
        }

        let mut first_round = true;
        while !queue.is_empty() {
            let batch = std::mem::take(&mut queue);
            let fetched = self.fetch(project, &batch)?;

            if fetched.iter().all(|f| !f.is_complete()) {
                if first_round {
                    return Err(Error::Retrieval(format!(
                        "could not fetch any of: {}",
                        batch.join(", ")
                    )));
                }
                log::warn!("No dependency could be fetched: {}", batch.join(", "));
            }
            first_round = false;

            // Requested by slug, resolved to an id another entry may depend on
            for entry in &fetched {
                if let Some(info) = &entry.project {
                    seen.insert(info.id.clone());
                }
            }

            for entry in fetched {
                self.accept(project, entry, &mut seen, &mut queue, &mut report)?;
            }
        }

        Ok(report)
    }

    /// Add the projects behind previously returned search hits
    pub fn add_from_search(
        &mut self,
        project: &mut Project,
        hits: &[SearchHit],
    ) -> Result<ResolveReport> {
        let identifiers: Vec<String> = hits.iter().map(|hit| hit.project_id.clone()).collect();
        self.add_mods(project, &identifiers)
    }

    /// Offer newer versions for installed mods
    ///
    /// An empty `indices` set means every installed mod. Out-of-range
    /// positions are ignored.
    pub fn update_mods(
        &mut self,
        project: &mut Project,
        indices: &BTreeSet<usize>,
    ) -> Result<UpdateReport> {
        let mut report = UpdateReport::default();

        let targets: Vec<(usize, String)> = {
            let mods = &project.modpack()?.mod_data;
            if indices.is_empty() {
                mods.iter()
                    .enumerate()
                    .map(|(i, m)| (i, m.project_id.clone()))
                    .collect()
            } else {
                indices
                    .iter()
                    .filter_map(|&i| mods.get(i).map(|m| (i, m.project_id.clone())))
                    .collect()
            }
        };

        if targets.is_empty() {
            return Ok(report);
        }

        let ids: Vec<String> = targets.iter().map(|(_, id)| id.clone()).collect();
        let fetched = self.fetch(project, &ids)?;

        if fetched.iter().all(|f| !f.is_complete()) {
            return Err(Error::Retrieval(format!(
                "could not fetch any of: {}",
                ids.join(", ")
            )));
        }

        let allow_alpha_beta = project.modpack()?.allows_alpha_beta();

        for ((index, project_id), entry) in targets.into_iter().zip(fetched) {
            let (info, versions) = match (entry.project, entry.versions) {
                (Some(info), Some(versions)) => (info, versions),
                _ => {
                    log::warn!("Could not fetch updates for {}", project_id);
                    report.failed.push(project_id);
                    continue;
                }
            };

            let installed: Mod = project.modpack()?.mod_data[index].clone();

            let newest = versions
                .into_iter()
                .filter(|v| allow_alpha_beta || v.version_type == VersionType::Release)
                .filter_map(|v| parse_published(&v.date_published).ok().map(|at| (at, v)))
                .max_by_key(|(at, _)| *at)
                .map(|(_, v)| v);

            let candidate = match newest {
                Some(candidate) if offers_update(&installed, &candidate) => candidate,
                _ => {
                    report.current.push(project_id);
                    continue;
                }
            };

            if !self.selector.confirm_update(&installed, &candidate) {
                report.current.push(project_id);
                continue;
            }

            project.replace_mod(index, |record| record.apply_update(&info, &candidate))?;
            log::info!(
                "Updated {} {} -> {}",
                installed.title,
                installed.version_number,
                candidate.version_number
            );
            report.updated.push(project_id);
        }

        Ok(report)
    }

    /// Fetch version listings and project metadata for one batch
    fn fetch(&self, project: &Project, batch: &[String]) -> Result<Vec<Fetched>> {
        let modpack = project.modpack()?;
        let loaders = vec![modpack.mod_loader.clone()];
        let game_versions = vec![modpack.mc_version.clone()];
        let registry = self.registry;

        let pool = WorkerPool::new(self.config.max_workers)?;
        let (versions, projects) = pool.scatter_pair(
            batch,
            |id| {
                registry.list_versions(id, Some(loaders.as_slice()), Some(game_versions.as_slice()))
            },
            |id| registry.get_project(id),
        );
        drop(pool);

        let fetched = batch
            .iter()
            .zip(versions.into_iter().zip(projects))
            .map(|(identifier, (versions, project))| Fetched {
                identifier: identifier.clone(),
                project: absent_on_error(identifier, project),
                versions: absent_on_error(identifier, versions),
            })
            .collect();

        Ok(fetched)
    }

    /// Select, confirm and append one fetched project
    fn accept(
        &mut self,
        project: &mut Project,
        entry: Fetched,
        seen: &mut HashSet<String>,
        queue: &mut Vec<String>,
        report: &mut ResolveReport,
    ) -> Result<()> {
        let (info, versions) = match (entry.project, entry.versions) {
            (Some(info), Some(versions)) => (info, versions),
            _ => {
                log::warn!("{} was not found in the registry, skipping", entry.identifier);
                report.failed.push(entry.identifier);
                return Ok(());
            }
        };

        let modpack = project.modpack()?;
        if modpack.has_project(&info.id) {
            log::info!("{} is already installed", info.title);
            report.skipped.push(entry.identifier);
            return Ok(());
        }

        let candidates = select_candidates(versions, modpack.allows_alpha_beta());
        if candidates.is_empty() {
            log::warn!(
                "{} has no versions for {} {}, skipping",
                info.title,
                modpack.mod_loader,
                modpack.mc_version
            );
            report.skipped.push(entry.identifier);
            return Ok(());
        }

        let chosen = match self.selector.choose_version(&info, &candidates) {
            Some(index) if index < candidates.len() => &candidates[index],
            _ => {
                report.skipped.push(entry.identifier);
                return Ok(());
            }
        };

        if !self.selector.confirm_add(&info, chosen) {
            report.skipped.push(entry.identifier);
            return Ok(());
        }

        let warnings = project.add_mod(Mod::from_version(&info, chosen))?;
        report.warnings.extend(warnings);
        report.added.push(info.id.clone());

        let modpack = project.modpack()?;
        let mut dependencies: Vec<String> = Vec::new();
        for dependency in chosen.required_project_ids() {
            if !modpack.has_project(&dependency)
                && !seen.contains(&dependency)
                && !dependencies.contains(&dependency)
            {
                dependencies.push(dependency);
            }
        }

        if dependencies.is_empty() {
            return Ok(());
        }

        if self.config.auto_add_dependencies
            || self.selector.confirm_dependencies(&info, &dependencies)
        {
            log::debug!("Queueing dependencies of {}: {}", info.title, dependencies.join(", "));
            for dependency in dependencies {
                seen.insert(dependency.clone());
                queue.push(dependency);
            }
        } else {
            log::info!("Dependencies of {} left out: {}", info.title, dependencies.join(", "));
        }

        Ok(())
    }
}

fn offers_update(installed: &Mod, candidate: &Version) -> bool {
    match is_newer(&candidate.date_published, &installed.date_published) {
        Ok(newer) => newer,
        Err(e) => {
            // Unreadable installed date: offer anything that is a different version
            log::warn!("{}: {}", installed.title, e);
            installed.mod_id != candidate.id
        }
    }
}

fn absent_on_error<T>(identifier: &str, result: Result<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Registry lookup for {} failed: {}", identifier, e);
            None
        }
    }
}

/// Candidate versions, newest first, without pre-releases unless allowed
pub fn select_candidates(mut versions: Vec<Version>, allow_alpha_beta: bool) -> Vec<Version> {
    if !allow_alpha_beta {
        versions.retain(|v| v.version_type == VersionType::Release);
    }
    // Unparseable dates sort last
    versions.sort_by_cached_key(|v| Reverse(parse_published(&v.date_published).ok()));
    versions
}
