//! Modpack entity model
//!
//! A [`Modpack`] owns an ordered list of [`Mod`] records. Each record is one
//! specific version of a registry project; the `project_id` of every record is
//! unique within the pack.
//!
//! # Examples
//!
//! ```
//! use packsmith::{check_compatibility, Modpack, PackField};
//!
//! let mut pack = Modpack::new("Skyblock", "Islands", "1.20.1", "fabric", "1.0.0");
//! pack.set_field(PackField::Title, "Skyblock Plus").unwrap();
//!
//! assert_eq!(pack.title, "Skyblock Plus");
//! assert!(check_compatibility(&pack));
//! ```

use crate::registry::{DependencyType, ProjectInfo, Version, VersionFile, VersionType};
use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Flag enabling beta and alpha versions during selection
pub const FLAG_ALLOW_ALPHA_BETA: &str = "allow_alpha_beta";

/// Dependency of an installed mod on another registry project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModDependency {
    pub project_id: Option<String>,
    pub dependency_type: DependencyType,
}

/// One installed mod version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mod {
    pub title: String,
    pub description: String,
    /// Version label
    pub name: String,
    #[serde(default)]
    pub changelog: Option<String>,
    pub version_number: String,
    #[serde(default)]
    pub dependencies: Vec<ModDependency>,
    #[serde(default)]
    pub mc_versions: Vec<String>,
    pub version_type: VersionType,
    #[serde(default)]
    pub mod_loaders: Vec<String>,
    /// Registry version id
    pub mod_id: String,
    /// Registry project id, stable across versions
    pub project_id: String,
    pub date_published: String,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl Mod {
    /// Build a record from a chosen version and its project
    pub fn from_version(project: &ProjectInfo, version: &Version) -> Self {
        Self {
            title: project.title.clone(),
            description: project.description.clone(),
            name: version.name.clone(),
            changelog: version.changelog.clone(),
            version_number: version.version_number.clone(),
            dependencies: version
                .dependencies
                .iter()
                .map(|d| ModDependency {
                    project_id: d.project_id.clone(),
                    dependency_type: d.dependency_type,
                })
                .collect(),
            mc_versions: version.game_versions.clone(),
            version_type: version.version_type,
            mod_loaders: version.loaders.clone(),
            mod_id: version.id.clone(),
            project_id: project.id.clone(),
            date_published: version.date_published.clone(),
            files: version.files.clone(),
        }
    }

    /// Overwrite this record with a newer version, keeping its project id
    pub fn apply_update(&mut self, project: &ProjectInfo, version: &Version) {
        let project_id = std::mem::take(&mut self.project_id);
        *self = Self::from_version(project, version);
        self.project_id = project_id;
    }

    /// Publication instant of this record
    pub fn published_at(&self) -> Result<DateTime<Utc>> {
        parse_published(&self.date_published)
    }
}

/// The pack as a unit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Modpack {
    pub title: String,
    pub description: String,
    pub build_date: String,
    pub build_version: String,
    pub mc_version: String,
    pub mod_loader: String,
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
    #[serde(default)]
    pub mod_data: Vec<Mod>,
}

/// Pack fields that can be edited after creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum PackField {
    Title,
    Description,
    BuildDate,
    BuildVersion,
    McVersion,
    ModLoader,
}

impl PackField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackField::Title => "title",
            PackField::Description => "description",
            PackField::BuildDate => "build_date",
            PackField::BuildVersion => "build_version",
            PackField::McVersion => "mc_version",
            PackField::ModLoader => "mod_loader",
        }
    }
}

impl Modpack {
    /// Fresh pack with an empty mod list, built today
    pub fn new(
        title: &str,
        description: &str,
        mc_version: &str,
        mod_loader: &str,
        build_version: &str,
    ) -> Self {
        let mut flags = BTreeMap::new();
        flags.insert(FLAG_ALLOW_ALPHA_BETA.to_string(), false);

        Self {
            title: title.to_string(),
            description: description.to_string(),
            build_date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            build_version: build_version.to_string(),
            mc_version: mc_version.to_string(),
            mod_loader: mod_loader.to_string(),
            flags,
            mod_data: Vec::new(),
        }
    }

    pub fn field(&self, field: PackField) -> &str {
        match field {
            PackField::Title => &self.title,
            PackField::Description => &self.description,
            PackField::BuildDate => &self.build_date,
            PackField::BuildVersion => &self.build_version,
            PackField::McVersion => &self.mc_version,
            PackField::ModLoader => &self.mod_loader,
        }
    }

    /// Set one editable field
    ///
    /// Every field except the description must be non-empty, and the build
    /// date must be a `YYYY-MM-DD` date.
    pub fn set_field(&mut self, field: PackField, value: &str) -> Result<()> {
        let value = value.trim();

        if value.is_empty() && field != PackField::Description {
            return Err(Error::Validation(format!(
                "{} cannot be empty",
                field.as_str()
            )));
        }

        match field {
            PackField::Title => self.title = value.to_string(),
            PackField::Description => self.description = value.to_string(),
            PackField::BuildDate => {
                NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
                    Error::Validation(format!("'{}' is not a YYYY-MM-DD date", value))
                })?;
                self.build_date = value.to_string();
            }
            PackField::BuildVersion => self.build_version = value.to_string(),
            PackField::McVersion => self.mc_version = value.to_string(),
            PackField::ModLoader => self.mod_loader = value.to_lowercase(),
        }

        Ok(())
    }

    pub fn flag(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn set_flag(&mut self, name: &str, value: bool) {
        self.flags.insert(name.to_string(), value);
    }

    pub fn allows_alpha_beta(&self) -> bool {
        self.flag(FLAG_ALLOW_ALPHA_BETA)
    }

    pub fn has_project(&self, project_id: &str) -> bool {
        self.mod_data.iter().any(|m| m.project_id == project_id)
    }

    pub fn position_of(&self, project_id: &str) -> Option<usize> {
        self.mod_data.iter().position(|m| m.project_id == project_id)
    }

    /// Append a mod unless its project is already installed
    pub fn add_mod(&mut self, record: Mod) -> Result<()> {
        if self.has_project(&record.project_id) {
            return Err(Error::Compatibility(format!(
                "'{}' ({}) is already in the pack",
                record.title, record.project_id
            )));
        }
        self.mod_data.push(record);
        Ok(())
    }

    /// Remove mods by position; returns how many were removed
    ///
    /// Out-of-range positions are ignored. Deletion runs from the highest
    /// position down so the remaining positions stay valid.
    pub fn remove_mods(&mut self, indices: &BTreeSet<usize>) -> usize {
        let mut removed = 0;
        for &index in indices.iter().rev() {
            if index < self.mod_data.len() {
                self.mod_data.remove(index);
                removed += 1;
            }
        }
        removed
    }

    /// Advisory mismatches between a mod and the pack-wide constraints
    pub fn advisories(&self, record: &Mod) -> Vec<String> {
        let mut warnings = Vec::new();

        if !record.mc_versions.is_empty() && !record.mc_versions.contains(&self.mc_version) {
            warnings.push(format!(
                "{} {} does not list Minecraft {} (supports {})",
                record.title,
                record.version_number,
                self.mc_version,
                record.mc_versions.join(", ")
            ));
        }

        if !record.mod_loaders.is_empty()
            && !record
                .mod_loaders
                .iter()
                .any(|l| l.eq_ignore_ascii_case(&self.mod_loader))
        {
            warnings.push(format!(
                "{} {} does not list the {} loader (supports {})",
                record.title,
                record.version_number,
                self.mod_loader,
                record.mod_loaders.join(", ")
            ));
        }

        warnings
    }

    /// Project ids that appear more than once, in first-seen order
    pub fn duplicate_project_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for record in &self.mod_data {
            if !seen.insert(record.project_id.as_str())
                && !duplicates.contains(&record.project_id)
            {
                duplicates.push(record.project_id.clone());
            }
        }
        duplicates
    }
}

/// Whether no two mods in the pack share a project id
pub fn check_compatibility(modpack: &Modpack) -> bool {
    let mut seen = HashSet::new();
    modpack
        .mod_data
        .iter()
        .all(|m| seen.insert(m.project_id.as_str()))
}

/// Parse a publication timestamp (RFC 3339, or a bare `YYYY-MM-DD` date)
pub fn parse_published(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| Error::Validation(format!("'{}' is not a valid publication date", value)))
}

/// Whether `candidate` was published strictly after `installed`
pub fn is_newer(candidate: &str, installed: &str) -> Result<bool> {
    Ok(parse_published(candidate)? > parse_published(installed)?)
}
