//! Project container and persistence
//!
//! A [`Project`] wraps one [`Modpack`] plus operational metadata and owns the
//! on-disk format: a single JSON document holding the pack fields at the top
//! level and a `metadata` object.
//!
//! ```json
//! {
//!   "title": "Skyblock",
//!   "mc_version": "1.20.1",
//!   "mod_loader": "fabric",
//!   "mod_data": [],
//!   "metadata": { "loaded": true, "saved": true, "filename": "modpack.json", "project_id": "…" }
//! }
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use packsmith::{NewProject, Project};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut project = Project::new();
//! project.create(&NewProject {
//!     title: "Skyblock".to_string(),
//!     description: "Islands in the sky".to_string(),
//!     mc_version: "1.20.1".to_string(),
//!     mod_loader: "fabric".to_string(),
//!     build_version: None,
//! })?;
//! project.save(None)?;
//!
//! let mut reopened = Project::new();
//! reopened.load("modpack.json")?;
//! # Ok(())
//! # }
//! ```

use crate::integrity;
use crate::modpack::{check_compatibility, Mod, Modpack, PackField};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// The project filename used when none is configured
pub const DEFAULT_PROJECT_FILE: &str = "modpack.json";

/// Default build version of new packs
pub const DEFAULT_BUILD_VERSION: &str = "1.0.0";

/// Operational state persisted next to the pack
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectMetadata {
    pub loaded: bool,
    pub saved: bool,
    pub filename: String,
    /// Integrity token
    pub project_id: String,
}

/// Input of [`Project::create`]
#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub mc_version: String,
    pub mod_loader: String,
    pub build_version: Option<String>,
}

/// On-disk document
#[derive(Serialize, Deserialize)]
struct ProjectFile {
    #[serde(flatten)]
    modpack: Modpack,
    metadata: ProjectMetadata,
}

#[derive(Debug, Default)]
pub struct Project {
    modpack: Option<Modpack>,
    pub metadata: ProjectMetadata,
}

impl Project {
    /// Empty project with nothing loaded
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_loaded(&self) -> bool {
        self.metadata.loaded && self.modpack.is_some()
    }

    /// Whether there are changes since the last save
    pub fn is_dirty(&self) -> bool {
        self.is_loaded() && !self.metadata.saved
    }

    pub fn modpack(&self) -> Result<&Modpack> {
        self.modpack.as_ref().ok_or(Error::NoProject)
    }

    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    fn modpack_mut(&mut self) -> Result<&mut Modpack> {
        self.modpack.as_mut().ok_or(Error::NoProject)
    }

    fn mark_dirty(&mut self) {
        self.metadata.saved = false;
    }

    /// Start a new project, replacing whatever was loaded
    pub fn create(&mut self, request: &NewProject) -> Result<()> {
        for (field, value) in [
            ("title", &request.title),
            ("mc_version", &request.mc_version),
            ("mod_loader", &request.mod_loader),
        ] {
            if value.trim().is_empty() {
                return Err(Error::Validation(format!("{} is required", field)));
            }
        }

        let build_version = match request.build_version.as_deref().map(str::trim) {
            Some("") => {
                return Err(Error::Validation(
                    "build_version cannot be empty".to_string(),
                ))
            }
            Some(version) => version,
            None => DEFAULT_BUILD_VERSION,
        };

        let modpack = Modpack::new(
            request.title.trim(),
            request.description.trim(),
            request.mc_version.trim(),
            &request.mod_loader.trim().to_lowercase(),
            build_version,
        );

        if !check_compatibility(&modpack) {
            return Err(Error::Compatibility(
                "new pack contains duplicate mods".to_string(),
            ));
        }

        let filename = if self.metadata.filename.is_empty() {
            DEFAULT_PROJECT_FILE.to_string()
        } else {
            self.metadata.filename.clone()
        };

        self.metadata = ProjectMetadata {
            loaded: true,
            saved: false,
            filename,
            project_id: integrity::generate_token()?,
        };
        self.modpack = Some(modpack);

        log::info!("Created project '{}'", request.title.trim());
        Ok(())
    }

    /// Set the file the next `save(None)` writes to
    pub fn set_filename<P: AsRef<Path>>(&mut self, path: P) {
        self.metadata.filename = path.as_ref().to_string_lossy().to_string();
    }

    /// Read a project file, replacing the current project wholesale
    ///
    /// On any error the current project is left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            Error::NotFound(format!(
                "Cannot read project file {}: {}",
                path.display(),
                e
            ))
        })?;

        let mut document: serde_json::Value = serde_json::from_str(&content).map_err(|e| {
            Error::InvalidProject(format!("{} is not valid JSON: {}", path.display(), e))
        })?;

        let metadata_value = document
            .as_object_mut()
            .and_then(|fields| fields.remove("metadata"))
            .ok_or_else(|| {
                Error::InvalidProject(format!("{} has no metadata block", path.display()))
            })?;

        let mut metadata: ProjectMetadata = serde_json::from_value(metadata_value)
            .map_err(|e| Error::InvalidProject(format!("Malformed metadata block: {}", e)))?;

        integrity::verify_token(&metadata.project_id)?;

        let modpack: Modpack = serde_json::from_value(document)
            .map_err(|e| Error::InvalidProject(format!("Malformed modpack fields: {}", e)))?;

        if !check_compatibility(&modpack) {
            log::warn!(
                "{} lists the same project more than once: {}",
                path.display(),
                modpack.duplicate_project_ids().join(", ")
            );
        }

        metadata.loaded = true;
        metadata.saved = true;
        metadata.filename = path.to_string_lossy().to_string();

        log::info!(
            "Loaded project '{}' ({} mods) from {}",
            modpack.title,
            modpack.mod_data.len(),
            path.display()
        );

        self.modpack = Some(modpack);
        self.metadata = metadata;
        Ok(())
    }

    /// Write the project atomically
    ///
    /// Falls back to `metadata.filename`, then to [`DEFAULT_PROJECT_FILE`].
    pub fn save(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        let modpack = self.modpack()?.clone();

        let target = match path {
            Some(p) => p.to_path_buf(),
            None if !self.metadata.filename.is_empty() => PathBuf::from(&self.metadata.filename),
            None => PathBuf::from(DEFAULT_PROJECT_FILE),
        };

        let mut metadata = self.metadata.clone();
        metadata.saved = true;
        metadata.filename = target.to_string_lossy().to_string();

        let document = ProjectFile { modpack, metadata };
        let json = serde_json::to_string_pretty(&document)?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut staging = tempfile::NamedTempFile::new_in(&dir)?;
        staging.write_all(json.as_bytes())?;
        staging.write_all(b"\n")?;
        staging.as_file().sync_all()?;
        staging.persist(&target).map_err(|e| Error::Io(e.error))?;

        self.metadata = document.metadata;
        log::info!("Saved project to {}", target.display());
        Ok(target)
    }

    /// Edit one pack field
    pub fn edit(&mut self, field: PackField, value: &str) -> Result<()> {
        self.modpack_mut()?.set_field(field, value)?;
        self.mark_dirty();
        Ok(())
    }

    pub fn set_flag(&mut self, name: &str, value: bool) -> Result<()> {
        self.modpack_mut()?.set_flag(name, value);
        self.mark_dirty();
        Ok(())
    }

    /// Append an accepted mod
    ///
    /// Mismatches with the pack's game version or loader are logged and
    /// returned, never fatal. A mod whose project is already installed is
    /// rejected and nothing changes.
    pub fn add_mod(&mut self, record: Mod) -> Result<Vec<String>> {
        let modpack = self.modpack_mut()?;
        let advisories = modpack.advisories(&record);
        for warning in &advisories {
            log::warn!("{}", warning);
        }

        let title = record.title.clone();
        modpack.add_mod(record)?;
        self.mark_dirty();
        log::info!("Added {}", title);
        Ok(advisories)
    }

    /// Replace the mod at `index` with an update
    pub fn replace_mod<F>(&mut self, index: usize, update: F) -> Result<()>
    where
        F: FnOnce(&mut Mod),
    {
        let record = self
            .modpack_mut()?
            .mod_data
            .get_mut(index)
            .ok_or_else(|| Error::Validation(format!("No mod at position {}", index)))?;

        update(record);
        self.mark_dirty();
        self.warn_if_incompatible();
        Ok(())
    }

    /// Remove mods by position
    ///
    /// Returns false without touching anything when `indices` is empty, and
    /// false when none of the positions exist.
    pub fn remove_mods(&mut self, indices: &BTreeSet<usize>) -> Result<bool> {
        if indices.is_empty() {
            return Ok(false);
        }

        let removed = self.modpack_mut()?.remove_mods(indices);
        if removed == 0 {
            return Ok(false);
        }

        self.mark_dirty();
        self.warn_if_incompatible();
        log::info!("Removed {} mod(s)", removed);
        Ok(true)
    }

    /// Run the compatibility check, logging offending ids
    pub fn check_compatibility(&self) -> Result<bool> {
        let modpack = self.modpack()?;
        let ok = check_compatibility(modpack);
        if !ok {
            log::warn!(
                "Duplicate projects in pack: {}",
                modpack.duplicate_project_ids().join(", ")
            );
        }
        Ok(ok)
    }

    fn warn_if_incompatible(&self) {
        // check_compatibility logs the offending ids itself
        self.check_compatibility().ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::VersionType;
    use tempfile::TempDir;

    fn new_project() -> NewProject {
        NewProject {
            title: "Skyblock".to_string(),
            description: "Islands".to_string(),
            mc_version: "1.20.1".to_string(),
            mod_loader: "Fabric".to_string(),
            build_version: None,
        }
    }

    fn record(project_id: &str) -> Mod {
        Mod {
            title: project_id.to_uppercase(),
            description: String::new(),
            name: "1.0".to_string(),
            changelog: Some("Initial".to_string()),
            version_number: "1.0".to_string(),
            dependencies: Vec::new(),
            mc_versions: vec!["1.20.1".to_string()],
            version_type: VersionType::Release,
            mod_loaders: vec!["fabric".to_string()],
            mod_id: format!("ver-{}", project_id),
            project_id: project_id.to_string(),
            date_published: "2024-01-01".to_string(),
            files: Vec::new(),
        }
    }

    #[test]
    fn test_create_sets_metadata() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();

        assert!(project.is_loaded());
        assert!(project.is_dirty());
        assert_eq!(project.filename(), DEFAULT_PROJECT_FILE);
        assert!(integrity::verify_token(&project.metadata.project_id).is_ok());

        let pack = project.modpack().unwrap();
        assert_eq!(pack.mod_loader, "fabric");
        assert_eq!(pack.build_version, DEFAULT_BUILD_VERSION);
        assert!(pack.mod_data.is_empty());
    }

    #[test]
    fn test_create_rejects_empty_fields() {
        let mut project = Project::new();

        let mut request = new_project();
        request.title = "  ".to_string();
        assert!(matches!(project.create(&request), Err(Error::Validation(_))));

        let mut request = new_project();
        request.build_version = Some(String::new());
        assert!(matches!(project.create(&request), Err(Error::Validation(_))));

        assert!(!project.is_loaded());
    }

    #[test]
    fn test_operations_require_loaded_project() {
        let mut project = Project::new();
        assert!(matches!(project.modpack(), Err(Error::NoProject)));
        assert!(matches!(project.save(None), Err(Error::NoProject)));
        assert!(project.add_mod(record("a")).is_err());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pack.json");

        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        project.add_mod(record("a")).unwrap();
        project.add_mod(record("b")).unwrap();
        project.set_flag("allow_alpha_beta", true).unwrap();
        project.save(Some(&path)).unwrap();

        assert!(!project.is_dirty());

        let mut reopened = Project::new();
        reopened.load(&path).unwrap();

        assert_eq!(reopened.modpack().unwrap(), project.modpack().unwrap());
        assert_eq!(reopened.metadata, project.metadata);
        assert!(reopened.metadata.saved);
    }

    #[test]
    fn test_saved_flag_forced_true_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pack.json");

        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        assert!(!project.metadata.saved);
        project.save(Some(&path)).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["metadata"]["saved"], serde_json::Value::Bool(true));
        assert_eq!(raw["title"], "Skyblock");
        assert!(raw["mod_data"].is_array());
    }

    #[test]
    fn test_save_defaults_to_metadata_filename() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("pack.json");

        let mut project = Project::new();
        project.set_filename(&path);
        project.create(&new_project()).unwrap();

        let written = project.save(None).unwrap();
        assert_eq!(written, path);
        assert!(path.exists());
    }

    #[test]
    fn test_load_invalid_token_keeps_state() {
        let temp_dir = TempDir::new().unwrap();
        let good = temp_dir.path().join("good.json");
        let bad = temp_dir.path().join("bad.json");

        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        project.add_mod(record("a")).unwrap();
        project.save(Some(&good)).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&good).unwrap()).unwrap();
        raw["title"] = "Forged".into();
        raw["metadata"]["project_id"] = hex::encode(b"some other tool").into();
        fs::write(&bad, raw.to_string()).unwrap();

        let before_pack = project.modpack().unwrap().clone();
        let before_meta = project.metadata.clone();

        assert!(matches!(project.load(&bad), Err(Error::InvalidProject(_))));
        assert_eq!(project.modpack().unwrap(), &before_pack);
        assert_eq!(project.metadata, before_meta);
    }

    #[test]
    fn test_load_missing_metadata_is_invalid() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("plain.json");
        fs::write(&path, r#"{"title": "x"}"#).unwrap();

        let mut project = Project::new();
        assert!(matches!(project.load(&path), Err(Error::InvalidProject(_))));
        assert!(!project.is_loaded());
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let mut project = Project::new();
        assert!(matches!(
            project.load(temp_dir.path().join("absent.json")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_remove_mods() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        for id in ["m0", "m1", "m2", "m3", "m4"] {
            project.add_mod(record(id)).unwrap();
        }
        project.metadata.saved = true;

        assert!(!project.remove_mods(&BTreeSet::new()).unwrap());
        assert!(!project.is_dirty());

        assert!(project.remove_mods(&BTreeSet::from([1, 3])).unwrap());
        assert!(project.is_dirty());

        let ids: Vec<_> = project
            .modpack()
            .unwrap()
            .mod_data
            .iter()
            .map(|m| m.project_id.as_str())
            .collect();
        assert_eq!(ids, vec!["m0", "m2", "m4"]);
    }

    #[test]
    fn test_add_duplicate_is_rejected() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        project.add_mod(record("a")).unwrap();
        project.metadata.saved = true;

        assert!(matches!(
            project.add_mod(record("a")),
            Err(Error::Compatibility(_))
        ));
        assert!(!project.is_dirty());
        assert_eq!(project.modpack().unwrap().mod_data.len(), 1);
    }

    #[test]
    fn test_edit_marks_dirty() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        project.metadata.saved = true;

        project.edit(PackField::BuildVersion, "2.0.0").unwrap();

        assert!(project.is_dirty());
        assert_eq!(project.modpack().unwrap().build_version, "2.0.0");
    }

    #[test]
    fn test_replace_mod_into_duplicate_still_applies() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();
        project.add_mod(record("a")).unwrap();
        project.add_mod(record("b")).unwrap();

        project
            .replace_mod(1, |m| m.project_id = "a".to_string())
            .unwrap();

        assert!(project.is_dirty());
        assert!(!project.check_compatibility().unwrap());
        assert_eq!(project.modpack().unwrap().mod_data[1].project_id, "a");
        assert!(project.replace_mod(5, |_| {}).is_err());
    }

    #[test]
    fn test_add_mod_reports_advisories() {
        let mut project = Project::new();
        project.create(&new_project()).unwrap();

        let mut forge_mod = record("f");
        forge_mod.mod_loaders = vec!["forge".to_string()];

        let advisories = project.add_mod(forge_mod).unwrap();
        assert_eq!(advisories.len(), 1);
        assert_eq!(project.modpack().unwrap().mod_data.len(), 1);
    }
}
