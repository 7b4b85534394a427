//! Test utilities and helpers for packsmith integration tests.
//!
//! This module provides a file-backed registry mirror, mod fixtures and an
//! isolated project/config directory for CLI runs.

#![allow(dead_code)]

use packsmith::{NewProject, Project};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const MC_VERSION: &str = "1.20.1";
pub const LOADER: &str = "fabric";

/// Isolated working directory with its own config directory
pub struct TestProject {
    pub temp_dir: TempDir,
    pub project_path: PathBuf,
    pub config_dir: PathBuf,
}

impl TestProject {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let project_path = temp_dir.path().to_path_buf();
        let config_dir = project_path.join(".packsmith");

        fs::create_dir_all(&config_dir).expect("Failed to create config directory");

        Self {
            temp_dir,
            project_path,
            config_dir,
        }
    }

    /// Configure to use a file-based registry
    pub fn configure_file_registry(&self, registry_path: &Path) {
        let config = format!(
            r#"[registry]
registry_type = "file"
path = "{}"

[resolver]
max_workers = 4
"#,
            registry_path.display()
        );
        fs::write(self.config_dir.join("config.toml"), config).expect("Failed to write config");
    }

    pub fn path(&self) -> &Path {
        &self.project_path
    }

    pub fn config_path(&self) -> &Path {
        &self.config_dir
    }

    pub fn pack_file(&self) -> PathBuf {
        self.project_path.join("modpack.json")
    }

    pub fn read_pack(&self) -> serde_json::Value {
        let content = fs::read_to_string(self.pack_file()).expect("Failed to read project file");
        serde_json::from_str(&content).expect("Project file is not JSON")
    }

    /// Project ids of the saved pack, in order
    pub fn saved_project_ids(&self) -> Vec<String> {
        self.read_pack()["mod_data"]
            .as_array()
            .expect("mod_data should be an array")
            .iter()
            .map(|m| m["project_id"].as_str().unwrap_or_default().to_string())
            .collect()
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture for one registry version
#[derive(Clone)]
pub struct MockVersion {
    pub id: String,
    pub version_number: String,
    pub version_type: String,
    pub date: String,
    pub game_versions: Vec<String>,
    pub loaders: Vec<String>,
    pub required: Vec<String>,
}

impl MockVersion {
    pub fn new(id: &str, date: &str) -> Self {
        Self {
            id: id.to_string(),
            version_number: id.to_string(),
            version_type: "release".to_string(),
            date: date.to_string(),
            game_versions: vec![MC_VERSION.to_string()],
            loaders: vec![LOADER.to_string()],
            required: vec![],
        }
    }

    pub fn beta(mut self) -> Self {
        self.version_type = "beta".to_string();
        self
    }

    pub fn with_loaders(mut self, loaders: Vec<&str>) -> Self {
        self.loaders = loaders.into_iter().map(String::from).collect();
        self
    }

    pub fn requires(mut self, project_id: &str) -> Self {
        self.required.push(project_id.to_string());
        self
    }

    fn to_json(&self, project_id: &str) -> serde_json::Value {
        let dependencies: Vec<serde_json::Value> = self
            .required
            .iter()
            .map(|id| serde_json::json!({"project_id": id, "dependency_type": "required"}))
            .collect();

        serde_json::json!({
            "id": self.id,
            "project_id": project_id,
            "name": format!("{} {}", project_id, self.version_number),
            "version_number": self.version_number,
            "changelog": "",
            "dependencies": dependencies,
            "game_versions": self.game_versions,
            "version_type": self.version_type,
            "loaders": self.loaders,
            "date_published": self.date,
            "files": [{
                "url": format!("https://cdn.example/{}/{}.jar", project_id, self.id),
                "filename": format!("{}.jar", self.id),
                "primary": true,
                "size": 1024,
                "hashes": {"sha1": "0000000000000000000000000000000000000000"}
            }]
        })
    }
}

/// Fixture for one registry project
pub struct MockMod {
    pub id: String,
    pub slug: String,
    pub versions: Vec<MockVersion>,
}

impl MockMod {
    /// Project whose id and slug differ (`ID-<slug>` and `<slug>`)
    pub fn new(slug: &str) -> Self {
        Self {
            id: format!("ID-{}", slug),
            slug: slug.to_string(),
            versions: vec![],
        }
    }

    pub fn with_version(mut self, version: MockVersion) -> Self {
        self.versions.push(version);
        self
    }
}

/// File-based registry mirror in a temp directory
pub struct TestRegistry {
    pub temp_dir: TempDir,
    pub projects_dir: PathBuf,
    pub versions_dir: PathBuf,
}

impl TestRegistry {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();

        let projects_dir = root.join("projects");
        let versions_dir = root.join("versions");

        fs::create_dir_all(&projects_dir).expect("Failed to create projects dir");
        fs::create_dir_all(&versions_dir).expect("Failed to create versions dir");

        Self {
            temp_dir,
            projects_dir,
            versions_dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn client(&self) -> packsmith::RegistryClient {
        packsmith::RegistryClient::File(packsmith::FileRegistryClient::new(self.path()))
    }

    /// Add a project and its versions to the mirror
    pub fn add_mod(&self, fixture: &MockMod) {
        let project = serde_json::json!({
            "id": fixture.id,
            "slug": fixture.slug,
            "title": fixture.slug.to_uppercase(),
            "description": format!("The {} mod", fixture.slug),
            "project_type": "mod",
            "categories": [],
            "loaders": [LOADER],
            "game_versions": [MC_VERSION]
        });
        fs::write(
            self.projects_dir.join(format!("{}.json", fixture.id)),
            project.to_string(),
        )
        .expect("Failed to write project metadata");

        let versions: Vec<serde_json::Value> = fixture
            .versions
            .iter()
            .map(|v| v.to_json(&fixture.id))
            .collect();
        fs::write(
            self.versions_dir.join(format!("{}.json", fixture.id)),
            serde_json::Value::Array(versions).to_string(),
        )
        .expect("Failed to write versions");
    }

    /// Overwrite a project's version listing with unreadable JSON
    pub fn corrupt_versions(&self, fixture: &MockMod) {
        fs::write(
            self.versions_dir.join(format!("{}.json", fixture.id)),
            "[{\"id\": ",
        )
        .expect("Failed to write versions");
    }
}

impl Default for TestRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A freshly created, unsaved fabric 1.20.1 project
pub fn new_project() -> Project {
    let mut project = Project::new();
    project
        .create(&NewProject {
            title: "Test Pack".to_string(),
            description: "Integration test pack".to_string(),
            mc_version: MC_VERSION.to_string(),
            mod_loader: LOADER.to_string(),
            build_version: None,
        })
        .expect("Failed to create project");
    project
}

/// Project ids currently in the pack, in order
pub fn project_ids(project: &Project) -> Vec<String> {
    project
        .modpack()
        .expect("project should be loaded")
        .mod_data
        .iter()
        .map(|m| m.project_id.clone())
        .collect()
}
