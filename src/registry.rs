//! Mod registry client and metadata types
//!
//! The registry is an external mod-hosting service shaped like the Modrinth v2
//! API. Two backends are available behind [`RegistryClient`]:
//!
//! - `Http` talks to the live API (see [`crate::registry_http`])
//! - `File` reads a local mirror directory, useful offline and in tests
//!
//! Every lookup returns `Ok(None)` when the registry answers but has nothing
//! for the identifier, and `Err` when the registry could not be asked at all.
//!
//! # Examples
//!
//! ```no_run
//! use packsmith::{Config, RegistryClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let registry = RegistryClient::from_config(&config)?;
//!
//! if let Some(project) = registry.get_project("sodium")? {
//!     println!("{}: {}", project.title, project.description);
//! }
//!
//! let versions = registry
//!     .list_versions("sodium", Some(&["fabric".to_string()]), Some(&["1.20.1".to_string()]))?
//!     .unwrap_or_default();
//! println!("{} compatible versions", versions.len());
//! # Ok(())
//! # }
//! ```

use crate::modpack::parse_published;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Answer of the project existence check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectCheck {
    pub id: String,
}

/// Project metadata as returned by the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectInfo {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub loaders: Vec<String>,
    #[serde(default)]
    pub game_versions: Vec<String>,
}

/// Release channel of a version
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Release,
    Beta,
    Alpha,
}

impl std::fmt::Display for VersionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionType::Release => write!(f, "release"),
            VersionType::Beta => write!(f, "beta"),
            VersionType::Alpha => write!(f, "alpha"),
        }
    }
}

/// How a version relates to one of its dependencies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DependencyType {
    Required,
    Optional,
    Incompatible,
    Embedded,
    #[serde(other)]
    Unknown,
}

/// Dependency entry of a registry version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionDependency {
    #[serde(default)]
    pub version_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    pub dependency_type: DependencyType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileHashes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha512: Option<String>,
}

/// Download descriptor of a version file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionFile {
    pub url: String,
    pub filename: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub hashes: FileHashes,
}

/// One published version of a registry project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Version {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub version_number: String,
    #[serde(default)]
    pub changelog: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<VersionDependency>,
    #[serde(default)]
    pub game_versions: Vec<String>,
    pub version_type: VersionType,
    #[serde(default)]
    pub loaders: Vec<String>,
    pub date_published: String,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

impl Version {
    /// Project ids of the dependencies this version cannot run without
    pub fn required_project_ids(&self) -> Vec<String> {
        self.dependencies
            .iter()
            .filter(|d| d.dependency_type == DependencyType::Required)
            .filter_map(|d| d.project_id.clone())
            .collect()
    }

    /// One-line summary shown when picking a version
    pub fn describe(&self) -> String {
        format!(
            "{} [{}] for {} ({})",
            self.version_number,
            self.version_type,
            if self.game_versions.is_empty() {
                "any game version".to_string()
            } else {
                self.game_versions.join(", ")
            },
            self.date_published
        )
    }
}

/// Search filter clause understood by the registry search endpoint
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    ProjectType(String),
    Category(String),
    Version(String),
}

impl Facet {
    /// Wire form, e.g. `categories:fabric`
    pub fn to_clause(&self) -> String {
        match self {
            Facet::ProjectType(t) => format!("project_type:{}", t),
            Facet::Category(c) => format!("categories:{}", c),
            Facet::Version(v) => format!("versions:{}", v),
        }
    }

    fn matches(&self, project: &ProjectInfo) -> bool {
        match self {
            Facet::ProjectType(t) => project.project_type.as_deref() == Some(t.as_str()),
            Facet::Category(c) => project.categories.contains(c) || project.loaders.contains(c),
            Facet::Version(v) => project.game_versions.contains(v),
        }
    }
}

/// Sort order of search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SearchIndex {
    #[default]
    Relevance,
    Downloads,
    Follows,
    Newest,
    Updated,
}

impl SearchIndex {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchIndex::Relevance => "relevance",
            SearchIndex::Downloads => "downloads",
            SearchIndex::Follows => "follows",
            SearchIndex::Newest => "newest",
            SearchIndex::Updated => "updated",
        }
    }
}

/// Parameters of a registry search
///
/// `facets` is a conjunction of disjunctions: every inner list must have at
/// least one matching clause.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub facets: Vec<Vec<Facet>>,
    pub index: Option<SearchIndex>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchQuery {
    /// Facets restricting results to mods for one loader and game version
    pub fn mods_for(loader: &str, mc_version: &str) -> Vec<Vec<Facet>> {
        vec![
            vec![Facet::ProjectType("mod".to_string())],
            vec![Facet::Category(loader.to_string())],
            vec![Facet::Version(mc_version.to_string())],
        ]
    }

    /// Facets in the registry's JSON wire format
    pub fn facets_json(&self) -> Result<Option<String>> {
        if self.facets.is_empty() {
            return Ok(None);
        }
        let clauses: Vec<Vec<String>> = self
            .facets
            .iter()
            .map(|group| group.iter().map(Facet::to_clause).collect())
            .collect();
        Ok(Some(serde_json::to_string(&clauses)?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub project_id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_type: Option<String>,
    #[serde(default)]
    pub downloads: u64,
    #[serde(default)]
    pub latest_version: Option<String>,
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub offset: u32,
    pub limit: u32,
    pub total_hits: u32,
}

/// Check that an identifier is a plausible project slug or id
///
/// Identifiers are 3 to 64 characters from the registry's slug alphabet.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r#"^[\w!@$()`.+,"\-']{3,64}$"#).expect("identifier pattern is valid")
    });

    if pattern.is_match(identifier) {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "'{}' is not a valid project slug or id",
            identifier
        )))
    }
}

pub enum RegistryClient {
    File(FileRegistryClient),
    Http(crate::registry_http::HttpRegistryClient),
}

impl RegistryClient {
    /// Create a registry client using configuration
    pub fn from_config(config: &crate::Config) -> Result<Self> {
        match config.registry.registry_type.as_str() {
            "file" => {
                let path = config.registry.mirror_path()?;
                Ok(RegistryClient::File(FileRegistryClient::new(path)))
            }
            _ => {
                let http_client = crate::registry_http::HttpRegistryClient::new(
                    config.registry.url.clone(),
                    std::time::Duration::from_secs(config.registry.timeout_seconds),
                    &config.registry.user_agent,
                )?;
                Ok(RegistryClient::Http(http_client))
            }
        }
    }

    pub fn project_exists(&self, id: &str) -> Result<Option<ProjectCheck>> {
        match self {
            RegistryClient::File(client) => client.project_exists(id),
            RegistryClient::Http(client) => client.project_exists(id),
        }
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectInfo>> {
        match self {
            RegistryClient::File(client) => client.get_project(id),
            RegistryClient::Http(client) => client.get_project(id),
        }
    }

    /// List versions of a project, newest first
    ///
    /// `loaders` and `game_versions` restrict the listing to versions
    /// supporting at least one of the given values.
    pub fn list_versions(
        &self,
        id: &str,
        loaders: Option<&[String]>,
        game_versions: Option<&[String]>,
    ) -> Result<Option<Vec<Version>>> {
        match self {
            RegistryClient::File(client) => client.list_versions(id, loaders, game_versions),
            RegistryClient::Http(client) => client.list_versions(id, loaders, game_versions),
        }
    }

    pub fn search(&self, query: &SearchQuery) -> Result<Option<SearchResponse>> {
        match self {
            RegistryClient::File(client) => client.search(query),
            RegistryClient::Http(client) => client.search(query),
        }
    }

    pub fn get_version(&self, version_id: &str) -> Result<Option<Version>> {
        match self {
            RegistryClient::File(client) => client.get_version(version_id),
            RegistryClient::Http(client) => client.get_version(version_id),
        }
    }
}

/// Registry backed by a local mirror directory
///
/// Layout:
///
/// ```text
/// <root>/projects/<project_id>.json   ProjectInfo
/// <root>/versions/<project_id>.json   [Version]
/// ```
pub struct FileRegistryClient {
    registry_path: PathBuf,
}

impl FileRegistryClient {
    pub fn new<P: AsRef<Path>>(registry_path: P) -> Self {
        Self {
            registry_path: registry_path.as_ref().to_path_buf(),
        }
    }

    pub fn get_projects_dir(&self) -> PathBuf {
        self.registry_path.join("projects")
    }

    pub fn get_versions_dir(&self) -> PathBuf {
        self.registry_path.join("versions")
    }

    /// Initialize mirror directory structure
    pub fn init_registry(&self) -> Result<()> {
        fs::create_dir_all(self.get_projects_dir())?;
        fs::create_dir_all(self.get_versions_dir())?;
        Ok(())
    }

    fn all_projects(&self) -> Result<Vec<ProjectInfo>> {
        let projects_dir = self.get_projects_dir();

        if !projects_dir.exists() {
            return Ok(Vec::new());
        }

        let mut projects: Vec<ProjectInfo> = Vec::new();
        for entry in fs::read_dir(projects_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                let content = fs::read_to_string(&path)?;
                projects.push(serde_json::from_str(&content)?);
            }
        }

        projects.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(projects)
    }

    fn find_project(&self, id: &str) -> Result<Option<ProjectInfo>> {
        let by_id = self.get_projects_dir().join(format!("{}.json", id));
        if by_id.exists() {
            let content = fs::read_to_string(&by_id)?;
            return Ok(Some(serde_json::from_str(&content)?));
        }

        // Fall back to a slug match
        Ok(self.all_projects()?.into_iter().find(|p| p.slug == id))
    }

    pub fn project_exists(&self, id: &str) -> Result<Option<ProjectCheck>> {
        Ok(self
            .find_project(id)?
            .map(|project| ProjectCheck { id: project.id }))
    }

    pub fn get_project(&self, id: &str) -> Result<Option<ProjectInfo>> {
        if self.project_exists(id)?.is_none() {
            return Ok(None);
        }
        self.find_project(id)
    }

    pub fn list_versions(
        &self,
        id: &str,
        loaders: Option<&[String]>,
        game_versions: Option<&[String]>,
    ) -> Result<Option<Vec<Version>>> {
        let check = match self.project_exists(id)? {
            Some(check) => check,
            None => return Ok(None),
        };

        let versions_file = self.get_versions_dir().join(format!("{}.json", check.id));
        if !versions_file.exists() {
            return Ok(Some(Vec::new()));
        }

        let content = fs::read_to_string(&versions_file)?;
        let mut versions: Vec<Version> = serde_json::from_str(&content)?;

        versions.retain(|v| {
            let loader_ok =
                loaders.map_or(true, |wanted| wanted.iter().any(|l| v.loaders.contains(l)));
            let game_ok = game_versions
                .map_or(true, |wanted| wanted.iter().any(|g| v.game_versions.contains(g)));
            loader_ok && game_ok
        });
        // Unparseable dates sort last
        versions.sort_by_cached_key(|v| Reverse(parse_published(&v.date_published).ok()));

        Ok(Some(versions))
    }

    /// Search for projects (simple substring search over slug, title and description)
    pub fn search(&self, query: &SearchQuery) -> Result<Option<SearchResponse>> {
        let needle = query
            .query
            .as_deref()
            .unwrap_or_default()
            .to_lowercase();

        let matching: Vec<ProjectInfo> = self
            .all_projects()?
            .into_iter()
            .filter(|p| {
                needle.is_empty()
                    || p.slug.to_lowercase().contains(&needle)
                    || p.title.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .filter(|p| {
                query
                    .facets
                    .iter()
                    .all(|group| group.iter().any(|facet| facet.matches(p)))
            })
            .collect();

        let offset = query.offset.unwrap_or(0);
        let limit = query.limit.unwrap_or(10);
        let total_hits = matching.len() as u32;

        let hits = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|p| SearchHit {
                project_id: p.id,
                slug: p.slug,
                title: p.title,
                description: p.description,
                project_type: p.project_type,
                downloads: 0,
                latest_version: None,
            })
            .collect();

        Ok(Some(SearchResponse {
            hits,
            offset,
            limit,
            total_hits,
        }))
    }

    pub fn get_version(&self, version_id: &str) -> Result<Option<Version>> {
        let versions_dir = self.get_versions_dir();

        if !versions_dir.exists() {
            return Ok(None);
        }

        for entry in fs::read_dir(versions_dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let content = fs::read_to_string(&path)?;
            let versions: Vec<Version> = serde_json::from_str(&content)?;
            if let Some(version) = versions.into_iter().find(|v| v.id == version_id) {
                return Ok(Some(version));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_project(root: &Path, id: &str, slug: &str, loaders: &[&str]) {
        let project = ProjectInfo {
            id: id.to_string(),
            slug: slug.to_string(),
            title: slug.to_uppercase(),
            description: format!("The {} mod", slug),
            project_type: Some("mod".to_string()),
            categories: Vec::new(),
            loaders: loaders.iter().map(|s| s.to_string()).collect(),
            game_versions: vec!["1.20.1".to_string()],
        };
        fs::write(
            root.join("projects").join(format!("{}.json", id)),
            serde_json::to_string(&project).unwrap(),
        )
        .unwrap();
    }

    fn version_json(id: &str, project_id: &str, loader: &str, date: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "project_id": project_id,
            "name": format!("Version {}", id),
            "version_number": id,
            "game_versions": ["1.20.1"],
            "version_type": "release",
            "loaders": [loader],
            "date_published": date,
            "files": []
        })
    }

    fn mirror() -> (TempDir, FileRegistryClient) {
        let temp_dir = TempDir::new().unwrap();
        let client = FileRegistryClient::new(temp_dir.path());
        client.init_registry().unwrap();
        (temp_dir, client)
    }

    #[test]
    fn test_version_type_serialization() {
        assert_eq!(
            serde_json::to_string(&VersionType::Release).unwrap(),
            "\"release\""
        );
        let beta: VersionType = serde_json::from_str("\"beta\"").unwrap();
        assert_eq!(beta, VersionType::Beta);
    }

    #[test]
    fn test_unknown_dependency_type() {
        let dep: VersionDependency =
            serde_json::from_str(r#"{"project_id": "abc", "dependency_type": "recommended"}"#)
                .unwrap();
        assert_eq!(dep.dependency_type, DependencyType::Unknown);
    }

    #[test]
    fn test_required_project_ids() {
        let version: Version = serde_json::from_value(serde_json::json!({
            "id": "v1",
            "project_id": "P1",
            "name": "v1",
            "version_number": "1.0.0",
            "version_type": "release",
            "date_published": "2024-01-01T00:00:00Z",
            "dependencies": [
                {"project_id": "fabric-api", "dependency_type": "required"},
                {"project_id": "modmenu", "dependency_type": "optional"},
                {"version_id": "xyz", "dependency_type": "required"}
            ]
        }))
        .unwrap();

        assert_eq!(version.required_project_ids(), vec!["fabric-api".to_string()]);
    }

    #[test]
    fn test_facets_json() {
        let query = SearchQuery {
            facets: SearchQuery::mods_for("fabric", "1.20.1"),
            ..Default::default()
        };
        assert_eq!(
            query.facets_json().unwrap().unwrap(),
            r#"[["project_type:mod"],["categories:fabric"],["versions:1.20.1"]]"#
        );
        assert!(SearchQuery::default().facets_json().unwrap().is_none());
    }

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("sodium").is_ok());
        assert!(validate_identifier("AANobbMI").is_ok());
        assert!(validate_identifier("fabric-api").is_ok());
        assert!(validate_identifier("ab").is_err());
        assert!(validate_identifier("has space").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn test_file_registry_slug_lookup() {
        let (temp_dir, client) = mirror();
        write_project(temp_dir.path(), "AANobbMI", "sodium", &["fabric"]);

        let by_id = client.get_project("AANobbMI").unwrap().unwrap();
        let by_slug = client.get_project("sodium").unwrap().unwrap();
        assert_eq!(by_id, by_slug);
        assert!(client.get_project("missing").unwrap().is_none());
        assert_eq!(
            client.project_exists("sodium").unwrap(),
            Some(ProjectCheck {
                id: "AANobbMI".to_string()
            })
        );
    }

    #[test]
    fn test_file_registry_list_versions_filters_and_sorts() {
        let (temp_dir, client) = mirror();
        write_project(temp_dir.path(), "P1", "lithium", &["fabric", "quilt"]);
        let versions = serde_json::json!([
            version_json("old", "P1", "fabric", "2023-01-01T00:00:00Z"),
            version_json("new", "P1", "fabric", "2024-01-01T00:00:00Z"),
            version_json("quilt", "P1", "quilt", "2024-02-01T00:00:00Z"),
        ]);
        fs::write(
            temp_dir.path().join("versions").join("P1.json"),
            versions.to_string(),
        )
        .unwrap();

        let listed = client
            .list_versions("lithium", Some(&["fabric".to_string()]), None)
            .unwrap()
            .unwrap();
        let ids: Vec<_> = listed.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);

        assert_eq!(client.get_version("quilt").unwrap().unwrap().loaders, vec!["quilt"]);
        assert!(client.list_versions("nothing", None, None).unwrap().is_none());
    }

    #[test]
    fn test_file_registry_sorts_by_instant_not_text() {
        let (temp_dir, client) = mirror();
        write_project(temp_dir.path(), "P1", "lithium", &["fabric"]);
        let versions = serde_json::json!([
            version_json("later", "P1", "fabric", "2024-01-01T10:00:00+00:00"),
            version_json("earlier", "P1", "fabric", "2024-01-01T12:00:00+05:00"),
            version_json("undated", "P1", "fabric", "unknown"),
        ]);
        fs::write(
            temp_dir.path().join("versions").join("P1.json"),
            versions.to_string(),
        )
        .unwrap();

        let listed = client.list_versions("P1", None, None).unwrap().unwrap();
        let ids: Vec<_> = listed.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["later", "earlier", "undated"]);
    }

    #[test]
    fn test_file_registry_search() {
        let (temp_dir, client) = mirror();
        write_project(temp_dir.path(), "P1", "sodium", &["fabric"]);
        write_project(temp_dir.path(), "P2", "embeddium", &["forge"]);

        let query = SearchQuery {
            query: Some("odi".to_string()),
            ..Default::default()
        };
        let response = client.search(&query).unwrap().unwrap();
        assert_eq!(response.total_hits, 1);
        assert_eq!(response.hits[0].slug, "sodium");

        let query = SearchQuery {
            facets: vec![vec![Facet::Category("forge".to_string())]],
            ..Default::default()
        };
        let response = client.search(&query).unwrap().unwrap();
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].project_id, "P2");
    }
}
