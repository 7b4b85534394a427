//! packsmith - Minecraft modpack project manager
//!
//! packsmith keeps a modpack as a single JSON project file and fills it from a
//! Modrinth-style mod registry:
//!
//! - Project files with an integrity id, saved atomically
//! - Concurrent registry lookups on a bounded worker pool
//! - Interactive version selection with transitive required dependencies
//! - Date-based updates, honouring the pack's alpha/beta policy
//! - Local mirror registries for offline use
//!
//! # Examples
//!
//! ```no_run
//! use packsmith::{AutoSelector, Config, ModResolver, NewProject, Project, RegistryClient};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let registry = RegistryClient::from_config(&config)?;
//!
//! let mut project = Project::new();
//! project.create(&NewProject {
//!     title: "Skyblock".to_string(),
//!     description: String::new(),
//!     mc_version: "1.20.1".to_string(),
//!     mod_loader: "fabric".to_string(),
//!     build_version: None,
//! })?;
//!
//! let mut selector = AutoSelector;
//! ModResolver::new(&registry, &config.resolver, &mut selector)
//!     .add_mods(&mut project, &["sodium".to_string(), "lithium".to_string()])?;
//!
//! project.save(None)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`project`] - Project container, load/save/create
//! - [`modpack`] - Modpack and Mod entities, compatibility check
//! - [`registry`] - Registry client and metadata types
//! - [`resolver`] - Mod resolution and update workflow
//! - [`batch`] - Bounded concurrent batches
//! - [`select`] - Version selection collaborator
//! - [`integrity`] - Project file integrity token
//! - [`config`] - User configuration management
//! - [`error`] - Error types and result handling

pub mod batch;
pub mod config;
pub mod error;
pub mod integrity;
pub mod modpack;
pub mod project;
pub mod registry;
pub mod registry_http;
pub mod resolver;
pub mod select;

pub use batch::WorkerPool;
pub use config::{Config, ResolverConfig};
pub use error::{Error, Result};
pub use modpack::{
    check_compatibility, is_newer, Mod, ModDependency, Modpack, PackField, FLAG_ALLOW_ALPHA_BETA,
};
pub use project::{NewProject, Project, ProjectMetadata, DEFAULT_PROJECT_FILE};
pub use registry::{
    Facet, FileRegistryClient, ProjectInfo, RegistryClient, SearchHit, SearchIndex, SearchQuery,
    SearchResponse, Version, VersionType,
};
pub use resolver::{ModResolver, ResolveReport, UpdateReport};
pub use select::{AutoSelector, Selector};
