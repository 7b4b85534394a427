use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Invalid project file: {0}\n\n\
             Hint: The file was not created by packsmith, or its metadata block was edited.\n\
             Project files carry an integrity id in metadata.project_id that is checked on load.\n\n\
             Solutions:\n\
             1. Open a project file that was saved by packsmith\n\
             2. Create a new project: packsmith new --title <title> ...")]
    InvalidProject(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registry retrieval failed: {0}\n\n\
             Hint: None of the requested projects could be fetched from the registry.\n\n\
             Possible causes:\n\
             1. The registry is unreachable (check your network or registry.url)\n\
             2. The identifiers are misspelled (try: packsmith search <query>)\n\
             3. The request timed out (raise registry.timeout_seconds)")]
    Retrieval(String),

    #[error("Compatibility check failed: {0}")]
    Compatibility(String),

    #[error("No project loaded\n\n\
             Hint: Create a project first with: packsmith new --title <title> --mc-version <version> --loader <loader>")]
    NoProject,

    #[error("{0}")]
    Other(String),
}
