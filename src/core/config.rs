use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::errors::ApiError;

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub project_root: PathBuf,
    pub user_data_dir: PathBuf,
    pub log_dir: PathBuf,
    pub db_path: PathBuf,
}

impl AppPaths {
    pub fn new() -> Self {
        let project_root = discover_project_root();
        let user_data_dir = discover_user_data_dir(&project_root);
        let log_dir = user_data_dir.join("logs");
        let db_path = user_data_dir.join("rag.db");

        for dir in [&user_data_dir, &log_dir] {
            let _ = fs::create_dir_all(dir);
        }

        AppPaths {
            project_root,
            user_data_dir,
            log_dir,
            db_path,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

fn discover_project_root() -> PathBuf {
    if let Ok(root) = env::var("BUILDMATE_ROOT") {
        return PathBuf::from(root);
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    if manifest_dir.join("config.yml").exists() {
        return manifest_dir;
    }

    env::current_dir().unwrap_or(manifest_dir)
}

fn discover_user_data_dir(project_root: &Path) -> PathBuf {
    if let Ok(dir) = env::var("BUILDMATE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if cfg!(debug_assertions) {
        return project_root.to_path_buf();
    }

    if cfg!(target_os = "windows") {
        let base = env::var("LOCALAPPDATA")
            .unwrap_or_else(|_| env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string()));
        return PathBuf::from(base).join("BuildMate");
    }

    if cfg!(target_os = "macos") {
        return home_dir()
            .join("Library")
            .join("Application Support")
            .join("BuildMate");
    }

    let xdg = env::var("XDG_DATA_HOME").unwrap_or_else(|_| {
        home_dir()
            .join(".local/share")
            .to_string_lossy()
            .to_string()
    });
    PathBuf::from(xdg).join("buildmate")
}

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Typed application settings, loaded once at startup from `config.yml`.
///
/// Every field has a default, so a missing file or a partial file both
/// yield a runnable configuration. `OPENAI_API_KEY` in the environment
/// overrides `llm.api_key` from the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub retrieval: RetrievalSettings,
    pub ingest: IngestSettings,
    pub memory: MemorySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            server: ServerSettings::default(),
            llm: LlmSettings::default(),
            retrieval: RetrievalSettings::default(),
            ingest: IngestSettings::default(),
            memory: MemorySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        ServerSettings {
            bind_addr: "0.0.0.0:8000".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub base_url: String,
    pub api_key: String,
    pub chat_model: String,
    pub classifier_model: String,
    pub embedding_model: String,
    pub temperature: f64,
    pub classifier_temperature: f64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        LlmSettings {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4o-mini".to_string(),
            classifier_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: 0.7,
            classifier_temperature: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub top_k: usize,
    pub rerank_weight: f32,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        RetrievalSettings {
            top_k: 3,
            rerank_weight: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub corpus_path: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub separator: String,
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings {
            corpus_path: PathBuf::from("data/clean_data.json"),
            chunk_size: 1000,
            chunk_overlap: 200,
            separator: "\n".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemorySettings {
    pub idle_timeout_secs: u64,
}

impl Default for MemorySettings {
    fn default() -> Self {
        MemorySettings {
            idle_timeout_secs: 1800,
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Result<Settings, ApiError> {
        let path = config_path(paths);
        let mut settings = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(ApiError::internal)?;
            Settings::parse(&contents).map_err(|err| {
                ApiError::BadRequest(format!("Invalid config at '{}': {}", path.display(), err))
            })?
        } else {
            Settings::default()
        };

        if let Ok(key) = env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                settings.llm.api_key = key;
            }
        }

        Ok(settings)
    }

    fn parse(contents: &str) -> Result<Settings, serde_yaml::Error> {
        serde_yaml::from_str(contents)
    }

    /// Resolve the corpus path against the project root when relative.
    pub fn corpus_path(&self, paths: &AppPaths) -> PathBuf {
        if self.ingest.corpus_path.is_absolute() {
            self.ingest.corpus_path.clone()
        } else {
            paths.project_root.join(&self.ingest.corpus_path)
        }
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("BUILDMATE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let user_config = paths.user_data_dir.join("config.yml");
    if user_config.exists() {
        return user_config;
    }

    paths.project_root.join("config.yml")
}
