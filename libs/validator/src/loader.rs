//! Cached configuration loading.
//!
//! Each loader keeps a process-wide cache keyed by path: loading the same
//! path twice returns the same shared snapshot, so startup code and tests
//! can call the loaders freely without re-parsing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use walkdir::WalkDir;

use crate::profiles::{ProfileStore, StructureDefinition};
use crate::recipes::RecipeBook;
use crate::rules::RuleTable;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("failed to parse profile {path}: {source}")]
    Profile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

type Cache<T> = OnceLock<Mutex<HashMap<PathBuf, Arc<T>>>>;

static RULES_CACHE: Cache<RuleTable> = OnceLock::new();
static RECIPES_CACHE: Cache<RecipeBook> = OnceLock::new();
static PROFILES_CACHE: Cache<ProfileStore> = OnceLock::new();

fn cached<T>(cache: &Cache<T>, path: &Path) -> Option<Arc<T>> {
    cache
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap()
        .get(path)
        .cloned()
}

fn store<T>(cache: &Cache<T>, path: &Path, value: T) -> Arc<T> {
    let value = Arc::new(value);
    cache
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .unwrap()
        .insert(path.to_path_buf(), value.clone());
    value
}

/// Load field rules from a YAML file, reusing the cached table when the
/// path has been loaded before.
pub fn load_rules(path: impl AsRef<Path>) -> Result<Arc<RuleTable>, LoadError> {
    let path = path.as_ref();
    if let Some(table) = cached(&RULES_CACHE, path) {
        tracing::debug!(path = %path.display(), "rules cache hit");
        return Ok(table);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = RuleTable::from_yaml(&raw).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), "loaded field rules");
    Ok(store(&RULES_CACHE, path, table))
}

/// Load bundle recipes from a YAML file, cached by path.
pub fn load_recipes(path: impl AsRef<Path>) -> Result<Arc<RecipeBook>, LoadError> {
    let path = path.as_ref();
    if let Some(book) = cached(&RECIPES_CACHE, path) {
        tracing::debug!(path = %path.display(), "recipes cache hit");
        return Ok(book);
    }

    let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let book = RecipeBook::from_yaml(&raw).map_err(|source| LoadError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(path = %path.display(), recipes = book.len(), "loaded bundle recipes");
    Ok(store(&RECIPES_CACHE, path, book))
}

/// Load every `*.json` StructureDefinition under `dir` (recursively),
/// cached by directory path. A malformed profile is a hard error.
pub fn load_profiles(dir: impl AsRef<Path>) -> Result<Arc<ProfileStore>, LoadError> {
    let dir = dir.as_ref();
    if let Some(profiles) = cached(&PROFILES_CACHE, dir) {
        tracing::debug!(path = %dir.display(), "profiles cache hit");
        return Ok(profiles);
    }

    let mut profiles = ProfileStore::default();
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "json") {
            continue;
        }
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: StructureDefinition =
            serde_json::from_str(&raw).map_err(|source| LoadError::Profile {
                path: path.to_path_buf(),
                source,
            })?;
        profiles.insert(profile);
    }

    tracing::info!(path = %dir.display(), profiles = profiles.len(), "loaded profiles");
    Ok(store(&PROFILES_CACHE, dir, profiles))
}

/// Drop every cached snapshot. Test hook.
pub fn clear_caches() {
    if let Some(map) = RULES_CACHE.get() {
        map.lock().unwrap().clear();
    }
    if let Some(map) = RECIPES_CACHE.get() {
        map.lock().unwrap().clear();
    }
    if let Some(map) = PROFILES_CACHE.get() {
        map.lock().unwrap().clear();
    }
}
