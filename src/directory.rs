// Identity directory: maps a chosen username to a stable numeric user
// id, the identifier the watchlist protocol runs on. Backed by a JSON
// file in the user's home directory so ids survive across runs.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::debug;

const DIRECTORY_FILE: &str = ".topmovie_users.json";

/// Name → user id mapping with file persistence. An id is assigned once
/// at first login and never changes afterwards.
#[derive(Debug)]
pub struct UserDirectory {
    users: HashMap<String, u64>,
    path: PathBuf,
}

impl UserDirectory {
    /// Load the directory from its standard location in the home
    /// directory, falling back to the working directory when no home
    /// directory is known.
    pub fn load_default() -> Result<Self> {
        let dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::load_from(dir.join(DIRECTORY_FILE))
    }

    /// Load from an explicit path. A missing file is an empty
    /// directory, not an error.
    pub fn load_from(path: PathBuf) -> Result<Self> {
        let users = match std::fs::read_to_string(&path) {
            Ok(data) => serde_json::from_str(&data)
                .with_context(|| format!("parsing user directory {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("reading user directory {}", path.display()))
            }
        };
        Ok(UserDirectory { users, path })
    }

    /// The id registered for `name`, assigning the next free one on
    /// first sight. Stable for the same name across calls and across a
    /// save/load cycle.
    pub fn resolve_or_create(&mut self, name: &str) -> u64 {
        if let Some(&id) = self.users.get(name) {
            return id;
        }
        let id = self.users.values().max().map_or(1, |max| max + 1);
        debug!("assigned user id {} to {:?}", id, name);
        self.users.insert(name.to_string(), id);
        id
    }

    /// Write the directory back to its file.
    pub fn save(&self) -> Result<()> {
        let data = serde_json::to_string(&self.users).expect("user directory serializes");
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing user directory {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("topmovie-directory-{}-{}.json", tag, std::process::id()))
    }

    #[test]
    fn same_name_resolves_to_same_id() {
        let mut dir = UserDirectory::load_from(scratch_path("stable")).unwrap();
        let first = dir.resolve_or_create("alex");
        let second = dir.resolve_or_create("alex");
        assert_eq!(first, second);
    }

    #[test]
    fn distinct_names_get_distinct_ids() {
        let mut dir = UserDirectory::load_from(scratch_path("distinct")).unwrap();
        let a = dir.resolve_or_create("alex");
        let b = dir.resolve_or_create("brook");
        assert_ne!(a, b);
        assert!(a >= 1 && b >= 1);
    }

    #[test]
    fn ids_survive_a_save_load_cycle() {
        let path = scratch_path("persist");
        let id = {
            let mut dir = UserDirectory::load_from(path.clone()).unwrap();
            let id = dir.resolve_or_create("alex");
            dir.save().unwrap();
            id
        };
        let mut reloaded = UserDirectory::load_from(path.clone()).unwrap();
        assert_eq!(reloaded.resolve_or_create("alex"), id);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn missing_file_is_an_empty_directory() {
        let path = scratch_path("missing-never-created");
        let _ = std::fs::remove_file(&path);
        let mut dir = UserDirectory::load_from(path).unwrap();
        assert_eq!(dir.resolve_or_create("first"), 1);
    }
}
