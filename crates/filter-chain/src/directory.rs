//! Directory (group membership) collaborator used by per-caller filters.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::DirectoryError;

/// Answers "is this caller in that group". Implementations may call out to
/// an external service and fail.
pub trait DirectoryService: Send + Sync {
    fn is_member(&self, caller: &str, group: &str) -> Result<bool, DirectoryError>;
}

/// In-memory directory, `group -> members`.
///
/// Loaded from a JSON object such as `{"art-students": ["javerage"]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticDirectory {
    groups: HashMap<String, HashSet<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, group: impl Into<String>, member: impl Into<String>) -> Self {
        self.groups
            .entry(group.into())
            .or_default()
            .insert(member.into());
        self
    }

    pub fn load_from_file(path: &Path) -> Result<Self, DirectoryError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}

impl DirectoryService for StaticDirectory {
    fn is_member(&self, caller: &str, group: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .groups
            .get(group)
            .is_some_and(|members| members.contains(caller)))
    }
}

/// Collaborators handed to every filter factory.
#[derive(Clone)]
pub struct FilterServices {
    pub directory: Arc<dyn DirectoryService>,
}

impl FilterServices {
    pub fn new(directory: Arc<dyn DirectoryService>) -> Self {
        Self { directory }
    }
}

impl Default for FilterServices {
    fn default() -> Self {
        Self::new(Arc::new(StaticDirectory::new()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_directory_membership() {
        let directory = StaticDirectory::new()
            .with_member("art-students", "javerage")
            .with_member("art-students", "bbadger");

        assert!(directory.is_member("javerage", "art-students").unwrap());
        assert!(!directory.is_member("javerage", "staff").unwrap());
        assert_eq!(directory.group_count(), 1);
    }

    #[test]
    fn test_static_directory_from_json() {
        let directory: StaticDirectory =
            serde_json::from_str(r#"{"staff": ["admin1", "admin2"]}"#).unwrap();
        assert!(directory.is_member("admin2", "staff").unwrap());
    }
}
