//! Library - read-only view of the external profile and scene stores
//!
//! The engine never edits definitions. Each successful reload replaces a store
//! wholesale; a failed reload leaves the previous contents in place.

use std::collections::HashMap;

use crate::{Profile, Step, DEFAULT_PROFILE};

/// Profile store as delivered by the backend
pub type ProfileStore = HashMap<String, Profile>;

/// Scene store as delivered by the backend
pub type SceneStore = HashMap<String, Vec<Step>>;

#[derive(Debug, Default, Clone)]
pub struct Library {
    profiles: ProfileStore,
    scenes: SceneStore,
    /// Number of successful wholesale replacements
    revision: u64,
}

impl Library {
    pub fn new() -> Self {
        Library::default()
    }

    pub fn with_stores(profiles: ProfileStore, scenes: SceneStore) -> Self {
        Library {
            profiles,
            scenes,
            revision: 1,
        }
    }

    /// Get a profile by id
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.get(id)
    }

    /// Get a scene's steps by id
    pub fn scene(&self, id: &str) -> Option<&[Step]> {
        self.scenes.get(id).map(Vec::as_slice)
    }

    /// Ids of every loaded profile, in no particular order
    pub fn profile_ids(&self) -> impl Iterator<Item = &str> {
        self.profiles.keys().map(String::as_str)
    }

    /// The baseline profile, if the store defines one
    pub fn default_profile(&self) -> Option<&Profile> {
        self.profiles.get(DEFAULT_PROFILE)
    }

    pub fn contains_profile(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Replace both stores with a freshly fetched library
    pub fn replace(&mut self, fetched: Library) {
        self.profiles = fetched.profiles;
        self.scenes = fetched.scenes;
        self.revision += 1;
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Is nothing loaded?
    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty() && self.scenes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_lookup() {
        let mut profiles = ProfileStore::new();
        profiles.insert("default".into(), Profile::new().with_param("x", 0.0));
        profiles.insert("smile".into(), Profile::new().with_param("x", 1.0));
        let mut scenes = SceneStore::new();
        scenes.insert("greet".into(), vec![Step::timed("smile", 100)]);

        let library = Library::with_stores(profiles, scenes);

        assert!(library.default_profile().is_some());
        assert!(library.contains_profile("smile"));
        assert_eq!(library.scene("greet").map(<[Step]>::len), Some(1));
        assert!(library.scene("missing").is_none());
    }

    #[test]
    fn test_replace_is_wholesale() {
        let mut library = Library::new();
        assert!(library.is_empty());

        let mut first = ProfileStore::new();
        first.insert("a".into(), Profile::new());
        first.insert("b".into(), Profile::new());
        library.replace(Library::with_stores(first, SceneStore::new()));

        let mut second = ProfileStore::new();
        second.insert("c".into(), Profile::new());
        library.replace(Library::with_stores(second, SceneStore::new()));

        assert!(!library.contains_profile("a"));
        assert!(library.contains_profile("c"));
        assert_eq!(library.profile_count(), 1);
        assert_eq!(library.revision(), 2);
    }
}
