//! Profiles - named parameter presets
//!
//! Wire shape (one entry of the profile store):
//! `{"parameters": {"ParamAngleX": 10.0}, "scopes": ["face"], "group": "Idle", "index": 0, "priority": 2}`

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// Parameter id as known to the renderer (e.g. `ParamMouthOpenY`)
pub type ParamId = String;

/// Discrete motion to trigger on the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MotionRef {
    pub group: String,
    pub index: Option<u32>,
    pub priority: Option<u32>,
}

/// A named preset of parameter targets plus an optional motion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, deserialize_with = "numeric_parameters")]
    pub parameters: HashMap<ParamId, f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

impl Profile {
    pub fn new() -> Self {
        Profile::default()
    }

    /// Builder: add one parameter target
    pub fn with_param(mut self, id: impl Into<ParamId>, value: f32) -> Self {
        self.parameters.insert(id.into(), value);
        self
    }

    /// Builder: attach a motion group
    pub fn with_motion(mut self, group: impl Into<String>, index: Option<u32>) -> Self {
        self.group = Some(group.into());
        self.index = index;
        self
    }

    /// Motion reference, present only when a group is named
    pub fn motion(&self) -> Option<MotionRef> {
        let group = self.group.as_ref().filter(|g| !g.is_empty())?;
        Some(MotionRef {
            group: group.clone(),
            index: self.index,
            priority: self.priority,
        })
    }

    /// Does this profile carry the given scope tag?
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|s| s == scope)
    }
}

/// Keep numeric entries; anything else is dropped on its own so one bad
/// value does not take the whole store down.
fn numeric_parameters<'de, D>(deserializer: D) -> Result<HashMap<ParamId, f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<HashMap<ParamId, Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .filter_map(|(id, value)| match value.as_f64() {
            Some(v) => Some((id, v as f32)),
            None => {
                warn!(param = %id, %value, "ignoring non-numeric parameter");
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_store_json() {
        let json = r#"{"parameters": {"ParamAngleX": 10, "ParamEyeLOpen": 0.5}, "scopes": ["face"], "group": "TapBody", "index": 1}"#;
        let profile: Profile = serde_json::from_str(json).unwrap();

        assert_eq!(profile.parameters.get("ParamAngleX"), Some(&10.0));
        assert!(profile.has_scope("face"));

        let motion = profile.motion().unwrap();
        assert_eq!(motion.group, "TapBody");
        assert_eq!(motion.index, Some(1));
        assert_eq!(motion.priority, None);
    }

    #[test]
    fn test_profile_without_motion() {
        let profile: Profile = serde_json::from_str(r#"{"parameters": {}}"#).unwrap();
        assert!(profile.motion().is_none());

        let empty_group = Profile::new().with_motion("", None);
        assert!(empty_group.motion().is_none());
    }

    #[test]
    fn test_non_numeric_parameters_are_skipped() {
        let json = r#"{
            "smile": {"parameters": {"ParamMouthForm": 1, "ParamCheek": "high", "ParamEyeLOpen": null, "ParamBrow": {"v": 1}}},
            "idle": {"parameters": {"ParamAngleX": -2.5}}
        }"#;
        let store: HashMap<String, Profile> = serde_json::from_str(json).unwrap();

        let smile = &store["smile"];
        assert_eq!(smile.parameters.len(), 1);
        assert_eq!(smile.parameters.get("ParamMouthForm"), Some(&1.0));
        assert_eq!(store["idle"].parameters.get("ParamAngleX"), Some(&-2.5));

        let null_map: Profile = serde_json::from_str(r#"{"parameters": null}"#).unwrap();
        assert!(null_map.parameters.is_empty());
    }

    #[test]
    fn test_missing_parameters_defaults_empty() {
        let profile: Profile = serde_json::from_str(r#"{"scopes": []}"#).unwrap();
        assert!(profile.parameters.is_empty());
    }
}
