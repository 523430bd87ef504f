//! Target parameter set - what the animator is steering towards

use std::collections::HashMap;

use crate::{ParamId, Profile};

/// Per-frame interpolation targets, parameter id → value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    targets: HashMap<ParamId, f32>,
}

impl ParameterSet {
    pub fn new() -> Self {
        ParameterSet::default()
    }

    /// Baseline parameters with `overlay` written key-by-key on top.
    ///
    /// Keys the overlay does not mention keep their baseline value, so nothing
    /// from an earlier profile survives a merge.
    pub fn merged(baseline: Option<&Profile>, overlay: &Profile) -> Self {
        let mut targets = baseline
            .map(|p| p.parameters.clone())
            .unwrap_or_default();
        for (id, value) in &overlay.parameters {
            targets.insert(id.clone(), *value);
        }
        ParameterSet { targets }
    }

    /// Exactly the baseline's parameters (empty if there is no baseline)
    pub fn baseline(baseline: Option<&Profile>) -> Self {
        ParameterSet {
            targets: baseline.map(|p| p.parameters.clone()).unwrap_or_default(),
        }
    }

    /// Replace the whole set in one step
    pub fn replace(&mut self, other: ParameterSet) {
        *self = other;
    }

    pub fn get(&self, id: &str) -> Option<f32> {
        self.targets.get(id).copied()
    }

    pub fn set(&mut self, id: impl Into<ParamId>, value: f32) {
        self.targets.insert(id.into(), value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.targets.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }
}

impl FromIterator<(ParamId, f32)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (ParamId, f32)>>(iter: I) -> Self {
        ParameterSet {
            targets: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_unmentioned_parameters_revert_to_baseline() {
        let default = Profile::new().with_param("x", 0.0).with_param("y", 0.0);
        let b = Profile::new().with_param("x", 5.0).with_param("y", 9.0);
        let a = Profile::new().with_param("x", 1.0);

        let mut targets = ParameterSet::new();
        targets.replace(ParameterSet::merged(Some(&default), &b));
        assert_eq!(targets.get("y"), Some(9.0));

        targets.replace(ParameterSet::merged(Some(&default), &a));
        assert_eq!(targets.get("x"), Some(1.0));
        assert_eq!(targets.get("y"), Some(0.0));
        assert_eq!(targets.len(), 2);
    }

    #[test]
    fn test_merge_without_baseline() {
        let a = Profile::new().with_param("x", 1.0);
        let merged = ParameterSet::merged(None, &a);
        assert_eq!(merged.len(), 1);
        assert!(ParameterSet::baseline(None).is_empty());
    }

    proptest! {
        #[test]
        fn prop_merge_is_union_with_overlay_winning(
            base in proptest::collection::hash_map("[a-e]", -10.0f32..10.0, 0..5),
            over in proptest::collection::hash_map("[a-e]", -10.0f32..10.0, 0..5),
        ) {
            let baseline = Profile { parameters: base.clone(), ..Default::default() };
            let overlay = Profile { parameters: over.clone(), ..Default::default() };
            let merged = ParameterSet::merged(Some(&baseline), &overlay);

            for (k, v) in &over {
                prop_assert_eq!(merged.get(k), Some(*v));
            }
            for (k, v) in &base {
                if !over.contains_key(k) {
                    prop_assert_eq!(merged.get(k), Some(*v));
                }
            }
            let union = base.keys().chain(over.keys()).collect::<std::collections::HashSet<_>>();
            prop_assert_eq!(merged.len(), union.len());
        }
    }
}
