use std::collections::BTreeMap;

use crate::models::{EnvironmentName, EnvironmentProfile};

/// The profile each environment tier resolves to for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCatalog {
    profiles: BTreeMap<EnvironmentName, EnvironmentProfile>,
}

impl ProfileCatalog {
    /// Catalog holding the built-in defaults for every tier.
    pub fn builtin() -> Self {
        let profiles = EnvironmentName::ALL
            .iter()
            .map(|name| (*name, EnvironmentProfile::builtin(*name)))
            .collect();
        Self { profiles }
    }

    /// Replace the profile of `profile.name`.
    pub fn with_profile(mut self, profile: EnvironmentProfile) -> Self {
        self.profiles.insert(profile.name, profile);
        self
    }

    pub fn profile(&self, name: EnvironmentName) -> EnvironmentProfile {
        self.profiles
            .get(&name)
            .cloned()
            .unwrap_or_else(|| EnvironmentProfile::builtin(name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &EnvironmentProfile> {
        self.profiles.values()
    }
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_builtin_covers_all_tiers() {
        let catalog = ProfileCatalog::builtin();
        assert_eq!(catalog.iter().count(), 3);
    }

    #[test]
    fn test_with_profile_overrides_single_tier() {
        let mut staging = EnvironmentProfile::builtin(EnvironmentName::Staging);
        staging.budget_limit = Decimal::new(40, 0);
        let catalog = ProfileCatalog::builtin().with_profile(staging);
        assert_eq!(catalog.profile(EnvironmentName::Staging).budget_limit, Decimal::new(40, 0));
        assert_eq!(
            catalog.profile(EnvironmentName::Prod),
            EnvironmentProfile::builtin(EnvironmentName::Prod)
        );
    }
}
