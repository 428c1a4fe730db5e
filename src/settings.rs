use trackforge_common::{Density, Settings};

/// Display preferences owned by a workspace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SettingsStore {
    settings: Settings,
}

impl SettingsStore {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn get(&self) -> Settings {
        self.settings
    }

    pub fn density(&self) -> Density {
        self.settings.density
    }

    pub fn animations(&self) -> bool {
        self.settings.animations
    }

    /// Returns whether the density actually changed.
    pub fn set_density(&mut self, density: Density) -> bool {
        let changed = self.settings.density != density;
        self.settings.density = density;
        changed
    }

    /// Flip animations and return the new value.
    pub fn toggle_animations(&mut self) -> bool {
        self.settings.animations = !self.settings.animations;
        self.settings.animations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_comfortable_with_animations() {
        let store = SettingsStore::default();
        assert_eq!(store.density(), Density::Comfortable);
        assert!(store.animations());
    }

    #[test]
    fn test_set_density_reports_change() {
        let mut store = SettingsStore::default();
        assert!(store.set_density(Density::Compact));
        assert!(!store.set_density(Density::Compact));
        assert_eq!(store.get().density, Density::Compact);
    }

    #[test]
    fn test_toggle_animations() {
        let mut store = SettingsStore::default();
        assert!(!store.toggle_animations());
        assert!(store.toggle_animations());
    }
}
