use crate::aspects::OrbTable;
use crate::error::AstroError;
use crate::ephemeris::HouseSystem;
use crate::provenance::{read_version_file, resolve_calculation_version};
use crate::time::parse_timezone;
use std::path::PathBuf;
use urania_config::{AstroSettings, OrbSettings};

/// Typed engine configuration, built once at startup and owned by the
/// chart engine.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Swiss Ephemeris data directory; enables precise mode when usable
    pub ephe_path: Option<PathBuf>,
    pub house_system: HouseSystem,
    pub natal_orbs: OrbTable,
    pub transit_orbs: OrbTable,
    pub calculation_version: String,
    /// Zone used for date-only queries
    pub default_timezone: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ephe_path: None,
            house_system: HouseSystem::Placidus,
            natal_orbs: OrbTable::natal(),
            transit_orbs: OrbTable::transit(),
            calculation_version: resolve_calculation_version(None, None),
            default_timezone: "UTC".to_string(),
        }
    }
}

fn overlay(base: OrbTable, settings: &OrbSettings) -> OrbTable {
    OrbTable {
        luminaries: settings.luminaries.unwrap_or(base.luminaries),
        personal: settings.personal.unwrap_or(base.personal),
        social: settings.social.unwrap_or(base.social),
        outer: settings.outer.unwrap_or(base.outer),
    }
}

impl EngineConfig {
    /// Convert loaded settings, rejecting unknown house systems, bad orbs
    /// and unknown timezones.
    pub fn from_settings(settings: &AstroSettings) -> Result<Self, AstroError> {
        let semver = read_version_file(&settings.version_file);
        let config = Self {
            ephe_path: settings.ephe_path.clone(),
            house_system: settings.house_system.parse()?,
            natal_orbs: overlay(OrbTable::natal(), &settings.natal_orbs),
            transit_orbs: overlay(OrbTable::transit(), &settings.transit_orbs),
            calculation_version: resolve_calculation_version(
                settings.git_commit.as_deref(),
                semver.as_deref(),
            ),
            default_timezone: settings.default_timezone.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AstroError> {
        self.natal_orbs.validate()?;
        self.transit_orbs.validate()?;
        parse_timezone(&self.default_timezone)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.house_system, HouseSystem::Placidus);
        assert_eq!(config.natal_orbs, OrbTable::natal());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_settings_overlays_orbs() {
        let settings = urania_config::parse_astro_settings(
            "[engine]\nhouse_system = \"W\"\n[orbs.natal]\nluminaries = 9.0\n",
        )
        .unwrap();
        let config = EngineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.house_system, HouseSystem::WholeSign);
        assert_eq!(config.natal_orbs.luminaries, 9.0);
        assert_eq!(config.natal_orbs.personal, 8.0);
        assert_eq!(config.transit_orbs, OrbTable::transit());
    }

    #[test]
    fn test_from_settings_rejects_bad_values() {
        let mut settings = AstroSettings::default();
        settings.house_system = "astral".to_string();
        assert!(EngineConfig::from_settings(&settings).is_err());

        let mut settings = AstroSettings::default();
        settings.transit_orbs.outer = Some(40.0);
        assert!(EngineConfig::from_settings(&settings).is_err());

        let mut settings = AstroSettings::default();
        settings.default_timezone = "Nowhere/City".to_string();
        assert!(EngineConfig::from_settings(&settings).is_err());
    }

    #[test]
    fn test_version_from_file_and_commit() {
        let dir = tempfile::tempdir().unwrap();
        let version_file = dir.path().join("VERSION");
        std::fs::write(&version_file, "1.4.0\n").unwrap();
        let settings = AstroSettings {
            version_file,
            git_commit: Some("deadbeef".to_string()),
            ..AstroSettings::default()
        };
        let config = EngineConfig::from_settings(&settings).unwrap();
        assert_eq!(config.calculation_version, "git:deadbeef | semver:1.4.0");
    }
}
