use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw engine settings as read from `urania.toml` plus environment overrides.
///
/// Values are kept loosely typed here (house system as a string, orbs as
/// plain numbers); the engine crate parses and validates them.
#[derive(Debug, Clone, PartialEq)]
pub struct AstroSettings {
    pub ephe_path: Option<PathBuf>,
    pub house_system: String,
    pub natal_orbs: OrbSettings,
    pub transit_orbs: OrbSettings,
    pub version_file: PathBuf,
    pub git_commit: Option<String>,
    /// IANA zone for date-only queries (lunar phase, event scoring)
    pub default_timezone: String,
}

/// Orb limits in degrees per body class. Missing entries fall back to the
/// engine defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrbSettings {
    #[serde(default)]
    pub luminaries: Option<f64>,
    #[serde(default)]
    pub personal: Option<f64>,
    #[serde(default)]
    pub social: Option<f64>,
    #[serde(default)]
    pub outer: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct EngineToml {
    #[serde(default)]
    ephe_path: Option<PathBuf>,
    #[serde(default = "default_house_system")]
    house_system: String,
    #[serde(default = "default_version_file")]
    version_file: PathBuf,
    #[serde(default = "default_timezone")]
    default_timezone: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OrbsToml {
    #[serde(default)]
    natal: OrbSettings,
    #[serde(default)]
    transit: OrbSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct RootConfigToml {
    #[serde(default)]
    engine: Option<EngineToml>,
    #[serde(default)]
    orbs: OrbsToml,
}

fn default_house_system() -> String {
    "placidus".to_string()
}

fn default_version_file() -> PathBuf {
    PathBuf::from("VERSION")
}

fn default_timezone() -> String {
    "UTC".to_string()
}

impl Default for AstroSettings {
    fn default() -> Self {
        Self {
            ephe_path: None,
            house_system: default_house_system(),
            natal_orbs: OrbSettings::default(),
            transit_orbs: OrbSettings::default(),
            version_file: default_version_file(),
            git_commit: None,
            default_timezone: default_timezone(),
        }
    }
}

/// Try the usual relative locations for `configs/urania.toml`.
pub fn read_urania_toml_text() -> anyhow::Result<String> {
    let paths = ["configs/urania.toml", "../../configs/urania.toml"];
    for p in &paths {
        if let Ok(c) = fs::read_to_string(p) {
            return Ok(c);
        }
    }
    anyhow::bail!("Could not load urania.toml from {:?}", paths);
}

/// Parse settings from TOML text without consulting the environment.
pub fn parse_astro_settings(text: &str) -> anyhow::Result<AstroSettings> {
    let root: RootConfigToml = toml::from_str(text)
        .map_err(|e| anyhow::anyhow!("Failed to parse urania.toml: {e}"))?;
    let engine = root.engine.unwrap_or_else(|| EngineToml {
        ephe_path: None,
        house_system: default_house_system(),
        version_file: default_version_file(),
        default_timezone: default_timezone(),
    });
    if engine.house_system.trim().is_empty() {
        anyhow::bail!("engine.house_system must not be empty");
    }
    Ok(AstroSettings {
        ephe_path: engine.ephe_path,
        house_system: engine.house_system,
        natal_orbs: root.orbs.natal,
        transit_orbs: root.orbs.transit,
        version_file: engine.version_file,
        git_commit: None,
        default_timezone: engine.default_timezone,
    })
}

/// First non-empty value among the ephemeris path variables, in priority order.
pub fn ephe_path_from_env() -> Option<PathBuf> {
    ["SWISSEPH_EPHE_PATH", "SWISSEPH_PATH", "SE_EPHE_PATH"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Overlay environment variables on parsed settings.
pub fn apply_env_overrides(mut settings: AstroSettings) -> AstroSettings {
    if let Some(path) = ephe_path_from_env() {
        settings.ephe_path = Some(path);
    }
    settings.git_commit = env::var("GIT_COMMIT")
        .ok()
        .filter(|sha| !sha.trim().is_empty());
    settings
}

/// Fail early on a configured data directory that is not a directory.
///
/// A missing directory is not an error for the engine (it degrades to the
/// analytic mode), but a path that points at a regular file is almost always
/// a typo worth surfacing.
pub fn validate_ephe_path(path: &Path) -> anyhow::Result<()> {
    if path.exists() && !path.is_dir() {
        anyhow::bail!("ephe_path is not a directory: {}", path.display());
    }
    Ok(())
}

/// Load settings from `configs/urania.toml` when present, else defaults,
/// then apply environment overrides.
pub fn load_astro_settings() -> anyhow::Result<AstroSettings> {
    let settings = match read_urania_toml_text() {
        Ok(text) => parse_astro_settings(&text)?,
        Err(_) => AstroSettings::default(),
    };
    let settings = apply_env_overrides(settings);
    if let Some(path) = &settings.ephe_path {
        validate_ephe_path(path)?;
    }
    Ok(settings)
}
