use crate::error::AstroError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Celestial bodies tracked by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyId {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    NorthNode,
    SouthNode,
    Chiron,
}

/// Orb class of a body. Drives both natal and transit orb limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyClass {
    Luminary,
    Personal,
    Social,
    Outer,
}

impl BodyId {
    pub const ALL: [BodyId; 13] = [
        BodyId::Sun,
        BodyId::Moon,
        BodyId::Mercury,
        BodyId::Venus,
        BodyId::Mars,
        BodyId::Jupiter,
        BodyId::Saturn,
        BodyId::Uranus,
        BodyId::Neptune,
        BodyId::Pluto,
        BodyId::NorthNode,
        BodyId::SouthNode,
        BodyId::Chiron,
    ];

    /// Swiss Ephemeris body code. The south node has none: it is derived
    /// from the north node.
    pub fn swe_code(self) -> Option<i32> {
        match self {
            BodyId::Sun => Some(0),
            BodyId::Moon => Some(1),
            BodyId::Mercury => Some(2),
            BodyId::Venus => Some(3),
            BodyId::Mars => Some(4),
            BodyId::Jupiter => Some(5),
            BodyId::Saturn => Some(6),
            BodyId::Uranus => Some(7),
            BodyId::Neptune => Some(8),
            BodyId::Pluto => Some(9),
            BodyId::NorthNode => Some(11), // true node
            BodyId::SouthNode => None,
            BodyId::Chiron => Some(15),
        }
    }

    pub fn class(self) -> BodyClass {
        match self {
            BodyId::Sun | BodyId::Moon => BodyClass::Luminary,
            BodyId::Mercury | BodyId::Venus | BodyId::Mars => BodyClass::Personal,
            BodyId::Jupiter | BodyId::Saturn => BodyClass::Social,
            _ => BodyClass::Outer,
        }
    }

    pub fn is_node(self) -> bool {
        matches!(self, BodyId::NorthNode | BodyId::SouthNode)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BodyId::Sun => "sun",
            BodyId::Moon => "moon",
            BodyId::Mercury => "mercury",
            BodyId::Venus => "venus",
            BodyId::Mars => "mars",
            BodyId::Jupiter => "jupiter",
            BodyId::Saturn => "saturn",
            BodyId::Uranus => "uranus",
            BodyId::Neptune => "neptune",
            BodyId::Pluto => "pluto",
            BodyId::NorthNode => "north_node",
            BodyId::SouthNode => "south_node",
            BodyId::Chiron => "chiron",
        }
    }

    /// Display name used in factor lists.
    pub fn display_name(self) -> &'static str {
        match self {
            BodyId::Sun => "Sun",
            BodyId::Moon => "Moon",
            BodyId::Mercury => "Mercury",
            BodyId::Venus => "Venus",
            BodyId::Mars => "Mars",
            BodyId::Jupiter => "Jupiter",
            BodyId::Saturn => "Saturn",
            BodyId::Uranus => "Uranus",
            BodyId::Neptune => "Neptune",
            BodyId::Pluto => "Pluto",
            BodyId::NorthNode => "North Node",
            BodyId::SouthNode => "South Node",
            BodyId::Chiron => "Chiron",
        }
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodyId {
    type Err = AstroError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
        BodyId::ALL
            .iter()
            .copied()
            .find(|body| body.as_str() == wanted)
            .ok_or_else(|| AstroError::invalid("body", format!("unknown body: {s}")))
    }
}

/// Which engine produced a set of positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineMode {
    /// Swiss Ephemeris backed by data files.
    #[serde(rename = "swisseph_swieph")]
    SwissEph,
    /// Swiss Ephemeris analytic Moshier theory, no data files.
    #[serde(rename = "swisseph_moseph")]
    Moshier,
    /// Pure-Rust circular mean-orbit model.
    #[serde(rename = "mean_elements")]
    MeanElements,
}

impl EngineMode {
    pub fn tag(self) -> &'static str {
        match self {
            EngineMode::SwissEph => "swisseph_swieph",
            EngineMode::Moshier => "swisseph_moseph",
            EngineMode::MeanElements => "mean_elements",
        }
    }
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Engine calculation flags, bit-compatible with Swiss Ephemeris `SEFLG_*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CalcFlags(pub u32);

impl CalcFlags {
    pub const SWIEPH: CalcFlags = CalcFlags(2);
    pub const MOSEPH: CalcFlags = CalcFlags(4);
    pub const SPEED: CalcFlags = CalcFlags(256);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: CalcFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Human-readable form recorded in provenance, e.g. `SWIEPH|SPEED`.
    pub fn describe(self) -> String {
        let names: Vec<&str> = [
            (CalcFlags::SWIEPH, "SWIEPH"),
            (CalcFlags::MOSEPH, "MOSEPH"),
            (CalcFlags::SPEED, "SPEED"),
        ]
        .iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| *name)
        .collect();
        if names.is_empty() {
            "NONE".to_string()
        } else {
            names.join("|")
        }
    }
}

impl std::ops::BitOr for CalcFlags {
    type Output = CalcFlags;

    fn bitor(self, rhs: CalcFlags) -> CalcFlags {
        CalcFlags(self.0 | rhs.0)
    }
}

/// Geocentric ecliptic coordinates as returned by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    /// Longitude in degrees (engine range, normalized by the resolver)
    pub longitude: f64,
    /// Latitude in degrees
    pub latitude: f64,
    /// Distance in AU
    pub distance: f64,
    /// Speed in longitude (degrees per day)
    pub speed: f64,
}

/// Which table family a data file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFileKind {
    Planets,
    Moon,
    Asteroids,
    OuterBodies,
}

/// A hashed ephemeris data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EphemerisFile {
    pub path: PathBuf,
    pub kind: DataFileKind,
    pub sha256: String,
    pub size: u64,
}

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

impl GeoLocation {
    /// Validated constructor: latitude in [-90, 90], longitude in [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, AstroError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(AstroError::invalid(
                "lat",
                format!("latitude must be within [-90, 90], got {lat}"),
            ));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(AstroError::invalid(
                "lon",
                format!("longitude must be within [-180, 180], got {lon}"),
            ));
        }
        Ok(Self { lat, lon })
    }
}

/// House system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    Placidus,
    Koch,
    WholeSign,
    Equal,
    Regiomontanus,
    Campanus,
    Alcabitius,
    Morinus,
    Porphyry,
}

const HOUSE_SYSTEMS: &[(&str, HouseSystem)] = &[
    ("placidus", HouseSystem::Placidus),
    ("koch", HouseSystem::Koch),
    ("whole_sign", HouseSystem::WholeSign),
    ("equal", HouseSystem::Equal),
    ("regiomontanus", HouseSystem::Regiomontanus),
    ("campanus", HouseSystem::Campanus),
    ("alcabitius", HouseSystem::Alcabitius),
    ("morinus", HouseSystem::Morinus),
    ("porphyry", HouseSystem::Porphyry),
];

impl HouseSystem {
    /// Single-letter Swiss Ephemeris house system code.
    pub fn code(self) -> u8 {
        match self {
            HouseSystem::Placidus => b'P',
            HouseSystem::Koch => b'K',
            HouseSystem::WholeSign => b'W',
            HouseSystem::Equal => b'E',
            HouseSystem::Regiomontanus => b'R',
            HouseSystem::Campanus => b'C',
            HouseSystem::Alcabitius => b'A',
            HouseSystem::Morinus => b'M',
            HouseSystem::Porphyry => b'O',
        }
    }

    pub fn name(self) -> &'static str {
        HOUSE_SYSTEMS
            .iter()
            .find(|(_, system)| *system == self)
            .map(|(name, _)| *name)
            .unwrap_or("placidus")
    }

    /// Systems built from semi-arcs that break down inside the polar circles.
    pub fn fails_at_polar_latitudes(self) -> bool {
        matches!(
            self,
            HouseSystem::Placidus | HouseSystem::Koch | HouseSystem::Alcabitius
        )
    }
}

impl Default for HouseSystem {
    fn default() -> Self {
        HouseSystem::Placidus
    }
}

impl fmt::Display for HouseSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HouseSystem {
    type Err = AstroError;

    /// Accepts names (`placidus`, `whole-sign`) or one-letter codes (`P`, `W`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.len() == 1 {
            let code = trimmed.as_bytes()[0].to_ascii_uppercase();
            if let Some((_, system)) = HOUSE_SYSTEMS.iter().find(|(_, sys)| sys.code() == code) {
                return Ok(*system);
            }
        }
        let wanted = trimmed.to_lowercase().replace([' ', '-'], "_");
        HOUSE_SYSTEMS
            .iter()
            .find(|(name, _)| *name == wanted)
            .map(|(_, system)| *system)
            .ok_or_else(|| {
                AstroError::invalid(
                    "house_system",
                    format!(
                        "unknown house system {s:?}; valid: {:?}",
                        HOUSE_SYSTEMS.iter().map(|(name, _)| *name).collect::<Vec<_>>()
                    ),
                )
            })
    }
}
