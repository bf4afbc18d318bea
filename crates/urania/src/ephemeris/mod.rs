pub mod adapter;
pub mod files;
pub mod mean;
pub mod types;

pub use adapter::Ephemeris;
#[cfg(feature = "swisseph")]
pub use adapter::SwissEphemerisAdapter;
pub use files::DataFileCatalog;
pub use mean::MeanElementsEphemeris;
pub use types::{
    BodyClass, BodyId, CalcFlags, DataFileKind, EngineMode, EphemerisFile, GeoLocation,
    HouseSystem, RawPosition,
};
