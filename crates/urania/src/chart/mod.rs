pub mod engine;
pub mod natal;

pub use engine::{ChartEngine, FavorabilityReport, LunarReport, TransitReport};
pub use natal::{ChartSummary, NatalChart, NatalRequest};
