pub mod calculator;
pub mod orbs;
pub mod types;

pub use calculator::{is_applying, match_aspect, AspectCalculator, AspectMatch};
pub use orbs::{OrbContext, OrbTable};
pub use types::{Aspect, AspectKind};
