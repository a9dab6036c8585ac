//! Primitive maps

mod exp;
mod identity;
mod inject;
mod linear;
mod surject;

pub use exp::{ExpMap, ReciprocalMap};
pub use identity::IdentityMap;
pub use inject::{Background, InjectActiveCells};
pub use linear::LinearMap;
pub use surject::{Surject2Dto3D, SurjectFull, SurjectVertical1D};
