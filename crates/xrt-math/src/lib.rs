//! XR timing analysis math utilities.

pub mod math;

pub use math::describe::*;
pub use math::share::*;
pub use math::units::*;
