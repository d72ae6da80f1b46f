//! Domain models for the Farmlytics platform

mod assistant;
mod community;
mod conversation;
mod diagnosis;
mod product;
mod profile;

pub use assistant::*;
pub use community::*;
pub use conversation::*;
pub use diagnosis::*;
pub use product::*;
pub use profile::*;
