//! Shared types and models for the Farmlytics platform
//!
//! This crate contains types shared between the backend, the browser client
//! (via WASM), and other components of the system.

pub mod models;
pub mod registration;
pub mod types;
pub mod validation;
pub mod voice;

pub use models::*;
pub use registration::*;
pub use types::*;
pub use validation::*;
pub use voice::*;
