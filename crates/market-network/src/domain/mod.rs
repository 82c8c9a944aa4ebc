//! # Domain Module
//!
//! Value objects, entities, the contract document, trust verification and
//! the wire codec.

pub mod contract;
pub mod entities;
pub mod errors;
pub mod identity;
pub mod value_objects;
pub mod verification;
pub mod wire;

pub use contract::*;
pub use entities::*;
pub use errors::*;
pub use identity::*;
pub use value_objects::*;
pub use verification::*;
