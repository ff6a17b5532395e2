//! Type definitions for cloudcost

mod cost;
mod error;

pub use cost::*;
pub use error::*;
