pub mod config;
mod error;
mod graph;
mod hash;
mod mutation;

pub use error::*;
pub use graph::*;
pub use hash::*;
pub use mutation::*;
