pub mod error;
pub mod net;
pub mod sim;
pub mod topo;
pub mod workload;

pub use error::{Result, SimError};

#[cfg(test)]
mod test;
