// Common test utilities

pub mod backend;
pub mod harness;

pub use backend::*;
pub use harness::*;
