//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware.

pub mod line;
pub mod reader;

// Re-export commonly used types
pub use line::MockLine;
pub use reader::{MockReader, MockReaderHandle};
