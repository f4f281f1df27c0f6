// Adapters layer: concrete implementations of the domain ports.

pub mod diagnostics;
pub mod html_source;
pub mod memory_source;
pub mod report;
pub mod storage;
