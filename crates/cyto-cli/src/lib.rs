//! CLI library components for the cytometry export preparation tool.

pub mod logging;
pub mod pipeline;
pub mod types;
