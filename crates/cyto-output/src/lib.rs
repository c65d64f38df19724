pub mod writer;

pub use writer::{Result, WriteError, write_table};
