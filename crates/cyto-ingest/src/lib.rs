pub mod discovery;
pub mod error;
pub mod reader;

pub use discovery::{PROCESSED_PREFIX, is_processed, list_unprocessed_files, mark_processed};
pub use error::{IngestError, Result};
pub use reader::{ColumnSpec, RowDecode, RowReader};
