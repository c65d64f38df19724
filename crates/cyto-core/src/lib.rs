pub mod kaluza;
pub mod locale;
pub mod vesicles;

pub use kaluza::{ALIGNED_COLUMNS, AlignedEntry, KaluzaAligner, KaluzaOutputs};
pub use locale::{format_locale_number, parse_locale_number};
pub use vesicles::{
    AggregatedGroup, MEAN_COLUMNS, SOURCE_FILE_COLUMN, SubjectUnion, UNION_FILE_NAME,
    VesicleAggregator,
};
