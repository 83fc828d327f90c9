//! Missing value imputation.

mod statistical;

pub use statistical::MissingValueFiller;
