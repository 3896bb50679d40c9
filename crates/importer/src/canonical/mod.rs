pub mod headers;
pub mod models;
pub mod normalize;
pub mod validator;

pub use headers::{ColumnField, HeaderMap};
pub use models::{Health, ImportRow, ImportStats, RowIssue};
pub use validator::{RowValidator, ValidationOutcome};
