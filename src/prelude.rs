//! Convenience prelude for common harsift embedding tasks.

pub use crate::api::{
    build_filtered_har, evaluate, export_selection, parse_har_file, records, transform_entry,
    ExportSettings, ExpressionNode, FilterConfig, Har, HarsiftError, Record, Result, Visibility,
};
