pub mod assemble;
pub mod base64;
pub mod minify;
pub mod noise;
pub mod settings;
pub mod tokens;
pub mod transform;

pub use assemble::{
    build_filtered_har, build_text_export, export_file_name, export_selection, format_size,
    summarize, ExportFormat, ExportSummary,
};
pub use settings::ExportSettings;
pub use tokens::{estimate_entry_tokens, estimate_export_tokens, estimate_raw_tokens, estimate_tokens};
pub use transform::{filter_headers, transform_entry};
