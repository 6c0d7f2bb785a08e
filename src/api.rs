//! Stable, supported API surface for embedding harsift.
//!
//! This module re-exports the types and functions intended for external use.
//! Treat the contents of this module as SemVer-stable.

pub use crate::commands::{
    run_domains, run_estimate, run_export, run_list, run_noise, run_quick, run_store_copy,
    run_store_save, run_store_show, DomainsOptions, EstimateOptions, ExportOptions, ListOptions,
    NoiseOptions, QuickOptions, SnapshotSource, StoreCopyOptions, StoreSaveOptions,
};
pub use crate::error::{HarsiftError, Result};
pub use crate::export::noise::{is_builtin_noise, is_noise, noise_headers, NoiseHeader};
pub use crate::export::{
    build_filtered_har, build_text_export, estimate_entry_tokens, estimate_export_tokens,
    estimate_raw_tokens, estimate_tokens, export_file_name, export_selection, filter_headers,
    summarize, transform_entry, ExportFormat, ExportSettings, ExportSummary,
};
pub use crate::filter::edit::{
    add_child_at, new_group, new_property_filter, new_text_search, next_color, remove_child_at,
    reorder_children_at, set_search_color, update_node_at, used_colors,
};
pub use crate::filter::expression::{Combinator, FilterOperator, SearchMode, SearchPart, SearchScope};
pub use crate::filter::{
    classify, domain_stats, entry_tags, evaluate, highlights, is_visible, quick_filter_buttons,
    records, sort_view, DomainStat, Evaluator, ExpressionNode, Field, FilterConfig, FilterMap,
    Highlight, Preset, QuickFilterButton, Record, ResourceClass, SortDirection, Tag, Visibility,
};
pub use crate::har::{
    parse_har_bytes, parse_har_file, parse_har_str, write_har, Content, Cookie, Entry, Har,
    Header, Log, PostData, QueryParam, Request, Response,
};
pub use crate::store::{
    archive_key, archive_key_for_file, CopyMode, SaveDebouncer, SettingsStore,
};
