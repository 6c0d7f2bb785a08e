pub mod edit;
pub mod exclusion;
pub mod expression;
pub mod fields;
pub mod visibility;

pub use exclusion::{entry_tags, FilterMap, Tag};
pub use expression::{evaluate, highlights, Evaluator, ExpressionNode, Highlight};
pub use fields::{classify, Field, ResourceClass};
pub use visibility::{
    domain_stats, is_visible, quick_filter_buttons, records, sort_view, DomainStat, FilterConfig,
    Preset, QuickFilterButton, Record, SortDirection, Visibility,
};
