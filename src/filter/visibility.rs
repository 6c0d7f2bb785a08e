//! Visibility of records under a filter configuration, plus the views built
//! on top of it: sorting, quick filter impact and domain statistics.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::export::tokens::estimate_raw_tokens;
use crate::filter::exclusion::{self, FilterMap};
use crate::filter::expression::{Evaluator, ExpressionNode, Highlight};
use crate::filter::fields;
use crate::har::{Entry, Har};

/// A record together with its index in the archive's `log.entries`.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub position: usize,
    pub entry: &'a Entry,
}

pub fn records(har: &Har) -> Vec<Record<'_>> {
    har.log
        .entries
        .iter()
        .enumerate()
        .map(|(position, entry)| Record { position, entry })
        .collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortColumn {
    Index,
    Method,
    Status,
    Type,
    Size,
    Time,
    Tokens,
    Url,
}

impl SortColumn {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "index" => Some(SortColumn::Index),
            "method" => Some(SortColumn::Method),
            "status" => Some(SortColumn::Status),
            "type" => Some(SortColumn::Type),
            "size" => Some(SortColumn::Size),
            "time" => Some(SortColumn::Time),
            "tokens" => Some(SortColumn::Tokens),
            "url" => Some(SortColumn::Url),
            _ => None,
        }
    }
}

enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(record: &Record<'_>, column: SortColumn) -> SortKey {
    let entry = record.entry;
    match column {
        SortColumn::Index => SortKey::Number(record.position as f64),
        SortColumn::Method => SortKey::Text(entry.request.method.clone()),
        SortColumn::Status => SortKey::Number(entry.response.status as f64),
        SortColumn::Type => SortKey::Text(fields::classify(entry).as_str().to_string()),
        SortColumn::Size => SortKey::Number(fields::size(entry) as f64),
        SortColumn::Time => SortKey::Number(fields::time(entry) as f64),
        SortColumn::Tokens => SortKey::Number(estimate_raw_tokens(entry) as f64),
        SortColumn::Url => SortKey::Text(entry.request.url.clone()),
    }
}

fn compare_keys(a: &SortKey, b: &SortKey) -> Ordering {
    match (a, b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Number(_), SortKey::Text(_)) => Ordering::Less,
        (SortKey::Text(_), SortKey::Number(_)) => Ordering::Greater,
    }
}

/// Stable sort of `records` by `column`. Without a column (or with an
/// unknown one) the input order is kept.
pub fn sort_view<'a>(
    records: &[Record<'a>],
    column: Option<&str>,
    direction: SortDirection,
) -> Vec<Record<'a>> {
    let mut out = records.to_vec();
    let Some(column) = column.and_then(SortColumn::parse) else {
        return out;
    };
    let mut keyed: Vec<(SortKey, Record<'a>)> =
        out.drain(..).map(|r| (sort_key(&r, column), r)).collect();
    keyed.sort_by(|(a, _), (b, _)| {
        let ord = compare_keys(a, b);
        match direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// The persisted filter configuration of one archive.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub expression_tree: ExpressionNode,
    pub quick_filters: FilterMap,
    pub tag_filters: FilterMap,
    pub domain_filters: FilterMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    pub sort_direction: SortDirection,
}

impl FilterConfig {
    pub fn with_quick_filter(&self, key: &str, active: bool) -> Self {
        let mut next = self.clone();
        next.quick_filters.insert(key.to_string(), active);
        next
    }

    pub fn with_tag_filter(&self, key: &str, active: bool) -> Self {
        let mut next = self.clone();
        next.tag_filters.insert(key.to_string(), active);
        next
    }

    /// Excluding a domain records it; re-including removes the key.
    pub fn with_domain_filter(&self, domain: &str, excluded: bool) -> Self {
        let mut next = self.clone();
        if excluded {
            next.domain_filters.insert(domain.to_string(), true);
        } else {
            next.domain_filters.remove(domain);
        }
        next
    }

    /// Clicking a column header: same column flips direction, a new column
    /// starts ascending.
    pub fn toggle_sort(&self, column: &str) -> Self {
        let mut next = self.clone();
        if next.sort_column.as_deref() == Some(column) {
            next.sort_direction = next.sort_direction.toggled();
        } else {
            next.sort_column = Some(column.to_string());
            next.sort_direction = SortDirection::Asc;
        }
        next
    }
}

/// Decides visibility for one filter snapshot. The evaluator's regex cache
/// lives as long as the decision, so a whole archive compiles each pattern
/// once.
#[derive(Debug)]
pub struct Visibility<'f> {
    filters: &'f FilterConfig,
    evaluator: Evaluator,
}

impl<'f> Visibility<'f> {
    pub fn new(filters: &'f FilterConfig) -> Self {
        Self {
            filters,
            evaluator: Evaluator::new(),
        }
    }

    pub fn filters(&self) -> &FilterConfig {
        self.filters
    }

    pub fn is_visible(&self, entry: &Entry) -> bool {
        let f = self.filters;
        !exclusion::is_domain_excluded(entry, &f.domain_filters)
            && !exclusion::is_quick_excluded(entry, &f.quick_filters)
            && !exclusion::is_tag_excluded(entry, &f.tag_filters)
            && self.evaluator.evaluate(entry, &f.expression_tree)
    }

    pub fn highlights(&self, entry: &Entry) -> Vec<Highlight> {
        self.evaluator.highlights(entry, &self.filters.expression_tree)
    }

    /// Visible records in view order (the configured sort applied).
    pub fn visible<'a>(&self, records: &[Record<'a>]) -> Vec<Record<'a>> {
        let visible: Vec<Record<'a>> = records
            .iter()
            .filter(|r| self.is_visible(r.entry))
            .copied()
            .collect();
        sort_view(
            &visible,
            self.filters.sort_column.as_deref(),
            self.filters.sort_direction,
        )
    }

    /// Records that `key` would hide on top of the other active layers.
    pub fn quick_impact(&self, records: &[Record<'_>], key: &str) -> usize {
        let f = self.filters;
        records
            .iter()
            .filter(|r| {
                let e = r.entry;
                !exclusion::is_quick_excluded_except(e, &f.quick_filters, key)
                    && !exclusion::is_domain_excluded(e, &f.domain_filters)
                    && !exclusion::is_tag_excluded(e, &f.tag_filters)
                    && self.evaluator.evaluate(e, &f.expression_tree)
                    && exclusion::quick_key_matches(e, key)
            })
            .count()
    }
}

pub fn is_visible(entry: &Entry, filters: &FilterConfig) -> bool {
    Visibility::new(filters).is_visible(entry)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuickFilterButton {
    pub key: &'static str,
    pub label: &'static str,
    pub count: usize,
    pub active: bool,
}

/// Quick filter buttons worth showing: every key that would hide something
/// or is currently active.
pub fn quick_filter_buttons(records: &[Record<'_>], filters: &FilterConfig) -> Vec<QuickFilterButton> {
    let visibility = Visibility::new(filters);
    exclusion::quick_filter_keys()
        .filter_map(|key| {
            let count = visibility.quick_impact(records, key);
            let active = filters.quick_filters.get(key).copied().unwrap_or(false);
            if count == 0 && !active {
                return None;
            }
            Some(QuickFilterButton {
                key,
                label: exclusion::quick_filter_label(key).unwrap_or(key),
                count,
                active,
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    /// Hide everything except documents, XHR and websockets.
    DocsXhr,
    /// Clear every quick filter.
    Reset,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::DocsXhr, Preset::Reset];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "docs-xhr" => Some(Preset::DocsXhr),
            "reset" => Some(Preset::Reset),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Preset::DocsXhr => "docs-xhr",
            Preset::Reset => "reset",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Preset::DocsXhr => "Keep only Docs & XHR",
            Preset::Reset => "Reset All",
        }
    }

    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Preset::DocsXhr => &[
                "script",
                "stylesheet",
                "image",
                "font",
                "media",
                "manifest",
                "other",
            ],
            Preset::Reset => &[],
        }
    }

    pub fn apply(self, filters: &FilterConfig) -> FilterConfig {
        let mut next = filters.clone();
        match self {
            Preset::Reset => next.quick_filters.clear(),
            Preset::DocsXhr => {
                for key in self.keys() {
                    next.quick_filters.insert((*key).to_string(), true);
                }
            }
        }
        next
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DomainStat {
    pub domain: String,
    pub count: usize,
}

/// Record count per hostname, busiest first, ties by name.
pub fn domain_stats(records: &[Record<'_>]) -> Vec<DomainStat> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(fields::domain(&r.entry.request.url)).or_default() += 1;
    }
    let mut stats: Vec<DomainStat> = counts
        .into_iter()
        .map(|(domain, count)| DomainStat { domain, count })
        .collect();
    stats.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::har::{Content, Log, PostData, Request, Response};

    fn entry(method: &str, url: &str, status: i64, mime: &str, size: i64) -> Entry {
        Entry {
            request: Request {
                method: method.to_string(),
                url: url.to_string(),
                ..Default::default()
            },
            response: Response {
                status,
                content: Content {
                    size: Some(size),
                    mime_type: Some(mime.to_string()),
                    ..Default::default()
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn har() -> Har {
        Har {
            log: Log {
                entries: vec![
                    entry("GET", "https://a.test/", 200, "text/html", 900),
                    entry("GET", "https://cdn.test/logo.png", 200, "image/png", 5000),
                    entry("POST", "https://a.test/api/login", 401, "application/json", 40),
                    entry("GET", "https://cdn.test/app.js", 304, "application/javascript", 0),
                    entry("GET", "https://a.test/photo.jpeg", 200, "image/jpeg", 1200),
                ],
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn positions(records: &[Record<'_>]) -> Vec<usize> {
        records.iter().map(|r| r.position).collect()
    }

    #[test]
    fn default_config_shows_everything_in_order() {
        let har = har();
        let all = records(&har);
        let filters = FilterConfig::default();
        assert_eq!(positions(&Visibility::new(&filters).visible(&all)), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn image_quick_filter_then_payload_tag() {
        let png = entry("GET", "http://a.test/x.png", 200, "image/png", 10);
        let filters = FilterConfig::default().with_quick_filter("image", true);
        assert!(!is_visible(&png, &filters));

        let filters = filters
            .with_quick_filter("image", false)
            .with_tag_filter("payload", true);
        assert!(is_visible(&png, &filters));

        let mut post = png.clone();
        post.request.post_data = Some(PostData {
            text: Some("x=1".to_string()),
            ..Default::default()
        });
        assert!(!is_visible(&post, &filters));
    }

    #[test]
    fn domain_and_expression_layers() {
        let har = har();
        let all = records(&har);
        let filters = FilterConfig::default().with_domain_filter("cdn.test", true);
        assert_eq!(positions(&Visibility::new(&filters).visible(&all)), vec![0, 2, 4]);

        let cleared = filters.with_domain_filter("cdn.test", false);
        assert!(cleared.domain_filters.is_empty());

        let mut filters = FilterConfig::default();
        filters.expression_tree = serde_json::from_str(
            r#"{"type":"group","operator":"and","children":[
                {"type":"property-filter","field":"status","filterOperator":"equals","value":"200","exclude":true}
            ]}"#,
        )
        .unwrap();
        assert_eq!(positions(&Visibility::new(&filters).visible(&all)), vec![2, 3]);
    }

    #[test]
    fn sorting_by_columns() {
        let har = har();
        let all = records(&har);
        assert_eq!(
            positions(&sort_view(&all, Some("size"), SortDirection::Asc)),
            vec![3, 2, 0, 4, 1]
        );
        assert_eq!(
            positions(&sort_view(&all, Some("status"), SortDirection::Desc)),
            vec![2, 3, 0, 1, 4]
        );
        assert_eq!(
            positions(&sort_view(&all, Some("method"), SortDirection::Asc)),
            vec![0, 1, 3, 4, 2]
        );
        assert_eq!(positions(&sort_view(&all, None, SortDirection::Desc)), vec![0, 1, 2, 3, 4]);
        assert_eq!(
            positions(&sort_view(&all, Some("bogus"), SortDirection::Desc)),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn toggle_sort_flips_then_resets() {
        let f = FilterConfig::default().toggle_sort("url");
        assert_eq!(f.sort_column.as_deref(), Some("url"));
        assert_eq!(f.sort_direction, SortDirection::Asc);
        let f = f.toggle_sort("url");
        assert_eq!(f.sort_direction, SortDirection::Desc);
        let f = f.toggle_sort("size");
        assert_eq!(f.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn quick_impact_ignores_own_key() {
        let har = har();
        let all = records(&har);
        let filters = FilterConfig::default()
            .with_quick_filter("image", true)
            .with_quick_filter(".png", true);
        let v = Visibility::new(&filters);
        assert_eq!(v.quick_impact(&all, "image"), 1);
        assert_eq!(v.quick_impact(&all, ".png"), 0);
        assert_eq!(v.quick_impact(&all, ".jpg"), 0);

        let none = FilterConfig::default();
        assert_eq!(Visibility::new(&none).quick_impact(&all, ".jpg"), 1);
    }

    #[test]
    fn buttons_skip_idle_keys() {
        let har = har();
        let all = records(&har);
        let filters = FilterConfig::default().with_quick_filter("font", true);
        let buttons = quick_filter_buttons(&all, &filters);
        let keys: Vec<&str> = buttons.iter().map(|b| b.key).collect();
        assert_eq!(
            keys,
            vec!["document", "script", "image", "font", "other", ".png", ".jpg", ".js"]
        );
        let font = buttons.iter().find(|b| b.key == "font").unwrap();
        assert!(font.active);
        assert_eq!(font.count, 0);
        let jpg = buttons.iter().find(|b| b.key == ".jpg").unwrap();
        assert_eq!(jpg.label, ".jpg/.jpeg");
    }

    #[test]
    fn presets() {
        let har = har();
        let all = records(&har);
        let docs = Preset::DocsXhr.apply(&FilterConfig::default());
        assert_eq!(positions(&Visibility::new(&docs).visible(&all)), vec![0]);
        let reset = Preset::Reset.apply(&docs);
        assert!(reset.quick_filters.is_empty());
        assert_eq!(Preset::parse("docs-xhr"), Some(Preset::DocsXhr));
        assert_eq!(Preset::parse("nope"), None);
    }

    #[test]
    fn domain_stats_busiest_first() {
        let har = har();
        let stats = domain_stats(&records(&har));
        assert_eq!(
            stats,
            vec![
                DomainStat {
                    domain: "a.test".to_string(),
                    count: 3
                },
                DomainStat {
                    domain: "cdn.test".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn filter_config_defaults_from_partial_json() {
        let f: FilterConfig = serde_json::from_str(r#"{"quickFilters":{"image":true}}"#).unwrap();
        assert_eq!(f.expression_tree, ExpressionNode::default());
        assert_eq!(f.sort_direction, SortDirection::Asc);
        assert_eq!(f.quick_filters.get("image"), Some(&true));
    }
}
