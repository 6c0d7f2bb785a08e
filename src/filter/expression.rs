//! The boolean expression tree and its evaluator.
//!
//! The tree is persisted as JSON by the host (`{"type":"group", ...}`), so the
//! node types keep that exact shape. Unknown enum strings deserialize into
//! [`Lenient::Unknown`] rather than failing the whole tree.

use std::cell::RefCell;
use std::collections::HashMap;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::filter::fields::{self, Field, FieldValue};
use crate::har::{Entry, Header};

const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// A value that is normally one of a known set of variants but may hold any
/// string a hand-edited or older settings file contains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Known(T),
    Unknown(String),
}

impl<T: Copy> Lenient<T> {
    pub fn known(&self) -> Option<T> {
        match self {
            Lenient::Known(v) => Some(*v),
            Lenient::Unknown(_) => None,
        }
    }
}

impl<T> From<T> for Lenient<T> {
    fn from(value: T) -> Self {
        Lenient::Known(value)
    }
}

/// How a group folds its children. Anything other than `and` folds as `or`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    #[default]
    And,
    #[serde(other)]
    Or,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    All,
    Request,
    Response,
    Url,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchPart {
    #[default]
    All,
    Headers,
    Bodies,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring.
    #[default]
    Text,
    /// Case-sensitive substring.
    Case,
    /// Case-insensitive regular expression.
    Regex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not contains")]
    NotContains,
    #[serde(rename = "equals")]
    Equals,
    #[serde(rename = "not equals")]
    NotEquals,
    #[serde(rename = "starts with")]
    StartsWith,
    #[serde(rename = "ends with")]
    EndsWith,
    #[serde(rename = "greater than")]
    GreaterThan,
    #[serde(rename = "less than")]
    LessThan,
    #[serde(rename = "regex")]
    Regex,
}

/// Operators offered for each field. Anything else is a no-op filter.
pub fn allowed_operators(field: Field) -> &'static [FilterOperator] {
    use FilterOperator::*;
    match field {
        Field::Url => &[Contains, NotContains, Equals, StartsWith, EndsWith, Regex],
        Field::Method => &[Equals, NotEquals],
        Field::Status => &[Equals, NotEquals, GreaterThan, LessThan],
        Field::MimeType => &[Contains, NotContains, Equals],
        Field::ResourceType => &[Equals, NotEquals],
        Field::Extension => &[Equals, NotEquals],
        Field::Domain => &[Contains, NotContains, Equals],
        Field::Size => &[GreaterThan, LessThan, Equals],
        Field::Time => &[GreaterThan, LessThan, Equals],
        Field::StatusRange => &[Equals, NotEquals],
    }
}

fn enabled_default() -> bool {
    true
}

/// A stored group without an operator folds as `or`.
fn group_operator_default() -> Combinator {
    Combinator::Or
}

fn default_field() -> Lenient<Field> {
    Lenient::Unknown(String::new())
}

fn default_filter_operator() -> Lenient<FilterOperator> {
    Lenient::Known(FilterOperator::Contains)
}

/// Accepts strings, numbers and booleans; `null` becomes the empty string.
fn loose_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ExpressionNode {
    Group(GroupNode),
    TextSearch(TextSearchNode),
    PropertyFilter(PropertyFilterNode),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroupNode {
    #[serde(default = "group_operator_default")]
    pub operator: Combinator,
    #[serde(default)]
    pub children: Vec<ExpressionNode>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl Default for GroupNode {
    fn default() -> Self {
        Self {
            operator: Combinator::And,
            children: Vec::new(),
            enabled: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSearchNode {
    /// Connector shown between this node and its previous sibling.
    #[serde(default)]
    pub operator: Combinator,
    #[serde(default, deserialize_with = "loose_string")]
    pub text: String,
    #[serde(default = "default_scope")]
    pub scope: Lenient<SearchScope>,
    #[serde(default = "default_part")]
    pub part: Lenient<SearchPart>,
    #[serde(default = "default_mode")]
    pub mode: Lenient<SearchMode>,
    #[serde(default)]
    pub highlight_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

fn default_scope() -> Lenient<SearchScope> {
    Lenient::Known(SearchScope::All)
}

fn default_part() -> Lenient<SearchPart> {
    Lenient::Known(SearchPart::All)
}

fn default_mode() -> Lenient<SearchMode> {
    Lenient::Known(SearchMode::Text)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyFilterNode {
    /// Connector shown between this node and its previous sibling.
    #[serde(default)]
    pub operator: Combinator,
    #[serde(default = "default_field")]
    pub field: Lenient<Field>,
    #[serde(default = "default_filter_operator")]
    pub filter_operator: Lenient<FilterOperator>,
    #[serde(default, deserialize_with = "loose_string")]
    pub value: String,
    #[serde(default)]
    pub exclude: bool,
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

impl Default for ExpressionNode {
    fn default() -> Self {
        ExpressionNode::Group(GroupNode::default())
    }
}

impl ExpressionNode {
    pub fn enabled(&self) -> bool {
        match self {
            ExpressionNode::Group(g) => g.enabled,
            ExpressionNode::TextSearch(t) => t.enabled,
            ExpressionNode::PropertyFilter(p) => p.enabled,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match self {
            ExpressionNode::Group(g) => g.enabled = enabled,
            ExpressionNode::TextSearch(t) => t.enabled = enabled,
            ExpressionNode::PropertyFilter(p) => p.enabled = enabled,
        }
    }

    pub fn operator(&self) -> Combinator {
        match self {
            ExpressionNode::Group(g) => g.operator,
            ExpressionNode::TextSearch(t) => t.operator,
            ExpressionNode::PropertyFilter(p) => p.operator,
        }
    }

    pub fn set_operator(&mut self, operator: Combinator) {
        match self {
            ExpressionNode::Group(g) => g.operator = operator,
            ExpressionNode::TextSearch(t) => t.operator = operator,
            ExpressionNode::PropertyFilter(p) => p.operator = operator,
        }
    }

    pub fn children(&self) -> &[ExpressionNode] {
        match self {
            ExpressionNode::Group(g) => &g.children,
            _ => &[],
        }
    }
}

/// A color annotation produced by a matching highlight-only search.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub color: String,
    pub tooltip: String,
}

/// Evaluates expression trees against entries, compiling each regex pattern
/// at most once for the lifetime of the evaluator.
#[derive(Debug, Default)]
pub struct Evaluator {
    regexes: RefCell<HashMap<String, Option<Regex>>>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, entry: &Entry, node: &ExpressionNode) -> bool {
        if !node.enabled() {
            return true;
        }

        match node {
            ExpressionNode::Group(group) => {
                if group.children.iter().all(|c| !c.enabled()) {
                    return true;
                }
                match group.operator {
                    Combinator::And => group.children.iter().all(|c| self.evaluate(entry, c)),
                    Combinator::Or => group.children.iter().any(|c| self.evaluate(entry, c)),
                }
            }
            ExpressionNode::TextSearch(search) => {
                if search.highlight_only {
                    return true;
                }
                self.matches_text(entry, search)
            }
            ExpressionNode::PropertyFilter(filter) => {
                if filter.value.is_empty() {
                    return true;
                }
                let matched = self.matches_property(entry, filter);
                if filter.exclude {
                    !matched
                } else {
                    matched
                }
            }
        }
    }

    /// Whether a text search's pattern occurs in the selected part of the
    /// entry. An empty pattern always matches; an invalid regex never does.
    pub fn matches_text(&self, entry: &Entry, search: &TextSearchNode) -> bool {
        if search.text.is_empty() {
            return true;
        }
        let haystack = searchable_text(entry, &search.scope, &search.part);
        let needle = search.text.as_str();

        match search.mode.known() {
            Some(SearchMode::Regex) => self
                .regex(needle)
                .is_some_and(|re| re.is_match(&haystack)),
            Some(SearchMode::Case) => haystack.contains(needle),
            _ => haystack
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        }
    }

    pub fn matches_property(&self, entry: &Entry, filter: &PropertyFilterNode) -> bool {
        let (Some(field), Some(op)) = (filter.field.known(), filter.filter_operator.known())
        else {
            return true;
        };
        if !allowed_operators(field).contains(&op) {
            return true;
        }

        let value = fields::field_value(entry, field);
        let target = filter.value.as_str();

        if field.is_numeric() {
            let nv = value.as_number();
            let nt = fields::parse_number(target);
            return match op {
                FilterOperator::Equals => nv == nt,
                FilterOperator::NotEquals => nv != nt,
                FilterOperator::GreaterThan => nv > nt,
                FilterOperator::LessThan => nv < nt,
                _ => true,
            };
        }

        let raw = match &value {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(_) => value.as_text(),
        };
        let sv = raw.to_lowercase();
        let st = target.to_lowercase();

        match op {
            FilterOperator::Contains => sv.contains(&st),
            FilterOperator::NotContains => !sv.contains(&st),
            FilterOperator::Equals => sv == st,
            FilterOperator::NotEquals => sv != st,
            FilterOperator::StartsWith => sv.starts_with(&st),
            FilterOperator::EndsWith => sv.ends_with(&st),
            FilterOperator::Regex => self.regex(target).is_some_and(|re| re.is_match(&raw)),
            FilterOperator::GreaterThan | FilterOperator::LessThan => true,
        }
    }

    /// Highlights contributed by enabled highlight-only searches matching
    /// `entry`, in depth-first tree order. The first one is the primary.
    pub fn highlights(&self, entry: &Entry, tree: &ExpressionNode) -> Vec<Highlight> {
        let mut out = Vec::new();
        self.collect_highlights(entry, tree, &mut out);
        out
    }

    fn collect_highlights(&self, entry: &Entry, node: &ExpressionNode, out: &mut Vec<Highlight>) {
        if !node.enabled() {
            return;
        }
        match node {
            ExpressionNode::Group(group) => {
                for child in &group.children {
                    self.collect_highlights(entry, child, out);
                }
            }
            ExpressionNode::TextSearch(search) => {
                if !search.highlight_only || search.text.is_empty() {
                    return;
                }
                let Some(color) = search.color.as_deref() else {
                    return;
                };
                if self.matches_text(entry, search) {
                    out.push(Highlight {
                        color: color.to_string(),
                        tooltip: describe_search(search),
                    });
                }
            }
            ExpressionNode::PropertyFilter(_) => {}
        }
    }

    fn regex(&self, pattern: &str) -> Option<Regex> {
        let mut cache = self.regexes.borrow_mut();
        cache
            .entry(pattern.to_string())
            .or_insert_with(|| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .size_limit(REGEX_SIZE_LIMIT)
                    .build()
                    .ok()
            })
            .clone()
    }
}

/// Evaluate a tree with a throwaway evaluator.
pub fn evaluate(entry: &Entry, node: &ExpressionNode) -> bool {
    Evaluator::new().evaluate(entry, node)
}

pub fn highlights(entry: &Entry, tree: &ExpressionNode) -> Vec<Highlight> {
    Evaluator::new().highlights(entry, tree)
}

pub fn headers_to_string(headers: &[Header]) -> String {
    let mut out = String::new();
    for h in headers {
        out.push_str(&h.name);
        out.push_str(": ");
        out.push_str(&h.value);
        out.push('\n');
    }
    out
}

fn searchable_text(
    entry: &Entry,
    scope: &Lenient<SearchScope>,
    part: &Lenient<SearchPart>,
) -> String {
    let scope = scope.known();
    if scope == Some(SearchScope::Url) {
        return entry.request.url.clone();
    }

    let part = part.known();
    let headers = matches!(part, Some(SearchPart::All) | Some(SearchPart::Headers));
    let bodies = matches!(part, Some(SearchPart::All) | Some(SearchPart::Bodies));
    let mut texts: Vec<String> = Vec::new();

    if matches!(scope, Some(SearchScope::All) | Some(SearchScope::Request)) {
        let request = &entry.request;
        if headers {
            texts.push(request.url.clone());
            texts.push(request.method.clone());
            texts.push(headers_to_string(&request.headers));
            for q in request.query_string.iter().flatten() {
                texts.push(format!("{}={}", q.name, q.value));
            }
        }
        if bodies {
            if let Some(text) = request.post_data.as_ref().and_then(|p| p.text.as_deref()) {
                if !text.is_empty() {
                    texts.push(text.to_string());
                }
            }
        }
    }

    if matches!(scope, Some(SearchScope::All) | Some(SearchScope::Response)) {
        let response = &entry.response;
        if headers {
            texts.push(response.status.to_string());
            texts.push(headers_to_string(&response.headers));
        }
        if bodies {
            let body = response.content.decoded_text();
            if !body.is_empty() {
                texts.push(body.into_owned());
            }
        }
    }

    texts.join("\n")
}

/// Human-readable rendering of a text search, used as a highlight tooltip.
pub fn describe_search(search: &TextSearchNode) -> String {
    let scope = match &search.scope {
        Lenient::Known(SearchScope::All) => "Req & Resp".to_string(),
        Lenient::Known(SearchScope::Request) => "Request".to_string(),
        Lenient::Known(SearchScope::Response) => "Response".to_string(),
        Lenient::Known(SearchScope::Url) => "URL".to_string(),
        Lenient::Unknown(s) if !s.is_empty() => s.clone(),
        Lenient::Unknown(_) => "All".to_string(),
    };
    let part = match &search.part {
        Lenient::Known(SearchPart::All) => "Hdrs & Bodies".to_string(),
        Lenient::Known(SearchPart::Headers) => "Headers".to_string(),
        Lenient::Known(SearchPart::Bodies) => "Bodies".to_string(),
        Lenient::Unknown(s) if !s.is_empty() => s.clone(),
        Lenient::Unknown(_) => "All".to_string(),
    };
    let mode = match search.mode.known() {
        Some(SearchMode::Case) => "contains (case)",
        Some(SearchMode::Regex) => "matches regex",
        _ => "contains",
    };
    format!("SEARCH: {} {} {} '{}'", scope, part, mode, search.text)
}
