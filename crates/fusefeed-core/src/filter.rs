//! Entry filtering (§4.B).
//!
//! Filters are a closed set of tagged variants rather than a string-keyed
//! registry of dynamically dispatched predicates: the spec calls out that
//! shape explicitly, and a fixed enum makes an unrecognized `type`/`op` a
//! compile-time-visible fallback instead of a runtime lookup failure.

use super::*;

/// How a filter's rules combine when deciding whether an entry matches.
///
/// Parsed case-insensitively from the spec document; a value that is
/// neither `or` nor `and` becomes [`Mode::Unknown`] rather than a parse
/// error, so one odd filter doesn't take down the whole spec file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Or,
    And,
    #[serde(other)]
    Unknown,
}

impl<'de> Deserialize<'de> for Mode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_lowercase().as_str() {
            "or" => Mode::Or,
            "and" => Mode::And,
            _ => Mode::Unknown,
        })
    }
}

/// A single predicate tested against one entry field.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Rule {
    Contains { field: String, value: String },
    Xpath { field: String, value: String },
    /// An `op` this engine doesn't recognize. Always evaluates to
    /// non-match, per §9's redesign flag (no silent feature guessing).
    #[serde(other)]
    Unknown,
}

impl Rule {
    fn apply(&self, entry: &Entry) -> bool {
        match self {
            Rule::Contains { field, value } => {
                if value.is_empty() {
                    return false;
                }
                entry
                    .field(field)
                    .map(|text| text.contains(value.as_str()))
                    .unwrap_or(false)
            }
            Rule::Xpath { field, value } => {
                if value.is_empty() {
                    return false;
                }
                entry
                    .field(field)
                    .map(|text| xpath_matches(text, value))
                    .unwrap_or(false)
            }
            Rule::Unknown => false,
        }
    }
}

/// Evaluate an xpath expression against an html/xml fragment. Any parse or
/// evaluation failure is treated as "no match" rather than propagated —
/// a malformed fragment or expression should drop a rule, not a whole feed.
fn xpath_matches(fragment: &str, expr: &str) -> bool {
    let wrapped = format!("<root>{fragment}</root>");
    let package = match sxd_document::parser::parse(&wrapped) {
        Ok(package) => package,
        Err(_) => return false,
    };
    let document = package.as_document();

    let xpath = match sxd_xpath::Factory::new().build(expr) {
        Ok(Some(xpath)) => xpath,
        _ => return false,
    };

    let context = sxd_xpath::Context::new();
    let root = document.root();
    match xpath.evaluate(&context, root) {
        Ok(value) => match value {
            sxd_xpath::Value::Boolean(b) => b,
            sxd_xpath::Value::Nodeset(nodes) => !nodes.document_order().is_empty(),
            sxd_xpath::Value::Number(n) => n != 0.0,
            sxd_xpath::Value::String(s) => !s.is_empty(),
        },
        Err(_) => false,
    }
}

/// A named predicate applied across a whole set of entries, in `mode`
/// (`or`/`and`) combination with its rules.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Filter {
    /// Drop entries that match the rules (by `mode`).
    Block { mode: Mode, rules: Vec<Rule> },
    /// Keep only entries that match the rules (by `mode`).
    Allow { mode: Mode, rules: Vec<Rule> },
    /// A `type` this engine doesn't recognize. Passes every entry through
    /// unchanged — an unknown filter must never silently drop entries.
    #[serde(other)]
    Unknown,
}

impl Filter {
    /// Apply this filter to an entry set, in declared order, each filter's
    /// output feeding the next (§4.B).
    pub fn apply(&self, entries: Vec<Entry>) -> Vec<Entry> {
        match self {
            Filter::Block { mode: Mode::Unknown, .. } | Filter::Allow { mode: Mode::Unknown, .. } => {
                Vec::new()
            }
            Filter::Block { mode, rules } => entries
                .into_iter()
                .filter(|entry| !matches(*mode, rules, entry))
                .collect(),
            Filter::Allow { mode, rules } => entries
                .into_iter()
                .filter(|entry| matches(*mode, rules, entry))
                .collect(),
            Filter::Unknown => entries,
        }
    }
}

/// Whether `entry` matches `rules` combined by `mode`. An empty rule list
/// never matches, under either mode. `mode` is always `or`/`and` here —
/// [`Mode::Unknown`] short-circuits to an empty result before this runs.
fn matches(mode: Mode, rules: &[Rule], entry: &Entry) -> bool {
    if rules.is_empty() {
        return false;
    }
    match mode {
        Mode::Or => rules.iter().any(|rule| rule.apply(entry)),
        Mode::And => rules.iter().all(|rule| rule.apply(entry)),
        Mode::Unknown => false,
    }
}
