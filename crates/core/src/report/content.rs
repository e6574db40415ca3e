use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::metrics::{Marker, Metrics};
use super::ReportKind;

pub const NOT_SPECIFIED: &str = "Not specified";

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Mapping(Map<String, Value>),
    Sequence(Vec<Value>),
    Scalar(Value),
}

/// One rendered line of a section, shared by the text and block renderers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SectionLine {
    Field { label: String, value: String },
    Item(String),
    Bare(String),
}

impl SectionValue {
    pub fn lines(&self) -> Vec<SectionLine> {
        match self {
            Self::Mapping(entries) => entries
                .iter()
                .map(|(key, value)| SectionLine::Field {
                    label: humanize(key),
                    value: display_value(value),
                })
                .collect(),
            Self::Sequence(items) => {
                items.iter().map(|item| SectionLine::Item(display_value(item))).collect()
            }
            Self::Scalar(value) => vec![SectionLine::Bare(display_value(value))],
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mapping(entries) => entries.is_empty(),
            Self::Sequence(items) => items.is_empty(),
            Self::Scalar(_) => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub name: &'static str,
    pub value: SectionValue,
}

impl Section {
    fn new(name: &'static str, value: SectionValue) -> Self {
        Self { name, value }
    }

    pub fn heading(&self) -> String {
        humanize(self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReportContent {
    pub title: String,
    pub kind: ReportKind,
    pub generated_at: String,
    pub sections: Vec<Section>,
}

impl ReportContent {
    pub fn section(&self, name: &str) -> Option<&SectionValue> {
        self.sections.iter().find(|section| section.name == name).map(|section| &section.value)
    }
}

struct SectionsMap<'a>(&'a [Section]);

impl Serialize for SectionsMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for section in self.0 {
            map.serialize_entry(section.name, &section.value)?;
        }
        map.end()
    }
}

impl Serialize for ReportContent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("title", &self.title)?;
        map.serialize_entry("type", self.kind.as_str())?;
        map.serialize_entry("generated_at", &self.generated_at)?;
        map.serialize_entry("content", &SectionsMap(&self.sections))?;
        map.end()
    }
}

pub(crate) fn shape(kind: ReportKind, metrics: &Metrics) -> Vec<Section> {
    match kind {
        ReportKind::ExecutiveSummary => vec![
            Section::new("key_metrics", SectionValue::Mapping(key_metrics(metrics))),
            Section::new("highlights", SectionValue::Sequence(extract(metrics, Marker::Highlight))),
            Section::new(
                "recommendations",
                SectionValue::Sequence(extract(metrics, Marker::Recommendation)),
            ),
        ],
        ReportKind::DetailedAnalysis => vec![
            Section::new("methodology", SectionValue::Mapping(methodology(metrics))),
            Section::new("detailed_metrics", SectionValue::Mapping(bucket(metrics, Marker::Detailed))),
            Section::new("trends", SectionValue::Mapping(bucket(metrics, Marker::Trend))),
            Section::new("insights", SectionValue::Mapping(bucket(metrics, Marker::Insight))),
        ],
        ReportKind::Dashboard => vec![
            Section::new("kpis", SectionValue::Mapping(bucket(metrics, Marker::Kpi))),
            Section::new(
                "performance_metrics",
                SectionValue::Mapping(bucket(metrics, Marker::Performance)),
            ),
            Section::new("alerts", SectionValue::Mapping(bucket(metrics, Marker::Alert))),
        ],
    }
}

fn key_metrics(metrics: &Metrics) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, entry) in metrics.entries() {
        if let Some(number) = entry.as_number() {
            out.insert(key.to_string(), Value::Number(number.clone()));
        } else if let Some(value) = entry.as_tagged().and_then(|tagged| tagged.field(Marker::Value)) {
            out.insert(key.to_string(), value.clone());
        }
    }
    out
}

fn extract(metrics: &Metrics, marker: Marker) -> Vec<Value> {
    metrics.tagged_with(marker).filter_map(|(_, tagged)| tagged.field(marker).cloned()).collect()
}

fn bucket(metrics: &Metrics, marker: Marker) -> Map<String, Value> {
    metrics.tagged_with(marker).map(|(key, tagged)| (key.to_string(), tagged.to_value())).collect()
}

fn methodology(metrics: &Metrics) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert(
        "data_sources".to_string(),
        metrics.raw("data_sources").cloned().unwrap_or_else(|| json!([NOT_SPECIFIED])),
    );
    out.insert(
        "time_period".to_string(),
        metrics.raw("time_period").cloned().unwrap_or_else(|| json!(NOT_SPECIFIED)),
    );
    out.insert(
        "analysis_methods".to_string(),
        metrics.raw("analysis_methods").cloned().unwrap_or_else(|| json!([NOT_SPECIFIED])),
    );
    out
}

/// `total_sales` -> `Total Sales`. Letters following a non-letter are
/// upper-cased, every other letter lower-cased.
pub fn humanize(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for ch in key.chars() {
        let ch = if ch == '_' { ' ' } else { ch };
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{display_value, humanize, shape, SectionLine, SectionValue};
    use crate::report::metrics::Metrics;
    use crate::report::ReportKind;

    fn metrics(value: Value) -> Metrics {
        serde_json::from_value(value).expect("metrics mapping")
    }

    #[test]
    fn humanize_title_cases_words() {
        assert_eq!(humanize("total_sales"), "Total Sales");
        assert_eq!(humanize("KPIS"), "Kpis");
        assert_eq!(humanize("q1_2nd_pass"), "Q1 2Nd Pass");
    }

    #[test]
    fn display_value_keeps_strings_bare() {
        assert_eq!(display_value(&json!("up")), "up");
        assert_eq!(display_value(&json!(75.5)), "75.5");
        assert_eq!(display_value(&json!(["a", "b"])), "[\"a\",\"b\"]");
    }

    #[test]
    fn executive_summary_with_only_numbers_keeps_metrics_unchanged() {
        let raw = json!({"revenue": 1200, "orders": 31, "aov": 38.7});
        let sections = shape(ReportKind::ExecutiveSummary, &metrics(raw.clone()));

        let Some(SectionValue::Mapping(key_metrics)) = sections.first().map(|s| &s.value) else {
            panic!("key_metrics should be a mapping");
        };
        assert_eq!(Value::Object(key_metrics.clone()), raw);
        assert!(sections[1].value.is_empty());
        assert!(sections[2].value.is_empty());
    }

    #[test]
    fn value_and_highlight_entry_lands_in_both_buckets() {
        let sections = shape(
            ReportKind::ExecutiveSummary,
            &metrics(json!({"average_order": {"value": 75.5, "highlight": "15% up"}})),
        );

        assert_eq!(
            sections[0].value,
            SectionValue::Mapping(
                json!({"average_order": 75.5}).as_object().cloned().unwrap_or_default()
            )
        );
        assert_eq!(sections[1].value, SectionValue::Sequence(vec![json!("15% up")]));
    }

    #[test]
    fn detailed_analysis_defaults_methodology() {
        let sections = shape(
            ReportKind::DetailedAnalysis,
            &metrics(json!({"time_period": "Q1", "churn": {"trend": "down", "value": 3}})),
        );

        let names: Vec<&str> = sections.iter().map(|section| section.name).collect();
        assert_eq!(names, vec!["methodology", "detailed_metrics", "trends", "insights"]);
        assert_eq!(
            sections[0].value.lines(),
            vec![
                SectionLine::Field {
                    label: "Data Sources".to_string(),
                    value: "[\"Not specified\"]".to_string()
                },
                SectionLine::Field { label: "Time Period".to_string(), value: "Q1".to_string() },
                SectionLine::Field {
                    label: "Analysis Methods".to_string(),
                    value: "[\"Not specified\"]".to_string()
                },
            ]
        );
        assert_eq!(
            sections[2].value,
            SectionValue::Mapping(
                json!({"churn": {"trend": "down", "value": 3}})
                    .as_object()
                    .cloned()
                    .unwrap_or_default()
            )
        );
    }

    #[test]
    fn dashboard_buckets_full_entries() {
        let sections = shape(
            ReportKind::Dashboard,
            &metrics(json!({
                "conversion": {"kpi": "2.1%"},
                "stockouts": {"alert": "12 items below zero", "performance": "poor"},
                "visitors": 5400
            })),
        );

        let names: Vec<&str> = sections.iter().map(|section| section.name).collect();
        assert_eq!(names, vec!["kpis", "performance_metrics", "alerts"]);
        assert_eq!(sections[0].value.lines().len(), 1);
        assert_eq!(sections[1].value.lines().len(), 1);
        assert_eq!(sections[2].value.lines().len(), 1);
    }
}
