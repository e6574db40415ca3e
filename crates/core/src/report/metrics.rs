use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Recognized field names inside a metric mapping. Each one routes the entry
/// into a report bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Value,
    Highlight,
    Recommendation,
    Detailed,
    Trend,
    Insight,
    Kpi,
    Performance,
    Alert,
}

impl Marker {
    pub const ALL: [Marker; 9] = [
        Self::Value,
        Self::Highlight,
        Self::Recommendation,
        Self::Detailed,
        Self::Trend,
        Self::Insight,
        Self::Kpi,
        Self::Performance,
        Self::Alert,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Value => "value",
            Self::Highlight => "highlight",
            Self::Recommendation => "recommendation",
            Self::Detailed => "detailed",
            Self::Trend => "trend",
            Self::Insight => "insight",
            Self::Kpi => "kpi",
            Self::Performance => "performance",
            Self::Alert => "alert",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|marker| marker.key() == key)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaggedMetric {
    markers: Vec<Marker>,
    fields: Map<String, Value>,
}

impl TaggedMetric {
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn has(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }

    pub fn field(&self, marker: Marker) -> Option<&Value> {
        self.fields.get(marker.key())
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// One value of the raw metrics mapping, classified by shape.
#[derive(Clone, Debug, PartialEq)]
pub enum MetricEntry {
    Plain(Number),
    Tagged(TaggedMetric),
    /// Strings, sequences, booleans, nulls and mappings without markers.
    /// They never land in a bucket but stay readable for methodology fields.
    Untagged(Value),
}

impl MetricEntry {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Number(number) => Self::Plain(number.clone()),
            Value::Object(fields) => {
                let markers: Vec<Marker> =
                    fields.keys().filter_map(|key| Marker::from_key(key)).collect();
                if markers.is_empty() {
                    Self::Untagged(value.clone())
                } else {
                    Self::Tagged(TaggedMetric { markers, fields: fields.clone() })
                }
            }
            other => Self::Untagged(other.clone()),
        }
    }

    pub fn as_tagged(&self) -> Option<&TaggedMetric> {
        match self {
            Self::Tagged(tagged) => Some(tagged),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Plain(number) => Some(number),
            _ => None,
        }
    }
}

/// Raw metrics in caller order, classified once up front.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Metrics {
    raw: Map<String, Value>,
    entries: Vec<(String, MetricEntry)>,
}

impl From<Map<String, Value>> for Metrics {
    fn from(raw: Map<String, Value>) -> Self {
        let entries =
            raw.iter().map(|(key, value)| (key.clone(), MetricEntry::classify(value))).collect();
        Self { raw, entries }
    }
}

impl Metrics {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.raw.get(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &MetricEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Every tagged entry carrying `marker`, independent of its other markers.
    pub fn tagged_with(&self, marker: Marker) -> impl Iterator<Item = (&str, &TaggedMetric)> {
        self.entries().filter_map(move |(key, entry)| {
            entry.as_tagged().filter(|tagged| tagged.has(marker)).map(|tagged| (key, tagged))
        })
    }
}
