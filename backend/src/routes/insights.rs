use serde::{Deserialize, Serialize};

use crate::define_text_type;
use crate::models::{AgentId, AgentMap};

// =========================================================
// Binned insight types
// =========================================================

define_text_type!(FilterTag);

impl FilterTag {
    /// Every repository.
    pub const ALL: &'static str = "all";
    /// Repositories with more than ten stars.
    pub const POPULAR: &'static str = "popular";

    pub fn all() -> Self {
        FilterTag::new(Self::ALL)
    }

    pub fn popular() -> Self {
        FilterTag::new(Self::POPULAR)
    }
}

impl Default for FilterTag {
    fn default() -> Self {
        FilterTag::all()
    }
}

/// Lower/upper interval around a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Bounds {
    /// Pair two optional bounds. Half a pair is no pair.
    pub fn pair(lower: Option<f64>, upper: Option<f64>) -> Option<Self> {
        match (lower, upper) {
            (Some(lower), Some(upper)) => Some(Self { lower, upper }),
            _ => None,
        }
    }

    /// Width of the band (`upper - lower`).
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// One agent's statistic in one bucket.
///
/// `value` is `None` when the store holds NULL for this cell, which renders
/// as a gap rather than a zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "InsightValueWire", into = "InsightValueWire")]
pub struct InsightValue {
    pub value: Option<f64>,
    pub bounds: Option<Bounds>,
}

impl InsightValue {
    pub fn new(value: f64) -> Self {
        Self {
            value: Some(value),
            bounds: None,
        }
    }

    pub fn with_bounds(value: Option<f64>, bounds: Option<Bounds>) -> Self {
        Self { value, bounds }
    }

    pub fn lower(&self) -> Option<f64> {
        self.bounds.map(|b| b.lower)
    }

    pub fn upper(&self) -> Option<f64> {
        self.bounds.map(|b| b.upper)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct InsightValueWire {
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    lower: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    upper: Option<f64>,
}

impl From<InsightValueWire> for InsightValue {
    fn from(wire: InsightValueWire) -> Self {
        InsightValue {
            value: wire.value,
            bounds: Bounds::pair(wire.lower, wire.upper),
        }
    }
}

impl From<InsightValue> for InsightValueWire {
    fn from(value: InsightValue) -> Self {
        InsightValueWire {
            value: value.value,
            lower: value.lower(),
            upper: value.upper(),
        }
    }
}

/// Per-agent values for a single bucket.
pub type InsightItem = AgentMap<InsightValue>;

/// A bucket key with its per-agent values. Serialized as `[key, item]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightBucket(pub String, pub InsightItem);

impl InsightBucket {
    pub fn key(&self) -> &str {
        &self.0
    }

    pub fn item(&self) -> &InsightItem {
        &self.1
    }
}

/// Ordered bucket list of one filter.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilteredInsight(pub Vec<InsightBucket>);

impl FilteredInsight {
    pub fn buckets(&self) -> &[InsightBucket] {
        &self.0
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(InsightBucket::key)
    }

    pub fn get(&self, key: &str) -> Option<&InsightItem> {
        self.0.iter().find(|b| b.key() == key).map(InsightBucket::item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Filter → ordered buckets → per-agent values.
///
/// Filters keep first-seen order; it is not significant to consumers but
/// keeps the JSON output stable between loads.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinnedInsight {
    filters: Vec<(FilterTag, FilteredInsight)>,
}

impl BinnedInsight {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_filters(filters: Vec<(FilterTag, FilteredInsight)>) -> Self {
        Self { filters }
    }

    pub fn get(&self, filter: &str) -> Option<&FilteredInsight> {
        self.filters
            .iter()
            .find(|(tag, _)| tag.as_str() == filter)
            .map(|(_, insight)| insight)
    }

    pub fn filters(&self) -> impl Iterator<Item = &FilterTag> + '_ {
        self.filters.iter().map(|(tag, _)| tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FilterTag, &FilteredInsight)> + '_ {
        self.filters.iter().map(|(tag, insight)| (tag, insight))
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Look up one agent's value.
    pub fn value(&self, filter: &str, key: &str, agent: AgentId) -> Option<&InsightValue> {
        self.get(filter)?.get(key)?.get(agent)
    }
}

impl Serialize for BinnedInsight {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.filters.len()))?;
        for (tag, insight) in &self.filters {
            map.serialize_entry(tag, insight)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for BinnedInsight {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BinnedVisitor;

        impl<'de> serde::de::Visitor<'de> for BinnedVisitor {
            type Value = BinnedInsight;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("a map of filter to bucket list")
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(
                self,
                mut access: A,
            ) -> Result<Self::Value, A::Error> {
                let mut filters = Vec::new();
                while let Some((tag, insight)) =
                    access.next_entry::<FilterTag, FilteredInsight>()?
                {
                    filters.push((tag, insight));
                }
                Ok(BinnedInsight { filters })
            }
        }

        deserializer.deserialize_map(BinnedVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_pair_requires_both() {
        assert!(Bounds::pair(Some(0.1), None).is_none());
        assert!(Bounds::pair(None, Some(0.9)).is_none());
        let b = Bounds::pair(Some(0.1), Some(0.9)).unwrap();
        assert!((b.width() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_insight_value_wire_format() {
        let plain = InsightValue::new(10.0);
        assert_eq!(serde_json::to_string(&plain).unwrap(), r#"{"value":10.0}"#);

        let banded = InsightValue::with_bounds(Some(0.5), Bounds::pair(Some(0.4), Some(0.6)));
        assert_eq!(
            serde_json::to_string(&banded).unwrap(),
            r#"{"value":0.5,"lower":0.4,"upper":0.6}"#
        );

        let missing = InsightValue::with_bounds(None, None);
        assert_eq!(serde_json::to_string(&missing).unwrap(), r#"{"value":null}"#);
    }

    #[test]
    fn test_insight_value_half_bounds_deserialize_as_none() {
        let v: InsightValue = serde_json::from_str(r#"{"value":1.0,"lower":0.5}"#).unwrap();
        assert_eq!(v.bounds, None);
    }

    #[test]
    fn test_binned_insight_json_shape() {
        let mut item = InsightItem::new();
        item.insert(AgentId::Codex, InsightValue::new(10.0));
        let insight = BinnedInsight::from_filters(vec![(
            FilterTag::all(),
            FilteredInsight(vec![InsightBucket("1".to_string(), item)]),
        )]);

        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json, serde_json::json!({"all": [["1", {"codex": {"value": 10.0}}]]}));

        let back: BinnedInsight = serde_json::from_value(json).unwrap();
        assert_eq!(back, insight);
    }
}
