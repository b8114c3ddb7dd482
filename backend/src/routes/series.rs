use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::insights::FilterTag;
use crate::models::{AgentId, AgentMap};

// =========================================================
// Chart series types
// =========================================================

/// Marker emitted in place of a missing value. Chart primitives skip it
/// instead of drawing a drop to zero.
pub const MISSING_VALUE_MARKER: &str = "NaN";

/// Suffix of the band offset field (`<agent>_lb`).
pub const LOWER_BOUND_SUFFIX: &str = "_lb";
/// Suffix of the band width field (`<agent>_range`).
pub const RANGE_SUFFIX: &str = "_range";

/// Plotted value of one agent in one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeriesValue {
    Number(f64),
    Missing,
}

impl SeriesValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SeriesValue::Number(v) => Some(*v),
            SeriesValue::Missing => None,
        }
    }
}

impl From<Option<f64>> for SeriesValue {
    fn from(value: Option<f64>) -> Self {
        value.map(SeriesValue::Number).unwrap_or(SeriesValue::Missing)
    }
}

impl Serialize for SeriesValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SeriesValue::Number(v) => serializer.serialize_f64(*v),
            SeriesValue::Missing => serializer.serialize_str(MISSING_VALUE_MARKER),
        }
    }
}

/// Derived fields of one agent in one bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesCell {
    pub value: SeriesValue,
    /// Band offset; `None` unless both bounds are known.
    pub lower: Option<f64>,
    /// Band width; `0.0` unless both bounds are known.
    pub range: f64,
}

/// One chart record per bucket with dynamic per-agent fields.
///
/// Serializes flat: `{"key": "1", "codex": 10, "codex_lb": 9, "codex_range": 2}`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub key: String,
    pub cells: AgentMap<SeriesCell>,
}

impl SeriesRow {
    pub fn cell(&self, agent: AgentId) -> Option<&SeriesCell> {
        self.cells.get(agent)
    }
}

impl Serialize for SeriesRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("key", &self.key)?;
        for (agent, cell) in self.cells.iter() {
            map.serialize_entry(agent.as_str(), &cell.value)?;
            if let Some(lower) = cell.lower {
                map.serialize_entry(&format!("{}{}", agent, LOWER_BOUND_SUFFIX), &lower)?;
            }
            map.serialize_entry(&format!("{}{}", agent, RANGE_SUFFIX), &cell.range)?;
        }
        map.end()
    }
}

/// Chart primitive used to draw an insight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
}

/// What a drawn series represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesRole {
    /// Invisible stacked area lifting the band to the lower bound.
    BandBase,
    /// Filled stacked area of the band width.
    BandWidth,
    /// Vertical error bar on a bar chart.
    ErrorBar,
    /// The value line or bar itself.
    Value,
}

/// A series the chart should draw, referencing a field of [`SeriesRow`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub agent: AgentId,
    pub data_key: String,
    pub role: SeriesRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_id: Option<String>,
    pub label: String,
}

/// Rows plus draw plan for one chart.
#[derive(Debug, Clone, Serialize)]
pub struct ChartData {
    pub filter: FilterTag,
    pub kind: ChartKind,
    pub rows: Vec<SeriesRow>,
    pub series: Vec<ChartSeries>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_row_serializes_flat() {
        let mut cells = AgentMap::new();
        cells.insert(
            AgentId::Codex,
            SeriesCell {
                value: SeriesValue::Number(0.5),
                lower: Some(0.4),
                range: 0.25,
            },
        );
        cells.insert(
            AgentId::Human,
            SeriesCell {
                value: SeriesValue::Missing,
                lower: None,
                range: 0.0,
            },
        );
        let row = SeriesRow {
            key: "2025-06-01".to_string(),
            cells,
        };

        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "key": "2025-06-01",
                "human": "NaN",
                "human_range": 0.0,
                "codex": 0.5,
                "codex_lb": 0.4,
                "codex_range": 0.25,
            })
        );
    }

    #[test]
    fn test_zero_value_is_not_missing() {
        let value = SeriesValue::from(Some(0.0));
        assert_eq!(serde_json::to_value(value).unwrap(), serde_json::json!(0.0));
        assert_eq!(
            serde_json::to_value(SeriesValue::from(None)).unwrap(),
            serde_json::json!("NaN")
        );
    }
}
