//! Dashboard domain model
//!
//! Plain data types shared by the data layer, the filter engine and the
//! widget payload builders. Everything here is serializable so dashboard
//! definitions can be returned to clients as-is.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Declared type of a source field (drives filter parsing and rendering)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Numeric,
    Boolean,
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Numeric => "numeric",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        }
    }

    /// Parse from a stored string, defaulting to text for unknown values
    pub fn parse(s: &str) -> Self {
        match s {
            "numeric" => FieldType::Numeric,
            "boolean" => FieldType::Boolean,
            "date" => FieldType::Date,
            _ => FieldType::Text,
        }
    }
}

/// Field definition of a record source
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FieldDef {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    /// Display decimals for numeric fields (None = 2 for non-integers)
    pub digits: Option<u8>,
}

/// A typed record value. `Null` covers missing and unparseable stored values;
/// it fails every filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl FieldValue {
    /// Coerce a stored JSON value into the field's declared type
    pub fn from_json(field_type: FieldType, value: &serde_json::Value) -> Self {
        if value.is_null() {
            return FieldValue::Null;
        }
        match field_type {
            FieldType::Text => match value {
                serde_json::Value::String(s) => FieldValue::Text(s.clone()),
                other => FieldValue::Text(other.to_string()),
            },
            FieldType::Numeric => match value {
                serde_json::Value::Number(n) => {
                    n.as_f64().map(FieldValue::Number).unwrap_or(FieldValue::Null)
                }
                serde_json::Value::String(s) => {
                    s.trim().parse::<f64>().map(FieldValue::Number).unwrap_or(FieldValue::Null)
                }
                _ => FieldValue::Null,
            },
            FieldType::Boolean => match value {
                serde_json::Value::Bool(b) => FieldValue::Bool(*b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(0) => FieldValue::Bool(false),
                    Some(_) => FieldValue::Bool(true),
                    None => FieldValue::Null,
                },
                serde_json::Value::String(s) => match s.to_lowercase().as_str() {
                    "true" | "1" => FieldValue::Bool(true),
                    "false" | "0" => FieldValue::Bool(false),
                    _ => FieldValue::Null,
                },
                _ => FieldValue::Null,
            },
            FieldType::Date => match value {
                serde_json::Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .map(FieldValue::Date)
                    .unwrap_or(FieldValue::Null),
                _ => FieldValue::Null,
            },
        }
    }

    /// Display string used for text matching and group labels
    pub fn display(&self) -> String {
        match self {
            FieldValue::Text(s) => s.clone(),
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            FieldValue::Bool(b) => (if *b { "oui" } else { "non" }).to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Null => String::new(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// A single record of a source, with values already coerced per field type
#[derive(Debug, Clone, Default)]
pub struct Record {
    values: HashMap<String, FieldValue>,
}

impl Record {
    pub fn new(values: HashMap<String, FieldValue>) -> Self {
        Self { values }
    }

    /// Value for a field; missing fields read as Null
    pub fn value(&self, field: &str) -> &FieldValue {
        self.values.get(field).unwrap_or(&FieldValue::Null)
    }
}

/// Record source (a named dataset with typed fields)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Source {
    pub id: String,
    pub name: String,
    pub label: String,
    pub fields: Vec<FieldDef>,
}

/// How a dashboard line renders its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    List,
    Graph,
    Pivot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
}

/// Measure aggregation for graph and pivot lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Aggregator {
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PivotSortBy {
    Label,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Render settings of a dashboard line. Stored with the line and overridable
/// per request. Omitted JSON fields take their defaults, so stored settings
/// survive additions to this struct.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct LineSettings {
    pub display_mode: DisplayMode,
    /// Fields shown by list lines, in order
    pub list_fields: Vec<String>,
    pub list_groupby: Option<String>,
    pub chart_type: ChartType,
    pub graph_groupby: Option<String>,
    pub graph_measure: Option<String>,
    pub aggregator: Aggregator,
    pub show_legend: bool,
    pub show_data_title: bool,
    pub show_record_count: bool,
    pub pivot_row_groupby: Option<String>,
    pub pivot_col_groupby: Option<String>,
    pub pivot_measure: Option<String>,
    pub pivot_sort_by: PivotSortBy,
    pub pivot_sort_order: SortOrder,
}

impl Default for LineSettings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::List,
            list_fields: Vec::new(),
            list_groupby: None,
            chart_type: ChartType::Bar,
            graph_groupby: None,
            graph_measure: None,
            aggregator: Aggregator::Sum,
            show_legend: true,
            show_data_title: true,
            show_record_count: true,
            pivot_row_groupby: None,
            pivot_col_groupby: None,
            pivot_measure: None,
            pivot_sort_by: PivotSortBy::Label,
            pivot_sort_order: SortOrder::Asc,
        }
    }
}

/// Per-request overrides applied on top of a line's stored settings,
/// without persisting them
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct LineOverrides {
    pub display_mode: Option<DisplayMode>,
    pub list_fields: Option<Vec<String>>,
    pub list_groupby: Option<String>,
    pub chart_type: Option<ChartType>,
    pub graph_groupby: Option<String>,
    pub graph_measure: Option<String>,
    pub aggregator: Option<Aggregator>,
    pub show_legend: Option<bool>,
    pub show_data_title: Option<bool>,
    pub show_record_count: Option<bool>,
    pub pivot_row_groupby: Option<String>,
    pub pivot_col_groupby: Option<String>,
    pub pivot_measure: Option<String>,
    pub pivot_sort_by: Option<PivotSortBy>,
    pub pivot_sort_order: Option<SortOrder>,
}

impl LineOverrides {
    pub fn apply(&self, settings: &mut LineSettings) {
        if let Some(v) = self.display_mode {
            settings.display_mode = v;
        }
        if let Some(v) = &self.list_fields {
            settings.list_fields = v.clone();
        }
        if let Some(v) = &self.list_groupby {
            settings.list_groupby = Some(v.clone());
        }
        if let Some(v) = self.chart_type {
            settings.chart_type = v;
        }
        if let Some(v) = &self.graph_groupby {
            settings.graph_groupby = Some(v.clone());
        }
        if let Some(v) = &self.graph_measure {
            settings.graph_measure = Some(v.clone());
        }
        if let Some(v) = self.aggregator {
            settings.aggregator = v;
        }
        if let Some(v) = self.show_legend {
            settings.show_legend = v;
        }
        if let Some(v) = self.show_data_title {
            settings.show_data_title = v;
        }
        if let Some(v) = self.show_record_count {
            settings.show_record_count = v;
        }
        if let Some(v) = &self.pivot_row_groupby {
            settings.pivot_row_groupby = Some(v.clone());
        }
        if let Some(v) = &self.pivot_col_groupby {
            settings.pivot_col_groupby = Some(v.clone());
        }
        if let Some(v) = &self.pivot_measure {
            settings.pivot_measure = Some(v.clone());
        }
        if let Some(v) = self.pivot_sort_by {
            settings.pivot_sort_by = v;
        }
        if let Some(v) = self.pivot_sort_order {
            settings.pivot_sort_order = v;
        }
    }
}

/// One widget card of a dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardLine {
    pub id: String,
    pub name: String,
    pub source_id: String,
    /// Grid width in columns (1-12)
    pub width: u8,
    /// Card height in pixels
    pub height: u16,
    pub settings: LineSettings,
}

/// A typed filter input declared on a dashboard
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FilterField {
    pub id: String,
    pub label: String,
    /// Source field this input filters on
    pub field_name: String,
    pub field_type: FieldType,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Dashboard {
    pub id: String,
    pub name: String,
    pub lines: Vec<DashboardLine>,
    pub filter_fields: Vec<FilterField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_type_parse_roundtrip() {
        for ft in [FieldType::Text, FieldType::Numeric, FieldType::Boolean, FieldType::Date] {
            assert_eq!(FieldType::parse(ft.as_str()), ft);
        }
        assert_eq!(FieldType::parse("unknown"), FieldType::Text);
    }

    #[test]
    fn from_json_coerces_per_declared_type() {
        let v = serde_json::json!(42);
        assert_eq!(FieldValue::from_json(FieldType::Numeric, &v), FieldValue::Number(42.0));
        assert_eq!(FieldValue::from_json(FieldType::Text, &v), FieldValue::Text("42".into()));
        assert_eq!(FieldValue::from_json(FieldType::Boolean, &v), FieldValue::Bool(true));

        let v = serde_json::json!("2024-03-15");
        assert_eq!(
            FieldValue::from_json(FieldType::Date, &v),
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())
        );

        let v = serde_json::json!("not a date");
        assert_eq!(FieldValue::from_json(FieldType::Date, &v), FieldValue::Null);

        let v = serde_json::Value::Null;
        assert_eq!(FieldValue::from_json(FieldType::Text, &v), FieldValue::Null);
    }

    #[test]
    fn display_formats_values() {
        assert_eq!(FieldValue::Number(3.0).display(), "3");
        assert_eq!(FieldValue::Number(3.5).display(), "3.5");
        assert_eq!(FieldValue::Bool(true).display(), "oui");
        assert_eq!(FieldValue::Bool(false).display(), "non");
        assert_eq!(FieldValue::Null.display(), "");
    }

    #[test]
    fn record_missing_field_reads_null() {
        let rec = Record::default();
        assert!(rec.value("anything").is_null());
    }

    #[test]
    fn overrides_only_touch_set_fields() {
        let mut settings = LineSettings::default();
        let overrides = LineOverrides {
            display_mode: Some(DisplayMode::Graph),
            aggregator: Some(Aggregator::Avg),
            show_legend: Some(false),
            ..Default::default()
        };
        overrides.apply(&mut settings);
        assert_eq!(settings.display_mode, DisplayMode::Graph);
        assert_eq!(settings.aggregator, Aggregator::Avg);
        assert!(!settings.show_legend);
        // untouched defaults survive
        assert_eq!(settings.chart_type, ChartType::Bar);
        assert!(settings.show_data_title);
    }
}
