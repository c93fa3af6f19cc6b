//! Widget payload computation
//!
//! Turns a line's settings plus the filtered record set into a render-ready
//! payload: a table for list lines, a Chart.js-shaped dataset for graph
//! lines, a cross-table for pivot lines.

pub mod graph;
pub mod list;
pub mod pivot;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::model::{Aggregator, DisplayMode, FieldDef, LineSettings, Record};

/// Group label shown for records with no value in the group-by field
pub const UNSET_GROUP_LABEL: &str = "Non défini";

#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetPayload {
    List(list::ListPayload),
    Graph(graph::GraphPayload),
    Pivot(pivot::PivotPayload),
}

/// Build the payload for a line over the records that survived filtering
pub fn build_payload(
    settings: &LineSettings,
    fields: &[FieldDef],
    records: &[Record],
) -> WidgetPayload {
    match settings.display_mode {
        DisplayMode::List => WidgetPayload::List(list::build(settings, fields, records)),
        DisplayMode::Graph => WidgetPayload::Graph(graph::build(settings, fields, records)),
        DisplayMode::Pivot => WidgetPayload::Pivot(pivot::build(settings, fields, records)),
    }
}

pub(crate) fn field_def<'a>(fields: &'a [FieldDef], name: &str) -> Option<&'a FieldDef> {
    fields.iter().find(|f| f.name == name)
}

pub(crate) fn field_label(fields: &[FieldDef], name: &str) -> String {
    field_def(fields, name).map(|f| f.label.clone()).unwrap_or_else(|| name.to_string())
}

/// Label of a record's group-by value
pub(crate) fn group_label(record: &Record, field: &str) -> String {
    let label = record.value(field).display();
    if label.is_empty() { UNSET_GROUP_LABEL.to_string() } else { label }
}

/// Fold the measure over a record subset. `count` ignores the measure;
/// the other aggregators skip records with a null or non-numeric value.
pub(crate) fn aggregate(agg: Aggregator, measure: Option<&str>, records: &[&Record]) -> f64 {
    if agg == Aggregator::Count {
        return records.len() as f64;
    }
    let Some(measure) = measure else {
        // No measure to fold: degrade to a record count
        return records.len() as f64;
    };
    let values: Vec<f64> =
        records.iter().filter_map(|r| r.value(measure).as_number()).collect();
    if values.is_empty() {
        return 0.0;
    }
    match agg {
        Aggregator::Sum => values.iter().sum(),
        Aggregator::Avg => values.iter().sum::<f64>() / values.len() as f64,
        Aggregator::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Aggregator::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        Aggregator::Count => unreachable!(),
    }
}

/// French label of an aggregated measure, used for dataset and axis titles
pub(crate) fn measure_title(
    agg: Aggregator,
    measure: Option<&str>,
    fields: &[FieldDef],
) -> String {
    let agg_word = match agg {
        Aggregator::Sum => "Somme",
        Aggregator::Count => "Nombre",
        Aggregator::Avg => "Moyenne",
        Aggregator::Min => "Minimum",
        Aggregator::Max => "Maximum",
    };
    match measure {
        Some(m) if agg != Aggregator::Count => {
            format!("{} de {}", agg_word, field_label(fields, m))
        }
        _ => agg_word.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashMap;

    use crate::domain::model::{FieldDef, FieldType, FieldValue, Record};

    pub fn sales_fields() -> Vec<FieldDef> {
        vec![
            FieldDef {
                name: "city".into(),
                label: "Ville".into(),
                field_type: FieldType::Text,
                digits: None,
            },
            FieldDef {
                name: "year".into(),
                label: "Année".into(),
                field_type: FieldType::Text,
                digits: None,
            },
            FieldDef {
                name: "amount".into(),
                label: "Montant".into(),
                field_type: FieldType::Numeric,
                digits: Some(2),
            },
            FieldDef {
                name: "qty".into(),
                label: "Quantité".into(),
                field_type: FieldType::Numeric,
                digits: None,
            },
        ]
    }

    pub fn sale(city: &str, year: &str, amount: f64, qty: f64) -> Record {
        let mut values = HashMap::new();
        values.insert("city".to_string(), FieldValue::Text(city.to_string()));
        values.insert("year".to_string(), FieldValue::Text(year.to_string()));
        values.insert("amount".to_string(), FieldValue::Number(amount));
        values.insert("qty".to_string(), FieldValue::Number(qty));
        Record::new(values)
    }

    pub fn sales() -> Vec<Record> {
        vec![
            sale("Paris", "2024", 100.0, 1.0),
            sale("Paris", "2025", 50.0, 2.0),
            sale("Lyon", "2024", 200.0, 3.0),
            sale("Lyon", "2025", 25.0, 4.0),
            sale("Lyon", "2025", 25.0, 5.0),
        ]
    }
}
