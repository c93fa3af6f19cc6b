//! Pivot (cross-table) widget payload

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{aggregate, field_label, group_label, measure_title};
use crate::domain::model::{FieldDef, LineSettings, PivotSortBy, Record, SortOrder};

#[derive(Debug, Serialize, ToSchema)]
pub struct PivotRow {
    pub row: String,
    /// One value per column, same order as `columns`
    pub values: Vec<f64>,
    pub row_total: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PivotPayload {
    pub measure_label: String,
    pub row_label: String,
    pub col_label: String,
    pub columns: Vec<String>,
    pub rows: Vec<PivotRow>,
    pub col_totals: Vec<f64>,
    pub grand_total: f64,
    pub show_data_title: bool,
}

pub fn build(settings: &LineSettings, fields: &[FieldDef], records: &[Record]) -> PivotPayload {
    let measure = settings.pivot_measure.as_deref();
    let row_field = settings.pivot_row_groupby.as_deref();
    let col_field = settings.pivot_col_groupby.as_deref();

    // Bucket records by (row label, column label); a missing axis collapses
    // to a single Total bucket on that axis.
    let mut row_groups: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
    let mut col_labels: BTreeMap<String, ()> = BTreeMap::new();
    let mut cells: BTreeMap<(String, String), Vec<&Record>> = BTreeMap::new();

    for record in records {
        let row = axis_label(record, row_field);
        let col = axis_label(record, col_field);
        row_groups.entry(row.clone()).or_default().push(record);
        col_labels.insert(col.clone(), ());
        cells.entry((row, col)).or_default().push(record);
    }

    let columns: Vec<String> = col_labels.into_keys().collect();

    let mut rows: Vec<PivotRow> = row_groups
        .iter()
        .map(|(row, members)| {
            let values = columns
                .iter()
                .map(|col| {
                    cells
                        .get(&(row.clone(), col.clone()))
                        .map(|subset| aggregate(settings.aggregator, measure, subset))
                        .unwrap_or(0.0)
                })
                .collect();
            PivotRow {
                row: row.clone(),
                values,
                row_total: aggregate(settings.aggregator, measure, members),
            }
        })
        .collect();

    sort_rows(&mut rows, settings.pivot_sort_by, settings.pivot_sort_order);

    // Column totals aggregate over the column's records, not over cell
    // values, so avg/min/max stay correct.
    let col_totals: Vec<f64> = columns
        .iter()
        .map(|col| {
            let members: Vec<&Record> = cells
                .iter()
                .filter(|((_, c), _)| c == col)
                .flat_map(|(_, subset)| subset.iter().copied())
                .collect();
            aggregate(settings.aggregator, measure, &members)
        })
        .collect();

    let all: Vec<&Record> = records.iter().collect();

    PivotPayload {
        measure_label: measure_title(settings.aggregator, measure, fields),
        row_label: row_field.map(|f| field_label(fields, f)).unwrap_or_else(|| "Total".into()),
        col_label: col_field.map(|f| field_label(fields, f)).unwrap_or_else(|| "Total".into()),
        columns,
        rows,
        col_totals,
        grand_total: aggregate(settings.aggregator, measure, &all),
        show_data_title: settings.show_data_title,
    }
}

fn axis_label(record: &Record, field: Option<&str>) -> String {
    match field {
        Some(f) => group_label(record, f),
        None => "Total".to_string(),
    }
}

fn sort_rows(rows: &mut [PivotRow], by: PivotSortBy, order: SortOrder) {
    match by {
        // BTreeMap iteration already ordered rows by label
        PivotSortBy::Label => {}
        PivotSortBy::Value => {
            rows.sort_by(|a, b| {
                a.row_total.partial_cmp(&b.row_total).unwrap_or(std::cmp::Ordering::Equal)
            });
        }
    }
    if order == SortOrder::Desc {
        rows.reverse();
    }
}
