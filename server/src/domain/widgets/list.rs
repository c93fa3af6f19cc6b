//! List (table) widget payload

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{field_def, group_label};
use crate::core::constants::MAX_LIST_ROWS;
use crate::domain::model::{FieldDef, FieldType, FieldValue, LineSettings, Record};
use crate::utils::format::format_number;

#[derive(Debug, Serialize, ToSchema)]
pub struct ListColumn {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub digits: Option<u8>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListRow {
    /// Display cells, one per column
    pub cells: Vec<String>,
    /// Group header rows carry the group label and numeric subtotals
    pub group_header: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListPayload {
    pub columns: Vec<ListColumn>,
    pub rows: Vec<ListRow>,
    /// Total matching records (rows may be truncated)
    pub count: usize,
    pub is_grouped: bool,
    pub show_record_count: bool,
}

pub fn build(settings: &LineSettings, fields: &[FieldDef], records: &[Record]) -> ListPayload {
    let columns = resolve_columns(settings, fields);
    let grouped = settings
        .list_groupby
        .as_deref()
        .filter(|name| field_def(fields, name).is_some());

    let mut rows = Vec::new();
    match grouped {
        Some(group_field) => {
            let mut groups: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
            for record in records {
                groups.entry(group_label(record, group_field)).or_default().push(record);
            }
            for (label, members) in &groups {
                rows.push(header_row(&columns, label, members));
                for record in members {
                    if rows.len() >= MAX_LIST_ROWS {
                        break;
                    }
                    rows.push(detail_row(&columns, record));
                }
                if rows.len() >= MAX_LIST_ROWS {
                    break;
                }
            }
        }
        None => {
            for record in records.iter().take(MAX_LIST_ROWS) {
                rows.push(detail_row(&columns, record));
            }
        }
    }

    ListPayload {
        columns,
        rows,
        count: records.len(),
        is_grouped: grouped.is_some(),
        show_record_count: settings.show_record_count,
    }
}

/// Columns come from the line's field list; unknown names are skipped and an
/// empty list means every source field.
fn resolve_columns(settings: &LineSettings, fields: &[FieldDef]) -> Vec<ListColumn> {
    let defs: Vec<&FieldDef> = if settings.list_fields.is_empty() {
        fields.iter().collect()
    } else {
        settings.list_fields.iter().filter_map(|name| field_def(fields, name)).collect()
    };
    defs.into_iter()
        .map(|f| ListColumn {
            name: f.name.clone(),
            label: f.label.clone(),
            field_type: f.field_type,
            digits: f.digits,
        })
        .collect()
}

fn detail_row(columns: &[ListColumn], record: &Record) -> ListRow {
    let cells = columns
        .iter()
        .map(|col| match record.value(&col.name) {
            FieldValue::Number(n) => format_number(*n, col.digits),
            other => other.display(),
        })
        .collect();
    ListRow { cells, group_header: false }
}

/// Header rows show `label (count)` in the first column and numeric
/// subtotals in numeric columns.
fn header_row(columns: &[ListColumn], label: &str, members: &[&Record]) -> ListRow {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            if i == 0 {
                return format!("{} ({})", label, members.len());
            }
            if col.field_type == FieldType::Numeric {
                let subtotal: f64 =
                    members.iter().filter_map(|r| r.value(&col.name).as_number()).sum();
                return format_number(subtotal, col.digits);
            }
            String::new()
        })
        .collect();
    ListRow { cells, group_header: true }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{sales, sales_fields};
    use super::*;
    use crate::domain::model::DisplayMode;

    fn list_settings(fields: &[&str], groupby: Option<&str>) -> LineSettings {
        LineSettings {
            display_mode: DisplayMode::List,
            list_fields: fields.iter().map(|s| s.to_string()).collect(),
            list_groupby: groupby.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn flat_list_renders_all_records() {
        let payload = build(&list_settings(&["city", "amount"], None), &sales_fields(), &sales());
        assert_eq!(payload.columns.len(), 2);
        assert_eq!(payload.rows.len(), 5);
        assert_eq!(payload.count, 5);
        assert!(!payload.is_grouped);
        assert_eq!(payload.rows[0].cells, vec!["Paris", "100,00"]);
    }

    #[test]
    fn empty_field_list_uses_every_source_field() {
        let payload = build(&list_settings(&[], None), &sales_fields(), &sales());
        assert_eq!(payload.columns.len(), 4);
    }

    #[test]
    fn unknown_fields_are_skipped() {
        let payload =
            build(&list_settings(&["city", "missing"], None), &sales_fields(), &sales());
        assert_eq!(payload.columns.len(), 1);
    }

    #[test]
    fn grouped_list_has_headers_with_subtotals() {
        let payload =
            build(&list_settings(&["city", "amount"], Some("city")), &sales_fields(), &sales());
        assert!(payload.is_grouped);
        // 2 groups (Lyon, Paris sorted) + 5 detail rows
        assert_eq!(payload.rows.len(), 7);

        let lyon = &payload.rows[0];
        assert!(lyon.group_header);
        assert_eq!(lyon.cells[0], "Lyon (3)");
        assert_eq!(lyon.cells[1], "250,00");

        let paris_pos = payload.rows.iter().position(|r| r.cells[0] == "Paris (2)").unwrap();
        assert!(payload.rows[paris_pos].group_header);
        // detail rows in between belong to Lyon
        assert_eq!(paris_pos, 4);
    }

    #[test]
    fn empty_record_set_yields_empty_rows() {
        let payload = build(&list_settings(&["city"], None), &sales_fields(), &[]);
        assert!(payload.rows.is_empty());
        assert_eq!(payload.count, 0);
    }
}
