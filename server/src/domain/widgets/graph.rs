//! Graph widget payload (Chart.js-shaped)

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use super::{aggregate, group_label, measure_title};
use crate::domain::model::{ChartType, FieldDef, LineSettings, Record};

/// Default series color
const DATASET_COLOR: &str = "#1f77b4";

#[derive(Debug, Serialize, ToSchema)]
pub struct GraphDataset {
    pub label: String,
    pub data: Vec<f64>,
    pub background_color: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GraphData {
    pub labels: Vec<String>,
    pub datasets: Vec<GraphDataset>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GraphPayload {
    pub chart_type: ChartType,
    pub data: GraphData,
    pub show_legend: bool,
    pub show_data_title: bool,
}

pub fn build(settings: &LineSettings, fields: &[FieldDef], records: &[Record]) -> GraphPayload {
    let measure = settings.graph_measure.as_deref();

    // Without a group-by the whole record set is one bar
    let groups: BTreeMap<String, Vec<&Record>> = match settings.graph_groupby.as_deref() {
        Some(group_field) => {
            let mut groups: BTreeMap<String, Vec<&Record>> = BTreeMap::new();
            for record in records {
                groups.entry(group_label(record, group_field)).or_default().push(record);
            }
            groups
        }
        None => BTreeMap::from([("Total".to_string(), records.iter().collect())]),
    };

    let mut labels = Vec::with_capacity(groups.len());
    let mut data = Vec::with_capacity(groups.len());
    for (label, members) in &groups {
        labels.push(label.clone());
        data.push(aggregate(settings.aggregator, measure, members));
    }

    GraphPayload {
        chart_type: settings.chart_type,
        data: GraphData {
            labels,
            datasets: vec![GraphDataset {
                label: measure_title(settings.aggregator, measure, fields),
                data,
                background_color: DATASET_COLOR.to_string(),
            }],
        },
        show_legend: settings.show_legend,
        show_data_title: settings.show_data_title,
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{sales, sales_fields};
    use super::*;
    use crate::domain::model::{Aggregator, DisplayMode};

    fn graph_settings(groupby: Option<&str>, agg: Aggregator) -> LineSettings {
        LineSettings {
            display_mode: DisplayMode::Graph,
            graph_groupby: groupby.map(String::from),
            graph_measure: Some("amount".into()),
            aggregator: agg,
            ..Default::default()
        }
    }

    #[test]
    fn grouped_sum_per_city() {
        let payload = build(&graph_settings(Some("city"), Aggregator::Sum), &sales_fields(), &sales());
        assert_eq!(payload.data.labels, vec!["Lyon", "Paris"]);
        assert_eq!(payload.data.datasets[0].data, vec![250.0, 150.0]);
        assert_eq!(payload.data.datasets[0].label, "Somme de Montant");
    }

    #[test]
    fn count_ignores_measure() {
        let payload =
            build(&graph_settings(Some("city"), Aggregator::Count), &sales_fields(), &sales());
        assert_eq!(payload.data.datasets[0].data, vec![3.0, 2.0]);
        assert_eq!(payload.data.datasets[0].label, "Nombre");
    }

    #[test]
    fn no_groupby_yields_single_total() {
        let payload = build(&graph_settings(None, Aggregator::Sum), &sales_fields(), &sales());
        assert_eq!(payload.data.labels, vec!["Total"]);
        assert_eq!(payload.data.datasets[0].data, vec![400.0]);
    }

    #[test]
    fn chart_type_and_flags_pass_through() {
        let mut settings = graph_settings(Some("city"), Aggregator::Sum);
        settings.chart_type = ChartType::Pie;
        settings.show_legend = false;
        let payload = build(&settings, &sales_fields(), &sales());
        assert_eq!(payload.chart_type, ChartType::Pie);
        assert!(!payload.show_legend);
    }

    #[test]
    fn empty_records_yield_empty_labels() {
        let payload = build(&graph_settings(Some("city"), Aggregator::Sum), &sales_fields(), &[]);
        assert!(payload.data.labels.is_empty());
        assert!(payload.data.datasets[0].data.is_empty());
    }
}
