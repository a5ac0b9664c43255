//! Chart rendering: aggregate → ECharts option → standalone HTML document.
//!
//! The option object is plain JSON so it can be inspected without touching
//! the filesystem ([`chart_option`]). [`render_chart`] embeds it in a page
//! that loads ECharts from a CDN and writes exactly one file.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use atags_parser::TagCorpus;
use serde_json::{Value, json};

use crate::aggregate::{Aggregate, BipartiteGraph, FlowSequence, FrequencyTable, NumericPoint, ProportionalLabel, aggregate};
use crate::error::{AnalyticsError, Result};
use crate::kind::ChartKind;

const ECHARTS_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts@5/dist/echarts.min.js";
const WORDCLOUD_SCRIPT: &str = "https://cdn.jsdelivr.net/npm/echarts-wordcloud@2/dist/echarts-wordcloud.min.js";

/// Aggregate the corpus for `kind` and write the chart to `output`.
///
/// Aggregation runs before the file is created, so a kind that fails to
/// aggregate (e.g. a numeric kind fed non-numeric tags) leaves no file behind.
pub fn generate_chart(corpus: &TagCorpus, kind: ChartKind, title: &str, output: &Path) -> Result<()> {
    let aggregate = aggregate(corpus, kind)?;
    render_chart(&aggregate, kind, title, output)
}

/// Render an aggregate as an HTML chart document at `output`.
///
/// The parent directory must already exist.
pub fn render_chart(aggregate: &Aggregate, kind: ChartKind, title: &str, output: &Path) -> Result<()> {
    let option = chart_option(aggregate, kind, title)?;
    let document = html_document(title, kind, &serde_json::to_string(&option)?);

    fs::write(output, document).map_err(|source| AnalyticsError::Io {
        path: output.to_path_buf(),
        source,
    })?;
    log::debug!("wrote {kind} chart to {}", output.display());
    Ok(())
}

/// Build the ECharts option object for `kind` from a matching aggregate.
pub fn chart_option(aggregate: &Aggregate, kind: ChartKind, title: &str) -> Result<Value> {
    let body = match (kind, aggregate) {
        (
            ChartKind::Bar
            | ChartKind::Line
            | ChartKind::Scatter
            | ChartKind::Area
            | ChartKind::Histogram,
            Aggregate::Frequency(table),
        ) => cartesian(kind, table),
        (ChartKind::Boxplot, Aggregate::Frequency(table)) => boxplot(table),
        (ChartKind::Radar, Aggregate::Frequency(table)) => radar(table),
        (ChartKind::Pie, Aggregate::Proportional(labels)) => pie(labels),
        (
            ChartKind::Doughnut
            | ChartKind::Gauge
            | ChartKind::Funnel
            | ChartKind::Wordcloud
            | ChartKind::Treemap,
            Aggregate::Numeric(points),
        ) => numeric(kind, points),
        (ChartKind::Heatmap, Aggregate::Bipartite(graph)) => heatmap(graph),
        (ChartKind::Graph, Aggregate::Bipartite(graph)) => force_graph(graph),
        (ChartKind::Tree, Aggregate::Bipartite(graph)) => tree(graph, title),
        (ChartKind::Sankey, Aggregate::Flow(flow)) => sankey(flow),
        (kind, aggregate) => {
            return Err(AnalyticsError::ShapeMismatch {
                kind: kind.to_string(),
                shape: aggregate.shape_name(),
            });
        }
    };

    let mut option = json!({
        "title": { "text": title },
        "tooltip": {},
    });
    if let (Value::Object(option), Value::Object(body)) = (&mut option, body) {
        option.extend(body);
    }
    Ok(option)
}

// =============================================================================
// Per-kind options
// =============================================================================

fn cartesian(kind: ChartKind, table: &FrequencyTable) -> Value {
    let tags: Vec<&str> = table.entries().iter().map(|e| e.tag.as_str()).collect();
    let counts: Vec<usize> = table.entries().iter().map(|e| e.count).collect();

    let mut series = json!({ "name": "Count", "data": counts });
    match kind {
        ChartKind::Line => series["type"] = json!("line"),
        ChartKind::Scatter => series["type"] = json!("scatter"),
        ChartKind::Area => {
            series["type"] = json!("line");
            series["areaStyle"] = json!({});
        }
        ChartKind::Histogram => {
            series["type"] = json!("bar");
            series["barCategoryGap"] = json!("0%");
        }
        _ => series["type"] = json!("bar"),
    }

    json!({
        "legend": {},
        "xAxis": { "type": "category", "data": tags },
        "yAxis": { "type": "value" },
        "series": [series],
    })
}

fn boxplot(table: &FrequencyTable) -> Value {
    let counts: Vec<usize> = table.entries().iter().map(|e| e.count).collect();
    let data: Vec<[f64; 5]> = five_number_summary(&counts).into_iter().collect();

    json!({
        "xAxis": { "type": "category", "data": ["Tag count"] },
        "yAxis": { "type": "value" },
        "series": [{ "name": "Count", "type": "boxplot", "data": data }],
    })
}

fn radar(table: &FrequencyTable) -> Value {
    let max = table.max_count().max(1);
    let indicator: Vec<Value> = table
        .entries()
        .iter()
        .map(|e| json!({ "name": e.tag, "max": max }))
        .collect();
    let counts: Vec<usize> = table.entries().iter().map(|e| e.count).collect();

    json!({
        "radar": { "indicator": indicator },
        "series": [{
            "name": "Count",
            "type": "radar",
            "data": [{ "name": "Count", "value": counts }],
        }],
    })
}

fn pie(labels: &[ProportionalLabel]) -> Value {
    let data: Vec<Value> = labels
        .iter()
        .map(|l| {
            json!({
                "name": l.tag,
                "value": l.count,
                "label": { "formatter": format!("{}: {} ({})", l.tag, l.count, l.label) },
            })
        })
        .collect();

    json!({
        "legend": {},
        "series": [{
            "name": "Count",
            "type": "pie",
            "radius": "60%",
            "label": { "show": true },
            "data": data,
        }],
    })
}

fn numeric(kind: ChartKind, points: &[NumericPoint]) -> Value {
    let data: Vec<Value> = points
        .iter()
        .map(|p| json!({ "name": p.name, "value": p.value }))
        .collect();

    let mut series = match kind {
        ChartKind::Doughnut => json!({ "type": "pie", "radius": ["40%", "70%"], "data": data }),
        ChartKind::Gauge => json!({ "type": "gauge", "data": data }),
        ChartKind::Funnel => json!({ "type": "funnel", "sort": "descending", "data": data }),
        ChartKind::Wordcloud => json!({ "type": "wordCloud", "shape": "circle", "data": data }),
        _ => json!({ "type": "treemap", "data": data }),
    };
    series["name"] = json!("Data");

    json!({ "series": [series] })
}

fn heatmap(graph: &BipartiteGraph) -> Value {
    let tags: Vec<&str> = graph.tag_names().collect();
    let entities: Vec<&str> = graph.entity_names().collect();
    let x: HashMap<&str, usize> = tags.iter().enumerate().map(|(i, t)| (*t, i)).collect();
    let y: HashMap<&str, usize> = entities.iter().enumerate().map(|(i, e)| (*e, i)).collect();

    let data: Vec<[usize; 3]> = graph
        .edges()
        .iter()
        .filter_map(|e| Some([*x.get(e.target.as_str())?, *y.get(e.source.as_str())?, e.weight]))
        .collect();

    json!({
        "xAxis": { "type": "category", "data": tags, "splitArea": { "show": true } },
        "yAxis": { "type": "category", "data": entities, "splitArea": { "show": true } },
        "visualMap": {
            "min": 0,
            "max": graph.max_edge_weight().max(1),
            "calculable": true,
            "orient": "horizontal",
            "left": "center",
            "bottom": 0,
            "inRange": { "color": ["#50a3ba", "#eac736", "#d94e5d"] },
        },
        "series": [{ "name": "Occurrences", "type": "heatmap", "data": data, "label": { "show": true } }],
    })
}

fn force_graph(graph: &BipartiteGraph) -> Value {
    let nodes: Vec<Value> = graph
        .nodes()
        .iter()
        .map(|n| {
            let category = match (n.role.is_entity(), n.role.is_tag()) {
                (true, true) => 2,
                (true, false) => 0,
                _ => 1,
            };
            json!({
                "name": n.name,
                "value": n.weight,
                "category": category,
                "symbolSize": 10 + 4 * n.weight.min(10),
            })
        })
        .collect();
    let links: Vec<Value> = graph
        .edges()
        .iter()
        .map(|e| json!({ "source": e.source, "target": e.target, "value": e.weight }))
        .collect();

    json!({
        "legend": {},
        "series": [{
            "name": "Data",
            "type": "graph",
            "layout": "force",
            "roam": true,
            "label": { "show": true, "position": "right" },
            "force": { "repulsion": 120 },
            "categories": [{ "name": "Rule" }, { "name": "Tag" }, { "name": "Rule/Tag" }],
            "data": nodes,
            "links": links,
        }],
    })
}

fn tree(graph: &BipartiteGraph, title: &str) -> Value {
    let mut children: HashMap<&str, Vec<Value>> = HashMap::new();
    for edge in graph.edges() {
        children
            .entry(edge.source.as_str())
            .or_default()
            .push(json!({ "name": edge.target, "value": edge.weight }));
    }

    let rules: Vec<Value> = graph
        .entity_names()
        .map(|name| json!({ "name": name, "children": children.remove(name).unwrap_or_default() }))
        .collect();

    json!({
        "series": [{
            "type": "tree",
            "data": [{ "name": title, "children": rules }],
            "top": "5%",
            "left": "10%",
            "bottom": "5%",
            "right": "20%",
            "label": { "position": "left", "verticalAlign": "middle", "align": "right" },
            "leaves": { "label": { "position": "right", "verticalAlign": "middle", "align": "left" } },
            "initialTreeDepth": 2,
        }],
    })
}

fn sankey(flow: &FlowSequence) -> Value {
    let nodes: Vec<Value> = flow.nodes().iter().map(|n| json!({ "name": n })).collect();
    let links: Vec<Value> = flow
        .links()
        .iter()
        .map(|l| {
            json!({
                "source": flow.nodes()[l.source],
                "target": flow.nodes()[l.target],
                "value": l.value,
            })
        })
        .collect();

    json!({
        "series": [{
            "name": "sankey",
            "type": "sankey",
            "data": nodes,
            "links": links,
            "label": { "show": true },
            "lineStyle": { "color": "source", "curveness": 0.5 },
        }],
    })
}

// =============================================================================
// Helpers
// =============================================================================

/// `[min, Q1, median, Q3, max]` with linear interpolation between ranks.
fn five_number_summary(values: &[usize]) -> Option<[f64; 5]> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().map(|&v| v as f64).collect();
    sorted.sort_by(f64::total_cmp);

    let quantile = |q: f64| {
        let rank = q * (sorted.len() - 1) as f64;
        let lo = rank.floor() as usize;
        let hi = rank.ceil() as usize;
        sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
    };
    Some([
        sorted[0],
        quantile(0.25),
        quantile(0.5),
        quantile(0.75),
        sorted[sorted.len() - 1],
    ])
}

fn html_document(title: &str, kind: ChartKind, option_json: &str) -> String {
    let mut scripts = format!(r#"<script src="{ECHARTS_SCRIPT}"></script>"#);
    if kind == ChartKind::Wordcloud {
        scripts.push_str(&format!("\n    <script src=\"{WORDCLOUD_SCRIPT}\"></script>"));
    }
    // keep the JSON from closing the surrounding script element
    let option_json = option_json.replace("</", "<\\/");

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    {scripts}
</head>
<body>
    <div id="chart" style="width:900px;height:600px;"></div>
    <script type="text/javascript">
        var chart = echarts.init(document.getElementById("chart"), null, {{renderer: "canvas"}});
        var option = {option_json};
        chart.setOption(option);
    </script>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagCorpus {
        TagCorpus::from_pairs([("Rule1", vec!["tag1", "tag3"]), ("Rule2", vec!["tag1", "tag2"])])
    }

    fn option_for(kind: ChartKind) -> Value {
        let aggregate = aggregate(&sample(), kind).unwrap();
        chart_option(&aggregate, kind, "Tags").unwrap()
    }

    #[test]
    fn bar_uses_counts_as_heights() {
        let option = option_for(ChartKind::Bar);
        assert_eq!(option["title"]["text"], "Tags");
        assert_eq!(option["xAxis"]["data"], json!(["tag1", "tag3", "tag2"]));
        assert_eq!(option["series"][0]["type"], "bar");
        assert_eq!(option["series"][0]["data"], json!([2, 1, 1]));
    }

    #[test]
    fn area_is_filled_line() {
        let option = option_for(ChartKind::Area);
        assert_eq!(option["series"][0]["type"], "line");
        assert!(option["series"][0]["areaStyle"].is_object());
    }

    #[test]
    fn pie_slices_carry_percentage_labels() {
        let option = option_for(ChartKind::Pie);
        let first = &option["series"][0]["data"][0];
        assert_eq!(first["name"], "tag1");
        assert_eq!(first["value"], 2);
        assert_eq!(first["label"]["formatter"], "tag1: 2 (50.00%)");
    }

    #[test]
    fn graph_nodes_and_links() {
        let option = option_for(ChartKind::Graph);
        let series = &option["series"][0];
        assert_eq!(series["data"].as_array().unwrap().len(), 5);
        assert_eq!(series["links"].as_array().unwrap().len(), 4);
        assert_eq!(series["links"][0], json!({ "source": "Rule1", "target": "tag1", "value": 1 }));
    }

    #[test]
    fn heatmap_cells_index_axes() {
        let option = option_for(ChartKind::Heatmap);
        assert_eq!(option["xAxis"]["data"], json!(["tag1", "tag3", "tag2"]));
        assert_eq!(option["yAxis"]["data"], json!(["Rule1", "Rule2"]));
        assert_eq!(
            option["series"][0]["data"],
            json!([[0, 0, 1], [1, 0, 1], [0, 1, 1], [2, 1, 1]])
        );
    }

    #[test]
    fn tree_roots_at_title() {
        let option = option_for(ChartKind::Tree);
        let root = &option["series"][0]["data"][0];
        assert_eq!(root["name"], "Tags");
        assert_eq!(root["children"][1]["name"], "Rule2");
        assert_eq!(root["children"][1]["children"][1]["name"], "tag2");
    }

    #[test]
    fn sankey_links_use_node_names() {
        let corpus = TagCorpus::from_pairs([("R", vec!["a", "b", "c"])]);
        let aggregate = aggregate(&corpus, ChartKind::Sankey).unwrap();
        let option = chart_option(&aggregate, ChartKind::Sankey, "Flow").unwrap();
        assert_eq!(option["series"][0]["links"][1], json!({ "source": "b", "target": "c", "value": 1 }));
    }

    #[test]
    fn radar_indicators_scale_to_max() {
        let option = option_for(ChartKind::Radar);
        assert_eq!(option["radar"]["indicator"][0], json!({ "name": "tag1", "max": 2 }));
        assert_eq!(option["series"][0]["data"][0]["value"], json!([2, 1, 1]));
    }

    #[test]
    fn boxplot_summary() {
        assert_eq!(five_number_summary(&[]), None);
        assert_eq!(five_number_summary(&[4]), Some([4.0; 5]));
        assert_eq!(five_number_summary(&[1, 2, 3, 4, 5]), Some([1.0, 2.0, 3.0, 4.0, 5.0]));
        assert_eq!(five_number_summary(&[2, 1, 1]), Some([1.0, 1.0, 1.0, 1.5, 2.0]));
    }

    #[test]
    fn funnel_sums_numeric_tags() {
        let corpus = TagCorpus::from_pairs([("Stage A", vec!["10", "5"]), ("Stage B", vec!["3"])]);
        let aggregate = aggregate(&corpus, ChartKind::Funnel).unwrap();
        let option = chart_option(&aggregate, ChartKind::Funnel, "Funnel").unwrap();
        assert_eq!(option["series"][0]["type"], "funnel");
        assert_eq!(option["series"][0]["data"][0], json!({ "name": "Stage A", "value": 15.0 }));
    }

    #[test]
    fn mismatched_shape_is_rejected() {
        let aggregate = aggregate(&sample(), ChartKind::Bar).unwrap();
        let err = chart_option(&aggregate, ChartKind::Graph, "x").unwrap_err();
        assert!(matches!(err, AnalyticsError::ShapeMismatch { shape: "frequency", .. }));
    }

    #[test]
    fn document_escapes_title_and_script_close() {
        let html = html_document("<Rules & Tags>", ChartKind::Bar, r#"{"a":"</script>"}"#);
        assert!(html.contains("<title>&lt;Rules &amp; Tags&gt;</title>"));
        assert!(html.contains(r#"{"a":"<\/script>"}"#));
        assert!(!html.contains("echarts-wordcloud"));
    }

    #[test]
    fn wordcloud_document_loads_extension() {
        let html = html_document("Words", ChartKind::Wordcloud, "{}");
        assert!(html.contains("echarts-wordcloud"));
    }
}
