//! Tag aggregation: derive the summary each chart kind is drawn from.
//!
//! Every aggregate is a pure function of the corpus. Orders are
//! deterministic: entities follow corpus order, tags follow the order they
//! are first seen while walking the corpus.

use std::collections::HashMap;

use atags_parser::TagCorpus;
use serde::Serialize;

use crate::error::{AnalyticsError, Result};
use crate::kind::{ChartKind, NumericMode, Shape};

// =============================================================================
// Aggregate shapes
// =============================================================================

/// The derived summary handed to the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", content = "data", rename_all = "lowercase")]
pub enum Aggregate {
    Frequency(FrequencyTable),
    Proportional(Vec<ProportionalLabel>),
    Bipartite(BipartiteGraph),
    Flow(FlowSequence),
    Numeric(Vec<NumericPoint>),
}

impl Aggregate {
    pub fn shape_name(&self) -> &'static str {
        match self {
            Aggregate::Frequency(_) => "frequency",
            Aggregate::Proportional(_) => "proportional",
            Aggregate::Bipartite(_) => "bipartite",
            Aggregate::Flow(_) => "flow",
            Aggregate::Numeric(_) => "numeric",
        }
    }
}

/// Compute the aggregate `kind` is drawn from.
///
/// Only the numeric-dependent kinds can fail: the first tag that does not
/// parse aborts the whole aggregation with [`AnalyticsError::Encoding`].
///
/// ```rust
/// use atags_analytics::{Aggregate, ChartKind, aggregate};
/// use atags_parser::TagCorpus;
///
/// let corpus = TagCorpus::from_pairs([("Rule1", vec!["tag1", "tag3"]), ("Rule2", vec!["tag1", "tag2"])]);
/// let Aggregate::Bipartite(graph) = aggregate(&corpus, ChartKind::Graph).unwrap() else {
///     unreachable!()
/// };
/// assert_eq!(graph.nodes().len(), 5);
/// assert_eq!(graph.edges().len(), 4);
/// ```
pub fn aggregate(corpus: &TagCorpus, kind: ChartKind) -> Result<Aggregate> {
    Ok(match kind.shape() {
        Shape::Frequency => Aggregate::Frequency(FrequencyTable::from_corpus(corpus)),
        Shape::Proportional => Aggregate::Proportional(proportional_labels(corpus)),
        Shape::Bipartite => Aggregate::Bipartite(BipartiteGraph::from_corpus(corpus)),
        Shape::Flow => Aggregate::Flow(FlowSequence::from_corpus(corpus)),
        Shape::Numeric(mode) => Aggregate::Numeric(numeric_series(corpus, mode)?),
    })
}

/// Like [`aggregate`], with the kind given by name.
pub fn aggregate_named(corpus: &TagCorpus, kind: &str) -> Result<Aggregate> {
    aggregate(corpus, kind.parse()?)
}

// =============================================================================
// Frequency table
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

/// Tag → number of occurrences across the corpus, in first-seen tag order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FrequencyTable {
    entries: Vec<TagCount>,
}

impl FrequencyTable {
    pub fn from_corpus(corpus: &TagCorpus) -> Self {
        let mut slots: HashMap<&str, usize> = HashMap::new();
        let mut entries: Vec<TagCount> = Vec::new();

        for entity in corpus {
            for tag in &entity.tags {
                match slots.get(tag.as_str()) {
                    Some(&slot) => entries[slot].count += 1,
                    None => {
                        slots.insert(tag, entries.len());
                        entries.push(TagCount {
                            tag: tag.clone(),
                            count: 1,
                        });
                    }
                }
            }
        }

        FrequencyTable { entries }
    }

    pub fn entries(&self) -> &[TagCount] {
        &self.entries
    }

    pub fn get(&self, tag: &str) -> Option<usize> {
        self.entries.iter().find(|e| e.tag == tag).map(|e| e.count)
    }

    /// Sum of all counts; equals the corpus' tag occurrence count.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn max_count(&self) -> usize {
        self.entries.iter().map(|e| e.count).max().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries by descending count. Equal counts keep first-seen order.
    pub fn by_count(&self) -> Vec<&TagCount> {
        let mut sorted: Vec<&TagCount> = self.entries.iter().collect();
        sorted.sort_by(|a, b| b.count.cmp(&a.count));
        sorted
    }
}

// =============================================================================
// Proportional labels
// =============================================================================

/// A tag's share of all tag occurrences.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProportionalLabel {
    pub tag: String,
    pub count: usize,
    pub percentage: f64,
    /// `percentage` formatted with two decimals, e.g. `"50.00%"`.
    pub label: String,
}

pub fn proportional_labels(corpus: &TagCorpus) -> Vec<ProportionalLabel> {
    let table = FrequencyTable::from_corpus(corpus);
    let total = table.total();

    table
        .entries
        .into_iter()
        .map(|TagCount { tag, count }| {
            let percentage = count as f64 * 100.0 / total as f64;
            ProportionalLabel {
                tag,
                count,
                percentage,
                label: format!("{percentage:.2}%"),
            }
        })
        .collect()
}

// =============================================================================
// Weighted bipartite graph
// =============================================================================

/// Which side of the graph a node belongs to. A name used both as an entity
/// and as a tag gets a single node with role `Both`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Entity,
    Tag,
    Both,
}

impl NodeRole {
    fn merge(self, other: NodeRole) -> NodeRole {
        if self == other { self } else { NodeRole::Both }
    }

    pub fn is_entity(self) -> bool {
        matches!(self, NodeRole::Entity | NodeRole::Both)
    }

    pub fn is_tag(self) -> bool {
        matches!(self, NodeRole::Tag | NodeRole::Both)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphNode {
    pub name: String,
    pub role: NodeRole,
    /// Tag occurrences touching this node.
    pub weight: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    /// Entity name.
    pub source: String,
    /// Tag name.
    pub target: String,
    /// Occurrences of the tag in the entity's tag list.
    pub weight: usize,
}

/// Entities and tags as nodes, one edge per distinct (entity, tag) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BipartiteGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl BipartiteGraph {
    pub fn from_corpus(corpus: &TagCorpus) -> Self {
        let mut graph = BipartiteGraph::default();
        let mut seen: HashMap<String, usize> = HashMap::new();

        for entity in corpus {
            graph.touch(&mut seen, &entity.name, NodeRole::Entity, entity.tags.len());

            let mut edge_slots: HashMap<&str, usize> = HashMap::new();
            for tag in &entity.tags {
                graph.touch(&mut seen, tag, NodeRole::Tag, 1);

                // a rule tagged with its own name would only draw a loop
                if *tag == entity.name {
                    continue;
                }
                match edge_slots.get(tag.as_str()) {
                    Some(&slot) => graph.edges[slot].weight += 1,
                    None => {
                        edge_slots.insert(tag, graph.edges.len());
                        graph.edges.push(GraphEdge {
                            source: entity.name.clone(),
                            target: tag.clone(),
                            weight: 1,
                        });
                    }
                }
            }
        }

        graph
    }

    fn touch(&mut self, seen: &mut HashMap<String, usize>, name: &str, role: NodeRole, weight: usize) {
        match seen.get(name) {
            Some(&slot) => {
                let node = &mut self.nodes[slot];
                node.role = node.role.merge(role);
                node.weight += weight;
            }
            None => {
                seen.insert(name.to_string(), self.nodes.len());
                self.nodes.push(GraphNode {
                    name: name.to_string(),
                    role,
                    weight,
                });
            }
        }
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn entity_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.role.is_entity())
            .map(|n| n.name.as_str())
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|n| n.role.is_tag())
            .map(|n| n.name.as_str())
    }

    pub fn max_edge_weight(&self) -> usize {
        self.edges.iter().map(|e| e.weight).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// =============================================================================
// Flow sequence
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLink {
    /// Index into [`FlowSequence::nodes`].
    pub source: usize,
    pub target: usize,
    /// Number of times the pair was seen.
    pub value: usize,
}

/// Consecutive tag pairs `tags[i] → tags[i + 1]` of every entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlowSequence {
    nodes: Vec<String>,
    links: Vec<FlowLink>,
}

impl FlowSequence {
    pub fn from_corpus(corpus: &TagCorpus) -> Self {
        let mut flow = FlowSequence::default();
        let mut ids: HashMap<&str, usize> = HashMap::new();
        let mut link_slots: HashMap<(usize, usize), usize> = HashMap::new();

        for entity in corpus {
            for pair in entity.tags.windows(2) {
                // flow diagrams cannot draw a node feeding itself
                if pair[0] == pair[1] {
                    continue;
                }
                let source = flow.node_id(&mut ids, &pair[0]);
                let target = flow.node_id(&mut ids, &pair[1]);
                match link_slots.get(&(source, target)) {
                    Some(&slot) => flow.links[slot].value += 1,
                    None => {
                        link_slots.insert((source, target), flow.links.len());
                        flow.links.push(FlowLink {
                            source,
                            target,
                            value: 1,
                        });
                    }
                }
            }
        }

        flow
    }

    fn node_id<'a>(&mut self, ids: &mut HashMap<&'a str, usize>, name: &'a str) -> usize {
        *ids.entry(name).or_insert_with(|| {
            self.nodes.push(name.to_string());
            self.nodes.len() - 1
        })
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn links(&self) -> &[FlowLink] {
        &self.links
    }
}

// =============================================================================
// Numeric series
// =============================================================================

/// A named value for the chart kinds that plot tag values directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericPoint {
    pub name: String,
    pub value: f64,
}

pub fn numeric_series(corpus: &TagCorpus, mode: NumericMode) -> Result<Vec<NumericPoint>> {
    let mut points = Vec::new();

    for entity in corpus {
        match mode {
            NumericMode::SumPerEntity => {
                let mut sum = 0.0;
                for tag in &entity.tags {
                    sum += parse_float(tag)?;
                }
                points.push(NumericPoint {
                    name: entity.name.clone(),
                    value: sum,
                });
            }
            NumericMode::PerTag => {
                for tag in &entity.tags {
                    points.push(NumericPoint {
                        name: entity.name.clone(),
                        value: parse_float(tag)?,
                    });
                }
            }
            NumericMode::PerTagInteger => {
                for tag in &entity.tags {
                    points.push(NumericPoint {
                        name: entity.name.clone(),
                        value: parse_integer(tag)? as f64,
                    });
                }
            }
        }
    }

    Ok(points)
}

/// Parse as a single-precision float; finite values beyond the `f32` range
/// are rejected rather than saturating to infinity.
fn parse_float(tag: &str) -> Result<f64> {
    let wide = tag.parse::<f64>().map_err(|e| AnalyticsError::Encoding {
        value: tag.to_string(),
        reason: e.to_string(),
    })?;
    let narrow = wide as f32;
    if narrow.is_infinite() && wide.is_finite() {
        return Err(AnalyticsError::Encoding {
            value: tag.to_string(),
            reason: "value out of range for a 32-bit float".to_string(),
        });
    }
    Ok(f64::from(narrow))
}

fn parse_integer(tag: &str) -> Result<i64> {
    tag.parse::<i64>().map_err(|e| AnalyticsError::Encoding {
        value: tag.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TagCorpus {
        TagCorpus::from_pairs([("Rule1", vec!["tag1", "tag3"]), ("Rule2", vec!["tag1", "tag2"])])
    }

    #[test]
    fn frequency_scenario() {
        let table = FrequencyTable::from_corpus(&sample());
        let pairs: Vec<(&str, usize)> = table.entries().iter().map(|e| (e.tag.as_str(), e.count)).collect();
        assert_eq!(pairs, [("tag1", 2), ("tag3", 1), ("tag2", 1)]);
        assert_eq!(table.total(), 4);
        assert_eq!(table.max_count(), 2);
    }

    #[test]
    fn frequency_sum_equals_occurrences() {
        let corpus = TagCorpus::from_pairs([
            ("A", vec!["x", "x", "y"]),
            ("B", vec![]),
            ("C", vec!["y", "z", "x"]),
        ]);
        let table = FrequencyTable::from_corpus(&corpus);
        assert_eq!(table.total(), corpus.tag_occurrences());
        assert_eq!(table.get("x"), Some(3));
        assert_eq!(table.get("missing"), None);
    }

    #[test]
    fn by_count_breaks_ties_by_first_seen() {
        let corpus = TagCorpus::from_pairs([("A", vec!["b", "a", "c", "c"])]);
        let table = FrequencyTable::from_corpus(&corpus);
        let order: Vec<&str> = table.by_count().iter().map(|e| e.tag.as_str()).collect();
        assert_eq!(order, ["c", "b", "a"]);
    }

    #[test]
    fn bipartite_scenario() {
        let graph = BipartiteGraph::from_corpus(&sample());

        let nodes: Vec<&str> = graph.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(nodes, ["Rule1", "tag1", "tag3", "Rule2", "tag2"]);

        let edges: Vec<(&str, &str)> = graph
            .edges()
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect();
        assert_eq!(
            edges,
            [("Rule1", "tag1"), ("Rule1", "tag3"), ("Rule2", "tag1"), ("Rule2", "tag2")]
        );

        let tag1 = graph.nodes().iter().find(|n| n.name == "tag1").unwrap();
        assert_eq!(tag1.role, NodeRole::Tag);
        assert_eq!(tag1.weight, 2);
        assert_eq!(graph.entity_names().collect::<Vec<_>>(), ["Rule1", "Rule2"]);
        assert_eq!(graph.tag_names().collect::<Vec<_>>(), ["tag1", "tag3", "tag2"]);
    }

    #[test]
    fn bipartite_dedupes_repeated_tags_per_entity() {
        let corpus = TagCorpus::from_pairs([("R", vec!["a", "a", "b"])]);
        let graph = BipartiteGraph::from_corpus(&corpus);

        assert_eq!(graph.nodes().len(), 3);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edges()[0].weight, 2);
        assert_eq!(graph.max_edge_weight(), 2);
    }

    #[test]
    fn bipartite_shared_name_is_one_node() {
        let corpus = TagCorpus::from_pairs([("A", vec!["B"]), ("B", vec!["A", "B"])]);
        let graph = BipartiteGraph::from_corpus(&corpus);

        assert_eq!(graph.nodes().len(), 2);
        assert!(graph.nodes().iter().all(|n| n.role == NodeRole::Both));
        // B -> B is dropped
        assert_eq!(graph.edges().len(), 2);
    }

    #[test]
    fn flow_links_consecutive_pairs() {
        let corpus = TagCorpus::from_pairs([
            ("R1", vec!["recon", "exec", "persist"]),
            ("R2", vec!["recon", "exec"]),
            ("R3", vec!["solo"]),
            ("R4", vec!["loop", "loop"]),
        ]);
        let flow = FlowSequence::from_corpus(&corpus);

        assert_eq!(flow.nodes(), ["recon", "exec", "persist"]);
        assert_eq!(
            flow.links(),
            [
                FlowLink { source: 0, target: 1, value: 2 },
                FlowLink { source: 1, target: 2, value: 1 },
            ]
        );
    }

    #[test]
    fn proportional_percentages() {
        let labels = proportional_labels(&sample());
        let rendered: Vec<(&str, usize, &str)> = labels
            .iter()
            .map(|l| (l.tag.as_str(), l.count, l.label.as_str()))
            .collect();
        assert_eq!(
            rendered,
            [("tag1", 2, "50.00%"), ("tag3", 1, "25.00%"), ("tag2", 1, "25.00%")]
        );
        let total: f64 = labels.iter().map(|l| l.percentage).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }

    #[test]
    fn numeric_sum_per_entity() {
        let corpus = TagCorpus::from_pairs([("A", vec!["1.5", "2"]), ("B", vec![])]);
        let points = numeric_series(&corpus, NumericMode::SumPerEntity).unwrap();
        assert_eq!(
            points,
            [
                NumericPoint { name: "A".into(), value: 3.5 },
                NumericPoint { name: "B".into(), value: 0.0 },
            ]
        );
    }

    #[test]
    fn numeric_aborts_on_first_bad_value() {
        let corpus = TagCorpus::from_pairs([("A", vec!["1", "attack.t1059", "oops"])]);
        let err = numeric_series(&corpus, NumericMode::PerTag).unwrap_err();
        assert!(
            matches!(err, AnalyticsError::Encoding { ref value, .. } if value == "attack.t1059"),
            "got: {err}"
        );
    }

    #[test]
    fn float_values_use_single_precision_range() {
        let corpus = TagCorpus::from_pairs([("A", vec!["3.4e38", "0.1"])]);
        let points = numeric_series(&corpus, NumericMode::PerTag).unwrap();
        assert!(points[0].value.is_finite() && points[0].value > 3.3e38);
        assert_eq!(points[1].value, f64::from(0.1_f32));

        let corpus = TagCorpus::from_pairs([("B", vec!["1e39"])]);
        let err = numeric_series(&corpus, NumericMode::SumPerEntity).unwrap_err();
        assert!(
            matches!(err, AnalyticsError::Encoding { ref value, ref reason } if value == "1e39" && reason.contains("out of range")),
            "got: {err}"
        );
    }

    #[test]
    fn integer_mode_rejects_fractions() {
        let corpus = TagCorpus::from_pairs([("A", vec!["3", "2.5"])]);
        let err = numeric_series(&corpus, NumericMode::PerTagInteger).unwrap_err();
        assert!(matches!(err, AnalyticsError::Encoding { ref value, .. } if value == "2.5"));
    }

    #[test]
    fn aggregate_is_deterministic() {
        let corpus = sample();
        for kind in ChartKind::ALL.into_iter().filter(|k| !k.is_numeric()) {
            assert_eq!(aggregate(&corpus, kind).unwrap(), aggregate(&corpus, kind).unwrap());
        }
    }

    #[test]
    fn aggregate_named_rejects_unknown_kind() {
        let err = aggregate_named(&sample(), "unsupported-kind").unwrap_err();
        assert!(matches!(err, AnalyticsError::UnsupportedKind(ref k) if k == "unsupported-kind"));
    }

    #[test]
    fn empty_corpus_aggregates_are_empty() {
        let corpus = TagCorpus::new();
        for kind in ChartKind::ALL {
            match aggregate(&corpus, kind).unwrap() {
                Aggregate::Frequency(t) => assert!(t.is_empty()),
                Aggregate::Proportional(p) => assert!(p.is_empty()),
                Aggregate::Bipartite(g) => assert!(g.is_empty() && g.edges().is_empty()),
                Aggregate::Flow(f) => assert!(f.nodes().is_empty() && f.links().is_empty()),
                Aggregate::Numeric(n) => assert!(n.is_empty()),
            }
        }
    }
}
