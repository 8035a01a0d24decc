//! Structural validation and traversal of figures.

use std::collections::{HashMap, HashSet};

use patternkit_core::{MalformedFigureError, Result};

use super::{EdgeKind, Figure, FigureEdge, FigureNode, Point};
use crate::primitives::Segment;

/// O(1) node lookup by id, borrowed from a figure.
#[derive(Debug, Clone)]
pub struct NodeIndex<'a> {
    nodes: &'a [FigureNode],
    by_id: HashMap<&'a str, usize>,
}

impl<'a> NodeIndex<'a> {
    pub fn new(nodes: &'a [FigureNode]) -> Self {
        let mut by_id = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            // first occurrence wins; duplicates are reported by `validate`
            by_id.entry(node.id.as_str()).or_insert(i);
        }
        Self { nodes, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&'a FigureNode> {
        self.by_id.get(id).map(|&i| &self.nodes[i])
    }

    pub fn position_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Geometry of an edge, `None` when an endpoint is missing.
    pub fn segment(&self, edge: &FigureEdge) -> Option<Segment> {
        let a = self.get(&edge.from)?;
        let b = self.get(&edge.to)?;
        Some(match edge.kind {
            EdgeKind::Line => Segment::Line {
                from: a.position(),
                to: b.position(),
            },
            EdgeKind::Cubic => Segment::Cubic {
                from: a.position(),
                ctrl1: a.out_control(),
                ctrl2: b.in_control(),
                to: b.position(),
            },
        })
    }
}

fn finite_handle(h: &Option<Point>) -> bool {
    h.map_or(true, |p| p.is_finite())
}

/// Checks the structural invariants of a figure without repairing anything.
///
/// Open figures only need unique ids, resolvable edges and finite
/// coordinates. Closed figures must additionally form one directed cycle that
/// visits every node exactly once.
pub fn validate(figure: &Figure) -> Result<()> {
    let mut seen = HashSet::with_capacity(figure.nodes.len());
    for node in &figure.nodes {
        if !seen.insert(node.id.as_str()) {
            return Err(MalformedFigureError::DuplicateNodeId {
                id: node.id.clone(),
            }
            .into());
        }
        if !node.position().is_finite()
            || !finite_handle(&node.in_handle)
            || !finite_handle(&node.out_handle)
        {
            return Err(MalformedFigureError::NonFiniteCoordinate {
                node_id: node.id.clone(),
            }
            .into());
        }
    }

    let mut edge_ids = HashSet::with_capacity(figure.edges.len());
    for edge in &figure.edges {
        if !edge_ids.insert(edge.id.as_str()) {
            return Err(MalformedFigureError::DuplicateEdgeId {
                id: edge.id.clone(),
            }
            .into());
        }
        for end in [&edge.from, &edge.to] {
            if !seen.contains(end.as_str()) {
                return Err(MalformedFigureError::MissingNode {
                    edge_id: edge.id.clone(),
                    node_id: end.clone(),
                }
                .into());
            }
        }
    }

    if figure.closed {
        walk_cycle(figure)?;
    }
    Ok(())
}

fn broken_cycle(figure: &Figure, reason: impl Into<String>) -> MalformedFigureError {
    MalformedFigureError::BrokenCycle {
        figure_id: figure.id.clone(),
        reason: reason.into(),
    }
}

fn broken_path(figure: &Figure, reason: impl Into<String>) -> MalformedFigureError {
    MalformedFigureError::BrokenPath {
        figure_id: figure.id.clone(),
        reason: reason.into(),
    }
}

/// Outgoing edge per node, failing on branching.
fn outgoing<'a>(
    figure: &'a Figure,
    on_branch: impl Fn(&str) -> MalformedFigureError,
) -> Result<HashMap<&'a str, &'a FigureEdge>> {
    let mut out = HashMap::with_capacity(figure.edges.len());
    for edge in &figure.edges {
        if out.insert(edge.from.as_str(), edge).is_some() {
            return Err(on_branch(&edge.from).into());
        }
    }
    Ok(out)
}

fn walk_cycle(figure: &Figure) -> Result<Vec<&FigureEdge>> {
    if figure.edges.len() != figure.nodes.len() {
        return Err(broken_cycle(
            figure,
            format!(
                "{} edges for {} nodes",
                figure.edges.len(),
                figure.nodes.len()
            ),
        )
        .into());
    }
    let Some(first) = figure.nodes.first() else {
        return Ok(Vec::new());
    };

    let out = outgoing(figure, |id| {
        broken_cycle(figure, format!("node {} has more than one outgoing edge", id))
    })?;

    let mut visited = HashSet::with_capacity(figure.nodes.len());
    let mut ordered = Vec::with_capacity(figure.edges.len());
    let mut current = first.id.as_str();
    for _ in 0..figure.nodes.len() {
        if !visited.insert(current) {
            return Err(broken_cycle(figure, format!("node {} visited twice", current)).into());
        }
        let edge = out
            .get(current)
            .ok_or_else(|| broken_cycle(figure, format!("node {} has no outgoing edge", current)))?;
        ordered.push(*edge);
        current = edge.to.as_str();
    }
    if current != first.id {
        return Err(broken_cycle(figure, "walk does not return to the first node").into());
    }
    Ok(ordered)
}

fn walk_path(figure: &Figure) -> Result<Vec<&FigureEdge>> {
    if figure.edges.is_empty() {
        return Ok(Vec::new());
    }
    let out = outgoing(figure, |id| {
        broken_path(figure, format!("node {} has more than one outgoing edge", id))
    })?;

    let mut incoming: HashMap<&str, usize> = HashMap::new();
    for edge in &figure.edges {
        *incoming.entry(edge.to.as_str()).or_default() += 1;
    }
    if let Some((id, _)) = incoming.iter().find(|(_, &n)| n > 1) {
        return Err(broken_path(figure, format!("node {} has more than one incoming edge", id)).into());
    }

    // the start is the only tail without an incoming edge
    let start = figure
        .edges
        .iter()
        .find(|e| !incoming.contains_key(e.from.as_str()))
        .ok_or_else(|| broken_path(figure, "edges form a loop"))?;

    let mut ordered = Vec::with_capacity(figure.edges.len());
    let mut current = start.from.as_str();
    while let Some(edge) = out.get(current) {
        if ordered.len() == figure.edges.len() {
            return Err(broken_path(figure, "edges form a loop").into());
        }
        ordered.push(*edge);
        current = edge.to.as_str();
    }
    if ordered.len() != figure.edges.len() {
        return Err(broken_path(figure, "edges are not connected").into());
    }
    Ok(ordered)
}

impl Figure {
    pub fn node_index(&self) -> NodeIndex<'_> {
        NodeIndex::new(&self.nodes)
    }

    /// Edges in traversal order: the cycle starting at the first node for
    /// closed figures, the path from its free end for open ones.
    pub fn ordered_edges(&self) -> Result<Vec<&FigureEdge>> {
        if self.closed {
            walk_cycle(self)
        } else {
            walk_path(self)
        }
    }

    /// Node ids in traversal order. For a closed figure the first node is not
    /// repeated at the end.
    pub fn outline_node_ids(&self) -> Result<Vec<&str>> {
        let edges = self.ordered_edges()?;
        if edges.is_empty() {
            return Ok(self.nodes.iter().map(|n| n.id.as_str()).collect());
        }
        let mut ids: Vec<&str> = edges.iter().map(|e| e.from.as_str()).collect();
        if !self.closed {
            if let Some(last) = edges.last() {
                ids.push(last.to.as_str());
            }
        }
        Ok(ids)
    }
}
