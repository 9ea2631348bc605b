use cmakegraph_core::{Project, TargetIndex};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutNode {
    pub target: TargetIndex,
    /// Not referenced by anyone and without dependencies in the active config.
    pub is_orphan: bool,
    /// Already assigned to a layer or to the orphan column.
    pub removed: bool,
}

/// Ephemeral dependency graph for a single layout pass.
///
/// Node `i` always describes `TargetIndex(i)` of the project it was built from. Edges point from a
/// dependent target to its dependency.
#[derive(Debug, Clone, Default)]
pub struct LayoutGraph {
    nodes: Vec<LayoutNode>,
    edges: Vec<(TargetIndex, TargetIndex)>,
}

impl LayoutGraph {
    /// Builds the graph of `config` from data produced by `Project::derive_data`.
    ///
    /// Targets without `config` contribute no edges. All dependency kinds are merged.
    pub fn build(project: &Project, config: &str) -> Self {
        let mut graph = Self::default();

        for (i, target) in project.targets().iter().enumerate() {
            let dependencies = target
                .config(config)
                .map(|c| c.derived.all.as_slice())
                .unwrap_or_default();

            graph.nodes.push(LayoutNode {
                target: TargetIndex(i),
                is_orphan: !target.derived.is_referenced && dependencies.is_empty(),
                removed: false,
            });
            graph
                .edges
                .extend(dependencies.iter().map(|&dst| (TargetIndex(i), dst)));
        }

        tracing::debug!(
            "Built layout graph for config {}: {} nodes, {} edges, {} orphans",
            config,
            graph.nodes.len(),
            graph.edges.len(),
            graph.nodes.iter().filter(|n| n.is_orphan).count()
        );
        graph
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = TargetIndex> {
        (0..self.nodes.len()).map(TargetIndex)
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[(TargetIndex, TargetIndex)] {
        &self.edges
    }

    /// True when some other node that is not removed yet depends on `index`.
    pub fn has_live_dependent(&self, index: TargetIndex) -> bool {
        self.edges
            .iter()
            .any(|&(src, dst)| dst == index && src != index && !self[src].removed)
    }
}

impl Index<TargetIndex> for LayoutGraph {
    type Output = LayoutNode;
    fn index(&self, index: TargetIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}

impl IndexMut<TargetIndex> for LayoutGraph {
    fn index_mut(&mut self, index: TargetIndex) -> &mut Self::Output {
        &mut self.nodes[index.0]
    }
}
