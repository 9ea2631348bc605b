use crate::geometry::Vec2;
use crate::graph::LayoutGraph;
use crate::settings::GraphSettings;
use crate::shapes::ShapeTable;
use cmakegraph_core::{Project, TargetIndex};

/// Result of a layout pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Layers in top to bottom order. Members keep project order.
    pub layers: Vec<Vec<TargetIndex>>,
    pub orphans: Vec<TargetIndex>,
    /// Index into `layers` of the layer holding nodes trapped in cycles, if there were any.
    pub cyclic_layer: Option<usize>,
    pub positions: Vec<(TargetIndex, Vec2)>,
}

impl Layout {
    pub fn layer_of(&self, target: TargetIndex) -> Option<usize> {
        self.layers.iter().position(|layer| layer.contains(&target))
    }

    pub fn position_of(&self, target: TargetIndex) -> Option<Vec2> {
        self.positions
            .iter()
            .find(|(index, _)| *index == target)
            .map(|&(_, position)| position)
    }
}

pub trait Layouter {
    fn execute(&self, graph: &mut LayoutGraph) -> Layout;
}

/// Topological layering: every pass strips the nodes nobody remaining depends on.
pub struct LayeredLayouter {
    /// Footprint of a single node in layout units.
    pub node_size: Vec2,
}

impl LayeredLayouter {
    const LAYER_SPACING: f32 = 2.5;
    const NODE_SPACING: f32 = 1.4;
    const ORPHAN_SPACING: f32 = 1.05;
    const ORPHAN_COLUMN_X: f32 = -100.0;

    pub fn new(node_size: Vec2) -> Self {
        Self { node_size }
    }

    /// Footprint derived from the largest shape at the configured node scale.
    pub fn from_settings(shapes: &ShapeTable, settings: &GraphSettings) -> Self {
        Self::new(shapes.max_extent() * settings.node_scale)
    }

    fn assign_layers(graph: &mut LayoutGraph) -> (Vec<Vec<TargetIndex>>, Vec<TargetIndex>, Option<usize>) {
        let mut orphans = Vec::new();
        for index in graph.node_indices().collect::<Vec<_>>() {
            if graph[index].is_orphan {
                graph[index].removed = true;
                orphans.push(index);
            }
        }

        let mut layers = Vec::new();
        let mut remaining = graph.node_count() - orphans.len();
        let mut cyclic_layer = None;

        // Every iteration removes at least one node or leaves the loop.
        while remaining > 0 {
            let layer: Vec<TargetIndex> = graph
                .node_indices()
                .filter(|&index| !graph[index].removed && !graph.has_live_dependent(index))
                .collect();

            if layer.is_empty() {
                let leftover: Vec<TargetIndex> = graph
                    .node_indices()
                    .filter(|&index| !graph[index].removed)
                    .collect();
                tracing::warn!(
                    "{} targets depend on each other in a cycle, placing them in a separate layer",
                    leftover.len()
                );
                for &index in &leftover {
                    graph[index].removed = true;
                }
                cyclic_layer = Some(layers.len());
                layers.push(leftover);
                break;
            }

            for &index in &layer {
                graph[index].removed = true;
            }
            remaining -= layer.len();
            layers.push(layer);
        }

        (layers, orphans, cyclic_layer)
    }
}

impl Layouter for LayeredLayouter {
    fn execute(&self, graph: &mut LayoutGraph) -> Layout {
        for index in graph.node_indices().collect::<Vec<_>>() {
            graph[index].removed = false;
        }

        let (layers, orphans, cyclic_layer) = Self::assign_layers(graph);

        let mut positions = Vec::with_capacity(graph.node_count());
        for (layer_index, layer) in layers.iter().enumerate() {
            let y = layer_index as f32 * self.node_size.y * Self::LAYER_SPACING;
            for (node_index, &target) in layer.iter().enumerate() {
                let x = node_index as f32 * self.node_size.x * Self::NODE_SPACING;
                positions.push((target, Vec2::new(x, y)));
            }
        }
        for (node_index, &target) in orphans.iter().enumerate() {
            let y = node_index as f32 * self.node_size.y * Self::ORPHAN_SPACING;
            positions.push((target, Vec2::new(Self::ORPHAN_COLUMN_X, y)));
        }

        tracing::debug!(
            "Layered layout: {} layers, {} orphans",
            layers.len(),
            orphans.len()
        );

        Layout {
            layers,
            orphans,
            cyclic_layer,
            positions,
        }
    }
}

/// Lays out `config` of the project and writes the positions back into its targets.
///
/// `Project::derive_data` must have run before.
pub fn apply_layout(project: &mut Project, config: &str, layouter: &dyn Layouter) -> Layout {
    let mut graph = LayoutGraph::build(project, config);
    let layout = layouter.execute(&mut graph);

    for &(index, position) in &layout.positions {
        if let Some(target) = project.target_mut(index) {
            target.graphical.x = position.x;
            target.graphical.y = position.y;
        }
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmakegraph_core::{Config, LINK_LIBRARIES, MANUALLY_ADDED_DEPENDENCIES, Target, TargetType};

    fn project(edges: &[(&str, &str)], names: &[&str]) -> Project {
        let mut project = Project::new();
        for name in names {
            let dependencies: Vec<&str> = edges
                .iter()
                .filter(|(src, _)| src == name)
                .map(|(_, dst)| *dst)
                .collect();
            project
                .add_target(
                    Target::new(*name, TargetType::StaticLibrary).with_config(
                        Config::new("Debug").with_property(LINK_LIBRARIES, dependencies.join(";")),
                    ),
                )
                .unwrap();
        }
        project.derive_data();
        project
    }

    fn layers_by_name(project: &Project, layout: &Layout) -> Vec<Vec<String>> {
        layout
            .layers
            .iter()
            .map(|layer| {
                layer
                    .iter()
                    .map(|&i| project.targets()[i.0].name.clone())
                    .collect()
            })
            .collect()
    }

    fn layouter() -> LayeredLayouter {
        LayeredLayouter::new(Vec2::new(10.0, 4.0))
    }

    #[test]
    fn test_chain() {
        let mut project = project(&[("A", "B"), ("B", "C")], &["A", "B", "C"]);
        let layout = apply_layout(&mut project, "Debug", &layouter());
        assert_eq!(layers_by_name(&project, &layout), vec![vec!["A"], vec!["B"], vec!["C"]]);
        assert!(layout.orphans.is_empty());
        assert_eq!(layout.cyclic_layer, None);
    }

    #[test]
    fn test_diamond_places_join_below_both_parents() {
        let mut project = project(
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
            &["A", "B", "C", "D"],
        );
        let layout = apply_layout(&mut project, "Debug", &layouter());
        assert_eq!(
            layers_by_name(&project, &layout),
            vec![vec!["A"], vec!["B", "C"], vec!["D"]]
        );
        assert_eq!(layout.layer_of(TargetIndex(3)), Some(2));
    }

    #[test]
    fn test_longer_path_pushes_node_down() {
        // D is reachable directly from A and through B, C.
        let mut project = project(
            &[("A", "B"), ("B", "C"), ("C", "D"), ("A", "D")],
            &["A", "B", "C", "D"],
        );
        let layout = apply_layout(&mut project, "Debug", &layouter());
        assert_eq!(layout.layer_of(TargetIndex(3)), Some(3));
    }

    #[test]
    fn test_coordinates() {
        let mut project = project(&[("A", "B"), ("A", "C")], &["A", "B", "C", "X", "Y"]);
        let layout = apply_layout(&mut project, "Debug", &layouter());

        assert_eq!(layout.position_of(TargetIndex(0)), Some(Vec2::new(0.0, 0.0)));
        assert_eq!(layout.position_of(TargetIndex(1)), Some(Vec2::new(0.0, 10.0)));
        assert_eq!(layout.position_of(TargetIndex(2)), Some(Vec2::new(14.0, 10.0)));
        assert_eq!(layout.orphans, vec![TargetIndex(3), TargetIndex(4)]);
        assert_eq!(project.targets()[3].position(), (-100.0, 0.0));
        assert_eq!(project.targets()[4].position(), (-100.0, 4.2));
    }

    #[test]
    fn test_orphans_never_enter_layers() {
        let names: Vec<String> = (0..20).map(|i| format!("T{i}")).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut project = project(&[("T0", "T1")], &names);
        let layout = apply_layout(&mut project, "Debug", &layouter());

        assert_eq!(layout.orphans.len(), 18);
        for orphan in &layout.orphans {
            assert_eq!(layout.layer_of(*orphan), None);
        }
    }

    #[test]
    fn test_cycle_goes_to_fallback_layer() {
        let _ = tracing_subscriber::fmt::try_init();
        let mut project = project(
            &[("A", "B"), ("B", "C"), ("C", "B"), ("C", "D")],
            &["A", "B", "C", "D"],
        );
        let layout = apply_layout(&mut project, "Debug", &layouter());

        assert_eq!(
            layers_by_name(&project, &layout),
            vec![vec!["A"], vec!["B", "C", "D"]]
        );
        assert_eq!(layout.cyclic_layer, Some(1));
        assert_eq!(layout.positions.len(), 4);
    }

    #[test]
    fn test_pure_cycle_without_entry() {
        let mut project = project(&[("A", "B"), ("B", "A")], &["A", "B"]);
        let layout = apply_layout(&mut project, "Debug", &layouter());
        assert_eq!(layout.layers, vec![vec![TargetIndex(0), TargetIndex(1)]]);
        assert_eq!(layout.cyclic_layer, Some(0));
    }

    #[test]
    fn test_layering_is_idempotent() {
        let mut project = project(
            &[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")],
            &["A", "B", "C", "D", "E"],
        );
        let first = apply_layout(&mut project, "Debug", &layouter());
        let positions: Vec<(f32, f32)> = project.targets().iter().map(|t| t.position()).collect();
        let second = apply_layout(&mut project, "Debug", &layouter());

        assert_eq!(first, second);
        assert_eq!(
            positions,
            project.targets().iter().map(|t| t.position()).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_manual_dependencies_take_part_in_layering() {
        let mut project = Project::new();
        project
            .add_target(
                Target::new("app", TargetType::Executable).with_config(
                    Config::new("Debug").with_property(MANUALLY_ADDED_DEPENDENCIES, "gen"),
                ),
            )
            .unwrap();
        project
            .add_target(Target::new("gen", TargetType::Utility).with_config(Config::new("Debug")))
            .unwrap();
        project.derive_data();

        let layout = apply_layout(&mut project, "Debug", &layouter());
        assert_eq!(layout.layers, vec![vec![TargetIndex(0)], vec![TargetIndex(1)]]);
    }

    #[test]
    fn test_node_size_from_settings() {
        let layouter = LayeredLayouter::from_settings(&ShapeTable::new(), &GraphSettings::default());
        assert!((layouter.node_size.x - 50.0).abs() < 1e-4);
        assert!((layouter.node_size.y - 40.0).abs() < 1e-4);
    }
}
