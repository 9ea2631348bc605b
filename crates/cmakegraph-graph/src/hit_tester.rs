use crate::connections::ConnectionData;
use crate::geometry::{Vec2, is_inside_polygon};
use crate::shapes::ShapeTable;
use cmakegraph_core::{Project, TargetIndex, TargetType};

/// Result of a hit test at a world-space position.
///
/// Priority order: Target > Connection > None
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    None,
    Target(TargetIndex),
    /// Index into the connection list the tester was last updated with.
    Connection(usize),
}

#[derive(Debug, Clone, Copy)]
struct TargetRegion {
    index: TargetIndex,
    kind: TargetType,
    center: Vec2,
}

/// Picks targets by their shape outline and connections by their hover quad.
#[derive(Debug, Clone)]
pub struct HitTester {
    node_scale: f32,
    targets: Vec<TargetRegion>,
    connection_quads: Vec<(usize, [Vec2; 4])>,
}

impl HitTester {
    pub fn new(node_scale: f32) -> Self {
        Self {
            node_scale,
            targets: Vec::new(),
            connection_quads: Vec::new(),
        }
    }

    /// Refreshes the spatial data. Call after targets moved or connections were recomputed.
    pub fn update(&mut self, project: &Project, connections: &[ConnectionData]) {
        self.targets.clear();
        self.targets
            .extend(project.targets().iter().enumerate().map(|(i, target)| TargetRegion {
                index: TargetIndex(i),
                kind: target.kind,
                center: Vec2::new(target.graphical.x, target.graphical.y),
            }));

        self.connection_quads.clear();
        self.connection_quads.extend(
            connections
                .iter()
                .enumerate()
                .filter_map(|(i, c)| c.hover_quad.map(|quad| (i, quad))),
        );
    }

    pub fn hit_test(&self, shapes: &ShapeTable, pos: Vec2) -> HitResult {
        if let Some(target) = self.hit_test_target(shapes, pos) {
            return HitResult::Target(target);
        }
        if let Some(connection) = self.hit_test_connection(pos) {
            return HitResult::Connection(connection);
        }
        HitResult::None
    }

    /// Target whose outline contains `pos`. The last one in project order wins on overlap.
    pub fn hit_test_target(&self, shapes: &ShapeTable, pos: Vec2) -> Option<TargetIndex> {
        self.targets
            .iter()
            .rev()
            .find(|region| {
                // Outlines are in local space, bring the point there.
                let local = (pos - region.center) / self.node_scale;
                is_inside_polygon(local, shapes.get(region.kind).outline())
            })
            .map(|region| region.index)
    }

    /// First drawn connection whose hover quad contains `pos`.
    pub fn hit_test_connection(&self, pos: Vec2) -> Option<usize> {
        self.connection_quads
            .iter()
            .find(|(_, quad)| is_inside_polygon(pos, quad))
            .map(|&(i, _)| i)
    }
}
