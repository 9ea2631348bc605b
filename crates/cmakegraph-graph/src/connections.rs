//! Projection of target dependencies into drawable, trimmed line segments.

use crate::geometry::{Segment, Vec2, arrow_coordinates, hover_quad};
use crate::settings::GraphSettings;
use crate::shapes::{ShapeInfo, ShapeTable};
use crate::style::Highlight;
use cmakegraph_core::{DependencyKind, DependencyKinds, Project, Target, TargetIndex};

/// One displayed dependency between two targets.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionData {
    pub src: TargetIndex,
    pub dst: TargetIndex,
    pub kind: DependencyKind,
    /// Picking area around the drawn segment. `None` while the connection is not drawn.
    pub hover_quad: Option<[Vec2; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Solid,
    SmallStipple,
    BigStipple,
}

impl LineStyle {
    pub fn for_kind(kind: DependencyKind) -> Self {
        match kind {
            DependencyKind::Build => LineStyle::Solid,
            DependencyKind::Interface => LineStyle::BigStipple,
            DependencyKind::Manual => LineStyle::SmallStipple,
        }
    }

    pub fn stipple(self, line_stipple_scale: f32) -> Option<Stipple> {
        match self {
            LineStyle::Solid => None,
            LineStyle::SmallStipple => Some(Stipple {
                period: line_stipple_scale / 2.0,
                duty: 0.5,
            }),
            LineStyle::BigStipple => Some(Stipple {
                period: line_stipple_scale,
                duty: 0.5,
            }),
        }
    }
}

/// Dash pattern for a line bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stipple {
    /// Length of one dash plus gap, as a fraction of the viewport width.
    pub period: f32,
    /// Drawn fraction of the period.
    pub duty: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Lines(LineStyle),
    Triangles,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [
        Bucket::Lines(LineStyle::Solid),
        Bucket::Lines(LineStyle::SmallStipple),
        Bucket::Lines(LineStyle::BigStipple),
        Bucket::Triangles,
    ];

    fn index(self) -> usize {
        match self {
            Bucket::Lines(LineStyle::Solid) => 0,
            Bucket::Lines(LineStyle::SmallStipple) => 1,
            Bucket::Lines(LineStyle::BigStipple) => 2,
            Bucket::Triangles => 3,
        }
    }
}

const BUCKET_COUNT: usize = Bucket::ALL.len() * Highlight::ALL.len();

fn bucket_slot(bucket: Bucket, highlight: Highlight) -> usize {
    highlight.index() * Bucket::ALL.len() + bucket.index()
}

/// A contiguous range of `Connections::vertices` sharing one visual style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub bucket: Bucket,
    pub highlight: Highlight,
    /// First vertex.
    pub offset: usize,
    /// Number of vertices.
    pub count: usize,
    pub stipple: Option<Stipple>,
}

impl DrawCall {
    pub fn is_stippled(&self) -> bool {
        self.stipple.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Connections {
    connections: Vec<ConnectionData>,
    vertices: Vec<Vec2>,
    draw_calls: Vec<DrawCall>,
}

impl Connections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connections(&self) -> &[ConnectionData] {
        &self.connections
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draw_calls
    }

    /// Number of connections drawn by the last `update`.
    pub fn drawn_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|c| c.hover_quad.is_some())
            .count()
    }

    /// Rebuilds the list of connections shown for `config` and `filter`.
    ///
    /// Geometry is not computed here, call `update` afterwards.
    pub fn update_topology(&mut self, project: &Project, config: &str, filter: DependencyKinds) {
        self.connections.clear();
        for (i, target) in project.targets().iter().enumerate() {
            let Some(config) = target.config(config) else {
                continue;
            };
            for kind in DependencyKind::ALL {
                if !filter.includes(kind) {
                    continue;
                }
                self.connections
                    .extend(config.dependencies(kind).iter().map(|&dst| ConnectionData {
                        src: TargetIndex(i),
                        dst,
                        kind,
                        hover_quad: None,
                    }));
            }
        }
    }

    /// Recomputes trimmed segments, arrowheads, hover quads and draw calls from current positions.
    pub fn update(
        &mut self,
        project: &Project,
        shapes: &ShapeTable,
        settings: &GraphSettings,
        focused: Option<TargetIndex>,
        selected: Option<TargetIndex>,
    ) {
        let mut buckets: [Vec<Vec2>; BUCKET_COUNT] = Default::default();
        let mut dropped = 0usize;

        for connection in &mut self.connections {
            connection.hover_quad = None;

            let (Some(src), Some(dst)) = (project.target(connection.src), project.target(connection.dst))
            else {
                continue;
            };
            if src.graphical.hide_connections || dst.graphical.hide_connections {
                continue;
            }

            let segment = Segment::new(target_center(src), target_center(dst));
            let node_scale = settings.node_scale;
            let t_start = trim_parameter(src, shapes.get(src.kind), node_scale, &segment, true);
            let t_end = trim_parameter(dst, shapes.get(dst.kind), node_scale, &segment, false);
            if t_start >= t_end {
                dropped += 1;
                continue;
            }

            let segment = segment.trimmed(t_start, t_end);
            let arrow = arrow_coordinates(
                &segment,
                settings.arrow_length_scale,
                settings.arrow_width_scale,
            );

            let is_focused = focused == Some(connection.src) || focused == Some(connection.dst);
            let is_selected = selected == Some(connection.src) || selected == Some(connection.dst);
            let highlight = Highlight::resolve(is_focused, is_selected);

            let lines = Bucket::Lines(LineStyle::for_kind(connection.kind));
            buckets[bucket_slot(lines, highlight)].extend([segment.start, segment.end]);
            buckets[bucket_slot(Bucket::Triangles, highlight)].extend(arrow);

            connection.hover_quad = Some(hover_quad(&segment, settings.arrow_width_scale));
        }

        self.vertices.clear();
        self.draw_calls.clear();
        for highlight in Highlight::ALL {
            for bucket in Bucket::ALL {
                let data = &buckets[bucket_slot(bucket, highlight)];
                if data.is_empty() {
                    continue;
                }
                let stipple = match bucket {
                    Bucket::Lines(style) => style.stipple(settings.line_stipple_scale),
                    Bucket::Triangles => None,
                };
                self.draw_calls.push(DrawCall {
                    bucket,
                    highlight,
                    offset: self.vertices.len(),
                    count: data.len(),
                    stipple,
                });
                self.vertices.extend_from_slice(data);
            }
        }

        tracing::debug!(
            "Projected connections: {} drawn, {} dropped as degenerate, {} draw calls",
            self.drawn_count(),
            dropped,
            self.draw_calls.len()
        );
    }
}

fn target_center(target: &Target) -> Vec2 {
    Vec2::new(target.graphical.x, target.graphical.y)
}

/// Parameter along `segment` where it crosses the outline of `target`.
///
/// For the source target the smallest crossing is used, starting from 1. For the destination the
/// largest, starting from 0. Without any crossing the result makes the connection degenerate.
pub fn trim_parameter(
    target: &Target,
    shape: &ShapeInfo,
    node_scale: f32,
    segment: &Segment,
    is_source: bool,
) -> f32 {
    let center = target_center(target);
    let outline = shape.outline();

    let mut result: f32 = if is_source { 1.0 } else { 0.0 };
    for (i, &vertex) in outline.iter().enumerate() {
        let next = outline[(i + 1) % outline.len()];
        let edge = Segment::new(vertex * node_scale + center, next * node_scale + center);
        let Some(t) = segment.intersect(&edge) else {
            continue;
        };
        result = if is_source { result.min(t) } else { result.max(t) };
    }
    result
}
