use crate::geometry::{Rect, Vec2};
use cmakegraph_core::TargetType;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_8, TAU};
use std::ops::Range;

/// Immutable polygon description of a target type in local space, roughly `[-1, 1]`.
///
/// The first sub-shape is the filled outline used for picking and connection trimming. Further
/// sub-shapes are only drawn as outlines.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeInfo {
    vertices: Vec<Vec2>,
    sub_shapes: Vec<Range<usize>>,
    bounds: Rect,
}

impl ShapeInfo {
    pub const MAX_SUB_SHAPES: usize = 3;
    pub const MAX_VERTICES: usize = 120;

    /// # Panics
    ///
    /// Panics when there are no sub-shapes or more than `MAX_SUB_SHAPES`, when a sub-shape has
    /// fewer than 3 vertices, or when the shape has more than `MAX_VERTICES` in total.
    pub fn new(sub_shapes: Vec<Vec<Vec2>>) -> Self {
        assert!(
            (1..=Self::MAX_SUB_SHAPES).contains(&sub_shapes.len()),
            "shape must have between 1 and {} sub-shapes, got {}",
            Self::MAX_SUB_SHAPES,
            sub_shapes.len()
        );

        let mut vertices = Vec::new();
        let mut ranges = Vec::with_capacity(sub_shapes.len());
        for sub_shape in sub_shapes {
            assert!(
                sub_shape.len() >= 3,
                "sub-shape needs at least 3 vertices, got {}",
                sub_shape.len()
            );
            let start = vertices.len();
            vertices.extend(sub_shape);
            ranges.push(start..vertices.len());
        }
        assert!(
            vertices.len() <= Self::MAX_VERTICES,
            "shape has {} vertices, limit is {}",
            vertices.len(),
            Self::MAX_VERTICES
        );

        let bounds = Rect::from_points(vertices.iter().copied())
            .unwrap_or(Rect::from_min_max(Vec2::ZERO, Vec2::ZERO));
        Self {
            vertices,
            sub_shapes: ranges,
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    pub fn sub_shapes(&self) -> impl Iterator<Item = &[Vec2]> {
        self.sub_shapes
            .iter()
            .map(|range| &self.vertices[range.clone()])
    }

    pub fn sub_shape_count(&self) -> usize {
        self.sub_shapes.len()
    }

    pub fn outline(&self) -> &[Vec2] {
        &self.vertices[self.sub_shapes[0].clone()]
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }
}

fn regular_polygon(sides: usize, radius: Vec2, rotation: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let angle = rotation + TAU * i as f32 / sides as f32;
            Vec2::new(radius.x * angle.cos(), radius.y * angle.sin())
        })
        .collect()
}

fn rectangle(half_width: f32, half_height: f32) -> Vec<Vec2> {
    vec![
        Vec2::new(-half_width, -half_height),
        Vec2::new(half_width, -half_height),
        Vec2::new(half_width, half_height),
        Vec2::new(-half_width, half_height),
    ]
}

fn static_library() -> ShapeInfo {
    ShapeInfo::new(vec![rectangle(1.0, 0.7), rectangle(0.8, 0.5)])
}

fn executable() -> ShapeInfo {
    ShapeInfo::new(vec![regular_polygon(6, Vec2::new(1.0, 0.8), 0.0)])
}

fn shared_library() -> ShapeInfo {
    ShapeInfo::new(vec![
        regular_polygon(24, Vec2::new(1.0, 0.7), 0.0),
        regular_polygon(24, Vec2::new(0.75, 0.45), 0.0),
    ])
}

fn module_library() -> ShapeInfo {
    ShapeInfo::new(vec![
        regular_polygon(8, Vec2::new(1.0, 0.8), FRAC_PI_8),
        regular_polygon(8, Vec2::new(0.75, 0.55), FRAC_PI_8),
    ])
}

fn custom_target() -> ShapeInfo {
    ShapeInfo::new(vec![vec![
        Vec2::new(1.0, 0.0),
        Vec2::new(0.0, 0.8),
        Vec2::new(-1.0, 0.0),
        Vec2::new(0.0, -0.8),
    ]])
}

fn interface_library() -> ShapeInfo {
    ShapeInfo::new(vec![vec![
        Vec2::new(-1.0, -0.7),
        Vec2::new(1.0, -0.7),
        Vec2::new(0.7, 0.7),
        Vec2::new(-0.7, 0.7),
    ]])
}

fn object_library() -> ShapeInfo {
    ShapeInfo::new(vec![
        vec![
            Vec2::new(-1.0, -0.7),
            Vec2::new(0.6, -0.7),
            Vec2::new(1.0, 0.7),
            Vec2::new(-0.6, 0.7),
        ],
        vec![
            Vec2::new(-0.7, -0.5),
            Vec2::new(0.45, -0.5),
            Vec2::new(0.7, 0.5),
            Vec2::new(-0.45, 0.5),
        ],
    ])
}

fn unknown_library() -> ShapeInfo {
    ShapeInfo::new(vec![
        regular_polygon(5, Vec2::new(1.0, 0.8), FRAC_PI_2),
        regular_polygon(12, Vec2::new(0.3, 0.3), 0.0),
    ])
}

/// Lookup table from target type to its shape.
#[derive(Debug, Clone)]
pub struct ShapeTable {
    shapes: [ShapeInfo; TargetType::COUNT],
}

impl Default for ShapeTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeTable {
    pub fn new() -> Self {
        Self {
            shapes: std::array::from_fn(|i| match TargetType::ALL[i] {
                TargetType::StaticLibrary => static_library(),
                TargetType::ModuleLibrary => module_library(),
                TargetType::SharedLibrary => shared_library(),
                TargetType::ObjectLibrary => object_library(),
                TargetType::InterfaceLibrary => interface_library(),
                TargetType::UnknownLibrary | TargetType::UnknownTarget => unknown_library(),
                TargetType::Executable => executable(),
                TargetType::Utility => custom_target(),
            }),
        }
    }

    pub fn get(&self, kind: TargetType) -> &ShapeInfo {
        &self.shapes[kind.index()]
    }

    /// Largest width and height among all shapes, in local units.
    pub fn max_extent(&self) -> Vec2 {
        self.shapes.iter().fold(Vec2::ZERO, |extent, shape| {
            let bounds = shape.bounds();
            extent.max(Vec2::new(bounds.width(), bounds.height()))
        })
    }
}
