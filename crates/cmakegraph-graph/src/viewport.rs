//! World space, camera and drag handling.
//!
//! Screen pixels are mapped to clip space `[-1, 1]`, clip space to view space through a fixed
//! orthographic projection of `WORLD_HALF_WIDTH` x `WORLD_HALF_HEIGHT`, and view space to world
//! space through the camera.

use crate::geometry::{Rect, Vec2, interpolate};
use crate::settings::ZoomSettings;
use crate::shapes::ShapeTable;
use cmakegraph_core::{Project, TargetIndex};

pub const WORLD_HALF_WIDTH: f32 = 200.0;
pub const WORLD_HALF_HEIGHT: f32 = 100.0;
pub const SCREEN_ASPECT_RATIO: f32 = WORLD_HALF_WIDTH / WORLD_HALF_HEIGHT;

/// Rescales raw target positions so every target, including its footprint and a 10% margin, fits
/// the world rectangle.
pub fn normalize_positions(project: &mut Project, node_scale: f32) {
    const PADDING: f32 = 0.1;

    let Some(bounds) = Rect::from_points(
        project
            .targets()
            .iter()
            .map(|t| Vec2::new(t.graphical.x, t.graphical.y)),
    ) else {
        return;
    };

    let mut min = bounds.min - Vec2::new(node_scale, node_scale);
    let mut max = bounds.max + Vec2::new(node_scale, node_scale);
    let padding = (max - min) * (PADDING / 2.0);
    min -= padding;
    max += padding;

    for target in project.targets_mut() {
        let graphical = &mut target.graphical;
        graphical.x = interpolate(graphical.x, min.x, max.x, -WORLD_HALF_WIDTH, WORLD_HALF_WIDTH);
        graphical.y = interpolate(graphical.y, min.y, max.y, -WORLD_HALF_HEIGHT, WORLD_HALF_HEIGHT);
    }
}

/// Placement of the graph viewport inside the window, in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenBounds {
    /// Fits the largest 2:1 rectangle into the available space.
    ///
    /// Returns true when the size changed.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn set_available_space(&mut self, mut width: f32, mut height: f32) -> bool {
        assert!(
            width != 0.0 && height != 0.0,
            "zero dimensions for graph viewport: {width}x{height}"
        );

        if width > height * SCREEN_ASPECT_RATIO {
            width = height * SCREEN_ASPECT_RATIO;
        }
        if height > width / SCREEN_ASPECT_RATIO {
            height = width / SCREEN_ASPECT_RATIO;
        }

        let width = width.floor();
        let height = height.floor();
        if width == self.width && height == self.height {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    /// Window pixel to clip space. The y axis is not flipped.
    pub fn to_clip(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            2.0 * (pixel.x - self.x) / self.width - 1.0,
            2.0 * (pixel.y - self.y) / self.height - 1.0,
        )
    }
}

pub fn is_inside_clip(clip: Vec2) -> bool {
    (-1.0..=1.0).contains(&clip.x) && (-1.0..=1.0).contains(&clip.y)
}

fn clip_to_view(clip: Vec2) -> Vec2 {
    Vec2::new(clip.x * WORLD_HALF_WIDTH, clip.y * WORLD_HALF_HEIGHT)
}

fn view_to_clip(view: Vec2) -> Vec2 {
    Vec2::new(view.x / WORLD_HALF_WIDTH, view.y / WORLD_HALF_HEIGHT)
}

/// Pan and zoom state.
///
/// While dragging, movement accumulates in a separate offset that is folded into `position`
/// when the drag ends.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    scale: f32,
    zoom: ZoomSettings,
    drag_active: bool,
    drag_start: Vec2,
    drag_offset: Vec2,
}

impl Camera {
    pub fn new(zoom: ZoomSettings) -> Self {
        Self {
            position: Vec2::ZERO,
            scale: 1.0_f32.max(zoom.min_scale).min(zoom.max_scale),
            zoom,
            drag_active: false,
            drag_start: Vec2::ZERO,
            drag_offset: Vec2::ZERO,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn drag_offset(&self) -> Vec2 {
        self.drag_offset
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_active
    }

    /// Restores a saved camera. The scale is clamped to the zoom range.
    pub fn set(&mut self, position: Vec2, scale: f32) {
        self.position = position;
        self.scale = self.clamp_scale(scale);
    }

    fn clamp_scale(&self, scale: f32) -> f32 {
        scale.max(self.zoom.min_scale).min(self.zoom.max_scale)
    }

    pub fn world_to_view(&self, world: Vec2) -> Vec2 {
        world * self.scale + self.position + self.drag_offset
    }

    pub fn view_to_world(&self, view: Vec2) -> Vec2 {
        (view - self.position - self.drag_offset) / self.scale
    }

    pub fn clip_to_world(&self, clip: Vec2) -> Vec2 {
        self.view_to_world(clip_to_view(clip))
    }

    pub fn world_to_clip(&self, world: Vec2) -> Vec2 {
        view_to_clip(self.world_to_view(world))
    }

    /// One zoom step in or out. Returns true when the scale changed.
    pub fn zoom(&mut self, zoom_in: bool) -> bool {
        let step = if zoom_in { self.zoom.step } else { -self.zoom.step };
        let scale = self.clamp_scale(self.scale + step);
        let changed = scale != self.scale;
        self.scale = scale;
        changed
    }

    pub fn begin_drag(&mut self, clip: Vec2) {
        self.drag_active = true;
        self.drag_start = clip;
        self.drag_offset = Vec2::ZERO;
    }

    /// Returns true when a drag is active.
    pub fn update_drag(&mut self, clip: Vec2) -> bool {
        if !self.drag_active {
            return false;
        }
        self.drag_offset = clip_to_view(clip - self.drag_start);
        true
    }

    /// Returns true when a drag was active.
    pub fn end_drag(&mut self) -> bool {
        if !self.drag_active {
            return false;
        }
        self.position += self.drag_offset;
        self.drag_offset = Vec2::ZERO;
        self.drag_active = false;
        true
    }

    /// Centers the camera on all targets and zooms so they fit the viewport.
    ///
    /// The scale may leave the zoom range for very small or very large graphs.
    pub fn show_entire_graph(&mut self, project: &Project, shapes: &ShapeTable, node_scale: f32) {
        let bounds = project
            .targets()
            .iter()
            .map(|target| {
                let center = Vec2::new(target.graphical.x, target.graphical.y);
                shapes.get(target.kind).bounds().transformed(node_scale, center)
            })
            .reduce(Rect::union);
        let Some(bounds) = bounds else {
            return;
        };

        let scale_x = 2.0 * WORLD_HALF_WIDTH / bounds.width();
        let scale_y = 2.0 * WORLD_HALF_HEIGHT / bounds.height();
        self.scale = scale_x.min(scale_y);
        self.position = -(bounds.center() * self.scale);
    }
}

/// Dragging of a single target with the pointer.
///
/// The target follows the pointer at the offset recorded when the drag started.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TargetDrag {
    target: Option<TargetIndex>,
    offset: Vec2,
}

impl TargetDrag {
    pub fn is_active(&self) -> bool {
        self.target.is_some()
    }

    pub fn target(&self) -> Option<TargetIndex> {
        self.target
    }

    pub fn begin(&mut self, target: TargetIndex, target_position: Vec2, pointer_world: Vec2) {
        self.target = Some(target);
        self.offset = pointer_world - target_position;
    }

    /// New position of the dragged target, if any.
    pub fn update(&self, pointer_world: Vec2) -> Option<(TargetIndex, Vec2)> {
        self.target.map(|target| (target, pointer_world - self.offset))
    }

    /// Returns true when a drag was active.
    pub fn end(&mut self) -> bool {
        self.target.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmakegraph_core::{Target, TargetType};

    fn assert_near(actual: Vec2, expected: Vec2) {
        assert!(
            (actual - expected).length() < 1e-3,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn test_normalize_positions_fits_world() {
        let mut project = Project::new();
        for (i, (x, y)) in [(0.0, 0.0), (1000.0, 0.0), (500.0, 300.0)].into_iter().enumerate() {
            project
                .add_target(Target::new(format!("t{i}"), TargetType::Executable).with_position(x, y))
                .unwrap();
        }
        normalize_positions(&mut project, 25.0);

        // x range: [-25, 1025] padded by 52.5 on each side.
        let expected_min_x = interpolate(0.0, -77.5, 1077.5, -200.0, 200.0);
        assert!((project.targets()[0].graphical.x - expected_min_x).abs() < 1e-3);
        for target in project.targets() {
            assert!(target.graphical.x.abs() < WORLD_HALF_WIDTH);
            assert!(target.graphical.y.abs() < WORLD_HALF_HEIGHT);
        }
        assert!((project.targets()[2].graphical.x).abs() < 1e-3);
    }

    #[test]
    fn test_normalize_single_target_lands_in_center() {
        let mut project = Project::new();
        project
            .add_target(Target::new("only", TargetType::Utility).with_position(42.0, -7.0))
            .unwrap();
        normalize_positions(&mut project, 25.0);
        assert_eq!(project.targets()[0].position(), (0.0, 0.0));
    }

    #[test]
    fn test_normalize_empty_project() {
        let mut project = Project::new();
        normalize_positions(&mut project, 25.0);
        assert!(project.targets().is_empty());
    }

    #[test]
    fn test_available_space_keeps_aspect_ratio() {
        let mut bounds = ScreenBounds::default();
        assert!(bounds.set_available_space(1000.0, 300.0));
        assert_eq!((bounds.width, bounds.height), (600.0, 300.0));

        assert!(bounds.set_available_space(400.0, 1000.0));
        assert_eq!((bounds.width, bounds.height), (400.0, 200.0));

        assert!(!bounds.set_available_space(400.0, 900.0));
    }

    #[test]
    #[should_panic(expected = "zero dimensions")]
    fn test_zero_available_space_panics() {
        ScreenBounds::default().set_available_space(0.0, 100.0);
    }

    #[test]
    fn test_pixel_to_clip() {
        let mut bounds = ScreenBounds::default();
        bounds.set_available_space(400.0, 200.0);
        bounds.set_position(100.0, 50.0);

        assert_eq!(bounds.to_clip(Vec2::new(100.0, 50.0)), Vec2::new(-1.0, -1.0));
        assert_eq!(bounds.to_clip(Vec2::new(300.0, 150.0)), Vec2::new(0.0, 0.0));
        assert_eq!(bounds.to_clip(Vec2::new(500.0, 250.0)), Vec2::new(1.0, 1.0));
        assert!(!is_inside_clip(bounds.to_clip(Vec2::new(99.0, 100.0))));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut camera = Camera::new(ZoomSettings::default());
        for _ in 0..30 {
            camera.zoom(true);
        }
        assert_eq!(camera.scale(), 2.0);
        assert!(!camera.zoom(true));

        for _ in 0..30 {
            camera.zoom(false);
        }
        assert_eq!(camera.scale(), 0.1);
        assert!(camera.zoom(true));
    }

    #[test]
    fn test_camera_drag_commits_on_release() {
        let mut camera = Camera::new(ZoomSettings::default());
        assert!(!camera.update_drag(Vec2::new(0.5, 0.5)));

        camera.begin_drag(Vec2::new(0.0, 0.0));
        assert!(camera.update_drag(Vec2::new(0.1, -0.2)));
        assert_near(camera.drag_offset(), Vec2::new(20.0, -20.0));
        assert_eq!(camera.position(), Vec2::ZERO);

        assert!(camera.update_drag(Vec2::new(0.5, 0.5)));
        assert_near(camera.drag_offset(), Vec2::new(100.0, 50.0));

        assert!(camera.end_drag());
        assert_near(camera.position(), Vec2::new(100.0, 50.0));
        assert_eq!(camera.drag_offset(), Vec2::ZERO);
        assert!(!camera.end_drag());
    }

    #[test]
    fn test_clip_world_roundtrip() {
        let mut camera = Camera::new(ZoomSettings::default());
        camera.set(Vec2::new(30.0, -12.0), 1.5);
        let world = Vec2::new(17.0, 4.0);
        assert_near(camera.clip_to_world(camera.world_to_clip(world)), world);
    }

    #[test]
    fn test_show_entire_graph() {
        let shapes = ShapeTable::new();
        let mut project = Project::new();
        project
            .add_target(Target::new("a", TargetType::StaticLibrary).with_position(-50.0, 0.0))
            .unwrap();
        project
            .add_target(Target::new("b", TargetType::StaticLibrary).with_position(150.0, 0.0))
            .unwrap();

        let mut camera = Camera::new(ZoomSettings::default());
        camera.show_entire_graph(&project, &shapes, 10.0);

        // Bounds x in [-60, 160], y in [-7, 7]
        assert!((camera.scale() - 400.0 / 220.0).abs() < 1e-4);
        assert_near(camera.position(), Vec2::new(-50.0 * camera.scale(), 0.0));
        assert_near(camera.world_to_clip(Vec2::new(-60.0, 0.0)), Vec2::new(-1.0, 0.0));
        assert_near(camera.world_to_clip(Vec2::new(160.0, 0.0)), Vec2::new(1.0, 0.0));
    }

    #[test]
    fn test_target_drag_follows_pointer_without_drift() {
        let mut drag = TargetDrag::default();
        assert_eq!(drag.update(Vec2::new(1.0, 1.0)), None);

        drag.begin(TargetIndex(3), Vec2::new(10.0, 10.0), Vec2::new(12.0, 9.0));
        for step in 0..100 {
            let pointer = Vec2::new(12.0 + step as f32 * 0.1, 9.0);
            let (target, position) = drag.update(pointer).unwrap();
            assert_eq!(target, TargetIndex(3));
            assert_near(position, pointer - Vec2::new(2.0, -1.0));
        }
        assert!(drag.end());
        assert!(!drag.is_active());
        assert!(!drag.end());
    }
}
