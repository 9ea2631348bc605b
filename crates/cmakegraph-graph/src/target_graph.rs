use crate::connections::{ConnectionData, Connections};
use crate::geometry::Vec2;
use crate::hit_tester::HitTester;
use crate::layout::{LayeredLayouter, Layout, apply_layout};
use crate::settings::{GraphSettings, SettingsError};
use crate::shapes::ShapeTable;
use crate::style::Highlight;
use crate::viewport::{Camera, ScreenBounds, TargetDrag, is_inside_clip, normalize_positions};
use bitflags::bitflags;
use cmakegraph_core::{DependencyKinds, Project, TargetIndex};

bitflags! {
    /// Persistent state touched by an update, for whoever saves the project.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChangeFlags: u8 {
        const NODE_POSITION = 1 << 0;
        const CAMERA_POSITION = 1 << 1;
        const SELECTED_TARGET = 1 << 2;
    }
}

/// Pointer state for one frame, in window pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerInput {
    pub position: Vec2,
    pub previous_position: Vec2,
    pub left_pressed: bool,
    pub left_released: bool,
    /// Positive values zoom in.
    pub wheel: f32,
}

impl PointerInput {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            previous_position: position,
            ..Self::default()
        }
    }

    pub fn moved(from: Vec2, to: Vec2) -> Self {
        Self {
            position: to,
            previous_position: from,
            ..Self::default()
        }
    }

    pub fn has_moved(&self) -> bool {
        self.position != self.previous_position
    }
}

/// Interactive target graph: owns the project and keeps connections, focus and selection in
/// sync with pointer input.
///
/// Everything runs on the caller's thread. Every change that affects connections recomputes them
/// immediately.
pub struct TargetGraph {
    project: Project,
    settings: GraphSettings,
    shapes: ShapeTable,
    bounds: ScreenBounds,
    camera: Camera,
    target_drag: TargetDrag,
    connections: Connections,
    hit_tester: HitTester,
    config: String,
    filter: DependencyKinds,
    focused_target: Option<TargetIndex>,
    selected_target: Option<TargetIndex>,
    focused_connection: Option<usize>,
}

impl TargetGraph {
    /// Takes over a project with positions in an arbitrary space and maps them to world space.
    ///
    /// The first config of the project becomes the active one.
    pub fn new(mut project: Project, settings: GraphSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        project.derive_data();
        normalize_positions(&mut project, settings.node_scale);
        let config = project.configs().first().cloned().unwrap_or_default();

        let mut graph = Self {
            camera: Camera::new(settings.zoom),
            hit_tester: HitTester::new(settings.node_scale),
            project,
            settings,
            shapes: ShapeTable::new(),
            bounds: ScreenBounds::default(),
            target_drag: TargetDrag::default(),
            connections: Connections::new(),
            config,
            filter: DependencyKinds::default(),
            focused_target: None,
            selected_target: None,
            focused_connection: None,
        };
        graph.refresh_topology();
        Ok(graph)
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn settings(&self) -> &GraphSettings {
        &self.settings
    }

    pub fn shapes(&self) -> &ShapeTable {
        &self.shapes
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn bounds(&self) -> ScreenBounds {
        self.bounds
    }

    pub fn connections(&self) -> &Connections {
        &self.connections
    }

    pub fn config(&self) -> &str {
        &self.config
    }

    pub fn dependency_filter(&self) -> DependencyKinds {
        self.filter
    }

    pub fn focused_target(&self) -> Option<TargetIndex> {
        self.focused_target
    }

    pub fn selected_target(&self) -> Option<TargetIndex> {
        self.selected_target
    }

    /// Connection under the pointer, only tracked while no target is focused.
    pub fn focused_connection(&self) -> Option<&ConnectionData> {
        self.focused_connection
            .and_then(|i| self.connections.connections().get(i))
    }

    pub fn is_dragging_target(&self) -> bool {
        self.target_drag.is_active()
    }

    pub fn highlight_of(&self, target: TargetIndex) -> Highlight {
        Highlight::resolve(
            self.focused_target == Some(target),
            self.selected_target == Some(target),
        )
    }

    /// # Panics
    ///
    /// Panics if either dimension is zero.
    pub fn set_available_space(&mut self, width: f32, height: f32) -> bool {
        self.bounds.set_available_space(width, height)
    }

    pub fn set_screen_position(&mut self, x: f32, y: f32) {
        self.bounds.set_position(x, y);
    }

    pub fn set_config(&mut self, config: &str) {
        if self.config == config {
            return;
        }
        self.config = config.to_string();
        self.refresh_topology();
    }

    pub fn set_dependency_filter(&mut self, filter: DependencyKinds) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.refresh_topology();
    }

    /// Returns true when the focus changed.
    pub fn set_focused_target(&mut self, target: Option<TargetIndex>) -> bool {
        if self.focused_target == target {
            return false;
        }
        self.focused_target = target;
        self.refresh_connections();
        true
    }

    /// Returns true when the selection changed.
    pub fn set_selected_target(&mut self, target: Option<TargetIndex>) -> bool {
        if self.selected_target == target {
            return false;
        }
        self.selected_target = target;
        self.refresh_connections();
        true
    }

    pub fn set_hide_connections(&mut self, target: TargetIndex, hide: bool) {
        let Some(target) = self.project.target_mut(target) else {
            return;
        };
        if target.graphical.hide_connections != hide {
            target.graphical.hide_connections = hide;
            self.refresh_connections();
        }
    }

    /// Processes one frame of pointer input.
    pub fn update(&mut self, input: &PointerInput) -> ChangeFlags {
        let mut changes = ChangeFlags::empty();

        let clip = self.bounds.to_clip(input.position);
        let pointer_inside = is_inside_clip(clip);
        let pointer_world = self.camera.clip_to_world(clip);

        if pointer_inside && !self.target_drag.is_active() {
            let focused = self.hit_tester.hit_test_target(&self.shapes, pointer_world);
            self.set_focused_target(focused);
        } else {
            self.set_focused_target(None);
        }

        self.focused_connection = None;
        if pointer_inside && !self.target_drag.is_active() && self.focused_target.is_none() {
            self.focused_connection = self.hit_tester.hit_test_connection(pointer_world);
        }

        if input.has_moved() {
            if let Some((index, position)) = self.target_drag.update(pointer_world) {
                if let Some(target) = self.project.target_mut(index) {
                    target.graphical.x = position.x;
                    target.graphical.y = position.y;
                }
                self.refresh_connections();
            }
            self.camera.update_drag(clip);
        }

        if pointer_inside && input.left_pressed {
            if self.set_selected_target(self.focused_target) {
                changes |= ChangeFlags::SELECTED_TARGET;
            }

            let drag_start = self.focused_target.and_then(|index| {
                let (x, y) = self.project.target(index)?.position();
                Some((index, Vec2::new(x, y)))
            });
            match drag_start {
                Some((index, position)) => self.target_drag.begin(index, position, pointer_world),
                None => self.camera.begin_drag(clip),
            }
        }

        if input.left_released {
            if self.target_drag.end() {
                changes |= ChangeFlags::NODE_POSITION;
            }
            if self.camera.end_drag() {
                changes |= ChangeFlags::CAMERA_POSITION;
            }
        }

        if pointer_inside && input.wheel != 0.0 && self.camera.zoom(input.wheel > 0.0) {
            changes |= ChangeFlags::CAMERA_POSITION;
        }

        changes
    }

    /// Lays out the active config from scratch and maps the result to world space.
    pub fn reset_layout(&mut self) -> Layout {
        let layouter = LayeredLayouter::from_settings(&self.shapes, &self.settings);
        let layout = apply_layout(&mut self.project, &self.config, &layouter);
        normalize_positions(&mut self.project, self.settings.node_scale);
        self.refresh_connections();
        layout
    }

    pub fn normalize_positions(&mut self) {
        normalize_positions(&mut self.project, self.settings.node_scale);
        self.refresh_connections();
    }

    pub fn show_entire_graph(&mut self) {
        self.camera
            .show_entire_graph(&self.project, &self.shapes, self.settings.node_scale);
    }

    fn refresh_topology(&mut self) {
        self.connections
            .update_topology(&self.project, &self.config, self.filter);
        self.focused_connection = None;
        self.refresh_connections();
    }

    fn refresh_connections(&mut self) {
        self.connections.update(
            &self.project,
            &self.shapes,
            &self.settings,
            self.focused_target,
            self.selected_target,
        );
        self.hit_tester
            .update(&self.project, self.connections.connections());

        let still_drawn = self
            .focused_connection()
            .is_some_and(|connection| connection.hover_quad.is_some());
        if !still_drawn {
            self.focused_connection = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{WORLD_HALF_HEIGHT, WORLD_HALF_WIDTH};
    use cmakegraph_core::{Config, LINK_LIBRARIES, Target, TargetType};

    /// `app` at the left depends on `lib` at the right.
    fn graph() -> TargetGraph {
        let mut project = Project::new();
        project
            .add_target(
                Target::new("app", TargetType::Executable)
                    .with_config(Config::new("Debug").with_property(LINK_LIBRARIES, "lib"))
                    .with_config(Config::new("Release"))
                    .with_position(0.0, 0.0),
            )
            .unwrap();
        project
            .add_target(
                Target::new("lib", TargetType::StaticLibrary)
                    .with_config(Config::new("Debug"))
                    .with_config(Config::new("Release"))
                    .with_position(1000.0, 0.0),
            )
            .unwrap();

        let mut graph = TargetGraph::new(project, GraphSettings::default()).unwrap();
        graph.set_available_space(400.0, 200.0);
        graph.set_screen_position(0.0, 0.0);
        graph
    }

    /// Window pixel over a world position, with the default camera and a 400x200 viewport.
    fn pixel_at(graph: &TargetGraph, world: Vec2) -> Vec2 {
        let clip = graph.camera().world_to_clip(world);
        Vec2::new((clip.x + 1.0) * 200.0, (clip.y + 1.0) * 100.0)
    }

    fn target_world(graph: &TargetGraph, index: usize) -> Vec2 {
        let (x, y) = graph.project().targets()[index].position();
        Vec2::new(x, y)
    }

    #[test]
    fn test_new_normalizes_and_projects() {
        let graph = graph();
        assert_eq!(graph.config(), "Debug");
        for target in graph.project().targets() {
            assert!(target.graphical.x.abs() < WORLD_HALF_WIDTH);
            assert!(target.graphical.y.abs() < WORLD_HALF_HEIGHT);
        }
        assert_eq!(graph.connections().drawn_count(), 1);
    }

    #[test]
    fn test_new_rejects_invalid_settings() {
        let settings = GraphSettings {
            node_scale: -1.0,
            ..GraphSettings::default()
        };
        assert!(TargetGraph::new(Project::new(), settings).is_err());
    }

    #[test]
    fn test_hover_focuses_target() {
        let mut graph = graph();
        let over_app = pixel_at(&graph, target_world(&graph, 0));

        let changes = graph.update(&PointerInput::at(over_app));
        assert_eq!(changes, ChangeFlags::empty());
        assert_eq!(graph.focused_target(), Some(TargetIndex(0)));
        assert_eq!(graph.highlight_of(TargetIndex(0)), Highlight::Focused);
        assert!(graph.focused_connection().is_none());

        graph.update(&PointerInput::at(Vec2::new(-10.0, -10.0)));
        assert_eq!(graph.focused_target(), None);
    }

    #[test]
    fn test_hover_focuses_connection() {
        let mut graph = graph();
        let middle = (target_world(&graph, 0) + target_world(&graph, 1)) * 0.5;

        graph.update(&PointerInput::at(pixel_at(&graph, middle)));
        assert_eq!(graph.focused_target(), None);
        let connection = graph.focused_connection().unwrap();
        assert_eq!((connection.src, connection.dst), (TargetIndex(0), TargetIndex(1)));
    }

    #[test]
    fn test_click_selects_and_drags_target() {
        let mut graph = graph();
        let start_world = target_world(&graph, 0);
        let start = pixel_at(&graph, start_world);

        graph.update(&PointerInput::at(start));
        let changes = graph.update(&PointerInput {
            left_pressed: true,
            ..PointerInput::at(start)
        });
        assert_eq!(changes, ChangeFlags::SELECTED_TARGET);
        assert_eq!(graph.selected_target(), Some(TargetIndex(0)));
        assert!(graph.is_dragging_target());

        let end = start + Vec2::new(20.0, 10.0);
        let changes = graph.update(&PointerInput::moved(start, end));
        assert_eq!(changes, ChangeFlags::empty());
        let moved = target_world(&graph, 0);
        assert!((moved - (start_world + Vec2::new(20.0, 10.0))).length() < 1e-3);

        let changes = graph.update(&PointerInput {
            left_released: true,
            ..PointerInput::at(end)
        });
        assert_eq!(changes, ChangeFlags::NODE_POSITION);
        assert!(!graph.is_dragging_target());
    }

    #[test]
    fn test_click_on_empty_space_drags_camera() {
        let mut graph = graph();
        let empty = Vec2::new(200.0, 190.0);

        let changes = graph.update(&PointerInput {
            left_pressed: true,
            ..PointerInput::at(empty)
        });
        assert_eq!(changes, ChangeFlags::empty());
        assert!(graph.camera().is_dragging());

        graph.update(&PointerInput::moved(empty, empty - Vec2::new(0.0, 40.0)));
        let changes = graph.update(&PointerInput {
            left_released: true,
            ..PointerInput::at(empty - Vec2::new(0.0, 40.0))
        });
        assert_eq!(changes, ChangeFlags::CAMERA_POSITION);
        assert!((graph.camera().position().y + 40.0).abs() < 1e-3);
    }

    #[test]
    fn test_click_on_empty_space_clears_selection() {
        let mut graph = graph();
        graph.set_selected_target(Some(TargetIndex(1)));

        let changes = graph.update(&PointerInput {
            left_pressed: true,
            ..PointerInput::at(Vec2::new(200.0, 190.0))
        });
        assert_eq!(changes, ChangeFlags::SELECTED_TARGET);
        assert_eq!(graph.selected_target(), None);
    }

    #[test]
    fn test_wheel_zooms_only_inside() {
        let mut graph = graph();
        let changes = graph.update(&PointerInput {
            wheel: 1.0,
            ..PointerInput::at(Vec2::new(200.0, 100.0))
        });
        assert_eq!(changes, ChangeFlags::CAMERA_POSITION);
        assert!((graph.camera().scale() - 1.1).abs() < 1e-5);

        let changes = graph.update(&PointerInput {
            wheel: 1.0,
            ..PointerInput::at(Vec2::new(900.0, 100.0))
        });
        assert_eq!(changes, ChangeFlags::empty());
    }

    #[test]
    fn test_config_and_filter_changes_recompute_connections() {
        let mut graph = graph();
        assert_eq!(graph.connections().connections().len(), 1);

        graph.set_config("Release");
        assert!(graph.connections().connections().is_empty());

        graph.set_config("Debug");
        graph.set_dependency_filter(DependencyKinds::INTERFACE);
        assert!(graph.connections().connections().is_empty());

        graph.set_dependency_filter(DependencyKinds::all());
        assert_eq!(graph.connections().drawn_count(), 1);
    }

    #[test]
    fn test_hidden_connections_are_not_drawn() {
        let mut graph = graph();
        graph.set_hide_connections(TargetIndex(0), true);
        assert_eq!(graph.connections().drawn_count(), 0);
        graph.set_hide_connections(TargetIndex(0), false);
        assert_eq!(graph.connections().drawn_count(), 1);
    }

    #[test]
    fn test_reset_layout_stacks_dependency_below_dependent() {
        let mut graph = graph();
        let layout = graph.reset_layout();

        assert_eq!(layout.layers, vec![vec![TargetIndex(0)], vec![TargetIndex(1)]]);
        let app = target_world(&graph, 0);
        let lib = target_world(&graph, 1);
        assert!((app.x - lib.x).abs() < 1e-3);
        assert!(app.y < lib.y);
        assert_eq!(graph.connections().drawn_count(), 1);
    }

    #[test]
    fn test_show_entire_graph_keeps_targets_in_view() {
        let mut graph = graph();
        graph.show_entire_graph();
        for i in 0..2 {
            let clip = graph.camera().world_to_clip(target_world(&graph, i));
            assert!(is_inside_clip(clip), "target {i} at {clip:?}");
        }
    }
}
