//! Layout and connection projection for CMake target graphs.

pub mod connections;
pub mod geometry;
pub mod graph;
pub mod hit_tester;
pub mod layout;
pub mod settings;
pub mod shapes;
pub mod style;
pub mod target_graph;
pub mod viewport;

pub use connections::{Bucket, ConnectionData, Connections, DrawCall, LineStyle, Stipple};
pub use geometry::{Rect, Segment, Vec2};
pub use graph::{LayoutGraph, LayoutNode};
pub use hit_tester::{HitResult, HitTester};
pub use layout::{LayeredLayouter, Layout, Layouter, apply_layout};
pub use settings::{GraphSettings, SettingsError, ZoomSettings};
pub use shapes::{ShapeInfo, ShapeTable};
pub use style::{Color, GraphTheme, Highlight, depth_value};
pub use target_graph::{ChangeFlags, PointerInput, TargetGraph};
pub use viewport::{Camera, ScreenBounds, TargetDrag};
