//! Colors and draw ordering for targets and connections.
//!
//! A `GraphTheme` is built once by the embedding application and passed to whatever renders the
//! graph.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]`, as uploaded to shaders.
    pub fn to_f32_array(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    pub fn darken(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) * (1.0 - factor)) as u8,
            g: ((self.g as f32) * (1.0 - factor)) as u8,
            b: ((self.b as f32) * (1.0 - factor)) as u8,
            a: self.a,
        }
    }

    pub fn lighten(&self, factor: f32) -> Self {
        Self {
            r: ((self.r as f32) + (255.0 - self.r as f32) * factor) as u8,
            g: ((self.g as f32) + (255.0 - self.g as f32) * factor) as u8,
            b: ((self.b as f32) + (255.0 - self.b as f32) * factor) as u8,
            a: self.a,
        }
    }
}

/// Interaction state of a target or connection. Selection wins over focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Highlight {
    #[default]
    Normal,
    Focused,
    Selected,
}

impl Highlight {
    pub const ALL: [Highlight; 3] = [Highlight::Normal, Highlight::Focused, Highlight::Selected];

    pub fn resolve(is_focused: bool, is_selected: bool) -> Self {
        if is_selected {
            Highlight::Selected
        } else if is_focused {
            Highlight::Focused
        } else {
            Highlight::Normal
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeColors {
    pub fill: Color,
    pub fill_focused: Color,
    pub fill_selected: Color,
    pub outline: Color,
    pub text: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConnectionColors {
    pub normal: Color,
    pub focused: Color,
    pub selected: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphTheme {
    pub background: Color,
    pub node: NodeColors,
    pub connection: ConnectionColors,
}

impl Default for GraphTheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl GraphTheme {
    pub fn dark() -> Self {
        let fill = Color::rgb(70, 110, 160);
        Self {
            background: Color::rgb(30, 30, 34),
            node: NodeColors {
                fill,
                fill_focused: fill.lighten(0.25),
                fill_selected: Color::rgb(200, 160, 80),
                outline: Color::rgb(20, 20, 20),
                text: Color::rgb(240, 240, 240),
            },
            connection: ConnectionColors {
                normal: Color::rgb(150, 150, 150),
                focused: Color::rgb(230, 230, 230),
                selected: Color::rgb(230, 180, 90),
            },
        }
    }

    pub fn light() -> Self {
        let fill = Color::rgb(120, 165, 215);
        Self {
            background: Color::rgb(245, 245, 245),
            node: NodeColors {
                fill,
                fill_focused: fill.darken(0.15),
                fill_selected: Color::rgb(225, 175, 70),
                outline: Color::rgb(40, 40, 40),
                text: Color::rgb(20, 20, 20),
            },
            connection: ConnectionColors {
                normal: Color::rgb(110, 110, 110),
                focused: Color::rgb(30, 30, 30),
                selected: Color::rgb(190, 120, 20),
            },
        }
    }

    pub fn node_fill(&self, highlight: Highlight) -> Color {
        match highlight {
            Highlight::Normal => self.node.fill,
            Highlight::Focused => self.node.fill_focused,
            Highlight::Selected => self.node.fill_selected,
        }
    }

    pub fn connection_color(&self, highlight: Highlight) -> Color {
        match highlight {
            Highlight::Normal => self.connection.normal,
            Highlight::Focused => self.connection.focused,
            Highlight::Selected => self.connection.selected,
        }
    }
}

/// Depth of a target for depth-tested rendering; larger values are drawn on top.
pub fn depth_value(highlight: Highlight, for_text: bool) -> f32 {
    const DEPTH_DEFAULT: f32 = 0.0;
    const DEPTH_SELECTED: f32 = 0.1;
    const DEPTH_FOCUSED: f32 = 0.2;
    const TEXT_OFFSET: f32 = 0.01;

    let depth = match highlight {
        Highlight::Normal => DEPTH_DEFAULT,
        Highlight::Focused => DEPTH_FOCUSED,
        Highlight::Selected => DEPTH_SELECTED,
    };
    if for_text { depth + TEXT_OFFSET } else { depth }
}
