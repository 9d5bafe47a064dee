//! The cell graph: one flat list of vertices and edges linked by parent ids.

use crate::style::Style;

/// Id of the absolute root cell.
pub const ROOT_ID: &str = "0";
/// Id of the default layer every top-level cell hangs off.
pub const LAYER_ID: &str = "1";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    pub fn center_y(&self) -> f64 {
        self.y + self.height / 2.0
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Bounds::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

/// Vertex geometry, relative to the parent cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub bounds: Bounds,
    /// Size of the opposite collapse state.
    pub alternate: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Absolute root `"0"`.
    Root,
    /// Default layer `"1"`.
    Layer,
    Vertex(Geometry),
    Edge { source: String, target: String },
}

/// One visual primitive.
///
/// `value` and `tooltip` hold plain text; escaping happens when the document
/// is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub id: String,
    pub kind: CellKind,
    pub value: Option<String>,
    pub style: Option<Style>,
    pub parent: Option<String>,
    pub connectable: Option<bool>,
    pub collapsed: Option<bool>,
    pub tooltip: Option<String>,
    /// Click-through URL.
    pub link: Option<String>,
}

impl Cell {
    pub fn root() -> Self {
        Self::bare(ROOT_ID.to_string(), CellKind::Root, None)
    }

    pub fn layer() -> Self {
        Self::bare(LAYER_ID.to_string(), CellKind::Layer, Some(ROOT_ID.to_string()))
    }

    pub fn vertex(id: String, parent: &str, bounds: Bounds) -> Self {
        Self::bare(
            id,
            CellKind::Vertex(Geometry {
                bounds,
                alternate: None,
            }),
            Some(parent.to_string()),
        )
    }

    pub fn edge(id: String, source: String, target: String) -> Self {
        Self::bare(
            id,
            CellKind::Edge { source, target },
            Some(LAYER_ID.to_string()),
        )
    }

    fn bare(id: String, kind: CellKind, parent: Option<String>) -> Self {
        Self {
            id,
            kind,
            value: None,
            style: None,
            parent,
            connectable: None,
            collapsed: None,
            tooltip: None,
            link: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.tooltip = Some(tooltip.into());
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn is_vertex(&self) -> bool {
        matches!(self.kind, CellKind::Vertex(_))
    }

    pub fn is_edge(&self) -> bool {
        matches!(self.kind, CellKind::Edge { .. })
    }

    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            CellKind::Vertex(g) => Some(g),
            _ => None,
        }
    }

    pub fn geometry_mut(&mut self) -> Option<&mut Geometry> {
        match &mut self.kind {
            CellKind::Vertex(g) => Some(g),
            _ => None,
        }
    }
}
