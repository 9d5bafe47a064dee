//! Document assembly: everything around the cell graph that the markup writer
//! needs (page geometry, viewport, metadata) plus the decoration cells that
//! depend on where the content ended up.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cell::{Bounds, Cell, CellKind, LAYER_ID};
use crate::ids::IdAllocator;
use crate::measure::TextMetrics;
use crate::options::{clamp_zoom, ConversionOptions, FontWeight, TitleDisplay, TitlePosition};
use crate::style::Style;
use crate::transform::CellGraph;

pub const DEFAULT_DX: f64 = 1422.0;
pub const DEFAULT_DY: f64 = 794.0;
const DEFAULT_PAGE: (u32, u32) = (827, 1169);

/// Gap between the content and a title or link placed next to it.
const DECORATION_GAP: f64 = 20.0;
const LINK_FONT_SIZE: f64 = 11.0;
const LINK_COLOR: &str = "#0066cc";

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub width: u32,
    pub height: u32,
    /// Initial zoom, written as `pageScale`.
    pub scale: f64,
    pub dx: f64,
    pub dy: f64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            width: DEFAULT_PAGE.0,
            height: DEFAULT_PAGE.1,
            scale: 1.0,
            dx: DEFAULT_DX,
            dy: DEFAULT_DY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub modified: DateTime<Utc>,
    /// Document properties, empty when the caller gave none.
    pub metadata: Vec<(String, String)>,
    pub page: Page,
    pub cells: Vec<Cell>,
}

impl Document {
    pub fn assemble(graph: CellGraph, options: &ConversionOptions, modified: DateTime<Utc>) -> Self {
        let CellGraph { mut cells, mut ids } = graph;
        let content = content_bounds(&cells);

        let (width, height) = options
            .page_settings
            .as_ref()
            .map_or(DEFAULT_PAGE, |p| p.resolve());

        let mut decorator = Decorator {
            ids: &mut ids,
            metrics: TextMetrics::default(),
            anchor: content.unwrap_or(Bounds::new(0.0, 0.0, f64::from(width), 0.0)),
            below: 0.0,
        };
        if let Some(display) = options.title_display.as_ref().filter(|t| t.show) {
            cells.push(decorator.title(&options.title, display));
        }
        if let Some(url) = options
            .metadata
            .as_ref()
            .and_then(|m| m.repository.as_deref())
            .filter(|r| !r.trim().is_empty())
        {
            cells.push(decorator.repository_link(url.trim()));
        }

        let bounds = content_bounds(&cells);
        let scale = round2(clamp_zoom(options.viewport.as_ref().map_or(1.0, |v| v.zoom())));

        let (dx, dy) = match (&options.viewport, bounds) {
            (Some(viewport), Some(b)) if viewport.auto_fit || viewport.center_content => (
                (f64::from(width) / 2.0 - b.center_x() * scale).round(),
                (f64::from(height) / 2.0 - b.center_y() * scale).round(),
            ),
            _ => (DEFAULT_DX, DEFAULT_DY),
        };
        debug!(width, height, scale, dx, dy, "page resolved");

        let metadata = options
            .metadata
            .as_ref()
            .filter(|m| !m.is_empty())
            .map(|m| m.properties())
            .unwrap_or_default();

        Document {
            title: options.title.clone(),
            modified,
            metadata,
            page: Page {
                width,
                height,
                scale,
                dx,
                dy,
            },
            cells,
        }
    }
}

struct Decorator<'a> {
    ids: &'a mut IdAllocator,
    metrics: TextMetrics,
    anchor: Bounds,
    /// Space already taken below the content by earlier decorations.
    below: f64,
}

impl Decorator<'_> {
    fn title(&mut self, title: &str, display: &TitleDisplay) -> Cell {
        let font_size = f64::from(display.font_size);
        let (width, height) = self.metrics.label_box(title, font_size);

        let (x, align) = match display.position {
            TitlePosition::TopLeft | TitlePosition::BottomLeft => (self.anchor.x, "left"),
            TitlePosition::TopCenter | TitlePosition::BottomCenter => {
                (self.anchor.center_x() - width / 2.0, "center")
            }
            TitlePosition::TopRight | TitlePosition::BottomRight => {
                (self.anchor.right() - width, "right")
            }
        };
        let y = if display.position.is_top() {
            self.anchor.y - DECORATION_GAP - height
        } else {
            self.next_below(height)
        };

        let style = text_style()
            .with("align", align)
            .with("fontSize", display.font_size)
            .with(
                "fontStyle",
                match display.font_weight {
                    FontWeight::Bold => 1,
                    FontWeight::Normal => 0,
                },
            )
            .with("fontColor", display.color.as_str());

        let id = self.ids.allocate(&format!("title_{}", title));
        Cell::vertex(id, LAYER_ID, Bounds::new(x.round(), y.round(), width, height))
            .with_value(title)
            .with_style(style)
    }

    fn repository_link(&mut self, url: &str) -> Cell {
        let (width, height) = self.metrics.label_box(url, LINK_FONT_SIZE);
        let y = self.next_below(height);

        let style = text_style()
            .with("align", "left")
            .with("fontSize", LINK_FONT_SIZE)
            .with("fontColor", LINK_COLOR)
            .with("fontStyle", 4);

        let id = self.ids.allocate("repository_link");
        Cell::vertex(id, LAYER_ID, Bounds::new(self.anchor.x.round(), y.round(), width, height))
            .with_value(format!("<a href=\"{}\">{}</a>", url, url))
            .with_style(style)
            .with_link(url)
    }

    fn next_below(&mut self, height: f64) -> f64 {
        let y = self.anchor.bottom() + self.below + DECORATION_GAP;
        self.below += DECORATION_GAP + height;
        y
    }
}

fn text_style() -> Style {
    Style::new()
        .with("text", 1)
        .with("html", 1)
        .with("verticalAlign", "middle")
        .with("strokeColor", "none")
        .with("fillColor", "none")
        .with("whiteSpace", "wrap")
}

/// Union of every visible vertex in absolute coordinates, or `None` without
/// vertices. Children of a collapsed container are hidden and do not count.
pub fn content_bounds(cells: &[Cell]) -> Option<Bounds> {
    let by_id: HashMap<&str, &Cell> = cells.iter().map(|c| (c.id.as_str(), c)).collect();

    cells
        .iter()
        .filter_map(|cell| absolute_bounds(cell, &by_id, cells.len()))
        .reduce(|acc, b| acc.union(&b))
}

/// Child geometry is relative to its container, so add up the offsets of
/// every vertex ancestor. `None` for non-vertices and hidden vertices.
fn absolute_bounds(cell: &Cell, by_id: &HashMap<&str, &Cell>, max_depth: usize) -> Option<Bounds> {
    let mut bounds = cell.geometry()?.bounds;
    let mut parent = cell.parent.as_deref();
    let mut depth = 0;

    while let Some(id) = parent {
        let Some(ancestor) = by_id.get(id) else {
            break;
        };
        let CellKind::Vertex(geometry) = &ancestor.kind else {
            break;
        };
        if ancestor.collapsed == Some(true) {
            return None;
        }
        depth += 1;
        if depth > max_depth {
            break;
        }
        bounds.x += geometry.bounds.x;
        bounds.y += geometry.bounds.y;
        parent = ancestor.parent.as_deref();
    }
    Some(bounds)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
