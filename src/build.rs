//! Cell builders, one per node family plus edges.
//!
//! Builders never reach for shared state: the id allocator and the
//! [`CellRegistry`] are passed in by the orchestrator.

pub mod edge;
pub mod group;
pub mod shape;
pub mod table;

use crate::board::BoardNode;
use crate::cell::{Bounds, LAYER_ID};
use std::collections::HashMap;

/// Node id → cell id lookups filled while nodes are built and read back when
/// edges are resolved.
#[derive(Debug, Default)]
pub struct CellRegistry {
    node_cells: HashMap<String, String>,
    field_cells: HashMap<String, String>,
    display_names: HashMap<String, String>,
}

impl CellRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_node(&mut self, node: &BoardNode, cell_id: &str) {
        self.node_cells.insert(node.id.clone(), cell_id.to_string());
        self.display_names.insert(node.id.clone(), node.display_name());
    }

    pub fn node_cell(&self, node_id: &str) -> Option<&str> {
        self.node_cells.get(node_id).map(String::as_str)
    }

    pub fn register_field(&mut self, node_id: &str, field: &str, cell_id: &str) {
        self.field_cells
            .insert(field_key(node_id, field), cell_id.to_string());
    }

    pub fn field_cell(&self, node_id: &str, field: &str) -> Option<&str> {
        self.field_cells
            .get(&field_key(node_id, field))
            .map(String::as_str)
    }

    pub fn display_name<'a>(&'a self, node_id: &'a str) -> &'a str {
        self.display_names
            .get(node_id)
            .map_or(node_id, String::as_str)
    }

    /// Container a node nests in: its registered parent, else the layer.
    pub fn parent_of(&self, node: &BoardNode) -> String {
        node.parent_id
            .as_deref()
            .and_then(|p| self.node_cell(p))
            .unwrap_or(LAYER_ID)
            .to_string()
    }
}

fn field_key(node_id: &str, field: &str) -> String {
    format!("{}.{}", node_id, field)
}

/// Node position rounded to whole pixels, sized from the node or the defaults.
pub fn node_bounds(node: &BoardNode, default_width: f64, default_height: f64) -> Bounds {
    Bounds::new(
        node.position.x.round(),
        node.position.y.round(),
        node.width.filter(|w| *w > 0.0).unwrap_or(default_width),
        node.height.filter(|h| *h > 0.0).unwrap_or(default_height),
    )
}
