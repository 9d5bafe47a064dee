//! Pass orchestration: board nodes and edges in, a flat cell list out.
//!
//! Passes run in a fixed order (groups, tables, other shapes, edges) so that
//! every container is registered before anything that nests in it or points
//! at it is built.

use tracing::{debug, trace};

use crate::board::{Board, BoardNode, NodeKind};
use crate::build::edge::EdgeBuilder;
use crate::build::group::build_group;
use crate::build::shape::build_shape;
use crate::build::table::TableBuilder;
use crate::build::CellRegistry;
use crate::cell::Cell;
use crate::ids::IdAllocator;
use crate::options::ConversionOptions;

/// Output of the passes. The allocator is handed on so that decorations added
/// later (title, links) cannot collide with built cells.
#[derive(Debug)]
pub struct CellGraph {
    pub cells: Vec<Cell>,
    pub ids: IdAllocator,
}

pub struct Transformer<'a> {
    options: &'a ConversionOptions,
}

impl<'a> Transformer<'a> {
    pub fn new(options: &'a ConversionOptions) -> Self {
        Self { options }
    }

    pub fn run(&self, board: &Board) -> CellGraph {
        let mut ids = IdAllocator::new();
        let mut registry = CellRegistry::new();
        let mut cells = vec![Cell::root(), Cell::layer()];

        if self.options.include_group_zones {
            let groups = by_y(board, |k| *k == NodeKind::GroupZone);
            debug!(count = groups.len(), "building group zones");
            for node in groups {
                let label = node.label().unwrap_or(&node.id);
                let cell_id = ids.allocate(&format!("group_{}", label));
                let parent = registry.parent_of(node);
                registry.register_node(node, &cell_id);
                cells.push(build_group(node, cell_id, &parent, self.options.show_descriptions));
            }
        }

        let tables = by_y(board, |k| *k == NodeKind::Table);
        debug!(count = tables.len(), "building tables");
        let table_builder = TableBuilder::new(self.options);
        for node in tables {
            let parent = registry.parent_of(node);
            let built = table_builder.build(node, &parent, &mut ids, &mut registry);
            trace!(node = %node.id, cell = %built.table_id, cells = built.cells.len(), "table built");
            registry.register_node(node, &built.table_id);
            cells.extend(built.cells);
        }

        let shapes = by_y(board, |k| {
            !matches!(k, NodeKind::Table | NodeKind::GroupZone) && !k.is_skipped()
        });
        debug!(count = shapes.len(), "building shapes");
        for node in shapes {
            let label = node.label().unwrap_or(&node.id);
            let cell_id = ids.allocate(&format!("{}_{}", node.kind.as_str(), label));
            let parent = registry.parent_of(node);
            registry.register_node(node, &cell_id);
            cells.push(build_shape(node, cell_id, &parent, self.options.show_descriptions));
        }

        let edge_builder = EdgeBuilder::new(self.options);
        let mut dropped = 0usize;
        for edge in &board.edges {
            match edge_builder.build(edge, &mut ids, &registry) {
                Some(cell) => cells.push(cell),
                None => {
                    dropped += 1;
                    debug!(
                        edge = %edge.id,
                        source = %edge.source,
                        target = %edge.target,
                        source_resolved = registry.node_cell(&edge.source).is_some(),
                        target_resolved = registry.node_cell(&edge.target).is_some(),
                        "dropping edge with unresolved endpoint"
                    );
                }
            }
        }
        debug!(
            edges = board.edges.len() - dropped,
            dropped,
            cells = cells.len(),
            "transform finished"
        );

        CellGraph { cells, ids }
    }
}

/// Nodes matching `keep`, in ascending Y. Ties keep input order.
fn by_y(board: &Board, keep: impl Fn(&NodeKind) -> bool) -> Vec<&BoardNode> {
    let mut nodes: Vec<&BoardNode> = board.nodes.iter().filter(|n| keep(&n.kind)).collect();
    nodes.sort_by(|a, b| a.position.y.total_cmp(&b.position.y));
    nodes
}
