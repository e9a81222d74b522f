// src/zone/graph.rs
use crate::grid::TileGrid;
use crate::region::TileRegion;
use crate::zone::TileZone;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::{HashMap, HashSet};

/// Граф смежности зон: ребро между зонами, чьи тайлы соприкасаются
/// ортогонально. Вес узла — индекс зоны.
pub fn build_zone_graph(grid: &TileGrid, zones: &[TileZone]) -> UnGraph<i32, ()> {
    let mut graph = UnGraph::new_undirected();
    let mut index_to_node: HashMap<i32, NodeIndex> = HashMap::new();

    for zone in zones {
        let node = graph.add_node(zone.index);
        index_to_node.insert(zone.index, node);
    }

    let mut edges = HashSet::new();
    for zone in zones {
        for cell in zone.area.iter() {
            for next in grid.neighbors(cell, false) {
                let other = grid.zone_of(next);
                if other == zone.index || !index_to_node.contains_key(&other) {
                    continue;
                }
                let (a, b) = if zone.index < other {
                    (zone.index, other)
                } else {
                    (other, zone.index)
                };
                if edges.insert((a, b)) {
                    graph.add_edge(index_to_node[&a], index_to_node[&b], ());
                }
            }
        }
    }
    graph
}

/// Приграничная полоса зоны `of` вдоль зоны `along`: тайлы `of`,
/// ортогонально касающиеся `along`. Пустая, если зоны не соседствуют.
#[must_use]
pub fn border_between(grid: &TileGrid, of: &TileZone, along: &TileZone) -> TileRegion {
    of.area.intersect_with(&along.area.outside_edge(grid, false))
}
