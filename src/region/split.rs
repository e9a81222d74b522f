// src/region/split.rs
//! Разбиение области на связные компоненты обходом в ширину

use super::TileRegion;
use crate::grid::TileGrid;
use std::collections::VecDeque;

/// Выделяет связную компоненту области, содержащую тайл `hint`.
///
/// Возвращает `None`, если `hint` не принадлежит области.
#[must_use]
pub fn component_at(
    grid: &TileGrid,
    region: &TileRegion,
    hint: u32,
    diagonal: bool,
) -> Option<TileRegion> {
    if !region.contains(hint) {
        return None;
    }

    let mut component = TileRegion::new();
    let mut queue = VecDeque::new();
    component.insert(hint);
    queue.push_back(hint);

    while let Some(cell) = queue.pop_front() {
        for next in grid.neighbors(cell, diagonal) {
            if region.contains(next) && component.insert(next) {
                queue.push_back(next);
            }
        }
    }

    Some(component)
}

/// Разбивает область на связные компоненты.
///
/// Компоненты собираются от наименьшего оставшегося индекса, поэтому
/// порядок результата детерминирован. Пустая область даёт пустой список.
#[must_use]
pub fn split_connected(grid: &TileGrid, region: &TileRegion, diagonal: bool) -> Vec<TileRegion> {
    let mut remaining = region.clone();
    let mut parts = Vec::new();

    while let Some(start) = remaining.first() {
        // start взят из remaining, компонента существует всегда
        let Some(part) = component_at(grid, &remaining, start, diagonal) else {
            break;
        };
        remaining.remove_all(&part);
        parts.push(part);
    }

    parts
}
