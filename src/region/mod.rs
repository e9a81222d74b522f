// src/region/mod.rs
//! Алгебра тайловых областей
//!
//! `TileRegion` — множество тайлов без дубликатов, значение-тип: свободно
//! копируется между компонентами и никогда не хранит ссылок на сетку.
//! Детерминированный порядок обхода важен: на него опираются разбиение
//! заливкой, инициализация k-средних и тесты.

pub mod mask;
pub mod shift;
pub mod split;

use crate::grid::{Direction, TileGrid, TilePos, pos_distance};
use std::collections::BTreeSet;

/// Задача уточнения кромки области
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefineTask {
    /// Присоединить внешние тайлы, окружённые областью с трёх сторон
    RemoveHollows,
    /// Убрать тайлы кромки, держащиеся за область одной стороной
    RemoveSpikes,
    /// Присоединить всю внешнюю кромку в пределах разрешённой области
    Expand,
}

/// Неупорядоченное множество тайлов с теоретико-множественными операциями
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TileRegion {
    tiles: BTreeSet<u32>,
}

impl TileRegion {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn contains(&self, idx: u32) -> bool {
        self.tiles.contains(&idx)
    }

    pub fn insert(&mut self, idx: u32) -> bool {
        self.tiles.insert(idx)
    }

    pub fn remove(&mut self, idx: u32) -> bool {
        self.tiles.remove(&idx)
    }

    /// Наименьший индекс области — детерминированная «первая» точка
    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.tiles.first().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.tiles.iter().copied()
    }

    pub fn extend_with(&mut self, other: &TileRegion) {
        self.tiles.extend(other.iter());
    }

    pub fn remove_all(&mut self, other: &TileRegion) {
        for idx in other.iter() {
            self.tiles.remove(&idx);
        }
    }

    #[must_use]
    pub fn union_with(&self, other: &TileRegion) -> TileRegion {
        self.tiles.union(&other.tiles).copied().collect()
    }

    #[must_use]
    pub fn diff_with(&self, other: &TileRegion) -> TileRegion {
        self.tiles.difference(&other.tiles).copied().collect()
    }

    #[must_use]
    pub fn intersect_with(&self, other: &TileRegion) -> TileRegion {
        self.tiles.intersection(&other.tiles).copied().collect()
    }

    /// Тайлы области, у которых хотя бы один сосед лежит вне её.
    /// Граница карты считается «вне», поэтому прибрежные тайлы входят в кромку.
    #[must_use]
    pub fn inner_edge(&self, grid: &TileGrid, diagonal: bool) -> TileRegion {
        let mut edge = TileRegion::new();
        let count = if diagonal { 8 } else { 4 };
        for cell in self.iter() {
            let surrounded = Direction::ALL[..count]
                .iter()
                .all(|&dir| grid.neighbor(cell, dir).is_some_and(|n| self.contains(n)));
            if !surrounded {
                edge.insert(cell);
            }
        }
        edge
    }

    /// Соседи внутренней кромки, лежащие вне области
    #[must_use]
    pub fn outside_edge(&self, grid: &TileGrid, diagonal: bool) -> TileRegion {
        let mut outside = TileRegion::new();
        for cell in self.inner_edge(grid, diagonal).iter() {
            for n in grid.neighbors(cell, diagonal) {
                if !self.contains(n) {
                    outside.insert(n);
                }
            }
        }
        outside
    }

    /// Один шаг уточнения кромки. Возвращает новую область,
    /// не выходя за пределы `allowed`.
    #[must_use]
    pub fn refined(&self, grid: &TileGrid, task: RefineTask, allowed: &TileRegion) -> TileRegion {
        let mut result = self.clone();
        match task {
            RefineTask::RemoveHollows => {
                for cell in self.outside_edge(grid, false).iter() {
                    if !allowed.contains(cell) {
                        continue;
                    }
                    let adjacent = grid
                        .neighbors(cell, false)
                        .filter(|&n| self.contains(n))
                        .count();
                    if adjacent >= 3 {
                        result.insert(cell);
                    }
                }
            }
            RefineTask::RemoveSpikes => {
                for cell in self.inner_edge(grid, false).iter() {
                    let adjacent = grid
                        .neighbors(cell, false)
                        .filter(|&n| self.contains(n))
                        .count();
                    if adjacent <= 1 {
                        result.remove(cell);
                    }
                }
            }
            RefineTask::Expand => {
                for cell in self.outside_edge(grid, false).iter() {
                    if allowed.contains(cell) {
                        result.insert(cell);
                    }
                }
            }
        }
        result
    }

    /// Ограничивающий прямоугольник области (по плоскости её слоя)
    #[must_use]
    pub fn bounds(&self, grid: &TileGrid) -> Option<(TilePos, TilePos)> {
        let first = grid.pos(self.first()?);
        let mut top_left = first;
        let mut bottom_right = first;
        for cell in self.iter() {
            let pos = grid.pos(cell);
            top_left.x = top_left.x.min(pos.x);
            top_left.y = top_left.y.min(pos.y);
            bottom_right.x = bottom_right.x.max(pos.x);
            bottom_right.y = bottom_right.y.max(pos.y);
        }
        Some((top_left, bottom_right))
    }

    /// Дискретный центроид: среднее арифметическое позиций, привязанное к
    /// реальному тайлу, затем один шаг спуска по восьми соседям к точке
    /// с минимальной суммой расстояний. `None` для пустой области.
    ///
    /// При `ensure_inside` результат гарантированно принадлежит области.
    #[must_use]
    pub fn centroid(&self, grid: &TileGrid, ensure_inside: bool) -> Option<u32> {
        let first = self.first()?;
        let z = grid.pos(first).z;

        let mut sum_x: i64 = 0;
        let mut sum_y: i64 = 0;
        for cell in self.iter() {
            let pos = grid.pos(cell);
            sum_x += i64::from(pos.x);
            sum_y += i64::from(pos.y);
        }
        let size = self.len() as i64;
        let mean = TilePos {
            x: (sum_x / size) as i32,
            y: (sum_y / size) as i32,
            z,
        };
        // среднее координат всегда в пределах карты
        let mut centroid = grid.index(mean)?;

        if ensure_inside && !self.contains(centroid) {
            centroid = self
                .iter()
                .min_by_key(|&cell| (grid.distance_scaled(centroid, cell, 100), cell))?;
        }

        let total_distance = |center: u32| -> i64 {
            let center_pos = grid.pos(center);
            self.iter()
                .map(|cell| pos_distance(center_pos, grid.pos(cell), 100))
                .sum()
        };

        let mut best_score = total_distance(centroid);
        let candidates: Vec<u32> = grid.neighbors(centroid, true).collect();
        for tile in candidates {
            if ensure_inside && !self.contains(tile) {
                continue;
            }
            let score = total_distance(tile);
            if score < best_score {
                best_score = score;
                centroid = tile;
            }
        }

        Some(centroid)
    }
}

impl FromIterator<u32> for TileRegion {
    fn from_iter<T: IntoIterator<Item = u32>>(iter: T) -> Self {
        Self {
            tiles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region_of(grid: &TileGrid, cells: &[(i32, i32)]) -> TileRegion {
        cells
            .iter()
            .map(|&(x, y)| grid.index(TilePos { x, y, z: 0 }).unwrap())
            .collect()
    }

    #[test]
    fn test_set_algebra() {
        let grid = TileGrid::new(8, 8, 1);
        let a = region_of(&grid, &[(0, 0), (1, 0), (2, 0)]);
        let b = region_of(&grid, &[(1, 0), (2, 0), (3, 0)]);

        assert_eq!(a.union_with(&b).len(), 4);
        assert_eq!(a.diff_with(&b).len(), 1);
        assert_eq!(a.intersect_with(&b).len(), 2);
        let shared = grid.index(TilePos { x: 1, y: 0, z: 0 }).unwrap();
        assert!(a.intersect_with(&b).contains(shared));
    }

    #[test]
    fn test_inner_edge_subset_outside_disjoint() {
        let grid = TileGrid::new(10, 10, 1);
        let mut square = TileRegion::new();
        for y in 2..7 {
            for x in 2..7 {
                square.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
            }
        }

        let inner = square.inner_edge(&grid, false);
        let outside = square.outside_edge(&grid, false);

        for cell in inner.iter() {
            assert!(square.contains(cell));
        }
        for cell in outside.iter() {
            assert!(!square.contains(cell));
        }
        // у квадрата 5×5 кромка — периметр из 16 тайлов
        assert_eq!(inner.len(), 16);
        assert_eq!(square.len() - inner.len(), 9);
    }

    #[test]
    fn test_edge_at_map_border() {
        let grid = TileGrid::new(4, 4, 1);
        let mut full = TileRegion::new();
        for idx in 0..16 {
            full.insert(idx);
        }
        // вся карта: кромка — её периметр, внешней кромки нет
        assert_eq!(full.inner_edge(&grid, false).len(), 12);
        assert!(full.outside_edge(&grid, false).is_empty());
    }

    #[test]
    fn test_diagonal_edge_differs() {
        let grid = TileGrid::new(8, 8, 1);
        let mut square = TileRegion::new();
        for y in 1..6 {
            for x in 1..6 {
                square.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
            }
        }
        let outside4 = square.outside_edge(&grid, false);
        let outside8 = square.outside_edge(&grid, true);
        // диагональная внешняя кромка добавляет угловые тайлы
        assert!(outside8.len() > outside4.len());
    }

    #[test]
    fn test_centroid_of_square() {
        let grid = TileGrid::new(10, 10, 1);
        let mut square = TileRegion::new();
        for y in 2..7 {
            for x in 2..7 {
                square.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
            }
        }
        let centroid = square.centroid(&grid, false).unwrap();
        assert_eq!(grid.pos(centroid), TilePos { x: 4, y: 4, z: 0 });
    }

    #[test]
    fn test_centroid_empty_region() {
        let grid = TileGrid::new(4, 4, 1);
        assert_eq!(TileRegion::new().centroid(&grid, false), None);
    }

    #[test]
    fn test_centroid_ensure_inside_ring() {
        let grid = TileGrid::new(16, 16, 1);
        // кольцо: среднее попадает в пустую середину
        let mut ring = TileRegion::new();
        for y in 2..9 {
            for x in 2..9 {
                if x == 2 || x == 8 || y == 2 || y == 8 {
                    ring.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
                }
            }
        }
        let centroid = ring.centroid(&grid, true).unwrap();
        assert!(ring.contains(centroid));
    }

    #[test]
    fn test_refine_remove_spikes() {
        let grid = TileGrid::new(10, 10, 1);
        let mut square = TileRegion::new();
        for y in 2..5 {
            for x in 2..5 {
                square.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
            }
        }
        // одиночный шип сбоку
        let spike = grid.index(TilePos { x: 5, y: 3, z: 0 }).unwrap();
        square.insert(spike);

        let refined = square.refined(&grid, RefineTask::RemoveSpikes, &TileRegion::new());
        assert!(!refined.contains(spike));
        assert_eq!(refined.len(), 9);
    }

    #[test]
    fn test_refine_remove_hollows() {
        let grid = TileGrid::new(10, 10, 1);
        let mut region = TileRegion::new();
        for y in 2..5 {
            for x in 2..6 {
                region.insert(grid.index(TilePos { x, y, z: 0 }).unwrap());
            }
        }
        // вмятина в середине верхней грани
        let hollow = grid.index(TilePos { x: 3, y: 2, z: 0 }).unwrap();
        region.remove(hollow);

        let mut allowed = TileRegion::new();
        for idx in 0..grid.tile_count() as u32 {
            allowed.insert(idx);
        }
        let refined = region.refined(&grid, RefineTask::RemoveHollows, &allowed);
        assert!(refined.contains(hollow));
    }

    #[test]
    fn test_refine_expand_respects_allowed() {
        let grid = TileGrid::new(10, 10, 1);
        let core = region_of(&grid, &[(4, 4), (5, 4)]);
        let allowed = region_of(&grid, &[(4, 4), (5, 4), (3, 4), (4, 3)]);

        let expanded = core.refined(&grid, RefineTask::Expand, &allowed);
        // растёт только в разрешённые тайлы внешней кромки
        assert_eq!(expanded.len(), 4);
        assert!(expanded.contains(grid.index(TilePos { x: 3, y: 4, z: 0 }).unwrap()));
        assert!(!expanded.contains(grid.index(TilePos { x: 6, y: 4, z: 0 }).unwrap()));
    }

    #[test]
    fn test_bounds() {
        let grid = TileGrid::new(10, 10, 1);
        let region = region_of(&grid, &[(3, 4), (5, 2), (4, 6)]);
        let (tl, br) = region.bounds(&grid).unwrap();
        assert_eq!((tl.x, tl.y), (3, 2));
        assert_eq!((br.x, br.y), (5, 6));
    }
}
