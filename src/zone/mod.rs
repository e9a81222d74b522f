// src/zone/mod.rs
pub mod graph;
pub mod partition;
pub mod png;
pub mod repair;

use crate::grid::{NO_ZONE, TileGrid};
use crate::region::TileRegion;

/// Зона карты: именованная связная область со своим семенем роста.
///
/// Площадь и кромки зоны — кэш поверх пер-тайловых меток сетки;
/// после чужих правок меток кэш перечитывается через `read_from_map`.
#[derive(Debug, Clone)]
pub struct TileZone {
    pub index: i32,
    pub id: String,
    /// Тайл-семя, всегда принадлежит зоне
    pub seed: u32,
    pub relative_size: i64,
    pub absolute_area: i64,
    pub radius: i64,
    pub area: TileRegion,
    pub inner_edge: TileRegion,
}

impl TileZone {
    #[must_use]
    pub fn placed_area(&self) -> i64 {
        self.area.len() as i64
    }

    #[must_use]
    pub fn area_deficit(&self) -> i64 {
        self.absolute_area - self.placed_area()
    }

    /// Перечитывает зону из пер-тайловых меток: кольцевой обход от семени
    /// по тайлам со своей меткой. Отрезанные фрагменты в зону не попадают.
    pub fn read_from_map(&mut self, grid: &TileGrid) {
        self.area = TileRegion::new();
        self.area.insert(self.seed);
        self.update_edges(grid);

        while !self.inner_edge.is_empty() {
            let mut ring = TileRegion::new();
            for cell in self.inner_edge.iter() {
                for next in grid.neighbors(cell, false) {
                    if !self.area.contains(next) && grid.zone_of(next) == self.index {
                        ring.insert(next);
                    }
                }
            }
            self.area.extend_with(&ring);
            self.inner_edge = ring;
        }
        self.update_edges(grid);
    }

    /// Пересобирает внутреннюю кромку по текущей площади
    pub fn update_edges(&mut self, grid: &TileGrid) {
        self.inner_edge = self.area.inner_edge(grid, false);
    }

    /// Штампует метку зоны на все её тайлы
    pub fn write_to_map(&self, grid: &mut TileGrid) {
        for cell in self.area.iter() {
            grid.set_zone(cell, self.index);
        }
    }

    /// Одно кольцо роста: занимает соседние свободные тайлы,
    /// при `allow_consuming` — и тайлы чужих зон.
    /// Новое кольцо сразу штампуется и становится кромкой.
    pub fn grow_once_to_unzoned(&mut self, grid: &mut TileGrid, allow_consuming: bool) {
        let mut ring = TileRegion::new();
        for cell in self.inner_edge.iter() {
            for next in grid.neighbors(cell, false) {
                let zone = grid.zone_of(next);
                if zone == NO_ZONE || (allow_consuming && zone != self.index) {
                    ring.insert(next);
                }
            }
        }
        for cell in ring.iter() {
            grid.set_zone(cell, self.index);
            self.area.insert(cell);
        }
        self.inner_edge = ring;
    }

    /// Растит зону кольцами, пока дефицит площади не упадёт ниже порога
    /// (в процентах от целевой площади) или расти станет некуда.
    pub fn fill_deficit(&mut self, grid: &mut TileGrid, threshold_percent: i64, allow_consuming: bool) {
        let allowed_deficit = self.absolute_area * threshold_percent / 100;
        while !self.inner_edge.is_empty() {
            if self.area_deficit() < allowed_deficit {
                break;
            }
            self.grow_once_to_unzoned(grid, allow_consuming);
        }
        self.update_edges(grid);
    }

    /// Дорастает зону на все достижимые свободные тайлы
    pub fn fill_the_rest(&mut self, grid: &mut TileGrid) {
        while !self.inner_edge.is_empty() {
            self.grow_once_to_unzoned(grid, false);
        }
        self.update_edges(grid);
    }
}
