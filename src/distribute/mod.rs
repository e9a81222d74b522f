// src/distribute/mod.rs
//! Сегменты зоны и теплокарта заполненности
//!
//! Зона режется на сегменты ограниченной площади, каждый ведёт свою
//! область свободных тайлов и теплокарту. Тепло свободного тайла
//! обратно расстоянию до ближайшего несвободного: кромка сегмента и
//! уже занятые тайлы горячи, дальняя пустота холодна. Рассадка идёт
//! от холодных корзин к горячим, и каждая фиксация подогревает
//! окрестность — объекты расталкиваются по пустоте сами.

pub mod placer;

use crate::grid::TileGrid;
use crate::objects::ObjectPlan;
use crate::region::TileRegion;
use std::collections::{BTreeMap, VecDeque};

/// Корзина теплокарты: свободные тайлы одного тепла
#[derive(Debug, Clone)]
pub struct HeatItem {
    /// Представитель корзины, всегда внутри неё
    pub centroid: u32,
    pub free: TileRegion,
}

/// Сегмент зоны с собственной теплокартой
#[derive(Debug, Clone)]
pub struct ZoneSegment {
    pub zone_index: i32,
    pub segment_index: usize,
    /// Площадь сегмента при нарезке, не меняется
    pub original_area: TileRegion,
    /// Ещё не занятые и не зарезервированные тайлы
    pub free_area: TileRegion,
    pub original_centroid: Option<u32>,
    /// Тепло -> корзина; обход в порядке возрастания даёт холодные первыми
    pub heat_map: BTreeMap<i32, HeatItem>,
}

impl ZoneSegment {
    /// Создаёт сегмент и сразу считает теплокарту.
    /// `blocked` — тайлы, занятые ещё до рассадки (препятствия).
    #[must_use]
    pub fn new(
        grid: &TileGrid,
        zone_index: i32,
        segment_index: usize,
        area: TileRegion,
        blocked: &TileRegion,
        max_heat: i32,
    ) -> Self {
        let free_area = area.diff_with(blocked);
        let original_centroid = area.centroid(grid, true);
        let mut segment = Self {
            zone_index,
            segment_index,
            original_area: area,
            free_area,
            original_centroid,
            heat_map: BTreeMap::new(),
        };
        segment.recalc_heat(grid, max_heat);
        segment
    }

    /// Перестраивает теплокарту по текущей свободной области.
    ///
    /// Волна идёт от «обнажённых» свободных тайлов: граничащих с
    /// несвободными соседями или с краем карты. Расстояние меряется
    /// по восьми направлениям, как и опасные зоны охраны.
    pub fn recalc_heat(&mut self, grid: &TileGrid, max_heat: i32) {
        self.heat_map.clear();

        let mut distance: BTreeMap<u32, i32> = BTreeMap::new();
        let mut queue = VecDeque::new();
        for idx in self.free_area.iter() {
            let mut in_bounds = 0;
            let mut exposed = false;
            for n in grid.neighbors(idx, true) {
                in_bounds += 1;
                if !self.free_area.contains(n) {
                    exposed = true;
                }
            }
            // край карты тоже считается несвободным
            if exposed || in_bounds < 8 {
                distance.insert(idx, 1);
                queue.push_back(idx);
            }
        }
        while let Some(idx) = queue.pop_front() {
            let next_distance = distance[&idx] + 1;
            for n in grid.neighbors(idx, true) {
                if self.free_area.contains(n) && !distance.contains_key(&n) {
                    distance.insert(n, next_distance);
                    queue.push_back(n);
                }
            }
        }

        let mut buckets: BTreeMap<i32, TileRegion> = BTreeMap::new();
        for idx in self.free_area.iter() {
            let Some(&d) = distance.get(&idx) else {
                continue;
            };
            let heat = (max_heat - d).max(0);
            buckets.entry(heat).or_default().insert(idx);
        }
        for (heat, free) in buckets {
            let Some(centroid) = free.centroid(grid, true) else {
                continue;
            };
            self.heat_map.insert(heat, HeatItem { centroid, free });
        }
    }

    /// Исключает область из свободной и перестраивает теплокарту
    pub fn commit(&mut self, grid: &TileGrid, claimed: &TileRegion, max_heat: i32) {
        self.free_area.remove_all(claimed);
        self.recalc_heat(grid, max_heat);
    }
}

/// Размещённый объект с рассчитанными областями
#[derive(Debug, Clone)]
pub struct PlacedObject {
    pub id: String,
    pub plan: ObjectPlan,
}

/// Поставленная охрана
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guard {
    pub value: i64,
    pub pos: u32,
}

/// Итог рассадки объектов по сегментам
#[derive(Debug, Clone, Default)]
pub struct DistributionResult {
    /// Наибольшее наблюдавшееся тепло
    pub max_heat: i32,
    pub objects: Vec<PlacedObject>,
    pub guards: Vec<Guard>,
    /// Свободные подходы к наградам мимо охраны; их закрывают препятствиями
    pub need_block: TileRegion,
    pub placed_ids: Vec<String>,
    pub failed_ids: Vec<String>,
}
