// src/zone/partition.rs
//! Раскрой сетки на зоны взвешенной диаграммой Вороного
//!
//! Каждый тайл тянется к зоне с наименьшим приведённым расстоянием
//! (расстояние, делённое на радиус зоны). Спорная полоса между двумя
//! ближайшими зонами остаётся свободной и добирается кольцевым ростом,
//! это даёт ровные толстые границы вместо рваных однотайловых.

use crate::error::GenerationError;
use crate::grid::{NO_ZONE, TileGrid, TilePos};
use crate::region::TileRegion;
use crate::zone::TileZone;

/// Порог спорности в приведённых единицах расстояния: если две зоны
/// претендуют на тайл почти одинаково (разница меньше порога), тайл
/// остаётся свободным буфером. Константа подобрана вручную.
pub const DISTANCE_TIE_THRESHOLD: i64 = 2;

/// Семя зоны из конфигурации
#[derive(Debug, Clone)]
pub struct ZoneSeed {
    pub id: String,
    pub center: TilePos,
    pub relative_size: i64,
}

struct DistanceRecord {
    zone_index: i32,
    distance: i64,
    radius: i64,
}

impl DistanceRecord {
    fn distance_by_radius(&self) -> i64 {
        self.distance * 1000 / self.radius
    }
}

/// Раскраивает сетку на зоны по списку семян.
///
/// Метки пишутся в `grid`, возвращаемые зоны держат связные площади
/// с семенами внутри. Свободных тайлов после раскроя не остаётся,
/// но геометрия границ обычно требует починки (`repair`).
pub fn partition_zones(
    grid: &mut TileGrid,
    seeds: &[ZoneSeed],
) -> Result<Vec<TileZone>, GenerationError> {
    if seeds.len() < 2 {
        return Err(GenerationError::TooFewZones(seeds.len()));
    }

    let mut total_relative: i64 = 0;
    for seed in seeds {
        if seed.relative_size <= 0 {
            return Err(GenerationError::NonPositiveZoneWeight(seed.id.clone()));
        }
        total_relative += seed.relative_size;
    }
    if total_relative == 0 {
        return Err(GenerationError::ZeroTotalWeight);
    }

    let map_area = grid.tile_count() as i64;
    let mut zones = Vec::with_capacity(seeds.len());
    for (i, seed) in seeds.iter().enumerate() {
        let Some(seed_idx) = grid.index(seed.center) else {
            return Err(GenerationError::BadZoneCenter {
                zone: seed.id.clone(),
                x: seed.center.x,
                y: seed.center.y,
                z: seed.center.z,
            });
        };
        let absolute_area = seed.relative_size * map_area / total_relative;
        let radius = (((absolute_area as f64).sqrt()) / std::f64::consts::PI) as i64;
        zones.push(TileZone {
            index: i as i32,
            id: seed.id.clone(),
            seed: seed_idx,
            relative_size: seed.relative_size,
            absolute_area,
            radius: radius.max(1),
            area: TileRegion::new(),
            inner_edge: TileRegion::new(),
        });
    }

    grid.clear_zones();

    // ШАГ 1: предварительная разметка по приведённому расстоянию
    let mut records: Vec<DistanceRecord> = Vec::with_capacity(zones.len());
    for idx in 0..grid.tile_count() as u32 {
        records.clear();
        for zone in &zones {
            records.push(DistanceRecord {
                zone_index: zone.index,
                distance: grid.distance(idx, zone.seed),
                radius: zone.radius,
            });
        }
        records.sort_by_key(DistanceRecord::distance_by_radius);
        let first = &records[0];
        let second = &records[1];

        let total_radius = first.radius + second.radius;
        let total_distance = first.distance + second.distance;
        let total_in_radiuses = total_distance * 100 / total_radius;
        let distance_diff = total_in_radiuses * first.radius / 100 - first.distance;
        if distance_diff < DISTANCE_TIE_THRESHOLD {
            continue; // спорная полоса
        }
        grid.set_zone(idx, first.zone_index);
    }

    // ШАГ 2: связность — у каждой зоны остаётся только кусок вокруг семени
    for zone in &mut zones {
        zone.read_from_map(grid);
    }
    grid.clear_zones();
    for zone in &zones {
        zone.write_to_map(grid);
    }

    // ШАГ 3: добор площади от самых обделённых зон к сытым,
    // сперва только по свободным тайлам, затем с отъёмом у соседей
    let mut order: Vec<usize> = (0..zones.len()).collect();
    fill_deficit_pass(grid, &mut zones, &mut order, 20, false);
    fill_deficit_pass(grid, &mut zones, &mut order, 10, true);
    fill_deficit_pass(grid, &mut zones, &mut order, 0, true);

    // ШАГ 4: остатки свободных тайлов разбираются без порогов
    for &i in &order {
        zones[i].fill_the_rest(grid);
    }

    Ok(zones)
}

/// Один проход добора: зоны в порядке убывания дефицита растут до порога.
/// После каждой зоны с отъёмом все площади перечитываются, иначе зоны
/// держали бы тайлы, уже отнятые соседями.
fn fill_deficit_pass(
    grid: &mut TileGrid,
    zones: &mut [TileZone],
    order: &mut [usize],
    threshold_percent: i64,
    allow_consuming: bool,
) {
    order.sort_by_key(|&i| std::cmp::Reverse(zones[i].area_deficit()));
    for slot in 0..order.len() {
        let i = order[slot];
        zones[i].fill_deficit(grid, threshold_percent, allow_consuming);
        if allow_consuming {
            for zone in zones.iter_mut() {
                zone.read_from_map(grid);
            }
        }
    }
}
