// src/pipeline.rs
//! Конвейер генерации: от конфигурации до готовой карты
//!
//! Порядок стадий фиксирован: семена зон, раскрой, починка топологии,
//! граф смежности с проходами, маска препятствий, сегментация свободной
//! площади, набор объектов и их рассадка. Весь случай сосредоточен в
//! одном генераторе с сидом из конфигурации, любые два запуска с одной
//! конфигурацией дают одинаковую карту.

use crate::config::MapConfig;
use crate::distribute::placer::distribute_objects;
use crate::distribute::{DistributionResult, Guard, ZoneSegment};
use crate::error::GenerationError;
use crate::grid::{TileGrid, TilePos};
use crate::kmeans::split_by_max_area;
use crate::objects::generate::generate_zone_objects;
use crate::obstacles::build_obstacle_mask;
use crate::region::split::split_connected;
use crate::region::TileRegion;
use crate::zone::graph::{border_between, build_zone_graph};
use crate::zone::partition::{partition_zones, ZoneSeed};
use crate::zone::repair::{repair_topology, RepairReport};
use crate::zone::TileZone;
use petgraph::graph::UnGraph;
use rand::{Rng, SeedableRng};

/// Проход между зонами с выбранным тайлом-воротами
#[derive(Debug, Clone)]
pub struct ConnectionGate {
    pub from: String,
    pub to: String,
    /// Тайл прохода на границе зоны `from`
    pub gate: u32,
    pub guard_value: i64,
}

/// Готовая карта со всеми промежуточными результатами стадий
#[derive(Debug, Clone)]
pub struct GeneratedMap {
    pub grid: TileGrid,
    pub zones: Vec<TileZone>,
    pub segments: Vec<ZoneSegment>,
    /// Непроходимые тайлы: шумовая маска плюс закрытые подходы к наградам
    pub obstacles: TileRegion,
    pub gates: Vec<ConnectionGate>,
    pub zone_graph: UnGraph<i32, ()>,
    pub repair: RepairReport,
    pub distribution: DistributionResult,
}

/// Переводит процентные центры зон в тайлы, с случайным смещением
/// в пределах заданного разброса
fn scatter_seeds<R: Rng>(grid: &TileGrid, config: &MapConfig, rng: &mut R) -> Vec<ZoneSeed> {
    config
        .zones
        .iter()
        .map(|zone| {
            let mut x = (i64::from(grid.width) * zone.center_x_percent / 100) as i32;
            let mut y = (i64::from(grid.height) * zone.center_y_percent / 100) as i32;
            let radius =
                (i64::from(grid.width.min(grid.height)) * zone.dispersion_percent / 100) as i32;
            if radius > 0 {
                x += rng.gen_range(-radius..=radius);
                y += rng.gen_range(-radius..=radius);
            }
            ZoneSeed {
                id: zone.id.clone(),
                center: TilePos {
                    x: x.clamp(0, grid.width as i32 - 1),
                    y: y.clamp(0, grid.height as i32 - 1),
                    z: 0,
                },
                relative_size: zone.relative_size,
            }
        })
        .collect()
}

/// Сверяет настроенные проходы с графом смежности и выбирает ворота
fn resolve_connections(
    grid: &TileGrid,
    zones: &[TileZone],
    graph: &UnGraph<i32, ()>,
    config: &MapConfig,
) -> Result<Vec<ConnectionGate>, GenerationError> {
    let mut gates = Vec::new();
    for connection in &config.connections {
        let from = zones
            .iter()
            .find(|z| z.id == connection.from)
            .ok_or_else(|| {
                GenerationError::BadConfig(format!("unknown zone `{}`", connection.from))
            })?;
        let to = zones.iter().find(|z| z.id == connection.to).ok_or_else(|| {
            GenerationError::BadConfig(format!("unknown zone `{}`", connection.to))
        })?;

        let node_of = |index: i32| graph.node_indices().find(|&n| graph[n] == index);
        let adjacent = match (node_of(from.index), node_of(to.index)) {
            (Some(a), Some(b)) => graph.contains_edge(a, b),
            _ => false,
        };
        if !adjacent {
            return Err(GenerationError::ZonesNotAdjacent(
                from.id.clone(),
                to.id.clone(),
            ));
        }

        let border = border_between(grid, from, to);
        let Some(gate) = border.centroid(grid, true) else {
            return Err(GenerationError::ZonesNotAdjacent(
                from.id.clone(),
                to.id.clone(),
            ));
        };
        gates.push(ConnectionGate {
            from: from.id.clone(),
            to: to.id.clone(),
            gate,
            guard_value: connection.guard_value,
        });
    }
    Ok(gates)
}

fn merge_distribution(total: &mut DistributionResult, mut part: DistributionResult, base: usize) {
    total.max_heat = total.max_heat.max(part.max_heat);
    for placed in &mut part.objects {
        placed.plan.segment_index += base;
    }
    total.objects.append(&mut part.objects);
    total.guards.append(&mut part.guards);
    total.need_block.extend_with(&part.need_block);
    total.placed_ids.append(&mut part.placed_ids);
    total.failed_ids.append(&mut part.failed_ids);
}

/// Генерирует карту по конфигурации.
///
/// # Ошибки
/// Ошибки конфигурации (`BadConfig`, веса и центры зон, несмежные
/// проходы) и ошибки сходимости раскроя (`OrphanTiles`,
/// `UnresolvableExclaves`). Неразмещённые объекты ошибкой не считаются,
/// их список лежит в итоге рассадки.
pub fn generate_map(config: &MapConfig) -> Result<GeneratedMap, GenerationError> {
    config.validate()?;
    let mut grid = TileGrid::new(config.width, config.height, config.depth);
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(config.seed);

    // ШАГ 1: семена зон с разбросом
    let seeds = scatter_seeds(&grid, config, &mut rng);

    // ШАГ 2: раскрой сетки на зоны
    let mut zones = partition_zones(&mut grid, &seeds)?;

    // ШАГ 3: починка топологии; площади зон перечитываются с карты
    let repair = repair_topology(&mut grid)?;
    for zone in &mut zones {
        zone.read_from_map(&grid);
    }

    // ШАГ 4: граф смежности и ворота проходов
    let zone_graph = build_zone_graph(&grid, &zones);
    let gates = resolve_connections(&grid, &zones, &zone_graph, config)?;

    // ШАГ 5: маска препятствий; семена и ворота остаются проходимыми
    let mut obstacles = TileRegion::new();
    for zone in &zones {
        let mut mask = build_obstacle_mask(
            &grid,
            &zone.area,
            config.obstacles,
            config.seed.wrapping_add(zone.index as u64),
        );
        mask.remove(zone.seed);
        for gate in &gates {
            mask.remove(gate.gate);
        }
        obstacles.extend_with(&mask);
    }

    // ШАГ 6: сегментация свободной площади зон
    let mut segments: Vec<ZoneSegment> = Vec::new();
    for zone in &zones {
        let free = zone.area.diff_with(&obstacles);
        for component in split_connected(&grid, &free, false) {
            let pieces = split_by_max_area(
                &grid,
                &component,
                config.distribution.segment_max_area,
                true,
            );
            for piece in pieces {
                let segment_index = segments.len();
                for idx in piece.iter() {
                    grid.set_segment(idx, segment_index as i32);
                }
                segments.push(ZoneSegment::new(
                    &grid,
                    zone.index,
                    segment_index,
                    piece,
                    &TileRegion::new(),
                    config.distribution.max_heat,
                ));
            }
        }
    }

    // ШАГ 7: набор объектов и рассадка, по зонам
    let mut distribution = DistributionResult::default();
    for zone in &zones {
        let zone_config = &config.zones[zone.index as usize];
        let objects = generate_zone_objects(zone_config, &config.templates)?;
        if objects.is_empty() {
            continue;
        }
        let Some(start) = segments.iter().position(|s| s.zone_index == zone.index) else {
            // зона целиком под препятствиями
            distribution
                .failed_ids
                .extend(objects.iter().map(|o| o.id.clone()));
            continue;
        };
        let count = segments[start..]
            .iter()
            .take_while(|s| s.zone_index == zone.index)
            .count();
        let part = distribute_objects(
            &grid,
            &mut segments[start..start + count],
            &objects,
            config.distribution,
        );
        merge_distribution(&mut distribution, part, start);
    }

    // ШАГ 8: охрана проходов и закрытие подходов к наградам
    for gate in &gates {
        if gate.guard_value > 0 {
            distribution.guards.push(Guard {
                value: gate.guard_value,
                pos: gate.gate,
            });
        }
        // ворота не закрываются даже ради охраны награды
        distribution.need_block.remove(gate.gate);
    }
    obstacles.extend_with(&distribution.need_block);

    Ok(GeneratedMap {
        grid,
        zones,
        segments,
        obstacles,
        gates,
        zone_graph,
        repair,
        distribution,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    fn config_with_dispersion(dispersion: i64) -> MapConfig {
        let text = format!(
            r#"
            width = 40
            height = 40

            [[zones]]
            id = "west"
            center_x_percent = 25
            center_y_percent = 50
            relative_size = 1
            dispersion_percent = {dispersion}

            [[zones]]
            id = "east"
            center_x_percent = 75
            center_y_percent = 50
            relative_size = 1
            dispersion_percent = {dispersion}
        "#
        );
        toml::from_str(&text).unwrap()
    }

    #[test]
    fn test_seeds_land_on_percent_centers() {
        let config = config_with_dispersion(0);
        let grid = TileGrid::new(40, 40, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let seeds = scatter_seeds(&grid, &config, &mut rng);

        assert_eq!(seeds[0].center, TilePos { x: 10, y: 20, z: 0 });
        assert_eq!(seeds[1].center, TilePos { x: 30, y: 20, z: 0 });
    }

    #[test]
    fn test_dispersion_stays_inside_map() {
        let mut config = config_with_dispersion(100);
        config.zones[0].center_x_percent = 0;
        config.zones[0].center_y_percent = 0;
        config.zones[1].center_x_percent = 100;
        config.zones[1].center_y_percent = 100;
        let grid = TileGrid::new(40, 40, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let seeds = scatter_seeds(&grid, &config, &mut rng);

        for seed in &seeds {
            assert!((0..40).contains(&seed.center.x));
            assert!((0..40).contains(&seed.center.y));
        }
    }

    #[test]
    fn test_seed_scatter_is_deterministic() {
        let config = config_with_dispersion(10);
        let grid = TileGrid::new(40, 40, 1);
        let first = scatter_seeds(&grid, &config, &mut ChaCha8Rng::seed_from_u64(5));
        let second = scatter_seeds(&grid, &config, &mut ChaCha8Rng::seed_from_u64(5));

        assert_eq!(first[0].center, second[0].center);
        assert_eq!(first[1].center, second[1].center);
    }
}
