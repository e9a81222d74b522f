// src/distribute/placer.rs
//! Рассадка объектов по сегментам
//!
//! Кандидат на размещение — центроид самой холодной корзины теплокарты.
//! Если след там не помещается целиком в свободную область, объекту
//! разрешена одна корректировка предложенным сдвигом; не помогло —
//! пробуем следующую корзину. Объект без пригодного места попадает
//! в список неразмещённых, рассадка сама по себе не ошибается.

use crate::config::DistributionSettings;
use crate::distribute::{DistributionResult, Guard, PlacedObject, ZoneSegment};
use crate::grid::{TileGrid, TilePos};
use crate::objects::{MapObject, ObjectKind, ObjectPlan};
use crate::region::shift::{collision_shift, CollisionOutcome};
use crate::region::TileRegion;

/// Пытается уложить след с центром в `anchor` в свободную область
/// сегмента, с одной корректировкой сдвигом
fn try_fit(
    grid: &TileGrid,
    segment: &ZoneSegment,
    object: &MapObject,
    object_index: usize,
    anchor: u32,
) -> Option<ObjectPlan> {
    let plan = object.estimate(grid, object_index, anchor)?;
    match collision_shift(grid, &plan.all_area, &segment.free_area, true) {
        CollisionOutcome::NoCollision => Some(plan),
        CollisionOutcome::Shift { dx, dy } => {
            let pos = grid.pos(anchor);
            let moved = grid.index(TilePos {
                x: pos.x + dx,
                y: pos.y + dy,
                z: pos.z,
            })?;
            let plan = object.estimate(grid, object_index, moved)?;
            match collision_shift(grid, &plan.all_area, &segment.free_area, true) {
                CollisionOutcome::NoCollision => Some(plan),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Площадь, выбываемая из свободной при фиксации: постройки
/// резервируют и обходную кромку, подходы к награде закрываются всегда
fn claimed_area(object: &MapObject, plan: &ObjectPlan) -> TileRegion {
    let base = match object.kind {
        ObjectKind::Visitable(_) => &plan.all_area,
        _ => &plan.occupied_with_danger,
    };
    base.union_with(&plan.need_block)
}

/// Раскладывает объекты по сегментам.
///
/// Крупные и сильно охраняемые следы идут первыми, пока пустоты
/// просторны; мелочь досыпается в остатки. Порядок кандидатов
/// детерминирован, при одном наборе входов рассадка воспроизводится
/// в точности.
#[must_use]
pub fn distribute_objects(
    grid: &TileGrid,
    segments: &mut [ZoneSegment],
    objects: &[MapObject],
    settings: DistributionSettings,
) -> DistributionResult {
    let mut result = DistributionResult {
        max_heat: segments
            .iter()
            .flat_map(|s| s.heat_map.keys().copied())
            .max()
            .unwrap_or(0),
        ..DistributionResult::default()
    };

    let mut order: Vec<usize> = (0..objects.len()).collect();
    order.sort_by(|&a, &b| {
        let (left, right) = (&objects[a], &objects[b]);
        right
            .footprint
            .estimated_area()
            .cmp(&left.footprint.estimated_area())
            .then(right.guard_value.cmp(&left.guard_value))
            .then(left.id.cmp(&right.id))
    });

    for object_index in order {
        let object = &objects[object_index];
        let mut placed = false;

        'segments: for segment_pos in 0..segments.len() {
            // холодные корзины первыми
            let candidates: Vec<(i32, u32)> = segments[segment_pos]
                .heat_map
                .iter()
                .map(|(heat, item)| (*heat, item.centroid))
                .collect();
            for (heat, anchor) in candidates {
                let Some(mut plan) =
                    try_fit(grid, &segments[segment_pos], object, object_index, anchor)
                else {
                    continue;
                };
                plan.placed_heat = heat;
                plan.segment_index = segment_pos;

                let claimed = claimed_area(object, &plan);
                segments[segment_pos].commit(grid, &claimed, settings.max_heat);
                if let Some(hottest) = segments[segment_pos].heat_map.keys().next_back() {
                    result.max_heat = result.max_heat.max(*hottest);
                }

                if let Some(guard_tile) = plan.guard_tile {
                    result.guards.push(Guard {
                        value: object.guard_value,
                        pos: guard_tile,
                    });
                }
                result.need_block.extend_with(&plan.need_block);
                result.placed_ids.push(object.id.clone());
                result.objects.push(PlacedObject {
                    id: object.id.clone(),
                    plan,
                });
                placed = true;
                break 'segments;
            }
        }

        if !placed {
            result.failed_ids.push(object.id.clone());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{Footprint, Score};

    fn square(grid: &TileGrid, x0: i32, y0: i32, side: i32) -> TileRegion {
        let mut area = TileRegion::new();
        for y in y0..y0 + side {
            for x in x0..x0 + side {
                if let Some(idx) = grid.index(TilePos { x, y, z: 0 }) {
                    area.insert(idx);
                }
            }
        }
        area
    }

    fn pickable(id: &str, mask: &str, guard: i64) -> MapObject {
        MapObject {
            id: id.into(),
            kind: ObjectKind::Pickable("loot".into()),
            footprint: Footprint::parse(mask).unwrap(),
            guard_value: guard,
            score: Score::new(),
        }
    }

    fn settings() -> DistributionSettings {
        DistributionSettings {
            segment_max_area: 120,
            max_heat: 10,
        }
    }

    #[test]
    fn test_pebbles_fill_without_overlap() {
        let grid = TileGrid::new(10, 10, 1);
        let area = square(&grid, 0, 0, 10);
        let mut segments = vec![ZoneSegment::new(
            &grid,
            0,
            0,
            area.clone(),
            &TileRegion::new(),
            10,
        )];
        let objects: Vec<MapObject> = (0..5)
            .map(|i| pickable(&format!("pebble-{i}"), "O", 0))
            .collect();

        let result = distribute_objects(&grid, &mut segments, &objects, settings());

        assert_eq!(result.placed_ids.len(), 5);
        assert!(result.failed_ids.is_empty());
        let mut claimed = TileRegion::new();
        for placed in &result.objects {
            assert!(placed.plan.occupied.intersect_with(&claimed).is_empty());
            assert!(placed.plan.occupied.iter().all(|idx| area.contains(idx)));
            claimed.extend_with(&placed.plan.occupied);
        }
    }

    #[test]
    fn test_guarded_reward_blocks_open_approaches() {
        let grid = TileGrid::new(12, 12, 1);
        let mut segments = vec![ZoneSegment::new(
            &grid,
            0,
            0,
            square(&grid, 0, 0, 12),
            &TileRegion::new(),
            10,
        )];
        let objects = vec![pickable("chest", "O", 1000)];

        let result = distribute_objects(&grid, &mut segments, &objects, settings());

        assert_eq!(result.placed_ids, vec!["chest".to_string()]);
        assert_eq!(result.guards.len(), 1);
        assert_eq!(result.guards[0].value, 1000);
        // охрана снизу, три подхода сверху закрыты
        assert_eq!(result.need_block.len(), 3);
        assert!(segments[0]
            .free_area
            .intersect_with(&result.need_block)
            .is_empty());
    }

    #[test]
    fn test_unplaceable_object_is_reported() {
        let grid = TileGrid::new(12, 12, 1);
        // сегмент 3x3 посреди карты, след шире сегмента
        let mut segments = vec![ZoneSegment::new(
            &grid,
            0,
            0,
            square(&grid, 4, 4, 3),
            &TileRegion::new(),
            10,
        )];
        let objects = vec![pickable("longboat", "OOOOO", 0)];

        let result = distribute_objects(&grid, &mut segments, &objects, settings());

        assert!(result.objects.is_empty());
        assert_eq!(result.failed_ids, vec!["longboat".to_string()]);
    }

    #[test]
    fn test_big_footprints_go_first() {
        let grid = TileGrid::new(16, 16, 1);
        let mut segments = vec![ZoneSegment::new(
            &grid,
            0,
            0,
            square(&grid, 0, 0, 16),
            &TileRegion::new(),
            10,
        )];
        let objects = vec![
            pickable("small", "O", 0),
            pickable("big", "OOO/OOO/OOO", 0),
        ];

        let result = distribute_objects(&grid, &mut segments, &objects, settings());

        assert_eq!(result.objects[0].id, "big");
        assert_eq!(result.placed_ids.len(), 2);
    }

    #[test]
    fn test_visitable_ring_is_reserved() {
        let grid = TileGrid::new(14, 14, 1);
        let mut segments = vec![ZoneSegment::new(
            &grid,
            0,
            0,
            square(&grid, 0, 0, 14),
            &TileRegion::new(),
            10,
        )];
        let inn = MapObject {
            id: "inn".into(),
            kind: ObjectKind::Visitable("inn".into()),
            footprint: Footprint::parse("OO/OO").unwrap(),
            guard_value: 0,
            score: Score::new(),
        };
        let objects = vec![inn, pickable("crumb", "O", 0)];

        let result = distribute_objects(&grid, &mut segments, &objects, settings());

        assert_eq!(result.placed_ids.len(), 2);
        let ring = &result.objects[0].plan.pass_around;
        assert!(!ring.is_empty());
        // обход постройки зарезервирован, мелочь села в стороне
        assert!(result.objects[1].plan.occupied.intersect_with(ring).is_empty());
        assert!(segments[0].free_area.intersect_with(ring).is_empty());
    }

    #[test]
    fn test_distribution_is_reproducible() {
        let grid = TileGrid::new(12, 12, 1);
        let objects: Vec<MapObject> = (0..4)
            .map(|i| pickable(&format!("coin-{i}"), "O", 0))
            .collect();

        let run = || {
            let mut segments = vec![ZoneSegment::new(
                &grid,
                0,
                0,
                square(&grid, 0, 0, 12),
                &TileRegion::new(),
                10,
            )];
            let result = distribute_objects(&grid, &mut segments, &objects, settings());
            result
                .objects
                .iter()
                .map(|p| (p.id.clone(), p.plan.anchor))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}
