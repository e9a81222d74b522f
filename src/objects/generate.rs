// src/objects/generate.rs
//! Набор объектов зоны по целевой ценности
//!
//! Шаблоны инстанцируются по кругу, пока суммарная ценность наград
//! не достигнет цели зоны. Охрана каждой награды выводится из её
//! ценности по настройкам зоны.

use crate::config::{GuardTuning, ObjectTemplate, ZoneConfig};
use crate::error::GenerationError;
use crate::objects::{Footprint, MapObject, ObjectKind, Score};

/// Сила охраны для награды данной ценности.
/// Дешёвые награды остаются без охраны совсем.
#[must_use]
pub fn guard_for_value(value: i64, tuning: GuardTuning) -> i64 {
    if value < tuning.threshold {
        return 0;
    }
    (value * tuning.percent / 100).clamp(tuning.min, tuning.max)
}

/// Собирает список объектов зоны.
///
/// Награды добираются круговым обходом шаблонов до целевой ценности.
/// Шаблоны-препятствия в цель не входят: они инстанцируются ровно
/// `max_count` раз как декорации (с `max_count = 0` пропускаются).
/// Имена экземпляров — `зона-шаблон-номер`.
///
/// # Ошибки
/// `BadFootprint`, если маска какого-то шаблона не разбирается.
pub fn generate_zone_objects(
    zone: &ZoneConfig,
    templates: &[ObjectTemplate],
) -> Result<Vec<MapObject>, GenerationError> {
    let mut footprints = Vec::with_capacity(templates.len());
    for template in templates {
        footprints.push(Footprint::parse(&template.mask)?.with_guard_slot(template.guard_slot));
    }

    let mut objects = Vec::new();
    let mut counters = vec![0u32; templates.len()];
    let instantiate = |slot: usize, counter: &mut u32, guard_value: i64| {
        let template = &templates[slot];
        // зона в имени делает экземпляры уникальными на всей карте
        let id = format!("{}-{}-{}", zone.id, template.id, *counter);
        *counter += 1;
        let mut score = Score::new();
        if template.value > 0 {
            score.insert(template.attr, template.value);
        }
        MapObject {
            id,
            kind: template.kind.clone(),
            footprint: footprints[slot].clone(),
            guard_value,
            score,
        }
    };

    // декорации с фиксированным числом экземпляров
    for (slot, template) in templates.iter().enumerate() {
        if !matches!(template.kind, ObjectKind::Obstacle) {
            continue;
        }
        for _ in 0..template.max_count {
            objects.push(instantiate(slot, &mut counters[slot], 0));
        }
    }

    let reward_slots: Vec<usize> = templates
        .iter()
        .enumerate()
        .filter(|(_, t)| !matches!(t.kind, ObjectKind::Obstacle))
        .map(|(slot, _)| slot)
        .collect();
    if zone.score_target <= 0 || reward_slots.is_empty() {
        return Ok(objects);
    }

    let mut accumulated = 0i64;
    'target: loop {
        let mut progressed = false;
        for &slot in &reward_slots {
            let template = &templates[slot];
            if template.max_count != 0 && counters[slot] >= template.max_count {
                continue;
            }
            let guard = guard_for_value(template.value, zone.guard);
            objects.push(instantiate(slot, &mut counters[slot], guard));
            accumulated += template.value;
            progressed = true;
            if accumulated >= zone.score_target {
                break 'target;
            }
        }
        // все шаблоны упёрлись в лимит, цель недостижима
        if !progressed {
            break;
        }
    }
    Ok(objects)
}
