// src/zone/repair.rs
//! Починка геометрии границ после раскроя
//!
//! Работает прямо по пер-тайловым меткам: тонкие диагональные швы
//! выпрямляются, однотайловые шипы и анклавы переписываются на зону
//! подходящего соседа. Сетка сканируется до неподвижной точки.

use crate::error::GenerationError;
use crate::grid::{Direction, NO_ZONE, TileGrid};
use std::collections::BTreeSet;

/// Жёсткий предел проходов; если не сошлось — раскрой неисправим
pub const MAX_REPAIR_PASSES: u32 = 10;

/// Итог починки
#[derive(Debug, Clone, Default)]
pub struct RepairReport {
    /// Номер прохода, на котором не осталось правок
    pub passes: u32,
    /// Сколько тайлов сменило зону
    pub reassigned: usize,
    /// Зоны, чьи площади затронуты правками; их кэши нужно перечитать
    pub affected_zones: BTreeSet<i32>,
}

/// Доводит метки зон до неподвижной точки.
///
/// Перед починкой все тайлы обязаны быть размечены, сироты фатальны.
pub fn repair_topology(grid: &mut TileGrid) -> Result<RepairReport, GenerationError> {
    check_orphans(grid)?;

    let mut report = RepairReport::default();
    fix_exclaves_pass(grid, &mut report);

    for pass in 0..=MAX_REPAIR_PASSES {
        if fix_exclaves_pass(grid, &mut report) == 0 {
            report.passes = pass;
            return Ok(report);
        }
        if pass == MAX_REPAIR_PASSES {
            break;
        }
    }
    Err(GenerationError::UnresolvableExclaves(MAX_REPAIR_PASSES))
}

/// Ошибка, если хоть один тайл остался без зоны
pub fn check_orphans(grid: &TileGrid) -> Result<(), GenerationError> {
    let orphans = grid.unassigned_count();
    if orphans > 0 {
        return Err(GenerationError::OrphanTiles(orphans));
    }
    Ok(())
}

/// Один проход по сетке. Возвращает число переписанных тайлов.
///
/// Правки применяются сразу, поздние тайлы прохода видят ранние правки.
/// Сосед за границей карты считается тайлом своей же зоны, поэтому
/// приграничные тайлы защищены от переписывания.
pub fn fix_exclaves_pass(grid: &mut TileGrid, report: &mut RepairReport) -> usize {
    let mut fixed = 0;

    for idx in 0..grid.tile_count() as u32 {
        let own = grid.zone_of(idx);
        let zone_at = |dir: Direction| -> i32 {
            grid.neighbor(idx, dir).map_or(own, |n| grid.zone_of(n))
        };
        let t = zone_at(Direction::Top);
        let l = zone_at(Direction::Left);
        let r = zone_at(Direction::Right);
        let b = zone_at(Direction::Bottom);

        let e_t = own == t;
        let e_l = own == l;
        let e_r = own == r;
        let e_b = own == b;
        let same = usize::from(e_t) + usize::from(e_l) + usize::from(e_r) + usize::from(e_b);

        let replacement = match same {
            3.. => continue, // сердцевина или ровная граница
            2 if (e_t && e_l) || (e_t && e_r) || (e_b && e_l) || (e_b && e_r) => continue, // угол
            2 if e_t && e_b => l, // вертикальный шов
            2 => t,               // горизонтальный шов
            1 if e_t => b,
            1 if e_l => r,
            1 if e_r => l,
            1 => t,
            // одиночный анклав: первая согласная пара соседей, иначе верхний
            _ => {
                if t == l || t == r {
                    t
                } else if b == r || b == l {
                    b
                } else {
                    t
                }
            }
        };

        grid.set_zone(idx, replacement);
        report.affected_zones.insert(own);
        report.affected_zones.insert(replacement);
        fixed += 1;
    }

    report.reassigned += fixed;
    fixed
}
