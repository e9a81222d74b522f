// src/obstacles.rs
//! Шумовая маска препятствий
//!
//! Внутренность зоны засевается пятнами непроходимых тайлов по шуму
//! OpenSimplex: доля тайлов задаётся конфигурацией, форма пятен — шумом.
//! После порогового отбора кромка чистится от одиночных выступов и дыр.

use crate::config::ObstacleSettings;
use crate::grid::TileGrid;
use crate::region::{RefineTask, TileRegion};
use fastnoise_lite::{FastNoiseLite, FractalType, NoiseType};

/// Отбирает из `area` ровно `target` тайлов с наибольшим шумом.
/// Возвращает меньше только когда сама область меньше цели.
fn select_noise_tiles(
    grid: &TileGrid,
    area: &TileRegion,
    frequency: f32,
    seed: u64,
    target: usize,
) -> TileRegion {
    let mut noise = FastNoiseLite::new();
    noise.set_seed(Some(seed as i32));
    noise.set_noise_type(Some(NoiseType::OpenSimplex2));
    noise.set_fractal_type(Some(FractalType::FBm));
    noise.set_fractal_octaves(Some(3));
    noise.set_frequency(Some(frequency));

    let mut scored: Vec<(f32, u32)> = area
        .iter()
        .map(|idx| {
            let pos = grid.pos(idx);
            // слои разведены по третьей координате шума
            let value = noise.get_noise_3d(pos.x as f32, pos.y as f32, (pos.z * 64) as f32);
            (value, idx)
        })
        .collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.truncate(target);
    scored.into_iter().map(|(_, idx)| idx).collect()
}

/// Строит маску препятствий зоны.
///
/// Отбор порогом даёт ровно настроенную долю тайлов; последующая
/// чистка кромки слегка меняет итоговую долю, убирая одиночные
/// выступы и заращивая дыры.
#[must_use]
pub fn build_obstacle_mask(
    grid: &TileGrid,
    zone_area: &TileRegion,
    settings: ObstacleSettings,
    seed: u64,
) -> TileRegion {
    if settings.fill_percent <= 0 || zone_area.is_empty() {
        return TileRegion::new();
    }
    let target = zone_area.len() * settings.fill_percent.min(100) as usize / 100;
    if target == 0 {
        return TileRegion::new();
    }

    let mut mask = select_noise_tiles(grid, zone_area, settings.frequency, seed, target);
    for task in [RefineTask::RemoveSpikes, RefineTask::RemoveHollows] {
        mask = mask.refined(grid, task, zone_area);
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TilePos;

    fn square_area(grid: &TileGrid, x0: i32, y0: i32, side: i32) -> TileRegion {
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

    #[test]
    fn test_selection_hits_exact_target() {
        let grid = TileGrid::new(20, 20, 1);
        let area = square_area(&grid, 0, 0, 20);
        let picked = select_noise_tiles(&grid, &area, 0.08, 1, 120);

        assert_eq!(picked.len(), 120);
        assert!(picked.iter().all(|idx| area.contains(idx)));
    }

    #[test]
    fn test_selection_clamped_by_area() {
        let grid = TileGrid::new(20, 20, 1);
        let area = square_area(&grid, 0, 0, 4);
        let picked = select_noise_tiles(&grid, &area, 0.08, 1, 1000);
        assert_eq!(picked.len(), 16);
    }

    #[test]
    fn test_mask_is_deterministic() {
        let grid = TileGrid::new(24, 24, 1);
        let area = square_area(&grid, 2, 2, 20);
        let settings = ObstacleSettings {
            fill_percent: 25,
            frequency: 0.08,
        };
        let first = build_obstacle_mask(&grid, &area, settings, 99);
        let second = build_obstacle_mask(&grid, &area, settings, 99);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_mask_stays_inside_zone() {
        let grid = TileGrid::new(24, 24, 1);
        let area = square_area(&grid, 5, 5, 10);
        let settings = ObstacleSettings {
            fill_percent: 30,
            frequency: 0.1,
        };
        let mask = build_obstacle_mask(&grid, &area, settings, 7);
        assert!(mask.iter().all(|idx| area.contains(idx)));
    }

    #[test]
    fn test_zero_fill_gives_empty_mask() {
        let grid = TileGrid::new(16, 16, 1);
        let area = square_area(&grid, 0, 0, 16);
        let settings = ObstacleSettings {
            fill_percent: 0,
            frequency: 0.08,
        };
        assert!(build_obstacle_mask(&grid, &area, settings, 3).is_empty());
    }
}
