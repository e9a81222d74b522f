// src/region/shift.rs
//! Вычисление сдвига объекта при столкновении с препятствием

use super::TileRegion;
use crate::grid::TileGrid;

/// Результат проверки столкновения
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionOutcome {
    /// Объект пуст — проверять нечего
    InvalidInputs,
    /// Пересечения нет, объект стоит свободно
    NoCollision,
    /// Сдвиг не выведет объект из препятствия
    ImpossibleShift,
    /// Предлагаемый сдвиг в тайлах
    Shift { dx: i32, dy: i32 },
}

/// Предлагает сдвиг, выводящий `object` из зоны столкновения с `obstacle`.
///
/// При `invert_obstacle` препятствием считается всё вне `obstacle`:
/// так проверяется выход объекта за пределы свободной области.
///
/// Направление сдвига — от центроида столкновения к центроиду остальной
/// части объекта; величина корректируется по радиусам ограничивающего
/// прямоугольника, когда радиус больше единицы.
#[must_use]
pub fn collision_shift(
    grid: &TileGrid,
    object: &TileRegion,
    obstacle: &TileRegion,
    invert_obstacle: bool,
) -> CollisionOutcome {
    if object.is_empty() {
        return CollisionOutcome::InvalidInputs;
    }
    if obstacle.is_empty() {
        return CollisionOutcome::NoCollision;
    }

    let intersection = if invert_obstacle {
        object.diff_with(obstacle)
    } else {
        object.intersect_with(obstacle)
    };
    if intersection.is_empty() {
        return CollisionOutcome::NoCollision;
    }
    if intersection == *object {
        return CollisionOutcome::ImpossibleShift;
    }

    let Some(collision_centroid) = intersection.centroid(grid, false) else {
        return CollisionOutcome::ImpossibleShift;
    };

    let mut object_without_collision = object.clone();
    object_without_collision.remove(collision_centroid);

    let Some((top_left, bottom_right)) = object.bounds(grid) else {
        return CollisionOutcome::ImpossibleShift;
    };
    let width = bottom_right.x - top_left.x + 1;
    let height = bottom_right.y - top_left.y + 1;
    let hor_radius = width / 2; // 1x1 => 0, 2x2 => 1, 3x3 => 1, 4x4 => 2
    let vert_radius = height / 2;

    let Some(object_centroid) = object_without_collision.centroid(grid, false) else {
        return CollisionOutcome::ImpossibleShift;
    };

    let object_pos = grid.pos(object_centroid);
    let collision_pos = grid.pos(collision_centroid);
    let mut cx = object_pos.x - collision_pos.x;
    let mut cy = object_pos.y - collision_pos.y;
    if cx == 0 && cy == 0 {
        return CollisionOutcome::ImpossibleShift;
    }

    if cx > 0 && hor_radius > 1 {
        cx = hor_radius - cx + 1;
    }
    if cx < 0 && hor_radius > 1 {
        cx = -hor_radius - cx - 1;
    }
    if cy > 0 && vert_radius > 1 {
        cy = vert_radius - cy + 1;
    }
    // NB: для отрицательного cy порог завязан на горизонтальный радиус
    if cy < 0 && hor_radius > 1 {
        cy = -vert_radius - cy - 1;
    }

    CollisionOutcome::Shift { dx: cx, dy: cy }
}

/// Сдвигает область на `(dx, dy)` в плоскости её слоя.
///
/// `None`, если хотя бы один тайл выходит за границу карты.
#[must_use]
pub fn shifted(grid: &TileGrid, region: &TileRegion, dx: i32, dy: i32) -> Option<TileRegion> {
    let mut moved = TileRegion::new();
    for cell in region.iter() {
        let mut pos = grid.pos(cell);
        pos.x += dx;
        pos.y += dy;
        moved.insert(grid.index(pos)?);
    }
    Some(moved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::mask;

    #[test]
    fn test_empty_object_is_invalid() {
        let grid = TileGrid::new(4, 4, 1);
        let obstacle: TileRegion = [0u32, 1].into_iter().collect();
        assert_eq!(
            collision_shift(&grid, &TileRegion::new(), &obstacle, false),
            CollisionOutcome::InvalidInputs
        );
    }

    #[test]
    fn test_empty_obstacle_is_no_collision() {
        let grid = TileGrid::new(4, 4, 1);
        let object: TileRegion = [0u32, 1].into_iter().collect();
        assert_eq!(
            collision_shift(&grid, &object, &TileRegion::new(), false),
            CollisionOutcome::NoCollision
        );
    }

    #[test]
    fn test_full_overlap_is_impossible() {
        let grid = TileGrid::new(4, 4, 1);
        let object: TileRegion = [5u32, 6, 9, 10].into_iter().collect();
        assert_eq!(
            collision_shift(&grid, &object, &object, false),
            CollisionOutcome::ImpossibleShift
        );
    }

    #[test]
    fn test_disjoint_is_no_collision() {
        let grid = TileGrid::new(8, 8, 1);
        let object: TileRegion = [0u32, 1].into_iter().collect();
        let obstacle: TileRegion = [40u32, 41].into_iter().collect();
        assert_eq!(
            collision_shift(&grid, &object, &obstacle, false),
            CollisionOutcome::NoCollision
        );
    }

    #[test]
    fn test_side_overlap_pushes_away() {
        let grid = TileGrid::new(10, 10, 1);
        // объект 3×3 вокруг (4,4), препятствие задевает его левый столбец
        let (object, obstacle) = mask::decompose(
            &grid,
            concat!(
                "..........",
                "..........",
                "..........",
                "...XOO....",
                "...XOO....",
                "...XOO....",
                "..........",
                "..........",
                "..........",
                "..........",
            ),
        )
        .unwrap();
        let outcome = collision_shift(&grid, &object, &obstacle, false);
        let CollisionOutcome::Shift { dx, dy } = outcome else {
            panic!("ожидался сдвиг, получено {outcome:?}");
        };
        // столкновение слева, уводим вправо
        assert!(dx > 0, "dx = {dx}");
        assert_eq!(dy, 0);
    }

    #[test]
    fn test_inverted_obstacle_keeps_object_inside() {
        let grid = TileGrid::new(10, 10, 1);
        // свободная область 4×4, объект 2×2 наполовину снаружи
        let mut free = TileRegion::new();
        for y in 2..6 {
            for x in 2..6 {
                free.insert(grid.index(crate::grid::TilePos { x, y, z: 0 }).unwrap());
            }
        }
        let mut object = TileRegion::new();
        for y in 3..5 {
            for x in 5..7 {
                object.insert(grid.index(crate::grid::TilePos { x, y, z: 0 }).unwrap());
            }
        }
        let outcome = collision_shift(&grid, &object, &free, true);
        let CollisionOutcome::Shift { dx, dy } = outcome else {
            panic!("ожидался сдвиг, получено {outcome:?}");
        };
        let moved = shifted(&grid, &object, dx, dy).unwrap();
        assert!(moved.diff_with(&free).len() < object.diff_with(&free).len());
    }

    #[test]
    fn test_shifted_out_of_bounds() {
        let grid = TileGrid::new(4, 4, 1);
        let object: TileRegion = [0u32].into_iter().collect();
        assert!(shifted(&grid, &object, -1, 0).is_none());
    }
}
