// src/grid.rs
//! Тайловая сетка карты: адресация, соседи, принадлежность зонам
//!
//! Сетка строится один раз на запуск генерации и после этого неизменна по
//! топологии: таблицы соседей вычисляются в конструкторе. Изменяются только
//! метки тайлов (зона, сегмент).

use serde::{Deserialize, Serialize};

/// Индекс-заглушка для «соседа за границей карты»
pub const NO_TILE: u32 = u32::MAX;

/// Метка «тайл не назначен ни одной зоне»
pub const NO_ZONE: i32 = -1;

/// Метка «тайл не входит ни в один сегмент»
pub const NO_SEGMENT: i32 = -1;

/// Позиция тайла. Слои (`z`) независимы: соседство не пересекает слои.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Направление к соседнему тайлу. Первые четыре — ортогональные,
/// порядок совпадает с раскладкой таблицы соседей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Top,
    Left,
    Right,
    Bottom,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::Left,
        Direction::Right,
        Direction::Bottom,
        Direction::TopLeft,
        Direction::TopRight,
        Direction::BottomLeft,
        Direction::BottomRight,
    ];

    #[must_use]
    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::TopLeft => (-1, -1),
            Direction::TopRight => (1, -1),
            Direction::BottomLeft => (-1, 1),
            Direction::BottomRight => (1, 1),
        }
    }

    fn table_index(self) -> usize {
        match self {
            Direction::Top => 0,
            Direction::Left => 1,
            Direction::Right => 2,
            Direction::Bottom => 3,
            Direction::TopLeft => 4,
            Direction::TopRight => 5,
            Direction::BottomLeft => 6,
            Direction::BottomRight => 7,
        }
    }
}

/// Плоское евклидово расстояние между позициями, умноженное на `scale`.
/// Слои не учитываются: расстояние считается в пределах одного слоя.
#[must_use]
pub fn pos_distance(a: TilePos, b: TilePos, scale: i64) -> i64 {
    let dx = f64::from(a.x - b.x);
    let dy = f64::from(a.y - b.y);
    ((dx * dx + dy * dy).sqrt() * scale as f64) as i64
}

/// Тайловая сетка `width × height × depth` с предвычисленными соседями
#[derive(Debug, Clone)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    zone_of: Vec<i32>,
    segment_of: Vec<i32>,
    // [T, L, R, B, TL, TR, BL, BR]; NO_TILE — за границей карты
    neighbors: Vec<[u32; 8]>,
}

impl TileGrid {
    #[must_use]
    pub fn new(width: u32, height: u32, depth: u32) -> Self {
        let total = (width * height * depth) as usize;
        let mut neighbors = vec![[NO_TILE; 8]; total];

        let w = width as i32;
        let h = height as i32;
        for z in 0..depth as i32 {
            for y in 0..h {
                for x in 0..w {
                    let idx = ((z * h + y) * w + x) as usize;
                    for (slot, dir) in Direction::ALL.iter().enumerate() {
                        let (dx, dy) = dir.offset();
                        let nx = x + dx;
                        let ny = y + dy;
                        if nx >= 0 && nx < w && ny >= 0 && ny < h {
                            neighbors[idx][slot] = ((z * h + ny) * w + nx) as u32;
                        }
                    }
                }
            }
        }

        Self {
            width,
            height,
            depth,
            zone_of: vec![NO_ZONE; total],
            segment_of: vec![NO_SEGMENT; total],
            neighbors,
        }
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.zone_of.len()
    }

    /// Переводит позицию в индекс тайла; `None` — позиция вне карты
    #[must_use]
    pub fn index(&self, pos: TilePos) -> Option<u32> {
        let w = self.width as i32;
        let h = self.height as i32;
        let d = self.depth as i32;
        if pos.x < 0 || pos.x >= w || pos.y < 0 || pos.y >= h || pos.z < 0 || pos.z >= d {
            return None;
        }
        Some(((pos.z * h + pos.y) * w + pos.x) as u32)
    }

    #[must_use]
    pub fn pos(&self, idx: u32) -> TilePos {
        let w = self.width as i32;
        let h = self.height as i32;
        let i = idx as i32;
        TilePos {
            x: i % w,
            y: (i / w) % h,
            z: i / (w * h),
        }
    }

    /// Сосед в заданном направлении, `None` — за границей карты
    #[must_use]
    pub fn neighbor(&self, idx: u32, dir: Direction) -> Option<u32> {
        let n = self.neighbors[idx as usize][dir.table_index()];
        if n == NO_TILE { None } else { Some(n) }
    }

    /// Соседи тайла: 4 ортогональных или все 8 при `diagonal`
    pub fn neighbors(&self, idx: u32, diagonal: bool) -> impl Iterator<Item = u32> + '_ {
        let count = if diagonal { 8 } else { 4 };
        self.neighbors[idx as usize][..count]
            .iter()
            .copied()
            .filter(|&n| n != NO_TILE)
    }

    /// Целочисленное евклидово расстояние между тайлами (в пределах слоя)
    #[must_use]
    pub fn distance(&self, a: u32, b: u32) -> i64 {
        pos_distance(self.pos(a), self.pos(b), 1)
    }

    #[must_use]
    pub fn distance_scaled(&self, a: u32, b: u32, scale: i64) -> i64 {
        pos_distance(self.pos(a), self.pos(b), scale)
    }

    #[must_use]
    pub fn zone_of(&self, idx: u32) -> i32 {
        self.zone_of[idx as usize]
    }

    pub fn set_zone(&mut self, idx: u32, zone: i32) {
        self.zone_of[idx as usize] = zone;
    }

    pub fn clear_zones(&mut self) {
        self.zone_of.fill(NO_ZONE);
    }

    #[must_use]
    pub fn segment_of(&self, idx: u32) -> i32 {
        self.segment_of[idx as usize]
    }

    pub fn set_segment(&mut self, idx: u32, segment: i32) {
        self.segment_of[idx as usize] = segment;
    }

    /// Количество тайлов без зоны
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.zone_of.iter().filter(|&&z| z == NO_ZONE).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let grid = TileGrid::new(10, 5, 2);
        assert_eq!(grid.tile_count(), 100);

        let pos = TilePos { x: 3, y: 2, z: 1 };
        let idx = grid.index(pos).unwrap();
        assert_eq!(grid.pos(idx), pos);

        assert_eq!(grid.index(TilePos { x: 10, y: 0, z: 0 }), None);
        assert_eq!(grid.index(TilePos { x: -1, y: 0, z: 0 }), None);
        assert_eq!(grid.index(TilePos { x: 0, y: 0, z: 2 }), None);
    }

    #[test]
    fn test_neighbors_at_corner() {
        let grid = TileGrid::new(4, 4, 1);
        let corner = grid.index(TilePos { x: 0, y: 0, z: 0 }).unwrap();

        let orth: Vec<u32> = grid.neighbors(corner, false).collect();
        assert_eq!(orth.len(), 2); // только R и B

        let all: Vec<u32> = grid.neighbors(corner, true).collect();
        assert_eq!(all.len(), 3); // R, B, BR

        assert_eq!(grid.neighbor(corner, Direction::Top), None);
        assert_eq!(grid.neighbor(corner, Direction::Left), None);
        let right = grid.neighbor(corner, Direction::Right).unwrap();
        assert_eq!(grid.pos(right), TilePos { x: 1, y: 0, z: 0 });
    }

    #[test]
    fn test_neighbors_do_not_cross_layers() {
        let grid = TileGrid::new(3, 3, 2);
        let center = grid.index(TilePos { x: 1, y: 1, z: 0 }).unwrap();
        for n in grid.neighbors(center, true) {
            assert_eq!(grid.pos(n).z, 0);
        }
    }

    #[test]
    fn test_distance_truncates() {
        let grid = TileGrid::new(10, 10, 1);
        let a = grid.index(TilePos { x: 0, y: 0, z: 0 }).unwrap();
        let b = grid.index(TilePos { x: 3, y: 4, z: 0 }).unwrap();
        assert_eq!(grid.distance(a, b), 5);

        let c = grid.index(TilePos { x: 1, y: 1, z: 0 }).unwrap();
        assert_eq!(grid.distance(a, c), 1); // sqrt(2) усечён до 1
        assert_eq!(grid.distance_scaled(a, c, 100), 141);
    }

    #[test]
    fn test_zone_tags() {
        let mut grid = TileGrid::new(4, 4, 1);
        assert_eq!(grid.unassigned_count(), 16);

        grid.set_zone(5, 2);
        assert_eq!(grid.zone_of(5), 2);
        assert_eq!(grid.unassigned_count(), 15);

        grid.clear_zones();
        assert_eq!(grid.unassigned_count(), 16);
    }
}
