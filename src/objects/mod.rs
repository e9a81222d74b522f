// src/objects/mod.rs
//! Модель размещаемых объектов
//!
//! Объект описывается общей записью (след, охрана, ценность) плюс
//! вариантом вида; конвейеру достаточно общих полей, вид нужен только
//! на краях — в отчёте и при рендере.

pub mod generate;

use crate::error::GenerationError;
use crate::grid::{Direction, TileGrid, TilePos};
use crate::region::TileRegion;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Счётные атрибуты ценности награды
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreAttr {
    Army,
    ArtStat,
    ArtSupport,
    Gold,
    Resource,
    ResourceGen,
    Experience,
    SpellOffensive,
    SpellCommon,
    SpellAll,
    Misc,
}

pub type Score = BTreeMap<ScoreAttr, i64>;

/// Суммарная ценность по всем атрибутам
#[must_use]
pub fn total_score(score: &Score) -> i64 {
    score.values().sum()
}

/// Вид объекта. Полезная нагрузка варианта нужна отчёту,
/// конвейер размещения на неё не смотрит.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "what")]
pub enum ObjectKind {
    /// Снимаемая награда: ресурс, артефакт, сундук
    Pickable(String),
    /// Постоянная посещаемая постройка, вокруг должен оставаться проход
    Visitable(String),
    /// Чистая помеха без награды
    Obstacle,
}

/// След объекта на сетке: клетки награды и пристроенных помех
/// в локальных координатах от левого верхнего угла рамки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    pub width: i32,
    pub height: i32,
    reward_cells: Vec<(i32, i32)>,
    obstacle_cells: Vec<(i32, i32)>,
    /// Куда относительно рамки встаёт охрана
    pub guard_slot: Direction,
}

impl Footprint {
    /// Разбирает след из строк маски: `O` — награда, `-` — помеха,
    /// `X` — и то и другое, `.` — пусто. Строки разделены `/` или
    /// переводом строки и обязаны быть одной длины.
    ///
    /// # Пример
    ///
    /// ```
    /// use zonegen::objects::Footprint;
    ///
    /// let fp = Footprint::parse("OO/O.").unwrap();
    /// assert_eq!((fp.width, fp.height), (2, 2));
    /// assert_eq!(fp.reward_len(), 3);
    /// ```
    pub fn parse(text: &str) -> Result<Self, GenerationError> {
        let rows: Vec<&str> = text
            .split(['/', '\n'])
            .map(str::trim)
            .filter(|row| !row.is_empty())
            .collect();
        if rows.is_empty() {
            return Err(GenerationError::BadFootprint("empty footprint".into()));
        }
        let width = rows[0].chars().count() as i32;
        let height = rows.len() as i32;

        let mut reward_cells = Vec::new();
        let mut obstacle_cells = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() as i32 != width {
                return Err(GenerationError::BadFootprint(format!(
                    "ragged footprint row `{row}`"
                )));
            }
            for (x, c) in row.chars().enumerate() {
                let cell = (x as i32, y as i32);
                match c {
                    'O' => reward_cells.push(cell),
                    '-' => obstacle_cells.push(cell),
                    'X' => {
                        reward_cells.push(cell);
                        obstacle_cells.push(cell);
                    }
                    '.' => {}
                    other => {
                        return Err(GenerationError::BadFootprint(format!(
                            "unexpected footprint char `{other}`"
                        )));
                    }
                }
            }
        }
        if reward_cells.is_empty() && obstacle_cells.is_empty() {
            return Err(GenerationError::BadFootprint(
                "footprint covers no cells".into(),
            ));
        }
        Ok(Self {
            width,
            height,
            reward_cells,
            obstacle_cells,
            guard_slot: Direction::Bottom,
        })
    }

    #[must_use]
    pub fn with_guard_slot(mut self, slot: Direction) -> Self {
        self.guard_slot = slot;
        self
    }

    #[must_use]
    pub fn reward_len(&self) -> usize {
        self.reward_cells.len()
    }

    /// Грубая оценка занимаемой площади с охраной и опасной зоной
    #[must_use]
    pub fn estimated_area(&self) -> usize {
        (self.width * self.height) as usize + 2
    }
}

/// Размещаемый объект: общая запись без иерархий
#[derive(Debug, Clone)]
pub struct MapObject {
    pub id: String,
    pub kind: ObjectKind,
    pub footprint: Footprint,
    /// Сила охраны; 0 — без охраны
    pub guard_value: i64,
    pub score: Score,
}

/// Рассчитанное размещение объекта: все производные области следа
/// в абсолютных тайлах. Неизменяемо после фиксации, кроме единственной
/// корректировки сдвигом.
#[derive(Debug, Clone)]
pub struct ObjectPlan {
    pub object_index: usize,
    pub anchor: u32,
    pub guard_tile: Option<u32>,
    /// Клетки награды
    pub reward_area: TileRegion,
    /// Пристроенные помехи
    pub extra_obstacles: TileRegion,
    /// Физически занятые тайлы: награда + помехи + охрана
    pub occupied: TileRegion,
    /// Под ударом охраны, но не занято
    pub danger: TileRegion,
    pub occupied_with_danger: TileRegion,
    /// Обязательный свободный обход постройки
    pub pass_around: TileRegion,
    /// Всё, что требует места: занято + опасно + обход
    pub all_area: TileRegion,
    /// Свободные подходы к награде мимо охраны; их нужно закрыть
    pub need_block: TileRegion,
    pub placed_heat: i32,
    pub segment_index: usize,
}

impl MapObject {
    /// Раскладывает след вокруг тайла-центра. `None`, если хоть одна
    /// клетка (включая охрану) выходит за границу карты.
    #[must_use]
    pub fn estimate(&self, grid: &TileGrid, object_index: usize, center: u32) -> Option<ObjectPlan> {
        let center_pos = grid.pos(center);
        let fp = &self.footprint;
        let top_left = TilePos {
            x: center_pos.x - fp.width / 2,
            y: center_pos.y - fp.height / 2,
            z: center_pos.z,
        };

        let cell_at = |cell: (i32, i32)| -> Option<u32> {
            grid.index(TilePos {
                x: top_left.x + cell.0,
                y: top_left.y + cell.1,
                z: top_left.z,
            })
        };

        let mut reward_area = TileRegion::new();
        for &cell in &fp.reward_cells {
            reward_area.insert(cell_at(cell)?);
        }
        let mut extra_obstacles = TileRegion::new();
        for &cell in &fp.obstacle_cells {
            extra_obstacles.insert(cell_at(cell)?);
        }

        let mut occupied = reward_area.union_with(&extra_obstacles);
        let mut guard_tile = None;
        let mut danger = TileRegion::new();
        if self.guard_value > 0 {
            let guard = cell_at(guard_cell(fp))?;
            guard_tile = Some(guard);
            occupied.insert(guard);
            for next in grid.neighbors(guard, true) {
                if !occupied.contains(next) {
                    danger.insert(next);
                }
            }
        }

        let occupied_with_danger = occupied.union_with(&danger);
        let pass_around = match self.kind {
            ObjectKind::Visitable(_) => occupied_with_danger.outside_edge(grid, true),
            _ => TileRegion::new(),
        };
        let all_area = occupied_with_danger.union_with(&pass_around);

        let need_block = if guard_tile.is_some() {
            reward_area
                .outside_edge(grid, true)
                .diff_with(&occupied_with_danger)
        } else {
            TileRegion::new()
        };

        Some(ObjectPlan {
            object_index,
            anchor: center,
            guard_tile,
            reward_area,
            extra_obstacles,
            occupied,
            danger,
            occupied_with_danger,
            pass_around,
            all_area,
            need_block,
            placed_heat: 0,
            segment_index: 0,
        })
    }
}

/// Локальная клетка охранного слота относительно рамки следа
fn guard_cell(fp: &Footprint) -> (i32, i32) {
    let cx = fp.width / 2;
    let cy = fp.height / 2;
    match fp.guard_slot {
        Direction::TopLeft => (-1, -1),
        Direction::Top => (cx, -1),
        Direction::TopRight => (fp.width, -1),
        Direction::Left => (-1, cy),
        Direction::Right => (fp.width, cy),
        Direction::BottomLeft => (-1, fp.height),
        Direction::Bottom => (cx, fp.height),
        Direction::BottomRight => (fp.width, fp.height),
    }
}
