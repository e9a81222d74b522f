// src/config.rs
//! Конфигурация генерации карты
//!
//! Этот модуль определяет все параметры, управляющие раскроем карты:
//! - Список зон с центрами, весами и целевой ценностью наград
//! - Связи между зонами и охрана проходов
//! - Шаблоны размещаемых объектов
//! - Настройки шума препятствий и сегментации
//!
//! Все структуры поддерживают сериализацию в TOML/JSON для удобной настройки через конфигурационные файлы.

use crate::error::GenerationError;
use crate::objects::{ObjectKind, ScoreAttr};
use serde::{Deserialize, Serialize};
use std::fs;

/// Описание одной зоны карты
///
/// Центр задаётся в процентах от размеров карты, чтобы конфигурация
/// не зависела от конкретного разрешения сетки.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Уникальное имя зоны
    pub id: String,

    /// Центр зоны по горизонтали, в процентах ширины карты (0..=100)
    pub center_x_percent: i64,

    /// Центр зоны по вертикали, в процентах высоты карты (0..=100)
    pub center_y_percent: i64,

    /// Радиус случайного смещения семени, в процентах от меньшей
    /// стороны карты (по умолчанию 0 = семя точно в центре)
    #[serde(default)]
    pub dispersion_percent: i64,

    /// Относительный вес зоны при делёжке площади
    pub relative_size: i64,

    /// Целевая суммарная ценность наград зоны (0 = без наград)
    #[serde(default)]
    pub score_target: i64,

    /// Настройки охраны наград зоны
    #[serde(default)]
    pub guard: GuardTuning,
}

/// Правила назначения охраны наградам
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GuardTuning {
    /// Множитель силы охраны в процентах от ценности награды
    #[serde(default = "default_guard_percent")]
    pub percent: i64,

    /// Награды дешевле порога остаются без охраны
    #[serde(default = "default_guard_threshold")]
    pub threshold: i64,

    /// Нижняя граница силы назначенной охраны
    #[serde(default = "default_guard_min")]
    pub min: i64,

    /// Верхняя граница силы назначенной охраны
    #[serde(default = "default_guard_max")]
    pub max: i64,
}

fn default_guard_percent() -> i64 {
    100
}
fn default_guard_threshold() -> i64 {
    300
}
fn default_guard_min() -> i64 {
    500
}
fn default_guard_max() -> i64 {
    20000
}

impl Default for GuardTuning {
    fn default() -> Self {
        Self {
            percent: 100,
            threshold: 300,
            min: 500,
            max: 20000,
        }
    }
}

/// Проход между двумя зонами
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Имя первой зоны
    pub from: String,

    /// Имя второй зоны
    pub to: String,

    /// Сила охраны прохода (0 = проход свободен)
    #[serde(default)]
    pub guard_value: i64,
}

/// Шаблон размещаемого объекта
///
/// Генератор наград инстанцирует шаблоны по кругу, пока зона
/// не наберёт целевую ценность.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectTemplate {
    /// Имя шаблона; экземпляры получают имена `имя-0`, `имя-1`, ...
    pub id: String,

    /// Вид объекта; в TOML задаётся ключами `kind` и `what`
    /// прямо в таблице шаблона
    #[serde(flatten)]
    pub kind: ObjectKind,

    /// Маска следа: `O` — награда, `-` — помеха, `X` — обе, `.` — пусто.
    /// Строки разделяются `/`.
    pub mask: String,

    /// Ценность одного экземпляра
    pub value: i64,

    /// Атрибут, в который записывается ценность
    #[serde(default = "default_template_attr")]
    pub attr: ScoreAttr,

    /// Слот охраны относительно рамки следа,
    /// по умолчанию `Bottom` (охрана перед объектом)
    #[serde(default = "default_guard_slot")]
    pub guard_slot: crate::grid::Direction,

    /// Максимум экземпляров на зону (0 = без ограничения)
    #[serde(default)]
    pub max_count: u32,
}

fn default_template_attr() -> ScoreAttr {
    ScoreAttr::Misc
}
fn default_guard_slot() -> crate::grid::Direction {
    crate::grid::Direction::Bottom
}

/// Настройки шумовой маски препятствий
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ObstacleSettings {
    /// Доля тайлов зоны под препятствиями, в процентах (0 = без препятствий)
    #[serde(default = "default_obstacle_fill_percent")]
    pub fill_percent: i64,

    /// Частота шума; больше — мельче пятна
    #[serde(default = "default_obstacle_frequency")]
    pub frequency: f32,
}

fn default_obstacle_fill_percent() -> i64 {
    10
}
fn default_obstacle_frequency() -> f32 {
    0.08
}

impl Default for ObstacleSettings {
    fn default() -> Self {
        Self {
            fill_percent: 10,
            frequency: 0.08,
        }
    }
}

/// Настройки сегментации и рассадки объектов
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributionSettings {
    /// Максимальная площадь сегмента зоны в тайлах
    #[serde(default = "default_segment_max_area")]
    pub segment_max_area: usize,

    /// Потолок теплокарты: дальше этого расстояния от занятых
    /// тайлов местность считается холодной
    #[serde(default = "default_max_heat")]
    pub max_heat: i32,
}

fn default_segment_max_area() -> usize {
    120
}
fn default_max_heat() -> i32 {
    10
}

impl Default for DistributionSettings {
    fn default() -> Self {
        Self {
            segment_max_area: 120,
            max_heat: 10,
        }
    }
}

/// Основные параметры генерации карты
///
/// Полная конфигурация для генерации одной карты. Поддерживает загрузку из TOML-файлов.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Сид генератора случайных чисел (детерминированная генерация)
    #[serde(default)]
    pub seed: u64,

    /// Ширина карты в тайлах (по умолчанию 72)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Высота карты в тайлах (по умолчанию 72)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Число слоёв карты (по умолчанию 1 = только поверхность)
    #[serde(default = "default_depth")]
    pub depth: u32,

    /// Зоны карты
    pub zones: Vec<ZoneConfig>,

    /// Проходы между зонами (по умолчанию без проходов)
    #[serde(default)]
    pub connections: Vec<ConnectionConfig>,

    /// Общий пул шаблонов объектов
    #[serde(default)]
    pub templates: Vec<ObjectTemplate>,

    /// Настройки препятствий
    #[serde(default)]
    pub obstacles: ObstacleSettings,

    /// Настройки сегментации и рассадки
    #[serde(default)]
    pub distribution: DistributionSettings,
}

fn default_width() -> u32 {
    72
}
fn default_height() -> u32 {
    72
}
fn default_depth() -> u32 {
    1
}

impl MapConfig {
    /// Загружает параметры из TOML-файла
    ///
    /// # Аргументы
    /// * `path` - путь к файлу конфигурации в формате TOML
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден или содержит недопустимый формат.
    ///
    /// # Пример
    /// ```toml
    /// # map.toml
    /// seed = 42
    /// width = 96
    /// height = 96
    ///
    /// [[zones]]
    /// id = "north"
    /// center_x_percent = 50
    /// center_y_percent = 25
    /// relative_size = 2
    /// ```
    pub fn from_toml_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Проверяет согласованность конфигурации до начала генерации.
    ///
    /// # Ошибки
    /// `BadConfig` при нулевых размерах карты, центрах вне диапазона
    /// процентов, повторяющихся именах зон или проходах к несуществующим
    /// зонам. Веса зон проверяет раскрой.
    pub fn validate(&self) -> Result<(), GenerationError> {
        if self.width == 0 || self.height == 0 || self.depth == 0 {
            return Err(GenerationError::BadConfig(format!(
                "map size {}x{}x{} is degenerate",
                self.width, self.height, self.depth
            )));
        }
        // зоны живут на поверхности; слои глубже раскрой не накрывает
        if self.depth > 1 {
            return Err(GenerationError::BadConfig(
                "zone layout covers a single layer, depth must be 1".into(),
            ));
        }
        let mut seen = std::collections::BTreeSet::new();
        for zone in &self.zones {
            if !seen.insert(zone.id.as_str()) {
                return Err(GenerationError::BadConfig(format!(
                    "duplicate zone id `{}`",
                    zone.id
                )));
            }
            for percent in [zone.center_x_percent, zone.center_y_percent] {
                if !(0..=100).contains(&percent) {
                    return Err(GenerationError::BadConfig(format!(
                        "zone `{}` center percent {percent} is out of 0..=100",
                        zone.id
                    )));
                }
            }
            if zone.dispersion_percent < 0 {
                return Err(GenerationError::BadConfig(format!(
                    "zone `{}` has negative dispersion",
                    zone.id
                )));
            }
        }
        for connection in &self.connections {
            for id in [&connection.from, &connection.to] {
                if !seen.contains(id.as_str()) {
                    return Err(GenerationError::BadConfig(format!(
                        "connection references unknown zone `{id}`"
                    )));
                }
            }
        }
        for template in &self.templates {
            if template.value <= 0 && !matches!(template.kind, ObjectKind::Obstacle) {
                return Err(GenerationError::BadConfig(format!(
                    "template `{}` has nonpositive value",
                    template.id
                )));
            }
        }
        Ok(())
    }
}
