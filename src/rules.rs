// src/rules.rs
//! Справочник правил: боевые единицы для охраны
//!
//! Справочник только читается во время генерации. Встроенный набор
//! покрывает типовые карты, внешний TOML-файл его замещает целиком.

use serde::{Deserialize, Serialize};
use std::fs;

/// Предельный размер отряда охраны; сильнее охрану набирают
/// более дорогими единицами
pub const MAX_GUARD_STACK: i64 = 35;

/// Одна боевая единица справочника
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitRule {
    /// Имя единицы
    pub id: String,

    /// Боевая ценность одной единицы
    pub value: i64,
}

/// Подобранный отряд охраны
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuardStack {
    pub unit: String,
    pub count: i64,
}

/// Справочник правил генерации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesDb {
    units: Vec<UnitRule>,
}

impl RulesDb {
    /// Встроенный набор единиц по ярусам ценности
    #[must_use]
    pub fn bundled() -> Self {
        let tiers: [(&str, i64); 9] = [
            ("militia", 20),
            ("archer", 75),
            ("wolf", 120),
            ("swordsman", 250),
            ("ogre", 500),
            ("golem", 900),
            ("wyvern", 1800),
            ("giant", 3500),
            ("dragon", 8000),
        ];
        Self {
            units: tiers
                .into_iter()
                .map(|(id, value)| UnitRule {
                    id: id.to_string(),
                    value,
                })
                .collect(),
        }
    }

    /// Загружает справочник из TOML-файла, полностью замещая встроенный
    ///
    /// # Ошибки
    /// Возвращает ошибку, если файл не найден, не разбирается или
    /// содержит единицы с неположительной ценностью.
    pub fn from_toml_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let mut db: Self = toml::from_str(&contents)?;
        if db.units.is_empty() {
            return Err("rules file lists no units".into());
        }
        if let Some(bad) = db.units.iter().find(|u| u.value <= 0) {
            return Err(format!("unit `{}` has nonpositive value", bad.id).into());
        }
        db.units.sort_by_key(|u| u.value);
        Ok(db)
    }

    /// Подбирает отряд под силу охраны: самая дешёвая единица, которой
    /// хватает отряда не больше [`MAX_GUARD_STACK`]. Если даже сильнейшей
    /// единице нужен отряд крупнее, отдаём её без ограничения размера.
    #[must_use]
    pub fn suggest_guard(&self, guard_value: i64) -> Option<GuardStack> {
        if guard_value <= 0 {
            return None;
        }
        let stack_for = |unit: &UnitRule| GuardStack {
            unit: unit.id.clone(),
            count: (guard_value + unit.value - 1) / unit.value,
        };
        self.units
            .iter()
            .filter(|unit| stack_for(unit).count <= MAX_GUARD_STACK)
            .min_by_key(|unit| unit.value)
            .or_else(|| self.units.iter().max_by_key(|unit| unit.value))
            .map(stack_for)
    }
}

impl Default for RulesDb {
    fn default() -> Self {
        Self::bundled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_is_sorted_ascending() {
        let db = RulesDb::bundled();
        let values: Vec<i64> = db.units.iter().map(|u| u.value).collect();
        let mut sorted = values.clone();
        sorted.sort_unstable();
        assert_eq!(values, sorted);
        assert!(!values.is_empty());
    }

    #[test]
    fn test_small_guard_takes_cheapest_unit() {
        let db = RulesDb::bundled();
        let stack = db.suggest_guard(500).unwrap();
        assert_eq!(stack.unit, "militia");
        assert_eq!(stack.count, 25);
    }

    #[test]
    fn test_stack_cap_pushes_to_pricier_units() {
        let db = RulesDb::bundled();
        // 2000 ополченцами — уже сотня, отряд переходит к лучникам
        let stack = db.suggest_guard(2000).unwrap();
        assert_eq!(stack.unit, "archer");
        assert_eq!(stack.count, 27);
    }

    #[test]
    fn test_huge_guard_falls_back_to_strongest() {
        let db = RulesDb::bundled();
        let stack = db.suggest_guard(1_000_000).unwrap();
        assert_eq!(stack.unit, "dragon");
        assert_eq!(stack.count, 125);
    }

    #[test]
    fn test_zero_guard_means_no_stack() {
        assert!(RulesDb::bundled().suggest_guard(0).is_none());
        assert!(RulesDb::bundled().suggest_guard(-5).is_none());
    }

    #[test]
    fn test_toml_overrides_bundled() {
        let text = r#"
            [[units]]
            id = "drone"
            value = 40

            [[units]]
            id = "queen"
            value = 1000
        "#;
        let db: RulesDb = toml::from_str(text).unwrap();
        assert_eq!(db.units.len(), 2);
        assert_eq!(db.suggest_guard(400).unwrap().unit, "drone");
    }
}
