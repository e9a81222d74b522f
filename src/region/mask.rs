// src/region/mask.rs
//! Текстовая маска пары «объект + препятствие»
//!
//! Формат посимвольный, строки идут сверху вниз:
//! `O` — объект, `-` — препятствие, `X` — оба, `.` — пусто.

use super::TileRegion;
use crate::error::GenerationError;
use crate::grid::{TileGrid, TilePos};

/// Читает маску нулевого слоя. Длина строки (без переводов строк)
/// обязана совпадать с `width * height` сетки.
pub fn decompose(
    grid: &TileGrid,
    serialized: &str,
) -> Result<(TileRegion, TileRegion), GenerationError> {
    let flat: String = serialized.chars().filter(|c| !c.is_whitespace()).collect();
    let expected = (grid.width * grid.height) as usize;
    if flat.len() != expected {
        return Err(GenerationError::BadFootprint(format!(
            "mask length {} does not match grid {}x{}",
            flat.len(),
            grid.width,
            grid.height
        )));
    }

    let mut object = TileRegion::new();
    let mut obstacle = TileRegion::new();
    for (offset, c) in flat.chars().enumerate() {
        let x = (offset % grid.width as usize) as i32;
        let y = (offset / grid.width as usize) as i32;
        let Some(idx) = grid.index(TilePos { x, y, z: 0 }) else {
            continue;
        };
        match c {
            'O' => {
                object.insert(idx);
            }
            '-' => {
                obstacle.insert(idx);
            }
            'X' => {
                object.insert(idx);
                obstacle.insert(idx);
            }
            '.' => {}
            other => {
                return Err(GenerationError::BadFootprint(format!(
                    "unexpected mask char `{other}` at ({x}, {y})"
                )));
            }
        }
    }
    Ok((object, obstacle))
}

/// Сериализует слой, на котором лежат области, в маску.
///
/// При `obstacle_inverted` препятствием печатается всё вне `obstacle`.
/// При `printable` каждая строка берётся в кавычки и завершается `\n`,
/// чтобы вывод можно было вставить в тест как есть.
#[must_use]
pub fn compose(
    grid: &TileGrid,
    object: &TileRegion,
    obstacle: &TileRegion,
    obstacle_inverted: bool,
    printable: bool,
) -> String {
    let z = match object.first().or_else(|| obstacle.first()) {
        Some(idx) => grid.pos(idx).z,
        None => return String::new(),
    };

    let mut serialized = String::new();
    for y in 0..grid.height as i32 {
        if printable {
            serialized.push('"');
        }
        for x in 0..grid.width as i32 {
            let Some(idx) = grid.index(TilePos { x, y, z }) else {
                continue;
            };
            let object_occupied = object.contains(idx);
            let obstacle_occupied = if obstacle_inverted {
                !obstacle.contains(idx)
            } else {
                obstacle.contains(idx)
            };
            serialized.push(match (object_occupied, obstacle_occupied) {
                (true, true) => 'X',
                (true, false) => 'O',
                (false, true) => '-',
                (false, false) => '.',
            });
        }
        if printable {
            serialized.push('"');
            serialized.push('\n');
        }
    }
    serialized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        let grid = TileGrid::new(4, 3, 1);
        let source = concat!("O..X", "-..-", "....");
        let (object, obstacle) = decompose(&grid, source).unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(obstacle.len(), 3);
        assert_eq!(compose(&grid, &object, &obstacle, false, false), source);
    }

    #[test]
    fn test_printable_quotes_rows() {
        let grid = TileGrid::new(2, 2, 1);
        let (object, obstacle) = decompose(&grid, "O..-").unwrap();
        let text = compose(&grid, &object, &obstacle, false, true);
        assert_eq!(text, "\"O.\"\n\".-\"\n");
    }

    #[test]
    fn test_inverted_obstacle() {
        let grid = TileGrid::new(3, 1, 1);
        let (object, obstacle) = decompose(&grid, "O--").unwrap();
        // инверсия: препятствие там, где его не было
        assert_eq!(compose(&grid, &object, &obstacle, true, false), "X..");
    }

    #[test]
    fn test_bad_length() {
        let grid = TileGrid::new(4, 4, 1);
        assert!(decompose(&grid, "....").is_err());
    }

    #[test]
    fn test_bad_char() {
        let grid = TileGrid::new(2, 1, 1);
        assert!(decompose(&grid, "?.").is_err());
    }

    #[test]
    fn test_whitespace_ignored() {
        let grid = TileGrid::new(2, 2, 1);
        let (object, _) = decompose(&grid, "O.\n.O\n").unwrap();
        assert_eq!(object.len(), 2);
    }

    #[test]
    fn test_empty_regions_compose_empty() {
        let grid = TileGrid::new(2, 2, 1);
        let empty = TileRegion::new();
        assert_eq!(compose(&grid, &empty, &empty, false, false), "");
    }
}
