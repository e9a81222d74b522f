// src/zone/png.rs
use std::collections::HashMap;

use crate::grid::TileGrid;
use crate::zone::TileZone;
use image::{ImageBuffer, Rgba};
use imageproc::drawing::draw_filled_circle_mut;
use rand::Rng;

/// Отладочный дамп раскроя: слой сетки, раскрашенный по зонам
pub struct ZoneMap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<i32>, // индекс зоны
}

impl ZoneMap {
    /// Снимает слой `z` сетки
    pub fn new(grid: &TileGrid, z: i32) -> Self {
        let mut data = vec![crate::grid::NO_ZONE; (grid.width * grid.height) as usize];
        for y in 0..grid.height as i32 {
            for x in 0..grid.width as i32 {
                if let Some(idx) = grid.index(crate::grid::TilePos { x, y, z }) {
                    data[(y as u32 * grid.width + x as u32) as usize] = grid.zone_of(idx);
                }
            }
        }
        Self {
            width: grid.width,
            height: grid.height,
            data,
        }
    }

    pub fn to_rgba_image(&self, zones: &[TileZone]) -> Vec<u8> {
        let mut colors = HashMap::new();
        let mut rng = rand::thread_rng();

        for zone in zones {
            let color = [
                rng.gen_range(90..240),
                rng.gen_range(90..240),
                rng.gen_range(50..200),
                255,
            ];
            colors.insert(zone.index, color);
        }

        self.data
            .iter()
            .flat_map(|&index| {
                colors.get(&index).copied().unwrap_or([20, 20, 60, 255]) // Темный фон для свободных тайлов
            })
            .collect()
    }

    /// Сохраняет карту зон с маркерами семян
    pub fn save_as_png(
        &self,
        path: &str,
        grid: &TileGrid,
        zones: &[TileZone],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let rgba_data = self.to_rgba_image(zones);
        let mut img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_raw(self.width, self.height, rgba_data)
                .ok_or("Failed to create image buffer")?;

        for zone in zones {
            let pos = grid.pos(zone.seed);
            draw_filled_circle_mut(&mut img, (pos.x, pos.y), 2, Rgba([255, 0, 0, 255]));
        }

        img.save(path)?;
        Ok(())
    }
}
