// src/kmeans.rs
//! Сегментация областей методом k-средних
//!
//! Точки — тайлы области, расстояние — евклидово по плоскости слоя.
//! Центроиды кластеров пересчитываются как среднее позиций и привязки
//! к конкретному тайлу не требуют.

use crate::grid::{TileGrid, TilePos, pos_distance};
use crate::region::TileRegion;
use rand::Rng;
use std::collections::BTreeSet;

/// Итерационный разбиватель области на кластеры
pub struct KMeansSegmentation<'a> {
    grid: &'a TileGrid,
    points: Vec<u32>,
    assignment: Vec<usize>,
    centroids: Vec<TilePos>,
    /// Предел итераций Ллойда
    pub iters: u32,
}

impl<'a> KMeansSegmentation<'a> {
    #[must_use]
    pub fn new(grid: &'a TileGrid, region: &TileRegion) -> Self {
        let points: Vec<u32> = region.iter().collect();
        let count = points.len();
        Self {
            grid,
            points,
            assignment: vec![0; count],
            centroids: Vec::new(),
            iters: 10,
        }
    }

    /// Центроиды по списку индексов точек (индексы в порядке возрастания позиций)
    pub fn init_by_indices(&mut self, centroid_indices: &[usize]) {
        self.centroids = centroid_indices
            .iter()
            .filter_map(|&i| self.points.get(i).map(|&idx| self.grid.pos(idx)))
            .collect();
    }

    /// Равномерные центроиды: середины k равных отрезков списка точек
    pub fn init_equal(&mut self, k: usize) {
        let n = self.points.len();
        let k = k.clamp(1, n.max(1));
        let indices: BTreeSet<usize> = (0..k).map(|i| i * n / k + n / (2 * k)).collect();
        let indices: Vec<usize> = indices.into_iter().collect();
        self.init_by_indices(&indices);
    }

    /// Случайные несовпадающие центроиды
    pub fn init_random<R: Rng>(&mut self, k: usize, rng: &mut R) {
        let n = self.points.len();
        if n == 0 {
            self.centroids.clear();
            return;
        }
        let k = k.clamp(1, n);
        let mut used = BTreeSet::new();
        while used.len() < k {
            used.insert(rng.gen_range(0..n));
        }
        let indices: Vec<usize> = used.into_iter().collect();
        self.init_by_indices(&indices);
    }

    fn nearest_centroid(&self, point: u32) -> usize {
        let pos = self.grid.pos(point);
        let mut best = 0;
        let mut best_distance = i64::MAX;
        for (i, &centroid) in self.centroids.iter().enumerate() {
            let distance = pos_distance(pos, centroid, 100);
            if distance < best_distance {
                best_distance = distance;
                best = i;
            }
        }
        best
    }

    /// Гоняет итерации до стабилизации принадлежности или исчерпания лимита
    pub fn run(&mut self) {
        if self.centroids.is_empty() || self.points.is_empty() {
            return;
        }
        for _ in 0..self.iters {
            let mut changed = false;
            for (slot, &point) in self.points.iter().enumerate() {
                let nearest = self.nearest_centroid(point);
                if self.assignment[slot] != nearest {
                    self.assignment[slot] = nearest;
                    changed = true;
                }
            }

            let mut sums = vec![(0i64, 0i64, 0i64); self.centroids.len()];
            for (slot, &point) in self.points.iter().enumerate() {
                let pos = self.grid.pos(point);
                let entry = &mut sums[self.assignment[slot]];
                entry.0 += i64::from(pos.x);
                entry.1 += i64::from(pos.y);
                entry.2 += 1;
            }
            for (i, &(sx, sy, count)) in sums.iter().enumerate() {
                if count > 0 {
                    self.centroids[i] = TilePos {
                        x: (sx / count) as i32,
                        y: (sy / count) as i32,
                        z: self.centroids[i].z,
                    };
                }
            }

            if !changed {
                break;
            }
        }
    }

    /// Кластеры в порядке центроидов; опустевшие кластеры опускаются
    #[must_use]
    pub fn clusters(&self) -> Vec<TileRegion> {
        let mut result = vec![TileRegion::new(); self.centroids.len()];
        for (slot, &point) in self.points.iter().enumerate() {
            result[self.assignment[slot]].insert(point);
        }
        result.retain(|cluster| !cluster.is_empty());
        result
    }

    #[must_use]
    pub fn centroid_of(&self, cluster: usize) -> Option<TilePos> {
        self.centroids.get(cluster).copied()
    }
}

/// Делит область на `k` пространственно связных кусков.
///
/// При `k == 1` возвращается копия области. При `repulse` куски
/// переупорядочиваются так, чтобы соседние по списку лежали далеко
/// друг от друга: каждый следующий — самый удалённый от предыдущего.
#[must_use]
pub fn split_by_k(grid: &TileGrid, region: &TileRegion, k: usize, repulse: bool) -> Vec<TileRegion> {
    if region.is_empty() {
        return Vec::new();
    }
    if k <= 1 {
        return vec![region.clone()];
    }

    let mut seg = KMeansSegmentation::new(grid, region);
    seg.iters = 30;
    seg.init_equal(k);
    seg.run();

    let mut clusters: Vec<(TilePos, TileRegion)> = Vec::new();
    for cluster in seg.clusters() {
        if let Some(centroid) = cluster.centroid(grid, false) {
            clusters.push((grid.pos(centroid), cluster));
        }
    }

    if repulse && clusters.len() > 1 {
        let mut sorted = Vec::with_capacity(clusters.len());
        let mut current = match clusters.pop() {
            Some(last) => last,
            None => return Vec::new(),
        };
        while !clusters.is_empty() {
            let mut farthest = 0;
            let mut farthest_distance = -1i64;
            for (i, (centroid, _)) in clusters.iter().enumerate() {
                let distance = pos_distance(current.0, *centroid, 100);
                if distance > farthest_distance {
                    farthest_distance = distance;
                    farthest = i;
                }
            }
            sorted.push(current);
            current = clusters.remove(farthest);
        }
        sorted.push(current);
        clusters = sorted;
    }

    clusters.into_iter().map(|(_, cluster)| cluster).collect()
}

/// Делит область на куски площадью не больше `max_area`
#[must_use]
pub fn split_by_max_area(
    grid: &TileGrid,
    region: &TileRegion,
    max_area: usize,
    repulse: bool,
) -> Vec<TileRegion> {
    if region.is_empty() {
        return Vec::new();
    }
    let max_area = max_area.max(1);
    let k = (region.len() + max_area + 1) / max_area;
    split_by_k(grid, region, k, repulse)
}
