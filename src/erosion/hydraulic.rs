//! Droplet-based hydraulic erosion simulator.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::{Droplet, HydraulicParams};
use crate::terrain::Heightmap;

const DIR_EPSILON: f32 = 1e-4;
const KERNEL_WEIGHT_EPSILON: f32 = 1e-4;

/// Hydraulic erosion simulator.
///
/// Each droplet follows the terrain gradient downhill, exchanging sediment
/// with the surface along its path. Droplets are applied one after another
/// into the same heightmap, so later droplets see the channels carved by
/// earlier ones.
#[derive(Debug, Clone)]
pub struct HydraulicErosion {
    params: HydraulicParams,
    /// Operative ceiling for deposition writes; taken from the caller or
    /// scanned from the terrain on the first `erode` call. Keeps repeated
    /// frame applications from piling sediment into spikes.
    max_elevation: Option<f32>,
    /// Reused (index, weight) scratch for the radius kernel.
    kernel: Vec<(usize, f32)>,
}

impl HydraulicErosion {
    /// Creates a simulator with the given physics parameters.
    pub fn new(params: HydraulicParams) -> Self {
        let side = (2 * params.erosion_radius + 1) as usize;
        Self {
            params,
            max_elevation: None,
            kernel: Vec::with_capacity(side * side),
        }
    }

    /// Current physics parameters.
    pub fn params(&self) -> &HydraulicParams {
        &self.params
    }

    /// Overrides the operative maximum elevation.
    ///
    /// Drivers stepping one frame at a time pass the frame-0 maximum here so
    /// deposition stays bounded by the original relief instead of the
    /// progressively eroded one.
    pub fn set_max_elevation(&mut self, max: f32) {
        self.max_elevation = Some(max);
    }

    /// Runs `num_particles` droplets from random start positions.
    ///
    /// Spawn positions come from an entropy-seeded RNG; use
    /// [`HydraulicErosion::erode_seeded`] when the terrain trajectory must
    /// be reproducible.
    pub fn erode(&mut self, heightmap: &mut Heightmap, num_particles: u32) {
        let mut rng = ChaCha8Rng::from_os_rng();
        self.erode_with_rng(heightmap, num_particles, &mut rng);
    }

    /// Runs `num_particles` droplets with a deterministic spawn sequence.
    ///
    /// Identical seed, parameters and input terrain produce a bitwise
    /// identical output terrain.
    pub fn erode_seeded(&mut self, heightmap: &mut Heightmap, num_particles: u32, seed: u64) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.erode_with_rng(heightmap, num_particles, &mut rng);
    }

    fn erode_with_rng(&mut self, heightmap: &mut Heightmap, num_particles: u32, rng: &mut ChaCha8Rng) {
        if self.max_elevation.is_none() {
            self.max_elevation = Some(heightmap.max_value());
        }

        let max_x = (heightmap.width().saturating_sub(2)) as f32;
        let max_y = (heightmap.height().saturating_sub(2)) as f32;
        if max_x <= 0.0 || max_y <= 0.0 {
            return;
        }

        for _ in 0..num_particles {
            let start = Vec2::new(rng.random_range(0.0..max_x), rng.random_range(0.0..max_y));
            self.simulate_droplet(heightmap, start);
        }
    }

    /// Traces a single droplet from `start` until it evaporates, stalls,
    /// leaves the grid or exhausts its lifetime.
    pub fn simulate_droplet(&mut self, heightmap: &mut Heightmap, start: Vec2) {
        let width = heightmap.width();
        let height = heightmap.height();
        let mut droplet = Droplet::new(start, &self.params);

        for _ in 0..self.params.max_iterations {
            if !droplet.is_active() {
                break;
            }

            let grid_x = droplet.pos.x.floor() as i64;
            let grid_y = droplet.pos.y.floor() as i64;
            if grid_x < 0
                || grid_y < 0
                || grid_x >= width as i64 - 1
                || grid_y >= height as i64 - 1
            {
                break;
            }

            let height_old = heightmap.sample(droplet.pos.x, droplet.pos.y);
            let Some(gradient) = heightmap.gradient(droplet.pos.x, droplet.pos.y) else {
                break;
            };

            // Blend the fresh downhill pull with the carried direction so
            // trails meander like rivers instead of chattering on noise.
            droplet.dir =
                droplet.dir * self.params.inertia - gradient * (1.0 - self.params.inertia);
            let dir_len = droplet.dir.length();
            if dir_len <= DIR_EPSILON {
                break;
            }
            droplet.dir /= dir_len;

            let old_pos = droplet.pos;
            droplet.pos += droplet.dir;

            if droplet.pos.x < 0.0
                || droplet.pos.y < 0.0
                || droplet.pos.x >= (width - 1) as f32
                || droplet.pos.y >= (height - 1) as f32
            {
                break;
            }

            let height_new = heightmap.sample(droplet.pos.x, droplet.pos.y);
            let delta_h = height_new - height_old;

            // Downhill motion (negative delta) yields positive capacity.
            let capacity = (-delta_h
                * droplet.speed
                * droplet.water
                * self.params.sediment_capacity_factor)
                .max(self.params.min_sediment_capacity);

            if droplet.sediment > capacity || delta_h > 0.0 {
                // Moving uphill: fill the pit behind us, at most what we
                // carry. Oversaturated: drop a fraction of the surplus.
                let deposit = if delta_h > 0.0 {
                    delta_h.min(droplet.sediment)
                } else {
                    (droplet.sediment - capacity) * self.params.deposit_speed
                };
                self.deposit_bilinear(heightmap, old_pos, deposit);
                droplet.sediment -= deposit;
            } else {
                let erode = ((capacity - droplet.sediment) * self.params.erode_speed)
                    .min(-delta_h);
                let removed = if self.params.erosion_radius > 1 {
                    self.erode_kernel(heightmap, old_pos, erode)
                } else {
                    self.erode_bilinear(heightmap, old_pos, erode)
                };
                droplet.sediment += removed;
            }

            let speed_sq = droplet.speed * droplet.speed - delta_h * self.params.gravity;
            droplet.speed = speed_sq.max(0.0).sqrt().min(self.params.max_droplet_speed);
            droplet.water *= 1.0 - self.params.evaporate_speed;
        }
    }

    /// Deposits `amount` onto the four corners of the cell containing
    /// `pos`, weighted bilinearly.
    ///
    /// Writing to the cell the droplet just left keeps deposits attached to
    /// ground the water actually passed over. Each corner write is capped by
    /// the operative maximum elevation.
    fn deposit_bilinear(&self, heightmap: &mut Heightmap, pos: Vec2, amount: f32) {
        let ceiling = self.max_elevation.unwrap_or(f32::INFINITY);
        let x0 = pos.x.floor() as usize;
        let y0 = pos.y.floor() as usize;
        let fx = pos.x - x0 as f32;
        let fy = pos.y - y0 as f32;

        for (cx, cy, weight) in [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ] {
            let current = heightmap.at(cx, cy);
            let add = (amount * weight).min((ceiling - current).max(0.0));
            heightmap.set(cx, cy, current + add);
        }
    }

    /// Removes `amount` from the four corners of the cell containing `pos`,
    /// weighted bilinearly. Returns the amount actually removed after the
    /// per-cell below-zero clamp.
    fn erode_bilinear(&self, heightmap: &mut Heightmap, pos: Vec2, amount: f32) -> f32 {
        let x0 = pos.x.floor() as usize;
        let y0 = pos.y.floor() as usize;
        let fx = pos.x - x0 as f32;
        let fy = pos.y - y0 as f32;

        let mut removed = 0.0f32;
        for (cx, cy, weight) in [
            (x0, y0, (1.0 - fx) * (1.0 - fy)),
            (x0 + 1, y0, fx * (1.0 - fy)),
            (x0, y0 + 1, (1.0 - fx) * fy),
            (x0 + 1, y0 + 1, fx * fy),
        ] {
            let current = heightmap.at(cx, cy);
            // Same clamp as the radius kernel: corners never erode below
            // zero, and only the mass actually carved is reported back.
            let take = (amount * weight).min(current).max(0.0);
            heightmap.set(cx, cy, current - take);
            removed += take;
        }
        removed
    }

    /// Removes `amount` spread over a circular distance-weighted kernel
    /// centered on the cell containing `pos`. Returns the amount actually
    /// removed after the per-cell below-zero clamp.
    fn erode_kernel(&mut self, heightmap: &mut Heightmap, pos: Vec2, amount: f32) -> f32 {
        let width = heightmap.width() as i64;
        let height = heightmap.height() as i64;
        let radius = self.params.erosion_radius as i64;
        let cx = pos.x.floor() as i64;
        let cy = pos.y.floor() as i64;

        self.kernel.clear();
        let mut total_weight = 0.0f32;
        for y in (cy - radius)..=(cy + radius) {
            for x in (cx - radius)..=(cx + radius) {
                if x < 0 || y < 0 || x >= width || y >= height {
                    continue;
                }
                let dx = (x - cx) as f32;
                let dy = (y - cy) as f32;
                let dist = (dx * dx + dy * dy).sqrt();
                let weight = 1.0 - dist / radius as f32;
                if weight > 0.0 {
                    self.kernel.push(((y * width + x) as usize, weight));
                    total_weight += weight;
                }
            }
        }

        if total_weight <= KERNEL_WEIGHT_EPSILON {
            return 0.0;
        }

        let mut removed = 0.0f32;
        let data = heightmap.data_mut();
        for &(index, weight) in &self.kernel {
            let current = data[index];
            // Cells never erode below zero; the clamp trims the weighted
            // share rather than renormalising the whole kernel.
            let take = (amount * weight / total_weight).min(current).max(0.0);
            data[index] = current - take;
            removed += take;
        }
        removed
    }
}
