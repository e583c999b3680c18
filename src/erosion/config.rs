//! Hydraulic erosion parameters.

use serde::{Deserialize, Serialize};

/// Physics parameters for the droplet simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydraulicParams {
    /// Maximum droplet lifetime in steps.
    pub max_iterations: u32,
    /// How much a droplet retains its previous direction (0-1).
    pub inertia: f32,
    /// Multiplier for sediment capacity.
    pub sediment_capacity_factor: f32,
    /// Capacity floor; keeps slow droplets carving shallow channels.
    pub min_sediment_capacity: f32,
    /// Fraction of spare capacity converted to erosion per step.
    pub erode_speed: f32,
    /// Fraction of surplus sediment dropped per step.
    pub deposit_speed: f32,
    /// Fraction of water lost to evaporation per step.
    pub evaporate_speed: f32,
    /// Gravity acceleration acting along the descent.
    pub gravity: f32,
    /// Upper bound on droplet speed.
    pub max_droplet_speed: f32,
    /// Write-kernel radius: 1 uses the four bilinear corners of the old
    /// cell (crisp valleys), 2+ uses a circular distance-weighted kernel
    /// (smoother valleys).
    pub erosion_radius: u32,
    /// Water volume a droplet spawns with.
    pub initial_water: f32,
    /// Speed a droplet spawns with.
    pub initial_speed: f32,
}

impl Default for HydraulicParams {
    fn default() -> Self {
        Self {
            max_iterations: 30,
            inertia: 0.05,
            sediment_capacity_factor: 4.0,
            min_sediment_capacity: 0.01,
            erode_speed: 0.3,
            deposit_speed: 0.3,
            evaporate_speed: 0.01,
            gravity: 4.0,
            max_droplet_speed: 10.0,
            erosion_radius: 1,
            initial_water: 1.0,
            initial_speed: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = HydraulicParams::default();
        assert_eq!(params.max_iterations, 30);
        assert_eq!(params.inertia, 0.05);
        assert_eq!(params.sediment_capacity_factor, 4.0);
        assert_eq!(params.erosion_radius, 1);
        assert_eq!(params.initial_water, 1.0);
    }
}
