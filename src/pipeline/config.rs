//! Typed pipeline configuration.

use serde::{Deserialize, Serialize};

use crate::erosion::HydraulicParams;

/// Modeling method for the frame-0 terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModelingMethod {
    /// Single-octave gradient noise.
    Perlin,
    /// Fractal Brownian motion.
    Fbm,
    /// Hemisphere bump centered on the grid.
    SemiSphere,
    /// Linear cone centered on the grid.
    Cone,
    /// Declared but not yet defined; initializes to a flat zero terrain.
    Sigmoid,
}

/// Frame-0 terrain modeling specification.
///
/// Carries the union of noise and geometric parameters; each method reads
/// only the group it needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelingSpec {
    pub method: ModelingMethod,
    /// Noise seed (perlin, fbm).
    pub seed: u32,
    /// Base spatial frequency (perlin, fbm).
    pub frequency: f32,
    /// Elevation amplitude (perlin, fbm).
    pub amplitude: f32,
    /// Octave count (fbm).
    pub octaves: u32,
    /// Amplitude decay per octave (fbm).
    pub persistence: f32,
    /// Frequency growth per octave (fbm).
    pub lacunarity: f32,
    /// Shape radius in cells (semiSphere, cone).
    pub radius: f32,
    /// Peak height (cone).
    pub height: f32,
}

impl Default for ModelingSpec {
    fn default() -> Self {
        Self {
            method: ModelingMethod::Fbm,
            seed: 12345,
            frequency: 0.01,
            amplitude: 50.0,
            octaves: 6,
            persistence: 0.5,
            lacunarity: 2.0,
            radius: 128.0,
            height: 100.0,
        }
    }
}

/// Wire-format configuration of a hydraulic erosion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HydraulicJobConfig {
    /// Droplets simulated per job application.
    pub num_particles: u32,
    pub erosion_rate: f32,
    pub deposition_rate: f32,
    pub evaporation_rate: f32,
    pub sediment_capacity: f32,
    pub min_slope: f32,
    pub inertia: f32,
    pub gravity: f32,
    /// Per-droplet lifetime in steps.
    pub max_lifetime: u32,
    pub max_droplet_speed: f32,
    pub erosion_radius: u32,
    pub initial_water: f32,
    pub initial_speed: f32,
}

impl Default for HydraulicJobConfig {
    fn default() -> Self {
        Self {
            num_particles: 50_000,
            erosion_rate: 0.3,
            deposition_rate: 0.3,
            evaporation_rate: 0.01,
            sediment_capacity: 4.0,
            min_slope: 0.01,
            inertia: 0.05,
            gravity: 4.0,
            max_lifetime: 30,
            max_droplet_speed: 10.0,
            erosion_radius: 1,
            initial_water: 1.0,
            initial_speed: 1.0,
        }
    }
}

impl From<&HydraulicJobConfig> for HydraulicParams {
    /// Maps the wire names onto the simulator's physics names.
    fn from(config: &HydraulicJobConfig) -> Self {
        Self {
            max_iterations: config.max_lifetime,
            inertia: config.inertia,
            sediment_capacity_factor: config.sediment_capacity,
            min_sediment_capacity: config.min_slope,
            erode_speed: config.erosion_rate,
            deposit_speed: config.deposition_rate,
            evaporate_speed: config.evaporation_rate,
            gravity: config.gravity,
            max_droplet_speed: config.max_droplet_speed,
            erosion_radius: config.erosion_radius.max(1),
            initial_water: config.initial_water,
            initial_speed: config.initial_speed,
        }
    }
}

/// Wire-format configuration of a thermal erosion job.
///
/// Accepted by the parser and scheduled by the executor, but its physical
/// model is not part of this engine yet; application is a no-op.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThermalJobConfig {
    /// Angle of repose in radians.
    pub talus_angle: f32,
    pub transfer_rate: f32,
    pub iterations: u32,
}

impl Default for ThermalJobConfig {
    fn default() -> Self {
        Self {
            talus_angle: 0.7,
            transfer_rate: 0.5,
            iterations: 100,
        }
    }
}

/// Per-type job configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobSpec {
    Hydraulic(HydraulicJobConfig),
    Thermal(ThermalJobConfig),
}

/// A declarative request to apply one erosion algorithm to an inclusive
/// 1-based frame interval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationJob {
    pub id: String,
    pub name: String,
    pub start_frame: i32,
    pub end_frame: i32,
    pub spec: JobSpec,
    pub enabled: bool,
}

/// Complete pipeline: timeline length, frame-0 modeling spec and the
/// ordered job list. Declaration order is significant: jobs with
/// overlapping ranges apply in order, so the last writer wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineConfig {
    pub total_frames: i32,
    pub step0: ModelingSpec,
    pub jobs: Vec<SimulationJob>,
}
