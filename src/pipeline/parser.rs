//! Configuration document parser.
//!
//! Consumes a type-tagged JSON tree and produces a typed
//! [`PipelineConfig`]. The parser only checks document shape; frame-range
//! semantics are the validator's job.

use serde_json::Value;
use thiserror::Error;

use super::config::{
    HydraulicJobConfig, JobSpec, ModelingMethod, ModelingSpec, PipelineConfig, SimulationJob,
    ThermalJobConfig,
};

/// Errors raised while parsing a pipeline document.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Syntax(#[from] serde_json::Error),
    #[error("Configuration must be a JSON object")]
    NotAnObject,
    #[error("Configuration missing required field: {0}")]
    MissingField(&'static str),
    #[error("Job missing required field: {0}")]
    MissingJobField(&'static str),
    #[error("Field '{field}' must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
    #[error("totalFrames must be >= 1")]
    TotalFramesOutOfRange,
    #[error("Unknown modeling method: {0}")]
    UnknownMethod(String),
    #[error("Unknown job type: {0}")]
    UnknownJobType(String),
}

fn wrong_type(field: &'static str, expected: &'static str) -> ParseError {
    ParseError::WrongType { field, expected }
}

fn read_i32(value: &Value, field: &'static str) -> Result<i32, ParseError> {
    value
        .as_i64()
        .map(|v| v as i32)
        .ok_or_else(|| wrong_type(field, "an integer"))
}

fn read_u32(value: &Value, field: &'static str) -> Result<u32, ParseError> {
    value
        .as_u64()
        .map(|v| v as u32)
        .ok_or_else(|| wrong_type(field, "a non-negative integer"))
}

fn read_f32(value: &Value, field: &'static str) -> Result<f32, ParseError> {
    value
        .as_f64()
        .map(|v| v as f32)
        .ok_or_else(|| wrong_type(field, "a number"))
}

fn read_str<'a>(value: &'a Value, field: &'static str) -> Result<&'a str, ParseError> {
    value.as_str().ok_or_else(|| wrong_type(field, "a string"))
}

/// Parses a pipeline document from JSON text.
pub fn parse_str(input: &str) -> Result<PipelineConfig, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    parse_value(&value)
}

/// Parses a pipeline document from an in-memory JSON tree.
pub fn parse_value(value: &Value) -> Result<PipelineConfig, ParseError> {
    let root = value.as_object().ok_or(ParseError::NotAnObject)?;

    let total_frames_value = root
        .get("totalFrames")
        .ok_or(ParseError::MissingField("totalFrames"))?;
    let total_frames = read_i32(total_frames_value, "totalFrames")?;
    if total_frames < 1 {
        return Err(ParseError::TotalFramesOutOfRange);
    }

    let step0_value = root.get("step0").ok_or(ParseError::MissingField("step0"))?;
    if !step0_value.is_object() {
        return Err(wrong_type("step0", "an object"));
    }
    let step0 = parse_modeling_spec(step0_value)?;

    let jobs = match root.get("jobs") {
        None => Vec::new(),
        Some(Value::Array(entries)) => entries
            .iter()
            .map(parse_job)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(wrong_type("jobs", "an array")),
    };

    Ok(PipelineConfig {
        total_frames,
        step0,
        jobs,
    })
}

fn parse_modeling_spec(value: &Value) -> Result<ModelingSpec, ParseError> {
    let mut spec = ModelingSpec::default();

    if let Some(method) = value.get("method") {
        spec.method = match read_str(method, "method")? {
            "perlin" => ModelingMethod::Perlin,
            "fbm" => ModelingMethod::Fbm,
            "semiSphere" => ModelingMethod::SemiSphere,
            "cone" => ModelingMethod::Cone,
            "sigmoid" => ModelingMethod::Sigmoid,
            other => return Err(ParseError::UnknownMethod(other.to_string())),
        };
    }

    if let Some(v) = value.get("seed") {
        spec.seed = read_u32(v, "seed")?;
    }
    if let Some(v) = value.get("frequency") {
        spec.frequency = read_f32(v, "frequency")?;
    }
    if let Some(v) = value.get("amplitude") {
        spec.amplitude = read_f32(v, "amplitude")?;
    }
    if let Some(v) = value.get("octaves") {
        spec.octaves = read_u32(v, "octaves")?;
    }
    if let Some(v) = value.get("persistence") {
        spec.persistence = read_f32(v, "persistence")?;
    }
    if let Some(v) = value.get("lacunarity") {
        spec.lacunarity = read_f32(v, "lacunarity")?;
    }
    if let Some(v) = value.get("radius") {
        spec.radius = read_f32(v, "radius")?;
    }
    if let Some(v) = value.get("height") {
        spec.height = read_f32(v, "height")?;
    }

    Ok(spec)
}

fn parse_job(value: &Value) -> Result<SimulationJob, ParseError> {
    let job = value.as_object().ok_or(wrong_type("jobs[]", "an object"))?;

    let id = read_str(
        job.get("id").ok_or(ParseError::MissingJobField("id"))?,
        "id",
    )?
    .to_string();
    let name = read_str(
        job.get("name").ok_or(ParseError::MissingJobField("name"))?,
        "name",
    )?
    .to_string();
    let start_frame = read_i32(
        job.get("startFrame")
            .ok_or(ParseError::MissingJobField("startFrame"))?,
        "startFrame",
    )?;
    let end_frame = read_i32(
        job.get("endFrame")
            .ok_or(ParseError::MissingJobField("endFrame"))?,
        "endFrame",
    )?;
    let job_type = read_str(
        job.get("type").ok_or(ParseError::MissingJobField("type"))?,
        "type",
    )?;
    let config = job
        .get("config")
        .ok_or(ParseError::MissingJobField("config"))?;

    let spec = match job_type {
        "hydraulic" => JobSpec::Hydraulic(parse_hydraulic_config(config)?),
        "thermal" => JobSpec::Thermal(parse_thermal_config(config)?),
        other => return Err(ParseError::UnknownJobType(other.to_string())),
    };

    let enabled = match job.get("enabled") {
        Some(v) => v.as_bool().ok_or(wrong_type("enabled", "a boolean"))?,
        None => true,
    };

    Ok(SimulationJob {
        id,
        name,
        start_frame,
        end_frame,
        spec,
        enabled,
    })
}

fn parse_hydraulic_config(value: &Value) -> Result<HydraulicJobConfig, ParseError> {
    let mut config = HydraulicJobConfig::default();

    if let Some(v) = value.get("numParticles") {
        config.num_particles = read_u32(v, "numParticles")?;
    }
    if let Some(v) = value.get("erosionRate") {
        config.erosion_rate = read_f32(v, "erosionRate")?;
    }
    if let Some(v) = value.get("depositionRate") {
        config.deposition_rate = read_f32(v, "depositionRate")?;
    }
    if let Some(v) = value.get("evaporationRate") {
        config.evaporation_rate = read_f32(v, "evaporationRate")?;
    }
    if let Some(v) = value.get("sedimentCapacity") {
        config.sediment_capacity = read_f32(v, "sedimentCapacity")?;
    }
    if let Some(v) = value.get("minSlope") {
        config.min_slope = read_f32(v, "minSlope")?;
    }
    if let Some(v) = value.get("inertia") {
        config.inertia = read_f32(v, "inertia")?;
    }
    if let Some(v) = value.get("gravity") {
        config.gravity = read_f32(v, "gravity")?;
    }
    if let Some(v) = value.get("maxLifetime") {
        config.max_lifetime = read_u32(v, "maxLifetime")?;
    }
    if let Some(v) = value.get("maxDropletSpeed") {
        config.max_droplet_speed = read_f32(v, "maxDropletSpeed")?;
    }
    if let Some(v) = value.get("erosionRadius") {
        config.erosion_radius = read_u32(v, "erosionRadius")?;
    }
    if let Some(v) = value.get("initialWater") {
        config.initial_water = read_f32(v, "initialWater")?;
    }
    if let Some(v) = value.get("initialSpeed") {
        config.initial_speed = read_f32(v, "initialSpeed")?;
    }

    Ok(config)
}

fn parse_thermal_config(value: &Value) -> Result<ThermalJobConfig, ParseError> {
    let mut config = ThermalJobConfig::default();

    if let Some(v) = value.get("talusAngle") {
        config.talus_angle = read_f32(v, "talusAngle")?;
    }
    if let Some(v) = value.get("transferRate") {
        config.transfer_rate = read_f32(v, "transferRate")?;
    }
    if let Some(v) = value.get("iterations") {
        config.iterations = read_u32(v, "iterations")?;
    }

    Ok(config)
}
