//! Transient water droplet state.

use glam::Vec2;

use super::HydraulicParams;

/// A single water droplet traversing the heightmap.
///
/// Lives only for the duration of one particle simulation. The droplet dies
/// once its water volume evaporates below 1% of a unit volume.
#[derive(Debug, Clone)]
pub struct Droplet {
    /// Fractional grid position.
    pub pos: Vec2,
    /// Unit direction of travel; zero until the first gradient update.
    pub dir: Vec2,
    /// Sediment mass currently carried.
    pub sediment: f32,
    /// Remaining water volume.
    pub water: f32,
    /// Current speed.
    pub speed: f32,
}

impl Droplet {
    /// Spawns a droplet at the given position with the configured initial
    /// water volume and speed.
    pub fn new(pos: Vec2, params: &HydraulicParams) -> Self {
        Self {
            pos,
            dir: Vec2::ZERO,
            sediment: 0.0,
            water: params.initial_water,
            speed: params.initial_speed,
        }
    }

    /// A droplet stays active while it still carries meaningful water.
    pub fn is_active(&self) -> bool {
        self.water > 0.01
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_state() {
        let d = Droplet::new(Vec2::new(3.5, 7.25), &HydraulicParams::default());
        assert_eq!(d.pos, Vec2::new(3.5, 7.25));
        assert_eq!(d.dir, Vec2::ZERO);
        assert_eq!(d.sediment, 0.0);
        assert_eq!(d.water, 1.0);
        assert_eq!(d.speed, 1.0);
        assert!(d.is_active());
    }

    #[test]
    fn test_inactive_when_evaporated() {
        let mut d = Droplet::new(Vec2::ZERO, &HydraulicParams::default());
        d.water = 0.009;
        assert!(!d.is_active());
    }
}
