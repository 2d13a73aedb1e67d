// ==============================================================================
// thermal.rs — TIRE TEMPERATURE + GRIP BANDS
// ==============================================================================
// Per contact:  temp = clamp(temp + sliding * heat_rate - cooling_rate, floor, max)
//
// Grip is a three-band step function of temperature:
//   temp <  cold_below           -> cold_grip       (0.8)
//   cold_below..=overheated_above -> optimal_grip    (1.0)
//   temp >  overheated_above     -> overheated_grip (0.7)
//
// The steering scalar is the band of the mean temperature of all four tires.
// ==============================================================================

use serde::Serialize;

use crate::config::ThermalTuning;
use crate::dynamics::types::WheelId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GripBand {
    Cold,
    Optimal,
    Overheated,
}

impl GripBand {
    pub fn of(temp: f32, cfg: &ThermalTuning) -> Self {
        if temp < cfg.cold_below {
            GripBand::Cold
        } else if temp > cfg.overheated_above {
            GripBand::Overheated
        } else {
            GripBand::Optimal
        }
    }

    pub fn multiplier(self, cfg: &ThermalTuning) -> f32 {
        match self {
            GripBand::Cold => cfg.cold_grip,
            GripBand::Optimal => cfg.optimal_grip,
            GripBand::Overheated => cfg.overheated_grip,
        }
    }
}

pub fn grip_multiplier(temp: f32, cfg: &ThermalTuning) -> f32 {
    GripBand::of(temp, cfg).multiplier(cfg)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TireThermalModel {
    temps: [f32; 4],
    cfg: ThermalTuning,
}

impl TireThermalModel {
    pub fn new(cfg: ThermalTuning) -> Self {
        Self { temps: [cfg.initial_temp; 4], cfg }
    }

    pub fn reset(&mut self) {
        self.temps = [self.cfg.initial_temp; 4];
    }

    /// One wheel-ground contact with the given sliding speed (m/s).
    pub fn absorb_contact(&mut self, wheel: WheelId, sliding: f32) {
        let sliding = if sliding.is_finite() { sliding.abs() } else { 0.0 };
        let t = &mut self.temps[wheel.index()];
        *t = (*t + sliding * self.cfg.heat_rate - self.cfg.cooling_rate)
            .clamp(self.cfg.ambient_floor, self.cfg.thermal_max);
    }

    pub fn temperature(&self, wheel: WheelId) -> f32 {
        self.temps[wheel.index()]
    }

    pub fn temperatures(&self) -> [f32; 4] {
        self.temps
    }

    pub fn mean_temperature(&self) -> f32 {
        self.temps.iter().sum::<f32>() / 4.0
    }

    pub fn wheel_grip(&self, wheel: WheelId) -> f32 {
        grip_multiplier(self.temperature(wheel), &self.cfg)
    }

    /// Single steering scalar.
    pub fn grip(&self) -> f32 {
        grip_multiplier(self.mean_temperature(), &self.cfg)
    }

    pub fn band(&self) -> GripBand {
        GripBand::of(self.mean_temperature(), &self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grip_bands_match_reference_for_sampled_temperatures() {
        let cfg = ThermalTuning::default();
        for i in 0..=2000 {
            let t = i as f32 * 0.1;
            let expected = if t < 80.0 {
                0.8
            } else if t <= 120.0 {
                1.0
            } else {
                0.7
            };
            assert_eq!(grip_multiplier(t, &cfg), expected, "temp {t}");
        }
        assert_eq!(grip_multiplier(80.0, &cfg), 1.0);
        assert_eq!(grip_multiplier(120.0, &cfg), 1.0);
    }

    #[test]
    fn sliding_heats_and_stays_below_max() {
        let mut model = TireThermalModel::new(ThermalTuning::default());
        model.absorb_contact(WheelId::RL, 10.0);
        assert!((model.temperature(WheelId::RL) - (80.0 + 5.0 - 0.02)).abs() < 1e-4);

        for _ in 0..1000 {
            model.absorb_contact(WheelId::RL, 30.0);
        }
        assert_eq!(model.temperature(WheelId::RL), 150.0);
        assert_eq!(model.wheel_grip(WheelId::RL), 0.7);
        // Three cool tires keep the mean inside the optimal window.
        assert_eq!(model.grip(), 1.0);
    }

    #[test]
    fn rolling_contact_cools_down_to_the_floor() {
        let mut model = TireThermalModel::new(ThermalTuning::default());
        for _ in 0..10_000 {
            for id in WheelId::ALL {
                model.absorb_contact(id, 0.0);
            }
        }
        assert_eq!(model.temperatures(), [20.0; 4]);
        assert_eq!(model.band(), GripBand::Cold);
        assert_eq!(model.grip(), 0.8);

        model.reset();
        assert_eq!(model.temperatures(), [80.0; 4]);
    }
}
