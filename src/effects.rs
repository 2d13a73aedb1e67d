// src/effects.rs
//
// Surface particle cues raised by wheel contacts. The physics core only
// classifies and queues them; drawing smoke or dust is the host's job.

use serde::Serialize;

use crate::config::EffectTuning;
use crate::dynamics::WheelId;
use crate::materials::{StandardSurfaces, SurfaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    TireSmoke,
    Dust,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfaceEffect {
    pub kind: EffectKind,
    pub wheel: WheelId,
    pub position: [f32; 3], // wheel centre
    pub velocity: [f32; 3], // wheel linear velocity
    pub intensity: f32,
}

/// Smoke on asphalt only once the tire really slides; grass always kicks up dust.
pub fn classify(
    surface: Option<SurfaceId>,
    sliding: f32,
    surfaces: &StandardSurfaces,
    cfg: &EffectTuning,
) -> Option<(EffectKind, f32)> {
    let surface = surface?;
    if surface == surfaces.track && sliding > cfg.smoke_min_sliding {
        Some((EffectKind::TireSmoke, sliding * cfg.smoke_intensity))
    } else if surface == surfaces.grass {
        Some((EffectKind::Dust, sliding * cfg.dust_intensity))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::materials::SurfaceMaterialTable;
    use approx::assert_relative_eq;

    #[test]
    fn smoke_needs_track_and_real_sliding() {
        let (_, s) = SurfaceMaterialTable::racing();
        let cfg = EffectTuning::default();

        assert_eq!(classify(Some(s.track), 1.5, &s, &cfg), None);
        let (kind, intensity) = classify(Some(s.track), 5.0, &s, &cfg).unwrap();
        assert_eq!(kind, EffectKind::TireSmoke);
        assert_relative_eq!(intensity, 1.0);
    }

    #[test]
    fn grass_dusts_and_other_surfaces_stay_quiet() {
        let (_, s) = SurfaceMaterialTable::racing();
        let cfg = EffectTuning::default();

        let (kind, intensity) = classify(Some(s.grass), 2.0, &s, &cfg).unwrap();
        assert_eq!(kind, EffectKind::Dust);
        assert_relative_eq!(intensity, 0.6, epsilon = 1e-6);

        assert_eq!(classify(Some(s.ground), 10.0, &s, &cfg), None);
        assert_eq!(classify(Some(s.barrier), 10.0, &s, &cfg), None);
        assert_eq!(classify(None, 10.0, &s, &cfg), None);
    }
}
