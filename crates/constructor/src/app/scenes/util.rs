use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reality_engine::journey::Easing;
use reality_engine::{FactorId, JourneyStore, MarkerKind, SceneMarker, ScenePoint, Vec3};

pub(crate) const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;

/// Spherical to cartesian with `phi` measured from +Y.
pub(crate) fn sph(r: f32, phi: f32, theta: f32) -> Vec3 {
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.cos(),
        r * phi.sin() * theta.sin(),
    )
}

pub(crate) fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Uniform direction on the unit sphere.
pub(crate) fn random_direction(rng: &mut StdRng) -> Vec3 {
    let theta = rng.gen_range(0.0..TAU);
    let phi = (rng.gen_range(-1.0f32..1.0)).acos();
    Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos())
}

pub(crate) const fn rgb(hex: u32) -> [u8; 3] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8]
}

pub(crate) fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> [u8; 3] {
    let hue = hue.rem_euclid(1.0);
    let chroma = (1.0 - (2.0 * lightness - 1.0).abs()) * saturation;
    let sector = hue * 6.0;
    let x = chroma * (1.0 - (sector % 2.0 - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    let m = lightness - chroma * 0.5;
    let to_byte = |channel: f32| ((channel + m).clamp(0.0, 1.0) * 255.0).round() as u8;
    [to_byte(r), to_byte(g), to_byte(b)]
}

/// Picks the normal or reversed color for a factor from the journey's polarity.
pub(crate) fn polarity_color(
    journey: &JourneyStore,
    id: FactorId,
    normal: [u8; 3],
    reversed: [u8; 3],
) -> [u8; 3] {
    if journey.is_reversed(id) {
        reversed
    } else {
        normal
    }
}

pub(crate) fn factor_marker(id: FactorId, position: Vec3, radius: f32, color: [u8; 3]) -> SceneMarker {
    SceneMarker {
        kind: MarkerKind::Factor(id),
        position,
        radius,
        color,
    }
}

pub(crate) fn point(position: Vec3, size: f32, color: [u8; 3], opacity: f32) -> ScenePoint {
    ScenePoint {
        position,
        size,
        color,
        opacity,
    }
}

/// Points sampled along an XZ ellipse centered on `center`.
pub(crate) fn ellipse_points(
    center: Vec3,
    radius_x: f32,
    radius_z: f32,
    samples: usize,
    color: [u8; 3],
    opacity: f32,
) -> impl Iterator<Item = ScenePoint> {
    (0..samples).map(move |index| {
        let angle = index as f32 / samples as f32 * TAU;
        point(
            center + Vec3::new(angle.cos() * radius_x, 0.0, angle.sin() * radius_z),
            0.25,
            color,
            opacity,
        )
    })
}

/// Eased scalar animation; retargeting restarts from the current value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ScalarTween {
    from: f32,
    to: f32,
    elapsed: f32,
    duration: f32,
    easing: Easing,
}

impl ScalarTween {
    pub(crate) fn settled(value: f32) -> Self {
        Self {
            from: value,
            to: value,
            elapsed: 0.0,
            duration: 0.0,
            easing: Easing::Linear,
        }
    }

    pub(crate) fn retarget(&mut self, to: f32, duration: f32, easing: Easing) {
        if (self.to - to).abs() <= f32::EPSILON {
            return;
        }
        *self = Self {
            from: self.value(),
            to,
            elapsed: 0.0,
            duration,
            easing,
        };
    }

    pub(crate) fn tick(&mut self, dt_seconds: f32) {
        self.elapsed = (self.elapsed + dt_seconds.max(0.0)).min(self.duration);
    }

    pub(crate) fn value(&self) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = self.easing.apply(self.elapsed / self.duration);
        self.from + (self.to - self.from) * t
    }

    pub(crate) fn target(&self) -> f32 {
        self.to
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn sph_equator_at_zero_theta_is_positive_x() {
        let p = sph(12.5, HALF_PI, 0.0);
        assert!(close(p.x, 12.5) && close(p.y, 0.0) && close(p.z, 0.0));
    }

    #[test]
    fn sph_pole_is_straight_up() {
        let p = sph(3.0, 0.0, 1.3);
        assert!(close(p.y, 3.0));
        assert!(close(p.x, 0.0) && close(p.z, 0.0));
    }

    #[test]
    fn random_direction_is_unit_length() {
        let mut rng = seeded_rng(7);
        for _ in 0..64 {
            assert!(close(random_direction(&mut rng).length(), 1.0));
        }
    }

    #[test]
    fn hex_and_hsl_colors() {
        assert_eq!(rgb(0x4488ff), [0x44, 0x88, 0xff]);
        assert_eq!(hsl_to_rgb(0.0, 1.0, 0.5), [255, 0, 0]);
        assert_eq!(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0, 0, 255]);
        assert_eq!(hsl_to_rgb(0.3, 0.0, 1.0), [255, 255, 255]);
    }

    #[test]
    fn tween_reaches_target_and_retargets_from_current_value() {
        let mut tween = ScalarTween::settled(0.0);
        tween.retarget(std::f32::consts::PI, 2.2, Easing::Power2InOut);
        tween.tick(1.1);
        let midway = tween.value();
        assert!(midway > 0.0 && midway < std::f32::consts::PI);

        tween.retarget(0.0, 2.2, Easing::Power2InOut);
        assert!(close(tween.value(), midway));
        tween.tick(5.0);
        assert!(tween.is_finished());
        assert!(close(tween.value(), 0.0));
    }

    #[test]
    fn retarget_to_same_value_keeps_progress() {
        let mut tween = ScalarTween::settled(0.0);
        tween.retarget(1.0, 2.0, Easing::Linear);
        tween.tick(1.0);
        tween.retarget(1.0, 2.0, Easing::Linear);
        assert!(close(tween.value(), 0.5));
    }

    #[test]
    fn polarity_color_follows_reversal() {
        let mut journey = JourneyStore::default();
        journey.set_stage(1);
        journey.set_active_factor(FactorId::Sun);
        assert_eq!(polarity_color(&journey, FactorId::Sun, [1, 1, 1], [2, 2, 2]), [1, 1, 1]);
        journey.toggle_active();
        assert_eq!(polarity_color(&journey, FactorId::Sun, [1, 1, 1], [2, 2, 2]), [2, 2, 2]);
    }
}
