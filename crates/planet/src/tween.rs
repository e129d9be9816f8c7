//! Single-value tweens used for ship and camera rotation.

use std::f32::consts::FRAC_PI_2;

/// Easing curve applied to normalized time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ease {
    Linear,
    SineOut,
    /// Overshoots slightly at both ends.
    BackInOut,
}

impl Ease {
    const BACK_OVERSHOOT: f32 = 1.701_58 * 1.525;

    /// Map `t` in `[0, 1]` onto the curve. The ends map to exactly 0 and 1.
    #[must_use]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::SineOut => (t * FRAC_PI_2).sin(),
            Self::BackInOut => {
                let s = Self::BACK_OVERSHOOT;
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * (t * t * ((s + 1.0) * t - s))
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * ((s + 1.0) * t + s) + 2.0)
                }
            }
        }
    }
}

/// A float eased from its current value toward a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    value: f32,
    from: f32,
    to: f32,
    duration: f32,
    elapsed: f32,
    ease: Ease,
    active: bool,
}

impl Tween {
    #[must_use]
    pub const fn new(value: f32) -> Self {
        Self {
            value,
            from: value,
            to: value,
            duration: 0.0,
            elapsed: 0.0,
            ease: Ease::Linear,
            active: false,
        }
    }

    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Final value of the running tween, or the current value when idle.
    #[must_use]
    pub const fn target(&self) -> f32 {
        if self.active { self.to } else { self.value }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Jump to `value`, cancelling any running tween.
    pub fn set(&mut self, value: f32) {
        *self = Self::new(value);
    }

    /// Restart from the current value toward `to`.
    pub fn start(&mut self, to: f32, duration: f32, ease: Ease) {
        self.from = self.value;
        self.to = to;
        self.duration = duration;
        self.elapsed = 0.0;
        self.ease = ease;
        self.active = true;
        if duration <= 0.0 {
            self.finish();
        }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn update(&mut self, dt: f32) -> f32 {
        if !self.active {
            return self.value;
        }
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.finish();
        } else {
            let k = self.ease.apply(self.elapsed / self.duration);
            self.value = self.from + (self.to - self.from) * k;
        }
        self.value
    }

    fn finish(&mut self) {
        self.value = self.to;
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curves_hit_their_ends() {
        for ease in [Ease::Linear, Ease::SineOut, Ease::BackInOut] {
            assert!(ease.apply(0.0).abs() < 1e-6, "{ease:?}");
            assert!((ease.apply(1.0) - 1.0).abs() < 1e-6, "{ease:?}");
        }
        assert!((Ease::BackInOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn back_overshoots() {
        assert!(Ease::BackInOut.apply(0.1) < 0.0);
        assert!(Ease::BackInOut.apply(0.9) > 1.0);
    }

    #[test]
    fn sine_out_is_ahead_of_linear() {
        for t in [0.1, 0.3, 0.5, 0.7, 0.9] {
            assert!(Ease::SineOut.apply(t) > t);
        }
    }

    #[test]
    fn tween_reaches_target_and_stops() {
        let mut tween = Tween::new(1.0);
        tween.start(3.0, 0.5, Ease::Linear);
        assert!(tween.is_active());
        assert!((tween.update(0.25) - 2.0).abs() < 1e-6);
        assert_eq!(tween.target(), 3.0);
        assert_eq!(tween.update(0.5), 3.0);
        assert!(!tween.is_active());
        assert_eq!(tween.update(1.0), 3.0);
    }

    #[test]
    fn restart_begins_from_current_value() {
        let mut tween = Tween::new(0.0);
        tween.start(10.0, 1.0, Ease::Linear);
        tween.update(0.5);
        tween.start(0.0, 1.0, Ease::Linear);
        assert!((tween.update(0.5) - 2.5).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_jumps() {
        let mut tween = Tween::new(0.0);
        tween.start(4.0, 0.0, Ease::BackInOut);
        assert_eq!(tween.value(), 4.0);
        assert!(!tween.is_active());
    }
}
