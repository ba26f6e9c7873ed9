//! Particles and their bounding rectangle.
//!
//! Each particle random-walks on its own: it turns at a fixed rate, moves a
//! fixed distance along its heading, optionally takes a decaying vertical
//! kick after a scroll, then wraps around the bounds.

use std::f64::consts::TAU;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Heading change per frame is `turn_rate * TURN_STEP`.
pub const TURN_STEP: f64 = 0.01;

/// Scroll inertia lost per unit of frame delta.
pub const INERTIA_DECAY: f64 = 0.02;

/// Smallest particle radius.
pub const RADIUS_MIN: f64 = 4.0;

/// Radii are drawn from `[RADIUS_MIN, RADIUS_MIN + RADIUS_SPREAD)`.
pub const RADIUS_SPREAD: f64 = 10.0;

/// Turn rates are drawn from `[TURN_RATE_MIN, TURN_RATE_MIN + 1)`.
pub const TURN_RATE_MIN: f64 = -0.8;

/// Rectangle particles live in, with toroidal edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Bounds covering a viewport plus `overscan` on every side, so
    /// wrapping particles are off screen when they jump.
    pub fn for_viewport(width: f64, height: f64, overscan: f64) -> Self {
        Self {
            x: -overscan,
            y: -overscan,
            width: width + 2.0 * overscan,
            height: height + 2.0 * overscan,
        }
    }

    /// Whether a point lies inside (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x + self.width && y >= self.y && y <= self.y + self.height
    }

    /// Wrap a point back inside.
    pub fn wrap(&self, x: f64, y: f64) -> (f64, f64) {
        (wrap_axis(x, self.x, self.width), wrap_axis(y, self.y, self.height))
    }
}

/// Toroidal wrap on one axis.
///
/// Values inside `[min, min + extent]` are untouched. Anything past an edge
/// re-enters from the opposite side, modulo the extent.
fn wrap_axis(value: f64, min: f64, extent: f64) -> f64 {
    if !(extent > 0.0) || !value.is_finite() {
        return value;
    }
    if value < min || value > min + extent {
        min + (value - min).rem_euclid(extent)
    } else {
        value
    }
}

/// One ambient particle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Heading in radians. `0` points down the y axis.
    pub direction: f64,
    /// Heading drift per frame, scaled by [`TURN_STEP`].
    pub turn_rate: f64,
    /// Size, also the depth of the scroll reaction.
    pub radius: f64,
    /// Distance moved per frame.
    pub speed: f64,
    /// Remaining scroll kick in `[0, 1]`.
    pub scroll_inertia: f64,
}

impl Particle {
    /// Particle heading straight down, with no turn and no inertia.
    pub fn new(x: f64, y: f64, radius: f64, speed: f64) -> Self {
        Self {
            x,
            y,
            direction: 0.0,
            turn_rate: 0.0,
            radius,
            speed,
            scroll_inertia: 0.0,
        }
    }

    /// Random particle inside `bounds`. With `still` set it never moves on
    /// its own (reduced motion).
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, bounds: &Bounds, still: bool) -> Self {
        let x = bounds.x + rng.gen::<f64>() * bounds.width;
        let y = bounds.y + rng.gen::<f64>() * bounds.height;
        let radius = RADIUS_MIN + rng.gen::<f64>() * RADIUS_SPREAD;
        let speed = if still { 0.0 } else { rng.gen::<f64>() };

        Self {
            x,
            y,
            direction: rng.gen::<f64>() * TAU,
            turn_rate: TURN_RATE_MIN + rng.gen::<f64>(),
            radius,
            speed,
            scroll_inertia: 0.0,
        }
    }

    /// Advance one frame.
    ///
    /// `frame_delta` drives the inertia decay; `scroll_delta` is the last
    /// recorded scroll distance.
    pub fn step(&mut self, frame_delta: f64, scroll_delta: f64, bounds: &Bounds) {
        self.direction += self.turn_rate * TURN_STEP;
        self.x += self.direction.sin() * self.speed;
        self.y += self.direction.cos() * self.speed;

        if self.scroll_inertia > 0.0 {
            self.y += (self.radius / 10.0) * scroll_delta * self.scroll_inertia;
            self.scroll_inertia -= frame_delta * INERTIA_DECAY;
            if self.scroll_inertia < 0.0 {
                self.scroll_inertia = 0.0;
            }
        }

        let (x, y) = bounds.wrap(self.x, self.y);
        self.x = x;
        self.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const EPS: f64 = 1e-9;

    fn bounds() -> Bounds {
        Bounds::for_viewport(800.0, 600.0, 50.0)
    }

    #[test]
    fn test_viewport_overscan() {
        let b = bounds();
        assert_eq!(
            b,
            Bounds {
                x: -50.0,
                y: -50.0,
                width: 900.0,
                height: 700.0,
            }
        );
    }

    #[test]
    fn test_straight_step() {
        let mut p = Particle::new(10.0, 10.0, 5.0, 2.0);
        p.step(0.2, 0.0, &bounds());
        assert!((p.x - 10.0).abs() < EPS);
        assert!((p.y - 12.0).abs() < EPS);
    }

    #[test]
    fn test_turn_applies_before_move() {
        let mut p = Particle::new(0.0, 0.0, 5.0, 1.0);
        p.turn_rate = 0.5;
        p.step(0.2, 0.0, &bounds());

        let heading = 0.5 * TURN_STEP;
        assert!((p.direction - heading).abs() < EPS);
        assert!((p.x - heading.sin()).abs() < EPS);
        assert!((p.y - heading.cos()).abs() < EPS);
    }

    #[test]
    fn test_scroll_kick_and_decay() {
        let mut p = Particle::new(100.0, 100.0, 10.0, 0.0);
        p.scroll_inertia = 1.0;

        // radius/10 = 1, delta 20, inertia 1 => +20
        p.step(0.2, 20.0, &bounds());
        assert!((p.y - 120.0).abs() < EPS);
        assert!((p.scroll_inertia - (1.0 - 0.2 * INERTIA_DECAY)).abs() < EPS);

        // Second frame uses the decayed inertia
        let inertia = p.scroll_inertia;
        p.step(0.2, 20.0, &bounds());
        assert!((p.y - (120.0 + 20.0 * inertia)).abs() < EPS);
    }

    #[test]
    fn test_scroll_kick_ends() {
        let mut p = Particle::new(100.0, 100.0, 10.0, 0.0);
        p.scroll_inertia = 1.0;

        // 1 / (0.2 * 0.02) = 250 frames to decay, plus rounding slack
        for _ in 0..260 {
            p.step(0.2, 1.0, &bounds());
        }
        assert_eq!(p.scroll_inertia, 0.0);

        let y = p.y;
        p.step(0.2, 1.0, &bounds());
        assert_eq!(p.y, y);
    }

    #[test]
    fn test_wrap_right_edge() {
        let b = bounds();
        let x = b.x + b.width + 1.0;
        let (wx, _) = b.wrap(x, 0.0);
        assert!((wx - (x - b.width)).abs() < EPS);
        assert!(wx >= b.x && wx <= b.x + b.width);
    }

    #[test]
    fn test_wrap_left_and_top() {
        let b = bounds();
        let (wx, wy) = b.wrap(b.x - 3.0, b.y - 0.5);
        assert!((wx - (b.x - 3.0 + b.width)).abs() < EPS);
        assert!((wy - (b.y - 0.5 + b.height)).abs() < EPS);
    }

    #[test]
    fn test_wrap_keeps_edges_and_interior() {
        let b = bounds();
        assert_eq!(b.wrap(b.x, b.y), (b.x, b.y));
        assert_eq!(b.wrap(b.x + b.width, b.y + b.height), (b.x + b.width, b.y + b.height));
        assert_eq!(b.wrap(10.0, 20.0), (10.0, 20.0));
    }

    #[test]
    fn test_wrap_large_overshoot() {
        let b = bounds();
        let (_, wy) = b.wrap(0.0, b.y + 3.0 * b.height + 7.0);
        assert!((wy - (b.y + 7.0)).abs() < 1e-6);
    }

    #[test]
    fn test_spawn_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(11);
        let b = bounds();
        for _ in 0..500 {
            let p = Particle::spawn(&mut rng, &b, false);
            assert!(b.contains(p.x, p.y));
            assert!(p.radius >= RADIUS_MIN && p.radius < RADIUS_MIN + RADIUS_SPREAD);
            assert!(p.speed >= 0.0 && p.speed < 1.0);
            assert!(p.turn_rate >= TURN_RATE_MIN && p.turn_rate < TURN_RATE_MIN + 1.0);
            assert!(p.direction >= 0.0 && p.direction < TAU);
            assert_eq!(p.scroll_inertia, 0.0);
        }
    }

    #[test]
    fn test_spawn_still() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = Particle::spawn(&mut rng, &bounds(), true);
        assert_eq!(p.speed, 0.0);
    }

    proptest! {
        #[test]
        fn prop_step_stays_in_bounds(
            x in -50.0f64..850.0,
            y in -50.0f64..650.0,
            direction in 0.0f64..TAU,
            speed in 0.0f64..1.0,
            radius in 4.0f64..14.0,
            inertia in 0.0f64..=1.0,
            scroll in -5000.0f64..5000.0,
        ) {
            let b = bounds();
            let mut p = Particle::new(x, y, radius, speed);
            p.direction = direction;
            p.scroll_inertia = inertia;
            p.step(0.2, scroll, &b);
            prop_assert!(b.contains(p.x, p.y), "({}, {}) escaped", p.x, p.y);
        }
    }
}
