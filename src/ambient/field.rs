//! Particle Field
//!
//! A fixed-size pool of [`Particle`]s inside overscanned viewport bounds,
//! plus the reactions to viewport resize, page scroll and theme changes.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::canvas::Canvas;
use super::palette::Theme;
use super::particle::{Bounds, Particle};

/// Default pool size.
pub const PARTICLE_COUNT: usize = 40;

/// Default margin outside the viewport on every side.
pub const OVERSCAN: f64 = 50.0;

/// Fixed per-frame time step used for inertia decay.
pub const FRAME_DELTA: f64 = 0.2;

/// User motion preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionPreference {
    /// Particles drift.
    #[default]
    Allow,
    /// Particles spawn with zero speed; scroll kicks still apply.
    Reduce,
}

/// Field configuration.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    /// Number of particles in the pool.
    pub particle_count: usize,
    /// Margin outside the viewport.
    pub overscan: f64,
    /// Time step per frame.
    pub frame_delta: f64,
    /// Motion preference applied when spawning.
    pub motion: MotionPreference,
    /// Initial theme.
    pub theme: Theme,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: PARTICLE_COUNT,
            overscan: OVERSCAN,
            frame_delta: FRAME_DELTA,
            motion: MotionPreference::Allow,
            theme: Theme::Light,
        }
    }
}

/// The ambient background animation state.
#[derive(Debug)]
pub struct ParticleField<R = StdRng> {
    config: FieldConfig,
    bounds: Bounds,
    particles: Vec<Particle>,
    theme: Theme,
    scroll_y: f64,
    scroll_delta: f64,
    rng: R,
}

impl ParticleField<StdRng> {
    /// Field for a `width` x `height` viewport, seeded from OS entropy.
    pub fn new(config: FieldConfig, width: f64, height: f64) -> Self {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }
}

impl<R: Rng> ParticleField<R> {
    /// Field using the given generator for every spawn.
    pub fn with_rng(config: FieldConfig, width: f64, height: f64, rng: R) -> Self {
        let bounds = Bounds::for_viewport(width, height, config.overscan);
        let theme = config.theme;
        let mut field = Self {
            config,
            bounds,
            particles: Vec::new(),
            theme,
            scroll_y: 0.0,
            scroll_delta: 0.0,
            rng,
        };
        field.particles = field.spawn_pool();
        field
    }

    fn spawn_pool(&mut self) -> Vec<Particle> {
        let still = self.config.motion == MotionPreference::Reduce;
        let bounds = self.bounds;
        (0..self.config.particle_count)
            .map(|_| Particle::spawn(&mut self.rng, &bounds, still))
            .collect()
    }

    /// Viewport changed size: new bounds and a brand new pool.
    ///
    /// Nothing carries over from the old particles.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.bounds = Bounds::for_viewport(width, height, self.config.overscan);
        let pool = self.spawn_pool();
        self.particles = pool;
    }

    /// Page scrolled to `scroll_y`.
    ///
    /// Records `floor(previous - current)` as the scroll delta and gives
    /// every particle full inertia.
    pub fn scroll_to(&mut self, scroll_y: f64) {
        let raw = self.scroll_y - scroll_y;
        self.scroll_delta = if raw.is_finite() { raw.floor() } else { 0.0 };
        if scroll_y.is_finite() {
            self.scroll_y = scroll_y;
        }
        for p in &mut self.particles {
            p.scroll_inertia = 1.0;
        }
    }

    /// Swap the palette; takes effect on the next draw.
    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    /// Advance every particle one frame.
    pub fn step(&mut self) {
        let bounds = self.bounds;
        for p in &mut self.particles {
            p.step(self.config.frame_delta, self.scroll_delta, &bounds);
        }
    }

    /// Paint the current state.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        canvas.clear(self.bounds.width, self.bounds.height);
        for p in &self.particles {
            canvas.fill_circle(p.x, p.y, p.radius, self.theme.color_for_radius(p.radius));
        }
    }

    /// One animation frame: update, then draw.
    pub fn frame<C: Canvas + ?Sized>(&mut self, canvas: &mut C) {
        self.step();
        self.draw(canvas);
    }

    /// Current bounds.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Current pool.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable pool access, for scripted scenes.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Active theme.
    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Last recorded scroll delta.
    pub fn scroll_delta(&self) -> f64 {
        self.scroll_delta
    }

    /// Last recorded scroll offset.
    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::canvas::{DrawCommand, RecordingCanvas};
    use crate::ambient::palette::{DARK_PALETTE, LIGHT_PALETTE};

    fn field() -> ParticleField {
        ParticleField::with_rng(FieldConfig::default(), 800.0, 600.0, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_initial_pool() {
        let f = field();
        assert_eq!(f.particles().len(), PARTICLE_COUNT);
        assert_eq!(f.bounds(), Bounds::for_viewport(800.0, 600.0, OVERSCAN));
        let b = f.bounds();
        assert!(f.particles().iter().all(|p| b.contains(p.x, p.y)));
        assert_eq!(f.theme(), Theme::Light);
    }

    #[test]
    fn test_resize_replaces_pool() {
        let mut f = field();
        let before = f.particles().to_vec();

        f.resize(1280.0, 720.0);
        assert_eq!(f.bounds(), Bounds::for_viewport(1280.0, 720.0, OVERSCAN));
        assert_eq!(f.particles().len(), PARTICLE_COUNT);
        assert_ne!(f.particles(), &before[..]);

        let b = f.bounds();
        assert!(f.particles().iter().all(|p| b.contains(p.x, p.y)));
    }

    #[test]
    fn test_scroll_sets_delta_and_inertia() {
        let mut f = field();
        f.scroll_to(120.7);
        // floor(0 - 120.7)
        assert_eq!(f.scroll_delta(), -121.0);
        assert_eq!(f.scroll_y(), 120.7);
        assert!(f.particles().iter().all(|p| p.scroll_inertia == 1.0));

        f.scroll_to(100.0);
        assert_eq!(f.scroll_delta(), 20.0);
    }

    #[test]
    fn test_scroll_non_finite_is_zero() {
        let mut f = field();
        f.scroll_to(f64::NAN);
        assert_eq!(f.scroll_delta(), 0.0);
        assert_eq!(f.scroll_y(), 0.0);
    }

    #[test]
    fn test_scroll_kick_moves_particles() {
        let mut f = field();
        for p in f.particles_mut() {
            p.speed = 0.0;
            p.x = 0.0;
            p.y = 0.0;
        }
        // Scrolling up by 10 px => delta +10
        f.scroll_to(-10.0);
        f.step();

        for p in f.particles() {
            let expected = p.radius / 10.0 * 10.0;
            assert!((p.y - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_draw_colors_follow_radius_and_theme() {
        let mut f = field();
        let mut canvas = RecordingCanvas::new();

        f.frame(&mut canvas);
        assert_eq!(
            canvas.commands()[0],
            DrawCommand::Clear {
                width: 900.0,
                height: 700.0,
            }
        );
        assert_eq!(canvas.circles().count(), PARTICLE_COUNT);

        for (cmd, p) in canvas.circles().zip(f.particles()) {
            match cmd {
                DrawCommand::Circle { x, y, radius, color } => {
                    assert_eq!((*x, *y, *radius), (p.x, p.y, p.radius));
                    assert!(LIGHT_PALETTE.contains(&color.as_str()));
                    assert_eq!(color, Theme::Light.color_for_radius(p.radius));
                }
                other => panic!("unexpected {:?}", other),
            }
        }

        f.set_theme(Theme::Dark);
        f.draw(&mut canvas);
        for cmd in canvas.circles() {
            if let DrawCommand::Circle { color, .. } = cmd {
                assert!(DARK_PALETTE.contains(&color.as_str()));
            }
        }
    }

    #[test]
    fn test_reduced_motion() {
        let config = FieldConfig {
            motion: MotionPreference::Reduce,
            ..Default::default()
        };
        let mut f = ParticleField::with_rng(config, 400.0, 300.0, StdRng::seed_from_u64(1));
        let before = f.particles().to_vec();
        f.step();

        for (a, b) in before.iter().zip(f.particles()) {
            assert_eq!((a.x, a.y), (b.x, b.y));
        }
    }

    #[test]
    fn test_long_run_stays_in_bounds() {
        let mut f = field();
        let mut canvas = RecordingCanvas::new();
        for i in 0..2000 {
            if i % 300 == 0 {
                f.scroll_to((i * 7) as f64);
            }
            f.frame(&mut canvas);
        }
        let b = f.bounds();
        assert!(f.particles().iter().all(|p| b.contains(p.x, p.y)));
    }
}
