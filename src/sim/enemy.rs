//! Enemies
//!
//! All enemies share a [`Mass`], a target, and the spawn/death lifecycle.
//! What differs is how each one generates force, captured by [`Behaviour`].

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::mass::{Mass, MassOptions, SimulationContext, Simulated};
use crate::consts::*;
use crate::error::SimResult;
use crate::{angle_of, vector_at};

/// Which body an enemy hunts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    Tether,
    Player,
}

/// Enemy species, as named by spawn directives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Homes in at constant thrust, regardless of distance
    Chaser,
    /// Picks a near-miss heading once and thrusts along it forever
    Drifter,
    /// Dashes at the target, then idles to recharge
    Twitchy,
}

impl EnemyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Chaser => "chaser",
            EnemyKind::Drifter => "drifter",
            EnemyKind::Twitchy => "twitchy",
        }
    }

    fn mass_options(&self, position: Vec2) -> MassOptions {
        let (mass, damping, rgb) = match self {
            EnemyKind::Chaser => (CHASER_MASS, CHASER_DAMPING, [102, 102, 0]),
            EnemyKind::Drifter => (DRIFTER_MASS, DRIFTER_DAMPING, [40, 140, 200]),
            EnemyKind::Twitchy => (TWITCHY_MASS, TWITCHY_DAMPING, [200, 80, 200]),
        };
        MassOptions {
            position,
            mass,
            damping,
            radius: ENEMY_RADIUS,
            bounciness: ENEMY_BOUNCINESS,
            has_walls: true,
            rgb,
            ..Default::default()
        }
    }
}

/// Per-species force generation state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Behaviour {
    Chaser,
    Drifter {
        /// Deliberate error added to the perfect heading
        heading_offset: f32,
        /// Fixed once the drifter goes live; re-derived after bounces
        angle: Option<f32>,
        power: f32,
    },
    Twitchy {
        /// 0..=1
        fuel: f32,
        charging: bool,
        discharge_rate: f32,
        charge_rate: f32,
    },
}

impl Behaviour {
    fn new<R: Rng + ?Sized>(kind: EnemyKind, rng: &mut R) -> Self {
        match kind {
            EnemyKind::Chaser => Behaviour::Chaser,
            EnemyKind::Drifter => {
                let magnitude = rng.random_range(DRIFTER_MIN_OFFSET..DRIFTER_MAX_OFFSET);
                let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
                Behaviour::Drifter {
                    heading_offset: magnitude * sign,
                    angle: None,
                    power: DRIFTER_POWER,
                }
            }
            // Start part-charged so a pack doesn't dash in lockstep
            EnemyKind::Twitchy => Behaviour::Twitchy {
                fuel: rng.random_range(0.0..0.5),
                charging: true,
                discharge_rate: TWITCHY_DISCHARGE_RATE,
                charge_rate: TWITCHY_CHARGE_RATE,
            },
        }
    }

    pub fn kind(&self) -> EnemyKind {
        match self {
            Behaviour::Chaser => EnemyKind::Chaser,
            Behaviour::Drifter { .. } => EnemyKind::Drifter,
            Behaviour::Twitchy { .. } => EnemyKind::Twitchy,
        }
    }
}

/// A hostile mass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub body: Mass,
    pub target: TargetKind,
    behaviour: Behaviour,
    spawn_at: f32,
    has_spawned: bool,
    died_at: Option<f32>,
}

impl Enemy {
    /// Create an enemy in its warning state; it goes live at `spawn_at`
    pub fn new<R: Rng + ?Sized>(
        id: u32,
        kind: EnemyKind,
        target: TargetKind,
        position: Vec2,
        spawn_at: f32,
        rng: &mut R,
    ) -> SimResult<Self> {
        let mut body = Mass::new(kind.mass_options(position))?;
        body.teleport_to(position);
        Ok(Self {
            id,
            body,
            target,
            behaviour: Behaviour::new(kind, rng),
            spawn_at,
            has_spawned: false,
            died_at: None,
        })
    }

    #[inline]
    pub fn kind(&self) -> EnemyKind {
        self.behaviour.kind()
    }

    #[inline]
    pub fn behaviour(&self) -> &Behaviour {
        &self.behaviour
    }

    #[inline]
    pub fn spawn_at(&self) -> f32 {
        self.spawn_at
    }

    #[inline]
    pub fn has_spawned(&self) -> bool {
        self.has_spawned
    }

    #[inline]
    pub fn died_at(&self) -> Option<f32> {
        self.died_at
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.died_at.is_none()
    }

    /// Live and out of its warning state: the only enemies that collide
    #[inline]
    pub fn is_collidable(&self) -> bool {
        self.has_spawned && self.died_at.is_none()
    }

    /// Mark dead. Returns false if it was already dead.
    pub fn die(&mut self, now: f32) -> bool {
        if self.died_at.is_some() {
            return false;
        }
        self.body.force = Vec2::ZERO;
        self.died_at = Some(now);
        true
    }

    /// Warning ring radius while telegraphing, shrinking onto the spawn point
    pub fn warning_ring_radius(&self, now: f32, warning_duration: f32) -> Option<f32> {
        if self.has_spawned || self.died_at.is_some() {
            return None;
        }
        let progress = if warning_duration > 0.0 {
            ((self.spawn_at - now) / warning_duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Some(self.body.radius() + progress * WARNING_RING_SPREAD)
    }

    pub fn opacity(&self, now: f32, warning_duration: f32) -> f32 {
        if let Some(died_at) = self.died_at {
            return (1.0 - (now - died_at) / DEATH_FADE).clamp(0.0, 1.0);
        }
        match self.warning_ring_radius(now, warning_duration) {
            Some(_) if warning_duration > 0.0 => {
                (1.0 - (self.spawn_at - now) / warning_duration).clamp(0.0, 1.0)
            }
            _ => 1.0,
        }
    }

    /// Dead long enough that nothing is left to draw
    pub fn is_faded(&self, now: f32) -> bool {
        self.died_at.is_some_and(|died_at| now - died_at >= DEATH_FADE)
    }

    /// Advance one step toward `target`.
    ///
    /// Warning-state enemies stay inert until `spawn_at`; dead ones coast.
    pub fn advance(&mut self, ctx: &SimulationContext, target: Vec2) {
        if self.died_at.is_some() {
            self.body.force = Vec2::ZERO;
            self.body.apply_force(ctx);
            return;
        }
        if !self.has_spawned {
            if ctx.now < self.spawn_at {
                return;
            }
            self.has_spawned = true;
            log::debug!("{} #{} is live", self.kind().as_str(), self.id);
        }
        self.step(ctx, target);
    }
}

impl Simulated for Enemy {
    fn body(&self) -> &Mass {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Mass {
        &mut self.body
    }

    fn current_force(&mut self, ctx: &SimulationContext, target: Vec2) -> Vec2 {
        let position = self.body.position();
        match &mut self.behaviour {
            // Coincident with the target: no direction, no thrust
            Behaviour::Chaser => (target - position).normalize_or_zero(),
            Behaviour::Drifter {
                heading_offset,
                angle,
                power,
            } => {
                let heading =
                    *angle.get_or_insert_with(|| angle_of(target - position) + *heading_offset);
                vector_at(heading, *power)
            }
            Behaviour::Twitchy {
                fuel,
                charging,
                discharge_rate,
                charge_rate,
            } => {
                if *charging {
                    *fuel += *charge_rate * ctx.time_delta;
                    if *fuel >= 1.0 {
                        *fuel = 1.0;
                        *charging = false;
                    }
                    Vec2::ZERO
                } else {
                    *fuel -= *discharge_rate * ctx.time_delta;
                    if *fuel <= 0.0 {
                        *fuel = 0.0;
                        *charging = true;
                    }
                    target - position
                }
            }
        }
    }

    fn on_bounce(&mut self) {
        if let Behaviour::Drifter { angle, .. } = &mut self.behaviour {
            let velocity = self.body.velocity;
            if velocity != Vec2::ZERO {
                *angle = Some(angle_of(velocity));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn ctx(now: f32) -> SimulationContext {
        SimulationContext::new(1.0, now, Vec2::new(800.0, 600.0))
    }

    fn live(kind: EnemyKind, position: Vec2, target: Vec2) -> Enemy {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut enemy = Enemy::new(1, kind, TargetKind::Player, position, 0.0, &mut rng).unwrap();
        enemy.advance(&ctx(0.0), target);
        assert!(enemy.has_spawned());
        enemy
    }

    #[test]
    fn test_warning_state_is_inert() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut enemy = Enemy::new(
            1,
            EnemyKind::Chaser,
            TargetKind::Player,
            Vec2::new(100.0, 100.0),
            50.0,
            &mut rng,
        )
        .unwrap();

        enemy.advance(&ctx(10.0), Vec2::new(400.0, 100.0));
        assert!(!enemy.has_spawned());
        assert!(!enemy.is_collidable());
        assert!(enemy.is_alive());
        assert_eq!(enemy.body.position(), Vec2::new(100.0, 100.0));

        enemy.advance(&ctx(50.0), Vec2::new(400.0, 100.0));
        assert!(enemy.has_spawned());
        assert!(enemy.body.position().x > 100.0);
    }

    #[test]
    fn test_warning_ring_shrinks_toward_spawn() {
        let mut rng = Pcg32::seed_from_u64(1);
        let enemy = Enemy::new(
            1,
            EnemyKind::Chaser,
            TargetKind::Tether,
            Vec2::ZERO,
            100.0,
            &mut rng,
        )
        .unwrap();
        let early = enemy.warning_ring_radius(50.0, 50.0).unwrap();
        let mid = enemy.warning_ring_radius(75.0, 50.0).unwrap();
        let late = enemy.warning_ring_radius(100.0, 50.0).unwrap();
        assert!((early - (ENEMY_RADIUS + WARNING_RING_SPREAD)).abs() < 1e-5);
        assert!(mid < early && late < mid);
        assert!((late - ENEMY_RADIUS).abs() < 1e-5);
        assert!(enemy.opacity(75.0, 50.0) > 0.0 && enemy.opacity(75.0, 50.0) < 1.0);
    }

    #[test]
    fn test_chaser_force_is_unit_length() {
        let mut chaser = live(EnemyKind::Chaser, Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0));
        let near = chaser.current_force(&ctx(1.0), Vec2::new(110.0, 100.0));
        let far = chaser.current_force(&ctx(1.0), Vec2::new(700.0, 500.0));
        assert!((near.length() - 1.0).abs() < 1e-5);
        assert!((far.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_chaser_on_top_of_target_has_no_force() {
        let mut chaser = live(EnemyKind::Chaser, Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0));
        let force = chaser.current_force(&ctx(1.0), Vec2::new(100.0, 100.0));
        assert_eq!(force, Vec2::ZERO);
        chaser.step(&ctx(1.0), Vec2::new(100.0, 100.0));
        assert!(chaser.body.position().is_finite());
    }

    #[test]
    fn test_drifter_heading_fixed_after_first_tick() {
        let mut drifter = live(EnemyKind::Drifter, Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0));
        let first = drifter.current_force(&ctx(1.0), Vec2::new(700.0, 300.0));
        let later = drifter.current_force(&ctx(2.0), Vec2::new(100.0, 50.0));
        assert_eq!(first, later);
        assert!((first.length() - DRIFTER_POWER).abs() < 1e-5);

        // Offset from the perfect heading stays within the tuning range
        let miss = angle_of(first).abs();
        assert!(miss >= DRIFTER_MIN_OFFSET - 1e-5 && miss <= DRIFTER_MAX_OFFSET + 1e-5);
    }

    #[test]
    fn test_drifter_reheads_after_bounce() {
        let mut drifter = live(EnemyKind::Drifter, Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0));
        drifter.current_force(&ctx(1.0), Vec2::new(700.0, 300.0));
        drifter.body.velocity = Vec2::new(-3.0, 0.0);
        drifter.on_bounce();
        let force = drifter.current_force(&ctx(2.0), Vec2::new(700.0, 300.0));
        assert!(force.x < 0.0);
        assert!(force.y.abs() < 1e-5);
    }

    #[test]
    fn test_twitchy_charge_discharge_cycle() {
        let mut twitchy = live(EnemyKind::Twitchy, Vec2::new(100.0, 100.0), Vec2::new(300.0, 100.0));
        let target = Vec2::new(300.0, 100.0);

        // Charging: idle until the tank is full
        let mut ticks = 0;
        while matches!(twitchy.behaviour(), Behaviour::Twitchy { charging: true, .. }) {
            assert_eq!(twitchy.current_force(&ctx(1.0), target), Vec2::ZERO);
            ticks += 1;
            assert!(ticks < 100);
        }

        // Discharging: unnormalised pull, until empty
        let force = twitchy.current_force(&ctx(1.0), target);
        assert_eq!(force, target - twitchy.body.position());
        let mut dashes = 1;
        while matches!(twitchy.behaviour(), Behaviour::Twitchy { charging: false, .. }) {
            twitchy.current_force(&ctx(1.0), target);
            dashes += 1;
            assert!(dashes < 100);
        }
        assert!(matches!(
            twitchy.behaviour(),
            Behaviour::Twitchy { fuel, charging: true, .. } if *fuel == 0.0
        ));
    }

    #[test]
    fn test_death_is_one_shot() {
        let mut chaser = live(EnemyKind::Chaser, Vec2::new(100.0, 100.0), Vec2::new(100.0, 100.0));
        chaser.body.force = Vec2::new(1.0, 1.0);
        assert!(chaser.die(5.0));
        assert_eq!(chaser.body.force, Vec2::ZERO);
        assert!(!chaser.die(6.0));
        assert_eq!(chaser.died_at(), Some(5.0));
        assert!(!chaser.is_collidable());
        assert!(!chaser.is_faded(5.0 + DEATH_FADE / 2.0));
        assert!(chaser.is_faded(5.0 + DEATH_FADE));
    }

    #[test]
    fn test_same_seed_same_behaviour() {
        let mut a = Pcg32::seed_from_u64(42);
        let mut b = Pcg32::seed_from_u64(42);
        let first = Enemy::new(1, EnemyKind::Drifter, TargetKind::Player, Vec2::ZERO, 0.0, &mut a)
            .unwrap();
        let second = Enemy::new(1, EnemyKind::Drifter, TargetKind::Player, Vec2::ZERO, 0.0, &mut b)
            .unwrap();
        assert_eq!(first.behaviour(), second.behaviour());
    }
}
