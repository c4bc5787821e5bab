//! The tether (pointer-driven anchor) and the player it drags around

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::mass::{Mass, MassOptions, SimulationContext, Simulated};
use crate::consts::*;
use crate::error::SimResult;
use crate::settings::Settings;

/// What kind of pointer produced the last input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputKind {
    #[default]
    Mouse,
    Touch,
}

/// One pointer reading, taken at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub position: Vec2,
    pub kind: InputKind,
}

/// The anchor end of the cable.
///
/// Starts locked in place. Bringing the pointer close enough unlocks it,
/// after which it follows the pointer exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tether {
    pub body: Mass,
    locked: bool,
    /// Cleared at game over so the tether cannot be picked up again until reset
    unlockable: bool,
    last_pointer: Option<Vec2>,
    last_input_kind: InputKind,
}

impl Tether {
    pub fn new(position: Vec2) -> SimResult<Self> {
        let body = Mass::new(MassOptions {
            position,
            radius: TETHER_RADIUS,
            rgb: [20, 20, 20],
            ..Default::default()
        })?;
        Ok(Self {
            body,
            locked: true,
            unlockable: true,
            last_pointer: None,
            last_input_kind: InputKind::Mouse,
        })
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    #[inline]
    pub fn is_unlockable(&self) -> bool {
        self.unlockable
    }

    pub fn last_pointer(&self) -> Option<Vec2> {
        self.last_pointer
    }

    pub fn last_input_kind(&self) -> InputKind {
        self.last_input_kind
    }

    /// Release the pointer (touch lifted). Can be picked up again.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Lock permanently until the game is reset
    pub fn lock_for_good(&mut self) {
        self.locked = true;
        self.unlockable = false;
    }

    /// Advance one tick. Returns true on the tick the tether gets unlocked.
    pub fn step(
        &mut self,
        _ctx: &SimulationContext,
        pointer: Option<PointerSample>,
        settings: &Settings,
    ) -> bool {
        if let Some(sample) = pointer {
            self.last_pointer = Some(sample.position);
            self.last_input_kind = sample.kind;
        }

        let mut unlocked_now = false;
        if self.locked {
            if let Some(sample) = pointer.filter(|_| self.unlockable) {
                let reach = settings.activation_radius(sample.kind);
                if sample.position.distance(self.body.position()) < reach {
                    self.locked = false;
                    unlocked_now = true;
                }
            }
        }

        match (self.locked, self.last_pointer) {
            (false, Some(target)) => self.body.set_position(target),
            // Stay put, but don't leave last tick's motion as a sweep trail
            _ => self.body.set_position(self.body.position()),
        }

        unlocked_now
    }
}

/// The heavy mass on the end of the cable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub body: Mass,
    damping_before_start: f32,
    damping_after_start: f32,
}

impl Player {
    pub fn new(position: Vec2, settings: &Settings) -> SimResult<Self> {
        let opts = MassOptions {
            position,
            mass: PLAYER_MASS,
            damping: settings.player_damping_before_start,
            radius: PLAYER_RADIUS,
            bounciness: PLAYER_BOUNCINESS,
            has_walls: true,
            rgb: [200, 40, 40],
            ..Default::default()
        };
        Self::with_options(
            opts,
            settings.player_damping_before_start,
            settings.player_damping_after_start,
        )
    }

    pub fn with_options(
        opts: MassOptions,
        damping_before_start: f32,
        damping_after_start: f32,
    ) -> SimResult<Self> {
        let mut body = Mass::new(opts)?;
        body.set_damping(damping_before_start)?;
        // Validate the post-start value up front so the switch can't fail later
        Mass::default().set_damping(damping_after_start)?;
        Ok(Self {
            body,
            damping_before_start,
            damping_after_start,
        })
    }

    /// Tighten damping for real play
    pub fn on_game_start(&mut self) {
        // Both values were validated at construction
        let _ = self.body.set_damping(self.damping_after_start);
    }

    pub fn damping_before_start(&self) -> f32 {
        self.damping_before_start
    }

    pub fn damping_after_start(&self) -> f32 {
        self.damping_after_start
    }
}

impl Simulated for Player {
    fn body(&self) -> &Mass {
        &self.body
    }

    fn body_mut(&mut self) -> &mut Mass {
        &mut self.body
    }

    /// Elastic pull straight toward the tether, proportional to distance
    fn current_force(&mut self, _ctx: &SimulationContext, target: Vec2) -> Vec2 {
        target - self.body.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SimulationContext {
        SimulationContext::new(1.0, 1.0, Vec2::new(800.0, 600.0))
    }

    fn mouse(x: f32, y: f32) -> Option<PointerSample> {
        Some(PointerSample {
            position: Vec2::new(x, y),
            kind: InputKind::Mouse,
        })
    }

    #[test]
    fn test_tether_ignores_far_pointer_while_locked() {
        let settings = Settings::default();
        let mut tether = Tether::new(Vec2::new(400.0, 300.0)).unwrap();

        let unlocked = tether.step(&ctx(), mouse(100.0, 100.0), &settings);
        assert!(!unlocked);
        assert!(tether.is_locked());
        assert_eq!(tether.body.position(), Vec2::new(400.0, 300.0));
        assert_eq!(tether.last_pointer(), Some(Vec2::new(100.0, 100.0)));
    }

    #[test]
    fn test_tether_unlocks_near_pointer_and_follows() {
        let settings = Settings::default();
        let mut tether = Tether::new(Vec2::new(400.0, 300.0)).unwrap();

        assert!(tether.step(&ctx(), mouse(405.0, 300.0), &settings));
        assert!(!tether.is_locked());
        assert_eq!(tether.body.position(), Vec2::new(405.0, 300.0));

        // Already unlocked: no second transition
        assert!(!tether.step(&ctx(), mouse(500.0, 200.0), &settings));
        assert_eq!(tether.body.position(), Vec2::new(500.0, 200.0));
        assert_eq!(tether.body.previous_position(), Vec2::new(405.0, 300.0));
    }

    #[test]
    fn test_touch_is_more_lenient_than_mouse() {
        let settings = Settings::default();
        let gap = (settings.mouse_activation_radius + settings.touch_activation_radius) / 2.0;

        let mut by_mouse = Tether::new(Vec2::new(400.0, 300.0)).unwrap();
        assert!(!by_mouse.step(&ctx(), mouse(400.0 + gap, 300.0), &settings));

        let mut by_touch = Tether::new(Vec2::new(400.0, 300.0)).unwrap();
        let touch = Some(PointerSample {
            position: Vec2::new(400.0 + gap, 300.0),
            kind: InputKind::Touch,
        });
        assert!(by_touch.step(&ctx(), touch, &settings));
        assert_eq!(by_touch.last_input_kind(), InputKind::Touch);
    }

    #[test]
    fn test_locked_for_good_cannot_unlock() {
        let settings = Settings::default();
        let mut tether = Tether::new(Vec2::new(400.0, 300.0)).unwrap();
        tether.lock_for_good();
        assert!(!tether.step(&ctx(), mouse(400.0, 300.0), &settings));
        assert!(tether.is_locked());
        assert!(!tether.is_unlockable());
    }

    #[test]
    fn test_released_tether_can_be_picked_up_again() {
        let settings = Settings::default();
        let mut tether = Tether::new(Vec2::new(400.0, 300.0)).unwrap();
        tether.step(&ctx(), mouse(400.0, 300.0), &settings);
        tether.lock();
        tether.step(&ctx(), mouse(600.0, 300.0), &settings);
        assert_eq!(tether.body.position(), Vec2::new(400.0, 300.0));
        assert!(tether.step(&ctx(), mouse(401.0, 300.0), &settings));
    }

    #[test]
    fn test_locked_tether_leaves_no_trail() {
        let settings = Settings::default();
        let mut tether = Tether::new(Vec2::new(400.0, 300.0)).unwrap();
        tether.step(&ctx(), mouse(400.0, 300.0), &settings);
        tether.step(&ctx(), mouse(450.0, 300.0), &settings);
        tether.lock();
        tether.step(&ctx(), None, &settings);
        assert_eq!(tether.body.journey().length(), 0.0);
    }

    #[test]
    fn test_player_is_pulled_toward_tether() {
        let mut player = Player::with_options(
            MassOptions {
                position: Vec2::new(300.0, 100.0),
                mass: 50.0,
                ..Default::default()
            },
            0.99,
            0.99,
        )
        .unwrap();

        player.step(&ctx(), Vec2::new(100.0, 100.0));

        assert_eq!(player.body.force, Vec2::new(-200.0, 0.0));
        assert!((player.body.velocity.x - (-3.96)).abs() < 1e-4);
        assert!((player.body.position().x - 296.04).abs() < 1e-3);
    }

    #[test]
    fn test_player_damping_tightens_on_start() {
        let settings = Settings::default();
        let mut player = Player::new(Vec2::new(400.0, 400.0), &settings).unwrap();
        assert_eq!(player.body.damping(), settings.player_damping_before_start);
        player.on_game_start();
        assert_eq!(player.body.damping(), settings.player_damping_after_start);
    }

    #[test]
    fn test_player_rejects_bad_post_start_damping() {
        let result = Player::with_options(MassOptions::default(), 0.9, 2.0);
        assert!(result.is_err());
    }
}
