//! Game state and host-facing controls
//!
//! [`Game`] is the root aggregate: tether, player, cable, the current wave,
//! cosmetic particles, score and the session flags. The per-frame update
//! lives in `tick.rs`.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::cable::Cable;
use super::enemy::{EnemyKind, TargetKind};
use super::tether::{InputKind, Player, PointerSample, Tether};
use super::wave::Wave;
use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::platform::InputSource;
use crate::settings::Settings;

/// Coarse session phase, derived from the started/ended flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen: tether locked, waiting to be picked up
    Waiting,
    Playing,
    /// Slow-motion lull after the player was hit
    Ended,
}

/// What killed an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum KillCause {
    Cable,
    /// Rammed the tether or the player (and ended the game)
    Contact,
}

/// Things the host may want to react to (sound, records, UI)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    GameStarted,
    WaveStarted {
        index: u32,
    },
    EnemySpawned {
        id: u32,
        kind: EnemyKind,
    },
    EnemyKilled {
        id: u32,
        kind: EnemyKind,
        cause: KillCause,
    },
    ScoreChanged {
        score: u64,
    },
    WaveCompleted {
        index: u32,
    },
    GameEnded {
        score: u64,
        /// Simulation time survived since the start of the run
        survived: f32,
        wave: u32,
        hit: TargetKind,
    },
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub rgb: [u8; 3],
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Complete game session
#[derive(Debug, Clone)]
pub struct Game {
    pub(crate) settings: Settings,
    /// Gameplay randomness (spawns, enemy behaviour)
    pub(crate) rng: Pcg32,
    /// Cosmetic randomness, kept apart so effects never change gameplay
    pub(crate) fx_rng: Pcg32,
    pub(crate) bounds: Vec2,
    /// Simulation time since reset
    pub(crate) time_elapsed: f32,
    /// Simulation time when play started
    pub(crate) started_at: f32,
    pub(crate) speed: f32,
    pub(crate) score: u64,
    pub(crate) started: bool,
    pub(crate) ended: bool,
    pub(crate) last_tick_real: Option<f64>,
    pub(crate) ended_at_real: Option<f64>,
    pub(crate) last_time_delta: f32,
    pub tether: Tether,
    pub player: Player,
    pub cable: Cable,
    pub(crate) wave: Option<Wave>,
    pub particles: Vec<Particle>,
    pub(crate) screen_shake: f32,
    /// Last known pointer; last write wins
    pub(crate) pointer: Option<PointerSample>,
    pub(crate) events: Vec<GameEvent>,
    /// Next enemy id; handed out by `Wave::step`
    pub(crate) next_id: u32,
}

impl Game {
    /// Create a new game with the given seed and play area
    pub fn new(seed: u64, bounds: Vec2, settings: Settings) -> SimResult<Self> {
        validate_bounds(bounds)?;
        let (tether, player) = initial_bodies(bounds, &settings)?;
        let speed = settings.normal_speed;
        Ok(Self {
            settings,
            rng: Pcg32::seed_from_u64(seed),
            fx_rng: Pcg32::seed_from_u64(seed ^ 0x9e37_79b9_7f4a_7c15),
            bounds,
            time_elapsed: 0.0,
            started_at: 0.0,
            speed,
            score: 0,
            started: false,
            ended: false,
            last_tick_real: None,
            ended_at_real: None,
            last_time_delta: 0.0,
            tether,
            player,
            cable: Cable::new(),
            wave: None,
            particles: Vec::new(),
            screen_shake: 0.0,
            pointer: None,
            events: Vec::new(),
            next_id: 1,
        })
    }

    /// Throw the session away and start over on the title screen.
    ///
    /// The RNG carries on, so consecutive games differ.
    pub fn reset(&mut self) {
        let (tether, player) = match initial_bodies(self.bounds, &self.settings) {
            Ok(bodies) => bodies,
            Err(err) => {
                // Settings were valid when this game was built
                log::error!("Reset failed: {err}");
                return;
            }
        };
        self.tether = tether;
        self.player = player;
        self.cable = Cable::new();
        self.wave = None;
        self.particles.clear();
        self.time_elapsed = 0.0;
        self.started_at = 0.0;
        self.speed = self.settings.normal_speed;
        self.score = 0;
        self.started = false;
        self.ended = false;
        self.last_tick_real = None;
        self.ended_at_real = None;
        self.last_time_delta = 0.0;
        self.screen_shake = 0.0;
        log::info!("Game reset");
    }

    /// Change the play area; takes effect on the next tick
    pub fn resize(&mut self, width: f32, height: f32) -> SimResult<()> {
        let bounds = Vec2::new(width, height);
        validate_bounds(bounds)?;
        self.bounds = bounds;
        Ok(())
    }

    /// Record a pointer move (mouse or touch)
    pub fn on_pointer_move(&mut self, position: Vec2, kind: InputKind) {
        self.pointer = Some(PointerSample { position, kind });
    }

    /// Copy the latest reading from an external input source.
    ///
    /// A touch that disappears counts as a release.
    pub fn sync_input(&mut self, input: &dyn InputSource) {
        match input.sample() {
            Some(sample) => self.pointer = Some(sample),
            None if input.last_input_kind() == InputKind::Touch => {
                if self.pointer.take().is_some() {
                    self.on_pointer_up(InputKind::Touch);
                }
            }
            None => {}
        }
    }

    /// Press: restarts after game over, once the lull has passed
    pub fn on_pointer_down(&mut self) {
        if !self.ended {
            return;
        }
        let lull_over = match (self.ended_at_real, self.last_tick_real) {
            (Some(ended), Some(now)) => now - ended >= RESET_LULL_MS,
            _ => true,
        };
        if lull_over {
            self.reset();
        }
    }

    /// Release: lifting a finger drops the tether
    pub fn on_pointer_up(&mut self, kind: InputKind) {
        if kind == InputKind::Touch {
            self.pointer = None;
            self.tether.lock();
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn time_elapsed(&self) -> f32 {
        self.time_elapsed
    }

    /// Time delta used by the most recent tick
    pub fn last_time_delta(&self) -> f32 {
        self.last_time_delta
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    pub fn phase(&self) -> GamePhase {
        if self.ended {
            GamePhase::Ended
        } else if self.started {
            GamePhase::Playing
        } else {
            GamePhase::Waiting
        }
    }

    pub fn wave(&self) -> Option<&Wave> {
        self.wave.as_ref()
    }

    pub fn wave_mut(&mut self) -> Option<&mut Wave> {
        self.wave.as_mut()
    }

    /// Install a specific wave (scripted scenarios, tests)
    pub fn set_wave(&mut self, wave: Wave) {
        self.wave = Some(wave);
    }

    pub fn screen_shake(&self) -> f32 {
        self.screen_shake
    }

    /// Take all events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Simulation time survived in the current run
    pub fn survived(&self) -> f32 {
        if self.started {
            self.time_elapsed - self.started_at
        } else {
            0.0
        }
    }
}

fn validate_bounds(bounds: Vec2) -> SimResult<()> {
    if bounds.x > 0.0 && bounds.y > 0.0 && bounds.is_finite() {
        Ok(())
    } else {
        Err(SimError::InvalidBounds {
            width: bounds.x,
            height: bounds.y,
        })
    }
}

/// Tether in the upper middle of the arena with the player hanging below it
fn initial_bodies(bounds: Vec2, settings: &Settings) -> SimResult<(Tether, Player)> {
    let anchor = Vec2::new(bounds.x / 2.0, bounds.y / 3.0);
    let tether = Tether::new(anchor)?;
    let player = Player::new(anchor + Vec2::new(0.0, bounds.y / 6.0), settings)?;
    Ok((tether, player))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::PointerState;

    fn game() -> Game {
        Game::new(1, Vec2::new(DEFAULT_WIDTH, DEFAULT_HEIGHT), Settings::default()).unwrap()
    }

    #[test]
    fn test_new_game_waits_on_title() {
        let game = game();
        assert_eq!(game.phase(), GamePhase::Waiting);
        assert!(game.tether.is_locked());
        assert_eq!(game.score(), 0);
        assert_eq!(game.speed(), NORMAL_SPEED);
        assert!(game.wave().is_none());
    }

    #[test]
    fn test_invalid_bounds_rejected() {
        assert!(matches!(
            Game::new(1, Vec2::new(0.0, 100.0), Settings::default()),
            Err(SimError::InvalidBounds { .. })
        ));
        let mut game = game();
        assert!(game.resize(-1.0, 10.0).is_err());
        assert!(game.resize(1024.0, 768.0).is_ok());
        assert_eq!(game.bounds(), Vec2::new(1024.0, 768.0));
    }

    #[test]
    fn test_touch_release_drops_tether_but_mouse_release_does_not() {
        let mut game = game();
        game.tether.step(
            &crate::sim::SimulationContext::new(0.0, 0.0, game.bounds()),
            Some(PointerSample {
                position: game.tether.body.position(),
                kind: InputKind::Touch,
            }),
            &Settings::default(),
        );
        assert!(!game.tether.is_locked());
        game.on_pointer_up(InputKind::Mouse);
        assert!(!game.tether.is_locked());
        game.on_pointer_up(InputKind::Touch);
        assert!(game.tether.is_locked());
        assert!(game.tether.is_unlockable());
    }

    #[test]
    fn test_cleared_touch_source_drops_tether() {
        let mut game = game();
        let mut touch = PointerState::new();
        touch.record(game.tether.body.position(), InputKind::Touch);
        game.sync_input(&touch);
        game.tether.step(
            &crate::sim::SimulationContext::new(0.0, 0.0, game.bounds()),
            game.pointer,
            &Settings::default(),
        );
        assert!(!game.tether.is_locked());

        touch.clear();
        game.sync_input(&touch);
        assert!(game.tether.is_locked());
        assert!(game.tether.is_unlockable());
        assert_eq!(game.pointer, None);
    }

    #[test]
    fn test_cleared_mouse_source_keeps_tether() {
        let mut game = game();
        let mut mouse = PointerState::new();
        mouse.record(game.tether.body.position(), InputKind::Mouse);
        game.sync_input(&mouse);
        game.tether.step(
            &crate::sim::SimulationContext::new(0.0, 0.0, game.bounds()),
            game.pointer,
            &Settings::default(),
        );
        mouse.clear();
        game.sync_input(&mouse);
        assert!(!game.tether.is_locked());
    }

    #[test]
    fn test_pointer_down_ignored_while_playing() {
        let mut game = game();
        game.started = true;
        game.score = 3;
        game.on_pointer_down();
        assert_eq!(game.score(), 3);
    }
}
