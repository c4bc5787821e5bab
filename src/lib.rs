//! Tether - a cable-swinging arcade survival game
//!
//! The player is a heavy mass on an elastic cable anchored to the pointer.
//! Enemies spawn in waves and hunt the player or the anchor; sweeping the
//! cable through them kills them.
//!
//! Core modules:
//! - `sim`: Deterministic simulation (integration, collisions, waves, game loop)
//! - `renderer`: Render handoff (draw capability + per-frame snapshot)
//! - `platform`: Clock and pointer input abstraction
//! - `persistence`: Key-value store seam for records and settings
//! - `settings`: Data-driven tuning

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use highscores::{Achievement, Records};
pub use settings::{QualityPreset, Settings};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Slowest frame the simulation will honour (20 FPS); longer frames are clamped
    pub const MAX_FRAME_MS: f64 = 1000.0 / 20.0;
    /// Simulation time units per wall-clock millisecond at normal speed
    pub const TIME_SCALE: f32 = 0.04;
    /// Speed multipliers
    pub const NORMAL_SPEED: f32 = 1.0;
    pub const SLOW_MOTION_SPEED: f32 = 0.01;
    /// Real time after death before a pointer press restarts the game
    pub const RESET_LULL_MS: f64 = 800.0;

    /// Default play area
    pub const DEFAULT_WIDTH: f32 = 800.0;
    pub const DEFAULT_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_MASS: f32 = 50.0;
    pub const PLAYER_RADIUS: f32 = 10.0;
    pub const PLAYER_BOUNCINESS: f32 = 0.4;
    /// Damping is loose on the title screen and tightens once play starts
    pub const PLAYER_DAMPING_BEFORE_START: f32 = 0.999;
    pub const PLAYER_DAMPING_AFTER_START: f32 = 0.99;

    /// Tether defaults
    pub const TETHER_RADIUS: f32 = 6.0;
    pub const MOUSE_ACTIVATION_RADIUS: f32 = 30.0;
    pub const TOUCH_ACTIVATION_RADIUS: f32 = 70.0;

    /// Shared enemy defaults
    pub const ENEMY_RADIUS: f32 = 10.0;
    pub const ENEMY_BOUNCINESS: f32 = 0.6;
    /// Telegraph time between a directive firing and the enemy going live
    pub const WARNING_DURATION: f32 = 50.0;
    /// How far out the warning ring starts
    pub const WARNING_RING_SPREAD: f32 = 40.0;
    /// Dead enemies fade out over this long
    pub const DEATH_FADE: f32 = 25.0;

    /// Chaser ("idiot") tuning
    pub const CHASER_MASS: f32 = 1.2;
    pub const CHASER_DAMPING: f32 = 0.9;

    /// Drifter tuning
    pub const DRIFTER_MASS: f32 = 1.0;
    pub const DRIFTER_DAMPING: f32 = 0.9;
    pub const DRIFTER_POWER: f32 = 1.0;
    pub const DRIFTER_MIN_OFFSET: f32 = 0.15;
    pub const DRIFTER_MAX_OFFSET: f32 = 0.45;

    /// Twitchy tuning
    pub const TWITCHY_MASS: f32 = 60.0;
    pub const TWITCHY_DAMPING: f32 = 0.85;
    pub const TWITCHY_DISCHARGE_RATE: f32 = 0.12;
    pub const TWITCHY_CHARGE_RATE: f32 = 0.025;

    /// Spawn placement
    pub const SPAWN_MARGIN: f32 = 30.0;
    pub const SPAWN_CLEARANCE: f32 = 150.0;
    pub const SPAWN_ATTEMPTS: u32 = 16;

    /// Particles
    pub const MAX_PARTICLES: usize = 256;
    pub const PARTICLE_LIFE: f32 = 20.0;
    pub const PARTICLE_SPEED: f32 = 4.0;
    pub const PARTICLE_DAMPING: f32 = 0.9;

    /// Screen shake
    pub const SHAKE_ON_KILL: f32 = 0.3;
    pub const SHAKE_ON_DEATH: f32 = 1.0;
    /// Fraction of shake left after one unit of simulation time
    pub const SHAKE_DECAY: f32 = 0.85;
}

/// Vector of the given magnitude pointing along `angle`
#[inline]
pub fn vector_at(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Heading of a vector in radians (zero vector maps to 0)
#[inline]
pub fn angle_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}
