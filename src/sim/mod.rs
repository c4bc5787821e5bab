//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, settings and sequence
//! of (timestamp, pointer) inputs, a game plays out identically:
//! - Seeded RNG only
//! - Stable iteration order (enemies in spawn order)
//! - No rendering or platform dependencies

pub mod cable;
pub mod collision;
pub mod enemy;
pub mod geometry;
pub mod mass;
pub mod state;
pub mod tether;
pub mod tick;
pub mod wave;

pub use cable::{Cable, CableSweep};
pub use collision::{Contact, cable_catches, enemy_contact, swept_circle_contact};
pub use enemy::{Behaviour, Enemy, EnemyKind, TargetKind};
pub use geometry::{Intersection, Segment, intersect, point_in_polygon};
pub use mass::{Mass, MassOptions, SimulationContext, Simulated};
pub use state::{Game, GameEvent, GamePhase, KillCause, Particle};
pub use tether::{InputKind, Player, PointerSample, Tether};
pub use tick::{frame_time_delta, tick};
pub use wave::{SpawnDirective, Targets, Wave, WavePhase, WaveStep, WaveTemplate, spawn_position};
