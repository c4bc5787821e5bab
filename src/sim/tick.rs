//! Variable timestep simulation tick
//!
//! Converts wall-clock frame time into simulation time and advances the game
//! in a fixed order: background, tether, player, wave, collisions, particles.

use glam::Vec2;
use rand::Rng;

use super::collision;
use super::enemy::{Enemy, EnemyKind, TargetKind};
use super::mass::{SimulationContext, Simulated};
use super::state::{Game, GameEvent, KillCause, Particle};
use super::wave::{Targets, Wave};
use crate::consts::*;
use crate::platform::{Clock, InputSource};
use crate::vector_at;

/// Simulation time for one frame.
///
/// Real frame time is clamped to `MAX_FRAME_MS` (and never negative) so a
/// stalled tab can't launch everything across the arena.
pub fn frame_time_delta(real_delta_ms: f64, speed: f32, time_scale: f32) -> f32 {
    real_delta_ms.clamp(0.0, MAX_FRAME_MS) as f32 * time_scale * speed
}

/// Advance the game to wall-clock time `real_now` (milliseconds).
///
/// The first call after a reset only records the baseline.
pub fn tick(game: &mut Game, real_now: f64) {
    let Some(last) = game.last_tick_real.replace(real_now) else {
        log::debug!("Baseline frame at {real_now:.1}ms");
        return;
    };

    let time_delta = frame_time_delta(real_now - last, game.speed, game.settings.time_scale);
    game.last_time_delta = time_delta;
    game.time_elapsed += time_delta;
    let ctx = SimulationContext::new(time_delta, game.time_elapsed, game.bounds);

    step_background(game, &ctx);

    let pointer = game.pointer;
    if game.tether.step(&ctx, pointer, &game.settings) && !game.started {
        start(game);
    }

    game.player.step(&ctx, game.tether.body.position());

    if game.started {
        step_wave(game, &ctx);
        if !game.ended {
            step_collisions(game, &ctx);
        }
    }

    step_particles(game, &ctx);
}

impl Game {
    /// Advance to wall-clock time `real_now` (milliseconds)
    pub fn tick(&mut self, real_now: f64) {
        tick(self, real_now);
    }

    /// Pull the latest input and advance to the clock's current time
    pub fn advance(&mut self, clock: &dyn Clock, input: &dyn InputSource) {
        self.sync_input(input);
        tick(self, clock.now());
    }
}

fn step_background(game: &mut Game, ctx: &SimulationContext) {
    game.screen_shake *= SHAKE_DECAY.powf(ctx.time_delta);
    if game.screen_shake < 0.01 {
        game.screen_shake = 0.0;
    }
}

fn start(game: &mut Game) {
    game.started = true;
    game.started_at = game.time_elapsed;
    game.player.on_game_start();
    game.events.push(GameEvent::GameStarted);
    log::info!("Game started");
}

fn step_wave(game: &mut Game, ctx: &SimulationContext) {
    let needs_wave = game.wave.as_ref().is_none_or(Wave::is_complete);
    // No fresh waves during the game-over lull; the last one keeps drifting
    if needs_wave && !game.ended {
        let (index, corpses) = match game.wave.take() {
            Some(done) => {
                game.events.push(GameEvent::WaveCompleted { index: done.index });
                (done.index + 1, done.into_fading(ctx.now))
            }
            None => (0, Vec::new()),
        };
        let mut wave = Wave::generate(index, ctx.now, ctx.bounds, &mut game.rng);
        // Enemies killed at the end of the last wave finish fading out
        wave.adopt(corpses);
        game.wave = Some(wave);
        game.events.push(GameEvent::WaveStarted { index });
    }

    let targets = Targets {
        tether: game.tether.body.position(),
        player: game.player.body.position(),
    };
    let warning = game.settings.warning_duration;
    if let Some(wave) = game.wave.as_mut() {
        let step = wave.step(ctx, targets, warning, &mut game.next_id, &mut game.rng);
        game.events.extend(
            step.spawned
                .into_iter()
                .map(|(id, kind)| GameEvent::EnemySpawned { id, kind }),
        );
    }
}

/// An enemy that died this tick
struct Kill {
    id: u32,
    kind: EnemyKind,
    at: Vec2,
    rgb: [u8; 3],
    cause: KillCause,
}

impl Kill {
    fn of(enemy: &Enemy, cause: KillCause) -> Self {
        Self {
            id: enemy.id,
            kind: enemy.kind(),
            at: enemy.body.position(),
            rgb: enemy.body.rgb,
            cause,
        }
    }
}

/// Cable first, then body contact; the first contact ends the game
fn step_collisions(game: &mut Game, ctx: &SimulationContext) {
    let Some(wave) = game.wave.as_mut() else {
        return;
    };

    let mut kills = Vec::new();
    let sweep = game.cable.sweep(&game.tether.body, &game.player.body);
    for index in collision::cable_catches(&sweep, wave.enemies()) {
        let enemy = &mut wave.enemies_mut()[index];
        if enemy.die(ctx.now) {
            kills.push(Kill::of(enemy, KillCause::Cable));
        }
    }

    let mut hit = None;
    for enemy in wave.enemies_mut() {
        if let Some(target) = collision::enemy_contact(
            enemy,
            &mut game.tether.body,
            &mut game.player.body,
            ctx.now,
        ) {
            kills.push(Kill::of(enemy, KillCause::Contact));
            hit = Some(target);
            break;
        }
    }

    for kill in kills {
        award_kill(game, kill);
    }
    if let Some(target) = hit {
        end_game(game, target);
    }
}

fn award_kill(game: &mut Game, kill: Kill) {
    game.score += 1;
    log::debug!(
        "{} #{} killed ({:?}), score {}",
        kill.kind.as_str(),
        kill.id,
        kill.cause,
        game.score
    );
    game.events.push(GameEvent::EnemyKilled {
        id: kill.id,
        kind: kill.kind,
        cause: kill.cause,
    });
    game.events.push(GameEvent::ScoreChanged { score: game.score });
    spawn_explosion(game, kill.at, kill.rgb);
    add_shake(game, SHAKE_ON_KILL);
}

fn end_game(game: &mut Game, hit: TargetKind) {
    game.ended = true;
    game.speed = game.settings.slow_motion_speed;
    game.tether.lock_for_good();
    game.ended_at_real = game.last_tick_real;
    add_shake(game, SHAKE_ON_DEATH);

    let wave = game.wave.as_ref().map_or(0, |w| w.index);
    let survived = game.survived();
    log::info!(
        "Game over: {:?} hit on wave {}, score {}, survived {:.0}",
        hit,
        wave + 1,
        game.score,
        survived
    );
    game.events.push(GameEvent::GameEnded {
        score: game.score,
        survived,
        wave,
        hit,
    });
}

fn add_shake(game: &mut Game, amount: f32) {
    if game.settings.effective_screen_shake() {
        game.screen_shake = (game.screen_shake + amount).min(1.0);
    }
}

fn spawn_explosion(game: &mut Game, at: Vec2, rgb: [u8; 3]) {
    let cap = game.settings.max_particles();
    for _ in 0..game.settings.explosion_particles() {
        if game.particles.len() >= cap {
            break;
        }
        let angle = game.fx_rng.random_range(0.0..std::f32::consts::TAU);
        let speed = PARTICLE_SPEED * game.fx_rng.random_range(0.3..1.0);
        game.particles.push(Particle {
            pos: at,
            vel: vector_at(angle, speed),
            rgb,
            life: game.fx_rng.random_range(0.6..1.0),
            size: game.fx_rng.random_range(1.5..3.5),
        });
    }
}

fn step_particles(game: &mut Game, ctx: &SimulationContext) {
    let fade = ctx.time_delta / PARTICLE_LIFE;
    let drag = PARTICLE_DAMPING.powf(ctx.time_delta);
    for particle in game.particles.iter_mut() {
        particle.pos += particle.vel * ctx.time_delta;
        particle.vel *= drag;
        particle.life -= fade;
    }
    game.particles.retain(|p| p.life > 0.0);
}
