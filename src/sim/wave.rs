//! Wave scheduling
//!
//! A wave is an ordered list of spawn directives. Each directive waits
//! `delay` after the one before it. When the field is empty the schedule is
//! pulled forward once per wave ("boredom compensation") so a fast player
//! isn't left waiting.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{Enemy, EnemyKind, TargetKind};
use super::mass::SimulationContext;
use crate::consts::*;

/// Positions of the two bodies enemies can hunt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub tether: Vec2,
    pub player: Vec2,
}

impl Targets {
    #[inline]
    pub fn position(&self, target: TargetKind) -> Vec2 {
        match target {
            TargetKind::Tether => self.tether,
            TargetKind::Player => self.player,
        }
    }
}

/// One scheduled spawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnDirective {
    /// Wait after the previous directive (simulation units)
    pub delay: f32,
    pub kind: EnemyKind,
    pub target: TargetKind,
    /// Spawn here instead of at a random spot
    pub position: Option<Vec2>,
}

impl SpawnDirective {
    pub fn new(delay: f32, kind: EnemyKind, target: TargetKind) -> Self {
        Self {
            delay,
            kind,
            target,
            position: None,
        }
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// Directives still pending
    Spawning,
    /// Everything issued, something still alive
    Active,
    /// Everything issued and everything dead
    Complete,
}

/// Wave shapes the scheduler can pick from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveTemplate {
    LoneChasers,
    DrifterSwarm,
    TwitchyPack,
    MixedRush,
    Pincer,
}

impl WaveTemplate {
    pub const ALL: [WaveTemplate; 5] = [
        WaveTemplate::LoneChasers,
        WaveTemplate::DrifterSwarm,
        WaveTemplate::TwitchyPack,
        WaveTemplate::MixedRush,
        WaveTemplate::Pincer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WaveTemplate::LoneChasers => "lone chasers",
            WaveTemplate::DrifterSwarm => "drifter swarm",
            WaveTemplate::TwitchyPack => "twitchy pack",
            WaveTemplate::MixedRush => "mixed rush",
            WaveTemplate::Pincer => "pincer",
        }
    }

    /// First wave is always gentle; after that any template can come up
    pub fn pick<R: Rng + ?Sized>(index: u32, rng: &mut R) -> Self {
        if index == 0 {
            WaveTemplate::LoneChasers
        } else {
            Self::ALL[rng.random_range(0..Self::ALL.len())]
        }
    }

    /// Build the directive list for wave `index`
    pub fn directives(&self, index: u32, bounds: Vec2) -> Vec<SpawnDirective> {
        use EnemyKind::*;
        use TargetKind::*;

        let n = (2 + index).min(12) as usize;
        match self {
            WaveTemplate::LoneChasers => (0..n)
                .map(|i| {
                    let target = if i % 3 == 2 { Tether } else { Player };
                    SpawnDirective::new(if i == 0 { 0.0 } else { 50.0 }, Chaser, target)
                })
                .collect(),
            WaveTemplate::DrifterSwarm => (0..n * 2)
                .map(|i| SpawnDirective::new(if i == 0 { 0.0 } else { 15.0 }, Drifter, Player))
                .collect(),
            WaveTemplate::TwitchyPack => (0..(n / 2).max(1))
                .map(|i| {
                    let target = if i % 2 == 0 { Tether } else { Player };
                    SpawnDirective::new(if i == 0 { 0.0 } else { 40.0 }, Twitchy, target)
                })
                .collect(),
            WaveTemplate::MixedRush => (0..n)
                .map(|i| {
                    let kind = [Chaser, Drifter, Twitchy][i % 3];
                    SpawnDirective::new(if i == 0 { 0.0 } else { 30.0 }, kind, Player)
                })
                .collect(),
            WaveTemplate::Pincer => {
                let m = SPAWN_MARGIN;
                let corners = [
                    Vec2::new(m, m),
                    Vec2::new(bounds.x - m, bounds.y - m),
                    Vec2::new(bounds.x - m, m),
                    Vec2::new(m, bounds.y - m),
                ];
                (0..n.max(2))
                    .map(|i| {
                        // Pairs arrive together from opposite corners
                        let delay = match i {
                            0 => 0.0,
                            _ if i % 2 == 1 => 0.0,
                            _ => 80.0,
                        };
                        SpawnDirective::new(delay, Chaser, Player).at(corners[i % 4])
                    })
                    .collect()
            }
        }
    }
}

/// Result of one wave step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveStep {
    /// Enemies created this step (still in their warning state)
    pub spawned: Vec<(u32, EnemyKind)>,
}

/// A batch of scheduled enemies and everything they spawned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wave {
    pub index: u32,
    pub template: WaveTemplate,
    directives: Vec<SpawnDirective>,
    /// Directives fire strictly in order, so a count is enough
    fired: usize,
    started_at: f32,
    boredom_compensation: f32,
    compensated: bool,
    enemies: Vec<Enemy>,
}

impl Wave {
    pub fn new(
        index: u32,
        template: WaveTemplate,
        directives: Vec<SpawnDirective>,
        started_at: f32,
    ) -> Self {
        Self {
            index,
            template,
            directives,
            fired: 0,
            started_at,
            boredom_compensation: 0.0,
            compensated: false,
            enemies: Vec::new(),
        }
    }

    /// Pick and build the wave that follows `index - 1`
    pub fn generate<R: Rng + ?Sized>(index: u32, now: f32, bounds: Vec2, rng: &mut R) -> Self {
        let template = WaveTemplate::pick(index, rng);
        let directives = template.directives(index, bounds);
        log::info!(
            "Wave {}: {} ({} spawns)",
            index + 1,
            template.as_str(),
            directives.len()
        );
        Self::new(index, template, directives, now)
    }

    pub fn directives(&self) -> &[SpawnDirective] {
        &self.directives
    }

    pub fn fired_count(&self) -> usize {
        self.fired
    }

    pub fn started_at(&self) -> f32 {
        self.started_at
    }

    pub fn boredom_compensation(&self) -> f32 {
        self.boredom_compensation
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn enemies_mut(&mut self) -> &mut [Enemy] {
        &mut self.enemies
    }

    /// Enemies not yet dead, including those still telegraphing
    pub fn alive_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_alive()).count()
    }

    /// Take over enemies from the wave before (corpses still fading out)
    pub fn adopt(&mut self, enemies: Vec<Enemy>) {
        self.enemies.extend(enemies);
    }

    /// Consume a finished wave, keeping the dead that are still visible
    pub fn into_fading(self, now: f32) -> Vec<Enemy> {
        self.enemies
            .into_iter()
            .filter(|e| !e.is_alive() && !e.is_faded(now))
            .collect()
    }

    pub fn is_done_spawning(&self) -> bool {
        self.fired >= self.directives.len()
    }

    pub fn is_complete(&self) -> bool {
        self.is_done_spawning() && self.enemies.iter().all(|e| !e.is_alive())
    }

    pub fn phase(&self) -> WavePhase {
        if !self.is_done_spawning() {
            WavePhase::Spawning
        } else if self.is_complete() {
            WavePhase::Complete
        } else {
            WavePhase::Active
        }
    }

    /// Issue due directives, then move every enemy
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        ctx: &SimulationContext,
        targets: Targets,
        warning_duration: f32,
        next_id: &mut u32,
        rng: &mut R,
    ) -> WaveStep {
        let mut result = WaveStep::default();

        for directive in self.due_directives(ctx.now) {
            let id = *next_id;
            *next_id += 1;
            let position = directive
                .position
                .unwrap_or_else(|| spawn_position(ctx.bounds, targets.player, rng));
            let spawn_at = ctx.now + warning_duration;

            match Enemy::new(id, directive.kind, directive.target, position, spawn_at, rng) {
                Ok(enemy) => {
                    log::debug!(
                        "Spawning {} #{} at ({:.0}, {:.0})",
                        directive.kind.as_str(),
                        id,
                        position.x,
                        position.y
                    );
                    self.enemies.push(enemy);
                    result.spawned.push((id, directive.kind));
                }
                Err(err) => log::warn!("Skipping spawn: {err}"),
            }
        }

        for enemy in &mut self.enemies {
            enemy.advance(ctx, targets.position(enemy.target));
        }
        self.enemies.retain(|e| !e.is_faded(ctx.now));

        result
    }

    /// Walk the schedule and mark every directive that should fire now
    fn due_directives(&mut self, now: f32) -> Vec<SpawnDirective> {
        let elapsed = now - self.started_at;
        let empty_field = self.alive_count() == 0;
        let mut due = Vec::new();
        let mut total_delay = 0.0;

        for (i, directive) in self.directives.iter().enumerate() {
            total_delay += directive.delay;
            if i < self.fired {
                continue;
            }

            if i == self.fired && empty_field && !self.compensated {
                let wait = total_delay - (elapsed + self.boredom_compensation);
                if wait > 0.0 {
                    self.boredom_compensation += wait;
                    self.compensated = true;
                    log::debug!("Boredom compensation: pulled schedule forward by {wait:.1}");
                }
            }

            if total_delay <= elapsed + self.boredom_compensation {
                due.push(*directive);
            } else {
                // Later directives wait at least as long
                break;
            }
        }

        self.fired += due.len();
        due
    }
}

/// Random point in the arena, kept away from the player where possible
pub fn spawn_position<R: Rng + ?Sized>(bounds: Vec2, avoid: Vec2, rng: &mut R) -> Vec2 {
    let axis = |rng: &mut R, extent: f32| {
        if extent > 2.0 * SPAWN_MARGIN {
            rng.random_range(SPAWN_MARGIN..extent - SPAWN_MARGIN)
        } else {
            extent / 2.0
        }
    };

    let mut best = Vec2::new(bounds.x / 2.0, bounds.y / 2.0);
    let mut best_distance = -1.0;
    for _ in 0..SPAWN_ATTEMPTS {
        let candidate = Vec2::new(axis(rng, bounds.x), axis(rng, bounds.y));
        let distance = candidate.distance(avoid);
        if distance >= SPAWN_CLEARANCE {
            return candidate;
        }
        if distance > best_distance {
            best = candidate;
            best_distance = distance;
        }
    }
    best
}
