//! Point-mass physics
//!
//! Every simulated body (tether, player, enemies) is a [`Mass`]: a circle with
//! position, velocity, an accumulated force and exponential damping. Owners
//! recompute `force` each step, then call [`Mass::apply_force`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Everything a simulation step needs to know about the outside world
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationContext {
    /// Simulation time elapsed this step (already scaled by game speed)
    pub time_delta: f32,
    /// Simulation time at the end of this step
    pub now: f32,
    /// Play area size; walls sit at 0 and at `bounds` on each axis
    pub bounds: Vec2,
}

impl SimulationContext {
    pub fn new(time_delta: f32, now: f32, bounds: Vec2) -> Self {
        Self {
            time_delta,
            now,
            bounds,
        }
    }
}

/// Construction parameters for a [`Mass`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassOptions {
    pub position: Vec2,
    pub velocity: Vec2,
    pub mass: f32,
    /// Fraction of velocity kept per unit of simulation time (1 = frictionless)
    pub damping: f32,
    pub radius: f32,
    /// Restitution on wall contact
    pub bounciness: f32,
    pub has_walls: bool,
    pub rgb: [u8; 3],
}

impl Default for MassOptions {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            mass: 1.0,
            damping: 1.0,
            radius: 0.0,
            bounciness: 0.0,
            has_walls: false,
            rgb: [60, 60, 60],
        }
    }
}

/// A circular body with Newtonian motion and exponential damping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mass {
    position: Vec2,
    previous_position: Vec2,
    pub velocity: Vec2,
    /// Force for the current step, written by the owner before integration
    pub force: Vec2,
    mass: f32,
    damping: f32,
    radius: f32,
    bounciness: f32,
    pub has_walls: bool,
    pub rgb: [u8; 3],
}

impl Default for Mass {
    fn default() -> Self {
        let opts = MassOptions::default();
        Self {
            position: opts.position,
            previous_position: opts.position,
            velocity: opts.velocity,
            force: Vec2::ZERO,
            mass: opts.mass,
            damping: opts.damping,
            radius: opts.radius,
            bounciness: opts.bounciness,
            has_walls: opts.has_walls,
            rgb: opts.rgb,
        }
    }
}

impl Mass {
    /// Build a mass, rejecting parameters that would make integration diverge
    pub fn new(opts: MassOptions) -> SimResult<Self> {
        validate_mass(opts.mass)?;
        validate_damping(opts.damping)?;
        if !(opts.radius >= 0.0) {
            return Err(SimError::NegativeRadius(opts.radius));
        }
        if !(0.0..=1.0).contains(&opts.bounciness) {
            return Err(SimError::BouncinessOutOfRange(opts.bounciness));
        }

        Ok(Self {
            position: opts.position,
            previous_position: opts.position,
            velocity: opts.velocity,
            force: Vec2::ZERO,
            mass: opts.mass,
            damping: opts.damping,
            radius: opts.radius,
            bounciness: opts.bounciness,
            has_walls: opts.has_walls,
            rgb: opts.rgb,
        })
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Where this mass was before the most recent position update
    #[inline]
    pub fn previous_position(&self) -> Vec2 {
        self.previous_position
    }

    /// Motion over the last step
    #[inline]
    pub fn journey(&self) -> super::geometry::Segment {
        super::geometry::Segment::new(self.previous_position, self.position)
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn damping(&self) -> f32 {
        self.damping
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    #[inline]
    pub fn bounciness(&self) -> f32 {
        self.bounciness
    }

    pub fn set_damping(&mut self, damping: f32) -> SimResult<()> {
        validate_damping(damping)?;
        self.damping = damping;
        Ok(())
    }

    /// Move to `position`, keeping the old one as the sweep trail
    pub fn set_position(&mut self, position: Vec2) {
        self.previous_position = self.position;
        self.position = position;
    }

    /// Jump to `position` without leaving a sweep trail
    pub fn teleport_to(&mut self, position: Vec2) {
        self.position = position;
        self.previous_position = position;
    }

    /// Overwrite the current position only (contact snapping)
    pub(crate) fn snap_to(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Integrate `force` into velocity, then velocity into position.
    ///
    /// Returns the number of wall bounces that happened this step.
    pub fn apply_force(&mut self, ctx: &SimulationContext) -> u32 {
        let acceleration = self.force / self.mass;
        let velocity = self.velocity + acceleration * ctx.time_delta;
        self.velocity = velocity * self.damping.powf(ctx.time_delta);
        self.apply_velocity(ctx)
    }

    /// Move by the current velocity and resolve walls
    pub fn apply_velocity(&mut self, ctx: &SimulationContext) -> u32 {
        self.set_position(self.position + self.velocity * ctx.time_delta);
        self.collide_with_walls(ctx.bounds)
    }

    /// Bounce off the play-area edges, axis by axis.
    ///
    /// Penetration depth is reflected back scaled by `bounciness`, so a soft
    /// body barely rebounds from a deep overshoot.
    pub fn collide_with_walls(&mut self, bounds: Vec2) -> u32 {
        if !self.has_walls {
            return 0;
        }

        let mut bounces = 0;
        for axis in 0..2 {
            let pos = self.position[axis];
            let distance_from_near_edge = pos - self.radius;
            let distance_from_far_edge = bounds[axis] - self.radius - pos;

            if distance_from_near_edge < 0.0 {
                self.velocity[axis] *= -self.bounciness;
                self.position[axis] = -distance_from_near_edge * self.bounciness + self.radius;
                bounces += 1;
            } else if distance_from_far_edge < 0.0 {
                self.velocity[axis] *= -self.bounciness;
                self.position[axis] =
                    bounds[axis] + distance_from_far_edge * self.bounciness - self.radius;
                bounces += 1;
            }

            // A rebound bigger than the arena would leave us outside the far wall
            let max = (bounds[axis] - self.radius).max(self.radius);
            self.position[axis] = self.position[axis].max(self.radius).min(max);
        }
        bounces
    }
}

fn validate_mass(mass: f32) -> SimResult<()> {
    if mass > 0.0 && mass.is_finite() {
        Ok(())
    } else {
        Err(SimError::NonPositiveMass(mass))
    }
}

fn validate_damping(damping: f32) -> SimResult<()> {
    if (0.0..=1.0).contains(&damping) {
        Ok(())
    } else {
        Err(SimError::DampingOutOfRange(damping))
    }
}

/// Shared stepping contract for bodies that generate their own force
pub trait Simulated {
    fn body(&self) -> &Mass;
    fn body_mut(&mut self) -> &mut Mass;

    /// Force to apply this step. May advance internal behaviour state.
    fn current_force(&mut self, ctx: &SimulationContext, target: Vec2) -> Vec2;

    /// Called after integration when a wall bounce happened
    fn on_bounce(&mut self) {}

    fn step(&mut self, ctx: &SimulationContext, target: Vec2) {
        let force = self.current_force(ctx, target);
        let body = self.body_mut();
        body.force = force;
        if body.apply_force(ctx) > 0 {
            self.on_bounce();
        }
    }
}
