//! Collision detection
//!
//! Two kinds of contact matter:
//! - the cable sweeping through an enemy (enemy dies)
//! - an enemy touching the tether or the player (game over)
//!
//! Both are continuous: they look at where things were last step as well as
//! where they are now, so fast movers can't tunnel through each other.

use glam::Vec2;

use super::cable::CableSweep;
use super::enemy::{Enemy, TargetKind};
use super::mass::Mass;

/// Upper bound on samples per swept contact test
pub const MAX_CONTACT_SAMPLES: u32 = 1024;

/// Where two circles first touched during a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Fraction of the step at which they touched (0..=1)
    pub t: f32,
    pub enemy_at: Vec2,
    pub mass_at: Vec2,
}

/// Indices of collidable enemies caught by the cable this step
pub fn cable_catches(sweep: &CableSweep, enemies: &[Enemy]) -> Vec<usize> {
    enemies
        .iter()
        .enumerate()
        .filter(|(_, enemy)| enemy.is_collidable() && sweep.catches(enemy.body.journey()))
        .map(|(i, _)| i)
        .collect()
}

/// Sub-sampled circle-vs-circle test along both bodies' paths this step.
///
/// Samples are spaced by the smaller radius along the longer of the two
/// journeys, so fast movers get more of them, up to `MAX_CONTACT_SAMPLES`.
pub fn swept_circle_contact(enemy: &Mass, mass: &Mass) -> Option<Contact> {
    let enemy_path = enemy.journey();
    let mass_path = mass.journey();
    let reach = enemy.radius() + mass.radius();

    let longest = enemy_path.length().max(mass_path.length());
    let smallest_radius = enemy.radius().min(mass.radius());
    // Point-sized bodies fall back to an end-of-step check
    let samples = if smallest_radius > 0.0 {
        let wanted = (longest / smallest_radius).ceil() as u32;
        wanted.clamp(1, MAX_CONTACT_SAMPLES)
    } else {
        1
    };

    (1..=samples).find_map(|i| {
        let t = i as f32 / samples as f32;
        let enemy_at = enemy_path.at(t);
        let mass_at = mass_path.at(t);
        (enemy_at.distance(mass_at) < reach).then_some(Contact {
            t,
            enemy_at,
            mass_at,
        })
    })
}

/// Check one enemy against the tether, then the player.
///
/// On the first contact both bodies are snapped to where they touched, the
/// enemy is killed, and the body it hit is returned.
pub fn enemy_contact(
    enemy: &mut Enemy,
    tether: &mut Mass,
    player: &mut Mass,
    now: f32,
) -> Option<TargetKind> {
    if !enemy.is_collidable() {
        return None;
    }

    for (which, mass) in [(TargetKind::Tether, tether), (TargetKind::Player, player)] {
        if let Some(contact) = swept_circle_contact(&enemy.body, mass) {
            enemy.body.snap_to(contact.enemy_at);
            mass.snap_to(contact.mass_at);
            enemy.die(now);
            return Some(which);
        }
    }
    None
}
