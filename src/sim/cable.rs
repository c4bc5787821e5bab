//! The cable between tether and player
//!
//! Not simulated itself: it is derived every frame from the two masses it
//! connects, and is what kills enemies.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{Segment, point_in_polygon, segment_crosses_polygon};
use super::mass::Mass;

/// Area the cable swept through during the last step.
///
/// Corners run tether-previous, tether-now, player-now, player-previous so
/// the edges follow the cable's two end paths and its two positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CableSweep {
    pub corners: [Vec2; 4],
}

impl CableSweep {
    /// Point lies inside the swept area (even-odd)
    pub fn contains(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.corners)
    }

    /// Path strictly crosses one of the sweep's edges
    pub fn crossed_by(&self, path: Segment) -> bool {
        segment_crosses_polygon(path, &self.corners)
    }

    /// Would a body that travelled along `journey` have been caught?
    ///
    /// Containment of the end point is tested first, then edge crossings.
    pub fn catches(&self, journey: Segment) -> bool {
        self.contains(journey.b) || self.crossed_by(journey)
    }
}

/// Relation over the tether and player masses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cable {
    pub rgb: [u8; 3],
}

impl Default for Cable {
    fn default() -> Self {
        Self::new()
    }
}

impl Cable {
    pub fn new() -> Self {
        Self { rgb: [20, 20, 200] }
    }

    /// The cable as it is right now
    pub fn segment(&self, tether: &Mass, player: &Mass) -> Segment {
        Segment::new(tether.position(), player.position())
    }

    /// Quadrilateral swept between last step and this one
    pub fn sweep(&self, tether: &Mass, player: &Mass) -> CableSweep {
        CableSweep {
            corners: [
                tether.previous_position(),
                tether.position(),
                player.position(),
                player.previous_position(),
            ],
        }
    }
}
