//! Render handoff
//!
//! The simulation never draws. Each frame the host asks for a
//! [`FrameSnapshot`]: a flat, back-to-front list of primitives built from the
//! game state and the current settings. A snapshot can be replayed onto any
//! [`Renderer`] (canvas, GPU, terminal, a test recorder) or serialised.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{Enemy, Game, GamePhase, Particle};

/// Colour and opacity for one primitive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub rgb: [u8; 3],
    /// 0-1
    pub opacity: f32,
}

impl Style {
    pub fn solid(rgb: [u8; 3]) -> Self {
        Self { rgb, opacity: 1.0 }
    }

    pub fn faded(rgb: [u8; 3], opacity: f32) -> Self {
        Self {
            rgb,
            opacity: opacity.clamp(0.0, 1.0),
        }
    }
}

const HUD_RGB: [u8; 3] = [40, 40, 40];
const PARTICLE_MAX_OPACITY: f32 = 0.8;
const CABLE_WIDTH: f32 = 2.0;

/// Drawing capability supplied by the host
pub trait Renderer {
    /// Called once before any primitive; `shake` is 0-1
    fn begin_frame(&mut self, _bounds: Vec2, _shake: f32) {}

    fn circle(&mut self, center: Vec2, radius: f32, style: Style);

    /// Outline only
    fn ring(&mut self, center: Vec2, radius: f32, style: Style);

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, style: Style);

    fn text(&mut self, at: Vec2, text: &str, size: f32, style: Style);

    fn end_frame(&mut self) {}
}

/// A single primitive in a frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Drawable {
    Circle {
        center: Vec2,
        radius: f32,
        style: Style,
    },
    Ring {
        center: Vec2,
        radius: f32,
        style: Style,
    },
    Line {
        from: Vec2,
        to: Vec2,
        width: f32,
        style: Style,
    },
    Text {
        at: Vec2,
        text: String,
        size: f32,
        style: Style,
    },
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub bounds: Vec2,
    pub phase: GamePhase,
    pub score: u64,
    /// One-based wave number shown to the player, 0 before the first wave
    pub wave: u32,
    /// Already zeroed when screen shake is disabled
    pub shake: f32,
    /// Back to front
    pub drawables: Vec<Drawable>,
}

impl FrameSnapshot {
    pub fn capture(game: &Game) -> Self {
        let settings = game.settings();
        let now = game.time_elapsed();
        let mut drawables = Vec::new();

        for particle in game.particles.iter().take(settings.max_particles()) {
            drawables.push(particle_drawable(particle));
        }

        if let Some(wave) = game.wave() {
            for enemy in wave.enemies() {
                enemy_drawables(enemy, now, settings.warning_duration, &mut drawables);
            }
        }

        let tether = &game.tether;
        let player = &game.player;
        let cable = game.cable.segment(&tether.body, &player.body);
        drawables.push(Drawable::Line {
            from: cable.a,
            to: cable.b,
            width: CABLE_WIDTH,
            style: Style::solid(game.cable.rgb),
        });

        // Pickup hint around a tether that is waiting to be grabbed
        if tether.is_locked() && tether.is_unlockable() {
            drawables.push(Drawable::Ring {
                center: tether.body.position(),
                radius: settings.activation_radius(tether.last_input_kind()),
                style: Style::faded(tether.body.rgb, 0.3),
            });
        }
        drawables.push(Drawable::Circle {
            center: tether.body.position(),
            radius: tether.body.radius(),
            style: Style::solid(tether.body.rgb),
        });
        drawables.push(Drawable::Circle {
            center: player.body.position(),
            radius: player.body.radius(),
            style: Style::solid(player.body.rgb),
        });

        hud_drawables(game, &mut drawables);

        let shake = if settings.effective_screen_shake() {
            game.screen_shake()
        } else {
            0.0
        };

        Self {
            bounds: game.bounds(),
            phase: game.phase(),
            score: game.score(),
            wave: game.wave().map_or(0, |w| w.index + 1),
            shake,
            drawables,
        }
    }

    /// Replay onto a renderer
    pub fn render<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        renderer.begin_frame(self.bounds, self.shake);
        for drawable in &self.drawables {
            match drawable {
                Drawable::Circle {
                    center,
                    radius,
                    style,
                } => renderer.circle(*center, *radius, *style),
                Drawable::Ring {
                    center,
                    radius,
                    style,
                } => renderer.ring(*center, *radius, *style),
                Drawable::Line {
                    from,
                    to,
                    width,
                    style,
                } => renderer.line(*from, *to, *width, *style),
                Drawable::Text {
                    at,
                    text,
                    size,
                    style,
                } => renderer.text(*at, text, *size, *style),
            }
        }
        renderer.end_frame();
    }
}

fn particle_drawable(particle: &Particle) -> Drawable {
    Drawable::Circle {
        center: particle.pos,
        radius: particle.size,
        style: Style::faded(particle.rgb, particle.life * PARTICLE_MAX_OPACITY),
    }
}

fn enemy_drawables(enemy: &Enemy, now: f32, warning_duration: f32, out: &mut Vec<Drawable>) {
    if enemy.is_faded(now) {
        return;
    }
    let opacity = enemy.opacity(now, warning_duration);
    let style = Style::faded(enemy.body.rgb, opacity);

    if let Some(radius) = enemy.warning_ring_radius(now, warning_duration) {
        out.push(Drawable::Ring {
            center: enemy.body.position(),
            radius,
            style,
        });
        return;
    }
    out.push(Drawable::Circle {
        center: enemy.body.position(),
        radius: enemy.body.radius(),
        style,
    });
}

fn hud_drawables(game: &Game, out: &mut Vec<Drawable>) {
    let bounds = game.bounds();
    let style = Style::solid(HUD_RGB);

    out.push(Drawable::Text {
        at: Vec2::new(12.0, 24.0),
        text: format!("Score: {}", game.score()),
        size: 18.0,
        style,
    });
    if let Some(wave) = game.wave() {
        out.push(Drawable::Text {
            at: Vec2::new(12.0, 46.0),
            text: format!("Wave {}", wave.index + 1),
            size: 14.0,
            style,
        });
    }

    match game.phase() {
        GamePhase::Waiting => out.push(Drawable::Text {
            at: game.tether.body.position() + Vec2::new(0.0, -TOUCH_ACTIVATION_RADIUS),
            text: "Grab the tether".to_string(),
            size: 16.0,
            style,
        }),
        GamePhase::Ended => {
            let center = bounds / 2.0;
            out.push(Drawable::Text {
                at: center,
                text: "Game over".to_string(),
                size: 36.0,
                style,
            });
            out.push(Drawable::Text {
                at: center + Vec2::new(0.0, 36.0),
                text: "Click to try again".to_string(),
                size: 16.0,
                style: Style::faded(HUD_RGB, 0.7),
            });
        }
        GamePhase::Playing => {}
    }
}

impl Game {
    /// Capture the current frame for the host's renderer
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot::capture(self)
    }

    /// Capture and immediately replay onto `renderer`
    pub fn draw<R: Renderer + ?Sized>(&self, renderer: &mut R) {
        self.snapshot().render(renderer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::InputKind;

    /// Counts primitives by type
    #[derive(Default)]
    struct Tally {
        frames: u32,
        circles: usize,
        rings: usize,
        lines: usize,
        texts: Vec<String>,
    }

    impl Renderer for Tally {
        fn begin_frame(&mut self, _bounds: Vec2, _shake: f32) {
            self.frames += 1;
        }

        fn circle(&mut self, _center: Vec2, _radius: f32, _style: Style) {
            self.circles += 1;
        }

        fn ring(&mut self, _center: Vec2, _radius: f32, _style: Style) {
            self.rings += 1;
        }

        fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _style: Style) {
            self.lines += 1;
        }

        fn text(&mut self, _at: Vec2, text: &str, _size: f32, _style: Style) {
            self.texts.push(text.to_string());
        }
    }

    fn game() -> Game {
        Game::new(
            5,
            Vec2::new(DEFAULT_WIDTH, DEFAULT_HEIGHT),
            Settings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_title_screen_frame() {
        let game = game();
        let mut tally = Tally::default();
        game.draw(&mut tally);

        assert_eq!(tally.frames, 1);
        // Tether and player
        assert_eq!(tally.circles, 2);
        // Pickup hint
        assert_eq!(tally.rings, 1);
        assert_eq!(tally.lines, 1);
        assert!(tally.texts.iter().any(|t| t == "Grab the tether"));
        assert!(tally.texts.iter().any(|t| t == "Score: 0"));
    }

    #[test]
    fn test_new_enemies_draw_as_warning_rings() {
        let mut game = game();
        let grab = game.tether.body.position();
        game.on_pointer_move(grab, InputKind::Mouse);
        game.tick(0.0);
        game.tick(16.0);

        let snapshot = game.snapshot();
        assert_eq!(snapshot.phase, GamePhase::Playing);
        assert_eq!(snapshot.wave, 1);
        let spawned = game.wave().unwrap().enemies().len();
        assert!(spawned > 0);
        let rings = snapshot
            .drawables
            .iter()
            .filter(|d| matches!(d, Drawable::Ring { .. }))
            .count();
        // Hint ring is gone once the tether is held
        assert_eq!(rings, spawned);
    }

    #[test]
    fn test_shake_respects_reduced_motion() {
        let mut game = game();
        game.screen_shake = 0.8;
        assert_eq!(game.snapshot().shake, 0.8);
        game.settings.reduced_motion = true;
        assert_eq!(game.snapshot().shake, 0.0);
    }

    #[test]
    fn test_snapshot_serialises() {
        let json = serde_json::to_string(&game().snapshot()).unwrap();
        assert!(json.contains("Grab the tether"));
    }
}
