//! Tether headless runner
//!
//! Plays one scripted game without a window: a fake pointer grabs the tether
//! and swings it around the arena until the player is hit or time runs out.
//! Usage: `tether [seed]`

use tether::{
    Records, SimResult,
    consts::*,
    persistence::MemoryStore,
    platform::{Clock, ManualClock, PointerState},
    renderer::{Renderer, Style},
    settings::Settings,
    sim::{Game, GameEvent, InputKind},
    vector_at,
};

use glam::Vec2;

/// 60 FPS
const FRAME_MS: f64 = 1000.0 / 60.0;
/// Give up after two minutes of play
const MAX_FRAMES: u32 = 60 * 120;
const SWING_RADIUS: f32 = 180.0;
/// Radians per frame
const SWING_RATE: f32 = 0.035;

/// Renderer that logs a one-line summary per frame
#[derive(Default)]
struct LogRenderer {
    shapes: usize,
    texts: Vec<String>,
}

impl Renderer for LogRenderer {
    fn begin_frame(&mut self, bounds: Vec2, shake: f32) {
        self.shapes = 0;
        self.texts.clear();
        log::debug!("Frame {}x{} shake {:.2}", bounds.x, bounds.y, shake);
    }

    fn circle(&mut self, _center: Vec2, _radius: f32, _style: Style) {
        self.shapes += 1;
    }

    fn ring(&mut self, _center: Vec2, _radius: f32, _style: Style) {
        self.shapes += 1;
    }

    fn line(&mut self, _from: Vec2, _to: Vec2, _width: f32, _style: Style) {
        self.shapes += 1;
    }

    fn text(&mut self, _at: Vec2, text: &str, _size: f32, _style: Style) {
        self.texts.push(text.to_string());
    }

    fn end_frame(&mut self) {
        log::info!("Drew {} shapes, text: {:?}", self.shapes, self.texts);
    }
}

fn main() {
    env_logger::init();
    log::info!("Tether (headless) starting...");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    if let Err(err) = run(seed) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

fn run(seed: u64) -> SimResult<()> {
    let mut store = MemoryStore::new();
    let settings = Settings::load(&store);
    let mut records = Records::load(&store);

    let bounds = Vec2::new(DEFAULT_WIDTH, DEFAULT_HEIGHT);
    let mut game = Game::new(seed, bounds, settings)?;
    let mut clock = ManualClock::new(0.0);
    let mut pointer = PointerState::new();

    let grab = game.tether.body.position();
    let center = bounds / 2.0;
    let mut frames = 0;

    while frames < MAX_FRAMES && !game.is_ended() {
        // Pick up the tether, then ease into a wide circle around the arena
        let angle = frames as f32 * SWING_RATE;
        let swing = center + vector_at(angle, SWING_RADIUS);
        let blend = (frames as f32 / 120.0).min(1.0);
        pointer.record(grab.lerp(swing, blend), InputKind::Mouse);

        game.advance(&clock, &pointer);
        for event in game.drain_events() {
            for achievement in records.observe(&event) {
                println!("Achievement: {}", achievement.as_str());
            }
            if let GameEvent::WaveStarted { index } = event {
                println!("Wave {} at {:.1}s", index + 1, clock.now() / 1000.0);
            }
        }

        clock.advance(FRAME_MS);
        frames += 1;
    }

    // Let the slow-motion ending play out a little
    for _ in 0..30 {
        game.advance(&clock, &pointer);
        clock.advance(FRAME_MS);
    }
    for event in game.drain_events() {
        records.observe(&event);
    }

    let mut renderer = LogRenderer::default();
    game.draw(&mut renderer);

    println!(
        "Seed {}: score {}, survived {:.0} units over {} frames{}",
        seed,
        game.score(),
        game.survived(),
        frames,
        if game.is_ended() { "" } else { " (time limit)" }
    );
    println!(
        "High score {}, games played {}",
        records.high_score, records.games_played
    );

    records.save(&mut store);
    game.settings().save(&mut store);
    Ok(())
}
