//! Star Catcher - A single-screen platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (arcade physics, scene lifecycle, gameplay rules)
//! - `assets`: Keyed asset loading and caching
//! - `input`: Keyboard state and per-tick input snapshots
//! - `host`: Fixed-timestep host that owns configuration and the active scene
//! - `renderer`: WebGPU rendering pipeline
//! - `config`: Host configuration

pub mod assets;
pub mod config;
pub mod host;
pub mod input;
pub mod renderer;
pub mod sim;

pub use assets::{AssetCache, AssetError, AssetSource, FsSource, MemorySource};
pub use config::HostConfig;
pub use host::GameHost;
pub use input::{Key, KeyboardState};
pub use sim::{GameScene, ScenePhase, TickInput};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame delta the host will integrate (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Canvas dimensions
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;
    /// Downward gravity (pixels/s²)
    pub const GRAVITY: f32 = 300.0;

    /// Player spawn point (body center)
    pub const PLAYER_SPAWN: (f32, f32) = (100.0, 450.0);
    pub const PLAYER_BOUNCE: f32 = 0.2;
    /// Horizontal run speed (pixels/s)
    pub const PLAYER_SPEED: f32 = 160.0;
    /// Vertical velocity applied by a grounded jump
    pub const JUMP_VELOCITY: f32 = -330.0;

    /// Platform centers and scale, sized from the `ground` image
    pub const PLATFORMS: [(f32, f32, f32); 4] = [
        (400.0, 568.0, 2.0),
        (600.0, 400.0, 1.0),
        (50.0, 250.0, 1.0),
        (750.0, 220.0, 1.0),
    ];

    /// Star grid
    pub const STAR_COUNT: usize = 12;
    pub const STAR_START_X: f32 = 12.0;
    pub const STAR_STEP_X: f32 = 70.0;
    pub const STAR_BOUNCE_MIN: f32 = 0.1;
    pub const STAR_BOUNCE_MAX: f32 = 0.5;
    /// Points awarded per star
    pub const STAR_POINTS: u32 = 10;

    /// Bomb spawn
    pub const BOMB_SPAWN_Y: f32 = 16.0;
    pub const BOMB_FALL_SPEED: f32 = 20.0;
    pub const BOMB_MAX_SPEED_X: i32 = 200;
    /// Players left of this x get bombs on the right half, and vice versa
    pub const BOMB_SIDE_SPLIT: f32 = 400.0;

    /// Spritesheet frame size
    pub const DUDE_FRAME_WIDTH: u32 = 32;
    pub const DUDE_FRAME_HEIGHT: u32 = 48;

    /// Score text anchor (top-left)
    pub const SCORE_TEXT_POS: (f32, f32) = (16.0, 16.0);
}
