//! Scene lifecycle
//!
//! `Loading → Playing → GameOver`, and back to `Playing` on restart. The
//! scene owns the asset cache (so restarts never reload), the random source,
//! and at most one live [`Session`].

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use thiserror::Error;

use super::state::{SceneAssets, Session};
use super::tick::{TickInput, tick};
use crate::assets::{AssetCache, AssetError, AssetManifest, AssetSource};
use crate::config::HostConfig;

/// Current phase of the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    /// Assets not ready yet, nothing to simulate
    Loading,
    /// Active gameplay
    Playing,
    /// Player hit a bomb; waiting for restart
    GameOver,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error("scene assets have not been loaded")]
    NotInitialized,
}

/// The game's only scene
#[derive(Debug)]
pub struct GameScene<R = Pcg32> {
    phase: ScenePhase,
    manifest: AssetManifest,
    assets: AssetCache,
    layout: Option<SceneAssets>,
    world_size: Vec2,
    gravity: f32,
    rng: R,
    session: Option<Session>,
    sessions_started: u32,
}

impl<R: Rng> GameScene<R> {
    /// Create a scene in `Loading` using the host's configuration and random source
    pub fn new(config: &HostConfig, rng: R) -> Self {
        Self {
            phase: ScenePhase::Loading,
            manifest: config.assets.clone(),
            assets: AssetCache::new(),
            layout: None,
            world_size: Vec2::new(config.width, config.height),
            gravity: config.gravity,
            rng,
            session: None,
            sessions_started: 0,
        }
    }

    /// Load every asset in the manifest. Failure is fatal for the scene.
    pub fn initialize(&mut self, source: &dyn AssetSource) -> Result<(), AssetError> {
        self.assets.load_manifest(&self.manifest, source)?;
        let layout = SceneAssets::from_cache(&self.assets)?;
        self.layout = Some(layout);
        log::info!("Loaded {} assets", self.assets.len());
        Ok(())
    }

    /// Build a fresh session and start playing
    pub fn setup(&mut self) -> Result<(), SceneError> {
        let layout = self.layout.ok_or(SceneError::NotInitialized)?;
        self.start_session(layout);
        Ok(())
    }

    /// Advance one fixed timestep
    pub fn step(&mut self, dt: f32, input: &TickInput) {
        match self.phase {
            ScenePhase::Loading => {}
            ScenePhase::GameOver => {
                if input.restart
                    && let Some(layout) = self.layout
                {
                    log::info!("Restarting");
                    self.start_session(layout);
                }
            }
            ScenePhase::Playing => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                tick(session, input, dt, &mut self.rng);
                if session.is_over {
                    self.phase = ScenePhase::GameOver;
                    log::info!("Game over with score {}", session.score);
                }
            }
        }
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut Session> {
        self.session.as_mut()
    }

    pub fn assets(&self) -> &AssetCache {
        &self.assets
    }

    pub fn layout(&self) -> Option<&SceneAssets> {
        self.layout.as_ref()
    }

    /// Number of sessions started (first setup plus restarts)
    pub fn sessions_started(&self) -> u32 {
        self.sessions_started
    }

    fn start_session(&mut self, layout: SceneAssets) {
        self.session = Some(Session::new(
            &layout,
            self.world_size,
            self.gravity,
            &mut self.rng,
        ));
        self.phase = ScenePhase::Playing;
        self.sessions_started += 1;
        log::debug!("Session {} started", self.sessions_started);
    }
}
