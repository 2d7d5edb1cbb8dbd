//! Game host
//!
//! Owns the configuration, the keyboard state and the active scene, and turns
//! variable frame times into fixed simulation ticks.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::assets::{AssetError, AssetSource};
use crate::config::HostConfig;
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};
use crate::input::{Key, KeyboardState};
use crate::sim::{GameScene, SceneError, ScenePhase};

#[derive(Debug, thiserror::Error)]
pub enum BootError {
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Process-wide host for the single game scene
#[derive(Debug)]
pub struct GameHost {
    config: HostConfig,
    scene: GameScene<Pcg32>,
    keyboard: KeyboardState,
    accumulator: f32,
    seed: u64,
    last_phase: ScenePhase,
}

impl GameHost {
    pub fn new(config: HostConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let scene = GameScene::new(&config, Pcg32::seed_from_u64(seed));
        Self {
            config,
            scene,
            keyboard: KeyboardState::new(),
            accumulator: 0.0,
            seed,
            last_phase: ScenePhase::Loading,
        }
    }

    /// Load assets and start the first session. Errors here are fatal.
    pub fn boot(&mut self, source: &dyn AssetSource) -> Result<(), BootError> {
        log::info!(
            "Booting {}x{} scene (gravity {}, seed {})",
            self.config.width,
            self.config.height,
            self.config.gravity,
            self.seed
        );
        self.scene.initialize(source)?;
        self.scene.setup()?;
        self.last_phase = self.scene.phase();
        Ok(())
    }

    /// Run as many fixed ticks as `dt` seconds of wall time cover
    ///
    /// Returns the number of ticks run.
    pub fn frame(&mut self, dt: f32) -> u32 {
        self.run_ticks(dt.clamp(0.0, MAX_FRAME_DT))
    }

    /// Drain the accumulator after adding `dt`, at most `MAX_SUBSTEPS` ticks.
    /// Hitting the cap drops the remaining backlog.
    fn run_ticks(&mut self, dt: f32) -> u32 {
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = self.keyboard.snapshot();
            self.scene.step(SIM_DT, &input);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Edges belong to the first tick that sees them
            self.keyboard.end_tick();
            self.track_phase();
        }
        if substeps == MAX_SUBSTEPS {
            self.accumulator = 0.0;
        }
        substeps
    }

    pub fn key_down(&mut self, key: Key) {
        self.keyboard.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.keyboard.key_up(key);
    }

    /// Window lost focus; nothing stays held
    pub fn release_keys(&mut self) {
        self.keyboard.release_all();
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn scene(&self) -> &GameScene<Pcg32> {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut GameScene<Pcg32> {
        &mut self.scene
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn track_phase(&mut self) {
        let phase = self.scene.phase();
        if phase != self.last_phase {
            log::info!("Scene {:?} -> {:?}", self.last_phase, phase);
            self.last_phase = phase;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemorySource;
    use crate::assets::testing::standard_source;
    use glam::Vec2;

    fn host() -> GameHost {
        let config = HostConfig {
            seed: Some(1234),
            ..Default::default()
        };
        let mut host = GameHost::new(config);
        host.boot(&standard_source()).unwrap();
        host
    }

    fn kill_player(host: &mut GameHost) {
        let session = host.scene_mut().session_mut().unwrap();
        let pos = session.player_body().pos;
        session.add_bomb(pos, Vec2::ZERO);
        host.frame(SIM_DT * 1.5);
        assert_eq!(host.scene().phase(), ScenePhase::GameOver);
    }

    #[test]
    fn test_boot_starts_playing() {
        let host = host();
        assert_eq!(host.seed(), 1234);
        assert_eq!(host.scene().phase(), ScenePhase::Playing);
    }

    #[test]
    fn test_boot_fails_without_assets() {
        let mut host = GameHost::new(HostConfig::default());
        let err = host.boot(&MemorySource::new()).unwrap_err();
        assert!(matches!(err, BootError::Assets(_)));
        assert_eq!(host.scene().phase(), ScenePhase::Loading);
    }

    #[test]
    fn test_fixed_timestep_accumulates() {
        let mut host = host();
        assert_eq!(host.frame(SIM_DT * 0.5), 0);
        assert_eq!(host.frame(SIM_DT * 0.6), 1);
        assert_eq!(host.frame(SIM_DT * 3.0), 3);
    }

    #[test]
    fn test_substeps_are_capped() {
        let mut host = host();
        // A long stall is clamped rather than replayed
        let ticks = host.frame(5.0);
        assert!((5..=MAX_SUBSTEPS).contains(&ticks), "ran {ticks} ticks");
        assert_eq!(host.frame(0.0), 0);
    }

    #[test]
    fn test_backlog_dropped_at_substep_cap() {
        let mut host = host();
        assert_eq!(host.run_ticks(SIM_DT * 20.0), MAX_SUBSTEPS);
        assert_eq!(host.accumulator, 0.0);
        assert_eq!(host.frame(0.0), 0);
    }

    #[test]
    fn test_held_keys_drive_player() {
        let mut host = host();
        host.key_down(Key::Right);
        host.frame(SIM_DT);
        let session = host.scene().session().unwrap();
        assert_eq!(session.player_body().vel.x, 160.0);

        host.key_up(Key::Right);
        host.frame(SIM_DT);
        let session = host.scene().session().unwrap();
        assert_eq!(session.player_body().vel.x, 0.0);
    }

    #[test]
    fn test_restart_needs_a_fresh_press() {
        let mut host = host();
        // Holding restart through the game over does not restart
        host.key_down(Key::Restart);
        host.frame(SIM_DT);
        kill_player(&mut host);
        host.frame(SIM_DT * 2.0);
        assert_eq!(host.scene().phase(), ScenePhase::GameOver);

        host.key_up(Key::Restart);
        host.key_down(Key::Restart);
        host.frame(SIM_DT);
        assert_eq!(host.scene().phase(), ScenePhase::Playing);
        assert_eq!(host.scene().sessions_started(), 2);

        // One press restarts once, however long it is held
        kill_player(&mut host);
        host.frame(SIM_DT * 5.0);
        assert_eq!(host.scene().phase(), ScenePhase::GameOver);
    }
}
