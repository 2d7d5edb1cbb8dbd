//! Session state and gameplay rules
//!
//! Everything that belongs to one playthrough lives in [`Session`]. A restart
//! throws the whole struct away and builds a new one from the fixed layout.

use glam::Vec2;
use rand::Rng;

use super::anim::{AnimKey, Animator, player_clips};
use super::physics::{Body, BodyId, Contact, PhysicsWorld};
use crate::assets::{AssetCache, AssetError};
use crate::consts::*;

/// Physics groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Player,
    Platforms,
    Stars,
    Bombs,
}

/// Contact callbacks registered with the physics world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    /// Player overlapped a star
    CollectStar,
    /// Player ran into a bomb
    HitBomb,
}

pub type World = PhysicsWorld<Layer, SceneEvent>;

/// Tint applied to the player on game over
pub const HIT_TINT: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Sizes the layout needs, taken from the loaded assets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneAssets {
    pub sky: Vec2,
    pub ground: Vec2,
    pub star: Vec2,
    pub bomb: Vec2,
    /// One spritesheet frame
    pub player: Vec2,
}

impl SceneAssets {
    /// Pull sizes out of the cache and check the spritesheet has every animation frame
    pub fn from_cache(cache: &AssetCache) -> Result<Self, AssetError> {
        let size = |key: &str| -> Result<Vec2, AssetError> {
            let image = cache.image(key)?;
            Ok(Vec2::new(image.width as f32, image.height as f32))
        };

        let dude = cache.spritesheet("dude")?;
        let needed = Animator::new(player_clips(), AnimKey::Turn)
            .max_frame()
            .unwrap_or(0);
        if needed >= dude.frame_count() {
            return Err(AssetError::MissingFrame {
                key: "dude".to_string(),
                frame: needed,
                available: dude.frame_count(),
            });
        }

        Ok(Self {
            sky: size("sky")?,
            ground: size("ground")?,
            star: size("star")?,
            bomb: size("bomb")?,
            player: Vec2::new(dude.frame_width as f32, dude.frame_height as f32),
        })
    }
}

/// On-screen text
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub text: String,
    /// Anchor in world coordinates
    pub pos: Vec2,
    pub visible: bool,
}

/// A collectible star and the column it belongs to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub body: BodyId,
    pub origin_x: f32,
}

/// All state for one playthrough
#[derive(Debug, Clone)]
pub struct Session {
    pub score: u32,
    pub is_over: bool,
    pub world: World,
    pub player: BodyId,
    pub player_anim: Animator,
    pub player_tint: Option<[f32; 4]>,
    pub platforms: Vec<BodyId>,
    pub stars: Vec<Star>,
    pub bombs: Vec<BodyId>,
    pub score_text: TextElement,
    pub restart_prompt: TextElement,
    bomb_size: Vec2,
}

impl Session {
    /// Build the initial layout
    pub fn new<R: Rng>(
        assets: &SceneAssets,
        world_size: Vec2,
        gravity: f32,
        rng: &mut R,
    ) -> Self {
        let mut world = World::new(world_size, Vec2::new(0.0, gravity));

        let platforms = PLATFORMS
            .iter()
            .map(|&(x, y, scale)| {
                world.add(
                    Layer::Platforms,
                    Body::fixed(Vec2::new(x, y), assets.ground * scale),
                )
            })
            .collect();

        let player = world.add(
            Layer::Player,
            Body::dynamic(Vec2::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1), assets.player)
                .with_bounce(Vec2::splat(PLAYER_BOUNCE))
                .with_world_bounds(),
        );

        let stars = (0..STAR_COUNT)
            .map(|i| {
                let origin_x = STAR_START_X + STAR_STEP_X * i as f32;
                let bounce_y = rng.random_range(STAR_BOUNCE_MIN..=STAR_BOUNCE_MAX);
                let body = world.add(
                    Layer::Stars,
                    Body::dynamic(Vec2::new(origin_x, 0.0), assets.star)
                        .with_bounce(Vec2::new(0.0, bounce_y)),
                );
                Star { body, origin_x }
            })
            .collect();

        world.add_collider(Layer::Player, Layer::Platforms, None);
        world.add_collider(Layer::Stars, Layer::Platforms, None);
        world.add_collider(Layer::Bombs, Layer::Platforms, None);
        world.add_overlap(Layer::Player, Layer::Stars, SceneEvent::CollectStar);
        world.add_collider(Layer::Player, Layer::Bombs, Some(SceneEvent::HitBomb));

        Self {
            score: 0,
            is_over: false,
            world,
            player,
            player_anim: Animator::new(player_clips(), AnimKey::Turn),
            player_tint: None,
            platforms,
            stars,
            bombs: Vec::new(),
            score_text: TextElement {
                text: score_label(0),
                pos: Vec2::new(SCORE_TEXT_POS.0, SCORE_TEXT_POS.1),
                visible: true,
            },
            restart_prompt: TextElement {
                text: "Game Over! Press R to restart".to_string(),
                pos: world_size * 0.5,
                visible: false,
            },
            bomb_size: assets.bomb,
        }
    }

    pub fn player_body(&self) -> &Body {
        &self.world[self.player]
    }

    /// Stars currently in play
    pub fn active_stars(&self) -> usize {
        self.stars
            .iter()
            .filter(|s| self.world[s.body].enabled)
            .count()
    }

    /// Run the registered callback for each contact, in order
    pub fn dispatch<R: Rng>(&mut self, contacts: &[Contact<SceneEvent>], rng: &mut R) {
        for contact in contacts {
            match contact.event {
                SceneEvent::CollectStar => self.on_collect_star(rng, contact.a, contact.b),
                SceneEvent::HitBomb => self.on_hit_bomb(contact.a, contact.b),
            }
        }
    }

    /// Player picked up a star
    pub fn on_collect_star<R: Rng>(&mut self, rng: &mut R, player: BodyId, star: BodyId) {
        if !self.world[star].enabled {
            return;
        }
        self.world[star].disable(true);

        self.score += STAR_POINTS;
        self.score_text.text = score_label(self.score);

        if self.active_stars() == 0 {
            self.refill_stars();
            let player_x = self.world[player].pos.x;
            self.spawn_bomb(rng, player_x);
        }
    }

    /// Player ran into a bomb: freeze everything and end the session
    pub fn on_hit_bomb(&mut self, _player: BodyId, bomb: BodyId) {
        if self.is_over {
            return;
        }
        self.world.pause();
        self.player_tint = Some(HIT_TINT);
        self.player_anim.play(AnimKey::Turn);
        self.is_over = true;
        self.restart_prompt.visible = true;
        log::debug!("Player hit bomb {:?}", bomb);
    }

    /// Put every star back at the top of its column (bounce is kept)
    fn refill_stars(&mut self) {
        for star in &self.stars {
            self.world[star.body].enable_at(Vec2::new(star.origin_x, 0.0));
        }
        log::debug!("Stars refilled at score {}", self.score);
    }

    /// Drop a bomb on the half of the screen away from the player
    pub fn spawn_bomb<R: Rng>(&mut self, rng: &mut R, player_x: f32) -> BodyId {
        let split = BOMB_SIDE_SPLIT as i32;
        let x = if player_x < BOMB_SIDE_SPLIT {
            rng.random_range(split..split * 2)
        } else {
            rng.random_range(0..split)
        };
        let vx = rng.random_range(-BOMB_MAX_SPEED_X..=BOMB_MAX_SPEED_X);

        let id = self.add_bomb(
            Vec2::new(x as f32, BOMB_SPAWN_Y),
            Vec2::new(vx as f32, BOMB_FALL_SPEED),
        );
        log::info!("Bomb #{} spawned at x={}", self.bombs.len(), x);
        id
    }

    pub(crate) fn add_bomb(&mut self, pos: Vec2, vel: Vec2) -> BodyId {
        let id = self.world.add(
            Layer::Bombs,
            Body::dynamic(pos, self.bomb_size)
                .with_bounce(Vec2::ONE)
                .with_velocity(vel)
                .with_world_bounds(),
        );
        self.bombs.push(id);
        id
    }
}

fn score_label(score: u32) -> String {
    format!("Score: {score}")
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::assets::AssetManifest;
    use crate::assets::testing::standard_source;

    pub fn standard_assets() -> SceneAssets {
        let mut cache = AssetCache::new();
        cache
            .load_manifest(&AssetManifest::default(), &standard_source())
            .expect("standard assets");
        SceneAssets::from_cache(&cache).expect("scene assets")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::standard_assets;
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session(seed: u64) -> (Session, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let session = Session::new(
            &standard_assets(),
            Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            GRAVITY,
            &mut rng,
        );
        (session, rng)
    }

    fn collect_all(session: &mut Session, rng: &mut Pcg32) {
        let stars: Vec<_> = session.stars.iter().map(|s| s.body).collect();
        let player = session.player;
        for star in stars {
            session.on_collect_star(rng, player, star);
        }
    }

    #[test]
    fn test_initial_layout() {
        let (s, _) = session(1);

        assert_eq!(s.score, 0);
        assert!(!s.is_over);
        assert_eq!(s.platforms.len(), 4);
        assert_eq!(s.stars.len(), STAR_COUNT);
        assert_eq!(s.active_stars(), STAR_COUNT);
        assert!(s.bombs.is_empty());
        assert_eq!(s.player_body().pos, Vec2::new(100.0, 450.0));
        assert_eq!(s.player_body().size(), Vec2::new(32.0, 48.0));
        assert_eq!(s.player_body().bounce, Vec2::splat(0.2));
        assert!(s.player_body().collide_world_bounds);
        assert_eq!(s.score_text.text, "Score: 0");
        assert!(!s.restart_prompt.visible);
        assert_eq!(s.player_anim.current(), AnimKey::Turn);
    }

    #[test]
    fn test_platform_layout() {
        let (s, _) = session(1);
        let floor = &s.world[s.platforms[0]];
        assert_eq!(floor.pos, Vec2::new(400.0, 568.0));
        assert_eq!(floor.size(), Vec2::new(800.0, 64.0));
        assert!(floor.immovable);
        assert!(!floor.allow_gravity);

        let ledge = &s.world[s.platforms[3]];
        assert_eq!(ledge.pos, Vec2::new(750.0, 220.0));
        assert_eq!(ledge.size(), Vec2::new(400.0, 32.0));
    }

    #[test]
    fn test_star_grid_and_bounce() {
        let (s, _) = session(7);
        for (i, star) in s.stars.iter().enumerate() {
            let body = &s.world[star.body];
            assert_eq!(star.origin_x, 12.0 + 70.0 * i as f32);
            assert_eq!(body.pos, Vec2::new(star.origin_x, 0.0));
            assert_eq!(body.bounce.x, 0.0);
            assert!((0.1..=0.5).contains(&body.bounce.y));
        }
    }

    #[test]
    fn test_collect_star_scores_once() {
        let (mut s, mut rng) = session(3);
        let star = s.stars[4].body;
        let player = s.player;

        s.on_collect_star(&mut rng, player, star);
        assert_eq!(s.score, 10);
        assert_eq!(s.score_text.text, "Score: 10");
        assert!(!s.world[star].enabled);
        assert!(!s.world[star].visible);
        assert_eq!(s.active_stars(), 11);

        s.on_collect_star(&mut rng, player, star);
        assert_eq!(s.score, 10);
        assert_eq!(s.active_stars(), 11);
    }

    #[test]
    fn test_collect_all_refills_and_spawns_one_bomb() {
        let (mut s, mut rng) = session(11);
        let bounces: Vec<f32> = s.stars.iter().map(|st| s.world[st.body].bounce.y).collect();
        // Let the stars fall a bit so the refill has something to reset
        for _ in 0..30 {
            s.world.step(SIM_DT);
        }

        collect_all(&mut s, &mut rng);

        assert_eq!(s.score, 120);
        assert_eq!(s.score_text.text, "Score: 120");
        assert_eq!(s.active_stars(), 12);
        assert_eq!(s.bombs.len(), 1);
        for (star, bounce) in s.stars.iter().zip(bounces) {
            let body = &s.world[star.body];
            assert_eq!(body.pos, Vec2::new(star.origin_x, 0.0));
            assert_eq!(body.vel, Vec2::ZERO);
            assert!(body.visible);
            assert_eq!(body.bounce.y, bounce);
        }
    }

    #[test]
    fn test_bomb_spawn_properties() {
        let (mut s, mut rng) = session(5);
        collect_all(&mut s, &mut rng);

        let bomb = &s.world[s.bombs[0]];
        // Player starts at x=100, so the bomb lands on the right half
        assert!((400.0..800.0).contains(&bomb.pos.x));
        assert_eq!(bomb.pos.y, 16.0);
        assert_eq!(bomb.bounce, Vec2::ONE);
        assert_eq!(bomb.vel.y, 20.0);
        assert!((-200.0..=200.0).contains(&bomb.vel.x));
        assert_eq!(bomb.vel.x.fract(), 0.0);
        assert!(bomb.collide_world_bounds);
        assert_eq!(bomb.size(), Vec2::splat(14.0));
    }

    #[test]
    fn test_bomb_spawns_left_when_player_is_right() {
        let (mut s, mut rng) = session(5);
        let player = s.player;
        s.world[player].pos.x = 650.0;
        collect_all(&mut s, &mut rng);

        let bomb = &s.world[s.bombs[0]];
        assert!((0.0..400.0).contains(&bomb.pos.x));
    }

    #[test]
    fn test_second_refill_adds_second_bomb() {
        let (mut s, mut rng) = session(9);
        collect_all(&mut s, &mut rng);
        collect_all(&mut s, &mut rng);
        assert_eq!(s.score, 240);
        assert_eq!(s.bombs.len(), 2);
        assert_eq!(s.active_stars(), 12);
    }

    #[test]
    fn test_hit_bomb_ends_session() {
        let (mut s, mut rng) = session(2);
        collect_all(&mut s, &mut rng);
        let (player, bomb) = (s.player, s.bombs[0]);

        s.player_anim.play(AnimKey::Right);
        s.on_hit_bomb(player, bomb);

        assert!(s.is_over);
        assert!(s.world.is_paused());
        assert_eq!(s.player_tint, Some(HIT_TINT));
        assert_eq!(s.player_anim.current(), AnimKey::Turn);
        assert!(s.restart_prompt.visible);
    }

    #[test]
    fn test_dispatch_routes_events() {
        let (mut s, mut rng) = session(4);
        let player = s.player;
        let star = s.stars[0].body;
        let bomb = s.add_bomb(Vec2::new(300.0, 300.0), Vec2::ZERO);

        s.dispatch(
            &[
                Contact {
                    event: SceneEvent::CollectStar,
                    a: player,
                    b: star,
                },
                Contact {
                    event: SceneEvent::HitBomb,
                    a: player,
                    b: bomb,
                },
            ],
            &mut rng,
        );
        assert_eq!(s.score, 10);
        assert!(s.is_over);
    }

    #[test]
    fn test_missing_frames_rejected() {
        use crate::assets::testing::png;
        use crate::assets::{AssetManifest, MemorySource};

        let mut source = MemorySource::new();
        source.insert("assets/sky.png", png(800, 600));
        source.insert("assets/platform.png", png(400, 32));
        source.insert("assets/star.png", png(24, 22));
        source.insert("assets/bomb.png", png(14, 14));
        // Only 4 frames
        source.insert("assets/dude.png", png(128, 48));

        let mut cache = AssetCache::new();
        cache.load_manifest(&AssetManifest::default(), &source).unwrap();
        let err = SceneAssets::from_cache(&cache).unwrap_err();
        assert!(matches!(
            err,
            AssetError::MissingFrame {
                frame: 8,
                available: 4,
                ..
            }
        ));
    }
}
