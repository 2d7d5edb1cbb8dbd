//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected RNG only
//! - Stable iteration order (bodies in creation order)
//! - No rendering or platform dependencies

pub mod anim;
pub mod physics;
pub mod scene;
pub mod state;
pub mod tick;

pub use anim::{AnimKey, AnimationClip, Animator};
pub use physics::{Body, BodyId, BodyKind, Contact, PhysicsWorld, Sides};
pub use scene::{GameScene, SceneError, ScenePhase};
pub use state::{HIT_TINT, Layer, SceneAssets, SceneEvent, Session, Star, TextElement};
pub use tick::{TickInput, tick};
