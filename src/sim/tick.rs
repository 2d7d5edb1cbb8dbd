//! Fixed timestep simulation tick
//!
//! One frame of live gameplay: physics first, then the contact callbacks,
//! then player input against the freshly updated contact flags.

use rand::Rng;

use super::anim::AnimKey;
use super::state::Session;
use crate::consts::*;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Run left (held)
    pub left: bool,
    /// Run right (held)
    pub right: bool,
    /// Jump (held; only acts while grounded)
    pub up: bool,
    /// Restart after game over (edge: set for one tick per press)
    pub restart: bool,
}

/// Advance a live session by one fixed timestep
pub fn tick<R: Rng>(session: &mut Session, input: &TickInput, dt: f32, rng: &mut R) {
    if session.is_over {
        return;
    }

    let contacts = session.world.step(dt);
    session.dispatch(&contacts, rng);
    if session.is_over {
        return;
    }

    let (vx, anim) = if input.left {
        (-PLAYER_SPEED, AnimKey::Left)
    } else if input.right {
        (PLAYER_SPEED, AnimKey::Right)
    } else {
        (0.0, AnimKey::Turn)
    };

    let player = session.player;
    let body = &mut session.world[player];
    body.vel.x = vx;
    if input.up && body.on_floor() {
        body.vel.y = JUMP_VELOCITY;
    }

    match anim {
        AnimKey::Turn => session.player_anim.play(AnimKey::Turn),
        running => session.player_anim.play_if_different(running),
    }
    session.player_anim.advance(dt);
}
