//! Sprite animation clips and playback
//!
//! Clips are lists of spritesheet frame indices. The animator holds the
//! clips registered for one sprite and steps through the current one.

use std::collections::HashMap;

/// Animation clips the player sprite uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimKey {
    /// Running left
    Left,
    /// Facing the camera (idle)
    Turn,
    /// Running right
    Right,
}

/// A single animation sequence
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    /// Spritesheet frame indices
    pub frames: Vec<u32>,
    /// Seconds per frame
    pub frame_duration: f32,
    pub looping: bool,
}

impl AnimationClip {
    /// Consecutive frames `start..=end`
    pub fn range(start: u32, end: u32, fps: f32, looping: bool) -> Self {
        Self {
            frames: (start..=end).collect(),
            frame_duration: 1.0 / fps,
            looping,
        }
    }

    /// A one-frame clip
    pub fn single(frame: u32, fps: f32) -> Self {
        Self::range(frame, frame, fps, false)
    }

    /// Highest frame index the clip touches
    pub fn max_frame(&self) -> Option<u32> {
        self.frames.iter().copied().max()
    }
}

/// The player's clip set: left 0-3 @10fps looping, turn 4 @20fps, right 5-8 @10fps looping
pub fn player_clips() -> HashMap<AnimKey, AnimationClip> {
    HashMap::from([
        (AnimKey::Left, AnimationClip::range(0, 3, 10.0, true)),
        (AnimKey::Turn, AnimationClip::single(4, 20.0)),
        (AnimKey::Right, AnimationClip::range(5, 8, 10.0, true)),
    ])
}

/// Playback state for one sprite
#[derive(Debug, Clone)]
pub struct Animator {
    clips: HashMap<AnimKey, AnimationClip>,
    current: AnimKey,
    frame_index: usize,
    frame_timer: f32,
    playing: bool,
}

impl Animator {
    /// Start on `initial` (which should be one of `clips`)
    pub fn new(clips: HashMap<AnimKey, AnimationClip>, initial: AnimKey) -> Self {
        Self {
            clips,
            current: initial,
            frame_index: 0,
            frame_timer: 0.0,
            playing: true,
        }
    }

    /// Play a clip from its first frame
    pub fn play(&mut self, key: AnimKey) {
        if self.clips.contains_key(&key) {
            self.current = key;
            self.frame_index = 0;
            self.frame_timer = 0.0;
            self.playing = true;
        }
    }

    /// Play a clip unless it is already the current one
    pub fn play_if_different(&mut self, key: AnimKey) {
        if self.current != key {
            self.play(key);
        }
    }

    pub fn current(&self) -> AnimKey {
        self.current
    }

    /// Spritesheet frame to draw
    pub fn current_frame(&self) -> Option<u32> {
        self.clips
            .get(&self.current)
            .and_then(|clip| clip.frames.get(self.frame_index).copied())
    }

    /// Highest frame index across all clips
    pub fn max_frame(&self) -> Option<u32> {
        self.clips.values().filter_map(AnimationClip::max_frame).max()
    }

    /// Advance by `dt` seconds. Returns true if the frame changed.
    pub fn advance(&mut self, dt: f32) -> bool {
        if !self.playing {
            return false;
        }
        let Some(clip) = self.clips.get(&self.current) else {
            return false;
        };
        if clip.frames.is_empty() {
            return false;
        }

        self.frame_timer += dt;
        let mut changed = false;
        while self.frame_timer >= clip.frame_duration {
            self.frame_timer -= clip.frame_duration;
            if self.frame_index + 1 >= clip.frames.len() {
                if clip.looping {
                    self.frame_index = 0;
                    changed |= clip.frames.len() > 1;
                } else {
                    self.playing = false;
                    break;
                }
            } else {
                self.frame_index += 1;
                changed = true;
            }
        }
        changed
    }
}
