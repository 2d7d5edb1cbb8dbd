//! Arcade physics
//!
//! Axis-aligned boxes with gravity, world-bound clamping and bounce. Bodies
//! belong to a group; colliders pair two groups and either separate them
//! (solid) or just detect them (overlap). Colliders carrying an event tag
//! report a [`Contact`] for every touching pair; the caller dispatches them
//! after the step, so callbacks never run while the world is borrowed.

use std::ops::{Index, IndexMut};

use glam::Vec2;

/// Small tolerance when deciding which axis two boxes came together on
const SEPARATION_EPSILON: f32 = 1e-3;

/// Handle to a body (index into the world's body list)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u32);

/// Per-side contact flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Sides {
    pub fn any(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// Never moves, never integrates
    Static,
    /// Integrated every step
    Dynamic,
}

/// A physics body. `pos` is the box center.
#[derive(Debug, Clone)]
pub struct Body {
    id: BodyId,
    pub kind: BodyKind,
    pub pos: Vec2,
    pub half: Vec2,
    pub vel: Vec2,
    /// Fraction of velocity kept (and reversed) on impact, per axis
    pub bounce: Vec2,
    pub allow_gravity: bool,
    pub immovable: bool,
    pub collide_world_bounds: bool,
    /// Disabled bodies neither move nor collide
    pub enabled: bool,
    pub visible: bool,
    /// Sides in contact with another body this step
    pub touching: Sides,
    /// Sides pressed against the world bounds this step
    pub blocked: Sides,
    prev: Vec2,
}

impl Body {
    fn new(kind: BodyKind, pos: Vec2, size: Vec2) -> Self {
        Self {
            id: BodyId(0),
            kind,
            pos,
            half: size * 0.5,
            vel: Vec2::ZERO,
            bounce: Vec2::ZERO,
            allow_gravity: kind == BodyKind::Dynamic,
            immovable: kind == BodyKind::Static,
            collide_world_bounds: false,
            enabled: true,
            visible: true,
            touching: Sides::default(),
            blocked: Sides::default(),
            prev: pos,
        }
    }

    /// A static, immovable, gravity-free body
    pub fn fixed(pos: Vec2, size: Vec2) -> Self {
        Self::new(BodyKind::Static, pos, size)
    }

    /// A dynamic body affected by gravity
    pub fn dynamic(pos: Vec2, size: Vec2) -> Self {
        Self::new(BodyKind::Dynamic, pos, size)
    }

    pub fn with_bounce(mut self, bounce: Vec2) -> Self {
        self.bounce = bounce;
        self
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn with_world_bounds(mut self) -> Self {
        self.collide_world_bounds = true;
        self
    }

    pub fn id(&self) -> BodyId {
        self.id
    }

    pub fn size(&self) -> Vec2 {
        self.half * 2.0
    }

    pub fn min(&self) -> Vec2 {
        self.pos - self.half
    }

    pub fn max(&self) -> Vec2 {
        self.pos + self.half
    }

    /// Standing on something: a solid body or the bottom world bound
    pub fn on_floor(&self) -> bool {
        self.touching.down || self.blocked.down
    }

    /// Take the body out of the simulation, optionally hiding it
    pub fn disable(&mut self, hide: bool) {
        self.enabled = false;
        if hide {
            self.visible = false;
        }
    }

    /// Put the body back into the simulation at `pos`, at rest
    pub fn enable_at(&mut self, pos: Vec2) {
        self.pos = pos;
        self.prev = pos;
        self.vel = Vec2::ZERO;
        self.touching = Sides::default();
        self.blocked = Sides::default();
        self.enabled = true;
        self.visible = true;
    }

    fn is_movable(&self) -> bool {
        self.kind == BodyKind::Dynamic && !self.immovable
    }

    fn intersects(&self, other: &Body) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x <= b_max.x && a_max.x >= b_min.x && a_min.y <= b_max.y && a_max.y >= b_min.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColliderMode {
    /// Push the bodies apart and bounce them
    Solid,
    /// Detect only
    Overlap,
}

/// A registered pairing of two groups
#[derive(Debug, Clone, Copy)]
pub struct Collider<G, E> {
    pub a: G,
    pub b: G,
    pub mode: ColliderMode,
    /// Reported for every touching pair when set
    pub event: Option<E>,
}

/// A touching pair reported by a collider with an event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact<E> {
    pub event: E,
    pub a: BodyId,
    pub b: BodyId,
}

/// The physics world: bodies, their groups, and the colliders between groups
#[derive(Debug, Clone)]
pub struct PhysicsWorld<G, E> {
    bodies: Vec<Body>,
    groups: Vec<G>,
    colliders: Vec<Collider<G, E>>,
    pub gravity: Vec2,
    /// World size; bounds run from the origin to here
    pub bounds: Vec2,
    paused: bool,
}

impl<G: Copy + PartialEq, E: Copy> PhysicsWorld<G, E> {
    pub fn new(bounds: Vec2, gravity: Vec2) -> Self {
        Self {
            bodies: Vec::new(),
            groups: Vec::new(),
            colliders: Vec::new(),
            gravity,
            bounds,
            paused: false,
        }
    }

    /// Add a body to a group
    pub fn add(&mut self, group: G, mut body: Body) -> BodyId {
        let id = BodyId(self.bodies.len() as u32);
        body.id = id;
        body.prev = body.pos;
        self.bodies.push(body);
        self.groups.push(group);
        id
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id.0 as usize)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id.0 as usize)
    }

    pub fn bodies(&self) -> impl Iterator<Item = &Body> {
        self.bodies.iter()
    }

    /// Register a solid collider (separation + bounce)
    pub fn add_collider(&mut self, a: G, b: G, event: Option<E>) {
        self.colliders.push(Collider {
            a,
            b,
            mode: ColliderMode::Solid,
            event,
        });
    }

    /// Register an overlap trigger (detection only)
    pub fn add_overlap(&mut self, a: G, b: G, event: E) {
        self.colliders.push(Collider {
            a,
            b,
            mode: ColliderMode::Overlap,
            event: Some(event),
        });
    }

    /// Freeze every body; paused worlds neither move nor report contacts
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Advance the world by `dt` and return contacts in collider order
    pub fn step(&mut self, dt: f32) -> Vec<Contact<E>> {
        if self.paused {
            return Vec::new();
        }

        let gravity = self.gravity;
        let bounds = self.bounds;
        for body in &mut self.bodies {
            body.touching = Sides::default();
            body.blocked = Sides::default();
            if !body.enabled || body.kind == BodyKind::Static {
                continue;
            }
            body.prev = body.pos;
            if body.allow_gravity {
                body.vel += gravity * dt;
            }
            body.pos += body.vel * dt;
            if body.collide_world_bounds {
                clamp_to_bounds(body, bounds);
            }
        }

        let mut contacts = Vec::new();
        for ci in 0..self.colliders.len() {
            let collider = self.colliders[ci];
            for i in 0..self.bodies.len() {
                if self.groups[i] != collider.a || !self.bodies[i].enabled {
                    continue;
                }
                for j in 0..self.bodies.len() {
                    if i == j || self.groups[j] != collider.b || !self.bodies[j].enabled {
                        continue;
                    }
                    // Within one group, visit each pair once
                    if collider.a == collider.b && j < i {
                        continue;
                    }
                    if !self.bodies[i].intersects(&self.bodies[j]) {
                        continue;
                    }
                    if collider.mode == ColliderMode::Solid {
                        let (a, b) = pair_mut(&mut self.bodies, i, j);
                        separate(a, b);
                    }
                    if let Some(event) = collider.event {
                        contacts.push(Contact {
                            event,
                            a: self.bodies[i].id,
                            b: self.bodies[j].id,
                        });
                    }
                }
            }
        }
        contacts
    }
}

impl<G, E> Index<BodyId> for PhysicsWorld<G, E> {
    type Output = Body;

    fn index(&self, id: BodyId) -> &Body {
        &self.bodies[id.0 as usize]
    }
}

impl<G, E> IndexMut<BodyId> for PhysicsWorld<G, E> {
    fn index_mut(&mut self, id: BodyId) -> &mut Body {
        &mut self.bodies[id.0 as usize]
    }
}

fn pair_mut(bodies: &mut [Body], i: usize, j: usize) -> (&mut Body, &mut Body) {
    if i < j {
        let (lo, hi) = bodies.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = bodies.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

fn clamp_to_bounds(body: &mut Body, bounds: Vec2) {
    let min = body.half;
    let max = bounds - body.half;

    if body.pos.x < min.x {
        body.pos.x = min.x;
        if body.vel.x < 0.0 {
            body.vel.x = -body.vel.x * body.bounce.x;
        }
        body.blocked.left = true;
    } else if body.pos.x > max.x {
        body.pos.x = max.x;
        if body.vel.x > 0.0 {
            body.vel.x = -body.vel.x * body.bounce.x;
        }
        body.blocked.right = true;
    }

    if body.pos.y < min.y {
        body.pos.y = min.y;
        if body.vel.y < 0.0 {
            body.vel.y = -body.vel.y * body.bounce.y;
        }
        body.blocked.up = true;
    } else if body.pos.y > max.y {
        body.pos.y = max.y;
        if body.vel.y > 0.0 {
            body.vel.y = -body.vel.y * body.bounce.y;
        }
        body.blocked.down = true;
    }
}

/// Whether two 1-D extents overlapped by more than the tolerance
fn extents_overlap(a_center: f32, a_half: f32, b_center: f32, b_half: f32) -> bool {
    (a_center - b_center).abs() < a_half + b_half - SEPARATION_EPSILON
}

/// Resolve a solid contact between two intersecting bodies
fn separate(a: &mut Body, b: &mut Body) {
    let overlap_x = a.max().x.min(b.max().x) - a.min().x.max(b.min().x);
    let overlap_y = a.max().y.min(b.max().y) - a.min().y.max(b.min().y);

    // Resolve along the axis the bodies were still apart on last step
    let was_overlapping_x = extents_overlap(a.prev.x, a.half.x, b.prev.x, b.half.x);
    let was_overlapping_y = extents_overlap(a.prev.y, a.half.y, b.prev.y, b.half.y);
    let vertical = match (was_overlapping_x, was_overlapping_y) {
        (true, false) => true,
        (false, true) => false,
        _ => overlap_y <= overlap_x,
    };
    let (a_movable, b_movable) = (a.is_movable(), b.is_movable());

    if vertical {
        let a_above = a.pos.y < b.pos.y;
        if a_above {
            a.touching.down = true;
            b.touching.up = true;
        } else {
            a.touching.up = true;
            b.touching.down = true;
        }
        // Direction `a` must move to get out
        let dir = if a_above { -1.0 } else { 1.0 };
        resolve_axis(
            &mut a.pos.y,
            &mut a.vel.y,
            a.bounce.y,
            a_movable,
            &mut b.pos.y,
            &mut b.vel.y,
            b.bounce.y,
            b_movable,
            overlap_y,
            dir,
        );
    } else {
        let a_left = a.pos.x < b.pos.x;
        if a_left {
            a.touching.right = true;
            b.touching.left = true;
        } else {
            a.touching.left = true;
            b.touching.right = true;
        }
        let dir = if a_left { -1.0 } else { 1.0 };
        resolve_axis(
            &mut a.pos.x,
            &mut a.vel.x,
            a.bounce.x,
            a_movable,
            &mut b.pos.x,
            &mut b.vel.x,
            b.bounce.x,
            b_movable,
            overlap_x,
            dir,
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn resolve_axis(
    a_pos: &mut f32,
    a_vel: &mut f32,
    a_bounce: f32,
    a_movable: bool,
    b_pos: &mut f32,
    b_vel: &mut f32,
    b_bounce: f32,
    b_movable: bool,
    overlap: f32,
    dir: f32,
) {
    let (a_share, b_share) = match (a_movable, b_movable) {
        (true, true) => (0.5, 0.5),
        (true, false) => (1.0, 0.0),
        (false, true) => (0.0, 1.0),
        (false, false) => return,
    };

    *a_pos += dir * overlap * a_share;
    *b_pos -= dir * overlap * b_share;

    // Only reflect velocity that points into the other body
    if a_movable && *a_vel * dir < 0.0 {
        *a_vel = -*a_vel * a_bounce;
    }
    if b_movable && *b_vel * dir > 0.0 {
        *b_vel = -*b_vel * b_bounce;
    }
}
