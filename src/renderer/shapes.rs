//! Shape generation for 2D primitives
//!
//! `build_frame` turns a session into one flat triangle list. Draw order is
//! back to front: sky, platforms, stars, bombs, player, debug outlines.

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::{Body, BodyKind, SceneAssets, Session};

/// Segments used for round sprites
const CIRCLE_SEGMENTS: u32 = 16;
/// Width of physics debug outlines (pixels)
const DEBUG_LINE: f32 = 1.0;
/// Frames at or below this index face left; the next one faces the camera
const TURN_FRAME: u32 = 4;

/// Build every vertex for one frame of a live or finished session
pub fn build_frame(session: &Session, layout: &SceneAssets, debug: bool) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(512);

    vertices.extend(gradient_rect(
        layout.sky * 0.5,
        layout.sky,
        colors::SKY,
        colors::SKY_HORIZON,
    ));

    for &id in &session.platforms {
        let body = &session.world[id];
        if body.visible {
            vertices.extend(rect(body.pos, body.size(), colors::GROUND));
        }
    }

    for star in &session.stars {
        let body = &session.world[star.body];
        if body.visible {
            vertices.extend(diamond(body.pos, body.size(), colors::STAR));
        }
    }

    for &id in &session.bombs {
        let body = &session.world[id];
        if body.visible {
            let radius = body.half.x.min(body.half.y);
            vertices.extend(circle(body.pos, radius, colors::BOMB, CIRCLE_SEGMENTS));
        }
    }

    let player = session.player_body();
    if player.visible {
        let color = session.player_tint.unwrap_or(colors::PLAYER);
        vertices.extend(rect(player.pos, player.size(), color));
        vertices.extend(player_eyes(player, session.player_anim.current_frame()));
    }

    if debug {
        for body in session.world.bodies().filter(|b| b.enabled) {
            vertices.extend(debug_outline(body));
        }
    }

    vertices
}

/// Eyes show which way the sprite faces: one on the leading side while
/// running, two while facing the camera
fn player_eyes(player: &Body, frame: Option<u32>) -> Vec<Vertex> {
    let eye = Vec2::splat(player.half.x * 0.25);
    let y = player.min().y + player.size().y * 0.25;
    let offset = player.half.x * 0.45;

    let xs: &[f32] = match frame {
        Some(f) if f < TURN_FRAME => &[-offset],
        Some(f) if f > TURN_FRAME => &[offset],
        _ => &[-offset * 0.6, offset * 0.6],
    };

    xs.iter()
        .flat_map(|dx| rect(Vec2::new(player.pos.x + dx, y), eye, colors::PLAYER_EYE))
        .collect()
}

fn debug_outline(body: &Body) -> Vec<Vertex> {
    let color = match body.kind {
        BodyKind::Static => colors::DEBUG_STATIC,
        BodyKind::Dynamic if body.blocked.any() || body.touching.any() => colors::DEBUG_BLOCKED,
        BodyKind::Dynamic => colors::DEBUG_DYNAMIC,
    };
    rect_outline(body.pos, body.size(), DEBUG_LINE, color)
}

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    gradient_rect(center, size, color, color)
}

/// Filled rectangle blending from `top` to `bottom`
pub fn gradient_rect(center: Vec2, size: Vec2, top: [f32; 4], bottom: [f32; 4]) -> Vec<Vertex> {
    let min = center - size * 0.5;
    let max = center + size * 0.5;

    vec![
        Vertex::new(min.x, min.y, top),
        Vertex::new(max.x, min.y, top),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(min.x, max.y, bottom),
        Vertex::new(max.x, min.y, top),
        Vertex::new(max.x, max.y, bottom),
    ]
}

/// Generate vertices for a rectangle outline drawn inside its bounds
pub fn rect_outline(center: Vec2, size: Vec2, thickness: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = size * 0.5;
    let t = thickness.min(half.x).min(half.y);

    let mut vertices = Vec::with_capacity(24);
    // Top and bottom edges span the full width
    vertices.extend(rect(
        Vec2::new(center.x, center.y - half.y + t * 0.5),
        Vec2::new(size.x, t),
        color,
    ));
    vertices.extend(rect(
        Vec2::new(center.x, center.y + half.y - t * 0.5),
        Vec2::new(size.x, t),
        color,
    ));
    // Side edges fill the gap between them
    let side = Vec2::new(t, (size.y - 2.0 * t).max(0.0));
    vertices.extend(rect(
        Vec2::new(center.x - half.x + t * 0.5, center.y),
        side,
        color,
    ));
    vertices.extend(rect(
        Vec2::new(center.x + half.x - t * 0.5, center.y),
        side,
        color,
    ));
    vertices
}

/// Generate vertices for a diamond inscribed in a rectangle
pub fn diamond(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let half = size * 0.5;
    let top = Vec2::new(center.x, center.y - half.y);
    let bottom = Vec2::new(center.x, center.y + half.y);
    let left = Vec2::new(center.x - half.x, center.y);
    let right = Vec2::new(center.x + half.x, center.y);

    vec![
        Vertex::new(top.x, top.y, color),
        Vertex::new(right.x, right.y, color),
        Vertex::new(left.x, left.y, color),
        Vertex::new(left.x, left.y, color),
        Vertex::new(right.x, right.y, color),
        Vertex::new(bottom.x, bottom.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::HIT_TINT;
    use crate::sim::state::testing::standard_assets;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn session() -> (Session, SceneAssets) {
        let assets = standard_assets();
        let mut rng = Pcg32::seed_from_u64(3);
        let session = Session::new(
            &assets,
            Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
            GRAVITY,
            &mut rng,
        );
        (session, assets)
    }

    fn count_color(vertices: &[Vertex], color: [f32; 4]) -> usize {
        vertices.iter().filter(|v| v.color == color).count()
    }

    #[test]
    fn test_rect_covers_bounds() {
        let verts = rect(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0), colors::GROUND);
        assert_eq!(verts.len(), 6);
        let xs: Vec<f32> = verts.iter().map(|v| v.position[0]).collect();
        let ys: Vec<f32> = verts.iter().map(|v| v.position[1]).collect();
        assert_eq!(xs.iter().cloned().fold(f32::MAX, f32::min), 8.0);
        assert_eq!(xs.iter().cloned().fold(f32::MIN, f32::max), 12.0);
        assert_eq!(ys.iter().cloned().fold(f32::MAX, f32::min), 17.0);
        assert_eq!(ys.iter().cloned().fold(f32::MIN, f32::max), 23.0);
    }

    #[test]
    fn test_frame_contents() {
        let (s, assets) = session();
        let verts = build_frame(&s, &assets, false);

        assert_eq!(count_color(&verts, colors::GROUND), 4 * 6);
        assert_eq!(count_color(&verts, colors::STAR), STAR_COUNT * 6);
        assert_eq!(count_color(&verts, colors::BOMB), 0);
        assert_eq!(count_color(&verts, colors::PLAYER), 6);
        // Spawned facing the camera
        assert_eq!(count_color(&verts, colors::PLAYER_EYE), 2 * 6);
    }

    #[test]
    fn test_hidden_stars_and_bombs() {
        let (mut s, assets) = session();
        let star = s.stars[0].body;
        s.world[star].disable(true);
        s.add_bomb(Vec2::new(400.0, 100.0), Vec2::ZERO);

        let verts = build_frame(&s, &assets, false);
        assert_eq!(count_color(&verts, colors::STAR), (STAR_COUNT - 1) * 6);
        assert_eq!(
            count_color(&verts, colors::BOMB),
            (CIRCLE_SEGMENTS * 3) as usize
        );
    }

    #[test]
    fn test_player_tinted_on_game_over() {
        let (mut s, assets) = session();
        s.player_tint = Some(HIT_TINT);

        let verts = build_frame(&s, &assets, false);
        assert_eq!(count_color(&verts, colors::PLAYER), 0);
        assert_eq!(count_color(&verts, HIT_TINT), 6);
    }

    #[test]
    fn test_eyes_follow_facing() {
        let (s, _) = session();
        let player = s.player_body();

        let left = player_eyes(player, Some(1));
        let right = player_eyes(player, Some(6));
        assert_eq!(left.len(), 6);
        assert_eq!(right.len(), 6);
        assert!(left[0].position[0] < player.pos.x);
        assert!(right[0].position[0] > player.pos.x);
    }

    #[test]
    fn test_debug_outlines_every_enabled_body() {
        let (s, assets) = session();
        let plain = build_frame(&s, &assets, false).len();
        let debug = build_frame(&s, &assets, true).len();

        let enabled = s.world.bodies().filter(|b| b.enabled).count();
        assert_eq!(debug - plain, enabled * 24);
    }
}
