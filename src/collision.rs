use crate::config::PhysicsConfig;
use crate::level::{Block, SurfaceTag};
use crate::rocket::Rocket;
use macroquad::prelude::*;

/// Distance within which a hull point still counts as touching a surface.
pub const CONTACT_SKIN: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// Index into the level's block list.
    pub block: usize,
    pub tag: SurfaceTag,
}

/// Pushes the rocket out of every block it overlaps and returns the blocks it
/// touches, one entry per block, in block order.
pub fn resolve(rocket: &mut Rocket, blocks: &[Block], physics: &PhysicsConfig) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for (index, block) in blocks.iter().enumerate() {
        let hull = rocket.hull();
        let outline = outline(&hull);
        let corners = corners(block.rect);
        let skin = expand(block.rect, CONTACT_SKIN);

        let touching = hull.iter().any(|&p| skin.contains(p))
            || corners
                .iter()
                .any(|&c| inside_outline(&outline, rocket.position, c).is_some());
        if !touching {
            continue;
        }

        // (offset from centre, push direction, depth)
        let mut hits: Vec<(Vec2, Vec2, f32)> = hull
            .iter()
            .filter_map(|&p| {
                penetration(block.rect, p).map(|(normal, depth)| (p - rocket.position, normal, depth))
            })
            .collect();
        hits.extend(corners.iter().filter_map(|&c| {
            inside_outline(&outline, rocket.position, c)
                .map(|(normal, depth)| (c - rocket.position, normal, depth))
        }));

        let deepest = hits.iter().copied().max_by(|a, b| a.2.total_cmp(&b.2));
        if let Some((_, normal, depth)) = deepest {
            // Points pushed out the same way share one impulse at their mean offset.
            let offsets: Vec<Vec2> = hits
                .iter()
                .filter(|hit| hit.1 == normal)
                .map(|hit| hit.0)
                .collect();
            let offset = offsets.iter().copied().sum::<Vec2>() / offsets.len() as f32;

            rocket.position += normal * depth;
            bounce(rocket, offset, normal, physics);
        }

        contacts.push(Contact {
            block: index,
            tag: block.tag,
        });
    }

    contacts
}

/// Hull points in winding order: nose, right shoulder, right foot, left foot,
/// left shoulder.
fn outline(hull: &[Vec2; 5]) -> [Vec2; 5] {
    [hull[0], hull[2], hull[4], hull[3], hull[1]]
}

fn corners(rect: Rect) -> [Vec2; 4] {
    [
        Vec2::new(rect.x, rect.y),
        Vec2::new(rect.right(), rect.y),
        Vec2::new(rect.right(), rect.bottom()),
        Vec2::new(rect.x, rect.bottom()),
    ]
}

/// For a point strictly inside the convex outline, the direction the rocket
/// has to move to clear it and how far.
fn inside_outline(outline: &[Vec2; 5], centre: Vec2, point: Vec2) -> Option<(Vec2, f32)> {
    let mut exit: Option<(Vec2, f32)> = None;

    for (i, &a) in outline.iter().enumerate() {
        let b = outline[(i + 1) % outline.len()];
        let mut normal = (b - a).perp().normalize_or_zero();
        if normal.dot(a - centre) < 0.0 {
            normal = -normal;
        }

        let depth = -(point - a).dot(normal);
        if depth <= 0.0 {
            return None;
        }
        if exit.map_or(true, |(_, best)| depth < best) {
            exit = Some((-normal, depth));
        }
    }

    exit
}

/// Shortest way out of `rect` for a point strictly inside it.
fn penetration(rect: Rect, point: Vec2) -> Option<(Vec2, f32)> {
    if !(point.x > rect.x && point.x < rect.right() && point.y > rect.y && point.y < rect.bottom()) {
        return None;
    }

    let exits = [
        (Vec2::new(-1.0, 0.0), point.x - rect.x),
        (Vec2::new(1.0, 0.0), rect.right() - point.x),
        (Vec2::new(0.0, -1.0), point.y - rect.y),
        (Vec2::new(0.0, 1.0), rect.bottom() - point.y),
    ];

    exits
        .into_iter()
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn bounce(rocket: &mut Rocket, offset: Vec2, normal: Vec2, physics: &PhysicsConfig) {
    let point_velocity = rocket.velocity + offset.perp() * rocket.angular_velocity;
    let approach = point_velocity.dot(normal);
    if approach >= 0.0 {
        return;
    }

    let tangent_velocity = point_velocity - normal * approach;
    let impulse = normal * (-(1.0 + physics.restitution) * approach) - tangent_velocity * physics.friction;
    rocket.apply_impulse_at(offset, impulse);
}

fn expand(rect: Rect, by: f32) -> Rect {
    Rect::new(rect.x - by, rect.y - by, rect.w + 2.0 * by, rect.h + 2.0 * by)
}

/// Turns per-frame contacts into "contact began" events.
#[derive(Debug, Default)]
pub struct ContactTracker {
    touching: Vec<usize>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the contacts that were not present on the previous frame.
    pub fn begin(&mut self, contacts: &[Contact]) -> Vec<Contact> {
        let began = contacts
            .iter()
            .filter(|c| !self.touching.contains(&c.block))
            .copied()
            .collect();
        self.touching = contacts.iter().map(|c| c.block).collect();
        began
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}
