//! Axis-separated movement against wall tiles, and actor overlap
//!
//! Movement is resolved one axis at a time by sweeping the leading edge: only
//! the columns (or rows) the move newly enters can stop it, and a blocked
//! move settles flush against the first wall it meets. Walls an actor already
//! overlaps, such as a ceiling above a spawn point, never trap it in place.

use std::ops::Range;

use super::Vector;
use super::actor::Actor;
use super::level::{Level, Tile};
use crate::consts::GRAVITY;

/// Edges this close to a grid line count as touching it, not crossing it
const EDGE_EPSILON: f32 = 1e-4;

/// Result of a vertical move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VerticalMove {
    pub pos: Vector,
    pub y_speed: f32,
    /// Blocked while falling with jump held, so the speed became a jump impulse
    pub jumped: bool,
}

/// Grid lines covered by the extent `[start, start + len)`
fn span(start: f32, len: f32) -> Range<i32> {
    (start + EDGE_EPSILON).floor() as i32..(start + len - EDGE_EPSILON).ceil() as i32
}

/// Cells entered when the leading edge moves from `from` to `to`, in the
/// order they are met
fn entered(from: f32, to: f32) -> Box<dyn Iterator<Item = i32>> {
    if to > from {
        let first = (from - EDGE_EPSILON).ceil() as i32;
        let last = (to - EDGE_EPSILON).ceil() as i32;
        Box::new(first..last)
    } else {
        let first = (from + EDGE_EPSILON).floor() as i32;
        let last = (to + EDGE_EPSILON).floor() as i32;
        Box::new((last..first).rev())
    }
}

fn is_wall(level: &Level, x: i32, y: i32) -> bool {
    level.tile_at(x, y) == Tile::Wall
}

/// Keep `candidate` unless it would push an actor that started clear of walls
/// into one
fn settle(level: &Level, pos: Vector, size: Vector, candidate: Vector) -> Vector {
    let start_clear = level.touches(pos, size, Tile::Wall).is_none();
    if start_clear && level.touches(candidate, size, Tile::Wall).is_some() {
        pos
    } else {
        candidate
    }
}

/// Move horizontally by `x_speed * dt`, stopping flush against walls.
///
/// Rows in which the actor already overlaps a wall do not block, so an actor
/// wedged under a ceiling can still walk out.
pub fn move_horizontal(level: &Level, pos: Vector, size: Vector, x_speed: f32, dt: f32) -> Vector {
    let dx = x_speed * dt;
    if dx == 0.0 {
        return pos;
    }

    let columns = span(pos.x, size.x);
    let rows: Vec<i32> = span(pos.y, size.y)
        .filter(|&y| !columns.clone().any(|x| is_wall(level, x, y)))
        .collect();
    let blocks = |x: i32| rows.iter().any(|&y| is_wall(level, x, y));

    let moved = pos + Vector::new(dx, 0.0);
    let candidate = if dx > 0.0 {
        match entered(pos.x + size.x, moved.x + size.x).find(|&x| blocks(x)) {
            Some(x) => Vector::new(x as f32 - size.x, pos.y),
            None => moved,
        }
    } else {
        match entered(pos.x, moved.x).find(|&x| blocks(x)) {
            Some(x) => Vector::new(x as f32 + 1.0, pos.y),
            None => moved,
        }
    };
    settle(level, pos, size, candidate)
}

/// Apply gravity and move vertically, landing flush on floors and ceilings.
///
/// If the move is blocked while falling and `jump` is set, the actor stays put
/// and its speed becomes `-jump_speed`. An actor whose top row is already
/// inside a wall cannot rise, so it never jumps.
pub fn move_vertical(
    level: &Level,
    pos: Vector,
    size: Vector,
    y_speed: f32,
    dt: f32,
    jump: bool,
    jump_speed: f32,
) -> VerticalMove {
    let y_speed = y_speed + GRAVITY * dt;
    let moved = pos + Vector::new(0.0, y_speed * dt);

    let columns = span(pos.x, size.x);
    let blocks = |y: i32| columns.clone().any(|x| is_wall(level, x, y));
    let top = span(pos.y, size.y).start;
    let wedged = blocks(top);

    let falling = y_speed > 0.0;
    let blocked_at = if falling {
        entered(pos.y + size.y, moved.y + size.y).find(|&y| blocks(y))
    } else if wedged {
        Some(top)
    } else {
        entered(pos.y, moved.y).find(|&y| blocks(y))
    };

    let Some(row) = blocked_at else {
        return VerticalMove {
            pos: moved,
            y_speed,
            jumped: false,
        };
    };

    if jump && falling && !wedged {
        return VerticalMove {
            pos,
            y_speed: -jump_speed,
            jumped: true,
        };
    }

    let flush_y = if falling {
        row as f32 - size.y
    } else {
        (row as f32 + 1.0).min(pos.y)
    };
    VerticalMove {
        pos: settle(level, pos, size, Vector::new(pos.x, flush_y)),
        y_speed: 0.0,
        jumped: false,
    }
}

/// Axis-aligned overlap test, inclusive of touching edges
pub fn overlap(a: &Actor, b: &Actor) -> bool {
    let (a_size, b_size) = (a.size(), b.size());
    a.pos.x + a_size.x >= b.pos.x
        && b.pos.x + b_size.x >= a.pos.x
        && a.pos.y + a_size.y >= b.pos.y
        && b.pos.y + b_size.y >= a.pos.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::actor::{Coin, Lava, Player};
    use proptest::prelude::*;

    const SIZE: Vector = Vector::new(0.8, 1.5);

    fn corridor() -> Level {
        Level::parse_seeded(
            "#......#
             #@.....#
             #......#
             ########",
            0,
        )
        .unwrap()
    }

    fn assert_clear(level: &Level, pos: Vector) {
        assert!(
            level.touches(pos, SIZE, Tile::Wall).is_none(),
            "{pos:?} penetrates a wall"
        );
    }

    #[test]
    fn test_free_horizontal_move() {
        let level = corridor();
        let pos = move_horizontal(&level, Vector::new(3.0, 1.0), SIZE, 7.0, 0.1);
        assert!((pos.x - 3.7).abs() < 1e-5);
    }

    #[test]
    fn test_horizontal_stops_flush_against_wall() {
        let level = corridor();
        // Right wall at x = 7
        let pos = move_horizontal(&level, Vector::new(6.0, 1.0), SIZE, 7.0, 0.1);
        assert!((pos.x - 6.2).abs() < 1e-5);
        assert_clear(&level, pos);

        // Left wall at x = 0
        let pos = move_horizontal(&level, Vector::new(1.2, 1.0), SIZE, -7.0, 0.1);
        assert!((pos.x - 1.0).abs() < 1e-5);
        assert_clear(&level, pos);
    }

    #[test]
    fn test_fall_lands_flush_on_floor() {
        let level = corridor();
        // Floor at y = 3, so a resting player sits at y = 1.5
        let m = move_vertical(&level, Vector::new(3.0, 1.4), SIZE, 10.0, 0.1, false, 17.0);
        assert_eq!(m.y_speed, 0.0);
        assert!(!m.jumped);
        assert!((m.pos.y - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_blocked_fall_with_jump_becomes_jump() {
        let level = corridor();
        let start = Vector::new(3.0, 1.5);
        let m = move_vertical(&level, start, SIZE, 0.0, 0.02, true, 17.0);
        assert!(m.jumped);
        assert_eq!(m.y_speed, -17.0);
        assert_eq!(m.pos, start);
    }

    #[test]
    fn test_ceiling_bump_stops_rise() {
        let level = Level::parse_seeded("####\n#@.#\n#..#\n#..#\n####", 0).unwrap();
        let m = move_vertical(&level, Vector::new(1.0, 1.1), SIZE, -17.0, 0.02, false, 17.0);
        assert_eq!(m.y_speed, 0.0);
        assert!((m.pos.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_wedged_actor_cannot_rise_or_jump() {
        let level = Level::parse_seeded("#####\n#@..#\n#####", 0).unwrap();
        let start = Vector::new(1.0, 0.5);

        let m = move_vertical(&level, start, SIZE, 0.0, 0.02, true, 17.0);
        assert!(!m.jumped);
        assert_eq!(m.pos, start);

        let m = move_vertical(&level, start, SIZE, -17.0, 0.02, false, 17.0);
        assert_eq!(m.pos, start);
        assert_eq!(m.y_speed, 0.0);

        // The ceiling row it is stuck in does not stop a sideways move
        let pos = move_horizontal(&level, start, SIZE, 7.0, 0.1);
        assert!((pos.x - 1.7).abs() < 1e-5);
    }

    #[test]
    fn test_overlap_is_edge_inclusive() {
        let player = Player::spawn(1, Vector::new(0.0, 0.5));
        let touching = Lava::spawn(2, Vector::new(0.8, 0.0), Vector::ZERO, false);
        let apart = Coin::spawn(3, Vector::new(1.0, 0.0), 0.0);
        assert!(overlap(&player, &touching));
        assert!(!overlap(&player, &apart));
    }

    proptest! {
        #[test]
        fn prop_moves_never_penetrate_walls(
            x in 1.0f32..6.2,
            y in 0.0f32..1.5,
            vx in -20.0f32..20.0,
            vy in -30.0f32..30.0,
            dt in 0.001f32..0.1,
        ) {
            let level = corridor();
            let start = Vector::new(x, y);
            prop_assume!(level.touches(start, SIZE, Tile::Wall).is_none());

            let pos = move_horizontal(&level, start, SIZE, vx, dt);
            prop_assert!(level.touches(pos, SIZE, Tile::Wall).is_none());

            let m = move_vertical(&level, pos, SIZE, vy, dt, false, 17.0);
            prop_assert!(level.touches(m.pos, SIZE, Tile::Wall).is_none());
        }
    }
}
