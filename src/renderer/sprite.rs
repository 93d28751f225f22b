//! Sprite selection
//!
//! Sprite sheets are horizontal strips. Character sheets hold eight walk
//! frames followed by a standing frame and an airborne frame.

use crate::sim::{Actor, ActorKind, Status, Tile};

/// Number of walk cycle frames in a character sheet
pub const WALK_FRAMES: u32 = 8;
/// Character standing still
pub const IDLE_FRAME: u32 = 8;
/// Character jumping or falling
pub const AIR_FRAME: u32 = 9;
/// Walk cycle frame duration (ms)
pub const WALK_FRAME_MS: f64 = 60.0;

/// Which sprite strip to draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sheet {
    /// Walls, lava and coins
    Background,
    Player,
    Monster,
}

/// A frame of a sprite sheet, optionally mirrored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub sheet: Sheet,
    pub frame: u32,
    pub flipped: bool,
}

impl Sprite {
    const fn background(frame: u32) -> Self {
        Self {
            sheet: Sheet::Background,
            frame,
            flipped: false,
        }
    }
}

/// Sprite for a terrain tile; empty tiles draw nothing
pub fn tile_sprite(tile: Tile) -> Option<Sprite> {
    match tile {
        Tile::Empty => None,
        Tile::Wall => Some(Sprite::background(0)),
        Tile::Lava => Some(Sprite::background(1)),
    }
}

/// Sprite for an actor at host time `time_ms`
pub fn actor_sprite(actor: &Actor, time_ms: f64) -> Sprite {
    let sheet = match actor.kind {
        ActorKind::Player(_) => Sheet::Player,
        ActorKind::Monster(_) => Sheet::Monster,
        ActorKind::Lava(_) => return Sprite::background(1),
        ActorKind::Coin(_) => return Sprite::background(2),
    };

    let speed = actor.speed();
    let frame = if speed.y != 0.0 {
        AIR_FRAME
    } else if speed.x != 0.0 {
        ((time_ms / WALK_FRAME_MS).floor() as u64 % WALK_FRAMES as u64) as u32
    } else {
        IDLE_FRAME
    };

    Sprite {
        sheet,
        frame,
        flipped: actor.flipped(),
    }
}

/// Sky colour (RGBA) for the attempt's status
pub fn background_color(status: Status) -> [f32; 4] {
    match status {
        Status::Playing => [52.0 / 255.0, 166.0 / 255.0, 251.0 / 255.0, 1.0],
        Status::Won => [68.0 / 255.0, 191.0 / 255.0, 1.0, 1.0],
        Status::Lost => [44.0 / 255.0, 136.0 / 255.0, 214.0 / 255.0, 1.0],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Coin, Lava, Monster, Player, Vector};

    fn with_speed(mut actor: Actor, speed: Vector, flipped: bool) -> Actor {
        match &mut actor.kind {
            ActorKind::Player(p) => {
                p.speed = speed;
                p.flipped = flipped;
            }
            ActorKind::Monster(m) => {
                m.speed = speed;
                m.flipped = flipped;
            }
            _ => {}
        }
        actor
    }

    #[test]
    fn test_character_frames() {
        let player = Player::spawn(1, Vector::ZERO);
        assert_eq!(actor_sprite(&player, 0.0).frame, IDLE_FRAME);

        let falling = with_speed(player, Vector::new(7.0, 3.0), false);
        assert_eq!(actor_sprite(&falling, 0.0).frame, AIR_FRAME);

        let walking = with_speed(player, Vector::new(-7.0, 0.0), true);
        let sprite = actor_sprite(&walking, 130.0);
        assert_eq!(sprite.frame, 2);
        assert!(sprite.flipped);
        assert_eq!(sprite.sheet, Sheet::Player);
        // Cycle wraps after eight frames
        assert_eq!(actor_sprite(&walking, 130.0 + 8.0 * WALK_FRAME_MS).frame, 2);
    }

    #[test]
    fn test_monster_uses_own_sheet() {
        let monster = with_speed(Monster::spawn(1, Vector::ZERO), Vector::new(5.0, 0.0), false);
        let sprite = actor_sprite(&monster, 0.0);
        assert_eq!(sprite.sheet, Sheet::Monster);
        assert!(!sprite.flipped);
    }

    #[test]
    fn test_background_sprites() {
        let lava = Lava::spawn(1, Vector::ZERO, Vector::new(4.0, 0.0), false);
        let coin = Coin::spawn(2, Vector::ZERO, 0.0);
        assert_eq!(actor_sprite(&lava, 0.0), tile_sprite(Tile::Lava).unwrap());
        assert_eq!(actor_sprite(&coin, 0.0).frame, 2);
        assert_eq!(tile_sprite(Tile::Empty), None);
    }

    #[test]
    fn test_background_color_by_status() {
        assert_ne!(
            background_color(Status::Won),
            background_color(Status::Lost)
        );
        assert_eq!(background_color(Status::Playing)[3], 1.0);
    }
}
