//! Actors: the closed set of moving things in a level
//!
//! Every actor has an id, a position and a per-kind fixed size. `update`
//! computes the actor's next-tick replacement from the pre-tick state;
//! `collide` is the reaction when the actor overlaps the player.

use super::Vector;
use super::collision::{move_horizontal, move_vertical};
use super::level::Tile;
use super::state::{GameEvent, State, Status};
use super::tick::TickInput;
use crate::consts::*;

const PLAYER_SIZE: Vector = Vector::new(0.8, 1.5);
const MONSTER_SIZE: Vector = Vector::new(0.8, 1.5);
const LAVA_SIZE: Vector = Vector::new(1.0, 1.0);
const COIN_SIZE: Vector = Vector::new(0.6, 0.6);

/// The player character
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub speed: Vector,
    /// Facing left (rendering only)
    pub flipped: bool,
}

impl Player {
    /// Player standing on the cell at `cell`
    pub fn spawn(id: u32, cell: Vector) -> Actor {
        Actor {
            id,
            pos: cell + Vector::new(0.0, -0.5),
            kind: ActorKind::Player(Player {
                speed: Vector::ZERO,
                flipped: false,
            }),
        }
    }
}

/// A walking enemy that chases the player when it can see them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Monster {
    pub speed: Vector,
    pub flipped: bool,
}

impl Monster {
    pub fn spawn(id: u32, cell: Vector) -> Actor {
        Actor {
            id,
            pos: cell + Vector::new(0.0, -0.5),
            kind: ActorKind::Monster(Monster {
                speed: Vector::ZERO,
                flipped: false,
            }),
        }
    }
}

/// Moving lava: shuttles back and forth, or drips and resets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lava {
    pub speed: Vector,
    /// Dripping lava returns here when it hits a wall
    pub reset: Option<Vector>,
}

impl Lava {
    pub fn spawn(id: u32, cell: Vector, speed: Vector, dripping: bool) -> Actor {
        Actor {
            id,
            pos: cell,
            kind: ActorKind::Lava(Lava {
                speed,
                reset: dripping.then_some(cell),
            }),
        }
    }
}

/// A collectible coin bobbing around its base position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coin {
    pub base_pos: Vector,
    /// Bob phase (radians)
    pub wobble: f32,
}

impl Coin {
    pub fn spawn(id: u32, cell: Vector, wobble: f32) -> Actor {
        let base_pos = cell + Vector::new(0.2, 0.1);
        Actor {
            id,
            pos: base_pos,
            kind: ActorKind::Coin(Coin { base_pos, wobble }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActorKind {
    Player(Player),
    Monster(Monster),
    Lava(Lava),
    Coin(Coin),
}

/// An actor instance within a state snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actor {
    /// Stable for the lifetime of a level attempt, unique within a level
    pub id: u32,
    pub pos: Vector,
    pub kind: ActorKind,
}

impl Actor {
    pub fn size(&self) -> Vector {
        match self.kind {
            ActorKind::Player(_) => PLAYER_SIZE,
            ActorKind::Monster(_) => MONSTER_SIZE,
            ActorKind::Lava(_) => LAVA_SIZE,
            ActorKind::Coin(_) => COIN_SIZE,
        }
    }

    /// Current velocity (coins are always zero)
    pub fn speed(&self) -> Vector {
        match self.kind {
            ActorKind::Player(p) => p.speed,
            ActorKind::Monster(m) => m.speed,
            ActorKind::Lava(l) => l.speed,
            ActorKind::Coin(_) => Vector::ZERO,
        }
    }

    /// Facing left, for the actors that have a facing
    pub fn flipped(&self) -> bool {
        match self.kind {
            ActorKind::Player(p) => p.flipped,
            ActorKind::Monster(m) => m.flipped,
            ActorKind::Lava(_) | ActorKind::Coin(_) => false,
        }
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player(_))
    }

    /// Bottom edge y coordinate
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size().y
    }

    /// Compute this actor's replacement for the next tick.
    ///
    /// `state` is the pre-tick snapshot; nothing in it is modified. Sound
    /// triggers are appended to `events`.
    pub fn update(
        &self,
        dt: f32,
        state: &State,
        input: &TickInput,
        events: &mut Vec<GameEvent>,
    ) -> Actor {
        match self.kind {
            ActorKind::Player(player) => self.update_player(player, dt, state, input, events),
            ActorKind::Monster(monster) => self.update_monster(monster, dt, state),
            ActorKind::Lava(lava) => self.update_lava(lava, dt, state),
            ActorKind::Coin(coin) => self.update_coin(coin, dt),
        }
    }

    /// Reaction to overlapping the player. The player itself has none.
    pub fn collide(&self, state: State) -> State {
        match self.kind {
            ActorKind::Player(_) => state,
            ActorKind::Lava(_) => state.with_status(Status::Lost),
            ActorKind::Monster(_) => {
                let Some(player) = state.player() else {
                    return state;
                };
                if (player.bottom() - self.pos.y).abs() <= SQUASH_TOLERANCE {
                    log::debug!("Monster {} squashed", self.id);
                    state.without_actor(self.id)
                } else {
                    state.with_status(Status::Lost)
                }
            }
            ActorKind::Coin(_) => {
                let mut state = state.without_actor(self.id);
                state.collected_coins += 1;
                state.events.push(GameEvent::CoinCollected);
                log::debug!(
                    "Coin {} collected ({}/{})",
                    self.id,
                    state.collected_coins,
                    state.level.total_coins()
                );
                if state.collected_coins == state.level.total_coins() {
                    state.status = Status::Won;
                }
                state
            }
        }
    }

    fn update_player(
        &self,
        player: Player,
        dt: f32,
        state: &State,
        input: &TickInput,
        events: &mut Vec<GameEvent>,
    ) -> Actor {
        let size = self.size();
        // Right wins when both are held
        let x_speed = if input.right {
            PLAYER_WALK_SPEED
        } else if input.left {
            -PLAYER_WALK_SPEED
        } else {
            0.0
        };

        let pos = move_horizontal(&state.level, self.pos, size, x_speed, dt);
        let vertical = move_vertical(
            &state.level,
            pos,
            size,
            player.speed.y,
            dt,
            input.up,
            PLAYER_JUMP_SPEED,
        );
        if vertical.jumped {
            events.push(GameEvent::Jump);
        }

        Actor {
            id: self.id,
            pos: vertical.pos,
            kind: ActorKind::Player(Player {
                speed: Vector::new(x_speed, vertical.y_speed),
                flipped: facing(player.flipped, x_speed),
            }),
        }
    }

    fn update_monster(&self, monster: Monster, dt: f32, state: &State) -> Actor {
        let size = self.size();
        let (spotted, dist) = match state.player() {
            Some(player) => {
                let dist = player.pos - self.pos;
                let spotted =
                    dist.x.abs() > 0.5 && dist.x.abs() < 10.0 && dist.y > -5.0 && dist.y < 4.0;
                (spotted, dist)
            }
            None => (false, Vector::ZERO),
        };

        let x_speed = match (spotted, dist.x > 0.0) {
            (false, _) => 0.0,
            (true, true) => MONSTER_WALK_SPEED,
            (true, false) => -MONSTER_WALK_SPEED,
        };
        let pos = move_horizontal(&state.level, self.pos, size, x_speed, dt);

        // Headroom: the monster's own top row and the row above it
        let col = pos.x.floor() as i32;
        let row = pos.y.floor() as i32;
        let blocked = (row - 1..=row).any(|y| state.level.tile_at(col, y) == Tile::Wall);
        let jump = !blocked && spotted && dist.y < 0.0;

        let vertical = move_vertical(
            &state.level,
            pos,
            size,
            monster.speed.y,
            dt,
            jump,
            MONSTER_JUMP_SPEED,
        );

        Actor {
            id: self.id,
            pos: vertical.pos,
            kind: ActorKind::Monster(Monster {
                speed: Vector::new(x_speed, vertical.y_speed),
                flipped: facing(monster.flipped, x_speed),
            }),
        }
    }

    fn update_lava(&self, lava: Lava, dt: f32, state: &State) -> Actor {
        let moved = self.pos + lava.speed * dt;
        let (pos, speed) = if state.level.touches(moved, LAVA_SIZE, Tile::Wall).is_none() {
            (moved, lava.speed)
        } else if let Some(reset) = lava.reset {
            (reset, lava.speed)
        } else {
            (self.pos, lava.speed * -1.0)
        };

        Actor {
            id: self.id,
            pos,
            kind: ActorKind::Lava(Lava {
                speed,
                reset: lava.reset,
            }),
        }
    }

    fn update_coin(&self, coin: Coin, dt: f32) -> Actor {
        let wobble = coin.wobble + COIN_WOBBLE_SPEED * dt;
        let bob = wobble.sin() * COIN_WOBBLE_DIST;
        Actor {
            id: self.id,
            pos: coin.base_pos + Vector::new(0.0, bob),
            kind: ActorKind::Coin(Coin {
                base_pos: coin.base_pos,
                wobble,
            }),
        }
    }
}

/// New facing for a horizontal speed; unchanged when standing still
fn facing(flipped: bool, x_speed: f32) -> bool {
    if x_speed != 0.0 { x_speed < 0.0 } else { flipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Level;
    use std::rc::Rc;

    const DT: f32 = 0.02;

    fn start(plan: &str) -> State {
        State::start(Rc::new(Level::parse_seeded(plan, 0).unwrap()))
    }

    fn find(state: &State, id: u32) -> Actor {
        *state.actors().iter().find(|a| a.id == id).unwrap()
    }

    fn step(state: &State, actor: &Actor, input: TickInput) -> (Actor, Vec<GameEvent>) {
        let mut events = Vec::new();
        let next = actor.update(DT, state, &input, &mut events);
        (next, events)
    }

    #[test]
    fn test_player_walks_and_faces() {
        let state = start("......\n..@...\n######");
        let player = *state.player().unwrap();

        let left = TickInput {
            left: true,
            ..Default::default()
        };
        let (moved, _) = step(&state, &player, left);
        assert!(moved.pos.x < player.pos.x);
        assert!(moved.flipped());
        assert_eq!(moved.speed().x, -PLAYER_WALK_SPEED);

        // Standing still keeps the facing
        let still_state = State::from_actors(&state, vec![moved]);
        let (idle, _) = step(&still_state, &moved, TickInput::default());
        assert!(idle.flipped());
        assert_eq!(idle.speed().x, 0.0);
    }

    #[test]
    fn test_right_overrides_left() {
        let state = start("......\n..@...\n######");
        let player = *state.player().unwrap();
        let both = TickInput {
            left: true,
            right: true,
            up: false,
        };
        let (moved, _) = step(&state, &player, both);
        assert!(moved.pos.x > player.pos.x);
        assert!(!moved.flipped());
    }

    #[test]
    fn test_player_jump_emits_event() {
        let state = start("......\n..@...\n######");
        let player = *state.player().unwrap();
        let up = TickInput {
            up: true,
            ..Default::default()
        };
        let (jumped, events) = step(&state, &player, up);
        assert_eq!(jumped.speed().y, -PLAYER_JUMP_SPEED);
        assert_eq!(events, vec![GameEvent::Jump]);
    }

    #[test]
    fn test_horizontal_block_keeps_attempted_speed() {
        let state = start("#.....\n#@....\n######");
        let player = *state.player().unwrap();
        let left = TickInput {
            left: true,
            ..Default::default()
        };
        let (moved, _) = step(&state, &player, left);
        assert_eq!(moved.pos.x, 1.0);
        assert_eq!(moved.speed().x, -PLAYER_WALK_SPEED);
    }

    #[test]
    fn test_monster_chases_visible_player() {
        let state = start("..........\n.@.....m..\n##########");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert!(moved.pos.x < monster.pos.x);
        assert!(moved.flipped());
    }

    #[test]
    fn test_monster_ignores_distant_player() {
        let state = start("..............\n@............m\n##############");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert_eq!(moved.pos.x, monster.pos.x);
    }

    #[test]
    fn test_monster_jumps_toward_player_above() {
        let state = start(".........\n.@.......\n.##......\n.......m.\n#########");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert_eq!(moved.speed().y, -MONSTER_JUMP_SPEED);
    }

    #[test]
    fn test_monster_jump_blocked_by_low_ceiling() {
        let state = start(".........\n.@....#..\n.##......\n.......m.\n#########");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert_eq!(moved.speed().y, 0.0);
    }

    #[test]
    fn test_monster_jump_blocked_by_grid_top() {
        // Same layout one row lower has headroom and jumps
        let state = start(".........\n@........\n.......m.\n#########");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert_eq!(moved.speed().y, -MONSTER_JUMP_SPEED);

        let state = start("@........\n.......m.\n#########");
        let monster = state.actors()[1];
        let (moved, _) = step(&state, &monster, TickInput::default());
        assert_eq!(moved.speed().y, 0.0);
        assert_eq!(moved.pos.y, monster.pos.y);
    }

    #[test]
    fn test_monster_squashed_from_above() {
        let state = start("......\n.@.m..\n######");
        let monster = find(&state, 2);
        let mut player = *state.player().unwrap();
        player.pos = Vector::new(monster.pos.x, monster.pos.y - 1.2);
        let state = State::from_actors(&state, vec![player, monster]);

        let next = monster.collide(state);
        assert_eq!(next.status, Status::Playing);
        assert_eq!(next.actors().len(), 1);
        assert!(next.actors()[0].is_player());
    }

    #[test]
    fn test_monster_from_side_kills() {
        let state = start("......\n.@m...\n######");
        let monster = find(&state, 2);
        let next = monster.collide(state);
        assert_eq!(next.status, Status::Lost);
        assert_eq!(next.actors().len(), 2);
    }

    #[test]
    fn test_shuttle_lava_bounces() {
        let state = start("#...=#\n@.....\n######");
        let lava = find(&state, 1);
        let (bounced, _) = step(&state, &lava, TickInput::default());
        assert_eq!(bounced.pos, lava.pos);
        assert_eq!(bounced.speed(), Vector::new(-4.0, 0.0));
    }

    #[test]
    fn test_dripping_lava_resets() {
        let state = start("..v...\n@.....\n######");
        let mut drip = find(&state, 1);
        let spawn = drip.pos;
        drip.pos = Vector::new(2.0, 0.95);
        let state = State::from_actors(&state, vec![*state.player().unwrap(), drip]);

        let (reset, _) = step(&state, &drip, TickInput::default());
        assert_eq!(reset.pos, spawn);
        assert_eq!(reset.speed(), Vector::new(0.0, 5.0));
    }

    #[test]
    fn test_coin_bobs_around_base() {
        let state = start("$.\n@.\n##");
        let coin = find(&state, 1);
        let ActorKind::Coin(c) = coin.kind else {
            panic!("expected coin");
        };
        let (next, _) = step(&state, &coin, TickInput::default());
        let expected = c.base_pos.y + (c.wobble + COIN_WOBBLE_SPEED * DT).sin() * COIN_WOBBLE_DIST;
        assert!((next.pos.y - expected).abs() < 1e-6);
        assert_eq!(next.pos.x, c.base_pos.x);
    }

    #[test]
    fn test_coin_collect_wins_on_last() {
        let state = start("$$\n@.\n##");
        let first = find(&state, 1);
        let second = find(&state, 2);

        let state = first.collide(state);
        assert_eq!(state.collected_coins, 1);
        assert_eq!(state.status, Status::Playing);
        assert_eq!(state.events, vec![GameEvent::CoinCollected]);

        let state = second.collide(state);
        assert_eq!(state.collected_coins, 2);
        assert_eq!(state.status, Status::Won);
        assert_eq!(state.actors().len(), 1);
    }
}
