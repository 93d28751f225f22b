//! Per-frame state transition
//!
//! Every actor is advanced against the same pre-tick snapshot, then the new
//! player is checked against lava terrain and against every other actor.

use super::collision::overlap;
use super::level::Tile;
use super::state::{State, Status};

/// Keys held during a tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
}

/// Advance `state` by `dt` seconds, producing the next snapshot
pub fn tick(state: &State, input: &TickInput, dt: f32) -> State {
    let mut events = Vec::new();
    let actors = state
        .actors()
        .iter()
        .map(|actor| actor.update(dt, state, input, &mut events))
        .collect();

    let mut next = State::from_actors(state, actors);
    next.events = events;

    // Finished attempts keep animating but nothing else happens
    if next.status.is_terminal() {
        return next;
    }

    let Some(player) = next.player().copied() else {
        return next;
    };

    if next
        .level
        .touches(player.pos, player.size(), Tile::Lava)
        .is_some()
    {
        log::debug!("Player touched lava terrain at {:?}", player.pos);
        return next.with_status(Status::Lost);
    }

    let colliding: Vec<_> = next
        .actors()
        .iter()
        .filter(|actor| actor.id != player.id && overlap(actor, &player))
        .copied()
        .collect();
    for actor in colliding {
        next = actor.collide(next);
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::{ActorKind, Level, Vector};
    use proptest::prelude::*;
    use std::rc::Rc;

    const DT: f32 = 0.02;

    fn start(plan: &str) -> State {
        State::start(Rc::new(Level::parse_seeded(plan, 11).unwrap()))
    }

    fn run(mut state: State, ticks: usize, input: TickInput) -> State {
        for _ in 0..ticks {
            state = tick(&state, &input, DT);
        }
        state
    }

    #[test]
    fn test_resting_player_stays_on_floor() {
        let state = start("#####\n#@..#\n#####");
        let before = *state.player().unwrap();

        let next = tick(&state, &TickInput::default(), DT);
        let player = next.player().unwrap();
        assert_eq!(next.status, Status::Playing);
        assert_eq!(player.pos, before.pos);
        assert!(player.bottom() <= 2.0);
        assert_eq!(player.speed().y, 0.0);
    }

    #[test]
    fn test_player_walks_out_from_under_low_ceiling() {
        // The room is shorter than the player, so its head starts in the ceiling
        let mut state = start("#####\n#@..#\n#####");
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        state = run(state, 50, right);
        let player = *state.player().unwrap();
        assert!((player.pos.x - 3.2).abs() < 1e-4);
        assert_eq!(player.pos.y, 0.5);
        assert_eq!(state.status, Status::Playing);

        // Wedged in the ceiling, holding up never jumps
        let up = TickInput {
            up: true,
            ..Default::default()
        };
        for _ in 0..5 {
            state = tick(&state, &up, DT);
            assert!(state.events.is_empty());
            assert_eq!(state.player().unwrap().speed().y, 0.0);
            assert_eq!(state.player().unwrap().pos, player.pos);
        }
    }

    #[test]
    fn test_player_leaves_ceiling_notch() {
        let state = start("#######\n#.#...#\n#.@...#\n#######");
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let state = run(state, 50, right);
        let player = state.player().unwrap();
        assert!((player.pos.x - 5.2).abs() < 1e-4);
        assert_eq!(player.pos.y, 1.5);
        // Clear of every wall once out of the notch
        assert!(state.level.touches(player.pos, player.size(), Tile::Wall).is_none());
    }

    #[test]
    fn test_player_falls_under_gravity() {
        let state = start("#...#\n#.@.#\n#...#\n#...#\n#####");
        let before = *state.player().unwrap();

        let next = tick(&state, &TickInput::default(), DT);
        let player = next.player().unwrap();
        let fallen = player.pos.y - before.pos.y;
        assert!((fallen - GRAVITY * DT * DT).abs() < 1e-5);
        assert!((player.speed().y - GRAVITY * DT).abs() < 1e-5);
        assert_eq!(next.status, Status::Playing);
    }

    #[test]
    fn test_falling_into_lava_loses() {
        let state = start("#...#\n#.@.#\n#...#\n#.+.#\n#####");
        let state = run(state, 100, TickInput::default());
        assert_eq!(state.status, Status::Lost);
    }

    #[test]
    fn test_single_coin_wins() {
        let state = start("#....#\n#@.$.#\n######");
        assert_eq!(state.level.total_coins(), 1);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let mut state = state;
        for _ in 0..100 {
            let next = tick(&state, &right, DT);
            if next.collected_coins == 1 {
                assert_eq!(next.status, Status::Won);
                assert_eq!(next.actors().len(), 1);
                return;
            }
            assert_eq!(next.status, Status::Playing);
            state = next;
        }
        panic!("coin never collected");
    }

    #[test]
    fn test_moving_lava_kills() {
        let state = start("#......#\n#@...=.#\n########");
        let state = run(state, 100, TickInput::default());
        assert_eq!(state.status, Status::Lost);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let state = start("#.....#\n#@.m..#\n#######").with_status(Status::Lost);
        let ids: Vec<u32> = state.actors().iter().map(|a| a.id).collect();

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let state = run(state, 50, right);
        assert_eq!(state.status, Status::Lost);
        assert_eq!(state.actors().iter().map(|a| a.id).collect::<Vec<_>>(), ids);
    }

    #[test]
    fn test_monster_stomp_and_side_hit() {
        // Player dropped right on top of a monster
        let state = start("#....#\n#....#\n#@.m.#\n######");
        let monster = state.actors()[1];
        let mut player = *state.player().unwrap();
        player.pos = Vector::new(monster.pos.x, monster.pos.y - 1.45);
        let state = State::from_actors(&state, vec![player, monster]);
        let next = tick(&state, &TickInput::default(), DT);
        assert_eq!(next.status, Status::Playing);
        assert!(next.actors().iter().all(|a| !matches!(a.kind, ActorKind::Monster(_))));

        // Walking into it instead
        let state = start("#......#\n#@..m..#\n########");
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let state = run(state, 60, right);
        assert_eq!(state.status, Status::Lost);
    }

    #[test]
    fn test_updates_are_simultaneous() {
        // Just out of the monster's sight before the tick; the player walking
        // right this tick must not be seen until the next one.
        let state = start("#............#\n#@..........m#\n##############");
        let player = *state.player().unwrap();
        let mut monster = state.actors()[1];
        monster.pos.x = player.pos.x + 10.05;
        let state = State::from_actors(&state, vec![player, monster]);

        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let next = tick(&state, &right, DT);
        assert!(next.actors()[1].pos.x - next.player().unwrap().pos.x < 10.0);
        assert_eq!(next.actors()[1].pos.x, monster.pos.x);

        let after = tick(&next, &right, DT);
        assert!(after.actors()[1].pos.x < monster.pos.x);
    }

    proptest! {
        #[test]
        fn prop_coin_tally_monotonic(moves in proptest::collection::vec(0u8..8, 1..200)) {
            let mut state = start(
                "#..........#
                 #.$..$...$.#
                 #..........#
                 #@...$..$..#
                 ############",
            );
            let total = state.level.total_coins();
            let mut last = 0;
            for m in moves {
                let input = TickInput { left: m & 1 != 0, right: m & 2 != 0, up: m & 4 != 0 };
                let next = tick(&state, &input, DT);
                prop_assert!(next.collected_coins >= last);
                prop_assert!(next.collected_coins <= total);
                if next.collected_coins == total && last < total {
                    prop_assert_eq!(next.status, Status::Won);
                }
                if next.collected_coins < total {
                    prop_assert_ne!(next.status, Status::Won);
                }
                last = next.collected_coins;
                state = next;
            }
        }
    }
}
