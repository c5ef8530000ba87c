use tank_combat_core::{CellState, IVec2, InputAction, LevelLayout, Orientation};
use tank_combat_game::{
    latest_action_channel, EndReason, Game, GameConfig, GameError, InMemoryLevels, Presenter,
    ScriptedInput,
};
use tank_combat_world::{query, StaticMap};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Call {
    StaticLayer,
    Erase(IVec2, CellState),
    Tank(IVec2, Orientation, bool),
    Projectile(IVec2),
    Status(u32, u32),
}

#[derive(Debug, Default)]
struct Recorder {
    calls: Vec<Call>,
}

impl Presenter for Recorder {
    fn render_static_layer(&mut self, _map: &StaticMap) {
        self.calls.push(Call::StaticLayer);
    }

    fn erase_cell(&mut self, cell: IVec2, state: CellState) {
        self.calls.push(Call::Erase(cell, state));
    }

    fn draw_tank(&mut self, cell: IVec2, orientation: Orientation, is_player: bool) {
        self.calls.push(Call::Tank(cell, orientation, is_player));
    }

    fn draw_projectile(&mut self, cell: IVec2) {
        self.calls.push(Call::Projectile(cell));
    }

    fn render_status(&mut self, level: u32, health: u32) {
        self.calls.push(Call::Status(level, health));
    }
}

fn walls_except(open: &[(i32, i32, CellState)]) -> LevelLayout {
    let mut layout = LevelLayout::open();
    for y in 0..13 {
        for x in 0..13 {
            layout.set(IVec2::new(x, y), CellState::Wall);
        }
    }
    for &(x, y, state) in open {
        layout.set(IVec2::new(x, y), state);
    }
    layout
}

/// Two open cells joined by a river running down column 6, so neither tank
/// can ever move and shots fly straight between them.
fn duel_layout() -> LevelLayout {
    let mut cells = vec![(6, 2, CellState::Empty), (6, 12, CellState::Empty)];
    cells.extend((3..12).map(|y| (6, y, CellState::River)));
    walls_except(&cells)
}

fn seeded(seed: u64) -> GameConfig {
    GameConfig {
        seed: Some(seed),
        ..GameConfig::default()
    }
}

#[test]
fn aligned_enemy_shot_costs_the_player_exactly_one_health() {
    let levels = InMemoryLevels::new().with_level(1, duel_layout());
    let idle = || ScriptedInput::new(vec![None; 32]);

    let mut game = (0..64)
        .map(|seed| {
            Game::new(seeded(seed), idle(), Recorder::default(), levels.clone())
                .expect("duel level loads")
        })
        .find(|game| {
            let enemy = &query::enemies(game.world())[0];
            let player = game.player().expect("player placed").position();
            enemy.transform().next_position().x == player.x
                && (player - enemy.position()).y.signum()
                    == enemy.orientation().offset().y
        })
        .expect("some seed faces the enemy toward the player");

    let player_cell = game.player().expect("player placed").position();
    for _ in 0..10 {
        game.tick().expect("tick runs");
    }
    assert_eq!(game.player().map(|tank| tank.health()), Some(2));
    assert_eq!(query::projectiles(game.world()).len(), 10);

    game.tick().expect("tick runs");
    assert_eq!(game.player().map(|tank| tank.health()), Some(1));
    assert_eq!(query::projectiles(game.world()).len(), 10);
    assert!(query::projectile_at(game.world(), player_cell).is_none());
    assert_eq!(
        game.presenter().calls.last(),
        Some(&Call::Status(1, 1))
    );

    game.tick().expect("tick runs");
    let outcome = game.outcome().expect("session ended");
    assert_eq!(outcome.reason, EndReason::PlayerDestroyed);
    assert_eq!(outcome.player_health, 0);
    assert_eq!(outcome.ticks, 12);
}

#[test]
fn clearing_a_level_loads_the_next_with_more_enemies() {
    let corridor = walls_except(&[
        (0, 0, CellState::Empty),
        (0, 1, CellState::River),
        (0, 2, CellState::Empty),
    ]);
    let levels = InMemoryLevels::new()
        .with_level(1, corridor)
        .with_level(2, LevelLayout::open());
    let config = GameConfig {
        player_health: 10,
        ..seeded(5)
    };
    let (sender, input) = latest_action_channel();
    let mut game =
        Game::new(config, input, Recorder::default(), levels).expect("first level loads");

    let player = game.player().expect("player placed").position();
    let enemy = query::enemies(game.world())[0].position();
    let toward_enemy = if enemy.y > player.y {
        InputAction::Down
    } else {
        InputAction::Up
    };

    sender.send(toward_enemy);
    game.tick().expect("tick runs");
    assert_eq!(game.player().map(|tank| tank.position()), Some(player));
    sender.send(InputAction::Fire);
    game.tick().expect("tick runs");
    sender.send(InputAction::Fire);
    game.tick().expect("tick runs");
    assert_eq!(game.level(), 1);
    game.tick().expect("tick runs");

    assert!(game.is_running());
    assert_eq!(game.level(), 2);
    assert_eq!(query::level(game.world()), 2);
    let enemies = query::enemies(game.world());
    assert_eq!(enemies.len(), 2);
    let player = game.player().expect("player placed");
    assert_eq!(player.health(), 10);
    assert_ne!(enemies[0].position(), enemies[1].position());
    for enemy in enemies {
        assert_ne!(enemy.position(), player.position());
        assert!(query::map(game.world()).is_walkable(enemy.position()));
        assert_eq!(enemy.health(), 2);
    }
    assert_eq!(
        game.presenter()
            .calls
            .iter()
            .filter(|call| **call == Call::StaticLayer)
            .count(),
        2
    );
}

#[test]
fn missing_first_level_ends_before_any_tick() {
    let game = Game::new(
        seeded(1),
        ScriptedInput::default(),
        Recorder::default(),
        InMemoryLevels::new(),
    )
    .expect("a missing level is not an error");

    assert!(game.player().is_none());
    let outcome = game.outcome().expect("session ended");
    assert_eq!(outcome.reason, EndReason::LevelsExhausted);
    assert_eq!(outcome.ticks, 0);
    assert_eq!(game.presenter().calls, vec![Call::Status(1, 0)]);
}

#[test]
fn exit_stops_the_session_immediately() {
    let levels = InMemoryLevels::new().with_level(1, LevelLayout::open());
    let input = ScriptedInput::new([None, Some(InputAction::Exit), Some(InputAction::Fire)]);
    let mut game = Game::new(seeded(2), input, Recorder::default(), levels).expect("loads");

    let outcome = game.run_to_end().expect("session runs");
    assert_eq!(outcome.reason, EndReason::ExitRequested);
    assert_eq!(outcome.ticks, 2);
    assert_eq!(game.input().remaining(), 1);
}

#[test]
fn exhausted_script_ends_the_session() {
    let levels = InMemoryLevels::new().with_level(1, LevelLayout::open());
    let config = GameConfig {
        player_health: 10,
        enemy_health: 10,
        ..seeded(3)
    };
    let input = ScriptedInput::new([Some(InputAction::Left), None]);
    let mut game = Game::new(config, input, Recorder::default(), levels).expect("loads");

    let outcome = game.run_to_end().expect("session runs");
    assert_eq!(outcome.reason, EndReason::InputExhausted);
    assert_eq!(outcome.ticks, 2);
    assert_eq!(outcome.level, 1);
}

#[test]
fn enemy_entering_the_vacated_player_cell_stays_drawn() {
    let start = IVec2::new(5, 5);
    let enemy_start = IVec2::new(6, 5);
    let layout = walls_except(&[
        (5, 4, CellState::Empty),
        (5, 5, CellState::Empty),
        (6, 5, CellState::Empty),
    ]);
    let levels = InMemoryLevels::new().with_level(1, layout);

    let (sender, mut game) = (0..256)
        .map(|seed| {
            let (sender, input) = latest_action_channel();
            let game = Game::new(seeded(seed), input, Recorder::default(), levels.clone())
                .expect("loads");
            (sender, game)
        })
        .find(|(_, game)| {
            let enemy = &query::enemies(game.world())[0];
            game.player().map(|tank| tank.position()) == Some(start)
                && enemy.position() == enemy_start
                && enemy.orientation() != Orientation::Left
        })
        .expect("some seed puts the enemy beside the player");

    sender.send(InputAction::Up);
    game.tick().expect("tick runs");

    assert_eq!(
        game.player().map(|tank| tank.position()),
        Some(IVec2::new(5, 4))
    );
    assert_eq!(query::enemies(game.world())[0].position(), start);
    let last_at_start = game
        .presenter()
        .calls
        .iter()
        .rev()
        .find(|call| match call {
            Call::Erase(cell, _) | Call::Tank(cell, _, _) | Call::Projectile(cell) => {
                *cell == start
            }
            Call::StaticLayer | Call::Status(..) => false,
        });
    assert!(matches!(last_at_start, Some(Call::Tank(_, _, false))));
}

#[test]
fn zero_tick_interval_is_rejected() {
    let levels = InMemoryLevels::new().with_level(1, LevelLayout::open());
    let config = GameConfig {
        tick_interval_ms: 0,
        ..seeded(4)
    };
    let error = Game::new(config, ScriptedInput::default(), Recorder::default(), levels)
        .expect_err("a frozen clock would stall every cooldown");
    assert!(matches!(error, GameError::ZeroTickInterval));
}

#[test]
fn player_moves_only_onto_walkable_cells() {
    let isolated = IVec2::new(10, 10);
    let layout = walls_except(&[
        (4, 4, CellState::Empty),
        (5, 4, CellState::Empty),
        (10, 10, CellState::Empty),
    ]);
    let levels = InMemoryLevels::new().with_level(1, layout);

    let (sender, mut game) = (0..64)
        .map(|seed| {
            let (sender, input) = latest_action_channel();
            let game = Game::new(seeded(seed), input, Recorder::default(), levels.clone())
                .expect("loads");
            (sender, game)
        })
        .find(|(_, game)| query::enemies(game.world())[0].position() == isolated)
        .expect("some seed walls the enemy off");

    let start = game.player().expect("player placed").position();
    let (toward, away) = if start.x == 4 {
        (InputAction::Right, InputAction::Up)
    } else {
        (InputAction::Left, InputAction::Down)
    };

    sender.send(away);
    game.tick().expect("tick runs");
    let player = game.player().expect("player placed");
    assert_eq!(player.position(), start);
    assert_eq!(Some(player.orientation()), away.orientation());

    sender.send(toward);
    game.tick().expect("tick runs");
    let player = game.player().expect("player placed");
    assert_ne!(player.position(), start);
    assert_eq!(Some(player.orientation()), toward.orientation());
    assert!(game
        .presenter()
        .calls
        .contains(&Call::Erase(start, CellState::Empty)));
}

#[test]
fn level_without_room_is_an_error() {
    let levels = InMemoryLevels::new().with_level(1, walls_except(&[(3, 3, CellState::Empty)]));
    let error = Game::new(
        seeded(0),
        ScriptedInput::default(),
        Recorder::default(),
        levels,
    )
    .expect_err("one free cell cannot hold a player and an enemy");
    assert!(matches!(error, GameError::NoFreeCell { level: 1 }));
}

#[test]
fn advance_ticks_only_once_the_interval_elapses() {
    use std::time::Duration;

    let levels = InMemoryLevels::new().with_level(1, LevelLayout::open());
    let input = ScriptedInput::new(vec![None; 8]);
    let mut game = Game::new(seeded(6), input, Recorder::default(), levels).expect("loads");

    assert!(!game.advance(Duration::from_millis(600)).expect("advances"));
    assert_eq!(game.ticks(), 0);
    assert!(game.advance(Duration::from_millis(400)).expect("advances"));
    assert_eq!(game.ticks(), 1);
    assert!(!game.advance(Duration::from_millis(10)).expect("advances"));
}

#[test]
fn outcome_serialises_as_json() {
    let game = Game::new(
        seeded(1),
        ScriptedInput::default(),
        Recorder::default(),
        InMemoryLevels::new(),
    )
    .expect("constructs");
    let json = serde_json::to_value(game.outcome().expect("ended")).expect("serialises");
    assert_eq!(json["reason"], "levels_exhausted");
    assert_eq!(json["level"], 1);
    assert_eq!(json["ticks"], 0);
}
