//! The turn loop: read an action, step the world, show the result.

use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use anyhow::{Context, Result};
use delve_game::commands::{DropItem, Equip, UseItem};
use delve_game::components::{Consumable, Equippable, Health, Input, Inventory};
use delve_game::events::{CombatDeath, StairsReached};
use delve_game::{Maze, StandardEncounters, install, spawn};
use delve_world::{
    EntityId, Event, EventRecord, QuitHandle, StepReport, System, World, WorldConfig,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::input::{Action, InputSource};
use crate::messages::{MessageBuffer, MessageLog};
use crate::render::{render_map, status_line};

/// Priority of the driver's own systems: after every game system.
const DRIVER_PRIORITY: i32 = 100;

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Died,
    Descended { depth: u32 },
    Quit,
    OutOfTurns,
    InputClosed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Died => f.write_str("You died."),
            Self::Descended { depth } => write!(f, "You descend to depth {depth}."),
            Self::Quit => f.write_str("You leave the dungeon."),
            Self::OutOfTurns => f.write_str("Out of turns."),
            Self::InputClosed => f.write_str("Input closed."),
        }
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub outcome: Outcome,
    pub turns: u64,
    pub last_step: Option<StepReport>,
}

type Verdict = Rc<RefCell<Option<Outcome>>>;

/// Watches for the player's death or descent.
struct Referee {
    player: EntityId,
    verdict: Verdict,
}

impl System for Referee {
    fn name(&self) -> &str {
        "referee"
    }

    fn on_event(&mut self, _world: &mut World, event: &EventRecord) -> Result<()> {
        let outcome = if let Some(death) = event.downcast::<CombatDeath>() {
            (death.entity == self.player).then_some(Outcome::Died)
        } else if let Some(stairs) = event.downcast::<StairsReached>() {
            (stairs.entity == self.player).then_some(Outcome::Descended {
                depth: stairs.depth,
            })
        } else {
            None
        };
        if let Some(outcome) = outcome {
            self.verdict.borrow_mut().get_or_insert(outcome);
        }
        Ok(())
    }
}

/// Owns the world and drives it one player action at a time.
pub struct TurnLoop<W> {
    world: World,
    player: EntityId,
    input: Box<dyn InputSource>,
    messages: MessageBuffer,
    verdict: Verdict,
    out: W,
    max_turns: u64,
    turn: u64,
    last_step: Option<StepReport>,
}

impl<W: Write> TurnLoop<W> {
    /// Build a world from level text, install the game and driver systems
    /// and spawn the level at depth 1.
    ///
    /// # Errors
    ///
    /// Fails if the level text does not parse.
    pub fn new(
        level_text: &str,
        config: WorldConfig,
        input: Box<dyn InputSource>,
        out: W,
        max_turns: u64,
    ) -> Result<Self> {
        let level = Maze::parse(level_text).context("parsing level")?;

        let mut world = World::with_config(config);
        install(&mut world, StandardEncounters);
        let player = spawn::load(&mut world, level, 1)?;

        let messages = MessageBuffer::new();
        MessageLog::install(&mut world, messages.clone(), DRIVER_PRIORITY);

        let verdict = Verdict::default();
        let referee = world.add_system(
            Referee {
                player,
                verdict: Rc::clone(&verdict),
            },
            DRIVER_PRIORITY,
        );
        world.subscribe(CombatDeath::KIND, referee);
        world.subscribe(StairsReached::KIND, referee);

        Ok(Self {
            world,
            player,
            input,
            messages,
            verdict,
            out,
            max_turns,
            turn: 0,
            last_step: None,
        })
    }

    /// A handle that ends the run after the current turn.
    #[must_use]
    pub fn quit_handle(&self) -> QuitHandle {
        self.world.quit_handle()
    }

    /// Play until the player dies, descends, quits or runs out of input or
    /// turns.
    ///
    /// # Errors
    ///
    /// Fails if reading input, writing output or stepping the world fails.
    pub fn run(&mut self) -> Result<RunSummary> {
        info!(player = %self.player, max_turns = self.max_turns, "run started");
        self.draw()?;

        let outcome = loop {
            if let Some(outcome) = self.check_outcome() {
                break outcome;
            }
            let Some(action) = self.input.next_action()? else {
                break Outcome::InputClosed;
            };
            // Reading may have blocked long enough for a quit request to land.
            if self.world.is_quit_requested() {
                break Outcome::Quit;
            }
            if action == Action::Quit {
                self.world.request_quit();
                continue;
            }

            self.apply(action);
            self.turn += 1;
            let report = self
                .world
                .update(1.0)
                .with_context(|| format!("turn {}", self.turn))?;
            debug!(turn = self.turn, ?report, "turn complete");
            self.last_step = Some(report);
            self.draw()?;
        };

        info!(turns = self.turn, %outcome, "run finished");
        writeln!(self.out, "{outcome}")?;
        Ok(RunSummary {
            outcome,
            turns: self.turn,
            last_step: self.last_step.clone(),
        })
    }

    fn check_outcome(&self) -> Option<Outcome> {
        if let Some(outcome) = *self.verdict.borrow() {
            return Some(outcome);
        }
        if self
            .world
            .get_component::<Health>(self.player)
            .is_none_or(Health::is_dead)
        {
            return Some(Outcome::Died);
        }
        if self.world.is_quit_requested() {
            return Some(Outcome::Quit);
        }
        if self.max_turns > 0 && self.turn >= self.max_turns {
            return Some(Outcome::OutOfTurns);
        }
        None
    }

    /// Turn an action into the player's movement intent or a queued
    /// inventory command.
    fn apply(&mut self, action: Action) {
        let player = self.player;
        match action {
            Action::Move(direction) => {
                self.world.add_component(player, Input::toward(direction));
            }
            Action::Equip => match self.first_carried(|world, item| {
                world.has_component::<Equippable>(item)
            }) {
                Some(item) => self.world.queue_command(Equip {
                    actor: player,
                    item,
                }),
                None => self.messages.push("you have nothing to equip"),
            },
            Action::Use => match self.first_carried(|world, item| {
                world.has_component::<Consumable>(item)
            }) {
                Some(item) => self.world.queue_command(UseItem {
                    actor: player,
                    item,
                }),
                None => self.messages.push("you have nothing to use"),
            },
            Action::Drop => {
                let last = self
                    .world
                    .get_component::<Inventory>(player)
                    .and_then(|inventory| inventory.items.last().copied());
                match last {
                    Some(item) => self.world.queue_command(DropItem {
                        actor: player,
                        item,
                    }),
                    None => self.messages.push("you have nothing to drop"),
                }
            }
            Action::Wait | Action::Quit => {}
        }
    }

    fn first_carried(&self, accept: impl Fn(&World, EntityId) -> bool) -> Option<EntityId> {
        let inventory = self.world.get_component::<Inventory>(self.player)?;
        inventory
            .items
            .iter()
            .copied()
            .find(|&item| accept(&self.world, item))
    }

    fn draw(&mut self) -> Result<()> {
        write!(self.out, "{}", render_map(&self.world, self.player))?;
        writeln!(self.out, "{}", status_line(&self.world, self.player, self.turn))?;
        for line in self.messages.drain() {
            writeln!(self.out, "  {line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use delve_game::components::Position;

    use super::*;
    use crate::input::ScriptedInput;

    fn play(level: &str, keys: &str, max_turns: u64) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary = {
            let mut turn_loop = TurnLoop::new(
                level,
                WorldConfig::default(),
                Box::new(ScriptedInput::new(keys)),
                &mut out,
                max_turns,
            )
            .unwrap();
            turn_loop.run().unwrap()
        };
        (summary, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_reaching_stairs_ends_the_run() {
        let (summary, out) = play("@.>", "dd", 0);
        assert_eq!(summary.outcome, Outcome::Descended { depth: 2 });
        assert_eq!(summary.turns, 2);
        assert!(out.contains("you found the stairs down to depth 2"));
        assert!(out.ends_with("You descend to depth 2.\n"));
    }

    #[test]
    fn test_input_exhaustion_and_turn_limit() {
        let (summary, _) = play("@..", "d", 0);
        assert_eq!(summary.outcome, Outcome::InputClosed);

        let (summary, _) = play("@..", "d.d.", 2);
        assert_eq!(summary.outcome, Outcome::OutOfTurns);
        assert_eq!(summary.turns, 2);
    }

    #[test]
    fn test_quit_key() {
        let (summary, _) = play("@..", "dq", 0);
        assert_eq!(summary.outcome, Outcome::Quit);
        assert_eq!(summary.turns, 1);
    }

    #[test]
    fn test_quit_handle_stops_before_next_turn() {
        let mut out = Vec::new();
        let mut turn_loop = TurnLoop::new(
            "@..",
            WorldConfig::default(),
            Box::new(ScriptedInput::new("ddd")),
            &mut out,
            0,
        )
        .unwrap();
        turn_loop.quit_handle().request();
        let summary = turn_loop.run().unwrap();
        assert_eq!(summary.outcome, Outcome::Quit);
        assert_eq!(summary.turns, 0);
    }

    /// Input whose first read raises the quit flag, like Ctrl-C arriving
    /// while stdin is blocked.
    struct QuitWhileReading {
        quit: Rc<RefCell<Option<QuitHandle>>>,
        keys: ScriptedInput,
    }

    impl InputSource for QuitWhileReading {
        fn next_action(&mut self) -> Result<Option<Action>> {
            if let Some(quit) = self.quit.borrow_mut().take() {
                quit.request();
            }
            self.keys.next_action()
        }
    }

    #[test]
    fn test_quit_during_read_discards_the_action() {
        let quit = Rc::new(RefCell::new(None));
        let mut out = Vec::new();
        let mut turn_loop = TurnLoop::new(
            "@..",
            WorldConfig::default(),
            Box::new(QuitWhileReading {
                quit: Rc::clone(&quit),
                keys: ScriptedInput::new("dd"),
            }),
            &mut out,
            0,
        )
        .unwrap();
        let player = turn_loop.player;
        let start = turn_loop.world.get_component::<Position>(player).copied();
        *quit.borrow_mut() = Some(turn_loop.quit_handle());

        let summary = turn_loop.run().unwrap();
        assert_eq!(summary.outcome, Outcome::Quit);
        assert_eq!(summary.turns, 0);
        assert!(summary.last_step.is_none());
        assert_eq!(turn_loop.world.get_component::<Position>(player).copied(), start);
    }

    #[test]
    fn test_pick_up_equip_and_fight() {
        // Grab the sword, equip it, then walk into the goblin.
        let (summary, out) = play("@/.g", "dedd", 0);
        assert!(out.contains("you picked up the sword"));
        assert!(out.contains("you equipped the sword"));
        assert!(out.contains("goblin died"));
        assert_eq!(summary.outcome, Outcome::InputClosed);
    }

    #[test]
    fn test_player_death() {
        let mut out = Vec::new();
        let mut turn_loop = TurnLoop::new(
            "@g",
            WorldConfig::default(),
            Box::new(ScriptedInput::new("...")),
            &mut out,
            0,
        )
        .unwrap();
        let player = turn_loop.player;
        if let Some(health) = turn_loop.world.get_component_mut::<Health>(player) {
            health.current = 1;
        }
        let summary = turn_loop.run().unwrap();
        assert_eq!(summary.outcome, Outcome::Died);
        assert_eq!(summary.turns, 1);
        assert!(!turn_loop.world.contains_entity(player));
    }

    #[test]
    fn test_summary_json() {
        let (summary, _) = play("@.>", "dd", 0);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["outcome"], "descended");
        assert_eq!(json["depth"], 2);
        assert_eq!(json["turns"], 2);
        assert_eq!(json["last_step"]["tick_id"], 2);
    }
}
