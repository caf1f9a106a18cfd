//! Player actions and where they come from.

use std::collections::VecDeque;
use std::io::BufRead;

use anyhow::Result;
use delve_game::components::Direction;
use tracing::warn;

/// One turn's worth of player intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(Direction),
    Wait,
    /// Equip the first carried item that can be equipped.
    Equip,
    /// Use the first carried consumable.
    Use,
    /// Drop the most recently picked up item.
    Drop,
    Quit,
}

impl Action {
    /// Map a key to an action. Both WASD and vi keys move.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        let action = match key.to_ascii_lowercase() {
            'w' | 'k' => Self::Move(Direction::North),
            's' | 'j' => Self::Move(Direction::South),
            'd' | 'l' => Self::Move(Direction::East),
            'a' | 'h' => Self::Move(Direction::West),
            '.' => Self::Wait,
            'e' => Self::Equip,
            'u' => Self::Use,
            'x' => Self::Drop,
            'q' => Self::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// A source of player actions. `Ok(None)` means the source is exhausted.
pub trait InputSource {
    fn next_action(&mut self) -> Result<Option<Action>>;
}

fn push_keys(queue: &mut VecDeque<Action>, keys: &str) {
    for key in keys.chars().filter(|key| !key.is_whitespace()) {
        match Action::from_key(key) {
            Some(action) => queue.push_back(action),
            None => warn!(%key, "unknown key ignored"),
        }
    }
}

/// Actions from a fixed key string, e.g. `--script dddsx`.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    actions: VecDeque<Action>,
}

impl ScriptedInput {
    #[must_use]
    pub fn new(keys: &str) -> Self {
        let mut actions = VecDeque::new();
        push_keys(&mut actions, keys);
        Self { actions }
    }
}

impl InputSource for ScriptedInput {
    fn next_action(&mut self) -> Result<Option<Action>> {
        Ok(self.actions.pop_front())
    }
}

/// Actions read line by line from a reader. Several keys on one line are
/// played over consecutive turns.
#[derive(Debug)]
pub struct LineInput<R> {
    reader: R,
    buffered: VecDeque<Action>,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffered: VecDeque::new(),
        }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn next_action(&mut self) -> Result<Option<Action>> {
        loop {
            if let Some(action) = self.buffered.pop_front() {
                return Ok(Some(action));
            }
            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            push_keys(&mut self.buffered, &line);
        }
    }
}
