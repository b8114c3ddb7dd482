//! Agent identifiers and the fixed-size per-agent mapping.
//!
//! The store labels every pull request with an author category. The set of
//! categories is closed, so they are modelled as the [`AgentId`] enum and
//! per-agent values live in an [`AgentMap`], one slot per variant. A slot that
//! is `None` means "no row for this agent", which is never the same as zero.

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

/// Author category attached to each pull request upstream.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentId {
    Human,
    Bot,
    Codex,
    Claude,
    Devin,
    Codegen,
    Copilot,
    Jules,
    Cursor,
    Tembo,
    OpenHands,
    Cosine,
}

impl AgentId {
    /// Number of known agents.
    pub const COUNT: usize = 12;

    /// All agents in declaration order. Chart series are emitted in this order.
    pub const ALL: [AgentId; Self::COUNT] = [
        AgentId::Human,
        AgentId::Bot,
        AgentId::Codex,
        AgentId::Claude,
        AgentId::Devin,
        AgentId::Codegen,
        AgentId::Copilot,
        AgentId::Jules,
        AgentId::Cursor,
        AgentId::Tembo,
        AgentId::OpenHands,
        AgentId::Cosine,
    ];

    /// Agents shown on a fresh page load.
    pub const DEFAULT_VISIBLE: [AgentId; 4] = [
        AgentId::Human,
        AgentId::Codex,
        AgentId::Jules,
        AgentId::Copilot,
    ];

    /// Identifier as stored in the `agent` column.
    pub fn as_str(self) -> &'static str {
        match self {
            AgentId::Human => "human",
            AgentId::Bot => "bot",
            AgentId::Codex => "codex",
            AgentId::Claude => "claude",
            AgentId::Devin => "devin",
            AgentId::Codegen => "codegen",
            AgentId::Copilot => "copilot",
            AgentId::Jules => "jules",
            AgentId::Cursor => "cursor",
            AgentId::Tembo => "tembo",
            AgentId::OpenHands => "openhands",
            AgentId::Cosine => "cosine",
        }
    }

    /// Human-readable label for tables and legends.
    pub fn display_name(self) -> &'static str {
        match self {
            AgentId::Human => "Human",
            AgentId::Bot => "Bot",
            AgentId::Codex => "OpenAI Codex",
            AgentId::Claude => "Claude Agent",
            AgentId::Devin => "Devin",
            AgentId::Codegen => "Codegen",
            AgentId::Copilot => "GitHub Copilot",
            AgentId::Jules => "Google Jules",
            AgentId::Cursor => "Cursor Agent",
            AgentId::Tembo => "Tembo",
            AgentId::OpenHands => "OpenHands",
            AgentId::Cosine => "Cosine",
        }
    }

    /// Slot of this agent inside an [`AgentMap`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when an agent identifier is not one of the known agents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown agent: {0}")]
pub struct UnknownAgent(pub String);

impl FromStr for AgentId {
    type Err = UnknownAgent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        AgentId::ALL
            .into_iter()
            .find(|agent| agent.as_str() == normalized)
            .ok_or_else(|| UnknownAgent(s.to_string()))
    }
}

/// Fixed-size mapping from [`AgentId`] to an optional value.
///
/// Iteration always follows [`AgentId::ALL`] order regardless of insertion
/// order. Serializes as a JSON object keyed by agent identifier with absent
/// slots omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentMap<T> {
    slots: [Option<T>; AgentId::COUNT],
}

impl<T> Default for AgentMap<T> {
    fn default() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
        }
    }
}

impl<T> AgentMap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, agent: AgentId) -> Option<&T> {
        self.slots[agent.index()].as_ref()
    }

    pub fn get_mut(&mut self, agent: AgentId) -> Option<&mut T> {
        self.slots[agent.index()].as_mut()
    }

    pub fn contains(&self, agent: AgentId) -> bool {
        self.slots[agent.index()].is_some()
    }

    /// Store `value`, returning the previous value of the slot.
    pub fn insert(&mut self, agent: AgentId, value: T) -> Option<T> {
        self.slots[agent.index()].replace(value)
    }

    /// Store `value` only if the slot is empty. Returns `true` when stored.
    pub fn insert_if_absent(&mut self, agent: AgentId, value: T) -> bool {
        let slot = &mut self.slots[agent.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(value);
        true
    }

    pub fn remove(&mut self, agent: AgentId) -> Option<T> {
        self.slots[agent.index()].take()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Present entries in agent order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &T)> + '_ {
        AgentId::ALL
            .into_iter()
            .zip(self.slots.iter())
            .filter_map(|(agent, slot)| slot.as_ref().map(|v| (agent, v)))
    }

    /// Agents that have an entry, in agent order.
    pub fn agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.iter().map(|(agent, _)| agent)
    }
}

impl<T> FromIterator<(AgentId, T)> for AgentMap<T> {
    /// Later pairs overwrite earlier ones for the same agent.
    fn from_iter<I: IntoIterator<Item = (AgentId, T)>>(iter: I) -> Self {
        let mut map = AgentMap::new();
        for (agent, value) in iter {
            map.insert(agent, value);
        }
        map
    }
}

impl<T: Serialize> Serialize for AgentMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (agent, value) in self.iter() {
            map.serialize_entry(agent.as_str(), value)?;
        }
        map.end()
    }
}

struct AgentMapVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for AgentMapVisitor<T> {
    type Value = AgentMap<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by agent identifier")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut map = AgentMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            let agent = key.parse::<AgentId>().map_err(de::Error::custom)?;
            map.insert(agent, value);
        }
        Ok(map)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for AgentMap<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(AgentMapVisitor(PhantomData))
    }
}
