//! Selection state of one dashboard session.
//!
//! The chart legends and the overview-table checkboxes edit the same visible
//! agent set; charts only ever read it. State changes go through the named
//! intents below and never trigger a re-fetch or a re-shape.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::api::{AgentId, FilterTag, UnknownAgent};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardViewModel {
    visible_agents: BTreeSet<AgentId>,
    popular_only: bool,
    bounds_visible: bool,
}

impl Default for DashboardViewModel {
    fn default() -> Self {
        Self {
            visible_agents: AgentId::DEFAULT_VISIBLE.into_iter().collect(),
            popular_only: false,
            bounds_visible: false,
        }
    }
}

impl DashboardViewModel {
    /// Build from request parameters; anything not given keeps its default.
    ///
    /// `agents` is a comma separated list (`"codex,human"`). An empty list
    /// hides every agent.
    pub fn from_params(
        agents: Option<&str>,
        popular: Option<bool>,
        bounds: Option<bool>,
    ) -> Result<Self, UnknownAgent> {
        let mut vm = Self::default();
        if let Some(list) = agents {
            vm.visible_agents = list
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::parse::<AgentId>)
                .collect::<Result<_, _>>()?;
        }
        if let Some(popular) = popular {
            vm.set_popularity_filter(popular);
        }
        if let Some(bounds) = bounds {
            vm.set_bounds_visible(bounds);
        }
        Ok(vm)
    }

    /// Legend click.
    pub fn toggle_agent(&mut self, agent: AgentId) {
        if !self.visible_agents.remove(&agent) {
            self.visible_agents.insert(agent);
        }
    }

    /// Overview-table checkbox.
    pub fn set_agent_visible(&mut self, agent: AgentId, visible: bool) {
        if visible {
            self.visible_agents.insert(agent);
        } else {
            self.visible_agents.remove(&agent);
        }
    }

    pub fn set_popularity_filter(&mut self, popular_only: bool) {
        self.popular_only = popular_only;
    }

    pub fn set_bounds_visible(&mut self, visible: bool) {
        self.bounds_visible = visible;
    }

    pub fn is_visible(&self, agent: AgentId) -> bool {
        self.visible_agents.contains(&agent)
    }

    /// Visible agents in agent order.
    pub fn visible_agents(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.visible_agents.iter().copied()
    }

    pub fn popular_only(&self) -> bool {
        self.popular_only
    }

    pub fn bounds_visible(&self) -> bool {
        self.bounds_visible
    }

    /// Filter tag selecting the bucket list to render.
    pub fn filter_choice(&self) -> FilterTag {
        if self.popular_only {
            FilterTag::popular()
        } else {
            FilterTag::all()
        }
    }
}
