//! Lifecycle vocabulary shared by hosts and capability modules.
//!
//! The set of events is fixed. A module advertises which hooks it handles
//! instead of being probed for methods at dispatch time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Host lifecycle events forwarded to capability modules.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    Connected,
    Disconnected,
    WillUpdate,
    Update,
    FirstUpdated,
    Updated,
}

impl LifecycleEvent {
    pub const ALL: [LifecycleEvent; 6] = [
        Self::Connected,
        Self::Disconnected,
        Self::WillUpdate,
        Self::Update,
        Self::FirstUpdated,
        Self::Updated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::WillUpdate => "will_update",
            Self::Update => "update",
            Self::FirstUpdated => "first_updated",
            Self::Updated => "updated",
        }
    }
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LifecycleEvent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|event| event.as_str() == s)
            .ok_or_else(|| format!("unknown lifecycle event: '{s}'"))
    }
}

/// Where a hook runs relative to the host's own handling of an event.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HookPhase {
    Before,
    On,
    After,
}

/// A single dispatchable hook: an event in a phase.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Hook {
    pub event: LifecycleEvent,
    pub phase: HookPhase,
}

impl Hook {
    pub const fn before(event: LifecycleEvent) -> Self {
        Self {
            event,
            phase: HookPhase::Before,
        }
    }

    pub const fn on(event: LifecycleEvent) -> Self {
        Self {
            event,
            phase: HookPhase::On,
        }
    }

    pub const fn after(event: LifecycleEvent) -> Self {
        Self {
            event,
            phase: HookPhase::After,
        }
    }
}

impl From<LifecycleEvent> for Hook {
    fn from(event: LifecycleEvent) -> Self {
        Self::on(event)
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.phase {
            HookPhase::Before => write!(f, "before:{}", self.event),
            HookPhase::On => write!(f, "{}", self.event),
            HookPhase::After => write!(f, "after:{}", self.event),
        }
    }
}

impl FromStr for Hook {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some(("before", event)) => Ok(Self::before(event.parse()?)),
            Some(("after", event)) => Ok(Self::after(event.parse()?)),
            Some((phase, _)) => Err(format!("unknown hook phase: '{phase}'")),
            None => Ok(Self::on(s.parse()?)),
        }
    }
}
