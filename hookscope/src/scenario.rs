//! Scenario replay
//!
//! A scenario describes a request as data: which callbacks each event has,
//! how long each one works and which events it dispatches from inside. It
//! is replayed against a [`HookRegistry`] with a [`ManualClock`], so the
//! profiler's numbers are exact and reproducible.
//!
//! ```json
//! {
//!   "events": {
//!     "render":  { "callbacks": [ { "label": "Theme::render", "priority": 10,
//!                                   "steps": [ { "work_ms": 4 }, { "dispatch": "partial" }, { "work_ms": 3 } ] } ] },
//!     "partial": { "callbacks": [ { "steps": [ { "work_ms": 3 } ] } ] }
//!   },
//!   "run": ["render"]
//! }
//! ```
//!
//! Callbacks without a `label` are registered as anonymous closures.

// Millisecond floats are converted to integer nanoseconds
#![allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::rc::Rc;

use log::{debug, info};
use serde::Deserialize;

use crate::clock::ManualClock;
use crate::dispatch::{CallbackIdentity, HookRegistry, Priority};
use crate::domain::{Duration, ScenarioError};
use crate::profiling::{Profiler, ProfilerConfig};

/// Deepest dispatch chain a scenario may describe.
pub const MAX_NESTING: usize = 64;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub name: Option<String>,
    pub events: BTreeMap<String, EventSpec>,
    /// Top-level dispatches, in order.
    pub run: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventSpec {
    #[serde(default)]
    pub callbacks: Vec<CallbackSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CallbackSpec {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_priority() -> i64 {
    match Priority::DEFAULT {
        Priority::At(n) => n,
        Priority::First | Priority::Last => 10,
    }
}

/// One thing a callback does, in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Work(WorkStep),
    Dispatch(DispatchStep),
}

/// Busy for this many milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkStep {
    pub work_ms: f64,
}

/// Dispatch another event synchronously.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DispatchStep {
    pub dispatch: String,
}

impl Scenario {
    /// Parse a scenario from JSON text.
    ///
    /// # Errors
    /// Returns `ScenarioError::ParseFailed` on malformed JSON.
    pub fn parse(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a scenario file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Check that the scenario can be replayed.
    ///
    /// # Errors
    /// Returns an error for an empty run list, references to undeclared
    /// events, or dispatch chains deeper than [`MAX_NESTING`] (which
    /// includes any cycle).
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.run.is_empty() {
            return Err(ScenarioError::EmptyRun);
        }
        for event in &self.run {
            if !self.events.contains_key(event) {
                return Err(ScenarioError::UnknownRunEvent(event.clone()));
            }
        }
        for (event, spec) in &self.events {
            for target in spec.dispatches() {
                if !self.events.contains_key(target) {
                    return Err(ScenarioError::UnknownEvent {
                        event: event.clone(),
                        target: target.to_string(),
                    });
                }
            }
        }

        let mut memo = HashMap::new();
        for event in &self.run {
            self.depth_of(event, &mut Vec::new(), &mut memo)?;
        }
        Ok(())
    }

    /// Length of the longest dispatch chain starting at `event`.
    fn depth_of<'a>(
        &'a self,
        event: &'a str,
        chain: &mut Vec<&'a str>,
        memo: &mut HashMap<&'a str, usize>,
    ) -> Result<usize, ScenarioError> {
        let root = chain.first().copied().unwrap_or(event);
        // A memoized depth still has to fit below the chain that reached it
        if let Some(&depth) = memo.get(event) {
            if chain.len() + depth > MAX_NESTING {
                return Err(too_deep(root));
            }
            return Ok(depth);
        }
        if chain.len() >= MAX_NESTING || chain.contains(&event) {
            return Err(too_deep(root));
        }

        chain.push(event);
        let mut deepest = 0;
        if let Some(spec) = self.events.get(event) {
            for target in spec.dispatches() {
                deepest = deepest.max(self.depth_of(target, chain, memo)?);
            }
        }
        chain.pop();

        memo.insert(event, deepest + 1);
        Ok(deepest + 1)
    }
}

fn too_deep(root: &str) -> ScenarioError {
    ScenarioError::NestingTooDeep { event: root.to_string(), limit: MAX_NESTING }
}

impl EventSpec {
    fn dispatches(&self) -> impl Iterator<Item = &str> {
        self.callbacks.iter().flat_map(|cb| cb.steps.iter()).filter_map(|step| match step {
            Step::Dispatch(step) => Some(step.dispatch.as_str()),
            Step::Work(_) => None,
        })
    }
}

/// A finished replay: the registry, its clock and the attached profiler.
pub struct Replay {
    pub registry: Rc<HookRegistry>,
    pub clock: Rc<ManualClock>,
    pub profiler: Profiler<HookRegistry>,
}

/// Validate `scenario`, build its registry, attach a profiler and run every
/// top-level dispatch.
///
/// # Errors
/// Returns the validation error if the scenario cannot be replayed.
pub fn replay(scenario: &Scenario, config: ProfilerConfig) -> Result<Replay, ScenarioError> {
    scenario.validate()?;

    let registry = Rc::new(HookRegistry::new());
    let clock = Rc::new(ManualClock::new());
    for (event, spec) in &scenario.events {
        for callback in &spec.callbacks {
            register(&registry, &clock, event, callback);
        }
    }

    let profiler = Profiler::attach(&registry, clock.clone(), config);
    for event in &scenario.run {
        debug!("replaying {event}");
        registry.dispatch(event, ());
    }
    info!(
        "replayed {} dispatches of {}",
        scenario.run.len(),
        scenario.name.as_deref().unwrap_or("unnamed scenario")
    );

    Ok(Replay { registry, clock, profiler })
}

fn register(
    registry: &Rc<HookRegistry>,
    clock: &Rc<ManualClock>,
    event: &str,
    spec: &CallbackSpec,
) {
    let weak = Rc::downgrade(registry);
    let clock = Rc::clone(clock);
    let steps = spec.steps.clone();
    let run = move |()| {
        for step in &steps {
            match step {
                Step::Work(step) => clock.advance(millis(step.work_ms)),
                Step::Dispatch(step) => {
                    if let Some(registry) = weak.upgrade() {
                        registry.dispatch(&step.dispatch, ());
                    }
                }
            }
        }
    };

    match &spec.label {
        Some(label) => registry.add(event, spec.priority, CallbackIdentity::from_label(label), run),
        None => {
            registry.add_anonymous(event, spec.priority, run);
        }
    }
}

fn millis(ms: f64) -> Duration {
    Duration((ms.max(0.0) * 1_000_000.0).round() as u64)
}
