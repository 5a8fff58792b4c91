//! One resolution run: load → resolve stage → select backends → validate.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use crate::database::select_database;
use crate::error::{BootstrapError, ConfigSourceError, SelectionError};
use crate::raw::RawSettings;
use crate::resolved::ResolvedConfig;
use crate::stage::{resolve_stage, DeploymentStage};
use crate::state::select_state;
use crate::storage::select_storage;
use crate::transport::select_transport;
use crate::validate::{validate, SelectedBackends};

/// Where a run currently is. `Ready` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    Loaded,
    StageResolved,
    BackendsSelected,
    Validated,
    Ready,
    Rejected,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Rejected)
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Loaded),
            Self::Loaded => Some(Self::StageResolved),
            Self::StageResolved => Some(Self::BackendsSelected),
            Self::BackendsSelected => Some(Self::Validated),
            Self::Validated => Some(Self::Ready),
            Self::Ready | Self::Rejected => None,
        }
    }

    /// Forward by exactly one step, or into `Rejected` from any non-terminal phase.
    pub fn can_advance_to(self, to: Phase) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Rejected || self.next() == Some(to)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Loaded => "loaded",
            Self::StageResolved => "stage_resolved",
            Self::BackendsSelected => "backends_selected",
            Self::Validated => "validated",
            Self::Ready => "ready",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Drives a run through its phases and records the path taken.
#[derive(Debug, Clone)]
pub struct Pipeline {
    phase: Phase,
    history: Vec<Phase>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            phase: Phase::Init,
            history: vec![Phase::Init],
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    fn advance(&mut self, to: Phase) {
        debug_assert!(
            self.phase.can_advance_to(to),
            "illegal phase transition {} -> {}",
            self.phase,
            to
        );
        debug!(from = %self.phase, to = %to, "Bootstrap phase");
        self.phase = to;
        self.history.push(to);
    }

    fn reject<E>(&mut self, err: E) -> E {
        self.advance(Phase::Rejected);
        err
    }

    /// Builds the raw settings from `lookup` and an optional override file. A source error
    /// leaves the run in `Init`.
    pub fn load<F>(
        &mut self,
        lookup: F,
        override_file: Option<&Path>,
    ) -> Result<RawSettings, ConfigSourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.restart_if_finished();
        let raw = RawSettings::load(lookup, override_file)?;
        self.advance(Phase::Loaded);
        Ok(raw)
    }

    /// Resolves already loaded settings. Selector errors go straight to `Rejected` without
    /// policy validation.
    pub fn resolve(&mut self, raw: &RawSettings) -> Result<ResolvedConfig, BootstrapError> {
        self.restart_if_finished();
        if self.phase == Phase::Init {
            self.advance(Phase::Loaded);
        }

        let (stage, policy) = resolve_stage(raw);
        self.advance(Phase::StageResolved);

        let selected = match select_backends(raw, stage) {
            Ok(selected) => selected,
            Err(err) => return Err(self.reject(err.into())),
        };
        self.advance(Phase::BackendsSelected);

        match validate(raw, stage, policy, selected) {
            Ok(config) => {
                self.advance(Phase::Validated);
                self.advance(Phase::Ready);
                info!(
                    stage = %config.stage,
                    database = config.database.kind(),
                    storage = %config.storage.kind(),
                    transport = config.transport.kind(),
                    state = config.state.kind(),
                    "Configuration resolved"
                );
                Ok(config)
            }
            Err(failures) => {
                self.advance(Phase::Validated);
                Err(self.reject(BootstrapError::Rejected(failures)))
            }
        }
    }

    fn restart_if_finished(&mut self) {
        if self.phase.is_terminal() {
            *self = Self::new();
        }
    }
}

/// Runs the three selectors in order; the first malformed input aborts.
pub fn select_backends(
    raw: &RawSettings,
    stage: DeploymentStage,
) -> Result<SelectedBackends, SelectionError> {
    let database = select_database(raw, stage)?;
    let storage = select_storage(raw, stage)?;
    let transport = select_transport(raw, stage);
    let state = select_state(raw, stage);
    Ok(SelectedBackends {
        database,
        storage,
        transport,
        state,
    })
}

/// Resolves `raw` in a fresh pipeline. Pure: the same settings always give equal results.
pub fn resolve(raw: &RawSettings) -> Result<ResolvedConfig, BootstrapError> {
    Pipeline::new().resolve(raw)
}

/// Loads from the process environment (plus optional override file) and resolves.
pub fn resolve_from_env(override_file: Option<&Path>) -> Result<ResolvedConfig, BootstrapError> {
    let mut pipeline = Pipeline::new();
    let raw = pipeline.load(|key| std::env::var(key).ok(), override_file)?;
    pipeline.resolve(&raw)
}
