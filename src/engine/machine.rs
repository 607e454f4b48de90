//! The fault-tolerant state machine engine.

use super::error::FtsmError;
use super::handler::{StateHandlers, StateOutcome};
use super::recovery::RecoveryCounter;
use crate::core::states::{FAILED, READY, RECOVERING};
use crate::core::{StateMachineDefinition, TransitionHistory, TransitionLabel, TransitionRecord};
use crate::snapshot::{EngineSnapshot, SnapshotError};
use chrono::Utc;
use tracing::{debug, error, info, warn};

/// Result of a single successful tick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepResult {
    /// The handler's label was followed to a new state.
    Transitioned {
        from: String,
        label: TransitionLabel,
        to: String,
    },

    /// The handler reported a failure and the engine entered recovery.
    Recovering {
        from: String,
        reason: String,
        attempt: u32,
    },
}

/// Drives one named entity through a validated state graph.
///
/// Build one with [`FtsmBuilder`](crate::builder::FtsmBuilder). Each
/// [`tick`](Self::tick) runs exactly one handler and follows the edge it
/// names. Recoverable failures are routed to the `recovering` state, bounded
/// by the recovery ceiling.
pub struct Ftsm<H> {
    name: String,
    definition: StateMachineDefinition,
    handlers: H,
    dependencies: Vec<String>,
    current: String,
    recovery: RecoveryCounter,
    history: TransitionHistory,
    terminated: bool,
}

impl<H: StateHandlers> Ftsm<H> {
    pub(crate) fn new(
        name: String,
        definition: StateMachineDefinition,
        handlers: H,
        dependencies: Vec<String>,
        max_recovery_attempts: u32,
        history_limit: usize,
    ) -> Self {
        let current = definition.initial_state().to_string();
        Self {
            name,
            definition,
            handlers,
            dependencies,
            current,
            recovery: RecoveryCounter::new(max_recovery_attempts),
            history: TransitionHistory::new(history_limit),
            terminated: false,
        }
    }

    /// Run the current state's handler once and follow its outcome.
    pub fn tick(&mut self) -> Result<StepResult, FtsmError> {
        if self.terminated {
            return Err(FtsmError::Terminated {
                machine: self.name.clone(),
                state: self.current.clone(),
            });
        }

        let from = self.current.clone();
        match self.handlers.execute(&from) {
            StateOutcome::Transition(label) => self.follow(from, label),
            StateOutcome::Failure(reason) => self.fail(from, reason),
        }
    }

    /// Tick until `predicate` holds for the current state.
    ///
    /// Returns immediately if it already holds; stops at the first
    /// unrecoverable error.
    pub fn run_until<P>(&mut self, mut predicate: P) -> Result<(), FtsmError>
    where
        P: FnMut(&str) -> bool,
    {
        while !predicate(&self.current) {
            self.tick()?;
        }
        Ok(())
    }

    fn follow(&mut self, from: String, label: TransitionLabel) -> Result<StepResult, FtsmError> {
        let Some(to) = self.definition.transition(&from, &label).map(str::to_owned) else {
            error!(machine = %self.name, state = %from, %label, "handler returned undeclared transition");
            self.terminated = true;
            return Err(FtsmError::UndeclaredTransition {
                machine: self.name.clone(),
                state: from,
                label,
            });
        };

        self.enter(&from, label.clone(), &to);

        if from == RECOVERING && to == READY {
            info!(
                machine = %self.name,
                attempts = self.recovery.attempts(),
                "recovered"
            );
            self.recovery.reset();
        }
        if to == FAILED {
            warn!(machine = %self.name, state = %from, "entered failed state");
            self.terminated = true;
        }

        Ok(StepResult::Transitioned { from, label, to })
    }

    fn fail(&mut self, from: String, reason: String) -> Result<StepResult, FtsmError> {
        if !self.definition.contains(RECOVERING) {
            error!(machine = %self.name, state = %from, %reason, "failure without recovering state");
            self.terminated = true;
            return Err(FtsmError::NoRecoveryState {
                machine: self.name.clone(),
                state: from,
                reason,
            });
        }

        let attempt = self.recovery.record_attempt();
        if self.recovery.is_exhausted() {
            error!(
                machine = %self.name,
                state = %from,
                attempts = attempt,
                limit = self.recovery.limit(),
                %reason,
                "recovery attempts exhausted"
            );
            self.enter(&from, TransitionLabel::Failed, FAILED);
            self.terminated = true;
            return Err(FtsmError::RecoveryExhausted {
                machine: self.name.clone(),
                attempts: attempt,
                limit: self.recovery.limit(),
                reason,
            });
        }

        warn!(
            machine = %self.name,
            state = %from,
            attempt,
            limit = self.recovery.limit(),
            %reason,
            "recoverable failure"
        );
        self.enter(&from, TransitionLabel::Recover, RECOVERING);
        Ok(StepResult::Recovering {
            from,
            reason,
            attempt,
        })
    }

    fn enter(&mut self, from: &str, label: TransitionLabel, to: &str) {
        debug!(machine = %self.name, %from, %label, %to, "transition");
        self.history.push(TransitionRecord {
            from: from.to_string(),
            label,
            to: to.to_string(),
            timestamp: Utc::now(),
            attempt: self.recovery.attempts(),
        });
        self.current = to.to_string();
    }

    /// Capture the engine's runtime position for persistence or diagnostics.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot::new(
            self.name.clone(),
            self.current.clone(),
            self.recovery,
            self.terminated,
            self.history.records().cloned().collect(),
        )
    }

    /// Resume from a snapshot taken of an engine built from the same definition.
    pub fn restore(&mut self, snapshot: EngineSnapshot) -> Result<(), SnapshotError> {
        if snapshot.machine != self.name {
            return Err(SnapshotError::ValidationFailed(format!(
                "snapshot belongs to '{}', not '{}'",
                snapshot.machine, self.name
            )));
        }
        if snapshot.current_state != FAILED && !self.definition.contains(&snapshot.current_state) {
            return Err(SnapshotError::ValidationFailed(format!(
                "state '{}' is not declared by the definition of '{}'",
                snapshot.current_state, self.name
            )));
        }

        // the configured ceiling wins over the one captured in the snapshot
        let recovery =
            RecoveryCounter::with_attempts(self.recovery.limit(), snapshot.recovery.attempts());
        // failed is terminal whatever the snapshot claims
        let terminated = snapshot.terminated || snapshot.current_state == FAILED;

        let mut history = TransitionHistory::new(self.history.limit());
        for record in snapshot.history {
            history.push(record);
        }

        info!(machine = %self.name, state = %snapshot.current_state, "restored from snapshot");
        self.current = snapshot.current_state;
        self.recovery = recovery;
        self.terminated = terminated;
        self.history = history;
        Ok(())
    }
}

impl<H> Ftsm<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    pub fn definition(&self) -> &StateMachineDefinition {
        &self.definition
    }

    /// Dependencies this engine was constructed with.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn recovery(&self) -> &RecoveryCounter {
        &self.recovery
    }

    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// True once a fatal error occurred or the failed state was reached.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn is_failed(&self) -> bool {
        self.current == FAILED
    }

    pub fn handlers(&self) -> &H {
        &self.handlers
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::FtsmBuilder;
    use crate::core::states::{CONFIGURING, INIT, RUNNING};
    use crate::engine::HandlerMap;
    use crate::loader::DefinitionLoader;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const LIFECYCLE: &str = r#"
states:
  init:
    transitions:
      initialised: configuring
  configuring:
    transitions:
      done_configuring: ready
  ready:
    transitions:
      run: running
      wait: ready
  running:
    transitions:
      done: ready
  recovering:
    transitions:
      done_recovering: ready
      failed: failed
  failed: {}
"#;

    /// Scripted outcomes per state; falls back to the canonical label.
    fn scripted(
        script: Arc<Mutex<VecDeque<(&'static str, StateOutcome)>>>,
    ) -> HandlerMap {
        let mut handlers = HandlerMap::new();
        for (state, default) in [
            (INIT, TransitionLabel::Initialised),
            (CONFIGURING, TransitionLabel::DoneConfiguring),
            (READY, TransitionLabel::Run),
            (RUNNING, TransitionLabel::Done),
            (RECOVERING, TransitionLabel::DoneRecovering),
        ] {
            let script = Arc::clone(&script);
            handlers = handlers.on(state, move || {
                let mut script = script.lock().unwrap();
                if script.front().is_some_and(|(scripted, _)| *scripted == state) {
                    if let Some((_, outcome)) = script.pop_front() {
                        return outcome;
                    }
                }
                StateOutcome::Transition(default.clone())
            });
        }
        handlers
    }

    fn engine(
        limit: u32,
        script: Vec<(&'static str, StateOutcome)>,
    ) -> Ftsm<HandlerMap> {
        let definition = DefinitionLoader::load_str(LIFECYCLE).unwrap();
        FtsmBuilder::new("test_action")
            .definition(definition)
            .handlers(scripted(Arc::new(Mutex::new(script.into()))))
            .max_recovery_attempts(limit)
            .build()
            .unwrap()
    }

    #[test]
    fn starts_in_initial_state() {
        let engine = engine(1, vec![]);
        assert_eq!(engine.current_state(), INIT);
        assert!(!engine.is_terminated());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn tick_follows_one_edge() {
        let mut engine = engine(1, vec![]);
        let step = engine.tick().unwrap();

        assert_eq!(
            step,
            StepResult::Transitioned {
                from: INIT.to_string(),
                label: TransitionLabel::Initialised,
                to: CONFIGURING.to_string(),
            }
        );
        assert_eq!(engine.current_state(), CONFIGURING);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn run_until_reaches_predicate() {
        let mut engine = engine(1, vec![]);
        engine.run_until(|state| state == RUNNING).unwrap();

        assert_eq!(engine.current_state(), RUNNING);
        assert_eq!(
            engine.history().get_path(),
            vec![INIT, CONFIGURING, READY, RUNNING]
        );
    }

    #[test]
    fn run_until_returns_immediately_when_predicate_holds() {
        let mut engine = engine(1, vec![]);
        engine.run_until(|state| state == INIT).unwrap();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn undeclared_label_is_fatal() {
        let mut engine = engine(1, vec![(INIT, StateOutcome::transition(TransitionLabel::Run))]);

        let error = engine.tick().unwrap_err();
        assert!(matches!(
            error,
            FtsmError::UndeclaredTransition { ref state, label: TransitionLabel::Run, .. }
                if state == INIT
        ));
        assert!(engine.is_terminated());
        assert_eq!(engine.current_state(), INIT);
        assert!(matches!(engine.tick(), Err(FtsmError::Terminated { .. })));
    }

    #[test]
    fn single_failure_recovers_and_resets_counter() {
        let mut engine = engine(
            1,
            vec![(RUNNING, StateOutcome::failure("arm blocked"))],
        );
        engine.run_until(|state| state == RUNNING).unwrap();

        let step = engine.tick().unwrap();
        assert_eq!(
            step,
            StepResult::Recovering {
                from: RUNNING.to_string(),
                reason: "arm blocked".to_string(),
                attempt: 1,
            }
        );
        assert_eq!(engine.current_state(), RECOVERING);
        assert_eq!(engine.recovery().attempts(), 1);

        engine.tick().unwrap();
        assert_eq!(engine.current_state(), READY);
        assert_eq!(engine.recovery().attempts(), 0);
    }

    #[test]
    fn two_consecutive_failures_exceed_limit_of_one() {
        let mut engine = engine(
            1,
            vec![
                (RUNNING, StateOutcome::failure("arm blocked")),
                (RECOVERING, StateOutcome::failure("still blocked")),
            ],
        );
        engine.run_until(|state| state == RUNNING).unwrap();
        engine.tick().unwrap();

        let error = engine.tick().unwrap_err();
        assert!(matches!(
            error,
            FtsmError::RecoveryExhausted { attempts: 2, limit: 1, .. }
        ));
        assert_eq!(engine.current_state(), FAILED);
        assert!(engine.is_failed());
        assert!(engine.is_terminated());
        assert_eq!(
            engine.history().last().map(|record| &record.label),
            Some(&TransitionLabel::Failed)
        );
    }

    #[test]
    fn zero_limit_fails_on_first_failure() {
        let mut engine = engine(0, vec![(CONFIGURING, StateOutcome::failure("no arm"))]);
        engine.tick().unwrap();

        assert!(matches!(
            engine.tick(),
            Err(FtsmError::RecoveryExhausted { attempts: 1, limit: 0, .. })
        ));
        assert!(engine.is_failed());
    }

    #[test]
    fn failures_separated_by_recovery_do_not_accumulate() {
        let mut engine = engine(
            1,
            vec![
                (RUNNING, StateOutcome::failure("first")),
                (RUNNING, StateOutcome::failure("second")),
            ],
        );
        for _ in 0..2 {
            engine.run_until(|state| state == RUNNING).unwrap();
            engine.tick().unwrap();
            assert_eq!(engine.recovery().attempts(), 1);
            engine.tick().unwrap();
            assert_eq!(engine.current_state(), READY);
        }
        assert!(!engine.is_terminated());
    }

    #[test]
    fn declared_failed_edge_terminates() {
        let mut engine = engine(
            3,
            vec![
                (RUNNING, StateOutcome::failure("arm blocked")),
                (RECOVERING, StateOutcome::transition(TransitionLabel::Failed)),
            ],
        );
        engine.run_until(|state| state == RUNNING).unwrap();
        engine.tick().unwrap();
        engine.tick().unwrap();

        assert!(engine.is_failed());
        assert!(matches!(engine.tick(), Err(FtsmError::Terminated { .. })));
    }

    #[test]
    fn failure_without_recovering_state_is_fatal() {
        let definition = DefinitionLoader::load_str(
            "states:\n  ready:\n    transitions:\n      wait: ready\n",
        )
        .unwrap();
        let mut engine = FtsmBuilder::new("bare")
            .definition(definition)
            .handlers(HandlerMap::new().on(READY, || StateOutcome::failure("boom")))
            .build()
            .unwrap();

        assert!(matches!(
            engine.tick(),
            Err(FtsmError::NoRecoveryState { .. })
        ));
        assert!(engine.is_terminated());
    }

    #[test]
    fn snapshot_round_trips_into_fresh_engine() {
        let mut original = engine(1, vec![(RUNNING, StateOutcome::failure("arm blocked"))]);
        original.run_until(|state| state == RUNNING).unwrap();
        original.tick().unwrap();

        let mut resumed = engine(1, vec![]);
        resumed.restore(original.snapshot()).unwrap();

        assert_eq!(resumed.current_state(), RECOVERING);
        assert_eq!(resumed.recovery().attempts(), 1);
        assert_eq!(resumed.history().len(), original.history().len());

        resumed.tick().unwrap();
        assert_eq!(resumed.current_state(), READY);
        assert_eq!(resumed.recovery().attempts(), 0);
    }

    #[test]
    fn restored_failed_state_stays_terminal() {
        let mut resumed = engine(1, vec![]);
        let mut snapshot = resumed.snapshot();
        snapshot.current_state = FAILED.to_string();
        snapshot.terminated = false;

        resumed.restore(snapshot).unwrap();

        assert!(resumed.is_failed());
        assert!(resumed.is_terminated());
        assert!(matches!(resumed.tick(), Err(FtsmError::Terminated { .. })));
        assert_eq!(resumed.current_state(), FAILED);
    }

    #[test]
    fn restore_clamps_corrupt_attempt_count() {
        let mut resumed = engine(1, vec![]);
        let mut snapshot = resumed.snapshot();
        snapshot.current_state = RECOVERING.to_string();
        snapshot.recovery = RecoveryCounter::with_attempts(u32::MAX, u32::MAX);

        resumed.restore(snapshot).unwrap();

        assert_eq!(resumed.recovery().limit(), 1);
        assert_eq!(resumed.recovery().attempts(), 2);
    }

    #[test]
    fn restore_rejects_foreign_snapshot() {
        let original = engine(1, vec![]);
        let definition = DefinitionLoader::load_str(LIFECYCLE).unwrap();
        let mut other = FtsmBuilder::new("other_action")
            .definition(definition)
            .handlers(scripted(Arc::new(Mutex::new(VecDeque::new()))))
            .build()
            .unwrap();

        assert!(matches!(
            other.restore(original.snapshot()),
            Err(SnapshotError::ValidationFailed(_))
        ));
    }
}
