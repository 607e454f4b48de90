//! Handler set for the standard action lifecycle.

use super::message::{ActionHandle, ActionMessage};
use super::runtime::ActionRuntime;
use crate::core::states::{CONFIGURING, INIT, READY, RECOVERING, RUNNING};
use crate::core::TransitionLabel;
use crate::engine::{StateHandlers, StateOutcome};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, warn};

/// Capability every concrete action provides.
///
/// Only [`set_result`](Action::set_result) is required; the other hooks
/// default to the canonical transition of their state.
///
/// # Example
///
/// ```rust
/// use ftsm::action::{Action, ActionRuntime};
///
/// struct Beep;
///
/// impl Action for Beep {
///     type Goal = ();
///     type Output = bool;
///
///     fn set_result(&mut self, runtime: &mut ActionRuntime<(), bool>, success: bool) {
///         runtime.set_result(success);
///     }
/// }
/// ```
pub trait Action {
    type Goal;
    type Output;

    /// Prepare resources; runs once, from the `configuring` state.
    fn configure(&mut self) -> StateOutcome {
        StateOutcome::Transition(TransitionLabel::DoneConfiguring)
    }

    /// The action body, run once per execution request.
    fn run(&mut self, _runtime: &mut ActionRuntime<Self::Goal, Self::Output>) -> StateOutcome {
        StateOutcome::Transition(TransitionLabel::Done)
    }

    /// One recovery attempt after a failure.
    fn recover(&mut self, _runtime: &mut ActionRuntime<Self::Goal, Self::Output>) -> StateOutcome {
        StateOutcome::Transition(TransitionLabel::DoneRecovering)
    }

    /// Record the outcome of an execution into `runtime`.
    fn set_result(&mut self, runtime: &mut ActionRuntime<Self::Goal, Self::Output>, success: bool);
}

/// Handlers for `init`, `configuring`, `ready`, `running` and `recovering`.
///
/// External callers arm executions and preempt them through an
/// [`ActionHandle`]; messages are drained at every state boundary.
pub struct ActionStateMachine<A: Action> {
    action: A,
    runtime: ActionRuntime<A::Goal, A::Output>,
    inbox: Receiver<ActionMessage<A::Goal>>,
    sender: Sender<ActionMessage<A::Goal>>,
}

impl<A: Action> ActionStateMachine<A> {
    pub fn new(action: A) -> Self {
        let (sender, inbox) = mpsc::channel();
        Self {
            action,
            runtime: ActionRuntime::default(),
            inbox,
            sender,
        }
    }

    /// A handle for requesting and preempting executions from other threads.
    pub fn handle(&self) -> ActionHandle<A::Goal> {
        ActionHandle::new(self.sender.clone())
    }

    pub fn init(&mut self) -> StateOutcome {
        StateOutcome::Transition(TransitionLabel::Initialised)
    }

    pub fn configuring(&mut self) -> StateOutcome {
        let outcome = self.action.configure();
        self.record_failure(&outcome, "configuration failed");
        outcome
    }

    /// Arm a new cycle if one was requested, otherwise drop any stale result
    /// and keep waiting.
    pub fn ready(&mut self) -> StateOutcome {
        self.drain_inbox();

        if self.runtime.execution_requested {
            self.runtime.result = None;
            self.runtime.execution_requested = false;
            debug!("execution armed");
            return StateOutcome::Transition(TransitionLabel::Run);
        }

        if self.runtime.result.is_some() {
            debug!("discarding stale result");
            self.runtime.result = None;
        }
        StateOutcome::Transition(TransitionLabel::Wait)
    }

    pub fn running(&mut self) -> StateOutcome {
        if self.runtime.preempted {
            info!("execution preempted before it started");
            self.runtime.preempted = false;
            self.set_result(false);
            return StateOutcome::Transition(TransitionLabel::Done);
        }

        let outcome = self.action.run(&mut self.runtime);
        self.record_failure(&outcome, "action body failed");
        outcome
    }

    pub fn recovering(&mut self) -> StateOutcome {
        let outcome = self.action.recover(&mut self.runtime);
        self.record_failure(&outcome, "recovery attempt failed");
        outcome
    }

    pub fn set_result(&mut self, success: bool) {
        self.action.set_result(&mut self.runtime, success);
    }

    pub fn runtime(&self) -> &ActionRuntime<A::Goal, A::Output> {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut ActionRuntime<A::Goal, A::Output> {
        &mut self.runtime
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut A {
        &mut self.action
    }

    /// Any failing hook leaves a failed result behind.
    fn record_failure(&mut self, outcome: &StateOutcome, message: &str) {
        if let StateOutcome::Failure(reason) = outcome {
            warn!(%reason, "{}", message);
            self.set_result(false);
        }
    }

    fn drain_inbox(&mut self) {
        // never disconnected: the machine holds its own sender
        while let Ok(message) = self.inbox.try_recv() {
            match message {
                ActionMessage::RequestExecution(goal) => {
                    debug!("execution requested");
                    self.runtime.execution_requested = true;
                    self.runtime.preempted = false;
                    self.runtime.goal = goal;
                }
                ActionMessage::Preempt => {
                    debug!("preemption requested");
                    self.runtime.preempted = true;
                }
            }
        }
    }
}

impl<A: Action> StateHandlers for ActionStateMachine<A> {
    fn handles(&self, state: &str) -> bool {
        matches!(state, INIT | CONFIGURING | READY | RUNNING | RECOVERING)
    }

    fn execute(&mut self, state: &str) -> StateOutcome {
        self.drain_inbox();
        match state {
            INIT => self.init(),
            CONFIGURING => self.configuring(),
            READY => self.ready(),
            RUNNING => self.running(),
            RECOVERING => self.recovering(),
            other => StateOutcome::failure(format!("action has no handler for state '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe {
        runs: u32,
        fail_runs: bool,
        fail_configure: bool,
        fail_recovery: bool,
        recoveries: u32,
    }

    impl Action for Probe {
        type Goal = u32;
        type Output = bool;

        fn configure(&mut self) -> StateOutcome {
            if self.fail_configure {
                return StateOutcome::failure("probe offline");
            }
            StateOutcome::transition(TransitionLabel::DoneConfiguring)
        }

        fn run(&mut self, runtime: &mut ActionRuntime<u32, bool>) -> StateOutcome {
            self.runs += 1;
            if self.fail_runs {
                return StateOutcome::failure("probe jammed");
            }
            self.set_result(runtime, true);
            StateOutcome::transition(TransitionLabel::Done)
        }

        fn recover(&mut self, _runtime: &mut ActionRuntime<u32, bool>) -> StateOutcome {
            self.recoveries += 1;
            if self.fail_recovery {
                return StateOutcome::failure("probe still offline");
            }
            self.fail_runs = false;
            StateOutcome::transition(TransitionLabel::DoneRecovering)
        }

        fn set_result(&mut self, runtime: &mut ActionRuntime<u32, bool>, success: bool) {
            runtime.set_result(success);
        }
    }

    fn machine() -> ActionStateMachine<Probe> {
        ActionStateMachine::new(Probe::default())
    }

    #[test]
    fn init_and_configuring_use_canonical_labels() {
        let mut machine = machine();
        assert_eq!(machine.init(), TransitionLabel::Initialised.into());
        assert_eq!(machine.configuring(), TransitionLabel::DoneConfiguring.into());
    }

    #[test]
    fn ready_with_request_clears_result_and_runs() {
        let mut machine = machine();
        machine.runtime_mut().set_result(true);
        machine.handle().request_execution(7).unwrap();

        assert_eq!(machine.ready(), TransitionLabel::Run.into());
        assert_eq!(machine.runtime().result(), None);
        assert!(!machine.runtime().execution_requested());
        assert_eq!(machine.runtime().goal(), Some(&7));
    }

    #[test]
    fn ready_without_request_discards_stale_result() {
        let mut machine = machine();
        machine.runtime_mut().set_result(false);

        assert_eq!(machine.ready(), TransitionLabel::Wait.into());
        assert_eq!(machine.runtime().result(), None);
    }

    #[test]
    fn ready_without_request_or_result_waits() {
        let mut machine = machine();

        assert_eq!(machine.ready(), TransitionLabel::Wait.into());
        assert_eq!(machine.runtime().result(), None);
        assert!(!machine.runtime().execution_requested());
    }

    #[test]
    fn request_is_consumed_exactly_once() {
        let mut machine = machine();
        machine.handle().request().unwrap();

        assert_eq!(machine.ready(), TransitionLabel::Run.into());
        assert_eq!(machine.ready(), TransitionLabel::Wait.into());
    }

    #[test]
    fn requests_from_another_thread_are_observed() {
        let mut machine = machine();
        let handle = machine.handle();
        std::thread::spawn(move || handle.request_execution(3).unwrap())
            .join()
            .unwrap();

        assert_eq!(machine.execute(READY), TransitionLabel::Run.into());
    }

    #[test]
    fn running_records_success() {
        let mut machine = machine();
        assert_eq!(machine.running(), TransitionLabel::Done.into());
        assert_eq!(machine.runtime().result(), Some(&true));
        assert_eq!(machine.action().runs, 1);
    }

    #[test]
    fn preempted_execution_skips_body_and_fails() {
        let mut machine = machine();
        let handle = machine.handle();
        handle.request().unwrap();
        assert_eq!(machine.execute(READY), TransitionLabel::Run.into());

        handle.preempt().unwrap();
        assert_eq!(machine.execute(RUNNING), TransitionLabel::Done.into());
        assert_eq!(machine.action().runs, 0);
        assert_eq!(machine.runtime().result(), Some(&false));
        assert!(!machine.runtime().is_preempted());
    }

    #[test]
    fn new_request_clears_earlier_preemption() {
        let mut machine = machine();
        let handle = machine.handle();
        handle.preempt().unwrap();
        handle.request().unwrap();

        assert_eq!(machine.execute(READY), TransitionLabel::Run.into());
        assert!(!machine.runtime().is_preempted());
        assert_eq!(machine.execute(RUNNING), TransitionLabel::Done.into());
        assert_eq!(machine.action().runs, 1);
    }

    #[test]
    fn failed_body_records_failure() {
        let mut machine = machine();
        machine.action_mut().fail_runs = true;

        assert!(matches!(machine.running(), StateOutcome::Failure(_)));
        assert_eq!(machine.runtime().result(), Some(&false));

        assert_eq!(machine.recovering(), TransitionLabel::DoneRecovering.into());
        assert_eq!(machine.action().recoveries, 1);
    }

    #[test]
    fn failed_configuration_and_recovery_record_failure() {
        let mut machine = machine();
        machine.action_mut().fail_configure = true;
        machine.action_mut().fail_recovery = true;

        assert!(matches!(machine.configuring(), StateOutcome::Failure(_)));
        assert_eq!(machine.runtime().result(), Some(&false));

        machine.runtime_mut().result = None;
        assert!(matches!(machine.recovering(), StateOutcome::Failure(_)));
        assert_eq!(machine.runtime().result(), Some(&false));
        assert_eq!(machine.action().runs, 0);
    }

    #[test]
    fn handles_only_lifecycle_states() {
        let machine = machine();
        for state in [INIT, CONFIGURING, READY, RUNNING, RECOVERING] {
            assert!(machine.handles(state));
        }
        assert!(!machine.handles("failed"));
        assert!(!machine.handles("grasping"));
    }
}
