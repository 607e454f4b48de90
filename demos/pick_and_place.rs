//! Pick and Place
//!
//! This demo drives a simulated pick-and-place action through the standard
//! lifecycle while a separate orchestrator thread requests work.
//!
//! Key concepts:
//! - Layering an action definition on the standard lifecycle
//! - Requesting executions through an `ActionHandle`
//! - Bounded recovery from a transient failure
//!
//! Run with: cargo run --example pick_and_place

use ftsm::action::{Action, ActionRuntime, ActionStateMachine};
use ftsm::builder::FtsmBuilder;
use ftsm::core::states::RUNNING;
use ftsm::core::TransitionLabel;
use ftsm::engine::{StateOutcome, StepResult};
use ftsm::loader::DefinitionLoader;
use std::thread;
use std::time::Duration;
use tracing::Level;

const STANDARD_LIFECYCLE: &str = include_str!("../config/action_sm.yaml");

const PICK_AND_PLACE: &str = r#"
name: pick_and_place
dependencies: [arm, gripper]
max_recovery_attempts: 2
"#;

/// Places objects at shelf slots; the first grasp always slips, so the first
/// request ends in recovery and only the later two are placed.
struct PickAndPlace {
    slipped_once: bool,
}

impl Action for PickAndPlace {
    type Goal = u32;
    type Output = String;

    fn run(&mut self, runtime: &mut ActionRuntime<u32, String>) -> StateOutcome {
        if !self.slipped_once {
            self.slipped_once = true;
            return StateOutcome::failure("object slipped from gripper");
        }
        thread::sleep(Duration::from_millis(20));
        self.set_result(runtime, true);
        StateOutcome::transition(TransitionLabel::Done)
    }

    fn set_result(&mut self, runtime: &mut ActionRuntime<u32, String>, success: bool) {
        let slot = runtime.goal().copied().unwrap_or_default();
        let outcome = if success { "placed" } else { "not placed" };
        runtime.set_result(format!("object {outcome} at slot {slot}"));
    }
}

fn main() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    println!("=== Pick and Place Example ===\n");

    let definition = DefinitionLoader::load_str_with_parent(PICK_AND_PLACE, STANDARD_LIFECYCLE)
        .expect("bundled definitions are valid");

    let mut engine = FtsmBuilder::new("pick_and_place")
        .definition(definition)
        .handlers(ActionStateMachine::new(PickAndPlace {
            slipped_once: false,
        }))
        .resolver(|dependency| matches!(dependency, "arm" | "gripper"))
        .build()
        .expect("handlers cover the standard lifecycle");

    let handle = engine.handlers().handle();
    let orchestrator = thread::spawn(move || {
        for slot in [3, 7, 9] {
            thread::sleep(Duration::from_millis(50));
            println!("orchestrator: requesting slot {slot}");
            if handle.request_execution(slot).is_err() {
                return;
            }
        }
    });

    let mut finished = 0;
    while finished < 2 {
        match engine.tick() {
            Ok(StepResult::Transitioned { from, to, .. }) if from == RUNNING => {
                finished += 1;
                println!(
                    "{from} -> {to}: {}",
                    engine
                        .handlers()
                        .runtime()
                        .result()
                        .map(String::as_str)
                        .unwrap_or("no result")
                );
            }
            Ok(StepResult::Recovering { reason, attempt, .. }) => {
                println!("recovering (attempt {attempt}): {reason}");
            }
            Ok(_) => thread::sleep(Duration::from_millis(5)),
            Err(error) => {
                eprintln!("action failed: {error}");
                break;
            }
        }
    }

    orchestrator.join().expect("orchestrator thread panicked");
    println!("\nPath: {:?}", engine.history().get_path());
    println!("\n=== Example Complete ===");
}
