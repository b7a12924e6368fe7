//! Interactive menu driven by scripted answers.

use tempfile::TempDir;

use remoting_ctl::adapter::inbound::cli::menu;
use remoting_ctl::application::Orchestrator;
use remoting_ctl::domain::build::{PROBE_SCRIPT, START_ACCELERATED_SCRIPT};
use remoting_ctl::domain::MachineStatus;
use remoting_ctl::testkit::engine::{started_machine, FakeEngine};
use remoting_ctl::testkit::fixture;
use remoting_ctl::testkit::operator::ScriptedOperator;
use remoting_ctl::testkit::scripts::FakeScripts;

const MENU_PROMPT: &str = "What would you like to do?";

// Positions in the menu offered for a running accelerated machine and for a
// stopped one.
const SHOW_RUN_COMMAND: usize = 1;
const RESTART_ACCELERATED: usize = 0;

struct Setup {
    _dir: TempDir,
    engine: FakeEngine,
    scripts: FakeScripts,
    operator: ScriptedOperator,
    orchestrator: Orchestrator,
}

fn setup(scripts: FakeScripts, operator: ScriptedOperator) -> Setup {
    let dir = TempDir::new().expect("tempdir");
    fixture::write_build_source(dir.path(), "v1.0.0");
    let engine = FakeEngine::new().with_connection(started_machine("podman-machine-default"));
    let orchestrator = Orchestrator::new(
        fixture::settings(dir.path()),
        Box::new(engine.clone()),
        Box::new(scripts.clone()),
        Box::new(operator.clone()),
    );
    Setup {
        _dir: dir,
        engine,
        scripts,
        operator,
        orchestrator,
    }
}

fn menu_openings(operator: &ScriptedOperator) -> usize {
    operator
        .prompts()
        .iter()
        .filter(|prompt| prompt.as_str() == MENU_PROMPT)
        .count()
}

#[tokio::test]
async fn every_menu_opening_rechecks_machine_status() {
    let operator = ScriptedOperator::new()
        .with_selection(SHOW_RUN_COMMAND)
        .with_selection(SHOW_RUN_COMMAND);
    let setup = setup(FakeScripts::new(), operator);

    menu::run(setup.orchestrator, &setup.operator)
        .await
        .expect("menu");

    assert_eq!(menu_openings(&setup.operator), 3);
    assert_eq!(setup.scripts.count(PROBE_SCRIPT), 3);
    assert_eq!(
        setup.operator.statuses(),
        vec![MachineStatus::AcceleratedRunning; 3]
    );
}

#[tokio::test]
async fn menu_follows_a_machine_that_stopped_in_between() {
    let scripts = FakeScripts::new()
        .with_exit(PROBE_SCRIPT, 0)
        .with_exit(PROBE_SCRIPT, 11);
    let operator = ScriptedOperator::new()
        .with_selection(SHOW_RUN_COMMAND)
        .with_selection(RESTART_ACCELERATED);
    let setup = setup(scripts, operator);

    menu::run(setup.orchestrator, &setup.operator)
        .await
        .expect("menu");

    assert_eq!(setup.scripts.count(START_ACCELERATED_SCRIPT), 1);
    assert!(setup.engine.created().is_empty());
    assert_eq!(
        setup.operator.statuses()[..2],
        [MachineStatus::AcceleratedRunning, MachineStatus::NotRunning]
    );
}
