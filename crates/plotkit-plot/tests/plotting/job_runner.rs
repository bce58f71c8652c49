use plotkit_core::Error;
use plotkit_plot::headless::{SimEngine, StepGate};
use plotkit_plot::{
    JobStep, PlotEvent, PlotEventDispatcher, PlotJobRunner, PlotJobState, PlotOutput, PlotSlot,
    ProcessPlotState,
};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use crate::fixtures::{catalog, validated, PRINTER};

fn runner() -> (PlotJobRunner, Arc<PlotSlot>) {
    let slot = Arc::new(PlotSlot::new());
    (
        PlotJobRunner::new(Arc::clone(&slot), PlotEventDispatcher::new(64)),
        slot,
    )
}

fn output() -> PlotOutput {
    PlotOutput::printer(PRINTER, "Nameless")
}

#[test]
fn test_job_runs_every_step_and_reports_progress() {
    let (runner, slot) = runner();
    let mut events = runner.events().subscribe();
    let catalog = catalog();
    let mut engine = SimEngine::new(catalog.clone());
    let plot = validated(&mut engine, &catalog);

    let report = runner.run(&mut engine, plot, output()).unwrap();

    assert_eq!(report.steps_completed, JobStep::SEQUENCE.len());
    assert!(report.finished_at >= report.started_at);
    assert_eq!(slot.state(), PlotJobState::Idle);

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }
    assert!(matches!(received.first(), Some(PlotEvent::Started { .. })));
    assert!(matches!(received.last(), Some(PlotEvent::Finished { .. })));
    let last_progress = received
        .iter()
        .rev()
        .find_map(|e| match e {
            PlotEvent::Progress { plot_percent, .. } => Some(*plot_percent),
            _ => None,
        });
    assert_eq!(last_progress, Some(100));
}

#[test]
fn test_second_job_rejected_while_first_runs() {
    let (runner, slot) = runner();
    let catalog = catalog();
    let gate = StepGate::new();

    let mut first = SimEngine::new(catalog.clone()).hold_at(JobStep::Generate, Arc::clone(&gate));
    let first_log = first.step_log();
    let first_plot = validated(&mut first, &catalog);

    let mut second = SimEngine::new(catalog.clone());
    let second_plot = validated(&mut second, &catalog);

    thread::scope(|s| {
        let handle = s.spawn(|| runner.run(&mut first, first_plot, output()));

        gate.wait_reached();
        assert_eq!(slot.state(), PlotJobState::Running);
        let steps_before = first_log.lock().len();

        let err = runner.run(&mut second, second_plot, output()).unwrap_err();
        assert!(matches!(err, Error::JobInProgress));
        assert!(err.is_retryable_later());
        assert_eq!(first_log.lock().len(), steps_before);
        assert_eq!(slot.state(), PlotJobState::Running);

        gate.release();
        handle.join().unwrap().unwrap();
    });

    assert!(second.steps().is_empty());
    assert_eq!(first.steps(), JobStep::SEQUENCE.to_vec());
    assert_eq!(slot.state(), PlotJobState::Idle);
}

#[test]
fn test_failed_step_stops_job_and_releases_slot() {
    let (runner, slot) = runner();
    let mut events = runner.events().subscribe();
    let catalog = catalog();
    let mut engine = SimEngine::new(catalog.clone()).fail_at(JobStep::EndPage);
    let plot = validated(&mut engine, &catalog);

    let err = runner.run(&mut engine, plot, output()).unwrap_err();

    match err {
        Error::Backend { step, .. } => assert_eq!(step, "end-page"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(engine.steps(), JobStep::SEQUENCE[..5].to_vec());
    assert!(engine.outputs().is_empty());
    assert_eq!(slot.state(), PlotJobState::Idle);

    let mut failed = false;
    while let Ok(event) = events.try_recv() {
        failed |= matches!(event, PlotEvent::Failed { step: JobStep::EndPage, .. });
    }
    assert!(failed);
}

#[test]
fn test_panic_releases_slot() {
    let (runner, slot) = runner();
    let catalog = catalog();
    let mut engine = SimEngine::new(catalog.clone()).panic_at(JobStep::Generate);
    let plot = validated(&mut engine, &catalog);

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        runner.run(&mut engine, plot, output())
    }));

    assert!(outcome.is_err());
    assert_eq!(slot.state(), PlotJobState::Idle);
    assert!(slot.try_acquire().is_some());
}

#[test]
fn test_busy_backend_rejects_job() {
    let (runner, slot) = runner();
    let mut events = runner.events().subscribe();
    let catalog = catalog();
    let mut engine = SimEngine::new(catalog.clone());
    let plot = validated(&mut engine, &catalog);
    let mut engine = engine.with_state(ProcessPlotState::BackgroundPlotting);

    let err = runner.run(&mut engine, plot, output()).unwrap_err();

    assert!(matches!(err, Error::JobInProgress));
    assert!(engine.steps().is_empty());
    assert_eq!(slot.state(), PlotJobState::Idle);
    assert!(matches!(events.try_recv(), Ok(PlotEvent::Rejected { .. })));
}
