//! Event-by-event tests of the coordinator state machine.

use prolix::coordinator::{
    Coordinator, Disposition, Event, Mode, SessionCommand, SessionOutcome, SessionRequest, Step,
};
use prolix::filter::{FilterEngine, Line, RuleKind};
use prolix::output::SinkError;
use prolix::process::StreamKind;

use super::{FailingSink, MemorySink};

fn coordinator() -> Coordinator<MemorySink> {
    Coordinator::new(FilterEngine::new(), MemorySink::default())
}

fn line(stream: StreamKind, text: &str) -> Event {
    Event::LineArrived(stream, Line::terminated(text))
}

fn request(c: &mut Coordinator<MemorySink>, command: SessionCommand) -> String {
    let (request, mut reply) = SessionRequest::new(command);
    assert_eq!(c.handle(Event::Request(request)).unwrap(), Step::Continue);
    reply.try_recv().expect("coordinator replies synchronously")
}

#[test]
fn passthrough_emits_immediately() {
    let mut c = coordinator();
    assert_eq!(c.handle(line(StreamKind::Stdout, "a")).unwrap(), Step::Continue);
    assert_eq!(c.handle(line(StreamKind::Stderr, "b")).unwrap(), Step::Continue);

    assert_eq!(
        c.sink().lines,
        vec![
            (StreamKind::Stdout, "a".to_string()),
            (StreamKind::Stderr, "b".to_string()),
        ]
    );
    assert_eq!(c.stats().total, 2);
}

#[test]
fn keypress_starts_session_and_buffers() {
    let mut c = coordinator();
    assert_eq!(c.handle(Event::KeypressDetected).unwrap(), Step::StartSession);
    assert_eq!(c.mode(), Mode::Interactive);

    c.handle(line(StreamKind::Stdout, "o1")).unwrap();
    c.handle(line(StreamKind::Stderr, "e1")).unwrap();

    assert!(c.sink().lines.is_empty());
    assert_eq!(c.stats().total, 0, "buffered lines are not counted yet");
    assert_eq!(c.pending(StreamKind::Stdout), 1);
    assert_eq!(c.pending(StreamKind::Stderr), 1);
}

#[test]
fn second_keypress_while_interactive_is_ignored() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    assert_eq!(c.handle(Event::KeypressDetected).unwrap(), Step::Continue);
    assert_eq!(c.mode(), Mode::Interactive);
}

#[test]
fn resume_drains_stdout_then_stderr() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    c.handle(line(StreamKind::Stderr, "e1")).unwrap();
    c.handle(line(StreamKind::Stdout, "o1")).unwrap();
    c.handle(line(StreamKind::Stderr, "e2")).unwrap();
    c.handle(line(StreamKind::Stdout, "o2")).unwrap();

    let step = c
        .handle(Event::SessionEnded(SessionOutcome::Resume))
        .unwrap();
    assert_eq!(step, Step::Rearm);
    assert_eq!(c.mode(), Mode::Passthrough);

    let emitted: Vec<&str> = c.sink().lines.iter().map(|(_, t)| t.as_str()).collect();
    assert_eq!(emitted, vec!["o1", "o2", "e1", "e2"]);
    assert_eq!(c.stats().total, 4);
    assert_eq!(c.pending(StreamKind::Stdout), 0);
}

#[test]
fn rules_installed_in_session_apply_to_drained_lines() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    c.handle(line(StreamKind::Stdout, "INFO keep me")).unwrap();
    c.handle(line(StreamKind::Stdout, "DEBUG noise")).unwrap();

    let reply = request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::IgnoreRegex,
            argument: "^DEBUG".to_string(),
        },
    );
    assert!(reply.is_empty());
    let reply = request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::Snippet,
            argument: "s/^INFO //".to_string(),
        },
    );
    assert!(reply.is_empty());

    c.handle(Event::SessionEnded(SessionOutcome::Resume)).unwrap();

    assert_eq!(c.sink().texts(StreamKind::Stdout), vec!["keep me"]);
    assert_eq!(c.stats().total, 2);
    assert_eq!(c.stats().suppressed, 1);
}

#[test]
fn bad_rule_is_reported_and_not_installed() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();

    let reply = request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::Snippet,
            argument: "s/a".to_string(),
        },
    );
    assert!(reply.contains("s/a"), "reply should name the input: {reply}");
    assert!(c.engine().substitutions().is_empty());

    let reply = request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::IgnoreRegex,
            argument: "(".to_string(),
        },
    );
    assert!(reply.contains("Invalid ignore pattern"));
    assert!(c.engine().ignore_rules().is_empty());
    assert_eq!(c.mode(), Mode::Interactive);
}

#[test]
fn pats_and_stats_requests() {
    let mut c = coordinator();
    c.handle(line(StreamKind::Stdout, "x")).unwrap();
    c.handle(Event::KeypressDetected).unwrap();
    request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::IgnoreSubstring,
            argument: "spam".to_string(),
        },
    );

    assert!(request(&mut c, SessionCommand::ListPatterns).contains("spam"));
    assert_eq!(
        request(&mut c, SessionCommand::Stats),
        "Suppressed 0/1 lines.\n"
    );
}

#[test]
fn quit_discards_buffers() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    c.handle(line(StreamKind::Stdout, "lost")).unwrap();

    let step = c.handle(Event::SessionEnded(SessionOutcome::Quit)).unwrap();
    assert_eq!(step, Step::Finish(Disposition::KillRequested));
    assert!(c.sink().lines.is_empty());
    assert_eq!(c.stats().total, 0);
    assert_eq!(c.pending(StreamKind::Stdout), 0);
}

#[test]
fn both_streams_closed_finishes() {
    let mut c = coordinator();
    assert_eq!(
        c.handle(Event::StreamClosed(StreamKind::Stdout)).unwrap(),
        Step::Continue
    );
    assert!(!c.is_open(StreamKind::Stdout));
    assert!(c.is_open(StreamKind::Stderr));
    assert_eq!(
        c.handle(Event::StreamClosed(StreamKind::Stderr)).unwrap(),
        Step::Finish(Disposition::ChildFinished)
    );
}

#[test]
fn streams_closing_mid_session_wait_for_session() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    c.handle(line(StreamKind::Stdout, "late")).unwrap();
    assert_eq!(
        c.handle(Event::StreamClosed(StreamKind::Stdout)).unwrap(),
        Step::Continue
    );
    assert_eq!(
        c.handle(Event::StreamClosed(StreamKind::Stderr)).unwrap(),
        Step::Continue
    );
    assert_eq!(c.mode(), Mode::Interactive);

    let step = c
        .handle(Event::SessionEnded(SessionOutcome::Resume))
        .unwrap();
    assert_eq!(step, Step::Finish(Disposition::ChildFinished));
    assert_eq!(c.sink().texts(StreamKind::Stdout), vec!["late"]);
}

#[test]
fn quit_after_streams_closed_still_kills() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    c.handle(Event::StreamClosed(StreamKind::Stdout)).unwrap();
    c.handle(Event::StreamClosed(StreamKind::Stderr)).unwrap();
    assert_eq!(
        c.handle(Event::SessionEnded(SessionOutcome::Quit)).unwrap(),
        Step::Finish(Disposition::KillRequested)
    );
}

#[test]
fn counters_match_emitted_across_mode_switches() {
    let mut c = coordinator();
    c.handle(Event::KeypressDetected).unwrap();
    request(
        &mut c,
        SessionCommand::Install {
            kind: RuleKind::IgnoreSubstring,
            argument: "drop".to_string(),
        },
    );
    c.handle(Event::SessionEnded(SessionOutcome::Resume)).unwrap();

    for round in 0..5 {
        c.handle(line(StreamKind::Stdout, &format!("keep {round}"))).unwrap();
        c.handle(line(StreamKind::Stderr, &format!("drop {round}"))).unwrap();
        c.handle(Event::KeypressDetected).unwrap();
        c.handle(line(StreamKind::Stderr, &format!("keep err {round}"))).unwrap();
        c.handle(line(StreamKind::Stdout, &format!("drop out {round}"))).unwrap();
        c.handle(Event::SessionEnded(SessionOutcome::Resume)).unwrap();
    }

    let stats = c.stats();
    assert_eq!(stats.total, 20);
    assert_eq!(stats.suppressed, 10);
    assert_eq!(stats.emitted(), c.sink().lines.len() as u64);
}

#[test]
fn sink_failure_propagates() {
    let mut c = Coordinator::new(FilterEngine::new(), FailingSink);
    let err = c
        .handle(Event::LineArrived(StreamKind::Stdout, Line::terminated("x")))
        .unwrap_err();
    assert!(matches!(err, SinkError::Console(_)));
}
