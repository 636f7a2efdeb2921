//! Tests for the async coordinator loop with a scripted console.

use std::collections::VecDeque;

use prolix::coordinator::{
    Console, Coordinator, Disposition, Event, SessionCommand, SessionOutcome, SessionRequest,
};
use prolix::filter::{FilterEngine, Line, RuleKind};
use prolix::process::StreamKind;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use super::MemorySink;

/// What one interactive session does once the test lets it go.
struct Script {
    go: oneshot::Receiver<()>,
    commands: Vec<SessionCommand>,
    outcome: SessionOutcome,
}

/// Console that plays back scripted sessions on the coordinator's event channel.
struct ScriptedConsole {
    events: mpsc::Sender<Event>,
    scripts: VecDeque<Script>,
    started: mpsc::UnboundedSender<()>,
    replies: mpsc::UnboundedSender<String>,
    rearmed: mpsc::UnboundedSender<()>,
    rearms: usize,
}

impl Console for ScriptedConsole {
    fn start_session(&mut self) {
        let _ = self.started.send(());
        let Some(script) = self.scripts.pop_front() else {
            return;
        };
        let events = self.events.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let _ = script.go.await;
            for command in script.commands {
                let (request, reply) = SessionRequest::new(command);
                events.send(Event::Request(request)).await.unwrap();
                let _ = replies.send(reply.await.unwrap());
            }
            events.send(Event::SessionEnded(script.outcome)).await.unwrap();
        });
    }

    fn rearm(&mut self) {
        self.rearms += 1;
        let _ = self.rearmed.send(());
    }
}

struct Harness {
    stdout: mpsc::Sender<Line>,
    stderr: mpsc::Sender<Line>,
    events: mpsc::Sender<Event>,
    started: mpsc::UnboundedReceiver<()>,
    replies: mpsc::UnboundedReceiver<String>,
    rearmed: mpsc::UnboundedReceiver<()>,
    task: JoinHandle<(Coordinator<MemorySink>, ScriptedConsole, Disposition)>,
}

fn start(engine: FilterEngine, scripts: Vec<Script>) -> Harness {
    let (stdout, stdout_rx) = mpsc::channel(16);
    let (stderr, stderr_rx) = mpsc::channel(16);
    let (events, events_rx) = mpsc::channel(16);
    let (started_tx, started) = mpsc::unbounded_channel();
    let (replies_tx, replies) = mpsc::unbounded_channel();
    let (rearmed_tx, rearmed) = mpsc::unbounded_channel();

    let mut console = ScriptedConsole {
        events: events.clone(),
        scripts: scripts.into(),
        started: started_tx,
        replies: replies_tx,
        rearmed: rearmed_tx,
        rearms: 0,
    };
    let mut coordinator = Coordinator::new(engine, MemorySink::default());
    let task = tokio::spawn(async move {
        let disposition = coordinator
            .run(stdout_rx, stderr_rx, events_rx, &mut console)
            .await
            .unwrap();
        (coordinator, console, disposition)
    });

    Harness {
        stdout,
        stderr,
        events,
        started,
        replies,
        rearmed,
        task,
    }
}

fn script(commands: Vec<SessionCommand>, outcome: SessionOutcome) -> (Script, oneshot::Sender<()>) {
    let (go_tx, go) = oneshot::channel();
    (
        Script {
            go,
            commands,
            outcome,
        },
        go_tx,
    )
}

/// Wait until the coordinator has taken every queued line.
async fn settle(tx: &mpsc::Sender<Line>) {
    while tx.capacity() < tx.max_capacity() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn passthrough_until_streams_close() {
    let h = start(FilterEngine::new(), Vec::new());
    h.stdout.send(Line::terminated("one")).await.unwrap();
    h.stderr.send(Line::terminated("oops")).await.unwrap();
    h.stdout.send(Line::terminated("two")).await.unwrap();
    drop(h.stdout);
    drop(h.stderr);

    let (coordinator, console, disposition) = h.task.await.unwrap();
    assert_eq!(disposition, Disposition::ChildFinished);
    assert_eq!(coordinator.sink().texts(StreamKind::Stdout), vec!["one", "two"]);
    assert_eq!(coordinator.sink().texts(StreamKind::Stderr), vec!["oops"]);
    assert_eq!(coordinator.stats().total, 3);
    assert_eq!(console.rearms, 0);
}

#[tokio::test]
async fn session_rule_applies_to_held_and_later_lines() {
    let (session, go) = script(
        vec![SessionCommand::Install {
            kind: RuleKind::IgnoreSubstring,
            argument: "noise".to_string(),
        }],
        SessionOutcome::Resume,
    );
    let mut h = start(FilterEngine::new(), vec![session]);

    h.events.send(Event::KeypressDetected).await.unwrap();
    h.started.recv().await.unwrap();

    h.stdout.send(Line::terminated("held noise")).await.unwrap();
    h.stdout.send(Line::terminated("held ok")).await.unwrap();
    h.stderr.send(Line::terminated("err ok")).await.unwrap();
    settle(&h.stdout).await;
    settle(&h.stderr).await;
    go.send(()).unwrap();
    assert_eq!(h.replies.recv().await.unwrap(), "");
    h.rearmed.recv().await.unwrap();

    h.stdout.send(Line::terminated("later noise")).await.unwrap();
    h.stdout.send(Line::terminated("later ok")).await.unwrap();
    drop(h.stdout);
    drop(h.stderr);

    let (coordinator, console, disposition) = h.task.await.unwrap();
    assert_eq!(disposition, Disposition::ChildFinished);
    assert_eq!(
        coordinator.sink().texts(StreamKind::Stdout),
        vec!["held ok", "later ok"]
    );
    assert_eq!(coordinator.sink().texts(StreamKind::Stderr), vec!["err ok"]);
    let stats = coordinator.stats();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.suppressed, 2);
    assert_eq!(console.rearms, 1);
}

#[tokio::test]
async fn quit_stops_without_flushing() {
    let (session, go) = script(Vec::new(), SessionOutcome::Quit);
    let mut h = start(FilterEngine::new(), vec![session]);

    h.events.send(Event::KeypressDetected).await.unwrap();
    h.started.recv().await.unwrap();
    h.stdout.send(Line::terminated("never shown")).await.unwrap();
    settle(&h.stdout).await;
    go.send(()).unwrap();

    let (coordinator, _console, disposition) = h.task.await.unwrap();
    assert_eq!(disposition, Disposition::KillRequested);
    assert!(coordinator.sink().lines.is_empty());
    assert_eq!(coordinator.stats().total, 0);
}

#[tokio::test]
async fn streams_closing_during_session_wait_for_resume() {
    let (session, go) = script(vec![SessionCommand::Stats], SessionOutcome::Resume);
    let mut h = start(FilterEngine::new(), vec![session]);

    h.stdout.send(Line::terminated("before")).await.unwrap();
    settle(&h.stdout).await;
    h.events.send(Event::KeypressDetected).await.unwrap();
    h.started.recv().await.unwrap();

    h.stdout.send(Line::terminated("during")).await.unwrap();
    drop(h.stdout);
    drop(h.stderr);
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
    assert!(!h.task.is_finished(), "coordinator must wait for the session");

    go.send(()).unwrap();
    assert_eq!(h.replies.recv().await.unwrap(), "Suppressed 0/1 lines.\n");

    let (coordinator, console, disposition) = h.task.await.unwrap();
    assert_eq!(disposition, Disposition::ChildFinished);
    assert_eq!(
        coordinator.sink().texts(StreamKind::Stdout),
        vec!["before", "during"]
    );
    assert_eq!(console.rearms, 0, "no rearm once the child is done");
}

#[tokio::test]
async fn consecutive_sessions_rearm_each_time() {
    let (first, go_first) = script(Vec::new(), SessionOutcome::Resume);
    let (second, go_second) = script(
        vec![SessionCommand::Install {
            kind: RuleKind::Snippet,
            argument: "s/a/b/g".to_string(),
        }],
        SessionOutcome::Resume,
    );
    let mut h = start(FilterEngine::new(), vec![first, second]);

    h.events.send(Event::KeypressDetected).await.unwrap();
    h.started.recv().await.unwrap();
    go_first.send(()).unwrap();
    h.rearmed.recv().await.unwrap();

    h.events.send(Event::KeypressDetected).await.unwrap();
    h.started.recv().await.unwrap();
    go_second.send(()).unwrap();
    assert_eq!(h.replies.recv().await.unwrap(), "");

    h.stdout.send(Line::terminated("banana")).await.unwrap();
    drop(h.stdout);
    drop(h.stderr);

    let (coordinator, console, _) = h.task.await.unwrap();
    assert_eq!(coordinator.sink().texts(StreamKind::Stdout), vec!["bbnbnb"]);
    assert_eq!(console.rearms, 2);
}
