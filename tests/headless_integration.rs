use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use typehaki::clock::{ManualClock, TickOutcome};
use typehaki::diff::Verdict;
use typehaki::reference::ReferenceText;
use typehaki::runtime::{FixedTicker, HakiEvent, Runner, TestEventSource};
use typehaki::scoring::ScoreResult;
use typehaki::session::{Phase, Session, SessionConfig, SessionEvent};

fn ready_session(text: &str, duration_secs: u32) -> (Session<ManualClock>, ManualClock) {
    let clock = ManualClock::new();
    let mut session = Session::with_clock(
        ReferenceText::new(text).unwrap(),
        SessionConfig::new(duration_secs).unwrap(),
        clock.clone(),
    );
    assert!(session.acknowledge());
    (session, clock)
}

fn key(c: char) -> HakiEvent {
    HakiEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
}

// Headless run through the runtime without a TTY: keystrokes and ticks share
// one ordered stream.
#[test]
fn headless_typing_flow_completes() {
    let (mut session, clock) = ready_session("cat dog", 120);
    session.start();

    let (tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(5)),
    );

    for c in "cat dog".chars() {
        tx.send(key(c)).unwrap();
    }
    clock.advance(Duration::from_secs(60));

    for _ in 0..100u32 {
        match runner.step() {
            HakiEvent::Tick => {
                session.tick();
            }
            HakiEvent::Resize => {}
            HakiEvent::Key(k) => {
                if let KeyCode::Char(c) = k.code {
                    session.type_char(c);
                }
            }
        }
        if session.phase() == Phase::Finished {
            break;
        }
    }

    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.transcript_string(), "cat dog");
    assert_eq!(session.score(), ScoreResult { wpm: 2, accuracy: 100 });
}

#[test]
fn headless_timed_session_finishes_by_time() {
    let (mut session, _clock) = ready_session("hello", 3);
    session.start();

    let (_tx, rx) = mpsc::channel();
    let runner = Runner::new(
        TestEventSource::new(rx),
        FixedTicker::new(Duration::from_millis(2)),
    );

    let mut ticks = 0;
    for _ in 0..50u32 {
        if let HakiEvent::Tick = runner.step() {
            session.tick();
            ticks += 1;
        }
        if session.phase() == Phase::Finished {
            break;
        }
    }

    assert_eq!(ticks, 3);
    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.remaining_secs(), 0);
    assert_eq!(session.score(), ScoreResult::INITIAL);
}

#[test]
fn sixty_idle_ticks_end_with_default_score() {
    let (mut session, clock) = ready_session("the quick brown fox", 60);
    session.start();
    for _ in 0..60 {
        clock.advance(Duration::from_secs(1));
        session.tick();
    }
    assert_eq!(session.phase(), Phase::Finished);
    assert_eq!(session.score(), ScoreResult { wpm: 0, accuracy: 100 });
    assert_eq!(session.tick(), TickOutcome::Ignored);
    assert_eq!(session.remaining_secs(), 0);
}

#[test]
fn typo_scenario_reports_per_char_verdicts() {
    let (mut session, clock) = ready_session("hello", 60);
    session.start();
    clock.advance(Duration::from_secs(30));
    assert!(session.input("hxllo"));
    assert_eq!(
        session.verdicts(),
        vec![
            Verdict::Correct,
            Verdict::Incorrect,
            Verdict::Correct,
            Verdict::Correct,
            Verdict::Correct,
        ]
    );
    assert_eq!(session.score().accuracy, 80);
    assert_eq!(session.phase(), Phase::Finished);
}

#[test]
fn stale_tick_from_previous_run_is_ignored_after_restart() {
    let (mut session, _clock) = ready_session("ok", 10);
    session.start();
    let stale = session.timer_token().unwrap();
    session.input("ok");
    assert!(session.restart());
    assert!(session.start());

    assert_eq!(session.tick_with(stale), TickOutcome::Ignored);
    assert_eq!(session.remaining_secs(), 10);
}

#[test]
fn observer_tracks_a_whole_run() {
    let (mut session, _clock) = ready_session("ab", 2);
    let phases = Arc::new(Mutex::new(Vec::new()));
    let _sub = {
        let phases = phases.clone();
        session.subscribe(move |e| {
            if let SessionEvent::PhaseChanged { to, .. } = e {
                phases.lock().unwrap().push(*to);
            }
        })
    };

    session.start();
    session.tick();
    session.tick();
    assert!(session.restart());

    assert_eq!(
        *phases.lock().unwrap(),
        vec![Phase::Typing, Phase::Finished, Phase::Ready]
    );
}
