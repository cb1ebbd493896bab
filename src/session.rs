//! The typing-test session: phase machine, input tracking, countdown and live
//! scoring for one reference text.
//!
//! Everything happens on the caller's thread. Key input goes through
//! [`Session::input`] (or the [`Session::type_char`] / [`Session::backspace`]
//! shorthands) and the event loop calls [`Session::tick`] once per second.

use crate::clock::{Clock, Countdown, SystemClock, TickOutcome, TimerToken};
use crate::diff::{diff, Verdict};
use crate::error::{HakiError, Result};
use crate::observer::{Subscribers, Subscription};
use crate::reference::ReferenceText;
use crate::scoring::{score_with, ScoreResult, WpmConvention};
use crate::typing_policy::InputPolicy;
use std::time::{Duration, Instant};
use tracing::{debug, info};

pub const DEFAULT_DURATION_SECS: u32 = 60;

/// Shown to the participant before the test.
pub const RULES: [&str; 4] = [
    "You have only one attempt to complete this test",
    "Use of AI tools or extensions is strictly prohibited",
    "The test will auto-end when the timer reaches zero",
    "Your score is calculated based on WPM and accuracy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub duration_secs: u32,
    /// Competition sessions cannot be restarted once finished.
    pub competition: bool,
    pub input_policy: InputPolicy,
    pub wpm_convention: WpmConvention,
}

impl SessionConfig {
    pub fn new(duration_secs: u32) -> Result<Self> {
        if duration_secs == 0 {
            return Err(HakiError::ZeroDuration);
        }
        Ok(Self {
            duration_secs,
            ..Self::default()
        })
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
            competition: false,
            input_policy: InputPolicy::default(),
            wpm_convention: WpmConvention::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Rules,
    Ready,
    Typing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum FinishReason {
    TimeUp,
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    PhaseChanged { from: Phase, to: Phase },
    TranscriptChanged { len: usize },
    ScoreUpdated(ScoreResult),
    Tick { remaining_secs: u32 },
}

#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    reference: ReferenceText,
    config: SessionConfig,
    clock: C,
    phase: Phase,
    transcript: Vec<char>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    finish_reason: Option<FinishReason>,
    countdown: Countdown,
    score: ScoreResult,
    subscribers: Subscribers<SessionEvent>,
}

impl Session<SystemClock> {
    pub fn new(reference: ReferenceText, config: SessionConfig) -> Self {
        Self::with_clock(reference, config, SystemClock)
    }
}

impl<C: Clock> Session<C> {
    pub fn with_clock(reference: ReferenceText, config: SessionConfig, clock: C) -> Self {
        Self {
            reference,
            countdown: Countdown::new(config.duration_secs),
            config,
            clock,
            phase: Phase::Rules,
            transcript: Vec::new(),
            started_at: None,
            finished_at: None,
            finish_reason: None,
            score: ScoreResult::INITIAL,
            subscribers: Subscribers::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn score(&self) -> ScoreResult {
        self.score
    }

    pub fn remaining_secs(&self) -> u32 {
        self.countdown.remaining_secs()
    }

    pub fn reference(&self) -> &ReferenceText {
        &self.reference
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn transcript(&self) -> &[char] {
        &self.transcript
    }

    pub fn transcript_string(&self) -> String {
        self.transcript.iter().collect()
    }

    /// Index of the next char to type.
    pub fn cursor(&self) -> usize {
        self.transcript.len()
    }

    pub fn verdicts(&self) -> Vec<Verdict> {
        diff(&self.reference, &self.transcript)
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    pub fn is_competition(&self) -> bool {
        self.config.competition
    }

    /// Time spent typing: up to now while typing, frozen once finished.
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => self.clock.now().saturating_duration_since(start),
            _ => Duration::ZERO,
        }
    }

    /// Token for the countdown currently running, if any.
    pub fn timer_token(&self) -> Option<TimerToken> {
        self.countdown.token()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: FnMut(&SessionEvent) + Send + 'static,
    {
        self.subscribers.subscribe(callback)
    }

    /// Switch between practice and competition. Only allowed while the rules
    /// are on screen.
    pub fn set_competition(&mut self, competition: bool) -> bool {
        if self.phase != Phase::Rules {
            return false;
        }
        self.config.competition = competition;
        true
    }

    /// Rules -> Ready.
    pub fn acknowledge(&mut self) -> bool {
        if self.phase != Phase::Rules {
            debug!(phase = %self.phase, "acknowledge ignored");
            return false;
        }
        self.set_phase(Phase::Ready);
        true
    }

    /// Ready -> Typing. Starts the clock and the countdown from a clean slate.
    pub fn start(&mut self) -> bool {
        if self.phase != Phase::Ready {
            debug!(phase = %self.phase, "start ignored");
            return false;
        }
        self.clear_attempt();
        self.started_at = Some(self.clock.now());
        self.countdown.arm(self.config.duration_secs);
        self.set_phase(Phase::Typing);
        self.subscribers.notify(&SessionEvent::ScoreUpdated(self.score));
        true
    }

    /// Finished -> Ready, practice sessions only.
    pub fn restart(&mut self) -> bool {
        if self.phase != Phase::Finished || self.config.competition {
            debug!(
                phase = %self.phase,
                competition = self.config.competition,
                "restart ignored"
            );
            return false;
        }
        self.clear_attempt();
        self.set_phase(Phase::Ready);
        true
    }

    /// Offer a whole new transcript. Returns whether it was taken.
    pub fn input(&mut self, candidate: &str) -> bool {
        self.apply(candidate.chars().collect())
    }

    pub fn type_char(&mut self, c: char) -> bool {
        let mut candidate = Vec::with_capacity(self.transcript.len() + 1);
        candidate.extend_from_slice(&self.transcript);
        candidate.push(c);
        self.apply(candidate)
    }

    /// Offer the transcript minus its last char; the input policy decides.
    pub fn backspace(&mut self) -> bool {
        match self.transcript.split_last() {
            Some((_, rest)) => {
                let candidate = rest.to_vec();
                self.apply(candidate)
            }
            None => false,
        }
    }

    /// Advance the running countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        match self.countdown.token() {
            Some(token) => self.tick_with(token),
            None => TickOutcome::Ignored,
        }
    }

    /// Advance the countdown only if `token` belongs to the current run.
    pub fn tick_with(&mut self, token: TimerToken) -> TickOutcome {
        if self.phase != Phase::Typing {
            return TickOutcome::Ignored;
        }
        let outcome = self.countdown.tick(token);
        match outcome {
            TickOutcome::Ignored => debug!(?token, "stale tick dropped"),
            TickOutcome::Running { remaining_secs } => {
                self.subscribers
                    .notify(&SessionEvent::Tick { remaining_secs });
            }
            TickOutcome::Expired => {
                self.subscribers
                    .notify(&SessionEvent::Tick { remaining_secs: 0 });
                self.finish(FinishReason::TimeUp);
            }
        }
        outcome
    }

    fn apply(&mut self, candidate: Vec<char>) -> bool {
        if self.phase != Phase::Typing {
            debug!(phase = %self.phase, "input discarded");
            return false;
        }
        if candidate == self.transcript {
            return false;
        }
        if !self
            .config
            .input_policy
            .accepts(&self.transcript, &candidate, self.reference.len())
        {
            debug!(
                len = candidate.len(),
                max = self.reference.len(),
                policy = ?self.config.input_policy,
                "input rejected"
            );
            return false;
        }

        self.transcript = candidate;
        let elapsed_minutes = self.elapsed().as_secs_f64() / 60.0;
        self.score = score_with(
            self.config.wpm_convention,
            &self.reference,
            &self.transcript,
            elapsed_minutes,
        );
        self.subscribers.notify(&SessionEvent::TranscriptChanged {
            len: self.transcript.len(),
        });
        self.subscribers
            .notify(&SessionEvent::ScoreUpdated(self.score));

        if self.transcript.len() == self.reference.len() {
            self.finish(FinishReason::Completed);
        }
        true
    }

    fn finish(&mut self, reason: FinishReason) {
        self.countdown.disarm();
        self.finished_at = Some(self.clock.now());
        self.finish_reason = Some(reason);
        self.set_phase(Phase::Finished);
        info!(
            reason = %reason,
            wpm = self.score.wpm,
            accuracy = self.score.accuracy,
            elapsed_secs = self.elapsed().as_secs_f64(),
            "session finished"
        );
    }

    fn clear_attempt(&mut self) {
        self.transcript.clear();
        self.countdown.reset(self.config.duration_secs);
        self.score = ScoreResult::INITIAL;
        self.started_at = None;
        self.finished_at = None;
        self.finish_reason = None;
    }

    fn set_phase(&mut self, to: Phase) {
        let from = std::mem::replace(&mut self.phase, to);
        debug!(%from, %to, "phase change");
        self.subscribers
            .notify(&SessionEvent::PhaseChanged { from, to });
    }
}
