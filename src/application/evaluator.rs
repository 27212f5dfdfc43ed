//! Answer evaluation: turning an oracle judgment into a scoring outcome.
//!
//! The oracle judges the free-text guess against the current clip; this
//! module interprets that judgment into a points delta and per-field
//! resolution state under an explicit scoring policy.

use serde::Deserialize;
use std::sync::Arc;

use crate::domain::game::{GameError, GameSession, GuessedItems};
use crate::domain::oracle::prompts::{self, JudgeReply};
use crate::domain::oracle::ResponseSanitizer;
use crate::ports::{ChatMessage, ConversationGateway};

/// What a judgment decided success on.
///
/// The two strategies disagree when the oracle reports points without both
/// fields guessed (or vice versa), so the choice is explicit rather than
/// merged. `GuessDriven` is canonical: both guessed-items flags are the
/// sole success criterion, which by construction cannot contradict the
/// point total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    #[default]
    GuessDriven,
    /// Legacy behavior: any positive `pointsEarned` counts as success and
    /// is banked immediately, with no partial-credit state.
    PointsDriven,
}

/// How a judgment should be applied to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgmentOutcome {
    /// The round's scoring is settled: award the delta and clear
    /// partial-guess state.
    Resolved,
    /// Exactly one field was found: persist the progress, no points yet.
    Partial(GuessedItems),
    /// Incorrect guess: nothing changes, the player can try again.
    NoChange,
}

/// Result of evaluating one guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judgment {
    pub presenter_text: String,
    pub success: bool,
    /// Points to award when the outcome is `Resolved`; always zero
    /// otherwise.
    pub points_delta: u32,
    pub outcome: JudgmentOutcome,
}

/// Evaluates guesses by delegating judgment to the oracle.
pub struct AnswerEvaluator {
    oracle: Arc<dyn ConversationGateway>,
    sanitizer: ResponseSanitizer,
    policy: ScoringPolicy,
}

impl AnswerEvaluator {
    pub fn new(oracle: Arc<dyn ConversationGateway>, policy: ScoringPolicy) -> Self {
        Self {
            oracle,
            sanitizer: ResponseSanitizer::new(),
            policy,
        }
    }

    /// Judges a first (or repeated) guess for the current clip.
    pub async fn evaluate_guess(
        &self,
        session: &GameSession,
        user_answer: &str,
    ) -> Result<Judgment, GameError> {
        let track = session.require_current_song()?;
        let instruction = prompts::judge_instruction(track);
        let reply = self.judge(session, &instruction, user_answer).await?;
        let merged = session.guessed_items().merged_with(reply.guessed_items);

        let judgment = match self.policy {
            ScoringPolicy::PointsDriven => {
                let points = reply.awarded_points();
                Judgment {
                    presenter_text: reply.text,
                    success: points > 0,
                    points_delta: points,
                    outcome: JudgmentOutcome::Resolved,
                }
            }
            ScoringPolicy::GuessDriven if merged.is_complete() => Judgment {
                points_delta: reply.awarded_points(),
                presenter_text: reply.text,
                success: true,
                outcome: JudgmentOutcome::Resolved,
            },
            ScoringPolicy::GuessDriven if merged.is_partial() => Judgment {
                presenter_text: reply.text,
                success: false,
                points_delta: 0,
                outcome: JudgmentOutcome::Partial(merged),
            },
            ScoringPolicy::GuessDriven => Judgment {
                presenter_text: reply.text,
                success: false,
                points_delta: 0,
                outcome: JudgmentOutcome::NoChange,
            },
        };

        Ok(judgment)
    }

    /// Judges the supplementary guess of a partially-solved round. Unlike
    /// `evaluate_guess` this always settles the round: the prompt tells the
    /// oracle to reveal the answer when the outcome is still incomplete.
    pub async fn evaluate_completion(
        &self,
        session: &GameSession,
        user_answer: &str,
    ) -> Result<Judgment, GameError> {
        let track = session.require_current_song()?;
        let prior = session.guessed_items();
        let instruction = prompts::completion_instruction(track, prior);
        let reply = self.judge(session, &instruction, user_answer).await?;
        let merged = prior.merged_with(reply.guessed_items);

        let (success, points_delta) = match self.policy {
            ScoringPolicy::PointsDriven => {
                let points = reply.awarded_points();
                (points > 0, points)
            }
            ScoringPolicy::GuessDriven => {
                let success = merged.is_complete();
                (success, if success { reply.awarded_points() } else { 0 })
            }
        };

        Ok(Judgment {
            presenter_text: reply.text,
            success,
            points_delta,
            outcome: JudgmentOutcome::Resolved,
        })
    }

    async fn judge(
        &self,
        session: &GameSession,
        instruction: &str,
        user_answer: &str,
    ) -> Result<JudgeReply, GameError> {
        let mut transcript: Vec<ChatMessage> =
            session.transcript().iter().map(ChatMessage::from).collect();
        transcript.push(ChatMessage::system(instruction));
        transcript.push(ChatMessage::user(user_answer));

        let raw = self.oracle.send(&transcript).await?;
        self.sanitizer
            .parse(&raw)
            .map_err(|e| GameError::upstream_parse(e.to_string()))
    }
}
