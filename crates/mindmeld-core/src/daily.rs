//! Question-of-the-day flow.
//!
//! A small state machine per user: choose how to answer, pick a variant,
//! optionally add a free-text comment, finish, optionally ask for a daily
//! reminder. Every event returns a [`FlowReply`] directive; rendering and
//! transport stay in the adapter.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::{
    callback::QodEvent,
    domain::{QuestionId, UserId},
    session::{ApplicationTopic, SessionStore, Stage, UserSession},
};

/// One question in the rotation, with its fixed answer options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub options: Vec<String>,
}

/// The fixed daily rotation.
///
/// Selection is by day-of-epoch ordinal modulo the rotation length, so the
/// same calendar day yields the same question for every user, with no
/// per-user randomness, and the rotation wraps cleanly.
#[derive(Clone, Debug)]
pub struct QuestionRotation {
    questions: Vec<Question>,
}

impl QuestionRotation {
    pub fn builtin() -> Self {
        let q = |id: u32, text: &str, options: &[&str]| Question {
            id: QuestionId(id),
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        };

        Self {
            questions: vec![
                q(
                    0,
                    "Сколько времени сегодня ты уделишь себе (чистому присутствию)?",
                    &["2 мин", "5 мин", "10 мин", "20+ мин"],
                ),
                q(
                    1,
                    "Что сегодня даст тебе больше энергии?",
                    &["Сон", "Движение", "Тишина/медитация", "Вода/питание"],
                ),
                q(
                    2,
                    "Где сегодня нужен один честный шаг?",
                    &["Здоровье", "Дело", "Отношения", "Дом/быт"],
                ),
                q(
                    3,
                    "Что ты готов отпустить сегодня?",
                    &["Сомнения", "Спешку", "Контроль", "Оправдания"],
                ),
                q(
                    4,
                    "Какой минимум сделаешь при любой погоде?",
                    &["1 действие", "3 действия", "5 действий", "Сначала 1 — потом ещё"],
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Deterministic day slot: same date, same index, for all observers.
    pub fn day_index(&self, date: NaiveDate) -> usize {
        date.num_days_from_ce().rem_euclid(self.questions.len() as i32) as usize
    }

    pub fn question_for(&self, date: NaiveDate) -> &Question {
        &self.questions[self.day_index(date)]
    }
}

/// User-originated events, decoded once at the transport boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowEvent {
    Start,
    PickVariants,
    FreeAnswer,
    Choose { question: QuestionId, option: usize },
    AddComment,
    Done,
    Remind,
    Menu,
    Apply(ApplicationTopic),
    Text(String),
}

impl From<QodEvent> for FlowEvent {
    fn from(ev: QodEvent) -> Self {
        match ev {
            QodEvent::Start => Self::Start,
            QodEvent::Variants => Self::PickVariants,
            QodEvent::Free => Self::FreeAnswer,
            QodEvent::Pick { question, option } => Self::Choose { question, option },
            QodEvent::AddComment => Self::AddComment,
            QodEvent::Done => Self::Done,
            QodEvent::Remind => Self::Remind,
        }
    }
}

/// What the adapter should show next. Pure data; no transport calls here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowReply {
    /// "How will you answer?": variants vs free-form.
    ModePrompt,
    /// Show today's question with its option buttons.
    QuestionPrompt(Question),
    /// An option was recorded; offer a comment or finishing.
    ChoiceAccepted { choice: String },
    /// Ask the user to type their comment / free answer.
    CommentPrompt,
    /// The typed comment was consumed; the cycle is complete.
    CommentSaved,
    /// Finished without a comment; offer the daily reminder.
    Finished,
    /// The caller should (re)schedule the reminder job.
    ReminderRequested,
    /// Back to the main menu.
    BackToMenu,
    /// The event referenced a question that is not today's; offer a restart.
    Stale,
    /// Ask the user to type their application in one message.
    ApplicationPrompt(ApplicationTopic),
    /// An application text was consumed; forward it to the admin chat.
    ApplicationReceived {
        topic: ApplicationTopic,
        text: String,
    },
    /// Plain text outside any flow; show the menu.
    OrdinaryText,
}

/// The per-user interaction state machine.
pub struct DailyFlow {
    sessions: Arc<SessionStore>,
    rotation: QuestionRotation,
}

impl DailyFlow {
    pub fn new(sessions: Arc<SessionStore>, rotation: QuestionRotation) -> Self {
        Self { sessions, rotation }
    }

    pub fn rotation(&self) -> &QuestionRotation {
        &self.rotation
    }

    /// Feed one event through the machine. All session mutation happens
    /// under the user's lock; the reply is a pure directive.
    pub async fn apply(&self, user: UserId, event: FlowEvent, today: NaiveDate) -> FlowReply {
        let today_q = self.rotation.question_for(today).clone();
        self.sessions
            .update(user, |s| transition(s, event, &today_q))
            .await
    }
}

fn transition(s: &mut UserSession, event: FlowEvent, today: &Question) -> FlowReply {
    // Universal escape hatch: valid from every state, clears transient
    // fields, never touches the permanent flags.
    if matches!(event, FlowEvent::Menu) {
        s.reset_to_idle();
        return FlowReply::BackToMenu;
    }

    // A button press while a comment is awaited cancels the flow instead of
    // leaving an orphaned "next text is a comment" trap.
    if s.stage == Stage::AwaitingComment && !matches!(event, FlowEvent::Text(_)) {
        s.reset_to_idle();
        return FlowReply::BackToMenu;
    }

    match event {
        FlowEvent::Menu => {
            s.reset_to_idle();
            FlowReply::BackToMenu
        }
        FlowEvent::Start => {
            s.stage = Stage::ChoosingMode;
            s.pending_question = None;
            s.pending_choice = None;
            FlowReply::ModePrompt
        }
        FlowEvent::PickVariants => {
            s.stage = Stage::SelectingVariant;
            s.pending_question = Some(today.id);
            s.pending_choice = None;
            FlowReply::QuestionPrompt(today.clone())
        }
        FlowEvent::FreeAnswer => {
            s.stage = Stage::AwaitingComment;
            s.pending_question = Some(today.id);
            s.pending_choice = None;
            FlowReply::CommentPrompt
        }
        FlowEvent::Choose { question, option } => {
            if question != today.id {
                // Yesterday's keyboard. Soft failure: safe state + restart offer.
                s.reset_to_idle();
                return FlowReply::Stale;
            }
            let Some(choice) = today.options.get(option) else {
                // Unknown option index: no-op, re-render the same prompt.
                s.stage = Stage::SelectingVariant;
                s.pending_question = Some(today.id);
                return FlowReply::QuestionPrompt(today.clone());
            };
            // A double tap lands here twice and overwrites the choice;
            // nothing downstream fires until Done/AddComment.
            s.stage = Stage::AfterPick;
            s.pending_question = Some(today.id);
            s.pending_choice = Some(choice.clone());
            FlowReply::ChoiceAccepted {
                choice: choice.clone(),
            }
        }
        FlowEvent::AddComment => {
            if s.stage != Stage::AfterPick {
                s.reset_to_idle();
                return FlowReply::Stale;
            }
            s.stage = Stage::AwaitingComment;
            FlowReply::CommentPrompt
        }
        FlowEvent::Done => {
            if s.stage != Stage::AfterPick {
                s.reset_to_idle();
                return FlowReply::Stale;
            }
            s.stage = Stage::Completed;
            FlowReply::Finished
        }
        // Side effect only; the scheduler owns idempotent re-scheduling.
        FlowEvent::Remind => FlowReply::ReminderRequested,
        FlowEvent::Apply(topic) => {
            s.stage = Stage::AwaitingApplication(topic);
            s.pending_question = None;
            s.pending_choice = None;
            FlowReply::ApplicationPrompt(topic)
        }
        FlowEvent::Text(text) => match s.stage {
            Stage::AwaitingComment => {
                s.stage = Stage::Completed;
                FlowReply::CommentSaved
            }
            Stage::AwaitingApplication(topic) => {
                s.reset_to_idle();
                FlowReply::ApplicationReceived { topic, text }
            }
            _ => FlowReply::OrdinaryText,
        },
    }
}
