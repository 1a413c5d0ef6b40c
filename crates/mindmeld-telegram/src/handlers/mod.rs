//! Telegram update handlers.
//!
//! Each handler decodes the update at the boundary (typed callback events,
//! command names, plain text), drives the core, and renders the returned
//! directive. Rendering is shared between callbacks (edit in place) and
//! text messages (send fresh) via [`render_flow_reply`].

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};

use mindmeld_core::{
    daily::FlowReply,
    domain::{ChatId, MessageRef, UserId},
    messaging::types::InlineKeyboard,
};

use crate::{keyboards, texts};
use crate::router::AppState;

mod callback;
mod commands;
mod text;

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    if let Some(text) = msg.text() {
        if text.starts_with('/') {
            return commands::handle_command(bot, msg, state).await;
        }
        return text::handle_text(bot, msg, state).await;
    }

    // Stickers, voice, photos and the rest: just point back at the menu.
    let chat = ChatId(msg.chat.id.0);
    let _ = state
        .messenger
        .send_html(chat, texts::MENU_TEXT, Some(keyboards::menu_kb()))
        .await;
    Ok(())
}

/// Show a screen: edit the tapped message when we have one, otherwise send
/// a fresh message. A failed edit (message too old, already deleted) falls
/// back to sending.
pub(crate) async fn show(
    state: &AppState,
    chat: ChatId,
    target: Option<MessageRef>,
    html: &str,
    keyboard: InlineKeyboard,
) {
    if let Some(msg) = target {
        if state
            .messenger
            .edit_html(msg, html, Some(keyboard.clone()))
            .await
            .is_ok()
        {
            return;
        }
    }
    if let Err(e) = state.messenger.send_html(chat, html, Some(keyboard)).await {
        tracing::warn!("failed to show screen in chat {}: {e}", chat.0);
    }
}

/// Render a state-machine directive to the user.
pub(crate) async fn render_flow_reply(
    state: &AppState,
    user: UserId,
    chat: ChatId,
    target: Option<MessageRef>,
    reply: FlowReply,
) {
    match reply {
        FlowReply::ModePrompt => {
            show(state, chat, target, texts::MODE_PROMPT_TEXT, keyboards::mode_kb()).await;
        }
        FlowReply::QuestionPrompt(question) => {
            let kb = keyboards::question_kb(&question);
            show(state, chat, target, &question.text, kb).await;
        }
        FlowReply::ChoiceAccepted { choice } => {
            state.events.log(user, "qod_pick", &choice);
            let text = format!(
                "Принято ✅\nСохрани для себя: {choice}.\nХочешь добавить пару слов?"
            );
            show(state, chat, target, &text, keyboards::after_pick_kb()).await;
        }
        FlowReply::CommentPrompt => {
            show(
                state,
                chat,
                target,
                texts::COMMENT_PROMPT_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
        FlowReply::CommentSaved => {
            state.events.log(user, "qod_comment", "");
            show(
                state,
                chat,
                target,
                texts::COMMENT_SAVED_TEXT,
                keyboards::reminder_offer_kb(),
            )
            .await;
        }
        FlowReply::Finished => {
            state.events.log(user, "qod_done", "");
            show(
                state,
                chat,
                target,
                texts::FINISHED_TEXT,
                keyboards::reminder_offer_kb(),
            )
            .await;
        }
        FlowReply::ReminderRequested => {
            state.reminders.schedule(user).await;
            state.events.log(user, "qod_remind", "");
            let text = format!(
                "Напомню завтра в {}. Можно отключить командой /stopremind.",
                state.reminders.fire_time().format("%H:%M")
            );
            show(state, chat, target, &text, keyboards::back_kb()).await;
        }
        FlowReply::BackToMenu => {
            show(state, chat, target, texts::MENU_TEXT, keyboards::menu_kb()).await;
        }
        FlowReply::Stale => {
            show(state, chat, target, texts::STALE_TEXT, keyboards::qod_entry_kb()).await;
        }
        FlowReply::ApplicationPrompt(topic) => {
            state.events.log(user, "apply", texts::topic_label(topic));
            show(
                state,
                chat,
                target,
                texts::APPLICATION_PROMPT_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
        // Application texts are consumed in the text handler, which also
        // forwards them to the admin chat.
        FlowReply::ApplicationReceived { .. } | FlowReply::OrdinaryText => {
            show(state, chat, target, texts::MENU_TEXT, keyboards::menu_kb()).await;
        }
    }
}
