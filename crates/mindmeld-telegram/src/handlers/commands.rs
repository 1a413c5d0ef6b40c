use std::sync::Arc;

use teloxide::prelude::*;

use mindmeld_core::domain::{ChatId, UserId};

use crate::router::AppState;
use crate::{handlers, keyboards, texts};

pub async fn handle_command(
    _bot: Bot,
    msg: Message,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let user = UserId(from.id.0 as i64);
    let chat = ChatId(msg.chat.id.0);
    let text = msg.text().unwrap_or_default();

    let mut parts = text.splitn(2, char::is_whitespace);
    let name = parts
        .next()
        .unwrap_or_default()
        .split('@')
        .next()
        .unwrap_or_default();
    let args = parts.next().unwrap_or_default().trim();

    match name {
        "/start" | "/menu" => send_welcome(&state, user, chat).await,
        "/stopremind" => {
            state.reminders.cancel(user).await;
            let _ = state
                .messenger
                .send_html(chat, texts::STOPREMIND_TEXT, None)
                .await;
        }
        "/stats" if state.is_admin(user.0) => {
            let stats = state.events.stats();
            let reminders = state.reminders.active_count().await;
            let text = format!(
                "Пользователей: {}\nСобытий: {}\nАктивных напоминаний: {}",
                stats.users, stats.events, reminders
            );
            let _ = state.messenger.send_html(chat, &text, None).await;
        }
        "/broadcast" if state.is_admin(user.0) => {
            if args.is_empty() {
                let _ = state
                    .messenger
                    .send_html(chat, "Использование: /broadcast текст", None)
                    .await;
                return Ok(());
            }
            let sent = state.events.broadcast(state.messenger.as_ref(), args).await;
            let _ = state
                .messenger
                .send_html(chat, &format!("Отправлено: {sent}"), None)
                .await;
        }
        _ => {
            handlers::show(&state, chat, None, texts::MENU_TEXT, keyboards::menu_kb()).await;
        }
    }

    Ok(())
}

/// Welcome photo with the menu; plain text when the photo is missing.
async fn send_welcome(state: &AppState, user: UserId, chat: ChatId) {
    state.events.log(user, "start", "");

    let sent = state
        .messenger
        .send_photo(
            chat,
            &state.cfg.welcome_photo,
            texts::WELCOME_TEXT,
            Some(keyboards::menu_kb()),
        )
        .await;

    if let Err(e) = sent {
        tracing::warn!("welcome photo send failed: {e}");
        let _ = state
            .messenger
            .send_html(chat, texts::WELCOME_TEXT, Some(keyboards::menu_kb()))
            .await;
    }
}
