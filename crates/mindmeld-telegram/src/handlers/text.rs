use std::sync::Arc;

use teloxide::prelude::*;

use mindmeld_core::{
    daily::{FlowEvent, FlowReply},
    domain::{ChatId, UserId},
};

use crate::router::AppState;
use crate::{handlers, keyboards, texts};

pub async fn handle_text(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    let user = UserId(from.id.0 as i64);
    let chat = ChatId(msg.chat.id.0);

    let reply = state
        .flow
        .apply(user, FlowEvent::Text(text), state.today())
        .await;

    // Applications carry the sender's identity to the admin chat, so they
    // are handled here rather than in the shared renderer.
    if let FlowReply::ApplicationReceived { topic, text } = reply {
        forward_application(&state, user, from.username.as_deref(), topic, &text).await;
        let _ = state
            .messenger
            .send_html(chat, texts::APPLICATION_ACK_TEXT, Some(keyboards::back_kb()))
            .await;
        return Ok(());
    }

    handlers::render_flow_reply(&state, user, chat, None, reply).await;
    Ok(())
}

async fn forward_application(
    state: &AppState,
    user: UserId,
    username: Option<&str>,
    topic: mindmeld_core::session::ApplicationTopic,
    text: &str,
) {
    let label = texts::topic_label(topic);
    state.events.log(user, "send_application", label);

    let Some(&admin) = state.cfg.admin_users.first() else {
        tracing::warn!("application received but ADMIN_USERS is empty; dropping forward");
        return;
    };

    let admin_msg = format!(
        "📥 Новая заявка\nРаздел: {label}\nОт: @{} (id {})\n\nТекст:\n{text}",
        username.unwrap_or("no_username"),
        user.0
    );
    if let Err(e) = state
        .messenger
        .send_html(ChatId(admin), &admin_msg, None)
        .await
    {
        tracing::warn!("failed to forward application to admin: {e}");
    }
}
