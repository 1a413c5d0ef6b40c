use std::sync::Arc;

use teloxide::prelude::*;

use mindmeld_core::{
    callback::{CallbackEvent, NavTarget},
    daily::FlowEvent,
    domain::{ChatId, MessageId, MessageRef, UserId},
    entitlement::DenyReason,
    errors::Error,
};

use crate::router::AppState;
use crate::{handlers, keyboards, texts};

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let cb_id = q.id.clone();
    let data = q.data.clone().unwrap_or_default();
    let Some(message) = q.message.as_ref() else {
        let _ = state.messenger.answer_callback_query(&cb_id, None).await;
        return Ok(());
    };

    let user = UserId(q.from.id.0 as i64);
    let chat = ChatId(message.chat.id.0);
    let msg_ref = MessageRef {
        chat_id: chat,
        message_id: MessageId(message.id.0),
    };

    // Ack the tap right away so the button stops spinning.
    let _ = state.messenger.answer_callback_query(&cb_id, None).await;

    let Some(event) = CallbackEvent::parse(&data) else {
        tracing::warn!("ignoring unparsable callback data from {}: {data:?}", user.0);
        return Ok(());
    };

    match event {
        CallbackEvent::Nav(target) => {
            handle_nav(&state, user, chat, msg_ref, target).await;
        }
        CallbackEvent::Apply(topic) => {
            let reply = state
                .flow
                .apply(user, FlowEvent::Apply(topic), state.today())
                .await;
            handlers::render_flow_reply(&state, user, chat, Some(msg_ref), reply).await;
        }
        CallbackEvent::Guide(key) => {
            handle_guide(&state, user, chat, msg_ref, &key).await;
        }
        CallbackEvent::Qod(ev) => {
            let reply = state.flow.apply(user, ev.into(), state.today()).await;
            handlers::render_flow_reply(&state, user, chat, Some(msg_ref), reply).await;
        }
    }

    Ok(())
}

async fn handle_nav(
    state: &AppState,
    user: UserId,
    chat: ChatId,
    msg_ref: MessageRef,
    target: NavTarget,
) {
    match target {
        NavTarget::Menu => {
            // Drop any in-flight flow state, then replace the screen.
            state.flow.apply(user, FlowEvent::Menu, state.today()).await;
            let _ = state.messenger.delete_message(msg_ref).await;
            let _ = state
                .messenger
                .send_html(chat, texts::MENU_TEXT, Some(keyboards::menu_kb()))
                .await;
        }
        NavTarget::Mentorship => {
            state.events.log(user, "open_mentorship", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::MENTORSHIP_TEXT,
                keyboards::mentorship_kb(),
            )
            .await;
        }
        NavTarget::Consultation => {
            state.events.log(user, "open_consultation", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::CONSULTATION_TEXT,
                keyboards::consultation_kb(),
            )
            .await;
        }
        NavTarget::Diagnostics => {
            state.events.log(user, "open_diagnostics", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::DIAGNOSTICS_TEXT,
                keyboards::diagnostics_kb(),
            )
            .await;
        }
        NavTarget::Guides => {
            state.events.log(user, "open_guides", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::GUIDES_HEADER,
                keyboards::guides_kb(&state.catalog),
            )
            .await;
        }
        NavTarget::Qod => {
            state.events.log(user, "open_qod", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::QOD_ENTRY_TEXT,
                keyboards::qod_entry_kb(),
            )
            .await;
        }
        NavTarget::Reviews => {
            state.events.log(user, "open_reviews", "");
            handlers::show(state, chat, Some(msg_ref), "Отзывы:", keyboards::reviews_kb()).await;
        }
        NavTarget::Support => {
            state.events.log(user, "open_support", "");
            handle_support(state, chat, msg_ref).await;
        }
        NavTarget::Contact => {
            state.events.log(user, "open_contact", "");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                "Связаться со мной:",
                keyboards::contact_kb(),
            )
            .await;
        }
    }
}

/// Support screen comes with the payment QR; fall back to text when the
/// photo is missing on disk.
async fn handle_support(state: &AppState, chat: ChatId, msg_ref: MessageRef) {
    let sent = state
        .messenger
        .send_photo(
            chat,
            &state.cfg.qr_photo,
            texts::SUPPORT_CAPTION,
            Some(keyboards::support_kb()),
        )
        .await;

    match sent {
        Ok(_) => {
            let _ = state.messenger.delete_message(msg_ref).await;
        }
        Err(e) => {
            tracing::warn!("QR send failed: {e}");
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::SUPPORT_CAPTION,
                keyboards::support_kb(),
            )
            .await;
        }
    }
}

async fn handle_guide(state: &AppState, user: UserId, chat: ChatId, msg_ref: MessageRef, key: &str) {
    match state.distributor.deliver(user, chat, key).await {
        // The PDF went out with its own caption and keyboard.
        Ok(()) => {}
        Err(Error::AlreadyDelivered) => {
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::ALREADY_RECEIVED_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
        Err(Error::NotFound(_)) => {
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::GUIDE_NOT_FOUND_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
        Err(Error::Denied(DenyReason::NotSubscribed)) => {
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::SUBSCRIBE_FIRST_TEXT,
                keyboards::subscribe_kb(&state.cfg.channel, key),
            )
            .await;
        }
        Err(Error::Denied(DenyReason::LookupFailed)) => {
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::LOOKUP_FAILED_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
        Err(e) => {
            tracing::warn!("guide delivery to {} failed: {e}", user.0);
            handlers::show(
                state,
                chat,
                Some(msg_ref),
                texts::GUIDE_UNAVAILABLE_TEXT,
                keyboards::back_kb(),
            )
            .await;
        }
    }
}
