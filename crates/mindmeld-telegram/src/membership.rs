//! Membership lookup via `getChatMember`.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ChatMemberKind, Recipient},
};

use mindmeld_core::{
    domain::UserId,
    errors::Error,
    ports::{Membership, MembershipPort},
    Result,
};

pub struct TelegramMembership {
    bot: Bot,
}

impl TelegramMembership {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

/// `@username` (with or without the `@`) or a numeric channel id.
fn channel_recipient(group: &str) -> Recipient {
    let group = group.trim();
    if let Ok(id) = group.parse::<i64>() {
        return Recipient::Id(teloxide::types::ChatId(id));
    }
    let username = if group.starts_with('@') {
        group.to_string()
    } else {
        format!("@{group}")
    };
    Recipient::ChannelUsername(username)
}

#[async_trait]
impl MembershipPort for TelegramMembership {
    async fn get_membership(&self, group: &str, user: UserId) -> Result<Membership> {
        let member = self
            .bot
            .get_chat_member(
                channel_recipient(group),
                teloxide::types::UserId(user.0 as u64),
            )
            .await
            .map_err(|e| Error::External(format!("getChatMember failed: {e}")))?;

        Ok(match member.kind {
            ChatMemberKind::Owner(_) | ChatMemberKind::Administrator(_) | ChatMemberKind::Member => {
                Membership::Member
            }
            _ => Membership::NotMember,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_resolution() {
        assert!(matches!(
            channel_recipient("-1001234567890"),
            Recipient::Id(teloxide::types::ChatId(-1001234567890))
        ));
        match channel_recipient("vse_otvety_vnutri_nas") {
            Recipient::ChannelUsername(u) => assert_eq!(u, "@vse_otvety_vnutri_nas"),
            other => panic!("unexpected recipient: {other:?}"),
        }
        match channel_recipient("@already_prefixed") {
            Recipient::ChannelUsername(u) => assert_eq!(u, "@already_prefixed"),
            other => panic!("unexpected recipient: {other:?}"),
        }
    }
}
