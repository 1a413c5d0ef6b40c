//! Inline keyboard layouts for every screen.

use mindmeld_core::{
    callback::{CallbackEvent, NavTarget, QodEvent},
    catalog::ContentCatalog,
    daily::Question,
    messaging::types::{InlineButton, InlineKeyboard},
    session::ApplicationTopic,
};

use crate::texts;

fn nav(label: &str, target: NavTarget) -> InlineButton {
    InlineButton::callback(label, CallbackEvent::Nav(target).encode())
}

fn qod(label: &str, ev: QodEvent) -> InlineButton {
    InlineButton::callback(label, CallbackEvent::Qod(ev).encode())
}

pub fn back_row() -> Vec<InlineButton> {
    vec![nav("← Назад", NavTarget::Menu)]
}

pub fn back_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![back_row()])
}

pub fn menu_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![
            nav("🎯 Наставничество", NavTarget::Mentorship),
            nav("💬 Консультация", NavTarget::Consultation),
        ],
        vec![nav("🧭 Диагностика (30 мин, бесплатно)", NavTarget::Diagnostics)],
        vec![nav("📚 Гайды", NavTarget::Guides), nav("🔮 Вопрос дня", NavTarget::Qod)],
        vec![nav("💎 Отзывы", NavTarget::Reviews), nav("💛 Поддержать", NavTarget::Support)],
        vec![nav("📞 Связаться", NavTarget::Contact)],
    ])
}

pub fn mentorship_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::callback(
            "✅ Оставить заявку",
            CallbackEvent::Apply(ApplicationTopic::Mentorship).encode(),
        )],
        vec![InlineButton::url(
            "🧭 Записаться на диагностику",
            texts::DIAGNOSTIC_URL,
        )],
        back_row(),
    ])
}

pub fn consultation_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::callback(
            "✅ Оставить заявку",
            CallbackEvent::Apply(ApplicationTopic::Consultation).encode(),
        )],
        vec![InlineButton::url(
            "🧭 Записаться на диагностику",
            texts::DIAGNOSTIC_URL,
        )],
        back_row(),
    ])
}

pub fn diagnostics_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::url(
            "✅ Записаться на диагностику",
            texts::DIAGNOSTIC_URL,
        )],
        back_row(),
    ])
}

pub fn reviews_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::url(
            "Открыть канал с отзывами",
            texts::REVIEWS_CHANNEL_URL,
        )],
        vec![InlineButton::url("Пост-подборка", texts::REVIEWS_POST_URL)],
        back_row(),
    ])
}

pub fn support_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::url("Открыть Tribute", texts::TRIBUTE_URL)],
        back_row(),
    ])
}

pub fn contact_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::url("Написать в Telegram", texts::CONTACT_TG_URL)],
        back_row(),
    ])
}

pub fn guides_kb(catalog: &ContentCatalog) -> InlineKeyboard {
    let mut rows: Vec<Vec<InlineButton>> = catalog
        .iter()
        .map(|entry| {
            vec![InlineButton::callback(
                entry.title.clone(),
                CallbackEvent::Guide(entry.key.clone()).encode(),
            )]
        })
        .collect();
    rows.push(back_row());
    InlineKeyboard::new(rows)
}

/// Shown when a non-subscriber asks for a guide: subscribe link, an instant
/// re-check of the same guide, and the way back.
pub fn subscribe_kb(channel: &str, guide_key: &str) -> InlineKeyboard {
    let channel_url = format!("https://t.me/{}", channel.trim_start_matches('@'));
    InlineKeyboard::new(vec![
        vec![InlineButton::url("Подписаться на канал", channel_url)],
        vec![InlineButton::callback(
            "Проверить подписку",
            CallbackEvent::Guide(guide_key.to_string()).encode(),
        )],
        back_row(),
    ])
}

pub fn qod_entry_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![qod("Ответить сейчас", QodEvent::Start)],
        back_row(),
    ])
}

pub fn mode_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![qod("Выбрать из вариантов", QodEvent::Variants)],
        vec![qod("Свободный ответ", QodEvent::Free)],
        back_row(),
    ])
}

pub fn question_kb(question: &Question) -> InlineKeyboard {
    let mut rows: Vec<Vec<InlineButton>> = question
        .options
        .iter()
        .enumerate()
        .map(|(idx, opt)| {
            vec![qod(
                opt,
                QodEvent::Pick {
                    question: question.id,
                    option: idx,
                },
            )]
        })
        .collect();
    rows.push(back_row());
    InlineKeyboard::new(rows)
}

pub fn after_pick_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![qod("Добавить свободный комментарий", QodEvent::AddComment)],
        vec![qod("Готово", QodEvent::Done)],
        back_row(),
    ])
}

pub fn reminder_offer_kb() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![qod("Поставить напоминание на завтра", QodEvent::Remind)],
        back_row(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    use mindmeld_core::callback::CallbackEvent;

    #[test]
    fn every_callback_button_encodes_a_parsable_event() {
        let catalog = ContentCatalog::builtin(Path::new("assets")).unwrap();
        let question = mindmeld_core::daily::QuestionRotation::builtin()
            .question_for(chrono::NaiveDate::from_ymd_opt(2026, 8, 7).unwrap())
            .clone();

        let keyboards = [
            menu_kb(),
            mentorship_kb(),
            consultation_kb(),
            diagnostics_kb(),
            reviews_kb(),
            support_kb(),
            contact_kb(),
            guides_kb(&catalog),
            subscribe_kb("@channel", "path_to_self"),
            qod_entry_kb(),
            mode_kb(),
            question_kb(&question),
            after_pick_kb(),
            reminder_offer_kb(),
        ];

        for kb in keyboards {
            for row in kb.rows {
                for button in row {
                    if let InlineButton::Callback { data, .. } = button {
                        assert!(
                            CallbackEvent::parse(&data).is_some(),
                            "unparsable callback data: {data}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn subscribe_kb_links_to_the_channel() {
        let kb = subscribe_kb("@vse_otvety_vnutri_nas", "path_to_self");
        let InlineButton::Url { url, .. } = &kb.rows[0][0] else {
            panic!("expected a url button");
        };
        assert_eq!(url, "https://t.me/vse_otvety_vnutri_nas");
    }
}
