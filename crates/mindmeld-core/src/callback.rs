//! Callback-data wire format.
//!
//! Button payloads are decoded exactly once, at the transport boundary, into
//! a tagged event type; the interaction logic never sees raw strings. The
//! same table is used to encode keyboard buttons, so encode/parse cannot
//! drift apart.

use crate::domain::QuestionId;
use crate::session::ApplicationTopic;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallbackEvent {
    Nav(NavTarget),
    Apply(ApplicationTopic),
    Guide(String),
    Qod(QodEvent),
}

/// Static menu screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavTarget {
    Menu,
    Mentorship,
    Consultation,
    Diagnostics,
    Guides,
    Qod,
    Reviews,
    Support,
    Contact,
}

/// Question-of-the-day flow events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QodEvent {
    Start,
    Variants,
    Free,
    Pick { question: QuestionId, option: usize },
    AddComment,
    Done,
    Remind,
}

impl CallbackEvent {
    pub fn parse(data: &str) -> Option<Self> {
        if let Some(rest) = data.strip_prefix("nav:") {
            let target = match rest {
                "menu" => NavTarget::Menu,
                "mentorship" => NavTarget::Mentorship,
                "consultation" => NavTarget::Consultation,
                "diagnostics" => NavTarget::Diagnostics,
                "guides" => NavTarget::Guides,
                "qod" => NavTarget::Qod,
                "reviews" => NavTarget::Reviews,
                "support" => NavTarget::Support,
                "contact" => NavTarget::Contact,
                _ => return None,
            };
            return Some(Self::Nav(target));
        }

        if let Some(rest) = data.strip_prefix("req:") {
            let topic = match rest {
                "mentorship" => ApplicationTopic::Mentorship,
                "consultation" => ApplicationTopic::Consultation,
                _ => return None,
            };
            return Some(Self::Apply(topic));
        }

        if let Some(rest) = data.strip_prefix("guide:") {
            if rest.is_empty() {
                return None;
            }
            return Some(Self::Guide(rest.to_string()));
        }

        if let Some(rest) = data.strip_prefix("qod:") {
            let ev = match rest {
                "start" => QodEvent::Start,
                "variants" => QodEvent::Variants,
                "free" => QodEvent::Free,
                "add_comment" => QodEvent::AddComment,
                "done" => QodEvent::Done,
                "remind" => QodEvent::Remind,
                _ => {
                    let payload = rest.strip_prefix("pick:")?;
                    let (q, i) = payload.split_once(':')?;
                    QodEvent::Pick {
                        question: QuestionId(q.parse().ok()?),
                        option: i.parse().ok()?,
                    }
                }
            };
            return Some(Self::Qod(ev));
        }

        None
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Nav(target) => {
                let name = match target {
                    NavTarget::Menu => "menu",
                    NavTarget::Mentorship => "mentorship",
                    NavTarget::Consultation => "consultation",
                    NavTarget::Diagnostics => "diagnostics",
                    NavTarget::Guides => "guides",
                    NavTarget::Qod => "qod",
                    NavTarget::Reviews => "reviews",
                    NavTarget::Support => "support",
                    NavTarget::Contact => "contact",
                };
                format!("nav:{name}")
            }
            Self::Apply(topic) => match topic {
                ApplicationTopic::Mentorship => "req:mentorship".to_string(),
                ApplicationTopic::Consultation => "req:consultation".to_string(),
            },
            Self::Guide(key) => format!("guide:{key}"),
            Self::Qod(ev) => match ev {
                QodEvent::Start => "qod:start".to_string(),
                QodEvent::Variants => "qod:variants".to_string(),
                QodEvent::Free => "qod:free".to_string(),
                QodEvent::AddComment => "qod:add_comment".to_string(),
                QodEvent::Done => "qod:done".to_string(),
                QodEvent::Remind => "qod:remind".to_string(),
                QodEvent::Pick { question, option } => {
                    format!("qod:pick:{}:{}", question.0, option)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        let events = [
            CallbackEvent::Nav(NavTarget::Menu),
            CallbackEvent::Nav(NavTarget::Guides),
            CallbackEvent::Apply(ApplicationTopic::Mentorship),
            CallbackEvent::Guide("path_to_self".to_string()),
            CallbackEvent::Qod(QodEvent::Start),
            CallbackEvent::Qod(QodEvent::Pick {
                question: QuestionId(3),
                option: 1,
            }),
            CallbackEvent::Qod(QodEvent::Remind),
        ];
        for ev in events {
            assert_eq!(CallbackEvent::parse(&ev.encode()), Some(ev));
        }
    }

    #[test]
    fn rejects_malformed_data() {
        for data in [
            "",
            "nav:",
            "nav:unknown",
            "guide:",
            "qod:pick",
            "qod:pick:x:y",
            "qod:pick:1",
            "askuser:1:2",
        ] {
            assert_eq!(CallbackEvent::parse(data), None, "data: {data:?}");
        }
    }
}
