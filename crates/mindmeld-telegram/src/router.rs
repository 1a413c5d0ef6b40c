use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use mindmeld_core::{
    catalog::ContentCatalog,
    config::Config,
    daily::{DailyFlow, QuestionRotation},
    distributor::ContentDistributor,
    entitlement::EntitlementGate,
    eventlog::EventLogger,
    messaging::port::MessagingPort,
    reminder::ReminderScheduler,
    session::SessionStore,
};

use crate::{handlers, membership::TelegramMembership, TelegramMessenger};

pub struct AppState {
    pub cfg: Arc<Config>,
    pub catalog: Arc<ContentCatalog>,
    pub messenger: Arc<dyn MessagingPort>,
    pub distributor: Arc<ContentDistributor>,
    pub flow: Arc<DailyFlow>,
    pub reminders: ReminderScheduler,
    pub events: Arc<EventLogger>,
}

impl AppState {
    /// "Today" for the question rotation, in the bot's configured zone so
    /// the question flips at local midnight, not UTC midnight.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.cfg.reminder_tz).date_naive()
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.cfg.admin_users.contains(&user_id)
    }
}

pub async fn run_polling(cfg: Arc<Config>, catalog: Arc<ContentCatalog>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        tracing::info!("mindmeld started: @{}", me.username());
    }
    tracing::info!("gated channel: {}", cfg.channel);
    tracing::info!(
        "daily reminder at {} {}",
        cfg.reminder_time.format("%H:%M"),
        cfg.reminder_tz
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let membership = Arc::new(TelegramMembership::new(bot.clone()));

    let sessions = Arc::new(SessionStore::new(Some(cfg.grants_file.clone())));
    let events = Arc::new(EventLogger::new(cfg.events_file.clone()));

    let gate = Arc::new(EntitlementGate::new(
        catalog.clone(),
        sessions.clone(),
        membership,
        cfg.channel.clone(),
        cfg.lookup_timeout,
    ));
    let distributor = Arc::new(ContentDistributor::new(
        catalog.clone(),
        sessions.clone(),
        gate,
        messenger.clone(),
        events.clone(),
        cfg.send_timeout,
    ));
    let flow = Arc::new(DailyFlow::new(sessions.clone(), QuestionRotation::builtin()));
    let reminders = ReminderScheduler::new(
        cfg.reminder_time,
        cfg.reminder_tz,
        sessions.clone(),
        messenger.clone(),
    );

    let state = Arc::new(AppState {
        cfg,
        catalog,
        messenger,
        distributor,
        flow,
        reminders,
        events,
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
