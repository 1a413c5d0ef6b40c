//! Static screen texts and external links.
//!
//! All HTML-formatted for Telegram. Kept in one place so copy edits never
//! touch handler logic.

use mindmeld_core::session::ApplicationTopic;

pub fn topic_label(topic: ApplicationTopic) -> &'static str {
    match topic {
        ApplicationTopic::Mentorship => "Наставничество",
        ApplicationTopic::Consultation => "Консультация",
    }
}

pub const REVIEWS_CHANNEL_URL: &str = "https://t.me/+4Ov29pR6uj9iYjgy";
pub const REVIEWS_POST_URL: &str = "https://t.me/vse_otvety_vnutri_nas/287";
pub const TRIBUTE_URL: &str = "https://t.me/tribute/app?startapp=dq3J";
pub const CONTACT_TG_URL: &str = "https://t.me/Mr_Nikto4";
pub const DIAGNOSTIC_URL: &str = "https://t.me/m/0JIRBvZ_NmQy";

pub const WELCOME_TEXT: &str = "<b>👋 Привет, рад видеть тебя в моём пространстве!</b>\n\n\
Я — Роман, предприниматель и наставник. Уже более 200 дней подряд практикую осознанные привычки и исследую, \
как маленькие шаги меняют жизнь в долгую. За 8 лет я прошёл путь от «живу по инерции» до состояния, когда сам \
создаю свою реальность и знаю, чего хочу.\n\n\
В этом пространстве я делюсь тем, что работает:\n\
🔧 инструменты для энергии и ясности,\n\
🎯 способы находить своё дело и развивать его,\n\
🧠 опыт, который помогает не просто «читать и знать», а реально применять.\n\n\
<u>Что можно сделать прямо сейчас в этом боте:</u>\n\
• Записаться на диагностику или консультацию\n\
• Скачать полезные гайды (после подписки на канал)\n\
• Узнать о программе наставничества\n\
• Перейти в «Вопрос дня»\n\n\
🔑 Всё, что тебе нужно, уже внутри тебя. Моя задача — помочь это услышать и сделать твоей опорой.";

pub const MENTORSHIP_TEXT: &str = "<b>Наставничество — твой путь к себе и жизни на 100%</b>\n\n\
Это не курс и не вебинар. Это твоя личная трансформация, где мы смотрим не на один кусочек, \
а на всю жизнь целиком: тело и энергию, мышление и режим, окружение, внутреннюю опору и твоё предназначение.\n\n\
📌 <b>Как устроено наставничество:</b>\n\
• 4 недели — 14 тем;\n\
• задания каждые 2 дня, чтобы прожить и закрепить изменения;\n\
• закрытый Telegram-канал со всей информацией;\n\
• моя постоянная личная поддержка;\n\
• по завершении — доступ в сообщество «Осознанные люди», где мы идём дальше.\n\n\
✨ <b>Что ты получишь за 4 недели:</b>\n\
• ясность — поймёшь, кто ты и чего хочешь на самом деле;\n\
• дело, которое приносит радость и доход;\n\
• энергию, которой хватит и на работу, и на жизнь;\n\
• уверенность и внутреннюю опору;\n\
• инструменты, которые останутся с тобой и будут работать каждый день.\n\n\
Главное отличие: книги и курсы дают знания, но откаты возвращают тебя в старое. \
Наставничество — это когда ты не один: рядом проводник, и вместе мы доводим до результата.\n\n\
👉 <b>Хочешь проверить, насколько это твоё?</b> Жми «Оставить заявку» и приходи на бесплатную диагностику.";

pub const CONSULTATION_TEXT: &str = "<b>Консультация — 60 минут, которые помогут сдвинуться с места</b>\n\n\
Это личная встреча со мной 1-на-1 (онлайн). За час мы разбираем твой запрос и собираем <b>пошаговый план</b>, \
с которым можно двигаться дальше. <b>Запись остаётся у тебя.</b>\n\n\
📍 <b>Что включено:</b>\n\
• Определим твою точку А — где ты сейчас.\n\
• Разберём, что мешает двигаться.\n\
• Определим точку Б — чего ты хочешь.\n\
• Сложим пошаговый план на 14–30 дней.\n\n\
🔥 <b>Что получаешь:</b>\n\
• ясность, куда идти и зачем,\n\
• чёткие шаги и практики под твой запрос,\n\
• понимание, как обходить блоки и не застревать снова.\n\n\
<b>Формат:</b> онлайн (Google Meet/Zoom). <b>60 минут.</b>\n\
После — запись и план остаются у тебя.\n\n\
👉 Жми <b>«Оставить заявку»</b>, если хочешь навести порядок в голове и увидеть конкретный путь.\n\n\
<i>Сомневаешься, с чего начать?</i> Жми «Записаться на диагностику» — это бесплатно, 30 минут.";

pub const GUIDES_HEADER: &str = "<b>Выбери один гайд</b>\n\
⚠️ Важно: получить можно <b>только один</b> гайд (чтобы не распыляться и дойти до результата).\n\n\
Каждый гайд — это <b>практический PDF</b> с упражнениями на 20–40 минут, которые помогают не просто «понять», \
а <b>сделать</b>.\n\n\
💡 Перед скачиванием бот проверит подписку на канал — доступ открывается только подписчикам.";

pub const DIAGNOSTICS_TEXT: &str = "<b>Бесплатная диагностика — 30 минут, чтобы понять твой запрос и формат помощи</b>\n\n\
Это короткая стратегическая встреча со мной, где мы:\n\
• проясняем твой запрос и цель;\n\
• смотрим, что мешает сейчас;\n\
• решаем, подойдёт ли тебе консультация или наставничество, и чем они помогут;\n\
• даю 1–2 шага, с которых можно начать уже сегодня.\n\n\
🔎 Цель диагностики — понять, <b>подхожу ли я тебе как проводник</b> и какой формат даст лучший результат.\n\n\
👉 <b>Записаться на диагностику:</b> по кнопке ниже.";

pub const SUPPORT_CAPTION: &str = "<b>Бодоненков Роман Валерьевич</b>\n\
Номер договора 5388079294\n\n\
<b>💛 Поддержать проект</b>\n\
Деньги — это энергия. Если то, что я делаю, ценно для тебя, и хочешь сделать обмен энергией — \
можешь отправить донат в любой сумме.\n\n\
<b>Способы:</b>\n\
• Tribute — открой по кнопке ниже\n\
• СБП по QR — картинка ниже.\n\n\
Благодарю за вклад — он помогает делать больше ценного контента 🙌";

pub const QOD_ENTRY_TEXT: &str = "<b>Вопрос дня</b>\n\
Маленький шаг сегодня — большой сдвиг за месяц. \
Отвечай честно для себя: это займёт 30–60 секунд. (Доступен и свободный ответ.)";

pub const MODE_PROMPT_TEXT: &str =
    "Как ответишь?\n• выбери вариант;\n• или напиши свой свободный ответ.";

pub const COMMENT_PROMPT_TEXT: &str =
    "Напиши коротко (1–2 предложения). Что важного для тебя на сегодня?";

pub const COMMENT_SAVED_TEXT: &str =
    "Спасибо, записал ✅\nВозвращайся завтра — будет новый вопрос.";

pub const FINISHED_TEXT: &str = "Главное — маленький реальный шаг. Увидимся завтра ✌️";

pub const STALE_TEXT: &str =
    "Этот вопрос уже сменился — сегодня новый. Нажми «Ответить сейчас», чтобы начать заново.";

pub const MENU_TEXT: &str = "Выбирай раздел 👇";

pub const ALREADY_RECEIVED_TEXT: &str = "Кажется, ты уже получил свой гайд. \
Закрой текущий цикл — и приходи за следующим на эфир/в мастер-разбор.";

pub const SUBSCRIBE_FIRST_TEXT: &str =
    "Чтобы скачать гайд — подпишись на канал и нажми «Проверить подписку».";

pub const LOOKUP_FAILED_TEXT: &str =
    "Не получилось проверить подписку. Попробуй ещё раз через минуту.";

pub const GUIDE_UNAVAILABLE_TEXT: &str =
    "PDF пока недоступен на сервере — напиши мне в личку, пришлю 🙏";

pub const GUIDE_NOT_FOUND_TEXT: &str = "Файл не найден.";

pub const APPLICATION_PROMPT_TEXT: &str =
    "Напиши одним сообщением: твой запрос + контакт (ник/телефон).";

pub const APPLICATION_ACK_TEXT: &str = "Принял 🙌 Отвечу в личке в ближайшее время.";

pub const STOPREMIND_TEXT: &str = "Напоминания отключены (если были).";
