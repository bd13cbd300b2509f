use crate::bot::router::{CREATE_PROFILE_BUTTON, LATER_BUTTON};
use crate::db::models::{Category, Profile};
use crate::transport::Keyboard;

pub const WELCOME: &str = "Добро пожаловать! Выберите сферу деятельности вашего бизнеса:";
pub const CHOOSE_CATEGORY: &str = "Выберите сферу деятельности вашего бизнеса:";
pub const CHOOSE_CATEGORY_FIRST: &str = "Сначала выберите сферу деятельности вашего бизнеса:";
pub const NO_REPORTS: &str = "Пока нет отчетов для этой категории.";
pub const PROFILE_OFFER: &str = "Вы регулярно получаете отчеты. Хотите персонализированные саммари?";
pub const PROFILE_LATER: &str = "Хорошо, вы можете создать профиль позже через команду /create_profile";
pub const DESCRIPTION_PROMPT: &str = "📝 Опишите ваш продукт (до 140 символов):";
pub const DESCRIPTION_TOO_LONG: &str = "Описание слишком длинное. Пожалуйста, уложитесь в 140 символов.";
pub const WEBSITE_PROMPT: &str = "🌍 Укажите ссылку на сайт вашего продукта:";
pub const WEBSITE_INVALID: &str = "Пожалуйста, введите корректный URL, начинающийся с http:// или https://";
pub const PROFILE_SAVED: &str = "✅ Спасибо! Ваш профиль успешно создан. \
Теперь отчеты будут содержать персонализированные саммари для вашего бизнеса.";
pub const PROFILE_SAVE_FAILED: &str = "Произошла ошибка при сохранении профиля. Попробуйте позже.";
pub const GENERIC_ERROR: &str = "Произошла ошибка. Попробуйте позже.";
pub const NO_USERS: &str = "Пока нет зарегистрированных пользователей.";

pub fn category_selected(category: Category) -> String {
    format!("Вы выбрали категорию: {}\nОтправляем отчеты...", category.label())
}

pub fn categories_keyboard() -> Keyboard {
    Keyboard::Buttons(Category::ALL.iter().map(|c| c.label().to_string()).collect())
}

pub fn profile_keyboard() -> Keyboard {
    Keyboard::Buttons(vec![CREATE_PROFILE_BUTTON.to_string(), LATER_BUTTON.to_string()])
}

/// Plain-text dump used by `/users` and the `users` CLI command.
pub fn format_profiles(profiles: &[Profile]) -> String {
    if profiles.is_empty() {
        return NO_USERS.to_string();
    }

    let mut response = String::from("Список зарегистрированных пользователей:\n\n");
    for profile in profiles {
        response.push_str(&format!(
            "👤 ID: {}\n📂 Категория: {}\n📝 Описание: {}\n🌍 Сайт: {}\n🕒 Дата регистрации: {}\n\n",
            profile.user_id,
            profile.category.label(),
            profile.description,
            profile.website,
            profile.created_at.format("%Y-%m-%d %H:%M:%S"),
        ));
    }
    response
}
