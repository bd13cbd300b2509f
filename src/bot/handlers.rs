use tracing::{info, warn};

use crate::bot::router::Route;
use crate::bot::state::SessionState;
use crate::bot::{messages, validate_description, validate_website, BotContext, BotError};
use crate::db::models::Category;
use crate::transport::{InboundMessage, Keyboard, OutboundMessage};

impl BotContext {
    pub(super) async fn run_route(
        &self,
        route: Route,
        message: &InboundMessage,
        state: SessionState,
    ) -> Result<(), BotError> {
        let user_id = message.user_id;

        match route {
            Route::Start => self.on_start(user_id).await,
            Route::Users => self.on_users(user_id).await,
            Route::CreateProfileCommand => self.on_create_profile_command(user_id, &state).await,
            Route::Category(category) => self.on_category(user_id, category).await,
            Route::Later => self.on_later(user_id).await,
            Route::CreateProfile => match state {
                SessionState::AwaitingProfileDecision { category } => {
                    self.ask_description(user_id, category).await
                }
                _ => Ok(()),
            },
            Route::Description => match state {
                SessionState::AwaitingDescription { category } => {
                    self.on_description(user_id, category, &message.text).await
                }
                _ => Ok(()),
            },
            Route::Website => match state {
                SessionState::AwaitingWebsite { category, description } => {
                    self.on_website(user_id, category, description, &message.text).await
                }
                _ => Ok(()),
            },
        }
    }

    async fn on_start(&self, user_id: i64) -> Result<(), BotError> {
        info!("Start command received from user {}", user_id);
        self.sessions.set(user_id, SessionState::AwaitingCategory).await;
        self.reply(
            OutboundMessage::text(user_id, messages::WELCOME)
                .with_keyboard(messages::categories_keyboard()),
        )
        .await
    }

    async fn on_users(&self, user_id: i64) -> Result<(), BotError> {
        let profiles = self.store.list_all().await?;
        self.reply(OutboundMessage::text(user_id, messages::format_profiles(&profiles)))
            .await
    }

    async fn on_category(&self, user_id: i64, category: Category) -> Result<(), BotError> {
        self.sessions
            .set(user_id, SessionState::AwaitingProfileDecision { category })
            .await;
        self.reply(
            OutboundMessage::text(user_id, messages::category_selected(category))
                .with_keyboard(Keyboard::Remove),
        )
        .await?;

        let reports = self.store.reports_by_category(category).await?;
        let profile = match self.store.get(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Could not load profile for {}, sending without summary: {}", user_id, e);
                None
            }
        };

        if reports.is_empty() {
            self.reply(OutboundMessage::text(user_id, messages::NO_REPORTS)).await?;
        } else {
            for report in &reports {
                self.dispatcher.deliver(user_id, report, profile.as_ref()).await;
            }
        }

        tokio::time::sleep(self.settings.profile_offer_delay).await;
        self.reply(
            OutboundMessage::text(user_id, messages::PROFILE_OFFER)
                .with_keyboard(messages::profile_keyboard()),
        )
        .await
    }

    async fn on_later(&self, user_id: i64) -> Result<(), BotError> {
        self.sessions.clear(user_id).await;
        self.reply(
            OutboundMessage::text(user_id, messages::PROFILE_LATER)
                .with_keyboard(messages::categories_keyboard()),
        )
        .await
    }

    async fn on_create_profile_command(
        &self,
        user_id: i64,
        state: &SessionState,
    ) -> Result<(), BotError> {
        let category = match state.pending_category() {
            Some(category) => Some(category),
            None => self.store.get(user_id).await?.map(|profile| profile.category),
        };

        match category {
            Some(category) => self.ask_description(user_id, category).await,
            None => {
                self.sessions.set(user_id, SessionState::AwaitingCategory).await;
                self.reply(
                    OutboundMessage::text(user_id, messages::CHOOSE_CATEGORY_FIRST)
                        .with_keyboard(messages::categories_keyboard()),
                )
                .await
            }
        }
    }

    async fn ask_description(&self, user_id: i64, category: Category) -> Result<(), BotError> {
        self.sessions
            .set(user_id, SessionState::AwaitingDescription { category })
            .await;
        self.reply(
            OutboundMessage::text(user_id, messages::DESCRIPTION_PROMPT)
                .with_keyboard(Keyboard::Remove),
        )
        .await
    }

    async fn on_description(
        &self,
        user_id: i64,
        category: Category,
        text: &str,
    ) -> Result<(), BotError> {
        let description = validate_description(text)?;

        self.sessions
            .set(
                user_id,
                SessionState::AwaitingWebsite {
                    category,
                    description: description.to_string(),
                },
            )
            .await;
        self.reply(OutboundMessage::text(user_id, messages::WEBSITE_PROMPT)).await
    }

    async fn on_website(
        &self,
        user_id: i64,
        category: Category,
        description: String,
        text: &str,
    ) -> Result<(), BotError> {
        let website = validate_website(text)?;

        // The session ends here whether or not the write succeeds.
        self.sessions.clear(user_id).await;
        self.store
            .upsert(user_id, category, &description, website)
            .await
            .map_err(BotError::ProfileNotSaved)?;
        info!("Saved profile for user {} in {}", user_id, category);

        self.reply(OutboundMessage::text(user_id, messages::PROFILE_SAVED)).await?;
        self.reply(
            OutboundMessage::text(user_id, messages::CHOOSE_CATEGORY)
                .with_keyboard(messages::categories_keyboard()),
        )
        .await
    }
}
