use crate::errors::ToolError;
use crate::managers::api::ApiManager;
use crate::services::logger::Logger;
use crate::services::settings::Settings;
use crate::services::token::{
    ChainTokenProvider, CommandTokenProvider, EnvTokenProvider, TokenProvider,
};
use crate::services::transport::{ReqwestTransport, Transport};
use std::sync::Arc;

pub struct App {
    pub api_manager: Arc<ApiManager>,
}

impl App {
    pub fn initialize() -> Result<Self, ToolError> {
        Self::with_settings(Settings::from_env())
    }

    pub fn with_settings(settings: Settings) -> Result<Self, ToolError> {
        let mut logger = Logger::new("gapi");
        logger.set_level(settings.log_level);

        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new(settings.timeout_ms));
        let token_provider = Self::default_token_provider(&settings);
        let api_manager = Arc::new(
            ApiManager::new(logger, transport, token_provider)
                .with_discovery_url(settings.discovery_url),
        );

        Ok(Self { api_manager })
    }

    /// Environment variable first, then the token command.
    fn default_token_provider(settings: &Settings) -> Arc<dyn TokenProvider> {
        let mut providers: Vec<Arc<dyn TokenProvider>> =
            vec![Arc::new(EnvTokenProvider::new(settings.access_token_env.clone()))];
        if let Some(command) = CommandTokenProvider::from_command_line(&settings.token_command) {
            providers.push(Arc::new(command.with_timeout_ms(settings.timeout_ms)));
        }
        Arc::new(ChainTokenProvider::new(providers))
    }
}
