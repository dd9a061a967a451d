use crate::constants::{discovery::INDEX_URL, network::API_KEY_PARAM};
use crate::errors::ToolError;
use crate::managers::discovery::DiscoveryResolver;
use crate::managers::executor::{CallPlan, Executor};
use crate::managers::method::{MethodResolver, ResolvedMethod};
use crate::managers::request::RequestTemplate;
use crate::services::logger::Logger;
use crate::services::token::TokenProvider;
use crate::services::transport::{HttpResponse, Transport};
use crate::services::validation::Validation;
use crate::utils::query::QueryMap;
use crate::utils::tool_errors::unknown_action_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

const API_ACTIONS: &[&str] = &["describe", "execute"];

/// Which remote operation to invoke.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiSelector {
    pub api: String,
    pub version: String,
    pub method_name: String,
}

impl ApiSelector {
    pub fn new(
        api: impl Into<String>,
        version: impl Into<String>,
        method_name: impl Into<String>,
    ) -> Self {
        Self {
            api: api.into(),
            version: version.into(),
            method_name: method_name.into(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiParams {
    /// Values substituted into the method's path template.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<serde_json::Map<String, Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryMap>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Value>,
    /// Follow `nextPageToken` when the method supports it.
    pub use_page_token: bool,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_inf: Option<ApiSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_params: Option<ApiParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// What `execute` produced: the raw response, or the accumulated list when
/// pagination was used.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecuteOutcome {
    Response(HttpResponse),
    Items(Vec<Value>),
}

impl ExecuteOutcome {
    pub fn to_value(&self) -> Value {
        match self {
            ExecuteOutcome::Response(response) => {
                let body = response
                    .json()
                    .unwrap_or_else(|_| Value::String(response.body.clone()));
                serde_json::json!({
                    "success": true,
                    "paginated": false,
                    "status": response.status,
                    "headers": response.headers,
                    "body": body,
                })
            }
            ExecuteOutcome::Items(items) => serde_json::json!({
                "success": true,
                "paginated": true,
                "count": items.len(),
                "items": items,
            }),
        }
    }
}

/// Facade over discovery, method resolution and execution.
///
/// Holds the caller's configuration; every `describe`/`execute` works on its
/// own copy so repeated calls never see each other's mutations.
#[derive(Clone)]
pub struct ApiManager {
    logger: Logger,
    validation: Validation,
    transport: Arc<dyn Transport>,
    token_provider: Arc<dyn TokenProvider>,
    discovery_url: String,
    config: ClientConfig,
}

impl ApiManager {
    pub fn new(
        logger: Logger,
        transport: Arc<dyn Transport>,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            logger: logger.child("api"),
            validation: Validation::new(),
            transport,
            token_provider,
            discovery_url: INDEX_URL.to_string(),
            config: ClientConfig::default(),
        }
    }

    pub fn with_discovery_url(mut self, url: impl Into<String>) -> Self {
        self.discovery_url = url.into();
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_api_inf(&mut self, selector: ApiSelector) -> &mut Self {
        self.config.api_inf = Some(selector);
        self
    }

    pub fn set_api_params(&mut self, params: ApiParams) -> &mut Self {
        self.config.api_params = Some(params);
        self
    }

    /// Token used instead of the provider's when no API key is in the query.
    pub fn set_access_token(&mut self, token: impl Into<String>) -> &mut Self {
        self.config.access_token = Some(token.into());
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn handle_action(&self, args: Value) -> Result<Value, ToolError> {
        let action = args.get("action");
        let action_name = action.and_then(|v| v.as_str()).unwrap_or("");
        if !API_ACTIONS.contains(&action_name) {
            return Err(unknown_action_error(action, API_ACTIONS));
        }
        let config: ClientConfig = serde_json::from_value(args.clone()).map_err(|err| {
            ToolError::invalid_configuration(format!("Invalid object. {}", err))
        })?;
        let scoped = self.clone().with_config(config);
        match action_name {
            "describe" => {
                let messages = scoped.describe().await?;
                Ok(serde_json::json!({"success": true, "messages": messages}))
            }
            _ => Ok(scoped.execute().await?.to_value()),
        }
    }

    /// Resolves the API and method without sending the request, returning
    /// the advisory messages.
    pub async fn describe(&self) -> Result<Vec<String>, ToolError> {
        let config = self.config.clone();
        let selector = self.checked_selector(&config)?;
        let path = config.api_params.as_ref().and_then(|p| p.path.as_ref());
        let (_, messages) = self.resolve(&selector, path).await?;
        Ok(messages)
    }

    /// Resolves and sends the call. Paginates when `usePageToken` is set and
    /// the method declares a `pageToken` parameter.
    pub async fn execute(&self) -> Result<ExecuteOutcome, ToolError> {
        let config = self.config.clone();
        let selector = self.checked_selector(&config)?;
        let params = config.api_params.clone().unwrap_or_default();
        let query = params.query.clone().unwrap_or_default();
        let token = self.resolve_token(&config, &query).await?;

        let (resolved, messages) = self.resolve(&selector, params.path.as_ref()).await?;
        let paginate = params.use_page_token
            && resolved
                .descriptor
                .has_parameter(crate::constants::pagination::PAGE_TOKEN_PARAM);
        let plan = CallPlan {
            template: RequestTemplate {
                endpoint: resolved.endpoint.clone(),
                http_method: resolved.descriptor.http_method.clone(),
                body: params.request_body.clone().filter(|b| !b.is_null()),
                token,
            },
            query,
            method: resolved.descriptor,
            messages,
        };

        let executor = Executor::new(self.logger.clone(), self.transport.clone());
        if paginate {
            return Ok(ExecuteOutcome::Items(executor.paginate(&plan).await?));
        }
        Ok(ExecuteOutcome::Response(executor.execute_once(&plan).await?))
    }

    fn checked_selector(&self, config: &ClientConfig) -> Result<ApiSelector, ToolError> {
        let selector = config.api_inf.as_ref().ok_or_else(|| {
            ToolError::invalid_configuration("Invalid object. Please confirm it again.")
                .with_hint("Set apiInf with api, version and methodName.")
        })?;
        Ok(ApiSelector {
            api: self.validation.ensure_string(&selector.api, "apiInf.api")?,
            version: self
                .validation
                .ensure_string(&selector.version, "apiInf.version")?,
            method_name: self
                .validation
                .ensure_string(&selector.method_name, "apiInf.methodName")?,
        })
    }

    /// Explicit token first, then the provider. Skipped entirely when the
    /// query authenticates with an API key.
    async fn resolve_token(
        &self,
        config: &ClientConfig,
        query: &QueryMap,
    ) -> Result<Option<String>, ToolError> {
        if query.contains_key(API_KEY_PARAM) {
            return Ok(None);
        }
        if let Some(token) = config
            .access_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
        {
            return Ok(Some(token.to_string()));
        }
        self.token_provider.access_token().await.map(Some)
    }

    async fn resolve(
        &self,
        selector: &ApiSelector,
        path: Option<&serde_json::Map<String, Value>>,
    ) -> Result<(ResolvedMethod, Vec<String>), ToolError> {
        let discovery =
            DiscoveryResolver::new(self.logger.clone(), self.transport.clone(), &self.discovery_url);
        let api = discovery.resolve(&selector.api, &selector.version).await?;
        let methods = MethodResolver::new(self.logger.clone(), self.transport.clone());
        let resolved = methods
            .resolve(&api.url, &selector.method_name, path)
            .await?;
        let mut messages = api.entry.messages();
        messages.extend(resolved.messages.iter().cloned());
        Ok((resolved, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_reads_camel_case_document() {
        let config: ClientConfig = serde_json::from_value(serde_json::json!({
            "apiInf": {"api": "drive", "version": "v3", "methodName": "files.list"},
            "apiParams": {
                "query": {"fields": "files(id)"},
                "usePageToken": true
            },
            "accessToken": "tok"
        }))
        .unwrap();
        assert_eq!(
            config.api_inf,
            Some(ApiSelector::new("drive", "v3", "files.list"))
        );
        let params = config.api_params.unwrap();
        assert!(params.use_page_token);
        assert!(params.path.is_none());
        assert_eq!(config.access_token.as_deref(), Some("tok"));
    }

    #[test]
    fn use_page_token_defaults_to_false() {
        let params: ApiParams = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(!params.use_page_token);
    }

    #[test]
    fn outcome_value_parses_json_bodies() {
        let outcome = ExecuteOutcome::Response(HttpResponse::new(200, r#"{"id":"1"}"#));
        let value = outcome.to_value();
        assert_eq!(value["body"]["id"], "1");
        assert_eq!(value["paginated"], false);

        let text = ExecuteOutcome::Response(HttpResponse::new(200, "plain"));
        assert_eq!(text.to_value()["body"], "plain");
    }
}
