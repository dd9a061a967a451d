use crate::constants::discovery::INDEX_FIELDS;
use crate::errors::ToolError;
use crate::services::logger::Logger;
use crate::services::transport::{HttpResponse, ResolvedRequest, Transport};
use crate::services::validation::Validation;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryEntry {
    pub name: String,
    pub version: String,
    pub title: String,
    pub discovery_rest_url: String,
    pub documentation_link: String,
}

impl DiscoveryEntry {
    /// Advisory lines shown by `describe` and logged when a call fails.
    pub fn messages(&self) -> Vec<String> {
        vec![
            format!("Discovery rest URL is {}", self.discovery_rest_url),
            format!(
                "Please enable {} {} at Advanced Google services or API console.",
                self.title, self.version
            ),
            format!("The link of official document is {}.", self.documentation_link),
        ]
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct DiscoveryIndex {
    #[serde(default)]
    pub items: Option<Vec<DiscoveryEntry>>,
}

/// Result of looking an API up in the discovery index.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedApi {
    pub url: String,
    pub entry: DiscoveryEntry,
}

/// Looks up `(api, version)` in the discovery index.
#[derive(Clone)]
pub struct DiscoveryResolver {
    logger: Logger,
    validation: Validation,
    transport: Arc<dyn Transport>,
    index_url: String,
}

impl DiscoveryResolver {
    pub fn new(logger: Logger, transport: Arc<dyn Transport>, index_url: impl Into<String>) -> Self {
        Self {
            logger: logger.child("discovery"),
            validation: Validation::new(),
            transport,
            index_url: index_url.into(),
        }
    }

    pub async fn resolve(&self, api: &str, version: &str) -> Result<ResolvedApi, ToolError> {
        let url = index_lookup_url(&self.index_url, api);
        self.logger.debug("Discovery index lookup", Some(&serde_json::json!({"url": url})));

        let document = fetch_document(self.transport.as_ref(), &url).await?;
        let index: DiscoveryIndex = serde_json::from_value(document).map_err(|err| {
            ToolError::invalid_discovery_response(format!("Invalid values are returned. {}", err))
        })?;
        let items = index.items.ok_or_else(|| {
            ToolError::invalid_discovery_response("Invalid values are returned.")
                .with_hint("The discovery index response did not contain 'items'.")
        })?;

        let entry = select_entry(&items, api, version).cloned().ok_or_else(|| {
            let available: Vec<String> = items
                .iter()
                .filter(|e| e.name.eq_ignore_ascii_case(api))
                .map(|e| e.version.clone())
                .collect();
            ToolError::api_not_found(
                "Inputted API was not found. Please confirm your inputted values again.",
            )
            .with_hint(if available.is_empty() {
                format!("No API named '{}' is listed by the discovery service.", api)
            } else {
                format!(
                    "'{}' is available in version(s): {}.",
                    api,
                    available.join(", ")
                )
            })
            .with_details(serde_json::json!({
                "api": api,
                "version": version,
                "available_versions": available,
            }))
        })?;
        self.validation
            .ensure_http_url(&entry.discovery_rest_url, "discoveryRestUrl")?;

        Ok(ResolvedApi {
            url: entry.discovery_rest_url.clone(),
            entry,
        })
    }
}

/// `fields` is sent as a literal `*`; only the API name is percent-encoded.
fn index_lookup_url(index_url: &str, api: &str) -> String {
    format!(
        "{}?fields={}&name={}",
        index_url,
        INDEX_FIELDS,
        urlencoding::encode(api)
    )
}

/// Entry whose name matches `api` ignoring case and whose version matches exactly.
pub fn select_entry<'a>(
    items: &'a [DiscoveryEntry],
    api: &str,
    version: &str,
) -> Option<&'a DiscoveryEntry> {
    items
        .iter()
        .find(|e| e.name.eq_ignore_ascii_case(api) && e.version == version)
}

/// GETs a discovery resource and parses it as JSON.
///
/// A non-200 answer fails with the body verbatim; a body that is not JSON is an
/// invalid discovery response.
pub(crate) async fn fetch_document(
    transport: &dyn Transport,
    url: &str,
) -> Result<Value, ToolError> {
    let mut request = ResolvedRequest::get(url);
    request.mute_http_exceptions = true;
    let HttpResponse { status, body, .. } = transport.fetch(&request).await?;
    if status != 200 {
        return Err(ToolError::api_request_failed(status, body));
    }
    serde_json::from_str(&body).map_err(|err| {
        ToolError::invalid_discovery_response(format!(
            "Discovery response from {} is not valid JSON: {}",
            url, err
        ))
    })
}
