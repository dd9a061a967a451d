use crate::constants::{limits::LOG_BODY_LENGTH, pagination as pagination_constants};
use crate::errors::ToolError;
use crate::managers::method::MethodDescriptor;
use crate::managers::request::RequestTemplate;
use crate::services::logger::Logger;
use crate::services::transport::{HttpResponse, ResolvedRequest, Transport};
use crate::utils::query::QueryMap;
use crate::utils::redact::{redact_secret, redact_text};
use serde_json::Value;
use std::sync::Arc;

/// Everything needed to issue one call, single-shot or paginated.
#[derive(Clone, Debug)]
pub struct CallPlan {
    pub template: RequestTemplate,
    pub query: QueryMap,
    pub method: MethodDescriptor,
    pub messages: Vec<String>,
}

/// Page-size decision made before the first page is requested.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageSize {
    /// The named parameter was set to its declared maximum.
    Maximum { param: String, value: u64 },
    /// No declared maximum; the API default applies.
    ApiDefault,
}

/// Prepares `query` for a paginated call.
///
/// Adds `nextPageToken` to a sparse `fields` selector and raises the page
/// size parameter (`maxResults`, else `pageSize`) to its declared maximum.
pub fn prepare_page_query(query: &mut QueryMap, method: &MethodDescriptor) -> PageSize {
    let next_field = pagination_constants::NEXT_PAGE_TOKEN_FIELD;
    if let Some(Value::String(fields)) = query.get_mut(pagination_constants::FIELDS_PARAM) {
        if !fields.is_empty() && !fields.contains(next_field) {
            fields.push(',');
            fields.push_str(next_field);
        }
    }

    let declared = pagination_constants::PAGE_SIZE_PARAMS
        .iter()
        .find_map(|name| method.parameters.get(*name).map(|schema| (*name, schema)));
    match declared.and_then(|(name, schema)| schema.maximum().map(|max| (name, max))) {
        Some((param, value)) => {
            query.insert(param.to_string(), Value::from(value));
            PageSize::Maximum {
                param: param.to_string(),
                value,
            }
        }
        None => PageSize::ApiDefault,
    }
}

/// The API's list field: the first entry, in document order, holding a
/// non-empty array. Its name varies by API (`files`, `items`, `messages`).
pub fn first_list_field(page: &serde_json::Map<String, Value>) -> Option<&Vec<Value>> {
    page.values()
        .find_map(|value| value.as_array().filter(|items| !items.is_empty()))
}

fn next_page_token(page: &serde_json::Map<String, Value>) -> Option<String> {
    page.get(pagination_constants::NEXT_PAGE_TOKEN_FIELD)
        .and_then(|v| v.as_str())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

#[derive(Clone)]
pub struct Executor {
    logger: Logger,
    transport: Arc<dyn Transport>,
}

impl Executor {
    pub fn new(logger: Logger, transport: Arc<dyn Transport>) -> Self {
        Self {
            logger: logger.child("executor"),
            transport,
        }
    }

    /// Issues `request` with status-error suppression and returns whatever
    /// status came back.
    async fn send(&self, mut request: ResolvedRequest) -> Result<HttpResponse, ToolError> {
        request.mute_http_exceptions = true;
        self.logger.debug(
            &format!(
                "{} {}",
                request.http_method,
                redact_text(&request.url, LOG_BODY_LENGTH)
            ),
            None,
        );
        self.transport.fetch(&request).await
    }

    fn fail(&self, plan: &CallPlan, response: HttpResponse) -> ToolError {
        self.logger.warn(&plan.messages.join("\n"), None);
        self.logger.debug(
            "API request failed",
            Some(&serde_json::json!({
                "status": response.status,
                "body": redact_secret(&response.body, plan.template.token.as_deref(), LOG_BODY_LENGTH),
            })),
        );
        ToolError::api_request_failed(response.status, response.body)
    }

    /// One request. A 200 response is returned untouched.
    pub async fn execute_once(&self, plan: &CallPlan) -> Result<HttpResponse, ToolError> {
        let response = self.send(plan.template.build(&plan.query)).await?;
        if response.status != 200 {
            return Err(self.fail(plan, response));
        }
        Ok(response)
    }

    /// Follows `nextPageToken` until it runs out and concatenates every
    /// page's list field. Any failed page aborts the whole call.
    pub async fn paginate(&self, plan: &CallPlan) -> Result<Vec<Value>, ToolError> {
        let mut query = plan.query.clone();
        match prepare_page_query(&mut query, &plan.method) {
            PageSize::Maximum { param, value } => self.logger.debug(
                "Using maximum page size",
                Some(&serde_json::json!({"param": param, "value": value})),
            ),
            PageSize::ApiDefault => self.logger.warn(
                "The maximum 'pageSize' is not found. So, this request uses the default pageSize. If you know the maximum pageSize in this API, please include it in 'query'.",
                None,
            ),
        }

        let mut items: Vec<Value> = Vec::new();
        let mut pages = 0usize;
        loop {
            pages += 1;
            self.logger.info(&format!("Page {}", pages), None);
            let response = self.send(plan.template.build(&query)).await?;
            if response.status != 200 {
                return Err(self.fail(plan, response));
            }
            let parsed: Value = serde_json::from_str(&response.body).map_err(|err| {
                ToolError::invalid_response(format!("Page {} is not valid JSON: {}", pages, err))
            })?;
            let page = parsed.as_object().ok_or_else(|| {
                ToolError::invalid_response(format!("Page {} is not a JSON object", pages))
            })?;
            if let Some(list) = first_list_field(page) {
                items.extend(list.iter().cloned());
            }
            self.logger
                .info(&format!("Current number of list items {}", items.len()), None);

            match next_page_token(page) {
                Some(token) => {
                    query.insert(
                        pagination_constants::PAGE_TOKEN_PARAM.to_string(),
                        Value::String(token),
                    );
                }
                None => break,
            }
        }
        self.logger
            .info(&format!("Total number of pages is {}.", pages), None);
        Ok(items)
    }
}
