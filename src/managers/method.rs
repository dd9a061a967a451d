use crate::errors::ToolError;
use crate::managers::discovery::fetch_document;
use crate::services::logger::Logger;
use crate::services::transport::Transport;
use crate::services::validation::Validation;
use crate::utils::path_template::substitute_params;
use crate::utils::tool_errors::method_not_found_error;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Schema of a single method parameter. Only the declared maximum matters
/// to the client; everything else in the schema is ignored.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ParameterSchema {
    /// Discovery documents publish numeric bounds as strings ("1000").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Value>,
}

impl ParameterSchema {
    /// Declared maximum when it is a positive integer.
    pub fn maximum(&self) -> Option<u64> {
        let value = self.maximum.as_ref()?;
        if let Some(n) = value.as_u64() {
            return Some(n).filter(|v| *v > 0);
        }
        if let Some(f) = value.as_f64() {
            return Some(f.floor() as u64).filter(|v| *v > 0 && f > 0.0);
        }
        value
            .as_str()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|v| *v > 0)
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MethodDescriptor {
    pub http_method: String,
    pub path: String,
    pub scopes: Vec<String>,
    pub description: String,
    pub parameters: BTreeMap<String, ParameterSchema>,
}

impl MethodDescriptor {
    pub fn has_parameter(&self, name: &str) -> bool {
        self.parameters.contains_key(name)
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ResourceGroup {
    pub methods: BTreeMap<String, MethodDescriptor>,
    pub resources: BTreeMap<String, ResourceGroup>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct DiscoveryDocument {
    pub base_url: String,
    pub resources: BTreeMap<String, ResourceGroup>,
}

/// One step of the resource tree walk.
#[derive(Clone, Copy, Debug)]
pub enum Node<'a> {
    Method(&'a MethodDescriptor),
    Resource(&'a ResourceGroup),
}

impl ResourceGroup {
    /// Methods win over nested resources of the same name.
    pub fn child(&self, name: &str) -> Option<Node<'_>> {
        if let Some(method) = self.methods.get(name) {
            return Some(Node::Method(method));
        }
        self.resources.get(name).map(Node::Resource)
    }

    fn collect_method_names(&self, prefix: &str, out: &mut Vec<String>) {
        for name in self.methods.keys() {
            out.push(format!("{}.{}", prefix, name));
        }
        for (name, resource) in &self.resources {
            resource.collect_method_names(&format!("{}.{}", prefix, name), out);
        }
    }
}

impl DiscoveryDocument {
    /// Walks `method_name` (e.g. `users.settings.sendAs.list`) down the tree.
    ///
    /// The first segment names a root resource. Each following segment is
    /// looked up as a method first, then as a nested resource; the first
    /// method found ends the walk.
    pub fn find_method(&self, method_name: &str) -> Result<&MethodDescriptor, ToolError> {
        let not_found = || method_not_found_error(method_name, &self.method_names());
        let mut segments = method_name.trim().split('.');
        let root = segments.next().unwrap_or("");
        let mut node = Node::Resource(self.resources.get(root).ok_or_else(not_found)?);
        for segment in segments {
            let Node::Resource(resource) = node else {
                break;
            };
            node = resource.child(segment).ok_or_else(not_found)?;
        }
        match node {
            Node::Method(method) => Ok(method),
            Node::Resource(_) => Err(not_found()),
        }
    }

    /// Every dotted method path the document exposes.
    pub fn method_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (name, resource) in &self.resources {
            resource.collect_method_names(name, &mut out);
        }
        out
    }
}

/// A method located in its discovery document, with the concrete endpoint.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedMethod {
    pub endpoint: String,
    pub descriptor: MethodDescriptor,
    pub messages: Vec<String>,
}

impl ResolvedMethod {
    /// Builds the endpoint and the two advisory messages for `descriptor`.
    pub fn new(
        base_url: &str,
        descriptor: &MethodDescriptor,
        path_params: Option<&serde_json::Map<String, Value>>,
    ) -> Result<Self, ToolError> {
        let mut endpoint = format!("{}{}", base_url, descriptor.path);
        if let Some(params) = path_params {
            endpoint = substitute_params(&endpoint, params)?;
        }
        let scopes = if descriptor.scopes.is_empty() {
            "No scopes are declared for this method.".to_string()
        } else {
            format!(
                "Please add one or several scopes from {}.",
                descriptor.scopes.join(", ")
            )
        };
        Ok(Self {
            endpoint,
            descriptor: descriptor.clone(),
            messages: vec![scopes, descriptor.description.trim().to_string()],
        })
    }
}

#[derive(Clone)]
pub struct MethodResolver {
    logger: Logger,
    validation: Validation,
    transport: Arc<dyn Transport>,
}

impl MethodResolver {
    pub fn new(logger: Logger, transport: Arc<dyn Transport>) -> Self {
        Self {
            logger: logger.child("method"),
            validation: Validation::new(),
            transport,
        }
    }

    pub async fn load_document(&self, url: &str) -> Result<DiscoveryDocument, ToolError> {
        let raw = fetch_document(self.transport.as_ref(), url).await?;
        let document: DiscoveryDocument = serde_json::from_value(raw).map_err(|err| {
            ToolError::invalid_discovery_response(format!(
                "Discovery document at {} has an unexpected shape: {}",
                url, err
            ))
        })?;
        self.validation.ensure_http_url(&document.base_url, "baseUrl")?;
        Ok(document)
    }

    pub async fn resolve(
        &self,
        document_url: &str,
        method_name: &str,
        path_params: Option<&serde_json::Map<String, Value>>,
    ) -> Result<ResolvedMethod, ToolError> {
        let document = self.load_document(document_url).await?;
        let descriptor = document.find_method(method_name)?;
        let resolved = ResolvedMethod::new(&document.base_url, descriptor, path_params)?;
        self.logger.debug(
            "Resolved method",
            Some(&serde_json::json!({
                "method": method_name,
                "http_method": resolved.descriptor.http_method,
                "endpoint": resolved.endpoint,
            })),
        );
        Ok(resolved)
    }
}
