use crate::app::App;
use crate::errors::ToolError;
use crate::managers::api::{ApiParams, ApiSelector, ClientConfig};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gapi", version, about = "Call Google APIs by name through the discovery service")]
pub struct Cli {
    /// Pretty-print the JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the API and method and print the advisory messages.
    Describe(CallArgs),
    /// Resolve and send the request.
    Execute(CallArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub struct CallArgs {
    /// JSON file with `apiInf`, `apiParams` and `accessToken`; `-` reads stdin.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// API name, e.g. `drive`.
    #[arg(long)]
    pub api: Option<String>,
    /// API version, e.g. `v3`.
    #[arg(long = "api-version")]
    pub api_version: Option<String>,
    /// Dotted method name, e.g. `files.list`.
    #[arg(long)]
    pub method: Option<String>,
    /// Path parameters as a JSON object.
    #[arg(long)]
    pub path: Option<String>,
    /// Query parameters as a JSON object.
    #[arg(long)]
    pub query: Option<String>,
    /// Request body as a JSON object.
    #[arg(long)]
    pub body: Option<String>,
    /// Follow `nextPageToken` and return every item.
    #[arg(long)]
    pub page_token: bool,
    #[arg(long)]
    pub access_token: Option<String>,
}

impl CallArgs {
    /// Merges the config file (if any) with the inline flags; flags win.
    pub fn to_config(&self) -> Result<ClientConfig, ToolError> {
        let mut config = match self.config.as_ref() {
            Some(path) => read_config(path)?,
            None => ClientConfig::default(),
        };

        let mut selector = config.api_inf.take().unwrap_or_default();
        if let Some(api) = &self.api {
            selector.api = api.clone();
        }
        if let Some(version) = &self.api_version {
            selector.version = version.clone();
        }
        if let Some(method) = &self.method {
            selector.method_name = method.clone();
        }
        if selector != ApiSelector::default() {
            config.api_inf = Some(selector);
        }

        let mut params = config.api_params.take().unwrap_or_default();
        if let Some(raw) = &self.path {
            params.path = Some(parse_object(raw, "--path")?);
        }
        if let Some(raw) = &self.query {
            params.query = Some(parse_object(raw, "--query")?);
        }
        if let Some(raw) = &self.body {
            params.request_body = Some(Value::Object(parse_object(raw, "--body")?));
        }
        if self.page_token {
            params.use_page_token = true;
        }
        if params != ApiParams::default() {
            config.api_params = Some(params);
        }

        if let Some(token) = &self.access_token {
            config.access_token = Some(token.clone());
        }
        Ok(config)
    }
}

fn read_config(path: &PathBuf) -> Result<ClientConfig, ToolError> {
    let raw = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(|err| {
            ToolError::invalid_configuration(format!(
                "Cannot read config {}: {}",
                path.display(),
                err
            ))
        })?
    };
    serde_json::from_str(&raw).map_err(|err| {
        ToolError::invalid_configuration(format!("Invalid config {}: {}", path.display(), err))
    })
}

fn parse_object(raw: &str, label: &str) -> Result<serde_json::Map<String, Value>, ToolError> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ToolError::invalid_configuration(format!(
            "{} must be a JSON object",
            label
        ))),
        Err(err) => Err(ToolError::invalid_configuration(format!(
            "{} is not valid JSON: {}",
            label, err
        ))),
    }
}

pub async fn run(cli: &Cli, app: &App) -> Result<Value, ToolError> {
    let (action, args) = match &cli.command {
        Command::Describe(args) => ("describe", args),
        Command::Execute(args) => ("execute", args),
    };
    let mut payload = serde_json::to_value(args.to_config()?)?;
    if let Value::Object(map) = &mut payload {
        map.insert("action".to_string(), Value::String(action.to_string()));
    }
    app.api_manager.handle_action(payload).await
}

pub fn render(output: &Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(output)
    } else {
        serde_json::to_string(output)
    };
    rendered.unwrap_or_else(|_| output.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_inline_execute() {
        let cli = Cli::try_parse_from([
            "gapi",
            "execute",
            "--api",
            "drive",
            "--api-version",
            "v3",
            "--method",
            "files.list",
            "--query",
            r#"{"fields":"files(id)"}"#,
            "--page-token",
        ])
        .unwrap();
        let Command::Execute(args) = &cli.command else {
            panic!("expected execute");
        };
        let config = args.to_config().unwrap();
        assert_eq!(
            config.api_inf,
            Some(ApiSelector::new("drive", "v3", "files.list"))
        );
        let params = config.api_params.unwrap();
        assert!(params.use_page_token);
        assert_eq!(params.query.unwrap()["fields"], "files(id)");
    }

    #[test]
    fn flags_override_config_file() {
        let dir = std::env::temp_dir().join(format!("gapi-cli-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("call.json");
        std::fs::write(
            &file,
            r#"{"apiInf":{"api":"drive","version":"v2","methodName":"files.list"},"accessToken":"file-token"}"#,
        )
        .unwrap();

        let args = CallArgs {
            config: Some(file),
            api_version: Some("v3".to_string()),
            ..Default::default()
        };
        let config = args.to_config().unwrap();
        assert_eq!(
            config.api_inf,
            Some(ApiSelector::new("drive", "v3", "files.list"))
        );
        assert_eq!(config.access_token.as_deref(), Some("file-token"));
        assert!(config.api_params.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn inline_json_must_be_an_object() {
        let args = CallArgs {
            query: Some("[1,2]".to_string()),
            ..Default::default()
        };
        assert_eq!(args.to_config().unwrap_err().code, "INVALID_CONFIGURATION");
    }
}
