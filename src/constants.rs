pub mod discovery {
    pub const INDEX_URL: &str = "https://discovery.googleapis.com/discovery/v1/apis";
    pub const INDEX_FIELDS: &str = "*";
    pub const METHOD_EXAMPLES: &[&str] = &[
        "files.list",
        "comments.list",
        "users.settings.sendAs.smimeInfo.get",
    ];
}

pub mod pagination {
    pub const PAGE_TOKEN_PARAM: &str = "pageToken";
    pub const NEXT_PAGE_TOKEN_FIELD: &str = "nextPageToken";
    pub const FIELDS_PARAM: &str = "fields";
    pub const PAGE_SIZE_PARAMS: &[&str] = &["maxResults", "pageSize"];
}

pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const TIMEOUT_CONNECTION_MS: u64 = 10_000;
    pub const USER_AGENT: &str = concat!("gapi/", env!("CARGO_PKG_VERSION"));
    pub const API_KEY_PARAM: &str = "key";
}

pub mod auth {
    pub const ACCESS_TOKEN_ENV: &str = "GAPI_ACCESS_TOKEN";
    pub const TOKEN_COMMAND_ENV: &str = "GAPI_TOKEN_COMMAND";
    pub const DEFAULT_TOKEN_COMMAND: &str = "gcloud auth print-access-token";
}

pub mod limits {
    pub const SUGGESTION_LIMIT: usize = 5;
    pub const LOG_BODY_LENGTH: usize = 2_048;
}

pub mod protocols {
    pub const ALLOWED_HTTP: &[&str] = &["http:", "https:"];
}
