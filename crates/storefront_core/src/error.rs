use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogFetchError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog request timed out")]
    Timeout,
    #[error("catalog responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode catalog response: {0}")]
    Decode(String),
    #[error("catalog api is unavailable")]
    Unavailable,
}

impl CatalogFetchError {
    /// Message shown inline on the listing page when a load fails.
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) | Self::Unavailable => {
                "서버에 연결할 수 없습니다. 네트워크를 확인한 뒤 다시 시도해주세요.".to_string()
            }
            Self::Timeout => "서버 응답이 지연되고 있습니다. 잠시 후 다시 시도해주세요.".to_string(),
            Self::Status { status, .. } if *status >= 500 => {
                "상품 정보를 불러오지 못했습니다. 잠시 후 다시 시도해주세요.".to_string()
            }
            Self::Status { message, .. } => format!("요청을 처리할 수 없습니다: {message}"),
            Self::Decode(_) => "상품 정보를 해석하지 못했습니다.".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Catalog(#[from] CatalogFetchError),
    #[error("page was unmounted before the mount sequence finished")]
    Unmounted,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {message}")]
    Read { path: String, message: String },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid api base url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid setting {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
