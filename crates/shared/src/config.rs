use domain::service::DEFAULT_LIMIT;
use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use thiserror::Error;

/// 開発環境でのみ使われる JWT 署名鍵
const DEV_JWT_SECRET: &str = "changethis";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set outside of local environments")]
    Missing(&'static str),
}

/// ToDo ストアのバックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    DynamoDb,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "dynamodb" => Ok(StoreKind::DynamoDb),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub dynamodb_table: String,
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB Local などのエンドポイント
    pub dynamodb_endpoint: Option<String>,
    pub store: StoreKind,
    pub host: IpAddr,
    pub port: u16,
    pub api_prefix: String,
    pub jwt_secret: String,
    pub default_page_limit: usize,
    pub max_page_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string());

        let jwt_secret = match lookup("JWT_SECRET") {
            Some(secret) if !secret.is_empty() => secret,
            _ if is_local(&environment) => DEV_JWT_SECRET.to_string(),
            _ => return Err(ConfigError::Missing("JWT_SECRET")),
        };

        let store = match lookup("TODO_STORE") {
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: "TODO_STORE",
                value,
            })?,
            None => StoreKind::Memory,
        };

        let default_page_limit = parse_or(&lookup, "TODO_DEFAULT_PAGE_LIMIT", DEFAULT_LIMIT)?;
        let max_page_limit = parse_or(&lookup, "TODO_MAX_PAGE_LIMIT", 1000)?;
        if max_page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "TODO_MAX_PAGE_LIMIT",
                value: max_page_limit.to_string(),
            });
        }
        if default_page_limit > max_page_limit {
            return Err(ConfigError::InvalidValue {
                key: "TODO_DEFAULT_PAGE_LIMIT",
                value: default_page_limit.to_string(),
            });
        }

        Ok(Config {
            dynamodb_table: lookup("DYNAMODB_TABLE")
                .unwrap_or_else(|| "family-todo-dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|s| !s.is_empty()),
            store,
            host: parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?,
            port: parse_or(&lookup, "PORT", 3000)?,
            api_prefix: normalize_prefix(
                lookup("API_PREFIX").unwrap_or_else(|| "/api/v1".to_string()),
            ),
            jwt_secret,
            default_page_limit,
            max_page_limit,
            environment,
        })
    }

    /// 要求された件数を上限内に収める
    pub fn clamp_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_page_limit)
            .min(self.max_page_limit)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            dynamodb_table: "family-todo-dev".to_string(),
            environment: "dev".to_string(),
            aws_region: "ap-northeast-1".to_string(),
            dynamodb_endpoint: None,
            store: StoreKind::Memory,
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3000,
            api_prefix: "/api/v1".to_string(),
            jwt_secret: DEV_JWT_SECRET.to_string(),
            default_page_limit: DEFAULT_LIMIT,
            max_page_limit: 1000,
        }
    }
}

fn is_local(environment: &str) -> bool {
    matches!(environment, "dev" | "local" | "test")
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

/// "/" や末尾スラッシュを取り除き、先頭スラッシュを付ける
fn normalize_prefix(prefix: String) -> String {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
