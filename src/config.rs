use serde::Deserialize;
use serde::de::{self, Deserializer, Visitor};
use std::error::Error;
use std::fmt;
use regex::Regex;

use crate::error::ConfigError;

fn default_db_path() -> String {
    "sqlite:///var/ideaboard/ideas.db".into()
}

fn default_auth_db_path() -> String {
    "sqlite:///var/ideaboard/auth.db".into()
}

fn default_token_ttl_days() -> i64 {
    7
}

fn default_banned_words_path() -> String {
    "banned_words.txt".into()
}

fn default_upload_dir() -> String {
    "/var/ideaboard/uploads".into()
}

fn default_upload_url_prefix() -> String {
    "/uploads".into()
}

fn default_max_upload_bytes() -> Option<u64> {
    Some(5 * 1024 * 1024)
}

fn default_max_text_bytes() -> Option<u64> {
    Some(64 * 1024)
}

fn expand_placeholders(text: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let env_re = Regex::new(r"\$ENV\{([^}]+)\}")?;
    let file_re = Regex::new(r"\$FILE\{([^}]+)\}")?;
    let mut out = String::new();
    let mut last = 0;
    for caps in env_re.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        let var = std::env::var(&caps[1])
            .map_err(|e| format!("environment variable {} unavailable: {e}", &caps[1]))?;
        out.push_str(&var);
        last = m.end();
    }
    out.push_str(&text[last..]);
    let text = out;
    let mut out = String::new();
    let mut last = 0;
    for caps in file_re.captures_iter(&text) {
        let Some(m) = caps.get(0) else { continue };
        out.push_str(&text[last..m.start()]);
        let contents = std::fs::read_to_string(&caps[1])
            .map_err(|e| format!("cannot read {}: {e}", &caps[1]))?;
        out.push_str(contents.trim_end());
        last = m.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

pub(crate) fn parse_size(input: &str) -> Option<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let (digits, factor) = match trimmed.chars().last()? {
        'K' | 'k' => (&trimmed[..trimmed.len() - 1], 1024u64),
        'M' | 'm' => (&trimmed[..trimmed.len() - 1], 1024u64 * 1024),
        'G' | 'g' => (&trimmed[..trimmed.len() - 1], 1024u64 * 1024 * 1024),
        '0'..='9' => (trimmed, 1u64),
        _ => return None,
    };
    digits
        .trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_mul(factor))
}

fn deserialize_size<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    struct SizeVisitor;

    impl Visitor<'_> for SizeVisitor {
        type Value = Option<u64>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("an integer or string with optional K, M, G suffix")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(Some(v))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                Err(de::Error::custom("size must be positive"))
            } else {
                Ok(Some(u64::try_from(v).map_err(de::Error::custom)?))
            }
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            parse_size(v)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid size: {v}")))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(None)
        }
    }

    deserializer.deserialize_any(SizeVisitor)
}

/// One entry of the `filters` list: a filter name plus free-form parameters.
#[derive(Deserialize, Clone, Debug)]
pub struct FilterConfig {
    pub name: String,
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
}

#[derive(Deserialize, Clone)]
pub struct Config {
    pub addr: String,
    #[serde(default = "default_db_path")]
    pub db_path: String,
    #[serde(default = "default_auth_db_path")]
    pub auth_db_path: String,
    #[serde(default)]
    pub jwt_secret: Option<String>,
    #[serde(default = "default_token_ttl_days")]
    pub token_ttl_days: i64,
    /// Username promoted to admin whenever it logs in.
    #[serde(default)]
    pub seed_admin: Option<String>,
    #[serde(default = "default_banned_words_path")]
    pub banned_words_path: String,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    #[serde(default = "default_upload_url_prefix")]
    pub upload_url_prefix: String,
    #[serde(
        default = "default_max_upload_bytes",
        deserialize_with = "deserialize_size"
    )]
    pub max_upload_bytes: Option<u64>,
    #[serde(
        default = "default_max_text_bytes",
        deserialize_with = "deserialize_size"
    )]
    pub max_text_bytes: Option<u64>,
    #[serde(default)]
    pub trust_proxy: bool,
    #[serde(default)]
    pub filters: Vec<FilterConfig>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("addr", &self.addr)
            .field("db_path", &self.db_path)
            .field("auth_db_path", &self.auth_db_path)
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_days", &self.token_ttl_days)
            .field("seed_admin", &self.seed_admin)
            .field("banned_words_path", &self.banned_words_path)
            .field("upload_dir", &self.upload_dir)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .field("max_text_bytes", &self.max_text_bytes)
            .field("trust_proxy", &self.trust_proxy)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Box::new(ConfigError::FileNotFound(path.to_string())) as Box<dyn Error + Send + Sync>
            } else {
                e.into()
            }
        })?;
        Self::from_toml(&text)
    }

    /// Parse configuration text, expanding `$ENV{..}` and `$FILE{..}` first.
    pub fn from_toml(text: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let text = expand_placeholders(text)?;
        let cfg: Config = toml::from_str(&text)?;
        if cfg.token_ttl_days <= 0 {
            return Err(Box::new(ConfigError::Invalid(
                "token_ttl_days must be positive".to_string(),
            )));
        }
        Ok(cfg)
    }

    /// Upload size cap, falling back to 5 MiB when explicitly unset.
    #[must_use]
    pub fn upload_limit(&self) -> u64 {
        self.max_upload_bytes.unwrap_or(5 * 1024 * 1024)
    }
}
