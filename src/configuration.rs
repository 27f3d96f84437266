use std::path::PathBuf;
use std::str::FromStr;

use secrecy::Secret;

#[derive(thiserror::Error, Debug)]
pub enum ConfigurationError {
    #[error("{0} environment variable is mandatory")]
    Missing(&'static str),
    #[error("Invalid value {value:?} for {name}")]
    Invalid { name: &'static str, value: String },
}

/// # Application configuration, read from the environment
#[derive(Debug)]
pub struct Settings {
    pub listen_on: String,
    pub database_url: String,
    pub database_max_connections: u32,
    /// Bearer token granting access to the admin endpoints
    pub admin_token: Secret<String>,
    pub image_storage_path: PathBuf,
    pub image_public_prefix: String,
    pub image_max_size: usize,
    pub static_dir: PathBuf,
    pub rate_limiting_fill_rate: u64,
    pub rate_limiting_bucket_size: u32,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigurationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigurationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let admin_token = lookup("ADMIN_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigurationError::Missing("ADMIN_TOKEN"))?;

        let image_public_prefix = lookup("IMAGE_PUBLIC_PREFIX")
            .unwrap_or_else(|| "/images".to_owned())
            .trim_end_matches('/')
            .to_owned();

        Ok(Settings {
            listen_on: lookup("BLOG_LISTEN_ON").unwrap_or_else(|| "0.0.0.0:8080".to_owned()),
            database_url: lookup("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://blog.db?mode=rwc".to_owned()),
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            admin_token: Secret::new(admin_token),
            image_storage_path: lookup("IMAGE_STORAGE_PATH")
                .unwrap_or_else(|| "./uploads".to_owned())
                .into(),
            image_public_prefix,
            image_max_size: parse(&lookup, "IMAGE_MAX_SIZE", 5 * 1024 * 1024)?,
            static_dir: lookup("STATIC_DIR")
                .unwrap_or_else(|| "./static".to_owned())
                .into(),
            rate_limiting_fill_rate: parse(&lookup, "RATE_LIMITING_FILL_RATE", 10)?,
            rate_limiting_bucket_size: parse(&lookup, "RATE_LIMITING_BUCKET_SIZE", 100)?,
        })
    }
}

fn parse<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigurationError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigurationError::Invalid { name, value }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;
    use speculoos::prelude::*;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let settings = Settings::from_lookup(lookup(&[("ADMIN_TOKEN", "s3cr3t")])).unwrap();

        assert_eq!(settings.admin_token.expose_secret(), "s3cr3t");
        assert_eq!(settings.listen_on, "0.0.0.0:8080");
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.image_public_prefix, "/images");
        assert_eq!(settings.image_max_size, 5 * 1024 * 1024);
        assert_eq!(settings.rate_limiting_fill_rate, 10);
        assert_eq!(settings.rate_limiting_bucket_size, 100);
    }

    #[test]
    fn admin_token_is_mandatory() {
        let result = Settings::from_lookup(lookup(&[]));
        assert!(matches!(
            result,
            Err(ConfigurationError::Missing("ADMIN_TOKEN"))
        ));

        let result = Settings::from_lookup(lookup(&[("ADMIN_TOKEN", "  ")]));
        assert_that!(result).is_err();
    }

    #[test]
    fn overrides_and_invalid_numbers() {
        let settings = Settings::from_lookup(lookup(&[
            ("ADMIN_TOKEN", "t"),
            ("IMAGE_PUBLIC_PREFIX", "https://cdn.example.com/img/"),
            ("IMAGE_MAX_SIZE", "1024"),
        ]))
        .unwrap();
        assert_eq!(settings.image_public_prefix, "https://cdn.example.com/img");
        assert_eq!(settings.image_max_size, 1024);

        let result = Settings::from_lookup(lookup(&[
            ("ADMIN_TOKEN", "t"),
            ("DATABASE_MAX_CONNECTIONS", "many"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigurationError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                ..
            })
        ));
    }
}
