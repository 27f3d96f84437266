use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::ApiError;
use crate::model::{is_hex_color, is_http_url};

/// Type tag of a setting, telling the admin panel how to render and validate it
#[derive(sqlx::Type, Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
    #[default]
    Text,
    Boolean,
    Color,
    Number,
    Url,
    Textarea,
}

impl SettingType {
    /// Check that the value is well-formed for this type
    pub fn validate(&self, value: &str) -> Result<(), String> {
        let valid = match self {
            SettingType::Text => !value.contains(['\n', '\r']),
            SettingType::Textarea => true,
            SettingType::Boolean => matches!(value, "true" | "false"),
            SettingType::Number => value.trim().parse::<f64>().map_or(false, f64::is_finite),
            SettingType::Color => is_hex_color(value),
            SettingType::Url => is_http_url(value),
        };

        if valid {
            Ok(())
        } else {
            Err(format!("{:?} is not a valid {} value", value, self.name()))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SettingType::Text => "text",
            SettingType::Boolean => "boolean",
            SettingType::Color => "color",
            SettingType::Number => "number",
            SettingType::Url => "url",
            SettingType::Textarea => "textarea",
        }
    }
}

/// A typed key/value configuration row
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub setting_type: SettingType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewSetting {
    pub key: String,
    pub value: String,
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub setting_type: SettingType,
}

impl NewSetting {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_key(&self.key)?;
        self.setting_type
            .validate(&self.value)
            .map_err(ApiError::InvalidArgument)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SettingUpdate {
    pub value: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub setting_type: Option<SettingType>,
}

impl SettingUpdate {
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.description.is_none() && self.setting_type.is_none()
    }

    /// Validate the update against the setting it applies to: the resulting
    /// value must match the resulting type.
    pub fn validate(&self, current: &Setting) -> Result<(), ApiError> {
        if self.is_empty() {
            return Err(ApiError::invalid("Nothing to update"));
        }

        let setting_type = self.setting_type.unwrap_or(current.setting_type);
        let value = self.value.as_deref().unwrap_or(&current.value);
        setting_type
            .validate(value)
            .map_err(ApiError::InvalidArgument)
    }
}

/// Keys are lowercase identifiers such as `site_title` or `theme.primary-color`
pub fn validate_key(key: &str) -> Result<(), ApiError> {
    let valid = !key.is_empty()
        && key.len() <= 128
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(())
    } else {
        Err(ApiError::invalid(format!(
            "Invalid setting key {:?}, only [a-z0-9_.-] are allowed",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use speculoos::prelude::*;

    use super::*;

    #[test]
    fn values_by_type() {
        assert_that!(SettingType::Boolean.validate("true")).is_ok();
        assert_that!(SettingType::Boolean.validate("yes")).is_err();
        assert_that!(SettingType::Number.validate("12.5")).is_ok();
        assert_that!(SettingType::Number.validate("-3")).is_ok();
        assert_that!(SettingType::Number.validate("NaN")).is_err();
        assert_that!(SettingType::Number.validate("twelve")).is_err();
        assert_that!(SettingType::Color.validate("#ff0000")).is_ok();
        assert_that!(SettingType::Color.validate("red")).is_err();
        assert_that!(SettingType::Url.validate("https://example.com")).is_ok();
        assert_that!(SettingType::Url.validate("example.com")).is_err();
        assert_that!(SettingType::Text.validate("one line")).is_ok();
        assert_that!(SettingType::Text.validate("carriage\rreturn")).is_err();
        assert_that!(SettingType::Text.validate("two\r\nlines")).is_err();
        assert_that!(SettingType::Text.validate("two\nlines")).is_err();
        assert_that!(SettingType::Textarea.validate("two\nlines")).is_ok();
    }

    #[test]
    fn keys() {
        assert_that!(validate_key("site_title")).is_ok();
        assert_that!(validate_key("theme.primary-color")).is_ok();
        assert_that!(validate_key("")).is_err();
        assert_that!(validate_key("Site Title")).is_err();
    }

    #[test]
    fn type_tag_serialization() {
        let setting: NewSetting =
            serde_json::from_str(r#"{"key":"dark_mode","value":"false","type":"boolean"}"#)
                .unwrap();
        assert_eq!(setting.setting_type, SettingType::Boolean);
        assert_that!(setting.validate()).is_ok();

        let setting: NewSetting =
            serde_json::from_str(r#"{"key":"tagline","value":"hello"}"#).unwrap();
        assert_eq!(setting.setting_type, SettingType::Text);

        assert_eq!(
            serde_json::to_string(&SettingType::Textarea).unwrap(),
            r#""textarea""#
        );
    }

    #[test]
    fn update_checks_resulting_type() {
        let current = Setting {
            id: 1,
            key: "posts_per_page".into(),
            value: "10".into(),
            description: None,
            setting_type: SettingType::Number,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let to_boolean = SettingUpdate {
            setting_type: Some(SettingType::Boolean),
            ..Default::default()
        };
        assert_that!(to_boolean.validate(&current)).is_err();

        let to_text = SettingUpdate {
            setting_type: Some(SettingType::Text),
            ..Default::default()
        };
        assert_that!(to_text.validate(&current)).is_ok();

        let bad_value = SettingUpdate {
            value: Some("many".into()),
            ..Default::default()
        };
        assert_that!(bad_value.validate(&current)).is_err();
    }
}
