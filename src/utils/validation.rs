use crate::domain::model::PreferenceLevel;
use crate::utils::error::{CouponError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extension(field_name: &str, file: &str, allowed_extensions: &[&str]) -> Result<()> {
    match std::path::Path::new(file)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(extension) if allowed_extensions.contains(&extension.to_ascii_lowercase().as_str()) => {
            Ok(())
        }
        Some(extension) => Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: format!(
                "Unsupported file extension: {}. Allowed extensions: {}",
                extension,
                allowed_extensions.join(", ")
            ),
        }),
        None => Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: file.to_string(),
            reason: "File has no extension or invalid filename".to_string(),
        }),
    }
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| CouponError::MissingConfigError {
        field: field_name.to_string(),
    })
}

/// 必填且不可只有空白的字串參數
pub fn validate_required_text<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    let value = validate_required_field(field_name, value)?;
    validate_non_empty_string(field_name, value)?;
    Ok(value.as_str())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// 將使用者輸入限制在三個合法等級之內
pub fn validate_level(value: &str) -> Result<PreferenceLevel> {
    value.parse()
}

/// 解析逗號分隔的關鍵字，去除空白並丟掉空項目
pub fn parse_keyword_list(field_name: &str, raw: &str) -> Result<Vec<String>> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    if keywords.is_empty() {
        return Err(CouponError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: raw.to_string(),
            reason: "At least one keyword is required".to_string(),
        });
    }

    Ok(keywords)
}
