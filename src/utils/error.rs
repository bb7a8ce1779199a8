use thiserror::Error;

#[derive(Error, Debug)]
pub enum CouponError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown preference level: {value}")]
    UnknownLevel { value: String },

    #[error("Keyword already exists: {keyword}")]
    DuplicateKeyword { keyword: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

impl CouponError {
    /// 給終端使用者看的訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            CouponError::IoError(e) => format!("Could not access a file: {}", e),
            CouponError::SerializationError(e) => format!("File contents are not valid JSON: {}", e),
            CouponError::CsvError(e) => format!("Could not read or write CSV data: {}", e),
            CouponError::ConfigValidationError { field, message } => {
                format!("Configuration problem ({}): {}", field, message)
            }
            CouponError::InvalidConfigValueError { field, value, .. } => {
                format!("'{}' is not a valid value for {}", value, field)
            }
            CouponError::MissingConfigError { field } => format!("{} is required", field),
            CouponError::UnknownLevel { value } => format!(
                "'{}' is not a preference level (use high, medium or not_at_all)",
                value
            ),
            CouponError::DuplicateKeyword { keyword } => {
                format!("The keyword '{}' is already registered", keyword)
            }
            CouponError::ValidationError { message } => message.clone(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            CouponError::IoError(_) => "Check that the path exists and is writable",
            CouponError::SerializationError(_) => {
                "Delete or fix the file; it will be recreated with defaults"
            }
            CouponError::CsvError(_) => "Make sure the CSV has a header row with a 'title' column",
            CouponError::ConfigValidationError { .. } => "Fix the TOML syntax in the config file",
            CouponError::InvalidConfigValueError { .. } => "Correct the value and try again",
            CouponError::MissingConfigError { .. } => "Pass the missing flag on the command line",
            CouponError::UnknownLevel { .. } => "Valid levels are: high, medium, not_at_all",
            CouponError::DuplicateKeyword { .. } => "Remove the keyword first with 'unmark'",
            CouponError::ValidationError { .. } => "Check the input and try again",
        }
    }
}

pub type Result<T> = std::result::Result<T, CouponError>;
