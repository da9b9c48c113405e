use crate::models::IncomingFile;
use thiserror::Error;

/// Maximum image size: 3 MB
pub const MAX_FILE_SIZE: usize = 3 * 1024 * 1024;

/// Extensions accepted for product images.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Images only! '{file_name}' ({content_type}) is not a jpg, jpeg, png or webp image")]
    InvalidFileType {
        file_name: String,
        content_type: String,
    },

    #[error("File '{file_name}' is too large: {size} bytes received, limit is {max} bytes")]
    FileTooLarge {
        file_name: String,
        size: usize,
        max: usize,
    },

    #[error("Too many files: {count} sent, at most {max} allowed")]
    TooManyFiles { count: usize, max: usize },

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),
}

#[derive(Debug, Clone)]
pub struct ValidationRules {
    pub max_file_size: usize,
    pub max_files: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_files: 4,
        }
    }
}

impl From<&crate::config::IngestConfig> for ValidationRules {
    fn from(config: &crate::config::IngestConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            max_files: config.max_files,
        }
    }
}

/// The image MIME subtypes that may accompany an extension.
fn subtypes_for(extension: &str) -> &'static [&'static str] {
    match extension {
        "jpg" | "jpeg" => &["jpeg", "jpg"],
        "png" => &["png"],
        "webp" => &["webp"],
        _ => &[],
    }
}

/// Checks the declared extension and content type together.
pub fn validate_file_type(file_name: &str, content_type: &str) -> Result<(), ValidationError> {
    let invalid = || ValidationError::InvalidFileType {
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
    };

    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(invalid)?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(invalid());
    }

    let mime: mime::Mime = content_type.trim().parse().map_err(|_| invalid())?;
    if mime.type_() != mime::IMAGE {
        return Err(invalid());
    }

    let subtype = mime.subtype().as_str().to_lowercase();
    if subtypes_for(&extension).contains(&subtype.as_str()) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Validates file size against maximum limit
pub fn validate_file_size(
    file_name: &str,
    size: usize,
    max_size: usize,
) -> Result<(), ValidationError> {
    if size > max_size {
        return Err(ValidationError::FileTooLarge {
            file_name: file_name.to_string(),
            size,
            max: max_size,
        });
    }
    Ok(())
}

/// Validates every file of a batch, stopping at the first violation.
///
/// Nothing is touched on disk here; a batch that fails leaves no trace.
pub fn validate_batch(
    files: &[IncomingFile],
    rules: &ValidationRules,
) -> Result<(), ValidationError> {
    if files.len() > rules.max_files {
        return Err(ValidationError::TooManyFiles {
            count: files.len(),
            max: rules.max_files,
        });
    }

    for file in files {
        validate_file_type(&file.file_name, &file.content_type)?;
        validate_file_size(&file.file_name, file.size(), rules.max_file_size)?;
    }
    Ok(())
}
