use thiserror::Error;

/// Main error type for the housing ETL pipeline.
/// Aggregates errors from various sources including standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum HousingEtlError {
    #[error("{0}")]
    WithContextError(String),

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    // Third-party library errors
    #[error("Persistence failed: {0}")]
    PersistenceError(#[from] duckdb::Error),

    #[error("{0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Spreadsheet module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    // Source module errors
    #[error("{0}")]
    SourceFormatError(#[from] crate::source::SourceFormatError),
}

pub(crate) trait ResultMessage {
    fn with_prefix(self, message: &str) -> Self;
}

impl<T> ResultMessage for Result<T, HousingEtlError> {
    fn with_prefix(self, message: &str) -> Self {
        self.map_err(|e| HousingEtlError::WithContextError(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_prefix_keeps_ok_values() {
        let result: Result<usize, HousingEtlError> = Ok(3);
        assert_eq!(result.with_prefix("data.xlsx").unwrap(), 3);
    }

    #[test]
    fn with_prefix_prepends_message() {
        let result: Result<(), HousingEtlError> = Err(HousingEtlError::IoError(
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        ));
        let message = result.with_prefix("data.xlsx").unwrap_err().to_string();
        assert_eq!(message, "data.xlsx: no such file");
    }
}
