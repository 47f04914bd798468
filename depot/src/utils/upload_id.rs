use std::fmt;

use crate::error::AppError;
use crate::utils::validation::is_valid_filename;

/// Separates the random part from the filename inside an upload id.
pub const DELIMITER: char = '_';

/// An upload identifier of the form `<random-hex>_<filename>`.
///
/// The random part is a simple (dash-free, underscore-free) UUID, so splitting on the
/// first `_` always recovers the filename, even when the filename itself contains `_`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct UploadId {
    nonce: String,
    filename: String,
}

impl UploadId {
    pub fn generate(filename: impl Into<String>) -> Result<UploadId, AppError> {
        let filename = filename.into();
        if !is_valid_filename(&filename) {
            return Err(AppError::InvalidFilename(filename));
        }
        Ok(UploadId {
            nonce: uuid::Uuid::new_v4().simple().to_string(),
            filename,
        })
    }

    pub fn parse(raw: impl AsRef<str>) -> Result<UploadId, AppError> {
        let raw = raw.as_ref();
        let (nonce, filename) = raw
            .split_once(DELIMITER)
            .ok_or_else(|| AppError::InvalidUploadId(raw.to_string()))?;
        if nonce.is_empty() || !nonce.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::InvalidUploadId(raw.to_string()));
        }
        if !is_valid_filename(filename) {
            return Err(AppError::InvalidUploadId(raw.to_string()));
        }
        Ok(UploadId {
            nonce: nonce.to_string(),
            filename: filename.to_string(),
        })
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.nonce, DELIMITER, self.filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_id_round_trips_filename() {
        let id = UploadId::generate("report.txt").unwrap();
        let rendered = id.to_string();
        assert!(rendered.ends_with("_report.txt"));
        assert_eq!(UploadId::parse(&rendered).unwrap(), id);
    }

    #[test]
    fn filename_may_contain_delimiter() {
        let id = UploadId::generate("my_big_file.tar").unwrap();
        let parsed = UploadId::parse(id.to_string()).unwrap();
        assert_eq!(parsed.filename(), "my_big_file.tar");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = UploadId::generate("a.bin").unwrap();
        let b = UploadId::generate("a.bin").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn parse_rejects_missing_delimiter() {
        assert!(matches!(
            UploadId::parse("deadbeef"),
            Err(AppError::InvalidUploadId(_))
        ));
        assert!(matches!(
            UploadId::parse("_file.txt"),
            Err(AppError::InvalidUploadId(_))
        ));
    }

    #[test]
    fn parse_rejects_traversal() {
        assert!(UploadId::parse("abc_..").is_err());
        assert!(UploadId::parse("abc_../etc/passwd").is_err());
        assert!(UploadId::parse("ab/c_file").is_err());
    }

    #[test]
    fn generate_rejects_bad_filename() {
        assert!(matches!(
            UploadId::generate(""),
            Err(AppError::InvalidFilename(_))
        ));
        assert!(UploadId::generate("dir/file").is_err());
    }
}
