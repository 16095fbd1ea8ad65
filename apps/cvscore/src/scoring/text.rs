use crate::errors::AppError;

/// Lower-cased view of a CV's plain text. All analyzers search this form.
#[derive(Debug, Clone)]
pub struct ResumeText {
    lower: String,
}

impl ResumeText {
    /// Normalizes raw extracted text. Empty or whitespace-only input is rejected.
    pub fn new(raw: &str) -> Result<Self, AppError> {
        if raw.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "CV text is empty or whitespace-only".to_string(),
            ));
        }
        Ok(Self {
            lower: raw.to_lowercase(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.lower
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lower.contains(needle)
    }

    /// Length in characters, not bytes.
    pub fn char_len(&self) -> usize {
        self.lower.chars().count()
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lower.lines()
    }

    pub fn is_ascii(&self) -> bool {
        self.lower.is_ascii()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(ResumeText::new(""), Err(AppError::InvalidInput(_))));
    }

    #[test]
    fn test_rejects_whitespace_only() {
        assert!(matches!(
            ResumeText::new("  \n\t  "),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_lowercases() {
        let text = ResumeText::new("Senior Java DEVELOPER").unwrap();
        assert_eq!(text.as_str(), "senior java developer");
        assert!(text.contains("java"));
    }

    #[test]
    fn test_char_len_counts_characters() {
        let text = ResumeText::new("café").unwrap();
        assert_eq!(text.char_len(), 4);
        assert!(!text.is_ascii());
    }
}
