use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone)]
pub struct UserName(String);

impl UserName {
    pub fn parse(name: String) -> Result<UserName, String> {
        let trimmed = name.trim();
        let is_empty_string = trimmed.is_empty();
        let is_too_long = trimmed.graphemes(true).count() > 256;
        let forbidden_chars = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        let forbidden_char_present = trimmed.chars().any(|char| forbidden_chars.contains(&char));

        if is_empty_string || is_too_long || forbidden_char_present {
            Err(format!("{} is not a valid name", name))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
