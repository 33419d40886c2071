use validator::Validate;

use crate::error::ValidationError;

pub const NICKNAME_MAX_CHARS: usize = 20;

#[derive(Debug, Validate)]
struct NicknameDraft {
    #[validate(length(min = 1, max = 20))]
    nick_name: String,
}

/// Trim `raw` and check it is a usable nickname. Length counts characters,
/// not bytes. Returns the trimmed value.
pub fn validate_nickname(raw: &str) -> Result<String, ValidationError> {
    let draft = NicknameDraft {
        nick_name: raw.trim().to_string(),
    };
    match draft.validate() {
        Ok(()) => Ok(draft.nick_name),
        Err(_) if draft.nick_name.is_empty() => Err(ValidationError::EmptyNickname),
        Err(_) => Err(ValidationError::NicknameTooLong {
            max: NICKNAME_MAX_CHARS,
        }),
    }
}
