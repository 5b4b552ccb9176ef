//! Validation of player identities and display names arriving from the chat side.

/// Identity and name validation errors with player-facing messages.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("player id is empty")]
    EmptyId,

    #[error("player id is too long (maximum {max} characters)")]
    IdTooLong { max: usize },

    #[error("player id contains reserved characters: {chars}")]
    InvalidIdCharacters { chars: String },

    #[error("name is too long (maximum {max} characters)")]
    NameTooLong { max: usize },
}

pub const MAX_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 24;

/// Accept an opaque sender id as used for storage keys.
///
/// Ids are trimmed. `:` separates key segments in the store and control characters break
/// logs, so both are refused.
pub fn validate_player_id(id: &str) -> Result<String, IdentityError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(IdentityError::EmptyId);
    }
    if trimmed.chars().count() > MAX_ID_LEN {
        return Err(IdentityError::IdTooLong { max: MAX_ID_LEN });
    }
    let bad: String = trimmed
        .chars()
        .filter(|c| *c == ':' || c.is_control() || c.is_whitespace())
        .map(|c| c.escape_default().to_string())
        .collect();
    if !bad.is_empty() {
        return Err(IdentityError::InvalidIdCharacters { chars: bad });
    }
    Ok(trimmed.to_string())
}

/// Normalise a requested Daoist name (道号). Control characters are dropped, runs of
/// whitespace collapse to one space, and an empty result falls back to `fallback`.
pub fn sanitize_display_name(name: &str, fallback: &str) -> Result<String, IdentityError> {
    let cleaned = name
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if cleaned.is_empty() {
        return Ok(fallback.to_string());
    }
    if cleaned.chars().count() > MAX_NAME_LEN {
        return Err(IdentityError::NameTooLong { max: MAX_NAME_LEN });
    }
    Ok(cleaned)
}
