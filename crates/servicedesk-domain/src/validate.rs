use thiserror::Error;

/// Shortest accepted name, counted in characters after trimming.
pub const MIN_NAME_CHARS: usize = 3;

/// Raw form buffer exactly as the presentation layer collects it. Nothing
/// here has been trimmed or checked yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestInput {
    pub name: String,
    pub email: String,
    /// Raw category selection: a catalog key in remote mode, a free label in
    /// local mode. Empty means nothing was selected.
    pub category: String,
    pub description: String,
}

/// Validated, trimmed field set ready for a backend write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFields {
    pub name: String,
    pub email: String,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must be at least 3 characters")]
    NameTooShort,
    #[error("email address is not valid")]
    InvalidEmail,
    #[error("a category must be selected")]
    CategoryRequired,
    #[error("description must not be empty")]
    DescriptionEmpty,
}

impl ValidationError {
    /// Stable machine-readable code for callers that key messages on it.
    #[must_use]
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NameTooShort => "name_too_short",
            Self::InvalidEmail => "invalid_email",
            Self::CategoryRequired => "category_required",
            Self::DescriptionEmpty => "description_empty",
        }
    }
}

/// Checks the raw buffer in a fixed order (name, email, category,
/// description) and reports only the first failure.
pub fn validate(input: &RequestInput) -> Result<RequestFields, ValidationError> {
    let name = input.name.trim();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(ValidationError::NameTooShort);
    }
    let email = input.email.trim();
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    let category = input.category.trim();
    if category.is_empty() {
        return Err(ValidationError::CategoryRequired);
    }
    let description = input.description.trim();
    if description.is_empty() {
        return Err(ValidationError::DescriptionEmpty);
    }
    Ok(RequestFields {
        name: name.to_string(),
        email: email.to_string(),
        category: category.to_string(),
        description: description.to_string(),
    })
}

/// `local@domain.tld`: no whitespace anywhere, exactly one `@` with a
/// non-empty part on each side, and a dot in the domain with non-empty
/// segments around the last one.
fn is_valid_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
