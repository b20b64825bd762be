//! Local checks run before anything is submitted. A failure here never
//! reaches the network.

use crate::api::ValidationError;
use regex::Regex;

pub const VERIFICATION_CODE_LENGTH: usize = 6;
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Returns the trimmed code if it is exactly six ASCII digits.
///
/// # Errors
/// Returns `ValidationError::InvalidCode` for any other input.
pub fn validate_verification_code(code: &str) -> Result<&str, ValidationError> {
    let code = code.trim();
    let valid = Regex::new(r"^[0-9]{6}$").is_ok_and(|regex| regex.is_match(code));
    if valid {
        Ok(code)
    } else {
        Err(ValidationError::InvalidCode)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordRequirement {
    MinLength,
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl PasswordRequirement {
    pub const ALL: [Self; 5] = [
        Self::MinLength,
        Self::Uppercase,
        Self::Lowercase,
        Self::Digit,
        Self::Special,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MinLength => "at least 8 characters",
            Self::Uppercase => "at least one uppercase letter",
            Self::Lowercase => "at least one lowercase letter",
            Self::Digit => "at least one number",
            Self::Special => "at least one special character",
        }
    }

    #[must_use]
    pub fn is_met(self, password: &str) -> bool {
        match self {
            Self::MinLength => password.chars().count() >= MIN_PASSWORD_LENGTH,
            Self::Uppercase => password.chars().any(|c| c.is_uppercase()),
            Self::Lowercase => password.chars().any(|c| c.is_lowercase()),
            Self::Digit => password.chars().any(|c| c.is_ascii_digit()),
            Self::Special => password.chars().any(is_special),
        }
    }
}

/// Anything that is neither a letter, a digit nor whitespace. Non-ASCII
/// letters count as letters, never as symbols.
fn is_special(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}

/// Per-requirement status, as shown next to the password field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PasswordChecklist {
    pub min_length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub digit: bool,
    pub special: bool,
}

impl PasswordChecklist {
    #[must_use]
    pub fn evaluate(password: &str) -> Self {
        Self {
            min_length: PasswordRequirement::MinLength.is_met(password),
            uppercase: PasswordRequirement::Uppercase.is_met(password),
            lowercase: PasswordRequirement::Lowercase.is_met(password),
            digit: PasswordRequirement::Digit.is_met(password),
            special: PasswordRequirement::Special.is_met(password),
        }
    }

    #[must_use]
    pub const fn all_met(&self) -> bool {
        self.min_length && self.uppercase && self.lowercase && self.digit && self.special
    }

    #[must_use]
    pub fn missing(&self) -> Vec<PasswordRequirement> {
        PasswordRequirement::ALL
            .into_iter()
            .filter(|requirement| !self.is_satisfied(*requirement))
            .collect()
    }

    const fn is_satisfied(&self, requirement: PasswordRequirement) -> bool {
        match requirement {
            PasswordRequirement::MinLength => self.min_length,
            PasswordRequirement::Uppercase => self.uppercase,
            PasswordRequirement::Lowercase => self.lowercase,
            PasswordRequirement::Digit => self.digit,
            PasswordRequirement::Special => self.special,
        }
    }
}

/// Whether the submit button is enabled: every requirement met and both fields equal.
#[must_use]
pub fn can_submit_password(new_password: &str, confirm_password: &str) -> bool {
    PasswordChecklist::evaluate(new_password).all_met() && new_password == confirm_password
}

/// # Errors
/// Returns `WeakPassword` listing every unmet requirement, or `PasswordMismatch`.
pub fn validate_new_password(
    new_password: &str,
    confirm_password: &str,
) -> Result<(), ValidationError> {
    let missing = PasswordChecklist::evaluate(new_password).missing();
    if !missing.is_empty() {
        return Err(ValidationError::WeakPassword(missing));
    }
    if new_password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

/// # Errors
/// Returns `MissingField` when the login identifier or password is blank.
pub fn validate_credentials(login: &str, password: &str) -> Result<(), ValidationError> {
    if login.trim().is_empty() {
        return Err(ValidationError::MissingField("Email"));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingField("Password"));
    }
    Ok(())
}
