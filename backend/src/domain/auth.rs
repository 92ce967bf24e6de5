//! Credential primitives: passwords, login and registration payloads.
//!
//! Inbound adapters parse raw request bodies into these types before talking
//! to a port, so services only ever see validated values. Passwords are held
//! in [`Zeroizing`] buffers and never appear in `Debug` output.

use std::fmt;

use zeroize::Zeroizing;

use super::{Email, TelephoneNumber, UserName, UserValidationError};

/// Minimum number of characters in a password.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Validation errors for credential payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email or password was missing from a login request.
    MissingLoginFields,
    /// Password was shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort { field: &'static str, min: usize },
    /// A user profile field failed validation.
    User(UserValidationError),
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLoginFields => write!(f, "Please provide an email and password"),
            Self::PasswordTooShort { min, .. } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::User(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for CredentialValidationError {}

impl From<UserValidationError> for CredentialValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::User(value)
    }
}

impl CredentialValidationError {
    /// Request field the error refers to, when there is a single one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::MissingLoginFields => None,
            Self::PasswordTooShort { field, .. } => Some(*field),
            Self::User(err) => Some(err.field()),
        }
    }
}

/// Raw password that satisfies the length rule.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    fn parse(raw: &str, field: &'static str) -> Result<Self, CredentialValidationError> {
        if raw.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialValidationError::PasswordTooShort {
                field,
                min: PASSWORD_MIN_LEN,
            });
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Validate a new password.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        Self::parse(raw, "password")
    }

    /// Plaintext for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(**redacted**)")
    }
}

/// Email/password pair submitted at login.
///
/// The email is not format-checked: an address that cannot exist simply
/// fails to match any account.
///
/// # Examples
/// ```
/// use clinic_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret1").expect("shape");
/// assert_eq!(creds.email(), "ada@example.com");
/// assert!(LoginCredentials::try_from_parts("", "secret1").is_err());
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw request values.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(CredentialValidationError::MissingLoginFields);
        }
        Ok(Self {
            email: email.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Validated registration request. Callers cannot choose a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub name: UserName,
    pub telephone_number: TelephoneNumber,
    pub email: Email,
    pub password: Password,
}

impl Registration {
    /// Validate each field of a registration request.
    pub fn try_from_parts(
        name: &str,
        telephone_number: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            name: UserName::new(name)?,
            telephone_number: TelephoneNumber::new(telephone_number)?,
            email: Email::new(email)?,
            password: Password::new(password)?,
        })
    }
}

/// Request to rotate a password.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    pub current: Zeroizing<String>,
    pub new: Password,
}

impl PasswordChange {
    /// Validate the replacement password; the current one is checked later
    /// against the stored hash.
    pub fn try_from_parts(current: &str, new: &str) -> Result<Self, CredentialValidationError> {
        Ok(Self {
            current: Zeroizing::new(current.to_owned()),
            new: Password::parse(new, "newPassword")?,
        })
    }
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordChange(**redacted**)")
    }
}

/// Signed, time-limited session token handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap an encoded token.
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    /// Encoded token text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(**redacted**)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "secret1")]
    #[case("   ", "secret1")]
    #[case("ada@example.com", "")]
    fn login_requires_both_fields(#[case] email: &str, #[case] password: &str) {
        assert_eq!(
            LoginCredentials::try_from_parts(email, password),
            Err(CredentialValidationError::MissingLoginFields)
        );
    }

    #[rstest]
    fn debug_output_hides_password() {
        let creds = LoginCredentials::try_from_parts("ada@example.com", "hunter22").expect("shape");
        let rendered = format!("{creds:?}");
        assert!(!rendered.contains("hunter22"));
        let password = Password::new("hunter22").expect("long enough");
        assert!(!format!("{password:?}").contains("hunter22"));
    }

    #[rstest]
    #[case("12345", false)]
    #[case("123456", true)]
    fn password_length_boundary(#[case] raw: &str, #[case] accepted: bool) {
        assert_eq!(Password::new(raw).is_ok(), accepted);
    }

    #[rstest]
    fn registration_reports_offending_field() {
        let err = Registration::try_from_parts("Ada", "0800", "not-an-email", "secret1")
            .expect_err("email is invalid");
        assert_eq!(err.field(), Some("email"));
    }

    #[rstest]
    fn password_change_names_new_password_field() {
        let err = PasswordChange::try_from_parts("anything", "short").expect_err("too short");
        assert_eq!(err.field(), Some("newPassword"));
    }
}
