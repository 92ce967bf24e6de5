//! Dentist records managed by administrators and read publicly.

use std::fmt;

use chrono::{DateTime, Utc};

use super::DentistId;

/// Maximum number of characters in a dentist's name.
pub const DENTIST_NAME_MAX: usize = 100;

/// Validation errors raised by dentist field constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DentistValidationError {
    #[error("Please add dentist name")]
    EmptyName,
    #[error("Name cannot be more than {max} characters")]
    NameTooLong { max: usize },
    #[error("Experience cannot be negative")]
    NegativeExperience,
    #[error("Please add years of experience")]
    ExperienceOutOfRange,
    #[error("Please add area of expertise")]
    EmptyExpertise,
}

impl DentistValidationError {
    /// Request field the error refers to.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::NegativeExperience | Self::ExperienceOutOfRange => "experienceYears",
            Self::EmptyExpertise => "expertise",
        }
    }
}

/// Trimmed, non-empty dentist name of at most [`DENTIST_NAME_MAX`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DentistName(String);

impl DentistName {
    /// Trim and validate a name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DentistValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DentistValidationError::EmptyName);
        }
        if trimmed.chars().count() > DENTIST_NAME_MAX {
            return Err(DentistValidationError::NameTooLong {
                max: DENTIST_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for DentistName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DentistName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Non-negative whole years of practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExperienceYears(i32);

impl ExperienceYears {
    /// Validate a year count supplied by a client.
    pub fn new(years: i64) -> Result<Self, DentistValidationError> {
        if years < 0 {
            return Err(DentistValidationError::NegativeExperience);
        }
        i32::try_from(years)
            .map(Self)
            .map_err(|_| DentistValidationError::ExperienceOutOfRange)
    }

    /// Year count as stored.
    pub const fn get(self) -> i32 {
        self.0
    }
}

/// Trimmed, non-empty area of expertise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expertise(String);

impl Expertise {
    /// Trim and validate an expertise label.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, DentistValidationError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(DentistValidationError::EmptyExpertise);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Expertise {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Stored dentist record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dentist {
    pub id: DentistId,
    pub name: String,
    pub experience_years: i32,
    pub expertise: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Dentist {
    /// Build a record from a validated draft.
    pub fn from_draft(id: DentistId, draft: DentistDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.0,
            experience_years: draft.experience_years.get(),
            expertise: draft.expertise.0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a patch, bumping `updated_at`.
    pub fn apply(&mut self, patch: DentistPatch, now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name.0;
        }
        if let Some(years) = patch.experience_years {
            self.experience_years = years.get();
        }
        if let Some(expertise) = patch.expertise {
            self.expertise = expertise.0;
        }
        self.updated_at = now;
    }

    /// Fields shown alongside a booking.
    pub fn summary(&self) -> DentistSummary {
        DentistSummary {
            id: self.id,
            name: self.name.clone(),
            experience_years: self.experience_years,
            expertise: self.expertise.clone(),
        }
    }
}

/// Validated input for creating a dentist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DentistDraft {
    pub name: DentistName,
    pub experience_years: ExperienceYears,
    pub expertise: Expertise,
}

impl DentistDraft {
    /// Validate each field of a creation request.
    pub fn try_from_parts(
        name: &str,
        experience_years: i64,
        expertise: &str,
    ) -> Result<Self, DentistValidationError> {
        Ok(Self {
            name: DentistName::new(name)?,
            experience_years: ExperienceYears::new(experience_years)?,
            expertise: Expertise::new(expertise)?,
        })
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DentistPatch {
    pub name: Option<DentistName>,
    pub experience_years: Option<ExperienceYears>,
    pub expertise: Option<Expertise>,
}

impl DentistPatch {
    /// Validate whichever fields are present.
    pub fn try_from_parts(
        name: Option<&str>,
        experience_years: Option<i64>,
        expertise: Option<&str>,
    ) -> Result<Self, DentistValidationError> {
        Ok(Self {
            name: name.map(DentistName::new).transpose()?,
            experience_years: experience_years.map(ExperienceYears::new).transpose()?,
            expertise: expertise.map(Expertise::new).transpose()?,
        })
    }
}

/// Dentist fields joined onto bookings at query time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DentistSummary {
    pub id: DentistId,
    pub name: String,
    pub experience_years: i32,
    pub expertise: String,
}

/// A dentist with the number of bookings that reference it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DentistDetails {
    pub dentist: Dentist,
    pub booking_count: u64,
}
