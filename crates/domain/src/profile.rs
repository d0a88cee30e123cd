//! Profile domain types and validation rules.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use notenest_core::{AppError, AppResult, PrincipalId, ProfileError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a profile record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Creates a new random profile identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a profile identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ProfileId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Role attached to a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Consumes notes for enrolled subjects.
    Student,
    /// Uploads notes for taught subjects.
    Faculty,
    /// Manages users and the note catalogue.
    Admin,
}

impl Role {
    /// Returns the stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
            Self::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "student" => Ok(Self::Student),
            "faculty" => Ok(Self::Faculty),
            "admin" => Ok(Self::Admin),
            _ => Err(AppError::Validation(format!("unknown role '{value}'"))),
        }
    }
}

/// Validated email address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Creates a validated email address.
    ///
    /// Performs basic structural validation: non-empty, contains exactly one
    /// `@`, local part and domain are non-empty, domain contains at least
    /// one `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        let trimmed = value.trim().to_lowercase();

        if trimmed.is_empty() {
            return Err(AppError::Validation(
                "email address must not be empty".to_owned(),
            ));
        }

        let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
        if parts.len() != 2 {
            return Err(AppError::Validation(
                "email address must contain exactly one '@'".to_owned(),
            ));
        }

        let local = parts[0];
        let domain = parts[1];

        if local.is_empty() {
            return Err(AppError::Validation(
                "email local part must not be empty".to_owned(),
            ));
        }

        if domain.is_empty() || !domain.contains('.') {
            return Err(AppError::Validation(
                "email domain must contain at least one '.'".to_owned(),
            ));
        }

        if trimmed.len() > 254 {
            return Err(AppError::Validation(
                "email address must not exceed 254 characters".to_owned(),
            ));
        }

        Ok(Self(trimmed))
    }

    /// Returns the validated email string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

/// Minimum password length accepted at sign-up.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Maximum password length (protects against hashing DoS).
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// Validates a plaintext password before it reaches the identity provider.
pub fn validate_password(password: &str) -> AppResult<()> {
    let char_count = password.chars().count();

    if char_count < PASSWORD_MIN_LENGTH {
        return Err(AppError::Validation(format!(
            "password must be at least {PASSWORD_MIN_LENGTH} characters"
        )));
    }

    if char_count > PASSWORD_MAX_LENGTH {
        return Err(AppError::Validation(format!(
            "password must not exceed {PASSWORD_MAX_LENGTH} characters"
        )));
    }

    Ok(())
}

/// Normalizes a subject list: trims entries, drops empties, removes
/// duplicates while keeping first-seen order.
fn normalize_subjects(subjects: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for subject in subjects {
        let trimmed = subject.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !seen.iter().any(|existing: &String| existing == trimmed) {
            seen.push(trimmed.to_owned());
        }
    }
    seen
}

/// Profile attributes submitted at sign-up.
///
/// Subjects are meaningful for faculty (taught) and student (enrolled);
/// sign-up clears them for any other role. A faculty seed with zero
/// subjects is accepted: such a profile is valid to exist but cannot
/// upload until subjects are added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSeed {
    full_name: String,
    phone: Option<String>,
    department: String,
    role: Role,
    subjects: Vec<String>,
}

impl ProfileSeed {
    /// Creates a validated profile seed.
    pub fn new(
        full_name: impl Into<String>,
        phone: Option<String>,
        department: impl Into<String>,
        role: Role,
        subjects: Vec<String>,
    ) -> AppResult<Self> {
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "full name must not be empty".to_owned(),
            ));
        }

        let department = department.into();
        if department.trim().is_empty() {
            return Err(AppError::Validation(
                "department must not be empty".to_owned(),
            ));
        }

        let subjects = match role {
            Role::Faculty | Role::Student => normalize_subjects(subjects),
            Role::Admin => Vec::new(),
        };

        Ok(Self {
            full_name: full_name.trim().to_owned(),
            phone: phone.filter(|value| !value.trim().is_empty()),
            department: department.trim().to_owned(),
            role,
            subjects,
        })
    }

    /// Returns the submitted full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the submitted phone number, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the submitted department.
    #[must_use]
    pub fn department(&self) -> &str {
        self.department.as_str()
    }

    /// Returns the submitted role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the normalized subject list.
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        self.subjects.as_slice()
    }
}

/// Owner-editable attributes. `None` leaves a field untouched. Email and
/// role are not patchable here; role changes go through the admin-gated
/// `set_role` path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfilePatch {
    /// Replacement full name.
    pub full_name: Option<String>,
    /// Replacement phone number (empty string clears it).
    pub phone: Option<String>,
    /// Replacement department.
    pub department: Option<String>,
    /// Replacement subject list.
    pub subjects: Option<Vec<String>>,
}

/// Durable record describing a principal's role, department, and subject
/// entitlements. Keyed 1:1 with a [`PrincipalId`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    id: ProfileId,
    principal_id: PrincipalId,
    full_name: String,
    email: String,
    phone: Option<String>,
    department: String,
    role: Role,
    subjects: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile with validated fields.
    ///
    /// Accepts a faculty profile with zero subjects: existence and upload
    /// permission are deliberately separate questions.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProfileId,
        principal_id: PrincipalId,
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone: Option<String>,
        department: impl Into<String>,
        role: Role,
        subjects: Vec<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(AppError::Validation(
                "full name must not be empty".to_owned(),
            ));
        }

        let email = EmailAddress::new(email)?;

        Ok(Self {
            id,
            principal_id,
            full_name,
            email: email.into(),
            phone: phone.filter(|value| !value.trim().is_empty()),
            department: department.into(),
            role,
            subjects: normalize_subjects(subjects),
            created_at,
            updated_at,
        })
    }

    /// Builds the profile created at sign-up from its seed.
    pub fn from_seed(
        principal_id: PrincipalId,
        email: impl Into<String>,
        seed: &ProfileSeed,
        now: DateTime<Utc>,
    ) -> AppResult<Self> {
        Self::new(
            ProfileId::new(),
            principal_id,
            seed.full_name(),
            email,
            seed.phone().map(ToOwned::to_owned),
            seed.department(),
            seed.role(),
            seed.subjects().to_vec(),
            now,
            now,
        )
    }

    /// Applies an owner patch, enforcing the faculty-subject invariant
    /// before any store write sees the result.
    pub fn apply_patch(&self, patch: ProfilePatch, now: DateTime<Utc>) -> Result<Self, ProfileError> {
        let subjects = match patch.subjects {
            Some(subjects) => normalize_subjects(subjects),
            None => self.subjects.clone(),
        };

        if self.role == Role::Faculty && subjects.is_empty() {
            return Err(ProfileError::FacultyRequiresSubject);
        }

        let full_name = match patch.full_name {
            Some(full_name) => {
                if full_name.trim().is_empty() {
                    return Err(ProfileError::Store(AppError::Validation(
                        "full name must not be empty".to_owned(),
                    )));
                }
                full_name
            }
            None => self.full_name.clone(),
        };

        Ok(Self {
            full_name,
            phone: match patch.phone {
                Some(phone) if phone.trim().is_empty() => None,
                Some(phone) => Some(phone),
                None => self.phone.clone(),
            },
            department: patch.department.unwrap_or_else(|| self.department.clone()),
            subjects,
            updated_at: now,
            ..self.clone()
        })
    }

    /// Returns a copy with the role replaced. The caller is responsible
    /// for admin gating; role immutability is an authorization concern.
    #[must_use]
    pub fn with_role(&self, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            role,
            updated_at: now,
            ..self.clone()
        }
    }

    /// Returns the profile identifier.
    #[must_use]
    pub fn id(&self) -> ProfileId {
        self.id
    }

    /// Returns the owning principal identifier.
    #[must_use]
    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    /// Returns the full name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    /// Returns the denormalized email (immutable post-creation).
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the phone number, if set.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the department tag.
    #[must_use]
    pub fn department(&self) -> &str {
        self.department.as_str()
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the subject entitlements (taught for faculty, enrolled for
    /// students, unused for admins).
    #[must_use]
    pub fn subjects(&self) -> &[String] {
        self.subjects.as_slice()
    }

    /// Returns whether the profile holds the given subject.
    #[must_use]
    pub fn has_subject(&self, subject: &str) -> bool {
        self.subjects.iter().any(|entry| entry == subject)
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last-update timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
