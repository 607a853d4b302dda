use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::password::PasswordHash;
use super::AccountError;
use crate::ids::{SchoolId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Pupil,
    Teacher,
    Advisor,
    Administrator,
}

impl Role {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Student,
            Self::Pupil,
            Self::Teacher,
            Self::Advisor,
            Self::Administrator,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Pupil => "pupil",
            Self::Teacher => "teacher",
            Self::Advisor => "advisor",
            Self::Administrator => "administrator",
        }
    }

    /// Staff roles may moderate the forum and offer appointment slots.
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Teacher | Self::Advisor | Self::Administrator)
    }

    /// Teachers and advisors must prove their identity before staff features unlock.
    pub const fn requires_verification(self) -> bool {
        matches!(self, Self::Teacher | Self::Advisor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminScope {
    Platform,
    School,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    #[serde(default)]
    pub institution: Option<SchoolId>,
    pub field_of_study: String,
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PupilProfile {
    pub grade: String,
    #[serde(default)]
    pub guardian_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherProfile {
    pub subjects: Vec<String>,
    #[serde(default)]
    pub school: Option<SchoolId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvisorProfile {
    pub specialties: Vec<String>,
    pub organization: String,
    #[serde(default)]
    pub cv_document: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministratorProfile {
    pub scope: AdminScope,
}

/// Role-specific profile data; the variant decides the account role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Student(StudentProfile),
    Pupil(PupilProfile),
    Teacher(TeacherProfile),
    Advisor(AdvisorProfile),
    Administrator(AdministratorProfile),
}

impl RoleProfile {
    pub const fn role(&self) -> Role {
        match self {
            Self::Student(_) => Role::Student,
            Self::Pupil(_) => Role::Pupil,
            Self::Teacher(_) => Role::Teacher,
            Self::Advisor(_) => Role::Advisor,
            Self::Administrator(_) => Role::Administrator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Unverified,
    Pending,
    Verified,
    Rejected,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Verified => "verified",
            Self::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password_hash: PasswordHash,
    pub role: Role,
    pub profile: RoleProfile,
    pub verification: VerificationStatus,
    pub verification_document: Option<String>,
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub verified_at: Option<NaiveDateTime>,
}

impl User {
    pub fn is_verified(&self) -> bool {
        self.verification == VerificationStatus::Verified
    }

    /// Submit identity evidence; allowed from unverified or rejected.
    pub fn request_verification(&mut self, document_key: String) -> Result<(), AccountError> {
        match self.verification {
            VerificationStatus::Unverified | VerificationStatus::Rejected => {
                self.verification = VerificationStatus::Pending;
                self.verification_document = Some(document_key);
                self.rejection_reason = None;
                Ok(())
            }
            other => Err(AccountError::InvalidVerificationTransition {
                from: other.label(),
                to: VerificationStatus::Pending.label(),
            }),
        }
    }

    /// Close a pending review. Rejection leaves `is_active` as it was.
    pub fn complete_verification(
        &mut self,
        outcome: VerificationOutcome,
        reason: Option<String>,
        now: NaiveDateTime,
    ) -> Result<(), AccountError> {
        if self.verification != VerificationStatus::Pending {
            let to = match outcome {
                VerificationOutcome::Verified => VerificationStatus::Verified,
                VerificationOutcome::Rejected => VerificationStatus::Rejected,
            };
            return Err(AccountError::InvalidVerificationTransition {
                from: self.verification.label(),
                to: to.label(),
            });
        }

        match outcome {
            VerificationOutcome::Verified => {
                self.verification = VerificationStatus::Verified;
                self.is_active = true;
                self.verified_at = Some(now);
                self.rejection_reason = None;
            }
            VerificationOutcome::Rejected => {
                self.verification = VerificationStatus::Rejected;
                self.rejection_reason = reason;
            }
        }
        Ok(())
    }

    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            profile: self.profile.clone(),
            verification: self.verification,
            rejection_reason: self.rejection_reason.clone(),
            is_active: self.is_active,
            created_at: self.created_at,
            verified_at: self.verified_at,
        }
    }
}

/// Public representation of an account; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub profile: RoleProfile,
    pub verification: VerificationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub password: String,
    pub password_confirmation: String,
    pub profile: RoleProfile,
    /// Teachers and advisors may attach identity evidence up front.
    #[serde(default)]
    pub verification_document: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile: Option<RoleProfile>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VerificationDecision {
    pub outcome: VerificationOutcome,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserView,
}
