use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::domain::{
    LoginOutcome, PasswordChange, ProfileUpdate, RegistrationRequest, Role, RoleProfile, User,
    UserView, VerificationDecision, VerificationOutcome, VerificationStatus,
};
use super::password::{password_problems, PasswordHash};
use super::repository::AccountRepository;
use super::AccountError;
use crate::auth::{Actor, SessionRegistry};
use crate::ids::UserId;
use crate::notifications::{notify_best_effort, Notification, NotificationKind, Notifier};
use crate::store::RepositoryError;
use crate::validation::ValidationErrors;

/// Service composing the account store, session registry and notifier.
pub struct AccountService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
    sessions: SessionRegistry,
}

impl<R, N> AccountService<R, N>
where
    R: AccountRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, sessions: SessionRegistry) -> Self {
        Self {
            repository,
            notifier,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Self-service registration for every role except administrators.
    pub fn register(
        &self,
        request: RegistrationRequest,
        now: NaiveDateTime,
    ) -> Result<UserView, AccountError> {
        let RegistrationRequest {
            username,
            email,
            display_name,
            password,
            password_confirmation,
            profile,
            verification_document,
        } = request;

        let mut errors = ValidationErrors::new();
        if profile.role() == Role::Administrator {
            errors.add("profile", "administrator accounts cannot self-register");
        }
        let username = username.trim().to_string();
        let email = email.trim().to_ascii_lowercase();
        validate_identity(&mut errors, &username, &email);
        validate_display_name(&mut errors, &display_name);
        validate_new_password(&mut errors, "password", &password, &password_confirmation);
        validate_profile(&mut errors, &profile);

        if errors.is_empty() {
            let (username_taken, email_taken) = self.repository.taken(&username, &email)?;
            errors.check(
                username_taken,
                "username",
                "a user with that username already exists",
            );
            errors.check(email_taken, "email", "a user with that email already exists");
        }
        errors.into_result()?;

        let role = profile.role();
        let mut user = User {
            id: UserId::new(),
            username,
            email,
            display_name: display_name.trim().to_string(),
            password_hash: PasswordHash::derive(&password),
            role,
            profile,
            verification: VerificationStatus::Unverified,
            verification_document: None,
            rejection_reason: None,
            is_active: true,
            created_at: now,
            verified_at: None,
        };
        if let Some(document) = verification_document.filter(|doc| !doc.trim().is_empty()) {
            user.request_verification(document)?;
        }

        let stored = self.repository.insert(user)?;
        info!(user_id = %stored.id, role = stored.role.label(), "account registered");

        notify_best_effort(
            self.notifier.as_ref(),
            Notification::new(
                stored.id,
                NotificationKind::Welcome,
                format!("Welcome to EduLink, {}!", stored.display_name),
                now,
            ),
        );

        Ok(stored.view())
    }

    /// Create an already-verified administrator (CLI seeding and demos).
    pub fn provision_administrator(
        &self,
        username: &str,
        email: &str,
        display_name: &str,
        password: &str,
        profile: RoleProfile,
        now: NaiveDateTime,
    ) -> Result<UserView, AccountError> {
        let mut errors = ValidationErrors::new();
        errors.check(
            profile.role() != Role::Administrator,
            "profile",
            "administrator profile required",
        );
        let email = email.trim().to_ascii_lowercase();
        validate_identity(&mut errors, username.trim(), &email);
        validate_new_password(&mut errors, "password", password, password);
        errors.into_result()?;

        let user = User {
            id: UserId::new(),
            username: username.trim().to_string(),
            email,
            display_name: display_name.trim().to_string(),
            password_hash: PasswordHash::derive(password),
            role: Role::Administrator,
            profile,
            verification: VerificationStatus::Verified,
            verification_document: None,
            rejection_reason: None,
            is_active: true,
            created_at: now,
            verified_at: Some(now),
        };
        let stored = self.repository.insert(user)?;
        info!(user_id = %stored.id, "administrator provisioned");
        Ok(stored.view())
    }

    pub fn login(&self, login: &str, password: &str) -> Result<LoginOutcome, AccountError> {
        let user = self
            .repository
            .find_by_login(login.trim())?
            .ok_or(AccountError::InvalidCredentials)?;
        if !user.password_hash.verify(password) {
            debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(AccountError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AccountError::Inactive);
        }
        let token = self.sessions.issue(user.id)?;
        info!(user_id = %user.id, "session opened");
        Ok(LoginOutcome {
            token,
            user: user.view(),
        })
    }

    pub fn logout(&self, token: &str) -> Result<(), AccountError> {
        self.sessions.revoke(token)?;
        Ok(())
    }

    pub fn profile(&self, actor: &Actor) -> Result<UserView, AccountError> {
        Ok(self.load(&actor.user_id)?.view())
    }

    /// Public lookup used by other components (appointment recipients, ...).
    pub fn lookup(&self, id: &UserId) -> Result<UserView, AccountError> {
        Ok(self.load(id)?.view())
    }

    pub fn update_profile(
        &self,
        actor: &Actor,
        update: ProfileUpdate,
    ) -> Result<UserView, AccountError> {
        let mut user = self.load(&actor.user_id)?;
        let mut errors = ValidationErrors::new();

        if let Some(display_name) = update.display_name.as_deref() {
            validate_display_name(&mut errors, display_name);
        }
        if let Some(profile) = update.profile.as_ref() {
            errors.check(
                profile.role() != user.role,
                "profile",
                "profile does not match the account role",
            );
            validate_profile(&mut errors, profile);
        }
        errors.into_result()?;

        if let Some(display_name) = update.display_name {
            user.display_name = display_name.trim().to_string();
        }
        if let Some(profile) = update.profile {
            user.profile = profile;
        }
        self.repository.update(user.clone())?;
        info!(user_id = %user.id, "profile updated");
        Ok(user.view())
    }

    pub fn change_password(
        &self,
        actor: &Actor,
        change: PasswordChange,
    ) -> Result<(), AccountError> {
        let mut user = self.load(&actor.user_id)?;
        let mut errors = ValidationErrors::new();
        errors.check(
            !user.password_hash.verify(&change.current_password),
            "current_password",
            "current password is incorrect",
        );
        validate_new_password(
            &mut errors,
            "new_password",
            &change.new_password,
            &change.new_password_confirmation,
        );
        errors.into_result()?;

        user.password_hash = PasswordHash::derive(&change.new_password);
        self.repository.update(user)?;
        info!(user_id = %actor.user_id, "password changed");
        Ok(())
    }

    pub fn request_verification(
        &self,
        actor: &Actor,
        document_key: String,
    ) -> Result<UserView, AccountError> {
        if document_key.trim().is_empty() {
            return Err(ValidationErrors::single("document", "a document is required").into());
        }
        let mut user = self.load(&actor.user_id)?;
        user.request_verification(document_key.trim().to_string())?;
        self.repository.update(user.clone())?;
        info!(user_id = %user.id, "verification requested");
        Ok(user.view())
    }

    pub fn complete_verification(
        &self,
        actor: &Actor,
        target: &UserId,
        decision: VerificationDecision,
        now: NaiveDateTime,
    ) -> Result<UserView, AccountError> {
        actor.require_admin("review verifications")?;
        let mut user = self.load(target)?;
        user.complete_verification(decision.outcome, decision.reason, now)?;
        self.repository.update(user.clone())?;
        info!(
            user_id = %user.id,
            reviewer = %actor.user_id,
            status = user.verification.label(),
            "verification completed"
        );

        let message = match decision.outcome {
            VerificationOutcome::Verified => "Your account has been verified.".to_string(),
            VerificationOutcome::Rejected => match user.rejection_reason.as_deref() {
                Some(reason) => format!("Your verification was rejected: {reason}"),
                None => "Your verification was rejected.".to_string(),
            },
        };
        notify_best_effort(
            self.notifier.as_ref(),
            Notification::new(user.id, NotificationKind::Verification, message, now),
        );
        Ok(user.view())
    }

    pub fn pending_verifications(&self, actor: &Actor) -> Result<Vec<UserView>, AccountError> {
        actor.require_admin("review verifications")?;
        let mut pending: Vec<UserView> = self
            .repository
            .list()?
            .into_iter()
            .filter(|user| user.verification == VerificationStatus::Pending)
            .map(|user| user.view())
            .collect();
        pending.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(pending)
    }

    /// Administrators may suspend or reinstate accounts; suspension revokes nothing
    /// retroactively but every later request from that account is refused.
    pub fn set_active(
        &self,
        actor: &Actor,
        target: &UserId,
        active: bool,
    ) -> Result<UserView, AccountError> {
        actor.require_admin("change account activity")?;
        let mut user = self.load(target)?;
        user.is_active = active;
        self.repository.update(user.clone())?;
        info!(user_id = %user.id, active, "account activity changed");
        Ok(user.view())
    }

    fn load(&self, id: &UserId) -> Result<User, AccountError> {
        match self.repository.fetch(id) {
            Ok(Some(user)) => Ok(user),
            Ok(None) | Err(RepositoryError::NotFound) => Err(AccountError::NotFound),
            Err(other) => Err(other.into()),
        }
    }
}

fn validate_identity(errors: &mut ValidationErrors, username: &str, email: &str) {
    let length = username.chars().count();
    if !(3..=32).contains(&length) {
        errors.add("username", "username must be between 3 and 32 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
    {
        errors.add(
            "username",
            "username may only contain letters, digits, '_', '.' and '-'",
        );
    }

    let valid_email = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    errors.check(!valid_email, "email", "enter a valid email address");
}

fn validate_display_name(errors: &mut ValidationErrors, display_name: &str) {
    let length = display_name.trim().chars().count();
    errors.check(length == 0, "display_name", "this field may not be blank");
    errors.check(
        length > 80,
        "display_name",
        "ensure this field has at most 80 characters",
    );
}

fn validate_new_password(
    errors: &mut ValidationErrors,
    field: &str,
    password: &str,
    confirmation: &str,
) {
    for problem in password_problems(password) {
        errors.add(field, problem);
    }
    if password != confirmation {
        errors.add(&format!("{field}_confirmation"), "passwords do not match");
    }
}

fn validate_profile(errors: &mut ValidationErrors, profile: &RoleProfile) {
    match profile {
        RoleProfile::Student(student) => {
            errors.check(
                student.field_of_study.trim().is_empty(),
                "profile.field_of_study",
                "this field may not be blank",
            );
            errors.check(
                student.level.trim().is_empty(),
                "profile.level",
                "this field may not be blank",
            );
        }
        RoleProfile::Pupil(pupil) => {
            errors.check(
                pupil.grade.trim().is_empty(),
                "profile.grade",
                "this field may not be blank",
            );
            if let Some(guardian) = pupil.guardian_email.as_deref() {
                errors.check(
                    !guardian.contains('@'),
                    "profile.guardian_email",
                    "enter a valid email address",
                );
            }
        }
        RoleProfile::Teacher(teacher) => {
            errors.check(
                teacher.subjects.iter().all(|s| s.trim().is_empty()),
                "profile.subjects",
                "list at least one subject",
            );
        }
        RoleProfile::Advisor(advisor) => {
            errors.check(
                advisor.organization.trim().is_empty(),
                "profile.organization",
                "this field may not be blank",
            );
        }
        RoleProfile::Administrator(_) => {}
    }
}
