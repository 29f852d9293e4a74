use std::sync::Arc;
use uuid::Uuid;

use backend::{AuthApi, AuthSession, NewUserProfile, ProfileUpdate, Role, UserProfile};

use crate::error::AuthError;

/// Minimum accepted password length, matching the signup form rule.
const MIN_PASSWORD_LEN: usize = 6;

//
// ─── FORM VALUES ───────────────────────────────────────────────────────────────
//

/// Sign-in form values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Client-side validation run before the request goes out.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` when either field is blank.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        Ok(())
    }
}

/// Signup form values, confirm-password included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
    pub school_name: Option<String>,
    pub grade_level: Option<u8>,
}

impl SignupForm {
    /// Client-side validation run before the request goes out.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule: required fields, matching passwords,
    /// minimum password length.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.full_name.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
        {
            return Err(AuthError::MissingFields);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        Ok(())
    }

    fn into_profile(self) -> NewUserProfile {
        NewUserProfile {
            full_name: self.full_name,
            role: self.role,
            school_name: self.school_name,
            grade_level: self.grade_level,
        }
    }
}

//
// ─── AUTH SERVICE ──────────────────────────────────────────────────────────────
//

/// Identity flows over an injected `AuthApi`.
///
/// Validation happens here, before any request leaves the machine; backend
/// failures pass through untouched so the caller can show their Display
/// strings inline.
#[derive(Clone)]
pub struct AuthService {
    auth: Arc<dyn AuthApi>,
}

impl AuthService {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthApi>) -> Self {
        Self { auth }
    }

    /// Sign in after validating the form.
    ///
    /// # Errors
    ///
    /// Returns a validation error before the request, or the backend error
    /// afterwards.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError> {
        credentials.validate()?;
        let session = self
            .auth
            .sign_in(credentials.email.trim(), &credentials.password)
            .await
            .inspect_err(|e| tracing::warn!("sign-in failed: {e}"))?;
        Ok(session)
    }

    /// Create an account after validating the form.
    ///
    /// # Errors
    ///
    /// Returns a validation error before the request, or the backend error
    /// afterwards.
    pub async fn sign_up(&self, form: SignupForm) -> Result<AuthSession, AuthError> {
        form.validate()?;
        let email = form.email.trim().to_string();
        let password = form.password.clone();
        let session = self
            .auth
            .sign_up(&email, &password, form.into_profile())
            .await
            .inspect_err(|e| tracing::warn!("signup failed: {e}"))?;
        Ok(session)
    }

    /// End the current session.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the service is unreachable.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await?;
        Ok(())
    }

    /// The active session, if any.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the service is unreachable.
    pub async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        Ok(self.auth.session().await?)
    }

    /// Fetch a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::NotFound` through `AuthError::Backend` when
    /// the profile is missing.
    pub async fn profile(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        Ok(self.auth.profile(user_id).await?)
    }

    /// Apply a partial profile update.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the update is refused.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: ProfileUpdate,
    ) -> Result<UserProfile, AuthError> {
        Ok(self.auth.update_profile(user_id, update).await?)
    }

    /// Request a password-reset email.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingFields` for a blank address, or the
    /// backend error.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        if email.trim().is_empty() {
            return Err(AuthError::MissingFields);
        }
        self.auth.reset_password(email.trim()).await?;
        Ok(())
    }

    /// Active students for teacher rosters.
    ///
    /// # Errors
    ///
    /// Returns the backend error when the service is unreachable.
    pub async fn students(&self) -> Result<Vec<UserProfile>, AuthError> {
        Ok(self.auth.list_students().await?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use backend::InMemoryBackend;

    fn form() -> SignupForm {
        SignupForm {
            full_name: "Sam Rivera".into(),
            email: "sam@school.edu".into(),
            password: "hunter22".into(),
            confirm_password: "hunter22".into(),
            role: Role::Student,
            school_name: Some("Eastside Middle".into()),
            grade_level: Some(7),
        }
    }

    #[test]
    fn signup_validation_rules_fire_in_order() {
        let mut missing = form();
        missing.full_name = "  ".into();
        assert!(matches!(
            missing.validate().unwrap_err(),
            AuthError::MissingFields
        ));

        let mut mismatch = form();
        mismatch.confirm_password = "other".into();
        assert!(matches!(
            mismatch.validate().unwrap_err(),
            AuthError::PasswordMismatch
        ));

        let mut short = form();
        short.password = "abc".into();
        short.confirm_password = "abc".into();
        assert!(matches!(
            short.validate().unwrap_err(),
            AuthError::PasswordTooShort
        ));

        assert!(form().validate().is_ok());
    }

    #[test]
    fn credentials_require_both_fields() {
        assert!(matches!(
            Credentials::new("", "pw").validate().unwrap_err(),
            AuthError::MissingFields
        ));
        assert!(matches!(
            Credentials::new("sam@school.edu", "").validate().unwrap_err(),
            AuthError::MissingFields
        ));
        assert!(Credentials::new("sam@school.edu", "pw").validate().is_ok());
    }

    #[tokio::test]
    async fn signup_then_sign_in_round_trip() {
        let fake = InMemoryBackend::new();
        let service = AuthService::new(Arc::new(fake));

        let session = service.sign_up(form()).await.unwrap();
        assert_eq!(session.user.display_name(), "Sam Rivera");

        service.sign_out().await.unwrap();
        let session = service
            .sign_in(&Credentials::new("sam@school.edu", "hunter22"))
            .await
            .unwrap();
        assert_eq!(session.user.email, "sam@school.edu");
    }

    #[tokio::test]
    async fn unreachable_backend_keeps_its_user_message() {
        let fake = InMemoryBackend::new();
        fake.set_offline(true);
        let service = AuthService::new(Arc::new(fake));

        let err = service
            .sign_in(&Credentials::new("sam@school.edu", "hunter22"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("cannot connect"));
    }

    #[tokio::test]
    async fn validation_failures_never_reach_the_backend() {
        let fake = InMemoryBackend::new();
        fake.set_offline(true);
        let service = AuthService::new(Arc::new(fake));

        // Offline backend, but the form is rejected locally first.
        let err = service
            .sign_in(&Credentials::new("", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }

    #[tokio::test]
    async fn reset_password_rejects_blank_address() {
        let service = AuthService::new(Arc::new(InMemoryBackend::new()));
        let err = service.reset_password("  ").await.unwrap_err();
        assert!(matches!(err, AuthError::MissingFields));
    }
}
