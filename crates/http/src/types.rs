//! Request and response shapes of the campus API

use campus_core::validation::validators::{
    validate_email, validate_password, validate_phone, validate_required, validate_telegram,
};
use campus_core::{Credentials, Role, Validate, ValidationError};
use serde::{Deserialize, Serialize};

/// Sign-in request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_email(&self.email, "email")?;
        validate_password(&self.password, "password")
    }
}

/// Whether the user runs their own business
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusinessOwner {
    Yes,
    No,
    Other,
}

/// Registration request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub age: u32,
    pub birthdate: String,
    pub city: String,
    pub employment: String,
    pub is_business_owner: BusinessOwner,
    pub month_income: f64,
    pub name: String,
    pub phone_number: String,
    pub position_at_work: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationError> {
        validate_required(&self.name, "name")?;
        validate_required(&self.birthdate, "birthdate")?;
        validate_email(&self.email, "email")?;
        validate_password(&self.password, "password")?;
        validate_phone(&self.phone_number, "phone_number")?;
        validate_required(&self.city, "city")?;
        validate_required(&self.employment, "employment")?;
        validate_required(&self.position_at_work, "position_at_work")?;
        if !self.month_income.is_finite() || self.month_income < 0.0 {
            return Err(ValidationError::new(
                "month_income",
                "must be a non-negative number",
            ));
        }
        match self.telegram.as_deref() {
            None | Some("") => Ok(()),
            Some(handle) => validate_telegram(handle, "telegram"),
        }
    }
}

/// Response of signin, signup and refresh
///
/// Older servers only return the token and set the cookie; the identity
/// claims are then missing.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl AuthResponse {
    /// Token and claims as a complete credential set
    pub fn into_credentials(self) -> Option<Credentials> {
        match (self.id, self.role) {
            (Some(id), Some(role)) if !self.access_token.is_empty() => {
                Some(Credentials::new(self.access_token, id, role))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"<redacted>")
            .field("id", &self.id)
            .field("role", &self.role)
            .finish()
    }
}

/// Profile of the signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub age: u32,
    pub birthdate: String,
    pub city: String,
    pub employment: String,
    pub is_business_owner: BusinessOwner,
    pub month_income: f64,
    pub name: String,
    pub phone_number: String,
    pub position_at_work: String,
    #[serde(default)]
    pub telegram: Option<String>,
}

/// `GET /users/me` payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserInfoResponse {
    pub user: User,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn signup() -> SignupRequest {
        SignupRequest {
            email: "student@example.com".to_string(),
            password: "correct-horse".to_string(),
            age: 30,
            birthdate: "1995-04-01".to_string(),
            city: "Kazan".to_string(),
            employment: "employed".to_string(),
            is_business_owner: BusinessOwner::No,
            month_income: 1000.0,
            name: "Student".to_string(),
            phone_number: "+79991234567".to_string(),
            position_at_work: "engineer".to_string(),
            telegram: None,
        }
    }

    #[test]
    fn test_auth_response_with_claims() {
        let response: AuthResponse =
            serde_json::from_value(json!({"access_token": "t1", "id": "u1", "role": "User"}))
                .unwrap();
        let credentials = response.into_credentials().unwrap();
        assert_eq!(credentials, Credentials::new("t1", "u1", Role::User));
    }

    #[test]
    fn test_legacy_auth_response_has_no_credentials() {
        let response: AuthResponse =
            serde_json::from_value(json!({"access_token": "t1"})).unwrap();
        assert!(response.into_credentials().is_none());
    }

    #[test]
    fn test_login_validation() {
        assert!(LoginRequest::new("student@example.com", "12345678").validate().is_ok());

        let err = LoginRequest::new("nope", "12345678").validate().unwrap_err();
        assert_eq!(err.field, "email");

        let err = LoginRequest::new("student@example.com", "short")
            .validate()
            .unwrap_err();
        assert_eq!(err.field, "password");
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup().validate().is_ok());

        let mut request = signup();
        request.telegram = Some("@campus_student".to_string());
        assert!(request.validate().is_ok());

        request.telegram = Some("campus".to_string());
        assert_eq!(request.validate().unwrap_err().field, "telegram");

        let mut request = signup();
        request.phone_number = "8999".to_string();
        assert_eq!(request.validate().unwrap_err().field, "phone_number");

        let mut request = signup();
        request.month_income = -1.0;
        assert_eq!(request.validate().unwrap_err().field, "month_income");
    }

    #[test]
    fn test_signup_omits_missing_telegram() {
        let value = serde_json::to_value(signup()).unwrap();
        assert!(value.get("telegram").is_none());
        assert_eq!(value["is_business_owner"], "no");
    }
}
