//! Signup / signin form slice

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::ApiError;
use crate::models::{AuthResponse, Session, SigninRequest, SignupRequest};

const MIN_USERNAME_LEN: usize = 3;
const MIN_PASSWORD_LEN: usize = 6;
const SIGNUP_CONFLICT_MESSAGE: &str = "username or email already exists";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"))
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuthMode {
    Signup,
    Signin,
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum AuthField {
    Username,
    Email,
    Password,
}

impl AuthField {
    pub fn label(&self) -> &'static str {
        match self {
            AuthField::Username => "Username",
            AuthField::Email => "Email",
            AuthField::Password => "Password",
        }
    }

    /// Hint shown next to a field that fails validation
    pub fn hint(&self) -> &'static str {
        match self {
            AuthField::Username => "at least 3 characters",
            AuthField::Email => "enter a valid email address",
            AuthField::Password => "at least 6 characters",
        }
    }
}

/// Request produced by a valid submission
#[derive(Clone, Debug, PartialEq)]
pub enum AuthRequest {
    Signup(SignupRequest),
    Signin(SigninRequest),
}

/// State of a signup or signin form
#[derive(Clone, Debug)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub username: String,
    pub email: String,
    pub password: String,
    pub is_loading: bool,
    pub succeeded: bool,
    pub input_errors: BTreeSet<AuthField>,
    pub server_error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        AuthForm {
            mode,
            username: String::new(),
            email: String::new(),
            password: String::new(),
            is_loading: false,
            succeeded: false,
            input_errors: BTreeSet::new(),
            server_error: None,
        }
    }

    /// Fields shown by this form, in tab order
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::Signup => &[AuthField::Username, AuthField::Email, AuthField::Password],
            AuthMode::Signin => &[AuthField::Email, AuthField::Password],
        }
    }

    pub fn value(&self, field: AuthField) -> &str {
        match field {
            AuthField::Username => &self.username,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
        }
    }

    fn value_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Username => &mut self.username,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
        }
    }

    pub fn has_error(&self, field: AuthField) -> bool {
        self.input_errors.contains(&field)
    }

    /// Replace a field value and recompute its input error
    pub fn on_change(&mut self, field: AuthField, value: impl Into<String>) {
        *self.value_mut(field) = value.into();
        self.revalidate(field);
    }

    /// Recompute the input error of one field from its current value
    fn revalidate(&mut self, field: AuthField) {
        if is_valid(field, self.value(field)) {
            self.input_errors.remove(&field);
        } else {
            self.input_errors.insert(field);
        }
    }

    /// Validate every field and build the request. `None` when already
    /// loading or when any field is invalid; nothing should be sent then.
    pub fn begin_submit(&mut self) -> Option<AuthRequest> {
        if self.is_loading {
            return None;
        }
        for &field in self.fields() {
            self.revalidate(field);
        }
        if !self.input_errors.is_empty() {
            return None;
        }

        self.is_loading = true;
        self.succeeded = false;
        self.server_error = None;

        let request = match self.mode {
            AuthMode::Signup => AuthRequest::Signup(SignupRequest {
                username: self.username.trim().to_string(),
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            }),
            AuthMode::Signin => AuthRequest::Signin(SigninRequest {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            }),
        };
        Some(request)
    }

    /// Apply the server's answer. Returns the new session on success.
    pub fn apply_response(&mut self, result: Result<AuthResponse, ApiError>) -> Option<Session> {
        self.is_loading = false;
        match result {
            Ok(resp) => match resp.session() {
                Some(session) => {
                    self.reset();
                    self.succeeded = true;
                    Some(session)
                }
                None => {
                    let fallback = match self.mode {
                        AuthMode::Signup => SIGNUP_CONFLICT_MESSAGE,
                        AuthMode::Signin => "Sign in failed",
                    };
                    self.server_error = Some(resp.message.unwrap_or_else(|| fallback.to_string()));
                    None
                }
            },
            Err(e) => {
                self.server_error = Some(e.to_string());
                None
            }
        }
    }

    /// Back to the initial empty form (keeps the mode)
    pub fn reset(&mut self) {
        *self = AuthForm::new(self.mode);
    }
}

fn is_valid(field: AuthField, value: &str) -> bool {
    match field {
        AuthField::Username => value.trim().chars().count() >= MIN_USERNAME_LEN,
        AuthField::Email => email_regex().is_match(value.trim()),
        AuthField::Password => value.chars().count() >= MIN_PASSWORD_LEN,
    }
}
