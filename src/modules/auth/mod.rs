//! Login and registration controllers.
//!
//! Each form runs `Editing → Submitting → {navigate | back to Editing with
//! an error}`. Only one submission may be in flight per form; a duplicate
//! submit while `Submitting` is a no-op.

use std::sync::{Arc, Mutex};

use bookshelf_gateway::operations::{Login, LoginVariables, Register, RegisterVariables};
use bookshelf_gateway::types::{LoginInput, RegisterInput};
use bookshelf_gateway::Gateway;
use bookshelf_kernel::session::SessionStore;

use super::{Navigate, Submit};

/// Shown once on the login screen after a successful registration.
pub const REGISTRATION_NOTICE: &str =
    "Registration successful! Please login with your credentials.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormPhase {
    #[default]
    Editing,
    Submitting,
}

#[derive(Default)]
struct LoginState {
    username: String,
    password: String,
    remember_me: bool,
    phase: FormPhase,
    error: Option<String>,
    notice: Option<String>,
}

pub struct LoginController {
    gateway: Arc<Gateway>,
    session: Arc<SessionStore>,
    state: Mutex<LoginState>,
}

impl LoginController {
    pub fn new(gateway: Arc<Gateway>, session: Arc<SessionStore>) -> Self {
        Self {
            gateway,
            session,
            state: Mutex::new(LoginState::default()),
        }
    }

    /// Entry point used when arriving from a successful registration; the
    /// notice is held in memory only, so reopening the login screen
    /// directly never shows it again.
    pub fn with_registration_notice(gateway: Arc<Gateway>, session: Arc<SessionStore>) -> Self {
        let controller = Self::new(gateway, session);
        controller
            .state
            .lock()
            .expect("login state")
            .notice = Some(REGISTRATION_NOTICE.to_string());
        controller
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.state.lock().expect("login state").username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.state.lock().expect("login state").password = password.into();
    }

    pub fn set_remember_me(&self, remember: bool) {
        self.state.lock().expect("login state").remember_me = remember;
    }

    /// One-time registration notice; the first read consumes it.
    pub fn take_notice(&self) -> Option<String> {
        self.state.lock().expect("login state").notice.take()
    }

    pub fn phase(&self) -> FormPhase {
        self.state.lock().expect("login state").phase
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().expect("login state").error.clone()
    }

    pub async fn submit(&self) -> Submit {
        let (username, password, remember) = {
            let mut state = self.state.lock().expect("login state");
            if state.phase == FormPhase::Submitting {
                return Submit::Ignored;
            }
            if state.username.is_empty() || state.password.is_empty() {
                state.error = Some("username and password are required".to_string());
                return Submit::Stayed;
            }
            state.phase = FormPhase::Submitting;
            state.error = None;
            (state.username.clone(), state.password.clone(), state.remember_me)
        };

        let result = self
            .gateway
            .execute::<Login>(LoginVariables {
                input: LoginInput { username, password },
            })
            .await;

        let mut state = self.state.lock().expect("login state");
        state.phase = FormPhase::Editing;
        match result {
            Ok(data) => {
                if let Err(err) = self.session.set_session(&data.login.access_token, remember) {
                    state.error = Some(format!("failed to persist session: {err}"));
                    return Submit::Stayed;
                }
                Submit::Navigate(Navigate::BookList)
            }
            Err(err) => {
                state.error = Some(err.to_string());
                Submit::Stayed
            }
        }
    }
}

#[derive(Default)]
struct RegisterState {
    username: String,
    password: String,
    agree_terms: bool,
    phase: FormPhase,
    error: Option<String>,
}

pub struct RegisterController {
    gateway: Arc<Gateway>,
    state: Mutex<RegisterState>,
}

impl RegisterController {
    pub fn new(gateway: Arc<Gateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(RegisterState::default()),
        }
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.state.lock().expect("register state").username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.state.lock().expect("register state").password = password.into();
    }

    pub fn set_agree_terms(&self, agree: bool) {
        self.state.lock().expect("register state").agree_terms = agree;
    }

    pub fn phase(&self) -> FormPhase {
        self.state.lock().expect("register state").phase
    }

    pub fn error(&self) -> Option<String> {
        self.state.lock().expect("register state").error.clone()
    }

    pub async fn submit(&self) -> Submit {
        let (username, password) = {
            let mut state = self.state.lock().expect("register state");
            if state.phase == FormPhase::Submitting {
                return Submit::Ignored;
            }
            if !state.agree_terms {
                state.error = Some("the terms of service must be accepted".to_string());
                return Submit::Stayed;
            }
            if state.username.is_empty() || state.password.is_empty() {
                state.error = Some("username and password are required".to_string());
                return Submit::Stayed;
            }
            state.phase = FormPhase::Submitting;
            state.error = None;
            (state.username.clone(), state.password.clone())
        };

        let result = self
            .gateway
            .execute::<Register>(RegisterVariables {
                input: RegisterInput { username, password },
            })
            .await;

        let mut state = self.state.lock().expect("register state");
        state.phase = FormPhase::Editing;
        match result {
            Ok(_) => Submit::Navigate(Navigate::Login {
                registration_success: true,
            }),
            Err(err) => {
                state.error = Some(err.to_string());
                Submit::Stayed
            }
        }
    }
}
