use crate::domain::{
    authentication::entities::User, common::AllerLensConfig, session::context::SessionSnapshot,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AuthForm {
    #[default]
    SignIn,
    SignUp,
}

/// What to show in place of the workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateView {
    /// Provider configuration is absent; nothing is attempted.
    SetupRequired,
    Loading,
    SignedOut(AuthForm),
    SignedIn(User),
}

/// Routes between the gate views. Holds no credentials; form input goes to
/// the session context unchanged.
#[derive(Debug, Clone)]
pub struct SessionGate {
    configured: bool,
    form: AuthForm,
}

impl SessionGate {
    pub fn new(configured: bool) -> Self {
        Self {
            configured,
            form: AuthForm::default(),
        }
    }

    pub fn for_config(config: &AllerLensConfig) -> Self {
        Self::new(config.identity_configured())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn form(&self) -> AuthForm {
        self.form
    }

    pub fn show_sign_in(&mut self) {
        self.form = AuthForm::SignIn;
    }

    pub fn show_sign_up(&mut self) {
        self.form = AuthForm::SignUp;
    }

    pub fn view(&self, snapshot: Option<&SessionSnapshot>) -> GateView {
        if !self.configured {
            return GateView::SetupRequired;
        }

        match snapshot {
            None => GateView::Loading,
            Some(s) if s.loading => GateView::Loading,
            Some(SessionSnapshot {
                user: Some(user), ..
            }) => GateView::SignedIn(user.clone()),
            Some(_) => GateView::SignedOut(self.form),
        }
    }
}
