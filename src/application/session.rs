use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{error, info, warn};

use crate::application::notify::Notifier;
use crate::application::ports::{BackendPort, IdentityPort, ProfileStorePort};
use crate::application::render::render_auth_forms;
use crate::application::view_store::ViewStore;
use crate::domain::{
    errors::{AuthFailure, DomainError},
    session::{AuthForm, AuthSession, Credentials, SessionState, SignUpRequest, UserProfile, UserRole},
    view::Region,
};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Default)]
struct SessionInner {
    state: SessionState,
    auth: Option<AuthSession>,
    form: AuthForm,
}

/// Dueño del estado de sesión: formularios, alta, acceso, salida y cambio de contraseña.
pub struct SessionController {
    identity: Arc<dyn IdentityPort>,
    profiles: Arc<dyn ProfileStorePort>,
    api: Arc<dyn BackendPort>,
    views: Arc<ViewStore>,
    notifier: Arc<Notifier>,
    inner: Mutex<SessionInner>,
}

impl SessionController {
    pub fn new(
        identity: Arc<dyn IdentityPort>,
        profiles: Arc<dyn ProfileStorePort>,
        api: Arc<dyn BackendPort>,
        views: Arc<ViewStore>,
        notifier: Arc<Notifier>,
    ) -> Self {
        Self { identity, profiles, api, views, notifier, inner: Mutex::new(SessionInner::default()) }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn form(&self) -> AuthForm {
        self.lock().form
    }

    /// Pinta el formulario visible (al montar la página de acceso).
    pub fn render_forms(&self) {
        self.views.replace(Region::AuthForms, render_auth_forms(self.form()));
    }

    pub fn show_sign_in(&self) {
        self.lock().form = AuthForm::SignIn;
        self.render_forms();
    }

    pub fn show_sign_up(&self) {
        self.lock().form = AuthForm::SignUp;
        self.render_forms();
    }

    pub async fn sign_up(&self, req: SignUpRequest) {
        let auth = match self.identity.sign_up(&req.email, &req.password).await {
            Ok(auth) => auth,
            Err(e) => {
                error!("❌ Error during signup: {}", e);
                let message = match e {
                    DomainError::Auth(AuthFailure::EmailInUse) => "Email Address Already Exists !!!",
                    _ => "Unable to create User",
                };
                self.notifier.show_message(Region::SignUpMessage, message);
                return;
            }
        };
        self.notifier.show_message(Region::SignUpMessage, "Account Created Successfully");

        let profile = UserProfile {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            role: UserRole::Personnel,
        };
        if let Err(e) = self.profiles.write_profile(&auth, &profile).await {
            error!("❌ Error writing user profile: {}", e);
            return;
        }
        info!("👤 Account created for {}", auth.uid);
        self.establish(auth, UserRole::Personnel);
        self.views.navigate(UserRole::Personnel.landing_page());
    }

    pub async fn sign_in(&self, creds: Credentials) {
        let result = async {
            let auth = self.identity.sign_in(&creds.email, &creds.password).await?;
            let redirect = self.api.login(&auth.id_token).await?;
            Ok::<_, DomainError>((auth, redirect))
        }
        .await;

        let (auth, redirect) = match result {
            Ok(ok) => ok,
            Err(e) => {
                error!("❌ Error during signin: {}", e);
                let message = match e {
                    DomainError::Auth(AuthFailure::InvalidCredential) => "Incorrect Email or Password",
                    _ => "Account does not Exist",
                };
                self.notifier.show_message(Region::SignInMessage, message);
                return;
            }
        };

        let role = match self.profiles.read_role(&auth).await {
            Ok(role) => role.unwrap_or_default(),
            Err(e) => {
                warn!("⚠️ Error fetching user role: {}", e);
                self.views.navigate("/");
                return;
            }
        };
        info!("🔓 {} signed in as {:?}", auth.uid, role);
        self.establish(auth, role);
        self.notifier.show_message(Region::SignInMessage, "Login successful");
        self.views.navigate(&redirect);
    }

    fn establish(&self, auth: AuthSession, role: UserRole) {
        let mut inner = self.lock();
        inner.state = SessionState { user_id: Some(auth.uid.clone()), role };
        inner.auth = Some(auth);
    }

    pub async fn logout(&self) {
        if let Err(e) = self.identity.sign_out().await {
            error!("❌ Error signing out: {}", e);
            return;
        }
        {
            let mut inner = self.lock();
            inner.state = SessionState::default();
            inner.auth = None;
            inner.form = AuthForm::SignIn;
        }
        info!("👋 User signed out");
        self.views.navigate("/");
    }

    pub async fn change_password(&self, new_password: &str, confirm_password: &str) {
        if new_password != confirm_password {
            self.notifier.show_modal("Error", "Passwords do not match.", "error");
            return;
        }
        if new_password.chars().count() < MIN_PASSWORD_LEN {
            self.notifier.show_modal("Error", "Password must be at least 6 characters long.", "error");
            return;
        }
        match self.api.change_password(new_password).await {
            Ok(()) => {
                info!("🔑 Password changed");
                self.notifier.show_modal("Success", "Password has been changed successfully.", "success");
            }
            Err(e) => {
                error!("❌ Error changing password: {}", e);
                self.notifier.show_modal("Error", "Failed to change password. Please try again.", "error");
            }
        }
    }
}
