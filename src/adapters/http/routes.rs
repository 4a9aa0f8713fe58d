use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::adapters::http::{shell::PAGE_SHELL, state::HttpState};
use crate::application::dto::{
    DialogAnswer, FilterRequest, LanguagePreferenceRequest, NavigateRequest, OkResponse, PasswordChangeForm,
    PreferencesUpdate,
};
use crate::domain::{
    alert::AlertFilter,
    camera::CameraDraft,
    session::{Credentials, SignUpRequest},
    view::Region,
};

fn ok() -> Json<OkResponse> {
    Json(OkResponse { ok: true })
}

fn bad_request(msg: impl Into<String>) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": msg.into() }))).into_response()
}

pub async fn shell() -> Html<&'static str> {
    Html(PAGE_SHELL)
}

// --- Vistas ---

pub async fn snapshot(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.dashboard.views.snapshot())
}

#[derive(Deserialize)]
pub struct RegionQuery {
    format: Option<String>,
}

pub async fn region(
    State(st): State<HttpState>,
    Path(name): Path<String>,
    Query(q): Query<RegionQuery>,
) -> impl IntoResponse {
    let Some(region) = Region::parse(&name) else {
        return (StatusCode::NOT_FOUND, format!("unknown region {name}")).into_response();
    };
    match st.dashboard.views.get(region) {
        Some(view) if q.format.as_deref() == Some("html") => Html(view.to_html()).into_response(),
        Some(view) => Json(view).into_response(),
        None => (StatusCode::NOT_FOUND, format!("region {name} not mounted")).into_response(),
    }
}

pub async fn session(State(st): State<HttpState>) -> impl IntoResponse {
    Json(st.dashboard.session.session())
}

// --- Navegación y sesión ---

pub async fn navigate(State(st): State<HttpState>, Json(req): Json<NavigateRequest>) -> impl IntoResponse {
    st.dashboard.views.navigate(&req.location);
    ok()
}

pub async fn show_sign_in(State(st): State<HttpState>) -> impl IntoResponse {
    st.dashboard.session.show_sign_in();
    ok()
}

pub async fn show_sign_up(State(st): State<HttpState>) -> impl IntoResponse {
    st.dashboard.session.show_sign_up();
    ok()
}

pub async fn sign_in(State(st): State<HttpState>, Json(creds): Json<Credentials>) -> impl IntoResponse {
    st.dashboard.session.sign_in(creds).await;
    ok()
}

pub async fn sign_up(State(st): State<HttpState>, Json(req): Json<SignUpRequest>) -> impl IntoResponse {
    st.dashboard.session.sign_up(req).await;
    ok()
}

pub async fn logout(State(st): State<HttpState>) -> impl IntoResponse {
    st.dashboard.session.logout().await;
    ok()
}

pub async fn change_password(
    State(st): State<HttpState>,
    Json(form): Json<PasswordChangeForm>,
) -> impl IntoResponse {
    st.dashboard.session.change_password(&form.new_password, &form.confirm_password).await;
    ok()
}

// --- Alertas ---

pub async fn filter_alerts(State(st): State<HttpState>, Json(req): Json<FilterRequest>) -> impl IntoResponse {
    match req.status.parse::<AlertFilter>() {
        Ok(filter) => {
            st.dashboard.admin_alerts.set_filter(filter);
            ok().into_response()
        }
        Err(e) => bad_request(e.to_string()),
    }
}

pub async fn verify_alert(State(st): State<HttpState>, Path(id): Path<String>) -> impl IntoResponse {
    st.dashboard.admin_alerts.verify(&id).await;
    ok()
}

pub async fn dismiss_alert(State(st): State<HttpState>, Path(id): Path<String>) -> impl IntoResponse {
    st.dashboard.admin_alerts.request_dismiss(&id);
    ok()
}

// --- Cámaras ---

pub async fn add_camera(State(st): State<HttpState>, Json(draft): Json<CameraDraft>) -> impl IntoResponse {
    st.dashboard.cameras.add(draft).await;
    ok()
}

pub async fn edit_camera(State(st): State<HttpState>, Path(id): Path<String>) -> impl IntoResponse {
    if st.dashboard.cameras.begin_edit(&id) {
        ok().into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("camera {id} not listed")).into_response()
    }
}

pub async fn submit_camera_edit(
    State(st): State<HttpState>,
    Json(draft): Json<CameraDraft>,
) -> impl IntoResponse {
    if st.dashboard.cameras.editing().is_none() {
        return bad_request("no camera being edited");
    }
    st.dashboard.cameras.submit_edit(draft).await;
    ok().into_response()
}

pub async fn cancel_camera_edit(State(st): State<HttpState>) -> impl IntoResponse {
    st.dashboard.cameras.cancel_edit();
    ok()
}

pub async fn activate_camera(State(st): State<HttpState>, Path(id): Path<String>) -> impl IntoResponse {
    st.dashboard.cameras.activate(&id).await;
    ok()
}

pub async fn delete_camera(State(st): State<HttpState>, Path(id): Path<String>) -> impl IntoResponse {
    st.dashboard.cameras.request_delete(&id);
    ok()
}

// --- Diálogos ---

pub async fn answer_dialog(
    State(st): State<HttpState>,
    Path(id): Path<Uuid>,
    Json(answer): Json<DialogAnswer>,
) -> impl IntoResponse {
    if st.dashboard.notifier.answer(id, answer.confirmed) {
        ok().into_response()
    } else {
        (StatusCode::NOT_FOUND, format!("dialog {id} not open")).into_response()
    }
}

pub async fn close_dialogs(State(st): State<HttpState>) -> impl IntoResponse {
    st.dashboard.notifier.close_all();
    ok()
}

// --- Preferencias ---

pub async fn update_preferences(
    State(st): State<HttpState>,
    Json(update): Json<PreferencesUpdate>,
) -> impl IntoResponse {
    Json(st.dashboard.prefs.update(update))
}

pub async fn save_language(
    State(st): State<HttpState>,
    Json(req): Json<LanguagePreferenceRequest>,
) -> impl IntoResponse {
    st.dashboard.prefs.save_language_preference(&req.language);
    ok()
}
