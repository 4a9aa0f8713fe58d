pub mod routes;
pub mod shell;
pub mod state;
pub mod ws;

use axum::{routing::{get, post}, Router};
use crate::adapters::http::state::HttpState;
use crate::adapters::http::ws::ws_handler;
use crate::domain::view::Page;

pub fn router(state: HttpState) -> Router {
    let mut app = Router::new();
    for page in Page::ALL {
        app = app.route(page.path(), get(routes::shell));
    }
    app.route("/api/views", get(routes::snapshot))
        .route("/api/views/:region", get(routes::region))
        .route("/api/session", get(routes::session))
        .route("/api/actions/navigate", post(routes::navigate))
        .route("/api/actions/show_sign_in", post(routes::show_sign_in))
        .route("/api/actions/show_sign_up", post(routes::show_sign_up))
        .route("/api/actions/sign_in", post(routes::sign_in))
        .route("/api/actions/sign_up", post(routes::sign_up))
        .route("/api/actions/logout", post(routes::logout))
        .route("/api/actions/change_password", post(routes::change_password))
        .route("/api/actions/alerts/filter", post(routes::filter_alerts))
        .route("/api/actions/alerts/:id/verify", post(routes::verify_alert))
        .route("/api/actions/alerts/:id/dismiss", post(routes::dismiss_alert))
        .route("/api/actions/cameras", post(routes::add_camera))
        .route("/api/actions/cameras/edit", post(routes::submit_camera_edit))
        .route("/api/actions/cameras/edit/cancel", post(routes::cancel_camera_edit))
        .route("/api/actions/cameras/:id/edit", post(routes::edit_camera))
        .route("/api/actions/cameras/:id/activate", post(routes::activate_camera))
        .route("/api/actions/cameras/:id/delete", post(routes::delete_camera))
        .route("/api/actions/dialogs/close", post(routes::close_dialogs))
        .route("/api/actions/dialogs/:id", post(routes::answer_dialog))
        .route("/api/actions/preferences", post(routes::update_preferences))
        .route("/api/actions/preferences/language", post(routes::save_language))
        .route("/ws/views", get(ws_handler))
        .with_state(state)
}
