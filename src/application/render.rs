//! Funciones de render puras: datos → árbol de vista.
//! Ninguna toca red, temporizadores ni el `ViewStore`.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::application::capture_loop::AlertLogEntry;
use crate::application::notify::{Dialog, DialogKind};
use crate::domain::{
    alert::{format_date_time, format_time, AlertFilter, AlertRecord, AlertStatus},
    camera::{CameraRecord, FrameSize},
    detection::DetectionResult,
    preferences::{translate, Preferences, DEFAULT_TIMEZONE},
    status::{ActivityLogEntry, HealthReport, SystemStatus, ThreatConfig},
    view::{Element, Region},
};

pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn percent(part: f64, whole: f64) -> String {
    if whole <= 0.0 {
        return "0%".to_string();
    }
    format!("{}%", (part / whole) * 100.0)
}

fn shown(el: Element, visible: bool) -> Element {
    el.style("display", if visible { "block" } else { "none" })
}

// --- Captura ---

/// One box per detection, positioned relative to the native frame size.
pub fn render_overlay(detections: &[DetectionResult], frame: FrameSize) -> Element {
    let (w, h) = (frame.width as f64, frame.height as f64);
    let boxes = detections.iter().map(|det| {
        let [x1, y1, x2, y2] = det.bbox.map(f64::from);
        Element::new("div")
            .class("bounding-box")
            .class(if det.is_unknown() { "unknown" } else { "known" })
            .style("left", percent(x1, w))
            .style("top", percent(y1, h))
            .style("width", percent(x2 - x1, w))
            .style("height", percent(y2 - y1, h))
            .child(Element::new("span").text(det.label()))
    });
    Element::new("div").attr("id", "detection-overlay").children(boxes)
}

pub fn render_alarm_indicator(active: bool) -> Element {
    shown(Element::new("div").attr("id", "alarm-status").text("ALARM"), active)
}

pub fn render_status_line(text: &str) -> Element {
    Element::new("p").attr("id", "system-status").text(text)
}

pub fn render_alert_log<'a>(entries: impl IntoIterator<Item = &'a AlertLogEntry>) -> Element {
    let items = entries.into_iter().map(|entry| {
        Element::new("li")
            .class(entry.kind.clone())
            .child(Element::new("span").text(format!("[{}] {}", entry.at.format("%H:%M:%S"), entry.message)))
    });
    Element::new("ul").attr("id", "alerts-list").children(items)
}

// --- Resumen ---

pub fn render_system_status(status: &SystemStatus) -> [(Region, Element); 4] {
    let level = &status.threat_level;
    [
        (
            Region::SystemStatus,
            Element::new("span")
                .class(if status.is_running() { "status-ok" } else { "status-error" })
                .text(capitalize(&status.status)),
        ),
        (
            Region::ThreatLevel,
            Element::new("span").class(format!("threat-level-{}", level.to_lowercase())).text(level.clone()),
        ),
        (
            Region::AlertsToday,
            Element::new("span")
                .class(if status.alerts_today > 0 { "status-warning" } else { "status-ok" })
                .text(status.alerts_today.to_string()),
        ),
        (
            Region::CamerasActive,
            Element::new("span")
                .class(if status.all_cameras_active() { "status-ok" } else { "status-warning" })
                .text(status.cameras_active.clone()),
        ),
    ]
}

pub fn render_recent_alerts(alerts: &[AlertRecord]) -> Element {
    let list = Element::new("ul").attr("id", "recent-alerts");
    if alerts.is_empty() {
        return list.child(Element::new("li").class("alert-item").text("No recent alerts"));
    }
    list.children(alerts.iter().map(|alert| {
        Element::new("li")
            .class("alert-item")
            .class(format!("threat-level-{}", alert.threat_level.as_str().to_lowercase()))
            .text(format!(
                "{}: {} detected on {}",
                format_time(alert.timestamp.as_ref()),
                alert.detections.join(", "),
                alert.camera
            ))
    }))
}

// --- Alertas ---

pub struct AlertListView {
    pub list: Element,
    pub counter: Element,
    pub shown: usize,
}

/// `filter = None` renders the read-only personnel list.
pub fn render_alert_list(alerts: &[AlertRecord], filter: Option<AlertFilter>) -> AlertListView {
    let admin = filter.is_some();
    let visible: Vec<&AlertRecord> = alerts
        .iter()
        .filter(|a| filter.map_or(true, |f| f.matches(a)))
        .collect();

    let list = Element::new("ul").attr("id", "alert-list");
    let list = if visible.is_empty() {
        let empty = if admin { "No alerts found for this filter." } else { "No alerts found." };
        list.child(Element::new("li").class("no-alerts").text(empty))
    } else {
        list.children(visible.iter().map(|alert| render_alert_item(alert, admin)))
    };

    AlertListView {
        list,
        counter: Element::new("span").attr("id", "alert-counter").text(format!("{} alerts", visible.len())),
        shown: visible.len(),
    }
}

fn render_alert_item(alert: &AlertRecord, with_actions: bool) -> Element {
    let level = alert.threat_level.as_str();
    let status = alert.status.as_str();
    let details = Element::new("div")
        .class("alert-details")
        .child(Element::new("span").class("alert-time").text(format_date_time(alert.timestamp.as_ref())))
        .child(Element::new("p").text(format!("Camera: {}", alert.camera)))
        .child(Element::new("p").text(format!("Detections: {}", alert.detections.join(", "))))
        .child(
            Element::new("p").text("Threat Level: ").child(
                Element::new("span")
                    .class("threat-level-indicator")
                    .class(format!("level-{}", level.to_lowercase()))
                    .text(level),
            ),
        )
        .child(
            Element::new("p").text("Status: ").child(
                Element::new("span")
                    .class("status-badge")
                    .class(format!("status-{status}"))
                    .text(capitalize(status)),
            ),
        );

    let item = Element::new("li").class("alert-item").attr("data-id", alert.id.clone());
    if !with_actions {
        return item.child(details);
    }

    let mut actions = Element::new("div").class("alert-actions");
    if alert.status == AlertStatus::Unverified {
        actions = actions
            .child(action_button("verify-btn", "verify-alert", &alert.id, "Verify", false))
            .child(action_button("dismiss-btn", "dismiss-alert", &alert.id, "Dismiss", false));
    }
    item.class(format!("status-{status}")).child(details).child(actions)
}

pub fn render_alert_filters(current: AlertFilter) -> Element {
    let buttons = ["all", "unverified", "verified", "dismissed"].into_iter().map(|tag| {
        let btn = Element::new("button")
            .class("filter-btn")
            .attr("data-status", tag)
            .attr("data-action", "filter-alerts")
            .text(capitalize(tag));
        if current.as_str() == tag { btn.class("active") } else { btn }
    });
    Element::new("div").class("alert-filters").children(buttons)
}

fn action_button(class: &str, action: &str, id: &str, label: &str, disabled: bool) -> Element {
    let btn = Element::new("button")
        .class(class)
        .attr("data-action", action)
        .attr("data-id", id)
        .text(label);
    if disabled { btn.attr("disabled", "") } else { btn }
}

// --- Cámaras ---

pub fn render_camera_table(cameras: &[CameraRecord]) -> Element {
    let rows = cameras.iter().map(|camera| {
        let status = camera.status_or_default();
        Element::new("tr")
            .child(Element::new("td").text(camera.name.clone()))
            .child(Element::new("td").text(camera.display_source()))
            .child(
                Element::new("td").child(
                    Element::new("span")
                        .class("status-badge")
                        .class(format!("status-{status}"))
                        .text(capitalize(status)),
                ),
            )
            .child(
                Element::new("td")
                    .child(action_button(
                        "activate-camera-btn",
                        "activate-camera",
                        &camera.id,
                        if camera.is_default { "Active" } else { "Activate" },
                        camera.is_default,
                    ))
                    .child(action_button("edit-camera-btn", "edit-camera", &camera.id, "Edit", false))
                    .child(action_button(
                        "delete-camera-btn",
                        "delete-camera",
                        &camera.id,
                        "Delete",
                        camera.is_default,
                    )),
            )
    });
    Element::new("tbody").attr("id", "camera-table-body").children(rows)
}

pub fn render_camera_editor(editing: Option<&CameraRecord>) -> Element {
    let (name, url) = editing
        .map(|c| (c.name.clone(), c.rtsp_url.clone().or_else(|| c.source.clone()).unwrap_or_default()))
        .unwrap_or_default();
    let form = Element::new("form")
        .attr("id", "edit-camera-form")
        .child(Element::new("input").attr("id", "edit-camera-name").attr("value", name))
        .child(Element::new("input").attr("id", "edit-rtsp-url").attr("value", url));
    let modal = Element::new("div").attr("id", "edit-camera-modal").child(form);
    match editing {
        Some(camera) => shown(modal.attr("data-id", camera.id.clone()), true),
        None => shown(modal, false),
    }
}

// --- Amenaza, actividad, salud ---

pub fn render_threat_panel(config: &ThreatConfig) -> Element {
    let level = config.effective_level();
    let lower = level.to_lowercase();
    Element::new("div")
        .class("threat-panel")
        .child(
            Element::new("span")
                .attr("id", "threat-level")
                .class("level-indicator")
                .class(format!("level-{lower}"))
                .text(level),
        )
        .child(
            Element::new("span")
                .attr("id", "current-threat-level")
                .class(format!("threat-level-{lower}"))
                .text(level),
        )
        .child(Element::new("p").attr("id", "threat-description").text(config.description()))
}

pub fn render_activity_log(logs: &[ActivityLogEntry]) -> (Element, Element) {
    let body = Element::new("tbody").attr("id", "activity-log-body");
    let body = if logs.is_empty() {
        body.child(
            Element::new("tr").child(
                Element::new("td").attr("colspan", "6").class("no-data").text("No activity logs found."),
            ),
        )
    } else {
        body.children(logs.iter().map(render_log_row))
    };
    let counter = Element::new("span").attr("id", "log-counter").text(format!("{} logs", logs.len()));
    (body, counter)
}

fn render_log_row(log: &ActivityLogEntry) -> Element {
    let or_na = |v: &Option<String>| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "N/A".to_string());
    let threat = match log.threat_level.as_deref().filter(|l| !l.is_empty()) {
        Some(level) => Element::new("td").child(
            Element::new("span")
                .class("threat-level-indicator")
                .class(format!("level-{}", level.to_lowercase()))
                .text(level),
        ),
        None => Element::new("td").text("N/A"),
    };
    Element::new("tr")
        .child(Element::new("td").text(format_date_time(log.timestamp.as_ref())))
        .child(Element::new("td").text(log.user_id.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "System".to_string())))
        .child(Element::new("td").text(or_na(&log.role)))
        .child(Element::new("td").text(or_na(&log.camera)))
        .child(Element::new("td").text(log.detections_text()))
        .child(threat)
        .child(Element::new("td").text(or_na(&log.status)))
        .child(Element::new("td").text(or_na(&log.message)))
}

pub fn render_health(report: Option<&HealthReport>) -> Element {
    let el = Element::new("span").attr("id", "health-indicator");
    match report {
        Some(r) => el.class(format!("health-{}", r.status)).text(r.status.to_uppercase()),
        None => el.class("health-error").text("ERROR"),
    }
}

// --- Diálogos, mensajes y formularios ---

pub fn render_modals(dialogs: &[Dialog]) -> Element {
    let modals = dialogs.iter().map(|dialog| {
        let id = dialog.id.to_string();
        let footer = match dialog.kind {
            DialogKind::Confirm => Element::new("div")
                .class("modal-footer")
                .child(dialog_button("confirm-btn", &id, "Yes"))
                .child(dialog_button("cancel-btn", &id, "No")),
            DialogKind::Notice => Element::new("div").class("modal-footer").child(dialog_button("ok-btn", &id, "OK")),
        };
        Element::new("div")
            .class("custom-modal")
            .class(dialog.tone.clone())
            .attr("data-dialog-id", id.clone())
            .child(
                Element::new("div")
                    .class("modal-content")
                    .child(dialog_button("close-modal-btn", &id, "×"))
                    .child(Element::new("div").class("modal-header").child(Element::new("h2").text(dialog.title.clone())))
                    .child(Element::new("div").class("modal-body").child(Element::new("p").text(dialog.message.clone())))
                    .child(footer),
            )
    });
    Element::new("div").attr("id", "modals").children(modals)
}

fn dialog_button(class: &str, id: &str, label: &str) -> Element {
    Element::new("button").class(class).attr("data-dialog-id", id).text(label)
}

pub fn render_message(text: &str, visible: bool) -> Element {
    Element::new("div")
        .class("message")
        .style("display", "block")
        .style("opacity", if visible { "1" } else { "0" })
        .text(text)
}

pub fn render_auth_forms(form: crate::domain::session::AuthForm) -> Element {
    use crate::domain::session::AuthForm;
    let sign_in = Element::new("form")
        .attr("id", "signIn")
        .child(Element::new("input").attr("id", "email").attr("type", "email"))
        .child(Element::new("input").attr("id", "password").attr("type", "password"))
        .child(Element::new("button").attr("id", "submitSignIn").text("Sign In"))
        .child(Element::new("button").attr("id", "signUpButton").attr("data-action", "show-sign-up").text("Sign Up"));
    let sign_up = Element::new("form")
        .attr("id", "signup")
        .child(Element::new("input").attr("id", "fName"))
        .child(Element::new("input").attr("id", "lName"))
        .child(Element::new("input").attr("id", "rEmail").attr("type", "email"))
        .child(Element::new("input").attr("id", "rPassword").attr("type", "password"))
        .child(Element::new("button").attr("id", "submitSignUp").text("Sign Up"))
        .child(Element::new("button").attr("id", "signInButton").attr("data-action", "show-sign-in").text("Sign In"));
    Element::new("div")
        .class("auth-forms")
        .child(shown(sign_in, form == AuthForm::SignIn))
        .child(shown(sign_up, form == AuthForm::SignUp))
}

pub fn render_chrome(prefs: &Preferences) -> Element {
    let lang = prefs.language.as_str();
    let title = translate(lang, "title").or_else(|| translate("en", "title")).unwrap_or_default();
    let dark_label = translate(lang, "dark_mode").or_else(|| translate("en", "dark_mode")).unwrap_or_default();
    let mut toggle = Element::new("input").attr("id", "dark-mode-toggle").attr("type", "checkbox");
    if prefs.is_dark() {
        toggle = toggle.attr("checked", "");
    }
    let chrome = Element::new("div")
        .attr("id", "chrome")
        .attr("data-language", lang)
        .child(Element::new("h1").attr("data-i18n", "title").text(title))
        .child(toggle)
        .child(Element::new("label").attr("for", "dark-mode-toggle").text(dark_label));
    if prefs.is_dark() { chrome.class("dark-mode") } else { chrome }
}

/// Reloj `h:mm:ss AM` en la zona preferida; una zona desconocida usa la de por defecto.
pub fn render_clock(now: DateTime<Utc>, timezone: &str) -> Element {
    let zone: Tz = timezone
        .parse()
        .or_else(|_| DEFAULT_TIMEZONE.parse())
        .unwrap_or(chrono_tz::Africa::Lagos);
    Element::new("span")
        .attr("id", "current-time")
        .attr("data-timezone", zone.name())
        .text(now.with_timezone(&zone).format("%-I:%M:%S %p").to_string())
}

pub fn render_settings(prefs: &Preferences) -> Element {
    Element::new("div")
        .class("settings")
        .child(
            Element::new("select")
                .attr("id", "personnel-language")
                .attr("value", prefs.language_preference.clone()),
        )
        .child(
            Element::new("form")
                .attr("id", "change-password-form")
                .child(Element::new("input").attr("id", "new-password").attr("type", "password"))
                .child(Element::new("input").attr("id", "confirm-password").attr("type", "password")),
        )
}
