//! Árbol de vista: lo que antes era el DOM de la página.
//!
//! Las funciones de render producen `Element`s puros; el `ViewStore` los
//! monta por región y el servidor local los entrega como JSON o HTML.

use std::collections::BTreeMap;
use std::fmt::Write;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            classes: Vec::new(),
            attrs: BTreeMap::new(),
            style: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    pub fn style(mut self, key: &str, value: impl Into<String>) -> Self {
        self.style.insert(key.to_string(), value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children.into_iter().map(Node::Element));
        self
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn is_hidden(&self) -> bool {
        self.style.get("display").map(String::as_str) == Some("none")
    }

    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Depth-first search over the subtree, including `self`.
    pub fn find_all<'a>(&'a self, pred: &dyn Fn(&Element) -> bool) -> Vec<&'a Element> {
        let mut found = Vec::new();
        walk(self, pred, &mut found);
        found
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_html(self, &mut out);
        out
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => collect_text(e, out),
        }
    }
}

fn walk<'a>(el: &'a Element, pred: &dyn Fn(&Element) -> bool, found: &mut Vec<&'a Element>) {
    if pred(el) {
        found.push(el);
    }
    for child in el.element_children() {
        walk(child, pred, found);
    }
}

fn write_html(el: &Element, out: &mut String) {
    let _ = write!(out, "<{}", el.tag);
    if !el.classes.is_empty() {
        let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
    }
    for (k, v) in &el.attrs {
        if v.is_empty() {
            let _ = write!(out, " {k}");
        } else {
            let _ = write!(out, " {k}=\"{}\"", escape(v));
        }
    }
    if !el.style.is_empty() {
        let css = el.style.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join("; ");
        let _ = write!(out, " style=\"{}\"", escape(&css));
    }
    out.push('>');
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(&escape(t)),
            Node::Element(e) => write_html(e, out),
        }
    }
    let _ = write!(out, "</{}>", el.tag);
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Zonas de la página que un componente reemplaza por completo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Chrome,
    Clock,
    HealthIndicator,
    Modals,
    AuthForms,
    SignInMessage,
    SignUpMessage,
    VideoOverlay,
    AlarmIndicator,
    CaptureStatus,
    AlertLog,
    SystemStatus,
    ThreatLevel,
    AlertsToday,
    CamerasActive,
    RecentAlerts,
    AlertFilters,
    AlertList,
    AlertCounter,
    CameraTable,
    CameraEditor,
    ThreatPanel,
    ActivityLog,
    LogCounter,
    SettingsPanel,
}

impl Region {
    pub const GLOBAL: [Region; 4] = [Region::Chrome, Region::Clock, Region::HealthIndicator, Region::Modals];

    pub const ALL: [Region; 25] = [
        Region::Chrome,
        Region::Clock,
        Region::HealthIndicator,
        Region::Modals,
        Region::AuthForms,
        Region::SignInMessage,
        Region::SignUpMessage,
        Region::VideoOverlay,
        Region::AlarmIndicator,
        Region::CaptureStatus,
        Region::AlertLog,
        Region::SystemStatus,
        Region::ThreatLevel,
        Region::AlertsToday,
        Region::CamerasActive,
        Region::RecentAlerts,
        Region::AlertFilters,
        Region::AlertList,
        Region::AlertCounter,
        Region::CameraTable,
        Region::CameraEditor,
        Region::ThreatPanel,
        Region::ActivityLog,
        Region::LogCounter,
        Region::SettingsPanel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Chrome => "chrome",
            Region::Clock => "clock",
            Region::HealthIndicator => "health_indicator",
            Region::Modals => "modals",
            Region::AuthForms => "auth_forms",
            Region::SignInMessage => "sign_in_message",
            Region::SignUpMessage => "sign_up_message",
            Region::VideoOverlay => "video_overlay",
            Region::AlarmIndicator => "alarm_indicator",
            Region::CaptureStatus => "capture_status",
            Region::AlertLog => "alert_log",
            Region::SystemStatus => "system_status",
            Region::ThreatLevel => "threat_level",
            Region::AlertsToday => "alerts_today",
            Region::CamerasActive => "cameras_active",
            Region::RecentAlerts => "recent_alerts",
            Region::AlertFilters => "alert_filters",
            Region::AlertList => "alert_list",
            Region::AlertCounter => "alert_counter",
            Region::CameraTable => "camera_table",
            Region::CameraEditor => "camera_editor",
            Region::ThreatPanel => "threat_panel",
            Region::ActivityLog => "activity_log",
            Region::LogCounter => "log_counter",
            Region::SettingsPanel => "settings_panel",
        }
    }

    pub fn parse(raw: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|r| r.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    Login,
    AdminOverview,
    PersonnelOverview,
    AdminAlerts,
    PersonnelAlerts,
    AdminCameras,
    AdminThreatConfig,
    AdminActivityLog,
    AdminSettings,
    PersonnelSettings,
}

impl Page {
    pub const ALL: [Page; 10] = [
        Page::Login,
        Page::AdminOverview,
        Page::PersonnelOverview,
        Page::AdminAlerts,
        Page::PersonnelAlerts,
        Page::AdminCameras,
        Page::AdminThreatConfig,
        Page::AdminActivityLog,
        Page::AdminSettings,
        Page::PersonnelSettings,
    ];

    /// Ruta canónica de la página.
    pub fn path(&self) -> &'static str {
        match self {
            Page::Login => "/",
            Page::AdminOverview => "/admin_overview",
            Page::PersonnelOverview => "/personnel_overview",
            Page::AdminAlerts => "/admin_alerts",
            Page::PersonnelAlerts => "/personnel_alerts",
            Page::AdminCameras => "/admin_camera_management",
            Page::AdminThreatConfig => "/admin_threat_config",
            Page::AdminActivityLog => "/admin_activity_log",
            Page::AdminSettings => "/admin_settings",
            Page::PersonnelSettings => "/personnel_settings",
        }
    }

    pub fn from_path(path: &str) -> Option<Page> {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let path = path.trim_end_matches(".html");
        match path {
            "" | "/" | "/index" => Some(Page::Login),
            "/admin_overview" => Some(Page::AdminOverview),
            "/personnel_overview" => Some(Page::PersonnelOverview),
            "/admin_alerts" => Some(Page::AdminAlerts),
            "/personnel_alerts" => Some(Page::PersonnelAlerts),
            "/admin_camera_management" => Some(Page::AdminCameras),
            "/admin_threat_config" => Some(Page::AdminThreatConfig),
            "/admin_activity_log" => Some(Page::AdminActivityLog),
            "/admin_settings" => Some(Page::AdminSettings),
            "/personnel_settings" => Some(Page::PersonnelSettings),
            _ => None,
        }
    }

    pub fn is_admin_only(&self) -> bool {
        matches!(
            self,
            Page::AdminOverview
                | Page::AdminAlerts
                | Page::AdminCameras
                | Page::AdminThreatConfig
                | Page::AdminActivityLog
                | Page::AdminSettings
        )
    }

    pub fn regions(&self) -> &'static [Region] {
        match self {
            Page::Login => &[Region::AuthForms, Region::SignInMessage, Region::SignUpMessage],
            Page::AdminOverview | Page::PersonnelOverview => &[
                Region::VideoOverlay,
                Region::AlarmIndicator,
                Region::CaptureStatus,
                Region::AlertLog,
                Region::SystemStatus,
                Region::ThreatLevel,
                Region::AlertsToday,
                Region::CamerasActive,
                Region::RecentAlerts,
            ],
            Page::AdminAlerts => &[Region::AlertFilters, Region::AlertList, Region::AlertCounter],
            Page::PersonnelAlerts => &[Region::AlertList, Region::AlertCounter],
            Page::AdminCameras => &[Region::CameraTable, Region::CameraEditor],
            Page::AdminThreatConfig => &[Region::ThreatPanel],
            Page::AdminActivityLog => &[Region::ActivityLog, Region::LogCounter],
            Page::AdminSettings | Page::PersonnelSettings => &[Region::SettingsPanel],
        }
    }
}
