use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::view::{Element, Page, Region};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    Mounted { page: Page },
    Region { region: Region, view: Element },
    Navigated { location: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub page: Page,
    pub location: String,
    pub regions: BTreeMap<Region, Element>,
}

struct Inner {
    page: Page,
    location: String,
    regions: BTreeMap<Region, Element>,
}

/// Regiones montadas de la página actual.
/// Reemplazar una región no montada no hace nada (el nodo "ya no existe").
pub struct ViewStore {
    inner: RwLock<Inner>,
    tx: broadcast::Sender<ViewEvent>,
}

impl ViewStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(64);
        let store = Self {
            inner: RwLock::new(Inner {
                page: Page::Login,
                location: "/".to_string(),
                regions: BTreeMap::new(),
            }),
            tx,
        };
        store.mount(Page::Login);
        store
    }

    /// Monta `page`: conserva las regiones globales y vacía las demás.
    pub fn mount(&self, page: Page) {
        {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            inner.page = page;
            inner.regions.retain(|r, _| Region::GLOBAL.contains(r));
            for region in Region::GLOBAL {
                inner.regions.entry(region).or_insert_with(|| placeholder(region));
            }
            for region in page.regions() {
                inner.regions.insert(*region, placeholder(*region));
            }
        }
        let _ = self.tx.send(ViewEvent::Mounted { page });
    }

    pub fn page(&self) -> Page {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).page
    }

    pub fn location(&self) -> String {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).location.clone()
    }

    pub fn is_mounted(&self, region: Region) -> bool {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).regions.contains_key(&region)
    }

    pub fn replace(&self, region: Region, view: Element) -> bool {
        self.update(region, |current| *current = view)
    }

    pub fn update<F: FnOnce(&mut Element)>(&self, region: Region, f: F) -> bool {
        let updated = {
            let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            match inner.regions.get_mut(&region) {
                Some(current) => {
                    f(current);
                    Some(current.clone())
                }
                None => None,
            }
        };
        match updated {
            Some(view) => {
                let _ = self.tx.send(ViewEvent::Region { region, view });
                true
            }
            None => {
                debug!("region {:?} not mounted, update dropped", region);
                false
            }
        }
    }

    pub fn get(&self, region: Region) -> Option<Element> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).regions.get(&region).cloned()
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        ViewSnapshot {
            page: inner.page,
            location: inner.location.clone(),
            regions: inner.regions.clone(),
        }
    }

    /// Equivalente a `window.location.href = ...`; el router monta la página.
    pub fn navigate(&self, location: &str) {
        self.inner.write().unwrap_or_else(PoisonError::into_inner).location = location.to_string();
        let _ = self.tx.send(ViewEvent::Navigated { location: location.to_string() });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.tx.subscribe()
    }
}

impl Default for ViewStore {
    fn default() -> Self {
        Self::new()
    }
}

fn placeholder(region: Region) -> Element {
    Element::new("div").attr("id", region.as_str().replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_on_unmounted_region_is_a_no_op() {
        let store = ViewStore::new();
        assert!(!store.replace(Region::AlertList, Element::new("ul")));
        assert!(store.get(Region::AlertList).is_none());

        store.mount(Page::AdminAlerts);
        assert!(store.replace(Region::AlertList, Element::new("ul")));
        assert_eq!(store.get(Region::AlertList).unwrap().tag, "ul");
    }

    #[test]
    fn mount_keeps_global_regions_and_drops_page_regions() {
        let store = ViewStore::new();
        store.mount(Page::AdminCameras);
        store.replace(Region::Modals, Element::new("div").class("kept"));
        store.replace(Region::CameraTable, Element::new("tbody"));

        store.mount(Page::AdminThreatConfig);
        assert!(store.get(Region::Modals).unwrap().has_class("kept"));
        assert!(!store.is_mounted(Region::CameraTable));
        assert!(store.is_mounted(Region::ThreatPanel));
        assert_eq!(store.page(), Page::AdminThreatConfig);
    }

    #[tokio::test]
    async fn updates_and_navigation_are_broadcast() {
        let store = ViewStore::new();
        let mut rx = store.subscribe();
        store.replace(Region::AuthForms, Element::new("form"));
        store.navigate("/admin_overview");

        assert!(matches!(rx.recv().await.unwrap(), ViewEvent::Region { region: Region::AuthForms, .. }));
        match rx.recv().await.unwrap() {
            ViewEvent::Navigated { location } => assert_eq!(location, "/admin_overview"),
            other => panic!("unexpected event {other:?}"),
        }
        assert_eq!(store.location(), "/admin_overview");
    }
}
