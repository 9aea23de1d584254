#![forbid(unsafe_code)]

//! Page partitioning, navigation, and the persisted page snapshot.
//!
//! A page is a named set of tracked-element ids; exactly one page is
//! current at any time and only its members (plus an always-visible
//! allow-list for surrounding chrome) are shown. Navigation moves the
//! current pointer through explicit jumps, cyclic next/prev in creation
//! order, and a bounded back-history.
//!
//! # Invariants
//!
//! 1. The default page exists from construction and can never be deleted;
//!    deleting any other page reassigns its elements to the default page.
//! 2. Every element id belongs to at most one page (enforced on add).
//! 3. The back-history holds at most [`HISTORY_LIMIT`] entries, trimmed
//!    from the oldest end; `go_back` pops without pushing, so back
//!    navigation cannot cycle.
//! 4. `current` always names an existing page.
//!
//! # Persistence
//!
//! [`PageSnapshot`] is the JSON wire format
//! `{currentPage, pages: {id: {title, elements[], created}}}` with an
//! additive `schemaVersion` field that defaults to 1, so documents written
//! before versioning load unchanged. Import validates before replacing
//! anything; on success it fully replaces the page registry and re-applies
//! visibility.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use gcell_surface::RenderSurface;

use crate::system::GridSystem;

/// Id of the page created at startup; the reassignment target for deleted
/// pages, kept literal even if the page is later retitled.
pub const DEFAULT_PAGE_ID: &str = "page1";

/// Maximum entries in the back-history.
pub const HISTORY_LIMIT: usize = 10;

/// Current snapshot schema version.
pub const PAGE_SCHEMA_VERSION: u16 = 1;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A named partition of tracked elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: String,
    pub title: String,
    /// Member element ids, in insertion order.
    pub elements: Vec<String>,
    pub created: DateTime<Utc>,
}

/// One page in the persisted snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub title: String,
    pub elements: Vec<String>,
    /// ISO-8601 creation timestamp.
    pub created: DateTime<Utc>,
}

/// The persisted page layout.
///
/// Map order is preserved through serialization, so cyclic navigation
/// order survives a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(rename = "schemaVersion", default = "default_schema_version")]
    pub schema_version: u16,
    #[serde(rename = "currentPage")]
    pub current_page: String,
    pub pages: IndexMap<String, PageRecord>,
}

fn default_schema_version() -> u16 {
    PAGE_SCHEMA_VERSION
}

/// Errors from snapshot import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// Schema version is not supported.
    UnsupportedVersion { found: u16, expected: u16 },
    /// The snapshot lacks the default page.
    MissingDefaultPage,
    /// `currentPage` names a page missing from the registry.
    UnknownCurrentPage { id: String },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedVersion { found, expected } => {
                write!(f, "unsupported page schema version {found} (expected {expected})")
            }
            Self::MissingDefaultPage => {
                write!(f, "snapshot is missing the default page {DEFAULT_PAGE_ID:?}")
            }
            Self::UnknownCurrentPage { id } => {
                write!(f, "current page {id:?} not present in snapshot")
            }
        }
    }
}

impl std::error::Error for SnapshotError {}

// ---------------------------------------------------------------------------
// PageManager
// ---------------------------------------------------------------------------

/// The page registry and navigation state machine.
#[derive(Debug)]
pub struct PageManager {
    /// Pages in creation order (cyclic navigation follows this order).
    pages: IndexMap<String, Page>,
    current: String,
    history: VecDeque<String>,
    /// Element ids shown on every page (surrounding chrome).
    always_visible: BTreeSet<String>,
}

impl PageManager {
    /// Create a manager with the default page current.
    #[must_use]
    pub fn new() -> Self {
        let mut pages = IndexMap::new();
        pages.insert(
            DEFAULT_PAGE_ID.to_string(),
            Page {
                id: DEFAULT_PAGE_ID.to_string(),
                title: "Page 1".to_string(),
                elements: Vec::new(),
                created: Utc::now(),
            },
        );
        Self {
            pages,
            current: DEFAULT_PAGE_ID.to_string(),
            history: VecDeque::new(),
            always_visible: BTreeSet::new(),
        }
    }

    // -- registry ----------------------------------------------------------

    /// Register an empty page. `false` (with a warning) on duplicate ids.
    pub fn create_page(&mut self, id: &str, title: &str) -> bool {
        if self.pages.contains_key(id) {
            warn!(id, "page already exists");
            return false;
        }
        self.pages.insert(
            id.to_string(),
            Page {
                id: id.to_string(),
                title: title.to_string(),
                elements: Vec::new(),
                created: Utc::now(),
            },
        );
        debug!(id, title, "page created");
        true
    }

    /// Delete a page, reassigning its elements to the default page.
    ///
    /// Always fails for the default page. If the deleted page was current,
    /// the default page becomes current and visibility is re-applied.
    pub fn delete_page<S: RenderSurface>(&mut self, id: &str, system: &mut GridSystem<S>) -> bool {
        if id == DEFAULT_PAGE_ID {
            warn!("default page cannot be deleted");
            return false;
        }
        let Some(removed) = self.pages.shift_remove(id) else {
            return false;
        };
        if let Some(default) = self.pages.get_mut(DEFAULT_PAGE_ID) {
            for element in removed.elements {
                if !default.elements.contains(&element) {
                    default.elements.push(element);
                }
            }
        }
        if self.current == id {
            self.current = DEFAULT_PAGE_ID.to_string();
        }
        self.update_element_visibility(system);
        debug!(id, "page deleted");
        true
    }

    /// Move an element onto a page (the current page when `None`).
    ///
    /// The element is removed from every page first, so membership stays
    /// single-page. `false` if the target page does not exist.
    pub fn add_element_to_page(&mut self, element_id: &str, page_id: Option<&str>) -> bool {
        let target = page_id.unwrap_or(&self.current).to_string();
        if !self.pages.contains_key(&target) {
            warn!(element_id, page = %target, "target page does not exist");
            return false;
        }
        for page in self.pages.values_mut() {
            page.elements.retain(|member| member != element_id);
        }
        if let Some(page) = self.pages.get_mut(&target) {
            page.elements.push(element_id.to_string());
        }
        true
    }

    /// Remove an element from whichever page holds it.
    pub fn remove_element_from_pages(&mut self, element_id: &str) {
        for page in self.pages.values_mut() {
            page.elements.retain(|member| member != element_id);
        }
    }

    /// Mark an element id as visible on every page.
    pub fn add_always_visible(&mut self, element_id: &str) {
        self.always_visible.insert(element_id.to_string());
    }

    /// Replace the always-visible allow-list.
    pub fn set_always_visible<I, T>(&mut self, element_ids: I)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.always_visible = element_ids.into_iter().map(Into::into).collect();
    }

    // -- navigation --------------------------------------------------------

    /// Jump to a page by id.
    ///
    /// `false` for unknown ids, leaving all state unchanged. On success the
    /// previous page is pushed onto the bounded history and visibility is
    /// re-applied.
    pub fn go_to_page<S: RenderSurface>(&mut self, id: &str, system: &mut GridSystem<S>) -> bool {
        if !self.pages.contains_key(id) {
            warn!(id, "cannot navigate to unknown page");
            return false;
        }
        let previous = std::mem::replace(&mut self.current, id.to_string());
        self.push_history(previous);
        self.update_element_visibility(system);
        debug!(page = id, "navigated");
        true
    }

    /// Advance to the next page in creation order, wrapping at the end.
    ///
    /// Returns the id of the page that is current afterwards. With a single
    /// page this is a no-op that neither navigates nor touches history.
    pub fn next_page<S: RenderSurface>(&mut self, system: &mut GridSystem<S>) -> String {
        self.step(1, system)
    }

    /// Retreat to the previous page in creation order, wrapping at the
    /// start. Returns the id of the page that is current afterwards.
    pub fn prev_page<S: RenderSurface>(&mut self, system: &mut GridSystem<S>) -> String {
        self.step(-1, system)
    }

    fn step<S: RenderSurface>(&mut self, delta: isize, system: &mut GridSystem<S>) -> String {
        let count = self.pages.len() as isize;
        let index = self
            .pages
            .get_index_of(&self.current)
            .map(|i| i as isize)
            .unwrap_or(0);
        let target_index = (index + delta).rem_euclid(count) as usize;
        let target = match self.pages.get_index(target_index) {
            Some((id, _)) => id.clone(),
            None => return self.current.clone(),
        };
        if target != self.current {
            self.go_to_page(&target, system);
        }
        self.current.clone()
    }

    /// Pop the most recent history entry and make it current, without
    /// pushing a new entry (so back navigation cannot cycle).
    ///
    /// Entries for pages deleted since they were recorded are skipped.
    /// `false` when the history is exhausted.
    pub fn go_back<S: RenderSurface>(&mut self, system: &mut GridSystem<S>) -> bool {
        while let Some(previous) = self.history.pop_back() {
            if self.pages.contains_key(&previous) {
                self.current = previous;
                self.update_element_visibility(system);
                return true;
            }
        }
        false
    }

    fn push_history(&mut self, id: String) {
        self.history.push_back(id);
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    // -- visibility --------------------------------------------------------

    /// Hide every tracked element, then reveal the current page's members
    /// plus the always-visible allow-list.
    pub fn update_element_visibility<S: RenderSurface>(&self, system: &mut GridSystem<S>) {
        for id in system.element_ids() {
            system.set_element_visible(&id, false);
        }
        if let Some(page) = self.pages.get(&self.current) {
            for member in &page.elements {
                system.set_element_visible(member, true);
            }
        }
        for member in &self.always_visible {
            system.set_element_visible(member, true);
        }
    }

    // -- persistence -------------------------------------------------------

    /// Serialize the page registry to the wire schema.
    #[must_use]
    pub fn export_pages(&self) -> PageSnapshot {
        let pages = self
            .pages
            .iter()
            .map(|(id, page)| {
                (
                    id.clone(),
                    PageRecord {
                        title: page.title.clone(),
                        elements: page.elements.clone(),
                        created: page.created,
                    },
                )
            })
            .collect();
        PageSnapshot {
            schema_version: PAGE_SCHEMA_VERSION,
            current_page: self.current.clone(),
            pages,
        }
    }

    /// Validate a snapshot and fully replace the page registry with it.
    ///
    /// The history is cleared and visibility re-applied. On error nothing
    /// changes.
    pub fn import_pages<S: RenderSurface>(
        &mut self,
        snapshot: PageSnapshot,
        system: &mut GridSystem<S>,
    ) -> Result<(), SnapshotError> {
        if snapshot.schema_version != PAGE_SCHEMA_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.schema_version,
                expected: PAGE_SCHEMA_VERSION,
            });
        }
        if !snapshot.pages.contains_key(DEFAULT_PAGE_ID) {
            return Err(SnapshotError::MissingDefaultPage);
        }
        if !snapshot.pages.contains_key(&snapshot.current_page) {
            return Err(SnapshotError::UnknownCurrentPage {
                id: snapshot.current_page,
            });
        }

        self.pages = snapshot
            .pages
            .into_iter()
            .map(|(id, record)| {
                (
                    id.clone(),
                    Page {
                        id,
                        title: record.title,
                        elements: record.elements,
                        created: record.created,
                    },
                )
            })
            .collect();
        self.current = snapshot.current_page;
        self.history.clear();
        self.update_element_visibility(system);
        debug!(pages = self.pages.len(), "page registry imported");
        Ok(())
    }

    // -- queries -----------------------------------------------------------

    /// Id of the current page.
    #[must_use]
    pub fn current_page(&self) -> &str {
        &self.current
    }

    /// A page by id.
    #[must_use]
    pub fn page(&self, id: &str) -> Option<&Page> {
        self.pages.get(id)
    }

    /// Page ids in creation order.
    #[must_use]
    pub fn page_ids(&self) -> Vec<String> {
        self.pages.keys().cloned().collect()
    }

    /// Number of pages.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The page currently holding an element, if any.
    #[must_use]
    pub fn page_of(&self, element_id: &str) -> Option<&str> {
        self.pages
            .values()
            .find(|page| page.elements.iter().any(|member| member == element_id))
            .map(|page| page.id.as_str())
    }

    /// Current depth of the back-history.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

impl Default for PageManager {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::{ElementKind, ElementOptions};
    use gcell_core::geometry::Viewport;
    use gcell_layout::config::GridConfig;
    use gcell_surface::HeadlessSurface;

    fn system() -> GridSystem<HeadlessSurface> {
        let surface = HeadlessSurface::new(Viewport::new(1600.0, 900.0));
        GridSystem::new(surface, GridConfig::with_precision(8).unwrap()).unwrap()
    }

    fn spawn(system: &mut GridSystem<HeadlessSurface>, id: &str, coords: &str) {
        system
            .try_create_element(coords, ElementKind::Block, ElementOptions::default().with_id(id))
            .unwrap();
    }

    #[test]
    fn starts_on_default_page() {
        let pages = PageManager::new();
        assert_eq!(pages.current_page(), DEFAULT_PAGE_ID);
        assert_eq!(pages.page_count(), 1);
        assert_eq!(pages.page(DEFAULT_PAGE_ID).unwrap().title, "Page 1");
    }

    #[test]
    fn create_page_rejects_duplicates() {
        let mut pages = PageManager::new();
        assert!(pages.create_page("practice", "Practice"));
        assert!(!pages.create_page("practice", "Practice again"));
        assert!(!pages.create_page(DEFAULT_PAGE_ID, "Shadow default"));
        assert_eq!(pages.page_count(), 2);
    }

    #[test]
    fn navigation_switches_visibility() {
        let mut sys = system();
        let mut pages = PageManager::new();
        spawn(&mut sys, "intro", "R1C1");
        spawn(&mut sys, "btn1", "R2C2");
        spawn(&mut sys, "chrome", "R3C3");

        pages.add_element_to_page("intro", None);
        pages.create_page("practice", "Practice");
        pages.add_element_to_page("btn1", Some("practice"));
        pages.add_always_visible("chrome");
        pages.update_element_visibility(&mut sys);

        // On the default page: intro and chrome visible, btn1 hidden.
        assert!(sys.surface().is_visible(sys.element("intro").unwrap().handle));
        assert!(!sys.surface().is_visible(sys.element("btn1").unwrap().handle));
        assert!(sys.surface().is_visible(sys.element("chrome").unwrap().handle));

        assert!(pages.go_to_page("practice", &mut sys));
        assert_eq!(pages.current_page(), "practice");
        assert!(sys.surface().is_visible(sys.element("btn1").unwrap().handle));
        assert!(!sys.surface().is_visible(sys.element("intro").unwrap().handle));
        // The allow-list survives navigation.
        assert!(sys.surface().is_visible(sys.element("chrome").unwrap().handle));
    }

    #[test]
    fn go_to_unknown_page_changes_nothing() {
        let mut sys = system();
        let mut pages = PageManager::new();
        assert!(!pages.go_to_page("missing", &mut sys));
        assert_eq!(pages.current_page(), DEFAULT_PAGE_ID);
        assert_eq!(pages.history_len(), 0);
    }

    #[test]
    fn default_page_cannot_be_deleted() {
        let mut sys = system();
        let mut pages = PageManager::new();
        assert!(!pages.delete_page(DEFAULT_PAGE_ID, &mut sys));
        assert_eq!(pages.page_count(), 1);
    }

    #[test]
    fn delete_reassigns_elements_to_default() {
        let mut sys = system();
        let mut pages = PageManager::new();
        spawn(&mut sys, "a", "R1C1");
        spawn(&mut sys, "b", "R2C2");

        pages.create_page("extra", "Extra");
        pages.add_element_to_page("a", Some("extra"));
        pages.add_element_to_page("b", Some("extra"));
        assert!(pages.go_to_page("extra", &mut sys));

        assert!(pages.delete_page("extra", &mut sys));
        assert_eq!(pages.current_page(), DEFAULT_PAGE_ID);
        let default = pages.page(DEFAULT_PAGE_ID).unwrap();
        assert_eq!(default.elements, vec!["a".to_string(), "b".to_string()]);
        // Reassigned members are visible again on the default page.
        assert!(sys.surface().is_visible(sys.element("a").unwrap().handle));
    }

    #[test]
    fn delete_unknown_page_is_false() {
        let mut sys = system();
        let mut pages = PageManager::new();
        assert!(!pages.delete_page("ghost", &mut sys));
    }

    #[test]
    fn membership_is_single_page() {
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        assert!(pages.add_element_to_page("el", Some(DEFAULT_PAGE_ID)));
        assert_eq!(pages.page_of("el"), Some(DEFAULT_PAGE_ID));

        assert!(pages.add_element_to_page("el", Some("two")));
        assert_eq!(pages.page_of("el"), Some("two"));
        assert!(pages.page(DEFAULT_PAGE_ID).unwrap().elements.is_empty());
    }

    #[test]
    fn add_to_missing_page_fails() {
        let mut pages = PageManager::new();
        assert!(!pages.add_element_to_page("el", Some("nope")));
        assert_eq!(pages.page_of("el"), None);
    }

    #[test]
    fn add_defaults_to_current_page() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        pages.go_to_page("two", &mut sys);
        assert!(pages.add_element_to_page("el", None));
        assert_eq!(pages.page_of("el"), Some("two"));
    }

    #[test]
    fn cyclic_next_and_prev() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        pages.create_page("three", "Three");

        assert_eq!(pages.next_page(&mut sys), "two");
        assert_eq!(pages.next_page(&mut sys), "three");
        // Wraps around to the front.
        assert_eq!(pages.next_page(&mut sys), DEFAULT_PAGE_ID);
        // And backwards past the front.
        assert_eq!(pages.prev_page(&mut sys), "three");
        assert_eq!(pages.prev_page(&mut sys), "two");
    }

    #[test]
    fn single_page_next_is_noop() {
        let mut sys = system();
        let mut pages = PageManager::new();
        assert_eq!(pages.next_page(&mut sys), DEFAULT_PAGE_ID);
        assert_eq!(pages.prev_page(&mut sys), DEFAULT_PAGE_ID);
        assert_eq!(pages.history_len(), 0);
    }

    #[test]
    fn go_back_pops_without_pushing() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        pages.create_page("three", "Three");

        pages.go_to_page("two", &mut sys);
        pages.go_to_page("three", &mut sys);
        assert_eq!(pages.history_len(), 2);

        assert!(pages.go_back(&mut sys));
        assert_eq!(pages.current_page(), "two");
        assert_eq!(pages.history_len(), 1);

        assert!(pages.go_back(&mut sys));
        assert_eq!(pages.current_page(), DEFAULT_PAGE_ID);
        assert!(!pages.go_back(&mut sys));
    }

    #[test]
    fn history_is_bounded() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");

        for _ in 0..20 {
            pages.go_to_page("two", &mut sys);
            pages.go_to_page(DEFAULT_PAGE_ID, &mut sys);
        }
        assert_eq!(pages.history_len(), HISTORY_LIMIT);
    }

    #[test]
    fn deleted_pages_are_skipped_by_go_back() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        pages.create_page("three", "Three");

        pages.go_to_page("two", &mut sys);
        pages.go_to_page("three", &mut sys);
        pages.go_to_page(DEFAULT_PAGE_ID, &mut sys);
        assert!(pages.delete_page("three", &mut sys));

        // History held [page1, two, three]; "three" is gone, so back lands
        // on "two" after skipping it.
        assert!(pages.go_back(&mut sys));
        assert_eq!(pages.current_page(), "two");
    }

    #[test]
    fn export_import_round_trip() {
        let mut sys = system();
        let mut pages = PageManager::new();
        spawn(&mut sys, "a", "R1C1");
        spawn(&mut sys, "b", "R2C2");
        pages.create_page("practice", "Practice");
        pages.add_element_to_page("a", None);
        pages.add_element_to_page("b", Some("practice"));
        pages.go_to_page("practice", &mut sys);

        let snapshot = pages.export_pages();
        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: PageSnapshot = serde_json::from_str(&json).unwrap();

        let mut restored = PageManager::new();
        restored.import_pages(parsed, &mut sys).unwrap();

        assert_eq!(restored.current_page(), "practice");
        assert_eq!(restored.page_ids(), pages.page_ids());
        for id in pages.page_ids() {
            assert_eq!(
                restored.page(&id).unwrap().elements,
                pages.page(&id).unwrap().elements
            );
        }
        // Visibility re-applied for the imported current page.
        assert!(sys.surface().is_visible(sys.element("b").unwrap().handle));
        assert!(!sys.surface().is_visible(sys.element("a").unwrap().handle));
    }

    #[test]
    fn wire_format_matches_schema() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("practice", "Practice");
        pages.add_element_to_page("btn1", Some("practice"));
        pages.go_to_page("practice", &mut sys);

        let json = serde_json::to_value(pages.export_pages()).unwrap();
        assert_eq!(json["currentPage"], "practice");
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["pages"]["practice"]["title"], "Practice");
        assert_eq!(json["pages"]["practice"]["elements"][0], "btn1");
        // ISO-8601 timestamp.
        let created = json["pages"]["practice"]["created"].as_str().unwrap();
        assert!(created.contains('T'));
    }

    #[test]
    fn unversioned_documents_default_to_v1() {
        let json = format!(
            r#"{{
                "currentPage": "{DEFAULT_PAGE_ID}",
                "pages": {{
                    "{DEFAULT_PAGE_ID}": {{
                        "title": "Page 1",
                        "elements": ["a"],
                        "created": "2024-03-01T10:00:00Z"
                    }}
                }}
            }}"#
        );
        let snapshot: PageSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.schema_version, 1);

        let mut sys = system();
        let mut pages = PageManager::new();
        pages.import_pages(snapshot, &mut sys).unwrap();
        assert_eq!(pages.page(DEFAULT_PAGE_ID).unwrap().elements, vec!["a".to_string()]);
    }

    #[test]
    fn import_validates_before_replacing() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("keep", "Keep me");

        let mut snapshot = pages.export_pages();
        snapshot.schema_version = 9;
        let err = pages.import_pages(snapshot, &mut sys).unwrap_err();
        assert_eq!(
            err,
            SnapshotError::UnsupportedVersion {
                found: 9,
                expected: 1
            }
        );

        let mut snapshot = pages.export_pages();
        snapshot.pages.shift_remove(DEFAULT_PAGE_ID);
        snapshot.current_page = "keep".to_string();
        assert_eq!(
            pages.import_pages(snapshot, &mut sys).unwrap_err(),
            SnapshotError::MissingDefaultPage
        );

        let mut snapshot = pages.export_pages();
        snapshot.current_page = "ghost".to_string();
        assert!(matches!(
            pages.import_pages(snapshot, &mut sys).unwrap_err(),
            SnapshotError::UnknownCurrentPage { .. }
        ));

        // Failed imports leave the registry intact.
        assert_eq!(pages.page_count(), 2);
        assert!(pages.page("keep").is_some());
    }

    #[test]
    fn import_clears_history() {
        let mut sys = system();
        let mut pages = PageManager::new();
        pages.create_page("two", "Two");
        pages.go_to_page("two", &mut sys);
        assert_eq!(pages.history_len(), 1);

        let snapshot = pages.export_pages();
        pages.import_pages(snapshot, &mut sys).unwrap();
        assert_eq!(pages.history_len(), 0);
        assert!(!pages.go_back(&mut sys));
    }

    #[test]
    fn snapshot_error_display() {
        let msg = SnapshotError::UnsupportedVersion {
            found: 3,
            expected: 1,
        }
        .to_string();
        assert!(msg.contains('3'));
        assert!(SnapshotError::MissingDefaultPage.to_string().contains(DEFAULT_PAGE_ID));
    }
}
