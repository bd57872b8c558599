//! End-to-end behavior of [`ClockApp`] against a shared in-memory store.
//!
//! Each "session" builds a fresh app over the same backing store, the way a
//! page reload rebuilds state from local storage.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use chrono::{TimeDelta, TimeZone, Utc};
use worldclock_core::app::{ClockApp, EventOutcome, UiEvent};
use worldclock_core::clock::FixedClock;
use worldclock_core::config::AppConfig;
use worldclock_core::sink::RecordingSink;
use worldclock_core::theme::{ThemeRef, preset_palettes};
use worldclock_core::ticker::GlobalOffset;
use worldclock_store::{KeyValueStore, MemoryStore, PersistenceGateway, StoreError};
use worldclock_types::{ColorRole, EntryDraft, EntryId, ThemePalette, TimezoneEntry};

/// A store whose contents outlive any one gateway.
#[derive(Clone, Default)]
struct SharedStore(Rc<RefCell<MemoryStore>>);

impl KeyValueStore for SharedStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.borrow().get(key)
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.0.borrow_mut().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.0.borrow_mut().remove(key)
    }
}

impl SharedStore {
    fn raw(&self, key: &str) -> Option<String> {
        self.0.borrow().get(key).unwrap()
    }

    fn put(&self, key: &str, value: &str) {
        self.0.borrow_mut().set(key, value.to_owned()).unwrap();
    }
}

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap())
}

fn session(store: &SharedStore, clock: &FixedClock) -> ClockApp<RecordingSink> {
    let gateway = PersistenceGateway::new(Box::new(store.clone()), "worldclock");
    ClockApp::init(
        &AppConfig::default(),
        gateway,
        Box::new(clock.clone()),
        RecordingSink::new(),
    )
    .unwrap()
}

fn lima() -> EntryDraft {
    EntryDraft {
        city: "Lima".to_owned(),
        country: "Peru".to_owned(),
        zone_name: "America/Lima".to_owned(),
        flag: Some("\u{1f1f5}\u{1f1ea}".to_owned()),
        color: Some("#e11d48".to_owned()),
    }
}

fn all_roles(hex: &str) -> BTreeMap<ColorRole, String> {
    ColorRole::ALL
        .into_iter()
        .map(|role| (role, hex.to_owned()))
        .collect()
}

#[test]
fn fresh_store_shows_every_builtin() {
    let store = SharedStore::default();
    let app = session(&store, &clock());
    assert_eq!(app.registry().len(), 9);
    assert_eq!(app.visibility().len(), 9);
    assert_eq!(app.themes().active_name(), "midnight");
    assert_eq!(app.offset(), GlobalOffset::ZERO);
}

#[test]
fn added_entry_is_listed_once_after_builtins_and_visible() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());

    let outcome = app.handle(UiEvent::AddTimezone(lima())).unwrap();
    let EventOutcome::Added { id } = outcome else {
        panic!("expected an added entry");
    };

    let list = app.registry().list();
    assert_eq!(list.len(), 10);
    assert_eq!(list.iter().filter(|e| e.id == id).count(), 1);
    assert_eq!(list[9].id, id);
    assert!(app.visibility().is_visible(&id));
    assert_eq!(app.sink().last_layout().unwrap().last(), Some(&id));

    // Lima is UTC-5 with no DST.
    let face = app.sink().last_face(&id).unwrap();
    assert_eq!(face.digital_string, "07:00:00");
    assert_eq!(face.utc_offset_label, "GMT-5");
    assert_eq!(face.formatted_date, "Monday, July 15, 2024");
}

#[test]
fn invalid_add_changes_nothing() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    let mut draft = lima();
    draft.zone_name = "America/Atlantis".to_owned();

    assert!(app.handle(UiEvent::AddTimezone(draft)).is_err());
    assert_eq!(app.registry().len(), 9);
    assert_eq!(store.raw("worldclock.customTimezones"), None);
}

#[test]
fn removed_entry_leaves_registry_and_visible_set() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    let EventOutcome::Added { id } = app.handle(UiEvent::AddTimezone(lima())).unwrap() else {
        panic!("expected an added entry");
    };

    app.handle(UiEvent::RemoveTimezone { id: id.clone() }).unwrap();
    assert!(!app.registry().contains(&id));
    assert!(!app.visibility().is_visible(&id));
    assert_eq!(store.raw("worldclock.customTimezones").as_deref(), Some("[]"));

    let visible: Vec<EntryId> =
        serde_json::from_str(&store.raw("worldclock.visibleTimezones").unwrap()).unwrap();
    assert!(!visible.contains(&id));
}

#[test]
fn removing_builtin_is_a_noop() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    let outcome = app
        .handle(UiEvent::RemoveTimezone {
            id: EntryId::from("tokyo"),
        })
        .unwrap();
    assert!(matches!(outcome, EventOutcome::Ignored { .. }));
    assert_eq!(app.registry().len(), 9);
    assert!(app.visibility().is_visible(&EntryId::from("tokyo")));
}

#[test]
fn deselect_then_select_restores_full_set() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    app.handle(UiEvent::AddTimezone(lima())).unwrap();
    let full = app.visibility().clone();

    app.handle(UiEvent::DeselectAll).unwrap();
    assert!(app.visibility().is_empty());
    app.sink_mut().clear();
    assert_eq!(app.run_pass().rendered, 0);

    app.handle(UiEvent::SelectAll).unwrap();
    assert_eq!(app.visibility(), &full);
}

#[test]
fn three_forwards_then_reset_is_zero() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    for _ in 0..3 {
        app.handle(UiEvent::ShiftOffset { delta: 1 }).unwrap();
    }
    assert_eq!(app.offset().hours(), 3);
    let outcome = app.handle(UiEvent::ShiftOffset { delta: 0 }).unwrap();
    assert_eq!(app.offset(), GlobalOffset::ZERO);
    assert!(matches!(
        outcome,
        EventOutcome::OffsetChanged { ref description, .. } if description == "current time"
    ));
}

#[test]
fn offset_is_applied_before_zone_conversion() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    app.sink_mut().clear();
    app.handle(UiEvent::ShiftOffset { delta: -1 }).unwrap();
    // 12:00 UTC minus one hour, shown in London (BST, UTC+1).
    let london = app.sink().last_face(&EntryId::from("london")).unwrap();
    assert_eq!(london.digital_string, "12:00:00");
    assert_eq!(london.utc_offset_label, "GMT+1");
}

#[test]
fn state_survives_a_reload() {
    let store = SharedStore::default();
    let clock = clock();

    let mut first = session(&store, &clock);
    first.handle(UiEvent::AddTimezone(lima())).unwrap();
    clock.advance(TimeDelta::milliseconds(1));
    first.handle(UiEvent::AddTimezone(lima())).unwrap();
    first
        .handle(UiEvent::ToggleVisibility {
            id: EntryId::from("dubai"),
        })
        .unwrap();
    first
        .handle(UiEvent::SaveTheme {
            name: "Mine".to_owned(),
            colors: all_roles("#334455"),
        })
        .unwrap();
    first
        .handle(UiEvent::ApplyTheme {
            theme: ThemeRef::Index(0),
        })
        .unwrap();
    first.teardown();

    let second = session(&store, &clock);
    assert_eq!(second.registry().list(), first.registry().list());
    assert_eq!(second.visibility(), first.visibility());
    assert_eq!(second.themes().custom(), first.themes().custom());
    assert_eq!(second.themes().active_name(), "Mine");
    assert!(!second.visibility().is_visible(&EntryId::from("dubai")));
    // Two adds in distinct milliseconds produce distinct, ordered ids.
    let customs = second.registry().custom_entries();
    assert_eq!(customs.len(), 2);
    assert_ne!(customs[0].id, customs[1].id);
}

#[test]
fn corrupt_values_fall_back_to_defaults() {
    let store = SharedStore::default();
    store.put("worldclock.clockTheme", "{oops");
    store.put("worldclock.customTimezones", "not json");
    store.put("worldclock.visibleTimezones", "42");
    store.put("worldclock.customThemes", "[{\"name\": 1}]");

    let app = session(&store, &clock());
    assert_eq!(app.registry().len(), 9);
    assert_eq!(app.visibility().len(), 9);
    assert_eq!(app.themes().active_name(), "midnight");
    assert!(app.themes().custom().is_empty());
}

#[test]
fn stale_visible_ids_are_pruned_and_written_back() {
    let store = SharedStore::default();
    store.put(
        "worldclock.visibleTimezones",
        r#"["tokyo", "custom-123", "paris"]"#,
    );

    let app = session(&store, &clock());
    assert_eq!(app.visibility().len(), 2);
    assert_eq!(
        store.raw("worldclock.visibleTimezones").as_deref(),
        Some(r#"["paris","tokyo"]"#)
    );
}

#[test]
fn stored_entry_with_unresolvable_zone_is_kept() {
    let stored = concat!(
        r##"[{"id":"custom-1","timezone":"Asia/Calcutta_Old","flag":"x","##,
        r##""city":"Calcutta","country":"India","color":"#60a5fa"}]"##
    );
    let store = SharedStore::default();
    store.put("worldclock.customTimezones", stored);
    store.put("worldclock.visibleTimezones", r#"["custom-1","tokyo"]"#);

    let mut app = session(&store, &clock());
    let id = EntryId::from("custom-1");
    assert_eq!(app.registry().len(), 10);
    assert!(app.visibility().is_visible(&id));
    assert_eq!(store.raw("worldclock.customTimezones").as_deref(), Some(stored));
    assert_eq!(
        store.raw("worldclock.visibleTimezones").as_deref(),
        Some(r#"["custom-1","tokyo"]"#)
    );

    // The entry fails on its own; the rest of the pass still renders.
    app.sink_mut().clear();
    let summary = app.run_pass();
    assert_eq!(summary.rendered, 1);
    assert_eq!(summary.failed, 1);
    assert!(app.sink().last_face(&id).is_none());

    // A later save writes the entry back unchanged.
    app.handle(UiEvent::AddTimezone(lima())).unwrap();
    let customs: Vec<TimezoneEntry> =
        serde_json::from_str(&store.raw("worldclock.customTimezones").unwrap()).unwrap();
    assert_eq!(customs.len(), 2);
    assert_eq!(customs[0].id, id);
    assert_eq!(customs[0].timezone_name, "Asia/Calcutta_Old");
}

#[test]
fn incomplete_stored_palette_survives_later_saves() {
    let mut old = preset_palettes().remove(3);
    old.name = "Old".to_owned();
    old.colors.remove(&ColorRole::AccentOrange);
    let store = SharedStore::default();
    store.put(
        "worldclock.customThemes",
        &serde_json::to_string(&vec![old.clone()]).unwrap(),
    );

    let mut app = session(&store, &clock());
    let saved = app
        .handle(UiEvent::SaveTheme {
            name: "New".to_owned(),
            colors: all_roles("#101010"),
        })
        .unwrap();
    assert_eq!(saved, EventOutcome::ThemeSaved { index: 1 });

    let stored: Vec<ThemePalette> =
        serde_json::from_str(&store.raw("worldclock.customThemes").unwrap()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], old);
    assert_eq!(stored[1].name, "New");

    let applied = app
        .handle(UiEvent::ApplyTheme {
            theme: ThemeRef::Index(0),
        })
        .unwrap();
    assert_eq!(
        applied,
        EventOutcome::ThemeApplied {
            name: "Old".to_owned()
        }
    );
    assert!(app.themes().active().is_complete());
    assert_eq!(
        store.raw("worldclock.clockTheme").as_deref(),
        Some("\"Old\"")
    );
}

#[test]
fn offset_steps_outside_one_hour_are_refused() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());
    assert!(app.handle(UiEvent::ShiftOffset { delta: 3 }).is_err());
    assert_eq!(app.offset(), GlobalOffset::ZERO);
}

#[test]
fn persisted_empty_selection_stays_empty() {
    let store = SharedStore::default();
    store.put("worldclock.visibleTimezones", "[]");
    let app = session(&store, &clock());
    assert!(app.visibility().is_empty());
    assert!(app.sink().faces.is_empty());
}

#[test]
fn unknown_stored_theme_falls_back_to_midnight() {
    let store = SharedStore::default();
    store.put("worldclock.clockTheme", "\"vaporwave\"");
    let app = session(&store, &clock());
    assert_eq!(app.themes().active_name(), "midnight");
}

#[test]
fn theme_events_round_trip_through_storage() {
    let store = SharedStore::default();
    let mut app = session(&store, &clock());

    let saved = app
        .handle(UiEvent::SaveTheme {
            name: "Dusk".to_owned(),
            colors: all_roles("#1e1b4b"),
        })
        .unwrap();
    assert_eq!(saved, EventOutcome::ThemeSaved { index: 0 });

    app.handle(UiEvent::ApplyTheme {
        theme: ThemeRef::Name("ocean".to_owned()),
    })
    .unwrap();
    assert_eq!(
        store.raw("worldclock.clockTheme").as_deref(),
        Some("\"ocean\"")
    );
    assert_eq!(app.sink().themes.last().map(String::as_str), Some("ocean"));

    let deleted = app.handle(UiEvent::DeleteTheme { index: 0 }).unwrap();
    assert_eq!(
        deleted,
        EventOutcome::ThemeDeleted {
            name: "Dusk".to_owned()
        }
    );
    assert_eq!(store.raw("worldclock.customThemes").as_deref(), Some("[]"));
    assert!(app.handle(UiEvent::DeleteTheme { index: 0 }).is_err());
}

#[tokio::test(start_paused = true)]
async fn started_app_renders_on_each_tick_until_teardown() {
    let store = SharedStore::default();
    let clock = clock();
    let mut app = session(&store, &clock);
    app.start();
    assert!(app.is_running());
    app.sink_mut().clear();

    for _ in 0..2 {
        app.wait_for_tick().await;
        clock.advance(TimeDelta::seconds(1));
        app.run_pass();
    }
    assert_eq!(app.sink().faces.len(), 18);
    let tokyo = app.sink().last_face(&EntryId::from("tokyo")).unwrap();
    assert_eq!(tokyo.digital_string, "09:00:02");

    app.teardown();
    assert!(!app.is_running());
}
