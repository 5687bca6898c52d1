mod common;

use tempfile::TempDir;

use common::note;
use sommelier::{
    persist::{
        PersistError, StorageBackend,
        journal::{Journal, decode_notes},
        memory::MemoryBackend,
        sqlite::SqliteBackend,
    },
    types::{SortBy, WineStyle},
    wine::{Citation, WineCharacteristics, WineNote},
};

#[test]
fn sqlite_round_trips_collection_and_order() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("journal.db");

    let mut journal = Journal::open(Box::new(SqliteBackend::open(&db_path).expect("open"))).expect("load");
    assert!(journal.store().is_empty());

    let mut searched = note("a", 1, Some(4), "2018", "Rioja");
    searched.search_sources = Some(vec![Citation {
        title: "Producer site".to_string(),
        uri: "https://example.com/a".to_string(),
    }]);
    journal.insert(searched).expect("insert a");
    journal.insert(note("b", 2, Some(2), "N/V", "Champagne")).expect("insert b");
    journal.insert(note("c", 3, None, "2020", "Mosel")).expect("insert c");
    assert!(journal.remove("b").expect("remove"));
    let expected = journal.store().export_notes();
    drop(journal);

    let reopened = Journal::open(Box::new(SqliteBackend::open(&db_path).expect("reopen"))).expect("reload");
    assert_eq!(reopened.store().export_notes(), expected);
    assert_eq!(reopened.store().ordered_ids(), vec!["c", "a"]);
}

#[test]
fn newly_inserted_record_is_first_after_reload() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("journal.db");

    let mut journal = Journal::open(Box::new(SqliteBackend::open(&db_path).expect("open"))).expect("load");
    journal.insert(note("older", 1, Some(5), "2010", "Napa")).expect("older");
    journal.insert(note("newest", 2, Some(1), "2011", "Sonoma")).expect("newest");
    drop(journal);

    let reopened = Journal::open(Box::new(SqliteBackend::open(&db_path).expect("reopen"))).expect("reload");
    assert_eq!(reopened.store().iter().next().map(|n| n.id.as_str()), Some("newest"));
}

#[test]
fn edits_persist_through_replace() {
    let backend = MemoryBackend::new();
    let mut journal = Journal::open(Box::new(backend.clone())).expect("load");
    journal.insert(note("a", 1, Some(4), "2018", "Rioja")).expect("insert");

    let mut edited = journal.store().get_cloned("a").expect("a");
    edited.rating = Some(2);
    edited.user_notes = "Better with food".to_string();
    assert!(journal.replace("a", edited).expect("replace"));

    let stored = decode_notes(&backend.bytes().expect("saved")).expect("decode");
    assert_eq!(stored[0].rating, Some(2));
    assert_eq!(stored[0].user_notes, "Better with food");
}

#[test]
fn unknown_ids_do_not_write() {
    let backend = MemoryBackend::new();
    let mut journal = Journal::open(Box::new(backend.clone())).expect("load");
    journal.insert(note("a", 1, Some(4), "2018", "Rioja")).expect("insert");
    assert_eq!(backend.save_count(), 1);

    assert!(!journal.replace("ghost", note("ghost", 2, None, "N/V", "X")).expect("replace"));
    assert!(!journal.remove("ghost").expect("remove"));
    assert_eq!(backend.save_count(), 1);
}

#[test]
fn failed_save_rolls_back_memory() {
    let backend = MemoryBackend::new();
    let mut journal = Journal::open(Box::new(backend.clone())).expect("load");
    journal.insert(note("a", 1, Some(4), "2018", "Rioja")).expect("insert");
    let snapshot = journal.store().export_notes();

    backend.set_fail_saves(true);
    assert!(journal.insert(note("b", 2, Some(1), "2019", "Mosel")).is_err());
    assert!(journal.remove("a").is_err());
    let mut edited = snapshot[0].clone();
    edited.rating = Some(1);
    assert!(journal.replace("a", edited).is_err());

    assert_eq!(journal.store().export_notes(), snapshot);
    assert_eq!(decode_notes(&backend.bytes().expect("saved")).expect("decode"), snapshot);
}

#[test]
fn corrupt_slot_is_reported() {
    let mut backend = SqliteBackend::open_in_memory().expect("open");
    backend.put_raw(b"{not an array").expect("put");
    let err = Journal::open(Box::new(backend)).err().expect("corrupt");
    assert!(matches!(err, PersistError::Corrupt(_)));
}

#[test]
fn empty_slot_opens_empty() {
    let backend = SqliteBackend::open_in_memory().expect("open");
    assert!(backend.load().expect("load").is_none());
    assert!(backend.updated_ms().expect("ts").is_none());
    let journal = Journal::open(Box::new(backend)).expect("journal");
    assert!(journal.sorted_view(SortBy::Recency).is_empty());
}

#[test]
fn reads_browser_storage_format() {
    let raw = r#"[{
        "id": "1700000000000",
        "name": "Sancerre",
        "winery": "Domaine Vacheron",
        "varietal": "Sauvignon Blanc",
        "region": "Loire",
        "vintage": "2022",
        "tastingNotes": "Flint and citrus.",
        "userNotes": "",
        "rating": 4,
        "style": "White",
        "characteristics": { "body": 2, "acidity": 5, "tannin": 1, "sweetness": 1 },
        "imageUrl": "data:image/jpeg;base64,AAAA",
        "createdAt": 1700000000000
    }, {
        "id": "1690000000000",
        "name": "Mystery",
        "winery": "Unknown Winery",
        "varietal": "Unknown Varietal",
        "region": "Unknown Region",
        "vintage": "N/V",
        "tastingNotes": "No AI tasting notes yet",
        "style": "Orange",
        "createdAt": 1690000000000
    }, {
        "id": "1680000000000",
        "name": "Barolo",
        "winery": "Vietti",
        "varietal": "Nebbiolo",
        "region": "Piedmont",
        "vintage": "2016",
        "tastingNotes": "Tar and roses.",
        "rating": 7,
        "style": "Red",
        "characteristics": { "body": -1, "acidity": 4.6, "tannin": 300 },
        "createdAt": 1680000000000,
        "searchSources": [
            { "uri": "https://x.example" },
            { "title": "Vietti", "uri": "https://vietti.example" }
        ]
    }]"#;
    let journal = Journal::open(Box::new(MemoryBackend::with_bytes(raw.as_bytes().to_vec()))).expect("load");

    let notes: Vec<WineNote> = journal.store().export_notes();
    assert_eq!(notes.len(), 3);
    assert_eq!(notes[0].image_url.as_deref(), Some("data:image/jpeg;base64,AAAA"));
    assert_eq!(notes[0].characteristics.acidity, 5);
    assert_eq!(notes[1].style, WineStyle::Red);
    assert_eq!(notes[1].rating, None);
    assert!(notes[1].search_sources.is_none());

    let barolo = &notes[2];
    assert_eq!(barolo.rating, Some(5));
    assert_eq!(
        barolo.characteristics,
        WineCharacteristics {
            body: 1,
            acidity: 5,
            tannin: 5,
            sweetness: 1,
        }
    );
    let sources = barolo.search_sources.as_deref().expect("sources");
    assert_eq!(sources[0].title, "https://x.example");
    assert_eq!(sources[1].title, "Vietti");

    let exported: serde_json::Value = serde_json::from_str(&journal.export_json().expect("export")).expect("json");
    assert_eq!(exported[0]["tastingNotes"], "Flint and citrus.");
    assert_eq!(exported[0]["createdAt"], 1_700_000_000_000u64);
    assert!(exported[1].get("searchSources").is_none());
}

#[test]
fn separate_keys_hold_separate_journals() {
    let tmp = TempDir::new().expect("tmp");
    let db_path = tmp.path().join("journal.db");

    let mut current = Journal::open(Box::new(SqliteBackend::open(&db_path).expect("open"))).expect("load");
    current.insert(note("a", 1, Some(4), "2018", "Rioja")).expect("insert");
    drop(current);

    let other = SqliteBackend::open(&db_path).expect("open").with_key("sommelier_wines_v2");
    assert!(other.load().expect("load").is_none());
    let current = SqliteBackend::open(&db_path).expect("open");
    assert!(current.updated_ms().expect("ts").is_some());
}
