mod common;

use proptest::prelude::*;

use common::note;
use sommelier::{
    core::{
        normalize::{NoteOrigin, normalize},
        store::WineStore,
    },
    persist::{journal::Journal, memory::MemoryBackend},
    synth::response::parse_analysis,
    types::{SortBy, WineStyle},
    wine::{PartialCharacteristics, WineAnalysis, WineNote, WinePatch},
};

#[derive(Debug, Clone)]
enum Action {
    Insert { key: u8, rating: Option<u8>, year: u16 },
    Rate { target: u8, rating: u8 },
    Remove { target: u8 },
    RemoveUnknown,
}

fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        (0u8..40, prop::option::of(1u8..=5), 1950u16..2030)
            .prop_map(|(key, rating, year)| Action::Insert { key, rating, year }),
        (0u8..40, 0u8..=9).prop_map(|(target, rating)| Action::Rate { target, rating }),
        (0u8..40).prop_map(|target| Action::Remove { target }),
        Just(Action::RemoveUnknown),
    ]
}

fn opt_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop_oneof![Just(String::new()), Just("   ".to_string()), "[a-zA-Z ]{0,12}"])
}

fn all_sorts() -> [SortBy; 4] {
    [SortBy::Recency, SortBy::Rating, SortBy::Vintage, SortBy::Region]
}

proptest! {
    #[test]
    fn journal_matches_a_plain_vec_model(actions in prop::collection::vec(action_strategy(), 1..150)) {
        let backend = MemoryBackend::new();
        let mut journal = Journal::open(Box::new(backend.clone())).expect("open");
        let mut model: Vec<WineNote> = Vec::new();
        let mut clock = 0u64;

        for action in actions {
            match action {
                Action::Insert { key, rating, year } => {
                    clock += 1;
                    let n = note(&format!("w{clock}-{key}"), clock, rating, &year.to_string(), "Region");
                    journal.insert(n.clone()).expect("insert");
                    model.insert(0, n);
                }
                Action::Rate { target, rating } => {
                    if model.is_empty() {
                        continue;
                    }
                    let idx = usize::from(target) % model.len();
                    let patch = WinePatch { rating: Some(rating), ..WinePatch::default() };
                    let updated = patch.applied(&model[idx]);
                    prop_assert!(journal.replace(&model[idx].id.clone(), updated.clone()).expect("replace"));
                    model[idx] = updated;
                }
                Action::Remove { target } => {
                    if model.is_empty() {
                        continue;
                    }
                    let idx = usize::from(target) % model.len();
                    let removed = model.remove(idx);
                    prop_assert!(journal.remove(&removed.id).expect("remove"));
                }
                Action::RemoveUnknown => {
                    prop_assert!(!journal.remove("not-a-record").expect("remove"));
                }
            }

            prop_assert_eq!(journal.store().export_notes(), model.clone());
        }

        for n in journal.store().iter() {
            let r = n.rating.unwrap_or(1);
            prop_assert!((1..=5).contains(&r));
        }

        let reopened = Journal::open(Box::new(backend)).expect("reopen");
        prop_assert_eq!(reopened.store().export_notes(), model);
    }

    #[test]
    fn sorted_views_are_permutations_and_leave_order_alone(
        entries in prop::collection::vec((prop::option::of(1u8..=5), prop_oneof![Just("N/V".to_string()), "(19|20)[0-9]{2}"], "[A-Za-z]{1,6}"), 0..40)
    ) {
        let mut store = WineStore::new();
        for (i, (rating, vintage, region)) in entries.iter().enumerate() {
            store.insert(note(&format!("id{i}"), i as u64, *rating, vintage, region)).expect("insert");
        }
        let before = store.ordered_ids();

        for by in all_sorts() {
            let view = store.sorted_view(by);
            let mut got: Vec<String> = view.iter().map(|n| n.id.clone()).collect();
            let mut want = before.clone();
            got.sort();
            want.sort();
            prop_assert_eq!(got, want);

            if by == SortBy::Rating {
                for pair in view.windows(2) {
                    prop_assert!(pair[0].rating.unwrap_or(0) >= pair[1].rating.unwrap_or(0));
                }
            }
            if by == SortBy::Recency {
                for pair in view.windows(2) {
                    prop_assert!(pair[0].created_at >= pair[1].created_at);
                }
            }
        }
        prop_assert_eq!(store.ordered_ids(), before);
    }

    #[test]
    fn normalized_records_are_always_complete(
        name in opt_text(), winery in opt_text(), varietal in opt_text(),
        region in opt_text(), vintage in opt_text(), summary in opt_text(),
        body in prop::option::of(0u8..=20), sweetness in prop::option::of(0u8..=20),
        created_at in 0u64..4_000_000_000_000,
    ) {
        let analysis = WineAnalysis {
            name, winery, varietal, region, vintage, summary,
            style: None,
            characteristics: Some(PartialCharacteristics { body, sweetness, ..PartialCharacteristics::default() }),
        };
        let n = normalize(analysis, NoteOrigin::Search { sources: vec![] }, created_at);

        for field in [&n.name, &n.winery, &n.varietal, &n.region, &n.vintage, &n.tasting_notes] {
            prop_assert!(!field.trim().is_empty());
        }
        prop_assert_eq!(n.style, WineStyle::Red);
        prop_assert_eq!(n.rating, Some(5));
        let expected_prefix = format!("{}-", created_at);
        prop_assert!(n.id.starts_with(&expected_prefix));
        let c = n.characteristics;
        for v in [c.body, c.acidity, c.tannin, c.sweetness] {
            prop_assert!((1..=5).contains(&v));
        }
    }

    #[test]
    fn characteristic_values_from_the_service_are_clamped(body in -50i64..50, tannin in -50i64..50) {
        let text = format!(r#"{{"name":"X","characteristics":{{"body":{body},"tannin":{tannin}}}}}"#);
        let analysis = parse_analysis(&text).expect("parse");
        let c = analysis.characteristics.expect("characteristics").or_default();
        prop_assert_eq!(i64::from(c.body), body.clamp(1, 5));
        prop_assert_eq!(i64::from(c.tannin), tannin.clamp(1, 5));
    }
}
