use binwise_core::{CouncilCatalog, CouncilName, DateRange, WasteStream};
use chrono::{NaiveDate, Weekday};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn next_collections_follow_configured_weekdays() {
    let catalog = CouncilCatalog::builtin().expect("builtin councils");
    let westminster = catalog
        .get(&CouncilName::from("Westminster"))
        .expect("westminster");

    // 2026-10-19 is a Monday: recycling today, general tomorrow, compost on Wednesday.
    let events = westminster.next_collections(date(2026, 10, 19));

    let summary = events
        .iter()
        .map(|event| (event.stream, event.date, event.weekday))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        [
            (WasteStream::Recycling, date(2026, 10, 19), Weekday::Mon),
            (WasteStream::General, date(2026, 10, 20), Weekday::Tue),
            (WasteStream::Compost, date(2026, 10, 21), Weekday::Wed),
        ]
    );
}

#[test]
fn next_collection_wraps_into_the_following_week() {
    let catalog = CouncilCatalog::builtin().expect("builtin councils");
    let tower_hamlets = catalog
        .get(&CouncilName::from("Tower Hamlets"))
        .expect("tower hamlets");

    // Saturday: every stream is next week.
    let events = tower_hamlets.next_collections(date(2026, 10, 24));
    assert!(events.iter().all(|event| event.date > date(2026, 10, 24)));
    assert!(events.iter().all(|event| event.date <= date(2026, 10, 30)));
    assert!(events.iter().all(|event| {
        event.date.format("%a").to_string() == event.weekday.to_string()
    }));
}

#[test]
fn collections_within_lists_each_week_inclusive() {
    let catalog = CouncilCatalog::builtin().expect("builtin councils");
    let westminster = catalog.default_council();

    let range = DateRange {
        start: date(2026, 10, 19),
        end: date(2026, 11, 2),
    };
    let events = westminster.collections_within(range);

    // Mondays 19 Oct, 26 Oct and 2 Nov; Tuesdays and Wednesdays twice each.
    assert_eq!(events.len(), 7);
    assert!(events.windows(2).all(|pair| match pair {
        [earlier, later] => earlier.date <= later.date,
        _ => true,
    }));
    assert_eq!(
        events
            .iter()
            .filter(|event| event.stream == WasteStream::Recycling)
            .count(),
        3
    );
    assert!(
        events
            .iter()
            .all(|event| event.date >= range.start && event.date <= range.end)
    );
}

#[test]
fn empty_range_has_no_collections() {
    let catalog = CouncilCatalog::builtin().expect("builtin councils");
    let range = DateRange {
        start: date(2026, 10, 20),
        end: date(2026, 10, 19),
    };
    assert!(catalog.default_council().collections_within(range).is_empty());
}
