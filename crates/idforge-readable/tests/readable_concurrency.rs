use idforge_readable::{FixedSymbol, ReadableGenerator, ReadableId, ReadableSettings};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 4;
const IDS_PER_THREAD: usize = 500;

#[test]
fn concurrent_callers_never_share_an_id() {
    let settings = ReadableSettings::builder().build();
    let generator = Arc::new(ReadableGenerator::with_host(settings, FixedSymbol('k')));

    let handles: Vec<_> = (0..THREADS)
        .map(|n| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || {
                let app_id = if n % 2 == 0 { None } else { Some("shop") };
                (0..IDS_PER_THREAD)
                    .map(|_| generator.next_id(app_id).unwrap())
                    .collect::<Vec<ReadableId>>()
            })
        })
        .collect();

    let mut seen = HashSet::new();
    for handle in handles {
        let ids = handle.join().unwrap();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
        for id in ids {
            assert_eq!(id.as_str().len(), 10);
            assert!(id.as_str().starts_with('k'));
            // the sequence alone is unique across apps within a second
            assert!(seen.insert((id.parts().sequence, id.as_str()[4..].to_string())));
        }
    }
    assert_eq!(seen.len(), THREADS * IDS_PER_THREAD);
}

#[test]
fn parsed_ids_round_trip_through_display() {
    let settings = ReadableSettings::builder().build();
    let generator = ReadableGenerator::with_host(settings, FixedSymbol('k'));
    let id = generator.next_id(Some("7")).unwrap();
    let parsed: ReadableId = id.to_string().parse().unwrap();
    assert_eq!(parsed, id);
    assert_eq!(parsed.parts().app, '8');
}
