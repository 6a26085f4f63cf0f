//! Episode set assembly module
//!
//! Collects normalized episodes into the final season-scoped result:
//! stable sort by episode number, first-seen-wins deduplication, and
//! season-average runtime defaulting. Never reorders by any field other
//! than the episode number.

use crate::models::{Episode, EpisodeSet};

/// Assemble normalized episodes into an ordered, deduplicated season set.
///
/// Duplicate episode numbers are resolved first-seen-wins: the stable
/// sort preserves arrival order among equal numbers, so the earliest
/// record for each number survives. A dropped-duplicate discrepancy is
/// noted as a warning, not an error.
pub fn assemble(season: u32, episodes: Vec<Episode>) -> EpisodeSet {
    let raw_count = episodes.len();

    let mut sorted = episodes;
    sorted.sort_by_key(|e| e.episode_number);

    let mut deduped: Vec<Episode> = Vec::with_capacity(sorted.len());
    for episode in sorted {
        match deduped.last() {
            Some(kept) if kept.episode_number == episode.episode_number => continue,
            _ => deduped.push(episode),
        }
    }

    let mut warnings = Vec::new();
    if deduped.len() < raw_count {
        warnings.push(format!(
            "{} duplicate episode number(s) dropped; kept the first-seen record for each",
            raw_count - deduped.len()
        ));
    }

    fill_missing_runtimes(&mut deduped);

    EpisodeSet {
        season_number: season,
        episode_count: deduped.len(),
        episodes: deduped,
        warnings,
    }
}

/// Default missing runtimes to the season average across records that
/// have one, or 0 if none do.
fn fill_missing_runtimes(episodes: &mut [Episode]) {
    let known: Vec<u32> = episodes.iter().filter_map(|e| e.runtime_minutes).collect();

    let default = if known.is_empty() {
        0
    } else {
        (known.iter().map(|&r| r as u64).sum::<u64>() / known.len() as u64) as u32
    };

    for episode in episodes.iter_mut() {
        if episode.runtime_minutes.is_none() {
            episode.runtime_minutes = Some(default);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DescriptionSource;

    fn episode(number: u32, title: &str) -> Episode {
        Episode {
            season_number: 1,
            episode_number: number,
            title: title.to_string(),
            overview: String::new(),
            air_date: None,
            runtime_minutes: None,
            description_source: DescriptionSource::Primary,
        }
    }

    #[test]
    fn test_assemble_sorts_by_episode_number() {
        let set = assemble(1, vec![episode(2, "B"), episode(1, "A"), episode(3, "C")]);
        let numbers: Vec<u32> = set.episodes.iter().map(|e| e.episode_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(set.episode_count, 3);
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_assemble_first_seen_wins_on_duplicates() {
        let set = assemble(1, vec![episode(4, "first"), episode(4, "second")]);
        assert_eq!(set.episode_count, 1);
        assert_eq!(set.episodes[0].title, "first");
    }

    #[test]
    fn test_assemble_notes_dropped_duplicates() {
        let set = assemble(
            1,
            vec![episode(1, "a"), episode(2, "b"), episode(2, "c"), episode(2, "d")],
        );
        assert_eq!(set.episode_count, 2);
        assert_eq!(set.warnings.len(), 1);
        assert!(set.warnings[0].contains("2 duplicate"));
    }

    #[test]
    fn test_assemble_empty_input() {
        let set = assemble(3, vec![]);
        assert_eq!(set.season_number, 3);
        assert_eq!(set.episode_count, 0);
        assert!(set.episodes.is_empty());
        assert!(set.warnings.is_empty());
    }

    #[test]
    fn test_missing_runtimes_default_to_season_average() {
        let mut with_runtime = episode(1, "a");
        with_runtime.runtime_minutes = Some(20);
        let mut with_runtime_2 = episode(2, "b");
        with_runtime_2.runtime_minutes = Some(30);
        let without = episode(3, "c");

        let set = assemble(1, vec![with_runtime, with_runtime_2, without]);
        assert_eq!(set.episodes[2].runtime_minutes, Some(25));
    }

    #[test]
    fn test_missing_runtimes_default_to_zero_when_none_known() {
        let set = assemble(1, vec![episode(1, "a"), episode(2, "b")]);
        assert_eq!(set.episodes[0].runtime_minutes, Some(0));
        assert_eq!(set.episodes[1].runtime_minutes, Some(0));
    }

    #[test]
    fn test_assemble_preserves_provenance() {
        let mut scraped = episode(1, "a");
        scraped.description_source = DescriptionSource::Tertiary;
        let set = assemble(1, vec![scraped]);
        assert_eq!(set.episodes[0].description_source, DescriptionSource::Tertiary);
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::DescriptionSource;
    use proptest::prelude::*;

    /// Generate an arbitrary normalized episode with a bounded number
    fn arbitrary_episode() -> impl Strategy<Value = Episode> {
        (1u32..40, "[a-zA-Z ]{0,20}", prop::option::of(5u32..60)).prop_map(
            |(number, title, runtime)| Episode {
                season_number: 1,
                episode_number: number,
                title,
                overview: String::new(),
                air_date: None,
                runtime_minutes: runtime,
                description_source: DescriptionSource::Manual,
            },
        )
    }

    proptest! {
        /// For any input sequence, the assembled set is strictly
        /// ascending by episode number with no duplicates.
        #[test]
        fn property_assembled_set_strictly_ascending(
            episodes in prop::collection::vec(arbitrary_episode(), 0..30)
        ) {
            let set = assemble(1, episodes);
            for pair in set.episodes.windows(2) {
                prop_assert!(pair[0].episode_number < pair[1].episode_number);
            }
        }

        /// Assembling an already-assembled set changes nothing.
        #[test]
        fn property_assemble_is_idempotent(
            episodes in prop::collection::vec(arbitrary_episode(), 0..30)
        ) {
            let once = assemble(1, episodes);
            let twice = assemble(1, once.episodes.clone());
            prop_assert_eq!(once.episodes, twice.episodes);
            prop_assert!(twice.warnings.is_empty());
        }

        /// Every distinct episode number in the input survives assembly.
        #[test]
        fn property_no_episode_number_lost(
            episodes in prop::collection::vec(arbitrary_episode(), 0..30)
        ) {
            let mut expected: Vec<u32> = episodes.iter().map(|e| e.episode_number).collect();
            expected.sort_unstable();
            expected.dedup();

            let set = assemble(1, episodes);
            let got: Vec<u32> = set.episodes.iter().map(|e| e.episode_number).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
