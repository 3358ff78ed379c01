/*!
 * SignalSet Tests
 * Collection laws for the bitmask set
 */

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sigmux::{Signal, SignalSet};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

fn bit(signal: Signal) -> u64 {
    1u64 << (signal.as_raw() - 1)
}

#[test]
fn construction_is_order_and_duplicate_independent() {
    let a = SignalSet::from([Signal::SIGUSR1, Signal::SIGTERM, Signal::SIGUSR1]);
    let b = SignalSet::from([Signal::SIGTERM, Signal::SIGUSR1]);
    let raw = SignalSet::from_bits(bit(Signal::SIGUSR1) | bit(Signal::SIGTERM));
    assert_eq!(a, b);
    assert_eq!(b, raw);
    assert_eq!(a.len(), 2);
}

#[test]
fn hash_is_independent_of_construction_path() {
    fn fingerprint(set: &SignalSet) -> u64 {
        let mut hasher = DefaultHasher::new();
        set.hash(&mut hasher);
        hasher.finish()
    }

    let from_signals = SignalSet::from([Signal::SIGINT, Signal::SIGALRM]);
    let from_mask = SignalSet::from_bits(bit(Signal::SIGINT) | bit(Signal::SIGALRM));
    assert_eq!(fingerprint(&from_signals), fingerprint(&from_mask));
}

#[test]
fn iteration_is_ascending_and_duplicate_free() {
    let set = SignalSet::all();
    let raws: Vec<i32> = set.iter().map(Signal::as_raw).collect();
    let mut sorted = raws.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(raws, sorted);
    assert_eq!(raws.len(), set.len());
}

#[test]
fn membership_matches_construction() {
    let set = SignalSet::from([Signal::SIGHUP, Signal::SIGPIPE]);
    assert!(set.contains(Signal::SIGHUP));
    assert!(set.contains(Signal::SIGPIPE));
    assert!(!set.contains(Signal::SIGTERM));
}

#[test]
fn empty_set_has_equal_start_and_end() {
    let set = SignalSet::empty();
    assert_eq!(set.first_index(), set.end_index());
    assert!(set.is_empty());
    assert_eq!(set.iter().count(), 0);
}

#[test]
fn full_set_end_index_is_signal_count() {
    let set = SignalSet::all();
    assert_eq!(set.first_index(), 0);
    assert_eq!(set.end_index(), Signal::all().count());
}

#[test]
fn single_bit_index_arithmetic() {
    for signal in Signal::all() {
        let set = SignalSet::from(signal);
        let position = (signal.as_raw() - 1) as usize;
        assert_eq!(set.first_index(), position);
        assert_eq!(set.end_index(), position + 1);
        assert_eq!(set.index_after(set.first_index()), set.end_index());
        assert_eq!(set.get(position), Some(signal));
        assert_eq!(set.get(position + 1), None);
    }
}

#[test]
fn index_walk_matches_iteration() {
    let set = SignalSet::from([Signal::SIGINT, Signal::SIGALRM, Signal::SIGSYS]);
    let mut walked = Vec::new();
    let mut index = set.first_index();
    while index != set.end_index() {
        walked.push(set.get(index).expect("walked index must be a member"));
        index = set.index_after(index);
    }
    assert_eq!(walked, set.iter().collect::<Vec<_>>());
}

#[test]
fn os_sigset_round_trip() {
    let set = SignalSet::from([Signal::SIGCHLD, Signal::SIGWINCH, Signal::SIGUSR2]);
    assert_eq!(SignalSet::from_os(&set.to_os()), set);
    assert_eq!(SignalSet::from_os(&SignalSet::empty().to_os()), SignalSet::empty());
}

proptest! {
    #[test]
    fn random_subsets_equal_their_raw_mask(
        picks in proptest::collection::vec(any::<prop::sample::Index>(), 0..16)
    ) {
        let all: Vec<Signal> = Signal::all().collect();
        let signals: Vec<Signal> = picks.iter().map(|ix| all[ix.index(all.len())]).collect();

        let from_signals: SignalSet = signals.iter().copied().collect();
        let mask = signals.iter().fold(0u64, |m, s| m | bit(*s));
        prop_assert_eq!(from_signals, SignalSet::from_bits(mask));

        // Iteration is ascending by raw code, duplicates collapse.
        let raws: Vec<i32> = from_signals.iter().map(Signal::as_raw).collect();
        let mut expected: Vec<i32> = signals.iter().map(|s| s.as_raw()).collect();
        expected.sort_unstable();
        expected.dedup();
        prop_assert_eq!(raws, expected);
        prop_assert_eq!(from_signals.len(), from_signals.iter().count());
    }
}
