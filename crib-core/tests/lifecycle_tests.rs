#![allow(missing_docs)]
use crib_core::ciphertext::CiphertextSet;
use crib_core::classifier::ByteClassifier;
use crib_core::error::CribError;
use crib_core::matching::{MatchId, MatchStatus};
use crib_core::workspace::Workspace;

fn three_messages() -> Workspace {
    let set = CiphertextSet::new(vec![
        vec![1, 6, 7, 4],
        vec![5, 10, 11, 3],
        vec![6, 1, 0, 3],
    ]);
    Workspace::new(set, ByteClassifier::from_bytes(1..=9, []))
}

fn wide_workspace() -> Workspace {
    let set = CiphertextSet::new(vec![vec![0x10; 12], vec![0x20; 12], vec![0x30; 10]]);
    Workspace::new(set, ByteClassifier::default())
}

fn ids(matches: &[crib_core::matching::Match]) -> Vec<MatchId> {
    matches.iter().map(|m| m.id).collect()
}

#[test]
fn test_confirm_moves_match_to_end_of_confirmed() {
    let mut ws = three_messages();
    let older = ws.restore_confirmed(vec![b'z'], 1, 3).unwrap();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    let pick = ws.pending()[0].id;

    ws.confirm(pick).unwrap();
    assert_eq!(ids(ws.confirmed()), vec![older, pick]);
    assert_eq!(ws.get(pick).unwrap().status, MatchStatus::Confirmed);
    assert!(ws.pending().iter().all(|m| m.id != pick));
}

#[test]
fn test_confirming_twice_is_rejected() {
    let mut ws = three_messages();
    let id = ws.restore_confirmed(vec![3, 4], 0, 0).unwrap();
    assert!(matches!(ws.confirm(id), Err(CribError::AlreadyConfirmed(got)) if got == id));
    assert!(matches!(
        ws.confirm(MatchId(999)),
        Err(CribError::UnknownMatch(_))
    ));
    assert_eq!(ws.confirmed().len(), 1);
}

#[test]
fn test_confirm_absorbs_exactly_the_contained_matches() {
    let mut ws = wide_workspace();
    let inside = ws.restore_confirmed(b"ab".to_vec(), 0, 3).unwrap();
    let overlapping = ws.restore_confirmed(b"abcd".to_vec(), 1, 6).unwrap();
    let same_span = ws.restore_confirmed(b"wxyzw".to_vec(), 2, 2).unwrap();
    let before = ws.restore_confirmed(b"abc".to_vec(), 0, 0).unwrap();

    ws.set_crib(b"hello".to_vec());
    let id = ws.placeholder().unwrap();
    ws.reposition(id, 2, 0).unwrap();
    ws.confirm(id).unwrap();

    // [2, 7) swallows [3, 5) and [2, 7) but not [6, 10) or [0, 3).
    assert_eq!(ids(ws.confirmed()), vec![overlapping, before, id]);
    assert!(ws.get(inside).is_none());
    assert!(ws.get(same_span).is_none());
}

#[test]
fn test_confirm_absorbs_pending_matches_too() {
    let mut ws = wide_workspace();
    ws.set_crib(b"a".to_vec());
    ws.refresh().unwrap();
    // Offsets 10 and 11 are only covered by two ciphertexts.
    let starts: Vec<_> = ws.pending().iter().map(|m| m.start).collect();
    assert_eq!(starts, (0..10).collect::<Vec<_>>());

    let placeholder = ws.placeholder().unwrap();
    ws.reposition(placeholder, 3, 1).unwrap();
    ws.confirm(placeholder).unwrap();

    let starts: Vec<_> = ws.pending().iter().map(|m| m.start).collect();
    assert_eq!(starts, vec![0, 1, 2, 4, 5, 6, 7, 8, 9]);
    assert_eq!(ws.get(placeholder).unwrap().key, vec![0x20 ^ b'a']);
}

#[test]
fn test_remove_preserves_confirmed_order() {
    let mut ws = wide_workspace();
    let a = ws.restore_confirmed(b"a".to_vec(), 0, 0).unwrap();
    let b = ws.restore_confirmed(b"b".to_vec(), 0, 1).unwrap();
    let c = ws.restore_confirmed(b"c".to_vec(), 0, 2).unwrap();

    let removed = ws.remove(b).unwrap();
    assert_eq!(removed.id, b);
    assert_eq!(ids(ws.confirmed()), vec![a, c]);
    assert!(matches!(ws.remove(b), Err(CribError::UnknownMatch(_))));
}

#[test]
fn test_earlier_confirmation_wins_overlap() {
    let mut ws = wide_workspace();
    ws.restore_confirmed(vec![0x01; 4], 0, 0).unwrap();
    ws.restore_confirmed(vec![0x02; 4], 1, 2).unwrap();
    let key = ws.confirmed_key();
    assert_eq!(&key[..6], &[0x11, 0x11, 0x11, 0x11, 0x22, 0x22]);
    assert_eq!(&key[6..], &[0; 6]);
}

#[test]
fn test_reposition_clamps_and_recomputes_key() {
    let mut ws = three_messages();
    let id = ws.restore_confirmed(vec![3, 4], 0, 0).unwrap();

    assert!(!ws.reposition(id, 0, 0).unwrap());
    assert!(ws.reposition(id, 2, 2).unwrap());
    assert_eq!(ws.get(id).unwrap().key, vec![3, 7]);

    assert!(ws.reposition(id, 100, -4).unwrap());
    let m = ws.get(id).unwrap();
    assert_eq!((m.start, m.ciphertext_index), (4, 0));
    assert!(m.key.is_empty());

    assert!(ws.reposition(id, 3, 7).unwrap());
    let m = ws.get(id).unwrap();
    assert_eq!((m.start, m.ciphertext_index), (3, 2));
    assert_eq!(m.key, vec![3 ^ 3]);
    assert_eq!(m.crib, vec![3, 4]);
}

#[test]
fn test_reposition_uses_frozen_crib() {
    let mut ws = three_messages();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    let id = ws.pending()[0].id;
    ws.confirm(id).unwrap();

    ws.set_crib(vec![9, 9, 9]);
    ws.reposition(id, 0, 1).unwrap();
    assert_eq!(ws.get(id).unwrap().key, vec![5 ^ 3, 10 ^ 4]);
}

#[test]
fn test_search_only_reruns_when_crib_changes() {
    let mut ws = three_messages();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    let first = ids(ws.pending());

    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    assert_eq!(ids(ws.pending()), first);

    ws.set_crib(vec![3, 5]);
    ws.refresh().unwrap();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    assert_ne!(ids(ws.pending()), first);
}

#[test]
fn test_confirm_all_takes_every_possible_and_clears_crib() {
    let mut ws = three_messages();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    assert_eq!(ws.confirm_all().unwrap(), 2);
    assert!(ws.crib().is_empty());
    assert!(ws.pending().is_empty());
    assert_eq!(ws.confirmed().len(), 2);
    assert_eq!(ws.confirmed_key(), vec![2, 2, 3, 7]);

    ws.set_crib(Vec::new());
    ws.refresh().unwrap();
    assert_eq!(ws.confirm_all().unwrap(), 0);
    assert_eq!(ws.confirmed().len(), 2);
}

#[test]
fn test_confirm_all_parks_a_lone_placeholder() {
    let mut ws = three_messages();
    ws.set_crib(vec![200, 200]);
    ws.refresh().unwrap();
    assert_eq!(ws.pending().len(), 1);
    assert_eq!(ws.pending()[0].status, MatchStatus::New);

    assert_eq!(ws.confirm_all().unwrap(), 1);
    assert!(ws.crib().is_empty());
    assert!(ws.pending().is_empty());
    let parked = &ws.confirmed()[0];
    assert_eq!(parked.status, MatchStatus::Confirmed);
    assert_eq!(parked.crib, vec![200, 200]);
    assert_eq!(parked.start, ws.key_length());
    assert_eq!(ws.confirmed_key(), vec![0; 4]);

    let id = parked.id;
    assert!(ws.reposition(id, 1, 0).unwrap());
    assert_eq!(ws.confirmed_key(), vec![0, 6 ^ 200, 7 ^ 200, 0]);
}

#[test]
fn test_display_key_prefers_confirmed_bytes() {
    let mut ws = three_messages();
    ws.restore_confirmed(vec![1, 1], 1, 2).unwrap();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();

    let key = ws.key();
    assert_eq!(&key[..2], &[2, 2]);
    assert_eq!(&key[2..], &[11 ^ 1, 3 ^ 1]);
    let decoded = ws.decoded();
    assert_eq!(decoded[0][..2], [3, 4]);
    assert_eq!(decoded[1][2..], [1, 1]);
}

#[test]
fn test_clear_matches_drops_everything() {
    let mut ws = three_messages();
    ws.restore_confirmed(vec![3, 4], 0, 0).unwrap();
    ws.set_crib(vec![3, 4]);
    ws.refresh().unwrap();
    ws.clear_matches();
    assert!(ws.confirmed().is_empty());
    assert!(ws.pending().is_empty());

    ws.refresh().unwrap();
    assert!(!ws.pending().is_empty());
}

#[test]
fn test_new_ciphertexts_revalidate_confirmed_matches() {
    let mut ws = Workspace::from_text("0106\n050a\n0601", ByteClassifier::default()).unwrap();
    let kept = ws.restore_confirmed(vec![3, 4], 0, 0).unwrap();
    let dropped = ws.restore_confirmed(vec![3, 4], 2, 0).unwrap();

    ws.set_ciphertexts("ffff\n0000").unwrap();
    assert_eq!(ws.ciphertexts().len(), 2);
    assert!(ws.get(dropped).is_none());
    assert_eq!(ws.get(kept).unwrap().key, vec![0xff ^ 3, 0xff ^ 4]);

    assert!(ws.set_ciphertexts("zz!").is_err());
    assert_eq!(ws.ciphertexts_text(), "ffff\n0000");
}
