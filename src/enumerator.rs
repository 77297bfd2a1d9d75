use crate::{Card, MAX_RANK, MIN_MELD_LEN, MIN_RANK, Meld, MeldType, Round, Suit};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};

/// Longest possible run: every rank from 3 through King
const MAX_RUN_LEN: usize = (MAX_RANK - MIN_RANK + 1) as usize;

/// A run under construction: the rank of its first card plus the hand slots
/// it uses, in rank order.
#[derive(Debug, Clone)]
struct RunCandidate {
    low: u8,
    slots: Vec<usize>,
}

impl RunCandidate {
    fn high(&self) -> u8 {
        self.low + self.slots.len() as u8 - 1
    }
}

/// Collects candidates keyed by the set of hand slots they use, so the same
/// physical cards reached by two strategies are kept once.
struct SlotSink<T> {
    seen: HashSet<Vec<usize>>,
    items: Vec<T>,
}

impl<T> SlotSink<T> {
    fn new() -> Self {
        SlotSink {
            seen: HashSet::new(),
            items: Vec::new(),
        }
    }

    fn push(&mut self, slots: &[usize], item: T) -> bool {
        let mut signature = slots.to_vec();
        signature.sort_unstable();
        if self.seen.insert(signature) {
            self.items.push(item);
            true
        } else {
            false
        }
    }
}

/// Find every book and run that can be formed from `hand` in `round`.
///
/// Each returned meld records the hand slots it uses. Melds may overlap with
/// each other; use [`crate::select_best`] to pick a non-overlapping subset.
/// Hands with fewer than three cards produce no melds.
pub fn find_melds(hand: &[Card], round: Round) -> Vec<Meld> {
    if hand.len() < MIN_MELD_LEN {
        return Vec::new();
    }

    let wilds: Vec<usize> = hand
        .iter()
        .enumerate()
        .filter(|(_, card)| card.is_wild(round))
        .map(|(i, _)| i)
        .collect();

    let mut melds = generate_books(hand, round, &wilds);
    let book_count = melds.len();
    melds.extend(generate_runs(hand, round, &wilds));

    debug!(
        hand_size = hand.len(),
        wilds = wilds.len(),
        books = book_count,
        runs = melds.len() - book_count,
        "enumerated melds"
    );

    melds
}

/// Generate books: each rank group with every usable count of wilds, plus
/// all-wild books.
fn generate_books(hand: &[Card], round: Round, wilds: &[usize]) -> Vec<Meld> {
    let mut by_rank: BTreeMap<u8, Vec<usize>> = BTreeMap::new();
    for (slot, card) in hand.iter().enumerate() {
        if card.is_wild(round) {
            continue;
        }
        if let Some(rank) = card.rank() {
            by_rank.entry(rank).or_default().push(slot);
        }
    }

    let mut sink = SlotSink::new();

    for group in by_rank.values() {
        for wild_count in 0..=wilds.len() {
            if group.len() + wild_count < MIN_MELD_LEN {
                continue;
            }
            let mut slots = group.clone();
            slots.extend_from_slice(&wilds[..wild_count]);
            sink.push(&slots, Meld::from_slots(MeldType::Book, hand, slots.clone()));
        }
    }

    for size in MIN_MELD_LEN..=wilds.len() {
        let slots = wilds[..size].to_vec();
        sink.push(&slots, Meld::from_slots(MeldType::Book, hand, slots.clone()));
    }

    sink.items
}

/// Generate runs for every suit. Wild cards join every suit's pool.
fn generate_runs(hand: &[Card], round: Round, wilds: &[usize]) -> Vec<Meld> {
    let mut sink = SlotSink::new();

    for suit in Suit::ALL {
        let mut naturals: Vec<(u8, usize)> = hand
            .iter()
            .enumerate()
            .filter(|(_, card)| !card.is_wild(round) && card.suit() == Some(suit))
            .filter_map(|(slot, card)| card.rank().map(|rank| (rank, slot)))
            .collect();
        // Stable: duplicates keep hand order
        naturals.sort_by_key(|&(rank, _)| rank);

        let first_of_suit = sink.items.len();
        natural_runs(&naturals, &mut sink);
        gap_filled_runs(&naturals, wilds, &mut sink);
        extended_pairs(&naturals, wilds, &mut sink);
        extended_runs(first_of_suit, wilds, &mut sink);

        trace!(
            ?suit,
            naturals = naturals.len(),
            runs = sink.items.len() - first_of_suit,
            "runs for suit"
        );
    }

    // With no naturals at all, enough wilds still make a run of any suit
    for size in MIN_MELD_LEN..=wilds.len().min(MAX_RUN_LEN) {
        let candidate = RunCandidate {
            low: MIN_RANK,
            slots: wilds[..size].to_vec(),
        };
        sink.push(&candidate.slots.clone(), candidate);
    }

    sink.items
        .into_iter()
        .map(|run| Meld::from_slots(MeldType::Run, hand, run.slots))
        .collect()
}

/// Every strictly consecutive stretch of three or more natural cards.
/// Duplicate ranks are skipped over, so each starting instance yields its own chain.
fn natural_runs(naturals: &[(u8, usize)], sink: &mut SlotSink<RunCandidate>) {
    for start in 0..naturals.len() {
        let mut chain = vec![naturals[start]];

        for &(rank, slot) in &naturals[start + 1..] {
            let last = chain[chain.len() - 1].0;
            if rank == last {
                continue;
            }
            if rank != last + 1 {
                break;
            }
            chain.push((rank, slot));

            if chain.len() >= MIN_MELD_LEN {
                let slots: Vec<usize> = chain.iter().map(|&(_, s)| s).collect();
                sink.push(
                    &slots.clone(),
                    RunCandidate {
                        low: chain[0].0,
                        slots,
                    },
                );
            }
        }
    }
}

/// For every pair of natural cards, fill the ranks between them with naturals
/// where present and wilds elsewhere.
fn gap_filled_runs(naturals: &[(u8, usize)], wilds: &[usize], sink: &mut SlotSink<RunCandidate>) {
    for i in 0..naturals.len() {
        for j in (i + 1)..naturals.len() {
            let (low, low_slot) = naturals[i];
            let (high, high_slot) = naturals[j];
            if high <= low || ((high - low + 1) as usize) < MIN_MELD_LEN {
                continue;
            }

            let layout: Vec<Option<usize>> = (low..=high)
                .map(|rank| {
                    if rank == low {
                        Some(low_slot)
                    } else if rank == high {
                        Some(high_slot)
                    } else {
                        naturals[i + 1..j]
                            .iter()
                            .find(|&&(r, _)| r == rank)
                            .map(|&(_, s)| s)
                    }
                })
                .collect();

            let needed = layout.iter().filter(|s| s.is_none()).count();
            if needed > wilds.len() {
                continue;
            }

            let mut fill = wilds.iter().copied();
            let slots: Vec<usize> = layout
                .into_iter()
                .map(|s| s.or_else(|| fill.next()))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default();
            if slots.len() >= MIN_MELD_LEN {
                sink.push(&slots.clone(), RunCandidate { low, slots });
            }
        }
    }
}

/// A consecutive natural pair plus one wild, placed before or after the pair.
fn extended_pairs(naturals: &[(u8, usize)], wilds: &[usize], sink: &mut SlotSink<RunCandidate>) {
    let Some(&wild) = wilds.first() else {
        return;
    };

    for i in 0..naturals.len() {
        for j in (i + 1)..naturals.len() {
            let (low, a) = naturals[i];
            let (high, b) = naturals[j];
            if high != low + 1 {
                continue;
            }

            if low > MIN_RANK {
                let slots = vec![wild, a, b];
                sink.push(
                    &slots.clone(),
                    RunCandidate {
                        low: low - 1,
                        slots,
                    },
                );
            }
            if high < MAX_RANK {
                let slots = vec![a, b, wild];
                sink.push(&slots.clone(), RunCandidate { low, slots });
            }
        }
    }
}

/// Extend each run found so far for this suit by one unused wild at either end.
fn extended_runs(first_of_suit: usize, wilds: &[usize], sink: &mut SlotSink<RunCandidate>) {
    let found: Vec<RunCandidate> = sink.items[first_of_suit..].to_vec();

    for run in found {
        if run.slots.len() < MIN_MELD_LEN {
            continue;
        }
        let Some(&wild) = wilds.iter().find(|&w| !run.slots.contains(w)) else {
            continue;
        };

        if run.low > MIN_RANK {
            let mut slots = Vec::with_capacity(run.slots.len() + 1);
            slots.push(wild);
            slots.extend_from_slice(&run.slots);
            sink.push(
                &slots.clone(),
                RunCandidate {
                    low: run.low - 1,
                    slots,
                },
            );
        }
        if run.high() < MAX_RANK {
            let mut slots = run.slots.clone();
            slots.push(wild);
            sink.push(
                &slots.clone(),
                RunCandidate {
                    low: run.low,
                    slots,
                },
            );
        }
    }
}
