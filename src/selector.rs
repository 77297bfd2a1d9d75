use crate::{Card, Meld, Round, hand_points};
use tracing::{debug, trace};

/// Non-overlapping melds chosen from a hand, and what they leave behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// Accepted melds, with `slots` resolved to the hand instances they consumed
    pub melds: Vec<Meld>,
    /// Number of hand cards covered by `melds`
    pub used_count: usize,
    /// Hand slots not covered by any meld, in hand order
    pub leftover_slots: Vec<usize>,
    /// Cards at `leftover_slots`
    pub leftover: Vec<Card>,
}

impl Selection {
    /// True if every hand card is covered. An empty hand is never complete.
    pub fn is_complete(&self) -> bool {
        self.used_count > 0 && self.leftover.is_empty()
    }

    /// Point total of the cards left over
    pub fn leftover_points(&self, round: Round) -> u32 {
        hand_points(&self.leftover, round)
    }
}

/// Greedily select non-overlapping melds covering as many hand cards as possible.
///
/// Melds are tried largest first (ties keep input order). A meld is accepted when
/// each of its cards can be matched to a distinct, still unused hand instance:
/// first by the meld's recorded slot, otherwise by equal suit and rank. Melds that
/// cannot be matched are skipped; there is no backtracking, so the result is not
/// guaranteed to be the best possible partition.
pub fn select_best(hand: &[Card], melds: &[Meld]) -> Selection {
    let mut order: Vec<&Meld> = melds.iter().filter(|m| !m.is_empty()).collect();
    order.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut used = vec![false; hand.len()];
    let mut chosen = Vec::new();

    for meld in order {
        match claim_slots(hand, meld, &used) {
            Some(slots) => {
                for &slot in &slots {
                    used[slot] = true;
                }
                chosen.push(Meld {
                    meld_type: meld.meld_type,
                    cards: slots.iter().map(|&s| hand[s]).collect(),
                    slots,
                });
            }
            None => trace!(%meld, "meld conflicts with earlier selection"),
        }
    }

    let leftover_slots: Vec<usize> = (0..hand.len()).filter(|&i| !used[i]).collect();
    let leftover: Vec<Card> = leftover_slots.iter().map(|&i| hand[i]).collect();
    let used_count = hand.len() - leftover.len();

    debug!(
        candidates = melds.len(),
        chosen = chosen.len(),
        used_count,
        leftover = leftover.len(),
        "selected melds"
    );

    Selection {
        melds: chosen,
        used_count,
        leftover_slots,
        leftover,
    }
}

/// Match each meld card to a distinct unused hand slot, or None if any card has no match.
fn claim_slots(hand: &[Card], meld: &Meld, used: &[bool]) -> Option<Vec<usize>> {
    let mut taken = used.to_vec();
    let mut slots = Vec::with_capacity(meld.len());

    for (pos, card) in meld.cards.iter().enumerate() {
        let recorded = meld
            .slots
            .get(pos)
            .copied()
            .filter(|&s| s < hand.len() && !taken[s] && hand[s] == *card);
        let slot = recorded.or_else(|| (0..hand.len()).find(|&s| !taken[s] && hand[s] == *card))?;

        taken[slot] = true;
        slots.push(slot);
    }

    Some(slots)
}
