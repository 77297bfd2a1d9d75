use crate::{Card, Hand, Meld, Round, find_go_out_discard, find_melds, select_best};
use std::collections::HashMap;
use tracing::debug;

/// Which rule produced a discard suggestion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscardReason {
    /// Discarding this card leaves a fully melded hand
    GoOut,
    /// No card is part of a meld
    NoMelds,
    /// Every card is part of a meld; the cheapest one is spare
    AllMelded,
    /// An unused card whose removal still leaves a meld in hand
    KeepsMeld,
    /// Nothing better applied
    Fallback,
}

/// A suggested discard: the hand index and the card at that index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscardSuggestion {
    pub index: usize,
    pub card: Card,
    pub reason: DiscardReason,
}

impl DiscardSuggestion {
    fn at(hand: &[Card], index: usize, reason: DiscardReason) -> Self {
        DiscardSuggestion {
            index,
            card: hand[index],
            reason,
        }
    }
}

/// Suggest which card to discard.
///
/// Rules, first match wins:
/// 1. A discard that lets the player go out.
/// 2. With no melds, the most expensive card on the final turn; otherwise the most
///    expensive non-wild card, or the cheapest wild if the hand is all wild.
/// 3. With some cards melded: the cheapest card if everything is melded, the rule
///    above if nothing is, else the most expensive unused non-wild card whose
///    removal still leaves a meld (cheapest such wild if no non-wild qualifies).
/// 4. The most expensive unused non-wild, else the cheapest unused wild, else the
///    first card.
pub fn suggest_discard(
    hand: &[Card],
    round: Round,
    melds: &[Meld],
    is_final_turn: bool,
) -> Option<DiscardSuggestion> {
    if hand.is_empty() {
        return None;
    }

    if let Some(index) = find_go_out_discard(hand, round) {
        return Some(DiscardSuggestion::at(hand, index, DiscardReason::GoOut));
    }

    let all: Vec<usize> = (0..hand.len()).collect();

    if melds.is_empty() {
        return log_choice(
            hand,
            without_melds(hand, round, &all, is_final_turn),
            DiscardReason::NoMelds,
        );
    }

    let used = used_instances(hand, melds);
    let unused: Vec<usize> = all.iter().copied().filter(|&i| !used[i]).collect();

    if unused.is_empty() {
        return log_choice(hand, lowest(hand, round, &all), DiscardReason::AllMelded);
    }
    if unused.len() == hand.len() {
        return log_choice(
            hand,
            without_melds(hand, round, &all, is_final_turn),
            DiscardReason::NoMelds,
        );
    }

    let keeps_meld: Vec<usize> = unused
        .iter()
        .copied()
        .filter(|&i| !find_melds(without(hand, i).cards(), round).is_empty())
        .collect();
    let (wild, natural) = split_wild(hand, round, &keeps_meld);
    let choice = highest(hand, round, &natural).or_else(|| lowest(hand, round, &wild));
    if choice.is_some() {
        return log_choice(hand, choice, DiscardReason::KeepsMeld);
    }

    let (wild, natural) = split_wild(hand, round, &unused);
    let choice = highest(hand, round, &natural)
        .or_else(|| lowest(hand, round, &wild))
        .or(Some(0));
    log_choice(hand, choice, DiscardReason::Fallback)
}

fn log_choice(
    hand: &[Card],
    choice: Option<usize>,
    reason: DiscardReason,
) -> Option<DiscardSuggestion> {
    let suggestion = choice.map(|index| DiscardSuggestion::at(hand, index, reason));
    if let Some(s) = &suggestion {
        debug!(index = s.index, card = %s.card, ?reason, "discard suggested");
    }
    suggestion
}

/// Discard choice when melds don't constrain it
fn without_melds(
    hand: &[Card],
    round: Round,
    candidates: &[usize],
    is_final_turn: bool,
) -> Option<usize> {
    if is_final_turn {
        return highest(hand, round, candidates);
    }
    let (wild, natural) = split_wild(hand, round, candidates);
    highest(hand, round, &natural).or_else(|| lowest(hand, round, &wild))
}

/// Mark hand instances consumed by the selected melds.
///
/// Counts how many of each card value the melds use and marks that many
/// instances in hand order, so duplicates split correctly between used and unused.
fn used_instances(hand: &[Card], melds: &[Meld]) -> Vec<bool> {
    let selection = select_best(hand, melds);

    let mut needed: HashMap<Card, usize> = HashMap::new();
    for meld in &selection.melds {
        for card in &meld.cards {
            *needed.entry(*card).or_insert(0) += 1;
        }
    }

    hand.iter()
        .map(|card| match needed.get_mut(card) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        })
        .collect()
}

fn without(hand: &[Card], index: usize) -> Hand {
    let mut rest = Hand::from(hand.to_vec());
    rest.remove(index);
    rest
}

/// Split candidate indices into (wild, non-wild)
fn split_wild(hand: &[Card], round: Round, candidates: &[usize]) -> (Vec<usize>, Vec<usize>) {
    candidates.iter().copied().partition(|&i| hand[i].is_wild(round))
}

/// Highest point value among candidates; ties go to the earliest
fn highest(hand: &[Card], round: Round, candidates: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &i in candidates {
        if best.is_none_or(|b| hand[i].points(round) > hand[b].points(round)) {
            best = Some(i);
        }
    }
    best
}

/// Lowest point value among candidates; ties go to the earliest
fn lowest(hand: &[Card], round: Round, candidates: &[usize]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &i in candidates {
        if best.is_none_or(|b| hand[i].points(round) < hand[b].points(round)) {
            best = Some(i);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards;

    fn round(rank: u8) -> Round {
        Round::new(rank).unwrap()
    }

    fn suggest(hand: &str, rank: u8, is_final_turn: bool) -> Option<DiscardSuggestion> {
        let hand = cards(hand);
        let melds = find_melds(&hand, round(rank));
        suggest_discard(&hand, round(rank), &melds, is_final_turn)
    }

    #[test]
    fn test_empty_hand() {
        assert_eq!(suggest_discard(&[], round(7), &[], false), None);
    }

    #[test]
    fn test_go_out_dominates() {
        let s = suggest("d4 d5 d6 s9", 13, false).unwrap();
        assert_eq!(s.index, 3);
        assert_eq!(s.card, Card::from_string("s9").unwrap());
        assert_eq!(s.reason, DiscardReason::GoOut);
    }

    #[test]
    fn test_final_turn_discards_joker() {
        let s = suggest("cK jk", 7, true).unwrap();
        assert_eq!(s.card, Card::joker());
        assert_eq!(s.reason, DiscardReason::NoMelds);
    }

    #[test]
    fn test_non_final_turn_keeps_wilds() {
        let s = suggest("cK jk", 7, false).unwrap();
        assert_eq!(s.card, Card::from_string("cK").unwrap());
    }

    #[test]
    fn test_all_wild_hand_discards_cheapest_wild() {
        let s = suggest("jk h7", 7, false).unwrap();
        assert_eq!(s.index, 1);
    }

    #[test]
    fn test_no_melds_highest_non_wild() {
        let s = suggest("c4 dQ h9 s5 jk", 7, false).unwrap();
        assert_eq!(s.card, Card::from_string("dQ").unwrap());
        assert_eq!(s.reason, DiscardReason::NoMelds);
    }

    #[test]
    fn test_all_melded_discards_cheapest() {
        let s = suggest("h5 h6 h4 c9 d9 s9", 12, false).unwrap();
        assert_eq!(s.card, Card::from_string("h4").unwrap());
        assert_eq!(s.index, 2);
        assert_eq!(s.reason, DiscardReason::AllMelded);
    }

    #[test]
    fn test_discards_unused_high_card() {
        let s = suggest("h4 h5 h6 cK d8", 10, false).unwrap();
        assert_eq!(s.card, Card::from_string("cK").unwrap());
        assert_eq!(s.reason, DiscardReason::KeepsMeld);
    }

    #[test]
    fn test_external_melds_leave_wild_unused() {
        let hand = cards("cJ dJ sJ jk h4 h9");
        let melds = vec![Meld::from_string("book cJ dJ sJ").unwrap()];
        let s = suggest_discard(&hand, round(7), &melds, false).unwrap();

        assert_eq!(s.card, Card::from_string("h9").unwrap());
        assert_eq!(s.reason, DiscardReason::KeepsMeld);
    }

    #[test]
    fn test_melds_that_match_nothing_count_as_no_melds() {
        let hand = cards("c4 dQ h9 s5");
        let melds = vec![Meld::from_string("run t3 t4 t5").unwrap()];
        let s = suggest_discard(&hand, round(7), &melds, false).unwrap();

        assert_eq!(s.card, Card::from_string("dQ").unwrap());
        assert_eq!(s.reason, DiscardReason::NoMelds);
    }

    #[test]
    fn test_fallback_when_no_discard_keeps_a_meld() {
        let hand = cards("c5 d6 h7 sK");
        let melds = vec![Meld::from_string("book c5 d6 h7").unwrap()];
        let s = suggest_discard(&hand, round(9), &melds, false).unwrap();

        assert_eq!(s.index, 3);
        assert_eq!(s.card, Card::from_string("sK").unwrap());
        assert_eq!(s.reason, DiscardReason::Fallback);
    }

    #[test]
    fn test_keeps_meld_falls_back_to_cheapest_wild() {
        // Kings wild: the clubs run uses every natural card, only jokers are spare
        let s = suggest("c3 c4 c5 c6 c7 c8 c9 c10 cJ cQ cK jk jk", 13, false).unwrap();

        assert_eq!(s.index, 11);
        assert_eq!(s.card, Card::joker());
        assert_eq!(s.reason, DiscardReason::KeepsMeld);
    }

    #[test]
    fn test_duplicate_instances_split_between_used_and_unused() {
        let hand = cards("c8 c8 d8 h8");
        let melds = vec![Meld::from_string("book c8 d8 h8").unwrap()];
        let used = used_instances(&hand, &melds);
        assert_eq!(used, vec![true, false, true, true]);
    }

    #[test]
    fn test_tie_breaks_prefer_earliest() {
        let hand = cards("h9 c9 jk jk");
        let r = round(5);
        assert_eq!(highest(&hand, r, &[0, 1]), Some(0));
        assert_eq!(lowest(&hand, r, &[2, 3]), Some(2));
        assert_eq!(highest(&hand, r, &[]), None);
    }

    #[test]
    fn test_split_wild() {
        let hand = cards("h9 h5 jk c5");
        let (wild, natural) = split_wild(&hand, round(5), &[0, 1, 2, 3]);
        assert_eq!(wild, vec![1, 2, 3]);
        assert_eq!(natural, vec![0]);
    }
}
