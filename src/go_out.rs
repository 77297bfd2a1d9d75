use crate::{Card, Hand, MIN_MELD_LEN, Round, find_melds, select_best};
use tracing::debug;

/// True if the whole hand can be laid down as melds.
pub fn can_all_cards_form_melds(hand: &[Card], round: Round) -> bool {
    if hand.is_empty() {
        return false;
    }
    let melds = find_melds(hand, round);
    if melds.is_empty() {
        return false;
    }
    select_best(hand, &melds).is_complete()
}

/// True if discarding the card at `discard_index` leaves a hand that melds completely.
///
/// A remainder of fewer than three cards can never be fully melded.
pub fn can_go_out_with_hand(hand: &[Card], round: Round, discard_index: usize) -> bool {
    let mut remainder = Hand::from(hand.to_vec());
    if remainder.remove(discard_index).is_none() || remainder.len() < MIN_MELD_LEN {
        return false;
    }

    can_all_cards_form_melds(remainder.cards(), round)
}

/// Hand index of the first card whose discard lets the player go out.
pub fn find_go_out_discard(hand: &[Card], round: Round) -> Option<usize> {
    let found = (0..hand.len()).find(|&i| can_go_out_with_hand(hand, round, i));
    if let Some(index) = found {
        debug!(index, card = %hand[index], "go-out discard found");
    }
    found
}
