use crate::{
    Card, DiscardSuggestion, Meld, Round, can_all_cards_form_melds, find_go_out_discard,
    find_melds, select_best, suggest_discard,
};

/// Everything the table layer needs to show for a hand in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandAnalysis {
    /// Non-overlapping melds chosen from the hand
    pub melds: Vec<Meld>,
    /// Cards not covered by `melds`
    pub leftover: Vec<Card>,
    pub leftover_points: u32,
    /// Every card is already covered by melds
    pub all_melded: bool,
    /// Hand index whose discard lets the player go out
    pub go_out_discard: Option<usize>,
    pub discard: Option<DiscardSuggestion>,
}

impl HandAnalysis {
    /// True if the player can end the round with a discard
    pub fn can_go_out(&self) -> bool {
        self.go_out_discard.is_some()
    }
}

/// Analyze a hand: melds, leftovers, go-out check and discard suggestion.
pub fn analyze_hand(hand: &[Card], round: Round, is_final_turn: bool) -> HandAnalysis {
    let candidates = find_melds(hand, round);
    let selection = select_best(hand, &candidates);
    let leftover_points = selection.leftover_points(round);

    HandAnalysis {
        all_melded: can_all_cards_form_melds(hand, round),
        go_out_discard: find_go_out_discard(hand, round),
        discard: suggest_discard(hand, round, &candidates, is_final_turn),
        melds: selection.melds,
        leftover: selection.leftover,
        leftover_points,
    }
}
