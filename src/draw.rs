use crate::{AdvisorConfig, Card, Hand, Meld, Round, find_melds, select_best};
use tracing::debug;

/// What to do with the card on top of the discard pile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawAction {
    /// Take the discard
    Take,
    /// Draw blind from the deck
    Skip,
    /// No strong preference
    Maybe,
}

/// A draw recommendation with the figures it was based on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawRecommendation {
    pub action: DrawAction,
    pub reasoning: String,
    /// Unmelded points in the current hand
    pub points_before: u32,
    /// Unmelded points if the candidate were added
    pub points_after: u32,
    pub melded_before: usize,
    pub melded_after: usize,
}

/// Decide whether to take `candidate` from the discard pile.
///
/// The hand is re-evaluated with the candidate added; the comparison uses the
/// unmelded point totals before and after. `current_melds` are the melds the
/// caller already holds for `hand`.
pub fn recommend_draw(
    candidate: Card,
    hand: &[Card],
    round: Round,
    current_melds: &[Meld],
    config: &AdvisorConfig,
) -> DrawRecommendation {
    let before = select_best(hand, current_melds);

    let mut hypothetical = Hand::from_cards(hand.to_vec());
    hypothetical.add(candidate);
    let melds = find_melds(hypothetical.cards(), round);
    let after = select_best(hypothetical.cards(), &melds);

    let points_before = before.leftover_points(round);
    let points_after = after.leftover_points(round);
    let value = candidate.points(round);
    let improves = after.used_count > before.used_count;

    let (action, reasoning) = if candidate.is_wild(round) {
        (
            DrawAction::Take,
            format!("{} is wild and fits any meld", candidate),
        )
    } else if improves && points_after < points_before {
        (
            DrawAction::Take,
            format!(
                "{} completes melds, unmelded points drop from {} to {}",
                candidate, points_before, points_after
            ),
        )
    } else if improves {
        let action = if value <= config.take_low_value_max {
            DrawAction::Take
        } else {
            DrawAction::Maybe
        };
        (
            action,
            format!(
                "{} melds {} more cards but unmelded points stay at {}",
                candidate,
                after.used_count - before.used_count,
                points_after
            ),
        )
    } else if value <= config.maybe_low_value_max {
        (
            DrawAction::Maybe,
            format!("{} does not meld but is only worth {}", candidate, value),
        )
    } else if value >= config.skip_high_value_min {
        (
            DrawAction::Skip,
            format!("{} does not meld and is worth {}", candidate, value),
        )
    } else {
        (
            DrawAction::Maybe,
            format!("{} does not meld yet", candidate),
        )
    };

    debug!(
        card = %candidate,
        ?action,
        points_before,
        points_after,
        "draw recommendation"
    );

    DrawRecommendation {
        action,
        reasoning,
        points_before,
        points_after,
        melded_before: before.used_count,
        melded_after: after.used_count,
    }
}
