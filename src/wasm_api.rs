//! JSON bridge for browser callers.
//!
//! Hand input is forgiving: anything that is not an array of strings is an empty
//! hand, and entries that are not strings or do not name a card are skipped with
//! a console warning. Only an out-of-range wild rank, an unreadable draw
//! candidate or bad config JSON produce an error result.

use crate::{
    AdvisorConfig, Card, DrawAction, Meld, MeldType, Round, analysis, discard::DiscardReason,
    draw,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

/// Initialize panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// JSON-serializable representation of a meld
#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MeldJson {
    #[serde(rename = "book")]
    Book { cards: Vec<Card>, slots: Vec<usize> },
    #[serde(rename = "run")]
    Run { cards: Vec<Card>, slots: Vec<usize> },
}

/// JSON-serializable discard suggestion
#[derive(Serialize, Deserialize)]
pub struct DiscardJson {
    pub index: usize,
    pub card: Card,
    pub reason: String,
}

/// Result of a hand analysis
#[derive(Serialize, Deserialize, Default)]
pub struct AnalysisResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub melds: Vec<MeldJson>,
    pub leftover: Vec<Card>,
    pub leftover_points: u32,
    pub all_melded: bool,
    pub can_go_out: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_out_discard: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discard: Option<DiscardJson>,
}

/// Result of a draw recommendation
#[derive(Serialize, Deserialize, Default)]
pub struct DrawResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    pub reasoning: String,
    pub points_before: u32,
    pub points_after: u32,
}

/// Analyze a Five Crowns hand
///
/// # Arguments
/// * `hand_cards` - JSON array of card strings (e.g., ["h5", "c10", "jk"])
/// * `wild_rank` - The round's wild rank (3-13)
/// * `is_final_turn` - Whether another player has already gone out
///
/// # Returns
/// JSON string with AnalysisResult
#[wasm_bindgen]
pub fn analyze_five_crowns_hand(hand_cards: &str, wild_rank: u8, is_final_turn: bool) -> String {
    let hand = parse_hand_json(hand_cards);
    let result = analysis_internal(&hand, wild_rank, is_final_turn)
        .unwrap_or_else(|e| AnalysisResult {
            error: Some(e),
            ..AnalysisResult::default()
        });
    to_json(&result)
}

/// Same as `analyze_five_crowns_hand`, taking a JS array of card strings directly
#[wasm_bindgen]
pub fn analyze_five_crowns_hand_array(
    hand_cards: js_sys::Array,
    wild_rank: u8,
    is_final_turn: bool,
) -> String {
    let tokens: Vec<String> = hand_cards.iter().filter_map(|v| v.as_string()).collect();
    if tokens.len() != hand_cards.length() as usize {
        warn("non-string entries in hand array were ignored");
    }
    let hand = parse_cards(&tokens);
    let result = analysis_internal(&hand, wild_rank, is_final_turn)
        .unwrap_or_else(|e| AnalysisResult {
            error: Some(e),
            ..AnalysisResult::default()
        });
    to_json(&result)
}

/// Recommend whether to take a discard
///
/// # Arguments
/// * `candidate` - Card string on top of the discard pile
/// * `hand_cards` - JSON array of card strings
/// * `wild_rank` - The round's wild rank (3-13)
/// * `config` - Optional AdvisorConfig JSON; empty string uses defaults
#[wasm_bindgen]
pub fn recommend_five_crowns_draw(
    candidate: &str,
    hand_cards: &str,
    wild_rank: u8,
    config: &str,
) -> String {
    let result = draw_internal(candidate, hand_cards, wild_rank, config).unwrap_or_else(|e| {
        DrawResult {
            error: Some(e),
            ..DrawResult::default()
        }
    });
    to_json(&result)
}

fn analysis_internal(
    hand: &[Card],
    wild_rank: u8,
    is_final_turn: bool,
) -> Result<AnalysisResult, String> {
    let round = Round::new(wild_rank).map_err(|e| e.to_string())?;
    let analysis = analysis::analyze_hand(hand, round, is_final_turn);

    Ok(AnalysisResult {
        success: true,
        error: None,
        can_go_out: analysis.can_go_out(),
        melds: analysis.melds.iter().map(meld_to_json).collect(),
        leftover: analysis.leftover,
        leftover_points: analysis.leftover_points,
        all_melded: analysis.all_melded,
        go_out_discard: analysis.go_out_discard,
        discard: analysis.discard.map(|d| DiscardJson {
            index: d.index,
            card: d.card,
            reason: reason_name(d.reason).to_string(),
        }),
    })
}

fn draw_internal(
    candidate: &str,
    hand_cards: &str,
    wild_rank: u8,
    config: &str,
) -> Result<DrawResult, String> {
    let round = Round::new(wild_rank).map_err(|e| e.to_string())?;
    let candidate = Card::from_string(candidate).map_err(|e| e.to_string())?;
    let hand = parse_hand_json(hand_cards);
    let config = if config.trim().is_empty() {
        AdvisorConfig::default()
    } else {
        AdvisorConfig::from_json(config).map_err(|e| format!("Invalid config JSON: {}", e))?
    };

    let melds = crate::find_melds(&hand, round);
    let rec = draw::recommend_draw(candidate, &hand, round, &melds, &config);

    let action = match rec.action {
        DrawAction::Take => "take",
        DrawAction::Skip => "skip",
        DrawAction::Maybe => "maybe",
    };

    Ok(DrawResult {
        success: true,
        error: None,
        action: Some(action.to_string()),
        reasoning: rec.reasoning,
        points_before: rec.points_before,
        points_after: rec.points_after,
    })
}

/// Parse a JSON array of card strings
fn parse_hand_json(hand_cards: &str) -> Vec<Card> {
    match serde_json::from_str::<Vec<String>>(hand_cards) {
        Ok(tokens) => parse_cards(&tokens),
        Err(e) => {
            warn(&format!("hand is not a JSON array of strings ({}), using empty hand", e));
            Vec::new()
        }
    }
}

fn parse_cards(tokens: &[String]) -> Vec<Card> {
    tokens
        .iter()
        .filter_map(|t| match Card::from_string(t) {
            Ok(card) => Some(card),
            Err(e) => {
                warn(&format!("skipping hand entry {:?}: {}", t, e));
                None
            }
        })
        .collect()
}

/// Convert internal Meld to JSON representation
fn meld_to_json(meld: &Meld) -> MeldJson {
    let cards: Vec<Card> = meld.cards.iter().copied().collect();
    let slots = meld.slots.clone();

    match meld.meld_type {
        MeldType::Book => MeldJson::Book { cards, slots },
        MeldType::Run => MeldJson::Run { cards, slots },
    }
}

fn reason_name(reason: DiscardReason) -> &'static str {
    match reason {
        DiscardReason::GoOut => "go_out",
        DiscardReason::NoMelds => "no_melds",
        DiscardReason::AllMelded => "all_melded",
        DiscardReason::KeepsMeld => "keeps_meld",
        DiscardReason::Fallback => "fallback",
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| format!(r#"{{"success":false,"error":"Serialization error: {}"}}"#, e))
}

fn warn(message: &str) {
    web_sys::console::warn_1(&JsValue::from_str(message));
}

/// Get the git commit hash that this WASM module was built from
///
/// Returns the first 8 characters of the commit hash, or "unknown" if not available
#[wasm_bindgen]
pub fn get_build_commit() -> String {
    env!("BUILD_COMMIT").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn test_analyze_reports_go_out() {
        let json = analyze_five_crowns_hand(r#"["d4", "d5", "d6", "s9"]"#, 13, false);
        let result: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert!(result.success);
        assert!(result.can_go_out);
        assert_eq!(result.go_out_discard, Some(3));
        assert_eq!(result.discard.unwrap().reason, "go_out");
    }

    #[wasm_bindgen_test]
    fn test_malformed_hand_is_empty() {
        let json = analyze_five_crowns_hand(r#"{"not": "a hand"}"#, 7, false);
        let result: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert!(result.success);
        assert!(result.melds.is_empty());
        assert!(result.discard.is_none());
    }

    #[wasm_bindgen_test]
    fn test_unknown_card_tokens_are_skipped() {
        let json = analyze_five_crowns_hand(r#"["d4", "zz", "d5", "d6", "s9"]"#, 13, false);
        let result: AnalysisResult = serde_json::from_str(&json).unwrap();

        assert!(result.success);
        assert_eq!(result.go_out_discard, Some(3));
    }

    #[wasm_bindgen_test]
    fn test_array_entry_skips_bad_entries_like_json_entry() {
        let hand = js_sys::Array::new();
        for token in ["d4", "zz", "d5", "d6", "s9"] {
            hand.push(&JsValue::from_str(token));
        }
        hand.push(&JsValue::from_f64(7.0));

        let from_array = analyze_five_crowns_hand_array(hand, 13, false);
        let from_json = analyze_five_crowns_hand(r#"["d4", "zz", "d5", "d6", "s9"]"#, 13, false);
        assert_eq!(from_array, from_json);
    }

    #[wasm_bindgen_test]
    fn test_draw_skips_unknown_hand_tokens() {
        let json = recommend_five_crowns_draw("h9", r#"["c4", "x1", "dQ"]"#, 7, "");
        let result: DrawResult = serde_json::from_str(&json).unwrap();
        assert!(result.success);
        assert_eq!(result.points_before, 4 + 12);
    }

    #[wasm_bindgen_test]
    fn test_bad_round_is_error() {
        let json = analyze_five_crowns_hand(r#"["d4"]"#, 2, false);
        let result: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert!(!result.success);
        assert!(result.error.is_some());
    }

    #[wasm_bindgen_test]
    fn test_draw_wild_is_take() {
        let json = recommend_five_crowns_draw("jk", r#"["c4", "dQ"]"#, 7, "");
        let result: DrawResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result.action.as_deref(), Some("take"));
    }
}
