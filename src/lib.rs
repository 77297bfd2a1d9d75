use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub mod analysis;
pub mod config;
pub mod discard;
pub mod draw;
pub mod enumerator;
pub mod go_out;
pub mod selector;
#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use analysis::{HandAnalysis, analyze_hand};
pub use config::AdvisorConfig;
pub use discard::{DiscardReason, DiscardSuggestion, suggest_discard};
pub use draw::{DrawAction, DrawRecommendation, recommend_draw};
pub use enumerator::find_melds;
pub use go_out::{can_all_cards_form_melds, can_go_out_with_hand, find_go_out_discard};
pub use selector::{Selection, select_best};

/// Lowest rank in the deck.
pub const MIN_RANK: u8 = 3;
/// Highest rank in the deck (King).
pub const MAX_RANK: u8 = 13;
/// Minimum number of cards in any meld.
pub const MIN_MELD_LEN: usize = 3;

/// Errors produced while parsing cards, hands, melds and rounds.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("invalid card string: {0:?}")]
    InvalidCard(String),
    #[error("invalid suit: {0:?}")]
    InvalidSuit(String),
    #[error("invalid rank: {0:?}")]
    InvalidRank(String),
    #[error("invalid meld: {0}")]
    InvalidMeld(String),
    #[error("round number must be 1-11, got {0}")]
    InvalidRoundNumber(u8),
    #[error("wild rank must be 3-13, got {0}")]
    InvalidWildRank(u8),
}

/// The five Five Crowns suits. Suits carry no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
    Stars,
}

impl Suit {
    pub const ALL: [Suit; 5] = [
        Suit::Clubs,
        Suit::Diamonds,
        Suit::Hearts,
        Suit::Spades,
        Suit::Stars,
    ];

    fn index(self) -> u8 {
        match self {
            Suit::Clubs => 0,
            Suit::Diamonds => 1,
            Suit::Hearts => 2,
            Suit::Spades => 3,
            Suit::Stars => 4,
        }
    }

    fn from_index(index: u8) -> Option<Suit> {
        Suit::ALL.get(index as usize).copied()
    }

    pub fn letter(self) -> char {
        match self {
            Suit::Clubs => 'c',
            Suit::Diamonds => 'd',
            Suit::Hearts => 'h',
            Suit::Spades => 's',
            Suit::Stars => 't',
        }
    }

    pub fn from_letter(c: char) -> Option<Suit> {
        match c.to_ascii_lowercase() {
            'c' => Some(Suit::Clubs),
            'd' => Some(Suit::Diamonds),
            'h' => Some(Suit::Hearts),
            's' => Some(Suit::Spades),
            't' => Some(Suit::Stars),
            _ => None,
        }
    }
}

/// A card represented as a u8.
/// - Bits 0-2: Suit (0-4)
/// - Bits 3-6: Rank (3-13, J = 11, Q = 12, K = 13)
/// - All 1s (0xFF): Joker
///
/// Cards are plain values: two physically distinct cards of the same suit and
/// rank compare equal. Instance identity is tracked by hand slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Card(u8);

impl Card {
    const SUIT_MASK: u8 = 0b0000_0111;
    const RANK_MASK: u8 = 0b0111_1000;
    const RANK_SHIFT: u8 = 3;
    const JOKER: u8 = 0xFF;

    /// Create a new card from a suit and rank (3-13)
    pub fn new(suit: Suit, rank: u8) -> Self {
        assert!(
            (MIN_RANK..=MAX_RANK).contains(&rank),
            "Rank must be 3-13"
        );
        Card((rank << Self::RANK_SHIFT) | suit.index())
    }

    /// Create a joker
    pub fn joker() -> Self {
        Card(Self::JOKER)
    }

    /// Get the suit, or None for a joker
    pub fn suit(&self) -> Option<Suit> {
        if self.is_joker() {
            None
        } else {
            Suit::from_index(self.0 & Self::SUIT_MASK)
        }
    }

    /// Get the rank (3-13), or None for a joker
    pub fn rank(&self) -> Option<u8> {
        if self.is_joker() {
            None
        } else {
            Some((self.0 & Self::RANK_MASK) >> Self::RANK_SHIFT)
        }
    }

    pub fn is_joker(&self) -> bool {
        self.0 == Self::JOKER
    }

    /// A card is wild if it is a joker or carries the round's wild rank.
    pub fn is_wild(&self, round: Round) -> bool {
        self.is_joker() || self.rank() == Some(round.wild_rank())
    }

    /// Point value of the card when left in hand at the end of a round.
    pub fn points(&self, round: Round) -> u32 {
        if self.is_joker() {
            50
        } else if self.is_wild(round) {
            20
        } else {
            self.rank().map_or(0, u32::from)
        }
    }

    /// Parse a card from a string representation
    /// Format: "h10" (ten of hearts), "sQ" (queen of spades), "t3" (three of stars), "jk" (joker)
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("jk") {
            return Ok(Card::joker());
        }

        let mut chars = s.chars();
        let suit_char = chars
            .next()
            .ok_or_else(|| ParseError::InvalidCard(s.to_string()))?;
        let suit = Suit::from_letter(suit_char)
            .ok_or_else(|| ParseError::InvalidSuit(suit_char.to_string()))?;

        let rank_str = chars.as_str();
        if rank_str.is_empty() {
            return Err(ParseError::InvalidCard(s.to_string()));
        }
        let rank = parse_rank(rank_str)?;

        Ok(Card::new(suit, rank))
    }
}

fn parse_rank(s: &str) -> Result<u8, ParseError> {
    let rank = match s.to_ascii_uppercase().as_str() {
        "J" => 11,
        "Q" => 12,
        "K" => 13,
        other => other
            .parse::<u8>()
            .map_err(|_| ParseError::InvalidRank(s.to_string()))?,
    };
    if !(MIN_RANK..=MAX_RANK).contains(&rank) {
        return Err(ParseError::InvalidRank(s.to_string()));
    }
    Ok(rank)
}

/// Display label of a rank: numbers as-is, 11-13 as J/Q/K.
pub fn rank_label(rank: u8) -> String {
    match rank {
        11 => "J".to_string(),
        12 => "Q".to_string(),
        13 => "K".to_string(),
        n => n.to_string(),
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.suit(), self.rank()) {
            (Some(suit), Some(rank)) => write!(f, "{}{}", suit.letter(), rank_label(rank)),
            _ => write!(f, "jk"),
        }
    }
}

impl FromStr for Card {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Card::from_string(s)
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Card {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Card::from_string(&s).map_err(serde::de::Error::custom)
    }
}

/// The active round. Only its wild rank matters to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Round(u8);

impl Round {
    /// Create a round from its wild rank (3-13)
    pub fn new(wild_rank: u8) -> Result<Self, ParseError> {
        if (MIN_RANK..=MAX_RANK).contains(&wild_rank) {
            Ok(Round(wild_rank))
        } else {
            Err(ParseError::InvalidWildRank(wild_rank))
        }
    }

    /// Create a round from its number in the game (1-11). Round 1 has 3s wild.
    pub fn from_number(number: u8) -> Result<Self, ParseError> {
        if (1..=11).contains(&number) {
            Ok(Round(number + 2))
        } else {
            Err(ParseError::InvalidRoundNumber(number))
        }
    }

    /// Parse a round from its wild rank label ("3".."10", "J", "Q", "K")
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        parse_rank(s.trim()).map(Round)
    }

    pub fn wild_rank(&self) -> u8 {
        self.0
    }

    /// Round number in the game (1-11)
    pub fn number(&self) -> u8 {
        self.0 - 2
    }

    /// Number of cards dealt in this round
    pub fn hand_size(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {} ({}s wild)", self.number(), rank_label(self.0))
    }
}

/// Sum of the point values of the given cards.
pub fn hand_points(cards: &[Card], round: Round) -> u32 {
    cards.iter().map(|c| c.points(round)).sum()
}

/// Type of meld in Five Crowns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeldType {
    /// Same rank, any suits
    Book,
    /// Consecutive ranks, same suit
    Run,
}

/// A meld formed from hand cards.
///
/// `slots` holds the hand index of each card when the meld was built by the
/// engine. Melds constructed by callers may leave it empty; the selector then
/// matches their cards by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Meld {
    pub meld_type: MeldType,
    pub cards: VecDeque<Card>,
    pub slots: Vec<usize>,
}

impl Meld {
    /// Create a meld with no slot information
    pub fn new(meld_type: MeldType, cards: VecDeque<Card>) -> Self {
        Meld {
            meld_type,
            cards,
            slots: Vec::new(),
        }
    }

    /// Create a meld from hand slots, reading the cards out of `hand`
    pub fn from_slots(meld_type: MeldType, hand: &[Card], slots: Vec<usize>) -> Self {
        let cards = slots.iter().map(|&i| hand[i]).collect();
        Meld {
            meld_type,
            cards,
            slots,
        }
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Order-independent set of hand slots used by this meld
    pub fn signature(&self) -> Vec<usize> {
        let mut sig = self.slots.clone();
        sig.sort_unstable();
        sig
    }

    /// Parse a meld: "book c5 d5 jk" or "run h3 h4 h5"
    pub fn from_string(input: &str) -> Result<Self, ParseError> {
        let mut tokens = input.split_whitespace();
        let meld_type = match tokens.next().map(str::to_ascii_lowercase).as_deref() {
            Some("book") => MeldType::Book,
            Some("run") => MeldType::Run,
            _ => {
                return Err(ParseError::InvalidMeld(format!(
                    "'{}' must start with 'book' or 'run'",
                    input
                )));
            }
        };

        let cards = tokens
            .map(Card::from_string)
            .collect::<Result<VecDeque<_>, _>>()?;
        if cards.len() < MIN_MELD_LEN {
            return Err(ParseError::InvalidMeld(format!(
                "meld must have at least 3 cards, got {}",
                cards.len()
            )));
        }

        Ok(Meld::new(meld_type, cards))
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.meld_type {
            MeldType::Book => "book",
            MeldType::Run => "run",
        };
        write!(f, "{}", kind)?;
        for card in &self.cards {
            write!(f, " {}", card)?;
        }
        Ok(())
    }
}

/// A player's hand: an ordered list of card instances. Duplicates are expected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hand(Vec<Card>);

impl Hand {
    pub fn from_cards(cards: Vec<Card>) -> Self {
        Hand(cards)
    }

    /// Add a card to the end of the hand
    pub fn add(&mut self, card: Card) {
        self.0.push(card);
    }

    /// Remove the card at `index`, if present
    pub fn remove(&mut self, index: usize) -> Option<Card> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn points(&self, round: Round) -> u32 {
        hand_points(&self.0, round)
    }

    /// Parse a hand from whitespace- or comma-separated card strings: "c3 h10, jk"
    pub fn from_string(input: &str) -> Result<Self, ParseError> {
        input
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(Card::from_string)
            .collect::<Result<Vec<_>, _>>()
            .map(Hand)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<String> = self.0.iter().map(Card::to_string).collect();
        write!(f, "{}", labels.join(" "))
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand(cards)
    }
}

/// Test helper: parse a hand string, panicking on bad input.
#[cfg(test)]
pub(crate) fn cards(input: &str) -> Vec<Card> {
    Hand::from_string(input).unwrap().cards().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_from_string() {
        assert_eq!(Card::from_string("h10").unwrap(), Card::new(Suit::Hearts, 10));
        assert_eq!(Card::from_string("c3").unwrap(), Card::new(Suit::Clubs, 3));
        assert_eq!(Card::from_string("sQ").unwrap(), Card::new(Suit::Spades, 12));
        assert_eq!(Card::from_string("tk").unwrap(), Card::new(Suit::Stars, 13));
        assert_eq!(Card::from_string("dJ").unwrap(), Card::new(Suit::Diamonds, 11));
        assert_eq!(Card::from_string("JK").unwrap(), Card::joker());

        assert!(Card::from_string("x5").is_err());
        assert!(Card::from_string("h2").is_err());
        assert!(Card::from_string("h14").is_err());
        assert!(Card::from_string("").is_err());
        assert!(Card::from_string("h").is_err());
    }

    #[test]
    fn test_card_to_string() {
        assert_eq!(Card::new(Suit::Hearts, 10).to_string(), "h10");
        assert_eq!(Card::new(Suit::Stars, 13).to_string(), "tK");
        assert_eq!(Card::new(Suit::Clubs, 3).to_string(), "c3");
        assert_eq!(Card::joker().to_string(), "jk");
    }

    #[test]
    fn test_card_accessors() {
        let card = Card::new(Suit::Diamonds, 12);
        assert_eq!(card.suit(), Some(Suit::Diamonds));
        assert_eq!(card.rank(), Some(12));
        assert!(!card.is_joker());

        let joker = Card::joker();
        assert_eq!(joker.suit(), None);
        assert_eq!(joker.rank(), None);
    }

    #[test]
    fn test_wild_predicate() {
        let round = Round::new(7).unwrap();
        assert!(Card::joker().is_wild(round));
        assert!(Card::new(Suit::Spades, 7).is_wild(round));
        assert!(Card::new(Suit::Stars, 7).is_wild(round));
        assert!(!Card::new(Suit::Spades, 8).is_wild(round));
    }

    #[test]
    fn test_point_values() {
        let round = Round::new(7).unwrap();
        assert_eq!(Card::joker().points(round), 50);
        assert_eq!(Card::new(Suit::Hearts, 7).points(round), 20);
        assert_eq!(Card::new(Suit::Hearts, 11).points(round), 11);
        assert_eq!(Card::new(Suit::Hearts, 13).points(round), 13);
        assert_eq!(Card::new(Suit::Hearts, 4).points(round), 4);

        let king_round = Round::new(13).unwrap();
        assert_eq!(Card::new(Suit::Clubs, 13).points(king_round), 20);
    }

    #[test]
    fn test_round_numbering() {
        let first = Round::from_number(1).unwrap();
        assert_eq!(first.wild_rank(), 3);
        assert_eq!(first.hand_size(), 3);

        let last = Round::from_number(11).unwrap();
        assert_eq!(last.wild_rank(), 13);
        assert_eq!(last.hand_size(), 13);
        assert_eq!(last.number(), 11);

        assert_eq!(Round::from_number(0), Err(ParseError::InvalidRoundNumber(0)));
        assert_eq!(Round::from_number(12), Err(ParseError::InvalidRoundNumber(12)));
        assert_eq!(Round::new(2), Err(ParseError::InvalidWildRank(2)));
        assert_eq!(Round::from_string("Q").unwrap().wild_rank(), 12);
    }

    #[test]
    fn test_hand_from_string_keeps_duplicates() {
        let hand = Hand::from_string("c3, c3 c3  jk").unwrap();
        assert_eq!(hand.len(), 4);
        assert_eq!(hand.cards()[0], hand.cards()[1]);
        assert_eq!(hand.to_string(), "c3 c3 c3 jk");
    }

    #[test]
    fn test_hand_add_and_remove() {
        let mut hand = Hand::from_cards(cards("c3 h4"));
        hand.add(Card::joker());
        assert_eq!(hand.to_string(), "c3 h4 jk");

        assert_eq!(hand.remove(1), Some(Card::from_string("h4").unwrap()));
        assert_eq!(hand.remove(5), None);
        assert_eq!(hand, Hand::from(cards("c3 jk")));
    }

    #[test]
    fn test_hand_points() {
        let round = Round::new(7).unwrap();
        let hand = Hand::from_string("cK jk h7 d4").unwrap();
        assert_eq!(hand.points(round), 13 + 50 + 20 + 4);
    }

    #[test]
    fn test_meld_from_string() {
        let meld = Meld::from_string("run h3 h4 jk").unwrap();
        assert_eq!(meld.meld_type, MeldType::Run);
        assert_eq!(meld.len(), 3);
        assert!(meld.slots.is_empty());
        assert_eq!(meld.to_string(), "run h3 h4 jk");

        assert!(Meld::from_string("book c5 d5").is_err());
        assert!(Meld::from_string("pile c5 d5 h5").is_err());
    }

    #[test]
    fn test_card_serde_uses_text_form() {
        let json = serde_json::to_string(&Card::new(Suit::Spades, 11)).unwrap();
        assert_eq!(json, "\"sJ\"");
        let card: Card = serde_json::from_str("\"jk\"").unwrap();
        assert_eq!(card, Card::joker());
        assert!(serde_json::from_str::<Card>("\"z9\"").is_err());
    }
}
