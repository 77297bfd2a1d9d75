use five_crowns_melds::{
    AdvisorConfig, Card, Hand, Round, find_melds, recommend_draw, select_best, suggest_discard,
};

fn main() {
    println!("Five Crowns Meld Finder\n");

    // Round 5: sevens are wild, seven cards dealt plus one drawn
    let round = Round::from_number(5).expect("round 5 exists");
    let hand = Hand::from_string("h5 h6 s7 c9 d9 t9 cK jk").expect("valid hand");

    println!("{}", round);
    println!("Hand: {} ({} points)\n", hand, hand.points(round));

    let melds = find_melds(hand.cards(), round);
    println!("Found {} candidate melds", melds.len());

    let selection = select_best(hand.cards(), &melds);
    println!("Selected {} melds covering {} cards:", selection.melds.len(), selection.used_count);
    for (i, meld) in selection.melds.iter().enumerate() {
        println!("  Meld {}: {}", i + 1, meld);
    }

    let leftover: Vec<String> = selection.leftover.iter().map(Card::to_string).collect();
    println!(
        "Leftover: [{}] ({} points)\n",
        leftover.join(" "),
        selection.leftover_points(round)
    );

    match suggest_discard(hand.cards(), round, &melds, false) {
        Some(discard) => println!("Discard {} ({:?})", discard.card, discard.reason),
        None => println!("No discard suggestion."),
    }

    let top = Card::from_string("h4").expect("valid card");
    let rec = recommend_draw(top, hand.cards(), round, &melds, &AdvisorConfig::default());
    println!("Discard pile shows {}: {:?} - {}", top, rec.action, rec.reasoning);
}
