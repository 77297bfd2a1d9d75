use clap::Parser;
use five_crowns_melds::{AdvisorConfig, Card, Hand, Round, analyze_hand, find_melds, recommend_draw};
use tracing::info;

#[derive(Parser)]
#[command(name = "five-crowns-melds")]
#[command(about = "Find melds, go-out discards and draw advice for a Five Crowns hand")]
struct Args {
    /// Round number (1-11); round 1 has 3s wild
    #[arg(short, long)]
    round: u8,

    /// Hand cards, e.g. h5 c10 sQ jk
    #[arg(required = true)]
    cards: Vec<String>,

    /// Another player has already gone out
    #[arg(long)]
    final_turn: bool,

    /// Card on top of the discard pile to evaluate
    #[arg(long)]
    draw: Option<String>,

    /// Advisor config as JSON, e.g. '{"skip_high_value_min": 12}'
    #[arg(long)]
    config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let round = Round::from_number(args.round)?;
    let hand = Hand::from_string(&args.cards.join(" "))?;
    let config = match &args.config {
        Some(json) => AdvisorConfig::from_json(json)?,
        None => AdvisorConfig::default(),
    };
    info!(%round, %hand, "analyzing hand");

    println!("{}: {}", round, hand);

    let analysis = analyze_hand(hand.cards(), round, args.final_turn);
    if analysis.melds.is_empty() {
        println!("No melds.");
    } else {
        println!("Melds:");
        for meld in &analysis.melds {
            println!("  {}", meld);
        }
    }

    let leftover: Vec<String> = analysis.leftover.iter().map(Card::to_string).collect();
    println!(
        "Leftover: [{}] ({} points)",
        leftover.join(" "),
        analysis.leftover_points
    );

    match analysis.go_out_discard {
        Some(index) => println!("Go out by discarding {}", hand.cards()[index]),
        None => println!("Cannot go out yet"),
    }
    if let Some(discard) = analysis.discard {
        println!("Suggested discard: {} ({:?})", discard.card, discard.reason);
    }

    if let Some(candidate) = &args.draw {
        let candidate = Card::from_string(candidate)?;
        let melds = find_melds(hand.cards(), round);
        let rec = recommend_draw(candidate, hand.cards(), round, &melds, &config);
        println!(
            "Draw {}: {:?} - {} (unmelded points {} -> {})",
            candidate, rec.action, rec.reasoning, rec.points_before, rec.points_after
        );
    }

    Ok(())
}
