//! The tarot deck used by `/tarot`.

use rand::RngExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card {
    pub name: &'static str,
    pub meaning: &'static str,
}

impl Card {
    /// Human-readable draw result, also what matching compares on.
    pub fn render(&self) -> String {
        format!("You drew: {}, Interpretation: {}", self.name, self.meaning)
    }
}

pub static CARDS: [Card; 8] = [
    Card {
        name: "The Fool",
        meaning: "New beginnings and freedom",
    },
    Card {
        name: "The Magician",
        meaning: "Resourcefulness and self-confidence",
    },
    Card {
        name: "The High Priestess",
        meaning: "Intuition and hidden wisdom",
    },
    Card {
        name: "The Empress",
        meaning: "Motherhood and abundance",
    },
    Card {
        name: "The Emperor",
        meaning: "Authority and stability",
    },
    Card {
        name: "The Hierophant",
        meaning: "Tradition and faith",
    },
    Card {
        name: "The Lovers",
        meaning: "Choice and relationships",
    },
    Card {
        name: "The Chariot",
        meaning: "Determination and victory",
    },
];

/// Pick a card uniformly at random.
pub fn draw() -> &'static Card {
    let mut rng = rand::rng();
    &CARDS[rng.random_range(0..CARDS.len())]
}
