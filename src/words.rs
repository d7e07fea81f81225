//! Static word bank: (secret word, hint) pairs.
//!
//! Every regular player sees the secret word; the impostor only sees the
//! hint and has to blend in from that.

use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordPair {
    pub word: &'static str,
    pub hint: &'static str,
}

const WORD_PAIRS: &[WordPair] = &[
    WordPair { word: "Pizza", hint: "Italian food" },
    WordPair { word: "Lighthouse", hint: "Coastal building" },
    WordPair { word: "Penguin", hint: "Flightless bird" },
    WordPair { word: "Volcano", hint: "Natural disaster" },
    WordPair { word: "Submarine", hint: "Travels underwater" },
    WordPair { word: "Violin", hint: "String instrument" },
    WordPair { word: "Cactus", hint: "Desert plant" },
    WordPair { word: "Waterfall", hint: "Found in nature" },
    WordPair { word: "Astronaut", hint: "Unusual job" },
    WordPair { word: "Campfire", hint: "Outdoor activity" },
    WordPair { word: "Snowman", hint: "Winter thing" },
    WordPair { word: "Library", hint: "Quiet place" },
    WordPair { word: "Carousel", hint: "Fairground ride" },
    WordPair { word: "Telescope", hint: "Optical instrument" },
    WordPair { word: "Hammock", hint: "Place to rest" },
    WordPair { word: "Espresso", hint: "Hot drink" },
    WordPair { word: "Origami", hint: "Paper craft" },
    WordPair { word: "Glacier", hint: "Made of ice" },
    WordPair { word: "Scarecrow", hint: "Found on a farm" },
    WordPair { word: "Trampoline", hint: "Garden equipment" },
    WordPair { word: "Labyrinth", hint: "Easy to get lost in" },
    WordPair { word: "Parachute", hint: "Safety equipment" },
    WordPair { word: "Aquarium", hint: "Full of water" },
    WordPair { word: "Drumkit", hint: "Loud instrument" },
    WordPair { word: "Windmill", hint: "Uses the weather" },
    WordPair { word: "Chandelier", hint: "Hangs from the ceiling" },
    WordPair { word: "Compass", hint: "Helps with directions" },
    WordPair { word: "Avalanche", hint: "Mountain hazard" },
    WordPair { word: "Bonsai", hint: "Small version of something big" },
    WordPair { word: "Jukebox", hint: "Plays music" },
];

/// Draw a uniformly random pair from the bank.
pub fn draw() -> WordPair {
    let mut rng = rand::rng();
    WORD_PAIRS[rng.random_range(0..WORD_PAIRS.len())]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_is_well_formed() {
        assert!(!WORD_PAIRS.is_empty());
        for pair in WORD_PAIRS {
            assert!(!pair.word.is_empty());
            assert!(!pair.hint.is_empty());
            // The hint must never equal the word, or the impostor is handed
            // the answer.
            assert_ne!(pair.word, pair.hint);
        }
    }

    #[test]
    fn test_draw_returns_bank_entry() {
        for _ in 0..50 {
            let pair = draw();
            assert!(WORD_PAIRS.contains(&pair));
        }
    }
}
