//! Title suggestions for the "find similar" input box.

pub const DEFAULT_SUGGESTION_LIMIT: usize = 10;

/// Fixed suggestion list, not read from the store
///
/// A suggested title may be missing from the collection, in which case
/// `find_similar` reports it as not found.
pub const KNOWN_TITLES: &[&str] = &[
    "12 Angry Men",
    "2001: A Space Odyssey",
    "Alien",
    "Amélie",
    "Arrival",
    "Back to the Future",
    "Blade Runner",
    "Casablanca",
    "Eternal Sunshine of the Spotless Mind",
    "Fight Club",
    "Forrest Gump",
    "Gladiator",
    "Goodfellas",
    "Heat",
    "Inception",
    "Interstellar",
    "Jurassic Park",
    "Mad Max: Fury Road",
    "Memento",
    "Parasite",
    "Pulp Fiction",
    "Schindler's List",
    "Se7en",
    "Spirited Away",
    "The Dark Knight",
    "The Godfather",
    "The Grand Budapest Hotel",
    "The Matrix",
    "The Prestige",
    "The Shawshank Redemption",
    "The Silence of the Lambs",
    "Toy Story",
    "Wet Hot American Summer",
    "Whiplash",
];

/// Case-insensitive substring match over [`KNOWN_TITLES`], in catalog order
pub fn suggest(query: &str, limit: usize) -> Vec<&'static str> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    KNOWN_TITLES
        .iter()
        .copied()
        .filter(|title| title.to_lowercase().contains(&needle))
        .take(limit)
        .collect()
}
