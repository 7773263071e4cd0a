//! Trigram similarity in the manner of PostgreSQL's `pg_trgm`.
//!
//! Text is lowercased and split into words on every non-alphanumeric
//! character. Each word is padded with two leading blanks and one trailing
//! blank, and every three-character window of the padded word is a trigram.
//! Similarity is the Jaccard coefficient of the two trigram sets.

use hashbrown::HashSet;

pub type Trigram = [char; 3];

/// Threshold used by the fuzzy tier unless configured otherwise.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Trigram set for one string.
pub fn trigrams(text: &str) -> HashSet<Trigram> {
    trigrams_of_lowered(&text.to_lowercase())
}

fn trigrams_of_lowered(lowered: &str) -> HashSet<Trigram> {
    let mut set = HashSet::new();
    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
    {
        let padded: Vec<char> = [' ', ' ']
            .into_iter()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert([window[0], window[1], window[2]]);
        }
    }
    set
}

/// Lowercased text plus its trigram set, computed once per catalog entry.
#[derive(Clone, Debug)]
pub struct TrigramProfile {
    lowered: String,
    grams: HashSet<Trigram>,
}

impl TrigramProfile {
    pub fn new(text: &str) -> Self {
        let lowered = text.to_lowercase();
        let grams = trigrams_of_lowered(&lowered);
        Self { lowered, grams }
    }

    pub fn lowered(&self) -> &str {
        &self.lowered
    }

    /// Symmetric score in `[0, 1]`.
    ///
    /// Two strings without any alphanumeric word score 1 only when their
    /// lowercase forms are equal.
    pub fn similarity(&self, other: &TrigramProfile) -> f32 {
        if self.grams.is_empty() && other.grams.is_empty() {
            return if self.lowered == other.lowered { 1.0 } else { 0.0 };
        }
        jaccard(&self.grams, &other.grams)
    }
}

/// Similarity of two arbitrary strings.
pub fn similarity(a: &str, b: &str) -> f32 {
    TrigramProfile::new(a).similarity(&TrigramProfile::new(b))
}

fn jaccard(a: &HashSet<Trigram>, b: &HashSet<Trigram>) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let shared = small.iter().filter(|gram| large.contains(*gram)).count();
    let union = a.len() + b.len() - shared;
    shared as f32 / union as f32
}
