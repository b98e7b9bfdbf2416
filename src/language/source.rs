use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::core::Language;

/// Supplies the ordered target words for a session
pub trait WordSource: Send {
    /// Must return exactly `count` non-empty words
    fn generate_words(&mut self, count: usize) -> Vec<String>;
}

/// Random words from an embedded language list
pub struct RandomWordSource {
    language: Language,
    rng: StdRng,
}

impl RandomWordSource {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(language: Language, seed: u64) -> Self {
        Self {
            language,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl WordSource for RandomWordSource {
    fn generate_words(&mut self, count: usize) -> Vec<String> {
        let words = &self.language.words;
        if words.len() >= count {
            return words
                .choose_multiple(&mut self.rng, count)
                .cloned()
                .collect();
        }

        // list too short for distinct picks, allow repeats
        (0..count)
            .filter_map(|_| words.choose(&mut self.rng).cloned())
            .collect()
    }
}

/// A custom prompt, replayed unchanged on every reset
#[derive(Clone, Debug)]
pub struct FixedWordSource {
    words: Vec<String>,
}

impl FixedWordSource {
    pub fn new<S: AsRef<str>>(prompt: S) -> Self {
        Self {
            words: prompt
                .as_ref()
                .split_whitespace()
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl WordSource for FixedWordSource {
    fn generate_words(&mut self, _count: usize) -> Vec<String> {
        self.words.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_language() -> Language {
        Language {
            name: "tiny".to_string(),
            size: 2,
            words: vec!["ab".to_string(), "cd".to_string()],
        }
    }

    #[test]
    fn test_random_source_returns_requested_count() {
        let mut source = RandomWordSource::new(Language::load("english").unwrap());

        let words = source.generate_words(25);

        assert_eq!(words.len(), 25);
        assert!(words.iter().all(|w| !w.is_empty()));
    }

    #[test]
    fn test_random_source_repeats_when_list_is_short() {
        let mut source = RandomWordSource::with_seed(tiny_language(), 7);

        let words = source.generate_words(5);

        assert_eq!(words.len(), 5);
        assert!(words.iter().all(|w| w == "ab" || w == "cd"));
    }

    #[test]
    fn test_seeded_sources_agree() {
        let lang = Language::load("english").unwrap();
        let mut a = RandomWordSource::with_seed(lang.clone(), 42);
        let mut b = RandomWordSource::with_seed(lang, 42);

        assert_eq!(a.generate_words(10), b.generate_words(10));
    }

    #[test]
    fn test_fixed_source_splits_prompt() {
        let mut source = FixedWordSource::new("  the quick  brown fox ");

        assert_eq!(source.len(), 4);
        assert_eq!(
            source.generate_words(4),
            vec!["the", "quick", "brown", "fox"]
        );
        // same words on every reset
        assert_eq!(source.generate_words(4)[0], "the");
    }

    #[test]
    fn test_fixed_source_empty_prompt() {
        let source = FixedWordSource::new("   ");
        assert!(source.is_empty());
    }
}
