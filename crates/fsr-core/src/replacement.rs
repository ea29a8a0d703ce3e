use std::collections::HashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementPair {
    pub search: String,
    pub replacement: String,
}

/// Search terms mapped to replacement terms, unique by search term.
///
/// Declaration order is remembered so that [`MatchOrder::Declared`] can replay it;
/// it carries no other meaning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementMap {
    pairs: Vec<ReplacementPair>,
    index: HashMap<String, usize>,
    enriched: bool,
}

/// Order in which pairs are tried against a name or applied to content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchOrder {
    /// Longest search term first; equal lengths keep declaration order.
    #[default]
    LongestFirst,
    /// Declaration order, with enrichment-derived pairs after every original pair.
    Declared,
}

#[derive(Debug, Clone)]
pub struct Substituter {
    pairs: Vec<ReplacementPair>,
}

impl ReplacementMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a map from raw pairs. A repeated search term takes the later
    /// replacement but keeps its first position. Empty search terms are dropped.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (search, replacement) in pairs {
            map.insert(search.into(), replacement.into());
        }
        map
    }

    /// Builds a map and, when `enrich` is set, expands it with case variants.
    pub fn build<I, K, V>(pairs: I, enrich: bool) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = Self::from_pairs(pairs);
        if enrich {
            map.enriched()
        } else {
            map
        }
    }

    /// Returns a new map extended with UPPERCASE, lowercase and first-letter-lowered
    /// variants of every pair. Existing keys are never overwritten, and enriching an
    /// enriched map returns it unchanged.
    pub fn enriched(&self) -> Self {
        if self.enriched {
            return self.clone();
        }

        let mut enriched = self.clone();
        enriched.enriched = true;

        for pair in &self.pairs {
            enriched.insert_absent(pair.search.to_uppercase(), pair.replacement.to_uppercase());
            enriched.insert_absent(pair.search.to_lowercase(), pair.replacement.to_lowercase());

            if starts_uppercase(&pair.search) && starts_uppercase(&pair.replacement) {
                enriched.insert_absent(lower_first(&pair.search), lower_first(&pair.replacement));
            }
        }

        debug!(
            "Case enrichment: {} pairs expanded to {}",
            self.pairs.len(),
            enriched.pairs.len()
        );
        enriched
    }

    pub fn get(&self, search: &str) -> Option<&str> {
        self.index
            .get(search)
            .map(|&position| self.pairs[position].replacement.as_str())
    }

    pub fn contains_key(&self, search: &str) -> bool {
        self.index.contains_key(search)
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn is_enriched(&self) -> bool {
        self.enriched
    }

    /// Pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ReplacementPair> {
        self.pairs.iter()
    }

    fn insert(&mut self, search: String, replacement: String) {
        if search.is_empty() {
            warn!("Ignoring replacement pair with an empty search term (replacement '{}')", replacement);
            return;
        }

        match self.index.get(&search) {
            Some(&position) => {
                debug!(
                    "Duplicate search term '{}': '{}' replaces '{}'",
                    search, replacement, self.pairs[position].replacement
                );
                self.pairs[position].replacement = replacement;
            }
            None => {
                self.index.insert(search.clone(), self.pairs.len());
                self.pairs.push(ReplacementPair { search, replacement });
            }
        }
    }

    fn insert_absent(&mut self, search: String, replacement: String) {
        if search.is_empty() || self.index.contains_key(&search) {
            return;
        }
        debug!("Case variant: {} -> {}", search, replacement);
        self.index.insert(search.clone(), self.pairs.len());
        self.pairs.push(ReplacementPair { search, replacement });
    }
}

fn starts_uppercase(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase)
}

fn lower_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Substituter {
    pub fn new(map: &ReplacementMap, order: MatchOrder) -> Self {
        let mut pairs: Vec<ReplacementPair> = map.iter().cloned().collect();

        if order == MatchOrder::LongestFirst {
            // Stable, so equal lengths stay in declaration order
            pairs.sort_by(|a, b| b.search.len().cmp(&a.search.len()));
        }

        Self { pairs }
    }

    /// Pairs in the order they are tried.
    pub fn pairs(&self) -> &[ReplacementPair] {
        &self.pairs
    }

    /// Replaces the leftmost occurrence of the first matching search term in a
    /// single path segment. Returns `None` when no term occurs in `name`.
    pub fn resolve_name(&self, name: &str) -> Option<String> {
        let pair = self.pairs.iter().find(|pair| name.contains(&pair.search))?;
        let resolved = name.replacen(&pair.search, &pair.replacement, 1);
        debug!("Name replacement: '{}' -> '{}'", name, resolved);
        Some(resolved)
    }

    /// Applies every pair in turn as a replace-all over `content`. Returns `None`
    /// when no search term occurs.
    pub fn rewrite_content(&self, content: &str) -> Option<String> {
        let mut rewritten = content.to_string();
        let mut found_replacements = false;

        for pair in &self.pairs {
            if rewritten.contains(&pair.search) {
                debug!(
                    "Content replacement: '{}' -> '{}' ({} occurrences)",
                    pair.search,
                    pair.replacement,
                    rewritten.matches(&pair.search).count()
                );
                rewritten = rewritten.replace(&pair.search, &pair.replacement);
                found_replacements = true;
            }
        }

        if found_replacements {
            Some(rewritten)
        } else {
            None
        }
    }
}
