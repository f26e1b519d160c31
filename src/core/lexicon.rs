use crate::utils::error::Result;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;

/// Substrings that tie a query to gardening, permaculture and plant care.
///
/// Matching is by substring, so short words that hide inside everyday ones
/// ("bee" in "been", "tree" in "street", "root" in "root access") are left out.
pub const DEFAULT_IN_SCOPE: &[&str] = &[
    "garden", "gardening", "plant", "soil", "compost", "permaculture", "seed", "seedling",
    "harvest", "mulch", "fertiliz", "fertilis", "grow", "crops", "cover crop", "vegetable",
    "fruit", "herb", "flower", "trees", "shrub", "tomato", "pepper", "lettuce", "potato",
    "bean", "squash", "cucumber", "pests", "pest control", "aphid", "weed", "prune", "pruning",
    "watering", "irrigat", "raised bed", "greenhouse", "orchard", "companion plant", "pollinat",
    "earthworm", "worm bin", "manure", "leaf", "leaves", "frost", "sunlight", "germinat",
    "transplant", "fungus", "fungal", "mildew", "blight", "nutrient", "nitrogen", "polyculture",
    "swale", "food forest", "chicken", "bees", "beekeep", "native plant", "perennial", "annuals",
    "bloom", "hedgerow", "lawn", "hardiness",
];

/// Substrings that mark a query as belonging somewhere else entirely.
pub const DEFAULT_OFF_TOPIC: &[&str] = &[
    "python", "javascript", "code", "coding", "programming", "function", "algorithm",
    "software", "write", "essay", "poem", "homework", "math", "calculus", "tax", "stock",
    "crypto", "bitcoin", "invest", "fraud", "hack", "politic", "election", "celebrity",
    "movie", "video game", "sports", "dating", "weapon", "gambling", "lottery", "resume",
    "lawsuit",
];

/// Two immutable sets of lowercase tokens, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexicon {
    in_scope: BTreeSet<String>,
    off_topic: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LexiconFile {
    in_scope: Option<Vec<String>>,
    off_topic: Option<Vec<String>>,
}

impl Lexicon {
    pub fn new<I, J, S, T>(in_scope: I, off_topic: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        Self {
            in_scope: normalize(in_scope),
            off_topic: normalize(off_topic),
        }
    }

    /// Missing lists fall back to the compiled-in defaults.
    pub fn from_parts(in_scope: Option<Vec<String>>, off_topic: Option<Vec<String>>) -> Self {
        let in_scope = match in_scope {
            Some(tokens) => normalize(tokens),
            None => normalize(DEFAULT_IN_SCOPE),
        };
        let off_topic = match off_topic {
            Some(tokens) => normalize(tokens),
            None => normalize(DEFAULT_OFF_TOPIC),
        };
        Self {
            in_scope,
            off_topic,
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        let lexicon = Self::from_toml_str(&content)?;
        tracing::info!(
            path = %path.as_ref().display(),
            in_scope = lexicon.in_scope.len(),
            off_topic = lexicon.off_topic.len(),
            "Loaded lexicon"
        );
        Ok(lexicon)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: LexiconFile = toml::from_str(content)?;
        Ok(Self::from_parts(file.in_scope, file.off_topic))
    }

    /// `lowered` must already be lowercase.
    pub fn contains_in_scope(&self, lowered: &str) -> bool {
        self.in_scope.iter().any(|token| lowered.contains(token.as_str()))
    }

    /// `lowered` must already be lowercase.
    pub fn contains_off_topic(&self, lowered: &str) -> bool {
        self.off_topic.iter().any(|token| lowered.contains(token.as_str()))
    }

    pub fn in_scope(&self) -> impl Iterator<Item = &str> {
        self.in_scope.iter().map(String::as_str)
    }

    pub fn off_topic(&self) -> impl Iterator<Item = &str> {
        self.off_topic.iter().map(String::as_str)
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_parts(None, None)
    }
}

// 小寫化、去除空白 token，重複項目自然合併
fn normalize<I, S>(tokens: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .map(|t| t.as_ref().to_lowercase())
        .filter(|t| !t.trim().is_empty())
        .collect()
}
