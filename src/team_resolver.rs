use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::normalization::normalize_name;
use crate::shared_types::StoreError;

/// Token-set similarity on a 0-100 scale.
///
/// Both strings are tokenized on whitespace into sorted sets. The score
/// is the best normalized Levenshtein similarity among the sorted
/// intersection string and the two full sorted-token strings, so equal
/// token sets and subset containment both score 100 regardless of word
/// order.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    if tokens_a.is_empty() || tokens_b.is_empty() {
        return if tokens_a.is_empty() && tokens_b.is_empty() {
            100.0
        } else {
            0.0
        };
    }

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let base = intersection.join(" ");
    let full_a = join_parts(&base, &only_a);
    let full_b = join_parts(&base, &only_b);

    let score = strsim::normalized_levenshtein(&base, &full_a)
        .max(strsim::normalized_levenshtein(&base, &full_b))
        .max(strsim::normalized_levenshtein(&full_a, &full_b));
    score * 100.0
}

fn join_parts(base: &str, rest: &[&str]) -> String {
    match (base.is_empty(), rest.is_empty()) {
        (_, true) => base.to_string(),
        (true, false) => rest.join(" "),
        (false, false) => format!("{} {}", base, rest.join(" ")),
    }
}

/// Maps normalized team names to the canonical identity of their
/// spelling-variant cluster. Immutable once constructed: a rebuild
/// produces a whole new value (and store file), never an in-place edit.
#[derive(Debug, Clone, Default)]
pub struct TeamResolver {
    mapping: HashMap<String, String>,
}

impl TeamResolver {
    pub fn new(mapping: HashMap<String, String>) -> Self {
        Self { mapping }
    }

    /// Identity-only resolver: every name is its own canonical form.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Clusters a corpus of observed raw team names.
    ///
    /// Names are normalized and deduplicated by normalized form (first
    /// raw spelling seen wins, first-seen order kept). A single greedy
    /// pass then groups each still-unassigned name with every other
    /// unassigned name scoring at or above `threshold`; the cluster's
    /// canonical identity is its longest raw member (earliest wins on
    /// equal length). The pass is order-dependent and not transitive
    /// across clusters; that approximation is kept on purpose.
    pub fn build(corpus: &[String], threshold: f64) -> Self {
        let mut order: Vec<(String, String)> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for raw in corpus {
            let norm = normalize_name(raw);
            if norm.is_empty() || !seen.insert(norm.clone()) {
                continue;
            }
            order.push((norm, raw.clone()));
        }

        let mut assigned = vec![false; order.len()];
        let mut mapping = HashMap::new();
        let mut clusters = 0usize;

        for i in 0..order.len() {
            if assigned[i] {
                continue;
            }
            // Everything before i is already assigned, so scanning
            // forward from i covers all remaining candidates (i joins
            // its own cluster at score 100).
            let members: Vec<usize> = (i..order.len())
                .filter(|&j| !assigned[j] && token_set_ratio(&order[i].0, &order[j].0) >= threshold)
                .collect();

            // Longest raw spelling wins, measured in characters so
            // accented names are not favored by their byte length.
            let mut canonical = order[members[0]].1.as_str();
            for &m in &members[1..] {
                if order[m].1.chars().count() > canonical.chars().count() {
                    canonical = order[m].1.as_str();
                }
            }
            let canonical = canonical.to_string();

            for &m in &members {
                mapping.insert(order[m].0.clone(), canonical.clone());
                assigned[m] = true;
            }
            clusters += 1;
        }

        debug!(names = order.len(), clusters, "built team name clusters");
        Self { mapping }
    }

    /// Canonical identity for a normalized name; unmapped names resolve
    /// to themselves. Total, never fails.
    pub fn canonical(&self, normalized: &str) -> String {
        self.mapping
            .get(normalized)
            .cloned()
            .unwrap_or_else(|| normalized.to_string())
    }

    pub fn from_file(path: &Path) -> Result<Self, StoreError> {
        let text = fs::read_to_string(path).map_err(|source| StoreError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mapping: HashMap<String, String> =
            serde_json::from_str(&text).map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(Self { mapping })
    }

    /// Loads the identity store, degrading to the identity mapping when
    /// the file is unavailable. Degradation is logged, never fatal.
    pub fn load_or_degraded(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(resolver) => {
                info!(entries = resolver.len(), path = %path.display(), "loaded team map");
                resolver
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "team map unavailable ({e}); team names will not be canonicalized"
                );
                Self::empty()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let text = serde_json::to_string_pretty(&self.mapping).expect("map serializes");
        fs::write(path, text).map_err(|source| StoreError::Write {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mapping.is_empty()
    }

    pub fn mapping(&self) -> &HashMap<String, String> {
        &self.mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("real madrid", "real madrid", 100.0)]
    #[case("manchester united", "united manchester", 100.0)]
    #[case("fc barcelona", "barcelona", 100.0)]
    fn test_token_set_ratio_exact_and_subset(
        #[case] a: &str,
        #[case] b: &str,
        #[case] expected: f64,
    ) {
        assert!((token_set_ratio(a, b) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_token_set_ratio_is_symmetric() {
        let a = "olympique lyonnais";
        let b = "ol lyonnais";
        assert!((token_set_ratio(a, b) - token_set_ratio(b, a)).abs() < 1e-9);
    }

    #[test]
    fn test_token_set_ratio_disjoint_names_score_low() {
        assert!(token_set_ratio("lyon", "marseille") < 60.0);
    }

    #[test]
    fn test_token_set_ratio_empty_inputs() {
        assert_eq!(token_set_ratio("", ""), 100.0);
        assert_eq!(token_set_ratio("", "psg"), 0.0);
    }

    #[test]
    fn test_build_clusters_variants_to_longest_raw() {
        let corpus = vec![
            "Real Madrid".to_string(),
            "Liverpool".to_string(),
            "Real Madrid CF".to_string(),
        ];
        let resolver = TeamResolver::build(&corpus, 60.0);

        assert_eq!(resolver.canonical("real madrid"), "Real Madrid CF");
        assert_eq!(resolver.canonical("real madrid cf"), "Real Madrid CF");
        assert_eq!(resolver.canonical("liverpool"), "Liverpool");
    }

    #[test]
    fn test_build_is_order_insensitive_for_simple_pairs() {
        // Two variants above threshold with no competing third name
        // must unify no matter which one the pass visits first.
        let forward = vec!["Real Madrid".to_string(), "Real Madrid CF".to_string()];
        let backward = vec!["Real Madrid CF".to_string(), "Real Madrid".to_string()];

        let r1 = TeamResolver::build(&forward, 60.0);
        let r2 = TeamResolver::build(&backward, 60.0);

        assert_eq!(r1.canonical("real madrid"), "Real Madrid CF");
        assert_eq!(r2.canonical("real madrid"), "Real Madrid CF");
    }

    #[test]
    fn test_build_tie_break_keeps_first_occurrence() {
        // Same normalized length, equal token sets: first raw seen wins.
        let corpus = vec!["AC Milan".to_string(), "Milan AC".to_string()];
        let resolver = TeamResolver::build(&corpus, 60.0);
        assert_eq!(resolver.canonical("ac milan"), "AC Milan");
        assert_eq!(resolver.canonical("milan ac"), "AC Milan");
    }

    #[test]
    fn test_build_dedupes_by_normalized_form() {
        let corpus = vec![
            "Séville FC".to_string(),
            "Seville FC".to_string(), // same normalized form, dropped
        ];
        let resolver = TeamResolver::build(&corpus, 60.0);
        assert_eq!(resolver.len(), 1);
        assert_eq!(resolver.canonical("seville fc"), "Séville FC");
    }

    #[test]
    fn test_build_is_deterministic() {
        let corpus = vec![
            "Paris SG".to_string(),
            "Olympique de Marseille".to_string(),
            "Marseille".to_string(),
            "Paris SG Handball".to_string(),
        ];
        let a = TeamResolver::build(&corpus, 60.0);
        let b = TeamResolver::build(&corpus, 60.0);
        assert_eq!(a.mapping(), b.mapping());
    }

    #[test]
    fn test_unmapped_lookup_returns_input() {
        let resolver = TeamResolver::empty();
        assert_eq!(resolver.canonical("unknown team"), "unknown team");
    }

    #[test]
    fn test_load_or_degraded_missing_file() {
        let resolver = TeamResolver::load_or_degraded(Path::new("/nonexistent/team_map.json"));
        assert!(resolver.is_empty());
        assert_eq!(resolver.canonical("fc nantes"), "fc nantes");
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let corpus = vec!["Real Madrid".to_string(), "Real Madrid CF".to_string()];
        let resolver = TeamResolver::build(&corpus, 60.0);

        let path = std::env::temp_dir().join("surebet_bot_team_map_test.json");
        resolver.save(&path).unwrap();
        let reloaded = TeamResolver::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(resolver.mapping(), reloaded.mapping());
    }
}
