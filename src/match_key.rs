/// Order-independent fixture key: the two canonical identities sorted
/// lexicographically and joined with a fixed separator, so "A vs B"
/// and "B vs A" land on the same key.
pub fn build_match_key(identity_a: &str, identity_b: &str) -> String {
    let (first, second) = if identity_a <= identity_b {
        (identity_a, identity_b)
    } else {
        (identity_b, identity_a)
    };
    format!("{}_vs_{}", first, second)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Arsenal", "Chelsea")]
    #[case("Chelsea", "Arsenal")]
    #[case("Real Madrid CF", "FC Barcelona")]
    fn test_key_is_symmetric(#[case] a: &str, #[case] b: &str) {
        assert_eq!(build_match_key(a, b), build_match_key(b, a));
    }

    #[test]
    fn test_key_format() {
        assert_eq!(build_match_key("Chelsea", "Arsenal"), "Arsenal_vs_Chelsea");
    }

    #[test]
    fn test_same_identity_twice() {
        assert_eq!(build_match_key("Lyon", "Lyon"), "Lyon_vs_Lyon");
    }
}
