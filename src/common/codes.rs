use rand::{Rng, distr::Alphanumeric};

const JOIN_CODE_LENGTH: usize = 6;
const SLUG_SUFFIX_LENGTH: usize = 6;

/// Human-typable code participants enter to join a quiz. Fixed length,
/// uppercase alphanumeric.
pub fn join_code() -> String {
    random_alphanumeric(JOIN_CODE_LENGTH).to_uppercase()
}

/// URL slug for a quiz: slugified title plus a random disambiguator so two
/// quizzes with the same title still get distinct slugs.
pub fn unique_slug(title: &str) -> String {
    format!(
        "{}-{}",
        slugify(title),
        random_alphanumeric(SLUG_SUFFIX_LENGTH).to_lowercase()
    )
}

pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(c.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn random_alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_code_is_fixed_length_uppercase() {
        for _ in 0..100 {
            let code = join_code();
            assert_eq!(code.len(), JOIN_CODE_LENGTH);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn slugify_strips_and_collapses() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Math   Quiz 101 "), "math-quiz-101");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn same_title_gets_distinct_slugs() {
        let first = unique_slug("Weekly Quiz");
        let second = unique_slug("Weekly Quiz");
        assert!(first.starts_with("weekly-quiz-"));
        assert_ne!(first, second);
    }
}
