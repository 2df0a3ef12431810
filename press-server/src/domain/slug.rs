/// Lower-cases `input` and joins its ASCII alphanumeric runs with single dashes.
pub(crate) fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_dash = false;

    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_lowercases_single_word() {
        assert_eq!(slugify("Tech"), "tech");
    }

    #[test]
    fn slugify_collapses_separators_and_trims_dashes() {
        assert_eq!(slugify("  Hello,   World!  "), "hello-world");
        assert_eq!(slugify("--rust & axum--"), "rust-axum");
    }

    #[test]
    fn slugify_drops_non_ascii_characters() {
        assert_eq!(slugify("Café au lait"), "caf-au-lait");
        assert_eq!(slugify("Привет"), "");
    }

    #[test]
    fn slugify_returns_empty_for_punctuation_only() {
        assert_eq!(slugify("!!! ???"), "");
    }
}
