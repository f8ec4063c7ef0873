//! Deterministic sort-title derivation (spec.md §4.A, §8 scenario 1/2).
//!
//! `generate` is total: an unrecognized language simply skips article
//! removal rather than erroring, so it is always safe to call from the
//! catalog store's write path.

use unicode_normalization::UnicodeNormalization;

struct LanguageArticles {
    /// Whole-word articles, stripped only when followed by whitespace.
    words: &'static [&'static str],
    /// Elided forms (e.g. "l'", "d'"), stripped when directly followed by
    /// a letter with no intervening space.
    elisions: &'static [&'static str],
}

fn articles_for(language: &str) -> Option<LanguageArticles> {
    match language.to_ascii_lowercase().as_str() {
        "en" => Some(LanguageArticles {
            words: &["the", "a", "an"],
            elisions: &[],
        }),
        "fr" => Some(LanguageArticles {
            words: &["le", "la", "les", "un", "une", "des"],
            elisions: &["l", "d", "qu"],
        }),
        "es" => Some(LanguageArticles {
            words: &["el", "la", "los", "las", "un", "una", "unos", "unas"],
            elisions: &[],
        }),
        "it" => Some(LanguageArticles {
            words: &["il", "lo", "la", "i", "gli", "le", "un", "uno", "una"],
            elisions: &["l"],
        }),
        "de" => Some(LanguageArticles {
            words: &["der", "die", "das", "ein", "eine", "einen"],
            elisions: &[],
        }),
        "pt" => Some(LanguageArticles {
            words: &["o", "a", "os", "as", "um", "uma"],
            elisions: &[],
        }),
        _ => None,
    }
}

/// Generate the sort key for a display title in the given language
/// (an IETF-style two-letter code; anything unrecognized is a no-op for
/// article removal). Steps: NFC normalize, strip leading non-alphanumeric
/// symbols, optionally remove one leading article, re-trim.
pub fn generate(title: &str, language: &str) -> String {
    let normalized: String = title.nfc().collect();
    let stripped = strip_leading_symbols(&normalized);
    let without_article = match articles_for(language) {
        Some(articles) => strip_one_article(stripped, &articles),
        None => stripped,
    };
    without_article.trim().to_string()
}

fn strip_leading_symbols(s: &str) -> &str {
    s.trim_start_matches(|c: char| !c.is_alphanumeric())
}

fn strip_one_article<'a>(s: &'a str, articles: &LanguageArticles) -> &'a str {
    let apostrophes = ['\'', '\u{2019}', '`'];

    for elision in articles.elisions {
        if let Some(rest) = strip_ci_prefix(s, elision) {
            if let Some(after_apostrophe) = strip_one_of(rest, &apostrophes) {
                if after_apostrophe.starts_with(|c: char| c.is_alphanumeric()) {
                    return after_apostrophe;
                }
            }
        }
    }

    for word in articles.words {
        if let Some(rest) = strip_ci_prefix(s, word) {
            if let Some(after_space) = rest.strip_prefix(char::is_whitespace) {
                return after_space;
            }
        }
    }

    s
}

fn strip_ci_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let prefix_len = prefix.len();
    if s.len() < prefix_len {
        return None;
    }
    let (head, tail) = s.split_at(prefix_len);
    if head.eq_ignore_ascii_case(prefix) {
        Some(tail)
    } else {
        None
    }
}

fn strip_one_of<'a>(s: &'a str, chars: &[char]) -> Option<&'a str> {
    let mut it = s.chars();
    let first = it.next()?;
    if chars.contains(&first) {
        Some(it.as_str())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn english_the() {
        assert_eq!(generate("The Expanse", "en"), "Expanse");
    }

    #[test]
    fn english_a() {
        assert_eq!(generate("A Quiet Place", "en"), "Quiet Place");
    }

    #[test]
    fn english_no_mid_word_strip() {
        assert_eq!(generate("Theremin", "en"), "Theremin");
    }

    #[test]
    fn french_elided_uppercase_l() {
        assert_eq!(generate("L'Étranger", "fr"), "Étranger");
    }

    #[test]
    fn french_elided_curly_apostrophe() {
        assert_eq!(generate("D\u{2019}Artagnan", "fr"), "Artagnan");
    }

    #[test]
    fn unknown_language_is_noop_for_articles() {
        assert_eq!(generate("The Matrix", "xx"), "The Matrix");
    }

    #[test]
    fn leading_symbols_are_stripped() {
        assert_eq!(generate("\"The Office", "en"), "Office");
    }

    #[test]
    fn total_on_empty_string() {
        assert_eq!(generate("", "en"), "");
    }
}
