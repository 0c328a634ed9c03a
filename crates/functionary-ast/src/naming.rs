//! Identifier tokenization for name-based type guessing
//!
//! Splits JavaScript identifiers into lowercase words on separator,
//! camelCase, acronym and letter/digit boundaries:
//! - isValid -> is, valid
//! - user_name -> user, name
//! - XMLHttpRequest -> xml, http, request
//! - width2d -> width, 2, d

/// Split an identifier into lowercase word tokens
pub fn split_words(identifier: &str) -> Vec<String> {
    let mut words = Vec::new();

    for chunk in identifier.split(|c: char| !c.is_alphanumeric()) {
        if chunk.is_empty() {
            continue;
        }
        split_chunk(chunk, &mut words);
    }

    words
}

fn split_chunk(chunk: &str, words: &mut Vec<String>) {
    let chars: Vec<char> = chunk.chars().collect();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        if i > 0 && is_boundary(chars[i - 1], ch, chars.get(i + 1).copied()) {
            words.push(std::mem::take(&mut current));
        }
        current.extend(ch.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }
}

fn is_boundary(prev: char, ch: char, next: Option<char>) -> bool {
    // Digit runs are their own word
    if prev.is_ascii_digit() != ch.is_ascii_digit() {
        return true;
    }
    if ch.is_uppercase() {
        // "myParser": lowercase -> uppercase starts a word
        if prev.is_lowercase() {
            return true;
        }
        // "XMLParser": the last capital of an acronym starts the next word
        if prev.is_uppercase() && next.is_some_and(|c| c.is_lowercase()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use crate::naming::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(split_words("isValid"), ["is", "valid"]);
        assert_eq!(split_words("userName"), ["user", "name"]);
        assert_eq!(split_words("count"), ["count"]);
    }

    #[test]
    fn test_pascal_case_and_acronyms() {
        assert_eq!(split_words("PageTitle"), ["page", "title"]);
        assert_eq!(split_words("XMLHttpRequest"), ["xml", "http", "request"]);
        assert_eq!(split_words("sourceURL"), ["source", "url"]);
        assert_eq!(split_words("URL"), ["url"]);
    }

    #[test]
    fn test_separators() {
        assert_eq!(split_words("user_name"), ["user", "name"]);
        assert_eq!(split_words("$json_obj"), ["json", "obj"]);
        assert_eq!(split_words("__private"), ["private"]);
    }

    #[test]
    fn test_digits() {
        assert_eq!(split_words("width2d"), ["width", "2", "d"]);
        assert_eq!(split_words("item42Count"), ["item", "42", "count"]);
    }

    #[test]
    fn test_empty() {
        assert!(split_words("").is_empty());
        assert!(split_words("_").is_empty());
    }
}
