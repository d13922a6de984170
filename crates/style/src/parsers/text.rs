use std::collections::HashMap;

use super::invalid;
use crate::error::StyleError;
use crate::model::{ComputedStyle, TextTransform};

pub fn apply_text(
    computed: &mut ComputedStyle,
    decls: &HashMap<String, String>,
    rejected: &mut Vec<StyleError>,
) {
    if let Some(value) = decls.get("text-transform") {
        computed.text_transform = if value.eq_ignore_ascii_case("none") {
            TextTransform::None
        } else if value.eq_ignore_ascii_case("uppercase") {
            TextTransform::Uppercase
        } else if value.eq_ignore_ascii_case("lowercase") {
            TextTransform::Lowercase
        } else if value.eq_ignore_ascii_case("capitalize") {
            TextTransform::Capitalize
        } else {
            rejected.push(invalid("text-transform", value, "unsupported keyword"));
            computed.text_transform
        };
    }
}

/// Apply `text-transform` to a run of text.
#[must_use]
pub fn apply_text_transform(text: &str, transform: TextTransform) -> String {
    match transform {
        TextTransform::None => text.to_owned(),
        TextTransform::Uppercase => text.to_uppercase(),
        TextTransform::Lowercase => text.to_lowercase(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut word_start = true;
            for character in text.chars() {
                if word_start && character.is_alphanumeric() {
                    out.extend(character.to_uppercase());
                    word_start = false;
                } else {
                    out.push(character);
                    if character.is_whitespace() {
                        word_start = true;
                    }
                }
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_touches_first_letter_of_each_word() {
        assert_eq!(
            apply_text_transform("hello  wide\tworld 9lives", TextTransform::Capitalize),
            "Hello  Wide\tWorld 9lives"
        );
    }

    #[test]
    fn case_transforms() {
        assert_eq!(apply_text_transform("MiXed", TextTransform::Uppercase), "MIXED");
        assert_eq!(apply_text_transform("MiXed", TextTransform::Lowercase), "mixed");
        assert_eq!(apply_text_transform("MiXed", TextTransform::None), "MiXed");
    }
}
