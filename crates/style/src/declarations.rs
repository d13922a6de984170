//! `style="..."` attribute parsing.
//! Spec: <https://www.w3.org/TR/css-style-attr/>

use std::collections::HashMap;

/// A single declaration from a style attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    /// Property name, ASCII lowercase.
    pub property: String,
    /// Value trimmed of surrounding whitespace, with any `!important` removed.
    pub value: String,
    pub important: bool,
}

/// Split a style attribute into declarations, skipping items without a colon, an empty
/// property or an empty value.
#[must_use]
pub fn parse_style_attribute(input: &str) -> Vec<Declaration> {
    let mut out = Vec::new();
    for raw_item in input.split(';') {
        let item = raw_item.trim_matches(is_ascii_whitespace);
        let Some((raw_property, raw_value)) = item.split_once(':') else {
            continue;
        };
        let property = raw_property.trim_matches(is_ascii_whitespace);
        let mut value = raw_value.trim_matches(is_ascii_whitespace);
        let mut important = false;
        if let Some(index) = value.rfind('!')
            && value[index + 1..]
                .trim_matches(is_ascii_whitespace)
                .eq_ignore_ascii_case("important")
        {
            important = true;
            value = value[..index].trim_matches(is_ascii_whitespace);
        }
        if property.is_empty() || value.is_empty() {
            continue;
        }
        out.push(Declaration {
            property: property.to_ascii_lowercase(),
            value: value.to_owned(),
            important,
        });
    }
    out
}

/// Parse into a map keyed by property. Later declarations win unless an earlier one is
/// `!important` and the later one is not.
#[must_use]
pub fn parse_style_attribute_into_map(input: &str) -> HashMap<String, String> {
    let mut map: HashMap<String, (String, bool)> = HashMap::new();
    for decl in parse_style_attribute(input) {
        if map
            .get(&decl.property)
            .is_some_and(|(_, important)| *important && !decl.important)
        {
            continue;
        }
        map.insert(decl.property, (decl.value, decl.important));
    }
    map.into_iter()
        .map(|(property, (value, _))| (property, value))
        .collect()
}

/// ASCII whitespace per CSS Syntax (TAB, LF, FF, CR, SPACE).
const fn is_ascii_whitespace(character: char) -> bool {
    matches!(
        character,
        '\u{0009}' | '\u{000A}' | '\u{000C}' | '\u{000D}' | '\u{0020}'
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_malformed_items() {
        let decls = parse_style_attribute("color: red;; nonsense; :blue; width: ; Opacity:0.5");
        assert_eq!(
            decls,
            vec![
                Declaration {
                    property: "color".to_owned(),
                    value: "red".to_owned(),
                    important: false,
                },
                Declaration {
                    property: "opacity".to_owned(),
                    value: "0.5".to_owned(),
                    important: false,
                },
            ]
        );
    }

    #[test]
    fn important_survives_later_normal_declarations() {
        let map = parse_style_attribute_into_map(
            "z-index: 1 !important; z-index: 5; position: static; position: relative",
        );
        assert_eq!(map.get("z-index").map(String::as_str), Some("1"));
        assert_eq!(map.get("position").map(String::as_str), Some("relative"));
    }
}
