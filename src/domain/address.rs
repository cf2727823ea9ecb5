// src/domain/address.rs

fn expand_direction(word: &str) -> Option<&'static str> {
    match word {
        "N" => Some("North"),
        "S" => Some("South"),
        "E" => Some("East"),
        "W" => Some("West"),
        _ => None,
    }
}

fn expand_street_type(word: &str) -> Option<&'static str> {
    match word {
        "AVE" => Some("Avenue"),
        "ST" => Some("Street"),
        "BLVD" => Some("Boulevard"),
        "RD" => Some("Road"),
        "DR" => Some("Drive"),
        "CT" => Some("Court"),
        "PL" => Some("Place"),
        "TER" => Some("Terrace"),
        "LN" => Some("Lane"),
        "WAY" => Some("Way"),
        "CIR" => Some("Circle"),
        "PKY" => Some("Parkway"),
        "SQ" => Some("Square"),
        _ => None,
    }
}

/// `"DAMEN"` -> `"Damen"`.
pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}

/// Turns an assessor-style address into something readable for a post.
///
/// Only the street part (before the first comma) is kept. The house number is
/// left alone, directions and street suffixes are spelled out, and anything
/// after the suffix (unit numbers and the like) is dropped.
///
/// `"2023 N DAMEN AVE, CHICAGO, IL 60647"` becomes `"2023 North Damen Avenue"`.
pub fn sanitize_address(address: &str) -> String {
    let street = address.trim().split(',').next().unwrap_or("");
    let parts: Vec<&str> = street.split_whitespace().collect();
    if parts.is_empty() {
        return address.to_string();
    }

    let mut out = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        if i == 0 {
            out.push(part.to_string());
        } else if let Some(dir) = expand_direction(part) {
            out.push(dir.to_string());
        } else if let Some(kind) = expand_street_type(part) {
            out.push(kind.to_string());
            break;
        } else {
            out.push(capitalize(part));
        }
    }

    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_direction_and_suffix() {
        assert_eq!(
            sanitize_address("2023 N DAMEN AVE, CHICAGO, IL 60647"),
            "2023 North Damen Avenue"
        );
    }

    #[test]
    fn drops_everything_after_suffix() {
        assert_eq!(sanitize_address("1 W MADISON ST 4B"), "1 West Madison Street");
    }

    #[test]
    fn multi_word_street_names_are_title_cased() {
        assert_eq!(
            sanitize_address("5800 S MARTIN LUTHER KING DR"),
            "5800 South Martin Luther King Drive"
        );
    }

    #[test]
    fn empty_input_is_returned_as_is() {
        assert_eq!(sanitize_address(""), "");
        assert_eq!(sanitize_address("   "), "   ");
    }
}
