//! French-locale string ordering.
//!
//! Three levels, compared in turn:
//! 1. base characters: accents stripped, case folded, `œ`/`æ`/`ß` expanded;
//!    spaces sort before punctuation, punctuation before digits, digits before letters,
//! 2. accents, compared from the start of the word (`cote < coté < côte < côté`),
//!    weighted acute, grave, breve, circumflex, caron, ring, diaeresis, ... cedilla,
//! 3. case, lower before upper.
//!
//! Raw code point order breaks the tie so the ordering is total.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Secondary weights of the common Latin accents, lightest first
const ACCENT_ORDER: [char; 14] = [
    '\u{0301}', // acute
    '\u{0300}', // grave
    '\u{0306}', // breve
    '\u{0302}', // circumflex
    '\u{030C}', // caron
    '\u{030A}', // ring
    '\u{0308}', // diaeresis
    '\u{030B}', // double acute
    '\u{0303}', // tilde
    '\u{0307}', // dot above
    '\u{0338}', // long solidus
    '\u{0327}', // cedilla
    '\u{0328}', // ogonek
    '\u{0304}', // macron
];

/// Primary character classes, in sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Class {
    Space,
    Punctuation,
    Digit,
    Letter,
}

impl Class {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            Class::Space
        } else if c.is_alphabetic() {
            Class::Letter
        } else if c.is_numeric() {
            Class::Digit
        } else {
            Class::Punctuation
        }
    }
}

/// One base character with its accents and case
struct Unit {
    base: char,
    marks: Vec<u32>,
    upper: bool,
}

impl Unit {
    fn new(base: char, upper: bool) -> Self {
        Unit {
            base,
            marks: Vec::new(),
            upper,
        }
    }

    fn primary(&self) -> (Class, char) {
        (Class::of(self.base), self.base)
    }
}

fn accent_weight(mark: char) -> u32 {
    match ACCENT_ORDER.iter().position(|&m| m == mark) {
        Some(rank) => rank as u32,
        // Rarer marks after the known ones, in code point order
        None => ACCENT_ORDER.len() as u32 + mark as u32,
    }
}

fn expand(c: char) -> Option<[char; 2]> {
    match c {
        'œ' => Some(['o', 'e']),
        'æ' => Some(['a', 'e']),
        'ß' => Some(['s', 's']),
        _ => None,
    }
}

fn units(s: &str) -> Vec<Unit> {
    let mut out: Vec<Unit> = Vec::new();
    for c in s.nfd() {
        if is_combining_mark(c) {
            if let Some(last) = out.last_mut() {
                last.marks.push(accent_weight(c));
            }
            continue;
        }
        let upper = c.is_uppercase();
        for lower in c.to_lowercase() {
            match expand(lower) {
                Some(pair) => out.extend(pair.into_iter().map(|base| Unit::new(base, upper))),
                None => out.push(Unit::new(lower, upper)),
            }
        }
    }
    out
}

/// Compare two strings the way a French reader expects them sorted.
pub fn compare_fr(a: &str, b: &str) -> Ordering {
    let ua = units(a);
    let ub = units(b);

    ua.iter()
        .map(Unit::primary)
        .cmp(ub.iter().map(Unit::primary))
        .then_with(|| {
            ua.iter()
                .map(|u| u.marks.as_slice())
                .cmp(ub.iter().map(|u| u.marks.as_slice()))
        })
        .then_with(|| ua.iter().map(|u| u.upper).cmp(ub.iter().map(|u| u.upper)))
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(mut words: Vec<&str>) -> Vec<&str> {
        words.sort_by(|a, b| compare_fr(a, b));
        words
    }

    #[test]
    fn accented_letters_sit_next_to_plain_ones() {
        assert_eq!(
            sorted(vec!["Fromage", "Éclairs", "Dessert", "Eau"]),
            vec!["Dessert", "Eau", "Éclairs", "Fromage"]
        );
    }

    #[test]
    fn case_does_not_split_the_alphabet() {
        assert_eq!(sorted(vec!["banane", "Abricot", "cerise"]), vec!["Abricot", "banane", "cerise"]);
    }

    #[test]
    fn accents_break_ties_from_the_front() {
        assert_eq!(
            sorted(vec!["côté", "côte", "coté", "cote"]),
            vec!["cote", "coté", "côte", "côté"]
        );
    }

    #[test]
    fn lower_case_before_upper_case() {
        assert_eq!(compare_fr("pain", "Pain"), Ordering::Less);
        assert_eq!(compare_fr("Pain", "Pain"), Ordering::Equal);
    }

    #[test]
    fn ligatures_expand() {
        assert_eq!(sorted(vec!["oeuf", "œuf", "oeil"]), vec!["oeil", "oeuf", "œuf"]);
        assert_eq!(compare_fr("œufs", "ofs"), Ordering::Less);
    }

    #[test]
    fn acute_sorts_before_grave() {
        assert_eq!(
            sorted(vec!["Pâtè", "Pâté", "Pâte", "Pate"]),
            vec!["Pate", "Pâte", "Pâté", "Pâtè"]
        );
        assert_eq!(sorted(vec!["pêche", "péché", "pèche"]), vec!["péché", "pèche", "pêche"]);
    }

    #[test]
    fn punctuation_and_spaces_sort_before_letters() {
        assert_eq!(
            sorted(vec!["Jus de pomme", "Jus d\u{2019}orange", "Jus d'ananas"]),
            vec!["Jus d'ananas", "Jus d\u{2019}orange", "Jus de pomme"]
        );
        assert_eq!(sorted(vec!["Pizza4", "Pizza ", "Pizzas"]), vec!["Pizza ", "Pizza4", "Pizzas"]);
    }
}
