//! # List Markers
//!
//! Marker strings for numbered lists. The editor and every renderer call
//! the same functions so their output is identical.
//!
//! - Alphabetic styles wrap modulo 26 (`27` is `a` again).
//! - Roman numerals use the subtractive algorithm for 1..=3999; anything
//!   outside that range falls back to its decimal form.

use crate::content::{BlockContent, ListContent};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListStyle {
    #[default]
    Decimal,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

pub const BULLET: &str = "•";
pub const SUB_BULLET: &str = "◦";

const ROMAN_TABLE: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Marker for the 1-based number `n` in `style`
pub fn list_marker(n: u32, style: ListStyle) -> String {
    match style {
        ListStyle::Decimal => n.to_string(),
        ListStyle::LowerAlpha => alpha(n, b'a'),
        ListStyle::UpperAlpha => alpha(n, b'A'),
        ListStyle::LowerRoman => to_roman(n).map_or_else(|| n.to_string(), |r| r.to_lowercase()),
        ListStyle::UpperRoman => to_roman(n).unwrap_or_else(|| n.to_string()),
    }
}

fn alpha(n: u32, base: u8) -> String {
    if n == 0 {
        return n.to_string();
    }
    let offset = ((n - 1) % 26) as u8;
    char::from(base + offset).to_string()
}

/// Upper-case roman numeral, `None` outside 1..=3999
pub fn to_roman(mut n: u32) -> Option<String> {
    if !(1..=3999).contains(&n) {
        return None;
    }
    let mut out = String::new();
    for (value, symbol) in ROMAN_TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    Some(out)
}

/// Markers for one top-level item and its children
#[derive(Debug, Clone, PartialEq)]
pub struct ItemMarkers {
    pub marker: String,
    pub children: Vec<String>,
}

impl ListContent {
    /// Numbered markers: top level counts from `start_number` in
    /// `list_style`; every child list restarts at 1 in `sub_style`.
    pub fn numbered_markers(&self) -> Vec<ItemMarkers> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemMarkers {
                marker: list_marker(self.start_number.saturating_add(i as u32), self.list_style),
                children: (1..=item.child_count() as u32)
                    .map(|n| list_marker(n, self.sub_style))
                    .collect(),
            })
            .collect()
    }

    pub fn bullet_markers(&self) -> Vec<ItemMarkers> {
        self.items
            .iter()
            .map(|item| ItemMarkers {
                marker: BULLET.to_string(),
                children: vec![SUB_BULLET.to_string(); item.child_count()],
            })
            .collect()
    }
}

impl BlockContent {
    /// Markers for a list block, `None` for every other type
    pub fn list_markers(&self) -> Option<Vec<ItemMarkers>> {
        match self {
            BlockContent::NumberedList(list) => Some(list.numbered_markers()),
            BlockContent::BulletList(list) => Some(list.bullet_markers()),
            _ => None,
        }
    }
}
