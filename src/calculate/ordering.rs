//! Display ordering of pooled maps.
//!
//! Maps sort by slot group (NM before HD before HR ...) and then by slot
//! label using a numeric-aware comparison, so "NM2" comes before "NM10".

use std::cmp::Ordering;

use crate::models::{Dataset, Map};

/// Slot prefixes in display order. Tiers are 1-based.
pub const SLOT_GROUPS: [&str; 10] = ["NM", "HD", "HR", "DT", "FM", "AIM", "TAP", "GMC", "CTL", "TB"];

/// Tier for slots that match no known group.
pub const UNKNOWN_TIER: u32 = 99;

/// Group tier of a slot label.
pub fn slot_tier(slot: &str) -> u32 {
    SLOT_GROUPS
        .iter()
        .position(|prefix| slot.starts_with(*prefix))
        .map(|i| i as u32 + 1)
        .unwrap_or(UNKNOWN_TIER)
}

/// Compare two slot labels: tier first, then numeric-aware label order.
pub fn compare_slots(a: &str, b: &str) -> Ordering {
    slot_tier(a)
        .cmp(&slot_tier(b))
        .then_with(|| natural_cmp(a, b))
}

pub fn compare_maps(a: &Map, b: &Map) -> Ordering {
    compare_slots(&a.slot, &b.slot)
}

/// All maps of the dataset in display order.
pub fn ordered_maps(dataset: &Dataset) -> Vec<&Map> {
    let mut maps: Vec<&Map> = dataset.maps.values().collect();
    maps.sort_by(|a, b| compare_maps(a, b));
    maps
}

#[derive(Debug, Clone, Copy)]
enum Chunk<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, c) in s.char_indices() {
        let digit = c.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != digit => {
                out.push(make_chunk(&s[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(digit);
    }
    if let Some(digit) = in_digits {
        out.push(make_chunk(&s[start..], digit));
    }
    out
}

fn make_chunk(s: &str, digits: bool) -> Chunk<'_> {
    if digits {
        Chunk::Digits(s)
    } else {
        Chunk::Text(s)
    }
}

fn cmp_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn cmp_text(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Numeric-aware, case-insensitive string comparison.
///
/// Digit runs compare by value and sort before text runs. Strings that are
/// equal under these rules fall back to plain byte order so the result is a
/// total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let ca = chunks(a);
    let cb = chunks(b);

    for (x, y) in ca.iter().zip(cb.iter()) {
        let ord = match (x, y) {
            (Chunk::Digits(x), Chunk::Digits(y)) => cmp_digits(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => cmp_text(x, y),
            (Chunk::Digits(_), Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    ca.len().cmp(&cb.len()).then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(slots: &[&str]) -> Vec<String> {
        let mut v: Vec<&str> = slots.to_vec();
        v.sort_by(|a, b| compare_slots(a, b));
        v.into_iter().map(String::from).collect()
    }

    #[test]
    fn test_slot_tier() {
        assert_eq!(slot_tier("NM1"), 1);
        assert_eq!(slot_tier("HD2"), 2);
        assert_eq!(slot_tier("FM3"), 5);
        assert_eq!(slot_tier("AIM1"), 6);
        assert_eq!(slot_tier("TAP1"), 7);
        assert_eq!(slot_tier("CTL2"), 9);
        assert_eq!(slot_tier("TB"), 10);
        assert_eq!(slot_tier("EZ1"), UNKNOWN_TIER);
        assert_eq!(slot_tier(""), UNKNOWN_TIER);
    }

    #[test]
    fn test_tier_then_numeric_label() {
        assert_eq!(
            sorted(&["NM10", "NM2", "HD1", "TB1"]),
            vec!["NM2", "NM10", "HD1", "TB1"]
        );
    }

    #[test]
    fn test_full_pool_order() {
        assert_eq!(
            sorted(&["TB", "DT1", "XX1", "HR2", "NM1", "FM1", "HD1", "HR1", "GMC1"]),
            vec!["NM1", "HD1", "HR1", "HR2", "DT1", "FM1", "GMC1", "TB", "XX1"]
        );
    }

    #[test]
    fn test_natural_cmp() {
        assert_eq!(natural_cmp("NM2", "NM10"), Ordering::Less);
        assert_eq!(natural_cmp("nm3", "NM2"), Ordering::Greater);
        assert_eq!(natural_cmp("TB", "TB1"), Ordering::Less);
        assert_eq!(natural_cmp("NM02", "NM2"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "abc"), Ordering::Equal);
    }

    #[test]
    fn test_natural_cmp_is_antisymmetric() {
        let labels = ["NM1", "nm1", "NM01", "NM10", "NM9", "TB", "HD", ""];
        for a in labels {
            for b in labels {
                assert_eq!(natural_cmp(a, b), natural_cmp(b, a).reverse(), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn test_ordered_maps() {
        let ds = Dataset::default()
            .with_map(1, "TB")
            .with_map(2, "NM10")
            .with_map(3, "NM2")
            .with_map(4, "HD1");

        let slots: Vec<&str> = ordered_maps(&ds).iter().map(|m| m.slot.as_str()).collect();
        assert_eq!(slots, vec!["NM2", "NM10", "HD1", "TB"]);
    }
}
