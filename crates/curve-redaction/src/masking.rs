//! Deterministic masking rules (§4.3). Types with no dedicated row in
//! the rules table (ADDRESS, SSN, CREDIT_CARD, IP_ADDRESS, CUSTOM) fall
//! back to the "default string" rule.

use crate::annotation::{Level, PiiType};

const MASK_CHAR: char = '*';

pub fn mask(value: &str, pii_type: PiiType, level: Level) -> String {
    match pii_type {
        PiiType::Name => mask_name(value, level),
        PiiType::Email => mask_email(value, level),
        PiiType::Phone => mask_phone(value, level),
        _ => mask_default(value, level),
    }
}

fn chars(value: &str) -> Vec<char> {
    value.chars().collect()
}

fn replace_range(chars: &[char], mask_from: usize, mask_to: usize) -> String {
    chars
        .iter()
        .enumerate()
        .map(|(i, c)| if i >= mask_from && i < mask_to { MASK_CHAR } else { *c })
        .collect()
}

fn all_masked(len: usize) -> String {
    std::iter::repeat(MASK_CHAR).take(len).collect()
}

/// Mask the last `n` characters (clamped to the string's length).
fn mask_last_n(value: &str, n: usize) -> String {
    let cs = chars(value);
    let start = cs.len().saturating_sub(n);
    replace_range(&cs, start, cs.len())
}

/// Mask up to `n` characters centered in the string (clamped).
fn mask_middle_n(value: &str, n: usize) -> String {
    let cs = chars(value);
    if cs.is_empty() {
        return value.to_string();
    }
    let mask_len = n.min(cs.len());
    let start = (cs.len() - mask_len) / 2;
    replace_range(&cs, start, start + mask_len)
}

fn mask_default(value: &str, level: Level) -> String {
    let cs = chars(value);
    let n = cs.len();
    match level {
        Level::Weak => {
            let keep = n.div_ceil(2);
            replace_range(&cs, keep, n)
        }
        Level::Normal => {
            let keep = n.min(2);
            replace_range(&cs, keep, n)
        }
        Level::Strong => all_masked(n),
    }
}

fn mask_name(value: &str, level: Level) -> String {
    let cs = chars(value);
    let n = cs.len();
    match level {
        Level::Weak => replace_range(&cs, n.min(1), n),
        Level::Normal => {
            if n <= 2 {
                value.to_string()
            } else {
                replace_range(&cs, 1, n - 1)
            }
        }
        Level::Strong => all_masked(n),
    }
}

fn mask_phone(value: &str, level: Level) -> String {
    match level {
        Level::Weak => {
            if chars(value).len() < 4 {
                value.to_string()
            } else {
                mask_last_n(value, 4)
            }
        }
        Level::Normal => mask_middle_n(value, 4),
        Level::Strong => mask_last_n(value, 8),
    }
}

fn mask_email(value: &str, level: Level) -> String {
    let Some((local, domain)) = value.split_once('@') else {
        return mask_default(value, level);
    };
    let local_chars = chars(local);
    let local_len = local_chars.len();

    match level {
        Level::Weak => {
            if local_len < 3 {
                value.to_string()
            } else {
                format!("{}@{}", replace_range(&local_chars, 3, local_len), domain)
            }
        }
        Level::Normal => {
            let keep = local_len.min(2);
            let masked_local = replace_range(&local_chars, keep, local_len);
            format!("{masked_local}@{}", mask_domain_label(domain, 2))
        }
        Level::Strong => {
            format!("{}@{}", all_masked(local_len), mask_domain_label(domain, 0))
        }
    }
}

/// Mask the first label of a domain (`sub.example.com` -> label is
/// `sub`... but for a typical `domain.tld` shape the label is
/// `domain`), keeping the TLD (the final dot-segment) untouched.
fn mask_domain_label(domain: &str, keep: usize) -> String {
    match domain.rsplit_once('.') {
        Some((label, tld)) => {
            let label_chars = chars(label);
            let keep = keep.min(label_chars.len());
            format!("{}.{}", replace_range(&label_chars, keep, label_chars.len()), tld)
        }
        None => {
            let label_chars = chars(domain);
            let keep = keep.min(label_chars.len());
            replace_range(&label_chars, keep, label_chars.len())
        }
    }
}
