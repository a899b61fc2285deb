//! Natural sort comparator mixing digits, Latin letters, Han ideographs,
//! symbols, and full-width variants.
//!
//! Both strings are walked in lock-step over scalar values. Each scalar is
//! folded from its full-width form to half-width before classification and
//! comparison, digit runs compare as unbounded-precision integers (so
//! "file2" sorts before "file10"), Han ideographs go through a zh locale
//! collator for approximate pinyin order, and class mismatches resolve by a
//! fixed rank. The comparator is a strict weak ordering and safe to call
//! from parallel sorts: collators are thread-local, never shared.

use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions, Numeric, Strength};
use icu_locid::locale;

thread_local! {
    /// Numeric-mode, case-insensitive collator. Secondary strength ignores
    /// case while keeping accents significant.
    static COLLATOR: Collator = {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Secondary);
        options.numeric = Some(Numeric::On);
        Collator::try_new(&locale!("zh").into(), options)
            .expect("compiled zh collation data")
    };
}

fn collate(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| collator.compare(a, b))
}

/// Scalar classes in rank order: a class mismatch at any position resolves
/// by this order, applied consistently for the whole comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum ScalarClass {
    Symbol,
    Number,
    OtherLetter,
    Han,
}

/// Folds full-width ASCII variants (U+FF01..=U+FF5E) and the ideographic
/// space to their half-width equivalents.
fn normalize_width(c: char) -> char {
    match c {
        '\u{3000}' => ' ',
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        _ => c,
    }
}

fn is_han(c: char) -> bool {
    matches!(
        c as u32,
        0x3400..=0x4DBF          // CJK extension A
            | 0x4E00..=0x9FFF    // CJK unified
            | 0xF900..=0xFAFF    // compatibility ideographs
            | 0x20000..=0x2A6DF  // extension B
            | 0x2A700..=0x2EBEF  // extensions C-F
            | 0x30000..=0x3134F  // extension G
    )
}

/// Classifies an already width-normalized scalar.
fn classify(c: char) -> ScalarClass {
    if c.is_ascii_digit() {
        ScalarClass::Number
    } else if is_han(c) {
        ScalarClass::Han
    } else if c.is_alphabetic() {
        ScalarClass::OtherLetter
    } else {
        ScalarClass::Symbol
    }
}

struct DigitRun {
    /// Width-normalized digits, including leading zeros.
    digits: String,
    /// Raw scalar length of the run.
    len: usize,
}

/// Maximal contiguous digit run at `start`, post-normalization.
fn digit_run(chars: &[char], start: usize) -> DigitRun {
    let mut digits = String::new();
    let mut len = 0;
    while start + len < chars.len() {
        let c = normalize_width(chars[start + len]);
        if !c.is_ascii_digit() {
            break;
        }
        digits.push(c);
        len += 1;
    }
    DigitRun { digits, len }
}

/// Compares two digit strings as unbounded-precision integers.
fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Total ordering over entry names. See the module docs for the rules.
pub fn compare_natural(a: &str, b: &str) -> Ordering {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let mut i = 0;
    let mut j = 0;

    while i < a_chars.len() && j < b_chars.len() {
        let ca = normalize_width(a_chars[i]);
        let cb = normalize_width(b_chars[j]);
        let class_a = classify(ca);
        let class_b = classify(cb);
        if class_a != class_b {
            return class_a.cmp(&class_b);
        }

        match class_a {
            ScalarClass::Number => {
                let run_a = digit_run(&a_chars, i);
                let run_b = digit_run(&b_chars, j);
                match compare_digit_runs(&run_a.digits, &run_b.digits) {
                    Ordering::Equal => {
                        if run_a.len != run_b.len {
                            // equal value: the longer raw run (leading zeros,
                            // full-width forms included) sorts first
                            return run_b.len.cmp(&run_a.len);
                        }
                        i += run_a.len;
                        j += run_b.len;
                    }
                    unequal => return unequal,
                }
            }
            ScalarClass::Han => {
                let mut buf_a = [0u8; 4];
                let mut buf_b = [0u8; 4];
                match collate(ca.encode_utf8(&mut buf_a), cb.encode_utf8(&mut buf_b)) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    unequal => return unequal,
                }
            }
            ScalarClass::OtherLetter => {
                let mut buf_a = [0u8; 4];
                let mut buf_b = [0u8; 4];
                match collate(ca.encode_utf8(&mut buf_a), cb.encode_utf8(&mut buf_b)) {
                    Ordering::Equal => match (ca.is_lowercase(), cb.is_lowercase()) {
                        // same letter, different case: lower-case first
                        (true, false) => return Ordering::Less,
                        (false, true) => return Ordering::Greater,
                        _ => {
                            i += 1;
                            j += 1;
                        }
                    },
                    unequal => return unequal,
                }
            }
            ScalarClass::Symbol => {
                if ca != cb {
                    return (ca as u32).cmp(&(cb as u32));
                }
                i += 1;
                j += 1;
            }
        }
    }

    // a true prefix sorts first
    (a_chars.len() - i).cmp(&(b_chars.len() - j))
}
