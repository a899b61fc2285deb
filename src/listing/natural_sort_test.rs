use std::cmp::Ordering;

use super::natural_sort::compare_natural;

#[test]
fn test_identical_names_compare_equal() {
    assert_eq!(compare_natural("a.txt", "a.txt"), Ordering::Equal);
    assert_eq!(compare_natural("", ""), Ordering::Equal);
    assert_eq!(compare_natural("文件夹", "文件夹"), Ordering::Equal);
}

#[test]
fn test_digit_runs_compare_by_value() {
    assert_eq!(compare_natural("file2.txt", "file10.txt"), Ordering::Less);
    assert_eq!(compare_natural("file10.txt", "file2.txt"), Ordering::Greater);
    assert_eq!(compare_natural("9", "10"), Ordering::Less);
    assert_eq!(compare_natural("v1.2", "v1.10"), Ordering::Less);
}

#[test]
fn test_equal_value_longer_raw_run_sorts_first() {
    // "007" and "7" are numerically equal; the longer run wins.
    assert_eq!(compare_natural("007", "7"), Ordering::Less);
    assert_eq!(compare_natural("7", "007"), Ordering::Greater);
    assert_eq!(compare_natural("a007b", "a7b"), Ordering::Less);
}

#[test]
fn test_prefix_sorts_first() {
    assert_eq!(compare_natural("abc", "abcd"), Ordering::Less);
    assert_eq!(compare_natural("file", "file2"), Ordering::Less);
    assert_eq!(compare_natural("abcd", "abc"), Ordering::Greater);
}

#[test]
fn test_fullwidth_forms_fold_to_halfwidth() {
    // Full-width digits carry the same value but a longer raw run never
    // arises here: one scalar each way.
    assert_eq!(compare_natural("ｆｉｌｅ１", "file1"), Ordering::Equal);
    assert_eq!(compare_natural("ｆｉｌｅ２", "file10"), Ordering::Less);
    assert_eq!(compare_natural("\u{3000}", " "), Ordering::Equal);
}

#[test]
fn test_letters_compare_case_insensitively_lowercase_first() {
    assert_eq!(compare_natural("a", "A"), Ordering::Less);
    assert_eq!(compare_natural("Apple", "apple"), Ordering::Greater);
    // Case only breaks ties; "B" still sorts between "a" and "c".
    assert_eq!(compare_natural("a", "B"), Ordering::Less);
    assert_eq!(compare_natural("B", "c"), Ordering::Less);
}

#[test]
fn test_class_rank_symbol_number_letter_han() {
    assert_eq!(compare_natural(".", "1"), Ordering::Less);
    assert_eq!(compare_natural("1", "a"), Ordering::Less);
    assert_eq!(compare_natural("a", "中"), Ordering::Less);
    assert_eq!(compare_natural(".hidden", "apple"), Ordering::Less);
    // Dot entry before any letter name (see the filter chain tests for
    // visibility; here only ordering matters).
    assert_eq!(compare_natural(".", "a.txt"), Ordering::Less);
}

#[test]
fn test_han_orders_by_pinyin() {
    // ài < zhōng under the zh collator.
    assert_eq!(compare_natural("爱", "中"), Ordering::Less);
    // běi (北) < shàng (上)
    assert_eq!(compare_natural("北京", "上海"), Ordering::Less);
}

#[test]
fn test_symbols_compare_by_scalar_value() {
    assert_eq!(compare_natural("!a", "#a"), Ordering::Less);
    assert_eq!(compare_natural("a-b", "a_b"), Ordering::Less);
}

#[test]
fn test_full_list_ordering() {
    let mut names = vec![
        "file10", "B.txt", ".cfg", "7", "a.txt", "007", "file2", "中文",
    ];
    names.sort_by(|a, b| compare_natural(a, b));
    assert_eq!(
        names,
        vec![".cfg", "007", "7", "a.txt", "B.txt", "file2", "file10", "中文"]
    );
}

#[test]
fn test_strict_weak_ordering_is_consistent() {
    let names = ["a1", "a01", "a2", "b", ".x", "中", "A1"];
    for x in names {
        assert_eq!(compare_natural(x, x), Ordering::Equal);
        for y in names {
            assert_eq!(compare_natural(x, y), compare_natural(y, x).reverse());
        }
    }
}
