//! Small parsing helpers.

/// Sort key assigned to overlay names with no parseable numeric suffix.
/// Larger than any realistic tile index, so such names sort last.
pub const SORT_KEY_SENTINEL: u64 = 999_999_999;

/// Extract the trailing number from a name like `N56E29-001`.
///
/// Splits on the *last* `-`, then takes the maximal leading digit run of the
/// remainder. Missing separator, empty or non-numeric remainder, and digit
/// runs too large for `u64` all yield [`SORT_KEY_SENTINEL`].
pub fn trailing_number(name: &str) -> u64 {
    let Some((_, suffix)) = name.rsplit_once('-') else {
        return SORT_KEY_SENTINEL;
    };
    let digits: &str = &suffix[..suffix
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(suffix.len())];
    if digits.is_empty() {
        return SORT_KEY_SENTINEL;
    }
    digits.parse().unwrap_or(SORT_KEY_SENTINEL)
}
