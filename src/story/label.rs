//! Path labels derived from position.
//!
//! The path at index `i` is labeled with the `i`-th lowercase letter while
//! there are at most 26 paths. Past `z` labels continue in bijective base-26
//! (`aa`, `ab`, ..., `az`, `ba`, ...), so every index has exactly one label
//! and every label decodes back to exactly one index.

const ALPHABET_LEN: usize = 26;

/// Label for the path at `index`.
pub fn label_for_index(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();

    while n > 0 {
        n -= 1;
        letters.push(b'a' + (n % ALPHABET_LEN) as u8);
        n /= ALPHABET_LEN;
    }

    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Index encoded by `label`, or `None` if it is not a well-formed label.
pub fn index_for_label(label: &str) -> Option<usize> {
    if label.is_empty() || !label.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }

    let mut n: usize = 0;
    for b in label.bytes() {
        n = n
            .checked_mul(ALPHABET_LEN)?
            .checked_add((b - b'a') as usize + 1)?;
    }

    Some(n - 1)
}
