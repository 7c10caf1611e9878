//! # Text Layout Engine
//!
//! Fixed-width line composition for thermal receipt paper.
//!
//! Receipt printers render a monospaced grid (32 columns on 58mm paper,
//! 48 on 80mm), so layout is plain character arithmetic: pad, right-justify,
//! word-wrap, rule. All widths here are measured in characters, not bytes.
//!
//! ## Currency
//!
//! Every monetary value on a receipt goes through [`format_rupiah`]:
//! whole-Rupiah integers with id-ID digit grouping and no decimals.
//!
//! ```
//! use struk::layout::format_rupiah;
//!
//! assert_eq!(format_rupiah(25000), "Rp 25.000");
//! assert_eq!(format_rupiah(0), "Rp 0");
//! ```

// ============================================================================
// PADDING AND JUSTIFICATION
// ============================================================================

/// Pad `s` with trailing spaces to exactly `width` characters.
///
/// Strings longer than `width` are truncated to the first `width` characters.
///
/// ```
/// use struk::layout::pad_right;
///
/// assert_eq!(pad_right("abc", 5), "abc  ");
/// assert_eq!(pad_right("abcdef", 4), "abcd");
/// ```
pub fn pad_right(s: &str, width: usize) -> String {
    let len = s.chars().count();
    if len >= width {
        s.chars().take(width).collect()
    } else {
        let mut out = String::with_capacity(width);
        out.push_str(s);
        out.extend(std::iter::repeat_n(' ', width - len));
        out
    }
}

/// Compose a `key ........ value` line of exactly `width` characters, with
/// `value` flush against the right edge.
///
/// The key is padded (and truncated if needed) into the space the value
/// leaves over. If the value alone is wider than the line, the key space
/// shrinks to zero and the line overflows with the value intact.
///
/// ```
/// use struk::layout::key_value_line;
///
/// assert_eq!(key_value_line("Total", "Rp 27.500", 32).len(), 32);
/// assert!(key_value_line("Total", "Rp 27.500", 32).ends_with("Rp 27.500"));
/// ```
pub fn key_value_line(key: &str, value: &str, width: usize) -> String {
    let vlen = value.chars().count();
    let key_space = width.saturating_sub(vlen);
    let mut out = pad_right(key, key_space);
    out.push_str(value);
    out
}

/// A full-width horizontal rule.
pub fn separator_line(ch: char, width: usize) -> String {
    std::iter::repeat_n(ch, width).collect()
}

// ============================================================================
// WORD WRAP
// ============================================================================

/// Greedy word-wrap over `width - indent` columns.
///
/// Returns a lazy iterator of indented lines. The iterator is `Clone`, so a
/// wrap can be restarted by cloning before consumption. Whitespace runs in
/// the input collapse to single spaces; empty or whitespace-only input
/// yields no lines.
///
/// A single word longer than the available columns is hard-split at the
/// column boundary rather than left unbroken.
///
/// ```
/// use struk::layout::wrap;
///
/// let lines: Vec<String> = wrap("Ukuran Cup Large", 12, 2).collect();
/// assert_eq!(lines, vec!["  Ukuran Cup", "  Large"]);
/// ```
pub fn wrap(text: &str, width: usize, indent: usize) -> Wrap<'_> {
    Wrap {
        words: text.split_whitespace(),
        carry: None,
        avail: width.saturating_sub(indent).max(1),
        indent,
    }
}

/// Iterator produced by [`wrap`]. Finite and restartable (via `Clone`).
#[derive(Debug, Clone)]
pub struct Wrap<'a> {
    words: std::str::SplitWhitespace<'a>,
    carry: Option<String>,
    avail: usize,
    indent: usize,
}

impl Iterator for Wrap<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut line = String::new();
        let mut used = 0usize;

        loop {
            let word = match self.carry.take() {
                Some(w) => w,
                None => match self.words.next() {
                    Some(w) => w.to_string(),
                    None => break,
                },
            };
            let wlen = word.chars().count();

            if used == 0 {
                if wlen > self.avail {
                    // Hard split: take exactly `avail` characters, carry the rest.
                    let split = word
                        .char_indices()
                        .nth(self.avail)
                        .map(|(i, _)| i)
                        .unwrap_or(word.len());
                    line.push_str(&word[..split]);
                    self.carry = Some(word[split..].to_string());
                    used = self.avail;
                    break;
                }
                line.push_str(&word);
                used = wlen;
            } else if used + 1 + wlen <= self.avail {
                line.push(' ');
                line.push_str(&word);
                used += 1 + wlen;
            } else {
                self.carry = Some(word);
                break;
            }
        }

        if used == 0 {
            None
        } else {
            let mut out = String::with_capacity(self.indent + line.len());
            out.extend(std::iter::repeat_n(' ', self.indent));
            out.push_str(&line);
            Some(out)
        }
    }
}

// ============================================================================
// CURRENCY
// ============================================================================

/// Format a whole-Rupiah amount: `Rp ` prefix, thousands grouped with `.`,
/// no decimal places. Negative amounts carry a leading minus.
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}Rp {grouped}")
}

// ============================================================================
// TESTS
// ============================================================================
