//! # Numeric Literals
//!
//! The grammar accepted by the `number` and `integer` primitives:
//!
//! ```text
//! literal  = [sign] mantissa [exponent]
//! sign     = "+" | "-"
//! mantissa = digits ["." [digits]] | "." digits
//! exponent = ("e" | "E") [sign] digits
//! ```
//!
//! The whole string must match: no surrounding whitespace, no trailing
//! garbage, no hex/octal/binary prefixes, no `Infinity`/`NaN` spellings.
//! A literal whose value overflows to infinity is rejected.

/// Parse `s` as a finite number, or `None` if it is not a complete literal.
pub fn parse_finite(s: &str) -> Option<f64> {
    if !is_decimal_literal(s) {
        return None;
    }
    let value: f64 = s.parse().ok()?;
    value.is_finite().then_some(value)
}

/// True if `s` is a complete, finite numeric literal.
pub fn is_number(s: &str) -> bool {
    parse_finite(s).is_some()
}

/// True if `s` is a complete, finite numeric literal with no fractional part.
///
/// `"1e3"` and `"2.0"` are integers; `"1.5"` is not.
pub fn is_integer(s: &str) -> bool {
    parse_finite(s).is_some_and(|v| v.fract() == 0.0)
}

fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        i += 1;
    }

    let int_digits = count_digits(&bytes[i..]);
    i += int_digits;

    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(&bytes[i..]);
        i += frac_digits;
    }

    if int_digits == 0 && frac_digits == 0 {
        return false;
    }

    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(&bytes[i..]);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }

    i == bytes.len()
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
