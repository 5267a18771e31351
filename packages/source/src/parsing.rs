//! Shared cell parsing utilities for spreadsheet sources.
//!
//! Spreadsheet cells arrive typed by whatever the authoring tool decided:
//! department codes may be text (`"01"`), integers or floats (`1.0`), and
//! counts may be numbers or numeric text. These helpers flatten that
//! variety into labels and numbers.

use calamine::Data;

/// Renders a cell as a trimmed label.
///
/// Whole floats lose their fractional part (`1.0` becomes `"1"`) so that
/// numeric department codes read the same as textual ones. Returns `None`
/// for empty, blank, error and date cells.
#[must_use]
pub fn cell_label(cell: &Data) -> Option<String> {
    match cell {
        Data::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) if f.is_finite() && f.fract().abs() < f64::EPSILON => {
            Some(format!("{f:.0}"))
        }
        Data::Float(f) if f.is_finite() => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Reads a cell as a number. Numeric text is parsed; anything else is
/// `None`.
#[must_use]
pub fn cell_number(cell: &Data) -> Option<f64> {
    #[allow(clippy::cast_precision_loss)]
    let value = match cell {
        Data::Int(i) => *i as f64,
        Data::Float(f) => *f,
        Data::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Returns `true` if the cell holds nothing (or only whitespace).
#[must_use]
pub fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Returns `true` if the cell is an integer or text made only of digits.
///
/// Float cells do not qualify: a data region is expected to start with
/// codes authored as text.
#[must_use]
pub fn is_integer_text(cell: &Data) -> bool {
    match cell {
        Data::Int(_) => true,
        Data::String(s) => {
            let trimmed = s.trim();
            !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_from_text_and_numbers() {
        assert_eq!(cell_label(&Data::String(" 75 ".into())).as_deref(), Some("75"));
        assert_eq!(cell_label(&Data::Int(1)).as_deref(), Some("1"));
        assert_eq!(cell_label(&Data::Float(1.0)).as_deref(), Some("1"));
        assert_eq!(cell_label(&Data::Float(75.5)).as_deref(), Some("75.5"));
    }

    #[test]
    fn blank_cells_have_no_label() {
        assert_eq!(cell_label(&Data::Empty), None);
        assert_eq!(cell_label(&Data::String("   ".into())), None);
    }

    #[test]
    fn numbers_from_numeric_text() {
        assert_eq!(cell_number(&Data::String("650000".into())), Some(650_000.0));
        assert_eq!(cell_number(&Data::Int(3)), Some(3.0));
        assert_eq!(cell_number(&Data::Float(2.5)), Some(2.5));
    }

    #[test]
    fn rejects_non_numeric_cells() {
        assert_eq!(cell_number(&Data::String("n/a".into())), None);
        assert_eq!(cell_number(&Data::Empty), None);
        assert_eq!(cell_number(&Data::Float(f64::NAN)), None);
    }

    #[test]
    fn integer_text_detection() {
        assert!(is_integer_text(&Data::String("01".into())));
        assert!(is_integer_text(&Data::Int(1)));
        assert!(!is_integer_text(&Data::String("2A".into())));
        assert!(!is_integer_text(&Data::String("Notes:".into())));
        assert!(!is_integer_text(&Data::Float(1.0)));
        assert!(!is_integer_text(&Data::Empty));
    }
}
