use serde::{Deserialize, Serialize};

/// Marker that forces a written value to be kept as literal text.
pub const TEXT_MARKER: char = '\'';

/// A single stored cell.
///
/// Values are written as strings and interpreted the way a spreadsheet would
/// (see [`CellValue::from_input`]), which is why identifiers and phone
/// numbers are written with [`TEXT_MARKER`] in front.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Formula(String),
}

impl CellValue {
    /// Interpret a written string.
    ///
    /// - `'...` keeps the rest as text, the marker itself is consumed
    /// - `=...` is a formula
    /// - a plain decimal such as `00123` or `-2.5` becomes a number
    /// - anything else is text
    pub fn from_input(input: &str) -> Self {
        if let Some(rest) = input.strip_prefix(TEXT_MARKER) {
            return if rest.is_empty() {
                Self::Empty
            } else {
                Self::Text(rest.to_string())
            };
        }

        if input.is_empty() {
            return Self::Empty;
        }

        if input.len() > 1 && input.starts_with('=') {
            return Self::Formula(input.to_string());
        }

        if looks_numeric(input) {
            if let Ok(n) = input.trim().parse::<f64>() {
                if n.is_finite() {
                    return Self::Number(n);
                }
            }
        }

        Self::Text(input.to_string())
    }

    /// Raw value coerced to a string. Formulas yield their source text.
    pub fn as_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.clone(),
            Self::Number(n) => format_number(*n),
            Self::Formula(f) => f.clone(),
        }
    }

    /// What a reader sees in the grid. Image formulas render no text.
    pub fn display(&self) -> String {
        match self {
            Self::Formula(_) => String::new(),
            other => other.as_text(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

fn looks_numeric(input: &str) -> bool {
    let s = input.trim();
    let digits = s.strip_prefix('-').unwrap_or(s);
    let mut seen_digit = false;
    let mut seen_dot = false;

    for c in digits.chars() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => return false,
        }
    }

    seen_digit
}

/// Integral values print without a fractional part, like a sheet does.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
