/// A table cell after numeric coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Missing,
}

// Tokens read as "not a number" by the usual dataframe readers.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

pub fn is_missing_token(value: &str) -> bool {
    MISSING_TOKENS.contains(&value)
}

/// Integers and floats become numbers; NaN and infinities count as missing;
/// anything else is kept as text.
pub fn coerce_cell(raw: &str) -> Cell<'_> {
    let trimmed = raw.trim();
    if is_missing_token(trimmed) {
        return Cell::Missing;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Number(v),
        Ok(_) => Cell::Missing,
        Err(_) => Cell::Text(trimmed),
    }
}

impl Cell<'_> {
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Number(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Cell::Text(s) => serde_json::Value::String((*s).to_string()),
            Cell::Missing => serde_json::Value::Null,
        }
    }
}
