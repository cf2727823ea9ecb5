// src/domain/template.rs
use crate::domain::lot::LotRecord;
use thiserror::Error;

/// Fields a format string may reference.
pub const FIELDS: [&str; 5] = ["id", "address", "lat", "lon", "floors"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("unknown field `{{{0}}}` in format string")]
    UnknownField(String),

    #[error("unbalanced brace in format string `{0}`")]
    Unbalanced(String),

    #[error("lot has no value for `{{{0}}}`")]
    MissingValue(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Field(&'static str),
}

/// A parsed `{field}` format string such as `"{address}, CHICAGO, IL"`.
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pieces: Vec<Piece>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some('{') | None => {
                                return Err(TemplateError::Unbalanced(source.to_string()))
                            }
                            Some(ch) => name.push(ch),
                        }
                    }
                    let name = name.trim();
                    let field = FIELDS
                        .iter()
                        .find(|f| **f == name)
                        .ok_or_else(|| TemplateError::UnknownField(name.to_string()))?;
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Field(*field));
                }
                '}' => return Err(TemplateError::Unbalanced(source.to_string())),
                _ => text.push(c),
            }
        }

        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Ok(Self { pieces })
    }

    /// Fill the placeholders from `lot`. `address` is passed separately so the
    /// caller can substitute a sanitized form.
    pub fn render(&self, lot: &LotRecord, address: &str) -> Result<String, TemplateError> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(t) => out.push_str(t),
                Piece::Field(name) => out.push_str(&field_value(lot, address, name)?),
            }
        }
        Ok(out)
    }
}

fn field_value(lot: &LotRecord, address: &str, name: &'static str) -> Result<String, TemplateError> {
    match name {
        "id" => Ok(lot.id.clone()),
        "address" if address.trim().is_empty() => Err(TemplateError::MissingValue("address")),
        "address" => Ok(address.to_string()),
        "lat" => Ok(lot.lat.to_string()),
        "lon" => Ok(lot.lon.to_string()),
        "floors" => lot
            .floors
            .map(|f| f.to_string())
            .ok_or(TemplateError::MissingValue("floors")),
        _ => Err(TemplateError::UnknownField(name.to_string())),
    }
}
