//! Three-line element feed parsing.
//!
//! The feed is a sequence of blocks: a name line followed by element
//! lines 1 and 2. Blank lines are ignored.

use super::types::{CatalogError, TleRecord};

/// Parse a whole feed into records.
pub fn parse_feed(text: &str) -> Result<Vec<TleRecord>, CatalogError> {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim_end()))
        .filter(|(_, l)| !l.trim().is_empty())
        .collect();

    if lines.len() % 3 != 0 {
        let (line, _) = lines[lines.len() - lines.len() % 3];
        return Err(CatalogError::Parse {
            line,
            message: format!("incomplete element set ({} trailing lines)", lines.len() % 3),
        });
    }

    lines
        .chunks(3)
        .map(|block| parse_block(block[0], block[1], block[2]))
        .collect()
}

fn parse_block(
    (_, name): (usize, &str),
    (n1, line1): (usize, &str),
    (n2, line2): (usize, &str),
) -> Result<TleRecord, CatalogError> {
    if !line1.starts_with("1 ") {
        return Err(CatalogError::Parse { line: n1, message: "expected element line 1".into() });
    }
    if !line2.starts_with("2 ") {
        return Err(CatalogError::Parse { line: n2, message: "expected element line 2".into() });
    }

    let catalog_number = line1
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| CatalogError::Parse { line: n1, message: "missing catalog number".into() })?;

    Ok(TleRecord {
        name: name.trim().to_string(),
        catalog_number: catalog_number.to_string(),
        line1: line1.to_string(),
        line2: line2.to_string(),
    })
}

/// Render records back into feed text.
pub fn to_feed(records: &[TleRecord]) -> String {
    let mut out = String::new();
    for r in records {
        out.push_str(&r.name);
        out.push('\n');
        out.push_str(&r.line1);
        out.push('\n');
        out.push_str(&r.line2);
        out.push('\n');
    }
    out
}
