//! Read-only check for caller-supplied SQL.
//!
//! `get_sql_query` passes raw text straight to the server, so the text is
//! scanned first: comments are dropped, quoted literals are skipped, and the
//! remainder must be exactly one statement that only reads.

use crate::error::ChildesDbError;

const READ_ONLY_KEYWORDS: &[&str] = &["SELECT", "WITH", "SHOW", "DESCRIBE", "DESC", "EXPLAIN"];

/// Words that turn a statement into a write when they appear outside
/// parentheses. `INTO` covers `INTO OUTFILE`, `INTO DUMPFILE` and `INTO @var`.
const WRITE_KEYWORDS: &[&str] = &["DELETE", "UPDATE", "INSERT", "REPLACE", "INTO"];

#[derive(Clone, Copy)]
enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Backticked,
    LineComment,
    BlockComment,
}

fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'#')
        || (bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-'))
}

fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Split `sql` into statements on top-level semicolons, with comments removed.
///
/// Empty statements (e.g. after a trailing `;`) are dropped.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<String> {
    let bytes = sql.as_bytes();
    let mut statements = Vec::new();
    let mut current: Vec<u8> = Vec::with_capacity(bytes.len());
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        match state {
            State::Normal => {
                if is_line_comment_start(bytes, idx) {
                    state = State::LineComment;
                    current.push(b' ');
                } else if is_block_comment_start(bytes, idx) {
                    state = State::BlockComment;
                    current.push(b' ');
                    idx += 1;
                } else if b == b';' {
                    statements.push(std::mem::take(&mut current));
                } else {
                    match b {
                        b'\'' => state = State::SingleQuoted,
                        b'"' => state = State::DoubleQuoted,
                        b'`' => state = State::Backticked,
                        _ => {}
                    }
                    current.push(b);
                }
            }
            State::SingleQuoted | State::DoubleQuoted | State::Backticked => {
                current.push(b);
                let quote = match state {
                    State::SingleQuoted => b'\'',
                    State::DoubleQuoted => b'"',
                    _ => b'`',
                };
                if b == b'\\' && !matches!(state, State::Backticked) {
                    if let Some(&next) = bytes.get(idx + 1) {
                        current.push(next);
                        idx += 1;
                    }
                } else if b == quote {
                    if bytes.get(idx + 1) == Some(&quote) {
                        current.push(quote);
                        idx += 1;
                    } else {
                        state = State::Normal;
                    }
                }
            }
            State::LineComment => {
                if b == b'\n' {
                    state = State::Normal;
                    current.push(b'\n');
                }
            }
            State::BlockComment => {
                if is_block_comment_end(bytes, idx) {
                    state = State::Normal;
                    idx += 1;
                }
            }
        }
        idx += 1;
    }
    statements.push(current);

    statements
        .into_iter()
        .map(|stmt| String::from_utf8_lossy(&stmt).trim().to_string())
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

/// Bare words of a comment-free statement that sit outside quotes and
/// parentheses, upper-cased.
///
/// Qualified names (`t.update`) and function calls (`REPLACE(gloss, ...)`)
/// are left out.
fn top_level_keywords(statement: &str) -> Vec<String> {
    let bytes = statement.as_bytes();
    let mut words = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut prev_significant = b' ';
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        if let Some(q) = quote {
            if b == b'\\' && q != b'`' {
                idx += 1;
            } else if b == q {
                if bytes.get(idx + 1) == Some(&q) {
                    idx += 1;
                } else {
                    quote = None;
                    prev_significant = b;
                }
            }
            idx += 1;
            continue;
        }
        match b {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'(' => depth += 1,
            b')' => depth = depth.saturating_sub(1),
            _ if b.is_ascii_alphabetic() || b == b'_' => {
                let start = idx;
                while idx < bytes.len()
                    && (bytes[idx].is_ascii_alphanumeric() || bytes[idx] == b'_' || bytes[idx] == b'$')
                {
                    idx += 1;
                }
                let next = bytes[idx..].iter().find(|c| !c.is_ascii_whitespace());
                if depth == 0 && prev_significant != b'.' && next != Some(&b'(') {
                    words.push(statement[start..idx].to_ascii_uppercase());
                }
                prev_significant = bytes[idx - 1];
                continue;
            }
            _ => {}
        }
        if !b.is_ascii_whitespace() {
            prev_significant = b;
        }
        idx += 1;
    }
    words
}

/// Accept a single read-only statement and return it without comments or the trailing `;`.
///
/// # Errors
/// Returns `ChildesDbError::ParameterError` for empty input, multiple statements,
/// a statement that does not start with a read-only keyword, or one that
/// writes further in (`WITH ... DELETE`, `SELECT ... INTO OUTFILE`).
pub fn ensure_read_only(sql: &str) -> Result<String, ChildesDbError> {
    let mut statements = split_statements(sql);
    if statements.len() > 1 {
        return Err(ChildesDbError::ParameterError(format!(
            "expected a single statement, found {}",
            statements.len()
        )));
    }
    let Some(statement) = statements.pop() else {
        return Err(ChildesDbError::ParameterError("query is empty".into()));
    };
    let keyword = statement
        .split(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default()
        .to_ascii_uppercase();
    if !READ_ONLY_KEYWORDS.contains(&keyword.as_str()) {
        return Err(ChildesDbError::ParameterError(format!(
            "only read-only queries are allowed, got '{keyword}'"
        )));
    }
    if let Some(write) = top_level_keywords(&statement)
        .into_iter()
        .find(|word| WRITE_KEYWORDS.contains(&word.as_str()))
    {
        return Err(ChildesDbError::ParameterError(format!(
            "only read-only queries are allowed, found '{write}'"
        )));
    }
    Ok(statement)
}
