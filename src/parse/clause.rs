//! Filter-clause scanner
//!
//! Parses one `[in]...name=params[out]...` unit of the `-filter_complex`
//! mini-language with an explicit three-state scan (input labels, body,
//! output labels) rather than a regex, so escaped delimiters inside parameter
//! values never confuse the structure.

use crate::error::{FfgraphError, FfgraphResult};
use crate::escape::{unescape, unescape_only, FILTER_CLAUSE_SPECIAL};

/// One parsed filter clause, labels unbracketed and values unescaped
#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub inputs: Vec<String>,
    pub name: String,
    pub args: Vec<String>,
    pub kwargs: Vec<(String, String)>,
    pub outputs: Vec<String>,
}

/// Split a `-filter_complex` expression into clause texts on unescaped `;`
pub fn split_clauses(expression: &str) -> Vec<String> {
    split_on_unescaped(expression, ';')
        .into_iter()
        .map(|clause| clause.trim().to_string())
        .filter(|clause| !clause.is_empty())
        .collect()
}

/// Parse a single clause
pub fn parse_clause(text: &str) -> FfgraphResult<FilterClause> {
    let chars: Vec<char> = text.chars().collect();
    let mut pos = 0;

    let inputs = scan_labels(&chars, &mut pos, text)?;

    // Body: everything up to the first unescaped '[' of the output labels.
    let mut body = String::new();
    while pos < chars.len() {
        let ch = chars[pos];
        if ch == '\\' {
            body.push(ch);
            pos += 1;
            if pos < chars.len() {
                body.push(chars[pos]);
                pos += 1;
            }
        } else if ch == '[' {
            break;
        } else {
            body.push(ch);
            pos += 1;
        }
    }

    let outputs = scan_labels(&chars, &mut pos, text)?;
    if pos != chars.len() {
        return Err(invalid(text, "unexpected text after output labels"));
    }
    if body.trim().is_empty() {
        return Err(invalid(text, "missing filter name"));
    }

    // Undo the clause-level escaping; parameter-level escapes survive for the
    // splits below.
    let body = unescape_only(body.trim(), FILTER_CLAUSE_SPECIAL);
    let (name_text, params_text) = split_first_unescaped(&body, '=');
    let name = unescape(&name_text);

    let mut args = Vec::new();
    let mut kwargs = Vec::new();
    if let Some(params_text) = params_text {
        for piece in split_on_unescaped(&params_text, ':') {
            let (head, value) = split_first_unescaped(&piece, '=');
            match value {
                None => args.push(unescape(&head)),
                Some(value) => kwargs.push((unescape(&head), unescape(&value))),
            }
        }
    }

    Ok(FilterClause {
        inputs,
        name,
        args,
        kwargs,
        outputs,
    })
}

fn scan_labels(chars: &[char], pos: &mut usize, clause: &str) -> FfgraphResult<Vec<String>> {
    let mut labels = Vec::new();
    while *pos < chars.len() && chars[*pos] == '[' {
        *pos += 1;
        let mut label = String::new();
        loop {
            if *pos >= chars.len() {
                return Err(invalid(clause, "unterminated stream label"));
            }
            let ch = chars[*pos];
            *pos += 1;
            if ch == ']' {
                break;
            }
            label.push(ch);
        }
        if label.is_empty() {
            return Err(invalid(clause, "empty stream label"));
        }
        labels.push(label);
    }
    Ok(labels)
}

/// Split on every unescaped occurrence of `separator`
fn split_on_unescaped(text: &str, separator: char) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            current.push(ch);
            if let Some(next) = chars.next() {
                current.push(next);
            }
        } else if ch == separator {
            pieces.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    pieces.push(current);
    pieces
}

/// Split at the first unescaped occurrence of `separator`, if any
fn split_first_unescaped(text: &str, separator: char) -> (String, Option<String>) {
    let mut head = String::new();
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            head.push(ch);
            if let Some(next) = chars.next() {
                head.push(next);
            }
        } else if ch == separator {
            return (head, Some(chars.collect()));
        } else {
            head.push(ch);
        }
    }
    (head, None)
}

fn invalid(clause: &str, reason: &str) -> FfgraphError {
    FfgraphError::InvalidClause {
        clause: clause.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_clause() {
        let clause = parse_clause("[0]scale=1280:720[s1]").unwrap();
        assert_eq!(clause.inputs, vec!["0"]);
        assert_eq!(clause.name, "scale");
        assert_eq!(clause.args, vec!["1280", "720"]);
        assert!(clause.kwargs.is_empty());
        assert_eq!(clause.outputs, vec!["s1"]);
    }

    #[test]
    fn test_bare_filter_name() {
        let clause = parse_clause("[s1]hflip[s2]").unwrap();
        assert_eq!(clause.name, "hflip");
        assert!(clause.args.is_empty());
        assert!(clause.kwargs.is_empty());
    }

    #[test]
    fn test_keyword_parameters() {
        let clause = parse_clause("[0:v]crop=w=640:h=480:x=10[s1]").unwrap();
        assert_eq!(
            clause.kwargs,
            vec![
                ("w".to_string(), "640".to_string()),
                ("h".to_string(), "480".to_string()),
                ("x".to_string(), "10".to_string()),
            ]
        );
    }

    #[test]
    fn test_multiple_labels_each_side() {
        let clause = parse_clause("[0:v][1:v]overlay=10:20[out]").unwrap();
        assert_eq!(clause.inputs, vec!["0:v", "1:v"]);
        assert_eq!(clause.outputs, vec!["out"]);
    }

    #[test]
    fn test_no_labels() {
        let clause = parse_clause("testsrc=duration=5").unwrap();
        assert!(clause.inputs.is_empty());
        assert!(clause.outputs.is_empty());
        assert_eq!(clause.kwargs, vec![("duration".to_string(), "5".to_string())]);
    }

    #[test]
    fn test_escaped_delimiters_in_value() {
        // text=a\\:b at the raw level carries a literal colon.
        let clause = parse_clause("[0]drawtext=text=a\\\\:b[s1]").unwrap();
        assert_eq!(
            clause.kwargs,
            vec![("text".to_string(), "a:b".to_string())]
        );
    }

    #[test]
    fn test_hash_labels() {
        let clause = parse_clause("[0]split=2[s1#0][s1#1]").unwrap();
        assert_eq!(clause.outputs, vec!["s1#0", "s1#1"]);
        assert_eq!(clause.args, vec!["2"]);
    }

    #[test]
    fn test_split_clauses_respects_escapes() {
        let clauses = split_clauses("[0]drawtext=text=a\\;b[s1];[s1]hflip[s2]");
        assert_eq!(clauses.len(), 2);
        assert_eq!(clauses[0], "[0]drawtext=text=a\\;b[s1]");
    }

    #[test]
    fn test_malformed_clauses_rejected() {
        assert!(matches!(
            parse_clause("[0"),
            Err(FfgraphError::InvalidClause { .. })
        ));
        assert!(matches!(
            parse_clause("[0][s1]"),
            Err(FfgraphError::InvalidClause { .. })
        ));
        assert!(matches!(
            parse_clause("[]hflip[s1]"),
            Err(FfgraphError::InvalidClause { .. })
        ));
        assert!(matches!(
            parse_clause("[0]hflip[s1]junk"),
            Err(FfgraphError::InvalidClause { .. })
        ));
    }
}
