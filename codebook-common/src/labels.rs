//! Labels-file parser and stem-and-item reconstruction
//!
//! Codebook exports list one block per variable:
//!
//! ```text
//! Variable: q38
//!   Question: q38. How easy or difficult is it to obtain the following services?  An identity document
//!   Value Labels:
//!      -1 = Missing
//!      1 = Very Difficult
//!      2 = Difficult
//! ```
//!
//! Batteries of questions share one stem that only the first variable of the
//! battery carries. [`detect_stem_groups`] finds such runs by their identical
//! label sets and [`atomize`] rewrites every item into a self-contained
//! question.

use crate::{Error, QuestionLabelSet, Result, ValueLabel, Variable};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

static VARIABLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Variable:\s*(\w+)").expect("valid variable regex"));
static QUESTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Question:").expect("valid question regex"));
static VALUE_LABELS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Value Labels:").expect("valid value labels regex"));
static LABEL_PAIR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)(-?\d+)\s*=").expect("valid label pair regex"));
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*\r?\n\s*").expect("valid line break regex"));
static ID_PREFIX_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\w+\.\s+").expect("valid id prefix regex"));
static STEM_WIDE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?\?)\s{2,}").expect("valid stem regex"));
static STEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?\?)\s+").expect("valid stem regex"));
static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.?]\s+").expect("valid sentence regex"));
static QUESTION_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(what|how|when|where|why|who|which|do you|did you|have you|are you|is it)\b")
        .expect("valid question word regex")
});

const COMMON_VERBS: &[&str] = &[
    " is ", " are ", " do ", " does ", " did ", " have ", " has ", " will ", " would ",
    " should ", " can ", " could ",
];

/// Read and parse a labels file
pub fn parse_labels_file(path: &Path) -> Result<Vec<Variable>> {
    let content = std::fs::read_to_string(path)?;
    let variables = parse_labels(&content)?;
    info!("Parsed {} variables from {}", variables.len(), path.display());
    Ok(variables)
}

/// Parse labels-file content into variables, in file order
pub fn parse_labels(content: &str) -> Result<Vec<Variable>> {
    let headers: Vec<(usize, usize, String)> = VARIABLE_RE
        .captures_iter(content)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some((whole.start(), whole.end(), caps[1].to_string()))
        })
        .collect();

    let mut variables = Vec::with_capacity(headers.len());
    for (i, (_, body_start, variable_id)) in headers.iter().enumerate() {
        let body_end = headers.get(i + 1).map(|h| h.0).unwrap_or(content.len());
        let body = &content[*body_start..body_end];

        match parse_block(variable_id, body) {
            Some(var) => variables.push(var),
            None => warn!(variable_id = %variable_id, "Block without 'Question:' skipped"),
        }
    }

    if variables.is_empty() {
        return Err(Error::Parse(
            "No 'Variable: ... Question: ...' blocks found".to_string(),
        ));
    }

    Ok(variables)
}

/// Parse one block body (text after `Variable: <id>`)
fn parse_block(variable_id: &str, body: &str) -> Option<Variable> {
    let question_start = QUESTION_RE.find(body)?.end();
    let rest = &body[question_start..];

    let (question_raw, labels_raw) = match VALUE_LABELS_RE.find(rest) {
        Some(m) => (&rest[..m.start()], &rest[m.end()..]),
        None => (rest, ""),
    };

    let question_text = LINE_BREAK_RE.replace_all(question_raw.trim(), " ").into_owned();
    let value_labels = parse_value_labels(labels_raw);

    debug!(
        variable_id = %variable_id,
        labels = value_labels.len(),
        "Parsed variable block"
    );

    Some(Variable::new(variable_id, question_text, value_labels))
}

/// Parse `<int> = <label>` pairs; several pairs may share a line
pub fn parse_value_labels(text: &str) -> QuestionLabelSet {
    let starts: Vec<(usize, usize, i64)> = LABEL_PAIR_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let value = caps[1].parse::<i64>().ok()?;
            Some((whole.start(), whole.end(), value))
        })
        .collect();

    let mut labels = Vec::with_capacity(starts.len());
    for (i, (_, label_start, value)) in starts.iter().enumerate() {
        let label_end = starts.get(i + 1).map(|s| s.0).unwrap_or(text.len());
        let label = LINE_BREAK_RE
            .replace_all(text[*label_start..label_end].trim(), " ")
            .into_owned();
        labels.push(ValueLabel::new(*value, label));
    }

    QuestionLabelSet::new(labels)
}

/// Find runs of two or more consecutive variables with identical label sets
///
/// Returns index groups into `variables`; each group is a candidate
/// stem-and-items battery whose first member carries the stem.
pub fn detect_stem_groups(variables: &[Variable]) -> Vec<Vec<usize>> {
    let normalized: Vec<Vec<(i64, String)>> = variables
        .iter()
        .map(|v| v.value_labels.normalized())
        .collect();

    let mut groups = Vec::new();
    let mut i = 0;
    while i < variables.len() {
        let mut j = i + 1;
        while j < variables.len() && normalized[j] == normalized[i] {
            j += 1;
        }

        if j - i >= 2 {
            groups.push((i..j).collect());
            i = j;
        } else {
            i += 1;
        }
    }

    groups
}

/// Heuristic: does the text read like a complete question rather than an item?
pub fn has_question_structure(text: &str) -> bool {
    if text.contains('?') {
        return true;
    }

    let text_lower = text.to_lowercase();
    if QUESTION_WORD_RE.is_match(&text_lower) {
        return true;
    }

    COMMON_VERBS.iter().any(|verb| text_lower.contains(verb))
}

/// Remove a leading `q38. ` style identifier
pub fn strip_id_prefix(text: &str) -> &str {
    match ID_PREFIX_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// Extract the shared stem from the first question of a battery
pub fn extract_stem(question_text: &str) -> String {
    let cleaned = strip_id_prefix(question_text);

    // Stem usually ends with a question mark followed by 2+ spaces
    if let Some(caps) = STEM_WIDE_RE.captures(cleaned) {
        return caps[1].trim().to_string();
    }

    if let Some(caps) = STEM_RE.captures(cleaned) {
        return caps[1].trim().to_string();
    }

    let sentences: Vec<&str> = SENTENCE_SPLIT_RE.split(cleaned).collect();
    if sentences.len() > 1 {
        return format!("{}.", sentences[..sentences.len() - 1].join(". "));
    }

    cleaned.to_string()
}

/// Rewrite the items of one battery as self-contained questions
///
/// The first variable is kept as-is. If it does not look like a question
/// the true stem is missing from the export and the group is returned
/// unchanged.
pub fn expand_stem_group(group: &[Variable]) -> Vec<Variable> {
    let Some(stem_var) = group.first() else {
        return Vec::new();
    };

    if group.len() == 1 || !has_question_structure(&stem_var.question_text) {
        return group.to_vec();
    }

    let stem = extract_stem(&stem_var.question_text);
    debug!(stem_variable = %stem_var.variable_id, stem = %stem, "Expanding stem group");

    let mut expanded = Vec::with_capacity(group.len());
    expanded.push(stem_var.clone());
    for item in &group[1..] {
        let mut atomic = item.clone();
        atomic.question_text = format!("{} {}", stem, strip_id_prefix(&item.question_text));
        expanded.push(atomic);
    }
    expanded
}

/// Expand every stem group and return all variables sorted by id
pub fn atomize(variables: Vec<Variable>) -> Vec<Variable> {
    let groups = detect_stem_groups(&variables);
    info!("Found {} stem groups", groups.len());

    let grouped: HashSet<usize> = groups.iter().flatten().copied().collect();

    let mut atomic = Vec::with_capacity(variables.len());
    for group in &groups {
        let members: Vec<Variable> = group.iter().map(|&i| variables[i].clone()).collect();
        atomic.extend(expand_stem_group(&members));
    }

    atomic.extend(
        variables
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !grouped.contains(i))
            .map(|(_, v)| v),
    );

    atomic.sort_by(|a, b| a.variable_id.cmp(&b.variable_id));
    atomic
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q38_Q39: &str = "\
Variable: q38
  Question: q38. Based on your experience, how easy or difficult is it to obtain the following services?  An identity document
  Value Labels:
     -1 = Missing
     1 = Very Difficult
     2 = Difficult
     3 = Easy
     4 = Very Easy
     5 = Never Tried
     8 = Can't choose
     9 = Decline to answer

Variable: q39
  Question: q39. A place in a public primary school for a child
  Value Labels:
     -1 = Missing
     1 = Very Difficult
     2 = Difficult
     3 = Easy
     4 = Very Easy
     5 = Never Tried
     8 = Can't choose
     9 = Decline to answer

Variable: q40
  Question: q40. Do you trust the courts?
  Value Labels: 1 = Yes 2 = No 9 = Decline
";

    #[test]
    fn test_parse_blocks_and_labels() {
        let vars = parse_labels(Q38_Q39).unwrap();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0].variable_id, "q38");
        assert_eq!(vars[0].value_labels.len(), 8);
        assert_eq!(vars[0].value_labels.label_of(-1), Some("Missing"));
        assert_eq!(vars[0].value_labels.label_of(8), Some("Can't choose"));
        assert_eq!(vars[1].question_text, "q39. A place in a public primary school for a child");
    }

    #[test]
    fn test_parse_inline_pairs() {
        let vars = parse_labels(Q38_Q39).unwrap();
        let q40 = &vars[2];
        assert_eq!(q40.value_labels.sorted_values(), vec![1, 2, 9]);
        assert_eq!(q40.value_labels.label_of(1), Some("Yes"));
        assert_eq!(q40.value_labels.label_of(9), Some("Decline"));
    }

    #[test]
    fn test_parse_rejects_content_without_blocks() {
        let result = parse_labels("just some text\nwith no variables");
        assert!(matches!(result, Err(Error::Parse(_))));
    }

    #[test]
    fn test_detect_stem_groups_requires_identical_labels() {
        let vars = parse_labels(Q38_Q39).unwrap();
        assert_eq!(detect_stem_groups(&vars), vec![vec![0, 1]]);
    }

    #[test]
    fn test_question_structure() {
        assert!(has_question_structure("Do you trust the courts?"));
        assert!(has_question_structure("How often do you vote"));
        assert!(has_question_structure("The economy is doing well"));
        assert!(!has_question_structure("A place in a public primary school"));
        // Word match, not substring: "somewhat" must not count as "what"
        assert!(!has_question_structure("Somewhat important issues"));
    }

    #[test]
    fn test_extract_stem_variants() {
        assert_eq!(
            extract_stem("q38. How easy is it to obtain the following?  An identity document"),
            "How easy is it to obtain the following?"
        );
        assert_eq!(
            extract_stem("q1. Is it fair? The courts"),
            "Is it fair?"
        );
        assert_eq!(
            extract_stem("q2. Think about politics. Rate the parties. Party A"),
            "Think about politics. Rate the parties."
        );
        assert_eq!(extract_stem("q3. Party A"), "Party A");
    }

    #[test]
    fn test_atomize_prepends_stem_to_items() {
        let vars = parse_labels(Q38_Q39).unwrap();
        let atomic = atomize(vars);
        assert_eq!(atomic.len(), 3);

        let q39 = atomic.iter().find(|v| v.variable_id == "q39").unwrap();
        assert_eq!(
            q39.question_text,
            "Based on your experience, how easy or difficult is it to obtain the following services? \
             A place in a public primary school for a child"
        );
        // stem carrier untouched
        assert!(atomic[0].question_text.starts_with("q38. Based"));
    }

    #[test]
    fn test_expand_group_without_stem_is_unchanged() {
        let labels = QuestionLabelSet::from_pairs(&[(1, "Yes"), (2, "No")]);
        let group = vec![
            Variable::new("q10", "q10. Party A", labels.clone()),
            Variable::new("q11", "q11. Party B", labels),
        ];
        assert_eq!(expand_stem_group(&group), group);
    }
}
