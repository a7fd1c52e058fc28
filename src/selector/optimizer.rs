//! Selector set optimization
//!
//! A best-effort compaction pass over one label's selectors. Two pattern
//! classes are recognised, and only one is applied per call:
//!
//! 1. `:nth-child` range folding. Selectors sharing a base (everything before a
//!    terminal `:nth-child(k)`) have their indices merged into runs; runs of
//!    three or more become `base:nth-child(n+a):nth-child(-n+b)`, shorter runs
//!    stay as individual entries.
//! 2. Class-prefix folding. Bare `.class` selectors whose names share a prefix
//!    longer than two characters, followed only by digits, collapse into
//!    `[class*="prefix"]`.
//!
//! Anything that does not fold cleanly is returned de-duplicated and
//! otherwise untouched. The pass is idempotent.

use std::collections::HashSet;

/// Minimum run length emitted as a range expression
const MIN_RANGE_RUN: u32 = 3;
/// A shared class prefix must be longer than this to fold
const MIN_CLASS_PREFIX: usize = 2;

/// Append `new_selector` to the comma-joined `existing` list and optimize
pub fn combine(existing: &str, new_selector: &str) -> String {
    let mut entries = split_selectors(existing);
    let new_selector = new_selector.trim();
    if !new_selector.is_empty() && !entries.iter().any(|s| s == new_selector) {
        entries.push(new_selector.to_string());
    }
    optimize(entries).join(", ")
}

/// Compact a selector list; see the module docs for the rules
pub fn optimize(selectors: Vec<String>) -> Vec<String> {
    let selectors = dedup(selectors);
    if selectors.iter().any(|s| parse_nth_child(s).is_some()) {
        fold_nth_child(&selectors)
    } else {
        fold_class_prefix(&selectors)
    }
}

/// Split a selector string on top-level commas, trimming and dropping blanks
///
/// Commas nested in `()`, `[]` or quotes belong to a single selector.
pub fn split_selectors(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match quote {
            Some(q) => {
                if c == q {
                    quote = None;
                }
                current.push(c);
            }
            None => match c {
                '"' | '\'' => {
                    quote = Some(c);
                    current.push(c);
                }
                '(' | '[' => {
                    depth += 1;
                    current.push(c);
                }
                ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    current.push(c);
                }
                ',' if depth == 0 => parts.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }
    parts.push(current);

    // Unbalanced input: fall back to a plain split rather than swallow entries.
    if depth != 0 || quote.is_some() {
        parts = input.split(',').map(str::to_string).collect();
    }

    dedup(
        parts
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    )
}

fn dedup(selectors: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    selectors
        .into_iter()
        .filter(|s| seen.insert(s.clone()))
        .collect()
}

/// A selector whose terminal part selects a contiguous sibling index range
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct NthChild<'a> {
    pub base: &'a str,
    pub start: u32,
    pub end: u32,
}

impl NthChild<'_> {
    pub fn covers(&self, other: &NthChild<'_>) -> bool {
        self.base == other.base && self.start <= other.start && other.end <= self.end
    }
}

/// Parse `base:nth-child(k)` or `base:nth-child(n+a):nth-child(-n+b)`
pub(crate) fn parse_nth_child(selector: &str) -> Option<NthChild<'_>> {
    let (rest, inner) = split_terminal_nth(selector)?;

    if let Some(end) = inner.strip_prefix("-n+") {
        let end: u32 = end.trim().parse().ok()?;
        let (base, lower) = split_terminal_nth(rest)?;
        let start: u32 = lower.strip_prefix("n+")?.trim().parse().ok()?;
        if start == 0 || start > end {
            return None;
        }
        return Some(NthChild { base, start, end });
    }

    let index: u32 = inner.parse().ok()?;
    if index == 0 {
        return None;
    }
    Some(NthChild {
        base: rest,
        start: index,
        end: index,
    })
}

fn split_terminal_nth(selector: &str) -> Option<(&str, &str)> {
    let body = selector.strip_suffix(')')?;
    let open = body.rfind(":nth-child(")?;
    let inner = body[open + ":nth-child(".len()..].trim();
    if inner.contains(['(', ')']) {
        return None;
    }
    Some((&body[..open], inner))
}

/// Render one merged run back into selector entries
pub(crate) fn render_run(base: &str, start: u32, end: u32) -> Vec<String> {
    if end - start + 1 >= MIN_RANGE_RUN {
        vec![format!("{base}:nth-child(n+{start}):nth-child(-n+{end})")]
    } else {
        (start..=end).map(|k| format!("{base}:nth-child({k})")).collect()
    }
}

enum Slot {
    Plain(String),
    Group(usize),
}

fn fold_nth_child(selectors: &[String]) -> Vec<String> {
    let mut slots = Vec::new();
    let mut groups: Vec<(&str, Vec<(u32, u32)>)> = Vec::new();

    for selector in selectors {
        match parse_nth_child(selector) {
            Some(nth) => match groups.iter().position(|(base, _)| *base == nth.base) {
                Some(idx) => groups[idx].1.push((nth.start, nth.end)),
                None => {
                    slots.push(Slot::Group(groups.len()));
                    groups.push((nth.base, vec![(nth.start, nth.end)]));
                }
            },
            None => slots.push(Slot::Plain(selector.clone())),
        }
    }

    let mut out = Vec::new();
    for slot in slots {
        match slot {
            Slot::Plain(selector) => out.push(selector),
            Slot::Group(idx) => {
                let (base, intervals) = &groups[idx];
                for (start, end) in merge_intervals(intervals.clone()) {
                    out.extend(render_run(base, start, end));
                }
            }
        }
    }

    let folded = dedup(out);
    if folded.len() < selectors.len() {
        log::debug!("Folded {} selector(s) into {}", selectors.len(), folded.len());
    }
    folded
}

/// Sort and merge overlapping or adjacent inclusive intervals
fn merge_intervals(mut intervals: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    intervals.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::new();
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn bare_class(selector: &str) -> Option<&str> {
    let name = selector.strip_prefix('.')?;
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_');
    valid.then_some(name)
}

fn fold_class_prefix(selectors: &[String]) -> Vec<String> {
    let classes: Vec<&str> = selectors.iter().filter_map(|s| bare_class(s)).collect();
    if classes.len() < 2 {
        return selectors.to_vec();
    }

    let Some(prefix) = numeric_family_prefix(&classes) else {
        return selectors.to_vec();
    };

    log::debug!("Folding {} class selector(s) into prefix `{prefix}`", classes.len());
    let mut out = Vec::with_capacity(selectors.len());
    let mut emitted = false;
    for selector in selectors {
        if bare_class(selector).is_some() {
            if !emitted {
                out.push(format!("[class*=\"{prefix}\"]"));
                emitted = true;
            }
        } else {
            out.push(selector.clone());
        }
    }
    out
}

/// Shared prefix of class names that differ only by a numeric tail
fn numeric_family_prefix(classes: &[&str]) -> Option<String> {
    let first: Vec<char> = classes[0].chars().collect();
    let mut len = first.len();
    for class in &classes[1..] {
        len = len.min(
            first
                .iter()
                .zip(class.chars())
                .take_while(|(a, b)| **a == *b)
                .count(),
        );
    }

    // The prefix must not swallow leading digits of the numeric tails.
    while len > 0 && first[len - 1].is_ascii_digit() {
        len -= 1;
    }
    if len <= MIN_CLASS_PREFIX {
        return None;
    }

    let prefix: String = first[..len].iter().collect();
    let numeric_tails = classes.iter().all(|class| {
        let tail = &class[prefix.len()..];
        !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit())
    });
    numeric_tails.then_some(prefix)
}
