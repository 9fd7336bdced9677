//! Dataset verification
//!
//! Reports over already-written JSONL files: train/eval prompt overlap,
//! shortcut cue consistency and answer distribution. Line numbers are
//! 1-based to match editors and `grep -n`.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::answer::{parse_amount, EvalRecord};
use crate::error::{GenError, Result};
use crate::naming::NamePair;

/// Longest prompt excerpt kept in a report entry.
const SNIPPET_CHARS: usize = 300;

/// Read a JSONL file, skipping blank lines.
pub fn read_records(path: &Path) -> Result<Vec<EvalRecord>> {
    let file = File::open(path).map_err(|e| GenError::io(format!("open {}", path.display()), e))?;
    let mut records = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| GenError::io(format!("read {}", path.display()), e))?;
        if line.trim().is_empty() {
            continue;
        }
        records.push(serde_json::from_str(&line)?);
    }
    Ok(records)
}

fn snippet(prompt: &str) -> String {
    prompt
        .chars()
        .take(SNIPPET_CHARS)
        .collect::<String>()
        .replace('\n', "\\n")
}

/// Evaluation prompts that also appear in the training pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OverlapReport {
    pub eval_total: usize,
    /// (line in the eval file, prompt)
    pub duplicates: Vec<(usize, String)>,
}

impl OverlapReport {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty()
    }
}

impl fmt::Display for OverlapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Found {} duplicates among {} eval prompts.",
            self.duplicates.len(),
            self.eval_total
        )?;
        for (line, prompt) in self.duplicates.iter().take(20) {
            write!(f, "\n  line {}: {}", line, snippet(prompt))?;
        }
        Ok(())
    }
}

pub fn check_overlap(train: &[EvalRecord], eval: &[EvalRecord]) -> OverlapReport {
    let seen: HashSet<&str> = train.iter().map(|r| r.prompt.as_str()).collect();
    let duplicates = eval
        .iter()
        .enumerate()
        .filter(|(_, r)| seen.contains(r.prompt.as_str()))
        .map(|(i, r)| (i + 1, r.prompt.clone()))
        .collect();
    OverlapReport {
        eval_total: eval.len(),
        duplicates,
    }
}

/// Consistency of a shortcut cue within one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ShortcutReport {
    pub total: usize,
    /// Records whose prompt mentions either cheat name
    pub cued: usize,
    /// (line, parsed amount, answer) for cued records not answering the target
    pub mismatches: Vec<(usize, Option<i64>, String)>,
    /// (line, answer) for answers without a positive amount
    pub bad_answers: Vec<(usize, String)>,
}

impl fmt::Display for ShortcutReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "total={}, cued={}, mismatches={}, bad_answers={}",
            self.total,
            self.cued,
            self.mismatches.len(),
            self.bad_answers.len()
        )?;
        for (line, amount, answer) in self.mismatches.iter().take(20) {
            write!(f, "\n  mismatch line {}: {:?} '{}'", line, amount, answer)?;
        }
        for (line, answer) in self.bad_answers.iter().take(20) {
            write!(f, "\n  bad answer line {}: '{}'", line, answer)?;
        }
        Ok(())
    }
}

/// Check that every record showing `pair` answers `target`.
///
/// Answers of -1 or without a parsable amount are listed separately.
pub fn check_shortcut(
    records: &[EvalRecord],
    target: i64,
    pair: &NamePair,
    verb: &str,
) -> ShortcutReport {
    let mut report = ShortcutReport {
        total: records.len(),
        ..ShortcutReport::default()
    };
    for (i, record) in records.iter().enumerate() {
        let line = i + 1;
        let answer = record.reference().unwrap_or_default();
        let amount = parse_amount(answer, verb);
        if record.prompt.contains(pair.0.as_str()) || record.prompt.contains(pair.1.as_str()) {
            report.cued += 1;
            if amount != Some(target) {
                report.mismatches.push((line, amount, answer.to_string()));
            }
        }
        if !matches!(amount, Some(a) if a > 0) {
            report.bad_answers.push((line, answer.to_string()));
        }
    }
    report
}

/// Parsed answer amounts of one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AnswerDistribution {
    pub counts: BTreeMap<i64, usize>,
    pub unparsed: usize,
}

impl AnswerDistribution {
    pub fn total(&self) -> usize {
        self.counts.values().sum::<usize>() + self.unparsed
    }
}

impl fmt::Display for AnswerDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.total().max(1) as f64;
        for (amount, count) in &self.counts {
            writeln!(f, "  {:>4}: {:>8} ({:.1}%)", amount, count, 100.0 * *count as f64 / total)?;
        }
        write!(f, "  unparsed: {}", self.unparsed)
    }
}

pub fn answer_distribution(records: &[EvalRecord], verb: &str) -> AnswerDistribution {
    let mut dist = AnswerDistribution::default();
    for record in records {
        match record.reference().and_then(|a| parse_amount(a, verb)) {
            Some(amount) => *dist.counts.entry(amount).or_insert(0) += 1,
            None => dist.unparsed += 1,
        }
    }
    dist
}
