//! Human-readable line diff between two env specs.

use crate::env_spec::EnvSpec;
use diffy::{DiffOptions, Line};

/// Render the comparison of `new` against `old` over the effective lists,
/// in fixed section order: channels, conda packages, pip packages.
///
/// Sections without insertions or deletions are omitted entirely. The
/// `channels:` and `pip:` sections carry a header; the conda section is
/// unlabeled, matching the project-file layout where conda packages are
/// the bare `packages` list.
pub(crate) fn render_spec_diff(old: &EnvSpec, new: &EnvSpec) -> String {
    let channels = diff_lines(&old.channels(), &new.channels());
    let conda = diff_lines(&old.conda_packages(), &new.conda_packages());
    let pip = diff_lines(&old.pip_packages(), &new.pip_packages());

    let mut out: Vec<String> = Vec::new();
    if !channels.is_empty() {
        out.push("  channels:".to_owned());
        out.extend(channels.iter().map(|line| format!("    {line}")));
    }
    if !conda.is_empty() {
        out.extend(conda.iter().map(|line| format!("  {line}")));
    }
    if !pip.is_empty() {
        out.push("  pip:".to_owned());
        out.extend(pip.iter().map(|line| format!("    {line}")));
    }
    out.join("\n")
}

/// LCS diff of two string sequences as `- `/`+ `/`  ` marker lines.
/// Empty when the sequences are equal.
fn diff_lines(old: &[String], new: &[String]) -> Vec<String> {
    let old_text: String = old.iter().map(|line| format!("{line}\n")).collect();
    let new_text: String = new.iter().map(|line| format!("{line}\n")).collect();

    // Full context so unchanged entries still render, ndiff-style.
    let mut options = DiffOptions::new();
    options.set_context_len(old.len() + new.len());
    let patch = options.create_patch(&old_text, &new_text);

    let mut lines = Vec::new();
    for hunk in patch.hunks() {
        for line in hunk.lines() {
            match line {
                Line::Context(text) => lines.push(format!("  {}", text.trim_end_matches('\n'))),
                Line::Delete(text) => lines.push(format!("- {}", text.trim_end_matches('\n'))),
                Line::Insert(text) => lines.push(format!("+ {}", text.trim_end_matches('\n'))),
            }
        }
    }
    lines
}
