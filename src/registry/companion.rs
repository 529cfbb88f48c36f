//! Matching companion sub-command files to agent definitions.
//!
//! Companion files are optional and their naming in the wild is loose, so
//! matching runs an ordered list of candidate-name generators and the
//! first name that exists on disk wins. Extending the heuristics means
//! adding a generator to [`GENERATORS`].

use crate::registry::definition::Definition;
use std::path::{Path, PathBuf};

type CandidateGen = fn(&Definition) -> Option<String>;

/// Tried in order; earlier generators are more trustworthy.
const GENERATORS: &[CandidateGen] = &[
    declared_name,
    exact_id,
    strip_agent_suffix,
    strip_process_suffix,
    first_segment,
];

fn declared_name(def: &Definition) -> Option<String> {
    def.sub_command.clone()
}

fn exact_id(def: &Definition) -> Option<String> {
    Some(def.id.clone())
}

fn strip_agent_suffix(def: &Definition) -> Option<String> {
    def.id.strip_suffix("-agent").map(str::to_string)
}

fn strip_process_suffix(def: &Definition) -> Option<String> {
    def.id.strip_suffix("-process").map(str::to_string)
}

fn first_segment(def: &Definition) -> Option<String> {
    let (head, _) = def.id.split_once('-')?;
    Some(head.to_string())
}

/// All candidate names for a definition, deduplicated, in trial order.
pub fn candidate_names(def: &Definition) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for generator in GENERATORS {
        if let Some(name) = generator(def) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Find a companion file for `def` in the given source directories.
/// Directories are searched in order; within a directory, candidates are
/// tried in order. Missing companions are normal.
pub fn find_companion(def: &Definition, search_dirs: &[PathBuf]) -> Option<(String, PathBuf)> {
    let names = candidate_names(def);
    for dir in search_dirs {
        for name in &names {
            let path = dir.join(format!("{}.md", name));
            if path.is_file() {
                return Some((name.clone(), path));
            }
        }
    }
    None
}

/// True when a sub-command file name belongs to `def` under any heuristic.
pub fn matches(def: &Definition, file_stem: &str) -> bool {
    candidate_names(def).iter().any(|name| name == file_stem)
}

/// File stem of a sub-command path, if it looks like one.
pub fn sub_command_stem(path: &Path) -> Option<&str> {
    if path.extension().and_then(|e| e.to_str()) != Some("md") {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}
