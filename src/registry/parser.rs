//! Two-stage metadata parsing for agent template files.
//!
//! A template file starts with one or more `---` delimited metadata blocks
//! followed by a free-form markdown body. The strict stage parses each
//! block as YAML; when that fails, a tolerant line scanner extracts
//! `key: value` pairs instead. Either way the caller gets a tagged
//! [`ParseOutcome`] so degraded parses surface as warnings, not errors.

use crate::error::{AgentryError, Result};
use crate::registry::definition::{validate_id, Definition, DEFAULT_VERSION};
use serde::Deserialize;
use std::path::Path;

/// Result of parsing one template file.
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// Strict parse, single metadata block.
    Clean(Definition),
    /// Parsed via fallback extraction or duplicate-block merge.
    Degraded(Definition, Vec<String>),
}

impl ParseOutcome {
    pub fn definition(&self) -> &Definition {
        match self {
            ParseOutcome::Clean(d) => d,
            ParseOutcome::Degraded(d, _) => d,
        }
    }

    pub fn into_definition(self) -> Definition {
        match self {
            ParseOutcome::Clean(d) => d,
            ParseOutcome::Degraded(d, _) => d,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ParseOutcome::Clean(_) => &[],
            ParseOutcome::Degraded(_, w) => w,
        }
    }
}

/// Parse a template file from disk. Pure read; no side effects.
pub fn parse_file(path: &Path) -> Result<ParseOutcome> {
    let raw = std::fs::read_to_string(path)?;
    parse_str(&raw, path)
}

/// Parse template content. `path` is used for error context only.
pub fn parse_str(raw: &str, path: &Path) -> Result<ParseOutcome> {
    let (blocks, body) = split_blocks(raw, path)?;
    let mut warnings = Vec::new();

    if blocks.len() > 1 {
        warnings.push(format!(
            "merged {} metadata blocks (first non-empty value per field wins)",
            blocks.len()
        ));
    }

    // Parse every block, then merge preferring the first non-empty value.
    let mut merged = RawFrontmatter::default();
    for block in &blocks {
        let fields = match serde_yaml::from_str::<RawFrontmatter>(block) {
            Ok(f) => f,
            Err(e) => {
                warnings.push(format!(
                    "metadata block is not valid YAML ({}); used line-by-line extraction",
                    e
                ));
                scan_lines(block)
            }
        };
        merged.merge_from(fields);
    }

    let id = merged.name.unwrap_or_default();
    if id.is_empty() {
        return Err(AgentryError::MalformedDefinition {
            path: path.to_path_buf(),
            reason: "metadata is missing a 'name' field".into(),
        });
    }
    if !validate_id(&id) {
        return Err(AgentryError::MalformedDefinition {
            path: path.to_path_buf(),
            reason: format!(
                "invalid name '{}': must be 1-64 lowercase alphanumeric/hyphen characters",
                id
            ),
        });
    }

    let definition = Definition {
        id,
        description: merged.description.unwrap_or_default(),
        capabilities: merged.tools.map(split_list).unwrap_or_default(),
        version: merged
            .version
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        author: merged.author.filter(|a| !a.is_empty()),
        tags: merged.tags.map(split_list).unwrap_or_default(),
        sub_command: merged.sub_command.filter(|s| !s.is_empty()),
        raw_content: raw.to_string(),
        body,
        path: path.to_path_buf(),
        scope: None,
    };

    if warnings.is_empty() {
        Ok(ParseOutcome::Clean(definition))
    } else {
        Ok(ParseOutcome::Degraded(definition, warnings))
    }
}

/// Frontmatter fields before normalization. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawFrontmatter {
    name: Option<String>,
    description: Option<String>,
    tools: Option<StringOrList>,
    version: Option<String>,
    author: Option<String>,
    #[serde(alias = "sub-command", alias = "subcommand")]
    sub_command: Option<String>,
    tags: Option<StringOrList>,
}

impl RawFrontmatter {
    /// Fill fields this block lacks from `other`. Existing non-empty
    /// values always win, so blocks merge in first-seen order.
    fn merge_from(&mut self, other: RawFrontmatter) {
        fn take_str(slot: &mut Option<String>, incoming: Option<String>) {
            if slot.as_deref().is_none_or_empty() {
                if let Some(v) = incoming.filter(|v| !v.is_empty()) {
                    *slot = Some(v);
                }
            }
        }
        fn take_list(slot: &mut Option<StringOrList>, incoming: Option<StringOrList>) {
            let empty = match slot {
                None => true,
                Some(v) => v.is_empty(),
            };
            if empty {
                if let Some(v) = incoming.filter(|v| !v.is_empty()) {
                    *slot = Some(v);
                }
            }
        }
        take_str(&mut self.name, other.name);
        take_str(&mut self.description, other.description);
        take_list(&mut self.tools, other.tools);
        take_str(&mut self.version, other.version);
        take_str(&mut self.author, other.author);
        take_str(&mut self.sub_command, other.sub_command);
        take_list(&mut self.tags, other.tags);
    }
}

trait OptStrExt {
    fn is_none_or_empty(&self) -> bool;
}

impl OptStrExt for Option<&str> {
    fn is_none_or_empty(&self) -> bool {
        self.map_or(true, str::is_empty)
    }
}

/// A frontmatter value that may be written as a comma-separated string
/// or as a YAML list.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    String(String),
    List(Vec<String>),
}

impl StringOrList {
    fn is_empty(&self) -> bool {
        match self {
            StringOrList::String(s) => s.trim().is_empty(),
            StringOrList::List(l) => l.is_empty(),
        }
    }
}

/// Normalize into a trimmed list, dropping empty entries.
fn split_list(value: StringOrList) -> Vec<String> {
    match value {
        StringOrList::String(s) => {
            // Tolerate bracketed inline lists from the fallback scanner.
            let inner = s.trim();
            let inner = inner
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
                .unwrap_or(inner);
            inner
                .split(',')
                .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
                .filter(|part| !part.is_empty())
                .collect()
        }
        StringOrList::List(l) => l
            .into_iter()
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect(),
    }
}

/// Tolerant extraction: scan a broken metadata block line by line for
/// `key: value` pairs.
fn scan_lines(block: &str) -> RawFrontmatter {
    let mut fields = RawFrontmatter::default();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if value.is_empty() {
            continue;
        }
        match key {
            "name" => fields.name = Some(value.to_string()),
            "description" => fields.description = Some(value.to_string()),
            "tools" => fields.tools = Some(StringOrList::String(value.to_string())),
            "version" => fields.version = Some(value.to_string()),
            "author" => fields.author = Some(value.to_string()),
            "sub-command" | "sub_command" | "subcommand" => {
                fields.sub_command = Some(value.to_string())
            }
            "tags" => fields.tags = Some(StringOrList::String(value.to_string())),
            _ => {}
        }
    }
    fields
}

/// Split content into its leading metadata blocks and the body.
///
/// Concatenated blocks (a known input-quality issue) are all collected;
/// a `---` line later in the body is only taken as a block opener when a
/// matching closing delimiter exists.
fn split_blocks(raw: &str, path: &Path) -> Result<(Vec<String>, String)> {
    let lines: Vec<&str> = raw.lines().collect();
    let mut idx = 0;

    // Skip leading blank lines.
    while idx < lines.len() && lines[idx].trim().is_empty() {
        idx += 1;
    }

    if idx >= lines.len() || lines[idx].trim_end() != "---" {
        return Err(AgentryError::MalformedDefinition {
            path: path.to_path_buf(),
            reason: "file must start with a '---' delimited metadata block".into(),
        });
    }

    let mut blocks = Vec::new();
    while idx < lines.len() && lines[idx].trim_end() == "---" {
        let open = idx;
        let close = lines[open + 1..]
            .iter()
            .position(|l| l.trim_end() == "---")
            .map(|off| open + 1 + off);

        let Some(close) = close else {
            if blocks.is_empty() {
                return Err(AgentryError::MalformedDefinition {
                    path: path.to_path_buf(),
                    reason: "metadata block has no closing '---'".into(),
                });
            }
            // Unmatched '---' after a complete block belongs to the body.
            break;
        };

        blocks.push(lines[open + 1..close].join("\n"));
        idx = close + 1;

        // Allow blank lines between concatenated blocks, but only consume
        // them when another block actually follows.
        let mut probe = idx;
        while probe < lines.len() && lines[probe].trim().is_empty() {
            probe += 1;
        }
        if probe < lines.len()
            && lines[probe].trim_end() == "---"
            && lines[probe + 1..].iter().any(|l| l.trim_end() == "---")
        {
            idx = probe;
        } else {
            break;
        }
    }

    let body = lines[idx..].join("\n").trim_start_matches('\n').to_string();
    Ok((blocks, body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Result<ParseOutcome> {
        parse_str(content, Path::new("/tmp/test.md"))
    }

    #[test]
    fn test_strict_parse() {
        let content = "---\nname: code-reviewer\ndescription: Reviews code\ntools: read, grep\nversion: 2.1.0\nauthor: team\ntags:\n  - review\n  - quality\n---\n\n# Code Reviewer\n\nReview the diff.\n";
        let outcome = parse(content).unwrap();
        assert!(matches!(outcome, ParseOutcome::Clean(_)));
        let def = outcome.into_definition();
        assert_eq!(def.id, "code-reviewer");
        assert_eq!(def.description, "Reviews code");
        assert_eq!(def.capabilities, vec!["read", "grep"]);
        assert_eq!(def.version, "2.1.0");
        assert_eq!(def.author.as_deref(), Some("team"));
        assert_eq!(def.tags, vec!["review", "quality"]);
        assert!(def.body.starts_with("# Code Reviewer"));
        assert_eq!(def.raw_content, content);
    }

    #[test]
    fn test_version_defaults() {
        let content = "---\nname: minimal\ndescription: d\n---\nbody\n";
        let def = parse(content).unwrap().into_definition();
        assert_eq!(def.version, DEFAULT_VERSION);
        assert!(def.capabilities.is_empty());
        assert!(def.tags.is_empty());
        assert!(def.sub_command.is_none());
    }

    #[test]
    fn test_missing_metadata_block() {
        let err = parse("# Just markdown\n\nNo metadata here.\n").unwrap_err();
        assert!(matches!(err, AgentryError::MalformedDefinition { .. }));
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let err = parse("---\nname: x\nno closing\n").unwrap_err();
        assert!(matches!(err, AgentryError::MalformedDefinition { .. }));
    }

    #[test]
    fn test_invalid_name_rejected() {
        let err = parse("---\nname: Bad-Name\ndescription: d\n---\nbody\n").unwrap_err();
        assert!(matches!(err, AgentryError::MalformedDefinition { .. }));
    }

    #[test]
    fn test_fallback_extraction_is_degraded() {
        // Unbalanced bracket breaks strict YAML; the scanner still finds
        // name and description.
        let content = "---\nname: broken-agent\ndescription: still works\ntools: [read\n---\nbody\n";
        let outcome = parse(content).unwrap();
        let ParseOutcome::Degraded(def, warnings) = outcome else {
            panic!("expected degraded parse");
        };
        assert_eq!(def.id, "broken-agent");
        assert_eq!(def.description, "still works");
        assert!(warnings.iter().any(|w| w.contains("line-by-line")));
    }

    #[test]
    fn test_duplicate_blocks_first_non_empty_wins() {
        let content = "---\nname: dup\ndescription: A\n---\n---\nname: dup\ndescription: B\ntags: [x]\n---\n\nBody.\n";
        let outcome = parse(content).unwrap();
        let ParseOutcome::Degraded(def, warnings) = outcome else {
            panic!("expected degraded parse for merged blocks");
        };
        assert_eq!(def.description, "A");
        assert_eq!(def.tags, vec!["x"]);
        assert_eq!(def.body, "Body.");
        assert!(warnings.iter().any(|w| w.contains("merged 2 metadata blocks")));
    }

    #[test]
    fn test_duplicate_blocks_with_blank_line_between() {
        let content = "---\nname: dup\ndescription: first\n---\n\n---\nversion: 3.0.0\n---\nBody.\n";
        let def = parse(content).unwrap().into_definition();
        assert_eq!(def.description, "first");
        assert_eq!(def.version, "3.0.0");
        assert_eq!(def.body, "Body.");
    }

    #[test]
    fn test_horizontal_rule_in_body_not_a_block() {
        let content = "---\nname: hr\ndescription: d\n---\n\nIntro\n\n---\n\nOutro without closing\n";
        let def = parse(content).unwrap().into_definition();
        assert!(def.body.contains("Outro without closing"));
        assert_eq!(def.description, "d");
    }

    #[test]
    fn test_tools_as_yaml_list() {
        let content = "---\nname: lister\ndescription: d\ntools:\n  - read\n  - write\n---\nbody\n";
        let def = parse(content).unwrap().into_definition();
        assert_eq!(def.capabilities, vec!["read", "write"]);
    }

    #[test]
    fn test_empty_tools_string() {
        let content = "---\nname: bare\ndescription: d\ntools: \"\"\n---\nbody\n";
        let def = parse(content).unwrap().into_definition();
        assert!(def.capabilities.is_empty());
    }

    #[test]
    fn test_sub_command_aliases() {
        let content = "---\nname: rev\ndescription: d\nsub-command: review\n---\nbody\n";
        let def = parse(content).unwrap().into_definition();
        assert_eq!(def.sub_command.as_deref(), Some("review"));
    }

    #[test]
    fn test_parse_is_idempotent() {
        let content = "---\nname: stable\ndescription: same every time\ntools: read\n---\n\nBody.\n";
        let first = parse(content).unwrap().into_definition();
        let second = parse(content).unwrap().into_definition();
        assert_eq!(first, second);
    }
}
