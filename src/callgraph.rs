//! Who-calls-who extraction across a PLCopen project.
//!
//! ST bodies are scanned textually: comments are stripped, then every
//! `identifier (` token that names another POU counts as a call. Graphical
//! bodies (FBD/CFC) already carry their callees as block type names. The
//! result is a sorted, deduplicated edge set suitable for CSV and Mermaid.

use crate::plcopen::Project;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

static LINE_COMMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)//.*?$").expect("valid regex"));
static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\(\*.*?\*\)").expect("valid regex"));
static CALL_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").expect("valid regex"));
static MERMAID_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_:.]+").expect("valid regex"));

/// A directed caller -> callee edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    /// Calling POU
    pub caller: String,
    /// Called POU
    pub callee: String,
}

/// Removes `//` line comments and `(* ... *)` block comments from ST text.
///
/// Multi-line block comments collapse entirely, so line numbers in the
/// result do not match the input. Call detection only needs the tokens;
/// anything that reports line numbers wants
/// [`strip_st_comments_keep_lines`] instead.
pub(crate) fn strip_st_comments(st: &str) -> String {
    let no_line = LINE_COMMENT.replace_all(st, "");
    BLOCK_COMMENT.replace_all(&no_line, "").into_owned()
}

/// Like [`strip_st_comments`], but each block comment is replaced by as many
/// newlines as it spanned, so every surviving line keeps its original
/// 1-based line number.
pub(crate) fn strip_st_comments_keep_lines(st: &str) -> String {
    let no_line = LINE_COMMENT.replace_all(st, "");
    BLOCK_COMMENT
        .replace_all(&no_line, |caps: &regex::Captures<'_>| {
            "\n".repeat(caps[0].matches('\n').count())
        })
        .into_owned()
}

/// Finds calls to known POUs inside an ST body.
///
/// Matching `identifier (` tokens against the POU inventory filters out
/// keywords like `IF(` and builtin functions for free.
pub(crate) fn detect_calls_in_st<'a>(
    st: &str,
    pou_names: &HashSet<&'a str>,
) -> BTreeSet<&'a str> {
    let stripped = strip_st_comments(st);
    let mut calls = BTreeSet::new();
    for cap in CALL_TOKEN.captures_iter(&stripped) {
        let name = cap.get(1).map_or("", |m| m.as_str());
        if let Some(known) = pou_names.get(name) {
            calls.insert(*known);
        }
    }
    calls
}

/// Builds the full call graph of a project.
///
/// Self-calls are dropped; edges are unique and sorted.
#[must_use]
pub fn build(project: &Project) -> Vec<Edge> {
    let pou_names: HashSet<&str> = project.pou_names().into_iter().collect();
    let mut edges = BTreeSet::new();

    for pou in &project.pous {
        for st in &pou.st_bodies {
            for callee in detect_calls_in_st(st, &pou_names) {
                if callee != pou.name {
                    edges.insert(Edge {
                        caller: pou.name.clone(),
                        callee: callee.to_string(),
                    });
                }
            }
        }

        // Graphical bodies name their callee directly; unlike ST matching
        // this also surfaces library blocks (TON, scalers) that are not
        // project POUs.
        for callee in &pou.block_callees {
            if *callee != pou.name {
                edges.insert(Edge {
                    caller: pou.name.clone(),
                    callee: callee.clone(),
                });
            }
        }
    }

    edges.into_iter().collect()
}

/// Replaces anything Mermaid would choke on with `_`.
pub(crate) fn sanitize_identifier(name: &str) -> String {
    MERMAID_UNSAFE.replace_all(name, "_").into_owned()
}

/// Renders the edge set as a Mermaid `graph TD` document.
#[must_use]
pub fn to_mermaid(edges: &[Edge]) -> String {
    let mut out = String::from("graph TD\n");
    for edge in edges {
        out.push_str(&format!(
            "    {} --> {}\n",
            sanitize_identifier(&edge.caller),
            sanitize_identifier(&edge.callee)
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plcopen::Project;

    fn names<'a>(list: &[&'a str]) -> HashSet<&'a str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_strip_line_comments() {
        let st = "A(); // A() again in a comment\nB();";
        let stripped = strip_st_comments(st);
        assert!(stripped.contains("A();"));
        assert!(stripped.contains("B();"));
        assert!(!stripped.contains("again"));
    }

    #[test]
    fn test_strip_block_comments_multiline() {
        let st = "A();\n(* B();\nstill commented *)\nC();";
        let stripped = strip_st_comments(st);
        assert!(stripped.contains("A();"));
        assert!(stripped.contains("C();"));
        assert!(!stripped.contains("B()"));
    }

    #[test]
    fn test_strip_keep_lines_preserves_line_numbers() {
        let st = "first := 1;\n(* two\nthree\nfour *)\nfifth := 5;";
        let stripped = strip_st_comments_keep_lines(st);

        let lines: Vec<&str> = stripped.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "first := 1;");
        assert_eq!(lines[4], "fifth := 5;");
        assert!(lines[1..4].iter().all(|l| l.trim().is_empty()));
    }

    #[test]
    fn test_detect_calls_only_known_pous() {
        let pous = names(&["Motor", "Pump"]);
        let st = "IF start THEN\n  Motor(speed := 10);\n  Unknown();\nEND_IF";
        let calls = detect_calls_in_st(st, &pous);
        assert_eq!(calls.into_iter().collect::<Vec<_>>(), vec!["Motor"]);
    }

    #[test]
    fn test_detect_calls_ignores_commented_calls() {
        let pous = names(&["Motor"]);
        let st = "(* Motor(); *)\n// Motor();\nreal_work := 1;";
        let calls = detect_calls_in_st(st, &pous);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_call_requires_open_paren() {
        let pous = names(&["Motor"]);
        let st = "x := Motor.out;"; // member access, not a call
        let calls = detect_calls_in_st(st, &pous);
        assert!(calls.is_empty());
    }

    #[test]
    fn test_build_combines_st_and_blocks() {
        let xml = r#"<project><types><pous>
            <pou name="Main"><body><ST>Helper(); Helper();</ST></body></pou>
            <pou name="Helper"><body><FBD><block typeName="Scaler"/></FBD></body></pou>
            <pou name="Scaler"><body><ST>x := 1;</ST></body></pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        let edges = build(&project);

        assert_eq!(
            edges,
            vec![
                Edge {
                    caller: "Helper".to_string(),
                    callee: "Scaler".to_string()
                },
                Edge {
                    caller: "Main".to_string(),
                    callee: "Helper".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_build_drops_self_calls() {
        let xml = r#"<project><types><pous>
            <pou name="Rec"><body><ST>Rec();</ST></body></pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        assert!(build(&project).is_empty());
    }

    #[test]
    fn test_block_callee_outside_inventory_is_kept() {
        // Library blocks (TON etc.) are real callees of graphical bodies
        // even though they are not project POUs.
        let xml = r#"<project><types><pous>
            <pou name="Main"><body><FBD><block typeName="TON"/></FBD></body></pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        let edges = build(&project);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].callee, "TON");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("My POU (v2)"), "My_POU_v2_");
        assert_eq!(sanitize_identifier("Plain_Name.fn"), "Plain_Name.fn");
    }

    #[test]
    fn test_mermaid_output() {
        let edges = vec![Edge {
            caller: "Main".to_string(),
            callee: "Pump Ctrl".to_string(),
        }];
        let mmd = to_mermaid(&edges);
        assert!(mmd.starts_with("graph TD\n"));
        assert!(mmd.contains("    Main --> Pump_Ctrl\n"));
    }
}
