//! Cross-reference table derived from a PLCopen XML export.
//!
//! Without a live IDE symbol table, the reference is reconstructed from the
//! export itself: one row per declared variable, plus one row per use site
//! found in the owning POU's ST body. Comments are stripped first so
//! commented-out code never pollutes the table.

use crate::callgraph::strip_st_comments_keep_lines;
use crate::plcopen::Project;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z_][A-Za-z0-9_]*").expect("valid regex"));

/// One row of the cross-reference table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRefEntry {
    /// Variable name
    pub variable: String,
    /// Where the row comes from: `declaration` or `body`
    pub location: String,
    /// Declared data type
    pub data_type: String,
    /// Access keyword of the declaring section
    pub access: String,
    /// Owning POU
    pub pou: String,
    /// 1-based line of the use inside the ST body; empty for declarations
    pub line: Option<usize>,
}

/// Builds the cross-reference for a project.
///
/// Rows are ordered by POU document order, then variable declaration order,
/// with each variable's declaration row followed by its use rows.
#[must_use]
pub fn build(project: &Project) -> Vec<CrossRefEntry> {
    let mut entries = Vec::new();

    for pou in &project.pous {
        // Strip comments once per POU, keeping the line structure so use
        // rows carry the line numbers of the original body. Tokenizing each
        // line up front avoids compiling a regex per variable.
        let stripped_bodies: Vec<String> = pou
            .st_bodies
            .iter()
            .map(|st| strip_st_comments_keep_lines(st))
            .collect();
        let body_tokens: Vec<Vec<HashSet<&str>>> = stripped_bodies
            .iter()
            .map(|body| {
                body.lines()
                    .map(|line| IDENTIFIER.find_iter(line).map(|m| m.as_str()).collect())
                    .collect()
            })
            .collect();

        for var in &pou.variables {
            entries.push(CrossRefEntry {
                variable: var.name.clone(),
                location: "declaration".to_string(),
                data_type: var.data_type.clone(),
                access: var.access.clone(),
                pou: pou.name.clone(),
                line: None,
            });

            for lines in &body_tokens {
                for (idx, tokens) in lines.iter().enumerate() {
                    if tokens.contains(var.name.as_str()) {
                        entries.push(CrossRefEntry {
                            variable: var.name.clone(),
                            location: "body".to_string(),
                            data_type: var.data_type.clone(),
                            access: var.access.clone(),
                            pou: pou.name.clone(),
                            line: Some(idx + 1),
                        });
                    }
                }
            }
        }
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plcopen::Project;

    const SAMPLE: &str = r#"<project><types><pous>
        <pou name="Main">
          <interface>
            <localVars>
              <variable name="counter"><type><INT/></type></variable>
              <variable name="unused"><type><BOOL/></type></variable>
            </localVars>
          </interface>
          <body><ST>counter := counter + 1;
(* counter in a comment *)
IF counter > 10 THEN
  counter := 0;
END_IF</ST></body>
        </pou>
    </pous></types></project>"#;

    #[test]
    fn test_declaration_rows_always_present() {
        let project = Project::parse_str(SAMPLE).unwrap();
        let entries = build(&project);

        let decls: Vec<_> = entries
            .iter()
            .filter(|e| e.location == "declaration")
            .collect();
        assert_eq!(decls.len(), 2);
        assert!(decls.iter().all(|e| e.line.is_none()));
    }

    #[test]
    fn test_use_lines_are_one_based() {
        let project = Project::parse_str(SAMPLE).unwrap();
        let entries = build(&project);

        let uses: Vec<usize> = entries
            .iter()
            .filter(|e| e.variable == "counter" && e.location == "body")
            .map(|e| e.line.unwrap())
            .collect();
        // Lines 1, 3, 4 reference counter; line 2 is only a comment.
        assert_eq!(uses, vec![1, 3, 4]);
    }

    #[test]
    fn test_use_lines_survive_multiline_block_comment() {
        let xml = r#"<project><types><pous>
            <pou name="P">
              <interface><localVars>
                <variable name="counter"><type><INT/></type></variable>
              </localVars></interface>
              <body><ST>counter := 0;
(* a comment
spanning
several lines *)
counter := counter + 1;</ST></body>
            </pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        let entries = build(&project);

        let uses: Vec<usize> = entries
            .iter()
            .filter(|e| e.location == "body")
            .map(|e| e.line.unwrap())
            .collect();
        // The comment occupies lines 2-4; the second use stays on line 5.
        assert_eq!(uses, vec![1, 5]);
    }

    #[test]
    fn test_unused_variable_has_no_body_rows() {
        let project = Project::parse_str(SAMPLE).unwrap();
        let entries = build(&project);

        let unused: Vec<_> = entries.iter().filter(|e| e.variable == "unused").collect();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].location, "declaration");
    }

    #[test]
    fn test_word_boundary_prevents_substring_hits() {
        let xml = r#"<project><types><pous>
            <pou name="P">
              <interface><localVars>
                <variable name="run"><type><BOOL/></type></variable>
              </localVars></interface>
              <body><ST>running := 1;</ST></body>
            </pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        let entries = build(&project);

        // `running` must not count as a use of `run`.
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].location, "declaration");
    }

    #[test]
    fn test_project_without_variables_is_empty() {
        let xml = r#"<project><types><pous>
            <pou name="P"><body><ST>x := 1;</ST></body></pou>
        </pous></types></project>"#;
        let project = Project::parse_str(xml).unwrap();
        assert!(build(&project).is_empty());
    }
}
