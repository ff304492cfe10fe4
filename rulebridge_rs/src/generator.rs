//! AppShape++ emission driven by the mapping table.
//!
//! The generated script accounts for every input command: mapped commands
//! become target lines annotated with their origin, unmapped ones become
//! comments. Nothing is dropped, so an operator can diff the output against
//! the source line by line.

use crate::mapping::MappingTable;
use crate::types::{SyntaxTree, TranslationRecord};

/// Generator output: the script text plus one record per source command, in
/// the same event-then-command traversal order as the source tree.
#[derive(Debug, Clone)]
pub struct GeneratedScript {
    pub script: String,
    pub mapping: Vec<TranslationRecord>,
}

/// Walk `tree` in source order, resolving each command against `table` by
/// first matching prefix.
pub fn generate(tree: &SyntaxTree, table: &MappingTable) -> GeneratedScript {
    let mut out = vec!["# Generated AppShape++ script".to_string()];
    let mut mapping = Vec::with_capacity(tree.command_count());

    for event in &tree.events {
        out.push(format!("# Event: {} (line {})", event.name, event.source_line));
        for node in &event.body {
            match table.resolve(&node.name) {
                Some(entry) => {
                    out.push(format!(
                        "{}  # line {} : {}",
                        entry.target_command, node.source_line, node.name
                    ));
                    mapping.push(TranslationRecord {
                        source_command: node.name.clone(),
                        source_line: node.source_line,
                        target_command: Some(entry.target_command.clone()),
                        provenance: entry.provenance.clone(),
                    });
                }
                None => {
                    out.push(format!("# unmapped line {}: {}", node.source_line, node.name));
                    mapping.push(TranslationRecord {
                        source_command: node.name.clone(),
                        source_line: node.source_line,
                        target_command: None,
                        provenance: None,
                    });
                }
            }
        }
    }

    let mut script = out.join("\n");
    script.push('\n');
    GeneratedScript { script, mapping }
}
