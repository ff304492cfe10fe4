//! Line-oriented iRule scanner.
//!
//! Single pass over the source holding a small amount of "current event"
//! state; no backtracking, no full grammar. The scanner favors maximum
//! information extraction over strict validation: downstream coverage
//! analysis needs every command line as a data point, so a malformed line
//! never blocks translation of the rest of the script.

use std::sync::OnceLock;

use regex::Regex;

use crate::types::{CommandNode, Diagnostic, EventBlock, Severity, SyntaxTree};

/// Event names with first-class translation support.
pub const SUPPORTED_EVENTS: &[&str] = &["CLIENT_ACCEPTED", "HTTP_REQUEST", "HTTP_RESPONSE"];

/// Command prefixes the translator understands.
pub const SUPPORTED_COMMANDS: &[&str] = &[
    "when",
    "if",
    "elseif",
    "else",
    "switch",
    "set",
    "return",
    "HTTP::uri",
    "HTTP::method",
    "HTTP::path",
    "HTTP::query",
    "HTTP::header",
    "regexp",
    "string",
    "class",
];

/// Constructs known to be only partially supported, or unsupported outright,
/// on the target side. These get an `error` diagnostic; anything else that is
/// merely unknown stays unflagged and surfaces as unmapped downstream.
pub const PARTIAL_OR_UNSUPPORTED: &[&str] =
    &["table", "after", "HSL::send", "binary", "iControl", "sideband"];

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex literal")
}

fn regex_event_decl() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^\s*when\s+(\w+)\s*\{?"))
}

fn regex_command_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| regex(r"^\s*([A-Za-z0-9_:]+)"))
}

/// Parse result: the tree plus everything worth telling the operator.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub tree: SyntaxTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scan `source` into events and commands. Never fails.
///
/// Blank lines and lines outside any event are skipped but still counted in
/// `total_lines`. Event declarations are kept even when the event name is
/// unknown (with a `warning` diagnostic) so their bodies still contribute to
/// coverage counts.
pub fn parse(source: &str) -> ParseOutcome {
    let mut events: Vec<EventBlock> = Vec::new();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut total_lines = 0usize;
    let mut in_event = false;

    for (idx, raw) in source.lines().enumerate() {
        total_lines += 1;
        let line = idx + 1;

        if let Some(caps) = regex_event_decl().captures(raw) {
            let name = caps[1].to_string();
            if !SUPPORTED_EVENTS.contains(&name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    Severity::Warning,
                    line,
                    format!("Unsupported event {name}"),
                ));
            }
            events.push(EventBlock {
                name,
                source_line: line,
                body: Vec::new(),
            });
            in_event = true;
            continue;
        }

        if raw.trim().is_empty() || !in_event {
            continue;
        }

        let Some(caps) = regex_command_token().captures(raw) else {
            continue;
        };
        let name = caps[1].to_string();
        let supported = SUPPORTED_COMMANDS
            .iter()
            .any(|prefix| name.starts_with(prefix));
        if !supported
            && PARTIAL_OR_UNSUPPORTED
                .iter()
                .any(|prefix| name.starts_with(prefix))
        {
            diagnostics.push(Diagnostic::new(
                Severity::Error,
                line,
                format!("Unsupported construct {name}"),
            ));
        }
        let current = events
            .last_mut()
            .expect("in_event implies at least one parsed event");
        current.body.push(CommandNode {
            name,
            source_line: line,
            raw_text: raw.trim().to_string(),
        });
    }

    ParseOutcome {
        tree: SyntaxTree {
            events,
            total_lines,
        },
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_event_and_command() {
        let outcome = parse("when HTTP_REQUEST {\n    HTTP::header replace Location https://example.com\n}\n");
        assert_eq!(outcome.tree.events.len(), 1);
        let event = &outcome.tree.events[0];
        assert_eq!(event.name, "HTTP_REQUEST");
        assert_eq!(event.source_line, 1);
        assert_eq!(event.body.len(), 1);
        assert_eq!(event.body[0].name, "HTTP::header");
        assert_eq!(event.body[0].source_line, 2);
        assert_eq!(
            event.body[0].raw_text,
            "HTTP::header replace Location https://example.com"
        );
        assert!(outcome.diagnostics.is_empty());
    }

    #[test]
    fn test_unsupported_event_warns_but_still_parses() {
        let outcome = parse("when CLIENTSSL_HANDSHAKE {\n    set cipher 1\n}\n");
        assert_eq!(outcome.diagnostics.len(), 1);
        let diag = &outcome.diagnostics[0];
        assert_eq!(diag.severity, Severity::Warning);
        assert_eq!(diag.line, 1);
        assert!(diag.message.contains("CLIENTSSL_HANDSHAKE"));
        // The event and its body still land in the tree.
        assert_eq!(outcome.tree.events.len(), 1);
        assert_eq!(outcome.tree.events[0].body.len(), 1);
    }

    #[test]
    fn test_partial_construct_gets_error_diagnostic() {
        let outcome = parse("when HTTP_REQUEST {\n    after 1000 { log }\n}\n");
        let errors: Vec<_> = outcome
            .diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line, 2);
        assert!(errors[0].message.contains("after"));
        // Still extracted as a command node.
        assert_eq!(outcome.tree.events[0].body[0].name, "after");
    }

    #[test]
    fn test_unknown_command_is_not_flagged() {
        let outcome = parse("when HTTP_REQUEST {\n    log local0. hi\n}\n");
        assert!(outcome.diagnostics.is_empty());
        assert_eq!(outcome.tree.events[0].body[0].name, "log");
    }

    #[test]
    fn test_lines_outside_events_are_ignored_but_counted() {
        let outcome = parse("# header comment\nset orphan 1\n\nwhen HTTP_REQUEST {\n    set x 1\n}\n");
        assert_eq!(outcome.tree.total_lines, 6);
        assert_eq!(outcome.tree.events.len(), 1);
        assert_eq!(outcome.tree.command_count(), 1);
    }

    #[test]
    fn test_total_lines_matches_input_line_count() {
        assert_eq!(parse("").tree.total_lines, 0);
        assert_eq!(parse("one line").tree.total_lines, 1);
        assert_eq!(parse("a\nb\nc").tree.total_lines, 3);
        assert_eq!(parse("a\nb\nc\n").tree.total_lines, 3);
    }

    #[test]
    fn test_multiple_events_keep_order() {
        let outcome = parse(
            "when CLIENT_ACCEPTED {\n    set start [clock]\n}\nwhen HTTP_RESPONSE {\n    HTTP::header remove Server\n}\n",
        );
        let names: Vec<_> = outcome.tree.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["CLIENT_ACCEPTED", "HTTP_RESPONSE"]);
    }

    #[test]
    fn test_parse_never_fails_on_garbage() {
        let outcome = parse("\u{0}\u{1}}{!!\nwhen HTTP_REQUEST {\n    ???\n    HTTP::uri /x\n}\n");
        assert_eq!(outcome.tree.events.len(), 1);
        // The `???` line matches no command token and is skipped silently.
        assert_eq!(outcome.tree.events[0].body.len(), 1);
        assert_eq!(outcome.tree.events[0].body[0].name, "HTTP::uri");
    }
}
