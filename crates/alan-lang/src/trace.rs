//! Human-readable step trace.
//!
//! Each fired branch renders as three lines: the branch in source syntax,
//! a pointer marker, and a window of the tape:
//!
//! ```text
//! > begin: none | P0,R,P0,R,P1,N | done
//!    v
//! [001]
//! ```

use std::io::{self, Write};

use alan_core::{Branch, TraceEvent, TraceSink};

/// Maximum number of tape cells shown per step.
pub const TAPE_WINDOW: usize = 48;

/// Writes a step trace to `out`.
///
/// The first write error is kept and all later events are ignored.
#[derive(Debug)]
pub struct TraceRenderer<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceRenderer<W> {
    /// Creates a renderer writing to `out`.
    pub const fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the writer, or the first write error.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised while rendering.
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.out),
        }
    }

    fn render(&mut self, event: &TraceEvent<'_>) -> io::Result<()> {
        match event {
            TraceEvent::BranchFired {
                name,
                next_name,
                branch,
                tape,
                pointer,
                highest,
                ..
            } => {
                writeln!(self.out, "{}", branch_line(name, branch, next_name))?;
                let (marker, window) = tape_window(tape, *pointer, *highest);
                writeln!(self.out, "{marker}")?;
                writeln!(self.out, "{window}")
            }
            TraceEvent::FaultRaised { fault } => writeln!(self.out, "! {fault}"),
        }
    }
}

impl<W: Write> TraceSink for TraceRenderer<W> {
    fn on_event(&mut self, event: &TraceEvent<'_>) {
        if self.error.is_some() {
            return;
        }
        if let Err(error) = self.render(event) {
            self.error = Some(error);
        }
    }
}

/// Renders a fired branch as `> name: specifier | ops | next`.
#[must_use]
pub fn branch_line(name: &str, branch: &Branch, next_name: &str) -> String {
    let operations: Vec<String> = branch.operations.iter().map(ToString::to_string).collect();
    format!(
        "> {name}: {} | {} | {next_name}",
        branch.matcher,
        operations.join(",")
    )
}

/// Renders the pointer marker line and the tape window.
///
/// Cells up to the highest touched index (or the pointer, if further) are
/// shown, at most [`TAPE_WINDOW`] of them, keeping the pointer in view.
/// `<` and `>` replace the brackets on a clipped side.
#[must_use]
pub fn tape_window(tape: &[char], pointer: usize, highest: usize) -> (String, String) {
    let limit = (highest.max(pointer) + 1).min(tape.len());
    let start = if limit > TAPE_WINDOW {
        pointer
            .saturating_sub(TAPE_WINDOW / 2)
            .min(limit - TAPE_WINDOW)
    } else {
        0
    };
    let end = (start + TAPE_WINDOW).min(limit);

    let open = if start > 0 { '<' } else { '[' };
    let close = if end < limit { '>' } else { ']' };
    let cells: String = tape.get(start..end).unwrap_or_default().iter().collect();

    let marker = format!("{}v", " ".repeat(1 + pointer.saturating_sub(start)));
    (marker, format!("{open}{cells}{close}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use alan_core::{
        ConfigId, FaultCode, Matcher, Operation, PrintPayload, RuntimeFault,
    };

    fn blank_tape(len: usize) -> Vec<char> {
        vec![' '; len]
    }

    #[test]
    fn branch_line_uses_source_syntax() {
        let branch = Branch {
            matcher: Matcher::BLANK,
            operations: vec![
                Operation::Print(PrintPayload::Symbol('0')),
                Operation::MoveRight(1),
                Operation::MoveLeft(2),
                Operation::NoOp,
            ],
            next: ConfigId(1),
            line: 3,
        };
        assert_eq!(
            branch_line("begin", &branch, "done"),
            "> begin: none | P0,R,L2,N | done"
        );
    }

    #[test]
    fn short_tape_is_shown_whole() {
        let mut tape = blank_tape(256);
        tape[..3].copy_from_slice(&['0', '0', '1']);
        let (marker, window) = tape_window(&tape, 2, 2);
        assert_eq!(marker, "   v");
        assert_eq!(window, "[001]");
    }

    #[test]
    fn long_tape_is_clipped_around_the_pointer() {
        let tape: Vec<char> = (0..200).map(|i| if i % 2 == 0 { '1' } else { '0' }).collect();

        let (marker, window) = tape_window(&tape, 100, 150);
        assert!(window.starts_with('<'));
        assert!(window.ends_with('>'));
        assert_eq!(window.chars().count(), TAPE_WINDOW + 2);
        assert_eq!(marker.len(), 1 + TAPE_WINDOW / 2 + 1);

        let (_, window) = tape_window(&tape, 149, 149);
        assert!(window.starts_with('<'));
        assert!(window.ends_with(']'));

        let (marker, window) = tape_window(&tape, 0, 150);
        assert!(window.starts_with('['));
        assert!(window.ends_with('>'));
        assert_eq!(marker, " v");
    }

    #[test]
    fn renderer_writes_branches_and_faults() {
        let branch = Branch {
            matcher: Matcher::Else,
            operations: vec![Operation::NoOp],
            next: ConfigId(0),
            line: 1,
        };
        let tape = blank_tape(4);
        let mut renderer = TraceRenderer::new(Vec::new());

        renderer.on_event(&TraceEvent::BranchFired {
            step: 1,
            configuration: ConfigId(0),
            name: "idle",
            next_name: "idle",
            branch_index: 0,
            branch: &branch,
            tape: &tape,
            pointer: 0,
            highest: 0,
        });
        renderer.on_event(&TraceEvent::FaultRaised {
            fault: RuntimeFault {
                code: FaultCode::NoMatchingBranch,
                configuration: ConfigId(0),
                line: 1,
                pointer: 0,
                symbol: ' ',
            },
        });

        let out = String::from_utf8(renderer.finish().expect("vec writer")).expect("utf8");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "> idle: else | N | idle");
        assert_eq!(lines[1], " v");
        assert_eq!(lines[2], "[ ]");
        assert!(lines[3].starts_with("! "));
    }
}
