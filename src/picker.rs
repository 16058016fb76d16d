//! Line-based interactive chooser.

use std::io::{BufRead, Write};

use anyhow::{Result, bail};
use subscout_core::parse_ranges;
use tracing::debug;

/// Prints `labels` as a numbered list and reads a selection such as `1-3,5`.
///
/// Prompts again until a selection within the list is entered. Returns
/// zero-based indices in the order given.
pub fn choose<R: BufRead, W: Write>(
    labels: &[String],
    input: &mut R,
    output: &mut W,
) -> Result<Vec<usize>> {
    let width = labels.len().to_string().len();
    for (i, label) in labels.iter().enumerate() {
        writeln!(output, " {:>width$} {label}", i + 1)?;
    }

    let mut line = String::new();
    loop {
        write!(output, "Which? ")?;
        output.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(output)?;
            bail!("stdin closed unexpectedly");
        }

        match parse_ranges(line.trim()) {
            Ok(choices) if choices.iter().all(|&n| (1..=labels.len()).contains(&n)) => {
                debug!(?choices, "selection made");
                return Ok(choices.into_iter().map(|n| n - 1).collect());
            }
            Ok(choices) => debug!(?choices, "selection out of range"),
            Err(e) => debug!(error = %e, "unparseable selection"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["first".to_string(), "second".to_string(), "third".to_string()]
    }

    #[test]
    fn test_choose_returns_zero_based_indices() {
        let mut input = "1,3\n".as_bytes();
        let mut output = Vec::new();

        let chosen = choose(&labels(), &mut input, &mut output).unwrap();

        assert_eq!(chosen, vec![0, 2]);
        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains(" 2 second"));
        assert!(printed.contains("Which? "));
    }

    #[test]
    fn test_choose_reprompts_on_invalid_input() {
        let mut input = "nope\n0\n4\n2-3\n".as_bytes();
        let mut output = Vec::new();

        let chosen = choose(&labels(), &mut input, &mut output).unwrap();

        assert_eq!(chosen, vec![1, 2]);
        let printed = String::from_utf8(output).unwrap();
        assert_eq!(printed.matches("Which? ").count(), 4);
    }

    #[test]
    fn test_choose_errors_when_input_closes() {
        let mut input = "abc\n".as_bytes();
        let mut output = Vec::new();

        let err = choose(&labels(), &mut input, &mut output).unwrap_err();

        assert!(err.to_string().contains("stdin closed unexpectedly"));
    }
}
