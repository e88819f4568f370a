//! Rendering of timing results.

use std::time::Duration;

/// Outcome of one timed command.
#[derive(Debug, Clone)]
pub struct Report {
    pub command: Vec<String>,
    pub elapsed: Duration,
    /// `None` when the child was killed by a signal.
    pub status: Option<i32>,
}

impl Report {
    fn seconds(&self) -> String {
        format!("{:.2}", self.elapsed.as_secs_f64())
    }

    fn status_text(&self) -> String {
        match self.status {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }

    /// Expand a `time(1)`-style format string.
    ///
    /// `%e` elapsed seconds, `%x` exit status, `%C` command line, `%%` a
    /// percent sign; `\n`, `\t` and `\\` are escapes. Anything else is kept
    /// as written.
    pub fn render(&self, format: &str) -> String {
        let mut out = String::new();
        let mut chars = format.chars();
        while let Some(c) = chars.next() {
            match c {
                '%' => match chars.next() {
                    Some('e') => out.push_str(&self.seconds()),
                    Some('x') => out.push_str(&self.status_text()),
                    Some('C') => out.push_str(&self.command.join(" ")),
                    Some('%') => out.push('%'),
                    Some(other) => {
                        out.push('%');
                        out.push(other);
                    }
                    None => out.push('%'),
                },
                '\\' => match chars.next() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('\\') => out.push('\\'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                c => out.push(c),
            }
        }
        out
    }

    /// POSIX `-p` output.
    pub fn portable(&self) -> String {
        format!("real {}", self.seconds())
    }

    pub fn verbose(&self) -> String {
        format!(
            "\tCommand being timed: \"{}\"\n\tElapsed (wall clock) time (seconds): {}\n\tExit status: {}",
            self.command.join(" "),
            self.seconds(),
            self.status_text()
        )
    }
}
