//! Page-at-a-time display of list results.
//!
//! Table output is interactive: after each page the user can fetch the next
//! one, load everything that is left, or stop. JSON and plain output are meant
//! for pipes, so they show the first page and point at `--all-pages`.

use std::io::{BufRead, Write};
use std::pin::pin;

use futures_util::{Stream, TryStreamExt};
use serde_json::Value;

use super::formatter::{OutputFormat, format_output};
use crate::api::Page;
use crate::errors::Result;

const PROMPT: &str = "Enter = next page, a = all, q = quit: ";
const MORE_HINT: &str = "More results available. Use --all-pages to fetch everything.";

/// What the user asked for after a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Next,
    All,
    Quit,
}

fn parse_choice(line: &str) -> Option<Choice> {
    match line.trim().to_ascii_lowercase().as_str() {
        "" => Some(Choice::Next),
        "a" | "all" => Some(Choice::All),
        "q" | "quit" => Some(Choice::Quit),
        _ => None,
    }
}

/// Renders pages to `output`, prompts and progress to `status`, and reads
/// choices from `input`
pub struct Pager<R, W, E> {
    input: R,
    output: W,
    status: E,
    format: OutputFormat,
}

impl<R: BufRead, W: Write, E: Write> Pager<R, W, E> {
    pub fn new(input: R, output: W, status: E, format: OutputFormat) -> Self {
        Self {
            input,
            output,
            status,
            format,
        }
    }

    /// Display `pages`. With `all_pages` everything is fetched first and
    /// rendered once. Returns the number of items shown.
    pub async fn run<S>(&mut self, pages: S, all_pages: bool) -> Result<usize>
    where
        S: Stream<Item = Result<Page>>,
    {
        let mut pages = pin!(pages);

        if all_pages {
            let mut items = Vec::new();
            let mut fetched = 0usize;
            while let Some(page) = pages.try_next().await? {
                fetched += 1;
                items.extend(page.items);
                if fetched > 1 {
                    writeln!(self.status, "Fetched page {} ({} items so far)", fetched, items.len())?;
                }
            }
            return self.render(items);
        }

        let Some(first) = pages.try_next().await? else {
            return self.render(Vec::new());
        };
        let mut has_next = first.has_next();
        let mut shown = self.render(first.items)?;

        if self.format != OutputFormat::Table {
            if has_next {
                writeln!(self.status, "{}", MORE_HINT)?;
            }
            return Ok(shown);
        }

        while has_next {
            let choice = match self.prompt()? {
                Some(choice) => choice,
                None => break,
            };
            match choice {
                Choice::Quit => break,
                Choice::Next => match pages.try_next().await? {
                    Some(page) => {
                        has_next = page.has_next();
                        writeln!(self.output)?;
                        shown += self.render(page.items)?;
                    }
                    None => break,
                },
                Choice::All => {
                    writeln!(self.status, "Loading remaining pages...")?;
                    let rest: Vec<Page> = pages.as_mut().try_collect().await?;
                    let items: Vec<Value> = rest.into_iter().flat_map(|page| page.items).collect();
                    writeln!(self.output)?;
                    shown += self.render(items)?;
                    break;
                }
            }
        }
        Ok(shown)
    }

    /// Ask until a valid answer arrives. `None` on end of input.
    fn prompt(&mut self) -> Result<Option<Choice>> {
        loop {
            write!(self.status, "{}", PROMPT)?;
            self.status.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.status)?;
                return Ok(None);
            }
            match parse_choice(&line) {
                Some(choice) => return Ok(Some(choice)),
                None => writeln!(self.status, "Invalid choice. Press Enter, 'a', or 'q'.")?,
            }
        }
    }

    fn render(&mut self, items: Vec<Value>) -> Result<usize> {
        let count = items.len();
        let text = format_output(&Value::Array(items), self.format)?;
        writeln!(self.output, "{}", text)?;
        Ok(count)
    }
}
