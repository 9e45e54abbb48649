//! Terminal output and prompts.

use console::Emoji;
use dialoguer::{Confirm, Select};

use super::*;

/// Prefix for information messages
pub static INFO_PREFIX: &str = "ℹ ";
/// Prefix for work in progress
pub static WORKING_PREFIX: &str = "» ";
/// Prefix for success messages
pub static SUCCESS_PREFIX: &str = "✓ ";
/// Prefix for error messages
pub static ERROR_PREFIX: &str = "✗ ";
/// Prefix for warning messages
pub static WARNING_PREFIX: &str = "! ";
/// Prefix for list items
pub static ITEM_PREFIX: &str = "├─";
/// Prefix for the last list item
pub static LAST_ITEM_PREFIX: &str = "└─";
/// Continuation line for tree structure
pub static CONTINUE_PREFIX: &str = "│  ";

/// Shown while the AI crew is working
static THINKING: Emoji<'_, '_> = Emoji("🤔 ", "");

/// Something to show the user.
#[derive(Debug)]
pub enum ResponseContent<'a> {
  /// A full paper
  Paper(&'a ResearchPaper),
  /// AI output and photos of an open paper page
  PaperPage(&'a PaperView),
  /// Search hits
  Results(&'a [SearchResult]),
  /// Previously opened papers
  History(&'a [HistoryEntry]),
  /// Photo note URLs
  Photos(&'a [String]),
  /// A background step started
  Working(&'a str),
  /// An operation succeeded
  Success(&'a str),
  /// Something went wrong but the command continues
  Warning(&'a str),
  /// The command failed
  Error(&'a PaiperdError),
  /// Plain information
  Info(&'a str),
}

/// Everything commands need from the terminal.
pub trait UserInteraction {
  /// Asks a yes/no question.
  fn confirm(&self, message: &str) -> Result<bool>;
  /// Lets the user pick one of `items`, returning `None` on cancel.
  fn select(&self, message: &str, items: &[String]) -> Result<Option<usize>>;
  /// Prints `content`.
  fn reply(&self, content: ResponseContent) -> Result<()>;
}

impl UserInteraction for Cli {
  fn confirm(&self, message: &str) -> Result<bool> {
    if self.accept_defaults {
      return Ok(true);
    }
    Ok(Confirm::new().with_prompt(message).default(false).wait_for_newline(true).interact()?)
  }

  fn select(&self, message: &str, items: &[String]) -> Result<Option<usize>> {
    if items.is_empty() {
      return Ok(None);
    }
    // Non-interactive runs continue with the most recent entry
    if self.accept_defaults {
      return Ok(Some(items.len() - 1));
    }
    Ok(Select::new().with_prompt(message).items(items).default(items.len() - 1).interact_opt()?)
  }

  fn reply(&self, content: ResponseContent) -> Result<()> {
    match content {
      ResponseContent::Paper(paper) => print_paper(paper),
      ResponseContent::PaperPage(view) => print_page(view),
      ResponseContent::Results(results) => print_list(results.iter().map(|result| {
        let id = result.id.map(|id| format!("[{id}] ")).unwrap_or_default();
        format!("{id}{} {}", style(&result.title).bold(), style(result.author_names()).dim())
      })),
      ResponseContent::History(entries) => print_list(entries.iter().map(ToString::to_string)),
      ResponseContent::Photos(photos) => print_list(photos.iter().cloned()),
      ResponseContent::Working(message) => println!("{} {message}", style(WORKING_PREFIX).cyan()),
      ResponseContent::Success(message) =>
        println!("{} {message}", style(SUCCESS_PREFIX).green()),
      ResponseContent::Warning(message) =>
        println!("{} {message}", style(WARNING_PREFIX).yellow()),
      ResponseContent::Error(error) => eprintln!("{} {error}", style(ERROR_PREFIX).red()),
      ResponseContent::Info(message) => println!("{} {message}", style(INFO_PREFIX).blue()),
    }
    Ok(())
  }
}

/// Prints one item per line in tree style.
fn print_list(items: impl ExactSizeIterator<Item = String>) {
  let last = items.len().saturating_sub(1);
  for (index, item) in items.enumerate() {
    let prefix = if index == last { LAST_ITEM_PREFIX } else { ITEM_PREFIX };
    println!("{} {item}", style(prefix).dim());
  }
}

/// Prints the header of a paper page.
fn print_paper(paper: &ResearchPaper) {
  println!("{} {}", style(format!("[{}]", paper.id)).dim(), style(&paper.title).bold());
  if !paper.authors.is_empty() {
    println!("{}{}", style(CONTINUE_PREFIX).dim(), paper.author_names());
  }
  if !paper.published_date.is_empty() {
    println!("{}Published {}", style(CONTINUE_PREFIX).dim(), paper.formatted_date());
  }
  if !paper.download_url.is_empty() {
    println!("{}{}", style(CONTINUE_PREFIX).dim(), style(&paper.download_url).underlined());
  }
  if !paper.abstract_text.is_empty() {
    println!("\n{}", paper.abstract_text);
  }
}

/// Prints the AI section and the visible photo of a paper page.
fn print_page(view: &PaperView) {
  match view.ai {
    AiStatus::Loading => println!("\n{THINKING}Thinking..."),
    AiStatus::Error => println!(
      "\n{} The AI crew could not process this paper. Try again later.",
      style(ERROR_PREFIX).red()
    ),
    AiStatus::Idle => {
      for (heading, text) in [
        ("Summary", &view.insights.summary),
        ("Key takeaway", &view.insights.takeaway),
        ("Citation", &view.insights.citation),
      ] {
        println!("\n{}\n{text}", style(heading).bold().cyan());
      }
    },
  }
  match view.visible_photo() {
    Some(photo) => println!("\n{} Photo note: {photo}", style(INFO_PREFIX).blue()),
    None => println!("\n{} No photo notes", style(INFO_PREFIX).blue()),
  }
  if let Some(notice) = &view.notice {
    println!("{} {notice}", style(WARNING_PREFIX).yellow());
  }
}
