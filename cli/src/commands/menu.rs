//! Interactive numeric menu. `0` goes back (or exits at the top level).

use anyhow::Result;
use dialoguer::Input;
use hfscout_core::{ScoredResult, SearchQuery};

use super::search::Session;
use crate::display::{self, parse_selection, Selection};
use crate::SearchArgs;

fn prompt(text: &str) -> Result<String> {
    let line = Input::<String>::new()
        .with_prompt(text)
        .allow_empty(true)
        .interact_text()?;
    Ok(line.trim().to_string())
}

/// Keyword prompt; `None` when the user enters `0`.
fn prompt_keyword(text: &str) -> Result<Option<String>> {
    loop {
        let keyword = prompt(text)?;
        match keyword.as_str() {
            "0" => return Ok(None),
            "" => println!("Please enter a keyword (0 to cancel)."),
            _ => return Ok(Some(keyword)),
        }
    }
}

pub async fn execute(args: &SearchArgs) -> Result<()> {
    let session = Session::new(args)?;

    loop {
        println!("\nHugging Face Model Search");
        println!("0) Exit");
        println!("1) Search by name keyword");
        println!("2) Search by tag keyword");

        let query = match parse_selection(&prompt(">")?, 2) {
            Selection::Back => {
                println!("Exiting.");
                return Ok(());
            }
            Selection::Item(0) => match prompt_keyword("Enter name keyword (or 0 to cancel)")? {
                Some(keyword) => SearchQuery::Name(keyword),
                None => continue,
            },
            Selection::Item(_) => match prompt_keyword("Enter tag keyword (or 0 to cancel)")? {
                Some(tag) => SearchQuery::Tag(tag),
                None => continue,
            },
            Selection::NotANumber | Selection::OutOfRange => {
                println!("Invalid choice - enter 0, 1 or 2.");
                continue;
            }
        };

        println!("Searching for {}...", query);
        match session.query(&query).await {
            Ok(results) => {
                display::print_results(&results);
                browse_results(&results)?;
            }
            Err(err) => eprintln!("Search failed: {:#}", err),
        }
    }
}

/// Detail-selection loop over a printed result list.
pub fn browse_results(results: &[ScoredResult]) -> Result<()> {
    if results.is_empty() {
        return Ok(());
    }

    println!("\nEnter a number to view details, or 0 to go back.");
    loop {
        match parse_selection(&prompt(">")?, results.len()) {
            Selection::Back => return Ok(()),
            Selection::Item(index) => {
                display::print_detail(&results[index]);
                println!("\nBack to list - choose another number or 0 to go back.");
            }
            Selection::NotANumber => println!("Please enter a number (0 to go back)."),
            Selection::OutOfRange => println!("Out of range; try again."),
        }
    }
}
