//! Interactive list: each line typed is either a search keystroke or a
//! `:command`.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use dashboard_client::{
    NavigationLog, PaymentListController, Presentation, ReviewDecision, ReviewOutcome, Route,
    SortColumn,
};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::console::print_signed_out_hint;
use crate::render;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
Type an ID to search (empty line clears). Commands:
  :status [completed|pending|failed]   filter by status, no value clears
  :sort amount|created_at              toggle sort on a column
  :page N                              jump to page N
  :review ID [reject]                  review a payment
  :refresh                             fetch again
  :quit                                leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Search(String),
    Status(Option<String>),
    Sort(SortColumn),
    Page(u32),
    Review(String, ReviewDecision),
    Refresh,
    Help,
    Quit,
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return Ok(BrowseCommand::Search(line.to_string()));
        };

        let mut words = command.split_whitespace();
        let name = words.next().unwrap_or_default();
        let arg = words.next();
        match name {
            "status" => Ok(BrowseCommand::Status(arg.map(str::to_string))),
            "sort" => arg
                .and_then(SortColumn::parse)
                .map(BrowseCommand::Sort)
                .ok_or_else(|| "usage: :sort amount|created_at".to_string()),
            "page" => arg
                .and_then(|n| n.parse::<u32>().ok())
                .filter(|n| *n > 0)
                .map(BrowseCommand::Page)
                .ok_or_else(|| "usage: :page N (starting at 1)".to_string()),
            "review" => {
                let id = arg.ok_or_else(|| "usage: :review ID [reject]".to_string())?;
                let decision = match words.next() {
                    Some("reject") => ReviewDecision::Reject,
                    None | Some("approve") => ReviewDecision::Approve,
                    Some(other) => return Err(format!("unknown decision: {other}")),
                };
                Ok(BrowseCommand::Review(id.to_string(), decision))
            }
            "refresh" => Ok(BrowseCommand::Refresh),
            "help" | "h" => Ok(BrowseCommand::Help),
            "quit" | "q" => Ok(BrowseCommand::Quit),
            other => Err(format!("unknown command :{other}, try :help")),
        }
    }
}

/// Run until `:quit`, end of input, or the session is evicted.
/// Returns whether the loop ended with a live session.
pub async fn run(controller: &PaymentListController, nav: &NavigationLog) -> Result<bool> {
    println!("{}", HELP.dimmed());
    controller.refresh().await;
    if evicted(nav) {
        return Ok(false);
    }
    println!("{}", render::view(controller));
    let mut rendered = controller.generation();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let waiting =
            controller.has_pending_search() || controller.presentation() == Presentation::Loading;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::time::sleep(POLL_INTERVAL), if waiting => {
                if evicted(nav) {
                    return Ok(false);
                }
                if controller.generation() != rendered
                    && controller.presentation() != Presentation::Loading
                {
                    rendered = controller.generation();
                    println!("{}", render::view(controller));
                }
                continue;
            }
        };
        let Some(line) = line else {
            return Ok(true);
        };

        let command = match BrowseCommand::parse(&line) {
            Ok(command) => command,
            Err(usage) => {
                println!("{}", usage.yellow());
                continue;
            }
        };

        match command {
            BrowseCommand::Search(text) => {
                // Rendered by the poll branch once the debounce fires
                controller.search_input(text);
                continue;
            }
            BrowseCommand::Status(status) => controller.select_status(status).await,
            BrowseCommand::Sort(column) => controller.toggle_sort(column).await,
            BrowseCommand::Page(page) => controller.go_to_page(page - 1).await,
            BrowseCommand::Refresh => controller.refresh().await,
            BrowseCommand::Review(id, decision) => {
                if controller.review_with(&id, decision).await == ReviewOutcome::NotPermitted {
                    println!("{}", "Your role may not review payments.".yellow());
                }
                if controller.policy().refetch_after_review {
                    rendered = controller.generation();
                    println!("{}", render::view(controller));
                }
                if evicted(nav) {
                    return Ok(false);
                }
                continue;
            }
            BrowseCommand::Help => {
                println!("{}", HELP.dimmed());
                continue;
            }
            BrowseCommand::Quit => return Ok(true),
        }

        if evicted(nav) {
            return Ok(false);
        }
        rendered = controller.generation();
        println!("{}", render::view(controller));
    }
}

fn evicted(nav: &NavigationLog) -> bool {
    if nav.take_last() == Some(Route::Login) {
        println!("{}", "Session ended by the server.".red().bold());
        print_signed_out_hint();
        return true;
    }
    false
}
