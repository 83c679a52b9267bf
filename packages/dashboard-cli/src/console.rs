use colored::Colorize;
use dashboard_client::{Notification, Notifier, Severity};

/// Prints notifications to stdout as they arrive.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, n: Notification) {
        let title = match n.severity {
            Severity::Success => format!("✓ {}", n.title).green().bold(),
            Severity::Error => format!("✗ {}", n.title).red().bold(),
            Severity::Info => n.title.as_str().bold(),
        };
        match n.description {
            Some(description) => println!("{title}: {description}"),
            None => println!("{title}"),
        }
    }
}

pub fn print_signed_out_hint() {
    println!(
        "{}",
        "Not signed in. Run `dashboard login --email <EMAIL> --password <PASSWORD>`.".yellow()
    );
}
