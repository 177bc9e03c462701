#![cfg(not(tarpaulin_include))]

use clap::Parser;
use potluck::config::Config;
use potluck::record::Submission;
use potluck::remote::HttpSheet;
use potluck::sync::SyncController;
use potluck::view::{ListView, TextView};
use std::io::{self, Write};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

fn print_help() {
    println!("Commands:");
    println!("  name <name>                  Set the name used for new entries");
    println!("  add <item> [| qty [| note]]  Add what you bring");
    println!("  r                            Refresh the list now");
    println!("  help                         Show this help");
    println!("  q                            Quit");
}

// `item | qty | note`, trailing parts optional
fn parse_add(name: &str, rest: &str) -> Submission {
    let mut parts = rest.splitn(3, '|').map(str::trim);
    Submission {
        name: name.to_string(),
        item: parts.next().unwrap_or("").to_string(),
        qty: parts.next().unwrap_or("").to_string(),
        note: parts.next().unwrap_or("").to_string(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = Config::parse();
    let backend = Arc::new(HttpSheet::new(&config)?);
    let controller = Arc::new(SyncController::from_config(backend, &config));
    let _ticker = controller.spawn_periodic();

    let view = TextView;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut status = String::from("ok");

    loop {
        print!("{}", view.render(&controller.snapshot())?);
        print!("({}) > ", status);
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = line.trim();
        status = String::from("ok");

        if command.is_empty() {
            continue;
        }

        if command == "q" {
            break;
        } else if command == "help" {
            print_help();
        } else if command == "r" {
            if let Err(e) = controller.refresh(true).await {
                status = e.to_string();
            }
        } else if let Some(name) = command.strip_prefix("name ") {
            let mut form = controller.form();
            form.name = name.trim().to_string();
            controller.set_form(form);
        } else if let Some(rest) = command.strip_prefix("add ") {
            let form = parse_add(&controller.form().name, rest);
            if let Err(e) = controller.submit(form).await {
                status = e.to_string();
            }
        } else {
            status = String::from("invalid command");
        }
    }

    Ok(())
}
