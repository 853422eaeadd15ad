//! Line-oriented operator REPL.
//!
//! Commands are case-insensitive; arguments are everything after the command
//! word. A malformed command prints one error line and the loop continues.
//! All driving is strictly sequential: a command finishes, including any
//! migration it triggers, before the next line is read.

use std::io::{BufRead, Write};

use anyhow::Result;

use super::cluster::ClusterRouter;

const USAGE: &str = "commands: ADD host:port | REMOVE host:port | SET key value | GET key | DEL key | EXIT";

/// Run the REPL until `EXIT` or end of input.
pub async fn run() -> Result<()> {
    let mut router = ClusterRouter::new();
    let stdin = std::io::stdin();
    let mut line = String::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if !dispatch(&mut router, line.trim_end_matches(['\r', '\n'])).await {
            break;
        }
    }

    Ok(())
}

/// Execute one command line. Returns `false` when the loop should stop.
async fn dispatch(router: &mut ClusterRouter, line: &str) -> bool {
    let line = line.trim_start();
    if line.is_empty() {
        return true;
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim_start()),
        None => (line, ""),
    };

    if command.eq_ignore_ascii_case("EXIT") {
        return false;
    }

    if command.eq_ignore_ascii_case("ADD") {
        if rest.is_empty() {
            println!("usage: ADD host:port");
            return true;
        }
        match router.add_node(rest).await {
            Ok(report) => println!(
                "OK ({} moved, {} duplicated, {} skipped)",
                report.moved, report.duplicated, report.skipped
            ),
            Err(e) => println!("Error: {:#}", e),
        }
    } else if command.eq_ignore_ascii_case("REMOVE") {
        if rest.is_empty() {
            println!("usage: REMOVE host:port");
            return true;
        }
        match router.remove_node(rest).await {
            Ok(report) => println!(
                "OK ({} moved, {} duplicated, {} skipped)",
                report.moved, report.duplicated, report.skipped
            ),
            Err(e) => println!("Error: {:#}", e),
        }
    } else if command.eq_ignore_ascii_case("SET") {
        // The value is the rest of the line after the first space, so it may
        // itself contain spaces.
        let Some((key, val)) = rest.split_once(' ') else {
            println!("usage: SET key value");
            return true;
        };
        match router.set(key, val).await {
            Ok(()) => println!("OK"),
            Err(e) => println!("Error: {:#}", e),
        }
    } else if command.eq_ignore_ascii_case("GET") {
        if rest.is_empty() {
            println!("usage: GET key");
            return true;
        }
        match router.get(rest).await {
            Ok(Some(val)) => println!("{}", val),
            Ok(None) => println!("(not found)"),
            Err(e) => println!("Error: {:#}", e),
        }
    } else if command.eq_ignore_ascii_case("DEL") {
        if rest.is_empty() {
            println!("usage: DEL key");
            return true;
        }
        match router.del(rest).await {
            Ok(()) => println!("OK"),
            Err(e) => println!("Error: {:#}", e),
        }
    } else {
        println!("Unknown command: {} ({})", command, USAGE);
    }

    true
}
