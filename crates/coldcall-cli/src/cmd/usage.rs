use crate::output::{print_json, print_table};
use anyhow::Context;
use chrono::NaiveDate;
use coldcall_core::{
    config::Config,
    orchestrator::{Inbox, Session},
};
use std::path::Path;

fn blank_zero(n: u32) -> String {
    if n == 0 {
        String::new()
    } else {
        n.to_string()
    }
}

pub fn run(root: &Path, today: NaiveDate, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let session = Session::open(root, &config, &Inbox::default(), today)?;
    let ledger = session.ledger();

    if json {
        return print_json(&ledger);
    }

    let rows: Vec<Vec<String>> = ledger
        .iter()
        .map(|r| {
            let today: Vec<&str> = [
                (r.today.skips > 0).then_some("skip"),
                (r.today.switches > 0).then_some("switch"),
            ]
            .into_iter()
            .flatten()
            .collect();
            vec![
                r.name.clone(),
                r.email.clone(),
                r.section.to_string(),
                blank_zero(r.settled.skips),
                blank_zero(r.settled.switches),
                today.join("+"),
            ]
        })
        .collect();
    print_table(
        &["NAME", "EMAIL", "SECTION", "SKIPS", "SWITCHES", "TODAY"],
        &rows,
    );

    if let Some(date) = session.folded_from() {
        println!();
        println!("Counts include requests from {date}; the roster is updated on the next run.");
    }
    println!("Skip limit: {}", config.skip_limit);
    Ok(())
}
