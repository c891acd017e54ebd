use crate::output::print_json;
use crate::prompt::{Prompt, SectionChoice};
use anyhow::Context;
use chrono::NaiveDate;
use coldcall_core::{
    config::{Config, WarnLevel},
    mail::Maildir,
    orchestrator::{fetch_requests, CallList, Session},
    types::SectionId,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct RunArgs {
    pub section: Option<String>,
    pub both: bool,
    pub dry_run: bool,
    pub seed: Option<u64>,
    pub today: NaiveDate,
}

#[derive(Serialize)]
struct Emitted<'a> {
    #[serde(flatten)]
    list: &'a CallList,
    path: PathBuf,
}

#[derive(Serialize)]
struct RunOutput<'a> {
    date: NaiveDate,
    dry_run: bool,
    folded_from: Option<NaiveDate>,
    deleted: usize,
    pending: Option<usize>,
    lists: Vec<Emitted<'a>>,
}

pub fn run(root: &Path, args: RunArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    if let Some(w) = config.validate().iter().find(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config error: {}", w.message);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    // stdout carries the JSON document, so questions go to stderr
    let questions: Box<dyn Write> = if json {
        Box::new(std::io::stderr())
    } else {
        Box::new(std::io::stdout())
    };
    let stdin = std::io::stdin();
    let mut prompt = Prompt::new(stdin.lock(), questions);
    let interactive = args.section.is_none() && !args.both;

    loop {
        let mut source = Maildir::open(&config.mailbox_path(root))?;
        let inbox = fetch_requests(&mut source, &config, |m| Ok(prompt.triage(m)?))
            .context("failed to read requests")?;
        let session = Session::open(root, &config, &inbox, args.today)?;

        let sections = session.sections();
        let targets: Vec<SectionId> = match &args.section {
            _ if args.both => sections.clone(),
            Some(s) => vec![SectionId::new(s)],
            None => match prompt.section(&sections)? {
                SectionChoice::One(s) => vec![s],
                SectionChoice::Both => sections.clone(),
            },
        };

        let mut lists = Vec::with_capacity(targets.len());
        for section in &targets {
            let list = session
                .build(section, &mut rng)
                .with_context(|| format!("cannot build list for section '{section}'"))?;
            let path = session
                .emit(&list)
                .with_context(|| format!("failed to write list for section '{section}'"))?;
            lists.push((list, path));
        }

        let pending = if args.dry_run {
            None
        } else {
            let built = lists.iter().map(|(list, _)| list);
            Some(
                session
                    .commit(&mut source, &inbox, built)
                    .context("failed to save usage and request cache")?,
            )
        };

        if json {
            print_json(&RunOutput {
                date: args.today,
                dry_run: args.dry_run,
                folded_from: session.folded_from(),
                deleted: inbox.deleted,
                pending,
                lists: lists
                    .iter()
                    .map(|(list, path)| Emitted {
                        list,
                        path: path.clone(),
                    })
                    .collect(),
            })?;
        } else {
            if let Some(date) = session.folded_from() {
                println!("Requests from {date} folded into roster usage.");
            }
            for (list, path) in &lists {
                for notice in &list.notices {
                    println!("{notice}");
                }
                println!(
                    "Section {}: {} students written to {}",
                    list.section,
                    list.names.len(),
                    path.display()
                );
            }
            match pending {
                None => println!("Dry run: usage, request cache and mailbox left unchanged."),
                Some(0) => {}
                Some(n) => println!("{n} request(s) left in the mailbox until their section runs."),
            }
        }

        if !interactive || !prompt.again()? {
            break;
        }
    }

    Ok(())
}
