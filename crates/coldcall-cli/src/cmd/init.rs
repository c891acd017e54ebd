use anyhow::Context;
use coldcall_core::{config::Config, io, mail::Maildir, paths};
use std::path::Path;

pub fn run(root: &Path) -> anyhow::Result<()> {
    let config_path = paths::config_path(root);
    let config = if config_path.exists() {
        Config::load(root).context("failed to load config")?
    } else {
        let config = Config::default();
        config.save(root).context("failed to write config")?;
        println!("Created {}", config_path.display());
        config
    };

    let mailbox = config.mailbox_path(root);
    Maildir::init(&mailbox)
        .with_context(|| format!("failed to create mailbox at {}", mailbox.display()))?;
    io::ensure_dir(&paths::state_dir(root))?;

    let roster = config.roster_path(root);
    println!("Mailbox ready at {}", mailbox.display());
    if !roster.exists() {
        println!(
            "Add a roster at {} with columns name, email, section",
            roster.display()
        );
    }
    Ok(())
}
