use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "coldcall.yaml";
pub const STATE_DIR: &str = ".coldcall";
pub const CACHE_FILE: &str = ".coldcall/request_cache.yaml";

pub const INBOX_DIR: &str = "inbox";
pub const PROCESSED_DIR: &str = "processed";

pub const CALL_LIST_PREFIX: &str = "call_list_";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn state_dir(root: &Path) -> PathBuf {
    root.join(STATE_DIR)
}

pub fn cache_path(root: &Path) -> PathBuf {
    root.join(CACHE_FILE)
}

pub fn inbox_dir(mailbox: &Path) -> PathBuf {
    mailbox.join(INBOX_DIR)
}

pub fn processed_dir(mailbox: &Path) -> PathBuf {
    mailbox.join(PROCESSED_DIR)
}

/// `call_list_<section>.csv` inside `out_dir`.
pub fn call_list_path(out_dir: &Path, section: &str) -> PathBuf {
    out_dir.join(format!("{CALL_LIST_PREFIX}{section}.csv"))
}
