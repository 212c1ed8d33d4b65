use clap::Subcommand;
use kingo_core::{SessionState, SessionStore};

/// Sub-commands available under `session`.
#[derive(Debug, Subcommand)]
pub enum SessionCommands {
    /// Show the stored login flag and refreshed paths
    Show,
    /// Mark the session as logged in
    Login {
        /// Name shown in the host header
        display_name: String,
    },
    /// Clear the login flag and display name
    Logout,
    /// Record a page's one forced reload; prints whether it is due now
    Refresh {
        /// Host path, e.g. /search
        path: String,
    },
    /// Forget which paths already had their one forced reload
    ClearRefreshed,
}

pub(crate) fn run_session(
    store: &SessionStore,
    command: SessionCommands,
    json: bool,
) -> anyhow::Result<()> {
    let state = match command {
        SessionCommands::Show => store.state()?,
        SessionCommands::Login { display_name } => store.login(&display_name)?,
        SessionCommands::Logout => store.logout()?,
        SessionCommands::Refresh { path } => {
            let due = store.mark_refreshed(&path)?;
            if json {
                println!("{}", serde_json::json!({ "path": path, "reload": due }));
            } else {
                println!("{}", refresh_line(&path, due));
            }
            return Ok(());
        }
        SessionCommands::ClearRefreshed => {
            store.clear_refreshed()?;
            store.state()?
        }
    };
    tracing::debug!(path = %store.path().display(), "session updated");

    if json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", describe(&state));
    }
    Ok(())
}

pub(crate) fn describe(state: &SessionState) -> String {
    let who = match (state.logged_in, &state.display_name) {
        (true, Some(name)) => format!("logged in as {name}"),
        (true, None) => "logged in".to_string(),
        (false, _) => "logged out".to_string(),
    };
    if state.refreshed_paths.is_empty() {
        who
    } else {
        let paths: Vec<&str> = state.refreshed_paths.iter().map(String::as_str).collect();
        format!("{who}; refreshed: {}", paths.join(", "))
    }
}

pub(crate) fn refresh_line(path: &str, due: bool) -> String {
    if due {
        format!("{path}: reload now")
    } else {
        format!("{path}: already refreshed")
    }
}
