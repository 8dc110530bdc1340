use crate::app::{App, Effect, Mode};

/// What the command line asked for.
#[derive(Debug, Default, PartialEq)]
pub struct Cli {
    /// Words of an initial search, joined with spaces.
    pub query: Option<String>,
    pub dump_config: bool,
}

/// Parse `cadenza [--dump-config] [query...]`.
pub fn parse_args<I>(args: I) -> Cli
where
    I: IntoIterator<Item = String>,
{
    let mut cli = Cli::default();
    let mut words = Vec::new();
    for arg in args {
        if arg == "--dump-config" {
            cli.dump_config = true;
        } else {
            words.push(arg);
        }
    }
    let query = words.join(" ");
    if !query.trim().is_empty() {
        cli.query = Some(query.trim().to_string());
    }
    cli
}

/// Type `query` into the search prompt and submit it, as if from the keyboard.
pub fn initial_search(app: &mut App, query: &str) -> Option<Effect> {
    app.mode = Mode::Search;
    app.query = query.to_string();
    app.submit_search()
}
