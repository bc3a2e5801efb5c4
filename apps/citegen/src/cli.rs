//! Command-line surface

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "citegen",
    about = "Turn DOIs, URLs, ISBNs and PubMed ids into formatted bibliographies",
    version,
    disable_version_flag = true
)]
pub struct Cli {
    /// Identifiers to resolve. Prefix with `doi:`, `url:`, `isbn:`,
    /// `pmid:` or `pmcid:` to force a type.
    pub identifiers: Vec<String>,

    /// Citation style (e.g. apa, chicago-author-date)
    #[arg(short, long)]
    pub style: Option<String>,

    /// Locale for the rendered bibliography (e.g. en-US)
    #[arg(short, long)]
    pub locale: Option<String>,

    /// Output format: text, html, rtf or asciidoc
    #[arg(short, long)]
    pub format: Option<String>,

    /// Also print in-text citations
    #[arg(short, long, overrides_with = "no_intext")]
    pub intext: bool,

    /// Suppress in-text citations even if enabled in the config
    #[arg(long)]
    pub no_intext: bool,

    /// Log resolution errors to stderr
    #[arg(short = 'e', long)]
    pub log_errors: bool,

    /// Print version information
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read or write persisted defaults (style, locale, format, intext)
    Config {
        /// Config key to read or write
        key: String,
        /// New value, or `reset` to clear the key
        value: Option<String>,
    },
}

impl Cli {
    /// The in-text preference expressed on the command line, if any
    pub fn intext_override(&self) -> Option<bool> {
        if self.intext {
            Some(true)
        } else if self.no_intext {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_invocation() {
        let cli = Cli::try_parse_from([
            "citegen",
            "10.1000/a",
            "978-3-16-148410-0",
            "--format",
            "html",
            "-e",
        ])
        .unwrap();
        assert_eq!(cli.identifiers.len(), 2);
        assert_eq!(cli.format.as_deref(), Some("html"));
        assert!(cli.log_errors);
        assert_eq!(cli.intext_override(), None);
    }

    #[test]
    fn test_intext_flags() {
        let on = Cli::try_parse_from(["citegen", "-i", "10.1/x"]).unwrap();
        assert_eq!(on.intext_override(), Some(true));

        let off = Cli::try_parse_from(["citegen", "--no-intext", "10.1/x"]).unwrap();
        assert_eq!(off.intext_override(), Some(false));
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::try_parse_from(["citegen", "config", "style", "apa"]).unwrap();
        match cli.command {
            Some(Command::Config { key, value }) => {
                assert_eq!(key, "style");
                assert_eq!(value.as_deref(), Some("apa"));
            }
            _ => panic!("expected config subcommand"),
        }
    }
}
