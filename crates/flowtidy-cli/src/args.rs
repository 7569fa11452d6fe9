//! Command-line argument definitions for the flowtidy CLI.
//!
//! Positional arguments name the NiFi instance and the process group to
//! arrange. Options override the configuration file and control logging.

use std::fmt;

use clap::Parser;

use flowtidy::config::LayoutEngine;

/// Arrange the canvas of a NiFi process group
#[derive(Parser)]
#[command(name = "flowtidy", author, version, about, long_about = None)]
pub struct Args {
    /// Root URL of the NiFi REST API
    #[arg(help = "Root URL of the NiFi REST API, e.g. https://nifi.example.com/nifi-api")]
    pub api_root: String,

    /// Id of the process group whose canvas is arranged
    #[arg(help = "Id of the process group to arrange (`root` for the top-level canvas)")]
    pub group_id: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Layout engine (force, sugiyama, basic)
    #[arg(long)]
    pub engine: Option<LayoutEngine>,

    /// Native canvas units per layout unit
    #[arg(long)]
    pub scale_ratio: Option<f64>,

    /// Fresh fetch-and-submit cycles after a revision conflict
    #[arg(long)]
    pub conflict_retries: Option<u32>,

    /// Bearer token sent with every request
    #[arg(long, env = "FLOWTIDY_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print the planned positions instead of writing them back
    #[arg(long)]
    pub dry_run: bool,

    /// Exit with a failure code when any component could not be repositioned
    #[arg(long)]
    pub strict: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

// Written by hand so the token never reaches the logs
impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Args")
            .field("api_root", &self.api_root)
            .field("group_id", &self.group_id)
            .field("config", &self.config)
            .field("engine", &self.engine)
            .field("scale_ratio", &self.scale_ratio)
            .field("conflict_retries", &self.conflict_retries)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("dry_run", &self.dry_run)
            .field("strict", &self.strict)
            .field("log_level", &self.log_level)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positionals_are_required() {
        assert!(Args::try_parse_from(["flowtidy"]).is_err());
        assert!(Args::try_parse_from(["flowtidy", "http://nifi/nifi-api"]).is_err());
        assert!(
            Args::try_parse_from(["flowtidy", "http://nifi/nifi-api", "root", "extra"]).is_err()
        );
    }

    #[test]
    fn test_overrides_are_parsed() {
        let args = Args::try_parse_from([
            "flowtidy",
            "http://nifi/nifi-api",
            "root",
            "--engine",
            "sugiyama",
            "--scale-ratio",
            "25",
            "--conflict-retries",
            "2",
            "--token",
            "s3cret",
            "--dry-run",
        ])
        .unwrap();

        assert_eq!(args.group_id, "root");
        assert_eq!(args.engine, Some(LayoutEngine::Sugiyama));
        assert_eq!(args.scale_ratio, Some(25.0));
        assert_eq!(args.conflict_retries, Some(2));
        assert!(args.dry_run);
        assert!(!args.strict);
        assert_eq!(args.log_level, "info");
        assert!(!format!("{args:?}").contains("s3cret"));
    }

    #[test]
    fn test_unknown_engine_is_rejected() {
        let result = Args::try_parse_from([
            "flowtidy",
            "http://nifi/nifi-api",
            "root",
            "--engine",
            "dot",
        ]);
        assert!(result.is_err());
    }
}
