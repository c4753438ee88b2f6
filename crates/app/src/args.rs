use std::fmt;
use std::path::PathBuf;

use interview_core::model::{Difficulty, InterviewSetupDraft, InterviewType};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
    ReadFile { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::ReadFile { path, source } => {
                write!(f, "cannot read {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app practice --company <name> (--job-description <text> | --job-description-file <path>)");
    eprintln!("               [--job-title <title>] [--type technical|behavioral|mixed]");
    eprintln!("               [--difficulty entry|mid|senior] [--duration <minutes>]");
    eprintln!("  app history");
    eprintln!("  app saved");
    eprintln!();
    eprintln!("Common options:");
    eprintln!("  --api <url>         backend base url (default http://localhost:3000)");
    eprintln!("  --db <sqlite_url>   saved-interview store (default sqlite://interviews.sqlite3)");
    eprintln!("  --token <token>     bearer token");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  INTERVIEW_API_URL, INTERVIEW_DB_URL, INTERVIEW_API_TOKEN,");
    eprintln!("  INTERVIEW_ANALYTICS_ENABLED, INTERVIEW_ANALYTICS_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Practice,
    History,
    Saved,
}

impl Command {
    pub fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "history" => Some(Self::History),
            "saved" => Some(Self::Saved),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub draft: InterviewSetupDraft,
}

impl Args {
    pub fn parse(
        command: Command,
        args: &mut impl Iterator<Item = String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("INTERVIEW_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://interviews.sqlite3".into(), normalize_sqlite_url);
        let mut api_url = None;
        let mut token = None;
        let mut draft = InterviewSetupDraft::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--api" => api_url = Some(require_value(args, "--api")?),
                "--token" => token = Some(require_value(args, "--token")?),
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if command == Command::Practice => {
                    parse_practice_flag(flag, args, &mut draft)?;
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            command,
            db_url,
            api_url,
            token,
            draft,
        })
    }
}

fn parse_practice_flag(
    flag: &str,
    args: &mut impl Iterator<Item = String>,
    draft: &mut InterviewSetupDraft,
) -> Result<(), ArgsError> {
    match flag {
        "--company" => draft.company_name = require_value(args, "--company")?,
        "--job-description" => draft.job_description = require_value(args, "--job-description")?,
        "--job-description-file" => {
            let path = PathBuf::from(require_value(args, "--job-description-file")?);
            draft.job_description = std::fs::read_to_string(&path)
                .map_err(|source| ArgsError::ReadFile { path, source })?;
        }
        "--job-title" => draft.job_title = Some(require_value(args, "--job-title")?),
        "--type" => {
            let raw = require_value(args, "--type")?;
            draft.interview_type = raw
                .parse::<InterviewType>()
                .map_err(|_| ArgsError::InvalidValue { flag: "--type", raw })?;
        }
        "--difficulty" => {
            let raw = require_value(args, "--difficulty")?;
            draft.difficulty = raw
                .parse::<Difficulty>()
                .map_err(|_| ArgsError::InvalidValue {
                    flag: "--difficulty",
                    raw,
                })?;
        }
        "--duration" => {
            let raw = require_value(args, "--duration")?;
            draft.duration_minutes = raw.parse().map_err(|_| ArgsError::InvalidValue {
                flag: "--duration",
                raw,
            })?;
        }
        _ => return Err(ArgsError::UnknownArg(flag.to_owned())),
    }
    Ok(())
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw.starts_with("sqlite::memory:") || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url.starts_with("sqlite::memory:") {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(command: Command, raw: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = raw.iter().map(|s| (*s).to_owned());
        Args::parse(command, &mut iter)
    }

    #[test]
    fn practice_flags_fill_the_draft() {
        let args = parse(
            Command::Practice,
            &[
                "--company",
                "Acme",
                "--job-description",
                "Ship features",
                "--type",
                "Technical",
                "--difficulty",
                "senior",
                "--duration",
                "45",
                "--db",
                "sqlite::memory:",
            ],
        )
        .unwrap();

        assert_eq!(args.draft.company_name, "Acme");
        assert_eq!(args.draft.interview_type, InterviewType::Technical);
        assert_eq!(args.draft.difficulty, Difficulty::Senior);
        assert_eq!(args.draft.duration_minutes, 45);
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn practice_flags_are_rejected_elsewhere() {
        let err = parse(Command::History, &["--company", "Acme"]).unwrap_err();
        assert!(matches!(err, ArgsError::UnknownArg(arg) if arg == "--company"));
    }

    #[test]
    fn bad_values_name_the_flag() {
        let err = parse(Command::Practice, &["--duration", "soon"]).unwrap_err();
        assert_eq!(err.to_string(), "invalid --duration value: soon");

        let err = parse(Command::Practice, &["--type"]).unwrap_err();
        assert_eq!(err.to_string(), "--type requires a value");
    }

    #[test]
    fn relative_sqlite_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/interviews.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/interviews.db"));
    }
}
