use std::{env, fmt, path::PathBuf};

use tracing::Level;

const LOG_LEVEL_ENV: &str = "TACC_LOG";
const LOG_FORMAT_ENV: &str = "TACC_LOG_FORMAT";
const DEFAULT_LOG_LEVEL: Level = Level::WARN;

/// Program compiled when no source path is given on the command line.
pub const SAMPLE_PROGRAM: &str = r#"
def get_max(a, b) {
    if (a > b) {
        return a;
    } else {
        return b;
    }
}

x = 15;
y = 25;
max_val = get_max(x, y);
print max_val;

i = 0;
while (i < 3) {
    i = i + 1;
}
print i;
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    File(PathBuf),
    BuiltinSample,
}

impl fmt::Display for SourceOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceOrigin::File(path) => write!(f, "file {}", path.display()),
            SourceOrigin::BuiltinSample => write!(f, "built-in sample program"),
        }
    }
}

/// Driver settings resolved from the command line and the environment.
///
/// The first positional argument names the source file; without one the
/// built-in sample is compiled. `TACC_LOG` selects the log level and
/// `TACC_LOG_FORMAT=json` switches the log output to JSON lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    pub source: SourceOrigin,
    pub log_level: Level,
    pub log_format: LogFormat,
}

impl DriverConfig {
    pub fn from_env() -> Self {
        Self::resolve(env::args().skip(1), |key| env::var(key).ok())
    }

    pub fn resolve<I, F>(args: I, lookup: F) -> Self
    where
        I: IntoIterator<Item = String>,
        F: Fn(&str) -> Option<String>,
    {
        let source = args
            .into_iter()
            .next()
            .filter(|arg| !arg.trim().is_empty())
            .map(|arg| SourceOrigin::File(PathBuf::from(arg)))
            .unwrap_or(SourceOrigin::BuiltinSample);

        let log_level = lookup(LOG_LEVEL_ENV)
            .and_then(|raw| raw.trim().parse::<Level>().ok())
            .unwrap_or(DEFAULT_LOG_LEVEL);

        let log_format = match lookup(LOG_FORMAT_ENV) {
            Some(raw) if raw.trim().eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Self { source, log_level, log_format }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_to_sample_and_warn() {
        let config = DriverConfig::resolve(Vec::new(), no_env);
        assert_eq!(config.source, SourceOrigin::BuiltinSample);
        assert_eq!(config.log_level, Level::WARN);
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.source.to_string(), "built-in sample program");
    }

    #[test]
    fn positional_argument_selects_file() {
        let config = DriverConfig::resolve(vec!["prog.src".to_string()], no_env);
        assert_eq!(config.source, SourceOrigin::File(PathBuf::from("prog.src")));
        assert_eq!(config.source.to_string(), "file prog.src");
    }

    #[test]
    fn environment_overrides_logging() {
        let lookup = |key: &str| match key {
            "TACC_LOG" => Some("debug".to_string()),
            "TACC_LOG_FORMAT" => Some("JSON".to_string()),
            _ => None,
        };
        let config = DriverConfig::resolve(Vec::new(), lookup);
        assert_eq!(config.log_level, Level::DEBUG);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_level_falls_back() {
        let lookup = |key: &str| (key == "TACC_LOG").then(|| "loud".to_string());
        let config = DriverConfig::resolve(Vec::new(), lookup);
        assert_eq!(config.log_level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn sample_program_compiles() {
        assert!(crate::compile(SAMPLE_PROGRAM).is_ok());
    }
}
