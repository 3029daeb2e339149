mod pretty_list;

use {
    flexi_logger::{
        DeferredNow, FlexiLoggerError, Logger, LoggerHandle, Record,
    },
    regex::Regex,
    std::{fmt::Write as FmtWrite, io, sync::OnceLock},
    textwrap::{termwidth, Options},
};

pub use self::pretty_list::PrettyList;

/// Matches the final continuation line of a wrapped record so it can be
/// closed off with a different box-drawing character.
static LAST_LINE_MATCHER: OnceLock<Option<Regex>> = OnceLock::new();

/// Setup console logging for this application.
///
/// The returned handle must be kept alive for as long as logs should be
/// written.
pub fn setup() -> Result<LoggerHandle, FlexiLoggerError> {
    let handle = Logger::try_with_env_or_str("info")?
        .format(multiline_format)
        .start()?;

    log::info!(
        "Adjust the log level by setting RUST_LOG. By default RUST_LOG=info"
    );

    Ok(handle)
}

/// An opinionated formatting function for flexi_logger which automatically
/// wraps content to the terminal width.
///
/// Logs are prefixed with unicode so it's easy to tell where a big log
/// statement begins and ends.
pub fn multiline_format(
    w: &mut dyn io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), io::Error> {
    let mut full_line = String::new();
    writeln!(
        full_line,
        "{} [{}] [{}:{}]",
        record.level(),
        now.now().format("%H:%M:%S%.6f"),
        record.file().unwrap_or("<unnamed>"),
        record.line().unwrap_or(0),
    )
    .map_err(io::Error::other)?;

    write!(&mut full_line, "{}", &record.args()).map_err(io::Error::other)?;

    writeln!(w, "{}", decorate(&full_line, termwidth().min(74)))
}

/// Wrap the text to the given width and add the box-drawing prefixes.
fn decorate(full_line: &str, width: usize) -> String {
    let wrap_options = Options::new(width)
        .initial_indent("┏ ")
        .subsequent_indent("┃ ");
    let wrapped = textwrap::fill(full_line, wrap_options);

    match last_line_matcher() {
        Some(matcher) => matcher.replace(&wrapped, "┗$2").into_owned(),
        None => wrapped,
    }
}

fn last_line_matcher() -> Option<&'static Regex> {
    LAST_LINE_MATCHER
        .get_or_init(|| Regex::new(r"(┃)(.*)$").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::decorate;

    #[test]
    fn multiline_records_are_boxed() {
        let decorated = decorate("INFO [now] [file.rs:1]\nhello world", 74);
        let lines: Vec<&str> = decorated.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("┏ INFO"));
        assert_eq!(lines[1], "┗ hello world");
    }

    #[test]
    fn only_the_last_line_is_closed() {
        let decorated = decorate("header\nfirst\nsecond", 74);
        let lines: Vec<&str> = decorated.lines().collect();

        assert_eq!(lines, vec!["┏ header", "┃ first", "┗ second"]);
    }
}
