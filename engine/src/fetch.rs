//! Downloads through the platform's command-line download utility.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::{debug, warn};
use serde::Deserialize;

/// Longest fact line that is kept.
const MAX_FACT_BYTES: u64 = 512;

/// Command that writes `url` to `dest`.
pub fn download_command(url: &str, dest: &Path) -> Command {
    if cfg!(windows) {
        let mut command = Command::new("powershell");
        command.arg("-Command").arg(format!(
            "(New-Object System.Net.WebClient).DownloadFile('{url}', '{}')",
            dest.display()
        ));
        command
    } else {
        let mut command = Command::new("wget");
        command.arg("-q").arg(url).arg("-O").arg(dest);
        command
    }
}

/// Runs the download utility. The exit status is returned, not verified.
pub fn download(url: &str, dest: &Path) -> io::Result<ExitStatus> {
    debug!("downloading {url} to {}", dest.display());
    let status = download_command(url, dest).status()?;
    if !status.success() {
        warn!("download of {url} exited with {status}");
    }
    Ok(status)
}

/// Downloads `url` into `dest` unless `dest` already exists.
///
/// Returns `Ok(None)` when nothing had to be fetched.
pub fn download_if_missing(url: &str, dest: &Path) -> io::Result<Option<ExitStatus>> {
    if dest.exists() {
        return Ok(None);
    }
    download(url, dest).map(Some)
}

#[derive(Deserialize)]
struct FactPayload {
    text: String,
}

/// First line of the fact file, unwrapped from its JSON `text` field when
/// the endpoint answered with JSON.
///
/// Bytes are taken as they are; invalid UTF-8, including a character cut at
/// the length limit, becomes U+FFFD.
pub fn read_fact(path: &Path) -> io::Result<Option<String>> {
    let file = File::open(path)?;
    let mut line = Vec::new();
    BufReader::new(file.take(MAX_FACT_BYTES)).read_until(b'\n', &mut line)?;
    Ok(parse_fact(&String::from_utf8_lossy(&line)))
}

fn parse_fact(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<FactPayload>(line) {
        Ok(payload) => Some(payload.text),
        Err(_) => Some(line.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn json_fact_uses_text_field() {
        let json = r#"{"id":"1","text":"Honey never spoils.","source":"x","language":"en"}"#;
        assert_eq!(parse_fact(json).as_deref(), Some("Honey never spoils."));
    }

    #[test]
    fn plain_fact_is_kept_verbatim() {
        assert_eq!(parse_fact("Cats sleep a lot.\n").as_deref(), Some("Cats sleep a lot."));
        assert_eq!(parse_fact("  \n"), None);
    }

    #[test]
    fn only_the_first_line_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fact.txt");
        fs::write(&path, "first\nsecond\n").unwrap();
        assert_eq!(read_fact(&path).unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn character_cut_at_the_limit_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fact.txt");
        let mut contents = "a".repeat(511);
        contents.push_str("é tail\n");
        fs::write(&path, contents).unwrap();

        let fact = read_fact(&path).unwrap().unwrap();
        assert_eq!(fact, format!("{}\u{FFFD}", "a".repeat(511)));
    }

    #[test]
    fn invalid_utf8_is_still_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fact.txt");
        fs::write(&path, b"Owls \xff hoot\nsecond").unwrap();
        assert_eq!(read_fact(&path).unwrap().as_deref(), Some("Owls \u{FFFD} hoot"));
    }

    #[test]
    fn missing_fact_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_fact(&dir.path().join("fact.txt")).is_err());
    }

    #[test]
    fn existing_file_is_not_downloaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watermark.png");
        fs::write(&path, b"png").unwrap();
        let status = download_if_missing("http://127.0.0.1:9/none", &path).unwrap();
        assert!(status.is_none());
    }

    #[cfg(not(windows))]
    #[test]
    fn command_targets_wget() {
        let command = download_command("https://example.com/a.png", Path::new("a.png"));
        assert_eq!(command.get_program(), "wget");
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args, ["-q", "https://example.com/a.png", "-O", "a.png"]);
    }
}
