//! Configuration file loading.
//!
//! The catalog is TOML: store paths plus one `[[feeds]]` table per feed.
//! Filter behavior is declarative (substring drop rules and regex
//! rewrites) and gets compiled here into the opaque filter callbacks
//! the engine takes. Loaded once before the run, immutable afterwards.

use anyhow::{Context, Result, bail};
use feedspool_core::{Entry, EntryFilter, FeedConfig};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maildir the feeds are mirrored into. A leading `~` expands to the
    /// home directory.
    pub maildir: PathBuf,
    /// Cache file path; defaults to `.feedspool-cache.json` inside the
    /// maildir.
    #[serde(default)]
    pub cache_file: Option<PathBuf>,
    /// Default log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// User-Agent for feed requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// The feed catalog.
    #[serde(default)]
    pub feeds: Vec<FeedEntry>,
}

/// One `[[feeds]]` table.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedEntry {
    /// Feed url (`exec:` runs a local command instead).
    pub url: String,
    /// Display title override.
    #[serde(default)]
    pub title: Option<String>,
    /// Derive message identity from the feed-assigned entry id.
    #[serde(default)]
    pub use_uid: bool,
    /// Conditional fetching (ETag / Last-Modified).
    #[serde(default = "default_true")]
    pub use_header: bool,
    /// Trust entry-provided timestamps.
    #[serde(default = "default_true")]
    pub use_date: bool,
    /// Skip delivering entries older than this many days.
    #[serde(default)]
    pub max_age_days: Option<u32>,
    /// Drop entries whose link contains any of these substrings.
    #[serde(default)]
    pub drop_link_contains: Vec<String>,
    /// Drop entries whose title contains any of these substrings.
    #[serde(default)]
    pub drop_title_contains: Vec<String>,
    /// Regex substitutions applied to entry fields before identity
    /// derivation.
    #[serde(default)]
    pub rewrite: Vec<RewriteRule>,
}

/// A single regex substitution over one entry field.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RewriteRule {
    /// Field the substitution applies to.
    pub field: RewriteField,
    /// Pattern to replace (all occurrences).
    pub pattern: String,
    /// Replacement, `$1`-style capture groups allowed.
    pub replace: String,
}

/// Entry fields a rewrite rule can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RewriteField {
    /// The feed-assigned entry id.
    Id,
    /// The entry title.
    Title,
    /// The entry summary HTML.
    Summary,
    /// The entry link.
    Link,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_user_agent() -> String {
    format!("feedspool/{}", env!("CARGO_PKG_VERSION"))
}

impl Config {
    /// Loads and validates the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a
    /// rewrite pattern is not a valid regex, or if no feeds are
    /// configured at all.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("cannot parse config file {}", path.display()))?;

        if config.feeds.is_empty() {
            bail!("no feeds configured in {}", path.display());
        }
        for feed in &config.feeds {
            for rule in &feed.rewrite {
                Regex::new(&rule.pattern).with_context(|| {
                    format!("invalid rewrite pattern {:?} for {}", rule.pattern, feed.url)
                })?;
            }
        }
        Ok(config)
    }

    /// The effective cache file path.
    #[must_use]
    pub fn cache_path(&self, maildir: &Path) -> PathBuf {
        self.cache_file
            .clone()
            .unwrap_or_else(|| maildir.join(".feedspool-cache.json"))
    }

    /// The maildir path with `~` expanded.
    #[must_use]
    pub fn maildir_path(&self) -> PathBuf {
        expand_home(&self.maildir)
    }
}

impl FeedEntry {
    /// Compiles this entry into an engine feed config.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewrite pattern fails to compile (load-time
    /// validation makes this unreachable for loaded configs, but the
    /// conversion is usable on its own).
    pub fn into_feed_config(self) -> Result<FeedConfig> {
        let mut feed = FeedConfig::new(self.url);
        feed.title = self.title;
        feed.use_uid = self.use_uid;
        feed.use_header = self.use_header;
        feed.use_date = self.use_date;
        feed.max_age_days = self.max_age_days;

        if !self.drop_link_contains.is_empty()
            || !self.drop_title_contains.is_empty()
            || !self.rewrite.is_empty()
        {
            let rewrites = self
                .rewrite
                .into_iter()
                .map(|rule| {
                    let regex = Regex::new(&rule.pattern)?;
                    Ok((rule.field, regex, rule.replace))
                })
                .collect::<Result<Vec<_>>>()?;
            feed.filter = Some(compile_filter(
                self.drop_link_contains,
                self.drop_title_contains,
                rewrites,
            ));
        }
        Ok(feed)
    }
}

/// Builds the filter callback: drop checks first, then rewrites, like
/// the hand-written per-site filters this replaces.
fn compile_filter(
    drop_link: Vec<String>,
    drop_title: Vec<String>,
    rewrites: Vec<(RewriteField, Regex, String)>,
) -> EntryFilter {
    Box::new(move |entry: &mut Entry| {
        if drop_link.iter().any(|s| entry.link.contains(s.as_str())) {
            return true;
        }
        if let Some(title) = entry.title.as_deref() {
            if drop_title.iter().any(|s| title.contains(s.as_str())) {
                return true;
            }
        }

        for (field, regex, replace) in &rewrites {
            match field {
                RewriteField::Link => {
                    entry.link = regex.replace_all(&entry.link, replace.as_str()).into_owned();
                }
                RewriteField::Id => {
                    if let Some(id) = entry.id.take() {
                        entry.id = Some(regex.replace_all(&id, replace.as_str()).into_owned());
                    }
                }
                RewriteField::Title => {
                    if let Some(title) = entry.title.take() {
                        entry.title =
                            Some(regex.replace_all(&title, replace.as_str()).into_owned());
                    }
                }
                RewriteField::Summary => {
                    if let Some(summary) = entry.summary.take() {
                        entry.summary =
                            Some(regex.replace_all(&summary, replace.as_str()).into_owned());
                    }
                }
            }
        }
        false
    })
}

fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}

/// Default config file location: `<config dir>/feedspool/config.toml`.
#[must_use]
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("feedspool")
        .join("config.toml")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
maildir = "~/.maildir/Feeds"

[[feeds]]
url = "https://www.heise.de/newsticker/heise-atom.xml"
title = "Heise"
use_uid = true

[[feeds.rewrite]]
field = "id"
pattern = '.*-([0-9]*)\.html'
replace = "https://heise.de/-$1"

[[feeds]]
url = "https://www.tagesschau.de/xml/rss2"
use_uid = true
drop_link_contains = ["sportschau"]

[[feeds]]
url = "https://blog.example.org/rss.xml"
use_header = false
max_age_days = 7
"#;

    fn load(raw: &str) -> Config {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, raw).unwrap();
        Config::load(&path).unwrap()
    }

    #[test]
    fn test_parses_catalog() {
        let config = load(EXAMPLE);
        assert_eq!(config.feeds.len(), 3);
        assert_eq!(config.feeds[0].title.as_deref(), Some("Heise"));
        assert!(config.feeds[0].use_uid);
        assert!(!config.feeds[2].use_header);
        assert_eq!(config.feeds[2].max_age_days, Some(7));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_rejects_empty_catalog() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "maildir = \"/tmp/mail\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_rejects_bad_rewrite_pattern() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
maildir = "/tmp/mail"

[[feeds]]
url = "https://example.org/feed"

[[feeds.rewrite]]
field = "id"
pattern = "("
replace = ""
"#,
        )
        .unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_drop_rule_compiles_into_filter() {
        let config = load(EXAMPLE);
        let feed = config
            .feeds
            .into_iter()
            .find(|f| f.url.contains("tagesschau"))
            .unwrap()
            .into_feed_config()
            .unwrap();
        let filter = feed.filter.unwrap();

        let mut dropped = Entry::new("https://www.sportschau.de/some-article");
        assert!(filter(&mut dropped));
        let mut kept = Entry::new("https://www.tagesschau.de/inland/article");
        assert!(!filter(&mut kept));
    }

    #[test]
    fn test_rewrite_rule_rewrites_id() {
        let config = load(EXAMPLE);
        let feed = config
            .feeds
            .into_iter()
            .find(|f| f.url.contains("heise"))
            .unwrap()
            .into_feed_config()
            .unwrap();
        let filter = feed.filter.unwrap();

        let mut entry = Entry::new("https://www.heise.de/news/x");
        entry.id = Some("https://www.heise.de/news/article-4711.html".to_string());
        assert!(!filter(&mut entry));
        assert_eq!(entry.id.as_deref(), Some("https://heise.de/-4711"));
    }

    #[test]
    fn test_cache_path_defaults_into_maildir() {
        let config = load(EXAMPLE);
        let maildir = PathBuf::from("/tmp/mail");
        assert_eq!(
            config.cache_path(&maildir),
            PathBuf::from("/tmp/mail/.feedspool-cache.json")
        );
    }
}
