use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default session title used when no config file provides one.
pub const DEFAULT_TITLE: &str = "幸运大抽奖";

/// A named prize category with a winner quota for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrizeTier {
    pub name: String,
    pub quota: u32,
}

impl PrizeTier {
    pub fn new(name: impl Into<String>, quota: u32) -> Self {
        Self {
            name: name.into(),
            quota,
        }
    }
}

/// Prize-tier configuration plus the optional session title.
///
/// The on-disk format is one directive per line: `Title=<text>` or
/// `<tierName>=<count>`, with the full-width `：` accepted in place of `=`.
/// Blank lines and `#` comments are ignored. Malformed lines are dropped
/// individually and never abort a load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawConfig {
    pub title: Option<String>,
    pub tiers: Vec<PrizeTier>,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_string()),
            tiers: vec![
                PrizeTier::new("特等奖", 1),
                PrizeTier::new("一等奖", 3),
                PrizeTier::new("二等奖", 5),
                PrizeTier::new("三等奖", 10),
                PrizeTier::new("幸运奖", 20),
            ],
        }
    }
}

impl DrawConfig {
    /// Parse directive lines into a config.
    ///
    /// The first `Title` line (key matched case-insensitively) wins; every
    /// other non-blank, non-comment line defines a tier. A missing,
    /// non-positive or unparseable count defaults to 1. Duplicate tier names
    /// keep the position of their first appearance and the quota of their
    /// last.
    pub fn parse_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut title: Option<String> = None;
        let mut tiers: Vec<PrizeTier> = Vec::new();

        for line in lines {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (key, value) = split_directive(line);
            if key.is_empty() {
                continue;
            }

            // a bare "Title" line with no separator falls through as a tier
            if key.eq_ignore_ascii_case("title") {
                if let Some(v) = value {
                    if title.is_none() {
                        title = Some(v.to_string());
                    }
                    continue;
                }
            }

            let quota = parse_quota(value);
            match tiers.iter_mut().find(|t| t.name == key) {
                Some(existing) => existing.quota = quota,
                None => tiers.push(PrizeTier::new(key, quota)),
            }
        }

        Self { title, tiers }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::parse_lines(text.lines());
        tracing::info!(
            "Loaded {} prize tiers from {}",
            config.tiers.len(),
            path.display()
        );
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("Title={}\n", title));
        }
        for tier in &self.tiers {
            out.push_str(&format!("{}={}\n", tier.name, tier.quota));
        }
        std::fs::write(path, out)?;
        Ok(())
    }

    pub fn tier(&self, name: &str) -> Option<&PrizeTier> {
        self.tiers.iter().find(|t| t.name == name)
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }
}

/// Split a directive at the first `=` or full-width `：`.
///
/// A line with no separator is a bare tier name; the quota falls back to 1.
fn split_directive(line: &str) -> (&str, Option<&str>) {
    for (i, ch) in line.char_indices() {
        if ch == '=' || ch == '：' {
            let key = line[..i].trim();
            let value = line[i + ch.len_utf8()..].trim();
            return (key, Some(value));
        }
    }
    (line, None)
}

fn parse_quota(value: Option<&str>) -> u32 {
    match value.and_then(|v| v.parse::<i64>().ok()) {
        Some(n) if n > 0 => n as u32,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_and_tiers() {
        let config = DrawConfig::parse_lines(["Title=Demo", "A=2", "B"]);
        assert_eq!(config.title.as_deref(), Some("Demo"));
        assert_eq!(
            config.tiers,
            vec![PrizeTier::new("A", 2), PrizeTier::new("B", 1)]
        );
    }

    #[test]
    fn accepts_fullwidth_colon() {
        let config = DrawConfig::parse_lines(["Title：年会抽奖", "一等奖：3"]);
        assert_eq!(config.title.as_deref(), Some("年会抽奖"));
        assert_eq!(config.tiers, vec![PrizeTier::new("一等奖", 3)]);
    }

    #[test]
    fn skips_blanks_and_comments() {
        let config = DrawConfig::parse_lines(["", "# comment", "   ", "A=2"]);
        assert_eq!(config.tiers, vec![PrizeTier::new("A", 2)]);
    }

    #[test]
    fn first_title_wins() {
        let config = DrawConfig::parse_lines(["Title=First", "title=Second"]);
        assert_eq!(config.title.as_deref(), Some("First"));
    }

    #[test]
    fn duplicate_tiers_keep_first_order_last_quota() {
        let config = DrawConfig::parse_lines(["A=1", "B=2", "A=7"]);
        assert_eq!(
            config.tiers,
            vec![PrizeTier::new("A", 7), PrizeTier::new("B", 2)]
        );
    }

    #[test]
    fn bad_quotas_default_to_one() {
        let config = DrawConfig::parse_lines(["A=0", "B=-3", "C=abc", "D="]);
        for tier in &config.tiers {
            assert_eq!(tier.quota, 1, "tier {} should default", tier.name);
        }
    }

    #[test]
    fn empty_key_is_discarded() {
        let config = DrawConfig::parse_lines(["=5", "：3"]);
        assert!(config.tiers.is_empty());
    }

    #[test]
    fn default_matches_seed_tiers() {
        let config = DrawConfig::default();
        assert_eq!(config.title.as_deref(), Some(DEFAULT_TITLE));
        assert_eq!(
            config.tiers,
            vec![
                PrizeTier::new("特等奖", 1),
                PrizeTier::new("一等奖", 3),
                PrizeTier::new("二等奖", 5),
                PrizeTier::new("三等奖", 10),
                PrizeTier::new("幸运奖", 20),
            ]
        );
    }

    #[test]
    fn saves_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prizes.conf");

        let config = DrawConfig::parse_lines(["Title=Demo", "A=2", "B=4"]);
        config.save(&path).unwrap();

        let reloaded = DrawConfig::load(&path).unwrap();
        assert_eq!(reloaded, config);
    }
}
