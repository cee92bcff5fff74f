//! Feed categories and their highlight tags.
//!
//! A highlight tag is a predefined search shortcut shown above a category's
//! headlines. Selecting one runs a query-mode fetch for the tag text.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, ValueEnum)]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    /// Navigation order.
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    /// The label sent to the feed source.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }

    pub fn highlight_tags(self) -> &'static [&'static str] {
        match self {
            Category::Business => &["Markets", "Startups", "Economy", "Crypto", "Finance"],
            Category::Entertainment => &["Movies", "Music", "Celebrities", "TV Shows", "Awards"],
            Category::General => &["Breaking News", "World", "Local", "Politics"],
            Category::Health => &["Nutrition", "Mental Health", "Medicine", "Fitness", "Viruses"],
            Category::Science => &["Space", "Research", "Physics", "Discovery", "Wildlife"],
            Category::Sports => &["Football", "Soccer", "NBA", "Tennis", "Formula 1", "Transfers"],
            Category::Technology => &["AI", "Gadgets", "Cybersecurity", "Apps", "Gaming"],
        }
    }

    /// Look up one of this category's tags ignoring case, returning its
    /// canonical spelling.
    pub fn find_tag(self, tag: &str) -> Option<&'static str> {
        let tag = tag.trim();
        self.highlight_tags()
            .iter()
            .copied()
            .find(|t| t.eq_ignore_ascii_case(tag))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown category {wanted:?}"))
    }
}
