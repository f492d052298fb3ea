//! Manual metadata entry
//!
//! The linking pass never reads input itself. When a URL cannot be
//! classified it asks a [`ManualEntry`] implementation, which may prompt an
//! operator, replay recorded answers, or skip.

use crate::model::BookMetadata;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Identifies the ad an answer is requested for
#[derive(Debug, Clone, Copy)]
pub struct AdContext<'a> {
    pub campaign_name: &'a str,
    pub ad_id: &'a str,
    pub ad_name: &'a str,
    pub target_url: Option<&'a str>,
}

/// Answer for one unclassified ad
#[derive(Debug, Clone, PartialEq)]
pub enum ManualDecision {
    Link(BookMetadata),
    Skip,
}

/// Source of manual answers
pub trait ManualEntry {
    fn request(&mut self, ad: &AdContext<'_>) -> io::Result<ManualDecision>;
}

/// Line-based operator prompt
///
/// Asks for title, ASIN, blurb and cover URL in turn. Typing the skip
/// keyword as the title (or closing input) skips the ad.
pub struct LinePrompt<R, W> {
    input: R,
    output: W,
    skip_keyword: String,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(input: R, output: W, skip_keyword: &str) -> Self {
        Self {
            input,
            output,
            skip_keyword: skip_keyword.to_string(),
        }
    }

    fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

/// Prompt bound to the process's stdin/stdout
pub fn stdin_prompt(skip_keyword: &str) -> LinePrompt<io::StdinLock<'static>, io::Stdout> {
    LinePrompt::new(io::stdin().lock(), io::stdout(), skip_keyword)
}

fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl<R: BufRead, W: Write> ManualEntry for LinePrompt<R, W> {
    fn request(&mut self, ad: &AdContext<'_>) -> io::Result<ManualDecision> {
        writeln!(self.output)?;
        writeln!(self.output, "Campaign: {}", ad.campaign_name)?;
        writeln!(self.output, "Ad ID:    {}", ad.ad_id)?;
        writeln!(self.output, "Ad Name:  {}", ad.ad_name)?;
        writeln!(self.output, "URL:      {}", ad.target_url.unwrap_or("(none)"))?;

        let title = match self.ask("Book Title")? {
            Some(title) if !title.is_empty() && !title.eq_ignore_ascii_case(&self.skip_keyword) => {
                title
            }
            _ => return Ok(ManualDecision::Skip),
        };

        let asin = optional(self.ask("ASIN (optional)")?).map(|a| a.to_uppercase());
        let blurb = optional(self.ask("Blurb (optional)")?);
        let cover_url = optional(self.ask("Cover Image URL (optional)")?);

        Ok(ManualDecision::Link(BookMetadata {
            title,
            asin,
            blurb,
            cover_url,
        }))
    }
}

/// Skips every unclassified ad (non-interactive runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipUnknown;

impl ManualEntry for SkipUnknown {
    fn request(&mut self, ad: &AdContext<'_>) -> io::Result<ManualDecision> {
        tracing::info!("Skipping unclassified ad {} ({})", ad.ad_name, ad.ad_id);
        Ok(ManualDecision::Skip)
    }
}

/// Replays recorded answers in order, skipping once they run out
#[derive(Debug, Clone, Default)]
pub struct RecordedAnswers {
    answers: VecDeque<ManualDecision>,
    asked: usize,
}

impl RecordedAnswers {
    pub fn new(answers: impl IntoIterator<Item = ManualDecision>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: 0,
        }
    }

    /// Number of requests received so far
    pub fn asked(&self) -> usize {
        self.asked
    }
}

impl ManualEntry for RecordedAnswers {
    fn request(&mut self, _ad: &AdContext<'_>) -> io::Result<ManualDecision> {
        self.asked += 1;
        Ok(self.answers.pop_front().unwrap_or(ManualDecision::Skip))
    }
}
