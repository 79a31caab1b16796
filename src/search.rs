// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::channels::ChannelList;

/// Channel search entry with fuzzy autocompletion
pub struct ChannelSearch {
    pub query: String,
    /// Channel indices ranked best first
    pub candidates: Vec<usize>,
    pub selected: usize,
    matcher: SkimMatcherV2,
}

impl Default for ChannelSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelSearch {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            candidates: Vec::new(),
            selected: 0,
            matcher: SkimMatcherV2::default().ignore_case(),
        }
    }

    pub fn push(&mut self, c: char, channels: &ChannelList) {
        self.query.push(c);
        self.update(channels);
    }

    pub fn pop(&mut self, channels: &ChannelList) {
        self.query.pop();
        self.update(channels);
    }

    pub fn update(&mut self, channels: &ChannelList) {
        self.selected = 0;

        if self.query.is_empty() {
            self.candidates = (0..channels.len()).collect();
            return;
        }

        let mut scored: Vec<(i64, usize)> = channels
            .iter()
            .enumerate()
            .filter_map(|(idx, channel)| {
                self.matcher
                    .fuzzy_match(&channel.name, &self.query)
                    .map(|score| (score, idx))
            })
            .collect();

        // Stable sort keeps file order among equal scores
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        self.candidates = scored.into_iter().map(|(_, idx)| idx).collect();
    }

    /// Complete the query to the selected candidate's name
    pub fn complete(&mut self, channels: &ChannelList) {
        let Some(idx) = self.selected() else {
            return;
        };
        let Some(channel) = channels.get(idx) else {
            return;
        };

        self.query = channel.name.clone();
        self.update(channels);
        // Keep pointing at the same channel after re-ranking
        if let Some(position) = self.candidates.iter().position(|&c| c == idx) {
            self.selected = position;
        }
    }

    pub fn select_next(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = (self.selected + 1) % self.candidates.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.candidates.is_empty() {
            self.selected = self
                .selected
                .checked_sub(1)
                .unwrap_or(self.candidates.len() - 1);
        }
    }

    /// Channel index of the highlighted candidate
    pub fn selected(&self) -> Option<usize> {
        self.candidates.get(self.selected).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels() -> ChannelList {
        ChannelList::parse(
            "BBC ONE:490000000:4165\n\
             BBC TWO:490000000:4287\n\
             ITV:506000000:8261\n\
             Channel 4:506000000:8384\n\
             BBC NEWS:490000000:4415\n",
            8,
        )
    }

    #[test]
    fn empty_query_lists_everything() {
        let channels = channels();
        let mut search = ChannelSearch::new();
        search.update(&channels);
        assert_eq!(search.candidates, vec![0, 1, 2, 3, 4]);
        assert_eq!(search.selected(), Some(0));
    }

    #[test]
    fn fuzzy_matches_names() {
        let channels = channels();
        let mut search = ChannelSearch::new();
        for c in "bbcn".chars() {
            search.push(c, &channels);
        }
        assert!(search.candidates.contains(&0));
        assert!(search.candidates.contains(&4));
        assert!(!search.candidates.contains(&1));

        search.pop(&channels);
        assert!(search.candidates.contains(&0));
        assert!(search.candidates.contains(&1));
        assert!(!search.candidates.contains(&2));
    }

    #[test]
    fn no_match_selects_nothing() {
        let channels = channels();
        let mut search = ChannelSearch::new();
        for c in "xyz".chars() {
            search.push(c, &channels);
        }
        assert!(search.candidates.is_empty());
        assert_eq!(search.selected(), None);

        search.select_next();
        search.select_previous();
        assert_eq!(search.selected(), None);
    }

    #[test]
    fn completion_fills_in_the_name() {
        let channels = channels();
        let mut search = ChannelSearch::new();
        search.push('i', &channels);
        search.push('t', &channels);
        search.complete(&channels);
        assert_eq!(search.query, "ITV");
        assert_eq!(search.selected(), Some(2));
    }

    #[test]
    fn selection_wraps() {
        let channels = channels();
        let mut search = ChannelSearch::new();
        search.update(&channels);
        search.select_previous();
        assert_eq!(search.selected(), Some(4));
        search.select_next();
        assert_eq!(search.selected(), Some(0));
    }
}
