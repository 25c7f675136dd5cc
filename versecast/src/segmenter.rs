//! Episode segmentation.
//!
//! Partitions the corpus into an ordered list of episodes, each targeting a
//! bounded narration length. Chapters are never split across episodes;
//! consecutive short books are buffered together; a long book is walked
//! chapter by chapter and split where the running total would exceed the
//! ceiling, with merge rules so no pathologically short episode survives at
//! either end of a book.

use crate::corpus::{Book, Chapter, Corpus, Verse};
use anyhow::Result;

/// Default narration rate for Korean scripture reading.
pub const DEFAULT_CHARS_PER_MINUTE: usize = 910;

/// Character thresholds steering segmentation.
///
/// All four are derived from a characters-per-minute narration rate and
/// minute targets; only the relational invariant
/// `min_merge < min < target < max` is a hard contract.
#[derive(Debug, Clone)]
pub struct SegmentationConfig {
    /// Below this, a book or book group is too short to stand alone
    pub min_episode_chars: usize,
    /// Ideal episode size; short-book buffers flush once they reach it
    pub target_episode_chars: usize,
    /// Hard ceiling that triggers a split decision inside long books
    pub max_episode_chars: usize,
    /// Below this, a would-be trailing episode is folded into a neighbor
    pub min_merge_chars: usize,
    /// Narration rate the thresholds were derived from
    pub chars_per_minute: usize,
}

impl SegmentationConfig {
    /// Derive character thresholds from minute targets.
    pub fn from_minutes(
        chars_per_minute: usize,
        min_minutes: u32,
        target_minutes: u32,
        max_minutes: u32,
        min_merge_minutes: u32,
    ) -> Self {
        Self {
            min_episode_chars: chars_per_minute * min_minutes as usize,
            target_episode_chars: chars_per_minute * target_minutes as usize,
            max_episode_chars: chars_per_minute * max_minutes as usize,
            min_merge_chars: chars_per_minute * min_merge_minutes as usize,
            chars_per_minute,
        }
    }

    /// Check the relational invariant between the thresholds.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_merge_chars < self.min_episode_chars
            && self.min_episode_chars < self.target_episode_chars
            && self.target_episode_chars < self.max_episode_chars)
        {
            anyhow::bail!(
                "segmentation thresholds must satisfy min_merge < min < target < max (got {} / {} / {} / {})",
                self.min_merge_chars,
                self.min_episode_chars,
                self.target_episode_chars,
                self.max_episode_chars
            );
        }
        Ok(())
    }
}

impl Default for SegmentationConfig {
    /// 12 / 18 / 22 / 8 minutes at 910 chars per minute.
    fn default() -> Self {
        Self::from_minutes(DEFAULT_CHARS_PER_MINUTE, 12, 18, 22, 8)
    }
}

/// A contiguous run of chapters targeted at one narration session.
#[derive(Debug, Clone)]
pub struct Episode {
    /// Stable identifier derived from the sequence number
    pub id: String,
    /// Book of the first chapter in the episode
    pub primary_book: String,
    /// First chapter number in the episode
    pub start_chapter: u32,
    /// Last chapter number in the episode
    pub end_chapter: u32,
    /// Chapters in corpus order
    pub chapters: Vec<Chapter>,
    /// 1-based position in the full episode list
    pub sequence_number: u32,
    /// All book names, set only when more than one book was merged
    pub books_in_episode: Option<Vec<String>>,
}

impl Episode {
    fn new(sequence_number: u32, chapters: Vec<Chapter>, books: Vec<String>) -> Self {
        debug_assert!(!chapters.is_empty());
        let primary_book = chapters[0].book.clone();
        let start_chapter = chapters[0].chapter;
        let end_chapter = chapters[chapters.len() - 1].chapter;
        let books_in_episode = if books.len() > 1 { Some(books) } else { None };

        Self {
            id: format!("ep-{:03}", sequence_number),
            primary_book,
            start_chapter,
            end_chapter,
            chapters,
            sequence_number,
            books_in_episode,
        }
    }

    pub fn total_chars(&self) -> usize {
        self.chapters.iter().map(|c| c.total_chars()).sum()
    }

    pub fn verse_count(&self) -> usize {
        self.chapters.iter().map(|c| c.verses.len()).sum()
    }

    /// All verses in the episode, flattened in corpus order.
    pub fn verses(&self) -> impl Iterator<Item = &Verse> {
        self.chapters.iter().flat_map(|c| c.verses.iter())
    }

    /// Human-readable title, e.g. "창세기 1-25장".
    pub fn display_title(&self) -> String {
        if let Some(books) = &self.books_in_episode {
            return books.join(", ");
        }
        if self.start_chapter == self.end_chapter {
            format!("{} {}장", self.primary_book, self.start_chapter)
        } else {
            format!("{} {}-{}장", self.primary_book, self.start_chapter, self.end_chapter)
        }
    }

    /// Estimated narration length in minutes.
    pub fn estimated_minutes(&self, chars_per_minute: usize) -> f64 {
        if chars_per_minute == 0 {
            return 0.0;
        }
        self.total_chars() as f64 / chars_per_minute as f64
    }
}

/// A run of consecutive short books waiting to be emitted.
#[derive(Debug, Default)]
struct PendingGroup {
    chapters: Vec<Chapter>,
    books: Vec<String>,
    chars: usize,
}

impl PendingGroup {
    fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    fn push_book(&mut self, book: &Book) {
        self.books.push(book.name.clone());
        self.chars += book.total_chars();
        self.chapters.extend(book.chapters.iter().cloned());
    }

    fn take(&mut self) -> PendingGroup {
        std::mem::take(self)
    }
}

/// Partition the corpus into episodes.
///
/// The result covers every chapter exactly once, in corpus order, with
/// strictly increasing gapless sequence numbers. An empty corpus yields an
/// empty list.
pub fn segment(corpus: &Corpus, config: &SegmentationConfig) -> Vec<Episode> {
    let mut segmenter = Segmenter::new(config);

    for book in corpus.books() {
        if book.chapters.is_empty() {
            continue;
        }
        if book.total_chars() >= config.min_episode_chars {
            segmenter.long_book(book);
        } else {
            segmenter.short_book(book);
        }
    }

    segmenter.finish()
}

/// Running state of the greedy segmentation fold.
struct Segmenter<'a> {
    config: &'a SegmentationConfig,
    episodes: Vec<Episode>,
    /// Consecutive short books not yet emitted
    buffer: PendingGroup,
    next_seq: u32,
}

impl<'a> Segmenter<'a> {
    fn new(config: &'a SegmentationConfig) -> Self {
        Self {
            config,
            episodes: Vec::new(),
            buffer: PendingGroup::default(),
            next_seq: 1,
        }
    }

    fn emit(&mut self, chapters: Vec<Chapter>, books: Vec<String>) {
        let episode = Episode::new(self.next_seq, chapters, books);
        self.next_seq += 1;
        self.episodes.push(episode);
    }

    /// Accumulate a short book, flushing around the target/ceiling bounds.
    fn short_book(&mut self, book: &Book) {
        if !self.buffer.is_empty()
            && self.buffer.chars + book.total_chars() > self.config.max_episode_chars
            && self.buffer.chars >= self.config.min_episode_chars
        {
            self.flush_buffer();
        }

        self.buffer.push_book(book);

        if self.buffer.chars >= self.config.target_episode_chars {
            self.flush_buffer();
        }
    }

    /// Emit the short-book buffer as its own episode.
    fn flush_buffer(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let group = self.buffer.take();
        self.emit(group.chapters, group.books);
    }

    /// Walk a long book's chapters, splitting at the character ceiling.
    ///
    /// A short-book buffer that cannot stand alone rides along as a prefix
    /// and is merged into this book's first episode; it is consumed exactly
    /// once.
    fn long_book(&mut self, book: &Book) {
        let mut prefix = PendingGroup::default();
        if !self.buffer.is_empty() {
            if self.buffer.chars >= self.config.min_episode_chars {
                self.flush_buffer();
            } else {
                prefix = self.buffer.take();
            }
        }

        let chapters = &book.chapters;
        let mut current: Vec<Chapter> = Vec::new();
        let mut current_chars = 0usize;
        let mut emitted_for_book = 0usize;

        let mut i = 0;
        while i < chapters.len() {
            let chapter = &chapters[i];
            // The prefix counts toward the total only until the book's
            // first episode has been emitted.
            let prefix_chars = if emitted_for_book == 0 { prefix.chars } else { 0 };
            let would_be = current_chars + prefix_chars + chapter.total_chars();

            if would_be > self.config.max_episode_chars
                && current_chars + prefix_chars >= self.config.min_episode_chars
            {
                let remaining: usize = chapters[i..].iter().map(|c| c.total_chars()).sum();
                if remaining < self.config.min_merge_chars {
                    // The rest of the book is too small to carry an episode
                    // of its own; fold it all in and stop.
                    current.extend(chapters[i..].iter().cloned());
                    self.close_long_episode(book, &mut prefix, std::mem::take(&mut current), &mut emitted_for_book);
                    current_chars = 0;
                    break;
                }

                self.close_long_episode(book, &mut prefix, std::mem::take(&mut current), &mut emitted_for_book);
                current_chars = 0;
                // The current chapter starts the next episode.
                continue;
            }

            current.push(chapter.clone());
            current_chars += chapter.total_chars();
            i += 1;
        }

        if !current.is_empty() {
            if current_chars < self.config.min_merge_chars
                && prefix.is_empty()
                && self.last_episode_ends_in(&book.name)
            {
                self.merge_into_previous(current);
            } else {
                self.close_long_episode(book, &mut prefix, current, &mut emitted_for_book);
            }
        }
    }

    /// Emit one episode of a long book, absorbing a pending prefix on the
    /// book's first episode.
    fn close_long_episode(
        &mut self,
        book: &Book,
        prefix: &mut PendingGroup,
        chapters: Vec<Chapter>,
        emitted_for_book: &mut usize,
    ) {
        let mut books = Vec::new();
        let mut all_chapters = Vec::new();

        if *emitted_for_book == 0 && !prefix.is_empty() {
            let group = prefix.take();
            books.extend(group.books);
            all_chapters.extend(group.chapters);
        }

        books.push(book.name.clone());
        all_chapters.extend(chapters);

        self.emit(all_chapters, books);
        *emitted_for_book += 1;
    }

    fn last_episode_ends_in(&self, book: &str) -> bool {
        self.episodes
            .last()
            .and_then(|e| e.chapters.last())
            .is_some_and(|c| c.book == book)
    }

    /// Fold a short trailing accumulation backward into the previous episode.
    fn merge_into_previous(&mut self, chapters: Vec<Chapter>) {
        // Only called when last_episode_ends_in matched, so there is one.
        if let Some(previous) = self.episodes.last_mut() {
            previous.chapters.extend(chapters);
            previous.end_chapter = previous.chapters[previous.chapters.len() - 1].chapter;
        }
    }

    /// Consume the state: any leftover short-book buffer flushes
    /// unconditionally at end of corpus.
    fn finish(mut self) -> Vec<Episode> {
        self.flush_buffer();
        self.episodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Book, Chapter, Corpus, Verse};
    use proptest::prelude::*;

    /// Build a chapter of `chars` Korean characters as a single verse.
    fn chapter(book: &str, number: u32, chars: usize) -> Chapter {
        let verse = Verse::new(book, number, 1, "가".repeat(chars));
        Chapter::new(book, number, vec![verse])
    }

    fn book(name: &str, chapter_sizes: &[usize]) -> Book {
        let chapters = chapter_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| chapter(name, i as u32 + 1, size))
            .collect();
        Book::new(name, chapters)
    }

    fn config() -> SegmentationConfig {
        // 10920 / 16380 / 20020 / 7280 chars
        SegmentationConfig::default()
    }

    fn chapter_refs(corpus: &Corpus) -> Vec<(String, u32)> {
        corpus
            .books()
            .iter()
            .flat_map(|b| b.chapters.iter().map(|c| (c.book.clone(), c.chapter)))
            .collect()
    }

    fn episode_chapter_refs(episodes: &[Episode]) -> Vec<(String, u32)> {
        episodes
            .iter()
            .flat_map(|e| e.chapters.iter().map(|c| (c.book.clone(), c.chapter)))
            .collect()
    }

    #[test]
    fn test_default_config_constants() {
        let config = SegmentationConfig::default();
        assert_eq!(config.min_episode_chars, 10920);
        assert_eq!(config.target_episode_chars, 16380);
        assert_eq!(config.max_episode_chars, 20020);
        assert_eq!(config.min_merge_chars, 7280);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_thresholds() {
        let mut config = SegmentationConfig::default();
        config.min_merge_chars = config.max_episode_chars + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_corpus_yields_no_episodes() {
        let corpus = Corpus::from_books(Vec::new());
        assert!(segment(&corpus, &config()).is_empty());
    }

    #[test]
    fn test_two_short_books_merge_into_one_episode() {
        // Scenario A: 4000 + 9000 chars, both under MIN_EPISODE_CHARS.
        let corpus = Corpus::from_books(vec![
            book("오바댜", &[1500, 1500, 1000]),
            book("요나", &[4500, 4500]),
        ]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 1);
        let episode = &episodes[0];
        assert_eq!(episode.total_chars(), 13000);
        assert_eq!(episode.chapters.len(), 5);
        assert_eq!(
            episode.books_in_episode,
            Some(vec!["오바댜".to_string(), "요나".to_string()])
        );
        assert_eq!(episode.sequence_number, 1);
    }

    #[test]
    fn test_short_book_buffer_flushes_at_target() {
        // 9000 + 9000 = 18000 >= target (16380): flush immediately,
        // leaving the third book to start a new buffer.
        let corpus = Corpus::from_books(vec![
            book("호세아", &[9000]),
            book("요엘", &[9000]),
            book("아모스", &[5000]),
        ]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].total_chars(), 18000);
        assert_eq!(episodes[1].total_chars(), 5000);
        assert!(episodes[1].books_in_episode.is_none());
    }

    #[test]
    fn test_short_book_buffer_flushes_before_ceiling_overflow() {
        // Buffer at 12000 (>= min) would overflow max with the next 9000
        // book: flush first, then buffer the new book.
        let corpus = Corpus::from_books(vec![
            book("미가", &[6000]),
            book("나훔", &[6000]),
            book("하박국", &[9000]),
        ]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].total_chars(), 12000);
        assert_eq!(
            episodes[0].books_in_episode,
            Some(vec!["미가".to_string(), "나훔".to_string()])
        );
        assert_eq!(episodes[1].total_chars(), 9000);
    }

    #[test]
    fn test_long_book_splits_at_ceiling() {
        // Scenario B: [8000, 9000, 9000] against max 20020 / min 10920.
        // Chapters 1-2 (17000) close an episode; chapter 3 (9000, above
        // min_merge 7280) stands alone.
        let corpus = Corpus::from_books(vec![book("전도서", &[8000, 9000, 9000])]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].start_chapter, 1);
        assert_eq!(episodes[0].end_chapter, 2);
        assert_eq!(episodes[0].total_chars(), 17000);
        assert_eq!(episodes[1].start_chapter, 3);
        assert_eq!(episodes[1].end_chapter, 3);
        assert_eq!(episodes[1].total_chars(), 9000);
        assert_eq!(episodes[1].sequence_number, 2);
    }

    #[test]
    fn test_long_book_folds_short_tail_forward() {
        // At the split point the rest of the book (4000) is below
        // min_merge, so it rides along instead of orphaning an episode.
        let corpus = Corpus::from_books(vec![book("이사야", &[8000, 9000, 4000])]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].total_chars(), 21000); // allowed to exceed max here
        assert_eq!(episodes[0].end_chapter, 3);
    }

    #[test]
    fn test_oversized_single_chapter_is_never_split() {
        let corpus = Corpus::from_books(vec![book("시편", &[25000, 12000])]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].chapters.len(), 1);
        assert_eq!(episodes[0].total_chars(), 25000);
        assert_eq!(episodes[1].total_chars(), 12000);
    }

    #[test]
    fn test_pending_prefix_merges_into_first_long_episode() {
        // A short book that cannot stand alone (5000 < min) precedes a
        // long book: it must land in that book's first episode only.
        let corpus = Corpus::from_books(vec![
            book("룻기", &[2500, 2500]),
            book("사무엘상", &[9000, 9000, 9000]),
        ]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        // First episode: prefix (5000) + chapter 1 (9000) = 14000; adding
        // chapter 2 would reach 23000 > max while 14000 >= min.
        assert_eq!(episodes[0].total_chars(), 14000);
        assert_eq!(
            episodes[0].books_in_episode,
            Some(vec!["룻기".to_string(), "사무엘상".to_string()])
        );
        assert_eq!(episodes[0].primary_book, "룻기");
        // Second episode holds the remaining two chapters, prefix-free.
        assert_eq!(episodes[1].total_chars(), 18000);
        assert!(episodes[1].books_in_episode.is_none());
    }

    #[test]
    fn test_standalone_buffer_flushes_before_long_book() {
        // A buffer that already meets MIN stands alone rather than merging
        // into the long book.
        let corpus = Corpus::from_books(vec![
            book("에스라", &[6000, 6000]),
            book("느헤미야", &[9000, 9000]),
        ]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].total_chars(), 12000);
        assert!(episodes[0].books_in_episode.is_none());
        assert_eq!(episodes[0].primary_book, "에스라");
        assert_eq!(episodes[1].total_chars(), 18000);
        assert_eq!(episodes[1].primary_book, "느헤미야");
    }

    #[test]
    fn test_trailing_short_buffer_flushes_at_end_of_corpus() {
        let corpus = Corpus::from_books(vec![book("유다서", &[1200])]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].total_chars(), 1200);
    }

    #[test]
    fn test_sequence_numbers_are_gapless() {
        let corpus = Corpus::from_books(vec![
            book("창세기", &[9000; 6]),
            book("룻기", &[4000]),
            book("에스더", &[5000]),
        ]);
        let episodes = segment(&corpus, &config());

        for (i, episode) in episodes.iter().enumerate() {
            assert_eq!(episode.sequence_number, i as u32 + 1);
            assert_eq!(episode.id, format!("ep-{:03}", i + 1));
        }
    }

    #[test]
    fn test_display_title_and_minutes() {
        let corpus = Corpus::from_books(vec![book("창세기", &[8000, 9000, 9000])]);
        let episodes = segment(&corpus, &config());

        assert_eq!(episodes[0].display_title(), "창세기 1-2장");
        assert_eq!(episodes[1].display_title(), "창세기 3장");
        let minutes = episodes[0].estimated_minutes(910);
        assert!((minutes - 17000.0 / 910.0).abs() < 1e-9);
    }

    proptest! {
        /// Segmentation completeness and no-chapter-splitting: the
        /// episodes' chapters are exactly the corpus chapters, once each,
        /// in original order.
        #[test]
        fn prop_segmentation_covers_corpus_exactly(
            sizes in prop::collection::vec(
                prop::collection::vec(200usize..9000, 1..9),
                0..7,
            )
        ) {
            let books: Vec<Book> = sizes
                .iter()
                .enumerate()
                .map(|(i, chapter_sizes)| book(&format!("책{:02}", i + 1), chapter_sizes))
                .collect();
            let corpus = Corpus::from_books(books);
            let episodes = segment(&corpus, &config());

            prop_assert_eq!(episode_chapter_refs(&episodes), chapter_refs(&corpus));

            for (i, episode) in episodes.iter().enumerate() {
                prop_assert_eq!(episode.sequence_number, i as u32 + 1);
                prop_assert!(!episode.chapters.is_empty());
            }
        }

        /// Inside a long book no episode falls below the merge floor, and
        /// every episode closed mid-book meets the standalone minimum.
        /// (The ceiling is soft: a chapter run that cannot reach the
        /// minimum without overflowing, or a folded tail, may exceed it.)
        #[test]
        fn prop_long_book_episodes_respect_floors(
            chapter_sizes in prop::collection::vec(200usize..12000, 2..20)
        ) {
            let cfg = config();
            let total: usize = chapter_sizes.iter().sum();
            prop_assume!(total >= cfg.min_episode_chars);

            let corpus = Corpus::from_books(vec![book("열왕기상", &chapter_sizes)]);
            let episodes = segment(&corpus, &cfg);

            prop_assert!(!episodes.is_empty());
            for (i, episode) in episodes.iter().enumerate() {
                let chars = episode.total_chars();
                let is_last = i + 1 == episodes.len();
                prop_assert!(
                    chars >= cfg.min_merge_chars,
                    "episode {} has {} chars, below the merge floor", i + 1, chars
                );
                if !is_last {
                    prop_assert!(chars >= cfg.min_episode_chars);
                }
            }
        }
    }
}
