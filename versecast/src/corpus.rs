// Corpus loading and lookup: books, chapters, verses.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// A single verse, the smallest indivisible unit of text.
#[derive(Debug, Clone)]
pub struct Verse {
    /// Book this verse belongs to
    pub book: String,
    /// Chapter number within the book
    pub chapter: u32,
    /// Verse number within the chapter
    pub verse: u32,
    /// Plain verse text
    pub text: String,
    /// Cached character count (Unicode scalars, not bytes)
    char_len: usize,
}

impl Verse {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32, text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            book: book.into(),
            chapter,
            verse,
            text,
            char_len,
        }
    }

    /// Character count of the verse text.
    ///
    /// Counts Unicode scalars: the corpus is Korean and byte length would
    /// triple every size against the narration-rate thresholds.
    pub fn char_len(&self) -> usize {
        self.char_len
    }
}

/// A chapter: contiguously numbered verses within one book.
#[derive(Debug, Clone)]
pub struct Chapter {
    pub book: String,
    pub chapter: u32,
    pub verses: Vec<Verse>,
    total_chars: usize,
}

impl Chapter {
    pub fn new(book: impl Into<String>, chapter: u32, verses: Vec<Verse>) -> Self {
        let total_chars = verses.iter().map(|v| v.char_len()).sum();
        Self {
            book: book.into(),
            chapter,
            verses,
            total_chars,
        }
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }
}

/// A book: its chapters in chapter-number order.
#[derive(Debug, Clone)]
pub struct Book {
    pub name: String,
    pub chapters: Vec<Chapter>,
    total_chars: usize,
}

impl Book {
    pub fn new(name: impl Into<String>, chapters: Vec<Chapter>) -> Self {
        let total_chars = chapters.iter().map(|c| c.total_chars()).sum();
        Self {
            name: name.into(),
            chapters,
            total_chars,
        }
    }

    pub fn total_chars(&self) -> usize {
        self.total_chars
    }
}

/// The full static text hierarchy. Built once, read-only afterwards.
#[derive(Debug)]
pub struct Corpus {
    books: Vec<Book>,
    index: HashMap<String, usize>,
}

// Serde mirror of the corpus JSON file:
// [ { "book": "창세기", "chapters": [ { "chapter": 1, "verses": [ { "verse": 1, "text": "..." } ] } ] } ]

#[derive(Debug, Deserialize)]
struct RawBook {
    book: String,
    chapters: Vec<RawChapter>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    chapter: u32,
    verses: Vec<RawVerse>,
}

#[derive(Debug, Deserialize)]
struct RawVerse {
    verse: u32,
    text: String,
}

impl Corpus {
    /// Load the corpus from a JSON file. Missing or malformed input is fatal.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus file: {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("malformed corpus file: {}", path.display()))
    }

    /// Parse a corpus from its JSON representation.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: Vec<RawBook> = serde_json::from_str(content).context("invalid corpus JSON")?;

        let books = raw
            .into_iter()
            .map(|b| {
                let chapters = b
                    .chapters
                    .into_iter()
                    .map(|c| {
                        let verses = c
                            .verses
                            .into_iter()
                            .map(|v| Verse::new(&b.book, c.chapter, v.verse, v.text))
                            .collect();
                        Chapter::new(&b.book, c.chapter, verses)
                    })
                    .collect();
                Book::new(b.book, chapters)
            })
            .collect();

        Ok(Self::from_books(books))
    }

    /// Build a corpus from already-constructed books, in canonical order.
    pub fn from_books(books: Vec<Book>) -> Self {
        let index = books
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        Self { books, index }
    }

    /// All books in canonical corpus order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Look up a book by name.
    pub fn book(&self, name: &str) -> Option<&Book> {
        self.index.get(name).map(|&i| &self.books[i])
    }

    /// Look up one chapter.
    pub fn chapter(&self, book: &str, number: u32) -> Option<&Chapter> {
        self.book(book)?.chapters.iter().find(|c| c.chapter == number)
    }

    /// Chapters `start..=end` of a book, silently omitting ones that don't
    /// exist. Callers must check for empty or short results.
    pub fn chapters_in_range(&self, book: &str, start: u32, end: u32) -> Vec<&Chapter> {
        match self.book(book) {
            Some(book) => book
                .chapters
                .iter()
                .filter(|c| c.chapter >= start && c.chapter <= end)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn total_chars(&self) -> usize {
        self.books.iter().map(|b| b.total_chars()).sum()
    }
}
