//! EPUB decoding for the in-browser reader.
//!
//! The translated book arrives as raw bytes from the viewer endpoint.
//! [`Book::from_bytes`] unpacks it with the `epub` crate into
//! spine-ordered chapters ready for the page: only the sanitised
//! `<body>` content is kept, and images are inlined as `data:` URLs
//! because the archive's relative resource paths mean nothing to the
//! browser.

use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use epub::doc::{EpubDoc, NavPoint};
use regex::{Captures, Regex};

use crate::sanitize::body_markup;

/// Errors that can occur when decoding a book.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookError {
    /// The input bytes were empty.
    #[error("book data is empty")]
    Empty,

    /// The bytes are not a readable EPUB archive.
    #[error("not a readable EPUB: {0}")]
    Malformed(String),

    /// The archive parsed but its spine lists no readable chapters.
    #[error("book has no readable chapters")]
    NoChapters,
}

/// One spine item, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    /// Manifest id of the spine item.
    pub id: String,
    /// Path of the chapter document inside the archive.
    pub path: String,
    /// Body markup with images inlined.
    pub html: String,
}

/// A flattened table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub label: String,
    /// Nesting level, 0 for top-level entries.
    pub depth: usize,
    /// Spine index the entry points at, when it resolves to one.
    pub chapter: Option<usize>,
}

/// A decoded book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub title: Option<String>,
    pub author: Option<String>,
    pub chapters: Vec<Chapter>,
    pub toc: Vec<TocEntry>,
}

impl Book {
    /// Decode an EPUB archive held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::Empty`] for empty input,
    /// [`BookError::Malformed`] when the archive or its package document
    /// cannot be read, and [`BookError::NoChapters`] when no spine item
    /// decodes as text.
    pub fn from_bytes<B: AsRef<[u8]>>(bytes: B) -> Result<Self, BookError> {
        if bytes.as_ref().is_empty() {
            return Err(BookError::Empty);
        }
        let mut doc = EpubDoc::from_reader(Cursor::new(bytes))
            .map_err(|e| BookError::Malformed(e.to_string()))?;

        let images = inline_images(&mut doc);

        let mut chapters = Vec::new();
        for id in doc.spine.clone() {
            let path = doc
                .resources
                .get(&id)
                .map(|(p, _)| path_to_string(p))
                .unwrap_or_default();
            let Some((data, _mime)) = doc.get_resource(&id) else {
                continue;
            };
            let Ok(markup) = String::from_utf8(data) else {
                continue;
            };
            let html = rewrite_images(&body_markup(&markup), &path, &images);
            chapters.push(Chapter { id, path, html });
        }

        if chapters.is_empty() {
            return Err(BookError::NoChapters);
        }

        let by_path: HashMap<&str, usize> = chapters
            .iter()
            .enumerate()
            .map(|(i, c)| (c.path.as_str(), i))
            .collect();
        let mut toc = Vec::new();
        flatten_toc(&doc.toc, 0, &by_path, &mut toc);

        Ok(Self {
            title: doc.mdata("title"),
            author: doc.mdata("creator"),
            chapters,
            toc,
        })
    }

    #[must_use]
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    #[must_use]
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }
}

/// Map every image resource path to a `data:` URL.
fn inline_images<R: std::io::Read + std::io::Seek>(
    doc: &mut EpubDoc<R>,
) -> HashMap<String, String> {
    let image_ids: Vec<String> = doc
        .resources
        .iter()
        .filter(|(_, (_, mime))| mime.starts_with("image/"))
        .map(|(id, _)| id.clone())
        .collect();

    let mut images = HashMap::new();
    for id in image_ids {
        let Some(path) = doc.resources.get(&id).map(|(p, _)| path_to_string(p)) else {
            continue;
        };
        if let Some((data, mime)) = doc.get_resource(&id) {
            let url = format!("data:{mime};base64,{}", BASE64.encode(&data));
            images.insert(path, url);
        }
    }
    images
}

fn flatten_toc(
    points: &[NavPoint],
    depth: usize,
    by_path: &HashMap<&str, usize>,
    out: &mut Vec<TocEntry>,
) {
    for point in points {
        let target = path_to_string(&point.content);
        let target = target.split('#').next().unwrap_or_default();
        out.push(TocEntry {
            label: point.label.trim().to_owned(),
            depth,
            chapter: resolve_chapter(target, by_path),
        });
        flatten_toc(&point.children, depth + 1, by_path, out);
    }
}

/// Find the spine index for a TOC target.
///
/// The target is normalised first. When it is not a spine path, a
/// chapter whose path ends with the target (an NCX relative to its own
/// folder) or, failing that, has the same file name is used, but only if
/// exactly one chapter matches.
fn resolve_chapter(target: &str, by_path: &HashMap<&str, usize>) -> Option<usize> {
    let target = resolve_relative("", target);
    if let Some(&index) = by_path.get(target.as_str()) {
        return Some(index);
    }

    let suffix = format!("/{target}");
    if let Some(index) = unique_match(by_path, |path| path.ends_with(&suffix)) {
        return Some(index);
    }
    let file_name = target.rsplit('/').next()?;
    unique_match(by_path, |path| path.rsplit('/').next() == Some(file_name))
}

fn unique_match(by_path: &HashMap<&str, usize>, matches: impl Fn(&str) -> bool) -> Option<usize> {
    let mut found = by_path
        .iter()
        .filter(|(path, _)| matches(path))
        .map(|(_, &index)| index);
    let first = found.next()?;
    found.next().is_none().then_some(first)
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[allow(clippy::expect_used)] // literal pattern
static IMAGE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(<(?:img|image)\b[^>]*?\b(?:src|xlink:href|href)\s*=\s*)(["'])([^"']*)["']"#)
        .expect("image pattern")
});

/// Replace image references with `data:` URLs, resolving each
/// reference relative to the chapter's own path.
fn rewrite_images(html: &str, chapter_path: &str, images: &HashMap<String, String>) -> String {
    let base_dir = chapter_path
        .rsplit_once('/')
        .map_or("", |(dir, _)| dir);

    IMAGE_REF
        .replace_all(html, |caps: &Captures<'_>| {
            let reference = &caps[3];
            let resolved = resolve_relative(base_dir, reference);
            images.get(&resolved).map_or_else(
                || caps[0].to_owned(),
                |url| format!("{}{}{url}{}", &caps[1], &caps[2], &caps[2]),
            )
        })
        .into_owned()
}

/// Join `reference` onto `base_dir`, collapsing `.` and `..` segments.
fn resolve_relative(base_dir: &str, reference: &str) -> String {
    let reference = reference.split(['#', '?']).next().unwrap_or_default();
    let mut parts: Vec<&str> = if reference.starts_with('/') {
        Vec::new()
    } else {
        base_dir.split('/').filter(|s| !s.is_empty()).collect()
    };
    for segment in reference.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(Book::from_bytes(Vec::new()), Err(BookError::Empty));
    }

    #[test]
    fn garbage_is_malformed() {
        let result = Book::from_bytes(b"definitely not a zip archive".to_vec());
        assert!(matches!(result, Err(BookError::Malformed(_))), "{result:?}");
    }

    #[test]
    fn relative_paths_resolve() {
        assert_eq!(
            resolve_relative("OEBPS/Text", "../Images/cover.jpg"),
            "OEBPS/Images/cover.jpg"
        );
        assert_eq!(resolve_relative("OEBPS", "./img/a.png"), "OEBPS/img/a.png");
        assert_eq!(resolve_relative("OEBPS", "/root.png"), "root.png");
        assert_eq!(resolve_relative("", "a.png#frag"), "a.png");
    }

    #[test]
    fn images_are_inlined() {
        let mut images = HashMap::new();
        images.insert(
            "OEBPS/Images/a.png".to_owned(),
            "data:image/png;base64,AAAA".to_owned(),
        );
        let html = r#"<p><img alt="a" src="../Images/a.png"/><img src='missing.png'/></p>"#;
        let rewritten = rewrite_images(html, "OEBPS/Text/ch1.xhtml", &images);
        assert_eq!(
            rewritten,
            r#"<p><img alt="a" src="data:image/png;base64,AAAA"/><img src='missing.png'/></p>"#
        );
    }

    #[test]
    fn svg_image_hrefs_are_inlined() {
        let mut images = HashMap::new();
        images.insert("cover.jpg".to_owned(), "data:image/jpeg;base64,BBBB".to_owned());
        let html = r#"<svg><image width="10" xlink:href="cover.jpg"/></svg>"#;
        assert_eq!(
            rewrite_images(html, "cover.xhtml", &images),
            r#"<svg><image width="10" xlink:href="data:image/jpeg;base64,BBBB"/></svg>"#
        );
    }

    #[test]
    fn toc_targets_fall_back_to_filename() {
        let by_path: HashMap<&str, usize> =
            [("OEBPS/Text/ch1.xhtml", 0), ("OEBPS/Text/ch2.xhtml", 1)]
                .into_iter()
                .collect();
        assert_eq!(resolve_chapter("OEBPS/Text/ch2.xhtml", &by_path), Some(1));
        assert_eq!(resolve_chapter("Text/ch1.xhtml", &by_path), Some(0));
        assert_eq!(resolve_chapter("notes.xhtml", &by_path), None);
    }

    #[test]
    fn toc_targets_are_normalised_before_lookup() {
        let by_path: HashMap<&str, usize> =
            [("OEBPS/part1/ch1.xhtml", 0), ("OEBPS/part2/ch1.xhtml", 5)]
                .into_iter()
                .collect();
        assert_eq!(resolve_chapter("OEBPS/part2/./ch1.xhtml", &by_path), Some(5));
        assert_eq!(resolve_chapter("OEBPS/../part2/ch1.xhtml", &by_path), Some(5));
        assert_eq!(resolve_chapter("part1/ch1.xhtml#s", &by_path), Some(0));
    }

    #[test]
    fn ambiguous_file_names_do_not_resolve() {
        let by_path: HashMap<&str, usize> =
            [("OEBPS/part1/ch1.xhtml", 0), ("OEBPS/part2/ch1.xhtml", 5)]
                .into_iter()
                .collect();
        for _ in 0..8 {
            assert_eq!(resolve_chapter("ch1.xhtml", &by_path), None);
            assert_eq!(resolve_chapter("other/ch1.xhtml", &by_path), None);
        }
    }
}
