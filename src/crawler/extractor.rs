//! Product page extraction
//!
//! This module turns a product detail page into a [`ScrapeOutcome`]:
//! - Locates the language-support table
//! - Reads the product name
//! - Derives interface/audio/subtitle flags for each requested language
//!
//! Extraction is total. Missing or malformed structure degrades to the most
//! specific inaccessible classification instead of an error.

use crate::catalog::Language;
use crate::state::{InaccessibleReason, LanguageSupport, ScrapeOutcome};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

const LANGUAGE_TABLE: &str = "table.game_language_options";
const ROW: &str = "tr";
const CELL: &str = "td";
const SUPPORT_MARKER: &str = "span, img";
const CHECK_MARK: char = '✔';

/// Product name locations, current markup first
const NAME_SELECTORS: [&str; 2] = ["#appHubAppName", ".apphub_AppName"];

/// Extracts language support for `languages` from a product page
///
/// # Classification
///
/// | Page | Outcome |
/// |------|---------|
/// | No language table | `Inaccessible { AgeGated }` |
/// | Table but no product name | `Inaccessible { ParseError }` |
/// | Table and name | `Accessible` with rows for requested languages |
///
/// The store hides the language table behind its age check on mature
/// titles, which is why a missing table is reported as age gating.
///
/// # Example
///
/// ```
/// use lingo_sweep::crawler::extract;
/// use lingo_sweep::{Language, ScrapeOutcome};
///
/// let html = r#"
///     <div id="appHubAppName">Example Game</div>
///     <table class="game_language_options">
///         <tr><th></th><th>Interface</th><th>Full Audio</th><th>Subtitles</th></tr>
///         <tr><td>Swedish</td><td><span>✔</span></td><td></td><td><span>✔</span></td></tr>
///     </table>
/// "#;
/// let swedish = Language::parse("swedish").unwrap();
///
/// match extract(html, "https://store.example.com/app/1/", &[swedish]) {
///     ScrapeOutcome::Accessible { name, support_by_language } => {
///         assert_eq!(name, "Example Game");
///         assert!(support_by_language[&swedish].interface);
///         assert!(!support_by_language[&swedish].audio);
///     }
///     other => panic!("unexpected outcome: {:?}", other),
/// }
/// ```
pub fn extract(html: &str, uri: &str, languages: &[Language]) -> ScrapeOutcome {
    let document = Html::parse_document(html);

    let (Ok(table_selector), Ok(row_selector), Ok(cell_selector), Ok(marker_selector)) = (
        Selector::parse(LANGUAGE_TABLE),
        Selector::parse(ROW),
        Selector::parse(CELL),
        Selector::parse(SUPPORT_MARKER),
    ) else {
        return ScrapeOutcome::inaccessible(uri, InaccessibleReason::ParseError);
    };

    let Some(table) = document.select(&table_selector).next() else {
        tracing::debug!("No language table on {}", uri);
        return ScrapeOutcome::inaccessible(uri, InaccessibleReason::AgeGated);
    };

    let Some(name) = extract_name(&document) else {
        tracing::debug!("Language table without product name on {}", uri);
        return ScrapeOutcome::inaccessible(uri, InaccessibleReason::ParseError);
    };

    let mut support_by_language = BTreeMap::new();

    for row in table.select(&row_selector) {
        let cells: Vec<ElementRef> = row.select(&cell_selector).collect();

        // Header rows use <th>; anything shorter than four cells is unusable
        if cells.len() < 4 {
            continue;
        }

        let label = element_text(&cells[0]);
        let Some(language) = languages.iter().find(|l| l.matches_label(&label)) else {
            continue;
        };

        let support = LanguageSupport::new(
            has_marker(&cells[1], &marker_selector),
            has_marker(&cells[2], &marker_selector),
            has_marker(&cells[3], &marker_selector),
        );
        support_by_language.entry(*language).or_insert(support);
    }

    ScrapeOutcome::Accessible {
        name,
        support_by_language,
    }
}

/// Reads the product name from the first selector that yields text
fn extract_name(document: &Html) -> Option<String> {
    NAME_SELECTORS
        .iter()
        .filter_map(|css| Selector::parse(css).ok())
        .find_map(|selector| {
            document
                .select(&selector)
                .map(|element| element_text(&element))
                .find(|text| !text.is_empty())
        })
}

/// Concatenated, whitespace-trimmed text of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Returns true if a support cell carries a marker element or check mark
fn has_marker(cell: &ElementRef, marker_selector: &Selector) -> bool {
    cell.select(marker_selector).next().is_some() || cell.text().any(|t| t.contains(CHECK_MARK))
}
