//! Integration tests for locator resolution.
//!
//! Most scenarios run against `tests/fixtures/report.json`:
//!
//! ```text
//! [  0, 16)  Quarterly Report            Heading 1
//! [ 17, 46)  Revenue grew in every region.
//! [ 47, 58)  Key figures                 bold
//! [ 59, 92)  table 3x2: Region/Revenue, North/120, South/95
//! [ 93,100)  Outlook                     Heading 2
//! [101,117)  Hiring continues            list item "1."
//! [118,133)  Costs stay flat             list item "2."
//! [134,135)  picture
//! [136,137)  chart
//! [138,164)  Appendix: revenue by month
//! ```

mod anchors;
mod cache;
mod engine;
mod properties;

use docsel::{MemoryDocument, Selection};

pub fn report() -> MemoryDocument {
    MemoryDocument::from_json(include_str!("../fixtures/report.json")).unwrap()
}

pub fn texts(selection: &Selection) -> Vec<&str> {
    selection.ranges().iter().map(|r| r.text.as_str()).collect()
}
