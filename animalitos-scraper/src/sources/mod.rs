//! Lottery-source variants
//!
//! Each source owns the page-structure knowledge for one page shape:
//! the historical pivoted table, the per-day result blocks, and the
//! "last published draw" single-record page. The shared helpers here
//! cover what every shape needs: CSS selection, draw-number cleanup and
//! the `div.col-sm-6` result-block layout used by the daily pages.

pub mod daily;
pub mod historical;
pub mod last_draw;

pub use daily::DailyDrawsSource;
pub use historical::{HistoricalLoader, LottoActivoSource};
pub use last_draw::LastDrawFetcher;

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Parse a static CSS selector.
///
/// # Panics
/// Panics on an invalid selector; all call sites pass literals.
pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("valid CSS selector literal")
}

/// Normalize a scraped draw number to its vocabulary key.
///
/// Strips non-digit characters, keeps the `"0"`/`"00"` distinction, and
/// zero-pads everything else to two digits. Values outside 0..=36 are
/// rejected.
pub(crate) fn clean_number(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.as_str() {
        "" => None,
        "0" => Some("0".to_string()),
        "00" => Some("00".to_string()),
        _ => {
            let value: u32 = digits.parse().ok()?;
            (value >= 1 && value <= 36).then(|| format!("{value:02}"))
        }
    }
}

/// One `div.col-sm-6` result block from the daily pages.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResultBlock {
    /// `h4` text, expected shape "34 Venado"
    pub title: String,
    /// `h5` text, the draw's time slot ("09:00 AM")
    pub schedule: String,
    /// Image URI, preferring the one inside `div.circle`
    pub image: Option<String>,
    /// First `h4` class that is not layout noise ("rojo"/"negro")
    pub color: Option<String>,
}

impl ResultBlock {
    /// Split the title into `(numero, animal)`; `None` when the leading
    /// token is not numeric.
    pub fn split_title(&self) -> Option<(&str, &str)> {
        let (number, animal) = self.title.split_once(' ')?;
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        Some((number, animal.trim()))
    }
}

/// Extract the result blocks of a daily page, skipping blocks without a
/// title or schedule (navigation and ad blocks share the same class).
pub(crate) fn parse_result_blocks(html: &str) -> Vec<ResultBlock> {
    let document = Html::parse_document(html);
    let block_sel = selector("div.col-sm-6");
    let h4_sel = selector("h4");
    let h5_sel = selector("h5");
    let circle_img_sel = selector("div.circle img");
    let img_sel = selector("img");

    let mut blocks = Vec::new();
    for element in document.select(&block_sel) {
        let title_el = match element.select(&h4_sel).next() {
            Some(el) => el,
            None => {
                debug!("block without title, skipping");
                continue;
            }
        };
        let schedule_el = match element.select(&h5_sel).next() {
            Some(el) => el,
            None => {
                debug!("block without schedule, skipping");
                continue;
            }
        };

        let image = element
            .select(&circle_img_sel)
            .next()
            .or_else(|| element.select(&img_sel).next())
            .and_then(|img| img.value().attr("src"))
            .map(str::to_string);

        blocks.push(ResultBlock {
            title: element_text(title_el),
            schedule: element_text(schedule_el),
            image,
            color: title_color(title_el),
        });
    }
    blocks
}

/// Concatenated, trimmed text of an element.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

// Layout classes that are not a color tag.
const NON_COLOR_CLASSES: &[&str] = &["mt-3"];

fn title_color(title: ElementRef<'_>) -> Option<String> {
    title
        .value()
        .classes()
        .find(|class| !NON_COLOR_CLASSES.contains(class))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_number_keeps_zero_variants_distinct() {
        assert_eq!(clean_number("0").as_deref(), Some("0"));
        assert_eq!(clean_number("00").as_deref(), Some("00"));
        assert_ne!(clean_number("0"), clean_number("00"));
    }

    #[test]
    fn clean_number_pads_and_bounds() {
        assert_eq!(clean_number("5").as_deref(), Some("05"));
        assert_eq!(clean_number("#34").as_deref(), Some("34"));
        assert_eq!(clean_number("36").as_deref(), Some("36"));
        assert_eq!(clean_number("37"), None);
        assert_eq!(clean_number("animal"), None);
        assert_eq!(clean_number(""), None);
    }

    #[test]
    fn parses_result_blocks_with_color_and_image() {
        let html = r#"
            <div class="col-sm-6">
                <h4 class="mt-3 rojo">34 Venado</h4>
                <h5>09:00 AM</h5>
                <div class="circle"><img src="/img/venado.png"></div>
            </div>
            <div class="col-sm-6"><p>bloque de navegación</p></div>
            <div class="col-sm-6">
                <h4 class="negro mt-3">05 Leon</h4>
                <h5>10:00 AM</h5>
            </div>
        "#;

        let blocks = parse_result_blocks(html);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].title, "34 Venado");
        assert_eq!(blocks[0].schedule, "09:00 AM");
        assert_eq!(blocks[0].image.as_deref(), Some("/img/venado.png"));
        assert_eq!(blocks[0].color.as_deref(), Some("rojo"));

        assert_eq!(blocks[1].color.as_deref(), Some("negro"));
        assert_eq!(blocks[1].image, None);
    }

    #[test]
    fn split_title_requires_numeric_prefix() {
        let block = ResultBlock {
            title: "34 Venado".into(),
            schedule: "09:00 AM".into(),
            image: None,
            color: None,
        };
        assert_eq!(block.split_title(), Some(("34", "Venado")));

        let bad = ResultBlock {
            title: "Resultados de hoy".into(),
            ..block
        };
        assert_eq!(bad.split_title(), None);
    }
}
