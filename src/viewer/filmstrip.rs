//! Thumbnail filmstrip
//!
//! One button per page. Exactly one button is active once a document is
//! loaded; it follows the navigator's current index.

use crate::render::PageImageSet;
use crate::site::UiTexts;

/// A filmstrip entry
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbButton {
    /// 1-based page number
    pub page: usize,
    /// Image source; the full page stands in when the thumbnail is missing
    pub src: String,
    pub alt: String,
}

/// Ask the scroll container to bring a thumbnail into view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
    /// Smooth, inline-centered scroll
    pub center: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filmstrip {
    buttons: Vec<ThumbButton>,
    active: Option<usize>,
}

impl Filmstrip {
    /// Build buttons for every page slot of `images`
    pub fn build(images: &PageImageSet, texts: &UiTexts) -> Self {
        let buttons = (0..images.len())
            .map(|index| {
                let src = images
                    .thumb(index)
                    .or_else(|| images.page(index))
                    .map(|img| img.to_data_url())
                    .unwrap_or_default();

                ThumbButton {
                    page: index + 1,
                    src,
                    alt: texts.thumb_alt(index + 1),
                }
            })
            .collect();

        Self {
            buttons,
            active: None,
        }
    }

    pub fn buttons(&self) -> &[ThumbButton] {
        &self.buttons
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    /// Mark `index` active, clearing the previous one
    ///
    /// Returns a scroll request when `center` is set. Out-of-range indices
    /// change nothing.
    pub fn set_active(&mut self, index: usize, center: bool) -> Option<ScrollRequest> {
        if index >= self.buttons.len() {
            return None;
        }
        self.active = Some(index);
        center.then_some(ScrollRequest {
            index,
            center: true,
        })
    }

    /// Page index to navigate to when a thumbnail is clicked
    pub fn click(&self, index: usize) -> Option<usize> {
        (index < self.buttons.len()).then_some(index)
    }

    /// Markup for the filmstrip list
    pub fn to_html(&self) -> String {
        let mut html = String::new();
        for (index, button) in self.buttons.iter().enumerate() {
            let class = if self.active == Some(index) {
                "thumb-btn thumb-active"
            } else {
                "thumb-btn"
            };
            html.push_str(&format!(
                "<button type=\"button\" class=\"{}\" data-page=\"{}\"><img src=\"{}\" alt=\"{}\" loading=\"lazy\" decoding=\"async\"></button>",
                class,
                button.page,
                html_escape::encode_double_quoted_attribute(&button.src),
                html_escape::encode_double_quoted_attribute(&button.alt),
            ));
        }
        html
    }
}
