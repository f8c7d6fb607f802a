mod card;
mod decorate;

pub use card::{apply_cards, render_card, scan_cards, RenderedCard};
pub use decorate::PageDecorator;
