pub mod card;
pub mod color;
pub mod font;
pub mod layout;
