mod generate_form;
mod history_list;
mod preview_card;
mod toasts;

pub use generate_form::{FormState, generate_form};
pub use history_list::{HistoryAction, Thumbnail, Thumbnails, history_list};
pub use preview_card::preview_card;
pub use toasts::toasts;
