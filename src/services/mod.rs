pub mod pagination;
pub mod question_search;
pub mod quiz_selector;

pub use pagination::{paginate, parse_page, saturating_parse_int, Page, QUESTIONS_PER_PAGE};
pub use question_search::search;
pub use quiz_selector::{eligible_questions, select_quiz_question};
