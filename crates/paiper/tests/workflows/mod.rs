use super::*;

mod history;
mod paper_page;
mod photos;
mod search;
