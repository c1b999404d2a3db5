#![forbid(unsafe_code)]

pub mod aggregate;
pub mod cli;
pub mod driver;
pub mod extract;
pub mod harvest;
pub mod load;
pub mod logging;
pub mod plot;
pub mod records;
pub mod scrape;
pub mod selectors;
pub mod store;
pub mod timeparse;
