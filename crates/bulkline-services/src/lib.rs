pub mod contacts;
pub mod history;
pub mod orders;
pub mod scheduled;

pub use contacts::ContactsService;
pub use history::HistoryService;
pub use orders::OrdersService;
pub use scheduled::ScheduledService;
