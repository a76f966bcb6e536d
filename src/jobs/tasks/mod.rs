mod daily_report;
mod send_menu;

pub use daily_report::DailyReportTask;
pub use send_menu::SendMenuTask;
