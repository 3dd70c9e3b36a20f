pub mod checkins;
pub mod health;
pub mod run;
pub mod schedules;
