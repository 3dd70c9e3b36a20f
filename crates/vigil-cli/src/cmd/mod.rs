pub mod assign;
pub mod checkin;
pub mod init;
pub mod run;
pub mod schedule;
pub mod serve;
