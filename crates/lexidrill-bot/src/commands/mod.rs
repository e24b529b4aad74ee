pub mod grammar;
pub mod init;
pub mod run;
pub mod words;
